//! gifcast is a streaming animated GIF encoder.
//!
//! A [`GifEncoder`] session takes fixed dimensions and a sequence of RGBA frames. Each frame is
//! reduced to a 256-color palette with NeuQuant, mapped to indices, LZW-compressed and written as
//! soon as it is added:
//!
//! - Configure delay, loop, disposal, transparency and quality with setters or [`EncoderOptions`]
//! - Attach [`OutputSink`]s to receive bytes as they are produced, or read them back afterwards
//! - Drive the session directly, or push ordered frames through a [`GifSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// GIF89a records, LZW compression and byte outputs.
pub mod encode;
/// Color quantization: NeuQuant network and indexed palettes.
pub mod quantize;
/// Session-oriented encoding API.
pub mod session;

pub use crate::foundation::core::{Disposal, FrameIndex, FrameRgba, Repeat, Rgb};
pub use crate::foundation::error::{GifError, GifResult};

pub use crate::encode::container::{FrameReport, FrameSettings};
pub use crate::encode::lzw::LzwStats;
pub use crate::encode::output::{
    CallbackOutput, ChannelOutput, OutputEvent, OutputSink, WriterOutput, channel_output,
};
pub use crate::encode::sink::{FrameSink, GifSink, SinkConfig};
pub use crate::quantize::palette::Palette;
pub use crate::quantize::{Quantized, quantize};
pub use crate::session::encoder::GifEncoder;
pub use crate::session::options::EncoderOptions;
