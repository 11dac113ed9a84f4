//! GIF89a container layout and the cross-frame state that decides which records each frame gets.

use crate::encode::lzw::{self, LzwStats};
use crate::foundation::bytes::ByteSink;
use crate::foundation::core::{Disposal, Repeat, Rgb, rgba_len};
use crate::foundation::error::{GifError, GifResult};
use crate::quantize::palette::Palette;
use crate::quantize::{quantize, rgba_to_rgb};

/// The quantizer always targets 8-bit indices.
const LZW_MIN_CODE_SIZE: u8 = 8;

const EXTENSION_INTRODUCER: u8 = 0x21;
const GRAPHIC_CONTROL_LABEL: u8 = 0xF9;
const APPLICATION_LABEL: u8 = 0xFF;
const IMAGE_SEPARATOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;

/// Per-frame encoding parameters, snapshotted from the session options when a frame is added.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSettings {
    /// Delay in hundredths of a second.
    pub delay_cs: u16,
    /// Explicit disposal; `None` picks the default from the transparency setting.
    pub disposal: Option<Disposal>,
    /// Color whose closest used palette entry becomes the transparent index.
    pub transparent: Option<Rgb>,
    /// NeuQuant sample factor, already clamped.
    pub sample_factor: u32,
    /// Only consulted for the first frame.
    pub repeat: Repeat,
}

impl FrameSettings {
    /// Disposal written to the Graphic Control Extension: the override if present, otherwise
    /// restore-to-background when a transparent color is set and unspecified when not.
    pub fn effective_disposal(&self) -> Disposal {
        match (self.disposal, self.transparent) {
            (Some(d), _) => d,
            (None, Some(_)) => Disposal::Background,
            (None, None) => Disposal::Unspecified,
        }
    }
}

/// Lifecycle of one GIF stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriterState {
    /// Header not written yet.
    NotStarted,
    /// Header written, no frame yet.
    Started,
    /// First frame written along with the screen descriptor and global table.
    FirstFrameWritten,
    /// At least one frame with a local table written.
    SubsequentFrameWritten,
    /// Trailer written; the stream is closed.
    Finished,
}

/// What writing one frame produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Zero-based position of the frame in the stream.
    pub index: u64,
    /// Entries in the frame's palette.
    pub palette_len: usize,
    /// Palette entries referenced by at least one pixel.
    pub used_colors: usize,
    /// Transparent index written to the GCE, when transparency is enabled.
    pub transparent_index: Option<u8>,
    /// Compressor statistics for the image data.
    pub lzw: LzwStats,
    /// Bytes appended for this frame, all records included.
    pub bytes: usize,
}

/// Serializes GIF records into an owned [`ByteSink`].
#[derive(Debug)]
pub struct ContainerWriter {
    width: u16,
    height: u16,
    state: WriterState,
    trans_index: u8,
    palette: Option<Palette>,
    frames_written: u64,
    out: ByteSink,
}

impl ContainerWriter {
    /// Writer for a `width` x `height` stream; nothing is written until [`ContainerWriter::start`].
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            state: WriterState::NotStarted,
            trans_index: 0,
            palette: None,
            frames_written: 0,
            out: ByteSink::with_capacity(4096),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn is_first_frame(&self) -> bool {
        self.frames_written == 0
    }

    /// Palette of the most recently written frame.
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Closest used entry of the current palette, or `None` before any frame was quantized.
    pub fn find_closest(&self, color: Rgb) -> Option<u8> {
        self.palette.as_ref().map(|p| p.find_closest(color))
    }

    /// Bytes produced but not yet drained.
    pub fn pending(&self) -> &[u8] {
        self.out.as_slice()
    }

    /// Drain bytes produced since the last call.
    pub fn take_output(&mut self) -> Vec<u8> {
        self.out.take()
    }

    /// Write the `GIF89a` signature.
    pub fn start(&mut self) -> GifResult<()> {
        match self.state {
            WriterState::NotStarted => {}
            WriterState::Finished => return Err(GifError::SessionAlreadyFinished),
            _ => return Err(GifError::AlreadyStarted),
        }
        self.out.write_bytes(b"GIF89a");
        self.state = WriterState::Started;
        Ok(())
    }

    /// Quantize, index and write one RGBA frame with all of its records.
    #[tracing::instrument(level = "debug", skip(self, rgba, settings), fields(frame = self.frames_written))]
    pub fn write_frame(&mut self, rgba: &[u8], settings: &FrameSettings) -> GifResult<FrameReport> {
        match self.state {
            WriterState::NotStarted => {
                return Err(GifError::validation(
                    "stream must be started before frames are written",
                ));
            }
            WriterState::Finished => return Err(GifError::SessionAlreadyFinished),
            _ => {}
        }
        let expected = rgba_len(u32::from(self.width), u32::from(self.height));
        if rgba.len() != expected {
            return Err(GifError::InvalidFrameSize {
                expected,
                actual: rgba.len(),
            });
        }

        let start = self.out.len();
        let first = self.is_first_frame();

        let rgb = rgba_to_rgb(rgba);
        let mut q = quantize(&rgb, settings.sample_factor);
        drop(rgb);

        let transparent_index = settings.transparent.map(|color| {
            self.trans_index = q.palette.find_closest(color);
            // Fully transparent pixels take the transparent slot whatever color they quantized to.
            for (idx, px) in q.indices.iter_mut().zip(rgba.chunks_exact(4)) {
                if px[3] == 0 {
                    *idx = self.trans_index;
                }
            }
            self.trans_index
        });

        if first {
            self.write_logical_screen(&q.palette);
            q.palette.write_table(&mut self.out);
            if let Some(count) = settings.repeat.loop_count() {
                self.write_netscape_ext(count);
            }
        }

        self.write_graphic_control(settings);
        self.write_image_desc(first, &q.palette);
        if !first {
            q.palette.write_table(&mut self.out);
        }

        let lzw = lzw::encode(&q.indices, LZW_MIN_CODE_SIZE, &mut self.out);

        let report = FrameReport {
            index: self.frames_written,
            palette_len: q.palette.len(),
            used_colors: q.palette.used_count(),
            transparent_index,
            lzw,
            bytes: self.out.len() - start,
        };
        tracing::debug!(
            bytes = report.bytes,
            used_colors = report.used_colors,
            lzw_resets = lzw.resets,
            "wrote frame"
        );

        self.palette = Some(q.palette);
        self.frames_written += 1;
        self.state = if first {
            WriterState::FirstFrameWritten
        } else {
            WriterState::SubsequentFrameWritten
        };
        Ok(report)
    }

    /// Write the trailer. No records may follow.
    pub fn finish(&mut self) -> GifResult<()> {
        if self.state == WriterState::Finished {
            return Err(GifError::SessionAlreadyFinished);
        }
        self.out.write_u8(TRAILER);
        tracing::trace!("wrote trailer");
        self.state = WriterState::Finished;
        Ok(())
    }

    fn write_logical_screen(&mut self, palette: &Palette) {
        self.out.write_u16_le(self.width);
        self.out.write_u16_le(self.height);
        // Global table present, color resolution 7, unsorted, table size.
        self.out.write_u8(0x80 | 0x70 | palette.size_bits());
        self.out.write_u8(0); // background color index
        self.out.write_u8(0); // pixel aspect ratio
    }

    fn write_netscape_ext(&mut self, loop_count: u16) {
        tracing::trace!(loop_count, "wrote loop extension");
        self.out.write_u8(EXTENSION_INTRODUCER);
        self.out.write_u8(APPLICATION_LABEL);
        self.out.write_u8(11);
        self.out.write_bytes(b"NETSCAPE2.0");
        self.out.write_u8(3);
        self.out.write_u8(1);
        self.out.write_u16_le(loop_count);
        self.out.write_u8(0);
    }

    fn write_graphic_control(&mut self, settings: &FrameSettings) {
        let transparency_flag = u8::from(settings.transparent.is_some());
        let disposal = settings.effective_disposal().code() & 0x07;
        tracing::trace!(
            delay_cs = settings.delay_cs,
            disposal,
            transparent = transparency_flag,
            "graphic control"
        );

        self.out.write_u8(EXTENSION_INTRODUCER);
        self.out.write_u8(GRAPHIC_CONTROL_LABEL);
        self.out.write_u8(4);
        // Reserved bits and user-input flag stay 0.
        self.out.write_u8((disposal << 2) | transparency_flag);
        self.out.write_u16_le(settings.delay_cs);
        self.out.write_u8(self.trans_index);
        self.out.write_u8(0);
    }

    fn write_image_desc(&mut self, first: bool, palette: &Palette) {
        self.out.write_u8(IMAGE_SEPARATOR);
        self.out.write_u16_le(0);
        self.out.write_u16_le(0);
        self.out.write_u16_le(self.width);
        self.out.write_u16_le(self.height);
        if first {
            // The first frame uses the global table.
            self.out.write_u8(0);
        } else {
            // Local table, not interlaced, unsorted.
            self.out.write_u8(0x80 | palette.size_bits());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/container.rs"]
mod tests;
