use crate::encode::output::OutputSink;
use crate::foundation::core::{FrameIndex, FrameRgba};
use crate::foundation::error::{GifError, GifResult};
use crate::session::encoder::GifEncoder;
use crate::session::options::EncoderOptions;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Frames per second of the source; overrides the sink's configured delay when set.
    pub frame_rate: Option<f64>,
}

/// Sink contract for consuming frames in order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> GifResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> GifResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> GifResult<()>;
}

/// Frame sink that encodes pushed frames into a GIF: `begin` writes the header, each push writes
/// a frame, `end` writes the trailer.
pub struct GifSink {
    opts: EncoderOptions,
    pending_outputs: Vec<Box<dyn OutputSink>>,
    encoder: Option<GifEncoder>,
    last_idx: Option<FrameIndex>,
}

impl GifSink {
    /// Sink that will build its encoder from `opts` when `begin` runs.
    pub fn new(opts: EncoderOptions) -> Self {
        Self {
            opts,
            pending_outputs: Vec::new(),
            encoder: None,
            last_idx: None,
        }
    }

    /// Route encoded bytes to `output`; without outputs the bytes stay in the encoder.
    pub fn with_output(mut self, output: impl OutputSink + 'static) -> Self {
        self.pending_outputs.push(Box::new(output));
        self
    }

    /// The underlying encoder, once `begin` has run.
    pub fn encoder(&self) -> Option<&GifEncoder> {
        self.encoder.as_ref()
    }

    /// Take the encoder, e.g. to read retained bytes after `end`.
    pub fn into_encoder(self) -> Option<GifEncoder> {
        self.encoder
    }

    fn encoder_mut(&mut self) -> GifResult<&mut GifEncoder> {
        self.encoder
            .as_mut()
            .ok_or_else(|| GifError::validation("gif sink used before begin"))
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> GifResult<()> {
        if self.encoder.is_some() {
            return Err(GifError::AlreadyStarted);
        }
        let mut enc = GifEncoder::with_options(cfg.width, cfg.height, &self.opts)?;
        if let Some(fps) = cfg.frame_rate {
            enc.set_frame_rate(fps)?;
        }
        for out in self.pending_outputs.drain(..) {
            enc.add_boxed_output(out)?;
        }
        enc.start()?;
        self.encoder = Some(enc);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> GifResult<()> {
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(GifError::validation(format!(
                "frames must arrive in increasing order: {} after {}",
                idx.0, last.0
            )));
        }
        let enc = self.encoder_mut()?;
        if frame.width != enc.width() || frame.height != enc.height() {
            return Err(GifError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width,
                frame.height,
                enc.width(),
                enc.height()
            )));
        }
        enc.add_frame(&frame.data)?;
        self.last_idx = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> GifResult<()> {
        self.encoder_mut()?.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
