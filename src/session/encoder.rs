use crate::encode::container::{ContainerWriter, FrameReport, FrameSettings, WriterState};
use crate::encode::output::OutputSink;
use crate::foundation::core::{Disposal, Repeat, Rgb};
use crate::foundation::error::{GifError, GifResult};
use crate::quantize::clamp_sample_factor;
use crate::quantize::palette::Palette;
use crate::session::options::{EncoderOptions, delay_from_frame_rate, delay_from_millis};

/// One GIF encoding session: fixed dimensions, mutable per-frame settings, and the outputs that
/// receive bytes as they are produced.
///
/// Setters take effect from the next frame written. Frames are encoded synchronously and written
/// immediately by [`GifEncoder::add_frame`]; nothing is deferred to a later call.
///
/// Without outputs attached, produced bytes are retained and available through
/// [`GifEncoder::bytes`]. Once an output is attached, every chunk is handed to the outputs and
/// nothing is retained.
pub struct GifEncoder {
    width: u16,
    height: u16,
    settings: FrameSettings,
    writer: ContainerWriter,
    outputs: Vec<Box<dyn OutputSink>>,
    retained: Vec<u8>,
}

impl std::fmt::Debug for GifEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifEncoder")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("settings", &self.settings)
            .field("state", &self.writer.state())
            .field("outputs", &self.outputs.len())
            .field("retained", &self.retained.len())
            .finish()
    }
}

impl GifEncoder {
    /// Create a session with default options (no delay, no loop, quality 10).
    pub fn new(width: u32, height: u32) -> GifResult<Self> {
        Self::with_options(width, height, &EncoderOptions::default())
    }

    /// Create a session and apply `opts`.
    ///
    /// Width and height must be in `1..=65535`.
    pub fn with_options(width: u32, height: u32, opts: &EncoderOptions) -> GifResult<Self> {
        let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(GifError::InvalidDimensions { width, height }),
        };
        let mut enc = Self {
            width: w,
            height: h,
            settings: FrameSettings {
                delay_cs: 0,
                disposal: None,
                transparent: None,
                sample_factor: clamp_sample_factor(opts.quality),
                repeat: Repeat::Never,
            },
            writer: ContainerWriter::new(w, h),
            outputs: Vec::new(),
            retained: Vec::new(),
        };
        enc.apply_options(opts)?;
        Ok(enc)
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Settings the next frame will be written with.
    pub fn settings(&self) -> &FrameSettings {
        &self.settings
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.writer.frames_written()
    }

    /// Whether the header has been written.
    pub fn is_started(&self) -> bool {
        self.writer.state() != WriterState::NotStarted
    }

    /// Whether the trailer has been written.
    pub fn is_finished(&self) -> bool {
        self.writer.state() == WriterState::Finished
    }

    /// Apply a whole option set; fields map onto the individual setters.
    pub fn apply_options(&mut self, opts: &EncoderOptions) -> GifResult<()> {
        self.settings.delay_cs = opts.delay_cs()?;
        self.settings.disposal = opts.dispose;
        self.settings.repeat = opts.repeat;
        self.settings.transparent = opts.transparent;
        self.settings.sample_factor = opts.sample_factor();
        Ok(())
    }

    /// Attach a consumer for produced bytes. Bytes retained so far are delivered to it first.
    pub fn add_output(&mut self, output: impl OutputSink + 'static) -> GifResult<()> {
        self.add_boxed_output(Box::new(output))
    }

    /// [`GifEncoder::add_output`] for an already boxed sink.
    pub fn add_boxed_output(&mut self, mut output: Box<dyn OutputSink>) -> GifResult<()> {
        if !self.retained.is_empty() {
            output.write_chunk(&self.retained)?;
            self.retained.clear();
        }
        if self.is_finished() {
            output.finish()?;
        }
        self.outputs.push(output);
        Ok(())
    }

    /// Frame delay in milliseconds (stored as rounded hundredths).
    pub fn set_delay(&mut self, ms: u32) {
        self.settings.delay_cs = delay_from_millis(ms);
    }

    /// Frame delay from frames per second: `round(100 / fps)` hundredths.
    pub fn set_frame_rate(&mut self, fps: f64) -> GifResult<()> {
        self.settings.delay_cs = delay_from_frame_rate(fps)?;
        Ok(())
    }

    /// Override the disposal method; `None` restores the transparency-dependent default.
    pub fn set_dispose(&mut self, disposal: Option<Disposal>) {
        self.settings.disposal = disposal;
    }

    /// Loop behaviour. Only read when the first frame is written.
    pub fn set_repeat(&mut self, repeat: Repeat) {
        self.settings.repeat = repeat;
    }

    /// Color whose closest used palette entry becomes transparent in each following frame.
    pub fn set_transparent(&mut self, color: Option<Rgb>) {
        self.settings.transparent = color;
    }

    /// Quantizer sample factor; values below 1 are treated as 1.
    pub fn set_quality(&mut self, quality: i32) {
        self.settings.sample_factor = clamp_sample_factor(quality);
    }

    /// Write the `GIF89a` header.
    pub fn start(&mut self) -> GifResult<()> {
        self.writer.start()?;
        self.emit()
    }

    /// Encode and write one RGBA frame (`width * height * 4` bytes).
    ///
    /// Starts the stream first when [`GifEncoder::start`] was not called.
    pub fn add_frame(&mut self, rgba: &[u8]) -> GifResult<FrameReport> {
        if self.writer.state() == WriterState::NotStarted {
            self.writer.start()?;
        }
        let report = self.writer.write_frame(rgba, &self.settings)?;
        self.emit()?;
        Ok(report)
    }

    /// Encode an [`image::RgbaImage`] whose dimensions match the session.
    pub fn add_image(&mut self, img: &image::RgbaImage) -> GifResult<FrameReport> {
        if img.width() != self.width() || img.height() != self.height() {
            return Err(GifError::validation(format!(
                "image size mismatch: got {}x{}, expected {}x{}",
                img.width(),
                img.height(),
                self.width,
                self.height
            )));
        }
        self.add_frame(img.as_raw())
    }

    /// Write the trailer and signal completion to every output.
    pub fn finish(&mut self) -> GifResult<()> {
        if self.writer.state() == WriterState::NotStarted {
            self.writer.start()?;
        }
        self.writer.finish()?;
        let emitted = self.emit();
        // Every output is told the stream ended, even when an earlier one failed.
        let mut first_err = emitted.err();
        for out in &mut self.outputs {
            if let Err(e) = out.finish() {
                first_err.get_or_insert(e);
            }
        }
        tracing::debug!(frames = self.writer.frames_written(), "gif finished");
        first_err.map_or(Ok(()), Err)
    }

    /// Closest used entry of the latest frame's palette; `None` before any frame.
    pub fn find_closest(&self, color: Rgb) -> Option<u8> {
        self.writer.find_closest(color)
    }

    /// Palette of the most recently written frame.
    pub fn palette(&self) -> Option<&Palette> {
        self.writer.palette()
    }

    /// Bytes produced so far while no output is attached.
    pub fn bytes(&self) -> &[u8] {
        &self.retained
    }

    /// Consume the session, returning the retained bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.retained
    }

    fn emit(&mut self) -> GifResult<()> {
        let chunk = self.writer.take_output();
        if chunk.is_empty() {
            return Ok(());
        }
        if self.outputs.is_empty() {
            self.retained.extend_from_slice(&chunk);
            return Ok(());
        }
        // Every output is offered the chunk; the first failure is reported afterwards.
        let mut first_err = None;
        for (i, out) in self.outputs.iter_mut().enumerate() {
            if let Err(e) = out.write_chunk(&chunk) {
                tracing::warn!(output = i, error = %e, "output rejected chunk");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/encoder.rs"]
mod tests;
