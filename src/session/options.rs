use crate::foundation::core::{Disposal, Repeat, Rgb};
use crate::foundation::error::{GifError, GifResult};
use crate::quantize::{DEFAULT_SAMPLE_FACTOR, clamp_sample_factor};

/// Encoder configuration applied to a session before its next frame.
///
/// Every field has a default, so option documents only need the keys they change:
///
/// ```json
/// { "repeat": 0, "delay": 500, "quality": 10 }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderOptions {
    /// Frame delay in milliseconds, stored in hundredths of a second (rounded).
    #[serde(rename = "delay")]
    pub delay_ms: u32,
    /// Frames per second; when set it takes precedence over `delay_ms`.
    #[serde(rename = "frameRate", alias = "frame_rate")]
    pub frame_rate: Option<f64>,
    /// Disposal override; `None` keeps the transparency-dependent default.
    pub dispose: Option<Disposal>,
    /// `-1` plays once, `0` loops forever, `n` plays `n` extra times.
    pub repeat: Repeat,
    /// Color whose closest palette entry becomes transparent.
    pub transparent: Option<Rgb>,
    /// Quantizer sample factor; 1 is best, values below 1 are treated as 1.
    pub quality: i32,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            delay_ms: 0,
            frame_rate: None,
            dispose: None,
            repeat: Repeat::Never,
            transparent: None,
            quality: DEFAULT_SAMPLE_FACTOR as i32,
        }
    }
}

impl EncoderOptions {
    /// Parse an option document, rejecting unknown keys.
    pub fn from_json_str(s: &str) -> GifResult<Self> {
        let opts: Self = serde_json::from_str(s).map_err(|e| GifError::serde(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Check values serde cannot: the frame rate must be finite and positive.
    pub fn validate(&self) -> GifResult<()> {
        if let Some(fps) = self.frame_rate {
            delay_from_frame_rate(fps)?;
        }
        Ok(())
    }

    /// Frame delay in hundredths of a second.
    pub fn delay_cs(&self) -> GifResult<u16> {
        match self.frame_rate {
            Some(fps) => delay_from_frame_rate(fps),
            None => Ok(delay_from_millis(self.delay_ms)),
        }
    }

    /// Sample factor after clamping `quality` into the supported range.
    pub fn sample_factor(&self) -> u32 {
        clamp_sample_factor(self.quality)
    }
}

/// `round(ms / 10)`, saturating at the 16-bit field maximum.
pub fn delay_from_millis(ms: u32) -> u16 {
    let cs = (u64::from(ms) + 5) / 10;
    u16::try_from(cs).unwrap_or(u16::MAX)
}

/// `round(100 / fps)`, saturating at the 16-bit field maximum.
pub fn delay_from_frame_rate(fps: f64) -> GifResult<u16> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(GifError::validation(format!(
            "frame rate must be a positive number, got {fps}"
        )));
    }
    let cs = (100.0 / fps).round();
    Ok(if cs >= f64::from(u16::MAX) {
        u16::MAX
    } else {
        cs as u16
    })
}

#[cfg(test)]
#[path = "../../tests/unit/session/options.rs"]
mod tests;
