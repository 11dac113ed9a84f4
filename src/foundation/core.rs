use crate::foundation::error::{GifError, GifResult};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Zero-based frame position in a stream.
pub struct FrameIndex(pub u64);

/// Straight (non-premultiplied) 24-bit RGB color.
///
/// Serialized as a `0xRRGGBB` integer so option documents can say `"transparent": 16711680`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb {
    /// `0x000000`.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value; bits above 24 are ignored.
    pub const fn from_u32(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xFF) as u8,
            g: ((v >> 8) & 0xFF) as u8,
            b: (v & 0xFF) as u8,
        }
    }

    /// Pack as `0xRRGGBB`.
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Squared Euclidean distance in RGB space.
    pub fn distance_sq(self, other: Rgb) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl From<u32> for Rgb {
    fn from(v: u32) -> Self {
        Self::from_u32(v)
    }
}

impl From<Rgb> for u32 {
    fn from(c: Rgb) -> Self {
        c.to_u32()
    }
}

/// Loop behaviour recorded in the Netscape application extension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Repeat {
    /// Play once; no loop extension is written.
    #[default]
    Never,
    /// Loop forever (loop count 0).
    Infinite,
    /// Play `n` extra times after the first pass.
    Finite(u16),
}

impl Repeat {
    /// Loop count stored in the extension, or `None` when no extension is written.
    pub fn loop_count(self) -> Option<u16> {
        match self {
            Self::Never => None,
            Self::Infinite => Some(0),
            Self::Finite(n) => Some(n),
        }
    }
}

impl TryFrom<i32> for Repeat {
    type Error = GifError;

    fn try_from(v: i32) -> GifResult<Self> {
        match v {
            v if v < 0 => Ok(Self::Never),
            0 => Ok(Self::Infinite),
            v => u16::try_from(v).map(Self::Finite).map_err(|_| {
                GifError::validation(format!("repeat count {v} exceeds 65535"))
            }),
        }
    }
}

impl From<Repeat> for i32 {
    fn from(r: Repeat) -> Self {
        match r {
            Repeat::Never => -1,
            Repeat::Infinite => 0,
            Repeat::Finite(n) => i32::from(n),
        }
    }
}

/// GIF disposal method written into the Graphic Control Extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Disposal {
    /// No disposal specified.
    Unspecified = 0,
    /// Leave the frame in place.
    Keep = 1,
    /// Restore the area to the background color.
    Background = 2,
    /// Restore the area to the previous frame.
    Previous = 3,
}

impl Disposal {
    /// The 3-bit code stored in the Graphic Control Extension.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Disposal {
    type Error = GifError;

    fn try_from(v: u8) -> GifResult<Self> {
        match v {
            0 => Ok(Self::Unspecified),
            1 => Ok(Self::Keep),
            2 => Ok(Self::Background),
            3 => Ok(Self::Previous),
            v => Err(GifError::validation(format!(
                "disposal code must be 0..=3, got {v}"
            ))),
        }
    }
}

impl From<Disposal> for u8 {
    fn from(d: Disposal) -> Self {
        d.code()
    }
}

/// Straight-alpha RGBA8 frame, row-major with no row padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes, RGBA order.
    pub data: Vec<u8>,
}

impl FrameRgba {
    /// Wrap `data`, checking it holds exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> GifResult<Self> {
        let expected = rgba_len(width, height);
        if data.len() != expected {
            return Err(GifError::InvalidFrameSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame filled with a single opaque color.
    pub fn solid(width: u32, height: u32, color: Rgb) -> Self {
        let n = rgba_len(width, height) / 4;
        let mut data = Vec::with_capacity(n * 4);
        for _ in 0..n {
            data.extend_from_slice(&[color.r, color.g, color.b, 0xFF]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Copy an `image` buffer into a frame.
    pub fn from_rgba_image(img: &image::RgbaImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            data: img.as_raw().clone(),
        }
    }
}

pub(crate) fn rgba_len(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * 4
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
