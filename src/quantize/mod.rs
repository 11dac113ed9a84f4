//! Color quantization: full-color frames to a 256-entry palette plus one index per pixel.

/// NeuQuant self-organizing-map trainer and lookup.
pub mod neuquant;
/// Palette type with usage tracking and color-table serialization.
pub mod palette;

use crate::foundation::core::Rgb;
use neuquant::NeuQuant;
use palette::Palette;

/// Slowest, most accurate sample factor: every pixel trains the network.
pub const MIN_SAMPLE_FACTOR: u32 = 1;
/// Sparsest sampling accepted.
pub const MAX_SAMPLE_FACTOR: u32 = 30;
/// Default sample factor; good colors at reasonable speed.
pub const DEFAULT_SAMPLE_FACTOR: u32 = 10;

/// Result of quantizing one frame.
#[derive(Clone, Debug)]
pub struct Quantized {
    /// Trained palette with its usage mask.
    pub palette: Palette,
    /// One palette index per pixel, row-major.
    pub indices: Vec<u8>,
}

impl Quantized {
    /// Sum over pixels of the squared RGB distance to the assigned palette color.
    pub fn squared_error(&self, rgb: &[u8]) -> u64 {
        rgb.chunks_exact(3)
            .zip(&self.indices)
            .map(|(px, &idx)| {
                let c = self.palette.get(idx).unwrap_or(Rgb::BLACK);
                u64::from(c.distance_sq(Rgb::new(px[0], px[1], px[2])))
            })
            .sum()
    }
}

/// Clamp a requested quality into the supported sample-factor range.
pub fn clamp_sample_factor(quality: i32) -> u32 {
    quality.clamp(MIN_SAMPLE_FACTOR as i32, MAX_SAMPLE_FACTOR as i32) as u32
}

/// Train a palette on `rgb` (packed triples) and map every pixel to it.
#[tracing::instrument(level = "debug", skip(rgb), fields(pixels = rgb.len() / 3))]
pub fn quantize(rgb: &[u8], sample_factor: u32) -> Quantized {
    let nq = NeuQuant::train(rgb, sample_factor);
    let colors = nq
        .color_map()
        .into_iter()
        .map(|[r, g, b]| Rgb::new(r, g, b))
        .collect();
    let mut palette = Palette::new(colors);

    let indices: Vec<u8> = rgb
        .chunks_exact(3)
        .map(|px| {
            let idx = nq.lookup(px[0], px[1], px[2]);
            palette.mark_used(idx);
            idx
        })
        .collect();

    tracing::debug!(
        palette_len = palette.len(),
        used = palette.used_count(),
        "quantized frame"
    );
    Quantized { palette, indices }
}

/// Strip alpha from an RGBA buffer.
pub fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    rgb
}

#[cfg(test)]
#[path = "../../tests/unit/quantize/mod.rs"]
mod tests;
