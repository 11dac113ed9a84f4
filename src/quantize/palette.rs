use crate::foundation::bytes::ByteSink;
use crate::foundation::core::Rgb;

/// Per-frame color table plus the mask of slots referenced by at least one pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
    used: Vec<bool>,
}

impl Palette {
    /// Build a palette with an all-clear usage mask. `colors` must hold 1..=256 entries.
    pub fn new(colors: Vec<Rgb>) -> Self {
        debug_assert!(!colors.is_empty() && colors.len() <= 256);
        let used = vec![false; colors.len()];
        Self { colors, used }
    }

    /// Number of colors, before padding.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette has no colors.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colors in index order.
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Color at `index`, if the palette has that many entries.
    pub fn get(&self, index: u8) -> Option<Rgb> {
        self.colors.get(usize::from(index)).copied()
    }

    /// Number of table entries written to the stream: the palette length rounded up to a power of
    /// two, and at least 2 since the GIF size field cannot express a single entry.
    pub fn capacity(&self) -> usize {
        self.colors.len().next_power_of_two().max(2)
    }

    /// The 3-bit size field shared by the screen and image descriptors: `log2(capacity) - 1`.
    pub fn size_bits(&self) -> u8 {
        (self.capacity().trailing_zeros() - 1) as u8
    }

    /// Whether any pixel of the frame was mapped to `index`.
    pub fn is_used(&self, index: u8) -> bool {
        self.used.get(usize::from(index)).copied().unwrap_or(false)
    }

    /// Number of entries referenced by the frame.
    pub fn used_count(&self) -> usize {
        self.used.iter().filter(|u| **u).count()
    }

    pub(crate) fn mark_used(&mut self, index: u8) {
        if let Some(slot) = self.used.get_mut(usize::from(index)) {
            *slot = true;
        }
    }

    /// Index of the used entry closest to `color` by squared RGB distance. Ties keep the lowest
    /// index; with no used entries the result is 0.
    pub fn find_closest(&self, color: Rgb) -> u8 {
        let mut best = 0usize;
        let mut best_d = 256 * 256 * 256;
        for (i, c) in self.colors.iter().enumerate() {
            let d = c.distance_sq(color);
            if self.used[i] && d < best_d {
                best_d = d;
                best = i;
            }
        }
        best as u8
    }

    /// Serialize as a GIF color table, zero-padded up to [`Palette::capacity`].
    pub(crate) fn write_table(&self, out: &mut ByteSink) {
        for c in &self.colors {
            out.write_bytes(&[c.r, c.g, c.b]);
        }
        for _ in self.colors.len()..self.capacity() {
            out.write_bytes(&[0, 0, 0]);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/quantize/palette.rs"]
mod tests;
