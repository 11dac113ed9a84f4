/// Append-only byte buffer the container writer serializes GIF records into.
///
/// Produced bytes stay in the buffer until the owning session drains them to its outputs.
#[derive(Debug, Default, Clone)]
pub struct ByteSink {
    data: Vec<u8>,
}

impl ByteSink {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    /// Write a 16-bit value little-endian, as every GIF multi-byte field is stored.
    #[inline]
    pub fn write_u16_le(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes written and not yet taken.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Move all pending bytes out, leaving the buffer empty but keeping its allocation.
    pub fn take(&mut self) -> Vec<u8> {
        let cap = self.data.capacity();
        std::mem::replace(&mut self.data, Vec::with_capacity(cap))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/bytes.rs"]
mod tests;
