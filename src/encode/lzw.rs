//! Variable-width LZW compression of palette indices into GIF image-data sub-blocks.

use crate::foundation::bytes::ByteSink;

/// Widest code GIF allows.
const MAX_BITS: u32 = 12;
/// Dictionary ceiling (`1 << MAX_BITS`); reaching it forces a clear code.
pub const MAX_DICT_ENTRIES: u32 = 1 << MAX_BITS;
/// Open-addressing table size (prime, about 80% occupancy at 4096 entries).
const HSIZE: usize = 5003;
/// Data bytes per sub-block before it is flushed.
const BLOCK_LEN: usize = 254;

/// Counters gathered while compressing one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LzwStats {
    /// Codes written, control codes included.
    pub codes: usize,
    /// Clear codes emitted after the leading one because the dictionary filled up.
    pub resets: usize,
    /// Highest dictionary size reached (root and control codes included).
    pub peak_entries: u32,
    /// Bytes appended to the sink, framing included.
    pub bytes: usize,
}

/// LSB-first code packer that groups output bytes into length-prefixed sub-blocks.
struct CodeWriter<'a> {
    out: &'a mut ByteSink,
    accum: u32,
    bits: u32,
    block: [u8; BLOCK_LEN],
    block_len: usize,
}

impl<'a> CodeWriter<'a> {
    fn new(out: &'a mut ByteSink) -> Self {
        Self {
            out,
            accum: 0,
            bits: 0,
            block: [0; BLOCK_LEN],
            block_len: 0,
        }
    }

    fn write_code(&mut self, code: u32, width: u32) {
        self.accum &= (1u32 << self.bits) - 1;
        self.accum |= code << self.bits;
        self.bits += width;
        while self.bits >= 8 {
            self.push_byte((self.accum & 0xFF) as u8);
            self.accum >>= 8;
            self.bits -= 8;
        }
    }

    fn push_byte(&mut self, b: u8) {
        self.block[self.block_len] = b;
        self.block_len += 1;
        if self.block_len >= BLOCK_LEN {
            self.flush_block();
        }
    }

    fn flush_block(&mut self) {
        if self.block_len > 0 {
            self.out.write_u8(self.block_len as u8);
            self.out.write_bytes(&self.block[..self.block_len]);
            self.block_len = 0;
        }
    }

    /// Pad the final partial byte with zero bits and flush the pending sub-block.
    fn finish(&mut self) {
        while self.bits > 0 {
            self.push_byte((self.accum & 0xFF) as u8);
            self.accum >>= 8;
            self.bits = self.bits.saturating_sub(8);
        }
        self.flush_block();
    }
}

/// Dictionary and code-width state for one compression run.
struct Compressor {
    htab: Vec<i32>,
    codetab: Vec<u16>,
    init_bits: u32,
    n_bits: u32,
    maxcode: u32,
    clear_code: u32,
    eoi_code: u32,
    free_ent: u32,
    clear_flag: bool,
    stats: LzwStats,
}

impl Compressor {
    fn new(min_code_size: u32) -> Self {
        let init_bits = min_code_size + 1;
        let clear_code = 1 << min_code_size;
        Self {
            htab: vec![-1; HSIZE],
            codetab: vec![0; HSIZE],
            init_bits,
            n_bits: init_bits,
            maxcode: max_code(init_bits),
            clear_code,
            eoi_code: clear_code + 1,
            free_ent: clear_code + 2,
            clear_flag: false,
            stats: LzwStats::default(),
        }
    }

    fn output(&mut self, w: &mut CodeWriter<'_>, code: u32) {
        w.write_code(code, self.n_bits);
        self.stats.codes += 1;

        // Widen once the next code would not fit, or drop back after a clear.
        if self.free_ent > self.maxcode || self.clear_flag {
            if self.clear_flag {
                self.n_bits = self.init_bits;
                self.maxcode = max_code(self.n_bits);
                self.clear_flag = false;
            } else {
                self.n_bits += 1;
                self.maxcode = if self.n_bits == MAX_BITS {
                    MAX_DICT_ENTRIES
                } else {
                    max_code(self.n_bits)
                };
            }
        }

        if code == self.eoi_code {
            w.finish();
        }
    }

    fn clear_block(&mut self, w: &mut CodeWriter<'_>) {
        self.htab.fill(-1);
        self.free_ent = self.clear_code + 2;
        self.clear_flag = true;
        self.stats.resets += 1;
        self.output(w, self.clear_code);
    }

    fn compress(&mut self, w: &mut CodeWriter<'_>, indices: &[u8]) {
        let mut hshift = 0;
        let mut fcode = HSIZE;
        while fcode < 65536 {
            fcode *= 2;
            hshift += 1;
        }
        let hshift = 8 - hshift;

        self.output(w, self.clear_code);

        let Some((&first, rest)) = indices.split_first() else {
            self.output(w, self.eoi_code);
            return;
        };
        let mut ent = u32::from(first);

        'outer: for &c in rest {
            let c = u32::from(c);
            let fcode = ((c << MAX_BITS) + ent) as i32;
            let mut i = ((c << hshift) ^ ent) as usize;

            if self.htab[i] == fcode {
                ent = u32::from(self.codetab[i]);
                continue;
            } else if self.htab[i] >= 0 {
                let disp = if i == 0 { 1 } else { HSIZE - i };
                loop {
                    i = if i >= disp { i - disp } else { i + HSIZE - disp };
                    if self.htab[i] == fcode {
                        ent = u32::from(self.codetab[i]);
                        continue 'outer;
                    }
                    if self.htab[i] < 0 {
                        break;
                    }
                }
            }

            self.output(w, ent);
            ent = c;
            if self.free_ent < MAX_DICT_ENTRIES {
                self.codetab[i] = self.free_ent as u16;
                self.free_ent += 1;
                self.htab[i] = fcode;
                self.stats.peak_entries = self.stats.peak_entries.max(self.free_ent);
            } else {
                self.clear_block(w);
            }
        }

        self.output(w, ent);
        self.output(w, self.eoi_code);
    }
}

fn max_code(bits: u32) -> u32 {
    (1 << bits) - 1
}

/// Compress `indices` (row-major palette indices) as GIF image data.
///
/// Appends the LZW minimum code size byte, the packed codes in sub-blocks of at most 254 bytes,
/// and the zero-length block terminator. `min_code_size` is clamped into 2..=8.
///
/// Every index must be below `1 << min_code_size`; larger values collide with the clear and
/// end-of-information codes.
pub(crate) fn encode(indices: &[u8], min_code_size: u8, out: &mut ByteSink) -> LzwStats {
    let min_code_size = u32::from(min_code_size).clamp(2, 8);
    debug_assert!(
        indices.iter().all(|&i| u32::from(i) < 1 << min_code_size),
        "index out of range for min code size {min_code_size}"
    );
    let start = out.len();
    out.write_u8(min_code_size as u8);

    let mut compressor = Compressor::new(min_code_size);
    compressor.stats.peak_entries = compressor.free_ent;
    {
        let mut writer = CodeWriter::new(out);
        compressor.compress(&mut writer, indices);
    }
    out.write_u8(0);

    let mut stats = compressor.stats;
    stats.bytes = out.len() - start;
    tracing::trace!(
        codes = stats.codes,
        resets = stats.resets,
        bytes = stats.bytes,
        "lzw frame"
    );
    stats
}

#[cfg(test)]
#[path = "../../tests/unit/encode/lzw.rs"]
mod tests;
