//! NeuQuant neural-net color quantization (Anthony Dekker, 1994).
//!
//! A one-dimensional Kohonen self-organizing map over RGB space. Constants and the prime-stride
//! traversal follow Dekker's published algorithm. Identical input always trains an identical
//! network.

const NCYCLES: usize = 100;
pub(crate) const NETSIZE: usize = 256;
const MAXNETPOS: usize = NETSIZE - 1;

const NETBIASSHIFT: u32 = 4;
const INTBIASSHIFT: u32 = 16;
const INTBIAS: i32 = 1 << INTBIASSHIFT;
const GAMMASHIFT: u32 = 10;
const BETASHIFT: u32 = 10;
const BETA: i32 = INTBIAS >> BETASHIFT;
const BETAGAMMA: i32 = INTBIAS << (GAMMASHIFT - BETASHIFT);

const INITRAD: i32 = (NETSIZE >> 3) as i32;
const RADIUSBIASSHIFT: u32 = 6;
const RADIUSBIAS: i32 = 1 << RADIUSBIASSHIFT;
const INITRADIUS: i32 = INITRAD * RADIUSBIAS;
const RADIUSDEC: f64 = 30.0;

const ALPHABIASSHIFT: u32 = 10;
const INITALPHA: f64 = (1 << ALPHABIASSHIFT) as f64;

const RADBIASSHIFT: u32 = 8;
const RADBIAS: i32 = 1 << RADBIASSHIFT;
const ALPHARADBIAS: f64 = (1 << (ALPHABIASSHIFT + RADBIASSHIFT)) as f64;

const PRIME1: usize = 499;
const PRIME2: usize = 491;
const PRIME3: usize = 487;
const PRIME4: usize = 503;
const MINPICTUREBYTES: usize = 3 * PRIME4;

/// Trained network ready for palette extraction and nearest-color lookup.
#[derive(Debug, Clone)]
pub struct NeuQuant {
    /// Neurons sorted by green: `[r, g, b, original_position]`.
    network: Vec<[i32; 4]>,
    /// First network slot to probe for each green value.
    netindex: [usize; 256],
}

/// Learning-phase state. Neuron channels stay fractional until `unbias`.
struct Learner {
    network: Vec<[f64; 3]>,
    bias: [i32; NETSIZE],
    freq: [i32; NETSIZE],
    radpower: [i32; NETSIZE >> 3],
}

impl NeuQuant {
    /// Train a 256-color network on packed RGB bytes, sampling every `sample_factor`-th pixel.
    ///
    /// `sample_factor` is expected in `1..=30`; callers clamp.
    pub fn train(rgb: &[u8], sample_factor: u32) -> Self {
        let mut learner = Learner::new();
        learner.learn(rgb, sample_factor.max(1));
        let mut network = learner.unbias();
        let netindex = build_index(&mut network);
        Self { network, netindex }
    }

    /// Palette in original neuron order; position `i` is the color of index `i`.
    pub fn color_map(&self) -> Vec<[u8; 3]> {
        let mut map = vec![[0u8; 3]; NETSIZE];
        for n in &self.network {
            map[n[3] as usize] = [n[0] as u8, n[1] as u8, n[2] as u8];
        }
        map
    }

    /// Nearest palette index under Manhattan distance, searching outward from the green index.
    pub fn lookup(&self, r: u8, g: u8, b: u8) -> u8 {
        let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
        let mut bestd = 1000;
        let mut best = 0;
        let mut i = self.netindex[g as usize] as isize;
        let mut j = i - 1;
        let size = NETSIZE as isize;

        while i < size || j >= 0 {
            if i < size {
                let p = self.network[i as usize];
                let mut dist = p[1] - g;
                if dist >= bestd {
                    i = size;
                } else {
                    i += 1;
                    dist = dist.abs() + (p[0] - r).abs();
                    if dist < bestd {
                        dist += (p[2] - b).abs();
                        if dist < bestd {
                            bestd = dist;
                            best = p[3];
                        }
                    }
                }
            }
            if j >= 0 {
                let p = self.network[j as usize];
                let mut dist = g - p[1];
                if dist >= bestd {
                    j = -1;
                } else {
                    j -= 1;
                    dist = dist.abs() + (p[0] - r).abs();
                    if dist < bestd {
                        dist += (p[2] - b).abs();
                        if dist < bestd {
                            bestd = dist;
                            best = p[3];
                        }
                    }
                }
            }
        }
        best as u8
    }
}

impl Learner {
    fn new() -> Self {
        let network = (0..NETSIZE)
            .map(|i| {
                let v = ((i << (NETBIASSHIFT + 8)) / NETSIZE) as f64;
                [v, v, v]
            })
            .collect();
        Self {
            network,
            bias: [0; NETSIZE],
            freq: [INTBIAS / NETSIZE as i32; NETSIZE],
            radpower: [0; NETSIZE >> 3],
        }
    }

    fn learn(&mut self, rgb: &[u8], sample_factor: u32) {
        let lengthcount = rgb.len();
        let alphadec = 30.0 + f64::from(sample_factor - 1) / 3.0;
        let samplepixels = lengthcount as f64 / f64::from(3 * sample_factor);
        let mut delta = (samplepixels / NCYCLES as f64) as u64;
        let mut alpha = INITALPHA;
        let mut radius = f64::from(INITRADIUS);

        let mut rad = radius_to_rad(radius);
        self.update_radpower(rad, alpha);

        let step = if lengthcount < MINPICTUREBYTES {
            3
        } else if lengthcount % PRIME1 != 0 {
            3 * PRIME1
        } else if lengthcount % PRIME2 != 0 {
            3 * PRIME2
        } else if lengthcount % PRIME3 != 0 {
            3 * PRIME3
        } else {
            3 * PRIME4
        };

        let mut pix = 0usize;
        let mut i = 0u64;
        while (i as f64) < samplepixels {
            let r = f64::from(i32::from(rgb[pix]) << NETBIASSHIFT);
            let g = f64::from(i32::from(rgb[pix + 1]) << NETBIASSHIFT);
            let b = f64::from(i32::from(rgb[pix + 2]) << NETBIASSHIFT);

            let j = self.contest(r, g, b);
            self.alter_single(alpha, j, r, g, b);
            if rad != 0 {
                self.alter_neighbours(rad, j, r, g, b);
            }

            pix += step;
            if pix >= lengthcount {
                pix -= lengthcount;
            }

            i += 1;
            if delta == 0 {
                delta = 1;
            }
            if i % delta == 0 {
                alpha -= alpha / alphadec;
                radius -= radius / RADIUSDEC;
                rad = radius_to_rad(radius);
                self.update_radpower(rad, alpha);
            }
        }
    }

    fn update_radpower(&mut self, rad: i32, alpha: f64) {
        let rad_sq = f64::from(rad * rad);
        for k in 0..rad {
            let w = f64::from((rad * rad - k * k) * RADBIAS) / rad_sq;
            self.radpower[k as usize] = (alpha * w) as i32;
        }
    }

    /// Pick the learner: the neuron with the smallest biased distance. The unbiased winner gains
    /// frequency so over-used neurons lose future contests.
    fn contest(&mut self, r: f64, g: f64, b: f64) -> usize {
        let mut bestd = f64::from(i32::MAX);
        let mut bestbiasd = bestd;
        let mut bestpos = 0;
        let mut bestbiaspos = 0;

        for i in 0..NETSIZE {
            let n = self.network[i];
            let dist = (n[0] - r).abs() + (n[1] - g).abs() + (n[2] - b).abs();
            if dist < bestd {
                bestd = dist;
                bestpos = i;
            }
            let biasdist = dist - f64::from(self.bias[i] >> (INTBIASSHIFT - NETBIASSHIFT));
            if biasdist < bestbiasd {
                bestbiasd = biasdist;
                bestbiaspos = i;
            }
            let betafreq = self.freq[i] >> BETASHIFT;
            self.freq[i] = self.freq[i].wrapping_sub(betafreq);
            self.bias[i] = self.bias[i].wrapping_add(betafreq << GAMMASHIFT);
        }
        self.freq[bestpos] = self.freq[bestpos].wrapping_add(BETA);
        self.bias[bestpos] = self.bias[bestpos].wrapping_sub(BETAGAMMA);
        bestbiaspos
    }

    fn alter_single(&mut self, alpha: f64, i: usize, r: f64, g: f64, b: f64) {
        let n = &mut self.network[i];
        n[0] -= (alpha * (n[0] - r)) / INITALPHA;
        n[1] -= (alpha * (n[1] - g)) / INITALPHA;
        n[2] -= (alpha * (n[2] - b)) / INITALPHA;
    }

    fn alter_neighbours(&mut self, rad: i32, i: usize, r: f64, g: f64, b: f64) {
        let i = i as i32;
        // Lower bound is |i - rad|, not a clamp at -1.
        let lo = (i - rad).abs();
        let hi = (i + rad).min(NETSIZE as i32);
        let mut j = i + 1;
        let mut k = i - 1;
        let mut m = 1usize;

        while j < hi || k > lo {
            let a = f64::from(self.radpower[m]);
            m += 1;
            if j < hi {
                let p = &mut self.network[j as usize];
                p[0] -= (a * (p[0] - r)) / ALPHARADBIAS;
                p[1] -= (a * (p[1] - g)) / ALPHARADBIAS;
                p[2] -= (a * (p[2] - b)) / ALPHARADBIAS;
                j += 1;
            }
            if k > lo {
                let p = &mut self.network[k as usize];
                p[0] -= (a * (p[0] - r)) / ALPHARADBIAS;
                p[1] -= (a * (p[1] - g)) / ALPHARADBIAS;
                p[2] -= (a * (p[2] - b)) / ALPHARADBIAS;
                k -= 1;
            }
        }
    }

    /// Drop the 4 bits of learning precision and record each neuron's position.
    fn unbias(self) -> Vec<[i32; 4]> {
        self.network
            .iter()
            .enumerate()
            .map(|(i, n)| {
                [
                    (n[0] as i32) >> NETBIASSHIFT,
                    (n[1] as i32) >> NETBIASSHIFT,
                    (n[2] as i32) >> NETBIASSHIFT,
                    i as i32,
                ]
            })
            .collect()
    }
}

fn radius_to_rad(radius: f64) -> i32 {
    let rad = (radius as i32) >> RADIUSBIASSHIFT;
    if rad <= 1 { 0 } else { rad }
}

/// Selection-sort the network on green and record where each green value starts.
fn build_index(network: &mut [[i32; 4]]) -> [usize; 256] {
    let mut netindex = [0usize; 256];
    let mut previouscol = 0usize;
    let mut startpos = 0usize;

    for i in 0..NETSIZE {
        let mut smallpos = i;
        let mut smallval = network[i][1];
        for (j, q) in network.iter().enumerate().skip(i + 1) {
            if q[1] < smallval {
                smallpos = j;
                smallval = q[1];
            }
        }
        if i != smallpos {
            network.swap(i, smallpos);
        }
        let smallval = smallval.clamp(0, 255) as usize;
        if smallval != previouscol {
            netindex[previouscol] = (startpos + i) >> 1;
            for slot in netindex.iter_mut().take(smallval).skip(previouscol + 1) {
                *slot = i;
            }
            previouscol = smallval;
            startpos = i;
        }
    }
    netindex[previouscol] = (startpos + MAXNETPOS) >> 1;
    for slot in netindex.iter_mut().skip(previouscol + 1) {
        *slot = MAXNETPOS;
    }
    netindex
}

#[cfg(test)]
#[path = "../../tests/unit/quantize/neuquant.rs"]
mod tests;
