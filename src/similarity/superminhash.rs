// SuperMinHash Jaccard estimation over token sets.
//
// Implements Otmar Ertl's SuperMinHash: every element drives a partial
// Fisher-Yates shuffle of the component indices, seeded by the element's
// hash, and each component keeps the element that produced the smallest
// value `r + j` for it. The per-element loop stops as soon as no remaining
// position can beat any current minimum, which makes the amortized cost per
// element O(1) for sets much larger than the signature.
//
// Two signatures agree at a component with probability exactly equal to
// the Jaccard index of the underlying sets. Each component only stores the
// low `bits_per_component` bits of its winner, so unequal winners collide
// with probability 2^-bits; `estimate_jaccard` removes that floor.
//
// The result is reported as a similarity: 1.0 means identical sets.

use ahash::RandomState;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::CompareError;

pub const DEFAULT_COMPONENTS: usize = 2048;
pub const DEFAULT_BITS_PER_COMPONENT: u32 = 2;

// Fixed seeds: element hashes must agree between the two sides of a
// comparison.
const HASH_SEEDS: [u64; 4] = [
    0x243F_6A88_85A3_08D3,
    0x1319_8A2E_0370_7344,
    0xA409_3822_299F_31D0,
    0x082E_FA98_EC4E_6C89,
];

/// Fixed-size similarity signature of one set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    components: Vec<u64>,
    bits_per_component: u32,
    empty: bool,
}

impl Signature {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True if the signature was built from an empty set.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

/// Signature policy: number of components and bits kept per component.
#[derive(Debug, Clone)]
pub struct SuperMinHash {
    components: usize,
    bits_per_component: u32,
    hasher: RandomState,
}

impl Default for SuperMinHash {
    fn default() -> Self {
        Self::with_parameters(DEFAULT_COMPONENTS, DEFAULT_BITS_PER_COMPONENT)
    }
}

impl SuperMinHash {
    pub fn new(components: usize, bits_per_component: u32) -> Result<Self, CompareError> {
        if components == 0 {
            return Err(CompareError::InvalidConfig(
                "SuperMinHash needs at least one component".to_string(),
            ));
        }
        if !(1..=64).contains(&bits_per_component) {
            return Err(CompareError::InvalidConfig(format!(
                "bits per component must be in 1..=64, got {bits_per_component}"
            )));
        }
        Ok(Self::with_parameters(components, bits_per_component))
    }

    fn with_parameters(components: usize, bits_per_component: u32) -> Self {
        Self {
            components,
            bits_per_component,
            hasher: RandomState::with_seeds(HASH_SEEDS[0], HASH_SEEDS[1], HASH_SEEDS[2], HASH_SEEDS[3]),
        }
    }

    pub fn components(&self) -> usize {
        self.components
    }

    pub fn bits_per_component(&self) -> u32 {
        self.bits_per_component
    }

    /// 64-bit hash of one element.
    pub fn element_hash(&self, element: &str) -> u64 {
        self.hasher.hash_one(element)
    }

    /// Build the signature of a set in one streaming pass. Duplicate
    /// elements are harmless: they replay the same permutation and cannot
    /// change any minimum.
    pub fn signature<I, S>(&self, elements: I) -> Signature
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let m = self.components;
        let mut minima = vec![f64::INFINITY; m];
        let mut winners = vec![0u64; m];
        let mut perm = vec![0usize; m];
        let mut owner = vec![usize::MAX; m];
        // histogram[k]: number of components whose minimum lies in [k, k+1),
        // with everything >= m-1 counted in the last bucket
        let mut histogram = vec![0usize; m];
        histogram[m - 1] = m;
        let mut max_useful = m - 1;
        let mut empty = true;

        for (i, element) in elements.into_iter().enumerate() {
            empty = false;
            let hash = self.element_hash(element.as_ref());
            let mut rng = SmallRng::seed_from_u64(hash);

            let mut j = 0;
            while j <= max_useful {
                let r: f64 = rng.random();
                let k = rng.random_range(j..m);

                if owner[j] != i {
                    owner[j] = i;
                    perm[j] = j;
                }
                if owner[k] != i {
                    owner[k] = i;
                    perm[k] = k;
                }
                perm.swap(j, k);

                let slot = perm[j];
                let value = r + j as f64;
                if value < minima[slot] {
                    // `as usize` saturates, so an untouched (infinite) slot lands in m-1
                    let previous = (minima[slot].floor() as usize).min(m - 1);
                    minima[slot] = value;
                    winners[slot] = hash;
                    if j < previous {
                        histogram[previous] -= 1;
                        histogram[j] += 1;
                        while histogram[max_useful] == 0 {
                            max_useful -= 1;
                        }
                    }
                }
                j += 1;
            }
        }

        let mask = if self.bits_per_component == 64 {
            u64::MAX
        } else {
            (1u64 << self.bits_per_component) - 1
        };
        let components = winners
            .iter()
            .enumerate()
            .map(|(slot, &winner)| mix64(winner ^ (slot as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)) & mask)
            .collect();

        Signature {
            components,
            bits_per_component: self.bits_per_component,
            empty,
        }
    }

    /// Fraction of components on which two signatures agree.
    pub fn fraction_equal(&self, a: &Signature, b: &Signature) -> Result<f64, CompareError> {
        if a.len() != b.len() || a.bits_per_component != b.bits_per_component {
            return Err(CompareError::InvalidConfig(format!(
                "signatures built with different parameters ({}x{} vs {}x{})",
                a.len(),
                a.bits_per_component,
                b.len(),
                b.bits_per_component
            )));
        }
        let equal = a
            .components
            .iter()
            .zip(&b.components)
            .filter(|(x, y)| x == y)
            .count();
        Ok(equal as f64 / a.len() as f64)
    }

    /// Bias-corrected Jaccard similarity estimate in [0, 1]. Either set
    /// being empty gives 0.0.
    pub fn estimate_jaccard(&self, a: &Signature, b: &Signature) -> Result<f64, CompareError> {
        let fraction = self.fraction_equal(a, b)?;
        if a.is_empty() || b.is_empty() {
            return Ok(0.0);
        }
        Ok(correct_for_collisions(fraction, self.bits_per_component))
    }

    /// Convenience: signature both sets and estimate their similarity.
    pub fn similarity<I, J, S, T>(&self, a: I, b: J) -> f64
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let sig_a = self.signature(a);
        let sig_b = self.signature(b);
        // Same policy on both sides, so parameters always match
        self.estimate_jaccard(&sig_a, &sig_b).unwrap_or(0.0)
    }
}

/// Remove the chance agreement floor of `2^-bits` from a raw agreement
/// fraction: `(fraction - 2^-bits) / (1 - 2^-bits)`, clamped to [0, 1].
pub fn correct_for_collisions(fraction: f64, bits_per_component: u32) -> f64 {
    let floor = 2f64.powi(-(bits_per_component as i32));
    ((fraction - floor) / (1.0 - floor)).clamp(0.0, 1.0)
}

/// MurmurHash3 64-bit finalizer.
fn mix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    x ^= x >> 33;
    x = x.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    x ^= x >> 33;
    x
}
