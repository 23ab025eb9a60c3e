use std::f64::consts::TAU;

use crate::config::ConfigError;

/// Entries in the reference sine table.
pub const SINE_TABLE_LEN: usize = 1 << 16;

/// Peak amplitude of the reference sine table.
pub const SINE_AMPLITUDE: i32 = (1 << 15) - 1;

/// One period of a sine wave, read-only once built.
#[derive(Clone, Debug)]
pub struct SineTable {
    samples: Box<[i32]>,
}

impl SineTable {
    /// `table[k] = round(32767 * sin(2 * pi * k / len))`
    pub fn new(len: usize) -> Result<Self, ConfigError> {
        Self::from_samples(one_period(len))
    }

    pub fn reference() -> Self {
        Self {
            samples: one_period(SINE_TABLE_LEN).into_boxed_slice(),
        }
    }

    /// Wrap an externally supplied table. Values are not range checked here;
    /// the sink saturates anything outside 16 bits.
    pub fn from_samples(samples: Vec<i32>) -> Result<Self, ConfigError> {
        if samples.is_empty() {
            return Err(ConfigError::EmptyTable);
        }

        Ok(Self {
            samples: samples.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn get(&self, k: usize) -> i32 {
        self.samples[k]
    }
}

fn one_period(len: usize) -> Vec<i32> {
    (0..len)
        .map(|k| {
            let w = TAU * k as f64 / len as f64;
            (f64::from(SINE_AMPLITUDE) * w.sin()).round() as i32
        })
        .collect()
}
