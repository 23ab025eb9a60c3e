//! Device-agnostic half of the streaming sink.
//!
//! The audio callback hands over a buffer of `N` device samples; the
//! filler pulls up to `N` amplitudes from a [`SampleSource`], converts and
//! saturates them, and pads with silence once the source has ended.

use crate::codec::pcm::{clamp_to_i16, PcmSample};
use crate::generator::{Pull, SampleSource};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FillStatus {
    /// Buffer is all signal; keep the stream running.
    Continue,
    /// The source ended at or before this buffer. Anything after the last
    /// signal sample is silence.
    Finished,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FillStats {
    pub blocks: u64,
    pub samples: u64,
    pub padded: u64,
    /// Amplitudes outside 16 bits. Non-zero means a mis-scaled table.
    pub clamped: u64,
}

pub struct BlockFiller<S> {
    source: S,
    finished: bool,
    stats: FillStats,
}

impl<S: SampleSource> BlockFiller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            finished: false,
            stats: FillStats::default(),
        }
    }

    pub fn fill<T: PcmSample>(&mut self, out: &mut [T]) -> FillStatus {
        self.stats.blocks += 1;

        let mut written = 0;
        if !self.finished {
            for slot in out.iter_mut() {
                match self.source.pull() {
                    Pull::Sample(amplitude) => {
                        let (sample, clamped) = clamp_to_i16(amplitude);
                        self.stats.clamped += clamped as u64;
                        *slot = T::from_i16(sample);
                        written += 1;
                    },
                    Pull::EndOfStream => {
                        self.finished = true;
                        break;
                    },
                }
            }
        }

        let padding = &mut out[written..];
        padding.fill(T::EQUILIBRIUM);

        self.stats.samples += written as u64;
        self.stats.padded += padding.len() as u64;

        if self.finished {
            FillStatus::Finished
        } else {
            FillStatus::Continue
        }
    }

    pub fn stats(&self) -> FillStats {
        self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ramp {
        values: Vec<i32>,
        position: usize,
    }

    impl Ramp {
        fn new(values: &[i32]) -> Self {
            Self { values: values.to_vec(), position: 0 }
        }
    }

    impl SampleSource for Ramp {
        fn pull(&mut self) -> Pull {
            match self.values.get(self.position) {
                Some(&v) => {
                    self.position += 1;
                    Pull::Sample(v)
                },
                None => Pull::EndOfStream,
            }
        }
    }

    #[test]
    fn full_blocks_then_padding() {
        let mut filler = BlockFiller::new(Ramp::new(&[1, 2, 3, 4, 5]));

        let mut block = [9i16; 4];
        assert_eq!(filler.fill(&mut block), FillStatus::Continue);
        assert_eq!(block, [1, 2, 3, 4]);

        assert_eq!(filler.fill(&mut block), FillStatus::Finished);
        assert_eq!(block, [5, 0, 0, 0]);

        assert_eq!(filler.fill(&mut block), FillStatus::Finished);
        assert_eq!(block, [0, 0, 0, 0]);

        assert_eq!(
            filler.stats(),
            FillStats { blocks: 3, samples: 5, padded: 7, clamped: 0 }
        );
    }

    #[test]
    fn exact_fit_reports_end_on_next_block() {
        let mut filler = BlockFiller::new(Ramp::new(&[1, 2]));

        let mut block = [0i16; 2];
        assert_eq!(filler.fill(&mut block), FillStatus::Continue);
        assert!(!filler.is_finished());

        assert_eq!(filler.fill(&mut block), FillStatus::Finished);
        assert_eq!(block, [0, 0]);
    }

    #[test]
    fn saturates_and_counts() {
        let mut filler = BlockFiller::new(Ramp::new(&[40000, -40000, 100]));

        let mut block = [0i16; 3];
        filler.fill(&mut block);
        assert_eq!(block, [32767, -32768, 100]);
        assert_eq!(filler.stats().clamped, 2);
    }

    #[test]
    fn unsigned_padding_is_midscale() {
        let mut filler = BlockFiller::new(Ramp::new(&[0]));

        let mut block = [0u16; 3];
        assert_eq!(filler.fill(&mut block), FillStatus::Finished);
        assert_eq!(block, [0x8000, 0x8000, 0x8000]);
    }

    #[test]
    fn float_output() {
        let mut filler = BlockFiller::new(Ramp::new(&[16384, -32768]));

        let mut block = [1.0f32; 3];
        filler.fill(&mut block);
        assert_eq!(block, [0.5, -1.0, 0.0]);
    }
}
