use std::sync::Arc;

use super::sine::SineTable;
use super::{Pull, SampleSource};
use crate::config::{ConfigError, ModemConfig};
use crate::framer::{exact_size_hint, Timeline};
use crate::message::Message;

/// Fractional bits below the table index in the phase accumulator.
pub const PHASE_FRACTION_BITS: u32 = 16;

/// Maps a running sample count to a bit slot, `floor(n * baud / rate)`,
/// without dividing per sample.
#[derive(Copy, Clone, Debug)]
pub struct SymbolClock {
    baud: u64,
    sampling_rate_hz: u64,
    remainder: u64,
    slot: u64,
}

impl SymbolClock {
    /// Requires `0 < baud <= sampling_rate_hz`, which `ModemConfig::validate` enforces.
    pub fn new(baud: u32, sampling_rate_hz: u32) -> Self {
        Self {
            baud: u64::from(baud),
            sampling_rate_hz: u64::from(sampling_rate_hz),
            remainder: 0,
            slot: 0,
        }
    }

    #[inline]
    pub fn slot(&self) -> u64 {
        self.slot
    }

    #[inline]
    pub fn tick(&mut self) {
        self.remainder += self.baud;
        if self.remainder >= self.sampling_rate_hz {
            self.remainder -= self.sampling_rate_hz;
            self.slot += 1;
        }
    }
}

/// Binary FSK with a single phase accumulator.
///
/// The accumulator counts table entries in 16.16 fixed point, modulo
/// `table.len() << 16`. It is only ever advanced, never reset, so switching
/// between the mark and space steps keeps the waveform's phase continuous.
pub struct FskSynthesizer {
    timeline: Timeline,
    table: Arc<SineTable>,
    clock: SymbolClock,

    modulus: u64,
    step_mark: u64,
    step_space: u64,

    phase: u64,
    samples_emitted: u64,
    total_samples: u64,
    finished: bool,
}

impl FskSynthesizer {
    pub fn new(
        message: Message,
        config: &ModemConfig,
        table: Arc<SineTable>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if table.is_empty() {
            return Err(ConfigError::EmptyTable);
        }

        let timeline = Timeline::new(message, config);
        let table_len = table.len() as u64;
        let modulus = table_len << PHASE_FRACTION_BITS;
        let step_mark = phase_step(config.mark_hz, table_len, config.sampling_rate_hz);
        let step_space = phase_step(config.space_hz, table_len, config.sampling_rate_hz);

        // ceil(slots * rate / baud)
        let total_samples = {
            let numerator = u128::from(timeline.len()) * u128::from(config.sampling_rate_hz);
            let baud = u128::from(config.baud);
            ((numerator + baud - 1) / baud) as u64
        };

        tracing::debug!(
            table_len,
            step_mark,
            step_space,
            total_samples,
            "fsk synthesizer"
        );

        Ok(Self {
            timeline,
            table,
            clock: SymbolClock::new(config.baud, config.sampling_rate_hz),
            modulus,
            step_mark,
            step_space,
            phase: 0,
            samples_emitted: 0,
            total_samples,
            finished: false,
        })
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Phase accumulator, in 1/65536ths of a table entry.
    pub fn phase(&self) -> u64 {
        self.phase
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Per-sample accumulator increments for the (mark, space) tones.
    pub fn steps(&self) -> (u64, u64) {
        (self.step_mark, self.step_space)
    }

    pub fn samples_emitted(&self) -> u64 {
        self.samples_emitted
    }

    /// Samples the stream produces before ending.
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl SampleSource for FskSynthesizer {
    #[inline]
    fn pull(&mut self) -> Pull {
        if self.finished {
            return Pull::EndOfStream;
        }

        let slot = self.timeline.slot(self.clock.slot());
        if slot.done {
            self.finished = true;
            return Pull::EndOfStream;
        }

        self.samples_emitted += 1;
        self.clock.tick();

        let step = if slot.bit { self.step_mark } else { self.step_space };

        // step < modulus, so one subtraction wraps.
        self.phase += step;
        if self.phase >= self.modulus {
            self.phase -= self.modulus;
        }

        let k = (self.phase >> PHASE_FRACTION_BITS) as usize;
        Pull::Sample(self.table.get(k))
    }
}

impl Iterator for FskSynthesizer {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        match self.pull() {
            Pull::Sample(s) => Some(s),
            Pull::EndOfStream => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        exact_size_hint(self.total_samples.saturating_sub(self.samples_emitted))
    }
}

/// `round(freq_hz * table_len * 2^16 / sampling_rate_hz)`
pub fn phase_step(freq_hz: u32, table_len: u64, sampling_rate_hz: u32) -> u64 {
    let numerator = u128::from(freq_hz) * (u128::from(table_len) << PHASE_FRACTION_BITS);
    let rate = u128::from(sampling_rate_hz);
    ((2 * numerator + rate) / (2 * rate)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::sine::SINE_TABLE_LEN;

    fn bare_config() -> ModemConfig {
        ModemConfig {
            lead_ms: 0,
            tail_ms: 0,
            ..ModemConfig::default()
        }
    }

    #[test]
    fn reference_steps() {
        // 1650 * 2^32 / 8000 = 885837004.8, 1850 * 2^32 / 8000 = 993211187.2
        assert_eq!(phase_step(1650, SINE_TABLE_LEN as u64, 8000), 885_837_005);
        assert_eq!(phase_step(1850, SINE_TABLE_LEN as u64, 8000), 993_211_187);
    }

    #[test]
    fn step_rounds_half_up() {
        // 1 * 2 * 65536 / 4 = 32768 exactly; 3 * 1 * 65536 / 131072 = 1.5
        assert_eq!(phase_step(1, 2, 4), 32768);
        assert_eq!(phase_step(3, 1, 131_072), 2);
    }

    #[test]
    fn symbol_clock_exact_multiple() {
        let mut clock = SymbolClock::new(50, 8000);
        for n in 0..1000u64 {
            assert_eq!(clock.slot(), n / 160, "sample {n}");
            clock.tick();
        }
    }

    #[test]
    fn symbol_clock_non_multiple() {
        let mut clock = SymbolClock::new(45, 8000);
        for n in 0..20_000u64 {
            assert_eq!(clock.slot(), n * 45 / 8000, "sample {n}");
            clock.tick();
        }
    }

    #[test]
    fn symbol_clock_near_u32_limits() {
        let (baud, rate) = (3_000_000_000u32, 4_000_000_000u32);
        let config = ModemConfig {
            sampling_rate_hz: rate,
            baud,
            ..ModemConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));

        let mut clock = SymbolClock::new(baud, rate);
        for n in 0..10_000u64 {
            let expected = u128::from(n) * u128::from(baud) / u128::from(rate);
            assert_eq!(u128::from(clock.slot()), expected, "sample {n}");
            clock.tick();
        }

        let mut clock = SymbolClock::new(u32::MAX, u32::MAX);
        for n in 0..100u64 {
            assert_eq!(clock.slot(), n);
            clock.tick();
        }
    }

    #[test]
    fn emits_after_advancing() {
        let table = Arc::new(SineTable::reference());
        let mut synth = FskSynthesizer::new(Message::new("A"), &bare_config(), table.clone()).unwrap();
        let (_, space) = synth.steps();

        // First slot is the start bit of 'A'.
        let first = synth.pull();
        assert_eq!(synth.phase(), space);
        assert_eq!(first, Pull::Sample(table.get((space >> 16) as usize)));
    }

    #[test]
    fn stream_length_and_end() {
        let table = Arc::new(SineTable::reference());
        let mut synth = FskSynthesizer::new(Message::new("A"), &bare_config(), table).unwrap();
        assert_eq!(synth.total_samples(), 20 * 160);
        assert_eq!(synth.size_hint(), (3200, Some(3200)));

        let count = synth.by_ref().count();
        assert_eq!(count, 3200);
        assert!(synth.is_finished());
        assert_eq!(synth.pull(), Pull::EndOfStream);
        assert_eq!(synth.pull(), Pull::EndOfStream);
        assert_eq!(synth.samples_emitted(), 3200);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = ModemConfig { baud: 0, ..ModemConfig::default() };
        let result = FskSynthesizer::new(Message::new("A"), &config, Arc::new(SineTable::reference()));
        assert!(matches!(result, Err(ConfigError::ZeroBaud)));
    }

    #[test]
    fn small_table_wraps() {
        // Four-entry square-ish table, tone at a quarter of the rate:
        // one table entry per sample.
        let table = Arc::new(SineTable::from_samples(vec![0, 10, 0, -10]).unwrap());
        let config = ModemConfig {
            sampling_rate_hz: 8,
            mark_hz: 2,
            space_hz: 2,
            baud: 8,
            lead_ms: 0,
            tail_ms: 0,
        };
        let synth = FskSynthesizer::new(Message::new(""), &config, table).unwrap();
        let samples: Vec<i32> = synth.collect();
        assert_eq!(samples.len(), 10);
        assert_eq!(&samples[..5], &[10, 0, -10, 0, 10]);
    }
}
