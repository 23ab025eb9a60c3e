use thiserror::Error;

/// Output sampling rate of the reference configuration.
pub const SAMPLING_RATE_HZ: u32 = 8000;

/// Tone sent for a logical zero (start bits, zero data bits).
pub const SPACE_HZ: u32 = 1850;

/// Tone sent for a logical one (stop bits, one data bits, idle).
pub const MARK_HZ: u32 = 1650;

pub const BAUD: u32 = 50;

/// Mark tone sent before the first frame.
pub const LEAD_MS: u32 = 1000;

/// Mark tone sent after the last frame.
pub const TAIL_MS: u32 = 1000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sampling rate must be non-zero")]
    ZeroSamplingRate,
    #[error("baud rate must be non-zero")]
    ZeroBaud,
    #[error("baud rate {baud} exceeds sampling rate {sampling_rate_hz} Hz")]
    BaudAboveSamplingRate { baud: u32, sampling_rate_hz: u32 },
    #[error("{tone} frequency must be non-zero")]
    ZeroFrequency { tone: &'static str },
    #[error("{tone} frequency {hz} Hz is above Nyquist for {sampling_rate_hz} Hz sampling")]
    AboveNyquist { tone: &'static str, hz: u32, sampling_rate_hz: u32 },
    #[error("sine lookup table is empty")]
    EmptyTable,
}

/// Tuning constants for one transmission.
///
/// Fixed once a stream starts; nothing in the modem mutates it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModemConfig {
    pub sampling_rate_hz: u32,
    pub space_hz: u32,
    pub mark_hz: u32,
    pub baud: u32,
    pub lead_ms: u32,
    pub tail_ms: u32,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: SAMPLING_RATE_HZ,
            space_hz: SPACE_HZ,
            mark_hz: MARK_HZ,
            baud: BAUD,
            lead_ms: LEAD_MS,
            tail_ms: TAIL_MS,
        }
    }
}

impl ModemConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling_rate_hz == 0 {
            return Err(ConfigError::ZeroSamplingRate);
        }
        if self.baud == 0 {
            return Err(ConfigError::ZeroBaud);
        }
        if self.baud > self.sampling_rate_hz {
            return Err(ConfigError::BaudAboveSamplingRate {
                baud: self.baud,
                sampling_rate_hz: self.sampling_rate_hz,
            });
        }

        for (tone, hz) in [("space", self.space_hz), ("mark", self.mark_hz)] {
            if hz == 0 {
                return Err(ConfigError::ZeroFrequency { tone });
            }
            if u64::from(hz) * 2 > u64::from(self.sampling_rate_hz) {
                return Err(ConfigError::AboveNyquist {
                    tone,
                    hz,
                    sampling_rate_hz: self.sampling_rate_hz,
                });
            }
        }

        Ok(())
    }

    /// Mark slots sent before the first frame, `floor(lead_ms * baud / 1000)`.
    pub fn preamble_slots(&self) -> u64 {
        Self::slots_for(self.lead_ms, self.baud)
    }

    /// Mark slots sent after the last frame, `floor(tail_ms * baud / 1000)`.
    pub fn postamble_slots(&self) -> u64 {
        Self::slots_for(self.tail_ms, self.baud)
    }

    fn slots_for(duration_ms: u32, baud: u32) -> u64 {
        u64::from(duration_ms) * u64::from(baud) / 1000
    }
}
