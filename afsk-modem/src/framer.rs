//! Asynchronous serial framing.
//!
//! Each byte becomes a 10-bit frame: one start bit (0), eight data bits
//! LSB first, one stop bit (1). The whole transmission is a timeline of
//! bit slots:
//!
//! ```text
//! | preamble (marks) | frame 0 | frame 1 | ... | frame n-1 | postamble (marks) | done
//! ```
//!
//! Nothing is materialized; every slot is computed from its index.

use crate::config::ModemConfig;
use crate::message::Message;

/// Slots per byte frame.
pub const FRAME_LENGTH: u64 = 10;

const START_POSITION: u64 = 0;
const STOP_POSITION: u64 = 9;

/// Logical bit for frame-relative slot `k`.
///
/// `k = 0` and `k = 10 * len + 1` are the global start/stop boundaries and
/// read as `true`. Any other `k` must address a data bit: byte `k / 10`,
/// bit `(k % 10) - 1`.
///
/// # Panics
///
/// If `k` resolves to a start or stop position, or to a byte past the end
/// of `message`.
pub fn bit_at_slot(message: &[u8], k: u64) -> bool {
    let stop = message.len() as u64 * FRAME_LENGTH + 1;
    if k == 0 || k == stop {
        return true;
    }

    let byte_index = k / FRAME_LENGTH;
    let position = k % FRAME_LENGTH;
    assert!(
        (1..=8).contains(&position),
        "slot {k} does not address a data bit"
    );
    assert!(
        byte_index < message.len() as u64,
        "slot {k} is past the last frame ({} bytes)",
        message.len()
    );

    let byte = message[byte_index as usize];
    (byte >> (position - 1)) & 1 == 1
}

/// Result of looking up one timeline slot.
///
/// `bit` is meaningless once `done` is set.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    pub bit: bool,
    pub done: bool,
}

impl Slot {
    const MARK: Slot = Slot { bit: true, done: false };
    const DONE: Slot = Slot { bit: false, done: true };

    fn bit(bit: bool) -> Self {
        Self { bit, done: false }
    }
}

#[derive(Clone, Debug)]
pub struct Timeline {
    message: Message,
    preamble_slots: u64,
    frame_slots: u64,
    postamble_slots: u64,
}

impl Timeline {
    pub fn new(message: Message, config: &ModemConfig) -> Self {
        Self::with_slots(message, config.preamble_slots(), config.postamble_slots())
    }

    pub fn with_slots(message: Message, preamble_slots: u64, postamble_slots: u64) -> Self {
        let frame_slots = message.frame_count() as u64 * FRAME_LENGTH;

        tracing::debug!(
            preamble_slots,
            frame_slots,
            postamble_slots,
            "timeline"
        );

        Self {
            message,
            preamble_slots,
            frame_slots,
            postamble_slots,
        }
    }

    pub fn preamble_slots(&self) -> u64 {
        self.preamble_slots
    }

    pub fn postamble_slots(&self) -> u64 {
        self.postamble_slots
    }

    /// Slots sent before `done`: preamble, every frame, postamble.
    pub fn len(&self) -> u64 {
        self.preamble_slots + self.frame_slots + self.postamble_slots
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bit to send in slot `i`, and whether the transmission is over.
    pub fn slot(&self, i: u64) -> Slot {
        if i < self.preamble_slots {
            return Slot::MARK;
        }

        // The end is measured from the start of the data region.
        let r = i - self.preamble_slots;
        if r >= self.frame_slots + self.postamble_slots {
            return Slot::DONE;
        }
        if r >= self.frame_slots {
            return Slot::MARK;
        }

        match r % FRAME_LENGTH {
            START_POSITION => Slot::bit(false),
            STOP_POSITION => Slot::bit(true),
            _ => Slot::bit(bit_at_slot(self.message.as_bytes(), r)),
        }
    }

    /// Every bit of the transmission, in order.
    pub fn bits(&self) -> Bits<'_> {
        Bits {
            timeline: self,
            idx_now: 0,
        }
    }
}

/// `size_hint` for a `u64` count that may not fit in `usize`.
pub(crate) fn exact_size_hint(remaining: u64) -> (usize, Option<usize>) {
    match usize::try_from(remaining) {
        Ok(n) => (n, Some(n)),
        Err(_) => (usize::MAX, None),
    }
}

pub struct Bits<'a> {
    timeline: &'a Timeline,
    idx_now: u64,
}

impl Iterator for Bits<'_> {
    type Item = bool;

    #[inline]
    fn next(&mut self) -> Option<bool> {
        let slot = self.timeline.slot(self.idx_now);
        if slot.done {
            None
        } else {
            self.idx_now += 1;
            Some(slot.bit)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        exact_size_hint(self.timeline.len().saturating_sub(self.idx_now))
    }
}
