//! Linear PCM conversion at the device boundary.

/// Saturate a synthesizer amplitude to signed 16-bit.
///
/// Returns the sample and whether it had to be clipped.
#[inline]
pub fn clamp_to_i16(amplitude: i32) -> (i16, bool) {
    let clamped = amplitude.clamp(i16::MIN as i32, i16::MAX as i32);
    (clamped as i16, clamped != amplitude)
}

///////////////////////////////////////////////////////////////////////

/// A device sample format the sink can write.
pub trait PcmSample: Copy + Send + 'static {
    /// Value for silence.
    const EQUILIBRIUM: Self;

    fn from_i16(sample: i16) -> Self;
}

impl PcmSample for i16 {
    const EQUILIBRIUM: Self = 0;

    #[inline]
    fn from_i16(sample: i16) -> Self {
        sample
    }
}

/// Offset binary: 0x8000 is silence.
impl PcmSample for u16 {
    const EQUILIBRIUM: Self = 0x8000;

    #[inline]
    fn from_i16(sample: i16) -> Self {
        (sample as u16) ^ 0x8000
    }
}

/// Map full-scale 16-bit to [-1.0, 1.0).
impl PcmSample for f32 {
    const EQUILIBRIUM: Self = 0.0;

    #[inline]
    fn from_i16(sample: i16) -> Self {
        sample as f32 / 32768.0
    }
}

///////////////////////////////////////////////////////////////////////
