pub mod fsk;
pub mod sine;

/// Outcome of pulling one sample from a source.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pull {
    Sample(i32),
    EndOfStream,
}

/// A real-time sample source.
///
/// `pull` is called from the audio callback: it must not block or allocate.
pub trait SampleSource {
    fn pull(&mut self) -> Pull;
}
