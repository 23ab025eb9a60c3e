use std::time::Duration;

use afsk_modem::FillStats;
use thiserror::Error;

pub mod device;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("no default output device")]
    NoDevice,
    #[error("output device {0:?} not found")]
    DeviceNotFound(String),
    #[error("sample format {0} is not supported")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error("audio callback went away before the stream finished")]
    Disconnected,
    #[error(transparent)]
    Devices(#[from] cpal::DevicesError),
    #[error(transparent)]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),
    #[error(transparent)]
    Build(#[from] cpal::BuildStreamError),
    #[error(transparent)]
    Play(#[from] cpal::PlayStreamError),
    #[error(transparent)]
    Stream(#[from] cpal::StreamError),
}

/// Sent from the audio callback thread to whoever owns the stream.
#[derive(Debug)]
pub enum StreamEvent {
    /// The source ended; everything after its last sample is silence.
    ///
    /// `latency` is the callback-to-playback delay reported for the block
    /// holding the last sample, `None` if the backend's timestamps are
    /// unusable. `block_frames` is that block's length.
    Drained {
        stats: FillStats,
        latency: Option<Duration>,
        block_frames: usize,
    },
    Error(cpal::StreamError),
}
