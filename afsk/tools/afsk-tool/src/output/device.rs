use std::thread;
use std::time::Duration;

use afsk_modem::codec::pcm::PcmSample;
use afsk_modem::{BlockFiller, FillStats, FillStatus, SampleSource};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleFormat, SampleRate, SizedSample, Stream, StreamConfig};
use crossbeam::channel::{bounded, Sender};

use super::{OutputError, StreamEvent};

/// Output is mono; the modem has a single signal.
const CHANNELS: u16 = 1;

/// Assumed output latency when the backend's timestamps are unusable.
const FALLBACK_LATENCY: Duration = Duration::from_millis(250);

/// Scheduling slack on top of the computed drain time.
const DRAIN_MARGIN: Duration = Duration::from_millis(20);

/// Preferred device sample formats, best first.
const FORMATS: [SampleFormat; 3] = [SampleFormat::I16, SampleFormat::F32, SampleFormat::U16];

pub fn open(name: Option<&str>) -> Result<Device, OutputError> {
    let host = cpal::default_host();
    tracing::debug!(host = ?host.id(), "audio host");

    let name = match name {
        Some(name) => name,
        None => return host.default_output_device().ok_or(OutputError::NoDevice),
    };

    for device in host.output_devices()? {
        match device.name() {
            Ok(n) if n == name => return Ok(device),
            Ok(_) => {},
            Err(e) => tracing::debug!("skipping unnamed device: {e}"),
        }
    }

    Err(OutputError::DeviceNotFound(name.to_string()))
}

/// Pick a mono sample format the device advertises at `sampling_rate_hz`.
///
/// Falls back to i16 when nothing matches; the backend then accepts or
/// rejects the stream when it is built.
fn negotiate_format(device: &Device, sampling_rate_hz: u32) -> Result<SampleFormat, OutputError> {
    let rate = SampleRate(sampling_rate_hz);

    let advertised: Vec<SampleFormat> = device
        .supported_output_configs()?
        .filter(|range| {
            range.channels() == CHANNELS
                && range.min_sample_rate() <= rate
                && rate <= range.max_sample_rate()
        })
        .map(|range| range.sample_format())
        .collect();

    match FORMATS.into_iter().find(|f| advertised.contains(f)) {
        Some(format) => Ok(format),
        None => {
            tracing::warn!(
                sampling_rate_hz,
                ?advertised,
                "no advertised mono config at this rate, requesting i16"
            );
            Ok(SampleFormat::I16)
        },
    }
}

fn build_stream<T, S>(
    device: &Device,
    config: &StreamConfig,
    mut filler: BlockFiller<S>,
    sender: Sender<StreamEvent>,
) -> Result<Stream, OutputError>
where
    T: PcmSample + SizedSample,
    S: SampleSource + Send + 'static,
{
    let error_sender = sender.clone();
    let channels = usize::from(config.channels);
    let mut drained = false;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], info: &cpal::OutputCallbackInfo| {
            if filler.fill(data) == FillStatus::Finished && !drained {
                drained = true;
                let ts = info.timestamp();
                let _ = sender.try_send(StreamEvent::Drained {
                    stats: filler.stats(),
                    latency: ts.playback.duration_since(&ts.callback),
                    block_frames: data.len() / channels,
                });
            }
        },
        move |e| {
            let _ = error_sender.try_send(StreamEvent::Error(e));
        },
        None,
    )?;

    Ok(stream)
}

/// Stream `source` to `device` until it ends. Blocks the calling thread.
pub fn play<S>(device: &Device, sampling_rate_hz: u32, source: S) -> Result<FillStats, OutputError>
where
    S: SampleSource + Send + 'static,
{
    let format = negotiate_format(device, sampling_rate_hz)?;
    let config = StreamConfig {
        channels: CHANNELS,
        sample_rate: SampleRate(sampling_rate_hz),
        buffer_size: BufferSize::Default,
    };
    tracing::info!(%format, sampling_rate_hz, channels = CHANNELS, "opening stream");

    let (sender, receiver) = bounded(4);
    let filler = BlockFiller::new(source);

    let stream = match format {
        SampleFormat::I16 => build_stream::<i16, S>(device, &config, filler, sender)?,
        SampleFormat::F32 => build_stream::<f32, S>(device, &config, filler, sender)?,
        SampleFormat::U16 => build_stream::<u16, S>(device, &config, filler, sender)?,
        other => return Err(OutputError::UnsupportedFormat(other)),
    };

    stream.play()?;

    let (stats, latency, block_frames) = match receiver.recv() {
        Ok(StreamEvent::Drained { stats, latency, block_frames }) => (stats, latency, block_frames),
        Ok(StreamEvent::Error(e)) => return Err(e.into()),
        Err(_) => return Err(OutputError::Disconnected),
    };

    if latency.is_none() {
        tracing::debug!(fallback = ?FALLBACK_LATENCY, "no usable playback timestamp");
    }
    let wait = drain_time(latency, block_frames, sampling_rate_hz);
    tracing::debug!(?latency, block_frames, ?wait, "waiting for playout");

    thread::sleep(wait);
    drop(stream);

    Ok(stats)
}

/// How long after the final callback the last block is still audible:
/// the reported output latency plus the block's own duration.
fn drain_time(latency: Option<Duration>, block_frames: usize, sampling_rate_hz: u32) -> Duration {
    let block_nanos = block_frames as u128 * 1_000_000_000 / u128::from(sampling_rate_hz.max(1));
    let block = Duration::from_nanos(u64::try_from(block_nanos).unwrap_or(u64::MAX));

    latency.unwrap_or(FALLBACK_LATENCY) + block + DRAIN_MARGIN
}

///////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_time_follows_reported_latency() {
        // 512 frames at 8 kHz is 64 ms.
        assert_eq!(
            drain_time(Some(Duration::from_millis(40)), 512, 8000),
            Duration::from_millis(40 + 64) + DRAIN_MARGIN,
        );
        assert_eq!(
            drain_time(Some(Duration::from_millis(400)), 512, 8000),
            Duration::from_millis(400 + 64) + DRAIN_MARGIN,
        );
    }

    #[test]
    fn drain_time_scales_with_block_length() {
        let short = drain_time(Some(Duration::ZERO), 80, 8000);
        let long = drain_time(Some(Duration::ZERO), 8000, 8000);
        assert_eq!(short, Duration::from_millis(10) + DRAIN_MARGIN);
        assert_eq!(long, Duration::from_secs(1) + DRAIN_MARGIN);
    }

    #[test]
    fn drain_time_without_timestamp() {
        assert_eq!(
            drain_time(None, 0, 48_000),
            FALLBACK_LATENCY + DRAIN_MARGIN,
        );
    }
}
