use std::sync::Arc;

use afsk_modem::config::{BAUD, LEAD_MS, MARK_HZ, SAMPLING_RATE_HZ, SPACE_HZ, TAIL_MS};
use afsk_modem::{ConfigError, FskSynthesizer, Message, ModemConfig, SineTable};
use clap::Parser;
use console::{style, Color};
use cpal::traits::DeviceTrait;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::output::OutputError;

mod output;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Send a text message as audio FSK: 8N1 frames between idle mark tone.
#[derive(Parser)]
#[clap(author, version, about, long_about=None)]
pub(crate) struct Cli {
    /// Text to transmit. A NUL terminator is appended and sent too.
    pub message: String,

    /// Output device name (default device if omitted).
    #[clap(long)]
    pub device: Option<String>,

    #[clap(long, default_value_t = SAMPLING_RATE_HZ)]
    pub rate: u32,

    /// Tone for a zero bit, Hz.
    #[clap(long, default_value_t = SPACE_HZ)]
    pub space: u32,

    /// Tone for a one bit, Hz.
    #[clap(long, default_value_t = MARK_HZ)]
    pub mark: u32,

    #[clap(long, default_value_t = BAUD)]
    pub baud: u32,

    /// Idle mark before the message, ms.
    #[clap(long, default_value_t = LEAD_MS)]
    pub lead_ms: u32,

    /// Idle mark after the message, ms.
    #[clap(long, default_value_t = TAIL_MS)]
    pub tail_ms: u32,

    /// More logging (-v debug, -vv trace). RUST_LOG overrides.
    #[clap(short, long, parse(from_occurrences))]
    pub verbose: usize,
}

impl Cli {
    fn modem_config(&self) -> ModemConfig {
        ModemConfig {
            sampling_rate_hz: self.rate,
            space_hz: self.space,
            mark_hz: self.mark,
            baud: self.baud,
            lead_ms: self.lead_ms,
            tail_ms: self.tail_ms,
        }
    }
}

fn init_logging(verbose: usize) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let config = args.modem_config();
    config.validate()?;

    let message = Message::new(&args.message);
    let frames = message.frame_count();
    let synth = FskSynthesizer::new(message, &config, Arc::new(SineTable::reference()))?;

    let total_samples = synth.total_samples();
    tracing::info!(
        frames,
        slots = synth.timeline().len(),
        seconds = total_samples as f64 / f64::from(config.sampling_rate_hz),
        "transmitting"
    );

    let device = output::device::open(args.device.as_deref())?;
    match device.name() {
        Ok(name) => tracing::info!(device = %name, "output device"),
        Err(e) => tracing::warn!("output device has no name: {e}"),
    }

    let stats = output::device::play(&device, config.sampling_rate_hz, synth)?;
    tracing::debug!(?stats, "stream drained");

    if stats.clamped > 0 {
        tracing::warn!(clamped = stats.clamped, "samples saturated at the sink");
    }
    if stats.samples != total_samples {
        tracing::warn!(sent = stats.samples, expected = total_samples, "short stream");
    }

    eprintln!("{} {} samples, {} blocks",
        style("sent").fg(Color::Green),
        stats.samples,
        stats.blocks,
    );

    Ok(())
}

///////////////////////////////////////////////////////////////////////
