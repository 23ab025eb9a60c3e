//! Audio FSK modem transmitter.
//!
//! Bytes are framed as asynchronous serial data (start bit, eight data bits
//! LSB first, stop bit), surrounded by idle mark tone, and rendered as a
//! phase-continuous two-tone signal, one sample per pull.
//!
//! ```text
//! Message --> Timeline (slot -> bit) --> FskSynthesizer (bit -> sample) --> BlockFiller (device buffer)
//! ```

pub mod codec;
pub mod config;
pub mod framer;
pub mod generator;
pub mod message;
pub mod sink;

pub use config::{ConfigError, ModemConfig};
pub use framer::{bit_at_slot, Slot, Timeline};
pub use generator::fsk::FskSynthesizer;
pub use generator::sine::SineTable;
pub use generator::{Pull, SampleSource};
pub use message::Message;
pub use sink::{BlockFiller, FillStats, FillStatus};
