//! Display output for the panel screen.
//!
//! Drawing calls on [`Display`] become [`DisplayCommand`]s, are encoded as
//! OSC messages on the calling thread, and are handed to a [`DisplayLink`]
//! whose dedicated `display-tx` thread sends one UDP datagram per message.
//! Slow or blocked network I/O therefore never stalls the UI loop.

mod command;
mod display;
mod error;
mod link;
mod message;
pub mod osc;
mod transport;

pub use command::DisplayCommand;
pub use display::{Display, DisplaySink, OscSink, RecordingSink};
pub use error::DisplayError;
pub use link::{DisplayLink, LinkStats, DEFAULT_QUEUE_CAPACITY};
pub use message::{OutboundMessage, MAX_MESSAGE_SIZE};
pub use transport::{Transport, UdpTransport};
