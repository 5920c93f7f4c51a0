//! OSC wire form of [`DisplayCommand`].
//!
//! Every message starts with the screen id, followed by integer geometry and,
//! for text, the string itself.

use rosc::{OscMessage, OscPacket, OscType};

use crate::command::DisplayCommand;
use crate::error::DisplayError;

pub const ADDR_FILL_AREA: &str = "/oled/gFillArea";
pub const ADDR_BOX: &str = "/oled/gBox";
pub const ADDR_INVERT_AREA: &str = "/oled/gInvertArea";
pub const ADDR_PRINTLN: &str = "/oled/gPrintln";
pub const ADDR_FLIP: &str = "/oled/gFlip";

fn colour(on: bool) -> OscType {
    OscType::Int(if on { 1 } else { 0 })
}

/// Build the OSC message for one command.
pub fn to_message(screen: i32, cmd: &DisplayCommand) -> OscMessage {
    let s = OscType::Int(screen);
    let (addr, args) = match cmd {
        DisplayCommand::FillArea { x, y, w, h, on } => (
            ADDR_FILL_AREA,
            vec![s, OscType::Int(*x), OscType::Int(*y), OscType::Int(*w), OscType::Int(*h), colour(*on)],
        ),
        DisplayCommand::Box { x, y, w, h, on } => (
            ADDR_BOX,
            vec![s, OscType::Int(*x), OscType::Int(*y), OscType::Int(*w), OscType::Int(*h), colour(*on)],
        ),
        DisplayCommand::InvertArea { x, y, w, h } => (
            ADDR_INVERT_AREA,
            vec![s, OscType::Int(*x), OscType::Int(*y), OscType::Int(*w), OscType::Int(*h)],
        ),
        DisplayCommand::Print { x, y, size, on, text } => (
            ADDR_PRINTLN,
            vec![
                s,
                OscType::Int(*x),
                OscType::Int(*y),
                OscType::Int(*size),
                colour(*on),
                OscType::String(text.clone()),
            ],
        ),
        DisplayCommand::Flip => (ADDR_FLIP, vec![s]),
    };
    OscMessage {
        addr: addr.to_string(),
        args,
    }
}

/// Encode one command into a fresh buffer.
pub fn encode(screen: i32, cmd: &DisplayCommand) -> Result<Vec<u8>, DisplayError> {
    let packet = OscPacket::Message(to_message(screen, cmd));
    Ok(rosc::encoder::encode(&packet)?)
}
