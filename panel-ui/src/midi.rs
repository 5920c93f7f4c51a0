//! MIDI control changes for learn mode and mapped parameters.

use std::sync::mpsc::{self, Receiver};

use midir::{MidiInput, MidiInputConnection};

/// A control change: `(controller, value)`.
pub type ControlChange = (u8, u8);

pub struct MidiCcInput {
    _connection: MidiInputConnection<()>,
    receiver: Receiver<ControlChange>,
    port_name: String,
}

impl MidiCcInput {
    /// Open the first input port whose name contains `wanted`.
    pub fn connect(wanted: &str) -> Result<Self, String> {
        let midi_in = MidiInput::new("panel").map_err(|e| e.to_string())?;
        let ports = midi_in.ports();
        let (port, port_name) = ports
            .iter()
            .find_map(|port| {
                let name = midi_in.port_name(port).ok()?;
                name.contains(wanted).then(|| (port.clone(), name))
            })
            .ok_or_else(|| format!("no MIDI input port matching {:?}", wanted))?;

        let (tx, rx) = mpsc::channel();
        let connection = midi_in
            .connect(
                &port,
                "panel-input",
                move |_timestamp, message, _| {
                    if let Some(cc) = parse_control_change(message) {
                        let _ = tx.send(cc);
                    }
                },
                (),
            )
            .map_err(|e| e.to_string())?;

        log::info!(target: "panel::midi", "MIDI input on {}", port_name);
        Ok(Self {
            _connection: connection,
            receiver: rx,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Pending control changes (non-blocking).
    pub fn poll(&self) -> Vec<ControlChange> {
        self.receiver.try_iter().collect()
    }
}

/// Control change on any channel, `None` for every other message.
fn parse_control_change(data: &[u8]) -> Option<ControlChange> {
    match data {
        [status, controller, value, ..] if status & 0xF0 == 0xB0 => {
            Some((controller & 0x7F, value & 0x7F))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_changes_on_any_channel() {
        assert_eq!(parse_control_change(&[0xB0, 21, 64]), Some((21, 64)));
        assert_eq!(parse_control_change(&[0xBF, 7, 0]), Some((7, 0)));
    }

    #[test]
    fn other_messages_are_skipped() {
        assert_eq!(parse_control_change(&[0x90, 60, 100]), None);
        assert_eq!(parse_control_change(&[0xB0, 21]), None);
        assert_eq!(parse_control_change(&[]), None);
    }
}
