//! Hardware input arriving as OSC from the panel's microcontroller bridge.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use panel_core::pots::POT_COUNT;
use panel_types::HardwareEvent;
use rosc::{OscMessage, OscPacket, OscType};

/// Turns `/key`, `/knobs`, `/enc` and `/encbut` messages into hardware events.
#[derive(Debug, Default)]
pub struct InputDecoder {
    knobs: [Option<f32>; POT_COUNT],
}

impl InputDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, packet: &OscPacket, events: &mut Vec<HardwareEvent>) {
        match packet {
            OscPacket::Message(msg) => self.decode_message(msg, events),
            OscPacket::Bundle(bundle) => {
                for p in &bundle.content {
                    self.decode(p, events);
                }
            }
        }
    }

    fn decode_message(&mut self, msg: &OscMessage, events: &mut Vec<HardwareEvent>) {
        match msg.addr.as_str() {
            "/key" => {
                let (Some(key), Some(velocity)) = (arg(msg, 0), arg(msg, 1)) else {
                    return;
                };
                if key < 0.0 {
                    return;
                }
                events.push(HardwareEvent::Key {
                    key: key as u32,
                    down: velocity > 0.0,
                });
            }
            // Every knob is reported on each message; only moved ones count.
            "/knobs" => {
                for (index, last) in self.knobs.iter_mut().enumerate() {
                    let Some(raw) = arg(msg, index) else {
                        break;
                    };
                    if *last != Some(raw) {
                        *last = Some(raw);
                        events.push(HardwareEvent::Pot { index, raw });
                    }
                }
            }
            "/enc" => {
                if let Some(direction) = arg(msg, 0) {
                    let delta = if direction > 0.0 { 1 } else { -1 };
                    events.push(HardwareEvent::Encoder { delta });
                }
            }
            "/encbut" => {
                if let Some(state) = arg(msg, 0) {
                    events.push(HardwareEvent::EncoderButton { down: state > 0.0 });
                }
            }
            other => log::trace!(target: "panel::input", "ignoring {}", other),
        }
    }
}

fn arg(msg: &OscMessage, index: usize) -> Option<f32> {
    match msg.args.get(index)? {
        OscType::Int(v) => Some(*v as f32),
        OscType::Float(v) => Some(*v),
        OscType::Long(v) => Some(*v as f32),
        OscType::Double(v) => Some(*v as f32),
        _ => None,
    }
}

/// UDP socket the hardware bridge sends to.
pub struct InputListener {
    socket: UdpSocket,
    decoder: InputDecoder,
    buf: Vec<u8>,
}

impl InputListener {
    pub fn bind(port: u16) -> io::Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port))?;
        log::info!(target: "panel::input", "listening for hardware on {}", socket.local_addr()?);
        Ok(Self {
            socket,
            decoder: InputDecoder::new(),
            buf: vec![0u8; 4096],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Wait up to `timeout` for one datagram and decode it.
    pub fn poll(&mut self, timeout: Duration) -> io::Result<Vec<HardwareEvent>> {
        self.socket.set_read_timeout(Some(timeout.max(Duration::from_millis(1))))?;
        let mut events = Vec::new();
        match self.socket.recv(&mut self.buf) {
            Ok(n) => match rosc::decoder::decode_udp(&self.buf[..n]) {
                Ok((_, packet)) => self.decoder.decode(&packet, &mut events),
                Err(e) => log::debug!(target: "panel::input", "bad packet: {}", e),
            },
            Err(ref e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut => {}
            Err(e) => return Err(e),
        }
        Ok(events)
    }
}
