use std::io;
use std::net::{SocketAddr, UdpSocket};

use panel_core::HostMessage;
use rosc::{OscMessage, OscPacket, OscType};

/// Sends [`HostMessage`]s to the host patch as `/<name> <float>`.
pub struct HostSender {
    socket: UdpSocket,
    dest: SocketAddr,
}

impl HostSender {
    pub fn new(dest: SocketAddr) -> io::Result<Self> {
        let bind = if dest.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind)?;
        Ok(Self { socket, dest })
    }

    pub fn send(&self, msg: HostMessage) -> io::Result<()> {
        let buf = encode(msg)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        self.socket.send_to(&buf, self.dest)?;
        log::debug!(target: "panel::host", "/{} {}", msg.name(), msg.value());
        Ok(())
    }
}

pub fn encode(msg: HostMessage) -> Result<Vec<u8>, rosc::OscError> {
    rosc::encoder::encode(&OscPacket::Message(OscMessage {
        addr: format!("/{}", msg.name()),
        args: vec![OscType::Float(msg.value())],
    }))
}
