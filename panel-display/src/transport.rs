use std::io;
use std::net::{SocketAddr, UdpSocket};

/// Destination for finished datagrams. Owned by the transmitter thread.
pub trait Transport: Send + 'static {
    fn send(&mut self, datagram: &[u8]) -> io::Result<()>;
}

/// Unacknowledged UDP to a fixed destination.
pub struct UdpTransport {
    socket: UdpSocket,
    dest: SocketAddr,
}

impl UdpTransport {
    pub fn connect(dest: SocketAddr) -> io::Result<Self> {
        let bind_addr = if dest.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(dest)?;
        Ok(Self { socket, dest })
    }

    pub fn dest(&self) -> SocketAddr {
        self.dest
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
        self.socket.send(datagram).map(|_| ())
    }
}
