/// Largest datagram the link will transmit. Longer payloads are cut.
pub const MAX_MESSAGE_SIZE: usize = 256;

/// A pre-encoded message in a fixed-size slot.
///
/// Copied by value into the queue so the producer's encode buffer is never
/// shared with the transmitter thread.
#[derive(Clone)]
pub struct OutboundMessage {
    len: usize,
    bytes: [u8; MAX_MESSAGE_SIZE],
}

impl OutboundMessage {
    /// Copy `data` into a new slot, truncating to [`MAX_MESSAGE_SIZE`].
    pub fn from_slice(data: &[u8]) -> Self {
        let len = data.len().min(MAX_MESSAGE_SIZE);
        let mut bytes = [0u8; MAX_MESSAGE_SIZE];
        bytes[..len].copy_from_slice(&data[..len]);
        Self { len, bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Debug for OutboundMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundMessage").field("len", &self.len).finish()
    }
}
