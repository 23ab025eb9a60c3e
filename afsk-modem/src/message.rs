/// Bytes to transmit, always ending in a NUL terminator.
///
/// The terminator is framed and sent like any other byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    bytes: Box<[u8]>,
}

impl Message {
    pub fn new(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut v = Vec::with_capacity(bytes.len() + 1);
        v.extend_from_slice(bytes);
        v.push(0);

        Self {
            bytes: v.into_boxed_slice(),
        }
    }

    /// All bytes, terminator included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of 10-bit frames, one per byte including the terminator.
    pub fn frame_count(&self) -> usize {
        self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::Message;

    #[test]
    fn appends_terminator() {
        let message = Message::new("A");
        assert_eq!(message.as_bytes(), &[0x41, 0x00]);
        assert_eq!(message.frame_count(), 2);
    }

    #[test]
    fn empty_text_still_frames_terminator() {
        let message = Message::new("");
        assert_eq!(message.as_bytes(), &[0x00]);
        assert_eq!(message.frame_count(), 1);
    }

    #[test]
    fn utf8_is_sent_as_bytes() {
        let message = Message::new("é");
        assert_eq!(message.as_bytes(), &[0xc3, 0xa9, 0x00]);
    }

    #[test]
    fn embedded_nul_is_data() {
        let message = Message::from_bytes(&[0x00, 0xff]);
        assert_eq!(message.as_bytes(), &[0x00, 0xff, 0x00]);
    }
}
