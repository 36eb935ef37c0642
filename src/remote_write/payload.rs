//! Payload sources
//!
//! The client does not know how a remote-write request is encoded. It asks
//! a [`PayloadSource`] how much room it needs, hands it a buffer of that
//! size, and posts whatever bytes the source wrote.

use super::error::PayloadError;
use bytes::Bytes;

/// Something that can serialize itself into a remote-write body
///
/// Implementations typically build a protobuf `WriteRequest` and
/// snappy-compress it.
pub trait PayloadSource {
    /// Upper bound on the number of bytes [`serialize`](Self::serialize) writes
    fn buffer_size(&self) -> usize;

    /// Write the encoded payload into `buf` and return its length
    ///
    /// `buf` is exactly [`buffer_size`](Self::buffer_size) bytes long and
    /// zeroed. Returning `Ok(0)` counts as a failure.
    fn serialize(&self, buf: &mut [u8]) -> Result<usize, PayloadError>;
}

impl<P: PayloadSource + ?Sized> PayloadSource for &P {
    fn buffer_size(&self) -> usize {
        (**self).buffer_size()
    }

    fn serialize(&self, buf: &mut [u8]) -> Result<usize, PayloadError> {
        (**self).serialize(buf)
    }
}

/// A payload that is already encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    bytes: Bytes,
}

impl EncodedPayload {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        EncodedPayload {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for EncodedPayload {
    fn from(bytes: Vec<u8>) -> Self {
        EncodedPayload::new(bytes)
    }
}

impl PayloadSource for EncodedPayload {
    fn buffer_size(&self) -> usize {
        self.bytes.len()
    }

    fn serialize(&self, buf: &mut [u8]) -> Result<usize, PayloadError> {
        if self.bytes.is_empty() {
            return Err(PayloadError::new("encoded payload is empty"));
        }
        let dst = buf
            .get_mut(..self.bytes.len())
            .ok_or_else(|| PayloadError::new("buffer smaller than encoded payload"))?;
        dst.copy_from_slice(&self.bytes);
        Ok(self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_payload_copies_bytes() {
        let payload = EncodedPayload::from(vec![1u8, 2, 3]);
        assert_eq!(payload.buffer_size(), 3);

        let mut buf = vec![0u8; payload.buffer_size()];
        assert_eq!(payload.serialize(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn test_empty_payload_is_error() {
        let payload = EncodedPayload::new(Bytes::new());
        let mut buf: [u8; 0] = [];
        let err = payload.serialize(&mut buf).unwrap_err();
        assert_eq!(err.message(), "encoded payload is empty");
    }

    #[test]
    fn test_short_buffer_is_error() {
        let payload = EncodedPayload::new(vec![9u8; 8]);
        let mut buf = [0u8; 4];
        assert!(payload.serialize(&mut buf).is_err());
    }
}
