//! Serialize data into the registration wire protocol.
use bytes::BufMut;

use crate::error::{Error, Result};

/// Types that can render themselves into a wire buffer.
pub trait ToByte {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()>;
}

impl<'a, T: ToByte + 'a + ?Sized> ToByte for &'a T {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        (*self).encode(buffer)
    }
}

// Wire strings are u16-length-prefixed UTF-8. The length guard matters:
// a descriptor string can never legitimately approach 64 KB.
impl ToByte for str {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        if self.len() > u16::MAX as usize {
            return Err(Error::Config(format!(
                "string too long for wire encoding: {} bytes",
                self.len()
            )));
        }
        buffer.put_u16(self.len() as u16);
        buffer.put(self.as_bytes());
        Ok(())
    }
}

impl ToByte for String {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        self.as_str().encode(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_str() {
        let mut buf = Vec::new();
        "resp".encode(&mut buf).unwrap();
        assert_eq!(buf, [0, 4, b'r', b'e', b's', b'p']);
    }

    #[test]
    fn test_encode_empty_str() {
        let mut buf = Vec::new();
        "".encode(&mut buf).unwrap();
        assert_eq!(buf, [0, 0]);
    }

    #[test]
    fn test_encode_string_matches_str() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        "7@localhost:9090".encode(&mut a).unwrap();
        String::from("7@localhost:9090").encode(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_encode_oversized_string_rejected() {
        let big = "x".repeat(u16::MAX as usize + 1);
        let mut buf = Vec::new();
        let err = big.as_str().encode(&mut buf).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
