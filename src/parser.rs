//! Deserialize data from the registration wire protocol.
use bytes::Bytes;
use nom::{bytes::complete::take, number::complete::be_u16, IResult};
use nombytes::NomBytes;

/// Convert bytes to a validated UTF-8 string.
/// Returns an error if the bytes are not valid UTF-8.
pub fn bytes_to_string(bytes: &Bytes) -> Result<String, nom::Err<nom::error::Error<NomBytes>>> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|_| {
            nom::Err::Failure(nom::error::Error::new(
                NomBytes::from(bytes.as_ref()),
                nom::error::ErrorKind::Verify,
            ))
        })
}

/// Parse a u16-length-prefixed wire string.
pub fn parse_string(s: NomBytes) -> IResult<NomBytes, Bytes> {
    let (s, length) = be_u16(s)?;
    let (s, string) = take(length)(s)?;
    Ok((s, string.into_bytes()))
}

/// Parse the body of a wire message: a type tag followed by a payload.
///
/// Returns the raw byte strings; UTF-8 validation happens at the message
/// layer so that a parse failure and an encoding failure report the same way.
pub fn parse_message_body(s: NomBytes) -> IResult<NomBytes, (Bytes, Bytes)> {
    let (s, msg_type) = parse_string(s)?;
    let (s, payload) = parse_string(s)?;
    Ok((s, (msg_type, payload)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string() {
        let data = Bytes::from_static(&[0, 4, b'r', b'e', b's', b'p']);
        let (rest, s) = parse_string(NomBytes::new(data)).unwrap();
        assert_eq!(s, Bytes::from_static(b"resp"));
        assert!(rest.into_bytes().is_empty());
    }

    #[test]
    fn test_parse_string_truncated() {
        // Claims 10 bytes but only 2 follow.
        let data = Bytes::from_static(&[0, 10, b'a', b'b']);
        assert!(parse_string(NomBytes::new(data)).is_err());
    }

    #[test]
    fn test_parse_message_body() {
        let mut raw = vec![0, 8];
        raw.extend_from_slice(b"register");
        raw.extend_from_slice(&[0, 16]);
        raw.extend_from_slice(b"7@localhost:9090");

        let (rest, (msg_type, payload)) =
            parse_message_body(NomBytes::new(Bytes::from(raw))).unwrap();
        assert_eq!(msg_type, Bytes::from_static(b"register"));
        assert_eq!(payload, Bytes::from_static(b"7@localhost:9090"));
        assert!(rest.into_bytes().is_empty());
    }

    #[test]
    fn test_parse_message_body_missing_payload() {
        let mut raw = vec![0, 8];
        raw.extend_from_slice(b"register");
        assert!(parse_message_body(NomBytes::new(Bytes::from(raw))).is_err());
    }

    #[test]
    fn test_bytes_to_string_invalid_utf8() {
        let bad = Bytes::from_static(&[0xff, 0xfe]);
        assert!(bytes_to_string(&bad).is_err());
    }
}
