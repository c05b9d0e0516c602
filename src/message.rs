//! Wire message envelope for the registration protocol.
//!
//! A message is a type tag plus a payload string, framed on the wire as:
//!
//! ```text
//! [u32 frame length][u16 type length][type][u16 payload length][payload]
//! ```
//!
//! All integers are big-endian; both strings are UTF-8. The frame length
//! covers everything after the 4-byte prefix and is bounded by
//! [`DEFAULT_MAX_MESSAGE_SIZE`](crate::constants::DEFAULT_MAX_MESSAGE_SIZE).

use bytes::{BufMut, Bytes};
use nombytes::NomBytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::constants::DEFAULT_MAX_MESSAGE_SIZE;
use crate::encode::ToByte;
use crate::error::{Error, Result};
use crate::parser::{bytes_to_string, parse_message_body};

/// A single request or response on a registration connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMessage {
    msg_type: String,
    payload: String,
}

impl WireMessage {
    pub fn new(msg_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            msg_type: msg_type.into(),
            payload: payload.into(),
        }
    }

    /// The message type tag, e.g. `"register"` or `"resp"`.
    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    /// The message payload, e.g. a descriptor string or a response text.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Decode a message from one frame body.
    ///
    /// The body must be consumed exactly; trailing bytes are a parse error.
    pub fn decode(data: Bytes) -> Result<Self> {
        let (rest, (msg_type, payload)) = parse_message_body(NomBytes::new(data.clone()))
            .map_err(|_| Error::ParsingError(data.clone()))?;
        if !rest.into_bytes().is_empty() {
            return Err(Error::ParsingError(data));
        }
        let msg_type = bytes_to_string(&msg_type).map_err(|_| Error::ParsingError(data.clone()))?;
        let payload = bytes_to_string(&payload).map_err(|_| Error::ParsingError(data))?;
        Ok(Self { msg_type, payload })
    }

    /// Encode the message with its 4-byte frame length prefix.
    pub fn encode_with_size(&self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        self.msg_type.encode(&mut body)?;
        self.payload.encode(&mut body)?;

        if body.len() > DEFAULT_MAX_MESSAGE_SIZE {
            return Err(Error::Config(format!(
                "message body {} exceeds maximum frame size {}",
                body.len(),
                DEFAULT_MAX_MESSAGE_SIZE
            )));
        }

        let mut framed = Vec::with_capacity(4 + body.len());
        framed.put_u32(body.len() as u32);
        framed.extend_from_slice(&body);
        Ok(framed)
    }
}

/// Read one wire message from the stream.
///
/// Fails with `MissingData` if the peer closes the stream or the frame is
/// empty or oversized, with `ParsingError` if the frame body is malformed,
/// and with `IoError` on any other network failure.
pub async fn read_message<S>(stream: &mut S) -> Result<WireMessage>
where
    S: AsyncRead + Unpin,
{
    let mut size_buf = [0u8; 4];
    stream
        .read_exact(&mut size_buf)
        .await
        .map_err(map_read_error)?;

    let size = u32::from_be_bytes(size_buf) as usize;
    if size == 0 {
        return Err(Error::MissingData("empty frame".to_owned()));
    }
    if size > DEFAULT_MAX_MESSAGE_SIZE {
        return Err(Error::MissingData(format!(
            "frame size {} exceeds maximum allowed size {}",
            size, DEFAULT_MAX_MESSAGE_SIZE
        )));
    }

    let mut data = vec![0u8; size];
    stream.read_exact(&mut data).await.map_err(map_read_error)?;

    WireMessage::decode(Bytes::from(data))
}

/// Write one wire message to the stream.
///
/// Fails with `IoError` on write or connection failure.
pub async fn write_message<S>(stream: &mut S, message: &WireMessage) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let framed = message.encode_with_size()?;
    stream.write_all(&framed).await.map_err(Error::from)?;
    stream.flush().await.map_err(Error::from)?;
    Ok(())
}

fn map_read_error(e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof => Error::MissingData("connection closed".to_owned()),
        kind => Error::IoError(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let msg = WireMessage::new("register", "7@localhost:9090");
        let framed = msg.encode_with_size().unwrap();

        // Strip the frame prefix and decode the body.
        let body_len = u32::from_be_bytes(framed[..4].try_into().unwrap()) as usize;
        assert_eq!(body_len, framed.len() - 4);

        let decoded = WireMessage::decode(Bytes::copy_from_slice(&framed[4..])).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let msg = WireMessage::new("resp", "ok");
        let mut framed = msg.encode_with_size().unwrap();
        framed.push(0xAB);

        let err = WireMessage::decode(Bytes::copy_from_slice(&framed[4..])).unwrap_err();
        assert!(matches!(err, Error::ParsingError(_)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = WireMessage::decode(Bytes::from_static(&[0xde, 0xad])).unwrap_err();
        assert!(matches!(err, Error::ParsingError(_)));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        // Valid framing, invalid UTF-8 in the type tag.
        let raw: &[u8] = &[0, 2, 0xff, 0xfe, 0, 0];
        let err = WireMessage::decode(Bytes::copy_from_slice(raw)).unwrap_err();
        assert!(matches!(err, Error::ParsingError(_)));
    }

    #[test]
    fn test_empty_payload_round_trips() {
        let msg = WireMessage::new("register", "");
        let framed = msg.encode_with_size().unwrap();
        let decoded = WireMessage::decode(Bytes::copy_from_slice(&framed[4..])).unwrap();
        assert_eq!(decoded.payload(), "");
    }

    #[tokio::test]
    async fn test_read_write_over_duplex() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        let msg = WireMessage::new("register", "42@worker-a:7070");
        write_message(&mut client, &msg).await.unwrap();

        let received = read_message(&mut server).await.unwrap();
        assert_eq!(received, msg);
    }

    #[tokio::test]
    async fn test_read_closed_stream_is_missing_data() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);

        let err = read_message(&mut server).await.unwrap_err();
        assert!(matches!(err, Error::MissingData(_)));
    }

    #[tokio::test]
    async fn test_read_oversized_frame_rejected() {
        let (mut client, mut server) = tokio::io::duplex(64);

        // A length prefix far beyond the frame cap.
        client
            .write_all(&(DEFAULT_MAX_MESSAGE_SIZE as u32 + 1).to_be_bytes())
            .await
            .unwrap();

        let err = read_message(&mut server).await.unwrap_err();
        assert!(matches!(err, Error::MissingData(_)));
    }

    #[tokio::test]
    async fn test_read_empty_frame_rejected() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&0u32.to_be_bytes()).await.unwrap();

        let err = read_message(&mut server).await.unwrap_err();
        assert_eq!(err, Error::MissingData("empty frame".to_owned()));
    }
}
