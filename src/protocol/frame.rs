//! Length-prefixed framing: a 4-byte big-endian length, then the body.

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ProtocolError;

/// Read one frame body. A clean or partial EOF is [`ProtocolError::ConnectionClosed`].
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed);
        }
        Err(e) => return Err(e.into()),
    };

    if len > max_len {
        return Err(ProtocolError::FrameTooLarge { len, max: max_len });
    }

    let mut body = vec![0u8; len];
    match reader.read_exact(&mut body).await {
        Ok(_) => Ok(body),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => Err(e.into()),
    }
}

/// Write one frame and flush.
pub async fn write_frame<W>(writer: &mut W, body: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(body.len()).map_err(|_| ProtocolError::FrameTooLarge {
        len: body.len(),
        max: u32::MAX as usize,
    })?;
    writer.write_u32(len).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame holding a bare JSON value (the response leg).
pub async fn read_value<R>(reader: &mut R, max_len: usize) -> Result<serde_json::Value, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let body = read_frame(reader, max_len).await?;
    serde_json::from_slice(&body).map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))
}

/// Write any serializable value as a bare frame.
pub async fn write_value<W, T>(writer: &mut W, value: &T) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let body =
        serde_json::to_vec(value).map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))?;
    write_frame(writer, &body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_value_over_duplex() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        write_value(&mut client, &json!(55)).await.unwrap();

        let value = read_value(&mut server, 1024).await.unwrap();
        assert_eq!(value, json!(55));
    }

    #[tokio::test]
    async fn test_frame_layout() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"0").await.unwrap();
        assert_eq!(buf, vec![0, 0, 0, 1, b'0']);
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &[b' '; 64]).await.unwrap();

        let err = read_frame(&mut buf.as_slice(), 16).await.unwrap_err();
        assert!(matches!(err, ProtocolError::FrameTooLarge { len: 64, max: 16 }));
    }

    #[tokio::test]
    async fn test_truncated_frame_is_connection_closed() {
        let empty: &[u8] = &[];
        let err = read_frame(&mut &*empty, 16).await.unwrap_err();
        assert!(matches!(err, ProtocolError::ConnectionClosed));

        let truncated: &[u8] = &[0, 0, 0, 8, b'{'];
        let err = read_frame(&mut &*truncated, 16).await.unwrap_err();
        assert!(matches!(err, ProtocolError::ConnectionClosed));
    }
}
