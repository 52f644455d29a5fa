use std::time::Duration;
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use crate::network::packet::buffer_pool::BufferPool;
use crate::network::packet::packet::Packet;
use crate::network::packet::packet_decoder::PacketDecoder;
use crate::network::packet::packet_encoder::PacketEncoder;
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::HEADER_SIZE;

/// Fills the header, treating EOF before its first byte as a closed connection.
async fn read_header<R>(reader: &mut R) -> Result<[u8; HEADER_SIZE], PacketError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_SIZE];
    let mut filled = 0;
    while filled < HEADER_SIZE {
        let read = reader.read(&mut header[filled..]).await?;
        if read == 0 {
            return Err(if filled == 0 {
                PacketError::ConnectionLost
            } else {
                PacketError::Eof { field: "header" }
            });
        }
        filled += read;
    }
    Ok(header)
}

/// Reads and decodes one frame. The header is validated before any payload
/// byte is read, and the payload buffer goes back to the pool on every path.
pub async fn read_packet<R>(
    reader: &mut R,
    decoder: &PacketDecoder<'_>,
    pool: &BufferPool,
) -> Result<Box<dyn Packet>, PacketError>
where
    R: AsyncRead + Unpin,
{
    let header = read_header(reader).await?;
    let frame = decoder.decode_header(header).inspect_err(|err| {
        warn!("Rejected frame header: {}", err);
    })?;

    let mut payload = pool.pull();
    payload.resize(frame.length, 0);
    reader.read_exact(&mut payload).await.map_err(|err| match err.kind() {
        std::io::ErrorKind::UnexpectedEof => PacketError::Eof { field: "payload" },
        _ => PacketError::Io(err),
    })?;

    let packet = decoder.decode_payload(&frame, &payload).inspect_err(|err| {
        warn!("Failed to decode Packet {} (0x{:02X}): {}", frame.info.name, frame.info.id, err);
    })?;
    debug!("Received Packet {} (0x{:02X}), {} bytes", frame.info.name, frame.info.id, frame.length);
    Ok(packet)
}

/// [`read_packet`] bounded by a deadline. On timeout the partially read frame
/// is abandoned.
pub async fn read_packet_timeout<R>(
    reader: &mut R,
    decoder: &PacketDecoder<'_>,
    pool: &BufferPool,
    timeout: Duration,
) -> Result<Box<dyn Packet>, PacketError>
where
    R: AsyncRead + Unpin,
{
    tokio::time::timeout(timeout, read_packet(reader, decoder, pool))
        .await
        .map_err(|_| PacketError::Timeout)
        .and_then(|r| r)
}

/// Encodes and writes one frame, flushing the writer.
pub async fn write_packet<W>(
    writer: &mut W,
    encoder: &PacketEncoder<'_>,
    packet: &dyn Packet,
) -> Result<(), PacketError>
where
    W: AsyncWrite + Unpin,
{
    let bytes = encoder.encode(packet)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    debug!("Sent {} ({} bytes)", packet.type_name(), bytes.len());
    Ok(())
}
