use std::error::Error;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use log::{error, info};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use hytale_protocol::logger::protocol_logger;
use hytale_protocol::network::packet::compression::Compressor;
use hytale_protocol::network::packet::packet_decoder::PacketDecoder;
use hytale_protocol::network::packet::packet_encoder::PacketEncoder;
use hytale_protocol::network::packet::packet_error::PacketError;
use hytale_protocol::network::packet::packet_io::{read_packet, read_packet_timeout, write_packet};
use hytale_protocol::network::packet::packet_registry::{self, PacketRegistry};
use hytale_protocol::options::{self, Options};
use hytale_protocol::protocol::default_registry;
use hytale_protocol::protocol::samples::sample_packets;
use hytale_protocol::protocol_config::{self, ProtocolConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let options = options::parse();
    if let Err(err) = protocol_logger::init(options.log, options.log_dir.as_deref()) {
        eprintln!("Failed to setup logger: {}", err);
        return ExitCode::FAILURE;
    }

    let code = match run(&options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    };
    log::logger().flush();
    code
}

async fn run(options: &Options) -> Result<(), Box<dyn Error>> {
    let config = protocol_config::load(&options.config)?;
    let registry = packet_registry::init(default_registry()?)?;
    let compressor: Arc<dyn Compressor> = Arc::new(config.compression.compressor());

    if let Some(input) = &options.input {
        decode_capture(input, registry, compressor, &config, options.limit).await
    } else if let Some(output) = &options.write_sample {
        write_sample(output, registry, compressor).await
    } else {
        Ok(())
    }
}

async fn decode_capture(
    path: &Path,
    registry: &PacketRegistry,
    compressor: Arc<dyn Compressor>,
    config: &ProtocolConfig,
    limit: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let start_time = Instant::now();
    let decoder = PacketDecoder::new(registry, compressor);
    let pool = config.buffer_pool.build();
    let mut reader = BufReader::new(File::open(path).await?);

    let mut count = 0;
    while limit.map_or(true, |limit| count < limit) {
        let result = match config.read_timeout() {
            Some(timeout) => read_packet_timeout(&mut reader, &decoder, &pool, timeout).await,
            None => read_packet(&mut reader, &decoder, &pool).await,
        };
        let packet = match result {
            Ok(packet) => packet,
            Err(PacketError::ConnectionLost) => break,
            Err(err) => return Err(format!("Frame {} of {}: {}", count, path.display(), err).into()),
        };
        count += 1;
        info!("#{} {:?}", count, packet);
    }

    info!("Decoded {} packets from {} in {:.2?}", count, path.display(), start_time.elapsed());
    Ok(())
}

async fn write_sample(
    path: &Path,
    registry: &PacketRegistry,
    compressor: Arc<dyn Compressor>,
) -> Result<(), Box<dyn Error>> {
    let encoder = PacketEncoder::new(registry, compressor);
    let mut writer = BufWriter::new(File::create(path).await?);

    let packets = sample_packets();
    for packet in &packets {
        write_packet(&mut writer, &encoder, &**packet).await?;
    }
    writer.shutdown().await?;

    info!("Wrote {} sample packets to {}", packets.len(), path.display());
    Ok(())
}
