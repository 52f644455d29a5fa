use std::path::Path;
use std::time::{Duration, Instant};
use log::info;
use serde::{Deserialize, Serialize};
use crate::network::packet::buffer_pool::BufferPool;
use crate::network::packet::compression::{ZstdCompressor, DEFAULT_COMPRESSION_LEVEL};
use crate::utils::io::json_config::{ConfigError, JsonConfig};

const VERSION: u32 = 1;
const DEFAULT_READ_TIMEOUT_MS: u64 = 30_000;

// NOTE: All structs in config should have #[serde(default)]

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProtocolConfig {
    pub version: u32,
    pub compression: CompressionConfig,
    pub buffer_pool: BufferPoolConfig,
    /// Per frame read deadline, `0` disables it.
    pub read_timeout_ms: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            version: VERSION,
            compression: CompressionConfig::default(),
            buffer_pool: BufferPoolConfig::default(),
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl ProtocolConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct CompressionConfig {
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { level: DEFAULT_COMPRESSION_LEVEL }
    }
}

impl CompressionConfig {
    pub fn compressor(&self) -> ZstdCompressor {
        ZstdCompressor::new(self.level)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct BufferPoolConfig {
    pub buffers: usize,
    pub buffer_capacity: usize,
    pub max_retained_capacity: usize,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self { buffers: 16, buffer_capacity: 4096, max_retained_capacity: 1 << 20 }
    }
}

impl BufferPoolConfig {
    pub fn build(&self) -> BufferPool {
        BufferPool::new(self.buffers, self.buffer_capacity, self.max_retained_capacity)
    }
}

/// Loads the config and writes it back so new fields show up in the file.
pub fn load(path: &Path) -> Result<ProtocolConfig, ConfigError> {
    info!("Loading Config...");
    let config_time = Instant::now();

    let config: ProtocolConfig = JsonConfig::load(path, true)?;
    JsonConfig::save(path, &config, true)?;

    info!("Config Loaded in {:.2?}", config_time.elapsed());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case_and_defaults() {
        let config: ProtocolConfig =
            serde_json::from_str(r#"{ "Compression": { "Level": 9 }, "ReadTimeoutMs": 0 }"#).unwrap();
        assert_eq!(config.compression.level, 9);
        assert_eq!(config.buffer_pool, BufferPoolConfig::default());
        assert_eq!(config.version, VERSION);
        assert_eq!(config.read_timeout(), None);

        let json = serde_json::to_string(&ProtocolConfig::default()).unwrap();
        assert!(json.contains("\"BufferPool\""));
        assert!(json.contains("\"MaxRetainedCapacity\""));
    }

    #[test]
    fn test_builds_runtime_parts() {
        let config = ProtocolConfig::default();
        assert_eq!(config.compression.compressor().level(), DEFAULT_COMPRESSION_LEVEL);
        assert_eq!(config.buffer_pool.build().available(), 16);
        assert_eq!(config.read_timeout(), Some(Duration::from_secs(30)));
    }
}
