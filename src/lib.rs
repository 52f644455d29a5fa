pub mod logger;
pub mod network;
pub mod options;
pub mod protocol;
pub mod protocol_config;
pub mod utils;
