pub mod protocol_logger;
