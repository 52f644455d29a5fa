pub mod json_config;
