use std::path::PathBuf;
use std::sync::Arc;
use clap::{ArgGroup, Parser};
use log::LevelFilter;
use once_cell::sync::OnceCell;

static OPTIONS: OnceCell<Arc<Options>> = OnceCell::new();

#[derive(Parser, Debug)]
#[command(name = "hytale-protocol", version, about = "Decodes and writes Hytale packet captures")]
#[command(group(ArgGroup::new("mode").required(true).args(["input", "write_sample"])))]
pub struct Options {
    #[arg(long, value_parser = parse_file, help = "Capture of concatenated frames to decode")]
    pub input: Option<PathBuf>,

    #[arg(long, help = "Writes the sample packet set as a capture to this path")]
    pub write_sample: Option<PathBuf>,

    #[arg(long, default_value = "protocol.json", help = "Protocol config file, created with defaults when missing")]
    pub config: PathBuf,

    #[arg(long, default_value = "info", help = "Sets the logger level.")]
    pub log: LevelFilter,

    #[arg(long, help = "Also write the log to a file in this directory")]
    pub log_dir: Option<PathBuf>,

    #[arg(long, help = "Stop after decoding this many packets")]
    pub limit: Option<usize>,
}

/// Parses the process arguments once. Later calls return the first result.
pub fn parse() -> Arc<Options> {
    OPTIONS.get_or_init(|| Arc::new(Options::parse())).clone()
}

fn parse_file(path: &str) -> Result<PathBuf, String> {
    let p = PathBuf::from(path);
    if !p.exists() {
        return Err(format!("Path '{}' does not exist", path));
    }
    if !p.is_file() {
        return Err(format!("Path '{}' is not a file", path));
    }
    Ok(p)
}
