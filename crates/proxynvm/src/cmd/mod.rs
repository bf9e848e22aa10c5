use std::path::PathBuf;

use clap::{Args, Subcommand};
use proxynvm_driver::{DriverConfig, NvmDriver};
use proxynvm_transport::Link;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod erase;
pub mod info;
pub mod read;
pub mod size;
pub mod version;
pub mod write;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the device capacity.
    Size(TargetArgs),
    /// Print capacity plus the frame and chunk budgets in effect.
    Info(TargetArgs),
    /// Read a byte range.
    Read(ReadArgs),
    /// Write bytes at an offset.
    Write(WriteArgs),
    /// Erase a byte range (fills it with 0xFF).
    Erase(EraseArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Settings shared by every subcommand.
#[derive(Debug)]
pub struct Context {
    pub format: OutputFormat,
    pub config: DriverConfig,
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Size(args) => size::run(args, ctx),
        Command::Info(args) => info::run(args, ctx),
        Command::Read(args) => read::run(args, ctx),
        Command::Write(args) => write::run(args, ctx),
        Command::Erase(args) => erase::run(args, ctx),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Socket path of the storage peer.
    #[arg(env = "PROXYNVM_SOCKET")]
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Start offset (decimal or 0x-prefixed hex).
    #[arg(long, short = 'o', default_value = "0", value_parser = parse_number)]
    pub offset: u64,
    /// Number of bytes to read.
    #[arg(long, short = 'n', value_parser = parse_number)]
    pub length: u64,
    /// Write the bytes to a file instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Start offset (decimal or 0x-prefixed hex).
    #[arg(long, short = 'o', default_value = "0", value_parser = parse_number)]
    pub offset: u64,
    /// Raw string payload.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EraseArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Start offset (decimal or 0x-prefixed hex).
    #[arg(long, short = 'o', default_value = "0", value_parser = parse_number)]
    pub offset: u64,
    /// Number of bytes to erase.
    #[arg(long, short = 'n', value_parser = parse_number)]
    pub length: u64,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a decimal or `0x`-prefixed hexadecimal number.
pub fn parse_number(input: &str) -> Result<u64, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|err| format!("invalid number {input:?}: {err}"))
}

pub type Device = NvmDriver<Box<dyn Link>>;

/// Connect to the storage peer and wrap the link in a driver.
#[cfg(unix)]
pub fn open(target: &TargetArgs, config: &DriverConfig) -> CliResult<Device> {
    use crate::exit::{nvm_error, transport_error};

    let link = proxynvm_transport::connect(&target.path)
        .map_err(|err| transport_error("connect failed", err))?;
    link.set_timeouts(config.read_timeout(), config.write_timeout())
        .map_err(|err| transport_error("socket setup failed", err))?;
    NvmDriver::new(Box::new(link) as Box<dyn Link>, config)
        .map_err(|err| nvm_error("driver setup failed", err))
}

#[cfg(not(unix))]
pub fn open(_target: &TargetArgs, _config: &DriverConfig) -> CliResult<Device> {
    Err(crate::exit::CliError::new(
        crate::exit::USAGE,
        "unix domain sockets are not available on this platform",
    ))
}
