mod cmd;
mod exit;
mod logging;
mod output;
mod settings;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::cmd::{Command, Context};
use crate::exit::CliResult;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;
use crate::settings::{parse_duration, Overrides};

#[derive(Parser, Debug)]
#[command(name = "proxynvm", version, about = "Proxy NVM storage client")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "PROXYNVM_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    /// Driver configuration file (JSON).
    #[arg(long, value_name = "FILE", env = "PROXYNVM_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Size of the link message buffer in bytes.
    #[arg(long, value_name = "BYTES", global = true)]
    frame_buffer_size: Option<usize>,

    /// Bytes of each message reserved for the link's own framing.
    #[arg(long, value_name = "BYTES", global = true)]
    link_overhead: Option<usize>,

    /// Socket read/write timeout (e.g. 5s, 500ms).
    #[arg(long, value_parser = parse_duration, global = true)]
    timeout: Option<Duration>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            frame_buffer_size: self.frame_buffer_size,
            link_overhead: self.link_overhead,
            timeout: self.timeout,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.log_format, cli.log_level) {
        eprintln!("warning: logging unavailable: {err}");
    }

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match run(cli, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

fn run(cli: Cli, format: OutputFormat) -> CliResult<i32> {
    let config = settings::load(cli.config.as_deref(), &cli.overrides())?;
    cmd::run(cli.command, &Context { format, config })
}
