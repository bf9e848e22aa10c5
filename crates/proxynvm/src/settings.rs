//! Driver configuration layering for the CLI.
//!
//! Defaults, then an optional JSON file, then command-line flags (which
//! clap may have filled from the environment).

use std::fs;
use std::path::Path;
use std::time::Duration;

use proxynvm_driver::DriverConfig;
use tracing::debug;

use crate::exit::{io_error, nvm_error, CliError, CliResult, USAGE};

/// Values given on the command line. `None` keeps the lower layer.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub frame_buffer_size: Option<usize>,
    pub link_overhead: Option<usize>,
    pub timeout: Option<Duration>,
}

pub fn load(file: Option<&Path>, overrides: &Overrides) -> CliResult<DriverConfig> {
    let mut config = match file {
        Some(path) => read_file(path)?,
        None => DriverConfig::default(),
    };

    if let Some(size) = overrides.frame_buffer_size {
        config.frame_buffer_size = size;
    }
    if let Some(overhead) = overrides.link_overhead {
        config.link_overhead = overhead;
    }
    if let Some(timeout) = overrides.timeout {
        let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        config.read_timeout_ms = Some(ms);
        config.write_timeout_ms = Some(ms);
    }

    config
        .mtu()
        .map_err(|err| nvm_error("invalid configuration", err))?;
    debug!(?config, "driver configuration");
    Ok(config)
}

fn read_file(path: &Path) -> CliResult<DriverConfig> {
    let text = fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    serde_json::from_str(&text).map_err(|err| {
        CliError::new(
            USAGE,
            format!("invalid configuration in {}: {err}", path.display()),
        )
    })
}

/// Parse `5s`, `500ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration value: {input}"))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(tag: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "proxynvm-settings-{tag}-{}.json",
            std::process::id()
        ));
        fs::write(&path, contents).expect("temp config should be writable");
        path
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let config = load(None, &Overrides::default()).unwrap();
        assert_eq!(config, DriverConfig::default());
    }

    #[test]
    fn flags_override_file() {
        let path = temp_file("layer", r#"{"frame_buffer_size": 512, "link_overhead": 12}"#);
        let overrides = Overrides {
            link_overhead: Some(0),
            timeout: Some(Duration::from_millis(1500)),
            ..Overrides::default()
        };

        let config = load(Some(&path), &overrides).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.frame_buffer_size, 512);
        assert_eq!(config.link_overhead, 0);
        assert_eq!(config.read_timeout_ms, Some(1500));
        assert_eq!(config.write_timeout_ms, Some(1500));
    }

    #[test]
    fn unknown_file_fields_are_usage_errors() {
        let path = temp_file("unknown", r#"{"mtu": 100}"#);
        let err = load(Some(&path), &Overrides::default()).unwrap_err();
        let _ = fs::remove_file(&path);
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn unusable_frame_size_is_rejected() {
        let overrides = Overrides {
            frame_buffer_size: Some(16),
            ..Overrides::default()
        };
        assert_eq!(load(None, &overrides).unwrap_err().code, USAGE);
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("").is_err());
    }
}
