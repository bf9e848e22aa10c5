use std::fmt::Write as _;
use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Print one flat result record.
///
/// `rows` drives the table and pretty forms; `raw` is the single value
/// printed for `--format raw`.
pub fn print_record<T: Serialize>(
    record: &T,
    rows: &[(&str, String)],
    raw: &str,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in rows {
                table.add_row(vec![field.to_string(), value.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (field, value) in rows {
                println!("  {:<18}{value}", format!("{field}:"));
            }
        }
        OutputFormat::Raw => {
            println!("{raw}");
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Lowercase hex, no separators.
pub fn hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Classic 16-bytes-per-line dump, addresses starting at `base`.
pub fn hex_dump(base: u64, data: &[u8]) -> Vec<String> {
    data.chunks(16)
        .zip((base..).step_by(16))
        .map(|(line, addr)| {
            let mut bytes = String::new();
            for byte in line {
                let _ = write!(bytes, "{byte:02x} ");
            }
            let ascii: String = line
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();
            format!("{addr:08x}  {bytes:<48} |{ascii}|")
        })
        .collect()
}
