use std::fs;

use serde::Serialize;

use crate::cmd::{open, Context, WriteArgs};
use crate::exit::{io_error, nvm_error, CliResult, SUCCESS};
use crate::output::print_record;

#[derive(Serialize)]
struct WriteOutput {
    schema_id: &'static str,
    offset: u64,
    bytes_written: u64,
}

pub fn run(args: WriteArgs, ctx: &Context) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let mut device = open(&args.target, &ctx.config)?;
    let written = device
        .write(args.offset, &payload)
        .map_err(|err| nvm_error("write failed", err))?;

    let out = WriteOutput {
        schema_id: "https://schemas.3leaps.dev/proxynvm/cli/v1/write-result.schema.json",
        offset: args.offset,
        bytes_written: written,
    };
    let rows = [
        ("Offset", args.offset.to_string()),
        ("Written", format!("{written} bytes")),
    ];
    print_record(&out, &rows, &written.to_string(), ctx.format);
    Ok(SUCCESS)
}

fn resolve_payload(args: &WriteArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}
