use serde::Serialize;

use crate::cmd::{open, Context, EraseArgs};
use crate::exit::{nvm_error, CliResult, SUCCESS};
use crate::output::print_record;

#[derive(Serialize)]
struct EraseOutput {
    schema_id: &'static str,
    offset: u64,
    bytes_erased: u64,
}

pub fn run(args: EraseArgs, ctx: &Context) -> CliResult<i32> {
    let mut device = open(&args.target, &ctx.config)?;
    let erased = device
        .erase(args.offset, args.length)
        .map_err(|err| nvm_error("erase failed", err))?;

    let out = EraseOutput {
        schema_id: "https://schemas.3leaps.dev/proxynvm/cli/v1/erase-result.schema.json",
        offset: args.offset,
        bytes_erased: erased,
    };
    let rows = [
        ("Offset", args.offset.to_string()),
        ("Erased", format!("{erased} bytes")),
    ];
    print_record(&out, &rows, &erased.to_string(), ctx.format);
    Ok(SUCCESS)
}
