use serde::Serialize;

use crate::cmd::{open, Context, TargetArgs};
use crate::exit::{nvm_error, CliResult, SUCCESS};
use crate::output::print_record;

#[derive(Serialize)]
struct SizeOutput {
    schema_id: &'static str,
    socket: String,
    capacity: u64,
}

pub fn run(args: TargetArgs, ctx: &Context) -> CliResult<i32> {
    let mut device = open(&args, &ctx.config)?;
    let capacity = device
        .get_size()
        .map_err(|err| nvm_error("size query failed", err))?;

    let out = SizeOutput {
        schema_id: "https://schemas.3leaps.dev/proxynvm/cli/v1/device-size.schema.json",
        socket: args.path.display().to_string(),
        capacity,
    };
    let rows = [
        ("Socket", out.socket.clone()),
        ("Capacity", format!("{capacity} bytes")),
    ];
    print_record(&out, &rows, &capacity.to_string(), ctx.format);
    Ok(SUCCESS)
}
