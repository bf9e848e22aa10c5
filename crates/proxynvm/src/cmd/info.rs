use proxynvm_transport::Link;
use serde::Serialize;

use crate::cmd::{open, Context, TargetArgs};
use crate::exit::{nvm_error, CliResult, SUCCESS};
use crate::output::print_record;

#[derive(Serialize)]
struct InfoOutput {
    schema_id: &'static str,
    socket: String,
    link: &'static str,
    capacity: u64,
    frame_buffer_size: usize,
    link_overhead: usize,
    mtu: usize,
    write_chunk: usize,
    read_chunk: usize,
    read_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
}

pub fn run(args: TargetArgs, ctx: &Context) -> CliResult<i32> {
    let mut device = open(&args, &ctx.config)?;
    let capacity = device
        .get_size()
        .map_err(|err| nvm_error("size query failed", err))?;

    let out = InfoOutput {
        schema_id: "https://schemas.3leaps.dev/proxynvm/cli/v1/device-info.schema.json",
        socket: args.path.display().to_string(),
        link: device.get_ref().link_name(),
        capacity,
        frame_buffer_size: ctx.config.frame_buffer_size,
        link_overhead: ctx.config.link_overhead,
        mtu: device.mtu(),
        write_chunk: device.request_budget(),
        read_chunk: device.response_budget(),
        read_timeout_ms: ctx.config.read_timeout_ms,
        write_timeout_ms: ctx.config.write_timeout_ms,
    };

    let timeout = |ms: Option<u64>| ms.map_or_else(|| "none".to_string(), |ms| format!("{ms}ms"));
    let rows = [
        ("Socket", out.socket.clone()),
        ("Link", out.link.to_string()),
        ("Capacity", format!("{} bytes", out.capacity)),
        ("Frame buffer", format!("{} bytes", out.frame_buffer_size)),
        ("Link overhead", format!("{} bytes", out.link_overhead)),
        ("MTU", format!("{} bytes", out.mtu)),
        ("Write chunk", format!("{} bytes", out.write_chunk)),
        ("Read chunk", format!("{} bytes", out.read_chunk)),
        ("Read timeout", timeout(out.read_timeout_ms)),
        ("Write timeout", timeout(out.write_timeout_ms)),
    ];
    print_record(&out, &rows, &out.capacity.to_string(), ctx.format);
    Ok(SUCCESS)
}
