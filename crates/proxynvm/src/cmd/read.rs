use std::fs;

use serde::Serialize;

use crate::cmd::{open, Context, ReadArgs};
use crate::exit::{io_error, nvm_error, CliResult, SUCCESS};
use crate::output::{hex, hex_dump, print_raw, print_record, OutputFormat};

#[derive(Serialize)]
struct ReadOutput {
    schema_id: &'static str,
    offset: u64,
    length: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_hex: Option<String>,
}

pub fn run(args: ReadArgs, ctx: &Context) -> CliResult<i32> {
    let mut device = open(&args.target, &ctx.config)?;
    let data = device
        .read(args.offset, args.length)
        .map_err(|err| nvm_error("read failed", err))?;

    if let Some(path) = &args.out {
        fs::write(path, &data)
            .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
        let out = ReadOutput {
            schema_id: "https://schemas.3leaps.dev/proxynvm/cli/v1/read-result.schema.json",
            offset: args.offset,
            length: data.len() as u64,
            file: Some(path.display().to_string()),
            data_hex: None,
        };
        let rows = [
            ("Offset", args.offset.to_string()),
            ("Length", data.len().to_string()),
            ("File", path.display().to_string()),
        ];
        print_record(&out, &rows, &data.len().to_string(), ctx.format);
        return Ok(SUCCESS);
    }

    match ctx.format {
        OutputFormat::Raw => print_raw(&data),
        OutputFormat::Pretty => {
            for line in hex_dump(args.offset, &data) {
                println!("{line}");
            }
        }
        format => {
            let out = ReadOutput {
                schema_id: "https://schemas.3leaps.dev/proxynvm/cli/v1/read-result.schema.json",
                offset: args.offset,
                length: data.len() as u64,
                file: None,
                data_hex: Some(hex(&data)),
            };
            let rows = [
                ("Offset", args.offset.to_string()),
                ("Length", data.len().to_string()),
                ("Data", hex_dump(args.offset, &data).join("\n")),
            ];
            print_record(&out, &rows, "", format);
        }
    }
    Ok(SUCCESS)
}
