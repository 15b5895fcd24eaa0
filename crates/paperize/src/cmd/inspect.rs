use paperize_frame::{survey, Survey};
use serde::Serialize;

use crate::cmd::{read_inputs, InspectArgs};
use crate::exit::{frame_error, CliResult, FAILURE, SUCCESS};
use crate::output::{index_ranges, print_fields, print_json, print_pretty, OutputFormat};

#[derive(Serialize)]
struct InspectOutput<'a> {
    file_name: Option<&'a str>,
    total: Option<usize>,
    received: &'a [usize],
    missing: &'a [usize],
    checksum: Option<&'a str>,
    complete: bool,
}

/// Exits non-zero while parts are still missing, so scripts can loop on it.
pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let blobs = read_inputs(&args.files)?;
    let report = survey(&blobs).map_err(|err| frame_error("inspect failed", err))?;

    print_survey(&report, format);
    if report.is_complete() {
        Ok(SUCCESS)
    } else {
        Ok(FAILURE)
    }
}

fn print_survey(report: &Survey, format: OutputFormat) {
    let total = report
        .total
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".to_string());
    let file_name = report.file_name.clone().unwrap_or_else(|| "-".to_string());

    match format {
        OutputFormat::Json => print_json(&InspectOutput {
            file_name: report.file_name.as_deref(),
            total: report.total,
            received: &report.received,
            missing: &report.missing,
            checksum: report.checksum.as_deref(),
            complete: report.is_complete(),
        }),
        OutputFormat::Table => print_fields(&[
            ("file", file_name),
            ("total", total),
            ("received", index_ranges(&report.received)),
            ("missing", index_ranges(&report.missing)),
            (
                "checksum",
                report.checksum.clone().unwrap_or_else(|| "-".to_string()),
            ),
            ("complete", report.is_complete().to_string()),
        ]),
        OutputFormat::Pretty => print_pretty(&[
            ("file", file_name),
            ("total", total),
            ("missing", index_ranges(&report.missing)),
            ("complete", report.is_complete().to_string()),
        ]),
        OutputFormat::Raw => {
            for index in &report.missing {
                println!("{index}");
            }
        }
    }
}
