//! `mailprobe filter` – extract one domain's addresses from a file, in place.

use anyhow::Result;
use mailprobe_core::input;
use std::path::Path;

pub fn run_filter(input: &Path, domain: &str) -> Result<()> {
    let report = input::filter_file(input, domain)?;
    println!(
        "{}: kept {} unique @{} address(es) out of {} match(es)",
        input.display(),
        report.unique,
        domain,
        report.found
    );
    Ok(())
}
