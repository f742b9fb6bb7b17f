//! `mailprobe archive` – one-shot bundle and upload of the result files.

use anyhow::Result;
use mailprobe_core::archive::{self, GofileUploader};
use mailprobe_core::config::MailprobeConfig;
use mailprobe_core::outcome::Outcome;
use mailprobe_core::store::ResultStore;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run_archive(
    cfg: &MailprobeConfig,
    input: PathBuf,
    keyword: Option<String>,
) -> Result<()> {
    let dir = std::env::current_dir()?;
    let mut sources: Vec<PathBuf> = Outcome::ALL
        .iter()
        .map(|&outcome| ResultStore::category_path(&dir, outcome, keyword.as_deref()))
        .collect();
    sources.push(input);

    let uploader = Arc::new(GofileUploader::from_config(&cfg.archive));
    let report = archive::archive_once(&sources, &dir, keyword.as_deref(), uploader).await?;

    println!(
        "bundled {} file(s) ({} missing, skipped)",
        report.files_added, report.files_skipped
    );
    match report.link {
        Some(link) => println!("uploaded: {}", link),
        None => println!("upload failed or not configured; bundle discarded"),
    }
    Ok(())
}
