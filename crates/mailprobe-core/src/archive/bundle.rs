//! Zip bundle construction for one archive tick.

use rand::Rng;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("bundle io: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("no source files exist to archive")]
    NothingToArchive,
}

/// Collision-resistant bundle name: timestamp plus a random numeric suffix,
/// tagged with the run keyword when present.
pub fn bundle_name(keyword: Option<&str>) -> String {
    let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    let suffix: u32 = rand::thread_rng().gen_range(1000..10_000);
    match keyword {
        Some(k) => format!("backup_{}_{}_{}.zip", k, stamp, suffix),
        None => format!("backup_{}_{}.zip", stamp, suffix),
    }
}

/// Write a deflate-compressed bundle of `sources` to `dest`. Missing sources
/// are skipped and logged; they are expected (e.g. no failures recorded yet).
/// Returns (added, skipped). If nothing exists, the empty bundle is removed
/// and `NothingToArchive` is returned.
pub fn write_bundle(sources: &[PathBuf], dest: &Path) -> Result<(usize, usize), ArchiveError> {
    let file = File::create(dest)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut added = 0usize;
    let mut skipped = 0usize;
    for src in sources {
        if !src.exists() {
            tracing::debug!(path = %src.display(), "archive source missing, skipped");
            skipped += 1;
            continue;
        }
        let name = src
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed");
        zip.start_file(name, options)?;
        let data = fs::read(src)?;
        zip.write_all(&data)?;
        added += 1;
    }
    zip.finish()?;

    if added == 0 {
        let _ = fs::remove_file(dest);
        return Err(ArchiveError::NothingToArchive);
    }
    Ok((added, skipped))
}

const BUF_SIZE: usize = 64 * 1024;

/// SHA-256 of a file as lowercase hex. Chunked read; off the probe hot path.
pub fn sha256_path(path: &Path) -> Result<String, ArchiveError> {
    let mut f = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_name_is_tagged_and_unique_enough() {
        let plain = bundle_name(None);
        assert!(plain.starts_with("backup_"));
        assert!(plain.ends_with(".zip"));
        let tagged = bundle_name(Some("premium"));
        assert!(tagged.starts_with("backup_premium_"));
    }

    #[test]
    fn bundle_contains_existing_sources_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("available.txt");
        let b = dir.path().join("taken.txt");
        fs::write(&a, "a@x.com\n").unwrap();
        fs::write(&b, "b@x.com\n").unwrap();
        let missing = dir.path().join("failed.txt");

        let dest = dir.path().join("bundle.zip");
        let (added, skipped) =
            write_bundle(&[a, b, missing], &dest).unwrap();
        assert_eq!(added, 2);
        assert_eq!(skipped, 1);

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["available.txt", "taken.txt"]);

        let mut content = String::new();
        archive
            .by_name("available.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "a@x.com\n");
    }

    #[test]
    fn all_sources_missing_leaves_no_bundle_behind() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("bundle.zip");
        let err = write_bundle(&[dir.path().join("nope.txt")], &dest).unwrap_err();
        assert!(matches!(err, ArchiveError::NothingToArchive));
        assert!(!dest.exists());
    }

    #[test]
    fn sha256_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "hello\n").unwrap();
        assert_eq!(
            sha256_path(&path).unwrap(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }
}
