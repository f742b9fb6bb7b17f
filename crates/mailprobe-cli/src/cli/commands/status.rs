//! `mailprobe status` – recorded outcome counts per category.

use anyhow::Result;
use mailprobe_core::outcome::Outcome;
use mailprobe_core::store::ResultStore;

pub fn run_status(keyword: Option<&str>) -> Result<()> {
    let dir = std::env::current_dir()?;
    let mut total = 0usize;
    println!("{:<12} {:<8} FILE", "CATEGORY", "COUNT");
    for outcome in Outcome::ALL {
        let path = ResultStore::category_path(&dir, outcome, keyword);
        let count = if path.exists() {
            std::fs::read_to_string(&path)?
                .lines()
                .filter(|l| !l.trim().is_empty())
                .count()
        } else {
            0
        };
        total += count;
        println!("{:<12} {:<8} {}", outcome.to_string(), count, path.display());
    }
    println!("{:<12} {}", "total", total);
    Ok(())
}
