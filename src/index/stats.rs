use crate::index::reader::IndexReader;
use crate::utils::{is_indexed, list_indexed_corpora};
use anyhow::{bail, Result};
use std::path::Path;

/// Display index statistics
pub fn show_stats(index_path: &Path) -> Result<()> {
    if !is_indexed(index_path) {
        bail!(
            "No index found at {}. Run 'boolir index' first.",
            index_path.display()
        );
    }
    let reader = IndexReader::open(index_path);

    println!("Index Statistics");
    println!("================");
    println!();
    if let Some(meta) = reader.meta() {
        println!("Corpus path:      {}", meta.corpus_path.display());
    }
    println!("Index location:   {}", index_path.display());
    if let Some(meta) = reader.meta() {
        println!("Index version:    {}", meta.version);
        println!("Stemmer:          {:?}", meta.stemmer);
        println!("Stopwords:        {}", if meta.remove_stopwords { "removed" } else { "kept" });
    }
    println!("Document count:   {}", reader.registry().len());
    println!("Term count:       {}", reader.inverted().len());
    println!("Postings:         {}", reader.inverted().posting_count());
    println!("Permuterm terms:  {}", reader.permuterm().len());
    println!("Trie nodes:       {}", reader.permuterm().trie().node_count());

    // Terms by document frequency
    let mut frequent: Vec<(&str, usize)> = reader
        .inverted()
        .terms()
        .map(|term| (term, reader.inverted().get_postings(term).len()))
        .collect();
    frequent.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    if !frequent.is_empty() {
        println!();
        println!("Most frequent terms:");
        for (term, df) in frequent.iter().take(10) {
            println!("  {:20} {}", term, df);
        }
    }

    if let Ok(size) = dir_size(index_path) {
        println!();
        println!("Index size:       {}", format_size(size));
    }

    if let Some(meta) = reader.meta() {
        println!();
        println!("Created:          {}", format_timestamp(meta.created_at));
        println!("Updated:          {}", format_timestamp(meta.updated_at));
    }

    Ok(())
}

/// List all indexed corpora
pub fn list_indexes() -> Result<()> {
    let corpora = list_indexed_corpora()?;

    if corpora.is_empty() {
        println!("No indexed corpora found.");
        return Ok(());
    }

    println!("Indexed Corpora");
    println!("===============");
    println!();

    for corpus in corpora {
        let status = if corpus.corpus_path.exists() { "" } else { " [missing]" };
        println!("  {}{}", corpus.corpus_path.display(), status);
        println!("    Index: {}", corpus.index_dir.display());
        println!();
    }

    Ok(())
}

/// Calculate directory size recursively
fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut size = 0;
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                size += entry.metadata()?.len();
            } else if path.is_dir() {
                size += dir_size(&path)?;
            }
        }
    }
    Ok(size)
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Seconds since the epoch, as UTC `YYYY-MM-DD HH:MM:SS`
fn format_timestamp(ts: u64) -> String {
    let days = ts / 86_400;
    let secs = ts % 86_400;

    // Civil-from-days over the proleptic Gregorian calendar
    let z = days as i64 + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
        year,
        month,
        day,
        secs / 3_600,
        secs % 3_600 / 60,
        secs % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp(951_782_400), "2000-02-29 00:00:00 UTC");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn test_show_stats_requires_index() {
        let dir = tempfile::tempdir().unwrap();
        assert!(show_stats(dir.path()).is_err());
    }
}
