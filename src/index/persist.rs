use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Memory-map `path` and decode it
pub(crate) fn read_mapped<T>(path: &Path, decode: impl FnOnce(&[u8]) -> Result<T>) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    // SAFETY: index files are only rewritten by the indexing command, never while being served
    let map = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map {}", path.display()))?;
    decode(&map).with_context(|| format!("Corrupt index file {}", path.display()))
}

/// Load a persisted structure, falling back to an empty one when it is missing or corrupt
pub(crate) fn load_or_empty<T: Default>(
    path: &Path,
    what: &str,
    decode: impl FnOnce(&[u8]) -> Result<T>,
) -> T {
    if !path.exists() {
        log::info!("No {} at {}, starting empty", what, path.display());
        return T::default();
    }

    match read_mapped(path, decode) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Failed to load {} ({:#}), starting empty", what, e);
            T::default()
        }
    }
}

/// Write `bytes` to a sibling temp file, then rename over `path`
pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    {
        let mut file = BufWriter::new(
            File::create(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?,
        );
        file.write_all(bytes)?;
        file.flush()?;
    }
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
