use crate::index::types::{INDEX_FILES, META_FILE};
use crate::utils::stemmer::StemmerKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "boolir";
const CONFIG_FILE: &str = "config.json";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Glob a corpus file's relative path must match to be indexed
    #[serde(default = "default_document_glob")]
    pub document_glob: String,

    /// Stemmer applied to document and query terms
    #[serde(default)]
    pub stemmer: StemmerKind,

    /// Drop English stopwords from documents
    #[serde(default = "default_remove_stopwords")]
    pub remove_stopwords: bool,

    /// Preprocess the documents of a chunk in parallel
    #[serde(default = "default_parallel_indexing")]
    pub parallel_indexing: bool,

    /// Documents read and preprocessed per chunk (bounds memory while crawling)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Documents larger than this are skipped
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_document_glob() -> String {
    "*.txt".to_string()
}

fn default_remove_stopwords() -> bool {
    true
}

fn default_parallel_indexing() -> bool {
    true
}

fn default_chunk_size() -> usize {
    1000
}

fn default_max_file_size() -> u64 {
    64 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            document_glob: default_document_glob(),
            stemmer: StemmerKind::default(),
            remove_stopwords: default_remove_stopwords(),
            parallel_indexing: default_parallel_indexing(),
            chunk_size: default_chunk_size(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load config from an explicit file, or return default if it does not exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
            let config: AppConfig = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
            Ok(config)
        } else {
            log::debug!("No config at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file {}", config_path.display()))?;
        Ok(())
    }

    /// Chunk size with zero treated as one document per chunk
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the application data directory for storing indexes
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

/// Get the index directory for a corpus directory
pub fn get_index_dir(corpus_path: &Path) -> Result<PathBuf> {
    let app_data = get_app_data_dir()?;
    let indexes_dir = app_data.join("indexes");
    fs::create_dir_all(&indexes_dir)?;

    Ok(indexes_dir.join(hash_path(corpus_path)))
}

/// Pick the index directory: an explicit override wins over the per-corpus default
pub fn resolve_index_dir(corpus_path: &Path, index_dir: Option<&Path>) -> Result<PathBuf> {
    match index_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => get_index_dir(corpus_path),
    }
}

/// Hash a path to create a unique folder name
/// Format: first 16 chars of dir name + hash
fn hash_path(path: &Path) -> String {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let path_str = canonical.to_string_lossy();

    let dir_name = canonical
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let sanitized: String = dir_name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(16)
        .collect();

    let mut hasher = DefaultHasher::new();
    path_str.hash(&mut hasher);
    let hash = hasher.finish();

    format!("{}-{:016x}", sanitized, hash)
}

/// Check if an index directory holds a finished index
pub fn is_indexed(index_dir: &Path) -> bool {
    index_dir.join(META_FILE).exists()
}

/// List all corpora indexed under the app data directory
pub fn list_indexed_corpora() -> Result<Vec<IndexLocation>> {
    let app_data = get_app_data_dir()?;
    let indexes_dir = app_data.join("indexes");

    if !indexes_dir.exists() {
        return Ok(Vec::new());
    }

    let mut corpora = Vec::new();

    for entry in fs::read_dir(&indexes_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }

        let meta_path = path.join(META_FILE);
        let Ok(file) = fs::File::open(&meta_path) else {
            continue;
        };
        match serde_json::from_reader::<_, serde_json::Value>(file) {
            Ok(meta) => {
                if let Some(root) = meta.get("corpus_path").and_then(|v| v.as_str()) {
                    corpora.push(IndexLocation {
                        corpus_path: PathBuf::from(root),
                        index_dir: path,
                    });
                }
            }
            Err(e) => log::warn!("Unreadable {}: {}", meta_path.display(), e),
        }
    }

    corpora.sort_by(|a, b| a.corpus_path.cmp(&b.corpus_path));
    Ok(corpora)
}

/// Delete the index files in `index_dir`, then the directory itself if nothing else is left.
///
/// Only files an index writes (and their temp files) are touched, so
/// pointing this at a directory with other content never deletes it.
pub fn remove_index(index_dir: &Path) -> Result<()> {
    if !index_dir.is_dir() {
        return Ok(());
    }

    for name in INDEX_FILES {
        let path = index_dir.join(name);
        for file in [path.with_extension("tmp"), path] {
            match fs::remove_file(&file) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to remove {}", file.display()));
                }
            }
        }
    }

    let leftover = fs::read_dir(index_dir)
        .with_context(|| format!("Failed to read {}", index_dir.display()))?
        .next()
        .is_some();
    if leftover {
        log::warn!(
            "Kept {}: it holds files that are not part of the index",
            index_dir.display()
        );
    } else {
        fs::remove_dir(index_dir)
            .with_context(|| format!("Failed to remove {}", index_dir.display()))?;
    }
    Ok(())
}

/// Information about an indexed corpus
#[derive(Debug, Clone)]
pub struct IndexLocation {
    pub corpus_path: PathBuf,
    pub index_dir: PathBuf,
}
