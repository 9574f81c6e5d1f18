use crate::index::types::{BuildSummary, DocId};
use crate::index::writer::IndexWriter;
use crate::utils::progress::CrawlProgress;
use crate::utils::{remove_index, resolve_index_dir, AppConfig, Preprocessor};
use anyhow::{ensure, Context, Result};
use globset::{Glob, GlobMatcher};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A document found on disk, with its registry name
struct SourceDocument {
    doc_id: DocId,
    path: PathBuf,
    name: String,
}

/// Read and preprocess one document; `None` if it has to be skipped
fn process_document(
    doc: &SourceDocument,
    preprocessor: &Preprocessor,
    max_file_size: u64,
) -> Option<Vec<String>> {
    match doc.path.metadata() {
        Ok(meta) if meta.len() > max_file_size => {
            log::warn!(
                "Skipping {}: {} bytes exceeds the {} byte limit",
                doc.name,
                meta.len(),
                max_file_size
            );
            return None;
        }
        Ok(_) => {}
        Err(e) => {
            log::warn!("Skipping {}: {}", doc.name, e);
            return None;
        }
    }

    match fs::read_to_string(&doc.path) {
        Ok(text) => Some(preprocessor.process(&text)),
        Err(e) => {
            log::warn!("Skipping {}: {}", doc.name, e);
            None
        }
    }
}

/// Registry name of a corpus file: its path relative to the corpus root, `/`-separated
fn document_name(rel_path: &Path) -> String {
    rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Every corpus file matching `matcher`, sorted by name
fn collect_documents(root: &Path, matcher: &GlobMatcher) -> Vec<(PathBuf, String)> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut documents: Vec<(PathBuf, String)> = walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Walk error: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter_map(|entry| {
            let path = entry.into_path();
            let rel_path = path.strip_prefix(root).ok()?;
            if !matcher.is_match(rel_path) {
                return None;
            }
            let name = document_name(rel_path);
            Some((path, name))
        })
        .collect();

    documents.sort_by(|a, b| a.1.cmp(&b.1));
    documents
}

/// Crawl `corpus_path` into `index_path`.
///
/// Documents are read and preprocessed chunk by chunk, in parallel when
/// enabled, and inserted in ascending doc-id order so the result does not
/// depend on thread scheduling.
pub fn build_index(
    corpus_path: &Path,
    index_path: &Path,
    config: &AppConfig,
    force: bool,
    silent: bool,
) -> Result<BuildSummary> {
    let start = Instant::now();
    let root = corpus_path.canonicalize().context("Invalid corpus path")?;
    ensure!(root.is_dir(), "{} is not a directory", root.display());

    if force && index_path.exists() {
        remove_index(index_path).context("Failed to remove existing index")?;
    }

    let matcher = Glob::new(&config.document_glob)
        .with_context(|| format!("Invalid document glob '{}'", config.document_glob))?
        .compile_matcher();

    if !silent {
        println!("Indexing: {}", root.display());
    }

    let preprocessor = Preprocessor::new(config.stemmer, config.remove_stopwords);
    let mut writer = IndexWriter::open(index_path, &root, config.stemmer, config.remove_stopwords)?;

    let known_before = writer.registry().len();
    let mut documents = Vec::new();
    for (path, name) in collect_documents(&root, &matcher) {
        let doc_id = writer.register(&name)?;
        documents.push(SourceDocument { doc_id, path, name });
    }
    documents.sort_by_key(|doc| doc.doc_id);
    let new_documents = writer.registry().len() - known_before;
    log::info!(
        "Found {} documents ({} new) matching '{}'",
        documents.len(),
        new_documents,
        config.document_glob
    );

    let chunk_size = config.effective_chunk_size();
    let num_chunks = documents.len().div_ceil(chunk_size);
    let progress = CrawlProgress::new(documents.len() as u64, silent);
    let mut indexed = 0;
    let mut skipped = 0;

    for (chunk_idx, chunk) in documents.chunks(chunk_size).enumerate() {
        if num_chunks > 1 {
            progress.set_message(format!("Chunk {}/{}", chunk_idx + 1, num_chunks));
        }

        // Order of `collect` follows the chunk, so insertion stays in doc-id order
        let processed: Vec<Option<Vec<String>>> = if config.parallel_indexing {
            chunk
                .par_iter()
                .map(|doc| process_document(doc, &preprocessor, config.max_file_size))
                .collect()
        } else {
            chunk
                .iter()
                .map(|doc| process_document(doc, &preprocessor, config.max_file_size))
                .collect()
        };

        for (doc, terms) in chunk.iter().zip(processed) {
            match terms {
                Some(terms) => {
                    writer.add_document(doc.doc_id, &terms);
                    indexed += 1;
                }
                None => skipped += 1,
            }
            progress.inc();
        }
    }
    progress.finish(indexed);

    let meta = writer.write()?;

    let summary = BuildSummary {
        documents_seen: documents.len(),
        documents_indexed: indexed,
        documents_skipped: skipped,
        new_documents,
        term_count: meta.term_count as usize,
        elapsed_ms: start.elapsed().as_millis(),
    };

    if !silent {
        println!(
            "Indexed {} documents ({} terms) in {} ms",
            summary.documents_indexed, summary.term_count, summary.elapsed_ms
        );
        println!("Index stored at: {}", index_path.display());
        if skipped > 0 {
            eprintln!("({} documents could not be read)", skipped);
        }
    }

    Ok(summary)
}

/// Build the index for `corpus_path` in the default or overridden index directory
pub fn build_index_auto(
    corpus_path: &Path,
    index_dir: Option<&Path>,
    config: &AppConfig,
    force: bool,
) -> Result<BuildSummary> {
    let root = corpus_path.canonicalize().context("Invalid corpus path")?;
    let index_path = resolve_index_dir(&root, index_dir)?;
    build_index(&root, &index_path, config, force, false)
}
