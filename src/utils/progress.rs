//! Crawl progress reporting; a no-op when the `progress` feature is disabled
//! or output is silenced.

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

/// Progress over a known number of documents
#[derive(Clone)]
pub struct CrawlProgress {
    #[cfg(feature = "progress")]
    bar: Option<ProgressBar>,
}

impl CrawlProgress {
    #[cfg(feature = "progress")]
    pub fn new(total: u64, silent: bool) -> Self {
        if silent {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("█▓▒░  "));
        }
        bar.set_message("Indexing documents...");
        Self { bar: Some(bar) }
    }

    #[cfg(not(feature = "progress"))]
    pub fn new(_total: u64, _silent: bool) -> Self {
        Self {}
    }

    /// One document handled (indexed or skipped)
    pub fn inc(&self) {
        #[cfg(feature = "progress")]
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    pub fn set_message(&self, _msg: String) {
        #[cfg(feature = "progress")]
        if let Some(bar) = &self.bar {
            bar.set_message(_msg);
        }
    }

    pub fn finish(&self, indexed: usize) {
        #[cfg(feature = "progress")]
        if let Some(bar) = &self.bar {
            bar.finish_with_message(format!("Indexed {} documents", indexed));
        }
        #[cfg(not(feature = "progress"))]
        let _ = indexed;
    }
}
