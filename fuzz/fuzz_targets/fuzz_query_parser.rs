#![no_main]

use boolir::index::{DocumentRegistry, IndexReader, InvertedIndex, PermutermIndex};
use boolir::query::Search;
use boolir::utils::{Preprocessor, StemmerKind};
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

fn search() -> &'static Search {
    static SEARCH: OnceLock<Search> = OnceLock::new();
    SEARCH.get_or_init(|| {
        let preprocessor = Preprocessor::new(StemmerKind::Porter, true);
        let docs = [
            ("macbeth.txt", "The Tragedy of Macbeth. Enter three Witches."),
            ("julius.txt", "The Tragedy of Julius Caesar. Beware the ides of March."),
            ("hamlet.txt", "The Tragedy of Hamlet. Enter the Ghost."),
        ];

        let mut registry = DocumentRegistry::new();
        let mut inverted = InvertedIndex::new();
        let mut permuterm = PermutermIndex::new();
        for (name, text) in docs {
            let Ok(id) = registry.register(name) else {
                continue;
            };
            for term in preprocessor.process(text) {
                inverted.insert_token(&term, id);
                permuterm.insert_token(&term);
            }
        }

        Search::new(IndexReader::from_parts(inverted, permuterm, registry), preprocessor)
    })
}

fuzz_target!(|data: &str| {
    // Any query either evaluates to a valid subset of the universe or is rejected
    if let Ok(outcome) = search().evaluate(data) {
        let universe = search().reader().universe();
        assert!(outcome.postings.windows(2).all(|w| w[0] < w[1]));
        assert!(outcome.postings.iter().all(|id| universe.contains(id)));
    }
});
