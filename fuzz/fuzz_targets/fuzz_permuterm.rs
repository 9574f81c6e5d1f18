#![no_main]

use arbitrary::Arbitrary;
use boolir::index::PermutermIndex;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    tokens: Vec<String>,
    prefix: String,
    suffix: String,
    blob: Vec<u8>,
}

fuzz_target!(|input: Input| {
    // Decoding arbitrary bytes must fail cleanly, never panic
    let _ = PermutermIndex::decode(&input.blob);

    let mut index = PermutermIndex::new();
    for token in &input.tokens {
        index.insert_token(token);
    }

    let pattern = format!("{}*{}", input.prefix, input.suffix);
    if let Ok(matches) = index.get_tokens(&pattern) {
        for term in &matches {
            assert!(term.starts_with(&input.prefix) && term.ends_with(&input.suffix));
            assert!(term.len() >= input.prefix.len() + input.suffix.len());
            assert!(index.search_token(term));
        }
    }

    let decoded = PermutermIndex::decode(&index.encode()).expect("encoded index decodes");
    assert_eq!(decoded.len(), index.len());
});
