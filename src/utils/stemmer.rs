//! Stemming algorithms.
//!
//! [`PorterStemmer`] is the Porter (1980) algorithm with the two step 2
//! rules (`bli`, `logi`) from the author's reference implementation. It
//! runs five rewrite steps over a lowercase ASCII word:
//!
//! 1. Plurals and `-ed`/`-ing`, then a final `y` after a vowel to `i`
//! 2. Double suffixes such as `-ational` to `-ate`
//! 3. `-icate`, `-ful`, `-ness` and similar
//! 4. `-ance`, `-ment`, `-ion` and the rest, when the stem is long enough
//! 5. A final `-e`, and `-ll` to `-l`

use serde::{Deserialize, Serialize};

/// Reduces a lowercase word to its stem.
pub trait Stemmer: Send + Sync {
    fn stem(&self, word: &str) -> String;

    fn name(&self) -> &'static str;
}

/// Which stemmer a corpus was indexed with (recorded in meta.json)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StemmerKind {
    #[default]
    Porter,
    Identity,
}

impl StemmerKind {
    pub fn build(self) -> Box<dyn Stemmer> {
        match self {
            StemmerKind::Porter => Box::new(PorterStemmer),
            StemmerKind::Identity => Box::new(IdentityStemmer),
        }
    }
}

/// Porter stemmer for English
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        // Suffix rules are ASCII; other words pass through unchanged
        if word.len() <= 2 || !word.is_ascii() {
            return word.to_string();
        }

        let mut w = Word {
            b: word.as_bytes().to_vec(),
            stem: 0,
        };
        w.step1ab();
        if w.b.len() > 1 {
            w.step1c();
            w.step2();
            w.step3();
            w.step4();
            w.step5();
        }
        w.b.into_iter().map(char::from).collect()
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}

const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("bli", "ble"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
    ("logi", "log"),
];

const STEP3_RULES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

/// Word being stemmed; `stem` is the length of the part before the last matched suffix
struct Word {
    b: Vec<u8>,
    stem: usize,
}

impl Word {
    fn is_consonant(&self, i: usize) -> bool {
        match self.b[i] {
            b'a' | b'e' | b'i' | b'o' | b'u' => false,
            b'y' => {
                // A `y` is a consonant at the start or after a vowel, so
                // consonant-ness alternates along a run of `y`s
                let mut start = i;
                while start > 0 && self.b[start - 1] == b'y' {
                    start -= 1;
                }
                let first = start == 0
                    || matches!(self.b[start - 1], b'a' | b'e' | b'i' | b'o' | b'u');
                first == ((i - start) % 2 == 0)
            }
            _ => true,
        }
    }

    /// Number of vowel-consonant sequences in `b[..stem]`
    fn measure(&self) -> usize {
        let len = self.stem;
        let mut i = 0;
        let mut n = 0;
        while i < len && self.is_consonant(i) {
            i += 1;
        }
        loop {
            while i < len && !self.is_consonant(i) {
                i += 1;
            }
            if i >= len {
                return n;
            }
            while i < len && self.is_consonant(i) {
                i += 1;
            }
            n += 1;
        }
    }

    fn vowel_in_stem(&self) -> bool {
        (0..self.stem).any(|i| !self.is_consonant(i))
    }

    /// `b[..len]` ends with a doubled consonant
    fn double_consonant(&self, len: usize) -> bool {
        len >= 2 && self.b[len - 1] == self.b[len - 2] && self.is_consonant(len - 1)
    }

    /// `b[..len]` ends consonant-vowel-consonant, the last not w, x or y
    fn cvc(&self, len: usize) -> bool {
        len >= 3
            && self.is_consonant(len - 1)
            && !self.is_consonant(len - 2)
            && self.is_consonant(len - 3)
            && !matches!(self.b[len - 1], b'w' | b'x' | b'y')
    }

    /// Whether the word ends with `suffix`; on a match `stem` marks where it starts
    fn ends(&mut self, suffix: &str) -> bool {
        let suffix = suffix.as_bytes();
        if self.b.ends_with(suffix) {
            self.stem = self.b.len() - suffix.len();
            true
        } else {
            false
        }
    }

    fn set_to(&mut self, replacement: &str) {
        self.b.truncate(self.stem);
        self.b.extend_from_slice(replacement.as_bytes());
    }

    fn last(&self) -> u8 {
        self.b.last().copied().unwrap_or(0)
    }

    fn step1ab(&mut self) {
        if self.last() == b's' {
            if self.ends("sses") {
                self.b.truncate(self.b.len() - 2);
            } else if self.ends("ies") {
                self.set_to("i");
            } else if self.b.len() >= 2 && self.b[self.b.len() - 2] != b's' {
                self.b.pop();
            }
        }

        if self.ends("eed") {
            if self.measure() > 0 {
                self.b.pop();
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.vowel_in_stem() {
            self.b.truncate(self.stem);
            if self.ends("at") {
                self.set_to("ate");
            } else if self.ends("bl") {
                self.set_to("ble");
            } else if self.ends("iz") {
                self.set_to("ize");
            } else if self.double_consonant(self.b.len()) {
                if !matches!(self.last(), b'l' | b's' | b'z') {
                    self.b.pop();
                }
            } else {
                self.stem = self.b.len();
                if self.measure() == 1 && self.cvc(self.b.len()) {
                    self.b.push(b'e');
                }
            }
        }
    }

    fn step1c(&mut self) {
        if self.ends("y") && self.vowel_in_stem() {
            if let Some(last) = self.b.last_mut() {
                *last = b'i';
            }
        }
    }

    /// Apply the first rule whose suffix matches, if the stem has measure > 0
    fn replace_first(&mut self, rules: &[(&str, &str)]) {
        for (suffix, replacement) in rules {
            if self.ends(suffix) {
                if self.measure() > 0 {
                    self.set_to(replacement);
                }
                return;
            }
        }
    }

    fn step2(&mut self) {
        self.replace_first(STEP2_RULES);
    }

    fn step3(&mut self) {
        self.replace_first(STEP3_RULES);
    }

    fn step4(&mut self) {
        for suffix in STEP4_SUFFIXES {
            if self.ends(suffix) {
                let ion_ok = *suffix != "ion"
                    || (self.stem > 0 && matches!(self.b[self.stem - 1], b's' | b't'));
                if ion_ok && self.measure() > 1 {
                    self.b.truncate(self.stem);
                }
                return;
            }
        }
    }

    fn step5(&mut self) {
        self.stem = self.b.len();
        if self.last() == b'e' {
            let m = self.measure();
            let stem_len = self.b.len() - 1;
            if m > 1 || (m == 1 && !self.cvc(stem_len)) {
                self.b.pop();
            }
        }
        self.stem = self.b.len();
        if self.last() == b'l' && self.double_consonant(self.b.len()) && self.measure() > 1 {
            self.b.pop();
        }
    }
}

/// Leaves words unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStemmer;

impl Stemmer for IdentityStemmer {
    fn stem(&self, word: &str) -> String {
        word.to_string()
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}
