//! Colored printing of search results and query errors

use crate::query::{QueryError, SearchResults};
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// When to color output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }

    pub fn stdout(self) -> StandardStream {
        StandardStream::stdout(self.choice())
    }

    pub fn stderr(self) -> StandardStream {
        StandardStream::stderr(self.choice())
    }
}

/// Print matching document names, any term substitutions, and the summary line
pub fn print_results<W: WriteColor>(out: &mut W, results: &SearchResults) -> io::Result<()> {
    for note in &results.notes {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(out, "note")?;
        out.reset()?;
        writeln!(out, ": {}", note)?;
    }

    for name in &results.documents {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        writeln!(out, "{}", name)?;
        out.reset()?;
    }

    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "Found {} results", results.len())?;
    out.reset()?;
    writeln!(
        out,
        " in {:.2} ms",
        results.elapsed.as_secs_f64() * 1000.0
    )?;

    Ok(())
}

/// Print a rejected query
pub fn print_query_error<W: WriteColor>(out: &mut W, error: &QueryError) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "invalid query")?;
    out.reset()?;
    writeln!(out, ": {}", error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TermNote;
    use std::time::Duration;
    use termcolor::NoColor;

    fn render(f: impl FnOnce(&mut NoColor<Vec<u8>>) -> io::Result<()>) -> String {
        let mut out = NoColor::new(Vec::new());
        f(&mut out).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_print_results() {
        let results = SearchResults {
            documents: vec!["a.txt".to_string(), "b.txt".to_string()],
            postings: vec![0, 1],
            notes: vec![TermNote::Fuzzy {
                term: "macbeht".to_string(),
                substitutes: vec!["macbeth".to_string()],
                distance: 2,
            }],
            elapsed: Duration::from_micros(1500),
        };

        let text = render(|out| print_results(out, &results));
        assert_eq!(
            text,
            "note: no exact match for 'macbeht'; using macbeth (edit distance 2)\n\
             a.txt\n\
             b.txt\n\
             Found 2 results in 1.50 ms\n"
        );
    }

    #[test]
    fn test_print_query_error() {
        let text = render(|out| print_query_error(out, &QueryError::Empty));
        assert_eq!(text, "invalid query: empty query\n");
    }
}
