//! Pure tokenization shared by index build and query paths.
//!
//! Pipeline: casefold -> strip ASCII punctuation -> split on whitespace ->
//! drop stopwords -> Porter stem. Deterministic and total over `&str`; the
//! only failure mode named by the design (non-UTF-8 input) cannot occur once
//! the caller has handed us a `&str`, so `tokenize` itself never errors.

use once_cell::sync::Lazy;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::sync::OnceLock;

/// The fixed stopword set named by the design. Kept small and domain-neutral
/// rather than the exhaustive list a general-purpose NLP library would ship,
/// matching the corpus this index was built for.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
        "it", "its", "of", "on", "that", "the", "to", "was", "will", "with",
    ]
    .into_iter()
    .collect()
});

fn stemmer() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

fn is_ascii_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// Tokenize `text` into an ordered sequence of stems, preserving duplicates.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .map(|c| if is_ascii_punctuation(c) { ' ' } else { c })
        .collect();

    let stemmer = stemmer();
    stripped
        .split_whitespace()
        .filter(|tok| !tok.is_empty() && !STOPWORDS.contains(tok))
        .map(|tok| stemmer.stem(tok).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        let tokens = tokenize("OPC Cement, 43-Grade!");
        assert_eq!(tokens, vec!["opc", "cement", "43", "grade"]);
    }

    #[test]
    fn drops_stopwords() {
        let tokens = tokenize("a cement for the house");
        assert_eq!(tokens, vec!["cement", "hous"]);
    }

    #[test]
    fn stems_suffixes() {
        let tokens = tokenize("cementing cemented cements");
        assert!(tokens.iter().all(|t| t == "cement"));
    }

    #[test]
    fn empty_text_yields_empty_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("the a an").is_empty());
    }

    #[test]
    fn preserves_order_and_duplicates() {
        let tokens = tokenize("steel steel bars");
        assert_eq!(tokens, vec!["steel", "steel", "bar"]);
    }
}
