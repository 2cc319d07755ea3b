//! Fuzzy search index over catalog items
//!
//! Each item contributes four searchable fields. Scores are distances in `0.0..=1.0`
//! (0 = exact); where a word matches inside a field does not change its score.

use crate::config::SearchConfig;
use crate::types::Item;
use std::cmp::Ordering;
use std::sync::Arc;
use strsim::normalized_damerau_levenshtein;

/// Searchable item fields, in tie-break rank order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SearchField {
    /// Item name
    Name,
    /// Comma-separated tags
    Tags,
    /// Section label
    Section,
    /// Collection labels
    Collections,
}

/// One ranked match
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    /// Position of the item in the indexed collection
    pub index: usize,
    /// Mean distance of the query words (lower is better)
    pub score: f64,
    /// Best-ranked field that matched a query word
    pub field: SearchField,
}

struct FieldText {
    field: SearchField,
    text: String,
    words: Vec<String>,
}

impl FieldText {
    fn new(field: SearchField, raw: &str) -> Self {
        let text = raw.to_lowercase();
        let words = split_words(&text).map(str::to_string).collect();
        Self { field, text, words }
    }
}

/// Precomputed, lower-cased field text for one item collection
pub struct SearchIndex {
    items: Arc<Vec<Item>>,
    entries: Vec<[FieldText; 4]>,
    threshold: f64,
    min_token_len: usize,
}

impl SearchIndex {
    /// Index `items` with the thresholds from `config`
    pub fn build(items: Arc<Vec<Item>>, config: &SearchConfig) -> Self {
        let entries = items
            .iter()
            .map(|item| {
                [
                    FieldText::new(SearchField::Name, &item.name),
                    FieldText::new(SearchField::Tags, &item.tags),
                    FieldText::new(SearchField::Section, &item.section),
                    FieldText::new(SearchField::Collections, &item.collections.join(" ")),
                ]
            })
            .collect();

        Self {
            items,
            entries,
            threshold: config.threshold,
            min_token_len: config.min_token_len,
        }
    }

    /// The collection this index was built from
    pub fn items(&self) -> &Arc<Vec<Item>> {
        &self.items
    }

    /// Whether this index was built from exactly `items`
    pub fn is_for(&self, items: &Arc<Vec<Item>>) -> bool {
        Arc::ptr_eq(&self.items, items)
    }

    /// Number of indexed items
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ranked matches for `query`, best first
    ///
    /// Every query word must match some field. Ties fall back to field rank, then to
    /// collection order. A query with no words matches nothing.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let query = query.to_lowercase();
        let words: Vec<&str> = split_words(&query).collect();
        if words.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(index, fields)| self.score_item(fields, &words, index))
            .collect();

        hits.sort_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| a.field.cmp(&b.field))
                .then_with(|| a.index.cmp(&b.index))
        });
        hits
    }

    fn score_item(&self, fields: &[FieldText; 4], words: &[&str], index: usize) -> Option<SearchHit> {
        let mut total = 0.0;
        let mut best_field = SearchField::Collections;

        for word in words {
            let (score, field) = self.score_word(fields, word)?;
            if score > self.threshold {
                return None;
            }
            total += score;
            best_field = best_field.min(field);
        }

        Some(SearchHit {
            index,
            score: total / words.len() as f64,
            field: best_field,
        })
    }

    /// Best distance of one query word over all fields
    fn score_word(&self, fields: &[FieldText; 4], word: &str) -> Option<(f64, SearchField)> {
        let mut best: Option<(f64, SearchField)> = None;
        let fuzzy = word.chars().count() >= self.min_token_len;

        for field in fields {
            if field.text.contains(word) {
                // Fields are in rank order, so the first exact hit cannot be beaten
                return Some((0.0, field.field));
            }
            if !fuzzy {
                continue;
            }
            for candidate in &field.words {
                let score = word_distance(word, candidate);
                if best.is_none_or(|(b, _)| score.total_cmp(&b) == Ordering::Less) {
                    best = Some((score, field.field));
                }
            }
        }

        best
    }
}

/// Distance between a query word and a field word, also trying the field word's
/// prefix of the same length so partially typed words still match
fn word_distance(word: &str, candidate: &str) -> f64 {
    let whole = 1.0 - normalized_damerau_levenshtein(word, candidate);
    let len = word.chars().count();
    match candidate.char_indices().nth(len) {
        Some((cut, _)) => whole.min(1.0 - normalized_damerau_levenshtein(word, &candidate[..cut])),
        None => whole,
    }
}

fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, tags: &str, section: &str, collections: &[&str]) -> Item {
        Item {
            id: id.to_string(),
            uid: 0,
            name: name.to_string(),
            images: vec![],
            note: String::new(),
            section: section.to_string(),
            tags: tags.to_string(),
            collections: collections.iter().map(|c| c.to_string()).collect(),
            size: String::new(),
            featured: false,
        }
    }

    fn index(items: Vec<Item>) -> SearchIndex {
        SearchIndex::build(Arc::new(items), &SearchConfig::default())
    }

    fn hit_ids(index: &SearchIndex, query: &str) -> Vec<String> {
        index
            .search(query)
            .into_iter()
            .map(|hit| index.items()[hit.index].id.clone())
            .collect()
    }

    #[test]
    fn test_substring_match_scores_zero() {
        let idx = index(vec![item("a", "Velvet Cloak", "", "Outerwear", &[])]);
        let hits = idx.search("cloak");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 0.0);
        assert_eq!(hits[0].field, SearchField::Name);
    }

    #[test]
    fn test_typo_tolerance() {
        let idx = index(vec![
            item("jacket", "Leather Jacket", "", "Outerwear", &[]),
            item("boots", "Riding Boots", "", "Shoes", &[]),
        ]);
        assert_eq!(hit_ids(&idx, "jaket"), vec!["jacket"]);
        assert_eq!(hit_ids(&idx, "ridnig"), vec!["boots"]);
        assert!(idx.search("xylophone").is_empty());
    }

    #[test]
    fn test_partial_word_matches_prefix() {
        let idx = index(vec![item("a", "Embroidered Waistcoat", "", "Tops", &[])]);
        assert_eq!(hit_ids(&idx, "embroid"), vec!["a"]);
        assert_eq!(hit_ids(&idx, "embriod"), vec!["a"]);
    }

    #[test]
    fn test_short_words_need_substring() {
        let idx = index(vec![item("a", "Top Hat", "", "Hats", &[])]);
        assert_eq!(hit_ids(&idx, "ha"), vec!["a"]);
        assert!(idx.search("hx").is_empty());
    }

    #[test]
    fn test_every_word_must_match() {
        let idx = index(vec![
            item("coat", "Wool Coat", "warm", "Outerwear", &[]),
            item("scarf", "Wool Scarf", "", "Accessories", &[]),
        ]);
        assert_eq!(hit_ids(&idx, "wool coat"), vec!["coat"]);
        assert_eq!(hit_ids(&idx, "wool warm"), vec!["coat"]);
    }

    #[test]
    fn test_all_configured_fields_are_searched() {
        let idx = index(vec![
            item("n", "Silk Gloves", "", "Accessories", &[]),
            item("t", "Plain Shirt", "vintage, linen", "Tops", &[]),
            item("s", "Plain Skirt", "", "Bottoms", &[]),
            item("c", "Plain Dress", "", "Dresses", &["Midsummer"]),
        ]);
        assert_eq!(hit_ids(&idx, "gloves"), vec!["n"]);
        assert_eq!(hit_ids(&idx, "linen"), vec!["t"]);
        assert_eq!(hit_ids(&idx, "bottoms"), vec!["s"]);
        assert_eq!(hit_ids(&idx, "midsummer"), vec!["c"]);
    }

    #[test]
    fn test_ranking_prefers_closer_match_then_field_then_order() {
        let idx = index(vec![
            item("tagged", "Blouse", "cape", "Tops", &[]),
            item("near", "Capa", "", "Outerwear", &[]),
            item("exact", "Cape", "", "Outerwear", &[]),
            item("exact2", "Red Cape", "", "Outerwear", &[]),
        ]);
        assert_eq!(
            hit_ids(&idx, "cape"),
            vec!["exact", "exact2", "tagged", "near"]
        );

        let hits = idx.search("cape");
        assert_eq!(hits[2].field, SearchField::Tags);
        assert!(hits[3].score > 0.0 && hits[3].score <= 0.3);
    }

    #[test]
    fn test_location_does_not_affect_score() {
        let idx = index(vec![
            item("late", "Long Velvet Evening Gown", "", "Dresses", &[]),
            item("early", "Gown Of Velvet", "", "Dresses", &[]),
        ]);
        let hits = idx.search("gown");
        assert_eq!(hits[0].score, hits[1].score);
        assert_eq!(hit_ids(&idx, "gown"), vec!["late", "early"]);
    }

    #[test]
    fn test_empty_and_punctuation_queries_match_nothing() {
        let idx = index(vec![item("a", "Hat", "", "Hats", &[])]);
        assert!(idx.search("").is_empty());
        assert!(idx.search(" ,; ").is_empty());
    }

    #[test]
    fn test_is_for_uses_identity() {
        let items = Arc::new(vec![item("a", "Hat", "", "Hats", &[])]);
        let idx = SearchIndex::build(items.clone(), &SearchConfig::default());
        assert!(idx.is_for(&items));
        assert!(!idx.is_for(&Arc::new((*items).clone())));
        assert_eq!(idx.len(), 1);
    }
}
