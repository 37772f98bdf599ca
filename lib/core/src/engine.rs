use crate::catalog::{Catalog, CatalogSchema, Item};
use crate::config::EngineConfig;
use crate::lookup::LookupIndex;
use crate::matrix::SimilarityMatrix;
use crate::tfidf::{TfIdfVectorizer, Vocabulary};
use crate::tokenizer::Tokenizer;
use crate::vector::SparseVector;
use crate::{Error, Result};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Decimal places kept in returned scores
pub const SCORE_PRECISION: i32 = 4;

/// One ranked neighbour
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub row: usize,
    pub id: i64,
    pub title: String,
    pub score: f64,
}

/// Ranked neighbours of a queried item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    /// The title as it was queried
    pub query: String,
    /// Catalog row the query resolved to
    pub row: usize,
    pub items: Vec<Recommendation>,
}

impl Recommendations {
    pub fn titles(&self) -> Vec<&str> {
        self.items.iter().map(|r| r.title.as_str()).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.items.iter().map(|r| r.score).collect()
    }
}

#[inline]
fn round_score(score: f32) -> f64 {
    let scale = 10f64.powi(SCORE_PRECISION);
    (f64::from(score) * scale).round() / scale
}

/// Descending score, then ascending catalog row
#[inline]
fn rank_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    OrderedFloat(b.1)
        .cmp(&OrderedFloat(a.1))
        .then_with(|| a.0.cmp(&b.0))
}

/// Immutable, fully built recommendation context.
///
/// Every field is computed in [`Engine::build`] and never mutated, so an
/// `Arc<Engine>` can be queried from any number of threads without locking.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    catalog: Catalog,
    vocabulary: Vocabulary,
    vectors: Vec<SparseVector>,
    matrix: SimilarityMatrix,
    lookup: LookupIndex,
}

impl Engine {
    /// Vectorize the catalog and precompute every pairwise similarity
    pub fn build(catalog: Catalog, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        if catalog.is_empty() {
            return Err(Error::DataLoad("catalog contains no items".to_string()));
        }

        let start = Instant::now();
        let vectorizer = TfIdfVectorizer::new(Tokenizer::from_config(&config));
        let model = vectorizer.fit_transform(&catalog);
        info!(
            "TF-IDF matrix shape: ({}, {}) [dialect={}, stopwords={}]",
            catalog.len(),
            model.vocabulary.len(),
            config.dialect,
            config.stopwords
        );

        let matrix = SimilarityMatrix::build(&model.vectors);
        let lookup = LookupIndex::build(&catalog, config.lookup);
        info!(
            "Similarity matrix shape: ({}, {}) built in {:?}",
            matrix.len(),
            matrix.len(),
            start.elapsed()
        );

        Ok(Self {
            config,
            catalog,
            vocabulary: model.vocabulary,
            vectors: model.vectors,
            matrix,
            lookup,
        })
    }

    /// Load a CSV catalog and build an engine from it
    pub fn load<P: AsRef<Path>>(path: P, schema: &CatalogSchema, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let catalog = Catalog::load(path, schema, config.tag_delimiter)?;
        Self::build(catalog, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Feature vector of a catalog row
    pub fn vector(&self, row: usize) -> Option<&SparseVector> {
        self.vectors.get(row)
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// All known titles in catalog order
    pub fn titles(&self) -> Vec<String> {
        self.catalog.titles().map(str::to_string).collect()
    }

    /// Resolve a title to its catalog row under the configured lookup policy
    pub fn find_row(&self, title: &str) -> Result<usize> {
        Self::check_title(title)?;
        self.lookup.find_row(title)
    }

    /// Details of one item
    pub fn item(&self, title: &str) -> Result<&Item> {
        let row = self.find_row(title)?;
        self.catalog
            .get(row)
            .ok_or_else(|| Error::ItemNotFound(title.to_string()))
    }

    /// Similarity between two catalog rows
    pub fn similarity(&self, i: usize, j: usize) -> Option<f32> {
        self.matrix.get(i, j)
    }

    fn check_title(title: &str) -> Result<()> {
        if title.trim().is_empty() {
            return Err(Error::InvalidQuery("title must not be blank".to_string()));
        }
        Ok(())
    }

    /// Top `top_n` most similar items, excluding the queried item itself
    pub fn recommend(&self, title: &str, top_n: usize) -> Result<Recommendations> {
        Self::check_title(title)?;
        if top_n == 0 {
            return Err(Error::InvalidQuery("top_n must be positive".to_string()));
        }

        let row = self.lookup.find_row(title)?;
        let scores = self
            .matrix
            .row(row)
            .ok_or_else(|| Error::ItemNotFound(title.to_string()))?;

        // Exclude by position so identical vectors elsewhere still rank
        let mut ranked: Vec<(usize, f32)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != row)
            .collect();

        if top_n < ranked.len() {
            ranked.select_nth_unstable_by(top_n - 1, rank_order);
            ranked.truncate(top_n);
        }
        ranked.sort_unstable_by(rank_order);

        let items = ranked
            .into_iter()
            .filter_map(|(j, score)| {
                self.catalog.get(j).map(|item| Recommendation {
                    row: j,
                    id: item.id,
                    title: item.title.clone(),
                    score: round_score(score),
                })
            })
            .collect::<Vec<_>>();

        debug!("Generated {} recommendations for '{}'", items.len(), title);

        Ok(Recommendations {
            query: title.to_string(),
            row,
            items,
        })
    }

    /// Recommend using the configured default result count
    pub fn recommend_default(&self, title: &str) -> Result<Recommendations> {
        self.recommend(title, self.config.default_top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LookupPolicy, TokenizerDialect};

    fn sample() -> Catalog {
        Catalog::from_items(vec![
            Item::new(1, "Toy Story", "Animation|Comedy", '|'),
            Item::new(2, "Monsters, Inc.", "Animation|Comedy", '|'),
            Item::new(3, "Heat", "Action|Crime", '|'),
        ])
    }

    #[test]
    fn test_recommend_example() {
        let engine = Engine::build(sample(), EngineConfig::default()).unwrap();
        let result = engine.recommend("Toy Story", 1).unwrap();
        assert_eq!(result.titles(), vec!["Monsters, Inc."]);
        assert_eq!(result.items[0].score, 1.0);

        let heat = engine.find_row("Heat").unwrap();
        assert!(engine.similarity(0, heat).unwrap() < engine.similarity(0, 1).unwrap());
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = Catalog::from_items(vec![
            Item::new(1, "A", "Drama", '|'),
            Item::new(2, "B", "Comedy", '|'),
            Item::new(3, "C", "Drama", '|'),
            Item::new(4, "D", "Drama", '|'),
            Item::new(5, "E", "Comedy", '|'),
        ]);
        let engine = Engine::build(catalog, EngineConfig::default()).unwrap();
        let result = engine.recommend("B", 4).unwrap();
        assert_eq!(result.titles(), vec!["E", "A", "C", "D"]);

        let result = engine.recommend("B", 2).unwrap();
        assert_eq!(result.titles(), vec!["E", "A"]);
    }

    #[test]
    fn test_duplicate_vectors_exclude_by_position() {
        let catalog = Catalog::from_items(vec![
            Item::new(1, "A", "Drama", '|'),
            Item::new(2, "B", "Drama", '|'),
        ]);
        let engine = Engine::build(catalog, EngineConfig::default()).unwrap();
        let result = engine.recommend("B", 5).unwrap();
        assert_eq!(result.titles(), vec!["A"]);
        assert_eq!(result.items[0].score, 1.0);
    }

    #[test]
    fn test_invalid_queries() {
        let engine = Engine::build(sample(), EngineConfig::default()).unwrap();
        assert!(matches!(engine.recommend("  ", 5), Err(Error::InvalidQuery(_))));
        assert!(matches!(engine.recommend("Heat", 0), Err(Error::InvalidQuery(_))));
        assert!(matches!(engine.recommend("Nope", 5), Err(Error::ItemNotFound(ref t)) if t == "Nope"));
    }

    #[test]
    fn test_case_policy() {
        let exact = Engine::build(sample(), EngineConfig::default()).unwrap();
        assert!(matches!(exact.recommend("toy story", 2), Err(Error::ItemNotFound(_))));

        let config = EngineConfig::default().with_lookup(LookupPolicy::CaseInsensitive);
        let folded = Engine::build(sample(), config).unwrap();
        let lower = folded.recommend("toy story", 2).unwrap();
        let upper = folded.recommend("Toy Story", 2).unwrap();
        assert_eq!(lower.items, upper.items);
        assert_eq!(lower.query, "toy story");
    }

    #[test]
    fn test_untagged_item() {
        let catalog = Catalog::from_items(vec![
            Item::new(1, "Blank", "", '|'),
            Item::new(2, "Heat", "Action", '|'),
            Item::new(3, "Ronin", "Action", '|'),
        ]);
        let config = EngineConfig::default().with_dialect(TokenizerDialect::Delimited);
        let engine = Engine::build(catalog, config).unwrap();
        assert_eq!(engine.similarity(0, 0), Some(0.0));
        let result = engine.recommend("Blank", 5).unwrap();
        assert_eq!(result.titles(), vec!["Heat", "Ronin"]);
        assert!(result.scores().iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_item_lookup() {
        let engine = Engine::build(sample(), EngineConfig::default()).unwrap();
        let item = engine.item("Heat").unwrap();
        assert_eq!(item.id, 3);
        assert_eq!(item.raw_tags, "Action|Crime");
        assert_eq!(engine.titles(), vec!["Toy Story", "Monsters, Inc.", "Heat"]);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123_456), 0.1235);
        assert_eq!(round_score(1.0), 1.0);
    }
}
