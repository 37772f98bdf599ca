// TF-IDF vectorization over item tags
use crate::catalog::Catalog;
use crate::tokenizer::Tokenizer;
use crate::vector::SparseVector;
use ahash::AHashMap;

/// Token -> column mapping, in first-seen corpus order
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: AHashMap<String, usize>,
    // column -> number of items containing the token
    doc_freqs: Vec<u32>,
    // column -> smoothed inverse document frequency
    idf: Vec<f32>,
}

impl Vocabulary {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[inline]
    pub fn column(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    #[inline]
    pub fn term(&self, column: usize) -> Option<&str> {
        self.terms.get(column).map(String::as_str)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    #[inline]
    pub fn doc_freq(&self, column: usize) -> u32 {
        self.doc_freqs.get(column).copied().unwrap_or(0)
    }

    #[inline]
    pub fn idf(&self, column: usize) -> f32 {
        self.idf.get(column).copied().unwrap_or(0.0)
    }

    fn intern(&mut self, term: &str) -> usize {
        if let Some(&idx) = self.index.get(term) {
            return idx;
        }
        let idx = self.terms.len();
        self.terms.push(term.to_string());
        self.index.insert(term.to_string(), idx);
        self.doc_freqs.push(0);
        idx
    }
}

/// Smoothed IDF: `ln((1 + n) / (1 + df)) + 1`.
/// Strictly positive and decreasing in `df`.
#[inline]
pub fn smoothed_idf(total_docs: usize, doc_freq: u32) -> f32 {
    let n = total_docs as f64;
    let df = doc_freq as f64;
    (((1.0 + n) / (1.0 + df)).ln() + 1.0) as f32
}

/// The fitted vocabulary plus one unit-length vector per catalog row
#[derive(Debug, Clone, Default)]
pub struct TfIdfModel {
    pub vocabulary: Vocabulary,
    pub vectors: Vec<SparseVector>,
}

pub struct TfIdfVectorizer {
    tokenizer: Tokenizer,
}

impl TfIdfVectorizer {
    #[must_use]
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Fit the vocabulary and IDF on the catalog and weight every item.
    /// Items without tokens get an empty vector.
    pub fn fit_transform(&self, catalog: &Catalog) -> TfIdfModel {
        let mut vocabulary = Vocabulary::default();

        // row -> (column -> term frequency), columns in first-seen order
        let mut term_freqs: Vec<Vec<(usize, u32)>> = Vec::with_capacity(catalog.len());

        for item in catalog.items() {
            let mut counts: Vec<(usize, u32)> = Vec::new();
            for token in self.tokenizer.tokenize(item) {
                let column = vocabulary.intern(&token);
                match counts.iter_mut().find(|(c, _)| *c == column) {
                    Some((_, tf)) => *tf += 1,
                    None => counts.push((column, 1)),
                }
            }
            for &(column, _) in &counts {
                vocabulary.doc_freqs[column] += 1;
            }
            term_freqs.push(counts);
        }

        let total_docs = catalog.len();
        vocabulary.idf = vocabulary
            .doc_freqs
            .iter()
            .map(|&df| smoothed_idf(total_docs, df))
            .collect();

        let vectors = term_freqs
            .into_iter()
            .map(|counts| {
                let pairs = counts
                    .into_iter()
                    .map(|(column, tf)| (column, tf as f32 * vocabulary.idf[column]))
                    .collect();
                let mut vector = SparseVector::from_pairs(pairs);
                vector.normalize();
                vector
            })
            .collect();

        TfIdfModel { vocabulary, vectors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;
    use crate::config::TokenizerDialect;

    fn catalog(rows: &[(&str, &str)]) -> Catalog {
        Catalog::from_items(
            rows.iter()
                .enumerate()
                .map(|(i, (title, tags))| Item::new(i as i64 + 1, *title, *tags, '|'))
                .collect(),
        )
    }

    fn fit(dialect: TokenizerDialect, rows: &[(&str, &str)]) -> TfIdfModel {
        TfIdfVectorizer::new(Tokenizer::new(dialect, true, '|')).fit_transform(&catalog(rows))
    }

    #[test]
    fn test_vocabulary_first_seen_order() {
        let model = fit(
            TokenizerDialect::Whitespace,
            &[("a", "Comedy|Animation"), ("b", "Action|Comedy")],
        );
        let terms: Vec<&str> = model.vocabulary.terms().collect();
        assert_eq!(terms, vec!["comedy", "animation", "action"]);
        assert_eq!(model.vocabulary.doc_freq(0), 2);
        assert_eq!(model.vocabulary.column("action"), Some(2));
    }

    #[test]
    fn test_idf_properties() {
        assert!((smoothed_idf(3, 3) - 1.0).abs() < 1e-6);
        assert!(smoothed_idf(10, 1) > smoothed_idf(10, 2));
        assert!(smoothed_idf(10, 10) > 0.0);
        assert_eq!(smoothed_idf(10, 4), smoothed_idf(10, 4));
    }

    #[test]
    fn test_vectors_unit_length() {
        let model = fit(
            TokenizerDialect::Whitespace,
            &[("a", "Comedy|Animation"), ("b", "Action|Comedy"), ("c", "Drama")],
        );
        for v in &model.vectors {
            assert!((v.norm() - 1.0).abs() < 1e-6);
        }
        // rarer token carries more weight
        let a = &model.vectors[0];
        let comedy = model.vocabulary.column("comedy").unwrap();
        let animation = model.vocabulary.column("animation").unwrap();
        assert!(a.get(animation) > a.get(comedy));
        // zero iff absent
        assert_eq!(a.get(model.vocabulary.column("drama").unwrap()), 0.0);
    }

    #[test]
    fn test_dialects_produce_different_vocabularies() {
        let rows = [("a", "Sci-Fi"), ("b", "sci-fi")];
        assert_eq!(fit(TokenizerDialect::Whitespace, &rows).vocabulary.len(), 1);
        assert_eq!(fit(TokenizerDialect::Delimited, &rows).vocabulary.len(), 2);
    }

    #[test]
    fn test_untagged_item_has_empty_vector() {
        let model = fit(TokenizerDialect::Delimited, &[("a", ""), ("b", "Drama")]);
        assert!(model.vectors[0].is_empty());
        assert_eq!(model.vectors.len(), 2);
    }

    #[test]
    fn test_deterministic() {
        let rows = [("a", "Comedy|Animation"), ("b", "Action|Comedy|Crime"), ("c", "Crime")];
        let first = fit(TokenizerDialect::Whitespace, &rows);
        let second = fit(TokenizerDialect::Whitespace, &rows);
        assert_eq!(first.vectors, second.vectors);
        assert_eq!(
            first.vocabulary.terms().collect::<Vec<_>>(),
            second.vocabulary.terms().collect::<Vec<_>>()
        );
    }
}
