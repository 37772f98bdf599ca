//! # simrec Core
//!
//! Core library for the simrec content-based recommender.
//!
//! This crate provides the similarity engine:
//!
//! - [`Catalog`] - Items loaded from a CSV source (id, title, delimited tags)
//! - [`Tokenizer`] - Tag tokenization in two dialects, optional English stopwords
//! - [`TfIdfVectorizer`] - Smoothed TF-IDF weights, L2-normalized sparse vectors
//! - [`SimilarityMatrix`] - Dense N×N cosine similarity, built once
//! - [`LookupIndex`] - Exact or case-insensitive title resolution
//! - [`Engine`] - The immutable context answering nearest-K queries
//!
//! ## Example
//!
//! ```rust
//! use simrec_core::{Catalog, Engine, EngineConfig, Item};
//!
//! let catalog = Catalog::from_items(vec![
//!     Item::new(1, "Toy Story", "Animation|Comedy", '|'),
//!     Item::new(2, "Monsters, Inc.", "Animation|Comedy", '|'),
//!     Item::new(3, "Heat", "Action|Crime", '|'),
//! ]);
//! let engine = Engine::build(catalog, EngineConfig::default()).unwrap();
//!
//! let result = engine.recommend("Toy Story", 1).unwrap();
//! assert_eq!(result.titles(), vec!["Monsters, Inc."]);
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod matrix;
pub mod tfidf;
pub mod tokenizer;
pub mod vector;

pub use catalog::{Catalog, CatalogSchema, Item};
pub use config::{EngineConfig, LookupPolicy, TokenizerDialect};
pub use engine::{Engine, Recommendation, Recommendations, SCORE_PRECISION};
pub use error::{Error, Result};
pub use lookup::LookupIndex;
pub use matrix::SimilarityMatrix;
pub use tfidf::{smoothed_idf, TfIdfModel, TfIdfVectorizer, Vocabulary};
pub use tokenizer::{Tokenizer, STOP_WORDS};
pub use vector::SparseVector;
