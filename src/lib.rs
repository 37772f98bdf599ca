//! # simrec
//!
//! A content-based recommender: items are described by categorical tags,
//! tags become TF-IDF vectors, and every pairwise cosine similarity is
//! computed once at startup. Queries are then read-only lookups into the
//! precomputed matrix.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! simrec serve --catalog movies.csv --http-port 5001
//! simrec gateway --upstream http://127.0.0.1:5001 --http-port 5002
//! curl http://localhost:5002/recommend/Toy%20Story
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use simrec::prelude::*;
//!
//! let catalog = Catalog::from_items(vec![
//!     Item::new(1, "Toy Story", "Animation|Comedy", '|'),
//!     Item::new(2, "Monsters, Inc.", "Animation|Comedy", '|'),
//!     Item::new(3, "Heat", "Action|Crime", '|'),
//! ]);
//! let config = EngineConfig::default().with_lookup(LookupPolicy::CaseInsensitive);
//! let engine = Engine::build(catalog, config).unwrap();
//!
//! let result = engine.recommend("toy story", 2).unwrap();
//! assert_eq!(result.items[0].title, "Monsters, Inc.");
//! ```
//!
//! ## Crate Structure
//!
//! - [`simrec-core`](https://docs.rs/simrec-core) - Catalog, tokenizer, TF-IDF, similarity matrix, query engine
//! - [`simrec-runtime`](https://docs.rs/simrec-runtime) - Readiness-gated engine holder with atomic rebuild
//! - [`simrec-api`](https://docs.rs/simrec-api) - Recommender HTTP service and gateway

// Re-export core types
pub use simrec_core::{
    Catalog, CatalogSchema, Item,
    Engine, EngineConfig, LookupPolicy, TokenizerDialect,
    Recommendation, Recommendations,
    SimilarityMatrix, SparseVector, TfIdfVectorizer, Tokenizer, Vocabulary,
    Error, Result,
};

// Re-export runtime
pub use simrec_runtime::{EngineManager, EngineSource, EngineStatus};

// Re-export API
pub use simrec_api::{GatewayApi, GatewayState, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, CatalogSchema, Item,
        Engine, EngineConfig, LookupPolicy, TokenizerDialect,
        Recommendation, Recommendations,
        Error, Result,
        EngineManager, EngineSource, EngineStatus,
        RestApi, GatewayApi, GatewayState,
    };
}
