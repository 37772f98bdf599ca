//! Catalog loading
//!
//! Reads a tabular source with an integer id, a title and a delimited tag
//! string into immutable [`Item`] records. An item's row index is its
//! position in the catalog and stays stable for the life of the engine.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// A recommendable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    /// Tags exactly as they appear in the source, e.g. `Animation|Comedy`
    pub raw_tags: String,
    /// Tags joined by single spaces, e.g. `Animation Comedy`
    pub tag_text: String,
}

impl Item {
    #[must_use]
    pub fn new(id: i64, title: impl Into<String>, raw_tags: impl Into<String>, delimiter: char) -> Self {
        let raw_tags = raw_tags.into();
        let tag_text = raw_tags.replace(delimiter, " ");
        Self {
            id,
            title: title.into(),
            raw_tags,
            tag_text,
        }
    }

    /// Iterate the individual tags of the raw tag string
    pub fn tags(&self, delimiter: char) -> impl Iterator<Item = &str> {
        self.raw_tags
            .split(delimiter)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }
}

/// Column names of the catalog source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSchema {
    pub id_column: String,
    pub title_column: String,
    pub tags_column: String,
}

impl Default for CatalogSchema {
    fn default() -> Self {
        Self {
            id_column: "id".to_string(),
            title_column: "title".to_string(),
            tags_column: "tags".to_string(),
        }
    }
}

/// Header aliases accepted when the configured column is absent (MovieLens layout)
const ID_ALIASES: &[&str] = &["movieId"];
const TAGS_ALIASES: &[&str] = &["genres"];

impl CatalogSchema {
    fn resolve(headers: &csv::StringRecord, name: &str, aliases: &[&str]) -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .or_else(|| {
                aliases
                    .iter()
                    .find_map(|alias| headers.iter().position(|h| h.trim() == *alias))
            })
            .ok_or_else(|| {
                Error::DataLoad(format!(
                    "missing required column '{}' (available columns: {:?})",
                    name,
                    headers.iter().collect::<Vec<_>>()
                ))
            })
    }
}

/// The static set of items, in load order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    #[must_use]
    pub fn from_items(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Load a catalog from a CSV file
    pub fn load<P: AsRef<Path>>(path: P, schema: &CatalogSchema, delimiter: char) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::DataLoad(format!(
                "catalog source {} does not exist",
                path.display()
            )));
        }

        let file = std::fs::File::open(path).map_err(|e| {
            Error::DataLoad(format!("cannot open {}: {}", path.display(), e))
        })?;

        let catalog = Self::from_reader(file, schema, delimiter)?;
        info!("Loaded {} items from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Load a catalog from any CSV byte stream
    pub fn from_reader<R: Read>(reader: R, schema: &CatalogSchema, delimiter: char) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| Error::DataLoad(format!("failed to read headers: {}", e)))?
            .clone();

        let id_idx = CatalogSchema::resolve(&headers, &schema.id_column, ID_ALIASES)?;
        let title_idx = CatalogSchema::resolve(&headers, &schema.title_column, &[])?;
        let tags_idx = CatalogSchema::resolve(&headers, &schema.tags_column, TAGS_ALIASES)?;

        let mut items = Vec::new();
        for (row, record) in reader.records().enumerate() {
            // Header is line 1
            let line = row + 2;
            let record = record.map_err(|e| Error::DataLoad(format!("line {}: {}", line, e)))?;

            let field = |idx: usize, column: &str| {
                record.get(idx).ok_or_else(|| {
                    Error::DataLoad(format!("line {}: missing '{}' value", line, column))
                })
            };

            let raw_id = field(id_idx, &schema.id_column)?;
            let id = raw_id.trim().parse::<i64>().map_err(|_| {
                Error::DataLoad(format!("line {}: id '{}' is not an integer", line, raw_id))
            })?;

            let title = field(title_idx, &schema.title_column)?;
            if title.trim().is_empty() {
                return Err(Error::DataLoad(format!("line {}: empty title", line)));
            }

            let tags = field(tags_idx, &schema.tags_column)?;
            items.push(Item::new(id, title, tags, delimiter));
        }

        if items.is_empty() {
            return Err(Error::DataLoad("catalog contains no items".to_string()));
        }

        let catalog = Self { items };
        catalog.warn_duplicate_titles();
        Ok(catalog)
    }

    fn warn_duplicate_titles(&self) {
        let mut seen = ahash::AHashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.title.as_str()) {
                warn!("Duplicate title '{}' (id {}); lookups resolve to its first row", item.title, item.id);
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, row: usize) -> Option<&Item> {
        self.items.get(row)
    }

    #[inline]
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.title.as_str())
    }
}
