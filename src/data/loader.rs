// ============================================================
// Layer 4 — Review Loader
// ============================================================
// Reads the remapped inputs of a dataset build:
//
//   reviews.jsonl    one JSON object per line
//                    {"user_id": 0, "item_id": 17, "timestamp": 1398902400}
//   categories.json  [cate_of_item_0, cate_of_item_1, ...]
//   *.json tables    ImageTable / TextTable as serialised by serde
//
// A missing reviews file is an error. Inside the file, blank
// lines are skipped and a malformed line is logged and skipped
// so one bad row does not sink a whole build.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::{
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::domain::review::Review;
use crate::domain::traits::ReviewSource;

/// Loads reviews from a JSON-lines file.
/// Implements the ReviewSource trait from Layer 3.
pub struct ReviewLoader {
    path: PathBuf,
}

impl ReviewLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReviewSource for ReviewLoader {
    fn load_all(&self) -> Result<Vec<Review>> {
        let file = fs::File::open(&self.path)
            .with_context(|| format!("Cannot open reviews file '{}'", self.path.display()))?;

        let reviews = parse_reviews(BufReader::new(file))?;
        tracing::info!(
            "Loaded {} reviews from '{}'",
            reviews.len(),
            self.path.display()
        );
        Ok(reviews)
    }
}

/// Parse JSON-lines reviews from any buffered reader.
pub fn parse_reviews(reader: impl BufRead) -> Result<Vec<Review>> {
    let mut reviews = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Cannot read line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Review>(&line) {
            Ok(review) => reviews.push(review),
            Err(e) => {
                tracing::warn!("Skipping malformed review on line {}: {}", index + 1, e);
            }
        }
    }

    Ok(reviews)
}

/// Load the item → category list. Its length is the item count.
pub fn load_categories(path: &Path) -> Result<Vec<u32>> {
    let cate_list: Vec<u32> = load_json(path)?;
    tracing::info!("Loaded categories for {} items", cate_list.len());
    Ok(cate_list)
}

/// Deserialise any JSON file into `T`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;

    serde_json::from_str(&json)
        .with_context(|| format!("Cannot parse '{}'", path.display()))
}
