// ============================================================
// Layer 4 — Description Text Embedder
// ============================================================
// Precomputes one text vector per item description from a
// pretrained word-vector model in fastText `.vec` format:
//
//   2000000 300              ← header: word count, dimension
//   the 0.0231 -0.0104 ...   ← one word + `dim` floats per line
//   ...
//
// Sentence vector = mean of the vectors of its known words
// (after cleaning and stop-word removal, see Preprocessor).
// A description with no known word becomes the zero vector.

use anyhow::{bail, Context, Result};
use std::{
    collections::HashMap,
    fs,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::data::embeddings::{EmbeddingMatrix, TextTable};
use crate::data::preprocessor::Preprocessor;

/// Log a progress line every this many descriptions.
const PROGRESS_EVERY: usize = 5000;

// ─── WordVectors ──────────────────────────────────────────────────────────────
/// An in-memory word → vector vocabulary.
pub struct WordVectors {
    index:  HashMap<String, usize>,
    matrix: EmbeddingMatrix,
}

impl WordVectors {
    /// Load a `.vec` file, keeping at most `max_words` entries.
    pub fn load(path: &Path, max_words: Option<usize>) -> Result<Self> {
        let file = fs::File::open(path)
            .with_context(|| format!("Cannot open word vectors '{}'", path.display()))?;
        let vectors = Self::parse(BufReader::new(file), max_words)
            .with_context(|| format!("Cannot parse word vectors '{}'", path.display()))?;
        if vectors.is_empty() {
            bail!("No usable word vectors in '{}'", path.display());
        }

        tracing::info!(
            "Loaded {} word vectors of dim {} from '{}'",
            vectors.len(),
            vectors.dim(),
            path.display()
        );
        Ok(vectors)
    }

    /// Parse `.vec` text from any buffered reader.
    pub fn parse(reader: impl BufRead, max_words: Option<usize>) -> Result<Self> {
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line?,
            None => bail!("word vector file is empty"),
        };
        let dim = parse_header(&header)?;

        let limit    = max_words.unwrap_or(usize::MAX);
        let mut index = HashMap::new();
        let mut data  = Vec::new();

        for (offset, line) in lines.enumerate() {
            if index.len() >= limit {
                break;
            }
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else { continue };

            let values: Vec<f32> = match fields.map(str::parse::<f32>).collect::<Result<Vec<_>, _>>() {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!("Skipping word vector on line {}: {}", offset + 2, e);
                    continue;
                }
            };
            if values.len() != dim || index.contains_key(word) {
                tracing::warn!("Skipping word vector on line {}: bad row", offset + 2);
                continue;
            }

            index.insert(word.to_string(), index.len());
            data.extend(values);
        }

        Ok(Self { index, matrix: EmbeddingMatrix::new(dim, data)? })
    }

    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.index.get(word).and_then(|&row| self.matrix.row(row))
    }
}

fn parse_header(header: &str) -> Result<usize> {
    let fields: Vec<&str> = header.split_whitespace().collect();
    let [_, dim] = fields.as_slice() else {
        bail!("expected '<count> <dim>' header, got '{header}'");
    };
    let dim: usize = dim.parse().with_context(|| format!("bad dimension in header '{header}'"))?;
    if dim == 0 {
        bail!("word vector dimension must be positive");
    }
    Ok(dim)
}

// ─── SentenceEmbedder ─────────────────────────────────────────────────────────
/// Averages word vectors into one vector per description.
pub struct SentenceEmbedder<'a> {
    vectors:      &'a WordVectors,
    preprocessor: Preprocessor,
}

impl<'a> SentenceEmbedder<'a> {
    pub fn new(vectors: &'a WordVectors) -> Self {
        Self { vectors, preprocessor: Preprocessor::new() }
    }

    /// Mean vector of the sentence's known words, or zeros.
    pub fn embed(&self, sentence: &str) -> Vec<f32> {
        let dim     = self.vectors.dim();
        let mut sum = vec![0.0f32; dim];
        let mut hit = 0usize;

        for word in self.preprocessor.words(sentence) {
            if let Some(v) = self.vectors.get(&word) {
                sum.iter_mut().zip(v).for_each(|(s, x)| *s += x);
                hit += 1;
            }
        }

        if hit > 0 {
            sum.iter_mut().for_each(|s| *s /= hit as f32);
        }
        sum
    }

    /// Embed every description; row `i` belongs to item `i`.
    pub fn embed_all(&self, descriptions: &[String]) -> Result<TextTable> {
        let dim        = self.vectors.dim();
        let mut matrix = EmbeddingMatrix::zeros(descriptions.len(), dim);

        for (i, description) in descriptions.iter().enumerate() {
            let vector = self.embed(description);
            if let Some(row) = matrix.row_mut(i) {
                row.copy_from_slice(&vector);
            }
            if i % PROGRESS_EVERY == 0 {
                tracing::info!("Embedded {}/{} descriptions", i, descriptions.len());
            }
        }

        Ok(TextTable::identity(matrix))
    }
}
