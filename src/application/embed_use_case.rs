// ============================================================
// Layer 2 — EmbedUseCase
// ============================================================
// Precomputes the text embedding table for item descriptions:
//
//   Step 1: Load word vectors (.vec)          (Layer 4 - data)
//   Step 2: Load descriptions (JSON array)    (Layer 4 - data)
//   Step 3: Average word vectors per item     (Layer 4 - data)
//   Step 4: Write the TextTable as JSON       (Layer 5 - infra)
//
// The written table is what `build-dataset --texts` reads.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    embeddings::TextTable,
    loader::load_json,
    text_embedder::{SentenceEmbedder, WordVectors},
};
use crate::infra::store::write_json;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    pub vectors_path:      String,
    /// JSON array of strings, index = item id
    pub descriptions_path: String,
    pub out_path:          String,
    pub max_words:         Option<usize>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            vectors_path:      "raw_data/cc.en.300.vec".to_string(),
            descriptions_path: "raw_data/descriptions.json".to_string(),
            out_path:          "raw_data/text_table.json".to_string(),
            max_words:         None,
        }
    }
}

pub struct EmbedUseCase {
    config: EmbedConfig,
}

impl EmbedUseCase {
    pub fn new(config: EmbedConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TextTable> {
        let cfg = &self.config;

        let vectors = WordVectors::load(Path::new(&cfg.vectors_path), cfg.max_words)?;
        let descriptions: Vec<String> = load_json(Path::new(&cfg.descriptions_path))?;
        tracing::info!("Embedding {} item descriptions", descriptions.len());

        let table = SentenceEmbedder::new(&vectors).embed_all(&descriptions)?;

        write_json(Path::new(&cfg.out_path), &table)?;
        tracing::info!("Wrote text table to '{}'", cfg.out_path);
        Ok(table)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::embeddings::EmbeddingLookup;
    use std::fs;

    #[test]
    fn test_end_to_end_embedding() {
        let dir = std::env::temp_dir().join(format!("seqrec-embed-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let vectors_path      = dir.join("words.vec");
        let descriptions_path = dir.join("descriptions.json");
        let out_path          = dir.join("text_table.json");
        fs::write(&vectors_path, "2 2\nwool 1.0 3.0\nsocks 3.0 1.0\n").unwrap();
        fs::write(&descriptions_path, r#"["wool socks", "a hat"]"#).unwrap();

        let cfg = EmbedConfig {
            vectors_path:      vectors_path.display().to_string(),
            descriptions_path: descriptions_path.display().to_string(),
            out_path:          out_path.display().to_string(),
            max_words:         None,
        };
        let table = EmbedUseCase::new(cfg).execute().unwrap();
        assert_eq!(table.lookup(0).unwrap(), &[2.0, 2.0]);
        assert_eq!(table.lookup(1).unwrap(), &[0.0, 0.0]);

        let reloaded: TextTable = load_json(&out_path).unwrap();
        assert_eq!(reloaded, table);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_vectors_without_rows_are_rejected() {
        let dir = std::env::temp_dir().join(format!("seqrec-embed-empty-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let vectors_path      = dir.join("words.vec");
        let descriptions_path = dir.join("descriptions.json");
        // header only, plus one row of the wrong width
        fs::write(&vectors_path, "1 2
wool 1.0
").unwrap();
        fs::write(&descriptions_path, r#"["wool socks"]"#).unwrap();

        let cfg = EmbedConfig {
            vectors_path:      vectors_path.display().to_string(),
            descriptions_path: descriptions_path.display().to_string(),
            out_path:          dir.join("text_table.json").display().to_string(),
            max_words:         None,
        };
        let err = EmbedUseCase::new(cfg).execute().unwrap_err();
        assert!(err.to_string().contains("No usable word vectors"));
        assert!(!dir.join("text_table.json").exists());

        fs::remove_dir_all(&dir).ok();
    }
}
