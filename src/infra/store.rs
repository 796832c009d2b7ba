// ============================================================
// Layer 5 — Dataset Store
// ============================================================
// Saves and restores a built dataset and the config that built it.
//
// Directory layout:
//   <dir>/
//     dataset.json        ← DatasetBundle: train set, test set,
//                           category list, counts, image table,
//                           text table
//     build_config.json   ← BuildConfig used for this build
//
// Loading re-validates the bundle, so an inconsistent file
// (empty history, misaligned recency, item without an
// embedding row) is rejected before any batch is produced.
// When build_config.json is present its gap table also bounds
// every stored recency code.

use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::application::build_use_case::BuildConfig;
use crate::data::dataset::DatasetBundle;
use crate::data::gap::GapTable;

const DATASET_FILE: &str = "dataset.json";
const CONFIG_FILE:  &str = "build_config.json";

/// Reads and writes dataset artefacts inside one directory.
pub struct DatasetStore {
    dir: PathBuf,
}

impl DatasetStore {
    /// Point the store at `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create dataset directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.dir.join(DATASET_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn save(&self, bundle: &DatasetBundle) -> Result<()> {
        let path = self.dataset_path();
        write_json(&path, bundle)?;

        tracing::info!(
            "Saved dataset ({} train, {} test) to '{}'",
            bundle.train_set.len(),
            bundle.test_set.len(),
            path.display()
        );
        Ok(())
    }

    /// Load and validate the stored bundle.
    pub fn load(&self) -> Result<DatasetBundle> {
        let path = self.dataset_path();
        let file = fs::File::open(&path).with_context(|| {
            format!(
                "Cannot open dataset '{}'. Have you run 'build-dataset' first?",
                path.display()
            )
        })?;

        let bundle: DatasetBundle = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Cannot parse dataset '{}'", path.display()))?;

        bundle
            .validate()
            .with_context(|| format!("Dataset '{}' is inconsistent", path.display()))?;

        if self.config_path().exists() {
            let gaps = GapTable::new(self.load_config()?.gaps)?;
            bundle
                .check_recency(&gaps)
                .with_context(|| format!("Dataset '{}' does not match its gap table", path.display()))?;
        } else {
            tracing::warn!("No build config in '{}', recency codes not range-checked", self.dir.display());
        }

        tracing::info!(
            "Loaded dataset: {} train, {} test, {} items",
            bundle.train_set.len(),
            bundle.test_set.len(),
            bundle.counts.item_count
        );
        Ok(bundle)
    }

    pub fn save_config(&self, cfg: &BuildConfig) -> Result<()> {
        let path = self.config_path();
        write_json(&path, cfg)?;
        tracing::debug!("Saved build config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<BuildConfig> {
        let path = self.config_path();
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Write any serialisable value as JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .with_context(|| format!("Cannot write '{}'", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Cannot flush '{}'", path.display()))?;
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::tests::bundle;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("seqrec-store-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_bundle_round_trip() {
        let dir   = scratch_dir("bundle");
        let store = DatasetStore::new(&dir).unwrap();
        let original = bundle();

        store.save(&original).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, original);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_round_trip() {
        let dir   = scratch_dir("config");
        let store = DatasetStore::new(&dir).unwrap();
        let cfg   = BuildConfig { seed: 99, shuffle: false, ..BuildConfig::default() };

        store.save_config(&cfg).unwrap();
        let loaded = store.load_config().unwrap();
        assert_eq!(loaded.seed, 99);
        assert!(!loaded.shuffle);
        assert_eq!(loaded.gaps, cfg.gaps);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_inconsistent_bundle_is_rejected_on_load() {
        let dir   = scratch_dir("invalid");
        let store = DatasetStore::new(&dir).unwrap();
        let mut b = bundle();
        b.train_set[0].history.clear();
        b.train_set[0].history_time.clear();

        store.save(&b).unwrap();
        assert!(store.load().is_err());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_recency_beyond_stored_gap_table_is_rejected() {
        let dir   = scratch_dir("recency");
        let store = DatasetStore::new(&dir).unwrap();
        let mut b = bundle();
        b.train_set[0].history_time[0] = 99;

        // without a config only the structural checks run
        store.save(&b).unwrap();
        assert!(store.load().is_ok());

        store.save_config(&BuildConfig::default()).unwrap();
        let err = store.load().unwrap_err();
        assert!(err.chain().any(|e| e.to_string().contains("recency code 99")));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_bundle_within_stored_gap_table_loads() {
        let dir   = scratch_dir("gaps-ok");
        let store = DatasetStore::new(&dir).unwrap();
        store.save(&bundle()).unwrap();
        store.save_config(&BuildConfig::default()).unwrap();
        assert!(store.load().is_ok());
        fs::remove_dir_all(&dir).ok();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_json_reports_full_device() {
        // /dev/full accepts the open and fails every write with ENOSPC
        assert!(write_json(Path::new("/dev/full"), &vec![1u32, 2, 3]).is_err());
    }

    #[test]
    fn test_missing_dataset_is_an_error() {
        let dir   = scratch_dir("missing");
        let store = DatasetStore::new(&dir).unwrap();
        assert!(store.load().is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
