// ============================================================
// Layer 4 — Embedding Tables
// ============================================================
// Image and text embeddings addressed by item id.
//
//   ImageTable: item_id → index[item_id] → matrix row
//   TextTable:  item_id → index[item_id] → matrix row
//               or item_id → matrix row directly when no index
//               map is stored (identity)
//
// Both tables are built once by an upstream step and only read
// afterwards. A lookup for an item the table cannot resolve is
// an inconsistent dataset build and fails fast.

use serde::{Deserialize, Serialize};

use crate::domain::error::DataError;
use crate::domain::example::ItemId;

// ─── EmbeddingMatrix ──────────────────────────────────────────────────────────
/// Dense row-major `f32` matrix with `dim` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMatrix {
    dim:  usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    /// Wrap flat row-major data. `data.len()` must be a multiple of `dim`.
    pub fn new(dim: usize, data: Vec<f32>) -> Result<Self, DataError> {
        let matrix = Self { dim, data };
        matrix.check_shape()?;
        Ok(matrix)
    }

    /// Build from explicit rows, all of width `dim`.
    pub fn from_rows(dim: usize, rows: Vec<Vec<f32>>) -> Result<Self, DataError> {
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            if row.len() != dim {
                return Err(DataError::EmbeddingShape { dim, len: row.len() });
            }
            data.extend(row);
        }
        Ok(Self { dim, data })
    }

    pub fn zeros(rows: usize, dim: usize) -> Self {
        Self { dim, data: vec![0.0; rows * dim] }
    }

    /// Re-check the shape, e.g. after deserialising from disk.
    pub fn check_shape(&self) -> Result<(), DataError> {
        if self.dim == 0 || self.data.len() % self.dim != 0 {
            return Err(DataError::EmbeddingShape { dim: self.dim, len: self.data.len() });
        }
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn rows(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.dim)?;
        let end   = start.checked_add(self.dim)?;
        self.data.get(start..end)
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        let start = index.checked_mul(self.dim)?;
        let end   = start.checked_add(self.dim)?;
        self.data.get_mut(start..end)
    }
}

// ─── EmbeddingLookup ──────────────────────────────────────────────────────────
/// Resolve an item id to its embedding row.
pub trait EmbeddingLookup {
    /// Width of every returned row
    fn dim(&self) -> usize;

    fn lookup(&self, item: ItemId) -> Result<&[f32], DataError>;

    /// Check that every item id below `item_count` resolves.
    fn validate_for(&self, item_count: u32) -> Result<(), DataError> {
        for item in 0..item_count {
            self.lookup(item)?;
        }
        Ok(())
    }
}

fn matrix_row(matrix: &EmbeddingMatrix, item: ItemId, row: usize) -> Result<&[f32], DataError> {
    matrix.row(row).ok_or(DataError::MissingEmbeddingRow {
        item,
        row,
        rows: matrix.rows(),
    })
}

// ─── ImageTable ───────────────────────────────────────────────────────────────
/// Image embeddings plus the item → row index map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageTable {
    pub index:  Vec<usize>,
    pub matrix: EmbeddingMatrix,
}

impl ImageTable {
    pub fn new(index: Vec<usize>, matrix: EmbeddingMatrix) -> Self {
        Self { index, matrix }
    }
}

impl EmbeddingLookup for ImageTable {
    fn dim(&self) -> usize {
        self.matrix.dim()
    }

    fn lookup(&self, item: ItemId) -> Result<&[f32], DataError> {
        let row = *self
            .index
            .get(item as usize)
            .ok_or(DataError::MissingImageRow { item })?;
        matrix_row(&self.matrix, item, row)
    }
}

// ─── TextTable ────────────────────────────────────────────────────────────────
/// Text embeddings; rows are addressed by item id unless an
/// explicit index map is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextTable {
    #[serde(default)]
    pub index:  Option<Vec<usize>>,
    pub matrix: EmbeddingMatrix,
}

impl TextTable {
    /// Row `i` belongs to item `i`.
    pub fn identity(matrix: EmbeddingMatrix) -> Self {
        Self { index: None, matrix }
    }

    pub fn with_index(index: Vec<usize>, matrix: EmbeddingMatrix) -> Self {
        Self { index: Some(index), matrix }
    }
}

impl EmbeddingLookup for TextTable {
    fn dim(&self) -> usize {
        self.matrix.dim()
    }

    fn lookup(&self, item: ItemId) -> Result<&[f32], DataError> {
        let row = match &self.index {
            Some(index) => *index.get(item as usize).ok_or(DataError::MissingEmbeddingRow {
                item,
                row: item as usize,
                rows: index.len(),
            })?,
            None => item as usize,
        };
        matrix_row(&self.matrix, item, row)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> EmbeddingMatrix {
        EmbeddingMatrix::from_rows(2, vec![vec![0.0, 0.5], vec![1.0, 1.5], vec![2.0, 2.5]]).unwrap()
    }

    #[test]
    fn test_matrix_rows() {
        let m = matrix();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.row(1), Some(&[1.0, 1.5][..]));
        assert_eq!(m.row(3), None);
    }

    #[test]
    fn test_matrix_rejects_ragged_data() {
        assert!(EmbeddingMatrix::new(3, vec![0.0; 7]).is_err());
        assert!(EmbeddingMatrix::new(0, vec![]).is_err());
        assert!(EmbeddingMatrix::from_rows(2, vec![vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_image_lookup_goes_through_index() {
        let table = ImageTable::new(vec![2, 0], matrix());
        assert_eq!(table.lookup(0).unwrap(), &[2.0, 2.5]);
        assert_eq!(table.lookup(1).unwrap(), &[0.0, 0.5]);
    }

    #[test]
    fn test_image_lookup_fails_fast() {
        let table = ImageTable::new(vec![2, 9], matrix());
        assert_eq!(table.lookup(5), Err(DataError::MissingImageRow { item: 5 }));
        assert_eq!(
            table.lookup(1),
            Err(DataError::MissingEmbeddingRow { item: 1, row: 9, rows: 3 })
        );
        assert!(table.validate_for(2).is_err());
        assert!(table.validate_for(1).is_ok());
    }

    #[test]
    fn test_huge_row_index_is_an_error() {
        let m = EmbeddingMatrix::from_rows(1, vec![vec![1.0]]).unwrap();
        assert_eq!(m.row(usize::MAX), None);

        let table = ImageTable::new(vec![usize::MAX], m);
        assert_eq!(
            table.lookup(0),
            Err(DataError::MissingEmbeddingRow { item: 0, row: usize::MAX, rows: 1 })
        );
    }

    #[test]
    fn test_row_mut_out_of_range() {
        let mut m = EmbeddingMatrix::zeros(2, 3);
        assert!(m.row_mut(usize::MAX).is_none());
        assert!(m.row_mut(2).is_none());
        m.row_mut(1).unwrap().copy_from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(m.row(1), Some(&[1.0, 2.0, 3.0][..]));
    }

    #[test]
    fn test_text_identity_lookup() {
        let table = TextTable::identity(matrix());
        assert_eq!(table.lookup(2).unwrap(), &[2.0, 2.5]);
        assert!(table.lookup(3).is_err());
        assert!(table.validate_for(3).is_ok());
    }

    #[test]
    fn test_text_indexed_lookup() {
        let table = TextTable::with_index(vec![1, 1], matrix());
        assert_eq!(table.lookup(0).unwrap(), &[1.0, 1.5]);
        assert!(table.lookup(2).is_err());
    }
}
