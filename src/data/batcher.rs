// ============================================================
// Layer 4 — Tensor Batcher
// ============================================================
// Turns host-side batches into Burn tensors on a chosen device.
//
// Shapes produced:
//   items / recency        [batch, max_sl]        Int
//   sequence_lengths       [batch]                Int
//   user ids / targets     [batch]                Int
//   image / text vectors   [batch, max_sl, dim]   Float
//
// The flat row-major buffers in PaddedHistory already have the
// right memory layout, so each tensor is one 1D upload followed
// by a reshape. Int tensors are uploaded as i32, so any id or
// code above i32::MAX is an error rather than a wrapped value.
//
// ExampleBatcher plugs the whole path (collate, then upload)
// into Burn's Batcher trait so a DataLoader can drive it.
//
// Reference: Burn Book §4 (Batcher)

use std::sync::Arc;

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::batch::{Collate, EvalBatch, PaddedHistory, TrainBatch};
use crate::data::embeddings::{ImageTable, TextTable};
use crate::domain::error::DataError;
use crate::domain::example::{EvalExample, TrainExample};

// ─── Tensor batch types ───────────────────────────────────────────────────────
/// History tensors shared by training and evaluation batches.
#[derive(Debug, Clone)]
pub struct HistoryTensors<B: Backend> {
    pub items:            Tensor<B, 2, Int>,
    pub recency:          Tensor<B, 2, Int>,
    pub sequence_lengths: Tensor<B, 1, Int>,
    pub image_embeddings: Tensor<B, 3>,
    pub text_embeddings:  Tensor<B, 3>,
}

#[derive(Debug, Clone)]
pub struct TrainTensors<B: Backend> {
    pub user_ids:    Tensor<B, 1, Int>,
    pub label_items: Tensor<B, 1, Int>,
    /// 1 = observed next item, 0 = sampled negative
    pub labels:      Tensor<B, 1, Int>,
    pub history:     HistoryTensors<B>,
}

#[derive(Debug, Clone)]
pub struct EvalTensors<B: Backend> {
    pub user_ids:       Tensor<B, 1, Int>,
    pub positive_items: Tensor<B, 1, Int>,
    pub negative_items: Tensor<B, 1, Int>,
    pub history:        HistoryTensors<B>,
}

// ─── TensorBatcher ────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct TensorBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TensorBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    pub fn train(&self, batch: &TrainBatch) -> Result<TrainTensors<B>, DataError> {
        Ok(TrainTensors {
            user_ids:    self.ints(batch.user_ids.iter().map(|&u| u as u64))?,
            label_items: self.ints(batch.label_items.iter().map(|&i| i as u64))?,
            labels:      self.ints(batch.labels.iter().map(|&y| y as u64))?,
            history:     self.history(&batch.history)?,
        })
    }

    pub fn eval(&self, batch: &EvalBatch) -> Result<EvalTensors<B>, DataError> {
        Ok(EvalTensors {
            user_ids:       self.ints(batch.user_ids.iter().map(|&u| u as u64))?,
            positive_items: self.ints(batch.positive_items.iter().map(|&i| i as u64))?,
            negative_items: self.ints(batch.negative_items.iter().map(|&i| i as u64))?,
            history:        self.history(&batch.history)?,
        })
    }

    fn history(&self, h: &PaddedHistory) -> Result<HistoryTensors<B>, DataError> {
        let shape_2d = [h.batch_len, h.max_sl];

        Ok(HistoryTensors {
            items:            self.ints(h.items.iter().map(|&i| i as u64))?.reshape(shape_2d),
            recency:          self.ints(h.recency.iter().map(|&t| t as u64))?.reshape(shape_2d),
            sequence_lengths: self.ints(h.sequence_lengths.iter().map(|&l| l as u64))?,
            image_embeddings: self
                .floats(&h.image_embeddings)
                .reshape([h.batch_len, h.max_sl, h.image_dim]),
            text_embeddings:  self
                .floats(&h.text_embeddings)
                .reshape([h.batch_len, h.max_sl, h.text_dim]),
        })
    }

    // Burn Int tensors are built from i32 slices
    fn ints(&self, values: impl Iterator<Item = u64>) -> Result<Tensor<B, 1, Int>, DataError> {
        let values = values
            .map(|v| i32::try_from(v).map_err(|_| DataError::TensorIntOverflow { value: v }))
            .collect::<Result<Vec<i32>, _>>()?;
        Ok(Tensor::<B, 1, Int>::from_ints(values.as_slice(), &self.device))
    }

    fn floats(&self, values: &[f32]) -> Tensor<B, 1> {
        Tensor::<B, 1>::from_floats(values, &self.device)
    }
}

// ─── ExampleBatcher ───────────────────────────────────────────────────────────
/// Collates raw examples against shared embedding tables and uploads
/// the result. A contract violation in any example fails the batch.
#[derive(Clone, Debug)]
pub struct ExampleBatcher<B: Backend> {
    tensors: TensorBatcher<B>,
    images:  Arc<ImageTable>,
    texts:   Arc<TextTable>,
}

impl<B: Backend> ExampleBatcher<B> {
    pub fn new(device: B::Device, images: Arc<ImageTable>, texts: Arc<TextTable>) -> Self {
        Self { tensors: TensorBatcher::new(device), images, texts }
    }
}

impl<B: Backend> Batcher<TrainExample, Result<TrainTensors<B>, DataError>> for ExampleBatcher<B> {
    fn batch(&self, items: Vec<TrainExample>) -> Result<TrainTensors<B>, DataError> {
        let batch = TrainExample::collate(&items, &self.images, &self.texts)?;
        self.tensors.train(&batch)
    }
}

impl<B: Backend> Batcher<EvalExample, Result<EvalTensors<B>, DataError>> for ExampleBatcher<B> {
    fn batch(&self, items: Vec<EvalExample>) -> Result<EvalTensors<B>, DataError> {
        let batch = EvalExample::collate(&items, &self.images, &self.texts)?;
        self.tensors.eval(&batch)
    }
}
