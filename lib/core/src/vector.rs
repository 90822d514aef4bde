//! Dense embedding vectors and cosine similarity

use serde::{Deserialize, Serialize};

/// Dense sentence embedding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Cosine of the angle between two embeddings.
    ///
    /// Embeddings of different width, or a zero embedding on either side,
    /// score 0.0.
    pub fn cosine_similarity(&self, other: &Vector) -> f32 {
        if self.dim() != other.dim() {
            return 0.0;
        }
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        let dot: f32 = self.data.iter().zip(&other.data).map(|(a, b)| a * b).sum();
        dot / denom
    }

    /// Scale to unit length; near-zero embeddings are returned unchanged
    pub fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > f32::EPSILON {
            self.data.iter_mut().for_each(|x| *x /= norm);
        }
        self
    }
}
