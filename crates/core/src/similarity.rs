//! Similarity between embeddings.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimilarityError {
    #[error("vector is empty")]
    Empty,
    #[error("vector has zero magnitude")]
    ZeroMagnitude,
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

/// Signed cosine similarity in `[-1, 1]`.
pub fn cosine(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.is_empty() || b.is_empty() {
        return Err(SimilarityError::Empty);
    }
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    // Accumulate in f64 so that long vectors keep precision.
    let (mut dot, mut norm_a, mut norm_b) = (0f64, 0f64, 0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(SimilarityError::ZeroMagnitude);
    }

    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    Ok(sim.clamp(-1.0, 1.0) as f32)
}

/// Absolute cosine similarity in `[0, 1]`.
///
/// The sign of the alignment is dropped, so a vector and its negation score 1.
/// Symmetric in its arguments.
pub fn score(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    cosine(a, b).map(f32::abs)
}
