//! Similarity computation for embeddings.

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors, or either vector is all zeros
/// - -1.0 means opposite vectors
///
/// Non-finite components (NaN, infinity) also score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    let dot = dot_product(a, b)?;
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    let score = dot / (magnitude_a * magnitude_b);
    Ok(if score.is_finite() { score } else { 0.0 })
}

/// Compute the dot product between two embeddings.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

/// Square similarity matrix where `m[i][j] == cosine_similarity(v[i], v[j])`.
///
/// Each unordered pair is computed once and mirrored, so the matrix is
/// exactly symmetric.
pub fn pairwise(vectors: &[Embedding]) -> Result<Vec<Vec<f32>>> {
    let n = vectors.len();
    let mut matrix = vec![vec![0.0f32; n]; n];

    for i in 0..n {
        for j in i..n {
            let score = cosine_similarity(&vectors[i], &vectors[j])?;
            matrix[i][j] = score;
            matrix[j][i] = score;
        }
    }

    Ok(matrix)
}

/// Scores of `query` against every candidate, index-aligned with `candidates`.
pub fn one_to_many(query: &[f32], candidates: &[Embedding]) -> Result<Vec<f32>> {
    candidates
        .iter()
        .map(|candidate| cosine_similarity(query, candidate))
        .collect()
}

/// Normalize an embedding to unit length.
pub fn normalize(embedding: &mut Embedding) {
    let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for x in embedding.iter_mut() {
            *x /= magnitude;
        }
    }
}

/// Round a score to `decimals` places, halves away from zero.
pub fn round_score(score: f32, decimals: u32) -> f32 {
    let factor = 10f64.powi(decimals as i32);
    ((f64::from(score) * factor).round() / factor) as f32
}
