//! Embedding response and vector similarity

/// Vectors produced for one request, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingResponse {
    model: String,
    vectors: Vec<Vec<f32>>,
    prompt_tokens: u32,
}

impl EmbeddingResponse {
    pub fn new(model: impl Into<String>, vectors: Vec<Vec<f32>>, prompt_tokens: u32) -> Self {
        Self {
            model: model.into(),
            vectors,
            prompt_tokens,
        }
    }

    /// Build from `(input index, vector)` pairs received in any order
    pub fn from_indexed(
        model: impl Into<String>,
        mut indexed: Vec<(usize, Vec<f32>)>,
        prompt_tokens: u32,
    ) -> Self {
        indexed.sort_by_key(|(index, _)| *index);
        let vectors = indexed.into_iter().map(|(_, vector)| vector).collect();
        Self::new(model, vectors, prompt_tokens)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn prompt_tokens(&self) -> u32 {
        self.prompt_tokens
    }

    pub fn into_vectors(self) -> Vec<Vec<f32>> {
        self.vectors
    }
}

/// Cosine similarity of two vectors.
///
/// 0.0 when the lengths differ or either vector is empty or all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]) - 1.0).abs() < 1e-4);
        assert!(cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]).abs() < 1e-4);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-4);
        assert!((cosine_similarity(&[3.0, 4.0], &[6.0, 8.0]) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_from_indexed_restores_input_order() {
        let response = EmbeddingResponse::from_indexed(
            "text-embedding-3-small",
            vec![(2, vec![0.5]), (0, vec![0.1]), (1, vec![0.3])],
            6,
        );

        assert_eq!(response.prompt_tokens(), 6);
        assert_eq!(response.vectors()[0], vec![0.1]);
        assert_eq!(
            response.into_vectors(),
            vec![vec![0.1], vec![0.3], vec![0.5]]
        );
    }
}
