//! Lexical and semantic similarity functions
//!
//! Lexical scores are in range [0.0, 1.0] where 1.0 means identical.
//! Semantic scores are cosine similarities in [-1.0, 1.0].

use featx_core::Vector;
use rapidfuzz::distance::indel;

/// Sort whitespace tokens and re-join them with single spaces
fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Token-sort fuzzy ratio between two strings
///
/// Word order is ignored: both strings are tokenized on whitespace, tokens
/// are sorted, and the re-joined strings are compared with the normalized
/// Indel similarity `2 * LCS / (len_a + len_b)`.
///
/// # Returns
/// Similarity score in [0.0, 1.0]
pub fn token_sort_ratio(a: &str, b: &str) -> f32 {
    let (a, b) = (sorted_tokens(a), sorted_tokens(b));
    indel::normalized_similarity(a.chars(), b.chars()) as f32
}

/// Lexical similarity between two optional text values
///
/// # Arguments
/// * `a` - First text value, `None` when missing
/// * `b` - Second text value, `None` when missing
///
/// # Returns
/// 0.0 if either side is missing, otherwise [`token_sort_ratio`]
pub fn lexical_similarity(a: Option<&str>, b: Option<&str>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) => token_sort_ratio(a, b),
        _ => 0.0,
    }
}

/// Row-wise cosine similarity: row i of `a` against row i of `b` only
pub fn pairwise_cosine(a: &[Vector], b: &[Vector]) -> Vec<f32> {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.cosine_similarity(y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_order_ignored() {
        let sim = token_sort_ratio("Software Engenheiro", "Engenheiro Software");
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_indel_ratio_on_sorted_tokens() {
        // "Engenheiro" vs "Engenheiro Software de": 2 * 10 / (10 + 22)
        let sim = token_sort_ratio("Engenheiro", "Engenheiro de Software");
        assert!((sim - 0.625).abs() < 1e-6);

        let sim = token_sort_ratio("abc", "abd");
        assert!((sim - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_lexical_bounds_and_symmetry() {
        let pairs = [
            ("Engenheiro", "Engenheiro de Software"),
            ("Analista de Dados", "Cientista de Dados"),
            ("", "Gerente"),
            ("SAP FI", "Consultor SAP FI Sênior"),
        ];
        for (a, b) in pairs {
            let ab = lexical_similarity(Some(a), Some(b));
            let ba = lexical_similarity(Some(b), Some(a));
            assert_eq!(ab, ba);
            assert!((0.0..=1.0).contains(&ab));
        }
    }

    #[test]
    fn test_lexical_missing_is_zero() {
        assert_eq!(lexical_similarity(None, Some("Engenheiro")), 0.0);
        assert_eq!(lexical_similarity(Some("Engenheiro"), None), 0.0);
        assert_eq!(lexical_similarity(None, None), 0.0);
    }

    #[test]
    fn test_partial_overlap_between_extremes() {
        let sim = token_sort_ratio("Engenheiro", "Engenheiro de Software");
        assert!(sim > 0.0 && sim < 1.0);
    }

    #[test]
    fn test_pairwise_cosine_is_diagonal() {
        let a = vec![Vector::new(vec![1.0, 0.0]), Vector::new(vec![0.0, 1.0])];
        let b = vec![Vector::new(vec![1.0, 0.0]), Vector::new(vec![1.0, 0.0])];
        let sims = pairwise_cosine(&a, &b);
        assert_eq!(sims.len(), 2);
        assert!((sims[0] - 1.0).abs() < 1e-6);
        assert!(sims[1].abs() < 1e-6);
    }
}
