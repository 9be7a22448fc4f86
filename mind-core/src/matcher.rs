//! Similarity matching between an incoming embedding and stored slots.
//!
//! The metric (cosine) and the acceptance threshold are engine constants, not
//! configuration: recall behaviour must be identical for every state and for
//! every file that state is persisted to.

/// Cosine similarity a slot must strictly exceed to count as a match.
pub const MATCH_THRESHOLD: f64 = 0.85;

/// A slot that matched a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Position of the slot in the state's slot list.
    pub index: usize,
    /// Cosine similarity between the query and the slot vector.
    pub similarity: f64,
}

/// Compute the cosine similarity between two vectors.
///
/// Accumulates in `f64`. Returns a value in \[-1.0, 1.0\], or `0.0` if the
/// lengths differ or either vector has zero magnitude.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut mag_a = 0.0_f64;
    let mut mag_b = 0.0_f64;

    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    (dot / (mag_a.sqrt() * mag_b.sqrt())).clamp(-1.0, 1.0)
}

/// Find the candidate most similar to `query`.
///
/// Returns `None` unless the best similarity is strictly above
/// [`MATCH_THRESHOLD`]. On ties the earliest candidate wins.
#[must_use]
pub fn best_match<'a, I>(query: &[f32], candidates: I) -> Option<Match>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut best: Option<Match> = None;

    for (index, vector) in candidates.into_iter().enumerate() {
        let similarity = cosine_similarity(query, vector);
        if best.is_none_or(|b| similarity > b.similarity) {
            best = Some(Match { index, similarity });
        }
    }

    best.filter(|m| m.similarity > MATCH_THRESHOLD)
}
