//! Re-identification scoring
//!
//! A detection that continues no active identity is compared against every
//! lost identity with a weighted sum of appearance and position similarity.
//! The best-scoring lost identity is recovered if its score clears the
//! configured threshold.

use crate::appearance::Appearance;
use crate::config::ReidConfig;
use nalgebra::{distance, Point2};
use tracing::trace;

/// Cosine similarity between two descriptors.
///
/// Returns 0 when either descriptor has zero norm, so a region without
/// appearance signal never looks similar to anything.
pub fn cosine_similarity(a: &Appearance, b: &Appearance) -> f32 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    a.dot(b) / (norm_a * norm_b)
}

/// Linear falloff from 1 at zero distance to 0 at `radius` and beyond.
pub fn position_similarity(a: &Point2<f32>, b: &Point2<f32>, radius: f32) -> f32 {
    (1.0 - distance(a, b) / radius).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReidScore {
    pub appearance: f32,
    pub position: f32,
    pub total: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReidMatch {
    pub id: usize,
    pub score: ReidScore,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReidScorer {
    threshold: f32,
    position_radius: f32,
    appearance_weight: f32,
    position_weight: f32,
}

impl ReidScorer {
    pub fn new(
        threshold: f32,
        position_radius: f32,
        appearance_weight: f32,
        position_weight: f32,
    ) -> Self {
        Self {
            threshold,
            position_radius,
            appearance_weight,
            position_weight,
        }
    }

    pub fn from_config(config: &ReidConfig) -> Self {
        Self::new(
            config.reid_threshold,
            config.reid_position_radius,
            config.appearance_weight,
            config.position_weight,
        )
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn score(
        &self,
        appearance: &Appearance,
        position: &Point2<f32>,
        candidate_appearance: &Appearance,
        candidate_position: &Point2<f32>,
    ) -> ReidScore {
        let appearance_sim = cosine_similarity(appearance, candidate_appearance);
        let position_sim =
            position_similarity(position, candidate_position, self.position_radius);
        ReidScore {
            appearance: appearance_sim,
            position: position_sim,
            total: self.appearance_weight * appearance_sim + self.position_weight * position_sim,
        }
    }

    /// Pick the best-scoring candidate whose score exceeds the threshold.
    ///
    /// Equal scores resolve to the smallest id, so the decision does not
    /// depend on candidate order.
    pub fn best_match<'a, I>(
        &self,
        appearance: &Appearance,
        position: &Point2<f32>,
        candidates: I,
    ) -> Option<ReidMatch>
    where
        I: IntoIterator<Item = (usize, &'a Appearance, &'a Point2<f32>)>,
    {
        let mut best: Option<ReidMatch> = None;

        for (id, candidate_appearance, candidate_position) in candidates {
            let score = self.score(appearance, position, candidate_appearance, candidate_position);
            trace!(
                id,
                appearance = score.appearance,
                position = score.position,
                total = score.total,
                "reid candidate"
            );

            if !(score.total > self.threshold) {
                continue;
            }
            let better = match best {
                None => true,
                Some(b) => score.total > b.score.total || (score.total == b.score.total && id < b.id),
            };
            if better {
                best = Some(ReidMatch { id, score });
            }
        }

        best
    }
}
