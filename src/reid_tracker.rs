//! Main ReidTracker implementation
//!
//! This module provides the `ReidTracker` struct that assigns long-term
//! identities to per-frame detections. Each detection is resolved in order:
//! - continuation of the nearest active identity within reach
//! - re-identification of a lost identity by appearance and position
//! - a brand-new identity
//!
//! After all detections are resolved, unmatched active identities are moved
//! to the lost pool and lost identities past the grace window are forgotten.

use crate::appearance::{extract_appearance, Appearance};
use crate::config::ReidConfig;
use crate::error::TrackError;
use crate::object::Object;
use crate::pool::{Identity, IdentityPools, Observation};
use crate::reid::{ReidMatch, ReidScorer};
use crate::spatial::{match_nearest, SpatialMatch};
use image::RgbImage;
use nalgebra::Point2;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// What happened to an identity during one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IdentityEvent {
    Created { id: usize },
    Continued { id: usize, distance: f32 },
    Reidentified { id: usize, score: f32, frames_lost: usize },
    Lost { id: usize },
    Forgotten { id: usize },
}

/// Result of processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub frame_id: usize,
    /// Input detections in input order. Tracked detections carry their
    /// long-term id, ignored or malformed ones carry `None`.
    pub objects: Vec<Object>,
    pub events: Vec<IdentityEvent>,
}

impl FrameOutput {
    pub fn reidentified(&self) -> impl Iterator<Item = &IdentityEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, IdentityEvent::Reidentified { .. }))
    }
}

/// ReidTracker - long-term identity association with re-identification
///
/// Owns the active/lost pools of one video stream. Frames must be fed in
/// order; independent streams need independent trackers.
#[derive(Debug, Clone)]
pub struct ReidTracker {
    config: ReidConfig,
    scorer: ReidScorer,
    pools: IdentityPools,
    frame_count: usize,
}

impl ReidTracker {
    /// Create a new ReidTracker.
    ///
    /// # Errors
    /// Returns `TrackError::InvalidConfig` if the config fails validation.
    ///
    /// # Example
    /// ```
    /// use reidtrack_rs::{ReidConfig, ReidTracker};
    /// let tracker = ReidTracker::new(ReidConfig::default()).unwrap();
    /// assert_eq!(tracker.frame_count(), 0);
    /// ```
    pub fn new(config: ReidConfig) -> Result<Self, TrackError> {
        config.validate()?;
        Ok(Self {
            scorer: ReidScorer::from_config(&config),
            config,
            pools: IdentityPools::new(),
            frame_count: 0,
        })
    }

    /// Resolve the identities of one frame's detections.
    ///
    /// # Arguments
    /// * `frame` - The frame the detections were taken from
    /// * `objects` - Detections in detector order
    pub fn update(&mut self, frame: &RgbImage, objects: &[Object]) -> FrameOutput {
        let detections: Vec<(Object, Appearance)> = objects
            .iter()
            .map(|object| {
                let appearance = if self.config.is_tracked(object.get_class()) {
                    extract_appearance(frame, object.get_rect())
                } else {
                    Appearance::zeros()
                };
                (object.clone(), appearance)
            })
            .collect();

        self.update_with_appearances(&detections)
    }

    /// Same as [`ReidTracker::update`] for callers that compute appearance
    /// descriptors themselves.
    pub fn update_with_appearances(&mut self, detections: &[(Object, Appearance)]) -> FrameOutput {
        let frame_id = self.frame_count;
        let mut claimed = BTreeSet::new();
        let mut events = Vec::new();
        let mut objects = Vec::with_capacity(detections.len());

        for (object, appearance) in detections.iter() {
            let mut object = object.clone();
            // short-term ids from upstream are never trusted
            object.set_track_id(None);

            if !self.config.is_tracked(object.get_class()) {
                objects.push(object);
                continue;
            }
            if !object.get_rect().get_xyxy().iter().all(|v| v.is_finite()) {
                warn!(frame_id, rect = ?object.get_rect(), "skipping detection with non-finite box");
                objects.push(object);
                continue;
            }

            let observation = Observation::new(*appearance, object.get_rect().clone());
            let id = self.resolve(observation, frame_id, &claimed, &mut events);
            claimed.insert(id);
            object.set_track_id(Some(id));
            objects.push(object);
        }

        for id in self.pools.demote_unmatched(&claimed, frame_id) {
            debug!(frame_id, id, "identity lost");
            events.push(IdentityEvent::Lost { id });
        }

        for id in self.pools.evict_expired(frame_id, self.config.max_lost_frames) {
            debug!(frame_id, id, "identity forgotten");
            events.push(IdentityEvent::Forgotten { id });
        }

        self.frame_count += 1;

        FrameOutput {
            frame_id,
            objects,
            events,
        }
    }

    /// Nearest active identity within `spatial_match_distance` of `position`.
    pub fn match_active(&self, position: &Point2<f32>) -> Option<usize> {
        self.match_active_excluding(position, &BTreeSet::new())
            .map(|m| m.id)
    }

    /// Best lost identity for this appearance and position, if its score
    /// exceeds `reid_threshold`.
    pub fn reidentify(&self, appearance: &Appearance, position: &Point2<f32>) -> Option<usize> {
        self.best_lost_match(appearance, position).map(|m| m.id)
    }

    /// Get number of processed frames.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn config(&self) -> &ReidConfig {
        &self.config
    }

    /// Id the next new identity will receive.
    pub fn next_id(&self) -> usize {
        self.pools.next_id()
    }

    pub fn active_ids(&self) -> Vec<usize> {
        self.pools.active().keys().copied().collect()
    }

    pub fn lost_ids(&self) -> Vec<usize> {
        self.pools.lost().keys().copied().collect()
    }

    /// Look up an identity in either pool.
    pub fn identity(&self, id: usize) -> Option<&Identity> {
        self.pools.get(id)
    }

    // =========================================================================
    // Internal methods
    // =========================================================================

    fn resolve(
        &mut self,
        observation: Observation,
        frame_id: usize,
        claimed: &BTreeSet<usize>,
        events: &mut Vec<IdentityEvent>,
    ) -> usize {
        if let Some(m) = self.match_active_excluding(&observation.position, claimed) {
            self.pools.refresh(m.id, observation, frame_id);
            debug!(frame_id, id = m.id, distance = m.distance, "identity continued");
            events.push(IdentityEvent::Continued {
                id: m.id,
                distance: m.distance,
            });
            return m.id;
        }

        if let Some(m) = self.best_lost_match(&observation.appearance, &observation.position) {
            if let Some(frames_lost) = self.pools.revive(m.id, observation.clone(), frame_id) {
                info!(
                    frame_id,
                    id = m.id,
                    score = m.score.total,
                    frames_lost,
                    "identity re-identified"
                );
                events.push(IdentityEvent::Reidentified {
                    id: m.id,
                    score: m.score.total,
                    frames_lost,
                });
                return m.id;
            }
        }

        let id = self.pools.allocate(observation, frame_id);
        info!(frame_id, id, "new identity");
        events.push(IdentityEvent::Created { id });
        id
    }

    fn match_active_excluding(
        &self,
        position: &Point2<f32>,
        claimed: &BTreeSet<usize>,
    ) -> Option<SpatialMatch> {
        let candidates = self
            .pools
            .active()
            .iter()
            .filter(|(id, _)| !claimed.contains(*id))
            .map(|(id, identity)| (*id, identity.position()));
        match_nearest(position, candidates, self.config.spatial_match_distance)
    }

    fn best_lost_match(&self, appearance: &Appearance, position: &Point2<f32>) -> Option<ReidMatch> {
        let candidates = self
            .pools
            .lost()
            .iter()
            .map(|(id, identity)| (*id, identity.appearance(), identity.position()));
        self.scorer.best_match(appearance, position, candidates)
    }
}
