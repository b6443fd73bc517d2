//! Identity records and the active/lost pools that own them.

use crate::appearance::Appearance;
use crate::rect::Rect;
use nalgebra::Point2;
use std::collections::{BTreeMap, BTreeSet};

/*----------------------------------------------------------------------------
Observation struct
----------------------------------------------------------------------------*/

/// What a single detection tells us about an identity in the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub appearance: Appearance,
    pub position: Point2<f32>,
    pub rect: Rect<f32>,
}

impl Observation {
    pub fn new(appearance: Appearance, rect: Rect<f32>) -> Self {
        Self {
            appearance,
            position: rect.center(),
            rect,
        }
    }
}

/*----------------------------------------------------------------------------
Identity struct
----------------------------------------------------------------------------*/

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    id: usize,
    appearance: Appearance,
    position: Point2<f32>,
    rect: Rect<f32>,
    last_seen_frame: usize,
}

impl Identity {
    fn new(id: usize, observation: Observation, frame_id: usize) -> Self {
        Self {
            id,
            appearance: observation.appearance,
            position: observation.position,
            rect: observation.rect,
            last_seen_frame: frame_id,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    pub fn position(&self) -> &Point2<f32> {
        &self.position
    }

    pub fn rect(&self) -> &Rect<f32> {
        &self.rect
    }

    pub fn last_seen_frame(&self) -> usize {
        self.last_seen_frame
    }

    fn observe(&mut self, observation: Observation, frame_id: usize) {
        self.appearance = observation.appearance;
        self.position = observation.position;
        self.rect = observation.rect;
        self.last_seen_frame = frame_id;
    }
}

/*----------------------------------------------------------------------------
IdentityPools struct
----------------------------------------------------------------------------*/

/// Active and lost identities plus the id counter.
///
/// An id lives in at most one of the two pools. Ids are handed out in
/// increasing order and never reused, including after an identity is
/// evicted from the lost pool.
#[derive(Debug, Default, Clone)]
pub struct IdentityPools {
    active: BTreeMap<usize, Identity>,
    lost: BTreeMap<usize, Identity>,
    next_id: usize,
}

impl IdentityPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &BTreeMap<usize, Identity> {
        &self.active
    }

    pub fn lost(&self) -> &BTreeMap<usize, Identity> {
        &self.lost
    }

    pub fn next_id(&self) -> usize {
        self.next_id
    }

    pub fn get(&self, id: usize) -> Option<&Identity> {
        self.active.get(&id).or_else(|| self.lost.get(&id))
    }

    /// Create a new active identity and return its id.
    pub(crate) fn allocate(&mut self, observation: Observation, frame_id: usize) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.active.insert(id, Identity::new(id, observation, frame_id));
        id
    }

    /// Overwrite an active identity with a new observation.
    ///
    /// Returns `false` if `id` is not active.
    pub(crate) fn refresh(&mut self, id: usize, observation: Observation, frame_id: usize) -> bool {
        match self.active.get_mut(&id) {
            Some(identity) => {
                identity.observe(observation, frame_id);
                true
            }
            None => false,
        }
    }

    /// Move a lost identity back to the active pool with a new observation.
    ///
    /// Returns the number of frames it had been lost for, or `None` if `id`
    /// is not lost.
    pub(crate) fn revive(
        &mut self,
        id: usize,
        observation: Observation,
        frame_id: usize,
    ) -> Option<usize> {
        let mut identity = self.lost.remove(&id)?;
        let frames_lost = frame_id.saturating_sub(identity.last_seen_frame);
        identity.observe(observation, frame_id);
        self.active.insert(id, identity);
        Some(frames_lost)
    }

    /// Move every active identity not in `matched` to the lost pool, stamping
    /// it with `frame_id`. Returns the demoted ids in ascending order.
    pub(crate) fn demote_unmatched(
        &mut self,
        matched: &BTreeSet<usize>,
        frame_id: usize,
    ) -> Vec<usize> {
        let demoted: Vec<usize> = self
            .active
            .keys()
            .filter(|id| !matched.contains(*id))
            .copied()
            .collect();

        for id in demoted.iter() {
            if let Some(mut identity) = self.active.remove(id) {
                identity.last_seen_frame = frame_id;
                self.lost.insert(*id, identity);
            }
        }

        demoted
    }

    /// Forget lost identities unseen for more than `max_lost_frames` frames.
    /// Returns the forgotten ids in ascending order.
    pub(crate) fn evict_expired(&mut self, frame_id: usize, max_lost_frames: usize) -> Vec<usize> {
        let expired: Vec<usize> = self
            .lost
            .values()
            .filter(|identity| frame_id.saturating_sub(identity.last_seen_frame) > max_lost_frames)
            .map(|identity| identity.id)
            .collect();

        for id in expired.iter() {
            self.lost.remove(id);
        }

        expired
    }
}
