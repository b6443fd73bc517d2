//! Per-frame driver
//!
//! Wires an object detector and a short-term box tracker in front of a
//! [`ReidTracker`]. Both upstream stages are external collaborators and are
//! expressed as traits.

use crate::error::TrackError;
use crate::object::Object;
use crate::reid_tracker::{FrameOutput, ReidTracker};
use image::RgbImage;
use tracing::debug;

/// Produces per-frame detections.
pub trait Detector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Object>, TrackError>;
}

/// Stabilizes detection boxes between consecutive frames.
///
/// Any `track_id` it assigns is ignored for long-term identity.
pub trait ShortTermTracker {
    fn update(&mut self, objects: &[Object]) -> Result<Vec<Object>, TrackError>;
}

/// Short-term tracker that hands detections through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl ShortTermTracker for PassThrough {
    fn update(&mut self, objects: &[Object]) -> Result<Vec<Object>, TrackError> {
        Ok(objects.to_vec())
    }
}

#[derive(Debug)]
pub struct Pipeline<D, S>
where
    D: Detector,
    S: ShortTermTracker,
{
    detector: D,
    short_term: S,
    tracker: ReidTracker,
}

impl<D, S> Pipeline<D, S>
where
    D: Detector,
    S: ShortTermTracker,
{
    pub fn new(detector: D, short_term: S, tracker: ReidTracker) -> Self {
        Self {
            detector,
            short_term,
            tracker,
        }
    }

    pub fn tracker(&self) -> &ReidTracker {
        &self.tracker
    }

    pub fn into_tracker(self) -> ReidTracker {
        self.tracker
    }

    /// Detect, stabilize and resolve identities for one frame.
    pub fn process_frame(&mut self, frame: &RgbImage) -> Result<FrameOutput, TrackError> {
        let detections = self.detector.detect(frame)?;
        let stabilized = self.short_term.update(&detections)?;
        debug!(
            frame_id = self.tracker.frame_count(),
            detections = detections.len(),
            stabilized = stabilized.len(),
            "frame detections"
        );
        Ok(self.tracker.update(frame, &stabilized))
    }

    /// Process frames strictly in order, stopping at the first upstream error.
    pub fn process_frames(&mut self, frames: &[RgbImage]) -> Result<Vec<FrameOutput>, TrackError> {
        frames
            .iter()
            .map(|frame| self.process_frame(frame))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReidConfig;
    use crate::rect::Rect;
    use image::Rgb;

    /// Replays a fixed list of detections, one entry per frame.
    struct Replay {
        frames: Vec<Vec<Object>>,
        cursor: usize,
    }

    impl Detector for Replay {
        fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Object>, TrackError> {
            let objects = self
                .frames
                .get(self.cursor)
                .cloned()
                .ok_or_else(|| TrackError::Detector(format!("no detections for frame {}", self.cursor)))?;
            self.cursor += 1;
            Ok(objects)
        }
    }

    /// Assigns a fresh short-term id to every box on every frame.
    struct Renumber {
        counter: usize,
    }

    impl ShortTermTracker for Renumber {
        fn update(&mut self, objects: &[Object]) -> Result<Vec<Object>, TrackError> {
            Ok(objects
                .iter()
                .map(|o| {
                    self.counter += 1;
                    let mut o = o.clone();
                    o.set_track_id(Some(self.counter));
                    o
                })
                .collect())
        }
    }

    fn player(x: f32) -> Object {
        Object::new(Rect::new(x, 50.0, 20.0, 40.0), Some(0.9), None).with_class(1)
    }

    fn frames(n: usize) -> Vec<RgbImage> {
        (0..n)
            .map(|_| RgbImage::from_pixel(320, 240, Rgb([200, 30, 30])))
            .collect()
    }

    #[test]
    fn test_pass_through_is_identity() {
        let objects = vec![player(10.0), player(100.0)];
        let result = PassThrough.update(&objects).unwrap();
        assert_eq!(result, objects);
    }

    #[test]
    fn test_process_frames_keeps_long_term_ids() {
        let detector = Replay {
            frames: vec![vec![player(10.0)], vec![player(15.0)], vec![player(20.0)]],
            cursor: 0,
        };
        let tracker = ReidTracker::new(ReidConfig::default()).unwrap();
        let mut pipeline = Pipeline::new(detector, Renumber { counter: 100 }, tracker);

        let outputs = pipeline.process_frames(&frames(3)).unwrap();

        assert_eq!(outputs.len(), 3);
        for (i, output) in outputs.iter().enumerate() {
            assert_eq!(output.frame_id, i);
            assert_eq!(output.objects[0].get_track_id(), Some(0));
        }
        assert_eq!(pipeline.tracker().frame_count(), 3);
    }

    #[test]
    fn test_detector_error_propagates() {
        let detector = Replay {
            frames: vec![vec![player(10.0)]],
            cursor: 0,
        };
        let tracker = ReidTracker::new(ReidConfig::default()).unwrap();
        let mut pipeline = Pipeline::new(detector, PassThrough, tracker);

        let result = pipeline.process_frames(&frames(2));

        assert!(matches!(result, Err(TrackError::Detector(_))));
        assert_eq!(pipeline.into_tracker().frame_count(), 1);
    }
}
