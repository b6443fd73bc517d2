//! Proximity matching against active identities.

use nalgebra::{distance, Point2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    pub id: usize,
    pub distance: f32,
}

/// Find the candidate nearest to `position` whose distance is strictly below
/// `max_distance`.
///
/// The result does not depend on candidate order: the smallest distance wins,
/// and equal distances resolve to the smallest id.
pub fn match_nearest<'a, I>(
    position: &Point2<f32>,
    candidates: I,
    max_distance: f32,
) -> Option<SpatialMatch>
where
    I: IntoIterator<Item = (usize, &'a Point2<f32>)>,
{
    let mut best: Option<SpatialMatch> = None;

    for (id, center) in candidates {
        let dist = distance(position, center);
        if !(dist < max_distance) {
            continue;
        }
        let closer = match best {
            None => true,
            Some(b) => dist < b.distance || (dist == b.distance && id < b.id),
        };
        if closer {
            best = Some(SpatialMatch { id, distance: dist });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearly_eq::assert_nearly_eq;

    #[test]
    fn test_no_candidates() {
        let candidates: Vec<(usize, &Point2<f32>)> = vec![];
        assert_eq!(match_nearest(&Point2::new(0.0, 0.0), candidates, 30.0), None);
    }

    #[test]
    fn test_single_candidate_within_threshold() {
        let center = Point2::new(103.0, 104.0);
        let result = match_nearest(&Point2::new(100.0, 100.0), vec![(4, &center)], 30.0);

        let result = result.unwrap();
        assert_eq!(result.id, 4);
        assert_nearly_eq!(result.distance, 5.0, 1e-5);
    }

    #[test]
    fn test_threshold_is_strict() {
        let center = Point2::new(130.0, 100.0);
        let result = match_nearest(&Point2::new(100.0, 100.0), vec![(1, &center)], 30.0);
        assert_eq!(result, None);
    }

    #[test]
    fn test_picks_nearest_not_first() {
        let far = Point2::new(120.0, 100.0);
        let near = Point2::new(105.0, 100.0);
        let result = match_nearest(
            &Point2::new(100.0, 100.0),
            vec![(1, &far), (2, &near)],
            30.0,
        );
        assert_eq!(result.map(|m| m.id), Some(2));
    }

    #[test]
    fn test_equal_distance_prefers_lowest_id() {
        let left = Point2::new(90.0, 100.0);
        let right = Point2::new(110.0, 100.0);

        let forward = match_nearest(
            &Point2::new(100.0, 100.0),
            vec![(7, &left), (3, &right)],
            30.0,
        );
        let backward = match_nearest(
            &Point2::new(100.0, 100.0),
            vec![(3, &right), (7, &left)],
            30.0,
        );
        assert_eq!(forward.map(|m| m.id), Some(3));
        assert_eq!(backward.map(|m| m.id), Some(3));
    }

    #[test]
    fn test_nan_position_never_matches() {
        let center = Point2::new(100.0, 100.0);
        let result = match_nearest(&Point2::new(f32::NAN, 100.0), vec![(1, &center)], 30.0);
        assert_eq!(result, None);
    }
}
