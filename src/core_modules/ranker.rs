// Keeps the brightest `capacity` candidates, brightest first. The sort is stable, so
// candidates of equal brightness keep their scan order and the result is
// deterministic for a given frame.

use crate::core_modules::extractor::BrightPoint;

pub fn rank_and_limit(mut candidates: Vec<BrightPoint>, capacity: usize) -> Vec<BrightPoint> {
    candidates.sort_by(|a, b| b.brightness.total_cmp(&a.brightness));
    candidates.truncate(capacity);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: u32, brightness: f64) -> BrightPoint {
        BrightPoint {
            x,
            y: 0,
            brightness,
            color: [1.0, 1.0, 1.0],
        }
    }

    #[test]
    fn keeps_the_brightest_k_in_descending_order() {
        let brightness = [201.0, 250.0, 210.0, 254.0, 230.0, 220.0, 205.0, 240.0];
        let candidates: Vec<_> = brightness
            .iter()
            .enumerate()
            .map(|(i, &b)| point(i as u32, b))
            .collect();

        let ranked = rank_and_limit(candidates.clone(), 3);

        assert_eq!(ranked.len(), 3);
        let kept: Vec<f64> = ranked.iter().map(|p| p.brightness).collect();
        assert_eq!(kept, vec![254.0, 250.0, 240.0]);
        let weakest_kept = kept[2];
        for dropped in candidates.iter().filter(|c| !ranked.contains(c)) {
            assert!(dropped.brightness <= weakest_kept);
        }
    }

    #[test]
    fn fewer_candidates_than_capacity_are_not_padded() {
        let ranked = rank_and_limit(vec![point(0, 210.0), point(1, 230.0)], 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].x, 1);
    }

    #[test]
    fn ties_keep_scan_order() {
        let candidates = vec![point(0, 220.0), point(1, 240.0), point(2, 220.0), point(3, 220.0)];
        let ranked = rank_and_limit(candidates, 3);
        let order: Vec<u32> = ranked.iter().map(|p| p.x).collect();
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(rank_and_limit(Vec::new(), 5).is_empty());
    }
}
