use crate::pointcloud::point::{Point, PointCloud};

pub trait PointCloudDecimator {
    fn decimate(&self, points: &[Point]) -> Vec<Point>;
}

/// Keeps at most `max_count` points, picked at evenly spaced indices so that the
/// same input always yields the same output.
pub struct BudgetDecimator {
    pub max_count: usize,
}

impl PointCloudDecimator for BudgetDecimator {
    fn decimate(&self, points: &[Point]) -> Vec<Point> {
        if points.len() <= self.max_count {
            return points.to_vec();
        }

        budget_indices(points.len(), self.max_count)
            .map(|index| points[index])
            .collect()
    }
}

/// Indices `round(i * (len - 1) / (count - 1))` for `i in 0..count`.
///
/// Requires `count <= len`; the resulting indices are strictly increasing and always
/// include both `0` and `len - 1` when `count >= 2`.
pub fn budget_indices(len: usize, count: usize) -> impl Iterator<Item = usize> {
    debug_assert!(count <= len);
    let span = len.saturating_sub(1) as u64;
    let steps = count.saturating_sub(1) as u64;

    (0..count as u64).map(move |i| {
        if steps == 0 {
            0
        } else {
            // integer round-half-up of i * span / steps
            ((2 * i * span + steps) / (2 * steps)) as usize
        }
    })
}

/// Caps a cloud to `max_count` points, returning it untouched when already within budget.
pub fn cap_to(point_cloud: &PointCloud, max_count: usize) -> PointCloud {
    if point_cloud.len() <= max_count {
        return point_cloud.clone();
    }

    let decimator = BudgetDecimator { max_count };
    let mut capped = PointCloud::new(decimator.decimate(&point_cloud.points));
    capped.metadata.declared_count = point_cloud.metadata.declared_count;
    capped.metadata.encoding = point_cloud.metadata.encoding;
    capped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, 0.0, 0.0)).collect()
    }

    fn xs(points: &[Point]) -> Vec<usize> {
        points.iter().map(|p| p.x as usize).collect()
    }

    #[test]
    fn within_budget_is_unchanged() {
        let points = line(10);
        let decimated = BudgetDecimator { max_count: 10 }.decimate(&points);
        assert_eq!(decimated, points);
    }

    #[test]
    fn selects_evenly_spaced_indices() {
        let decimated = BudgetDecimator { max_count: 4 }.decimate(&line(10));
        // 0, 3, 6, 9
        assert_eq!(xs(&decimated), vec![0, 3, 6, 9]);

        let decimated = BudgetDecimator { max_count: 3 }.decimate(&line(6));
        // 0, 2.5 -> 3, 5
        assert_eq!(xs(&decimated), vec![0, 3, 5]);
    }

    #[test]
    fn exact_count_and_deterministic() {
        let points = line(30_001);
        for budget in [1, 2, 7, 1000, 30_000] {
            let decimator = BudgetDecimator { max_count: budget };
            let first = decimator.decimate(&points);
            let second = decimator.decimate(&points);
            assert_eq!(first.len(), budget);
            assert_eq!(first, second);
            let indices = xs(&first);
            assert!(indices.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn keeps_first_and_last() {
        let decimated = BudgetDecimator { max_count: 5 }.decimate(&line(123));
        assert_eq!(decimated.first().unwrap().x, 0.0);
        assert_eq!(decimated.last().unwrap().x, 122.0);
    }

    #[test]
    fn zero_budget_is_empty() {
        assert!(BudgetDecimator { max_count: 0 }.decimate(&line(3)).is_empty());
    }

    #[test]
    fn cap_to_preserves_source_metadata() {
        let mut pc = PointCloud::new(line(100));
        pc.metadata.declared_count = Some(100);
        let capped = cap_to(&pc, 10);
        assert_eq!(capped.len(), 10);
        assert_eq!(capped.metadata.point_count, 10);
        assert_eq!(capped.metadata.declared_count, Some(100));

        let same = cap_to(&pc, 500);
        assert_eq!(same.points, pc.points);
    }
}
