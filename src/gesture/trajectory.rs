//! Trajectory Normalization & Resampling
//!
//! Gesture paths arrive in whatever coordinate space the client drew them in
//! (usually screen pixels) and with whatever sampling density the input device
//! produced. Before two paths can be compared they are normalized into the unit
//! square and resampled to a common point count at equal arc-length spacing.

use serde::{Deserialize, Deserializer, Serialize};

/// Point in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Scale and translate a trajectory so its bounding box spans [0, 1] on each axis.
///
/// Axes are scaled independently. An axis with zero extent uses a divisor of 1,
/// so its points pass through as `coordinate - min`. Trajectories with fewer
/// than two points are returned unchanged.
pub fn normalize(points: &[Point]) -> Vec<Point> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    let width = if max_x > min_x { max_x - min_x } else { 1.0 };
    let height = if max_y > min_y { max_y - min_y } else { 1.0 };

    points
        .iter()
        .map(|p| Point::new((p.x - min_x) / width, (p.y - min_y) / height))
        .collect()
}

/// Total polyline length
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Resample a trajectory to exactly `count` points at equal arc-length spacing.
///
/// The first and last points are preserved; interior points are linearly
/// interpolated along the original polyline. The input is returned unchanged
/// when it has at most one point, when `count <= 1`, when it already has
/// `count` points, or when its path length is zero.
pub fn resample(points: &[Point], count: usize) -> Vec<Point> {
    if points.len() <= 1 || count <= 1 || points.len() == count {
        return points.to_vec();
    }

    let total = path_length(points);
    if total == 0.0 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];
    let step = total / (count - 1) as f64;

    let mut resampled = Vec::with_capacity(count);
    resampled.push(first);

    // Cursor state: index of the current segment's start point and the
    // arc length covered before it. Both only ever move forward.
    let mut segment = 0;
    let mut travelled = 0.0;

    for i in 1..count - 1 {
        let target = step * i as f64;

        loop {
            if segment + 1 >= points.len() {
                // Rounding left the target just past the final vertex
                resampled.push(last);
                break;
            }

            let start = &points[segment];
            let end = &points[segment + 1];
            let length = start.distance_to(end);

            if travelled + length >= target {
                let ratio = if length > 0.0 {
                    (target - travelled) / length
                } else {
                    0.0
                };
                resampled.push(start.lerp(end, ratio));
                break;
            }

            travelled += length;
            segment += 1;
        }
    }

    resampled.push(last);
    resampled
}

/// Lenient trajectory deserializer.
///
/// Accepts points either as `{"x": .., "y": ..}` objects (missing fields read
/// as 0) or as `[x, y, ..]` arrays. Entries that fit neither shape are dropped.
pub fn deserialize_points<'de, D>(deserializer: D) -> Result<Vec<Point>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<WirePoint>::deserialize(deserializer)?;
    Ok(raw.into_iter().filter_map(WirePoint::into_point).collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePoint {
    // Listed before `Object`, which would otherwise also accept short arrays
    Pair(Vec<f64>),
    Object {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    Other(serde::de::IgnoredAny),
}

impl WirePoint {
    fn into_point(self) -> Option<Point> {
        match self {
            WirePoint::Object { x, y } => Some(Point::new(x, y)),
            WirePoint::Pair(values) if values.len() >= 2 => Some(Point::new(values[0], values[1])),
            _ => None,
        }
    }
}
