//! Template-Based Gesture Matching
//!
//! Compares a drawn trajectory against caller-supplied templates. Both sides
//! are normalized into the unit square and resampled to a shared point count;
//! the mean point-to-point distance is then mapped onto a [0, 1] similarity.
//!
//! The matcher is stateless: templates live only for the duration of one
//! [`GestureMatcher::recognize`] call.

use super::trajectory::{deserialize_points, normalize, path_length, resample, Point};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Upper bound on resampled points per comparison
pub const DEFAULT_MAX_RESAMPLE_POINTS: usize = 50;

/// Trajectories shorter than this cannot be recognized
pub const MIN_TRAJECTORY_POINTS: usize = 2;

/// Largest possible distance between two points of the unit square
const MAX_UNIT_DISTANCE: f64 = std::f64::consts::SQRT_2;

/// Template as sent by the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_points")]
    pub trajectory: Vec<Point>,
    #[serde(default)]
    pub command: Option<String>,
}

/// Normalized reference trajectory
#[derive(Debug, Clone)]
pub struct Template {
    pub id: String,
    pub name: String,
    /// Trajectory scaled into the unit square
    pub trajectory: Vec<Point>,
    pub point_count: usize,
    /// Command bound to the gesture, echoed back on recognition
    pub command: String,
}

impl Template {
    /// Build a template, normalizing the raw trajectory
    pub fn new(id: impl Into<String>, name: impl Into<String>, raw: &[Point]) -> Self {
        let trajectory = normalize(raw);
        Self {
            id: id.into(),
            name: name.into(),
            point_count: trajectory.len(),
            trajectory,
            command: String::new(),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Build the per-request template set from client specs.
    ///
    /// Identifiers are positional (`temp_{index}_{name}`) so duplicate names
    /// stay distinguishable.
    pub fn from_specs(specs: &[TemplateSpec]) -> Vec<Template> {
        specs
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let name = spec.name.clone().unwrap_or_else(|| "unknown".to_string());
                debug!(
                    "Loading template {}: '{}' with {} points",
                    i + 1,
                    name,
                    spec.trajectory.len()
                );
                Template::new(format!("temp_{}_{}", i, name), name, &spec.trajectory)
                    .with_command(spec.command.clone().unwrap_or_default())
            })
            .collect()
    }
}

/// Winning template of a recognition call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestureMatch {
    pub template_id: String,
    pub name: String,
    pub command: String,
    /// Similarity in [0, 1]
    pub similarity: f64,
}

impl GestureMatch {
    /// Similarity doubles as recognition confidence
    pub fn confidence(&self) -> f64 {
        self.similarity
    }
}

/// Shape matcher over normalized, resampled trajectories
#[derive(Debug, Clone)]
pub struct GestureMatcher {
    max_points: usize,
}

impl GestureMatcher {
    pub fn new() -> Self {
        Self {
            max_points: DEFAULT_MAX_RESAMPLE_POINTS,
        }
    }

    /// Create with a custom resampling cap (at least 2)
    pub fn with_max_points(max_points: usize) -> Self {
        Self {
            max_points: max_points.max(MIN_TRAJECTORY_POINTS),
        }
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Return the best template whose similarity reaches `threshold`.
    ///
    /// Every template is scored. A winner must beat the previous best
    /// strictly, starting from zero, so ties keep the earlier template and a
    /// similarity of exactly zero never matches.
    pub fn recognize(
        &self,
        input: &[Point],
        templates: &[Template],
        threshold: f64,
    ) -> Option<GestureMatch> {
        if input.len() < MIN_TRAJECTORY_POINTS || templates.is_empty() {
            return None;
        }

        let normalized = normalize(input);
        debug!(
            "Recognizing gesture with {} points against {} templates",
            normalized.len(),
            templates.len()
        );

        let mut best: Option<(usize, f64)> = None;
        let mut best_seen = 0.0_f64;

        for (index, template) in templates.iter().enumerate() {
            let similarity = self.similarity(&normalized, &template.trajectory);
            debug!("  Template '{}': similarity = {:.3}", template.name, similarity);
            best_seen = best_seen.max(similarity);

            if similarity < threshold {
                continue;
            }
            let current = best.map_or(0.0, |(_, score)| score);
            if similarity > current {
                best = Some((index, similarity));
            }
        }

        match best {
            Some((index, similarity)) => {
                let template = &templates[index];
                info!(
                    "Gesture recognized: '{}' with {:.3} confidence",
                    template.name, similarity
                );
                Some(GestureMatch {
                    template_id: template.id.clone(),
                    name: template.name.clone(),
                    command: template.command.clone(),
                    similarity,
                })
            }
            None => {
                info!(
                    "No gesture recognized (best similarity: {:.3}, threshold: {:.2})",
                    best_seen, threshold
                );
                None
            }
        }
    }

    /// Similarity of two normalized trajectories in [0, 1]
    pub fn similarity(&self, a: &[Point], b: &[Point]) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let count = self.max_points.min(a.len().max(b.len()));
        let ra = Self::resample_for_comparison(a, count);
        let rb = Self::resample_for_comparison(b, count);

        let total: f64 = ra.iter().zip(&rb).map(|(p, q)| p.distance_to(q)).sum();
        let mean = total / ra.len() as f64;

        (1.0 - mean / MAX_UNIT_DISTANCE).max(0.0)
    }

    /// Resample to `count` points; a path with no length collapses to its
    /// single location repeated `count` times.
    fn resample_for_comparison(points: &[Point], count: usize) -> Vec<Point> {
        if points.len() != count && (points.len() == 1 || path_length(points) == 0.0) {
            return vec![points[0]; count];
        }
        resample(points, count)
    }
}

impl Default for GestureMatcher {
    fn default() -> Self {
        Self::new()
    }
}
