//! Gesture Recognition Integration Tests
//!
//! Exercises the recognizer the way a session does: client-shaped template
//! specs are parsed from JSON, turned into templates, and matched against a
//! drawn trajectory.
//! - Shape identity under scale and translation
//! - Rejection of unrelated shapes and reversed strokes
//! - Result independence from template order
//! - Degenerate inputs

use aircut_server::gesture::{GestureMatcher, Point, Template, TemplateSpec};
use aircut_server::session::messages::RecognizeGesture;

// ============================================================================
// Helpers
// ============================================================================

fn points(raw: &[(f64, f64)]) -> Vec<Point> {
    raw.iter().copied().map(Point::from).collect()
}

fn entry(name: &str, raw: &[(f64, f64)], command: &str) -> TemplateSpec {
    TemplateSpec {
        name: Some(name.to_string()),
        trajectory: points(raw),
        command: Some(command.to_string()),
    }
}

const L_SHAPE: &[(f64, f64)] = &[(0.0, 0.0), (0.0, 100.0), (100.0, 100.0)];
const Z_SHAPE: &[(f64, f64)] = &[(0.0, 0.0), (80.0, 0.0), (0.0, 60.0), (80.0, 60.0)];
const HORIZONTAL: &[(f64, f64)] = &[(0.0, 0.0), (100.0, 0.0)];

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_hand_drawn_l_matches_l_template() {
    let templates = Template::from_specs(&[entry("L", L_SHAPE, "copy")]);

    // Wobbly, denser redrawing of the same L somewhere else on screen
    let drawn = points(&[
        (200.0, 300.0),
        (202.0, 325.0),
        (199.0, 350.0),
        (201.0, 375.0),
        (200.0, 400.0),
        (225.0, 398.0),
        (250.0, 401.0),
        (275.0, 400.0),
        (300.0, 400.0),
    ]);

    let found = GestureMatcher::new()
        .recognize(&drawn, &templates, 0.85)
        .expect("L should be recognized");
    assert_eq!(found.name, "L");
    assert_eq!(found.command, "copy");
    assert_eq!(found.template_id, "temp_0_L");
    assert!(found.similarity > 0.9, "similarity {}", found.similarity);
}

#[test]
fn test_scaled_and_translated_copy_scores_high() {
    let templates = Template::from_specs(&[entry("Z", Z_SHAPE, "undo")]);
    let matcher = GestureMatcher::new();

    for (scale, dx, dy) in [(0.01, 5.0, 5.0), (3.7, -20.0, 55.0), (250.0, 1000.0, -400.0)] {
        let copy: Vec<Point> = Z_SHAPE
            .iter()
            .map(|&(x, y)| Point::new(x * scale + dx, y * scale + dy))
            .collect();
        let found = matcher.recognize(&copy, &templates, 0.95).expect("copy should match");
        assert!(found.similarity >= 0.95);
    }
}

#[test]
fn test_unrelated_shapes_are_rejected() {
    let templates = Template::from_specs(&[entry("right", HORIZONTAL, "next")]);
    let matcher = GestureMatcher::new();

    let vertical = points(&[(0.0, 0.0), (0.0, 100.0)]);
    assert!(matcher.recognize(&vertical, &templates, 0.85).is_none());

    let templates = Template::from_specs(&[entry("L", L_SHAPE, "copy")]);
    let reversed: Vec<Point> = points(L_SHAPE).into_iter().rev().collect();
    assert!(matcher.recognize(&reversed, &templates, 0.85).is_none());
}

#[test]
fn test_best_match_ignores_template_order() {
    let l = entry("L", L_SHAPE, "copy");
    let z = entry("Z", Z_SHAPE, "undo");
    let h = entry("right", HORIZONTAL, "next");
    let drawn = points(&[(10.0, 10.0), (90.0, 12.0), (12.0, 70.0), (88.0, 68.0)]);
    let matcher = GestureMatcher::new();

    let forward = Template::from_specs(&[l.clone(), z.clone(), h.clone()]);
    let backward = Template::from_specs(&[h, z, l]);

    let a = matcher.recognize(&drawn, &forward, 0.5).unwrap();
    let b = matcher.recognize(&drawn, &backward, 0.5).unwrap();
    assert_eq!(a.name, "Z");
    assert_eq!(b.name, "Z");
    assert!((a.similarity - b.similarity).abs() < 1e-12);
}

#[test]
fn test_identical_templates_keep_first() {
    let templates = Template::from_specs(&[entry("first", L_SHAPE, "a"), entry("second", L_SHAPE, "b")]);
    let found = GestureMatcher::new()
        .recognize(&points(L_SHAPE), &templates, 0.5)
        .unwrap();
    assert_eq!(found.name, "first");
    assert_eq!(found.command, "a");
}

#[test]
fn test_single_point_trajectory_is_never_recognized() {
    let templates = Template::from_specs(&[entry("L", L_SHAPE, "copy")]);
    let single = points(&[(5.0, 5.0)]);
    assert!(GestureMatcher::new().recognize(&single, &templates, 0.0).is_none());
}

#[test]
fn test_no_templates_is_never_recognized() {
    assert!(GestureMatcher::new()
        .recognize(&points(L_SHAPE), &[], 0.0)
        .is_none());
}

#[test]
fn test_threshold_of_one_requires_exact_shape() {
    let templates = Template::from_specs(&[entry("L", L_SHAPE, "copy")]);
    let matcher = GestureMatcher::new();
    let bent = points(&[(0.0, 0.0), (10.0, 100.0), (100.0, 100.0)]);

    assert!(matcher.recognize(&bent, &templates, 0.85).is_some());
    assert!(matcher.recognize(&bent, &templates, 1.0).is_none());
}

#[test]
fn test_request_parsed_from_client_json() {
    let json = r#"{
        "trajectory": [{"x": 10, "y": 10}, [10, 60], {"x": 60, "y": 60}, "junk"],
        "confidence_threshold": 0.9,
        "templates": [
            {"name": "L", "trajectory": [[0,0],[0,1],[1,1]], "command": "copy"},
            {"trajectory": [[0,0],[1,0]]}
        ]
    }"#;
    let request: RecognizeGesture = serde_json::from_str(json).unwrap();
    assert_eq!(request.trajectory.len(), 3);

    let templates = Template::from_specs(&request.templates);
    assert_eq!(templates[1].name, "unknown");
    assert_eq!(templates[1].id, "temp_1_unknown");
    assert!(templates[1].command.is_empty());

    let found = GestureMatcher::new()
        .recognize(&request.trajectory, &templates, request.confidence_threshold.unwrap())
        .unwrap();
    assert_eq!(found.name, "L");
    assert_eq!(found.command, "copy");
}
