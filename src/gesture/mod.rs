//! Gesture recognition
//!
//! This module turns drawn 2D paths into comparable shapes and matches them
//! against caller-supplied templates:
//! - Bounding-box normalization into the unit square
//! - Equal arc-length resampling
//! - Mean-distance template matching

pub mod trajectory;
pub mod matcher;

pub use trajectory::{normalize, path_length, resample, Point};
pub use matcher::{GestureMatch, GestureMatcher, Template, TemplateSpec};
