//! Planar geometry helpers shared by the field model and the controller

use std::f64::consts::PI;

use super::types::{Point2D, Vector2D};
use crate::error::{ControllerError, Result};

const TWO_PI: f64 = 2.0 * PI;

/// Reduce an angle into (-pi, pi].
///
/// The nearest multiple of 2pi is removed with a truncating division, then a
/// single wrap fixes the boundary so that exactly -pi maps to +pi.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut angle = angle - TWO_PI * (angle / TWO_PI).trunc();
    if angle <= -PI {
        angle += TWO_PI;
    } else if angle > PI {
        angle -= TWO_PI;
    }
    angle
}

/// Angle of the ray from `from` to `to`, measured from the +x axis.
pub fn bearing(from: &Point2D, to: &Point2D) -> f64 {
    let d = to - from;
    d.y.atan2(d.x)
}

pub fn distance(from: &Point2D, to: &Point2D) -> f64 {
    nalgebra::distance(from, to)
}

/// Vector of the given magnitude pointing along `angle`.
pub fn polar(magnitude: f64, angle: f64) -> Vector2D {
    Vector2D::new(magnitude * angle.cos(), magnitude * angle.sin())
}

/// Arithmetic mean of a set of points.
///
/// An empty set has no centroid; callers get a `MalformedWorldState` instead
/// of a NaN.
pub fn centroid(points: &[Point2D]) -> Result<Point2D> {
    if points.is_empty() {
        return Err(ControllerError::MalformedWorldState(
            "centroid of an empty point set".to_string(),
        ));
    }
    let sum = points
        .iter()
        .fold(Vector2D::zeros(), |acc, p| acc + p.coords);
    Ok(Point2D::from(sum / points.len() as f64))
}
