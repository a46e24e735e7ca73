//! Value ↔ angle mapping for a circular dial.
//!
//! Two angle conventions meet here:
//!
//! * dial angles, in degrees, measured clockwise from 12 o'clock. This is the
//!   unit of `start_angle`/`end_angle` and of every arc in a scene;
//! * screen angles, in radians, measured counter-clockwise from 3 o'clock with
//!   the y axis pointing up (what `atan2` returns once screen rows are
//!   flipped).
//!
//! The forward mapping (value → angle) and the inverse mapping (point → value)
//! are derived independently from the configuration so neither accumulates the
//! rounding error of the other.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::config::GaugeConfig;

/// Values this close to a bound (relative to the range) are snapped onto it.
const BOUND_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point at `radius` from `self` in the direction of a dial angle.
    /// Screen space is y-down, so 12 o'clock is `-y`.
    pub fn polar(self, radius: f64, dial_degrees: f64) -> Point {
        let (s, c) = dial_degrees.to_radians().sin_cos();
        Point::new(self.x + radius * s, self.y - radius * c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle; `origin` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// A rectangle of `size` centred on `center`.
    pub fn centered(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }
}

/// Geometry derived from the bounding box and the range/angle configuration.
/// Recomputed as a whole; never patched field by field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub center: Point,
    pub radius: f64,
    pub r2: f64,
    pub min: f64,
    pub max: f64,
    /// Forward coefficients: rotation `= a*value + b`, dial angle `= -(a*value + b)`.
    pub a: f64,
    pub b: f64,
    pub start_theta: f64,
    pub end_theta: f64,
    /// `start_theta < end_theta`.
    pub direct: bool,
    /// Inverse coefficients: `value = ra*theta + rb`.
    pub ra: f64,
    pub rb: f64,
}

impl Geometry {
    pub fn compute(config: &GaugeConfig) -> Self {
        let bounds = config.bounds;
        let radius = bounds.size.width.min(bounds.size.height).max(0.0) / 2.0;
        let (min, max) = (config.min, config.max);
        let (sa, ea) = (config.start_angle, config.end_angle);
        let full_circle = sa == ea;

        let span_end = if full_circle { ea + 360.0 } else { ea };
        let a = (sa - span_end) / (max - min);
        let b = -sa - a * min;

        let start_theta = FRAC_PI_2 - sa.to_radians();
        let end_theta = if full_circle {
            start_theta - TAU
        } else {
            FRAC_PI_2 - ea.to_radians()
        };
        let ra = (max - min) / (end_theta - start_theta);
        let rb = min - ra * start_theta;

        Self {
            center: bounds.center(),
            radius,
            r2: radius * radius,
            min,
            max,
            a,
            b,
            start_theta,
            end_theta,
            direct: start_theta < end_theta,
            ra,
            rb,
        }
    }

    /// Needle rotation for `value`, counter-clockwise degrees. Not clamped.
    pub fn value_to_angle(&self, value: f64) -> f64 {
        self.a * value + self.b
    }

    /// Dial angle for `value`, clockwise degrees from 12 o'clock.
    pub fn dial_angle(&self, value: f64) -> f64 {
        -self.value_to_angle(value)
    }

    fn window(&self) -> (f64, f64) {
        if self.direct {
            (self.start_theta, self.end_theta)
        } else {
            (self.end_theta, self.start_theta)
        }
    }

    fn snap(&self, v: f64) -> Option<f64> {
        let eps = BOUND_EPSILON * (self.max - self.min).abs();
        if v >= self.min - eps && v <= self.max + eps {
            Some(v.clamp(self.min, self.max))
        } else {
            None
        }
    }

    /// Maps a screen angle onto the dial. Angles in the window give a value in
    /// `[min, max]`; angles outside give `Err` carrying the value extrapolated
    /// from the nearer end of the window, which lies strictly outside the range.
    fn theta_to_value(&self, theta: f64) -> Result<f64, f64> {
        let (lo, hi) = self.window();
        let mut theta = lo + (theta - lo).rem_euclid(TAU);
        if theta > hi {
            // In the gap: measure from whichever end of the window is closer.
            let wrapped = theta - TAU;
            if theta - hi > lo - wrapped {
                theta = wrapped;
            }
        }
        let v = self.ra * theta + self.rb;
        self.snap(v).ok_or(v)
    }

    /// Value under `point`, or `None` when the point lies outside the dial or
    /// outside its angular range. With `extended`, out-of-range angles are
    /// reported (unclamped, outside `[min, max]`) instead of rejected.
    ///
    /// The centre maps to `atan2(0, 0) == 0`, the 3 o'clock direction; a dial
    /// of radius 0 reports nothing.
    pub fn point_to_value(&self, point: Point, extended: bool) -> Option<f64> {
        if self.radius <= 0.0 {
            return None;
        }
        let x = point.x - self.center.x;
        let y = self.center.y - point.y;
        if x * x + y * y > self.r2 {
            return None;
        }
        match self.theta_to_value(y.atan2(x)) {
            Ok(v) => Some(v),
            Err(v) if extended => Some(v),
            Err(_) => None,
        }
    }

    /// Inverse of [`Geometry::dial_angle`] restricted to the dial's window.
    pub fn angle_to_value(&self, dial_degrees: f64) -> Option<f64> {
        self.theta_to_value(FRAC_PI_2 - dial_degrees.to_radians()).ok()
    }

    /// Dial span in degrees, 360 for a full-circle gauge.
    pub fn span(config: &GaugeConfig) -> f64 {
        if config.start_angle == config.end_angle {
            360.0
        } else {
            config.end_angle - config.start_angle
        }
    }
}
