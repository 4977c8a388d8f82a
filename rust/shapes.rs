//! Parametric emitter layouts
//!
//! Concentric rings sampled at a fixed angular step, and thick strokes built
//! from quadratic Bezier segments repeated at vertical offsets.

use glam::DVec2;

/// One circle of anchor points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub center: DVec2,
    pub radius: f64,
    /// Angular step in whole degrees
    pub step_degrees: u32,
}

impl Ring {
    pub const fn new(cx: f64, cy: f64, radius: f64, step_degrees: u32) -> Self {
        Self {
            center: DVec2::new(cx, cy),
            radius,
            step_degrees,
        }
    }

    /// Points at 0°, step, 2·step, ... below 360°.
    pub fn points(&self) -> impl Iterator<Item = DVec2> + '_ {
        let step = self.step_degrees.max(1) as usize;
        (0..360u32).step_by(step).map(move |deg| {
            let theta = (deg as f64).to_radians();
            self.center + self.radius * DVec2::new(theta.cos(), theta.sin())
        })
    }
}

/// Concatenate the points of every ring in order.
pub fn ring_points(rings: &[Ring]) -> Vec<DVec2> {
    rings.iter().flat_map(|ring| ring.points()).collect()
}

/// Nested rings around a single center.
pub fn ring_a() -> Vec<DVec2> {
    ring_points(&[
        Ring::new(430.0, 400.0, 70.0, 1),
        Ring::new(430.0, 400.0, 50.0, 2),
        Ring::new(430.0, 400.0, 30.0, 5),
        Ring::new(430.0, 400.0, 10.0, 10),
    ])
}

/// A large target in the upper right and a small one in the upper left.
pub fn ring_b() -> Vec<DVec2> {
    ring_points(&[
        Ring::new(1150.0, 120.0, 45.0, 1),
        Ring::new(1150.0, 120.0, 25.0, 5),
        Ring::new(1150.0, 120.0, 5.0, 10),
        Ring::new(290.0, 120.0, 30.0, 5),
        Ring::new(290.0, 120.0, 10.0, 10),
    ])
}

/// Quadratic Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier {
    pub p0: DVec2,
    pub p1: DVec2,
    pub p2: DVec2,
}

impl QuadraticBezier {
    pub const fn new(p0: DVec2, p1: DVec2, p2: DVec2) -> Self {
        Self { p0, p1, p2 }
    }

    /// `(1-t)²·p0 + 2t(1-t)·p1 + t²·p2`
    #[inline]
    pub fn sample(&self, t: f64) -> DVec2 {
        let u = 1.0 - t;
        u * u * self.p0 + 2.0 * t * u * self.p1 + t * t * self.p2
    }
}

/// Chain of segments sampled at a shared resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub segments: Vec<QuadraticBezier>,
    pub samples_per_segment: u32,
}

impl Stroke {
    /// Sample every segment at `t = i / samples` for `i` in `0..samples`,
    /// truncating toward zero and shifting down by `offset`.
    pub fn points(&self, offset: f64) -> impl Iterator<Item = DVec2> + '_ {
        let n = self.samples_per_segment;
        self.segments.iter().flat_map(move |seg| {
            (0..n).map(move |i| {
                let p = seg.sample(i as f64 / n as f64);
                DVec2::new(p.x.trunc(), p.y.trunc() + offset)
            })
        })
    }
}

/// How many times a stroke is repeated and how far apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thickness {
    pub offset_step: u32,
    pub max_offset: u32,
}

impl Default for Thickness {
    fn default() -> Self {
        Self {
            offset_step: 20,
            max_offset: 100,
        }
    }
}

impl Thickness {
    /// Offsets 0, step, 2·step, ... below `max_offset`.
    pub fn offsets(&self) -> impl Iterator<Item = f64> {
        (0..self.max_offset)
            .step_by(self.offset_step.max(1) as usize)
            .map(f64::from)
    }
}

/// Thicken each stroke; all offsets of one stroke come before the next.
pub fn thickened_path(strokes: &[Stroke], thickness: Thickness) -> Vec<DVec2> {
    let mut points = Vec::new();
    for stroke in strokes {
        for offset in thickness.offsets() {
            points.extend(stroke.points(offset));
        }
    }
    points
}

fn seg(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64)) -> QuadraticBezier {
    QuadraticBezier::new(
        DVec2::new(p0.0, p0.1),
        DVec2::new(p1.0, p1.1),
        DVec2::new(p2.0, p2.1),
    )
}

/// Two flowing lines across the screen.
pub fn curve_path() -> Vec<DVec2> {
    let upper = Stroke {
        segments: vec![
            seg((0.0, 100.0), (100.0, 300.0), (500.0, 100.0)),
            seg((500.0, 100.0), (700.0, 80.0), (800.0, 250.0)),
        ],
        samples_per_segment: 50,
    };
    let lower = Stroke {
        segments: vec![
            seg((0.0, 450.0), (100.0, 380.0), (250.0, 500.0)),
            seg((250.0, 500.0), (600.0, 400.0), (700.0, 420.0)),
            seg((700.0, 420.0), (800.0, 380.0), (950.0, 420.0)),
            seg((950.0, 420.0), (1050.0, 300.0), (1280.0, 250.0)),
        ],
        samples_per_segment: 30,
    };
    thickened_path(&[upper, lower], Thickness::default())
}
