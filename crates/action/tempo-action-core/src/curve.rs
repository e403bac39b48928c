//! Cubic-bezier easing curves attached to keyframes.
//!
//! A curve reshapes linear progress `x` in `[0, 1]` through a frame segment
//! into eased progress `y`. Control points follow the CSS `cubic-bezier()`
//! convention: the curve runs from (0,0) to (1,1) through (x1,y1) and (x2,y2).

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveRepr", into = "CurveRepr")]
pub struct Curve {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Default for Curve {
    fn default() -> Self {
        Curve::EASE
    }
}

const NAMED: [(&str, Curve); 5] = [
    ("linear", Curve::LINEAR),
    ("ease", Curve::EASE),
    ("ease_in", Curve::EASE_IN),
    ("ease_out", Curve::EASE_OUT),
    ("ease_in_out", Curve::EASE_IN_OUT),
];

impl Curve {
    pub const LINEAR: Curve = Curve::new(0.0, 0.0, 1.0, 1.0);
    pub const EASE: Curve = Curve::new(0.25, 0.1, 0.25, 1.0);
    pub const EASE_IN: Curve = Curve::new(0.42, 0.0, 1.0, 1.0);
    pub const EASE_OUT: Curve = Curve::new(0.0, 0.0, 0.58, 1.0);
    pub const EASE_IN_OUT: Curve = Curve::new(0.42, 0.0, 0.58, 1.0);

    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Look up a named curve. Accepts `ease-in` as well as `ease_in`.
    pub fn named(name: &str) -> Option<Curve> {
        let key = name.trim().to_ascii_lowercase().replace('-', "_");
        NAMED.iter().find(|(n, _)| *n == key).map(|(_, c)| *c)
    }

    pub fn name(&self) -> Option<&'static str> {
        NAMED.iter().find(|(_, c)| c == self).map(|(n, _)| *n)
    }

    #[inline]
    fn is_linear(&self) -> bool {
        self.x1 == self.y1 && self.x2 == self.y2
    }

    /// Eased progress for linear progress `x`, solved to tolerance `epsilon`.
    pub fn solve(&self, x: f32, epsilon: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        if self.is_linear() {
            return x;
        }
        let poly_x = Poly::new(self.x1, self.x2);
        let poly_y = Poly::new(self.y1, self.y2);
        poly_y.sample(poly_x.solve(x, epsilon))
    }
}

/// One axis of the bezier in power form: ((a*t + b)*t + c)*t.
struct Poly {
    a: f32,
    b: f32,
    c: f32,
}

impl Poly {
    fn new(p1: f32, p2: f32) -> Self {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        Self { a, b, c }
    }

    #[inline]
    fn sample(&self, t: f32) -> f32 {
        ((self.a * t + self.b) * t + self.c) * t
    }

    #[inline]
    fn derivative(&self, t: f32) -> f32 {
        (3.0 * self.a * t + 2.0 * self.b) * t + self.c
    }

    /// Parameter `t` such that `sample(t) == x`. Newton first, bisection if it stalls.
    fn solve(&self, x: f32, epsilon: f32) -> f32 {
        let mut t = x;
        for _ in 0..8 {
            let err = self.sample(t) - x;
            if err.abs() < epsilon {
                return t;
            }
            let d = self.derivative(t);
            if d.abs() < 1e-6 {
                break;
            }
            t -= err / d;
        }

        let (mut lo, mut hi) = (0.0f32, 1.0f32);
        t = x;
        for _ in 0..32 {
            let v = self.sample(t);
            if (v - x).abs() < epsilon {
                break;
            }
            if x > v {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) * 0.5;
        }
        t
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CurveRepr {
    Name(String),
    Points([f32; 4]),
}

impl TryFrom<CurveRepr> for Curve {
    type Error = String;

    fn try_from(repr: CurveRepr) -> Result<Self, Self::Error> {
        match repr {
            CurveRepr::Name(name) => {
                Curve::named(&name).ok_or_else(|| format!("unknown curve '{name}'"))
            }
            CurveRepr::Points([x1, y1, x2, y2]) => {
                // x outside [0, 1] folds the curve back on itself in time
                if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
                    return Err(format!(
                        "curve control x values must lie in [0, 1], got {x1} and {x2}"
                    ));
                }
                if !y1.is_finite() || !y2.is_finite() {
                    return Err(format!("curve control y values must be finite, got {y1} and {y2}"));
                }
                Ok(Curve::new(x1, y1, x2, y2))
            }
        }
    }
}

impl From<Curve> for CurveRepr {
    fn from(curve: Curve) -> Self {
        match curve.name() {
            Some(name) => CurveRepr::Name(name.to_string()),
            None => CurveRepr::Points([curve.x1, curve.y1, curve.x2, curve.y2]),
        }
    }
}
