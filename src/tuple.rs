use std::ops::{ Add, Sub, Neg, Mul };

use crate::error::{ Error, Result };
use crate::feq;

/// A homogeneous 4D tuple.
///
/// Points carry `w == 1.0` and vectors carry `w == 0.0`. The geometric
/// operations (`dot`, `cross`, `magnitude`) only look at the spatial `x`, `y`
/// and `z` components, so a point can be measured against a vector without
/// its `w` leaking into the result.
///
/// Mesh colors are stored as `Tuple4D`s as well (`x`, `y`, `z`, `w` standing
/// for red, green, blue and alpha) so that vertex attributes blend with the
/// same affine combinations as positions.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Tuple4D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64
}

impl PartialEq for Tuple4D {
    fn eq(&self, other: &Tuple4D) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z) &&
            feq(self.w, other.w)
    }
}

impl From<[f64; 4]> for Tuple4D {
    fn from(a: [f64; 4]) -> Tuple4D {
        Tuple4D { x: a[0], y: a[1], z: a[2], w: a[3] }
    }
}

impl From<Tuple4D> for [f64; 4] {
    fn from(t: Tuple4D) -> [f64; 4] {
        [t.x, t.y, t.z, t.w]
    }
}

impl Tuple4D {
    pub fn tuple(x: f64, y: f64, z: f64, w: f64) -> Tuple4D {
        Tuple4D { x, y, z, w }
    }

    pub fn point(x: f64, y: f64, z: f64) -> Tuple4D {
        Tuple4D { x, y, z, w: 1.0 }
    }

    pub fn vector(x: f64, y: f64, z: f64) -> Tuple4D {
        Tuple4D { x, y, z, w: 0.0 }
    }

    /// Builds a point from an `[x, y, z]` triple.
    pub fn point_from(a: [f64; 3]) -> Tuple4D {
        Tuple4D::point(a[0], a[1], a[2])
    }

    /// Builds a vector from an `[x, y, z]` triple.
    pub fn vector_from(a: [f64; 3]) -> Tuple4D {
        Tuple4D::vector(a[0], a[1], a[2])
    }

    /// Projects homogeneous coordinates onto the affine point `(x/w, y/w, z/w)`.
    ///
    /// Returns `None` when `w` is zero or not finite.
    pub fn from_homogeneous(x: f64, y: f64, z: f64, w: f64) -> Option<Tuple4D> {
        if w == 0.0 || !w.is_finite() {
            return None;
        }

        Some(Tuple4D::point(x / w, y / w, z / w))
    }

    pub fn is_point(&self) -> bool {
        self.w == 1.0
    }

    pub fn is_vector(&self) -> bool {
        self.w == 0.0
    }

    /// Spatial length of the tuple, ignoring `w`.
    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the direction of this tuple.
    ///
    /// The result is always a vector. A zero-length input yields NaNs; use
    /// `try_normalize` where the input can be degenerate.
    pub fn normalize(&self) -> Tuple4D {
        let inv = 1.0 / self.magnitude();
        Tuple4D::vector(self.x * inv, self.y * inv, self.z * inv)
    }

    /// Like `normalize`, but refuses tuples with (near) zero length.
    pub fn try_normalize(&self) -> Result<Tuple4D> {
        let mag = self.magnitude();
        if !mag.is_finite() || mag < f64::EPSILON {
            return Err(Error::ZeroDirection);
        }

        Ok(self.normalize())
    }

    pub fn dot(&self, other: &Tuple4D) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
    }

    pub fn cross(&self, other: &Tuple4D) -> Tuple4D {
        Tuple4D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
            w: 0.0
        }
    }

    /// Mirrors this vector about `normal`, which must be unit length.
    ///
    /// An incoming direction reflects into the outgoing direction; a vector
    /// pointing away from the surface reflects into its mirror image on the
    /// other side of the normal.
    pub fn reflect(&self, normal: &Tuple4D) -> Tuple4D {
        *self - (*normal * 2.0 * self.dot(normal))
    }

    /// Linear interpolation; `f == 0.0` gives `a`, `f == 1.0` gives `b`.
    pub fn lerp(a: Tuple4D, b: Tuple4D, f: f64) -> Tuple4D {
        a + (b - a) * f
    }

    /// Weighted sum of tuples.
    ///
    /// When the weights sum to one and every input is a point, the result is a
    /// point as well (an affine combination).
    pub fn combine(terms: &[(f64, Tuple4D)]) -> Tuple4D {
        terms.iter().fold(Tuple4D::default(), |acc, &(weight, t)| acc + t * weight)
    }
}

impl Add for Tuple4D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
            w: self.w + other.w
        }
    }
}

impl Sub for Tuple4D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
            w: self.w - other.w
        }
    }
}

impl Neg for Tuple4D {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: -self.w
        }
    }
}

/// Scalar right-multiplication.
///
/// ```
/// use subdivision_tracer::tuple::Tuple4D;
///
/// let t = Tuple4D::tuple(1.0, 2.0, 3.0, 4.0);
/// assert_eq!(t * 0.5, Tuple4D::tuple(0.5, 1.0, 1.5, 2.0));
/// ```
impl Mul<f64> for Tuple4D {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
            w: self.w * other
        }
    }
}

impl Mul<Tuple4D> for f64 {
    type Output = Tuple4D;

    fn mul(self, other: Tuple4D) -> Tuple4D {
        other * self
    }
}

/* Tests */

#[test]
fn point_minus_point_is_vector() {
    let p1 = Tuple4D::point(3.0, 2.0, 1.0);
    let p2 = Tuple4D::point(5.0, 6.0, 7.0);
    let v = p1 - p2;

    assert!(v.is_vector());
    assert_eq!(v, Tuple4D::vector(-2.0, -4.0, -6.0));
}

#[test]
fn magnitude_ignores_w() {
    let p = Tuple4D::point(1.0, 2.0, 2.0);

    assert_eq!(p.magnitude(), 3.0);
}

#[test]
fn normalize_yields_unit_vector() {
    let n = Tuple4D::point(0.0, 3.0, 4.0).normalize();

    assert!(n.is_vector());
    assert_eq!(n, Tuple4D::vector(0.0, 0.6, 0.8));
    assert!(feq(n.magnitude(), 1.0));
}

#[test]
fn try_normalize_rejects_zero() {
    let zero = Tuple4D::vector(0.0, 0.0, 0.0);

    assert!(matches!(zero.try_normalize(), Err(Error::ZeroDirection)));
    assert!(Tuple4D::vector(0.0, 0.0, 2.0).try_normalize().is_ok());
}

#[test]
fn cross_is_anticommutative() {
    let a = Tuple4D::vector(1.0, 2.0, 3.0);
    let b = Tuple4D::vector(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b), Tuple4D::vector(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Tuple4D::vector(1.0, -2.0, 1.0));
}

#[test]
fn reflect_off_slanted_surface() {
    let v = Tuple4D::vector(0.0, -1.0, 0.0);
    let s = 2.0f64.sqrt() / 2.0;
    let n = Tuple4D::vector(s, s, 0.0);

    assert_eq!(v.reflect(&n), Tuple4D::vector(1.0, 0.0, 0.0));
}

#[test]
fn lerp_endpoints_and_midpoint() {
    let a = Tuple4D::point(0.0, 0.0, 0.0);
    let b = Tuple4D::point(2.0, 4.0, -2.0);

    assert_eq!(Tuple4D::lerp(a, b, 0.0), a);
    assert_eq!(Tuple4D::lerp(a, b, 1.0), b);
    assert_eq!(Tuple4D::lerp(a, b, 0.5), Tuple4D::point(1.0, 2.0, -1.0));
}

#[test]
fn affine_combination_stays_a_point() {
    let c = Tuple4D::combine(&[
        (0.25, Tuple4D::point(4.0, 0.0, 0.0)),
        (0.75, Tuple4D::point(0.0, 4.0, 0.0)),
    ]);

    assert!(c.is_point());
    assert_eq!(c, Tuple4D::point(1.0, 3.0, 0.0));
}
