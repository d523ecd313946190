use crate::color::Color;
use crate::error::{ Error, Result };
use crate::tuple::Tuple4D;

/// A sphere with Phong material coefficients.
///
/// `ka`, `kd` and `ks` filter ambient, diffuse and specular light per
/// channel; `alpha` is the specular shininess exponent. Spheres are not
/// modified while a trace is running.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SphereObject {
    pub center: Tuple4D,
    pub radius: f64,

    pub ka: Color,
    pub kd: Color,
    pub ks: Color,
    pub alpha: f64,
}

impl SphereObject {
    /// Creates a sphere, rejecting radii that aren't finite and positive.
    pub fn new(center: Tuple4D, radius: f64, ka: Color, kd: Color, ks: Color,
        alpha: f64) -> Result<SphereObject> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::DegenerateSphere(radius));
        }

        let mut center = center;
        center.w = 1.0;

        Ok(SphereObject { center, radius, ka, kd, ks, alpha })
    }

    /// Outward unit normal at `point`, which should lie on the surface.
    pub fn normal_at(&self, point: Tuple4D) -> Tuple4D {
        (point - self.center).normalize()
    }

    /// Combined mirror reflectivity used for reflected light.
    pub fn reflectivity(&self) -> Color {
        self.kd * self.ks
    }
}

#[test]
fn zero_radius_is_rejected() {
    let c = Color::gray(0.5);
    let res = SphereObject::new(Tuple4D::point(0.0, 0.0, 0.0), 0.0, c, c, c, 1.0);

    assert!(matches!(res, Err(Error::DegenerateSphere(_))));
    assert!(SphereObject::new(Tuple4D::point(0.0, 0.0, 0.0), f64::NAN, c, c, c, 1.0).is_err());
}

#[test]
fn normal_points_outward() {
    let c = Color::gray(0.5);
    let s = SphereObject::new(Tuple4D::point(1.0, 2.0, 3.0), 2.0, c, c, c, 1.0).unwrap();

    assert_eq!(s.normal_at(Tuple4D::point(1.0, 4.0, 3.0)), Tuple4D::vector(0.0, 1.0, 0.0));
    assert_eq!(s.normal_at(Tuple4D::point(-1.0, 2.0, 3.0)), Tuple4D::vector(-1.0, 0.0, 0.0));
}
