use serde::{ Serialize, Deserialize };

use crate::error::{ Error, Result };
use crate::ray::Ray;
use crate::tuple::Tuple4D;

/// How camera rays relate to each other.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// Parallel rays along the view direction.
    Orthographic,

    /// Rays diverging from a center of projection behind the eye.
    Perspective,
}

impl Default for Projection {
    fn default() -> Projection {
        Projection::Orthographic
    }
}

/// A camera looking from `eye` toward `at`.
///
/// The image plane passes through `eye`, perpendicular to the view
/// direction. Adjacent pixels are `width_inc` apart horizontally and
/// `height_inc` apart vertically, in world units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Tuple4D,
    pub up: Tuple4D,
    pub at: Tuple4D,

    pub width_inc: f64,
    pub height_inc: f64,

    pub projection: Projection,

    /// Distance from the eye back to the center of projection. Only used by
    /// perspective cameras.
    pub distance: f64,

    // Orthonormal view basis; `w` points from `at` back toward the eye.
    u: Tuple4D,
    v: Tuple4D,
    w: Tuple4D,
}

impl Camera {
    /// Creates a camera, failing on parameters that can't form a view.
    pub fn new(eye: Tuple4D, up: Tuple4D, at: Tuple4D, width_inc: f64,
        height_inc: f64, projection: Projection, distance: f64) -> Result<Camera> {
        let w = (eye - at).try_normalize()
            .map_err(|_| Error::DegenerateCamera("eye and look-at point coincide".into()))?;
        let u = up.cross(&w).try_normalize()
            .map_err(|_| Error::DegenerateCamera(
                "up vector is parallel to the view direction".into()))?;
        let v = w.cross(&u);

        if !(width_inc > 0.0 && height_inc > 0.0 && width_inc.is_finite() && height_inc.is_finite()) {
            return Err(Error::DegenerateCamera(
                format!("pixel increments must be positive, got {} x {}", width_inc, height_inc)));
        }

        if projection == Projection::Perspective && !(distance > 0.0 && distance.is_finite()) {
            return Err(Error::DegenerateCamera(
                format!("center of projection distance must be positive, got {}", distance)));
        }

        let mut eye = eye;
        eye.w = 1.0;

        Ok(Camera { eye, up, at, width_inc, height_inc, projection, distance, u, v, w })
    }

    /// World-space point at the center of pixel `(x, y)`.
    ///
    /// Row 0 is the top of the image.
    pub fn pixel_point(&self, x: usize, y: usize, width: usize, height: usize) -> Tuple4D {
        let px = self.width_inc * (x as f64 + 0.5) - (width as f64 * self.width_inc) / 2.0;
        let py = (height as f64 * self.height_inc) / 2.0 - self.height_inc * (y as f64 + 0.5);

        self.eye + self.u * px + self.v * py
    }

    /// The ray through pixel `(x, y)` of a `width` by `height` image.
    pub fn get_ray(&self, x: usize, y: usize, width: usize, height: usize) -> Ray {
        let origin = self.pixel_point(x, y, width, height);

        let direction = match self.projection {
            Projection::Orthographic => -self.w,
            Projection::Perspective => {
                let cop = self.eye + self.w * self.distance;
                (origin - cop).normalize()
            },
        };

        Ray { origin, direction }
    }
}

#[cfg(test)]
fn looking_down_z(projection: Projection) -> Camera {
    Camera::new(
        Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
        Tuple4D::point(0.0, 0.0, 0.0),
        0.5, 0.5, projection, 1.0,
    ).unwrap()
}

#[test]
fn orthographic_rays_are_parallel() {
    let c = looking_down_z(Projection::Orthographic);

    let corner = c.get_ray(0, 0, 4, 4);
    assert_eq!(corner.origin, Tuple4D::point(-0.75, 0.75, 5.0));
    assert_eq!(corner.direction, Tuple4D::vector(0.0, 0.0, -1.0));

    let other = c.get_ray(3, 2, 4, 4);
    assert_eq!(other.origin, Tuple4D::point(0.75, -0.25, 5.0));
    assert_eq!(other.direction, corner.direction);
}

#[test]
fn perspective_rays_diverge_from_center_of_projection() {
    let c = looking_down_z(Projection::Perspective);

    let corner = c.get_ray(0, 0, 4, 4);
    assert_eq!(corner.origin, Tuple4D::point(-0.75, 0.75, 5.0));
    assert_eq!(corner.direction, Tuple4D::vector(-0.75, 0.75, -1.0).normalize());

    let opposite = c.get_ray(3, 3, 4, 4);
    assert_eq!(opposite.direction, Tuple4D::vector(0.75, -0.75, -1.0).normalize());
}

#[test]
fn rotated_view_basis() {
    let c = Camera::new(
        Tuple4D::point(3.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
        Tuple4D::point(0.0, 0.0, 0.0),
        1.0, 1.0, Projection::Orthographic, 1.0,
    ).unwrap();

    let r = c.get_ray(0, 0, 1, 1);
    assert_eq!(r.origin, Tuple4D::point(3.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(-1.0, 0.0, 0.0));
}

#[test]
fn degenerate_cameras_fail() {
    let p = Tuple4D::point(0.0, 0.0, 5.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);
    let origin = Tuple4D::point(0.0, 0.0, 0.0);

    assert!(Camera::new(p, up, p, 1.0, 1.0, Projection::Orthographic, 1.0).is_err());
    assert!(Camera::new(p, Tuple4D::vector(0.0, 0.0, 1.0), origin, 1.0, 1.0,
        Projection::Orthographic, 1.0).is_err());
    assert!(Camera::new(p, up, origin, 0.0, 1.0, Projection::Orthographic, 1.0).is_err());
    assert!(Camera::new(p, up, origin, 1.0, 1.0, Projection::Perspective, 0.0).is_err());
}
