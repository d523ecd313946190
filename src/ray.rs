use crate::error::Result;
use crate::sphere::SphereObject;
use crate::tuple::Tuple4D;

/// A ray with a unit-length direction.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: Tuple4D,
    pub direction: Tuple4D,
}

/// The first point where a ray meets a sphere.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collision {
    pub point: Tuple4D,

    /// Distance from the ray origin to `point`.
    pub t: f64,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// A zero-length direction is an error.
    pub fn new(mut origin: Tuple4D, direction: Tuple4D) -> Result<Ray> {
        origin.w = 1.0;
        let direction = direction.try_normalize()?;

        Ok(Ray { origin, direction })
    }

    pub fn position(&self, t: f64) -> Tuple4D {
        self.origin + (t * self.direction)
    }

    /// Finds the first forward intersection with `sphere`.
    ///
    /// The vector from the origin to the sphere's center is split into the
    /// part along the ray and the part perpendicular to it. If the
    /// perpendicular part is at least the radius, the ray's line misses the
    /// sphere. Otherwise the hit lies half a chord away from the point of the
    /// line closest to the center: ahead of it when the origin is inside the
    /// sphere (the exit point), behind it when outside (the entry point).
    ///
    /// A sphere entirely behind an outside origin is not a collision.
    pub fn find_collision(&self, sphere: &SphereObject) -> Option<Collision> {
        let to_sphere = sphere.center - self.origin;
        let along = self.direction.dot(&to_sphere);
        let perp = to_sphere - self.direction * along;

        let perp_len = perp.magnitude();
        if perp_len >= sphere.radius {
            return None;
        }

        let closest = sphere.center - perp;
        let half_chord = (sphere.radius.powi(2) - perp_len.powi(2)).sqrt();

        let point = if to_sphere.magnitude() < sphere.radius {
            closest + self.direction * half_chord
        } else {
            if along < 0.0 {
                return None;
            }
            closest - self.direction * half_chord
        };

        Some(Collision { point, t: (point - self.origin).magnitude() })
    }
}

#[cfg(test)]
fn unit_sphere(center: Tuple4D, radius: f64) -> SphereObject {
    use crate::color::Color;

    let c = Color::gray(0.5);
    SphereObject::new(center, radius, c, c, c, 1.0).unwrap()
}

#[test]
fn ray_position() {
    let r = Ray::new(
                Tuple4D::point(2.0, 3.0, 4.0),
                Tuple4D::vector(2.0, 0.0, 0.0)
            ).unwrap();

    assert_eq!(r.direction, Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(r.position(-1.0), Tuple4D::point(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Tuple4D::point(4.5, 3.0, 4.0));
}

#[test]
fn zero_direction_fails() {
    assert!(Ray::new(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 0.0)).is_err());
}

#[test]
fn hit_toward_center() {
    let s = unit_sphere(Tuple4D::point(1.0, -2.0, 0.5), 1.5);
    let origin = Tuple4D::point(4.0, 2.0, 0.5);
    let r = Ray::new(origin, s.center - origin).unwrap();

    let hit = r.find_collision(&s).unwrap();
    assert!(crate::feq(hit.t, 5.0 - 1.5));
    assert!(crate::feq((hit.point - s.center).magnitude(), s.radius));
}

#[test]
fn hit_off_center() {
    let s = unit_sphere(Tuple4D::point(0.0, 0.0, 0.0), 1.0);
    let r = Ray::new(Tuple4D::point(0.6, 0.0, 5.0), Tuple4D::vector(0.0, 0.0, -1.0)).unwrap();

    let hit = r.find_collision(&s).unwrap();
    assert_eq!(hit.point, Tuple4D::point(0.6, 0.0, 0.8));
    assert!(crate::feq(hit.t, 4.2));
}

#[test]
fn miss_beside_sphere() {
    let s = unit_sphere(Tuple4D::point(0.0, 0.0, 0.0), 1.0);
    let r = Ray::new(Tuple4D::point(0.0, 2.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0)).unwrap();

    assert_eq!(r.find_collision(&s), None);
}

#[test]
fn tangent_is_a_miss() {
    let s = unit_sphere(Tuple4D::point(0.0, 0.0, 0.0), 1.0);
    let r = Ray::new(Tuple4D::point(0.0, 1.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0)).unwrap();

    assert_eq!(r.find_collision(&s), None);
}

#[test]
fn sphere_behind_ray() {
    let s = unit_sphere(Tuple4D::point(0.0, 0.0, 0.0), 1.0);
    let r = Ray::new(Tuple4D::point(0.0, 0.0, 5.0), Tuple4D::vector(0.0, 0.0, 1.0)).unwrap();

    assert_eq!(r.find_collision(&s), None);
}

#[test]
fn origin_inside_hits_exit_point() {
    let s = unit_sphere(Tuple4D::point(0.0, 0.0, 0.0), 2.0);
    let r = Ray::new(Tuple4D::point(0.0, 0.0, 1.0), Tuple4D::vector(0.0, 0.0, -1.0)).unwrap();

    let hit = r.find_collision(&s).unwrap();
    assert_eq!(hit.point, Tuple4D::point(0.0, 0.0, -2.0));
    assert!(crate::feq(hit.t, 3.0));
}
