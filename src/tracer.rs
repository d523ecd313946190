//! Recursive Phong ray tracing over a list of spheres.
//!
//! Each camera ray is traced against every sphere. The nearest hit is shaded
//! with the ambient, diffuse and specular terms of every light, and then a
//! mirror ray is spawned from the hit point. The reflected color is filtered
//! by the sphere's `kd ⊙ ks` and added on top, until `max_steps` bounces have
//! been taken.

use log::{ debug, trace };

use crate::camera::Camera;
use crate::canvas::PixelSink;
use crate::color::Color;
use crate::consts::{ DEFAULT_MAX_STEPS, SHADOW_EPSILON };
use crate::error::{ Error, Result };
use crate::light::{ self, Light, LightKind };
use crate::ray::{ Collision, Ray };
use crate::sphere::SphereObject;
use crate::tuple::Tuple4D;

/// A scene ready to be rendered.
///
/// Objects and lights are read-only during a trace, so one tracer can be
/// shared between render threads.
#[derive(Clone, Debug)]
pub struct RayTracer {
    pub camera: Camera,
    pub objects: Vec<SphereObject>,
    pub lights: Vec<Light>,

    /// Color of rays that hit nothing, or that ran out of bounces.
    pub background: Color,

    /// Number of reflection bounces after the camera ray.
    pub max_steps: usize,
}

impl RayTracer {
    /// Creates a tracer with the default bounce limit.
    ///
    /// Fails if a point light has no position.
    pub fn new(camera: Camera, objects: Vec<SphereObject>, lights: Vec<Light>,
        background: Color) -> Result<RayTracer> {
        for (i, light) in lights.iter().enumerate() {
            if light.kind == LightKind::Point && light.position.is_none() {
                return Err(Error::MissingLightPosition(i));
            }
        }

        Ok(RayTracer { camera, objects, lights, background, max_steps: DEFAULT_MAX_STEPS })
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> RayTracer {
        self.max_steps = max_steps;
        self
    }

    /// Renders every pixel of `pa`.
    ///
    /// The sink is cleared once up front; each pixel is then written exactly
    /// once with the color of its camera ray.
    pub fn ray_trace<P: PixelSink + ?Sized>(&self, pa: &mut P) {
        pa.clear_pixels();

        let (width, height) = (pa.width(), pa.height());
        debug!("Tracing {}x{} pixels against {} objects and {} lights",
            width, height, self.objects.len(), self.lights.len());

        for y in 0..height {
            for x in 0..width {
                let color = self.pixel_color(x, y, width, height);
                pa.write_pixel(x, y, &color);
            }
            trace!("Finished row {}", y);
        }
    }

    /// Colors of one row of a `width` by `height` image.
    pub fn render_row(&self, y: usize, width: usize, height: usize) -> Vec<Color> {
        (0..width).map(|x| self.pixel_color(x, y, width, height)).collect()
    }

    fn pixel_color(&self, x: usize, y: usize, width: usize, height: usize) -> Color {
        let ray = self.camera.get_ray(x, y, width, height);
        self.trace(&ray, 0, None)
    }

    /// Color seen along `ray`.
    ///
    /// `steps` counts bounces already taken. `leaving` names the sphere the
    /// ray starts on, which is skipped so a reflected ray can't hit its own
    /// origin again.
    ///
    /// A reflected ray is spawned only while `steps < max_steps`, so the
    /// deepest hit returns its local shading alone and `max_steps == 0`
    /// shades every pixel exactly once.
    pub fn trace(&self, ray: &Ray, steps: usize, leaving: Option<usize>) -> Color {
        if steps > self.max_steps {
            return self.background;
        }

        let (index, hit) = match self.nearest_hit(ray, leaving) {
            Some(found) => found,
            None => return self.background,
        };

        let obj = &self.objects[index];
        let normal = obj.normal_at(hit.point);
        let local = self.phong(index, hit.point, normal, ray.origin);

        let reflectivity = obj.reflectivity();
        if steps >= self.max_steps || reflectivity.is_black() {
            return local;
        }

        let bounce = Ray { origin: hit.point, direction: ray.direction.reflect(&normal) };
        trace!("Bounce {} off object {} at {:?}", steps + 1, index, hit.point);

        local + reflectivity * self.trace(&bounce, steps + 1, Some(index))
    }

    /// Closest sphere along `ray`, skipping `exclude`.
    pub fn nearest_hit(&self, ray: &Ray, exclude: Option<usize>) -> Option<(usize, Collision)> {
        self.objects.iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != exclude)
            .filter_map(|(i, obj)| ray.find_collision(obj).map(|c| (i, c)))
            .min_by(|(_, a), (_, b)| a.t.total_cmp(&b.t))
    }

    /// Sum of every light's contribution at `point` on object `index`.
    pub fn phong(&self, index: usize, point: Tuple4D, normal: Tuple4D, viewer: Tuple4D) -> Color {
        let obj = &self.objects[index];
        let eyev = (viewer - point).try_normalize().unwrap_or(normal);

        self.lights.iter().fold(Color::black(), |acc, l| {
            let in_shadow = match (l.kind, l.position) {
                (LightKind::Point, Some(position)) => self.is_shadowed(point, position, index),
                _ => false,
            };

            acc + light::lighting(obj, l, point, eyev, normal, in_shadow)
        })
    }

    /// Whether any sphere other than `shaded` sits between `point` and
    /// `light_position`.
    pub fn is_shadowed(&self, point: Tuple4D, light_position: Tuple4D, shaded: usize) -> bool {
        let to_light = light_position - point;
        let distance = to_light.magnitude();
        let direction = match to_light.try_normalize() {
            Ok(d) => d,
            Err(_) => return false,
        };

        let ray = Ray { origin: point, direction };
        self.objects.iter()
            .enumerate()
            .filter(|(i, _)| *i != shaded)
            .filter_map(|(_, obj)| ray.find_collision(obj))
            .any(|c| c.t > SHADOW_EPSILON && c.t < distance)
    }
}

#[cfg(test)]
use crate::canvas::Canvas;

#[cfg(test)]
use crate::camera::Projection;

#[cfg(test)]
fn front_camera(inc: f64) -> Camera {
    Camera::new(
        Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
        Tuple4D::point(0.0, 0.0, 0.0),
        inc, inc, Projection::Orthographic, 1.0,
    ).unwrap()
}

#[cfg(test)]
fn matte_sphere(center: Tuple4D, radius: f64) -> SphereObject {
    SphereObject::new(center, radius,
        Color::gray(0.5), Color::gray(0.5), Color::black(), 10.0).unwrap()
}

#[cfg(test)]
fn center_ray() -> Ray {
    Ray::new(Tuple4D::point(0.0, 0.0, 5.0), Tuple4D::vector(0.0, 0.0, -1.0)).unwrap()
}

#[test]
fn ambient_lit_sphere_silhouette() {
    let tracer = RayTracer::new(
        front_camera(0.25),
        vec![matte_sphere(Tuple4D::point(0.0, 0.0, 0.0), 1.0)],
        vec![Light::ambient(Color::white())],
        Color::black(),
    ).unwrap();

    let mut canvas = Canvas::new(16, 16);
    tracer.ray_trace(&mut canvas);

    for y in 0..16 {
        for x in 0..16 {
            let px = 0.25 * (x as f64 + 0.5) - 2.0;
            let py = 2.0 - 0.25 * (y as f64 + 0.5);
            let expected = if px * px + py * py < 1.0 { Color::gray(0.5) } else { Color::black() };

            assert_eq!(canvas.read_pixel(x, y), Some(expected), "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn every_pixel_is_overwritten() {
    let background = Color::rgb(0.2, 0.3, 0.4);
    let tracer = RayTracer::new(
        front_camera(0.25),
        vec![matte_sphere(Tuple4D::point(0.0, 0.0, 0.0), 1.0)],
        vec![Light::ambient(Color::white())],
        background,
    ).unwrap().with_max_steps(0);

    // Render twice into the same canvas; nothing may accumulate.
    let mut canvas = Canvas::new(16, 16);
    tracer.ray_trace(&mut canvas);
    tracer.ray_trace(&mut canvas);

    assert_eq!(canvas.read_pixel(8, 8), Some(Color::gray(0.5)));
    assert_eq!(canvas.read_pixel(0, 0), Some(background));
}

#[test]
fn attenuated_point_light() {
    let sphere = SphereObject::new(Tuple4D::point(0.0, 0.0, 0.0), 1.0,
        Color::black(), Color::gray(0.5), Color::gray(0.5), 10.0).unwrap();
    let tracer = RayTracer::new(
        front_camera(1.0),
        vec![sphere],
        vec![Light::point(Color::white(), Tuple4D::point(0.0, 0.0, 3.0))],
        Color::black(),
    ).unwrap().with_max_steps(0);

    // Hit at (0, 0, 1), two units from the light: (0.5 + 0.5) / (1 + 4)
    assert_eq!(tracer.trace(&center_ray(), 0, None), Color::gray(0.2));
}

#[test]
fn occluder_casts_shadow() {
    let target = matte_sphere(Tuple4D::point(0.0, 0.0, 0.0), 1.0);
    let occluder = matte_sphere(Tuple4D::point(0.0, 2.5, 1.25), 0.5);
    let lights = vec![
        Light::ambient(Color::white()),
        Light::point(Color::white(), Tuple4D::point(0.0, 5.0, 1.5)),
    ];

    let lit = RayTracer::new(front_camera(1.0), vec![target], lights.clone(), Color::black())
        .unwrap().with_max_steps(0);
    let shadowed = RayTracer::new(front_camera(1.0), vec![target, occluder], lights,
        Color::black()).unwrap().with_max_steps(0);

    let hit = Tuple4D::point(0.0, 0.0, 1.0);
    assert!(!lit.is_shadowed(hit, Tuple4D::point(0.0, 5.0, 1.5), 0));
    assert!(shadowed.is_shadowed(hit, Tuple4D::point(0.0, 5.0, 1.5), 0));

    // Only the ambient term survives in shadow
    assert_eq!(shadowed.trace(&center_ray(), 0, None), Color::gray(0.5));
    assert!(lit.trace(&center_ray(), 0, None).r > 0.5);
}

#[test]
fn reflection_adds_filtered_background() {
    let background = Color::gray(0.2);
    let mirror = SphereObject::new(Tuple4D::point(0.0, 0.0, 0.0), 1.0,
        Color::black(), Color::white(), Color::white(), 10.0).unwrap();
    let tracer = RayTracer::new(front_camera(1.0), vec![mirror],
        vec![Light::ambient(Color::white())], background).unwrap();

    // The bounce heads straight back along +z and escapes
    assert_eq!(tracer.clone().with_max_steps(1).trace(&center_ray(), 0, None), background);
    assert_eq!(tracer.with_max_steps(0).trace(&center_ray(), 0, None), Color::black());
}

#[test]
fn reflection_between_spheres() {
    let mirror = SphereObject::new(Tuple4D::point(0.0, 0.0, 0.0), 1.0,
        Color::black(), Color::gray(0.5), Color::gray(0.5), 10.0).unwrap();
    let glowing = SphereObject::new(Tuple4D::point(0.0, 0.0, 8.0), 1.0,
        Color::white(), Color::black(), Color::black(), 10.0).unwrap();
    let tracer = RayTracer::new(front_camera(1.0), vec![mirror, glowing],
        vec![Light::ambient(Color::white())], Color::black()).unwrap().with_max_steps(1);

    // Camera ray starts between the spheres; the bounce sees the glowing one
    assert_eq!(tracer.trace(&center_ray(), 0, None), Color::gray(0.25));
}

#[test]
fn exhausted_steps_return_background() {
    let background = Color::rgb(0.1, 0.2, 0.3);
    let tracer = RayTracer::new(front_camera(1.0),
        vec![matte_sphere(Tuple4D::point(0.0, 0.0, 0.0), 1.0)],
        vec![Light::ambient(Color::white())], background).unwrap();

    assert_eq!(tracer.trace(&center_ray(), DEFAULT_MAX_STEPS + 1, None), background);
}

#[test]
fn point_light_needs_position() {
    let broken = Light { color: Color::white(), position: None, kind: LightKind::Point };
    let res = RayTracer::new(front_camera(1.0), vec![], vec![Light::ambient(Color::white()), broken],
        Color::black());

    assert!(matches!(res, Err(Error::MissingLightPosition(1))));
}
