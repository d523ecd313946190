use serde::{ Serialize, Deserialize };

use crate::color::Color;
use crate::sphere::SphereObject;
use crate::tuple::Tuple4D;

/// The kinds of light a scene can hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    /// Lights every surface evenly, regardless of position or shadows.
    Ambient,

    /// Radiates from a single position and casts shadows.
    Point,
}

/// A light source.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Light {
    pub color: Color,

    /// Where the light sits. Ambient lights have none.
    pub position: Option<Tuple4D>,

    pub kind: LightKind,
}

impl Light {
    pub fn ambient(color: Color) -> Light {
        Light { color, position: None, kind: LightKind::Ambient }
    }

    /// Creates a point light. `position` is converted to a point if needed.
    pub fn point(color: Color, mut position: Tuple4D) -> Light {
        position.w = 1.0;
        Light { color, position: Some(position), kind: LightKind::Point }
    }
}

/// Inverse-square falloff with an additive one, finite at `distance == 0`.
pub fn attenuation(distance: f64) -> f64 {
    1.0 / (1.0 + distance * distance)
}

/// Calculates what a single light contributes at a point on `obj`.
///
/// Ambient lights always contribute `ka ⊙ color`. Point lights contribute
/// attenuated diffuse and specular terms, unless the point is `in_shadow` or
/// the light sits behind the surface. `eyev` points from the surface toward
/// the viewer and `normalv` is the outward surface normal; both are unit
/// vectors.
pub fn lighting(obj: &SphereObject, light: &Light, point: Tuple4D,
    eyev: Tuple4D, normalv: Tuple4D, in_shadow: bool) -> Color {
    let position = match (light.kind, light.position) {
        (LightKind::Ambient, _) => return obj.ka * light.color,
        (LightKind::Point, Some(position)) => position,
        (LightKind::Point, None) => return Color::black(),
    };

    if in_shadow {
        return Color::black();
    }

    let to_light = position - point;
    let distance = to_light.magnitude();
    let lightv = match to_light.try_normalize() {
        Ok(v) => v,
        Err(_) => return Color::black(),
    };

    // Light on the far side of the surface doesn't reach it
    let light_dot_normal = lightv.dot(&normalv);
    if light_dot_normal < 0.0 {
        return Color::black();
    }

    let falloff = attenuation(distance);
    let diffuse = obj.kd * light.color * (light_dot_normal * falloff);

    let reflectv = (-lightv).reflect(&normalv);
    let reflect_dot_eye = reflectv.dot(&eyev);
    let specular = if reflect_dot_eye <= 0.0 {
        Color::black()
    } else {
        obj.ks * light.color * (reflect_dot_eye.powf(obj.alpha) * falloff)
    };

    diffuse + specular
}

#[cfg(test)]
fn test_sphere() -> SphereObject {
    SphereObject::new(Tuple4D::point(0.0, 0.0, 1.0), 1.0,
        Color::gray(0.1), Color::gray(0.9), Color::gray(0.9), 200.0).unwrap()
}

#[test]
fn ambient_ignores_geometry_and_shadow() {
    let s = test_sphere();
    let light = Light::ambient(Color::rgb(1.0, 0.5, 0.0));

    let res = lighting(&s, &light, Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, -1.0), Tuple4D::vector(0.0, 0.0, -1.0), true);
    assert_eq!(res, Color::rgb(0.1, 0.05, 0.0));
}

#[test]
fn eye_between_light_and_surface() {
    let s = test_sphere();
    let light = Light::point(Color::white(), Tuple4D::point(0.0, 0.0, -10.0));

    let res = lighting(&s, &light, Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, -1.0), Tuple4D::vector(0.0, 0.0, -1.0), false);

    // Full diffuse and full specular, both attenuated by 1 / (1 + 10^2)
    assert_eq!(res, Color::gray(1.8 / 101.0));
}

#[test]
fn eye_offset_45_loses_specular() {
    let s = test_sphere();
    let light = Light::point(Color::white(), Tuple4D::point(0.0, 0.0, -10.0));
    let h = 2.0f64.sqrt() / 2.0;

    let res = lighting(&s, &light, Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, h, -h), Tuple4D::vector(0.0, 0.0, -1.0), false);
    assert_eq!(res, Color::gray(0.9 / 101.0));
}

#[test]
fn light_behind_surface() {
    let s = test_sphere();
    let light = Light::point(Color::white(), Tuple4D::point(0.0, 0.0, 10.0));

    let res = lighting(&s, &light, Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, -1.0), Tuple4D::vector(0.0, 0.0, -1.0), false);
    assert_eq!(res, Color::black());
}

#[test]
fn shadowed_point_light_contributes_nothing() {
    let s = test_sphere();
    let light = Light::point(Color::white(), Tuple4D::point(0.0, 0.0, -10.0));

    let res = lighting(&s, &light, Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, -1.0), Tuple4D::vector(0.0, 0.0, -1.0), true);
    assert_eq!(res, Color::black());
}

#[test]
fn attenuation_is_finite_at_the_light() {
    assert_eq!(attenuation(0.0), 1.0);
    assert!(crate::feq(attenuation(2.0), 0.2));
}
