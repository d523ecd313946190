use std::ops::{ Add, AddAssign, Mul };

use crate::feq;

/// An RGB color used by the ray tracer.
///
/// Components are nominally in `0.0..=1.0`, but sums of light contributions
/// may exceed one; clamping happens only when an image is written out.
///
/// ```
/// # use subdivision_tracer::color::Color;
/// let yellow = Color::rgb(1.0, 1.0, 0.0);
/// let purple = Color::rgb(1.0, 0.0, 1.0);
/// assert_eq!(yellow * purple, Color::rgb(1.0, 0.0, 0.0));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl From<[f64; 3]> for Color {
    fn from(a: [f64; 3]) -> Color {
        Color { r: a[0], g: a[1], b: a[2] }
    }
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    pub fn black() -> Color {
        Color::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Color {
        Color::rgb(1.0, 1.0, 1.0)
    }

    /// A gray with every channel set to `v`.
    pub fn gray(v: f64) -> Color {
        Color::rgb(v, v, v)
    }

    /// Component-wise product of two colors.
    ///
    /// This is the `⊙` used throughout the shading code: material
    /// coefficients filter light colors channel by channel.
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color {
            r: c1.r * c2.r,
            g: c1.g * c2.g,
            b: c1.b * c2.b,
        }
    }

    /// True when every channel is zero.
    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    /// Converts to 8-bit channels, clamping to the displayable range.
    pub fn to_bytes(&self) -> [u8; 3] {
        let scale = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        [scale(self.r), scale(self.g), scale(self.b)]
    }
}

impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl AddAssign<Color> for Color {
    fn add_assign(&mut self, other: Color) {
        *self = *self + other;
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
    }
}

/// `c1 * c2` is shorthand for `Color::hadamard(&c1, &c2)`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

#[test]
fn accumulate_light() {
    let mut c = Color::black();
    c += Color::rgb(0.25, 0.5, 0.0);
    c += Color::rgb(0.25, 0.0, 1.5);

    assert_eq!(c, Color::rgb(0.5, 0.5, 1.5));
}

#[test]
fn filter_light_by_coefficients() {
    let ka = Color::rgb(0.5, 0.2, 1.0);
    let light = Color::gray(0.5);

    assert_eq!(ka * light, Color::rgb(0.25, 0.1, 0.5));
}

#[test]
fn bytes_are_clamped() {
    assert_eq!(Color::rgb(-0.5, 0.5, 2.0).to_bytes(), [0, 128, 255]);
}
