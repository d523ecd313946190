use std::io;
use std::io::Write;
use std::fs::File;
use std::path::Path;

use crate::color::Color;

/// Anything the ray tracer can draw into.
///
/// Pixels are addressed by column `x` and row `y`, both zero-indexed, with
/// row 0 at the top of the image.
pub trait PixelSink {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Stores the color of one pixel. Out-of-bounds pixels are ignored.
    fn write_pixel(&mut self, x: usize, y: usize, color: &Color);

    /// Resets every pixel before a new render.
    fn clear_pixels(&mut self);
}

/// An in-memory image.
///
/// The canvas stores the resulting colors for each pixel ray. Once rendering
/// finishes, it can be saved as a plain PPM image.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a black canvas with the given width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// Returns `None` if the location is out-of-bounds.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Copies a whole row of colors into row `y`.
    ///
    /// Extra colors past the canvas width are dropped.
    pub fn write_row(&mut self, y: usize, row: &[Color]) {
        if y >= self.height {
            return;
        }

        let start = y * self.width;
        for (dst, src) in self.pixels[start..start + self.width].iter_mut().zip(row) {
            *dst = *src;
        }
    }

    /// Writes the canvas as a plain (P3) PPM image, one pixel per line.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?; // Maximum color value

        for pixel in self.pixels.iter() {
            let [r, g, b] = pixel.to_bytes();
            writeln!(out, "{} {} {}", r, g, b)?;
        }

        Ok(())
    }

    /// Saves the canvas to a PPM file.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = io::BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()
    }
}

impl PixelSink for Canvas {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    /// # Examples
    ///
    /// Writing a pixel to the fourth column, second row on an 8-by-8 canvas:
    ///
    /// ```
    /// # use subdivision_tracer::color::Color;
    /// # use subdivision_tracer::canvas::{ Canvas, PixelSink };
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// ```
    fn write_pixel(&mut self, x: usize, y: usize, color: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *color;
    }

    fn clear_pixels(&mut self) {
        for pixel in self.pixels.iter_mut() {
            *pixel = Color::black();
        }
    }
}

#[test]
fn out_of_bounds_pixels_are_ignored() {
    let mut canvas = Canvas::new(2, 2);
    canvas.write_pixel(2, 0, &Color::white());
    canvas.write_pixel(0, 5, &Color::white());

    assert_eq!(canvas, Canvas::new(2, 2));
    assert_eq!(canvas.read_pixel(2, 0), None);
}

#[test]
fn clearing_resets_to_black() {
    let mut canvas = Canvas::new(3, 2);
    canvas.write_row(1, &[Color::white(); 3]);
    assert_eq!(canvas.read_pixel(2, 1), Some(Color::white()));

    canvas.clear_pixels();
    assert_eq!(canvas, Canvas::new(3, 2));
}

#[test]
fn ppm_output() {
    let mut canvas = Canvas::new(2, 2);
    canvas.write_pixel(0, 0, &Color::rgb(1.0, 0.5, 0.0));
    canvas.write_pixel(1, 1, &Color::rgb(1.5, -0.5, 0.2));

    let mut buf = Vec::new();
    canvas.write_ppm(&mut buf).unwrap();

    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text, "P3\n2 2\n255\n255 128 0\n0 0 0\n0 0 0\n255 0 51\n");
}
