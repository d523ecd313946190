pub mod consts;
pub mod error;

pub mod tuple;
pub mod color;

pub mod mesh;
pub mod obj;

pub mod ray;
pub mod sphere;
pub mod light;
pub mod camera;
pub mod canvas;
pub mod tracer;
pub mod parallel;

pub mod scene;

pub use error::{ Error, Result };

use consts::FEQ_EPSILON;

/// Compares two floats within `FEQ_EPSILON`.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
