//! Error types shared by the mesh and ray tracer halves of the crate.

use thiserror::Error;

/// Errors that can occur while building meshes, scenes or images.
///
/// Everything here is a precondition violation or an I/O failure. Running out
/// of reflection bounces is not an error; the tracer just returns the
/// background color.
#[derive(Error, Debug)]
pub enum Error {
    /// A face names a vertex that doesn't exist.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange { face: usize, index: usize, vertex_count: usize },

    /// A face uses the same vertex more than once.
    #[error("face {0} repeats a vertex")]
    DegenerateFace(usize),

    /// More than two half-edges share the undirected edge (a, b).
    #[error("edge ({0}, {1}) is shared by more than two faces")]
    NonManifoldEdge(usize, usize),

    /// Two faces traverse the edge (a, b) in the same direction.
    #[error("edge ({0}, {1}) is traversed in the same direction by two faces")]
    InconsistentWinding(usize, usize),

    /// A half-edge link is missing or a fan walk never closed.
    #[error("corrupt topology: {0}")]
    CorruptTopology(String),

    /// A vertex position whose homogeneous `w` isn't 1.
    #[error("vertex {0} is not an affine point (w != 1)")]
    NonAffineVertex(usize),

    /// A sphere radius that isn't finite and positive.
    #[error("sphere radius must be finite and positive, got {0}")]
    DegenerateSphere(f64),

    /// Camera parameters that can't produce a view basis.
    #[error("degenerate camera: {0}")]
    DegenerateCamera(String),

    /// A ray direction too short to normalize.
    #[error("ray direction has zero length")]
    ZeroDirection,

    /// A point light without a position.
    #[error("point light {0} has no position")]
    MissingLightPosition(usize),

    /// A malformed OBJ record.
    #[error("OBJ parse error on line {line}: {message}")]
    ObjParse { line: usize, message: String },

    /// A scene or mesh description with well-formed JSON but bad values.
    #[error("invalid description: {0}")]
    InvalidDescription(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for crate operations.
pub type Result<T> = std::result::Result<T, Error>;
