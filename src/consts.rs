// Runtime parameters
pub const NUM_THREADS: usize = 4;
pub const CANVAS_WIDTH: usize = 256;
pub const CANVAS_HEIGHT: usize = 256;
pub const OUT_IMAGE: &str = "./out.ppm";
pub const OUT_MESH: &str = "./out.obj";

// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Shadow rays ignore obstructions closer than this to the shaded point
pub const SHADOW_EPSILON: f64 = 1e-9;

// Maximum reflection depth when a scene doesn't set one
pub const DEFAULT_MAX_STEPS: usize = 3;

// Upper bound on half-edges visited while walking around a vertex fan
pub const NEIGHBOR_WALK_LIMIT: usize = 4096;

// Loop subdivision masks
pub const ODD_NEAR_WEIGHT: f64 = 3.0 / 8.0;
pub const ODD_FAR_WEIGHT: f64 = 1.0 / 8.0;
pub const BOUNDARY_SELF_WEIGHT: f64 = 3.0 / 4.0;
pub const BOUNDARY_NEIGHBOR_WEIGHT: f64 = 1.0 / 8.0;
pub const LOW_VALENCE_BETA: f64 = 3.0 / 16.0;
