//! JSON descriptions of scenes and meshes.
//!
//! A scene file looks like:
//!
//! ```json
//! {
//!     "canvas_width": 256,
//!     "canvas_height": 256,
//!     "background": [0.0, 0.0, 0.0],
//!     "max_steps": 3,
//!     "camera": {
//!         "eye": [0.0, 0.0, 5.0], "at": [0.0, 0.0, 0.0], "up": [0.0, 1.0, 0.0],
//!         "width_inc": 0.02, "height_inc": 0.02,
//!         "projection": "perspective", "distance": 4.0
//!     },
//!     "spheres": [
//!         { "center": [0.0, 0.0, 0.0], "radius": 1.0,
//!           "ka": [0.1, 0.1, 0.1], "kd": [0.7, 0.2, 0.2], "ks": [0.5, 0.5, 0.5],
//!           "alpha": 20.0 }
//!     ],
//!     "lights": [
//!         { "type": "ambient", "color": [0.2, 0.2, 0.2] },
//!         { "type": "point", "color": [1.0, 1.0, 1.0], "position": [-4.0, 4.0, 6.0] }
//!     ]
//! }
//! ```
//!
//! A mesh file lists vertices with `pos` and optional `color` arrays of three
//! or four numbers, triangle `faces`, and optional `creased_edges`. A
//! four-number `pos` is homogeneous and gets divided through by its `w`.

use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{ Serialize, Deserialize };

use crate::camera::{ Camera, Projection };
use crate::color::Color;
use crate::consts::{ CANVAS_HEIGHT, CANVAS_WIDTH };
use crate::error::{ Error, Result };
use crate::light::{ Light, LightKind };
use crate::mesh::{ Mesh, VertexData };
use crate::sphere::SphereObject;
use crate::tracer::RayTracer;
use crate::tuple::Tuple4D;

/// A tracer together with the image size it should render.
pub struct Scene {
    pub tracer: RayTracer,
    pub width: usize,
    pub height: usize,
}

impl Scene {
    /// Reads a scene description from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Scene> {
        let text = fs::read_to_string(path)?;
        Scene::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Scene> {
        let scene_json: SceneJson = serde_json::from_str(text)?;
        Scene::try_from(scene_json)
    }
}

impl TryFrom<SceneJson> for Scene {
    type Error = Error;

    fn try_from(scene_json: SceneJson) -> Result<Scene> {
        let c = scene_json.camera;
        let camera = Camera::new(
            Tuple4D::point_from(c.eye),
            Tuple4D::vector_from(c.up),
            Tuple4D::point_from(c.at),
            c.width_inc,
            c.height_inc,
            c.projection,
            c.distance,
        )?;

        let objects = scene_json.spheres.into_iter()
            .map(|s| SphereObject::new(Tuple4D::point_from(s.center), s.radius,
                s.ka.into(), s.kd.into(), s.ks.into(), s.alpha))
            .collect::<Result<Vec<_>>>()?;

        let lights = scene_json.lights.into_iter()
            .enumerate()
            .map(|(i, l)| match l.kind {
                LightKind::Ambient => Ok(Light::ambient(l.color.into())),
                LightKind::Point => l.position
                    .map(|p| Light::point(l.color.into(), Tuple4D::point_from(p)))
                    .ok_or(Error::MissingLightPosition(i)),
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Loaded scene with {} spheres and {} lights", objects.len(), lights.len());

        let mut tracer = RayTracer::new(camera, objects, lights, scene_json.background.into())?;
        if let Some(max_steps) = scene_json.max_steps {
            tracer = tracer.with_max_steps(max_steps);
        }

        Ok(Scene {
            tracer,
            width: scene_json.canvas_width,
            height: scene_json.canvas_height,
        })
    }
}

#[derive(Serialize, Deserialize)]
pub struct SceneJson {
    #[serde(default = "default_width")]
    pub canvas_width: usize,
    #[serde(default = "default_height")]
    pub canvas_height: usize,

    #[serde(default)]
    pub background: [f64; 3],
    pub max_steps: Option<usize>,

    pub camera: CameraJson,

    #[serde(default)]
    pub spheres: Vec<SphereJson>,
    #[serde(default)]
    pub lights: Vec<LightJson>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CameraJson {
    pub eye: [f64; 3],
    pub at: [f64; 3],
    pub up: [f64; 3],

    pub width_inc: f64,
    pub height_inc: f64,

    #[serde(default)]
    pub projection: Projection,
    #[serde(default = "default_distance")]
    pub distance: f64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SphereJson {
    pub center: [f64; 3],
    pub radius: f64,

    pub ka: [f64; 3],
    pub kd: [f64; 3],
    pub ks: [f64; 3],
    pub alpha: f64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LightJson {
    #[serde(rename = "type")]
    pub kind: LightKind,
    pub color: [f64; 3],
    pub position: Option<[f64; 3]>,
}

fn default_width() -> usize { CANVAS_WIDTH }
fn default_height() -> usize { CANVAS_HEIGHT }
fn default_distance() -> f64 { 1.0 }

#[derive(Clone, Serialize, Deserialize)]
pub struct MeshJson {
    pub vertices: Vec<VertexJson>,
    pub faces: Vec<[usize; 3]>,

    #[serde(default)]
    pub creased_edges: Vec<(usize, usize)>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct VertexJson {
    pub pos: Vec<f64>,
    pub color: Option<Vec<f64>>,
}

impl MeshJson {
    /// Reads a mesh description from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshJson> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl TryFrom<MeshJson> for Mesh {
    type Error = Error;

    fn try_from(mesh_json: MeshJson) -> Result<Mesh> {
        let vertices = mesh_json.vertices.iter()
            .enumerate()
            .map(|(i, v)| {
                let pos = to_position(&v.pos)
                    .ok_or_else(|| Error::InvalidDescription(
                        format!("vertex {} position {:?} is not a point", i, v.pos)))?;
                let color = match &v.color {
                    Some(color) => to_color(color)
                        .ok_or_else(|| Error::InvalidDescription(
                            format!("vertex {} color {:?} needs 3 or 4 channels", i, color)))?,
                    None => Tuple4D::tuple(1.0, 1.0, 1.0, 1.0),
                };

                Ok((pos, color))
            })
            .collect::<Result<Vec<VertexData>>>()?;

        Mesh::new(&vertices, &mesh_json.faces, &mesh_json.creased_edges)
    }
}

/// Builds a position from `[x, y, z]` or homogeneous `[x, y, z, w]`.
fn to_position(values: &[f64]) -> Option<Tuple4D> {
    match *values {
        [x, y, z] => Some(Tuple4D::point(x, y, z)),
        [x, y, z, w] => Tuple4D::from_homogeneous(x, y, z, w),
        _ => None,
    }
}

/// Builds an RGBA color from three or four channels.
fn to_color(values: &[f64]) -> Option<Tuple4D> {
    match *values {
        [r, g, b] => Some(Tuple4D::tuple(r, g, b, 1.0)),
        [r, g, b, a] => Some(Tuple4D::tuple(r, g, b, a)),
        _ => None,
    }
}

#[cfg(test)]
const TEST_SCENE: &str = r#"{
    "canvas_width": 16,
    "canvas_height": 12,
    "background": [0.1, 0.2, 0.3],
    "max_steps": 1,
    "camera": {
        "eye": [0.0, 0.0, 5.0], "at": [0.0, 0.0, 0.0], "up": [0.0, 1.0, 0.0],
        "width_inc": 0.25, "height_inc": 0.25
    },
    "spheres": [
        { "center": [0.0, 0.0, 0.0], "radius": 1.0,
          "ka": [0.5, 0.5, 0.5], "kd": [0.5, 0.5, 0.5], "ks": [0.0, 0.0, 0.0],
          "alpha": 10.0 }
    ],
    "lights": [
        { "type": "ambient", "color": [1.0, 1.0, 1.0] },
        { "type": "point", "color": [1.0, 1.0, 1.0], "position": [0.0, 4.0, 4.0] }
    ]
}"#;

#[test]
fn scene_from_json() {
    let scene = Scene::from_json(TEST_SCENE).unwrap();

    assert_eq!((scene.width, scene.height), (16, 12));
    assert_eq!(scene.tracer.max_steps, 1);
    assert_eq!(scene.tracer.background, Color::rgb(0.1, 0.2, 0.3));
    assert_eq!(scene.tracer.camera.projection, Projection::Orthographic);
    assert_eq!(scene.tracer.objects.len(), 1);
    assert_eq!(scene.tracer.lights[1].position, Some(Tuple4D::point(0.0, 4.0, 4.0)));
}

#[test]
fn point_light_without_position() {
    let text = TEST_SCENE.replace(r#", "position": [0.0, 4.0, 4.0]"#, "");

    assert!(matches!(Scene::from_json(&text), Err(Error::MissingLightPosition(1))));
}

#[test]
fn bad_sphere_radius() {
    let text = TEST_SCENE.replace(r#""radius": 1.0"#, r#""radius": -2.0"#);

    assert!(matches!(Scene::from_json(&text), Err(Error::DegenerateSphere(_))));
}

#[test]
fn malformed_json() {
    assert!(matches!(Scene::from_json("{ \"canvas_width\": "), Err(Error::Json(_))));
}

#[test]
fn mesh_from_json() {
    let text = r#"{
        "vertices": [
            { "pos": [0.0, 0.0, 0.0] },
            { "pos": [1.0, 0.0, 0.0, 1.0], "color": [1.0, 0.0, 0.0] },
            { "pos": [0.0, 1.0, 0.0] }
        ],
        "faces": [[0, 1, 2]],
        "creased_edges": [[0, 1]]
    }"#;

    let mesh_json: MeshJson = serde_json::from_str(text).unwrap();
    let mesh = Mesh::try_from(mesh_json).unwrap();

    assert_eq!(mesh.face_count(), 1);
    assert_eq!(mesh.vertices()[1].color, Tuple4D::tuple(1.0, 0.0, 0.0, 1.0));
    assert_eq!(mesh.vertices()[0].color, Tuple4D::tuple(1.0, 1.0, 1.0, 1.0));
    assert_eq!(mesh.creased_edges(), &[(0, 1)]);
}

#[test]
fn homogeneous_mesh_positions() {
    let text = r#"{
        "vertices": [
            { "pos": [0.0, 0.0, 2.0, 2.0] },
            { "pos": [1.0, 0.0, 0.0] },
            { "pos": [0.0, 1.0, 0.0] }
        ],
        "faces": [[0, 1, 2]]
    }"#;
    let mesh_json: MeshJson = serde_json::from_str(text).unwrap();
    let mesh = Mesh::try_from(mesh_json).unwrap();
    assert_eq!(mesh.vertices()[0].pos, Tuple4D::point(0.0, 0.0, 1.0));

    let at_infinity = text.replace("[0.0, 0.0, 2.0, 2.0]", "[0.0, 0.0, 2.0, 0.0]");
    let mesh_json: MeshJson = serde_json::from_str(&at_infinity).unwrap();
    assert!(matches!(Mesh::try_from(mesh_json), Err(Error::InvalidDescription(_))));
}

#[test]
fn mesh_vertex_with_bad_arity() {
    let text = r#"{ "vertices": [ { "pos": [0.0, 0.0] } ], "faces": [] }"#;
    let mesh_json: MeshJson = serde_json::from_str(text).unwrap();

    assert!(matches!(Mesh::try_from(mesh_json), Err(Error::InvalidDescription(_))));
}
