use std::io::{ self, prelude::* };
use std::path::{ Path, PathBuf };
use std::fs::File;

use crate::error::{ Error, Result };
use crate::mesh::{ Mesh, VertexData };
use crate::tuple::Tuple4D;

/// Color given to vertices that don't specify one.
const DEFAULT_VERTEX_COLOR: [f64; 4] = [1.0, 1.0, 1.0, 1.0];

/// A parser for OBJ files describing triangle meshes.
#[derive(Clone, Debug, Default)]
pub struct ObjParser {
    pub path: PathBuf,
    pub ignored_lines: usize,

    pub vertices: Vec<VertexData>,
    pub faces: Vec<[usize; 3]>,
}

impl ObjParser {
    /// Creates a new `ObjParser` for the OBJ file at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> ObjParser {
        ObjParser { path: path.as_ref().into(), ..Default::default() }
    }

    /// Reads and parses the file at `self.path`.
    pub fn parse(&mut self) -> Result<()> {
        let obj_file = File::open(&self.path)?;
        self.parse_reader(io::BufReader::new(obj_file))
    }

    /// Parses OBJ records from any buffered reader.
    ///
    /// Unsupported commands are skipped, and each one increments
    /// `ignored_lines`. Malformed `v` and `f` records are errors.
    pub fn parse_reader<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            // Ignore blank lines and comments.
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            self.handle_command(line, n + 1)?;
        }

        Ok(())
    }

    /// Parses a line of an OBJ file.
    ///
    /// ```obj
    /// v 0 0 0
    /// v 1 0 0 1 0 0
    /// v 0 1 0
    /// v 0 0 1
    /// f 1 3 2
    /// f 1 2/1 4//1
    /// ```
    ///
    /// `v` takes `x y z`, `x y z w` (divided through by `w`), or `x y z r g b` (a per-vertex color, as
    /// written by several mesh tools). `f` takes one-based vertex indices,
    /// optionally followed by `/texture/normal` indices which are ignored.
    /// Negative indices count back from the most recent vertex.
    fn handle_command(&mut self, line: &str, n: usize) -> Result<()> {
        let params: Vec<&str> = line.split_whitespace().collect();
        match params[0] {
            "v" => {
                let values = params[1..].iter()
                    .map(|p| parse_number(p, n))
                    .collect::<Result<Vec<f64>>>()?;

                let vertex: VertexData = match values.len() {
                    3 => (Tuple4D::point(values[0], values[1], values[2]),
                        DEFAULT_VERTEX_COLOR.into()),
                    4 => {
                        let pos = Tuple4D::from_homogeneous(
                                values[0], values[1], values[2], values[3])
                            .ok_or_else(|| Error::ObjParse {
                                line: n,
                                message: format!("vertex weight {} can't be projected", values[3]),
                            })?;
                        (pos, DEFAULT_VERTEX_COLOR.into())
                    },
                    6 => (Tuple4D::point(values[0], values[1], values[2]),
                        Tuple4D::tuple(values[3], values[4], values[5], 1.0)),
                    count => return Err(Error::ObjParse {
                        line: n,
                        message: format!("vertex has {} components", count),
                    }),
                };

                self.vertices.push(vertex);
            },
            "f" => {
                if params.len() < 4 {
                    return Err(Error::ObjParse {
                        line: n,
                        message: "face needs at least three vertices".into(),
                    });
                }

                let face = params[1..].iter()
                    .map(|p| self.vertex_index(p, n))
                    .collect::<Result<Vec<usize>>>()?;

                let triangles = fan_triangulation(&face);
                self.faces.extend(triangles);
            },
            _ => self.ignored_lines += 1,
        }

        Ok(())
    }

    /// Resolves the vertex part of a face corner to a zero-based index.
    fn vertex_index(&self, corner: &str, n: usize) -> Result<usize> {
        let bad = |message: String| Error::ObjParse { line: n, message };

        let first = corner.split('/').next().unwrap_or(corner);
        let index: i64 = first.parse()
            .map_err(|_| bad(format!("invalid vertex index {:?}", first)))?;

        let count = self.vertices.len() as i64;
        let resolved = if index < 0 { count + index } else { index - 1 };

        if resolved < 0 || resolved >= count {
            return Err(bad(format!("vertex index {} out of range", index)));
        }

        Ok(resolved as usize)
    }

    /// Builds a mesh from the parsed records.
    pub fn into_mesh(self, creased_edges: &[(usize, usize)]) -> Result<Mesh> {
        Mesh::new(&self.vertices, &self.faces, creased_edges)
    }
}

fn parse_number(s: &str, n: usize) -> Result<f64> {
    s.parse().map_err(|_| Error::ObjParse {
        line: n,
        message: format!("invalid number {:?}", s),
    })
}

/// Partitions a polygon into triangles sharing its first vertex.
///
/// ```text
///         B *
///          / \
///       A *   * C
///         |   |
///       E *---* D
/// ```
///
/// `A-B-C-D-E` becomes `A-B-C`, `A-C-D` and `A-D-E`, keeping the polygon's
/// winding.
pub fn fan_triangulation(face: &[usize]) -> Vec<[usize; 3]> {
    (1..face.len().saturating_sub(1))
        .map(|i| [face[0], face[i], face[i + 1]])
        .collect()
}

/// Writes a mesh as OBJ, with vertex colors in the `v x y z r g b` form.
pub fn write_obj<W: Write>(mesh: &Mesh, out: &mut W) -> io::Result<()> {
    writeln!(out, "# {} vertices, {} faces", mesh.vertex_count(), mesh.face_count())?;

    for v in mesh.vertices() {
        writeln!(out, "v {} {} {} {} {} {}",
            v.pos.x, v.pos.y, v.pos.z, v.color.x, v.color.y, v.color.z)?;
    }

    for [a, b, c] in mesh.face_indices() {
        writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }

    Ok(())
}

/// Writes a mesh as OBJ to the file at `path`.
pub fn save_obj<P: AsRef<Path>>(mesh: &Mesh, path: P) -> io::Result<()> {
    let mut out = io::BufWriter::new(File::create(path)?);
    write_obj(mesh, &mut out)?;
    out.flush()
}

#[test]
fn ignoring_unrecognized_lines() {
    let mut obj_parser = ObjParser::new("./models/gibberish.obj");
    obj_parser.parse().unwrap();

    assert_eq!(obj_parser.ignored_lines, 5);
    assert!(obj_parser.vertices.is_empty());
}

#[test]
fn vertex_records() {
    let mut obj_parser = ObjParser::new("./models/vertices.obj");
    obj_parser.parse().unwrap();

    assert_eq!(obj_parser.vertices[0].0, Tuple4D::point(-1.0, 1.0, 0.0));
    assert_eq!(obj_parser.vertices[1].0, Tuple4D::point(-1.0, 0.5, 0.0));
    assert_eq!(obj_parser.vertices[2].0, Tuple4D::point( 1.0, 0.0, 0.0));
    assert_eq!(obj_parser.vertices[3].0, Tuple4D::point( 1.0, 1.0, 0.0));
    assert_eq!(obj_parser.vertices[3].1, Tuple4D::tuple(1.0, 0.0, 0.0, 1.0));
}

#[test]
fn weighted_vertices_are_projected() {
    let src = "v 2 4 6 2\nv 1 0 0 1\nv 0 1 0\nf 1 2 3\nv 0 0 1 0\n";
    let mut obj_parser = ObjParser::default();

    match obj_parser.parse_reader(src.as_bytes()) {
        Err(Error::ObjParse { line, .. }) => assert_eq!(line, 5),
        other => panic!("expected a parse error, got {:?}", other),
    }
    assert_eq!(obj_parser.vertices[0].0, Tuple4D::point(1.0, 2.0, 3.0));

    let mesh = obj_parser.into_mesh(&[]).unwrap();
    assert_eq!(mesh.vertices()[0].pos, Tuple4D::point(1.0, 2.0, 3.0));
}

#[test]
fn triangulating_polygons() {
    let mut obj_parser = ObjParser::new("./models/vertices-and-polygon.obj");
    obj_parser.parse().unwrap();

    assert_eq!(obj_parser.faces, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
}

#[test]
fn face_corners_with_attributes() {
    let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1/1 2//1 -1\n";
    let mut obj_parser = ObjParser::default();
    obj_parser.parse_reader(src.as_bytes()).unwrap();

    assert_eq!(obj_parser.faces, vec![[0, 1, 2]]);
}

#[test]
fn malformed_records_report_line() {
    let src = "v 0 0 0\nv 1 0 0\n\nf 1 2 7\n";
    let mut obj_parser = ObjParser::default();

    match obj_parser.parse_reader(src.as_bytes()) {
        Err(Error::ObjParse { line, .. }) => assert_eq!(line, 4),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn closed_model_builds_mesh() {
    let mut obj_parser = ObjParser::new("./models/tetrahedron.obj");
    obj_parser.parse().unwrap();
    let mesh = obj_parser.into_mesh(&[]).unwrap();

    assert_eq!(mesh.face_count(), 4);
    assert!(mesh.is_closed());
}

#[test]
fn written_mesh_reads_back() {
    let mut obj_parser = ObjParser::new("./models/tetrahedron.obj");
    obj_parser.parse().unwrap();
    let mesh = obj_parser.into_mesh(&[]).unwrap().subdivide().unwrap();

    let mut buf = Vec::new();
    write_obj(&mesh, &mut buf).unwrap();

    let mut reread = ObjParser::default();
    reread.parse_reader(buf.as_slice()).unwrap();
    let copy = reread.into_mesh(&[]).unwrap();

    assert_eq!(copy.face_indices(), mesh.face_indices());
    assert_eq!(copy.positions(), mesh.positions());
}
