//! A half-edge triangle mesh with Loop subdivision.
//!
//! Vertices, half-edges and faces live in flat arenas owned by the `Mesh` and
//! refer to each other by index, so the cyclic `next`/`twin`/`face` graph has
//! no ownership cycles. Dropping a mesh drops its whole topology.
//!
//! # Preconditions
//!
//! Faces must be triangles with consistent winding, and every undirected edge
//! may be shared by at most two faces. Violations are reported as errors by
//! `Mesh::new` rather than producing a corrupt mesh.

use std::collections::HashSet;

use log::{ debug, error, warn };

use crate::consts::{ NEIGHBOR_WALK_LIMIT, ODD_NEAR_WEIGHT, ODD_FAR_WEIGHT,
    BOUNDARY_SELF_WEIGHT, BOUNDARY_NEIGHBOR_WEIGHT, LOW_VALENCE_BETA };
use crate::error::{ Error, Result };
use crate::tuple::Tuple4D;

/// A `(position, color)` pair describing one input vertex.
pub type VertexData = (Tuple4D, Tuple4D);

/// A mesh vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    /// Homogeneous position (`w == 1.0`).
    pub pos: Tuple4D,

    /// RGBA color.
    pub color: Tuple4D,

    /// Index into the mesh's vertex arena.
    pub index: usize,

    /// The last half-edge constructed whose `head` is this vertex. `None` for
    /// vertices no face uses.
    pub edge: Option<usize>,
}

/// A directed half-edge, running from `tail` to `head`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HalfEdge {
    pub head: usize,
    pub tail: usize,

    /// Next half-edge counter-clockwise around `face`.
    pub next: usize,

    /// The oppositely directed half-edge between the same two vertices, or
    /// `None` on the mesh boundary.
    pub twin: Option<usize>,

    pub face: usize,

    /// Sharp feature flag; creased edges subdivide like boundary edges.
    pub creased: bool,
}

/// A triangular face, anchored at one of its three half-edges.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Face {
    pub edge: usize,
}

/// A half-edge triangle mesh.
///
/// Besides the topology arenas the mesh caches flattened per-corner position
/// and color lists in face order, ready to be uploaded as a triangle list.
#[derive(Clone, Debug)]
pub struct Mesh {
    verts: Vec<Vertex>,
    edges: Vec<HalfEdge>,
    faces: Vec<Face>,
    creased_edges: Vec<(usize, usize)>,

    poses: Vec<Tuple4D>,
    colors: Vec<Tuple4D>,
}

impl Mesh {
    /// Builds a mesh from a vertex list and a list of vertex-index triples.
    ///
    /// Half-edge `j` of face `f` runs from `f[j]` to `f[(j + 1) % 3]`. Edges
    /// whose endpoints appear (in either order) in `creased_edges` are flagged
    /// as creased.
    ///
    /// Positions must be affine points (`w == 1.0`); subdivision masks are
    /// only meaningful on those.
    pub fn new(vertex_array: &[VertexData], face_array: &[[usize; 3]],
        creased_edges: &[(usize, usize)]) -> Result<Mesh> {
        let mut mesh = Mesh {
            verts: Vec::with_capacity(vertex_array.len()),
            edges: Vec::with_capacity(face_array.len() * 3),
            faces: Vec::with_capacity(face_array.len()),
            creased_edges: creased_edges.to_vec(),
            poses: Vec::with_capacity(face_array.len() * 3),
            colors: Vec::with_capacity(face_array.len() * 3),
        };

        mesh.setup_vertices(vertex_array)?;
        mesh.setup_faces(face_array)?;
        mesh.fill_arrays();

        debug!("built mesh: {} vertices, {} edges, {} faces ({} boundary edges)",
            mesh.vertex_count(), mesh.edge_count(), mesh.face_count(),
            mesh.boundary_edge_count());

        Ok(mesh)
    }

    fn setup_vertices(&mut self, vertex_array: &[VertexData]) -> Result<()> {
        for (index, &(mut pos, color)) in vertex_array.iter().enumerate() {
            if !crate::feq(pos.w, 1.0) {
                return Err(Error::NonAffineVertex(index));
            }
            pos.w = 1.0;

            self.verts.push(Vertex { pos, color, index, edge: None });
        }

        Ok(())
    }

    fn setup_faces(&mut self, face_array: &[[usize; 3]]) -> Result<()> {
        let vertex_count = self.verts.len();
        let creases: HashSet<(usize, usize)> = self.creased_edges.iter()
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect();

        // Half-edges bucketed under their smaller endpoint, keyed by the
        // larger one. Twins end up in the same bucket with the same key.
        let mut twins: Vec<Vec<(usize, usize)>> = vec![Vec::new(); vertex_count];

        for (f, face) in face_array.iter().enumerate() {
            if let Some(&index) = face.iter().find(|&&i| i >= vertex_count) {
                return Err(Error::FaceIndexOutOfRange { face: f, index, vertex_count });
            }

            if face[0] == face[1] || face[1] == face[2] || face[2] == face[0] {
                return Err(Error::DegenerateFace(f));
            }

            let first = self.edges.len();
            for j in 0..3 {
                let tail = face[j];
                let head = face[(j + 1) % 3];
                let key = (tail.min(head), tail.max(head));
                let e = first + j;

                self.edges.push(HalfEdge {
                    head,
                    tail,
                    next: first + (j + 1) % 3,
                    twin: None,
                    face: f,
                    creased: creases.contains(&key),
                });

                self.verts[head].edge = Some(e);
                twins[key.0].push((key.1, e));
            }

            self.faces.push(Face { edge: first });
        }

        self.setup_twins(twins)
    }

    /// Glues faces together by pairing half-edges that share both endpoints.
    fn setup_twins(&mut self, mut twins: Vec<Vec<(usize, usize)>>) -> Result<()> {
        for (low, bucket) in twins.iter_mut().enumerate() {
            bucket.sort_by_key(|&(high, _)| high);

            for group in bucket.chunk_by(|a, b| a.0 == b.0) {
                match *group {
                    [_] => {},
                    [(high, one), (_, two)] => {
                        if self.edges[one].tail != self.edges[two].head {
                            return Err(Error::InconsistentWinding(low, high));
                        }

                        self.edges[one].twin = Some(two);
                        self.edges[two].twin = Some(one);
                    },
                    _ => return Err(Error::NonManifoldEdge(low, group[0].0)),
                }
            }
        }

        Ok(())
    }

    /// Rebuilds the cached triangle-list arrays and runs the face validator.
    fn fill_arrays(&mut self) {
        self.poses.clear();
        self.colors.clear();

        for f in 0..self.faces.len() {
            let mut e = self.faces[f].edge;
            for _ in 0..3 {
                let head = &self.verts[self.edges[e].head];
                self.poses.push(head.pos);
                self.colors.push(head.color);
                e = self.edges[e].next;
            }

            if let Err(err) = self.validate_face(f) {
                error!("{}", err);
            }
        }
    }

    /// Checks the invariants of a single face and its three half-edges.
    pub fn validate_face(&self, f: usize) -> Result<()> {
        let corrupt = |what: &str| Err(Error::CorruptTopology(format!("face {}: {}", f, what)));

        let mut e = self.faces[f].edge;
        for _ in 0..3 {
            let he = &self.edges[e];
            if he.face != f {
                return corrupt("incorrect face set on half-edge");
            }

            let next = &self.edges[he.next];
            if self.edges[next.next].next != e {
                return corrupt("half-edge cycle is not a triangle");
            }

            if he.head != next.tail {
                return corrupt("half-edge vertices do not match");
            }

            e = he.next;
        }

        Ok(())
    }

    /// Checks every face, twin pairing and vertex back-reference.
    pub fn validate(&self) -> Result<()> {
        for f in 0..self.faces.len() {
            self.validate_face(f)?;
        }

        for (e, he) in self.edges.iter().enumerate() {
            if let Some(t) = he.twin {
                let twin = &self.edges[t];
                if twin.twin != Some(e) || he.head != twin.tail || he.tail != twin.head {
                    return Err(Error::CorruptTopology(
                        format!("half-edge {} and its twin {} disagree", e, t)));
                }
            }
        }

        for v in self.verts.iter() {
            if let Some(e) = v.edge {
                if self.edges[e].head != v.index {
                    return Err(Error::CorruptTopology(
                        format!("vertex {} points at half-edge {} which doesn't end there",
                            v.index, e)));
                }
            }
        }

        Ok(())
    }

    /// Performs one level of Loop subdivision, returning a new mesh.
    ///
    /// Each face is split into four. Every edge gains an odd vertex, and the
    /// original vertices are moved using their pre-subdivision neighbors, so
    /// `self` is left untouched.
    pub fn subdivide(&self) -> Result<Mesh> {
        let (odd, odd_vertices) = self.add_odd_vertices()?;
        let face_array = self.create_face_array(&odd);
        let mut vertex_array = self.adjust_vertices()?;
        vertex_array.extend(odd_vertices);
        let creases = self.refine_creases(&odd);

        let refined = Mesh::new(&vertex_array, &face_array, &creases)?;
        debug!("subdivided {} faces into {}", self.face_count(), refined.face_count());

        Ok(refined)
    }

    /// Applies `levels` rounds of subdivision.
    pub fn subdivide_n(&self, levels: usize) -> Result<Mesh> {
        let mut mesh = self.clone();
        for _ in 0..levels {
            mesh = mesh.subdivide()?;
        }

        Ok(mesh)
    }

    /// Creates one odd vertex per undirected edge.
    ///
    /// Returns, per half-edge, the index of its odd vertex, along with the new
    /// vertices themselves in index order. Indices continue after the last
    /// original vertex.
    fn add_odd_vertices(&self) -> Result<(Vec<usize>, Vec<VertexData>)> {
        let mut odd: Vec<Option<usize>> = vec![None; self.edges.len()];
        let mut new_vertices = Vec::new();

        for face in self.faces.iter() {
            let mut e = face.edge;
            for _ in 0..3 {
                if odd[e].is_none() {
                    let index = self.verts.len() + new_vertices.len();
                    let he = &self.edges[e];

                    let vertex = match he.twin {
                        Some(t) if !he.creased => {
                            odd[t] = Some(index);
                            self.blend(&[
                                (he.head, ODD_NEAR_WEIGHT),
                                (he.tail, ODD_NEAR_WEIGHT),
                                (self.edges[he.next].head, ODD_FAR_WEIGHT),
                                (self.edges[self.edges[t].next].head, ODD_FAR_WEIGHT),
                            ])
                        },
                        twin => {
                            if let Some(t) = twin {
                                odd[t] = Some(index);
                            }
                            self.blend(&[(he.head, 0.5), (he.tail, 0.5)])
                        },
                    };

                    odd[e] = Some(index);
                    new_vertices.push(vertex);
                }

                e = self.edges[e].next;
            }
        }

        let odd = odd.into_iter()
            .collect::<Option<Vec<usize>>>()
            .ok_or_else(|| Error::CorruptTopology("half-edge without a face".into()))?;

        Ok((odd, new_vertices))
    }

    /// Splits every face into three corner triangles and a central one.
    fn create_face_array(&self, odd: &[usize]) -> Vec<[usize; 3]> {
        let mut face_array = Vec::with_capacity(self.faces.len() * 4);

        for face in self.faces.iter() {
            let e0 = face.edge;
            let e1 = self.edges[e0].next;
            let e2 = self.edges[e1].next;

            for &(e, next) in &[(e0, e1), (e1, e2), (e2, e0)] {
                face_array.push([odd[e], self.edges[e].head, odd[next]]);
            }
            face_array.push([odd[e0], odd[e1], odd[e2]]);
        }

        face_array
    }

    /// Computes the repositioned original vertices.
    ///
    /// Every weight is taken from the current (pre-subdivision) positions, so
    /// the order vertices are visited in doesn't matter.
    fn adjust_vertices(&self) -> Result<Vec<VertexData>> {
        let mut adjusted = Vec::with_capacity(self.verts.len());

        for v in self.verts.iter() {
            if v.edge.is_none() {
                warn!("vertex {} is not used by any face; leaving it in place", v.index);
                adjusted.push((v.pos, v.color));
                continue;
            }

            if self.is_boundary_vertex(v.index)? {
                let (a, b) = self.boundary_neighbors(v.index)?;
                adjusted.push(self.blend(&[
                    (v.index, BOUNDARY_SELF_WEIGHT),
                    (a, BOUNDARY_NEIGHBOR_WEIGHT),
                    (b, BOUNDARY_NEIGHBOR_WEIGHT),
                ]));
            } else {
                let neighbors = self.interior_neighbors(v.index)?;
                let beta = loop_beta(neighbors.len());
                let n = neighbors.len() as f64;

                let mut weights = vec![(v.index, 1.0 - n * beta)];
                weights.extend(neighbors.into_iter().map(|u| (u, beta)));
                adjusted.push(self.blend(&weights));
            }
        }

        Ok(adjusted)
    }

    /// Splits each creased edge `(a, b)` into `(a, m)` and `(m, b)` around its
    /// odd vertex `m`, so creases survive into the refined mesh.
    fn refine_creases(&self, odd: &[usize]) -> Vec<(usize, usize)> {
        let mut creases = Vec::new();
        for (e, he) in self.edges.iter().enumerate() {
            // Visit each undirected edge once.
            if he.creased && he.twin.map_or(true, |t| t > e) {
                creases.push((he.tail, odd[e]));
                creases.push((odd[e], he.head));
            }
        }

        creases
    }

    /// Affine combination of vertex positions and colors.
    fn blend(&self, weights: &[(usize, f64)]) -> VertexData {
        let pos: Vec<(f64, Tuple4D)> = weights.iter()
            .map(|&(v, w)| (w, self.verts[v].pos))
            .collect();
        let color: Vec<(f64, Tuple4D)> = weights.iter()
            .map(|&(v, w)| (w, self.verts[v].color))
            .collect();

        (Tuple4D::combine(&pos), Tuple4D::combine(&color))
    }

    fn walk_overflow(v: usize) -> Error {
        Error::CorruptTopology(format!("fan walk around vertex {} did not terminate", v))
    }

    /// Whether `v` touches a boundary or creased edge.
    ///
    /// Walks outgoing half-edges around the fan until it either hits an edge
    /// without a twin (or a creased one) or returns to the start.
    pub fn is_boundary_vertex(&self, v: usize) -> Result<bool> {
        let original = match self.verts[v].edge {
            Some(e) => e,
            None => return Ok(false),
        };

        let mut e = original;
        for _ in 0..NEIGHBOR_WALK_LIMIT {
            let out = &self.edges[self.edges[e].next];
            match out.twin {
                Some(t) if !out.creased => e = t,
                _ => return Ok(true),
            }

            if e == original {
                return Ok(false);
            }
        }

        Err(Mesh::walk_overflow(v))
    }

    /// The one-ring of an interior vertex, in fan order.
    pub fn interior_neighbors(&self, v: usize) -> Result<Vec<usize>> {
        let original = self.verts[v].edge
            .ok_or_else(|| Error::CorruptTopology(format!("vertex {} has no half-edge", v)))?;

        let mut neighbors = Vec::new();
        let mut e = original;
        for _ in 0..NEIGHBOR_WALK_LIMIT {
            e = self.edges[self.edges[e].next].twin
                .ok_or_else(|| Error::CorruptTopology(
                    format!("vertex {} is on the boundary", v)))?;
            neighbors.push(self.edges[e].tail);

            if e == original {
                return Ok(neighbors);
            }
        }

        Err(Mesh::walk_overflow(v))
    }

    /// The two neighbors of a boundary vertex along its boundary (or crease).
    ///
    /// The first is found by sweeping outgoing edges forward around the fan,
    /// the second by sweeping incoming edges backward.
    pub fn boundary_neighbors(&self, v: usize) -> Result<(usize, usize)> {
        let original = self.verts[v].edge
            .ok_or_else(|| Error::CorruptTopology(format!("vertex {} has no half-edge", v)))?;

        let mut forward = None;
        let mut e = original;
        for _ in 0..NEIGHBOR_WALK_LIMIT {
            let out = &self.edges[self.edges[e].next];
            match out.twin {
                Some(t) if !out.creased => e = t,
                _ => {
                    forward = Some(out.head);
                    break;
                },
            }
        }

        let mut backward = None;
        let mut e = original;
        for _ in 0..NEIGHBOR_WALK_LIMIT {
            let incoming = &self.edges[e];
            match incoming.twin {
                Some(t) if !incoming.creased => e = self.edges[self.edges[t].next].next,
                _ => {
                    backward = Some(incoming.tail);
                    break;
                },
            }
        }

        match (forward, backward) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(Mesh::walk_overflow(v)),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.verts
    }

    pub fn half_edges(&self) -> &[HalfEdge] {
        &self.edges
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn creased_edges(&self) -> &[(usize, usize)] {
        &self.creased_edges
    }

    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }

    pub fn half_edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter()
            .enumerate()
            .filter(|&(e, he)| he.twin.map_or(true, |t| t > e))
            .count()
    }

    /// Number of half-edges without a twin.
    pub fn boundary_edge_count(&self) -> usize {
        self.edges.iter().filter(|he| he.twin.is_none()).count()
    }

    /// True if every half-edge has a twin.
    pub fn is_closed(&self) -> bool {
        self.boundary_edge_count() == 0
    }

    /// Corner positions as a triangle list, three per face.
    ///
    /// Each face contributes the heads of its half-edges in `next` order.
    pub fn positions(&self) -> &[Tuple4D] {
        &self.poses
    }

    /// Corner colors, parallel to `positions`.
    pub fn colors(&self) -> &[Tuple4D] {
        &self.colors
    }

    /// The mesh's vertices as `(position, color)` pairs.
    pub fn vertex_array(&self) -> Vec<VertexData> {
        self.verts.iter().map(|v| (v.pos, v.color)).collect()
    }

    /// Faces as vertex-index triples in their original winding.
    pub fn face_indices(&self) -> Vec<[usize; 3]> {
        self.faces.iter()
            .map(|face| {
                let e0 = face.edge;
                let e1 = self.edges[e0].next;
                let e2 = self.edges[e1].next;
                [self.edges[e0].tail, self.edges[e1].tail, self.edges[e2].tail]
            })
            .collect()
    }
}

/// Loop's interior vertex weight for a vertex with `n` neighbors.
pub fn loop_beta(n: usize) -> f64 {
    if n <= 3 {
        LOW_VALENCE_BETA
    } else {
        3.0 / (8.0 * n as f64)
    }
}

/* Tests */

#[cfg(test)]
fn gray(v: f64) -> Tuple4D {
    Tuple4D::tuple(v, v, v, 1.0)
}

#[cfg(test)]
fn tetrahedron() -> Mesh {
    let vertex_array = vec![
        (Tuple4D::point(0.0, 0.0, 0.0), gray(1.0)),
        (Tuple4D::point(1.0, 0.0, 0.0), gray(1.0)),
        (Tuple4D::point(0.0, 1.0, 0.0), gray(1.0)),
        (Tuple4D::point(0.0, 0.0, 1.0), gray(1.0)),
    ];
    let face_array = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];

    Mesh::new(&vertex_array, &face_array, &[]).unwrap()
}

#[cfg(test)]
fn octahedron() -> Mesh {
    let vertex_array = vec![
        (Tuple4D::point( 1.0,  0.0,  0.0), gray(0.0)),
        (Tuple4D::point(-1.0,  0.0,  0.0), gray(0.2)),
        (Tuple4D::point( 0.0,  1.0,  0.0), gray(0.4)),
        (Tuple4D::point( 0.0, -1.0,  0.0), gray(0.6)),
        (Tuple4D::point( 0.0,  0.0,  1.0), gray(0.8)),
        (Tuple4D::point( 0.0,  0.0, -1.0), gray(1.0)),
    ];
    let face_array = vec![
        [0, 2, 4], [2, 1, 4], [1, 3, 4], [3, 0, 4],
        [2, 0, 5], [1, 2, 5], [3, 1, 5], [0, 3, 5],
    ];

    Mesh::new(&vertex_array, &face_array, &[]).unwrap()
}

#[cfg(test)]
fn triangle() -> Mesh {
    let vertex_array = vec![
        (Tuple4D::point(0.0, 0.0, 0.0), gray(0.0)),
        (Tuple4D::point(8.0, 0.0, 0.0), gray(0.5)),
        (Tuple4D::point(0.0, 8.0, 0.0), gray(1.0)),
    ];

    Mesh::new(&vertex_array, &[[0, 1, 2]], &[]).unwrap()
}

#[test]
fn closed_mesh_euler_relation() {
    for mesh in &[tetrahedron(), octahedron()] {
        assert!(mesh.is_closed());
        assert_eq!(2 * mesh.edge_count(), 3 * mesh.face_count());
        assert!(mesh.half_edges().iter().all(|he| he.twin.is_some()));
        mesh.validate().unwrap();
    }
}

#[test]
fn twins_point_opposite_ways() {
    let mesh = octahedron();
    for (e, he) in mesh.half_edges().iter().enumerate() {
        let twin = &mesh.half_edges()[he.twin.unwrap()];
        assert_eq!(twin.twin, Some(e));
        assert_eq!(he.head, twin.tail);
        assert_eq!(he.tail, twin.head);
    }
}

#[test]
fn vertex_edge_is_last_incoming_half_edge() {
    let mesh = tetrahedron();

    // Vertex 3 is last pointed at by the second half-edge of face 3 (2 -> 3).
    assert_eq!(mesh.vertices()[3].edge, Some(10));
    assert_eq!(mesh.half_edges()[10].head, 3);
}

#[test]
fn positions_follow_face_then_next_order() {
    let mesh = triangle();
    let v = mesh.vertex_array();

    assert_eq!(mesh.positions(), &[v[1].0, v[2].0, v[0].0]);
    assert_eq!(mesh.colors(), &[v[1].1, v[2].1, v[0].1]);
}

#[test]
fn face_indices_round_trip() {
    let mesh = octahedron();
    let copy = Mesh::new(&mesh.vertex_array(), &mesh.face_indices(), &[]).unwrap();

    assert_eq!(copy.face_indices(), mesh.face_indices());
    assert_eq!(copy.positions(), mesh.positions());
}

#[test]
fn subdivision_quadruples_faces() {
    let mesh = tetrahedron();
    let once = mesh.subdivide().unwrap();

    assert_eq!(once.face_count(), 4 * mesh.face_count());
    assert_eq!(once.vertex_count(), mesh.vertex_count() + mesh.edge_count());
    assert!(once.is_closed());
    once.validate().unwrap();

    let twice = once.subdivide().unwrap();
    assert_eq!(twice.face_count(), 16 * mesh.face_count());
    assert_eq!(twice.vertex_count(), once.vertex_count() + once.edge_count());
    assert_eq!(2 * twice.edge_count(), 3 * twice.face_count());
    twice.validate().unwrap();
}

#[test]
fn subdivision_leaves_original_untouched() {
    let mesh = octahedron();
    let before = mesh.vertex_array();
    let _ = mesh.subdivide_n(2).unwrap();

    assert_eq!(mesh.vertex_array(), before);
    assert_eq!(mesh.face_count(), 8);
}

#[test]
fn odd_vertex_uses_loop_mask() {
    let refined = tetrahedron().subdivide().unwrap();

    // Face 0 is [0, 2, 1]; its third half-edge (1 -> 0) gets odd vertex 6.
    // The faces on either side of edge 0-1 have 2 and 3 opposite.
    let odd = refined.vertices()[6];
    assert_eq!(odd.pos, Tuple4D::point(0.375, 0.125, 0.125));
}

#[test]
fn low_valence_vertex_uses_fixed_beta() {
    let refined = tetrahedron().subdivide().unwrap();

    // Valence 3: 7/16 of itself plus 3/16 of each neighbor.
    let v0 = refined.vertices()[0];
    assert_eq!(v0.pos, Tuple4D::point(0.1875, 0.1875, 0.1875));
}

#[test]
fn regular_vertex_uses_general_beta() {
    let mesh = octahedron();
    let refined = mesh.subdivide().unwrap();

    // Valence 4: beta = 3/32, so the vertex keeps 5/8 of itself. Neighbors
    // of (1, 0, 0) are (0, +-1, 0) and (0, 0, +-1), which cancel out.
    assert_eq!(mesh.interior_neighbors(0).unwrap().len(), 4);
    assert_eq!(refined.vertices()[0].pos, Tuple4D::point(0.625, 0.0, 0.0));
}

#[test]
fn weights_partition_unity() {
    assert!(crate::feq(2.0 * ODD_NEAR_WEIGHT + 2.0 * ODD_FAR_WEIGHT, 1.0));
    assert!(crate::feq(BOUNDARY_SELF_WEIGHT + 2.0 * BOUNDARY_NEIGHBOR_WEIGHT, 1.0));
    for n in 1..20 {
        let beta = loop_beta(n);
        assert!(crate::feq(n as f64 * beta + (1.0 - n as f64 * beta), 1.0));
        assert!(1.0 - n as f64 * beta > 0.0);
    }

    // Every refined vertex is an affine combination, so w stays exactly 1.
    let refined = octahedron().subdivide_n(2).unwrap();
    assert!(refined.vertices().iter().all(|v| crate::feq(v.pos.w, 1.0)));
    assert!(refined.vertices().iter().all(|v| crate::feq(v.color.w, 1.0)));
}

#[test]
fn uniform_color_is_preserved() {
    let refined = tetrahedron().subdivide_n(2).unwrap();

    assert!(refined.colors().iter().all(|&c| c == gray(1.0)));
}

#[test]
fn boundary_triangle_subdivision() {
    let mesh = triangle();
    assert_eq!(mesh.boundary_edge_count(), 3);
    assert!(mesh.is_boundary_vertex(0).unwrap());

    let refined = mesh.subdivide().unwrap();
    assert_eq!(refined.face_count(), 4);
    assert_eq!(refined.vertex_count(), 6);
    assert_eq!(refined.boundary_edge_count(), 6);
    refined.validate().unwrap();

    let v = refined.vertices();
    // 3/4 of itself plus 1/8 of each boundary neighbor.
    assert_eq!(v[0].pos, Tuple4D::point(1.0, 1.0, 0.0));
    assert_eq!(v[1].pos, Tuple4D::point(6.0, 1.0, 0.0));
    // Boundary odd vertices are plain midpoints: 0 -> 1 is the first edge.
    assert_eq!(v[3].pos, Tuple4D::point(4.0, 0.0, 0.0));
    assert_eq!(v[3].color, gray(0.25));
}

#[test]
fn creased_edge_subdivides_like_boundary() {
    let vertex_array = vec![
        (Tuple4D::point(0.0, 0.0, 0.0), gray(1.0)),
        (Tuple4D::point(4.0, 0.0, 0.0), gray(1.0)),
        (Tuple4D::point(4.0, 4.0, 0.0), gray(1.0)),
        (Tuple4D::point(0.0, 4.0, 4.0), gray(1.0)),
    ];
    let face_array = vec![[0, 1, 2], [0, 2, 3]];

    let smooth = Mesh::new(&vertex_array, &face_array, &[]).unwrap();
    let creased = Mesh::new(&vertex_array, &face_array, &[(2, 0)]).unwrap();
    assert_eq!(creased.half_edges().iter().filter(|he| he.creased).count(), 2);

    // Edge 2 -> 0 is the last half-edge of face 0, so its odd vertex comes
    // third after 0 -> 1 and 1 -> 2.
    let smooth_odd = smooth.subdivide().unwrap().vertices()[6].pos;
    let creased_refined = creased.subdivide().unwrap();
    let creased_odd = creased_refined.vertices()[6].pos;

    assert_eq!(creased_odd, Tuple4D::point(2.0, 2.0, 0.0));
    assert_eq!(smooth_odd, Tuple4D::point(2.0, 2.0, 0.5));

    // The crease is carried over as two halves around the odd vertex.
    assert_eq!(creased_refined.creased_edges(), &[(2, 6), (6, 0)]);
    assert_eq!(creased_refined.half_edges().iter().filter(|he| he.creased).count(), 4);
}

#[test]
fn rejects_out_of_range_face() {
    let vertex_array = vec![(Tuple4D::point(0.0, 0.0, 0.0), gray(1.0)); 3];
    let res = Mesh::new(&vertex_array, &[[0, 1, 3]], &[]);

    assert!(matches!(res,
        Err(Error::FaceIndexOutOfRange { face: 0, index: 3, vertex_count: 3 })));
}

#[test]
fn rejects_degenerate_face() {
    let vertex_array = vec![(Tuple4D::point(0.0, 0.0, 0.0), gray(1.0)); 3];

    assert!(matches!(Mesh::new(&vertex_array, &[[0, 1, 1]], &[]),
        Err(Error::DegenerateFace(0))));
}

#[test]
fn rejects_inconsistent_winding() {
    let vertex_array = vec![(Tuple4D::point(0.0, 0.0, 0.0), gray(1.0)); 4];
    let res = Mesh::new(&vertex_array, &[[0, 1, 2], [0, 1, 3]], &[]);

    assert!(matches!(res, Err(Error::InconsistentWinding(0, 1))));
}

#[test]
fn rejects_non_manifold_edge() {
    let vertex_array = vec![(Tuple4D::point(0.0, 0.0, 0.0), gray(1.0)); 5];
    let res = Mesh::new(&vertex_array, &[[0, 1, 2], [1, 0, 3], [0, 1, 4]], &[]);

    assert!(matches!(res, Err(Error::NonManifoldEdge(0, 1))));
}

#[test]
fn rejects_non_affine_position() {
    let mut vertex_array = triangle().vertex_array();
    vertex_array[1].0 = Tuple4D::tuple(0.0, 0.0, 0.0, 2.0);

    assert!(matches!(Mesh::new(&vertex_array, &[[0, 1, 2]], &[]),
        Err(Error::NonAffineVertex(1))));
}

#[test]
fn boundary_walks_cross_twins() {
    let vertex_array = vec![
        (Tuple4D::point(0.0, 0.0, 0.0), gray(1.0)),
        (Tuple4D::point(8.0, 0.0, 0.0), gray(1.0)),
        (Tuple4D::point(8.0, 8.0, 0.0), gray(1.0)),
        (Tuple4D::point(0.0, 8.0, 0.0), gray(1.0)),
    ];
    let mesh = Mesh::new(&vertex_array, &[[0, 1, 2], [0, 2, 3]], &[]).unwrap();

    // Both fans at 0 and 2 span the shared diagonal.
    assert_eq!(mesh.boundary_neighbors(0).unwrap(), (1, 3));
    assert_eq!(mesh.boundary_neighbors(2).unwrap(), (3, 1));
    assert_eq!(mesh.boundary_neighbors(1).unwrap(), (2, 0));

    let refined = mesh.subdivide().unwrap();
    assert_eq!(refined.vertices()[0].pos, Tuple4D::point(1.0, 1.0, 0.0));
    assert_eq!(refined.vertices()[2].pos, Tuple4D::point(7.0, 7.0, 0.0));

    mesh.subdivide_n(3).unwrap().validate().unwrap();
}

#[test]
fn isolated_vertex_stays_put() {
    let mut vertex_array = triangle().vertex_array();
    vertex_array.push((Tuple4D::point(5.0, 5.0, 5.0), gray(0.0)));
    let mesh = Mesh::new(&vertex_array, &[[0, 1, 2]], &[]).unwrap();

    let refined = mesh.subdivide().unwrap();
    assert_eq!(refined.vertices()[3].pos, Tuple4D::point(5.0, 5.0, 5.0));
    assert_eq!(refined.vertex_count(), 7);
}
