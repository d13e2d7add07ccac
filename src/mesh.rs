//! Mesh containers and the OBJ loader adapter.
//!
//! A [`Mesh`] owns three parallel arrays, indexed identically: one
//! model-space triangle, one face normal, and one triple of per-vertex
//! normals per triangle. The arrays live behind a single `Arc` so a draw
//! call can hand the worker thread a view of a triangle range without
//! copying, and everything is freed together when the last view drops.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::colors::Rgba8;
use crate::math::texcoord::TexCoord;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::texture::Texture;

/// A model-space triangle: three homogeneous positions, three texture
/// coordinates, and a face color used by the solid fill.
#[derive(Clone, Copy, Debug)]
pub struct MeshTriangle {
    pub positions: [Vec4; 3],
    pub uvs: [TexCoord; 3],
    pub color: Rgba8,
}

/// The backing arrays of a mesh. Immutable once built.
pub struct MeshData {
    pub triangles: Vec<MeshTriangle>,
    pub face_normals: Vec<Vec3>,
    pub vertex_normals: Vec<[Vec3; 3]>,
}

/// Errors from mesh construction and loading.
#[derive(Debug)]
pub enum LoadError {
    /// The OBJ parser rejected the file.
    Obj(tobj::LoadError),
    /// The file parsed but contained no triangles.
    Empty,
    /// The parallel arrays have mismatched lengths.
    ParallelArrayMismatch {
        triangles: usize,
        face_normals: usize,
        vertex_normals: usize,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Obj(e) => write!(f, "failed to parse OBJ: {e}"),
            LoadError::Empty => write!(f, "mesh contains no triangles"),
            LoadError::ParallelArrayMismatch {
                triangles,
                face_normals,
                vertex_normals,
            } => write!(
                f,
                "parallel arrays differ: {triangles} triangles, \
                 {face_normals} face normals, {vertex_normals} vertex normal triples"
            ),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<tobj::LoadError> for LoadError {
    fn from(e: tobj::LoadError) -> Self {
        LoadError::Obj(e)
    }
}

/// A triangle mesh with derived normals and an optional bound texture.
pub struct Mesh {
    data: Arc<MeshData>,
    texture: Option<Arc<Texture>>,
}

impl Mesh {
    /// Build a mesh from externally-produced parallel arrays.
    ///
    /// The three arrays must have the same length; the geometry loader
    /// contract is one face normal and one vertex-normal triple per triangle.
    pub fn new(
        triangles: Vec<MeshTriangle>,
        face_normals: Vec<Vec3>,
        vertex_normals: Vec<[Vec3; 3]>,
    ) -> Result<Self, LoadError> {
        if triangles.len() != face_normals.len() || triangles.len() != vertex_normals.len() {
            return Err(LoadError::ParallelArrayMismatch {
                triangles: triangles.len(),
                face_normals: face_normals.len(),
                vertex_normals: vertex_normals.len(),
            });
        }
        Ok(Self {
            data: Arc::new(MeshData {
                triangles,
                face_normals,
                vertex_normals,
            }),
            texture: None,
        })
    }

    /// Load a mesh from an OBJ file, deriving face and vertex normals.
    ///
    /// Faces are triangulated by the loader. Face normals are the normalized
    /// cross product of the triangle edges; vertex normals accumulate the
    /// face normals of every face sharing the vertex index and are
    /// normalized at the end. Meshes without texture coordinates get
    /// zeroed UVs.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let (models, _) = tobj::load_obj(
            path.as_ref(),
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )?;

        let mut corners: Vec<[(Vec4, TexCoord); 3]> = Vec::new();
        let mut indices: Vec<[usize; 3]> = Vec::new();
        let mut index_base = 0usize;

        for model in &models {
            let mesh = &model.mesh;
            let vertex = |i: u32| {
                let i = i as usize;
                let pos = Vec4::point(
                    mesh.positions[3 * i],
                    mesh.positions[3 * i + 1],
                    mesh.positions[3 * i + 2],
                );
                let uv = if mesh.texcoords.is_empty() {
                    TexCoord::ZERO
                } else {
                    TexCoord::new(mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1])
                };
                (pos, uv)
            };
            for face in mesh.indices.chunks_exact(3) {
                corners.push([vertex(face[0]), vertex(face[1]), vertex(face[2])]);
                indices.push([
                    index_base + face[0] as usize,
                    index_base + face[1] as usize,
                    index_base + face[2] as usize,
                ]);
            }
            index_base += mesh.positions.len() / 3;
        }

        if corners.is_empty() {
            return Err(LoadError::Empty);
        }
        log::info!("loaded mesh with {} triangles", corners.len());
        Self::from_corners(corners, indices, index_base)
    }

    /// A unit cube with per-face UVs, used by the demo and benchmarks.
    pub fn cube() -> Self {
        const V: [Vec3; 8] = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
        ];
        // Each face as two triangles sharing the quad's diagonal, wound so
        // the edge cross product points out of the cube.
        const QUADS: [[usize; 4]; 6] = [
            [0, 1, 2, 3], // front
            [3, 2, 4, 5], // right
            [5, 4, 6, 7], // back
            [7, 6, 1, 0], // left
            [1, 6, 4, 2], // top
            [5, 7, 0, 3], // bottom
        ];

        let mut corners = Vec::with_capacity(12);
        let mut indices = Vec::with_capacity(12);
        for quad in QUADS {
            let uv = [
                TexCoord::new(0.0, 0.0),
                TexCoord::new(0.0, 1.0),
                TexCoord::new(1.0, 1.0),
                TexCoord::new(1.0, 0.0),
            ];
            let p = |i: usize| Vec4::from_vec3(V[quad[i]], 1.0);
            corners.push([(p(0), uv[0]), (p(1), uv[1]), (p(2), uv[2])]);
            indices.push([quad[0], quad[1], quad[2]]);
            corners.push([(p(0), uv[0]), (p(2), uv[2]), (p(3), uv[3])]);
            indices.push([quad[0], quad[2], quad[3]]);
        }

        // Cube construction cannot produce mismatched arrays.
        Self::from_corners(corners, indices, V.len()).expect("cube arrays are parallel")
    }

    fn from_corners(
        corners: Vec<[(Vec4, TexCoord); 3]>,
        indices: Vec<[usize; 3]>,
        vertex_count: usize,
    ) -> Result<Self, LoadError> {
        let mut accumulated = vec![Vec3::ZERO; vertex_count];
        let mut face_normals = Vec::with_capacity(corners.len());

        for (tri, idx) in corners.iter().zip(&indices) {
            let a = tri[0].0.to_vec3();
            let edge1 = tri[1].0.to_vec3() - a;
            let edge2 = tri[2].0.to_vec3() - a;
            let normal = edge1.cross(edge2).normalize();
            face_normals.push(normal);
            for &i in idx {
                accumulated[i] = accumulated[i] + normal;
            }
        }

        let smoothed: Vec<Vec3> = accumulated.iter().map(|n| n.normalize()).collect();
        let vertex_normals: Vec<[Vec3; 3]> = indices
            .iter()
            .map(|idx| [smoothed[idx[0]], smoothed[idx[1]], smoothed[idx[2]]])
            .collect();

        let triangles: Vec<MeshTriangle> = corners
            .into_iter()
            .map(|tri| MeshTriangle {
                positions: [tri[0].0, tri[1].0, tri[2].0],
                uvs: [tri[0].1, tri[1].1, tri[2].1],
                color: Rgba8::new(250, 250, 250),
            })
            .collect();

        Self::new(triangles, face_normals, vertex_normals)
    }

    /// Bind a texture for the textured fill mode. The mesh only shares the
    /// texture; several meshes may bind the same one.
    pub fn bind_texture(&mut self, texture: Arc<Texture>) {
        self.texture = Some(texture);
    }

    pub fn texture(&self) -> Option<&Arc<Texture>> {
        self.texture.as_ref()
    }

    pub fn data(&self) -> &Arc<MeshData> {
        &self.data
    }

    pub fn num_triangles(&self) -> usize {
        self.data.triangles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cube_has_twelve_triangles_and_unit_face_normals() {
        let cube = Mesh::cube();
        assert_eq!(cube.num_triangles(), 12);
        for normal in &cube.data().face_normals {
            assert_relative_eq!(normal.magnitude(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn cube_face_normals_point_outward() {
        let cube = Mesh::cube();
        let data = cube.data();
        for (tri, normal) in data.triangles.iter().zip(&data.face_normals) {
            let centroid = (tri.positions[0].to_vec3()
                + tri.positions[1].to_vec3()
                + tri.positions[2].to_vec3())
                / 3.0;
            // For a cube centered at the origin, an outward normal points
            // the same way as the face centroid.
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn new_rejects_mismatched_arrays() {
        let tri = MeshTriangle {
            positions: [Vec4::point(0.0, 0.0, 0.0); 3],
            uvs: [TexCoord::ZERO; 3],
            color: Rgba8::WHITE,
        };
        let result = Mesh::new(vec![tri], vec![], vec![]);
        assert!(matches!(
            result,
            Err(LoadError::ParallelArrayMismatch { triangles: 1, .. })
        ));
    }

    #[test]
    fn cube_vertex_normals_are_normalized_accumulations() {
        let cube = Mesh::cube();
        for triple in &cube.data().vertex_normals {
            for n in triple {
                assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-5);
            }
        }
    }
}
