/*

    Meshes whose bounding volumes are fitted.

    A mesh either indexes the job's global vertex data through its
    faces (indices start from 1), or loads its vertices from a PLY
    file given relative to the JSON file.

@date: Oct-Nov 2025
@author: Bartu

*/

use std::{error::Error, fs::File, io::BufReader, path::Path};

use crate::prelude::*;
use crate::aabb::{AxisAlignedBox, BBoxable};
use crate::json_structs::{FaceType, PlyMesh, VertexData};


#[derive(Debug, Deserialize, Clone)]
#[derive(SmartDefault)]
#[serde(default)]
pub struct Mesh {
    #[serde(rename = "_id", deserialize_with = "deser_usize")]
    pub _id: usize,
    #[serde(rename = "Faces")]
    pub faces: FaceType,
    #[serde(rename = "Color", deserialize_with = "deser_opt_vec3")]
    pub color: Option<Vector3>, // Debug color, boxes use their own default if None
}

/// Vertices of a single mesh, ready to be fitted
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub id: usize,
    pub points: Vec<Vector3>,
    pub face_count: usize,
    pub color: Option<Vector3>,
}

impl Mesh {

    /// Gather the vertices of this mesh either from its PLY file or
    /// from the global vertex data indexed by its faces.
    pub fn load(&self, verts: &VertexData, json_dir: &Path) -> Result<MeshData, Box<dyn Error>> {
        if !self.faces._ply_file.is_empty() {
            return self.load_ply(json_dir);
        }

        let points = self.referenced_vertices(verts)?;
        debug!("Mesh {} references {} distinct vertices", self._id, points.len());
        Ok(MeshData {
            id: self._id,
            points,
            face_count: self.faces._data.len() / 3,
            color: self.color,
        })
    }

    fn load_ply(&self, json_dir: &Path) -> Result<MeshData, Box<dyn Error>> {
        let ply_path = json_dir.join(&self.faces._ply_file);
        if !ply_path.exists() {
            error!("PLY file NOT found at: {:?}", ply_path);
        }
        debug!("Loading mesh {} from PLY file path: {:?}", self._id, ply_path);

        let file = File::open(&ply_path)?;
        let reader = BufReader::new(file);
        let plymesh: PlyMesh = serde_ply::from_reader(reader)?;

        let points: Vec<Vector3> = plymesh
            .vertex
            .iter()
            .map(|v| Vector3::new(v.x as Float, v.y as Float, v.z as Float))
            .collect();
        let face_count = match &plymesh.face {
            Some(faces) => faces.len(),
            None => {
                warn!("PLY mesh {} has no face data!", self._id);
                0
            }
        };

        Ok(MeshData {
            id: self._id,
            points,
            face_count,
            color: self.color,
        })
    }

    /// Distinct vertices referenced by the faces, in order of first reference
    fn referenced_vertices(&self, verts: &VertexData) -> Result<Vec<Vector3>, Box<dyn Error>> {
        let mut seen = vec![false; verts._data.len()];
        let mut points = Vec::new();
        for &idx in self.faces._data.iter() {
            // WARNING: Indices start from 1 in job files
            if idx == 0 || idx > verts._data.len() {
                return Err(format!(
                    "Mesh {} refers to vertex {} but there are {} vertices (indices start from 1)",
                    self._id, idx, verts._data.len()
                ).into());
            }
            if !seen[idx - 1] {
                seen[idx - 1] = true;
                points.push(verts[idx - 1]);
            }
        }
        Ok(points)
    }
}

impl BBoxable for MeshData {
    fn get_bbox(&self) -> AxisAlignedBox {
        let bbox = AxisAlignedBox::from_points(&self.points).unwrap_or_else(|| {
            warn!("Mesh {} has no vertices, using an empty box at the origin", self.id);
            AxisAlignedBox::new(Vector3::ZERO, Vector3::ZERO)
        });
        match self.color {
            Some(color) => bbox.with_color(color),
            None => bbox,
        }
    }
}
