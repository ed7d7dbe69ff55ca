/*

    Declare a bounding volume job: fit settings, vertex data,
    meshes and the view volume to cull against. Running a job
    fits every mesh (in parallel), picks the volume to use per
    mesh and reports visibility and coarse collisions.

    Expected JSON layout:
    {
      "Job": {
        "Settings": { "FitMargin": "0.01", "FitEpsilon": "0.001" },
        "VertexData": { "_data": "x y z x y z ...", "_type": "xyz" },
        "Meshes": { "Mesh": [ { "_id": "1", "Faces": { "_data": "1 2 3 ..." } } ] },
        "ViewVolume": {
            "Plane": [ { "Normal": "1 0 0", "Point": "-5 0 0" } ],
            "Camera": { "Position": "0 0 10", "GazePoint": "0 0 0" }
        }
      }
    }

    @date: 14 Nov, 2025
    @author: Bartu
*/

use std::{error::Error, fs::File, io::BufWriter, path::Path, time::Instant};

use crate::prelude::*;
use crate::aabb::{AxisAlignedBox, BBoxable};
use crate::camera::Camera;
use crate::fitter::{self, FitSettings};
use crate::json_structs::{SingleOrVec, VertexData};
use crate::mesh::{Mesh, MeshData};
use crate::obb::{BoundingVolume, OrientedBox};
use crate::plane::Plane;


#[derive(Debug, Deserialize)]
pub struct RootJob {
    #[serde(rename = "Job")]
    pub job: Job,
}

#[derive(Debug, Deserialize, SmartDefault)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Job {
    pub settings: FitSettings,
    pub vertex_data: VertexData,
    pub meshes: Meshes,
    pub view_volume: ViewVolume,
}

#[derive(Debug, Deserialize, Default)]
pub struct Meshes {
    #[serde(rename = "Mesh", default)]
    pub mesh: SingleOrVec<Mesh>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ViewVolume {
    #[serde(rename = "Plane")]
    pub planes: SingleOrVec<PlaneJSON>,

    #[serde(rename = "Camera")]
    pub camera: Option<Camera>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaneJSON {
    #[serde(rename = "Normal", deserialize_with = "deser_vec3")]
    pub normal: Vector3,
    #[serde(rename = "Point", deserialize_with = "deser_vec3")]
    pub point: Vector3,
}

impl ViewVolume {
    /// All culling planes, explicit planes first then the camera frustum.
    /// Empty when nothing is configured, which culls nothing.
    pub fn planes(&self) -> Vec<Plane> {
        let mut planes: Vec<Plane> = self
            .planes
            .all()
            .into_iter()
            .filter_map(|p| match p.normal.try_normalize() {
                Some(n) => Some(Plane::new(n, p.point)),
                None => {
                    warn!("Skipping view volume plane with zero normal through {:?}", p.point);
                    None
                }
            })
            .collect();
        if let Some(cam) = &self.camera {
            planes.extend_from_slice(&cam.frustum_planes());
        }
        planes
    }
}


#[derive(Debug, Clone, Serialize)]
pub struct MeshReport {
    pub id: usize,
    pub point_count: usize,
    pub face_count: usize,
    pub aabb: AxisAlignedBox,
    pub fit: fitter::FitResult,
    /// Volume handed to consumers, OBB if it is valid and AABB otherwise
    pub volume: BoundingVolume,
    pub visible: bool,
    pub included: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub settings: FitSettings,
    pub meshes: Vec<MeshReport>,
    /// Pairs of mesh ids whose AABBs pass the collision test
    pub collisions: Vec<[usize; 2]>,
    pub combined_aabb: Option<AxisAlignedBox>,
    /// Merge of all valid mesh OBBs
    pub combined_obb: Option<OrientedBox>,
}

impl JobReport {
    pub fn save_json(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        info!("Saved report to {:?}", path);
        Ok(())
    }
}


impl Job {

    /// Load vertices of every mesh. `json_dir` is the folder PLY paths are relative to.
    pub fn load_meshes(&self, json_dir: &Path) -> Result<Vec<MeshData>, Box<dyn Error>> {
        let span = tracing::span!(tracing::Level::INFO, "load_meshes");
        let _enter = span.enter();

        let mut loaded = Vec::new();
        for mesh in self.meshes.mesh.all().iter() {
            let data = mesh.load(&self.vertex_data, json_dir)?;
            if data.points.is_empty() {
                warn!("Mesh {} has no vertices, skipping...", data.id);
                continue;
            }
            loaded.push(data);
        }
        info!(">> Loaded {} meshes.", loaded.len());
        Ok(loaded)
    }

    pub fn run(&self, json_dir: &Path) -> Result<JobReport, Box<dyn Error>> {
        let meshes = self.load_meshes(json_dir)?;

        let span = tracing::span!(tracing::Level::INFO, "fit_meshes");
        let _enter = span.enter();
        let start = Instant::now();

        // --- Rayon Multithreading ---
        let point_sets: Vec<&[Vector3]> = meshes.iter().map(|m| m.points.as_slice()).collect();
        let fits = fitter::fit_many(&point_sets, &self.settings);
        // -----------------------------
        info!("Fitting {} meshes took: {:?}", meshes.len(), start.elapsed());

        let planes = self.view_volume.planes();
        let mut reports = Vec::with_capacity(meshes.len());
        for (mesh, fit) in meshes.iter().zip(fits.into_iter()) {
            let aabb = mesh.get_bbox();
            let fit = match mesh.color {
                Some(color) => fitter::FitResult { obb: fit.obb.with_color(color), ..fit },
                None => fit,
            };
            if !fit.is_valid {
                warn!("Mesh {}: oriented box is invalid, falling back to AABB", mesh.id);
            }
            let volume = BoundingVolume::from_fit(&fit, aabb);
            reports.push(MeshReport {
                id: mesh.id,
                point_count: mesh.points.len(),
                face_count: mesh.face_count,
                aabb,
                fit,
                volume,
                visible: volume.visible(&planes),
                included: volume.included(&planes),
            });
        }

        let collisions = collision_pairs(&reports);
        let combined_aabb = reports.iter().map(|r| r.aabb).reduce(|a, b| a + b);
        let combined_obb = reports
            .iter()
            .filter(|r| r.fit.is_valid)
            .map(|r| r.fit.obb)
            .reduce(|a, b| a + b);

        let visible = reports.iter().filter(|r| r.visible).count();
        let oriented = reports.iter().filter(|r| r.volume.is_oriented()).count();
        info!(
            ">> {} meshes: {} use oriented boxes, {} visible, {} colliding pairs.",
            reports.len(), oriented, visible, collisions.len()
        );

        Ok(JobReport {
            settings: self.settings,
            meshes: reports,
            collisions,
            combined_aabb,
            combined_obb,
        })
    }
}

/// Coarse collision pairs between mesh AABBs, each unordered pair once
fn collision_pairs(reports: &[MeshReport]) -> Vec<[usize; 2]> {
    let mut pairs = Vec::new();
    for (i, a) in reports.iter().enumerate() {
        for b in reports.iter().skip(i + 1) {
            if a.aabb.collision_test(&b.aabb) {
                debug!("Meshes {} and {} may collide", a.id, b.id);
                pairs.push([a.id, b.id]);
            }
        }
    }
    pairs
}
