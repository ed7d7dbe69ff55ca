
pub mod numeric;
pub mod interval;
pub mod plane;
pub mod aabb;
pub mod obb;
pub mod fitter;
pub mod mesh;
pub mod camera;
pub mod job;
pub mod json_structs;
pub mod json_parser;

pub mod prelude;
