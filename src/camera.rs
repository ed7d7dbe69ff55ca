/*

    Camera used to describe the view volume that bounding
    volumes are culled against.

    Only the look-at form is supported: the camera sits at
    Position and looks towards GazePoint.

    @date: Oct, 2025
    @author: bartu
*/


use crate::prelude::*;
use crate::plane::Plane;

#[derive(Debug, Deserialize, Clone)]
#[derive(SmartDefault)]
#[serde(default)]
pub struct Camera {
    #[serde(rename = "Position", deserialize_with = "deser_vec3")]
    position: Vector3,

    #[serde(rename = "GazePoint", deserialize_with = "deser_vec3")]
    #[default(_code = "Vector3::NEG_Z")]
    gaze_point: Vector3,

    #[serde(rename = "Up", deserialize_with = "deser_vec3")]
    #[default(_code = "Vector3::Y")]
    up: Vector3,

    #[serde(rename = "FovY", deserialize_with = "deser_float")]
    #[default = 60.0]
    fovy: Float, // In degrees

    #[serde(rename = "Aspect", deserialize_with = "deser_float")]
    #[default = 1.0]
    aspect: Float,

    #[serde(rename = "NearDistance", deserialize_with = "deser_float")]
    #[default = 0.1]
    near_distance: Float,

    #[serde(rename = "FarDistance", deserialize_with = "deser_float")]
    #[default = 1000.0]
    far_distance: Float,
}

impl Camera {
    pub fn new(position: Vector3, gaze_point: Vector3, up: Vector3, fovy: Float, aspect: Float, near_distance: Float, far_distance: Float) -> Self {
        Self {
            position,
            gaze_point,
            up,
            fovy,
            aspect,
            near_distance,
            far_distance,
        }
    }

    pub fn view_proj(&self) -> Matrix4 {
        debug_assert!(self.near_distance > 0.0 && self.far_distance > self.near_distance);
        let proj = Matrix4::perspective_rh(self.fovy.to_radians(), self.aspect, self.near_distance, self.far_distance);
        let view = Matrix4::look_at_rh(self.position, self.gaze_point, self.up);
        proj * view
    }

    /// Six planes of the view volume, normals pointing inside
    pub fn frustum_planes(&self) -> [Plane; 6] {
        Plane::frustum_from_view_proj(&self.view_proj())
    }
}
