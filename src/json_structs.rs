/*

    Declare data structs needed to parse JSON job files.

    - DataField: To be used in VertexData and Faces
    - SingleOrVec
    - VertexData: Type alias of DataField<Vector3>
    - PlyMesh: Raw PLY layout read through serde-ply

    @date: 13 Oct, 2025
    @author: Bartu
*/

use serde::{Deserialize, de::{Deserializer}};
use std::ops::Index;

use crate::json_parser::{deser_vertex_data, deser_usize_vec};
use crate::numeric::{Vector3};

// To be used for VertexData and Faces in JSON files
#[derive(Debug, Clone, Default)]
pub struct DataField<T> {

    pub(crate) _data: Vec<T>,
    pub(crate) _type: String,
    pub(crate) _ply_file: String,
}

impl<T> DataField<T> {
    pub fn new(data: Vec<T>, _type: &str) -> Self {
        Self {
            _data: data,
            _type: _type.to_string(),
            _ply_file: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self._data.is_empty()
    }
}

impl<T> Index<usize> for DataField<T> {
    // To access data through indexing like
    // let some_field = DataField::default()
    // some_field[i] = ...
    // instead of some_field._data[i]
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self._data[index]
    }
}

impl<'de> Deserialize<'de> for DataField<Vector3> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            #[serde(rename = "_data", default, deserialize_with = "deser_vertex_data")]
            _data: Vec<Vector3>,
            #[serde(rename = "_type", default)]
            _type: String,
            #[serde(rename = "_plyFile", default)]
            _ply_file: String,
        }

        let helper = Helper::deserialize(deserializer)?;
        Ok(DataField {
            _data: helper._data,
            _type: helper._type,
            _ply_file: helper._ply_file,
        })
    }
}

impl<'de> Deserialize<'de> for DataField<usize> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            #[serde(rename = "_data", default, deserialize_with = "deser_usize_vec")]
            _data: Vec<usize>,
            #[serde(rename = "_type", default)]
            _type: String,
            #[serde(rename = "_plyFile", default)]
            _ply_file: String,
        }

        let helper = Helper::deserialize(deserializer)?;
        Ok(DataField {
            _data: helper._data,
            _type: helper._type,
            _ply_file: helper._ply_file,
        })
    }
}


// To handle JSON file having a single <object>
// or an array of <object>s
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum SingleOrVec<T> {
    Empty,
    Single(T),
    Multiple(Vec<T>),
}

impl<T: Clone> SingleOrVec<T>  {
    pub fn all(&self) -> Vec<T> {
        match &self {
            SingleOrVec::Empty => vec![],
            SingleOrVec::Single(t) => vec![t.clone()],
            SingleOrVec::Multiple(vec) => vec.clone(),
        }
    }
}

impl<T> Default for SingleOrVec<T> {
    fn default() -> Self {
        SingleOrVec::Empty
    }
}


#[derive(Deserialize)]
pub struct PlyVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Deserialize)]
pub struct PlyFace {
    pub vertex_indices: Vec<usize>,
}

#[derive(Deserialize)]
pub struct PlyMesh {
    pub vertex: Vec<PlyVertex>,
    pub face: Option<Vec<PlyFace>>,
}


pub type VertexData = DataField<Vector3>;

pub type FaceType = DataField<usize>;
