//! Target geometry document types and their wire shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use packport_assets::FaceName;
use packport_core::AssetReference;

pub const FORMAT_VERSION: &str = "1.12.0";

pub const ROOT_BONE: &str = "root";

/// Pivot of the single root bone, at the bottom center of the block space
pub const ROOT_PIVOT: [f32; 3] = [0.0, 24.0, 0.0];

/// Per-face texture rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceUv {
    #[serde(rename = "uv")]
    pub origin: [f32; 2],
    #[serde(rename = "uv_size")]
    pub size: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetCuboid {
    pub origin: [f32; 3],
    /// `to - from` per axis; zero and negative extents are kept
    pub size: [f32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub uv: BTreeMap<FaceName, FaceUv>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    pub pivot: [f32; 3],
    pub cubes: Vec<TargetCuboid>,
}

/// A converted geometry: one identifier, one canvas, one root bone.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDocument {
    pub identifier: String,
    pub texture_width: u32,
    pub texture_height: u32,
    pub bones: Vec<Bone>,
}

#[derive(Serialize, Deserialize)]
struct GeometryFile {
    format_version: String,
    geometry: Vec<GeometryEntry>,
}

#[derive(Serialize, Deserialize)]
struct GeometryEntry {
    description: Description,
    bones: Vec<Bone>,
}

#[derive(Serialize, Deserialize)]
struct Description {
    identifier: String,
    texture_width: u32,
    texture_height: u32,
}

impl GeometryDocument {
    /// All cuboids across bones
    pub fn cuboids(&self) -> impl Iterator<Item = &TargetCuboid> {
        self.bones.iter().flat_map(|bone| bone.cubes.iter())
    }

    fn to_file(&self) -> GeometryFile {
        GeometryFile {
            format_version: FORMAT_VERSION.to_string(),
            geometry: vec![GeometryEntry {
                description: Description {
                    identifier: self.identifier.clone(),
                    texture_width: self.texture_width,
                    texture_height: self.texture_height,
                },
                bones: self.bones.clone(),
            }],
        }
    }

    /// Serialize in the geometry file shape
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_file())
    }

    pub fn to_json_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.to_file())
    }

    /// Read the first geometry of a geometry file
    pub fn from_json_str(text: &str) -> serde_json::Result<Option<Self>> {
        let file: GeometryFile = serde_json::from_str(text)?;
        Ok(file.geometry.into_iter().next().map(|entry| Self {
            identifier: entry.description.identifier,
            texture_width: entry.description.texture_width,
            texture_height: entry.description.texture_height,
            bones: entry.bones,
        }))
    }
}

/// `geometry.{namespace}.{model path with dots}`, e.g.
/// `geometry.acme.item.ruby_sword`
pub fn geometry_identifier(model: &AssetReference) -> String {
    format!(
        "geometry.{}.{}",
        model.namespace(),
        model.stem_path().replace('/', ".")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use packport_core::AssetKind;

    fn sample() -> GeometryDocument {
        let mut uv = BTreeMap::new();
        uv.insert(
            FaceName::North,
            FaceUv {
                origin: [8.0, 0.0],
                size: [8.0, 8.0],
            },
        );
        GeometryDocument {
            identifier: "geometry.acme.item.ruby".into(),
            texture_width: 16,
            texture_height: 16,
            bones: vec![Bone {
                name: ROOT_BONE.into(),
                pivot: ROOT_PIVOT,
                cubes: vec![TargetCuboid {
                    origin: [-8.0, 8.0, -8.0],
                    size: [16.0, 16.0, 16.0],
                    pivot: None,
                    rotation: None,
                    uv,
                }],
            }],
        }
    }

    #[test]
    fn test_wire_shape() {
        let value = sample().to_json_value().unwrap();
        assert_eq!(value["format_version"], "1.12.0");

        let geometry = &value["geometry"][0];
        assert_eq!(geometry["description"]["identifier"], "geometry.acme.item.ruby");
        assert_eq!(geometry["description"]["texture_width"], 16);

        let cube = &geometry["bones"][0]["cubes"][0];
        assert_eq!(geometry["bones"][0]["name"], "root");
        assert!(cube.get("pivot").is_none());
        assert!(cube.get("rotation").is_none());
        assert_eq!(cube["uv"]["north"]["uv"][0], 8.0);
        assert_eq!(cube["uv"]["north"]["uv_size"][1], 8.0);
    }

    #[test]
    fn test_json_reads_back() {
        let document = sample();
        let text = document.to_json_pretty().unwrap();
        assert_eq!(GeometryDocument::from_json_str(&text).unwrap(), Some(document));
    }

    #[test]
    fn test_geometry_identifier() {
        let model = AssetReference::parse("acme:item/tools/ruby_sword", None, AssetKind::Model);
        assert_eq!(geometry_identifier(&model), "geometry.acme.item.tools.ruby_sword");
    }
}
