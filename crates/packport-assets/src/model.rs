//! Source model documents.
//!
//! Models are block-space (0..16) cuboid lists with a texture table and an
//! optional parent. Elements without usable bounds are kept aside as
//! [`SkippedElement`]s so conversion can continue without them; a bad face
//! `uv` or rotation only drops that field and is listed in
//! [`Element::dropped`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use packport_core::DocNode;

use crate::error::AssetError;

/// One of the six cuboid faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceName {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl FaceName {
    pub const ALL: [FaceName; 6] = [
        FaceName::North,
        FaceName::East,
        FaceName::South,
        FaceName::West,
        FaceName::Up,
        FaceName::Down,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "north" => Some(FaceName::North),
            "east" => Some(FaceName::East),
            "south" => Some(FaceName::South),
            "west" => Some(FaceName::West),
            "up" => Some(FaceName::Up),
            "down" => Some(FaceName::Down),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaceName::North => "north",
            FaceName::East => "east",
            FaceName::South => "south",
            FaceName::West => "west",
            FaceName::Up => "up",
            FaceName::Down => "down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            "z" => Some(Axis::Z),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Single-axis element rotation around `origin`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRotation {
    pub axis: Axis,
    pub angle: f32,
    pub origin: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Face {
    /// `(u1, v1, u2, v2)`; `None` means derive from the element bounds
    pub uv: Option<[f32; 4]>,
    /// Slot reference such as `#layer0`
    pub texture: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub from: [f32; 3],
    pub to: [f32; 3],
    pub rotation: Option<ElementRotation>,
    pub faces: BTreeMap<FaceName, Face>,
    /// Optional fields that were malformed and ignored
    pub dropped: Vec<String>,
}

/// An element that could not be read, with its position in the source list
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedElement {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelDocument {
    pub parent: Option<String>,
    /// Slot name (lowercased) to raw value: a path, `ns:path`, or `#alias`
    pub textures: BTreeMap<String, String>,
    pub elements: Vec<Element>,
    pub skipped: Vec<SkippedElement>,
}

impl ModelDocument {
    /// Read and parse a model file.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let bytes = fs::read(path).map_err(|e| AssetError::Io(path.to_path_buf(), e))?;
        let node = DocNode::from_json_slice(&bytes)
            .map_err(|e| AssetError::MalformedDocument(path.to_path_buf(), e.to_string()))?;
        Self::from_node(&node)
            .map_err(|reason| AssetError::MalformedDocument(path.to_path_buf(), reason))
    }

    /// Parse model JSON held in memory. `origin` only labels errors.
    pub fn parse_str(text: &str, origin: &Path) -> Result<Self, AssetError> {
        let node = DocNode::from_json_str(text)
            .map_err(|e| AssetError::MalformedDocument(origin.to_path_buf(), e.to_string()))?;
        Self::from_node(&node)
            .map_err(|reason| AssetError::MalformedDocument(origin.to_path_buf(), reason))
    }

    /// Build a document from a parsed tree. Fails only when the root or a
    /// top-level section has the wrong shape; bad elements are skipped.
    pub fn from_node(node: &DocNode) -> Result<Self, String> {
        if node.as_mapping().is_none() {
            return Err(format!("expected a mapping at the root, found {}", node.kind_name()));
        }

        let parent = match node.get("parent") {
            None | Some(DocNode::Null) => None,
            Some(DocNode::String(parent)) => Some(parent.trim().to_string()),
            Some(other) => {
                return Err(format!("'parent' must be a string, found {}", other.kind_name()))
            }
        };

        let mut textures = BTreeMap::new();
        match node.get("textures") {
            None | Some(DocNode::Null) => {}
            Some(DocNode::Mapping(table)) => {
                for (slot, value) in table {
                    match value.as_str() {
                        Some(value) => {
                            // Case-insensitive slots: the first spelling wins.
                            textures
                                .entry(slot.to_ascii_lowercase())
                                .or_insert_with(|| value.trim().to_string());
                        }
                        None => debug!("Ignoring non-string texture slot '{}'", slot),
                    }
                }
            }
            Some(other) => {
                return Err(format!("'textures' must be a mapping, found {}", other.kind_name()))
            }
        }

        let mut elements = Vec::new();
        let mut skipped = Vec::new();
        match node.get("elements") {
            None | Some(DocNode::Null) => {}
            Some(DocNode::Sequence(items)) => {
                for (index, item) in items.iter().enumerate() {
                    match Element::from_node(index, item) {
                        Ok(element) => elements.push(element),
                        Err(AssetError::UnsupportedShape { index, reason }) => {
                            skipped.push(SkippedElement { index, reason })
                        }
                        Err(other) => skipped.push(SkippedElement {
                            index,
                            reason: other.to_string(),
                        }),
                    }
                }
            }
            Some(other) => {
                return Err(format!("'elements' must be a sequence, found {}", other.kind_name()))
            }
        }

        Ok(Self {
            parent,
            textures,
            elements,
            skipped,
        })
    }
}

impl Element {
    /// Read one element; `index` is its position in the source list.
    pub fn from_node(index: usize, node: &DocNode) -> Result<Self, AssetError> {
        let unsupported = |reason: String| AssetError::UnsupportedShape { index, reason };

        if node.as_mapping().is_none() {
            return Err(unsupported(format!("expected a mapping, found {}", node.kind_name())));
        }

        let from = node
            .get("from")
            .and_then(DocNode::as_f32_array::<3>)
            .ok_or_else(|| unsupported("missing or malformed 'from'".into()))?;
        let to = node
            .get("to")
            .and_then(DocNode::as_f32_array::<3>)
            .ok_or_else(|| unsupported("missing or malformed 'to'".into()))?;

        let mut dropped = Vec::new();
        let rotation = match node.get("rotation") {
            None | Some(DocNode::Null) => None,
            Some(rotation) => match parse_rotation(rotation) {
                Ok(rotation) => Some(rotation),
                Err(reason) => {
                    dropped.push(format!("element {index}: {reason}; rotation ignored"));
                    None
                }
            },
        };

        let mut faces = BTreeMap::new();
        if let Some(table) = node.get("faces").and_then(DocNode::as_mapping) {
            for (name, face) in table {
                let Some(face_name) = FaceName::parse(name) else {
                    debug!("Ignoring unknown face '{}' on element {}", name, index);
                    continue;
                };
                let uv = match face.get("uv") {
                    None | Some(DocNode::Null) => None,
                    Some(uv) => {
                        let rect = uv.as_f32_array::<4>();
                        if rect.is_none() {
                            dropped.push(format!(
                                "element {index}: malformed uv on face '{name}'; default uv used"
                            ));
                        }
                        rect
                    }
                };
                let texture = face
                    .get("texture")
                    .and_then(DocNode::as_str)
                    .map(|t| t.trim().to_string());
                faces.insert(face_name, Face { uv, texture });
            }
        }

        Ok(Self {
            from,
            to,
            rotation,
            faces,
            dropped,
        })
    }
}

fn parse_rotation(node: &DocNode) -> Result<ElementRotation, String> {
    let axis = node
        .get("axis")
        .and_then(DocNode::as_str)
        .and_then(Axis::parse)
        .ok_or("rotation has no valid 'axis'")?;
    let angle = node
        .get("angle")
        .and_then(DocNode::as_f32)
        .ok_or("rotation has no numeric 'angle'")?;
    let origin = match node.get("origin") {
        None => [8.0, 8.0, 8.0],
        Some(origin) => origin
            .as_f32_array::<3>()
            .ok_or("rotation 'origin' is not three numbers")?,
    };
    Ok(ElementRotation {
        axis,
        angle,
        origin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ModelDocument {
        ModelDocument::parse_str(text, Path::new("test.json")).unwrap()
    }

    #[test]
    fn test_parse_full_model() {
        let model = parse(
            r##"{
                "parent": "item/handheld",
                "textures": {"Layer0": "acme:item/ruby", "particle": "#layer0"},
                "elements": [{
                    "from": [0, 0, 0],
                    "to": [16, 2, 16],
                    "rotation": {"axis": "y", "angle": 22.5, "origin": [8, 1, 8]},
                    "faces": {
                        "north": {"uv": [0, 0, 16, 2], "texture": "#layer0"},
                        "up": {"texture": "#layer0"}
                    }
                }]
            }"##,
        );

        assert_eq!(model.parent.as_deref(), Some("item/handheld"));
        assert_eq!(model.textures.get("layer0").map(String::as_str), Some("acme:item/ruby"));
        assert_eq!(model.elements.len(), 1);

        let element = &model.elements[0];
        assert_eq!(element.to, [16.0, 2.0, 16.0]);
        let rotation = element.rotation.unwrap();
        assert_eq!(rotation.axis, Axis::Y);
        assert_eq!(rotation.angle, 22.5);
        assert_eq!(element.faces[&FaceName::North].uv, Some([0.0, 0.0, 16.0, 2.0]));
        assert_eq!(element.faces[&FaceName::Up].uv, None);
    }

    #[test]
    fn test_bad_elements_are_skipped() {
        let model = parse(
            r#"{"elements": [
                {"from": [0, 0, 0]},
                {"from": [0, 0, 0], "to": [1, 1, 1]},
                {"from": [0, 0], "to": [1, 1, 1]},
                {"to": [1, 1, 1], "from": "origin"}
            ]}"#,
        );
        assert_eq!(model.elements.len(), 1);
        let indices: Vec<usize> = model.skipped.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }

    #[test]
    fn test_bad_optional_fields_keep_element() {
        let model = parse(
            r#"{"elements": [
                {"from": [0, 0, 0], "to": [16, 16, 16],
                 "faces": {"north": {"uv": [0, 0, 16]}, "south": {"uv": [0, 0, 8, 8]}}},
                {"from": [0, 0, 0], "to": [1, 1, 1], "rotation": {"axis": "y", "angle": "45"}},
                {"from": [0, 0, 0], "to": [1, 1, 1], "rotation": {"axis": "w", "angle": 0}}
            ]}"#,
        );
        assert_eq!(model.elements.len(), 3);
        assert!(model.skipped.is_empty());

        let faces = &model.elements[0].faces;
        assert_eq!(faces[&FaceName::North].uv, None);
        assert_eq!(faces[&FaceName::South].uv, Some([0.0, 0.0, 8.0, 8.0]));
        assert_eq!(
            model.elements[0].dropped,
            vec!["element 0: malformed uv on face 'north'; default uv used".to_string()]
        );

        assert_eq!(model.elements[1].rotation, None);
        assert!(model.elements[1].dropped[0].contains("numeric 'angle'"));
        assert_eq!(model.elements[2].rotation, None);
        assert!(model.elements[2].dropped[0].contains("valid 'axis'"));
    }

    #[test]
    fn test_rotation_origin_defaults_to_center() {
        let model = parse(
            r#"{"elements": [{"from": [0, 0, 0], "to": [1, 1, 1],
                "rotation": {"axis": "x", "angle": -45}}]}"#,
        );
        assert_eq!(model.elements[0].rotation.unwrap().origin, [8.0, 8.0, 8.0]);
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            ModelDocument::parse_str("[1, 2]", Path::new("a.json")),
            Err(AssetError::MalformedDocument(_, _))
        ));
        assert!(matches!(
            ModelDocument::parse_str(r#"{"elements": {}}"#, Path::new("a.json")),
            Err(AssetError::MalformedDocument(_, _))
        ));
        assert!(matches!(
            ModelDocument::parse_str("{ nope", Path::new("a.json")),
            Err(AssetError::MalformedDocument(_, _))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ModelDocument::load(Path::new("/nonexistent/model.json"));
        assert!(matches!(result, Err(AssetError::Io(_, _))));
    }
}
