//! Block-model to entity-geometry conversion.
//!
//! Source elements live in a 0..16 corner-anchored, Y-up cube. Target
//! cuboids are centered on X/Z = 8 with the root 24 units up, so every
//! point goes through the same remap: `(x - 8, 24 - y, z - 8)`.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use packport_assets::{texture_dimensions, Element, FaceName, ModelDocument, TextureSlotMap};
use packport_core::Vec3;

use crate::copies::TextureCopy;
use crate::geometry::{Bone, FaceUv, GeometryDocument, TargetCuboid, ROOT_BONE, ROOT_PIVOT};

/// Canvas edge used when no slot texture has a readable header
pub const DEFAULT_TEXTURE_SIZE: u32 = 64;

/// Output of one conversion. `notes` lists everything that was skipped
/// or approximated.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub geometry: GeometryDocument,
    pub copies: Vec<TextureCopy>,
    pub notes: Vec<String>,
}

pub struct GeometryConverter {
    default_texture_size: u32,
}

impl Default for GeometryConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryConverter {
    pub fn new() -> Self {
        Self {
            default_texture_size: DEFAULT_TEXTURE_SIZE,
        }
    }

    pub fn with_default_texture_size(mut self, size: u32) -> Self {
        self.default_texture_size = size;
        self
    }

    /// Convert a model and its resolved slots into a single-bone geometry.
    ///
    /// Never fails. Unreadable elements are skipped with a note and a
    /// model without elements yields an empty bone plus a note.
    pub fn convert(
        &self,
        identifier: &str,
        model: &ModelDocument,
        slots: &TextureSlotMap,
    ) -> Conversion {
        let mut notes = Vec::new();

        for skipped in &model.skipped {
            notes.push(format!("skipped element {}: {}", skipped.index, skipped.reason));
        }
        for element in &model.elements {
            notes.extend(element.dropped.iter().cloned());
        }

        let cubes: Vec<TargetCuboid> = model.elements.iter().map(convert_element).collect();
        if cubes.is_empty() {
            notes.push("model has no convertible elements".to_string());
        }

        let (texture_width, texture_height) = self.canvas_size(slots, &mut notes);
        notes.extend(unbound_face_slots(model, slots));

        info!(
            "Converted '{}': {} cubes, {}x{} canvas, {} notes",
            identifier,
            cubes.len(),
            texture_width,
            texture_height,
            notes.len()
        );

        Conversion {
            geometry: GeometryDocument {
                identifier: identifier.to_string(),
                texture_width,
                texture_height,
                bones: vec![Bone {
                    name: ROOT_BONE.to_string(),
                    pivot: ROOT_PIVOT,
                    cubes,
                }],
            },
            copies: TextureCopy::for_slots(slots),
            notes,
        }
    }

    /// Pixel size of the first slot texture whose header can be read.
    fn canvas_size(&self, slots: &TextureSlotMap, notes: &mut Vec<String>) -> (u32, u32) {
        for (slot, asset) in slots.iter() {
            match texture_dimensions(&asset.location) {
                Ok(size) => {
                    let distinct: BTreeSet<_> = slots.iter().map(|(_, a)| &a.location).collect();
                    if distinct.len() > 1 {
                        notes.push(format!(
                            "{} distinct textures bound; canvas sized from slot '{}'",
                            distinct.len(),
                            slot
                        ));
                    }
                    return size;
                }
                Err(e) => debug!("Slot '{}' has no usable header: {}", slot, e),
            }
        }

        notes.push(format!(
            "no readable slot texture; using {0}x{0} canvas",
            self.default_texture_size
        ));
        (self.default_texture_size, self.default_texture_size)
    }
}

fn remap_point(point: Vec3) -> Vec3 {
    Vec3::new(point.x - 8.0, 24.0 - point.y, point.z - 8.0)
}

fn convert_element(element: &Element) -> TargetCuboid {
    let from = Vec3::from_array(element.from);
    let to = Vec3::from_array(element.to);

    let origin = remap_point(Vec3::new(from.x, to.y, from.z));
    let size = to - from;

    let (pivot, rotation) = match element.rotation {
        Some(rotation) => {
            let mut angles = [0.0; 3];
            angles[rotation.axis.index()] = rotation.angle;
            let pivot = remap_point(Vec3::from_array(rotation.origin));
            (Some(pivot.to_array()), Some(angles))
        }
        None => (None, None),
    };

    let mut uv = BTreeMap::new();
    for face in FaceName::ALL {
        let Some(source) = element.faces.get(&face) else {
            continue;
        };
        let rect = source
            .uv
            .unwrap_or_else(|| default_face_uv(face, element.from, element.to));
        uv.insert(face, normalize_uv(rect));
    }

    TargetCuboid {
        origin: origin.to_array(),
        size: size.to_array(),
        pivot,
        rotation,
        uv,
    }
}

/// `(u1, v1, u2, v2)` to origin/size. A flipped rectangle marks a mirrored
/// face; the target format has no mirror flag, so only the extent survives.
fn normalize_uv([u1, v1, u2, v2]: [f32; 4]) -> FaceUv {
    if u1 > u2 || v1 > v2 {
        debug!("Dropping UV mirror on rect ({}, {}, {}, {})", u1, v1, u2, v2);
    }
    FaceUv {
        origin: [u1.min(u2), v1.min(v2)],
        size: [(u2 - u1).abs(), (v2 - v1).abs()],
    }
}

/// UV the source format implies for a face without an explicit `uv`
fn default_face_uv(face: FaceName, from: [f32; 3], to: [f32; 3]) -> [f32; 4] {
    match face {
        FaceName::Down | FaceName::Up => [from[0], from[2], to[0], to[2]],
        FaceName::North | FaceName::South => [from[0], 16.0 - to[1], to[0], 16.0 - from[1]],
        FaceName::East | FaceName::West => [from[2], 16.0 - to[1], to[2], 16.0 - from[1]],
    }
}

/// Notes for face textures that name a slot with no bound texture
fn unbound_face_slots(model: &ModelDocument, slots: &TextureSlotMap) -> Vec<String> {
    let unbound: BTreeSet<String> = model
        .elements
        .iter()
        .flat_map(|element| element.faces.values())
        .filter_map(|face| face.texture.as_deref())
        .filter(|texture| slots.get(texture).is_none())
        .map(|texture| texture.trim_start_matches('#').to_ascii_lowercase())
        .collect();

    unbound
        .into_iter()
        .map(|slot| format!("faces reference unbound slot '#{slot}'"))
        .collect()
}
