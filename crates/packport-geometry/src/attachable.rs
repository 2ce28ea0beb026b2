use std::collections::BTreeMap;

use serde::Serialize;

use packport_core::AssetReference;

use crate::copies::TextureCopy;

const ATTACHABLE_FORMAT_VERSION: &str = "1.10.0";
const DEFAULT_MATERIAL: &str = "entity_alphatest";
const DEFAULT_RENDER_CONTROLLER: &str = "controller.render.item_default";

/// Binds an item identifier to a geometry and its textures.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachableDescriptor {
    pub identifier: String,
    pub geometry: String,
    /// Texture key (`default` plus slot names) to pack-relative texture path
    pub textures: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct AttachableFile<'a> {
    format_version: &'static str,
    #[serde(rename = "minecraft:attachable")]
    attachable: AttachableBody<'a>,
}

#[derive(Serialize)]
struct AttachableBody<'a> {
    description: AttachableDescription<'a>,
}

#[derive(Serialize)]
struct AttachableDescription<'a> {
    identifier: &'a str,
    materials: BTreeMap<&'static str, &'static str>,
    textures: &'a BTreeMap<String, String>,
    geometry: BTreeMap<&'static str, &'a str>,
    render_controllers: [&'static str; 1],
}

impl AttachableDescriptor {
    /// `default` points at the first copied texture; every slot is also
    /// listed under its own name.
    pub fn new(
        identifier: impl Into<String>,
        geometry: impl Into<String>,
        slot_copies: &[(String, TextureCopy)],
    ) -> Self {
        let mut textures = BTreeMap::new();
        if let Some((_, first)) = slot_copies.first() {
            textures.insert("default".to_string(), first.texture_reference());
        }
        for (slot, copy) in slot_copies {
            textures
                .entry(slot.clone())
                .or_insert_with(|| copy.texture_reference());
        }
        Self {
            identifier: identifier.into(),
            geometry: geometry.into(),
            textures,
        }
    }

    fn to_file(&self) -> AttachableFile<'_> {
        AttachableFile {
            format_version: ATTACHABLE_FORMAT_VERSION,
            attachable: AttachableBody {
                description: AttachableDescription {
                    identifier: &self.identifier,
                    materials: BTreeMap::from([("default", DEFAULT_MATERIAL)]),
                    textures: &self.textures,
                    geometry: BTreeMap::from([("default", self.geometry.as_str())]),
                    render_controllers: [DEFAULT_RENDER_CONTROLLER],
                },
            },
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_file())
    }

    pub fn to_json_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.to_file())
    }
}

/// `{namespace}:{model file name}`, e.g. `acme:ruby_sword`
pub fn attachable_identifier(model: &AssetReference) -> String {
    let stem = model.stem_path();
    let name = stem.rsplit('/').next().unwrap_or(stem);
    format!("{}:{}", model.namespace(), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use packport_core::AssetKind;
    use std::path::PathBuf;

    fn copy(destination: &str) -> TextureCopy {
        TextureCopy {
            source: PathBuf::from("/src").join(destination),
            destination: PathBuf::from(destination),
        }
    }

    #[test]
    fn test_descriptor_shape() {
        let descriptor = AttachableDescriptor::new(
            "acme:ruby_sword",
            "geometry.acme.item.ruby_sword",
            &[
                ("blade".to_string(), copy("textures/acme/item/blade.png")),
                ("hilt".to_string(), copy("textures/acme/item/hilt.png")),
            ],
        );
        let value = descriptor.to_json_value().unwrap();
        let description = &value["minecraft:attachable"]["description"];

        assert_eq!(description["identifier"], "acme:ruby_sword");
        assert_eq!(description["geometry"]["default"], "geometry.acme.item.ruby_sword");
        assert_eq!(description["textures"]["default"], "textures/acme/item/blade");
        assert_eq!(description["textures"]["hilt"], "textures/acme/item/hilt");
        assert_eq!(description["materials"]["default"], "entity_alphatest");
        assert_eq!(
            description["render_controllers"][0],
            "controller.render.item_default"
        );
    }

    #[test]
    fn test_no_textures() {
        let descriptor = AttachableDescriptor::new("acme:plain", "geometry.acme.plain", &[]);
        assert!(descriptor.textures.is_empty());
    }

    #[test]
    fn test_attachable_identifier() {
        let model = AssetReference::parse("acme:item/tools/ruby_sword", None, AssetKind::Model);
        assert_eq!(attachable_identifier(&model), "acme:ruby_sword");
    }
}
