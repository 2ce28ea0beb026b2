use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use packport_assets::{ResolvedAsset, TextureSlotMap};

/// One texture file the package writer must copy into the output pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextureCopy {
    pub source: PathBuf,
    /// Relative to the output pack root, e.g. `textures/acme/item/ruby.png`
    pub destination: PathBuf,
}

impl TextureCopy {
    pub fn for_asset(asset: &ResolvedAsset) -> Self {
        let relative = asset.reference.relative_path();
        let relative = relative.strip_prefix("textures/").unwrap_or(relative);
        Self {
            source: asset.location.clone(),
            destination: PathBuf::from("textures")
                .join(asset.reference.namespace())
                .join(relative),
        }
    }

    /// Copy list for every bound slot, one entry per distinct destination
    pub fn for_slots(slots: &TextureSlotMap) -> Vec<Self> {
        let mut seen = BTreeSet::new();
        slots
            .iter()
            .map(|(_, asset)| Self::for_asset(asset))
            .filter(|copy| seen.insert(copy.destination.clone()))
            .collect()
    }

    /// Destination without its extension, as texture references expect
    pub fn texture_reference(&self) -> String {
        self.destination
            .with_extension("")
            .to_string_lossy()
            .replace('\\', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packport_assets::AssetOrigin;
    use packport_core::{AssetKind, AssetReference};

    fn asset(raw: &str, location: &str) -> ResolvedAsset {
        ResolvedAsset {
            reference: AssetReference::parse(raw, None, AssetKind::Texture),
            location: PathBuf::from(location),
            origin: AssetOrigin::Loose,
        }
    }

    #[test]
    fn test_destination_layout() {
        let copy = TextureCopy::for_asset(&asset("acme:item/ruby", "/src/ruby.png"));
        assert_eq!(copy.source, PathBuf::from("/src/ruby.png"));
        assert_eq!(copy.destination, PathBuf::from("textures/acme/item/ruby.png"));
        assert_eq!(copy.texture_reference(), "textures/acme/item/ruby");
    }

    #[test]
    fn test_shared_texture_copied_once() {
        let mut slots = TextureSlotMap::default();
        slots.slots.insert("layer0".into(), asset("acme:item/ruby", "/src/ruby.png"));
        slots.slots.insert("side".into(), asset("acme:item/ruby", "/src/ruby.png"));
        slots.slots.insert("top".into(), asset("acme:block/top", "/src/top.png"));

        assert_eq!(TextureCopy::for_slots(&slots).len(), 2);
    }
}
