//! Per-model conversion pipeline
//!
//! reference -> resolver -> parent chain slots -> geometry converter ->
//! geometry + attachable + copy list + notes. One model failing never
//! stops the others.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use packport_assets::{
    AssetError, AssetResolver, ModelDocument, ResolutionCache, ResolvedAsset,
    TextureInheritanceResolver, TextureSlotMap,
};
use packport_core::{AssetKind, AssetReference};
use packport_geometry::{
    attachable_identifier, geometry_identifier, AttachableDescriptor, GeometryConverter,
    GeometryDocument, TextureCopy,
};

use crate::icon::IconRenderer;
use crate::settings::{ConversionSettings, Settings};

/// Everything produced for one model
#[derive(Debug, Clone)]
pub struct ModelReport {
    pub model: AssetReference,
    pub geometry: Option<GeometryDocument>,
    pub attachable: Option<AttachableDescriptor>,
    pub copies: Vec<TextureCopy>,
    pub icon: Option<PathBuf>,
    pub notes: Vec<String>,
}

impl ModelReport {
    fn failed(model: AssetReference, note: String) -> Self {
        Self {
            model,
            geometry: None,
            attachable: None,
            copies: Vec::new(),
            icon: None,
            notes: vec![note],
        }
    }

    pub fn is_converted(&self) -> bool {
        self.geometry.is_some()
    }
}

/// Summary line written to the conversion report
#[derive(Debug, Serialize)]
pub struct ReportEntry<'a> {
    pub model: String,
    pub identifier: Option<&'a str>,
    pub cubes: usize,
    pub textures: usize,
    pub icon: Option<&'a PathBuf>,
    pub notes: &'a [String],
}

impl<'a> From<&'a ModelReport> for ReportEntry<'a> {
    fn from(report: &'a ModelReport) -> Self {
        Self {
            model: report.model.symbolic(),
            identifier: report.geometry.as_ref().map(|g| g.identifier.as_str()),
            cubes: report.geometry.as_ref().map_or(0, |g| g.cuboids().count()),
            textures: report.copies.len(),
            icon: report.icon.as_ref(),
            notes: &report.notes,
        }
    }
}

/// One conversion session: a resolver with its own cache, a converter,
/// and an optional icon renderer.
pub struct ConversionSession {
    resolver: AssetResolver,
    converter: GeometryConverter,
    settings: ConversionSettings,
    renderer: Option<Box<dyn IconRenderer>>,
}

impl ConversionSession {
    pub fn new(settings: &Settings) -> Self {
        Self::with_cache(settings, ResolutionCache::new())
    }

    /// Share an existing cache, e.g. across sessions in one process
    pub fn with_cache(settings: &Settings, cache: ResolutionCache) -> Self {
        Self {
            resolver: AssetResolver::new(settings.resolver_config(), cache),
            converter: GeometryConverter::new()
                .with_default_texture_size(settings.conversion.default_texture_size),
            settings: settings.conversion.clone(),
            renderer: None,
        }
    }

    pub fn with_icon_renderer(mut self, renderer: Box<dyn IconRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn resolver(&self) -> &AssetResolver {
        &self.resolver
    }

    /// Parse a model name given by the user
    pub fn model_reference(&self, raw: &str) -> AssetReference {
        AssetReference::parse(raw, Some(&self.settings.default_namespace), AssetKind::Model)
    }

    /// Merged texture slots for a model
    pub fn resolve_slots(&self, model: &AssetReference) -> TextureSlotMap {
        TextureInheritanceResolver::new(&self.resolver)
            .with_max_depth(self.settings.max_parent_depth)
            .with_alias_hops(self.settings.alias_hop_limit)
            .resolve_slots(model.namespace(), model.relative_path())
    }

    /// Convert every model, in order
    pub fn convert_all(&self, models: &[String]) -> Vec<ModelReport> {
        let reports: Vec<ModelReport> = models.iter().map(|raw| self.convert_model(raw)).collect();
        let converted = reports.iter().filter(|r| r.is_converted()).count();
        info!("Converted {}/{} models", converted, reports.len());
        reports
    }

    /// Convert one model. Never fails; problems end up in the report's notes.
    pub fn convert_model(&self, raw: &str) -> ModelReport {
        let model = self.model_reference(raw);
        let slots = self.resolve_slots(&model);

        let Some(source) = self.geometry_source(&model, &slots) else {
            let note = match self.resolver.resolve(&model) {
                Err(e) => e.to_string(),
                Ok(resolved) => match ModelDocument::load(&resolved.location) {
                    Err(e) => e.to_string(),
                    Ok(_) => format!("could not read {}", model),
                },
            };
            warn!("Skipping {}: {}", model, note);
            return ModelReport::failed(model, note);
        };
        let (document, inherited_from) = source;

        let mut notes = Vec::new();
        if let Some(ancestor) = inherited_from {
            notes.push(format!("elements inherited from {}", ancestor));
        }
        for missing in &slots.missing {
            notes.push(format!(
                "texture slot '{}' ({}) unresolved: {}",
                missing.slot, missing.value, missing.reason
            ));
        }

        let identifier = geometry_identifier(&model);
        let conversion = self.converter.convert(&identifier, &document, &slots);
        notes.extend(conversion.notes);

        let slot_copies: Vec<(String, TextureCopy)> = slots
            .iter()
            .map(|(slot, asset)| (slot.to_string(), TextureCopy::for_asset(asset)))
            .collect();
        let attachable =
            AttachableDescriptor::new(attachable_identifier(&model), &identifier, &slot_copies);

        let icon = self.render_icon(&slots, &mut notes);

        ModelReport {
            model,
            geometry: Some(conversion.geometry),
            attachable: Some(attachable),
            copies: conversion.copies,
            icon,
            notes,
        }
    }

    /// The nearest model in the chain that declares elements, or the model
    /// itself when none does. The second value names the ancestor the
    /// elements came from. An empty chain (depth limit 0) reads the model
    /// directly.
    fn geometry_source(
        &self,
        model: &AssetReference,
        slots: &TextureSlotMap,
    ) -> Option<(ModelDocument, Option<AssetReference>)> {
        if slots.chain.is_empty() {
            let resolved = self.resolver.resolve(model).ok()?;
            return ModelDocument::load(&resolved.location)
                .ok()
                .map(|document| (document, None));
        }

        let mut own = None;
        for (depth, asset) in slots.chain.iter().enumerate() {
            let document = match ModelDocument::load(&asset.location) {
                Ok(document) => document,
                Err(e) => {
                    warn!("Could not re-read {}: {}", asset.reference, e);
                    continue;
                }
            };
            let has_elements = !document.elements.is_empty() || !document.skipped.is_empty();
            if has_elements {
                let ancestor = (depth > 0).then(|| asset.reference.clone());
                return Some((document, ancestor));
            }
            if depth == 0 {
                own = Some(document);
            }
        }

        if own.is_none() {
            warn!("No readable document for {}", model);
        }
        own.map(|document| (document, None))
    }

    fn render_icon(&self, slots: &TextureSlotMap, notes: &mut Vec<String>) -> Option<PathBuf> {
        let renderer = self.renderer.as_ref()?;
        let model_path = &slots.chain.first()?.location;
        match renderer.render(model_path, slots) {
            Ok(path) => Some(path),
            Err(e) => {
                notes.push(format!("icon rendering failed: {}", e));
                None
            }
        }
    }

    /// Resolve a single reference, for diagnostics
    pub fn resolve_reference(
        &self,
        raw: &str,
        kind: AssetKind,
    ) -> Result<ResolvedAsset, AssetError> {
        self.resolver
            .resolve_str(raw, Some(&self.settings.default_namespace), kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write(path: &Path, bytes: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    fn settings_for(root: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.paths.content_root = root.to_path_buf();
        settings.paths.output_dir = root.join("out");
        settings.conversion.default_namespace = "acme".into();
        settings
    }

    fn pack_dir(root: &Path) -> PathBuf {
        root.join("content/acme/resourcepack/assets/acme")
    }

    struct FixedIcon;

    impl IconRenderer for FixedIcon {
        fn render(&self, _model_path: &Path, slots: &TextureSlotMap) -> Result<PathBuf, String> {
            if slots.is_empty() {
                Err("nothing to draw".into())
            } else {
                Ok(PathBuf::from("/icons/out.png"))
            }
        }
    }

    #[test]
    fn converts_model_with_inherited_elements() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let pack = pack_dir(root);
        write(
            &pack.join("models/item/ruby_sword.json"),
            br#"{"parent": "acme:item/sword_base", "textures": {"blade": "item/ruby"}}"#,
        );
        write(
            &pack.join("models/item/sword_base.json"),
            br##"{"elements": [{"from": [0, 0, 0], "to": [16, 16, 16],
                "faces": {"north": {"uv": [0, 0, 16, 16], "texture": "#blade"}}}]}"##,
        );
        let texture = pack.join("textures/item/ruby.png");
        fs::create_dir_all(texture.parent().unwrap()).unwrap();
        image::RgbaImage::new(16, 16).save(&texture).unwrap();

        let session = ConversionSession::new(&settings_for(root));
        let report = session.convert_model("item/ruby_sword");

        let geometry = report.geometry.as_ref().unwrap();
        assert_eq!(geometry.identifier, "geometry.acme.item.ruby_sword");
        assert_eq!(geometry.texture_width, 16);
        assert_eq!(geometry.cuboids().count(), 1);
        assert_eq!(report.copies.len(), 1);
        assert!(report
            .notes
            .iter()
            .any(|note| note.contains("inherited from acme:models/item/sword_base.json")));
        assert_eq!(
            report.attachable.as_ref().unwrap().identifier,
            "acme:ruby_sword"
        );
    }

    #[test]
    fn missing_model_does_not_block_batch() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &pack_dir(root).join("models/item/plain.json"),
            br#"{"elements": []}"#,
        );

        let session = ConversionSession::new(&settings_for(root));
        let reports = session.convert_all(&["item/ghost".to_string(), "item/plain".to_string()]);

        assert!(!reports[0].is_converted());
        assert!(reports[0].notes[0].contains("asset not found"));
        assert!(reports[1].is_converted());
        assert!(reports[1]
            .notes
            .iter()
            .any(|note| note.contains("no convertible elements")));
    }

    #[test]
    fn zero_depth_still_converts_model() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &pack_dir(root).join("models/item/plain.json"),
            br#"{"elements": [{"from": [0, 0, 0], "to": [1, 1, 1]}]}"#,
        );

        let mut settings = settings_for(root);
        settings.conversion.max_parent_depth = 0;
        let report = ConversionSession::new(&settings).convert_model("item/plain");

        assert!(report.is_converted());
        assert_eq!(report.geometry.as_ref().unwrap().cuboids().count(), 1);
        assert!(!report.notes.iter().any(|note| note.starts_with("could not read")));
    }

    #[test]
    fn icon_failure_becomes_note() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &pack_dir(root).join("models/item/plain.json"),
            br#"{"elements": [{"from": [0, 0, 0], "to": [1, 1, 1]}]}"#,
        );

        let session =
            ConversionSession::new(&settings_for(root)).with_icon_renderer(Box::new(FixedIcon));
        let report = session.convert_model("item/plain");

        assert!(report.is_converted());
        assert!(report.icon.is_none());
        assert!(report
            .notes
            .iter()
            .any(|note| note == "icon rendering failed: nothing to draw"));
    }

    #[test]
    fn report_entry_summarizes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &pack_dir(root).join("models/item/plain.json"),
            br#"{"elements": [{"from": [0, 0, 0], "to": [1, 1, 1]}]}"#,
        );

        let session = ConversionSession::new(&settings_for(root));
        let report = session.convert_model("acme:item/plain");
        let entry = ReportEntry::from(&report);

        assert_eq!(entry.model, "acme:models/item/plain.json");
        assert_eq!(entry.identifier, Some("geometry.acme.item.plain"));
        assert_eq!(entry.cubes, 1);
    }
}
