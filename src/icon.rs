use std::path::{Path, PathBuf};

use packport_assets::TextureSlotMap;

/// Produces an inventory icon for a resolved model.
///
/// Rendering is optional: a failure is recorded as a note and never blocks
/// the geometry output.
pub trait IconRenderer {
    /// Render `model_path` with its bound textures and return the snapshot image path
    fn render(&self, model_path: &Path, slots: &TextureSlotMap) -> Result<PathBuf, String>;
}
