use std::path::Path;

use crate::error::AssetError;

/// Read a texture's pixel dimensions from its header without decoding the
/// pixel data.
pub fn texture_dimensions(path: &Path) -> Result<(u32, u32), AssetError> {
    image::image_dimensions(path)
        .map_err(|e| AssetError::ImageHeader(path.to_path_buf(), e.to_string()))
}
