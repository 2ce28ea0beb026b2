use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::AssetError;

/// The generated resource-pack archive consulted after loose files.
///
/// The archive is opened read-only for each lookup and closed again, so
/// no handle is shared between callers.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    path: PathBuf,
}

impl ArchiveSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Option<ZipArchive<File>>, AssetError> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let file = File::open(&self.path).map_err(|e| AssetError::Io(self.path.clone(), e))?;
        ZipArchive::new(file)
            .map(Some)
            .map_err(|e| AssetError::Archive(self.path.clone(), e.to_string()))
    }

    /// Check whether the archive holds `entry`. A missing archive holds nothing.
    pub fn contains(&self, entry: &str) -> Result<bool, AssetError> {
        let Some(mut archive) = self.open()? else {
            return Ok(false);
        };
        let found = match archive.by_name(entry) {
            Ok(_) => Ok(true),
            Err(ZipError::FileNotFound) => Ok(false),
            Err(e) => Err(AssetError::Archive(self.path.clone(), e.to_string())),
        };
        found
    }

    /// Read the bytes of `entry`, or `None` when the archive or entry is absent.
    pub fn read_entry(&self, entry: &str) -> Result<Option<Vec<u8>>, AssetError> {
        let Some(mut archive) = self.open()? else {
            return Ok(None);
        };
        let mut file = match archive.by_name(entry) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(AssetError::Archive(self.path.clone(), e.to_string())),
        };

        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)
            .map_err(|e| AssetError::Io(self.path.clone(), e))?;
        debug!(
            "Read {} bytes of '{}' from {}",
            bytes.len(),
            entry,
            self.path.display()
        );
        Ok(Some(bytes))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;

    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    /// Write a stored (uncompressed) zip holding the given entries.
    pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, bytes) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
    }
}
