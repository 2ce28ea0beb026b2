use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{debug, info, warn};

use packport_core::{AssetKind, AssetReference};

use crate::archive::ArchiveSource;
use crate::cache::ResolutionCache;
use crate::candidates::{CandidateTemplate, DEFAULT_CANDIDATES};
use crate::error::AssetError;

/// Where a resolved asset's bytes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssetOrigin {
    /// A loose file in one of the candidate directories
    Loose,
    /// Extracted from the archive during this session
    Archive,
    /// Already extracted by an earlier run
    Cache,
}

/// A reference bound to a concrete file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAsset {
    pub reference: AssetReference,
    pub location: PathBuf,
    pub origin: AssetOrigin,
}

/// Locations the resolver searches.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Shared root holding `content/` and `output/`
    pub root: PathBuf,
    /// Generated resource-pack archive, consulted after loose files
    pub archive: Option<PathBuf>,
    /// Directory receiving extracted archive entries
    pub cache_dir: PathBuf,
}

impl ResolverConfig {
    /// Default layout under `root`: archive at `output/resourcepack.zip`,
    /// extraction cache at `output/.cache/archive`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            archive: Some(root.join("output/resourcepack.zip")),
            cache_dir: root.join("output/.cache/archive"),
            root,
        }
    }
}

static TEMP_SUFFIX: AtomicU64 = AtomicU64::new(0);

/// Maps symbolic references to files, trying loose candidates in order and
/// falling back to the archive.
pub struct AssetResolver {
    root: PathBuf,
    candidates: Vec<CandidateTemplate>,
    archive: Option<ArchiveSource>,
    cache_dir: PathBuf,
    cache: ResolutionCache,
}

impl AssetResolver {
    /// Create a resolver with the default candidate order and the given
    /// session cache.
    pub fn new(config: ResolverConfig, cache: ResolutionCache) -> Self {
        info!("AssetResolver created with root: {}", config.root.display());
        Self {
            root: config.root,
            candidates: DEFAULT_CANDIDATES.to_vec(),
            archive: config.archive.map(ArchiveSource::new),
            cache_dir: config.cache_dir,
            cache,
        }
    }

    /// Replace the loose candidate list. Order is resolution order.
    pub fn with_candidates(mut self, candidates: Vec<CandidateTemplate>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Parse a raw reference and resolve it.
    pub fn resolve_str(
        &self,
        raw: &str,
        default_namespace: Option<&str>,
        kind: AssetKind,
    ) -> Result<ResolvedAsset, AssetError> {
        self.resolve(&AssetReference::parse(raw, default_namespace, kind))
    }

    /// Resolve a reference to a file.
    ///
    /// Repeated calls within a session return the same location. A miss
    /// reports the first loose candidate as a best guess; it is never a
    /// usable location.
    pub fn resolve(&self, reference: &AssetReference) -> Result<ResolvedAsset, AssetError> {
        if let Some(hit) = self.cache.get(reference) {
            return Ok(hit);
        }

        for template in &self.candidates {
            let path = template.build(&self.root, reference);
            if path.is_file() {
                debug!("Resolved {} via {} -> {}", reference, template.name, path.display());
                return Ok(self.cache.insert(ResolvedAsset {
                    reference: reference.clone(),
                    location: path,
                    origin: AssetOrigin::Loose,
                }));
            }
        }

        match self.resolve_from_archive(reference) {
            Ok(Some(resolved)) => return Ok(self.cache.insert(resolved)),
            Ok(None) => {}
            Err(AssetError::Archive(path, message)) => {
                warn!("Skipping archive {}: {}", path.display(), message);
            }
            Err(e) => return Err(e),
        }

        let best_guess = self
            .candidates
            .first()
            .map(|template| template.build(&self.root, reference))
            .unwrap_or_else(|| self.root.join(reference.relative_path()));
        debug!("Could not resolve {}", reference);
        Err(AssetError::NotFound {
            reference: reference.clone(),
            best_guess,
        })
    }

    fn resolve_from_archive(
        &self,
        reference: &AssetReference,
    ) -> Result<Option<ResolvedAsset>, AssetError> {
        let Some(archive) = &self.archive else {
            return Ok(None);
        };

        let entry = reference.archive_entry();
        if !archive.contains(&entry)? {
            return Ok(None);
        }

        let cache_file = self.cache_dir.join(reference.cache_file_name());
        if cache_file.is_file() {
            debug!("Reusing extracted {} at {}", reference, cache_file.display());
            return Ok(Some(ResolvedAsset {
                reference: reference.clone(),
                location: cache_file,
                origin: AssetOrigin::Cache,
            }));
        }

        let Some(bytes) = archive.read_entry(&entry)? else {
            return Ok(None);
        };
        write_atomically(&self.cache_dir, &cache_file, &bytes)?;
        let count = self.cache.record_extraction();
        debug!(
            "Extracted {} to {} ({} extractions this session)",
            reference,
            cache_file.display(),
            count
        );

        Ok(Some(ResolvedAsset {
            reference: reference.clone(),
            location: cache_file,
            origin: AssetOrigin::Archive,
        }))
    }
}

/// Write through a temporary sibling and rename, so a concurrent reader
/// sees either no file or the whole file.
fn write_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> Result<(), AssetError> {
    fs::create_dir_all(dir).map_err(|e| AssetError::Io(dir.to_path_buf(), e))?;

    let suffix = TEMP_SUFFIX.fetch_add(1, Ordering::Relaxed);
    let temp = target.with_extension(format!("{}.{}.tmp", std::process::id(), suffix));
    fs::write(&temp, bytes).map_err(|e| AssetError::Io(temp.clone(), e))?;
    fs::rename(&temp, target).map_err(|e| {
        let _ = fs::remove_file(&temp);
        AssetError::Io(target.to_path_buf(), e)
    })
}
