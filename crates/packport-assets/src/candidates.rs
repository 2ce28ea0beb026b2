//! Ordered loose-file candidates for reference resolution.
//!
//! Each template maps `(root, reference)` to one candidate path. The
//! resolver walks the list in order and takes the first existing file, so
//! resolution order is exactly the order of [`DEFAULT_CANDIDATES`].

use std::path::{Path, PathBuf};

use packport_core::AssetReference;

/// A named path template rooted at the shared content directory.
#[derive(Clone, Copy)]
pub struct CandidateTemplate {
    pub name: &'static str,
    build: fn(&Path, &str, &str) -> PathBuf,
}

impl CandidateTemplate {
    pub const fn new(name: &'static str, build: fn(&Path, &str, &str) -> PathBuf) -> Self {
        Self { name, build }
    }

    /// Substitute the reference's namespace and relative path into the template.
    pub fn build(&self, root: &Path, reference: &AssetReference) -> PathBuf {
        (self.build)(root, reference.namespace(), reference.relative_path())
    }
}

impl std::fmt::Debug for CandidateTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateTemplate")
            .field("name", &self.name)
            .finish()
    }
}

fn content_assets(root: &Path, ns: &str, rel: &str) -> PathBuf {
    root.join("content")
        .join(ns)
        .join("resourcepack/assets")
        .join(ns)
        .join(rel)
}

fn content_namespaced(root: &Path, ns: &str, rel: &str) -> PathBuf {
    root.join("content").join(ns).join("resourcepack").join(ns).join(rel)
}

fn content_flat(root: &Path, ns: &str, rel: &str) -> PathBuf {
    root.join("content").join(ns).join("resourcepack").join(rel)
}

fn output_assets(root: &Path, ns: &str, rel: &str) -> PathBuf {
    root.join("output/resourcepack/assets").join(ns).join(rel)
}

fn output_flat(root: &Path, _ns: &str, rel: &str) -> PathBuf {
    root.join("output/resourcepack").join(rel)
}

/// Loose locations, most specific first. The archive is consulted after
/// all of these miss.
pub const DEFAULT_CANDIDATES: &[CandidateTemplate] = &[
    CandidateTemplate::new("content-assets", content_assets),
    CandidateTemplate::new("content-namespaced", content_namespaced),
    CandidateTemplate::new("content-flat", content_flat),
    CandidateTemplate::new("output-assets", output_assets),
    CandidateTemplate::new("output-flat", output_flat),
];
