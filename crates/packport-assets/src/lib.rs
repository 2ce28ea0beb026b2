//! Packport Assets - Asset resolution and texture inheritance
//!
//! Resolves symbolic references against loose resource-pack directories and
//! a generated archive, caches the results for a conversion session, and
//! walks model parent chains to build merged texture slot maps.

mod archive;
mod cache;
mod candidates;
mod error;
mod inheritance;
mod model;
mod resolver;
mod texture;

pub use archive::ArchiveSource;
pub use cache::ResolutionCache;
pub use candidates::{CandidateTemplate, DEFAULT_CANDIDATES};
pub use error::AssetError;
pub use inheritance::{
    parent_reference, MissingSlot, TextureInheritanceResolver, TextureSlotMap,
    DEFAULT_ALIAS_HOPS, DEFAULT_MAX_DEPTH, PARTICLE_SLOT,
};
pub use model::{Axis, Element, ElementRotation, Face, FaceName, ModelDocument, SkippedElement};
pub use resolver::{AssetOrigin, AssetResolver, ResolvedAsset, ResolverConfig};
pub use texture::texture_dimensions;
