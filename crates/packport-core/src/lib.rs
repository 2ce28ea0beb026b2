//! Packport Core - Shared types for the packport converter
//!
//! This crate provides the foundational types used by every other crate:
//! - Symbolic asset references and their normalization rules
//! - A loosely-typed document tree with typed accessors
//! - Math primitives (re-exported from glam)

pub mod node;
pub mod types;

pub use glam::Vec3;
pub use node::DocNode;
pub use types::{AssetKind, AssetReference, BUILTIN_NAMESPACE};
