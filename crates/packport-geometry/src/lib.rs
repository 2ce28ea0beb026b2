//! Packport Geometry - Target geometry documents and the model converter
//!
//! Turns a parsed block-space model plus its resolved texture slots into a
//! single-bone entity geometry, the texture copy list that goes with it,
//! and an attachable descriptor binding the two.

mod attachable;
mod converter;
mod copies;
mod geometry;

pub use attachable::{attachable_identifier, AttachableDescriptor};
pub use converter::{Conversion, GeometryConverter, DEFAULT_TEXTURE_SIZE};
pub use copies::TextureCopy;
pub use geometry::{
    geometry_identifier, Bone, FaceUv, GeometryDocument, TargetCuboid, FORMAT_VERSION,
    ROOT_BONE, ROOT_PIVOT,
};
