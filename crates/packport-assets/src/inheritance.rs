//! Texture slot inheritance along a model's parent chain.
//!
//! The most-derived model is read first and every slot it binds is final;
//! ancestors only fill slots that are still empty. Aliases (`#slot`) are
//! followed inside each model's own table first, then against the merged
//! table once the whole chain has been read.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use packport_core::{AssetKind, AssetReference, BUILTIN_NAMESPACE};

use crate::error::AssetError;
use crate::model::ModelDocument;
use crate::resolver::{AssetResolver, ResolvedAsset};

/// Maximum number of models read along one parent chain
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Maximum alias indirections followed for one slot
pub const DEFAULT_ALIAS_HOPS: usize = 16;

/// Slot used only for break particles; never part of the output
pub const PARTICLE_SLOT: &str = "particle";

/// A slot whose texture could not be bound to a file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingSlot {
    pub slot: String,
    pub value: String,
    pub reason: String,
}

/// Merged texture bindings for one model.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TextureSlotMap {
    /// Lowercased slot name to resolved texture
    pub slots: BTreeMap<String, ResolvedAsset>,
    /// Slots that were declared but could not be resolved
    pub missing: Vec<MissingSlot>,
    /// Models read along the chain, most-derived first
    pub chain: Vec<ResolvedAsset>,
}

impl TextureSlotMap {
    /// Look up a slot, ignoring case and a leading `#`
    pub fn get(&self, slot: &str) -> Option<&ResolvedAsset> {
        let slot = slot.trim().trim_start_matches('#').to_ascii_lowercase();
        self.slots.get(&slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedAsset)> {
        self.slots.iter().map(|(slot, asset)| (slot.as_str(), asset))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SlotValue {
    Literal(String),
    /// Alias whose target was not found yet (lowercased target name)
    Alias(String),
}

#[derive(Debug, Clone)]
struct PendingSlot {
    value: SlotValue,
    /// Namespace of the model that declared the value
    namespace: String,
}

/// Walks parent chains through an [`AssetResolver`].
pub struct TextureInheritanceResolver<'a> {
    resolver: &'a AssetResolver,
    max_depth: usize,
    alias_hops: usize,
}

impl<'a> TextureInheritanceResolver<'a> {
    pub fn new(resolver: &'a AssetResolver) -> Self {
        Self {
            resolver,
            max_depth: DEFAULT_MAX_DEPTH,
            alias_hops: DEFAULT_ALIAS_HOPS,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_alias_hops(mut self, alias_hops: usize) -> Self {
        self.alias_hops = alias_hops;
        self
    }

    /// Build the merged slot map for `namespace:model_name`.
    ///
    /// Never fails: an unloadable model ends the walk and whatever was
    /// collected so far is returned, which is empty when the first model
    /// itself cannot be read.
    pub fn resolve_slots(&self, namespace: &str, model_name: &str) -> TextureSlotMap {
        let mut pending: BTreeMap<String, PendingSlot> = BTreeMap::new();
        let mut chain = Vec::new();
        let mut visited = HashSet::new();

        let mut next = Some(AssetReference::parse(model_name, Some(namespace), AssetKind::Model));
        let mut remaining = self.max_depth;

        while let Some(reference) = next.take() {
            if remaining == 0 {
                debug!("Parent chain depth limit reached at {}", reference);
                break;
            }
            remaining -= 1;

            if !visited.insert(reference.clone()) {
                debug!("Parent chain revisits {}, stopping", reference);
                break;
            }

            let resolved = match self.resolver.resolve(&reference) {
                Ok(resolved) => resolved,
                Err(e) => {
                    debug!("Parent chain ends at {}: {}", reference, e);
                    break;
                }
            };
            let document = match ModelDocument::load(&resolved.location) {
                Ok(document) => document,
                Err(e) => {
                    warn!("Parent chain ends at {}: {}", reference, e);
                    break;
                }
            };

            for (slot, value) in self.resolve_local_aliases(&document.textures) {
                pending.entry(slot).or_insert_with(|| PendingSlot {
                    value,
                    namespace: reference.namespace().to_string(),
                });
            }

            next = document
                .parent
                .as_deref()
                .filter(|parent| !parent.is_empty())
                .map(|parent| parent_reference(parent, reference.namespace()));
            chain.push(resolved);
        }

        self.finish(pending, chain)
    }

    /// Follow `#slot` indirections within one model's table.
    fn resolve_local_aliases(&self, table: &BTreeMap<String, String>) -> Vec<(String, SlotValue)> {
        table
            .iter()
            .map(|(slot, raw)| {
                let mut value = raw.as_str();
                for _ in 0..self.alias_hops {
                    let Some(target) = alias_target(value) else {
                        break;
                    };
                    match table.get(&target) {
                        Some(next) => value = next.as_str(),
                        None => break,
                    }
                }
                let value = match alias_target(value) {
                    Some(target) => SlotValue::Alias(target),
                    None => SlotValue::Literal(value.to_string()),
                };
                (slot.clone(), value)
            })
            .collect()
    }

    /// Follow an alias through the merged table to a literal and the
    /// namespace that declared it.
    fn follow_merged(
        &self,
        target: &str,
        pending: &BTreeMap<String, PendingSlot>,
    ) -> Option<(String, String)> {
        let mut target = target.to_string();
        for _ in 0..self.alias_hops {
            match pending.get(&target) {
                Some(PendingSlot {
                    value: SlotValue::Literal(literal),
                    namespace,
                }) => return Some((literal.clone(), namespace.clone())),
                Some(PendingSlot {
                    value: SlotValue::Alias(next),
                    ..
                }) => target = next.clone(),
                None => return None,
            }
        }
        None
    }

    fn finish(
        &self,
        pending: BTreeMap<String, PendingSlot>,
        chain: Vec<ResolvedAsset>,
    ) -> TextureSlotMap {
        let mut map = TextureSlotMap {
            chain,
            ..Default::default()
        };

        for (slot, entry) in &pending {
            if slot == PARTICLE_SLOT {
                continue;
            }

            let (literal, namespace) = match &entry.value {
                SlotValue::Literal(literal) => (literal.clone(), entry.namespace.clone()),
                SlotValue::Alias(target) => match self.follow_merged(target, &pending) {
                    Some(found) => found,
                    None => {
                        map.missing.push(MissingSlot {
                            slot: slot.clone(),
                            value: format!("#{target}"),
                            reason: "alias does not lead to a texture".into(),
                        });
                        continue;
                    }
                },
            };

            if literal.is_empty() {
                map.missing.push(MissingSlot {
                    slot: slot.clone(),
                    value: literal,
                    reason: "empty texture value".into(),
                });
                continue;
            }

            let reference = AssetReference::parse(&literal, Some(&namespace), AssetKind::Texture);
            match self.resolver.resolve(&reference) {
                Ok(resolved) => {
                    map.slots.insert(slot.clone(), resolved);
                }
                Err(e) => {
                    if let AssetError::NotFound { best_guess, .. } = &e {
                        warn!(
                            "Texture for slot '{}' not found: {} (expected near {})",
                            slot,
                            reference,
                            best_guess.display()
                        );
                    }
                    map.missing.push(MissingSlot {
                        slot: slot.clone(),
                        value: literal,
                        reason: e.to_string(),
                    });
                }
            }
        }

        map
    }
}

/// Reference for a model's `parent` value.
///
/// Bare `item/` and `block/` names belong to the built-in namespace, an
/// explicit `ns:name` keeps its namespace, and anything else inherits the
/// child's namespace.
pub fn parent_reference(raw: &str, current_namespace: &str) -> AssetReference {
    let normalized = raw.trim().replace('\\', "/");
    let bare = normalized.trim_start_matches('/');
    let default_namespace = if bare.starts_with("item/") || bare.starts_with("block/") {
        BUILTIN_NAMESPACE
    } else {
        current_namespace
    };
    AssetReference::parse(bare, Some(default_namespace), AssetKind::Model)
}

fn alias_target(value: &str) -> Option<String> {
    value
        .trim()
        .strip_prefix('#')
        .map(|target| target.trim().to_ascii_lowercase())
}
