//! Core types used throughout the packport converter

use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespace owning the built-in `item/` and `block/` models.
pub const BUILTIN_NAMESPACE: &str = "minecraft";

/// What a reference points at. Decides the directory prefix and the
/// extension inferred for bare references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Model,
    Texture,
    Other,
}

impl AssetKind {
    /// Directory every asset of this kind lives under, if any
    pub fn directory(self) -> Option<&'static str> {
        match self {
            AssetKind::Model => Some("models"),
            AssetKind::Texture => Some("textures"),
            AssetKind::Other => None,
        }
    }

    /// Extension appended when a reference has none
    pub fn extension(self) -> Option<&'static str> {
        match self {
            AssetKind::Model => Some("json"),
            AssetKind::Texture => Some("png"),
            AssetKind::Other => None,
        }
    }
}

/// A namespaced, normalized logical path such as `acme:models/item/sword.json`.
///
/// The relative path always uses forward slashes, never starts with one,
/// and contains no empty or `.` segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetReference {
    namespace: String,
    relative_path: String,
}

impl AssetReference {
    /// Build a reference from an explicit namespace and path, normalizing
    /// slashes but inferring nothing.
    pub fn new(namespace: impl AsRef<str>, relative_path: impl AsRef<str>) -> Self {
        Self {
            namespace: namespace.as_ref().trim().to_ascii_lowercase(),
            relative_path: normalize_path(relative_path.as_ref()),
        }
    }

    /// Parse a raw reference (`ns:path` or bare `path`).
    ///
    /// Bare paths take `default_namespace`, or the built-in namespace when
    /// none is given. The kind's directory and extension are added when
    /// the path lacks them.
    pub fn parse(raw: &str, default_namespace: Option<&str>, kind: AssetKind) -> Self {
        let raw = raw.trim().replace('\\', "/");
        let (namespace, path) = match raw.split_once(':') {
            Some((ns, path)) if !ns.is_empty() => (ns.to_string(), path.to_string()),
            Some((_, path)) => (fallback_namespace(default_namespace), path.to_string()),
            None => (fallback_namespace(default_namespace), raw.clone()),
        };

        let mut path = normalize_path(&path);

        if let Some(dir) = kind.directory() {
            let prefixed = path == dir || path.starts_with(&format!("{dir}/"));
            if !prefixed {
                path = if path.is_empty() {
                    dir.to_string()
                } else {
                    format!("{dir}/{path}")
                };
            }
        }

        if let Some(ext) = kind.extension() {
            let file_name = path.rsplit('/').next().unwrap_or_default();
            if !file_name.contains('.') {
                path.push('.');
                path.push_str(ext);
            }
        }

        Self::new(namespace, path)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// `namespace:relative/path.ext`
    pub fn symbolic(&self) -> String {
        format!("{}:{}", self.namespace, self.relative_path)
    }

    /// Path inside a resource pack archive: `assets/{namespace}/{relative_path}`
    pub fn archive_entry(&self) -> String {
        format!("assets/{}/{}", self.namespace, self.relative_path)
    }

    /// Deterministic file name for an extracted copy of this asset.
    ///
    /// Escapes the symbolic path so that every character outside
    /// `[A-Za-z0-9._-]` becomes `_`.
    pub fn cache_file_name(&self) -> String {
        self.symbolic()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// The path with its kind directory and extension stripped,
    /// e.g. `item/ruby_sword` for `models/item/ruby_sword.json`.
    pub fn stem_path(&self) -> &str {
        let path = self.relative_path.as_str();
        let path = ["models/", "textures/"]
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix))
            .unwrap_or(path);
        match path.rfind('.') {
            Some(dot) if !path[dot..].contains('/') => &path[..dot],
            _ => path,
        }
    }
}

impl fmt::Display for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.relative_path)
    }
}

fn fallback_namespace(default_namespace: Option<&str>) -> String {
    default_namespace
        .filter(|ns| !ns.trim().is_empty())
        .unwrap_or(BUILTIN_NAMESPACE)
        .to_string()
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_namespaced_model() {
        let reference = AssetReference::parse("acme:item/ruby_sword", None, AssetKind::Model);
        assert_eq!(reference.namespace(), "acme");
        assert_eq!(reference.relative_path(), "models/item/ruby_sword.json");
    }

    #[test]
    fn test_parse_bare_uses_default_namespace() {
        let reference = AssetReference::parse("item/ruby", Some("acme"), AssetKind::Texture);
        assert_eq!(reference.symbolic(), "acme:textures/item/ruby.png");

        let builtin = AssetReference::parse("block/stone", None, AssetKind::Texture);
        assert_eq!(builtin.namespace(), BUILTIN_NAMESPACE);
    }

    #[test]
    fn test_parse_unifies_slashes_and_keeps_extension() {
        let reference =
            AssetReference::parse("Acme:\\textures//item\\ruby.tga", None, AssetKind::Texture);
        assert_eq!(reference.namespace(), "acme");
        assert_eq!(reference.relative_path(), "textures/item/ruby.tga");
    }

    #[test]
    fn test_cache_file_name_escapes_path() {
        let reference = AssetReference::new("acme", "textures/item/ruby sword.png");
        assert_eq!(
            reference.cache_file_name(),
            "acme_textures_item_ruby_sword.png"
        );
    }

    #[test]
    fn test_stem_path() {
        let model = AssetReference::parse("acme:item/ruby_sword", None, AssetKind::Model);
        assert_eq!(model.stem_path(), "item/ruby_sword");

        let other = AssetReference::new("acme", "lang/en_us");
        assert_eq!(other.stem_path(), "lang/en_us");
    }

    #[test]
    fn test_archive_entry() {
        let reference = AssetReference::parse("acme:item/ruby", None, AssetKind::Texture);
        assert_eq!(
            reference.archive_entry(),
            "assets/acme/textures/item/ruby.png"
        );
    }
}
