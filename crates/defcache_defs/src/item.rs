//! Resource ids, item stacks and fluid stacks.

use crate::error::{DefsError, DefsResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Namespace assumed when an id has none.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A namespaced identifier such as `minecraft:coal`.
///
/// Namespaces may contain `[a-z0-9_.-]`; paths additionally allow `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

/// Identifier of an item type. This is the indirect key of every item index.
pub type ItemId = ResourceId;

/// Identifier of an item tag.
pub type TagId = ResourceId;

impl ResourceId {
    /// Parses an id, filling in [`DEFAULT_NAMESPACE`] when missing.
    pub fn parse(raw: &str) -> DefsResult<Self> {
        let (namespace, path) = match raw.split_once(':') {
            Some((namespace, path)) => (namespace, path),
            None => (DEFAULT_NAMESPACE, raw),
        };
        let namespace_ok = !namespace.is_empty() && namespace.chars().all(is_namespace_char);
        let path_ok = !path.is_empty() && path.chars().all(|c| is_namespace_char(c) || c == '/');
        if !namespace_ok || !path_ok {
            return Err(DefsError::invalid_resource_id(raw));
        }
        Ok(Self(format!("{namespace}:{path}")))
    }

    /// Builds an id from a namespace and a path.
    pub fn new(namespace: &str, path: &str) -> DefsResult<Self> {
        Self::parse(&format!("{namespace}:{path}"))
    }

    /// Returns the namespace part.
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map_or(DEFAULT_NAMESPACE, |(ns, _)| ns)
    }

    /// Returns the path part.
    pub fn path(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, path)| path)
    }

    /// Returns the full `namespace:path` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_namespace_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-')
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceId {
    type Err = DefsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = DefsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

fn default_count() -> u32 {
    1
}

/// A quantity of one item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item type.
    pub item: ItemId,
    /// Number of items. Zero means empty.
    #[serde(default = "default_count")]
    pub count: u32,
}

impl ItemStack {
    /// Creates a stack.
    pub fn new(item: ItemId, count: u32) -> Self {
        Self { item, count }
    }

    /// Creates a stack of one.
    pub fn of(item: ItemId) -> Self {
        Self::new(item, 1)
    }

    /// Returns true if the stack holds nothing.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// A quantity of fluid, in millibuckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidStack {
    /// Fluid type.
    pub fluid: ResourceId,
    /// Amount in millibuckets.
    pub amount: u32,
}
