//! Item tags.
//!
//! A tag names a set of items and may include other tags. Ingredients that
//! refer to a tag are expanded through the current [`TagSet`] when an index
//! extracts keys, so replacing the tags broadcasts an invalidation just
//! like replacing definitions does.

use crate::error::{DefsError, DefsResult};
use crate::item::{ItemId, TagId};
use crate::loader::{read_json_dir, LoaderConfig};
use defcache_core::{InvalidationBroadcaster, InvalidationCause};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Folder under the data root holding item tag files.
pub const TAG_FOLDER: &str = "tags/items";

/// One tag as written in a data file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagFile {
    /// Item ids, or `#`-prefixed tag ids.
    pub values: Vec<String>,
}

/// Fully resolved tags: every tag maps to plain item ids.
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    members: HashMap<TagId, Vec<ItemId>>,
}

impl TagSet {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves raw tag files, expanding nested tag references.
    ///
    /// Fails on the first unknown reference, malformed id or cycle.
    pub fn resolve(files: Vec<(TagId, TagFile)>) -> DefsResult<Self> {
        let raw: HashMap<TagId, TagFile> = files.into_iter().collect();
        let mut members = HashMap::with_capacity(raw.len());
        let mut visiting = HashSet::new();

        let mut ids: Vec<&TagId> = raw.keys().collect();
        ids.sort();
        for id in ids {
            resolve_tag(id, &raw, &mut members, &mut visiting)?;
        }
        Ok(Self { members })
    }

    /// Resolves raw tag files, dropping every tag that cannot be resolved.
    ///
    /// A tag that includes a dropped tag is dropped as well.
    pub fn resolve_lenient(files: Vec<(TagId, TagFile)>) -> Self {
        let raw: HashMap<TagId, TagFile> = files.into_iter().collect();
        let mut members = HashMap::with_capacity(raw.len());

        let mut ids: Vec<&TagId> = raw.keys().collect();
        ids.sort();
        for id in ids {
            let mut visiting = HashSet::new();
            if let Err(err) = resolve_tag(id, &raw, &mut members, &mut visiting) {
                warn!(tag = %id, error = %err, "skipping unresolvable tag");
            }
        }
        Self { members }
    }

    /// Returns the items of `tag`, or an empty slice for unknown tags.
    pub fn items(&self, tag: &TagId) -> &[ItemId] {
        self.members.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if `item` belongs to `tag`.
    pub fn contains(&self, tag: &TagId, item: &ItemId) -> bool {
        self.items(tag).contains(item)
    }

    /// Returns true if `tag` is defined.
    pub fn is_defined(&self, tag: &TagId) -> bool {
        self.members.contains_key(tag)
    }

    /// Returns the number of tags.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if there are no tags.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn resolve_tag(
    id: &TagId,
    raw: &HashMap<TagId, TagFile>,
    members: &mut HashMap<TagId, Vec<ItemId>>,
    visiting: &mut HashSet<TagId>,
) -> DefsResult<Vec<ItemId>> {
    if let Some(done) = members.get(id) {
        return Ok(done.clone());
    }
    let file = raw.get(id).ok_or_else(|| DefsError::UnknownTag {
        tag: id.to_string(),
    })?;
    if !visiting.insert(id.clone()) {
        return Err(DefsError::TagCycle {
            tag: id.to_string(),
        });
    }

    let mut items = Vec::new();
    let mut seen = HashSet::new();
    for value in &file.values {
        let expanded = match value.strip_prefix('#') {
            Some(nested) => resolve_tag(&TagId::parse(nested)?, raw, members, visiting)?,
            None => vec![ItemId::parse(value)?],
        };
        for item in expanded {
            if seen.insert(item.clone()) {
                items.push(item);
            }
        }
    }

    visiting.remove(id);
    members.insert(id.clone(), items.clone());
    Ok(items)
}

/// Reloadable holder of the current [`TagSet`].
#[derive(Debug)]
pub struct TagRegistry {
    current: RwLock<Arc<TagSet>>,
    broadcaster: Arc<InvalidationBroadcaster>,
}

impl TagRegistry {
    /// Creates a registry with no tags.
    pub fn new(broadcaster: &Arc<InvalidationBroadcaster>) -> Self {
        Self {
            current: RwLock::new(Arc::new(TagSet::new())),
            broadcaster: Arc::clone(broadcaster),
        }
    }

    /// Returns the current tags.
    pub fn snapshot(&self) -> Arc<TagSet> {
        Arc::clone(&self.current.read())
    }

    /// Resolves and installs new tags, then broadcasts a resource reload.
    ///
    /// On error the previous tags stay in place and nothing is broadcast.
    pub fn replace(&self, files: Vec<(TagId, TagFile)>) -> DefsResult<usize> {
        let resolved = TagSet::resolve(files)?;
        Ok(self.install(resolved))
    }

    /// Installs resolved tags, then broadcasts a resource reload.
    pub fn install(&self, tags: TagSet) -> usize {
        let count = tags.len();
        *self.current.write() = Arc::new(tags);
        info!(tags = count, "item tags replaced");
        self.broadcaster.notify(InvalidationCause::ResourceReload);
        count
    }

    /// Reads and resolves every tag file under `<root>/tags/items` without
    /// installing anything.
    ///
    /// In non-strict mode, files with invalid names and tags that cannot be
    /// resolved are skipped with a warning.
    pub fn read_dir(root: &Path, config: &LoaderConfig) -> DefsResult<TagSet> {
        let mut files = Vec::new();
        for (stem, file) in read_json_dir::<TagFile>(&root.join(TAG_FOLDER), config)? {
            match TagId::new(&config.namespace, &stem) {
                Ok(id) => files.push((id, file)),
                Err(err) if !config.strict => {
                    warn!(%stem, error = %err, "skipping tag file with invalid name");
                }
                Err(err) => return Err(err),
            }
        }
        if config.strict {
            TagSet::resolve(files)
        } else {
            Ok(TagSet::resolve_lenient(files))
        }
    }

    /// Loads every tag file under `<root>/tags/items`.
    pub fn load_dir(&self, root: &Path, config: &LoaderConfig) -> DefsResult<usize> {
        let tags = Self::read_dir(root, config)?;
        Ok(self.install(tags))
    }
}
