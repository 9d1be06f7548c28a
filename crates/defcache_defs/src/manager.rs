//! Per-kind definition manager: registry + item index + loaders.

use crate::definition::ItemDefinition;
use crate::error::{DefsError, DefsResult};
use crate::item::{ItemId, ItemStack};
use crate::loader::{read_json_dir, LoaderConfig};
use crate::sync::{decode_packet, encode_packet};
use crate::tags::TagRegistry;
use defcache_core::{
    IndexConfig, IndexSummary, IndirectIndex, InvalidationBroadcaster, InvalidationCause, Registry,
};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the definitions of one kind and answers "which one applies to
/// this stack?".
///
/// Lookups narrow by item type through an [`IndirectIndex`], then run the
/// full [`ItemDefinition::matches`] predicate over the candidates in load
/// order. The first match wins.
pub struct DataManager<D: ItemDefinition> {
    registry: Arc<Registry<D>>,
    index: IndirectIndex<ItemId, Arc<D>>,
    tags: Arc<TagRegistry>,
}

impl<D: ItemDefinition> DataManager<D> {
    /// Creates an empty manager.
    ///
    /// Queries fail with `RegistryNotLoaded` until the first load.
    pub fn new(broadcaster: &Arc<InvalidationBroadcaster>, tags: &Arc<TagRegistry>) -> Self {
        Self::with_index_config(broadcaster, tags, IndexConfig::named(D::KIND))
    }

    /// Creates an empty manager with a custom index configuration.
    pub fn with_index_config(
        broadcaster: &Arc<InvalidationBroadcaster>,
        tags: &Arc<TagRegistry>,
        config: IndexConfig,
    ) -> Self {
        let registry = Arc::new(Registry::new(D::KIND, broadcaster));
        let extractor_tags = Arc::clone(tags);
        let index = registry.index(config, move |definition: &Arc<D>| {
            definition.valid_items(&extractor_tags.snapshot())
        });
        Self {
            registry,
            index,
            tags: Arc::clone(tags),
        }
    }

    /// Returns the first definition that applies to `stack`.
    pub fn get(&self, stack: &ItemStack) -> DefsResult<Option<Arc<D>>> {
        if stack.is_empty() {
            return Ok(None);
        }
        let tags = self.tags.snapshot();
        Ok(self
            .index
            .find_first(&stack.item, |definition| definition.matches(stack, &tags))?)
    }

    /// Returns every definition that applies to `stack`, in load order.
    pub fn get_all(&self, stack: &ItemStack) -> DefsResult<Vec<Arc<D>>> {
        if stack.is_empty() {
            return Ok(Vec::new());
        }
        let tags = self.tags.snapshot();
        Ok(self
            .index
            .find_all(&stack.item, |definition| definition.matches(stack, &tags))?)
    }

    /// Validates and installs definitions, then broadcasts `cause`.
    ///
    /// Any invalid definition fails the whole call and nothing changes.
    pub fn replace(&self, definitions: Vec<D>, cause: InvalidationCause) -> DefsResult<usize> {
        for definition in &definitions {
            definition
                .validate()
                .map_err(|message| DefsError::invalid_definition(definition.id(), message))?;
        }
        let count = definitions.len();
        self.registry.replace(definitions, cause);
        Ok(count)
    }

    /// Reads and validates `<root>/<FOLDER>/*.json` without installing
    /// anything. Ids come from file names.
    ///
    /// In non-strict mode, files with invalid names and definitions that
    /// fail validation are skipped with a warning.
    pub fn read_dir(root: &Path, config: &LoaderConfig) -> DefsResult<Vec<D>> {
        let files = read_json_dir::<D>(&root.join(D::FOLDER), config)?;
        let mut definitions = Vec::with_capacity(files.len());
        for (stem, mut definition) in files {
            let id = match ItemId::new(&config.namespace, &stem) {
                Ok(id) => id,
                Err(err) if !config.strict => {
                    warn!(kind = D::KIND, %stem, error = %err, "skipping file with invalid name");
                    continue;
                }
                Err(err) => return Err(err),
            };
            definition.set_id(id.to_string());
            match definition.validate() {
                Ok(()) => definitions.push(definition),
                Err(message) if !config.strict => {
                    warn!(kind = D::KIND, %id, %message, "skipping invalid definition");
                }
                Err(message) => return Err(DefsError::invalid_definition(id.to_string(), message)),
            }
        }
        Ok(definitions)
    }

    /// Loads `<root>/<FOLDER>/*.json`, assigning ids from file names.
    pub fn load_dir(&self, root: &Path, config: &LoaderConfig) -> DefsResult<usize> {
        let definitions = Self::read_dir(root, config)?;
        let count = self.replace(definitions, InvalidationCause::DataReload)?;
        info!(kind = D::KIND, count, ?root, "loaded definitions");
        Ok(count)
    }

    /// Encodes the current definitions into a sync packet.
    pub fn encode_sync(&self) -> DefsResult<Vec<u8>> {
        let values = self.registry.values()?;
        encode_packet(&values)
    }

    /// Replaces the current definitions with those in a sync packet.
    pub fn apply_sync(&self, packet: &[u8]) -> DefsResult<usize> {
        let definitions = decode_packet::<D>(packet)?;
        self.replace(definitions, InvalidationCause::NetworkSync)
    }

    /// Returns definitions whose ingredient accepts no item under the
    /// current tags. They can never be found by a lookup.
    pub fn unreachable(&self) -> DefsResult<Vec<Arc<D>>> {
        let tags = self.tags.snapshot();
        Ok(self
            .registry
            .values()?
            .iter()
            .filter(|definition| definition.valid_items(&tags).is_empty())
            .cloned()
            .collect())
    }

    /// Returns a snapshot of the current definitions.
    pub fn values(&self) -> DefsResult<Arc<[Arc<D>]>> {
        Ok(self.registry.values()?)
    }

    /// Summarizes the item index.
    pub fn summary(&self) -> DefsResult<IndexSummary> {
        Ok(self.index.summary()?)
    }

    /// Returns the underlying registry.
    pub fn registry(&self) -> &Arc<Registry<D>> {
        &self.registry
    }

    /// Returns the underlying index.
    pub fn index(&self) -> &IndirectIndex<ItemId, Arc<D>> {
        &self.index
    }
}

impl<D: ItemDefinition> fmt::Debug for DataManager<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataManager")
            .field("kind", &D::KIND)
            .field("registry", &self.registry)
            .field("index", &self.index)
            .finish()
    }
}
