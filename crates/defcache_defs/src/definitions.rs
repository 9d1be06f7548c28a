//! The full set of definition managers sharing one broadcaster.

use crate::definition::ItemDefinition;
use crate::error::DefsResult;
use crate::fertilizer::Fertilizer;
use crate::fuel::Fuel;
use crate::heating::HeatingRecipe;
use crate::item::ItemStack;
use crate::loader::LoaderConfig;
use crate::manager::DataManager;
use crate::tags::{TagRegistry, TagSet};
use defcache_core::{InvalidationBroadcaster, InvalidationCause};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Number of entries loaded per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Item tags.
    pub tags: usize,
    /// Fuel definitions.
    pub fuels: usize,
    /// Fertilizer definitions.
    pub fertilizers: usize,
    /// Heating recipes.
    pub heating: usize,
}

/// A problem found by [`Definitions::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum Issue {
    /// The definition accepts no item and can never be looked up.
    Unreachable {
        /// Definition kind.
        kind: String,
        /// Definition id.
        id: String,
    },
    /// The definition refers to a tag that is not loaded.
    UnresolvedTag {
        /// Definition kind.
        kind: String,
        /// Definition id.
        id: String,
        /// The missing tag.
        tag: String,
    },
}

/// Tags, fuels, fertilizers and heating recipes wired to one broadcaster.
#[derive(Debug)]
pub struct Definitions {
    broadcaster: Arc<InvalidationBroadcaster>,
    tags: Arc<TagRegistry>,
    fuels: DataManager<Fuel>,
    fertilizers: DataManager<Fertilizer>,
    heating: DataManager<HeatingRecipe>,
}

impl Definitions {
    /// Creates empty managers on `broadcaster`.
    pub fn new(broadcaster: &Arc<InvalidationBroadcaster>) -> Self {
        let tags = Arc::new(TagRegistry::new(broadcaster));
        Self {
            broadcaster: Arc::clone(broadcaster),
            fuels: DataManager::new(broadcaster, &tags),
            fertilizers: DataManager::new(broadcaster, &tags),
            heating: DataManager::new(broadcaster, &tags),
            tags,
        }
    }

    /// Creates managers on a fresh broadcaster and loads `root`.
    pub fn open(root: &Path, config: &LoaderConfig) -> DefsResult<Self> {
        let definitions = Self::new(&InvalidationBroadcaster::shared());
        definitions.load(root, config)?;
        Ok(definitions)
    }

    /// Loads tags and every definition kind from `root`.
    ///
    /// All folders are read and validated before anything is installed, so
    /// a failed load leaves the previous data and indexes untouched.
    pub fn load(&self, root: &Path, config: &LoaderConfig) -> DefsResult<LoadReport> {
        let tags = TagRegistry::read_dir(root, config)?;
        let fuels = DataManager::<Fuel>::read_dir(root, config)?;
        let fertilizers = DataManager::<Fertilizer>::read_dir(root, config)?;
        let heating = DataManager::<HeatingRecipe>::read_dir(root, config)?;

        let report = LoadReport {
            tags: self.tags.install(tags),
            fuels: self.fuels.replace(fuels, InvalidationCause::DataReload)?,
            fertilizers: self
                .fertilizers
                .replace(fertilizers, InvalidationCause::DataReload)?,
            heating: self.heating.replace(heating, InvalidationCause::DataReload)?,
        };
        info!(?root, ?report, "definitions loaded");
        Ok(report)
    }

    /// Returns the fuel for `stack`, if any.
    pub fn fuel(&self, stack: &ItemStack) -> DefsResult<Option<Arc<Fuel>>> {
        self.fuels.get(stack)
    }

    /// Returns the fertilizer for `stack`, if any.
    pub fn fertilizer(&self, stack: &ItemStack) -> DefsResult<Option<Arc<Fertilizer>>> {
        self.fertilizers.get(stack)
    }

    /// Returns the heating recipe for `stack`, if any.
    pub fn heating(&self, stack: &ItemStack) -> DefsResult<Option<Arc<HeatingRecipe>>> {
        self.heating.get(stack)
    }

    /// Marks every index stale without changing any data.
    pub fn invalidate_all(&self) {
        self.broadcaster.notify(InvalidationCause::Manual);
    }

    /// Lists definitions that can never be found and tags that are missing.
    pub fn verify(&self) -> DefsResult<Vec<Issue>> {
        let tags = self.tags.snapshot();
        let mut issues = Vec::new();
        verify_kind(&self.fuels, &tags, &mut issues)?;
        verify_kind(&self.fertilizers, &tags, &mut issues)?;
        verify_kind(&self.heating, &tags, &mut issues)?;
        Ok(issues)
    }

    /// Fuel manager.
    pub fn fuels(&self) -> &DataManager<Fuel> {
        &self.fuels
    }

    /// Fertilizer manager.
    pub fn fertilizers(&self) -> &DataManager<Fertilizer> {
        &self.fertilizers
    }

    /// Heating recipe manager.
    pub fn heating_recipes(&self) -> &DataManager<HeatingRecipe> {
        &self.heating
    }

    /// Tag registry.
    pub fn tags(&self) -> &Arc<TagRegistry> {
        &self.tags
    }

    /// Broadcaster shared by every manager.
    pub fn broadcaster(&self) -> &Arc<InvalidationBroadcaster> {
        &self.broadcaster
    }
}

fn verify_kind<D: ItemDefinition>(
    manager: &DataManager<D>,
    tags: &TagSet,
    issues: &mut Vec<Issue>,
) -> DefsResult<()> {
    for definition in manager.values()?.iter() {
        for tag in definition.ingredient().referenced_tags() {
            if !tags.is_defined(tag) {
                issues.push(Issue::UnresolvedTag {
                    kind: D::KIND.to_string(),
                    id: definition.id().to_string(),
                    tag: tag.to_string(),
                });
            }
        }
        if definition.valid_items(tags).is_empty() {
            issues.push(Issue::Unreachable {
                kind: D::KIND.to_string(),
                id: definition.id().to_string(),
            });
        }
    }
    Ok(())
}
