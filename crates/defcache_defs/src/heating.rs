//! Heating recipes.

use crate::definition::ItemDefinition;
use crate::ingredient::Ingredient;
use crate::item::{FluidStack, ItemStack};
use serde::{Deserialize, Serialize};

/// What an item turns into once heated past a temperature.
///
/// A recipe may produce an item, a fluid, both, or neither (the input is
/// simply destroyed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatingRecipe {
    #[serde(skip)]
    id: String,
    ingredient: Ingredient,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result_item: Option<ItemStack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result_fluid: Option<FluidStack>,
    temperature: f32,
}

impl HeatingRecipe {
    /// Creates a heating recipe.
    pub fn new(
        id: impl Into<String>,
        ingredient: Ingredient,
        result_item: Option<ItemStack>,
        result_fluid: Option<FluidStack>,
        temperature: f32,
    ) -> Self {
        Self {
            id: id.into(),
            ingredient,
            result_item,
            result_fluid,
            temperature,
        }
    }

    /// Item produced, if any.
    pub fn result_item(&self) -> Option<&ItemStack> {
        self.result_item.as_ref()
    }

    /// Fluid produced, if any.
    pub fn result_fluid(&self) -> Option<&FluidStack> {
        self.result_fluid.as_ref()
    }

    /// Temperature at which the recipe fires.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Returns true once `temperature` reaches the recipe temperature.
    pub fn is_valid_temperature(&self, temperature: f32) -> bool {
        temperature >= self.temperature
    }
}

impl ItemDefinition for HeatingRecipe {
    const KIND: &'static str = "heating";
    const FOLDER: &'static str = "recipes/heating";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn ingredient(&self) -> &Ingredient {
        &self.ingredient
    }

    fn validate(&self) -> Result<(), String> {
        if !self.temperature.is_finite() {
            return Err(format!("temperature {} is not finite", self.temperature));
        }
        if self.result_item.as_ref().is_some_and(ItemStack::is_empty) {
            return Err("result_item count must be positive".into());
        }
        Ok(())
    }
}
