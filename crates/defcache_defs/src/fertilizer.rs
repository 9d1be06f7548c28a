//! Fertilizer definitions.

use crate::definition::ItemDefinition;
use crate::ingredient::Ingredient;
use serde::{Deserialize, Serialize};

/// Nutrients an item adds to farmland. Missing nutrients default to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fertilizer {
    #[serde(skip)]
    id: String,
    ingredient: Ingredient,
    #[serde(default)]
    nitrogen: f32,
    #[serde(default)]
    phosphorus: f32,
    #[serde(default)]
    potassium: f32,
}

impl Fertilizer {
    /// Creates a fertilizer definition.
    pub fn new(
        id: impl Into<String>,
        ingredient: Ingredient,
        nitrogen: f32,
        phosphorus: f32,
        potassium: f32,
    ) -> Self {
        Self {
            id: id.into(),
            ingredient,
            nitrogen,
            phosphorus,
            potassium,
        }
    }

    /// Nitrogen added.
    pub fn nitrogen(&self) -> f32 {
        self.nitrogen
    }

    /// Phosphorus added.
    pub fn phosphorus(&self) -> f32 {
        self.phosphorus
    }

    /// Potassium added.
    pub fn potassium(&self) -> f32 {
        self.potassium
    }
}

impl ItemDefinition for Fertilizer {
    const KIND: &'static str = "fertilizer";
    const FOLDER: &'static str = "fertilizers";

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
        for (name, value) in [
            ("nitrogen", self.nitrogen),
            ("phosphorus", self.phosphorus),
            ("potassium", self.potassium),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} {value} is out of range"));
            }
        }
        Ok(())
    }
}
