//! Fuel definitions.

use crate::definition::ItemDefinition;
use crate::ingredient::Ingredient;
use serde::{Deserialize, Serialize};

/// An item that can be burned, for how long and how hot.
///
/// JSON: `{"ingredient": ..., "duration": 1600, "temperature": 1350.0}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fuel {
    #[serde(skip)]
    id: String,
    ingredient: Ingredient,
    duration: u32,
    temperature: f32,
}

impl Fuel {
    /// Creates a fuel definition.
    pub fn new(
        id: impl Into<String>,
        ingredient: Ingredient,
        duration: u32,
        temperature: f32,
    ) -> Self {
        Self {
            id: id.into(),
            ingredient,
            duration,
            temperature,
        }
    }

    /// Burn time in ticks.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Burn temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

impl ItemDefinition for Fuel {
    const KIND: &'static str = "fuel";
    const FOLDER: &'static str = "fuels";

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
        if self.duration == 0 {
            return Err("duration must be positive".into());
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(format!("temperature {} is out of range", self.temperature));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemId;

    #[test]
    fn parses_json() {
        let fuel: Fuel = serde_json::from_str(
            r#"{"ingredient": {"item": "minecraft:coal"}, "duration": 2200, "temperature": 1415}"#,
        )
        .unwrap();

        assert_eq!(fuel.duration(), 2200);
        assert_eq!(fuel.temperature(), 1415.0);
        assert_eq!(fuel.id(), "");
        assert!(fuel.validate().is_ok());
    }

    #[test]
    fn missing_duration_is_rejected() {
        let result: Result<Fuel, _> =
            serde_json::from_str(r#"{"ingredient": {"item": "minecraft:coal"}, "temperature": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let coal = Ingredient::item(ItemId::parse("minecraft:coal").unwrap());
        assert!(Fuel::new("a", coal.clone(), 0, 100.0).validate().is_err());
        assert!(Fuel::new("b", coal.clone(), 10, f32::NAN).validate().is_err());
        assert!(Fuel::new("c", coal, 10, -5.0).validate().is_err());
    }
}
