//! Plant catalog and garden bed inputs
//!
//! Plain data handed to the solver by whatever layer collected it (REST
//! service, editor UI, a JSON file). Everything deserializes with serde, and
//! attributes the solver does not know about are kept in `Plant::extra`.

use crate::error::{PlannerError, Result};
use anyhow::Context;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A plant species that can be placed in a bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    /// Unique key across the whole catalog
    pub name: String,

    /// Minimum spacing in cells; anything above 1 forbids same-species neighbors
    #[serde(default = "default_min_spacing")]
    pub min_spacing: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun_requirements: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub companions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub antagonists: Vec<String>,

    /// Forward-compatible attributes (harvest window, colour, ...)
    #[serde(flatten)]
    pub extra: FxHashMap<String, serde_json::Value>,
}

fn default_min_spacing() -> u32 {
    1
}

impl Plant {
    pub fn new(name: impl Into<String>, min_spacing: u32) -> Self {
        Self {
            name: name.into(),
            min_spacing,
            sun_requirements: None,
            companions: Vec::new(),
            antagonists: Vec::new(),
            extra: FxHashMap::default(),
        }
    }

    pub fn with_sun(mut self, sun: impl Into<String>) -> Self {
        self.sun_requirements = Some(sun.into());
        self
    }

    pub fn with_companions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.companions = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_antagonists<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.antagonists = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_antagonist_of(&self, other: &str) -> bool {
        self.antagonists.iter().any(|a| a == other)
    }

    pub fn is_companion_of(&self, other: &str) -> bool {
        self.companions.iter().any(|c| c == other)
    }

    /// Typed view of an extension attribute
    ///
    /// Returns `None` when the key is absent or does not deserialize as `T`.
    pub fn extension<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.extra
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// A square planting bed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GardenBedConfig {
    pub id: String,
    /// Side length; the bed is `grid_size × grid_size`
    pub grid_size: usize,
}

impl GardenBedConfig {
    pub fn new(id: impl Into<String>, grid_size: usize) -> Self {
        Self {
            id: id.into(),
            grid_size,
        }
    }
}

/// All plants available for placement, keyed by name
///
/// Insertion order is preserved so that every cell's domain lists plants in
/// the same, reproducible order.
#[derive(Debug, Clone, Default)]
pub struct PlantCatalog {
    plants: Vec<Plant>,
    by_name: FxHashMap<String, usize>,
}

impl PlantCatalog {
    /// Build a catalog, rejecting duplicate names and zero spacing
    pub fn new(plants: Vec<Plant>) -> Result<Self> {
        let mut by_name = FxHashMap::default();
        by_name.reserve(plants.len());

        for (idx, plant) in plants.iter().enumerate() {
            if plant.min_spacing < 1 {
                return Err(PlannerError::InvalidMinSpacing {
                    name: plant.name.clone(),
                    min_spacing: plant.min_spacing,
                });
            }
            if by_name.insert(plant.name.clone(), idx).is_some() {
                return Err(PlannerError::DuplicatePlantName(plant.name.clone()));
            }
        }

        Ok(Self { plants, by_name })
    }

    pub fn get(&self, name: &str) -> Option<&Plant> {
        self.by_name.get(name).map(|&idx| &self.plants[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Plant names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.plants.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plant> + '_ {
        self.plants.iter()
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }
}

/// One complete planting problem as it arrives from the outside
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantingInput {
    pub beds: Vec<GardenBedConfig>,
    pub plants: Vec<Plant>,
}

impl PlantingInput {
    /// Load beds and plants from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read planting input: {:?}", path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse planting input JSON: {:?}", path))
    }

    /// Split into the bed list and a validated catalog
    pub fn into_parts(self) -> Result<(Vec<GardenBedConfig>, PlantCatalog)> {
        let catalog = PlantCatalog::new(self.plants)?;
        Ok((self.beds, catalog))
    }
}
