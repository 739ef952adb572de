//! Boundaries to the collaborators that own case persistence and plant
//! master data. The engine never performs I/O itself; callers hand it a
//! loaded [`BusinessCase`].

use std::collections::BTreeMap;

use tracing::debug;

use super::model::{BusinessCase, PlantMaster};
use crate::error::BizCaseError;
use crate::BizCaseResult;

/// Load/save business cases by id. Implementations are expected to persist
/// the JSON form of [`BusinessCase`].
pub trait CaseStore {
    fn load(&self, id: &str) -> BizCaseResult<BusinessCase>;
    fn save(&mut self, case: &BusinessCase) -> BizCaseResult<()>;
    fn list(&self) -> Vec<String>;
}

/// Map-backed store for tests and batch runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCaseStore {
    cases: BTreeMap<String, BusinessCase>,
}

impl InMemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaseStore for InMemoryCaseStore {
    fn load(&self, id: &str) -> BizCaseResult<BusinessCase> {
        self.cases
            .get(id)
            .cloned()
            .ok_or_else(|| BizCaseError::NotFound(format!("business case '{id}'")))
    }

    fn save(&mut self, case: &BusinessCase) -> BizCaseResult<()> {
        if case.id.trim().is_empty() {
            return Err(BizCaseError::InvalidInput {
                field: "id".into(),
                reason: "Business case id must not be empty".into(),
            });
        }
        self.cases.insert(case.id.clone(), case.clone());
        Ok(())
    }

    fn list(&self) -> Vec<String> {
        self.cases.keys().cloned().collect()
    }
}

/// Plant-master reference data keyed by plant name.
pub trait PlantMasterLookup {
    fn find(&self, plant: &str) -> Option<&PlantMaster>;
    fn all(&self) -> &[PlantMaster];
}

impl PlantMasterLookup for [PlantMaster] {
    fn find(&self, plant: &str) -> Option<&PlantMaster> {
        self.iter().find(|pm| pm.plant.eq_ignore_ascii_case(plant))
    }

    fn all(&self) -> &[PlantMaster] {
        self
    }
}

impl PlantMasterLookup for Vec<PlantMaster> {
    fn find(&self, plant: &str) -> Option<&PlantMaster> {
        self.as_slice().find(plant)
    }

    fn all(&self) -> &[PlantMaster] {
        self.as_slice()
    }
}

/// Copy plant-master rates onto every SKU whose `npd.plant` is known to the
/// lookup. Returns the plant names that could not be resolved; those SKUs
/// keep their existing rates.
pub fn apply_plant_master<L: PlantMasterLookup + ?Sized>(
    case: &mut BusinessCase,
    lookup: &L,
) -> Vec<String> {
    let mut missing = Vec::new();
    for sku in &mut case.skus {
        let Some(plant) = sku.npd.plant.as_deref() else {
            continue;
        };
        match lookup.find(plant) {
            Some(pm) => {
                debug!(sku = %sku.id, plant, "applied plant master");
                sku.plant_master = pm.clone();
            }
            None => {
                if !missing.iter().any(|m: &String| m == plant) {
                    missing.push(plant.to_string());
                }
            }
        }
    }
    missing
}
