//! In-memory adapters for the driven persistence ports.
//!
//! [`MemoryStore`] keeps every table behind a single mutex and implements
//! the account, plant, observation, and blacklist ports. Deleting an account
//! cascades to its records and deleting a plant clears the relation on the
//! observations that referenced it, mirroring the foreign keys of the
//! PostgreSQL schema. Used when no database is configured and by the HTTP
//! integration tests.

mod accounts;
mod blacklist;
mod records;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::domain::{
    Account, AccountId, Observation, ObservationFields, ObservationId, Plant, PlantId,
    RevokedToken,
};

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    plants: BTreeMap<PlantId, Plant>,
    observations: BTreeMap<ObservationId, ObservationFields>,
    blacklist: HashMap<Uuid, RevokedToken>,
    last_plant_id: i64,
    last_observation_id: i64,
}

impl Tables {
    fn next_plant_id(&mut self) -> PlantId {
        self.last_plant_id += 1;
        PlantId::new(self.last_plant_id)
    }

    fn next_observation_id(&mut self) -> ObservationId {
        self.last_observation_id += 1;
        ObservationId::new(self.last_observation_id)
    }

    /// Join an observation row with its related plant.
    fn observation(&self, id: ObservationId, fields: &ObservationFields) -> Observation {
        Observation {
            id,
            observation_image: fields.observation_image.clone(),
            related_plant: fields
                .related_plant_id
                .and_then(|plant_id| self.plants.get(&plant_id).cloned()),
            date: fields.date,
            time: fields.time,
            location: fields.location.clone(),
            note: fields.note.clone(),
            created_by: fields.created_by,
        }
    }

    fn remove_plant(&mut self, id: PlantId) -> bool {
        if self.plants.remove(&id).is_none() {
            return false;
        }
        for fields in self.observations.values_mut() {
            if fields.related_plant_id == Some(id) {
                fields.related_plant_id = None;
            }
        }
        true
    }

    fn remove_account(&mut self, id: &AccountId) -> bool {
        if self.accounts.remove(id).is_none() {
            return false;
        }
        self.observations.retain(|_, fields| fields.created_by != *id);
        let owned: Vec<PlantId> = self
            .plants
            .values()
            .filter(|plant| plant.created_by == *id)
            .map(|plant| plant.id)
            .collect();
        for plant_id in owned {
            self.remove_plant(plant_id);
        }
        self.blacklist.retain(|_, entry| entry.account_id != *id);
        true
    }
}

/// Mutex-guarded store implementing every persistence port.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use greenleaf::outbound::memory::MemoryStore;
///
/// let store = Arc::new(MemoryStore::default());
/// let plants = Arc::clone(&store);
/// # drop(plants);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the tables, reporting a poisoned mutex through `poisoned`.
    fn tables<E>(
        &self,
        poisoned: impl FnOnce(&'static str) -> E,
    ) -> Result<MutexGuard<'_, Tables>, E> {
        self.tables
            .lock()
            .map_err(|_| poisoned("in-memory store lock poisoned"))
    }
}
