//! Observation records owned by a single account.
//!
//! An observation may point at one of the owner's plants. The reference is
//! weak: deleting the plant clears it and the observation survives.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::fields::{FieldError, WriteMode, optional_change, required_change};
use super::{AccountId, ImageChange, ImagePath, Plant, PlantId};

/// Maximum length of `location`.
pub const LOCATION_MAX: usize = 250;
/// Maximum length of `note`.
pub const NOTE_MAX: usize = 3000;

/// Store-assigned observation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationId(i64);

impl ObservationId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ObservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored observation with its related plant resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Identifier.
    pub id: ObservationId,
    /// Attached photograph.
    pub observation_image: Option<ImagePath>,
    /// Plant the observation refers to, if any.
    pub related_plant: Option<Plant>,
    /// Day of the observation.
    pub date: NaiveDate,
    /// Time of day of the observation.
    pub time: NaiveTime,
    /// Where it was made.
    pub location: String,
    /// Free-form notes.
    pub note: Option<String>,
    /// Owning account; fixed at creation.
    pub created_by: AccountId,
}

impl Observation {
    /// Writable columns of this observation.
    #[must_use]
    pub fn fields(&self) -> ObservationFields {
        ObservationFields {
            observation_image: self.observation_image.clone(),
            related_plant_id: self.related_plant.as_ref().map(|plant| plant.id),
            date: self.date,
            time: self.time,
            location: self.location.clone(),
            note: self.note.clone(),
            created_by: self.created_by,
        }
    }
}

/// Writable observation columns, used for inserts and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationFields {
    /// Stored photograph.
    pub observation_image: Option<ImagePath>,
    /// Referenced plant, which must belong to `created_by`.
    pub related_plant_id: Option<PlantId>,
    /// Day of the observation.
    pub date: NaiveDate,
    /// Time of day of the observation.
    pub time: NaiveTime,
    /// Where it was made.
    pub location: String,
    /// Free-form notes.
    pub note: Option<String>,
    /// Owning account.
    pub created_by: AccountId,
}

/// Client-supplied observation fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationChanges {
    /// New location.
    pub location: Option<String>,
    /// New note.
    pub note: Option<Option<String>>,
    /// New date; defaults to today on create.
    pub date: Option<NaiveDate>,
    /// New time; defaults to now on create.
    pub time: Option<NaiveTime>,
    /// New plant reference; `Some(None)` clears it.
    pub related_plant_id: Option<Option<PlantId>>,
    /// New photograph.
    pub observation_image: ImageChange,
}

impl ObservationChanges {
    /// Trim and bound present fields; require `location` unless patching.
    pub fn validate(self, mode: WriteMode) -> Result<Self, FieldError> {
        Ok(Self {
            location: required_change("location", self.location, LOCATION_MAX, mode)?,
            note: optional_change("note", self.note, NOTE_MAX)?,
            ..self
        })
    }

    /// Build insertable columns, defaulting date and time from `now`.
    pub fn into_fields(
        self,
        created_by: AccountId,
        observation_image: Option<ImagePath>,
        now: DateTime<Utc>,
    ) -> Result<ObservationFields, FieldError> {
        Ok(ObservationFields {
            observation_image,
            related_plant_id: self.related_plant_id.flatten(),
            date: self.date.unwrap_or_else(|| now.date_naive()),
            time: self.time.unwrap_or_else(|| now.time()),
            location: self.location.ok_or(FieldError::required("location"))?,
            note: self.note.flatten(),
            created_by,
        })
    }

    /// Apply the non-image changes to `fields`.
    pub fn apply_to(self, fields: &mut ObservationFields) {
        if let Some(value) = self.location {
            fields.location = value;
        }
        if let Some(value) = self.note {
            fields.note = value;
        }
        if let Some(value) = self.date {
            fields.date = value;
        }
        if let Some(value) = self.time {
            fields.time = value;
        }
        if let Some(value) = self.related_plant_id {
            fields.related_plant_id = value;
        }
    }
}
