//! Plant records owned by a single account.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::fields::{FieldError, WriteMode, optional_change, required_change};
use super::{AccountId, ImageChange, ImagePath};

/// Maximum length of `common_name`, `scientific_name`, and `habitat`.
pub const PLANT_NAME_MAX: usize = 255;
/// Maximum length of `origin`.
pub const ORIGIN_MAX: usize = 100;
/// Maximum length of `description`.
pub const DESCRIPTION_MAX: usize = 3000;

/// Store-assigned plant identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlantId(i64);

impl PlantId {
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

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored plant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plant {
    /// Identifier.
    pub id: PlantId,
    /// Vernacular name.
    pub common_name: String,
    /// Binomial name.
    pub scientific_name: String,
    /// Where the plant grows.
    pub habitat: String,
    /// Geographic origin.
    pub origin: Option<String>,
    /// Free-form notes.
    pub description: Option<String>,
    /// Attached photograph.
    pub plant_image: Option<ImagePath>,
    /// Owning account; fixed at creation.
    pub created_by: AccountId,
}

/// Plant awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlant {
    /// Vernacular name.
    pub common_name: String,
    /// Binomial name.
    pub scientific_name: String,
    /// Where the plant grows.
    pub habitat: String,
    /// Geographic origin.
    pub origin: Option<String>,
    /// Free-form notes.
    pub description: Option<String>,
    /// Stored photograph.
    pub plant_image: Option<ImagePath>,
    /// Owning account.
    pub created_by: AccountId,
}

/// Client-supplied plant fields.
///
/// Required fields are `Option<String>` so a `PATCH` can omit them;
/// optional fields are double options so `null` can clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlantChanges {
    /// New vernacular name.
    pub common_name: Option<String>,
    /// New binomial name.
    pub scientific_name: Option<String>,
    /// New habitat.
    pub habitat: Option<String>,
    /// New origin.
    pub origin: Option<Option<String>>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New photograph.
    pub plant_image: ImageChange,
}

impl PlantChanges {
    /// Trim and bound every present field; require the named fields unless
    /// `mode` is [`WriteMode::Patch`].
    ///
    /// # Examples
    /// ```
    /// use greenleaf::domain::fields::WriteMode;
    /// use greenleaf::domain::PlantChanges;
    ///
    /// let changes = PlantChanges {
    ///     common_name: Some("Fern".into()),
    ///     scientific_name: Some("Polypodiopsida".into()),
    ///     habitat: Some("Forest".into()),
    ///     ..PlantChanges::default()
    /// };
    /// assert!(changes.clone().validate(WriteMode::Create).is_ok());
    ///
    /// let partial = PlantChanges { habitat: Some("Bog".into()), ..PlantChanges::default() };
    /// assert!(partial.clone().validate(WriteMode::Patch).is_ok());
    /// assert!(partial.validate(WriteMode::Replace).is_err());
    /// ```
    pub fn validate(self, mode: WriteMode) -> Result<Self, FieldError> {
        Ok(Self {
            common_name: required_change("common_name", self.common_name, PLANT_NAME_MAX, mode)?,
            scientific_name: required_change(
                "scientific_name",
                self.scientific_name,
                PLANT_NAME_MAX,
                mode,
            )?,
            habitat: required_change("habitat", self.habitat, PLANT_NAME_MAX, mode)?,
            origin: optional_change("origin", self.origin, ORIGIN_MAX)?,
            description: optional_change("description", self.description, DESCRIPTION_MAX)?,
            plant_image: self.plant_image,
        })
    }

    /// Build an insertable plant from validated create input.
    pub fn into_new_plant(
        self,
        created_by: AccountId,
        plant_image: Option<ImagePath>,
    ) -> Result<NewPlant, FieldError> {
        Ok(NewPlant {
            common_name: self
                .common_name
                .ok_or(FieldError::required("common_name"))?,
            scientific_name: self
                .scientific_name
                .ok_or(FieldError::required("scientific_name"))?,
            habitat: self.habitat.ok_or(FieldError::required("habitat"))?,
            origin: self.origin.flatten(),
            description: self.description.flatten(),
            plant_image,
            created_by,
        })
    }

    /// Apply the text changes to `plant`. The image is handled by the caller.
    pub fn apply_to(self, plant: &mut Plant) {
        if let Some(value) = self.common_name {
            plant.common_name = value;
        }
        if let Some(value) = self.scientific_name {
            plant.scientific_name = value;
        }
        if let Some(value) = self.habitat {
            plant.habitat = value;
        }
        if let Some(value) = self.origin {
            plant.origin = value;
        }
        if let Some(value) = self.description {
            plant.description = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fields::FieldErrorKind;
    use rstest::{fixture, rstest};

    #[fixture]
    fn fern() -> PlantChanges {
        PlantChanges {
            common_name: Some("Fern".to_owned()),
            scientific_name: Some("Polypodiopsida".to_owned()),
            habitat: Some("Forest".to_owned()),
            ..PlantChanges::default()
        }
    }

    #[fixture]
    fn stored() -> Plant {
        Plant {
            id: PlantId::new(7),
            common_name: "Fern".to_owned(),
            scientific_name: "Polypodiopsida".to_owned(),
            habitat: "Forest".to_owned(),
            origin: Some("Peru".to_owned()),
            description: None,
            plant_image: None,
            created_by: AccountId::random(),
        }
    }

    #[rstest]
    fn create_builds_insertable(fern: PlantChanges) {
        let owner = AccountId::random();
        let new_plant = fern
            .validate(WriteMode::Create)
            .and_then(|changes| changes.into_new_plant(owner, None))
            .expect("valid plant");
        assert_eq!(new_plant.common_name, "Fern");
        assert_eq!(new_plant.created_by, owner);
        assert_eq!(new_plant.origin, None);
    }

    #[rstest]
    #[case("common_name")]
    #[case("scientific_name")]
    #[case("habitat")]
    fn create_requires_named_fields(fern: PlantChanges, #[case] field: &str) {
        let mut changes = fern;
        match field {
            "common_name" => changes.common_name = None,
            "scientific_name" => changes.scientific_name = None,
            _ => changes.habitat = None,
        }
        let err = changes.validate(WriteMode::Create).expect_err("missing field");
        assert_eq!(err.field(), field);
        assert_eq!(err.kind(), &FieldErrorKind::Required);
    }

    #[rstest]
    fn limits_are_enforced(fern: PlantChanges) {
        let changes = PlantChanges {
            origin: Some(Some("x".repeat(ORIGIN_MAX + 1))),
            ..fern
        };
        let err = changes.validate(WriteMode::Create).expect_err("origin too long");
        assert_eq!(err.field(), "origin");
    }

    #[rstest]
    fn patch_touches_only_present_fields(stored: Plant) {
        let mut plant = stored;
        PlantChanges {
            description: Some(Some("Fronds".to_owned())),
            origin: Some(None),
            ..PlantChanges::default()
        }
        .validate(WriteMode::Patch)
        .expect("valid patch")
        .apply_to(&mut plant);

        assert_eq!(plant.common_name, "Fern");
        assert_eq!(plant.origin, None);
        assert_eq!(plant.description.as_deref(), Some("Fronds"));
    }
}
