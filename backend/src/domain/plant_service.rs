//! Plant domain service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::fields::WriteMode;
use crate::domain::media::{discard, stage_image};
use crate::domain::ports::{ImageStore, PlantRepository, PlantRepositoryError, PlantService};
use crate::domain::{Caller, Error, ImageKind, Plant, PlantChanges, PlantId};

/// Owner-scoped plant service.
#[derive(Clone)]
pub struct PlantCatalogue<R, S> {
    plants: Arc<R>,
    images: Arc<S>,
}

impl<R, S> PlantCatalogue<R, S> {
    /// Create a service over the given adapters.
    pub fn new(plants: Arc<R>, images: Arc<S>) -> Self {
        Self { plants, images }
    }
}

/// Map plant repository failures onto domain errors.
pub(crate) fn map_plant_repository_error(error: PlantRepositoryError) -> Error {
    match error {
        PlantRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("plant repository unavailable: {message}"))
        }
        PlantRepositoryError::Query { message } => {
            Error::internal(format!("plant repository error: {message}"))
        }
    }
}

fn plant_not_found() -> Error {
    Error::not_found("plant not found")
}

impl<R, S> PlantCatalogue<R, S>
where
    R: PlantRepository,
    S: ImageStore,
{
    async fn fetch(&self, caller: &Caller, id: PlantId) -> Result<Plant, Error> {
        let plant = self
            .plants
            .find_for_owner(caller.account_id(), id)
            .await
            .map_err(map_plant_repository_error)?
            .ok_or_else(plant_not_found)?;
        caller.ensure_owns(&plant.created_by, "plant")?;
        Ok(plant)
    }
}

#[async_trait]
impl<R, S> PlantService for PlantCatalogue<R, S>
where
    R: PlantRepository,
    S: ImageStore,
{
    async fn list(&self, caller: &Caller) -> Result<Vec<Plant>, Error> {
        self.plants
            .list_for_owner(caller.account_id())
            .await
            .map_err(map_plant_repository_error)
    }

    async fn create(&self, caller: &Caller, changes: PlantChanges) -> Result<Plant, Error> {
        let mut changes = changes.validate(WriteMode::Create)?;
        let owner = *caller.account_id();
        let swap = stage_image(
            self.images.as_ref(),
            ImageKind::Plant,
            &owner,
            None,
            std::mem::take(&mut changes.plant_image),
        )
        .await?;
        let new_plant = changes.into_new_plant(owner, swap.next())?;
        match self.plants.insert(&new_plant).await {
            Ok(plant) => {
                swap.commit(self.images.as_ref()).await;
                info!(plant_id = %plant.id, account_id = %owner, "plant created");
                Ok(plant)
            }
            Err(error) => {
                swap.rollback(self.images.as_ref()).await;
                Err(map_plant_repository_error(error))
            }
        }
    }

    async fn retrieve(&self, caller: &Caller, id: PlantId) -> Result<Plant, Error> {
        self.fetch(caller, id).await
    }

    async fn update(
        &self,
        caller: &Caller,
        id: PlantId,
        changes: PlantChanges,
        mode: WriteMode,
    ) -> Result<Plant, Error> {
        let mut changes = changes.validate(mode)?;
        let mut plant = self.fetch(caller, id).await?;
        let swap = stage_image(
            self.images.as_ref(),
            ImageKind::Plant,
            &plant.created_by,
            plant.plant_image.as_ref(),
            std::mem::take(&mut changes.plant_image),
        )
        .await?;
        changes.apply_to(&mut plant);
        plant.plant_image = swap.next();

        match self.plants.update(&plant).await {
            Ok(true) => {
                swap.commit(self.images.as_ref()).await;
                Ok(plant)
            }
            Ok(false) => {
                swap.rollback(self.images.as_ref()).await;
                Err(plant_not_found())
            }
            Err(error) => {
                swap.rollback(self.images.as_ref()).await;
                Err(map_plant_repository_error(error))
            }
        }
    }

    async fn delete(&self, caller: &Caller, id: PlantId) -> Result<(), Error> {
        let plant = self.fetch(caller, id).await?;
        let removed = self
            .plants
            .delete(caller.account_id(), id)
            .await
            .map_err(map_plant_repository_error)?;
        if !removed {
            return Err(plant_not_found());
        }
        if let Some(path) = &plant.plant_image {
            discard(self.images.as_ref(), path).await;
        }
        info!(plant_id = %id, "plant deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockImageStore, MockPlantRepository};
    use crate::domain::{
        Account, AccountId, Email, ErrorCode, ImageChange, ImagePath, ImageUpload, NewPlant,
        PasswordHash,
    };
    use mockall::predicate::eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn caller() -> Caller {
        Caller::from_account(&Account::new(
            Email::parse("a@x.com").expect("email"),
            PasswordHash::from_phc("$argon2id$stub"),
        ))
    }

    fn fern(owner: AccountId) -> Plant {
        Plant {
            id: PlantId::new(1),
            common_name: "Fern".to_owned(),
            scientific_name: "Polypodiopsida".to_owned(),
            habitat: "Forest".to_owned(),
            origin: None,
            description: None,
            plant_image: None,
            created_by: owner,
        }
    }

    fn stored(new_plant: &NewPlant) -> Plant {
        Plant {
            id: PlantId::new(1),
            common_name: new_plant.common_name.clone(),
            scientific_name: new_plant.scientific_name.clone(),
            habitat: new_plant.habitat.clone(),
            origin: new_plant.origin.clone(),
            description: new_plant.description.clone(),
            plant_image: new_plant.plant_image.clone(),
            created_by: new_plant.created_by,
        }
    }

    fn changes() -> PlantChanges {
        PlantChanges {
            common_name: Some("Fern".to_owned()),
            scientific_name: Some("Polypodiopsida".to_owned()),
            habitat: Some("Forest".to_owned()),
            ..PlantChanges::default()
        }
    }

    fn service(
        repo: MockPlantRepository,
        images: MockImageStore,
    ) -> PlantCatalogue<MockPlantRepository, MockImageStore> {
        PlantCatalogue::new(Arc::new(repo), Arc::new(images))
    }

    #[rstest]
    #[tokio::test]
    async fn create_assigns_caller_as_owner(caller: Caller) {
        let owner = *caller.account_id();
        let mut repo = MockPlantRepository::new();
        repo.expect_insert()
            .withf(move |plant| plant.created_by == owner)
            .times(1)
            .returning(|plant| Ok(stored(plant)));

        let plant = service(repo, MockImageStore::new())
            .create(&caller, changes())
            .await
            .expect("created");
        assert_eq!(plant.created_by, owner);
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_missing_fields_before_touching_storage(caller: Caller) {
        let mut repo = MockPlantRepository::new();
        repo.expect_insert().never();
        let mut images = MockImageStore::new();
        images.expect_store().never();

        let upload =
            ImageUpload::from_bytes(ImageKind::Plant, b"GIF89a".to_vec()).expect("image");
        let err = service(repo, images)
            .create(
                &caller,
                PlantChanges {
                    common_name: Some("Fern".to_owned()),
                    plant_image: ImageChange::Replace(upload),
                    ..PlantChanges::default()
                },
            )
            .await
            .expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn create_stores_image_under_owner(caller: Caller) {
        let owner = *caller.account_id();
        let mut repo = MockPlantRepository::new();
        repo.expect_insert()
            .times(1)
            .returning(|plant| Ok(stored(plant)));
        let mut images = MockImageStore::new();
        images
            .expect_store()
            .withf(move |path, _| path.as_ref().starts_with(&format!("plants/{owner}/")))
            .times(1)
            .return_once(|_, _| Ok(()));

        let upload = ImageUpload::from_bytes(ImageKind::Plant, vec![0xFF, 0xD8, 0xFF, 0x00])
            .expect("jpeg");
        let plant = service(repo, images)
            .create(
                &caller,
                PlantChanges {
                    plant_image: ImageChange::Replace(upload),
                    ..changes()
                },
            )
            .await
            .expect("created");
        let path = plant.plant_image.expect("image recorded");
        assert!(path.as_ref().ends_with(".jpg"));
    }

    #[rstest]
    #[tokio::test]
    async fn retrieve_of_foreign_or_missing_plant_is_not_found(caller: Caller) {
        let mut repo = MockPlantRepository::new();
        repo.expect_find_for_owner()
            .with(eq(*caller.account_id()), eq(PlantId::new(9)))
            .times(1)
            .return_once(|_, _| Ok(None));

        let err = service(repo, MockImageStore::new())
            .retrieve(&caller, PlantId::new(9))
            .await
            .expect_err("not found");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn patch_keeps_owner_and_untouched_fields(caller: Caller) {
        let owner = *caller.account_id();
        let mut repo = MockPlantRepository::new();
        repo.expect_find_for_owner()
            .times(1)
            .return_once(move |_, _| Ok(Some(fern(owner))));
        repo.expect_update()
            .withf(move |plant| plant.created_by == owner && plant.habitat == "Bog")
            .times(1)
            .return_once(|_| Ok(true));

        let plant = service(repo, MockImageStore::new())
            .update(
                &caller,
                PlantId::new(1),
                PlantChanges {
                    habitat: Some("Bog".to_owned()),
                    ..PlantChanges::default()
                },
                WriteMode::Patch,
            )
            .await
            .expect("updated");
        assert_eq!(plant.common_name, "Fern");
        assert_eq!(plant.habitat, "Bog");
    }

    #[rstest]
    #[tokio::test]
    async fn replace_requires_required_fields(caller: Caller) {
        let mut repo = MockPlantRepository::new();
        repo.expect_find_for_owner().never();
        let err = service(repo, MockImageStore::new())
            .update(
                &caller,
                PlantId::new(1),
                PlantChanges {
                    habitat: Some("Bog".to_owned()),
                    ..PlantChanges::default()
                },
                WriteMode::Replace,
            )
            .await
            .expect_err("incomplete replace");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_removes_image_best_effort(caller: Caller) {
        let owner = *caller.account_id();
        let mut plant = fern(owner);
        plant.plant_image = Some(ImagePath::new(format!("plants/{owner}/a.png")));
        let mut repo = MockPlantRepository::new();
        repo.expect_find_for_owner()
            .times(1)
            .return_once(move |_, _| Ok(Some(plant)));
        repo.expect_delete().times(1).return_once(|_, _| Ok(true));
        let mut images = MockImageStore::new();
        images.expect_remove().times(1).return_once(|_| {
            Err(crate::domain::ports::ImageStoreError::io("permission denied"))
        });

        service(repo, images)
            .delete(&caller, PlantId::new(1))
            .await
            .expect("delete succeeds despite storage failure");
    }

    #[rstest]
    #[tokio::test]
    async fn outage_maps_to_service_unavailable(caller: Caller) {
        let mut repo = MockPlantRepository::new();
        repo.expect_list_for_owner()
            .times(1)
            .return_once(|_| Err(PlantRepositoryError::connection("refused")));
        let err = service(repo, MockImageStore::new())
            .list(&caller)
            .await
            .expect_err("outage");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
