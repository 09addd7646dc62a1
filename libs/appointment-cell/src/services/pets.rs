use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::RepositoryError;

/// Narrow view of the pet registry used for existence and ownership checks.
#[async_trait]
pub trait PetDirectory: Send + Sync {
    /// Owner of the pet, or `None` when the pet does not exist.
    async fn pet_owner(&self, pet_id: Uuid) -> Result<Option<Uuid>, RepositoryError>;

    async fn pets_owned_by(&self, user_id: Uuid) -> Result<HashSet<Uuid>, RepositoryError>;
}

#[derive(Default)]
pub struct InMemoryPetDirectory {
    owners: RwLock<HashMap<Uuid, Uuid>>,
}

impl InMemoryPetDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, pet_id: Uuid, owner_id: Uuid) {
        self.owners.write().await.insert(pet_id, owner_id);
    }
}

#[async_trait]
impl PetDirectory for InMemoryPetDirectory {
    async fn pet_owner(&self, pet_id: Uuid) -> Result<Option<Uuid>, RepositoryError> {
        Ok(self.owners.read().await.get(&pet_id).copied())
    }

    async fn pets_owned_by(&self, user_id: Uuid) -> Result<HashSet<Uuid>, RepositoryError> {
        Ok(self
            .owners
            .read()
            .await
            .iter()
            .filter(|(_, owner)| **owner == user_id)
            .map(|(pet, _)| *pet)
            .collect())
    }
}
