//! [`ItemService`]: item CRUD with encrypt-on-write and explicit secret reveal.

use common::protocol::{
    CreateItemRequest, DashboardStats, ItemResponse, UpcomingBilling, UpdateItemRequest,
};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::record::{ItemRecord, SecretUpdate};
use super::store::{ItemFilter, ItemStore, StoreError};
use super::validate::{
    validate_create, validate_update, PasswordInput, ValidUpdate, ValidationError,
};
use crate::crypto::{CipherError, SecretCipher};

/// Number of entries returned in [`DashboardStats::upcoming_billings`].
const UPCOMING_LIMIT: usize = 5;

/// Errors produced by the item service.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Item lifecycle on top of an [`ItemStore`] and a [`SecretCipher`].
#[derive(Clone, Debug)]
pub struct ItemService {
    store: ItemStore,
    cipher: SecretCipher,
}

impl ItemService {
    pub fn new(store: ItemStore, cipher: SecretCipher) -> Self {
        Self { store, cipher }
    }

    /// Items owned by `user_id`, newest first. Never includes secrets.
    pub async fn list(&self, user_id: &str, filter: &ItemFilter) -> Vec<ItemResponse> {
        self.store.list(user_id, filter).await
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the item is missing or not owned.
    pub async fn get(&self, user_id: &str, id: Uuid) -> Result<ItemResponse, ItemError> {
        Ok(self.store.get(user_id, id).await?)
    }

    /// Validate and store a new item, sealing its password if one was given.
    ///
    /// An empty or absent password stores no secret at all.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::Validation`] on invalid input.
    pub async fn create(
        &self,
        user_id: &str,
        req: CreateItemRequest,
    ) -> Result<ItemResponse, ItemError> {
        let valid = validate_create(req)?;
        let sealed = match valid.password.as_deref() {
            Some(p) => Some(self.cipher.seal(p)?),
            None => None,
        };
        let created = self
            .store
            .insert(ItemRecord::new(user_id, valid.item, sealed))
            .await;
        debug!(item_id = %created.id, "item created");
        Ok(created)
    }

    /// Apply a partial update. A non-empty password is re-sealed under a fresh
    /// IV; an empty one clears the stored secret.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::Validation`] on invalid input and
    /// [`StoreError::NotFound`] if the item is missing or not owned.
    pub async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        req: UpdateItemRequest,
    ) -> Result<ItemResponse, ItemError> {
        let ValidUpdate {
            mut changes,
            password,
        } = validate_update(req)?;
        changes.secret = match password {
            PasswordInput::Unchanged => SecretUpdate::Keep,
            PasswordInput::Clear => SecretUpdate::Clear,
            PasswordInput::Set(p) => SecretUpdate::Replace(self.cipher.seal(&p)?),
        };
        let updated = self.store.update(user_id, id, changes).await?;
        debug!(item_id = %id, "item updated");
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the item is missing or not owned.
    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<(), ItemError> {
        self.store.delete(user_id, id).await?;
        debug!(item_id = %id, "item deleted");
        Ok(())
    }

    /// Decrypt the item's secret. `Ok(None)` means no secret is set; the
    /// cipher is not invoked in that case.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the item is missing or not owned,
    /// [`StoreError::InconsistentSecret`] on partial secret columns, and
    /// [`ItemError::Cipher`] if the stored secret cannot be opened.
    pub async fn reveal_secret(&self, user_id: &str, id: Uuid) -> Result<Option<String>, ItemError> {
        match self.store.sealed_secret(user_id, id).await? {
            Some(sealed) => Ok(Some(self.cipher.open(&sealed)?)),
            None => Ok(None),
        }
    }

    /// Monthly spend and the next billings across the user's subscriptions.
    pub async fn dashboard(&self, user_id: &str) -> DashboardStats {
        dashboard_stats(&self.store.subscriptions(user_id).await)
    }
}

/// Aggregate subscriptions that have both a value and a duration.
///
/// Each value is normalised to a monthly amount (÷1, ÷6, ÷12). Only those
/// with a billing day are listed as upcoming, ordered by day.
pub fn dashboard_stats(subscriptions: &[ItemResponse]) -> DashboardStats {
    let mut monthly_total = 0.0;
    let mut upcoming = Vec::new();

    for item in subscriptions {
        let (Some(value), Some(duration)) = (item.value, item.duration) else {
            continue;
        };
        monthly_total += value / f64::from(duration.months());

        if let Some(billing_day) = item.billing_day {
            upcoming.push(UpcomingBilling {
                id: item.id,
                name: item.name.clone(),
                value,
                billing_day,
                duration,
            });
        }
    }

    upcoming.sort_by_key(|u| u.billing_day);
    upcoming.truncate(UPCOMING_LIMIT);

    DashboardStats {
        monthly_total: (monthly_total * 100.0).round() / 100.0,
        upcoming_billings: upcoming,
    }
}
