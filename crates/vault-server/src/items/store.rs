//! [`ItemStore`]: thread-safe in-process store of vault items.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use common::protocol::{ItemResponse, ItemType};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::record::{ItemChanges, ItemRecord};
use crate::crypto::SealedSecret;

/// Errors produced by the item store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No item with this id belongs to the requesting user.
    #[error("item not found")]
    NotFound,

    /// Only some of the secret columns are set on a stored record.
    #[error("item {0} has partially populated secret columns")]
    InconsistentSecret(Uuid),
}

/// Filters for [`ItemStore::list`].
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub item_type: Option<ItemType>,
    /// Case-insensitive substring of the item name.
    pub search: Option<String>,
}

/// Item store keyed by item id.
///
/// Every read and write is scoped by owner: an item belonging to another user
/// behaves exactly like a missing one. Listing methods return
/// [`ItemResponse`]s so secret columns never leave the store on those paths.
#[derive(Clone, Debug, Default)]
pub struct ItemStore {
    inner: Arc<RwLock<HashMap<Uuid, ItemRecord>>>,
}

impl ItemStore {
    /// Create a new, empty [`ItemStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning its public view.
    pub async fn insert(&self, record: ItemRecord) -> ItemResponse {
        let response = record.to_response();
        self.inner.write().await.insert(record.id, record);
        response
    }

    /// List a user's items, newest first.
    pub async fn list(&self, user_id: &str, filter: &ItemFilter) -> Vec<ItemResponse> {
        let needle = filter
            .search
            .as_deref()
            .map(str::to_lowercase)
            .filter(|s| !s.is_empty());

        let lock = self.inner.read().await;
        let mut items: Vec<&ItemRecord> = lock
            .values()
            .filter(|r| r.user_id == user_id)
            .filter(|r| filter.item_type.map_or(true, |t| r.item_type == t))
            .filter(|r| {
                needle
                    .as_deref()
                    .map_or(true, |n| r.name.to_lowercase().contains(n))
            })
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.into_iter().map(ItemRecord::to_response).collect()
    }

    /// Fetch the public view of one item.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the item is missing or not owned.
    pub async fn get(&self, user_id: &str, id: Uuid) -> Result<ItemResponse, StoreError> {
        let lock = self.inner.read().await;
        owned(&lock, user_id, id).map(ItemRecord::to_response)
    }

    /// Fetch only the sealed secret of one item.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the item is missing or not owned,
    /// and [`StoreError::InconsistentSecret`] on partial secret columns.
    pub async fn sealed_secret(
        &self,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<SealedSecret>, StoreError> {
        let lock = self.inner.read().await;
        owned(&lock, user_id, id)?.sealed_secret()
    }

    /// Apply `changes` to an owned item under the write lock and bump
    /// `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the item is missing or not owned.
    pub async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        changes: ItemChanges,
    ) -> Result<ItemResponse, StoreError> {
        let mut lock = self.inner.write().await;
        let record = lock
            .get_mut(&id)
            .filter(|r| r.user_id == user_id)
            .ok_or(StoreError::NotFound)?;
        record.apply(changes);
        record.updated_at = Utc::now();
        Ok(record.to_response())
    }

    /// Delete an owned item.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the item is missing or not owned.
    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<(), StoreError> {
        let mut lock = self.inner.write().await;
        owned(&lock, user_id, id)?;
        lock.remove(&id);
        Ok(())
    }

    /// All subscriptions of a user, newest first.
    pub async fn subscriptions(&self, user_id: &str) -> Vec<ItemResponse> {
        let filter = ItemFilter {
            item_type: Some(ItemType::Subscription),
            search: None,
        };
        self.list(user_id, &filter).await
    }
}

fn owned<'a>(
    map: &'a HashMap<Uuid, ItemRecord>,
    user_id: &str,
    id: Uuid,
) -> Result<&'a ItemRecord, StoreError> {
    map.get(&id)
        .filter(|r| r.user_id == user_id)
        .ok_or(StoreError::NotFound)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::items::record::{NewItem, SecretUpdate};

    fn item(name: &str, item_type: ItemType) -> NewItem {
        NewItem {
            item_type,
            name: name.into(),
            email: None,
            value: None,
            billing_day: None,
            duration: None,
            notes: None,
            icon_path: None,
        }
    }

    fn sealed() -> SealedSecret {
        SealedSecret {
            ciphertext: "Y3Q=".into(),
            iv: "aXY=".into(),
            auth_tag: "dGFn".into(),
        }
    }

    #[tokio::test]
    async fn insert_and_get() {
        let store = ItemStore::new();
        let created = store
            .insert(ItemRecord::new("alice", item("Netflix", ItemType::Subscription), None))
            .await;
        let fetched = store.get("alice", created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn other_users_items_are_invisible() {
        let store = ItemStore::new();
        let created = store
            .insert(ItemRecord::new("alice", item("Bank", ItemType::Account), Some(sealed())))
            .await;

        assert!(matches!(store.get("bob", created.id).await, Err(StoreError::NotFound)));
        assert!(matches!(
            store.sealed_secret("bob", created.id).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.update("bob", created.id, ItemChanges::default()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(store.delete("bob", created.id).await, Err(StoreError::NotFound)));
        assert!(store.list("bob", &ItemFilter::default()).await.is_empty());

        // Still there for the owner.
        assert!(store.get("alice", created.id).await.is_ok());
    }

    #[tokio::test]
    async fn list_filters_and_orders_newest_first() {
        let store = ItemStore::new();
        let base = Utc::now();
        for (i, (name, t)) in [
            ("Netflix", ItemType::Subscription),
            ("Spotify", ItemType::Subscription),
            ("Gmail", ItemType::Account),
        ]
        .into_iter()
        .enumerate()
        {
            let mut record = ItemRecord::new("alice", item(name, t), None);
            record.created_at = base + Duration::seconds(i as i64);
            store.insert(record).await;
        }

        let all = store.list("alice", &ItemFilter::default()).await;
        let names: Vec<_> = all.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Gmail", "Spotify", "Netflix"]);

        let subs = store.subscriptions("alice").await;
        assert_eq!(subs.len(), 2);

        let filter = ItemFilter {
            item_type: None,
            search: Some("FLIX".into()),
        };
        let found = store.list("alice", &filter).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Netflix");
    }

    #[tokio::test]
    async fn update_replaces_secret_and_bumps_timestamp() {
        let store = ItemStore::new();
        let created = store
            .insert(ItemRecord::new("alice", item("Bank", ItemType::Account), None))
            .await;
        let changes = ItemChanges {
            secret: SecretUpdate::Replace(sealed()),
            ..Default::default()
        };
        let updated = store.update("alice", created.id, changes).await.unwrap();
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(
            store.sealed_secret("alice", created.id).await.unwrap(),
            Some(sealed())
        );
    }

    #[tokio::test]
    async fn delete_removes_item() {
        let store = ItemStore::new();
        let created = store
            .insert(ItemRecord::new("alice", item("Bank", ItemType::Account), None))
            .await;
        store.delete("alice", created.id).await.unwrap();
        assert!(matches!(store.get("alice", created.id).await, Err(StoreError::NotFound)));
    }
}
