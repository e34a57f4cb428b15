//! [`ItemRecord`]: the stored form of a vault item, including secret columns.

use chrono::{DateTime, Utc};
use common::protocol::{BillingDuration, ItemResponse, ItemType};
use uuid::Uuid;

use super::store::StoreError;
use crate::crypto::SealedSecret;

/// A vault item as held by the item store.
///
/// The three `secret_*` columns are either all set or all unset. They are
/// private so the only way out is [`ItemRecord::sealed_secret`], which
/// enforces that invariant.
#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub id: Uuid,
    pub user_id: String,
    pub item_type: ItemType,
    pub name: String,
    pub email: Option<String>,
    pub value: Option<f64>,
    pub billing_day: Option<u8>,
    pub duration: Option<BillingDuration>,
    pub notes: Option<String>,
    pub icon_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    secret_ciphertext: Option<String>,
    secret_iv: Option<String>,
    secret_auth_tag: Option<String>,
}

/// Validated field values for a new item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub item_type: ItemType,
    pub name: String,
    pub email: Option<String>,
    pub value: Option<f64>,
    pub billing_day: Option<u8>,
    pub duration: Option<BillingDuration>,
    pub notes: Option<String>,
    pub icon_path: Option<String>,
}

/// What to do with the stored secret on update.
#[derive(Debug, Clone, Default)]
pub enum SecretUpdate {
    #[default]
    Keep,
    Clear,
    Replace(SealedSecret),
}

/// Validated partial update. `None` leaves a field unchanged; for the
/// nullable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub item_type: Option<ItemType>,
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub value: Option<f64>,
    pub billing_day: Option<u8>,
    pub duration: Option<BillingDuration>,
    pub notes: Option<Option<String>>,
    pub icon_path: Option<Option<String>>,
    pub secret: SecretUpdate,
}

impl ItemRecord {
    /// Create a record for `user_id`, stamped with the current time.
    pub fn new(user_id: &str, item: NewItem, secret: Option<SealedSecret>) -> Self {
        let now = Utc::now();
        let mut record = Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_owned(),
            item_type: item.item_type,
            name: item.name,
            email: item.email,
            value: item.value,
            billing_day: item.billing_day,
            duration: item.duration,
            notes: item.notes,
            icon_path: item.icon_path,
            created_at: now,
            updated_at: now,
            secret_ciphertext: None,
            secret_iv: None,
            secret_auth_tag: None,
        };
        record.set_secret(secret);
        record
    }

    /// Return the stored secret, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InconsistentSecret`] if only some of the three
    /// columns are set.
    pub fn sealed_secret(&self) -> Result<Option<SealedSecret>, StoreError> {
        match (&self.secret_ciphertext, &self.secret_iv, &self.secret_auth_tag) {
            (None, None, None) => Ok(None),
            (Some(ciphertext), Some(iv), Some(auth_tag)) => Ok(Some(SealedSecret {
                ciphertext: ciphertext.clone(),
                iv: iv.clone(),
                auth_tag: auth_tag.clone(),
            })),
            _ => Err(StoreError::InconsistentSecret(self.id)),
        }
    }

    /// Replace or clear all three secret columns at once.
    pub fn set_secret(&mut self, secret: Option<SealedSecret>) {
        match secret {
            Some(s) => {
                self.secret_ciphertext = Some(s.ciphertext);
                self.secret_iv = Some(s.iv);
                self.secret_auth_tag = Some(s.auth_tag);
            }
            None => {
                self.secret_ciphertext = None;
                self.secret_iv = None;
                self.secret_auth_tag = None;
            }
        }
    }

    /// Apply a validated update. Does not touch `updated_at`.
    pub fn apply(&mut self, changes: ItemChanges) {
        if let Some(t) = changes.item_type {
            self.item_type = t;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(value) = changes.value {
            self.value = Some(value);
        }
        if let Some(day) = changes.billing_day {
            self.billing_day = Some(day);
        }
        if let Some(duration) = changes.duration {
            self.duration = Some(duration);
        }
        if let Some(notes) = changes.notes {
            self.notes = notes;
        }
        if let Some(icon_path) = changes.icon_path {
            self.icon_path = icon_path;
        }
        match changes.secret {
            SecretUpdate::Keep => {}
            SecretUpdate::Clear => self.set_secret(None),
            SecretUpdate::Replace(sealed) => self.set_secret(Some(sealed)),
        }
    }

    /// Public view without owner or secret columns.
    pub fn to_response(&self) -> ItemResponse {
        ItemResponse {
            id: self.id,
            item_type: self.item_type,
            name: self.name.clone(),
            email: self.email.clone(),
            value: self.value,
            billing_day: self.billing_day,
            duration: self.duration,
            notes: self.notes.clone(),
            icon_path: self.icon_path.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item() -> NewItem {
        NewItem {
            item_type: ItemType::Account,
            name: "Email".into(),
            email: Some("me@example.com".into()),
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

    #[test]
    fn new_record_without_secret() {
        let record = ItemRecord::new("u1", new_item(), None);
        assert!(record.sealed_secret().unwrap().is_none());
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn secret_columns_set_together() {
        let record = ItemRecord::new("u1", new_item(), Some(sealed()));
        assert_eq!(record.sealed_secret().unwrap(), Some(sealed()));
    }

    #[test]
    fn partial_columns_are_inconsistent() {
        let mut record = ItemRecord::new("u1", new_item(), Some(sealed()));
        record.secret_iv = None;
        assert!(matches!(
            record.sealed_secret(),
            Err(StoreError::InconsistentSecret(_))
        ));
    }

    #[test]
    fn apply_clears_and_replaces_secret() {
        let mut record = ItemRecord::new("u1", new_item(), Some(sealed()));
        record.apply(ItemChanges {
            secret: SecretUpdate::Clear,
            ..Default::default()
        });
        assert!(record.sealed_secret().unwrap().is_none());

        record.apply(ItemChanges {
            secret: SecretUpdate::Replace(sealed()),
            ..Default::default()
        });
        assert_eq!(record.sealed_secret().unwrap(), Some(sealed()));
    }

    #[test]
    fn apply_keeps_untouched_fields() {
        let mut record = ItemRecord::new("u1", new_item(), Some(sealed()));
        record.apply(ItemChanges {
            name: Some("Work email".into()),
            email: Some(None),
            ..Default::default()
        });
        assert_eq!(record.name, "Work email");
        assert_eq!(record.email, None);
        assert_eq!(record.item_type, ItemType::Account);
        assert!(record.sealed_secret().unwrap().is_some());
    }
}
