//! Input validation for item create and update requests.
//!
//! Rules:
//! - `name`: 1..=100 characters, required on create.
//! - `email`: at most 255 characters; empty string means "none".
//! - `notes`: at most 500 characters; empty string means "none".
//! - `value`: positive number; `""` or `null` means "not given".
//! - `billingDay`: whole number 1..=31; `""` or `null` means "not given".
//!
//! Passwords are passed through untouched; sealing is the service's job.

use common::protocol::{CreateItemRequest, NumberField, UpdateItemRequest};
use thiserror::Error;

use super::record::{ItemChanges, NewItem};

const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 255;
const NOTES_MAX: usize = 500;

/// A request field failed validation. The message is safe to return to callers.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

fn invalid(field: &'static str, message: &'static str) -> ValidationError {
    ValidationError { field, message }
}

/// What the caller asked to happen to the password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PasswordInput {
    #[default]
    Unchanged,
    Clear,
    Set(String),
}

/// A validated create request: the item fields plus the plaintext password.
#[derive(Debug, Clone)]
pub struct ValidCreate {
    pub item: NewItem,
    pub password: Option<String>,
}

/// A validated update request. `changes.secret` is always
/// [`super::record::SecretUpdate::Keep`]; the service turns `password` into
/// the real secret update once it has sealed it.
#[derive(Debug, Clone, Default)]
pub struct ValidUpdate {
    pub changes: ItemChanges,
    pub password: PasswordInput,
}

/// Validate a create request.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate_create(req: CreateItemRequest) -> Result<ValidCreate, ValidationError> {
    let item_type = req.item_type.ok_or(invalid("type", "Type is required"))?;
    let name = req.name.ok_or(invalid("name", "Name is required"))?;
    check_name(&name)?;

    let item = NewItem {
        item_type,
        name,
        email: optional_text(req.email, "email", EMAIL_MAX)?,
        value: parse_value(req.value.as_ref())?,
        billing_day: parse_billing_day(req.billing_day.as_ref())?,
        duration: req.duration,
        notes: optional_text(req.notes, "notes", NOTES_MAX)?,
        icon_path: req.icon_path.filter(|p| !p.is_empty()),
    };

    Ok(ValidCreate {
        item,
        password: req.password.filter(|p| !p.is_empty()),
    })
}

/// Validate a partial update request.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate_update(req: UpdateItemRequest) -> Result<ValidUpdate, ValidationError> {
    if let Some(name) = &req.name {
        check_name(name)?;
    }

    let email = match req.email {
        Some(e) => Some(optional_text(Some(e), "email", EMAIL_MAX)?),
        None => None,
    };
    let notes = match req.notes {
        Some(n) => Some(optional_text(Some(n), "notes", NOTES_MAX)?),
        None => None,
    };

    let changes = ItemChanges {
        item_type: req.item_type,
        name: req.name,
        email,
        value: parse_value(req.value.as_ref())?,
        billing_day: parse_billing_day(req.billing_day.as_ref())?,
        duration: req.duration,
        notes,
        icon_path: req.icon_path.map(|p| Some(p).filter(|p| !p.is_empty())),
        ..Default::default()
    };

    Ok(ValidUpdate {
        changes,
        password: match req.password {
            None => PasswordInput::Unchanged,
            Some(p) if p.is_empty() => PasswordInput::Clear,
            Some(p) => PasswordInput::Set(p),
        },
    })
}

fn check_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len == 0 {
        return Err(invalid("name", "Name is required"));
    }
    if len > NAME_MAX {
        return Err(invalid("name", "Name must be at most 100 characters"));
    }
    Ok(())
}

fn optional_text(
    value: Option<String>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value {
        Some(v) if v.chars().count() > max => Err(invalid(field, "Value is too long")),
        Some(v) if v.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Coerce a number-or-string field. Blank strings count as "not given".
fn number(field: Option<&NumberField>, name: &'static str) -> Result<Option<f64>, ValidationError> {
    match field {
        None => Ok(None),
        Some(NumberField::Number(n)) => Ok(Some(*n)),
        Some(NumberField::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberField::Text(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or(invalid(name, "Expected a number")),
    }
}

fn parse_value(field: Option<&NumberField>) -> Result<Option<f64>, ValidationError> {
    match number(field, "value")? {
        Some(v) if v <= 0.0 => Err(invalid("value", "Value must be positive")),
        other => Ok(other),
    }
}

fn parse_billing_day(field: Option<&NumberField>) -> Result<Option<u8>, ValidationError> {
    match number(field, "billingDay")? {
        None => Ok(None),
        Some(d) if d.fract() == 0.0 && (1.0..=31.0).contains(&d) => Ok(Some(d as u8)),
        Some(_) => Err(invalid("billingDay", "Billing day must be between 1 and 31")),
    }
}
