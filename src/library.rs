//! An owner's saved galleries.
//!
//! All galleries of one owner live under a single storage key,
//! `memora_galleries_<owner>`, as a JSON array in creation order. Every
//! operation reads the whole array and writes it back; libraries are small
//! and this keeps stored data readable by the web builder.
//!
//! Saving stamps timestamps and hands out ids:
//!
//! | Gallery id         | Effect of [`Library::save`]              |
//! |--------------------|------------------------------------------|
//! | empty              | new UUID assigned, appended              |
//! | existing id        | replaced in place, `createdAt` preserved |
//! | unknown id         | `LibraryError::NotFound`                 |
//! | `"shared"`         | `LibraryError::ReadOnly`                 |

use crate::storage::{StorageError, StoragePort};
use crate::types::Gallery;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("stored galleries are corrupt: {0}")]
    Json(#[from] serde_json::Error),
    #[error("shared galleries are read-only and cannot be saved")]
    ReadOnly,
    #[error("invalid gallery: {0}")]
    Validation(String),
    #[error("no saved gallery with id {0:?}")]
    NotFound(String),
}

/// Key holding the name of the last active user.
pub const CURRENT_USER_KEY: &str = "memora_current_user";
/// Key holding the JSON array of user records, `[{"username": ...}]`.
pub const USERS_KEY: &str = "memora_users";

/// One entry of [`USERS_KEY`]. Fields other than `username` (the web
/// builder also keeps a password) are carried through untouched.
#[derive(Serialize, Deserialize)]
struct UserRecord {
    username: String,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// Storage key holding all galleries of `owner`.
pub fn galleries_key(owner: &str) -> String {
    format!("memora_galleries_{owner}")
}

/// The last active user, if any.
pub fn current_user(storage: &impl StoragePort) -> Result<Option<String>, LibraryError> {
    Ok(storage
        .get(CURRENT_USER_KEY)?
        .filter(|name| !name.trim().is_empty()))
}

/// Make `name` the active user and add it to the known users.
pub fn switch_user(storage: &impl StoragePort, name: &str) -> Result<(), LibraryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LibraryError::Validation("user name must not be empty".into()));
    }
    let mut users = user_records(storage)?;
    if !users.iter().any(|u| u.username == name) {
        users.push(UserRecord {
            username: name.to_string(),
            extra: serde_json::Map::new(),
        });
        storage.set(USERS_KEY, &serde_json::to_string(&users)?)?;
    }
    storage.set(CURRENT_USER_KEY, name)?;
    Ok(())
}

/// Every user that has been active, in first-seen order.
pub fn known_users(storage: &impl StoragePort) -> Result<Vec<String>, LibraryError> {
    Ok(user_records(storage)?
        .into_iter()
        .map(|u| u.username)
        .collect())
}

fn user_records(storage: &impl StoragePort) -> Result<Vec<UserRecord>, LibraryError> {
    match storage.get(USERS_KEY)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

pub struct Library<S: StoragePort> {
    storage: S,
    owner: String,
}

impl<S: StoragePort> Library<S> {
    pub fn new(storage: S, owner: impl Into<String>) -> Self {
        Self {
            storage,
            owner: owner.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// All saved galleries, in the order they were first saved.
    pub fn list(&self) -> Result<Vec<Gallery>, LibraryError> {
        match self.storage.get(&galleries_key(&self.owner))? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn get(&self, id: &str) -> Result<Option<Gallery>, LibraryError> {
        Ok(self.list()?.into_iter().find(|g| g.id == id))
    }

    /// Validate, stamp and persist `gallery`; returns the stored form.
    pub fn save(&self, mut gallery: Gallery) -> Result<Gallery, LibraryError> {
        validate(&gallery)?;

        let mut galleries = self.list()?;
        let now = Utc::now();
        gallery.created_at.get_or_insert(now);
        gallery.updated_at = Some(now);

        if gallery.id.is_empty() {
            gallery.id = Uuid::new_v4().to_string();
            galleries.push(gallery.clone());
            info!(owner = %self.owner, id = %gallery.id, name = %gallery.name, "created gallery");
        } else {
            let slot = galleries
                .iter_mut()
                .find(|g| g.id == gallery.id)
                .ok_or_else(|| LibraryError::NotFound(gallery.id.clone()))?;
            gallery.created_at = slot.created_at.or(gallery.created_at);
            *slot = gallery.clone();
            info!(owner = %self.owner, id = %gallery.id, name = %gallery.name, "updated gallery");
        }

        self.write(&galleries)?;
        Ok(gallery)
    }

    /// Remove a gallery. Returns whether anything was deleted.
    pub fn delete(&self, id: &str) -> Result<bool, LibraryError> {
        let mut galleries = self.list()?;
        let before = galleries.len();
        galleries.retain(|g| g.id != id);
        if galleries.len() == before {
            return Ok(false);
        }
        self.write(&galleries)?;
        info!(owner = %self.owner, id, "deleted gallery");
        Ok(true)
    }

    fn write(&self, galleries: &[Gallery]) -> Result<(), LibraryError> {
        let json = serde_json::to_string(galleries)?;
        self.storage.set(&galleries_key(&self.owner), &json)?;
        Ok(())
    }
}

fn validate(gallery: &Gallery) -> Result<(), LibraryError> {
    if gallery.is_shared() {
        return Err(LibraryError::ReadOnly);
    }
    if gallery.name.trim().is_empty() {
        return Err(LibraryError::Validation(
            "please enter a gallery name".into(),
        ));
    }
    if gallery.artworks.is_empty() {
        return Err(LibraryError::Validation(
            "please add at least one artwork".into(),
        ));
    }
    Ok(())
}
