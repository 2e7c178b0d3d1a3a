//! JSON layout of the mirrored store.
//!
//! Maps are written as association lists (`[[id, record], ...]`) so the
//! files stay readable and ordering carries no meaning. Dates are RFC 3339
//! strings and are parsed back into typed values on load.

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use uuid::Uuid;

use crate::model::AuthUser;
use crate::storage::Storage;

pub(crate) const USERS_KEY: &str = "users";
pub(crate) const SESSIONS_KEY: &str = "verificationSessions";
pub(crate) const CURRENT_USER_KEY: &str = "currentUser";

pub(crate) fn save_entries<T: Serialize>(
    storage: &dyn Storage,
    key: &str,
    entries: &HashMap<Uuid, T>,
) -> Result<()> {
    let list: Vec<(&Uuid, &T)> = entries.iter().collect();
    let value = serde_json::to_string(&list).with_context(|| format!("failed to serialize {key}"))?;
    storage.set_item(key, &value)
}

pub(crate) fn load_entries<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<HashMap<Uuid, T>> {
    let Some(value) = storage.get_item(key)? else {
        return Ok(HashMap::new());
    };
    let list: Vec<(Uuid, T)> =
        serde_json::from_str(&value).with_context(|| format!("failed to parse {key}"))?;
    Ok(list.into_iter().collect())
}

pub(crate) fn save_current_user(storage: &dyn Storage, current: Option<&AuthUser>) -> Result<()> {
    match current {
        Some(auth) => {
            let value = serde_json::to_string(auth).context("failed to serialize current user")?;
            storage.set_item(CURRENT_USER_KEY, &value)
        }
        None => storage.remove_item(CURRENT_USER_KEY),
    }
}

pub(crate) fn load_current_user(storage: &dyn Storage) -> Result<Option<AuthUser>> {
    let Some(value) = storage.get_item(CURRENT_USER_KEY)? else {
        return Ok(None);
    };
    let auth = serde_json::from_str(&value).context("failed to parse current user")?;
    Ok(Some(auth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{User, fixtures::registration};
    use crate::storage::MemoryStorage;
    use chrono::Utc;

    #[test]
    fn entries_are_written_as_association_list() -> Result<()> {
        let storage = MemoryStorage::new();
        let id = Uuid::new_v4();
        let mut entries = HashMap::new();
        entries.insert(id, "value".to_string());

        save_entries(&storage, USERS_KEY, &entries)?;

        let raw = storage.get_item(USERS_KEY)?.context("missing users")?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        assert_eq!(value.pointer("/0/0").and_then(|v| v.as_str()), Some(id.to_string().as_str()));
        assert_eq!(value.pointer("/0/1").and_then(|v| v.as_str()), Some("value"));

        let loaded: HashMap<Uuid, String> = load_entries(&storage, USERS_KEY)?;
        assert_eq!(loaded, entries);
        Ok(())
    }

    #[test]
    fn missing_key_loads_empty() -> Result<()> {
        let storage = MemoryStorage::new();
        let loaded: HashMap<Uuid, String> = load_entries(&storage, SESSIONS_KEY)?;
        assert!(loaded.is_empty());
        assert_eq!(load_current_user(&storage)?, None);
        Ok(())
    }

    #[test]
    fn corrupt_value_is_an_error() -> Result<()> {
        let storage = MemoryStorage::new();
        storage.set_item(USERS_KEY, "{not json")?;
        assert!(load_entries::<String>(&storage, USERS_KEY).is_err());
        Ok(())
    }

    #[test]
    fn current_user_is_removed_when_cleared() -> Result<()> {
        let storage = MemoryStorage::new();
        let user = User::from_registration(Uuid::new_v4(), registration("bob", "b@x.io"), Utc::now());
        let auth = AuthUser { user };

        save_current_user(&storage, Some(&auth))?;
        assert_eq!(load_current_user(&storage)?, Some(auth));

        save_current_user(&storage, None)?;
        assert_eq!(storage.get_item(CURRENT_USER_KEY)?, None);
        Ok(())
    }
}
