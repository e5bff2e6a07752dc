//
//  graph-login
//  auth/keyring.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Session persistence in the system keyring
//!
//! The CLI keeps the [`SessionGrant`] returned by a successful login in the
//! platform keychain (macOS Keychain, Windows Credential Manager, Secret
//! Service on Linux), serialized as JSON under a per-app account name.

use anyhow::{Context, Result};
use keyring::Entry;

use super::login::SessionGrant;

const SERVICE_NAME: &str = "graph-login";

/// Stores login sessions in the system keyring, one per app id.
pub struct KeyringStore {
    service: String,
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    fn entry(&self, app_id: &str) -> Result<Entry> {
        Ok(Entry::new(&self.service, &account_name(app_id))?)
    }

    pub fn store(&self, app_id: &str, session: &SessionGrant) -> Result<()> {
        let json = serde_json::to_string(session)?;
        self.entry(app_id)?.set_password(&json)?;
        Ok(())
    }

    pub fn get(&self, app_id: &str) -> Result<Option<SessionGrant>> {
        match self.entry(app_id)?.get_password() {
            Ok(json) => Ok(Some(
                serde_json::from_str(&json).context("Stored session is corrupt; run 'graph auth logout'")?,
            )),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete(&self, app_id: &str) -> Result<()> {
        match self.entry(app_id)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn account_name(app_id: &str) -> String {
    if app_id.is_empty() {
        "session".to_string()
    } else {
        format!("session.{}", app_id)
    }
}
