use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_PREFIX: &str = "newsdesk";

/// Remembered passwords in the OS keychain.
///
/// Entries are scoped to one backend, so the same username on a staging and
/// a production server gets two separate entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialStore {
    service: String,
}

impl CredentialStore {
    pub fn for_backend(base_url: &str) -> Self {
        let host = base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(base_url)
            .trim_end_matches('/');
        Self {
            service: format!("{}:{}", SERVICE_PREFIX, host),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, username: &str) -> Result<Entry> {
        Entry::new(&self.service, username).context("Failed to create keyring entry")
    }

    pub fn store(&self, username: &str, password: &str) -> Result<()> {
        self.entry(username)?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    pub fn get_password(&self, username: &str) -> Result<String> {
        self.entry(username)?
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    pub fn delete(&self, username: &str) -> Result<()> {
        self.entry(username)?
            .delete_credential()
            .context("Failed to delete credential from keychain")
    }
}
