use std::error::Error;
use std::fmt;

use keyring::Entry;

const KEYRING_SERVICE: &str = "beautydesk";
const KEYRING_ACCOUNT: &str = "access-token";

/// Describes failures when attempting to access the system keyring.
///
/// Recoverable errors indicate that the credential backend was
/// temporarily unavailable (for example when the keychain service is
/// locked). Permanent errors surface the underlying cause directly.
#[derive(Debug)]
pub enum KeyringAccessError {
    Recoverable(keyring::Error),
    Permanent(keyring::Error),
}

impl KeyringAccessError {
    fn inner(&self) -> &keyring::Error {
        match self {
            KeyringAccessError::Recoverable(err) | KeyringAccessError::Permanent(err) => err,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, KeyringAccessError::Recoverable(_))
    }
}

impl From<keyring::Error> for KeyringAccessError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                KeyringAccessError::Recoverable(err)
            }
            other => KeyringAccessError::Permanent(other),
        }
    }
}

impl fmt::Display for KeyringAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner())
    }
}

impl Error for KeyringAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner())
    }
}

/// Access token storage in the platform keyring.
pub struct TokenStore {
    enabled: bool,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::new_with_keyring(true)
    }

    /// A disabled store never touches the keyring (`--env-only`, tests).
    pub fn new_with_keyring(enabled: bool) -> Self {
        Self { enabled }
    }

    fn entry() -> Result<Entry, KeyringAccessError> {
        Ok(Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT)?)
    }

    pub fn get_token(&self) -> Result<Option<String>, KeyringAccessError> {
        if !self.enabled {
            return Ok(None);
        }
        match Self::entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn set_token(&self, token: &str) -> Result<(), KeyringAccessError> {
        if !self.enabled {
            return Ok(());
        }
        Self::entry()?.set_password(token)?;
        Ok(())
    }

    /// Returns false when there was nothing to remove.
    pub fn delete_token(&self) -> Result<bool, KeyringAccessError> {
        if !self.enabled {
            return Ok(false);
        }
        match Self::entry()?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_store_never_reports_a_token() {
        let store = TokenStore::new_with_keyring(false);
        assert!(store.get_token().expect("disabled get").is_none());
        store.set_token("ignored").expect("disabled set");
        assert!(!store.delete_token().expect("disabled delete"));
    }

    #[test]
    fn missing_entries_are_permanent() {
        let err: KeyringAccessError = keyring::Error::NoEntry.into();
        assert!(!err.is_recoverable());
    }
}
