use std::sync::Mutex;

use crate::config::ConfigError;

/// Round-robin pool of API keys shared by every generation request.
///
/// The cursor advances once per call to [`CredentialPool::next_key`], whatever
/// the outcome of the attempt that uses the key, and is never reset.
#[derive(Debug)]
pub struct CredentialPool {
    keys: Vec<String>,
    cursor: Mutex<usize>,
}

impl CredentialPool {
    pub fn new(keys: Vec<String>) -> Result<Self, ConfigError> {
        if keys.is_empty() {
            return Err(ConfigError::NoApiKeys);
        }

        Ok(Self {
            keys,
            cursor: Mutex::new(0),
        })
    }

    /// Return the key under the cursor and advance the cursor modulo the pool size.
    pub fn next_key(&self) -> String {
        // A poisoned cursor is still a valid index, keep rotating.
        let mut cursor = self.cursor.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let key = self.keys[*cursor].clone();
        *cursor = (*cursor + 1) % self.keys.len();
        key
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn cursor(&self) -> usize {
        *self.cursor.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Mask an API key for log output.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}***{}", head, tail)
    }
}
