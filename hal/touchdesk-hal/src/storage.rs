//! Persistent key/value storage
//!
//! Settings, the trash mask, saved wifi credentials and notes text are kept
//! in a namespaced key/value store (NVS on the ESP32 boards). The shell
//! treats persistence as best effort: a failed read is indistinguishable
//! from "value absent" and yields the caller's default.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Largest value the typed helpers will encode or decode
pub const MAX_VALUE_LEN: usize = 512;

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Backend I/O failed
    Io,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Namespaced byte-oriented key/value storage
pub trait KeyValueStore {
    /// Read a value into `buf`, returning the number of bytes read
    fn read(&mut self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write (or replace) a value
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Remove a value; removing an absent key is not an error
    fn remove(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;
}

/// Typed, infallible helpers over any [`KeyValueStore`]
///
/// Structured values are encoded with postcard. Strings are stored as raw
/// UTF-8 so other tools can read them back.
pub trait KeyValueStoreExt: KeyValueStore {
    /// Read a postcard-encoded value, or `default` if absent or unreadable
    fn get_or<T: DeserializeOwned>(&mut self, namespace: &str, key: &str, default: T) -> T {
        let mut buf = [0u8; MAX_VALUE_LEN];
        match self.read(namespace, key, &mut buf) {
            Ok(len) => postcard::from_bytes(&buf[..len]).unwrap_or(default),
            Err(_) => default,
        }
    }

    /// Write a postcard-encoded value, returning whether it was stored
    fn set<T: Serialize>(&mut self, namespace: &str, key: &str, value: &T) -> bool {
        let mut buf = [0u8; MAX_VALUE_LEN];
        match postcard::to_slice(value, &mut buf) {
            Ok(bytes) => self.write(namespace, key, bytes).is_ok(),
            Err(_) => false,
        }
    }

    /// Read a UTF-8 string, truncated to `N` bytes on a char boundary
    fn get_str<const N: usize>(&mut self, namespace: &str, key: &str) -> heapless::String<N> {
        let mut out = heapless::String::new();
        let mut buf = [0u8; MAX_VALUE_LEN];
        let Ok(len) = self.read(namespace, key, &mut buf) else {
            return out;
        };
        let Ok(text) = core::str::from_utf8(&buf[..len]) else {
            return out;
        };
        for c in text.chars() {
            if out.push(c).is_err() {
                break;
            }
        }
        out
    }

    /// Write a UTF-8 string, returning whether it was stored
    fn set_str(&mut self, namespace: &str, key: &str, value: &str) -> bool {
        self.write(namespace, key, value.as_bytes()).is_ok()
    }

    /// Remove a key, ignoring failures
    fn forget(&mut self, namespace: &str, key: &str) {
        let _ = self.remove(namespace, key);
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

/// Volatile store backed by a map
///
/// Used on the host and as the test double for persistence.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<(String, String), Vec<u8>>,
    capacity: Option<usize>,
}

impl MemoryStore {
    /// Create an empty, unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that refuses new keys beyond `entries` keys
    pub fn with_capacity_limit(entries: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity: Some(entries),
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a key is present
    pub fn contains(&self, namespace: &str, key: &str) -> bool {
        self.entries
            .contains_key(&(String::from(namespace), String::from(key)))
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&mut self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let value = self
            .entries
            .get(&(String::from(namespace), String::from(key)))
            .ok_or(StorageError::NotFound)?;
        let dst = buf
            .get_mut(..value.len())
            .ok_or(StorageError::BufferTooSmall)?;
        dst.copy_from_slice(value);
        Ok(value.len())
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let id = (String::from(namespace), String::from(key));
        if let Some(limit) = self.capacity {
            if !self.entries.contains_key(&id) && self.entries.len() >= limit {
                return Err(StorageError::Full);
            }
        }
        self.entries.insert(id, data.to_vec());
        Ok(())
    }

    fn remove(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.entries
            .remove(&(String::from(namespace), String::from(key)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_values_read_back() {
        let mut store = MemoryStore::new();
        assert!(store.set("settings", "bright", &180u8));
        assert!(store.set("settings", "autoc", &false));

        assert_eq!(store.get_or("settings", "bright", 220u8), 180);
        assert!(!store.get_or("settings", "autoc", true));
    }

    #[test]
    fn test_missing_value_yields_default() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_or("settings", "bright", 220u8), 220);
        assert_eq!(store.get_str::<16>("wifi", "ssid").as_str(), "");
    }

    #[test]
    fn test_corrupt_value_yields_default() {
        let mut store = MemoryStore::new();
        store.write("trash", "mask", &[]).unwrap();
        assert_eq!(store.get_or("trash", "mask", 7u8), 7);
    }

    #[test]
    fn test_strings_truncate_on_char_boundary() {
        let mut store = MemoryStore::new();
        assert!(store.set_str("notes", "text", "héllo"));
        // 'é' is two bytes and does not fit after "h" in three bytes
        assert_eq!(store.get_str::<3>("notes", "text").as_str(), "hé");
        assert_eq!(store.get_str::<2>("notes", "text").as_str(), "h");
    }

    #[test]
    fn test_remove_and_forget() {
        let mut store = MemoryStore::new();
        store.set_str("wifi", "pass", "secret");
        assert!(store.contains("wifi", "pass"));
        store.forget("wifi", "pass");
        assert!(!store.contains("wifi", "pass"));
        // Absent key
        assert!(store.remove("wifi", "pass").is_ok());
    }

    #[test]
    fn test_capacity_limit() {
        let mut store = MemoryStore::with_capacity_limit(1);
        assert!(store.set("a", "x", &1u8));
        assert!(!store.set("a", "y", &2u8));
        // Replacing an existing key still works when full
        assert!(store.set("a", "x", &3u8));
        assert_eq!(store.get_or("a", "x", 0u8), 3);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_namespaces_are_separate() {
        let mut store = MemoryStore::new();
        store.set_str("notes", "text", "a");
        store.set_str("wifi", "text", "b");
        assert_eq!(store.get_str::<8>("notes", "text").as_str(), "a");
        assert_eq!(store.get_str::<8>("wifi", "text").as_str(), "b");
    }
}
