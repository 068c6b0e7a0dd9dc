// src/utils/cache.rs

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Short-lived key-value cache used for the verification-code cooldown window.
/// Set/get/delete are atomic per key.
pub trait CodeCache: Send + Sync {
    fn set(&self, key: &str, value: String, ttl: Duration);
    fn get(&self, key: &str) -> Option<String>;
    fn delete(&self, key: &str);
}

/// In-process cache. Expired entries are dropped lazily on read.
#[derive(Default)]
pub struct MemoryCodeCache {
    entries: DashMap<String, (String, Instant)>,
}

impl MemoryCodeCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CodeCache for MemoryCodeCache {
    fn set(&self, key: &str, value: String, ttl: Duration) {
        self.entries
            .insert(key.to_string(), (value, Instant::now() + ttl));
    }

    fn get(&self, key: &str) -> Option<String> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.1 > Instant::now() => return Some(entry.0.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, (_, deadline)| *deadline <= Instant::now());
        }
        None
    }

    fn delete(&self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let cache = MemoryCodeCache::new();
        cache.set("a@example.com", "12345".into(), Duration::from_secs(60));
        assert_eq!(cache.get("a@example.com").as_deref(), Some("12345"));
        cache.delete("a@example.com");
        assert_eq!(cache.get("a@example.com"), None);
    }

    #[test]
    fn test_entries_expire() {
        let cache = MemoryCodeCache::new();
        cache.set("a@example.com", "12345".into(), Duration::from_millis(0));
        assert_eq!(cache.get("a@example.com"), None);
    }
}
