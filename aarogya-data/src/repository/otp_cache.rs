use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use once_cell::sync::Lazy;
use tracing::{debug, warn};

/// How long a stored code stays valid
pub const OTP_TTL: Duration = Duration::from_secs(300);

/// Global OTP cache shared across the application
///
/// Codes are stored in-process with a five minute time-to-live and are
/// consumed on first successful verification.
static OTP_CACHE: Lazy<OtpCache> = Lazy::new(OtpCache::new);

/// Access the global OTP cache
pub fn cache() -> &'static OtpCache {
    &OTP_CACHE
}

/// Thread-safe in-memory store of phone verification codes
///
/// Each entry maps a phone number to the code sent to it and the time the
/// entry expires. The cache has a maximum size to prevent unbounded growth;
/// expired entries are pruned whenever the cache is at capacity.
pub struct OtpCache {
    /// Map of phone number to (code, expiration time)
    entries: Arc<Mutex<HashMap<String, (String, SystemTime)>>>,

    /// Maximum number of outstanding codes before pruning
    max_size: usize,
}

impl Default for OtpCache {
    fn default() -> Self {
        Self::new()
    }
}

impl OtpCache {
    /// Create a new empty cache with the default size limit
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            max_size: 10000,
        }
    }

    /// Store a code for a phone number, replacing any previous code
    ///
    /// The code expires after [`OTP_TTL`]. Requesting a new code invalidates
    /// the old one.
    pub fn store(&self, phone_number: &str, code: &str) {
        let expires_at = SystemTime::now() + OTP_TTL;
        let mut entries = self.entries.lock().unwrap();

        if entries.len() >= self.max_size {
            warn!("OTP cache reached max size ({}), pruning expired entries", self.max_size);
            let now = SystemTime::now();
            entries.retain(|_, (_, exp)| *exp > now);
        }

        entries.insert(phone_number.to_string(), (code.to_string(), expires_at));
        debug!("Stored verification code for {}", phone_number);
    }

    /// Verify a code and consume it on success
    ///
    /// Returns `true` only when an unexpired code exists for the phone number
    /// and matches. A successful verification removes the entry, so each code
    /// can be used at most once. Expired entries are removed on access.
    pub fn consume(&self, phone_number: &str, code: &str) -> bool {
        let mut entries = self.entries.lock().unwrap();

        match entries.get(phone_number) {
            Some((stored, expires_at)) => {
                if SystemTime::now() > *expires_at {
                    debug!("Verification code for {} has expired", phone_number);
                    entries.remove(phone_number);
                    return false;
                }

                if stored == code {
                    entries.remove(phone_number);
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    /// Remove all expired entries, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        let now = SystemTime::now();
        entries.retain(|_, (_, exp)| *exp > now);
        let removed = before - entries.len();

        if removed > 0 {
            debug!("Removed {} expired verification codes", removed);
        }

        removed
    }

    /// Number of outstanding codes (expired entries included until pruned)
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether the cache currently holds no codes
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_consume() {
        let cache = OtpCache::new();
        cache.store("9876543210", "123456");

        assert!(!cache.consume("9876543210", "999999"));
        assert!(cache.consume("9876543210", "123456"));
    }

    #[test]
    fn test_code_is_single_use() {
        let cache = OtpCache::new();
        cache.store("9876543210", "123456");

        assert!(cache.consume("9876543210", "123456"));
        assert!(!cache.consume("9876543210", "123456"));
    }

    #[test]
    fn test_new_code_replaces_old() {
        let cache = OtpCache::new();
        cache.store("9876543210", "111111");
        cache.store("9876543210", "222222");

        assert!(!cache.consume("9876543210", "111111"));
        assert!(cache.consume("9876543210", "222222"));
    }

    #[test]
    fn test_unknown_phone_fails() {
        let cache = OtpCache::new();
        assert!(!cache.consume("9123456789", "123456"));
    }

    #[test]
    fn test_expired_code_rejected() {
        let cache = OtpCache::new();

        // Insert an already-expired entry directly
        {
            let mut entries = cache.entries.lock().unwrap();
            entries.insert(
                "9876543210".to_string(),
                (
                    "123456".to_string(),
                    SystemTime::now() - Duration::from_secs(1),
                ),
            );
        }

        assert!(!cache.consume("9876543210", "123456"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cleanup_expired() {
        let cache = OtpCache::new();
        cache.store("9876543210", "123456");

        {
            let mut entries = cache.entries.lock().unwrap();
            entries.insert(
                "9123456789".to_string(),
                (
                    "654321".to_string(),
                    SystemTime::now() - Duration::from_secs(1),
                ),
            );
        }

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
    }
}
