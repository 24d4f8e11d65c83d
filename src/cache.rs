//! # Ephemeris Response Cache
//!
//! Astronomy API responses change slowly, so a response is reused for every
//! query at the same place within the same clock hour, as long as it is
//! younger than the caller's TTL.
//!
//! ## Caching Strategy
//! - **Key**: latitude and longitude to 4 decimals plus the moment truncated to the hour
//! - **TTL**: supplied by the caller, typically from [`crate::config::CacheConfig`]
//! - **Clock**: every lookup takes `now` explicitly, the cache never reads the time itself
//! - **Persistence**: optional JSON file; a missing or corrupt file is an empty cache
//!
//! The cache lives outside the computational core, which stays stateless.

use crate::calendar::Moment;
use crate::{ObserverLocation, RawEphemeris};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use std::{fs, io};
use thiserror::Error;

/// Cache persistence failures.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache IO: {0}")]
    Io(#[from] io::Error),

    #[error("cache JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Location + hour bucket a response is valid for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// ```
    /// use lunar_observer_lib::cache::CacheKey;
    /// use lunar_observer_lib::calendar::Moment;
    /// use lunar_observer_lib::ObserverLocation;
    ///
    /// let here = ObserverLocation::new(34.0522, -118.2437).unwrap();
    /// let at = Moment::from_ymd_hms(2025, 5, 20, 21, 47, 3).unwrap();
    /// assert_eq!(CacheKey::new(&here, &at).as_str(), "34.0522_-118.2437_2025-05-20_21");
    /// ```
    pub fn new(observer: &ObserverLocation, moment: &Moment) -> Self {
        CacheKey(format!(
            "{:.4}_{:.4}_{}",
            observer.latitude,
            observer.longitude,
            moment.datetime().format("%Y-%m-%d_%H")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct CacheEntry {
    stored_at: DateTime<Utc>,
    ephemeris: RawEphemeris,
}

/// TTL-bounded map from [`CacheKey`] to the raw ephemeris fetched for it.
#[derive(Debug, Clone)]
pub struct EphemerisCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl EphemerisCache {
    pub fn new(ttl: Duration) -> Self {
        EphemerisCache {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh entry for `key`, or `None` if absent, expired or stamped after `now`.
    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<&RawEphemeris> {
        let entry = self.entries.get(key.as_str())?;
        if self.is_fresh(entry, now) {
            Some(&entry.ephemeris)
        } else {
            None
        }
    }

    pub fn insert(&mut self, key: CacheKey, ephemeris: RawEphemeris, now: DateTime<Utc>) {
        self.entries.insert(
            key.0,
            CacheEntry {
                stored_at: now,
                ephemeris,
            },
        );
    }

    /// Drop every entry that [`get`](Self::get) would no longer return.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry_is_fresh(entry, ttl, now));
        before - self.entries.len()
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        entry_is_fresh(entry, self.ttl, now)
    }

    /// Load a persisted cache. Missing or corrupt files yield an empty cache.
    pub fn load_from_path<P: AsRef<Path>>(path: P, ttl: Duration) -> Self {
        let path = path.as_ref();
        match read_entries(path) {
            Ok(entries) => {
                debug!(
                    "Loaded {} cached responses from {}",
                    entries.len(),
                    path.display()
                );
                EphemerisCache { ttl, entries }
            }
            Err(CacheError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Self::new(ttl),
            Err(e) => {
                warn!("Ignoring unreadable cache {}: {}", path.display(), e);
                Self::new(ttl)
            }
        }
    }

    /// Persist all entries as JSON.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), CacheError> {
        let data = serde_json::to_vec(&self.entries)?;
        fs::write(path, data)?;
        Ok(())
    }
}

fn entry_is_fresh(entry: &CacheEntry, ttl: Duration, now: DateTime<Utc>) -> bool {
    // A negative age (clock moved backwards) fails to_std and counts as stale
    (now - entry.stored_at)
        .to_std()
        .map(|age| age <= ttl)
        .unwrap_or(false)
}

fn read_entries(path: &Path) -> Result<HashMap<String, CacheEntry>, CacheError> {
    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::NamedTempFile;

    fn sample_ephemeris() -> RawEphemeris {
        RawEphemeris {
            phase_angle_deg: 42.0,
            illumination_fraction: 0.13,
            phase_name: Some("Waxing Crescent".to_string()),
            distance_km: 401_000.0,
            distance_au: Some(0.00268),
            altitude_deg: 12.5,
            azimuth_deg: 250.0,
            right_ascension_hours: 3.2,
            declination_deg: 15.0,
        }
    }

    fn key() -> CacheKey {
        let here = ObserverLocation::new(40.7128, -74.006).unwrap();
        let at = Moment::from_ymd_hms(2025, 5, 20, 21, 0, 0).unwrap();
        CacheKey::new(&here, &at)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 21, 5, 0).unwrap()
    }

    #[test]
    fn test_key_buckets_by_hour() {
        let here = ObserverLocation::new(40.7128, -74.006).unwrap();
        let a = Moment::from_ymd_hms(2025, 5, 20, 21, 0, 0).unwrap();
        let b = Moment::from_ymd_hms(2025, 5, 20, 21, 59, 59).unwrap();
        let c = Moment::from_ymd_hms(2025, 5, 20, 22, 0, 0).unwrap();
        assert_eq!(CacheKey::new(&here, &a), CacheKey::new(&here, &b));
        assert_ne!(CacheKey::new(&here, &a), CacheKey::new(&here, &c));
        assert_eq!(CacheKey::new(&here, &a).as_str(), "40.7128_-74.0060_2025-05-20_21");
    }

    #[test]
    fn test_hit_within_ttl() {
        let mut cache = EphemerisCache::new(Duration::from_secs(3600));
        cache.insert(key(), sample_ephemeris(), t0());

        let later = t0() + chrono::Duration::minutes(59);
        assert_eq!(cache.get(&key(), later), Some(&sample_ephemeris()));
        assert_eq!(
            cache.get(&key(), t0() + chrono::Duration::hours(1)),
            Some(&sample_ephemeris())
        );
    }

    #[test]
    fn test_miss_after_ttl() {
        let mut cache = EphemerisCache::new(Duration::from_secs(600));
        cache.insert(key(), sample_ephemeris(), t0());
        let later = t0() + chrono::Duration::seconds(601);
        assert!(cache.get(&key(), later).is_none());
    }

    #[test]
    fn test_future_stamped_entry_is_stale() {
        let mut cache = EphemerisCache::new(Duration::from_secs(600));
        cache.insert(key(), sample_ephemeris(), t0());
        let earlier = t0() - chrono::Duration::seconds(1);
        assert!(cache.get(&key(), earlier).is_none());
    }

    #[test]
    fn test_purge_expired() {
        let mut cache = EphemerisCache::new(Duration::from_secs(600));
        cache.insert(key(), sample_ephemeris(), t0());

        let here = ObserverLocation::new(0.0, 0.0).unwrap();
        let at = Moment::from_ymd_hms(2025, 5, 20, 21, 0, 0).unwrap();
        let fresh_key = CacheKey::new(&here, &at);
        cache.insert(
            fresh_key.clone(),
            sample_ephemeris(),
            t0() + chrono::Duration::minutes(20),
        );

        let removed = cache.purge_expired(t0() + chrono::Duration::minutes(25));
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
        assert!(cache
            .get(&fresh_key, t0() + chrono::Duration::minutes(25))
            .is_some());
    }

    #[test]
    fn test_cache_roundtrip_through_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut cache = EphemerisCache::new(Duration::from_secs(3600));
        cache.insert(key(), sample_ephemeris(), t0());
        cache.save_to_path(temp_file.path()).unwrap();

        let loaded = EphemerisCache::load_from_path(temp_file.path(), Duration::from_secs(3600));
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(&key(), t0()), Some(&sample_ephemeris()));
    }

    #[test]
    fn test_corrupt_or_missing_file_is_empty_cache() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), b"{not json").unwrap();
        let cache = EphemerisCache::load_from_path(temp_file.path(), Duration::from_secs(60));
        assert!(cache.is_empty());

        let missing =
            EphemerisCache::load_from_path("/nonexistent/lunar_cache.json", Duration::from_secs(60));
        assert!(missing.is_empty());
        assert_eq!(missing.ttl(), Duration::from_secs(60));
    }
}
