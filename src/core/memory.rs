//! Memory-aware map configuration.

use crate::core::constants::{
    DEFAULT_REDUCE_FACTOR, FALLBACK_DEVICE_MEMORY_MB, LOW_MEMORY_REDUCE_FACTOR,
    LOW_MEMORY_THRESHOLD_MB, OPT_VIEWPORT_REDUCE_FACTOR, OPT_ZOOM_INCREMENT, ZOOM_INCREMENT,
};
use crate::prelude::HashMap;

/// Adaptive configuration derived from available device memory.
///
/// Created once per session start and immutable thereafter. Low-memory
/// devices get a viewport reduce factor of 2.0 so the engine renders
/// bigger effective tiles and holds fewer of them in memory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryProfile {
    pub total_device_memory_mb: u64,
    pub reduce_factor: f64,
    pub zoom_increment: i32,
}

impl MemoryProfile {
    /// Derives a profile from the host's memory report. `None` means the
    /// platform cannot report memory; 512 MB is assumed.
    ///
    /// Pure: same input yields an identical profile, no side effects.
    pub fn compute(total_device_memory_mb: Option<u64>) -> Self {
        let total = total_device_memory_mb.unwrap_or(FALLBACK_DEVICE_MEMORY_MB);
        let reduce_factor = if total < LOW_MEMORY_THRESHOLD_MB {
            LOW_MEMORY_REDUCE_FACTOR
        } else {
            DEFAULT_REDUCE_FACTOR
        };

        Self {
            total_device_memory_mb: total,
            reduce_factor,
            zoom_increment: ZOOM_INCREMENT,
        }
    }

    /// Encodes the profile as the engine's options map, values as strings
    /// under the fixed option keys.
    pub fn to_options(&self) -> HashMap<String, String> {
        let mut options = HashMap::default();
        options.insert(
            OPT_ZOOM_INCREMENT.to_string(),
            self.zoom_increment.to_string(),
        );
        options.insert(
            OPT_VIEWPORT_REDUCE_FACTOR.to_string(),
            format!("{:.1}", self.reduce_factor),
        );
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_memory_reduce_factor() {
        assert_eq!(MemoryProfile::compute(Some(256)).reduce_factor, 2.0);
        assert_eq!(MemoryProfile::compute(Some(1023)).reduce_factor, 2.0);
        assert_eq!(MemoryProfile::compute(Some(1024)).reduce_factor, 1.0);
        assert_eq!(MemoryProfile::compute(Some(8192)).reduce_factor, 1.0);
    }

    #[test]
    fn test_unreported_memory_assumes_512() {
        let profile = MemoryProfile::compute(None);
        assert_eq!(profile.total_device_memory_mb, 512);
        assert_eq!(profile.reduce_factor, 2.0);
    }

    #[test]
    fn test_zoom_increment_is_fixed() {
        assert_eq!(MemoryProfile::compute(Some(256)).zoom_increment, -1);
        assert_eq!(MemoryProfile::compute(Some(8192)).zoom_increment, -1);
    }

    #[test]
    fn test_compute_is_pure() {
        assert_eq!(
            MemoryProfile::compute(Some(2048)),
            MemoryProfile::compute(Some(2048))
        );
        assert_eq!(MemoryProfile::compute(None), MemoryProfile::compute(None));
    }

    #[test]
    fn test_options_encoding() {
        let options = MemoryProfile::compute(Some(512)).to_options();
        assert_eq!(options.get("ZOOM_INCREMENT").map(String::as_str), Some("-1"));
        assert_eq!(
            options.get("VIEWPORT_REDUCE_FACTOR").map(String::as_str),
            Some("2.0")
        );

        let options = MemoryProfile::compute(Some(4096)).to_options();
        assert_eq!(
            options.get("VIEWPORT_REDUCE_FACTOR").map(String::as_str),
            Some("1.0")
        );
    }
}
