//! Storage usage meter.

use std::fmt;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Share of the quota above which the meter is flagged.
pub const CRITICAL_PERCENT: f64 = 90.0;

/// How much of the upload quota a library uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageUsage {
    used_bytes: u64,
    quota_mb: f64,
}

impl StorageUsage {
    /// Sum the file sizes of a library. Unknown sizes count as zero.
    pub fn from_sizes(sizes: impl IntoIterator<Item = Option<u64>>, quota_mb: f64) -> Self {
        Self {
            used_bytes: sizes.into_iter().map(|s| s.unwrap_or(0)).sum(),
            quota_mb,
        }
    }

    /// Bytes used.
    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    /// Megabytes used, rounded to one decimal.
    pub fn used_mb(&self) -> f64 {
        (self.used_bytes as f64 / BYTES_PER_MB * 10.0).round() / 10.0
    }

    /// Quota in megabytes.
    pub fn quota_mb(&self) -> f64 {
        self.quota_mb
    }

    /// Percent of the quota used, capped at 100.
    pub fn percent(&self) -> f64 {
        if self.quota_mb <= 0.0 {
            return 100.0;
        }
        (self.used_mb() / self.quota_mb * 100.0).min(100.0)
    }

    /// Whether usage is close to the quota.
    pub fn is_critical(&self) -> bool {
        self.percent() > CRITICAL_PERCENT
    }

    /// Text bar of `width` cells.
    pub fn bar(&self, width: usize) -> String {
        let filled = ((self.percent() / 100.0) * width as f64).round() as usize;
        let filled = filled.min(width);
        format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
    }
}

impl fmt::Display for StorageUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} / {} MB", self.used_mb(), self.quota_mb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn sums_sizes_and_ignores_unknown() {
        let usage = StorageUsage::from_sizes([Some(MB), None, Some(MB / 2)], 100.0);
        assert_eq!(usage.used_bytes(), MB + MB / 2);
        assert_eq!(usage.used_mb(), 1.5);
        assert_eq!(usage.to_string(), "1.5 / 100 MB");
        assert!(!usage.is_critical());
    }

    #[test]
    fn percent_is_capped() {
        let usage = StorageUsage::from_sizes([Some(150 * MB)], 100.0);
        assert_eq!(usage.percent(), 100.0);
        assert!(usage.is_critical());
        assert_eq!(usage.bar(10), "[##########]");
    }

    #[test]
    fn critical_above_ninety_percent() {
        assert!(!StorageUsage::from_sizes([Some(90 * MB)], 100.0).is_critical());
        assert!(StorageUsage::from_sizes([Some(91 * MB)], 100.0).is_critical());
    }

    #[test]
    fn empty_library() {
        let usage = StorageUsage::from_sizes(std::iter::empty(), 100.0);
        assert_eq!(usage.used_mb(), 0.0);
        assert_eq!(usage.percent(), 0.0);
        assert_eq!(usage.bar(4), "[----]");
    }
}
