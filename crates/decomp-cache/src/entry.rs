//! Cached analysis entries

use chrono::{DateTime, Utc};
use decomp_model::{AnalysisHash, AnalysisMeta, Decomposition};
use serde::{Deserialize, Serialize};

/// A stored analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedAnalysis {
    pub hash: AnalysisHash,
    pub decomposition: Decomposition,
    pub metadata: AnalysisMeta,
    /// When the entry was stored, never updated by reads
    pub cached_at: DateTime<Utc>,
    /// Reads since the entry was stored
    #[serde(default)]
    pub hit_count: u64,
}

impl CachedAnalysis {
    /// Fresh entry stamped now with zero hits
    #[must_use]
    pub fn new(hash: AnalysisHash, decomposition: Decomposition, metadata: AnalysisMeta) -> Self {
        Self {
            hash,
            decomposition,
            metadata,
            cached_at: Utc::now(),
            hit_count: 0,
        }
    }

    /// With explicit timestamp
    #[inline]
    #[must_use]
    pub fn with_cached_at(mut self, cached_at: DateTime<Utc>) -> Self {
        self.cached_at = cached_at;
        self
    }

    /// Record one read and return the updated entry
    pub(crate) fn record_hit(&mut self) -> Self {
        self.hit_count = self.hit_count.saturating_add(1);
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_iso_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let entry = CachedAnalysis::new(
            AnalysisHash::new([0xab; 8]),
            Decomposition::empty("d1", "Payroll"),
            AnalysisMeta::new("v3", "model-a"),
        )
        .with_cached_at(at);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["hash"], "abababababababab");
        assert_eq!(json["cachedAt"], "2024-03-01T12:00:00Z");
        assert_eq!(json["hitCount"], 0);
        assert_eq!(json["metadata"]["promptVersion"], "v3");

        let back: CachedAnalysis = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
