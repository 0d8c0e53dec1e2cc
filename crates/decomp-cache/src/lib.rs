//! Decomp Analysis Cache
//!
//! Content-derived keys for analysis requests and the stores that hold
//! finished analyses.
//!
//! # Key Derivation
//!
//! ```text
//! {description (whitespace-collapsed), stages, teamSize, teamContext,
//!  promptVersion, modelId}  →  sorted JSON  →  SHA-256  →  16 hex chars
//! ```
//!
//! # Example
//!
//! ```rust
//! use decomp_cache::{compute_analysis_hash, AnalysisRequest};
//!
//! let a = AnalysisRequest::new("  Hello   world  ");
//! let b = AnalysisRequest::new("Hello world").with_costs(120.0, 2.0);
//!
//! assert_eq!(
//!     compute_analysis_hash(&a, "v3", "model-a").unwrap(),
//!     compute_analysis_hash(&b, "v3", "model-a").unwrap(),
//! );
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod entry;
pub mod error;
pub mod key;
pub mod store;

pub use entry::CachedAnalysis;
pub use error::CacheError;
pub use key::{compute_analysis_hash, normalize_description, AnalysisRequest, CostContext};
pub use store::{AnalysisCache, BoundedCache, MemoryCache};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the cache
    pub use crate::entry::CachedAnalysis;
    pub use crate::error::CacheError;
    pub use crate::key::{compute_analysis_hash, AnalysisRequest};
    pub use crate::store::{AnalysisCache, BoundedCache, MemoryCache};
}
