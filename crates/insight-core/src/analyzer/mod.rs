//! Document analyzer abstraction.
//!
//! The analyzer is the external collaborator that turns uploaded documents
//! into insight records. Which domains, sentiments or entities it finds is
//! its own business; this crate only fixes the exchange format and the
//! shape of the tables derived from it.

mod record;
mod reduce;

pub use record::InsightRecord;
pub use reduce::reduce_insights;

use async_trait::async_trait;
use std::path::Path;

use crate::dataset::DerivedDataset;
use crate::error::Result;

/// Trait for turning a directory of uploaded documents into derived tables.
///
/// Implementations must be cheap to share across tasks (`Send + Sync`); the
/// pipeline calls `analyze` off the interactive path and may drop the
/// future on timeout or cancellation.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> String;

    /// Checks that the analyzer can run at all.
    ///
    /// # Errors
    ///
    /// Returns `InsightError::Unavailable` if the analyzer is not installed
    /// or not reachable.
    async fn is_available(&self) -> Result<()>;

    /// Extracts insight records from every document in `upload_dir`.
    ///
    /// An empty vector is a legitimate outcome, not an error.
    async fn analyze(&self, upload_dir: &Path) -> Result<Vec<InsightRecord>>;

    /// Reduces extracted records into the five derived tables.
    fn to_tables(&self, insights: &[InsightRecord]) -> DerivedDataset {
        reduce_insights(insights)
    }
}
