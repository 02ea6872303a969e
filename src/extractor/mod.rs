//! Extraction module.
//!
//! # Module Structure
//!
//! - `state`: Per-harvest session context (items, seen keys, identity memo)
//! - `pipeline`: The aggregator running selector sets through validation,
//!   identity resolution and de-duplication
//!
//! # Usage
//!
//! ```rust,ignore
//! use rs_harvest::extractor::{Aggregator, HarvestSession};
//!
//! let aggregator = Aggregator::new(&options);
//!
//! // Cheap growth probe
//! let count = aggregator.count_candidates(&page).await?;
//!
//! // Full pass, keeping partial items if the session dies
//! let mut session = HarvestSession::new();
//! aggregator.extract_into(&page, &mut session).await?;
//! let result = session.finish();
//! ```

pub mod pipeline;
pub mod state;

pub use pipeline::Aggregator;
pub use state::{composite_key, HarvestSession};
