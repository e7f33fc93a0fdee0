//! Data layer: ingestion, gain calculation, filtering and export.
//!
//! Architecture:
//! ```text
//!  .csv / .xlsx / .ods
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  bytes → Vec<RawRecord>  (headers normalised)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │   gain    │  group by animal, validate (dates), mean daily gain
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  pasture / age band / sex → FilteredView + mean
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  FilteredView → CSV with status column
//!   └──────────┘
//! ```

pub mod dates;
pub mod export;
pub mod filter;
pub mod gain;
pub mod headers;
pub mod loader;
pub mod model;
