//! Market quote ingestion.
//!
//! - [`RawOptionData`]: validated expiry × strike quote grid
//! - [`create_metadata`]: one surface node per quoted cell

mod metadata;
mod raw_option_data;

pub use metadata::{create_metadata, volatility_type_of, SurfaceMetadata};
pub use raw_option_data::{QuoteType, RawOptionData, ValueType};
