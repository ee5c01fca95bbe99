//! Core module - fundamental types and utilities

pub mod config;
pub mod fields;

pub use config::Config;
pub use fields::{
    AssetStatus, CanonicalField, CORE_ASSET_FIELDS, PERIPHERAL_FIELDS, REQUIRED_FIELDS,
};
