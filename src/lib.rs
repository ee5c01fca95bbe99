//! Stocktake: bulk spreadsheet import for inventory assets
//!
//! Reconciles arbitrary spreadsheet headers against a canonical schema,
//! consolidates rows that describe one physical asset, validates the
//! result, and submits it to an inventory backend.

pub mod api;
pub mod cli;
pub mod core;
pub mod import;
