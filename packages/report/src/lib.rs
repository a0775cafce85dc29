#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report record normalization.
//!
//! Converts the loose documents the report store returns into the canonical
//! [`Report`](civic_connect_report_models::Report) shape the aggregation
//! engine reads. Normalization is fail-soft: a record with a garbled
//! timestamp or location is kept with the offending field left unset, never
//! dropped or rejected.

pub mod normalize;
pub mod parsing;

pub use normalize::Normalizer;
