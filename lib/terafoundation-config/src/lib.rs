//! Declarative configuration schemas.
//!
//! A [`Schema`] is a registry of named [`OptionDescriptor`]s. Each descriptor documents one option,
//! optionally carries a default value, and holds the [`FormatRule`] candidate values must satisfy.
//! Validation only ever judges admissibility: values are never coerced, and an invalid value is
//! never replaced by its default.

#[macro_use]
extern crate tracing;

pub mod descriptor;
pub mod error;
pub mod format;
pub mod schema;

pub use self::{
    descriptor::OptionDescriptor,
    error::ConfigError,
    format::{FormatRule, Kind, Validator, as_numeric},
    schema::{Schema, SchemaBuilder, ValidatedConfig},
};
