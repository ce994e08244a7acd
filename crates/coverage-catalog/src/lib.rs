//! Catalog model for climate coverage datasets.
//!
//! A *coverage configuration* describes a family of datasets through a
//! parameterized naming template plus the legal parameter-value space.
//! Expanding that space produces *coverages*: concrete, addressable
//! dataset instances identified by strings like `tas-absolute-rcp26`.
//!
//! Everything in this crate is pure and synchronous; network lookups
//! against the remote THREDDS catalog live in the `thredds-client` crate.

pub mod configuration;
pub mod filter;
pub mod identifiers;
pub mod parameter;
pub mod template;

pub use configuration::{ClimaticIndicator, CoverageConfiguration, PossibleValue};
pub use filter::ValueFilter;
pub use identifiers::{collect_all_coverages, generate_identifiers, Coverage};
pub use parameter::{ConfigurationParameter, ConfigurationParameterValue};
pub use template::render_url_fragment;
