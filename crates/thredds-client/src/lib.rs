//! Client for THREDDS data servers.
//!
//! Resolves rendered URL fragments to actual dataset locations. Fragments
//! containing fnmatch wildcards are matched against the server's
//! `catalog.xml` directory listings; resolution outcomes (including
//! "not found") are memoized for the lifetime of the resolver, since
//! catalog contents are stable within one crawl.

pub mod catalog;
pub mod error;
pub mod fnmatch;
pub mod resolver;

pub use catalog::parse_dataset_names;
pub use error::{ThreddsError, ThreddsResult};
pub use fnmatch::fnmatch;
pub use resolver::{
    build_dataset_urls, resolve_datasets, CatalogFetch, DatasetResolver, HttpCatalogFetch,
    ResolvedDataset,
};
