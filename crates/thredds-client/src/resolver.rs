//! Dataset URL resolution against a THREDDS server.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use coverage_catalog::{
    collect_all_coverages, render_url_fragment, ConfigurationParameter, CoverageConfiguration,
    ValueFilter,
};

use crate::catalog::parse_dataset_names;
use crate::error::{ThreddsError, ThreddsResult};
use crate::fnmatch::{fnmatch, has_wildcards};

/// Fetches catalog documents. Seam for injecting fakes in tests.
#[async_trait]
pub trait CatalogFetch: Send + Sync {
    async fn fetch(&self, url: &str) -> ThreddsResult<String>;
}

/// Real catalog fetcher backed by reqwest.
pub struct HttpCatalogFetch {
    client: reqwest::Client,
}

impl HttpCatalogFetch {
    pub fn new(request_timeout: Duration) -> ThreddsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CatalogFetch for HttpCatalogFetch {
    async fn fetch(&self, url: &str) -> ThreddsResult<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ThreddsError::HttpStatus(response.status()));
        }
        Ok(response.text().await?)
    }
}

/// Resolves rendered URL fragments to concrete dataset locations.
///
/// Owns the process-wide memoizing cache: each (fragment, base URL) pair
/// hits the catalog at most once per resolver lifetime, and the cached
/// outcome includes "not found". The cache is append-only; catalog
/// contents are assumed stable for the duration of one crawl.
pub struct DatasetResolver<F: CatalogFetch> {
    fetcher: F,
    cache: Mutex<HashMap<(String, String), Option<String>>>,
}

impl<F: CatalogFetch> DatasetResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Map a rendered URL fragment to an actual dataset location.
    ///
    /// Fragments without wildcard characters are returned unchanged with
    /// no catalog lookup. Lookup failures (HTTP errors, bad XML, zero
    /// matches) are logged and return None, never an error.
    pub async fn resolve_url_fragment(&self, fragment: &str, base_url: &str) -> Option<String> {
        if !has_wildcards(fragment) {
            return Some(fragment.to_string());
        }

        let key = (
            fragment.to_string(),
            base_url.trim_end_matches('/').to_string(),
        );

        if let Some(cached) = self.cache.lock().unwrap().get(&key) {
            debug!(fragment = %fragment, "Catalog resolution cache hit");
            return cached.clone();
        }

        let resolved = match self.lookup(fragment, &key.1).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(fragment = %fragment, error = %e, "Catalog lookup failed");
                None
            }
        };

        self.cache
            .lock()
            .unwrap()
            .insert(key, resolved.clone());
        resolved
    }

    async fn lookup(&self, fragment: &str, base_url: &str) -> ThreddsResult<Option<String>> {
        let (prefix, file_pattern) = match fragment.rsplit_once('/') {
            Some((prefix, file_pattern)) => (prefix, file_pattern),
            None => ("", fragment),
        };

        let catalog_url = if prefix.is_empty() {
            format!("{}/catalog/catalog.xml", base_url)
        } else {
            format!("{}/catalog/{}/catalog.xml", base_url, prefix)
        };

        let body = self.fetcher.fetch(&catalog_url).await?;
        let names = parse_dataset_names(&body)?;

        let mut matched = names.iter().filter(|name| fnmatch(file_pattern, name));
        match matched.next() {
            Some(name) => {
                let discarded = matched.count();
                if discarded > 0 {
                    debug!(
                        fragment = %fragment,
                        chosen = %name,
                        discarded = discarded,
                        "Multiple catalog entries match pattern, keeping first"
                    );
                }
                Ok(Some(if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", prefix, name)
                }))
            }
            None => {
                debug!(
                    fragment = %fragment,
                    catalog = %catalog_url,
                    "No catalog entry matches pattern"
                );
                Ok(None)
            }
        }
    }
}

/// One coverage resolved to a downloadable location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDataset {
    pub coverage_identifier: String,
    /// Location relative to the server's file-serving root
    pub fragment: String,
    /// Full download URL
    pub url: String,
}

/// Resolve every coverage implied by a set of configurations.
///
/// Unresolvable coverages are logged and skipped; output order matches
/// identifier generation order.
pub async fn resolve_datasets<F: CatalogFetch>(
    resolver: &DatasetResolver<F>,
    configurations: &[CoverageConfiguration],
    parameters: &[ConfigurationParameter],
    value_filter: Option<&ValueFilter>,
    base_url: &str,
) -> Vec<ResolvedDataset> {
    let base_url = base_url.trim_end_matches('/');
    let mut datasets = Vec::new();

    for coverage in collect_all_coverages(configurations, value_filter) {
        let rendered = render_url_fragment(
            &coverage.configuration.thredds_url_pattern,
            &coverage.url_bindings(parameters),
        );

        match resolver.resolve_url_fragment(&rendered, base_url).await {
            Some(fragment) => {
                let url = format!("{}/fileServer/{}", base_url, fragment);
                datasets.push(ResolvedDataset {
                    coverage_identifier: coverage.identifier,
                    fragment,
                    url,
                });
            }
            None => {
                warn!(
                    coverage = %coverage.identifier,
                    fragment = %rendered,
                    "Could not resolve dataset location, skipping coverage"
                );
            }
        }
    }

    datasets
}

/// Final downloadable URLs for a set of configurations.
pub async fn build_dataset_urls<F: CatalogFetch>(
    resolver: &DatasetResolver<F>,
    configurations: &[CoverageConfiguration],
    parameters: &[ConfigurationParameter],
    value_filter: Option<&ValueFilter>,
    base_url: &str,
) -> Vec<String> {
    resolve_datasets(resolver, configurations, parameters, value_filter, base_url)
        .await
        .into_iter()
        .map(|dataset| dataset.url)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use coverage_catalog::{ClimaticIndicator, PossibleValue};

    /// Serves a canned catalog body and counts fetches.
    struct FakeCatalog {
        body: String,
        fetches: AtomicUsize,
    }

    impl FakeCatalog {
        fn new(body: &str) -> Self {
            Self {
                body: body.to_string(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CatalogFetch for &FakeCatalog {
        async fn fetch(&self, _url: &str) -> ThreddsResult<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    /// Always fails, and counts attempts.
    struct FailingCatalog {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl CatalogFetch for &FailingCatalog {
        async fn fetch(&self, _url: &str) -> ThreddsResult<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Err(ThreddsError::HttpStatus(reqwest::StatusCode::NOT_FOUND))
        }
    }

    const DAILY_CATALOG: &str = r#"<catalog xmlns="http://www.unidata.ucar.edu/namespaces/thredds/InvCatalog/v1.0">
  <dataset name="daily">
    <dataset name="tas_v1_rcp26.nc" urlPath="daily/tas_v1_rcp26.nc"/>
    <dataset name="tas_v2_rcp26.nc" urlPath="daily/tas_v2_rcp26.nc"/>
  </dataset>
</catalog>"#;

    #[tokio::test]
    async fn test_fast_path_skips_network() {
        let fake = FakeCatalog::new(DAILY_CATALOG);
        let resolver = DatasetResolver::new(&fake);

        let resolved = resolver
            .resolve_url_fragment("daily/tas_v1_rcp26.nc", "http://thredds.example.com")
            .await;

        assert_eq!(resolved.as_deref(), Some("daily/tas_v1_rcp26.nc"));
        assert_eq!(fake.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_wildcard_resolves_to_first_match() {
        let fake = FakeCatalog::new(DAILY_CATALOG);
        let resolver = DatasetResolver::new(&fake);

        let resolved = resolver
            .resolve_url_fragment("daily/tas_*_rcp26.nc", "http://thredds.example.com")
            .await;

        assert_eq!(resolved.as_deref(), Some("daily/tas_v1_rcp26.nc"));
        assert_eq!(fake.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_cache_makes_second_resolution_free() {
        let fake = FakeCatalog::new(DAILY_CATALOG);
        let resolver = DatasetResolver::new(&fake);

        let first = resolver
            .resolve_url_fragment("daily/tas_*_rcp26.nc", "http://thredds.example.com")
            .await;
        let second = resolver
            .resolve_url_fragment("daily/tas_*_rcp26.nc", "http://thredds.example.com")
            .await;

        assert_eq!(first, second);
        assert_eq!(fake.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_lookup_is_cached_too() {
        let fake = FailingCatalog {
            fetches: AtomicUsize::new(0),
        };
        let resolver = DatasetResolver::new(&fake);

        let first = resolver
            .resolve_url_fragment("daily/tas_*_rcp26.nc", "http://thredds.example.com")
            .await;
        let second = resolver
            .resolve_url_fragment("daily/tas_*_rcp26.nc", "http://thredds.example.com")
            .await;

        assert_eq!(first, None);
        assert_eq!(second, None);
        assert_eq!(fake.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_matches_yield_none() {
        let fake = FakeCatalog::new(DAILY_CATALOG);
        let resolver = DatasetResolver::new(&fake);

        let resolved = resolver
            .resolve_url_fragment("daily/pr_*_rcp85.nc", "http://thredds.example.com")
            .await;

        assert_eq!(resolved, None);
        assert_eq!(fake.fetch_count(), 1);
    }

    fn sample_configuration() -> CoverageConfiguration {
        CoverageConfiguration {
            identifier: "tas-daily".to_string(),
            enabled: true,
            coverage_id_pattern: "{indicator}-{scenario}".to_string(),
            climatic_indicator: ClimaticIndicator {
                identifier: "tas".to_string(),
                name: String::new(),
                unit: String::new(),
            },
            possible_values: vec![PossibleValue {
                parameter: "scenario".to_string(),
                value: "rcp26".to_string(),
            }],
            thredds_url_pattern: "daily/{climatic_indicator}_*_{scenario}.nc".to_string(),
            secondary_coverage_configurations: Vec::new(),
            uncertainty_lower_bound: None,
            uncertainty_upper_bound: None,
        }
    }

    #[tokio::test]
    async fn test_build_dataset_urls() {
        let fake = FakeCatalog::new(DAILY_CATALOG);
        let resolver = DatasetResolver::new(&fake);
        let configurations = vec![sample_configuration()];

        let urls = build_dataset_urls(
            &resolver,
            &configurations,
            &[],
            None,
            "http://thredds.example.com/",
        )
        .await;

        assert_eq!(
            urls,
            vec!["http://thredds.example.com/fileServer/daily/tas_v1_rcp26.nc"]
        );
    }

    #[tokio::test]
    async fn test_resolve_datasets_skips_unresolvable() {
        let fake = FailingCatalog {
            fetches: AtomicUsize::new(0),
        };
        let resolver = DatasetResolver::new(&fake);
        let configurations = vec![sample_configuration()];

        let datasets = resolve_datasets(
            &resolver,
            &configurations,
            &[],
            None,
            "http://thredds.example.com",
        )
        .await;

        assert!(datasets.is_empty());
    }
}
