use std::thread;
use std::time::Duration;

use polars::prelude::DataFrame;
use url::Url;

use super::catalog::{PackageShowResponse, ResourceDescriptor};
use super::error::{FetchError, TransportError};
use super::harmonize::RenameMap;
use super::loader::decode_csv;
use super::model::stack;
use super::transport::{HttpResponse, Transport};

/// Sequential retry for transport failures and 5xx answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries per request, at least 1.
    pub max_attempts: u32,
    /// Delay before retry `n` is `backoff * n`.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Pause before retry number `attempt`. Saturates instead of overflowing.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.checked_mul(attempt).unwrap_or(Duration::MAX)
    }

    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Outcome of a request after retries: a final response, or the last
/// transport failure.
type Attempt = Result<HttpResponse, TransportError>;

// ---------------------------------------------------------------------------
// DatasetFetcher
// ---------------------------------------------------------------------------

/// Downloads every datastore-backed resource of a CKAN dataset and stacks
/// them into one text [`DataFrame`].
///
/// Requests are issued one after another. The first resource that cannot be
/// downloaded or decoded aborts the whole fetch; later resources are not
/// requested.
pub struct DatasetFetcher<T: Transport> {
    transport: T,
    retry: RetryPolicy,
}

impl<T: Transport> DatasetFetcher<T> {
    pub fn new(transport: T, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    pub fn fetch(
        &self,
        catalog_endpoint: &Url,
        dataset_id: &str,
        renames: &RenameMap,
    ) -> Result<DataFrame, FetchError> {
        renames.validate()?;

        let resources = self.resources(catalog_endpoint, dataset_id)?;
        let queryable: Vec<&ResourceDescriptor> =
            resources.iter().filter(|r| r.queryable).collect();
        log::info!(
            "dataset '{dataset_id}': {} resources, {} queryable",
            resources.len(),
            queryable.len()
        );
        for skipped in resources.iter().filter(|r| !r.queryable) {
            log::debug!(
                "skipping non-datastore resource {} ({})",
                skipped.id,
                skipped.format.as_deref().unwrap_or("unknown format")
            );
        }

        let mut tables = Vec::with_capacity(queryable.len());
        for resource in queryable {
            let mut table = self.dump(catalog_endpoint, resource)?;
            renames.apply(&mut table)?;
            log::info!(
                "resource {} ({}): {} rows",
                resource.id,
                resource.name.as_deref().unwrap_or("unnamed"),
                table.height()
            );
            tables.push(table);
        }

        let unified = stack(tables)
            .map_err(|e| FetchError::schema(format!("stacking resources of '{dataset_id}': {e}")))?;
        log::info!(
            "dataset '{dataset_id}': {} rows, {} columns",
            unified.height(),
            unified.width()
        );
        Ok(unified)
    }

    /// Resource descriptors of `dataset_id` in catalog order.
    fn resources(
        &self,
        endpoint: &Url,
        dataset_id: &str,
    ) -> Result<Vec<ResourceDescriptor>, FetchError> {
        let mut url = join(endpoint, "api/3/action/package_show");
        url.query_pairs_mut().append_pair("id", dataset_id);
        let unavailable = |reason: String| FetchError::CatalogUnavailable {
            url: url.to_string(),
            reason,
        };

        let response = self
            .get_with_retry(url.as_str())
            .map_err(|e| unavailable(e.message))?;

        if response.status == 404 {
            return Err(FetchError::DatasetNotFound {
                dataset_id: dataset_id.to_string(),
            });
        }
        if !response.is_success() {
            return Err(unavailable(format!("HTTP {}", response.status)));
        }

        let envelope: PackageShowResponse = serde_json::from_slice(&response.body)
            .map_err(|e| unavailable(format!("decoding package_show: {e}")))?;

        if !envelope.success {
            return match envelope.error {
                Some(err) if err.is_not_found() => Err(FetchError::DatasetNotFound {
                    dataset_id: dataset_id.to_string(),
                }),
                Some(err) => Err(unavailable(format!("{}: {}", err.kind, err.message))),
                None => Err(unavailable("catalog reported failure".to_string())),
            };
        }

        envelope
            .result
            .map(|entry| {
                log::debug!("package '{}' lists {} resources", entry.name, entry.resources.len());
                entry.resources
            })
            .ok_or_else(|| unavailable("package_show without result".to_string()))
    }

    fn dump(&self, endpoint: &Url, resource: &ResourceDescriptor) -> Result<DataFrame, FetchError> {
        let url = join(endpoint, &format!("datastore/dump/{}", resource.id));
        let failed = |reason: String| FetchError::ResourceFetch {
            resource_id: resource.id.clone(),
            reason,
        };

        let response = self
            .get_with_retry(url.as_str())
            .map_err(|e| failed(e.to_string()))?;
        if !response.is_success() {
            return Err(failed(format!("HTTP {}", response.status)));
        }

        let text = String::from_utf8(response.body)
            .map_err(|e| failed(format!("dump is not UTF-8: {e}")))?;
        decode_csv(&text).map_err(|e| failed(format!("{e:#}")))
    }

    fn get_with_retry(&self, url: &str) -> Attempt {
        let attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let result = self.transport.get(url);
            let retryable = match &result {
                Ok(resp) => resp.status >= 500,
                Err(_) => true,
            };
            if !retryable || attempt >= attempts {
                return result;
            }
            match &result {
                Ok(resp) => log::warn!("{url}: HTTP {} (attempt {attempt}/{attempts})", resp.status),
                Err(e) => log::warn!("{e} (attempt {attempt}/{attempts})"),
            }
            thread::sleep(self.retry.delay(attempt));
            attempt += 1;
        }
    }
}

/// Append `path` to the endpoint, keeping any base path the catalog is
/// mounted under.
fn join(endpoint: &Url, path: &str) -> Url {
    let mut url = endpoint.clone();
    let base = endpoint.path().trim_end_matches('/');
    url.set_path(&format!("{base}/{path}"));
    url.set_query(None);
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Scripted responses keyed by URL path; records every request.
    #[derive(Default)]
    struct FakeTransport {
        routes: HashMap<String, Vec<Attempt>>,
        requests: RefCell<Vec<String>>,
    }

    impl FakeTransport {
        fn respond(mut self, path: &str, status: u16, body: &str) -> Self {
            self.routes.entry(path.to_string()).or_default().push(Ok(HttpResponse {
                status,
                body: body.as_bytes().to_vec(),
            }));
            self
        }

        fn fail(mut self, path: &str, message: &str) -> Self {
            self.routes.entry(path.to_string()).or_default().push(Err(TransportError {
                url: path.to_string(),
                message: message.to_string(),
            }));
            self
        }

        fn requested_paths(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl Transport for &FakeTransport {
        fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
            let path = Url::parse(url).unwrap().path().to_string();
            let count = self
                .requests
                .borrow()
                .iter()
                .filter(|p| **p == path)
                .count();
            self.requests.borrow_mut().push(path.clone());
            let script = self.routes.get(&path).unwrap_or_else(|| panic!("unexpected {path}"));
            // Replay the last scripted answer once the script runs out.
            let step = &script[count.min(script.len() - 1)];
            match step {
                Ok(resp) => Ok(resp.clone()),
                Err(e) => Err(TransportError {
                    url: e.url.clone(),
                    message: e.message.clone(),
                }),
            }
        }
    }

    const SHOW: &str = "/api/3/action/package_show";

    fn package(resources: &[(&str, bool)]) -> String {
        let items: Vec<String> = resources
            .iter()
            .map(|(id, q)| format!(r#"{{"id": "{id}", "datastore_active": {q}}}"#))
            .collect();
        format!(
            r#"{{"success": true, "result": {{"name": "ds", "resources": [{}]}}}}"#,
            items.join(",")
        )
    }

    fn endpoint() -> Url {
        Url::parse("https://catalog.test").unwrap()
    }

    fn fetcher(t: &FakeTransport) -> DatasetFetcher<&FakeTransport> {
        DatasetFetcher::new(t, RetryPolicy::none())
    }

    fn column(table: &DataFrame, name: &str) -> Vec<Option<String>> {
        table
            .column(name)
            .unwrap()
            .utf8()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    fn texts(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn skips_non_queryable_and_preserves_order() {
        let t = FakeTransport::default()
            .respond(SHOW, 200, &package(&[("A", true), ("B", false), ("C", true)]))
            .respond("/datastore/dump/A", 200, "x\n1\n2\n")
            .respond("/datastore/dump/C", 200, "x\n3\n");

        let table = fetcher(&t)
            .fetch(&endpoint(), "ds", &RenameMap::default())
            .unwrap();

        assert_eq!(
            column(&table, "x"),
            texts(&["1", "2", "3"])
        );
        assert_eq!(
            t.requested_paths(),
            vec![SHOW, "/datastore/dump/A", "/datastore/dump/C"]
        );
    }

    #[test]
    fn zero_queryable_resources_is_empty_table() {
        let t = FakeTransport::default().respond(SHOW, 200, &package(&[("B", false)]));
        let table = fetcher(&t)
            .fetch(&endpoint(), "ds", &RenameMap::default())
            .unwrap();
        assert_eq!(table.height(), 0);
        assert_eq!(t.requested_paths(), vec![SHOW]);
    }

    #[test]
    fn row_count_is_sum_of_resources() {
        let t = FakeTransport::default()
            .respond(SHOW, 200, &package(&[("A", true), ("B", true)]))
            .respond("/datastore/dump/A", 200, "x,y\n1,a\n2,b\n3,c\n")
            .respond("/datastore/dump/B", 200, "x,z\n4,d\n5,e\n");
        let table = fetcher(&t)
            .fetch(&endpoint(), "ds", &RenameMap::default())
            .unwrap();
        assert_eq!(table.height(), 5);
        assert_eq!(table.get_column_names(), vec!["x", "y", "z"]);
        assert_eq!(column(&table, "y")[4], None);
        assert_eq!(column(&table, "z")[0], None);
    }

    #[test]
    fn http_404_is_dataset_not_found() {
        let t = FakeTransport::default().respond(SHOW, 404, "");
        let err = fetcher(&t)
            .fetch(&endpoint(), "missing", &RenameMap::default())
            .unwrap_err();
        assert!(matches!(err, FetchError::DatasetNotFound { ref dataset_id } if dataset_id == "missing"));
        assert_eq!(t.requested_paths(), vec![SHOW]);
    }

    #[test]
    fn not_found_envelope_is_dataset_not_found() {
        let t = FakeTransport::default().respond(
            SHOW,
            200,
            r#"{"success": false, "error": {"__type": "Not Found Error", "message": "Not found"}}"#,
        );
        let err = fetcher(&t)
            .fetch(&endpoint(), "missing", &RenameMap::default())
            .unwrap_err();
        assert!(matches!(err, FetchError::DatasetNotFound { .. }));
    }

    #[test]
    fn metadata_failures_are_catalog_unavailable() {
        let down = FakeTransport::default().fail(SHOW, "connection refused");
        assert!(matches!(
            fetcher(&down).fetch(&endpoint(), "ds", &RenameMap::default()),
            Err(FetchError::CatalogUnavailable { .. })
        ));

        let broken = FakeTransport::default().respond(SHOW, 200, "<html>");
        assert!(matches!(
            fetcher(&broken).fetch(&endpoint(), "ds", &RenameMap::default()),
            Err(FetchError::CatalogUnavailable { .. })
        ));

        let server_error = FakeTransport::default().respond(SHOW, 503, "");
        assert!(matches!(
            fetcher(&server_error).fetch(&endpoint(), "ds", &RenameMap::default()),
            Err(FetchError::CatalogUnavailable { .. })
        ));
    }

    #[test]
    fn dump_timeout_aborts_fetch() {
        let t = FakeTransport::default()
            .respond(SHOW, 200, &package(&[("A", true), ("B", true), ("C", true)]))
            .respond("/datastore/dump/A", 200, "x\n1\n")
            .fail("/datastore/dump/B", "timed out reading response")
            .respond("/datastore/dump/C", 200, "x\n3\n");

        let err = fetcher(&t)
            .fetch(&endpoint(), "ds", &RenameMap::default())
            .unwrap_err();

        assert!(matches!(err, FetchError::ResourceFetch { ref resource_id, .. } if resource_id == "B"));
        assert!(!t.requested_paths().contains(&"/datastore/dump/C".to_string()));
    }

    #[test]
    fn undecodable_dump_is_resource_error() {
        let t = FakeTransport::default()
            .respond(SHOW, 200, &package(&[("A", true)]))
            .respond("/datastore/dump/A", 200, "x,y\n1,2,3\n");
        assert!(matches!(
            fetcher(&t).fetch(&endpoint(), "ds", &RenameMap::default()),
            Err(FetchError::ResourceFetch { .. })
        ));
    }

    #[test]
    fn retries_transient_failures() {
        let t = FakeTransport::default()
            .respond(SHOW, 200, &package(&[("A", true)]))
            .fail("/datastore/dump/A", "connection reset")
            .respond("/datastore/dump/A", 502, "")
            .respond("/datastore/dump/A", 200, "x\n1\n");
        let retrying = DatasetFetcher::new(
            &t,
            RetryPolicy {
                max_attempts: 3,
                backoff: Duration::ZERO,
            },
        );

        let table = retrying
            .fetch(&endpoint(), "ds", &RenameMap::default())
            .unwrap();
        assert_eq!(table.height(), 1);
        assert_eq!(t.requested_paths().len(), 4);
    }

    #[test]
    fn client_errors_are_not_retried() {
        let t = FakeTransport::default().respond(SHOW, 404, "");
        let retrying = DatasetFetcher::new(
            &t,
            RetryPolicy {
                max_attempts: 5,
                backoff: Duration::ZERO,
            },
        );
        assert!(retrying
            .fetch(&endpoint(), "ds", &RenameMap::default())
            .is_err());
        assert_eq!(t.requested_paths().len(), 1);
    }

    #[test]
    fn harmonizes_before_concat() {
        let t = FakeTransport::default()
            .respond(SHOW, 200, &package(&[("old", true), ("new", true)]))
            .respond("/datastore/dump/old", 200, "Causative Agent - 1\nCOVID-19\n")
            .respond("/datastore/dump/new", 200, "Causative Agent-1\nNorovirus\n");
        let renames = RenameMap::new(1, &[("Causative Agent - 1", "Causative Agent-1")]);

        let table = fetcher(&t).fetch(&endpoint(), "ds", &renames).unwrap();

        assert_eq!(table.get_column_names(), vec!["Causative Agent-1"]);
        assert_eq!(
            column(&table, "Causative Agent-1"),
            texts(&["COVID-19", "Norovirus"])
        );
    }

    #[test]
    fn dataset_id_is_query_encoded_and_base_path_kept() {
        let t = FakeTransport::default()
            .respond("/ckan/api/3/action/package_show", 200, &package(&[]));
        let base = Url::parse("https://catalog.test/ckan/").unwrap();
        fetcher(&t)
            .fetch(&base, "a b&c", &RenameMap::default())
            .unwrap();
        assert_eq!(t.requested_paths(), vec!["/ckan/api/3/action/package_show"]);

        let mut show = join(&base, "api/3/action/package_show");
        show.query_pairs_mut().append_pair("id", "a b&c");
        assert_eq!(
            show.as_str(),
            "https://catalog.test/ckan/api/3/action/package_show?id=a+b%26c"
        );
    }

    #[test]
    fn retry_delay_grows_linearly_and_saturates() {
        let policy = RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        };
        assert_eq!(policy.delay(1), Duration::from_millis(500));
        assert_eq!(policy.delay(3), Duration::from_millis(1500));

        let huge = RetryPolicy {
            max_attempts: u32::MAX,
            backoff: Duration::MAX,
        };
        assert_eq!(huge.delay(2), Duration::MAX);
        assert_eq!(huge.delay(u32::MAX), Duration::MAX);
    }

    #[test]
    fn dump_text_is_not_retyped() {
        let t = FakeTransport::default()
            .respond(SHOW, 200, &package(&[("A", true)]))
            .respond("/datastore/dump/A", 200, "Institution Name,x\n007,1.50\n");
        let table = fetcher(&t)
            .fetch(&endpoint(), "ds", &RenameMap::default())
            .unwrap();
        assert_eq!(column(&table, "Institution Name"), texts(&["007"]));
        assert_eq!(column(&table, "x"), texts(&["1.50"]));
    }
}
