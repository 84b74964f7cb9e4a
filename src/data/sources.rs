use std::path::Path;

use anyhow::{Context, Result};

use super::fetcher::DatasetFetcher;
use super::aggregate::ViewTable;
use super::loader::load_ltc_tables;
use super::schema::{parse_records, DatasetRecord, LtcSummaryRecord};
use super::transport::{Transport, UreqTransport};
use crate::config::{DashboardConfig, DatasetSource};

/// Fetch one catalog dataset and parse it into typed records.
pub fn fetch_records<R, T>(fetcher: &DatasetFetcher<T>, source: &DatasetSource) -> Result<Vec<R>>
where
    R: DatasetRecord,
    T: Transport,
{
    let table = fetcher
        .fetch(&source.catalog_endpoint, &source.dataset_id, &source.renames)
        .with_context(|| format!("fetching '{}'", source.dataset_id))?;
    let records = parse_records::<R>(&table)
        .with_context(|| format!("parsing '{}'", source.dataset_id))?;
    log::info!("'{}': {} records", source.dataset_id, records.len());
    Ok(records)
}

/// A fetcher over HTTP configured from the `http` settings.
pub fn http_fetcher(config: &DashboardConfig) -> DatasetFetcher<UreqTransport> {
    DatasetFetcher::new(
        UreqTransport::new(config.http.timeout()),
        config.http.retry_policy(),
    )
}

/// The long-term-care files: the joined report as shown under the charts,
/// plus typed summary records.
#[derive(Debug, Clone, Default)]
pub struct LtcData {
    pub report: ViewTable,
    pub summary: Vec<LtcSummaryRecord>,
}

pub fn load_ltc(summary: &Path, vaccination: Option<&Path>) -> Result<LtcData> {
    let frame = load_ltc_tables(summary, vaccination)?;
    let records = parse_records::<LtcSummaryRecord>(&frame)
        .with_context(|| format!("parsing {}", summary.display()))?;
    Ok(LtcData {
        report: ViewTable::from_frame(&frame)?,
        summary: records,
    })
}
