use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::DashboardConfig;
use crate::data::aggregate::{Demographic, LtcMetric};
use crate::data::filter::OutbreakFilter;
use crate::data::schema::{CovidCaseRecord, OutbreakRecord};
use crate::data::sources::{fetch_records, http_fetcher, load_ltc, LtcData};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Datasets are owned here and handed to the chart code by reference; the
/// charts never reach for them any other way.
pub struct AppState {
    pub config: DashboardConfig,

    pub outbreaks: Vec<OutbreakRecord>,
    pub covid_cases: Vec<CovidCaseRecord>,
    /// None until the LTC files are loaded.
    pub ltc: Option<LtcData>,

    pub filter: OutbreakFilter,
    pub ltc_metric: LtcMetric,
    pub demographic: Demographic,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            outbreaks: Vec::new(),
            covid_cases: Vec::new(),
            ltc: None,
            filter: OutbreakFilter::default(),
            ltc_metric: LtcMetric::HealthWorkerAndResidentCases,
            demographic: Demographic::Gender,
            status_message: None,
        }
    }

    /// Load everything the config points at. Failures are reported in the
    /// status bar; whatever loaded stays usable.
    pub fn load_all(&mut self) {
        self.reload_remote();
        let summary = self.config.ltc_summary_path.clone();
        let vaccination = self.config.ltc_vaccination_path.clone();
        self.open_ltc(&summary, vaccination.as_deref());
    }

    /// Re-fetch both catalog datasets from scratch.
    pub fn reload_remote(&mut self) {
        let fetcher = http_fetcher(&self.config);
        let mut errors = Vec::new();

        match fetch_records::<OutbreakRecord, _>(&fetcher, &self.config.outbreaks) {
            Ok(records) => self.set_outbreaks(records),
            Err(e) => errors.push(e),
        }
        match fetch_records::<CovidCaseRecord, _>(&fetcher, &self.config.covid_cases) {
            Ok(records) => self.covid_cases = records,
            Err(e) => errors.push(e),
        }

        self.status_message = None;
        for e in errors {
            self.report(e);
        }
    }

    pub fn set_outbreaks(&mut self, records: Vec<OutbreakRecord>) {
        self.filter = OutbreakFilter::with_default_window(&records);
        self.outbreaks = records;
    }

    /// Load the LTC summary, joined with vaccination rates when given.
    pub fn open_ltc(&mut self, summary: &Path, vaccination: Option<&Path>) {
        match load_ltc(summary, vaccination) {
            Ok(data) => {
                self.config.ltc_summary_path = summary.to_path_buf();
                self.config.ltc_vaccination_path = vaccination.map(Path::to_path_buf);
                self.ltc = Some(data);
            }
            Err(e) => self.report(e),
        }
    }

    /// Replace only the vaccination side of the LTC join.
    pub fn open_vaccination(&mut self, path: PathBuf) {
        let summary = self.config.ltc_summary_path.clone();
        self.open_ltc(&summary, Some(&path));
    }

    /// Outbreak records passing the current filter.
    pub fn visible_outbreaks(&self) -> Vec<&OutbreakRecord> {
        self.filter.apply(&self.outbreaks)
    }

    pub fn report(&mut self, e: anyhow::Error) {
        log::error!("{e:#}");
        let msg = format!("Error: {e:#}");
        self.status_message = Some(match self.status_message.take() {
            Some(prev) => format!("{prev} | {msg}"),
            None => msg,
        });
    }

    /// Write a download to a user-chosen file.
    pub fn save_bytes(&mut self, path: &Path, bytes: Result<Vec<u8>>) {
        let result = bytes.and_then(|b| {
            std::fs::write(path, b).map_err(|e| anyhow::anyhow!("writing {}: {e}", path.display()))
        });
        match result {
            Ok(()) => log::info!("saved {}", path.display()),
            Err(e) => self.report(e),
        }
    }
}
