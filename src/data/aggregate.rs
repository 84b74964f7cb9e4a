//! Group-by and pivot computations that feed the charts and the
//! "view data" tables. Every function is pure over the records it is given.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};

use polars::prelude::DataFrame;

use super::model::TextRows;
use super::schema::{covid_cases, outbreaks, CovidCaseRecord, LtcSummaryRecord, OutbreakRecord};

// ---------------------------------------------------------------------------
// Outbreak aggregations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

fn count_by<'a, F>(records: &[&'a OutbreakRecord], key: F) -> BTreeMap<&'a str, usize>
where
    F: Fn(&'a OutbreakRecord) -> &'a str,
{
    let mut counts = BTreeMap::new();
    for &r in records {
        *counts.entry(key(r)).or_insert(0) += 1;
    }
    counts
}

/// Number of outbreaks per type of outbreak, sorted by type.
pub fn outbreaks_by_type(records: &[&OutbreakRecord]) -> Vec<CategoryCount> {
    count_by(records, |r| r.outbreak_type.as_str())
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

/// Institutions with the most outbreaks, descending; ties by name.
pub fn top_institutions(records: &[&OutbreakRecord], n: usize) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = count_by(records, |r| r.institution_name.as_str())
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    counts.truncate(n);
    counts
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentCount {
    pub outbreak_type: String,
    pub agent: String,
    pub count: usize,
    /// Share of all counted outbreaks, 0–100.
    pub percentage: f64,
}

/// Outbreaks per (type, primary causative agent). Within a type the most
/// frequent agent comes first.
pub fn causative_agents_by_type(records: &[&OutbreakRecord]) -> Vec<AgentCount> {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for r in records {
        if let Some(agent) = r.causative_agent_1.as_deref() {
            *counts.entry((r.outbreak_type.as_str(), agent)).or_insert(0) += 1;
        }
    }
    let total: usize = counts.values().sum();

    let mut out: Vec<AgentCount> = counts
        .into_iter()
        .map(|((outbreak_type, agent), count)| AgentCount {
            outbreak_type: outbreak_type.to_string(),
            agent: agent.to_string(),
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect();
    out.sort_by(|a, b| {
        a.outbreak_type
            .cmp(&b.outbreak_type)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.agent.cmp(&b.agent))
    });
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateSeries {
    pub name: String,
    pub points: Vec<(NaiveDate, usize)>,
}

/// One series per outbreak type: outbreaks beginning on each date.
pub fn outbreaks_over_time(records: &[&OutbreakRecord]) -> Vec<DateSeries> {
    let mut pivot: BTreeMap<&str, BTreeMap<NaiveDate, usize>> = BTreeMap::new();
    for r in records {
        if let Some(d) = r.date_began {
            *pivot
                .entry(r.outbreak_type.as_str())
                .or_default()
                .entry(d)
                .or_insert(0) += 1;
        }
    }
    pivot
        .into_iter()
        .map(|(name, by_date)| DateSeries {
            name: name.to_string(),
            points: by_date.into_iter().collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Long-term-care summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LtcMetric {
    HealthWorkerAndResidentCases,
    ActiveOutbreaks,
    ResidentDeaths,
}

impl LtcMetric {
    pub const ALL: [LtcMetric; 3] = [
        LtcMetric::HealthWorkerAndResidentCases,
        LtcMetric::ActiveOutbreaks,
        LtcMetric::ResidentDeaths,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LtcMetric::HealthWorkerAndResidentCases => "Health Worker and Resident Cases",
            LtcMetric::ActiveOutbreaks => "Active Outbreaks",
            LtcMetric::ResidentDeaths => "Resident Deaths",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPoint {
    /// First day of the month.
    pub month: NaiveDate,
    pub value: f64,
}

impl MonthlyPoint {
    pub fn label(&self) -> String {
        self.month.format("%Y %b").to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    pub name: String,
    pub points: Vec<MonthlyPoint>,
}

fn month_of(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

enum Reduce {
    Sum,
    Mean,
}

/// Reduce `(date, value)` samples per calendar month, chronologically.
/// Sums treat missing values as absent; a month with no value has mean
/// undefined and is left out.
fn monthly<I>(name: &str, samples: I, reduce: Reduce) -> MonthlySeries
where
    I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
{
    let mut buckets: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for (date, value) in samples {
        let bucket = buckets.entry(month_of(date)).or_default();
        if let Some(v) = value {
            bucket.push(v);
        }
    }
    let points = buckets
        .into_iter()
        .filter_map(|(month, values)| {
            let value = match reduce {
                Reduce::Sum => values.iter().sum::<f64>(),
                Reduce::Mean if values.is_empty() => return None,
                Reduce::Mean => values.iter().sum::<f64>() / values.len() as f64,
            };
            Some(MonthlyPoint { month, value })
        })
        .collect();
    MonthlySeries {
        name: name.to_string(),
        points,
    }
}

/// Monthly series for the selected LTC metric.
pub fn ltc_monthly_series(records: &[LtcSummaryRecord], metric: LtcMetric) -> Vec<MonthlySeries> {
    let mut sorted: Vec<&LtcSummaryRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.report_date);

    match metric {
        LtcMetric::ActiveOutbreaks => vec![monthly(
            "Active Outbreaks",
            sorted
                .iter()
                .map(|r| (r.report_date, r.homes_with_active_outbreak)),
            Reduce::Sum,
        )],
        LtcMetric::ResidentDeaths => {
            // Deaths are reported cumulatively; chart the daily increase.
            let daily = sorted.iter().enumerate().map(|(i, r)| {
                let prev = i.checked_sub(1).and_then(|p| sorted[p].total_resident_deaths);
                let delta = match (r.total_resident_deaths, prev) {
                    (Some(cur), Some(prev)) => Some(cur - prev),
                    _ => None,
                };
                (r.report_date, delta)
            });
            vec![monthly("Resident Deaths", daily, Reduce::Sum)]
        }
        LtcMetric::HealthWorkerAndResidentCases => vec![
            monthly(
                "Health Workers",
                sorted.iter().map(|r| (r.report_date, r.active_hcw_cases)),
                Reduce::Mean,
            ),
            monthly(
                "Residents",
                sorted.iter().map(|r| (r.report_date, r.active_resident_cases)),
                Reduce::Mean,
            ),
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub resident_cases: f64,
    pub hcw_cases: f64,
    pub resident_deaths: f64,
}

/// Resident vs. health-care-worker active cases, sized by deaths.
pub fn case_comparison(records: &[LtcSummaryRecord]) -> Vec<ScatterPoint> {
    records
        .iter()
        .filter_map(|r| {
            Some(ScatterPoint {
                resident_cases: r.active_resident_cases?,
                hcw_cases: r.active_hcw_cases?,
                resident_deaths: r.total_resident_deaths.unwrap_or(0.0),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// COVID-19 case demographics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demographic {
    Gender,
    SourceOfInfection,
    Hospitalizations,
}

impl Demographic {
    pub const ALL: [Demographic; 3] = [
        Demographic::Gender,
        Demographic::SourceOfInfection,
        Demographic::Hospitalizations,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Demographic::Gender => "Gender",
            Demographic::SourceOfInfection => "Source of Infection",
            Demographic::Hospitalizations => "Hospitalizations",
        }
    }

    fn category(self, r: &CovidCaseRecord) -> Option<String> {
        match self {
            Demographic::Gender => r.client_gender.clone(),
            Demographic::SourceOfInfection => r.source_of_infection.clone(),
            Demographic::Hospitalizations => r.ever_hospitalized.as_deref().map(|h| match h {
                "Yes" => "Hospitalized".to_string(),
                "No" => "Not Hospitalized".to_string(),
                other => other.to_string(),
            }),
        }
    }
}

const EXCLUDED_SOURCES: &[&str] = &["No Information", "Pending"];
const EXCLUDED_GENDERS: &[&str] = &["UNKNOWN", "NOT LISTED, PLEASE SPECIFY"];

fn is_excluded(r: &CovidCaseRecord) -> bool {
    let hit = |v: &Option<String>, list: &[&str]| v.as_deref().is_some_and(|v| list.contains(&v));
    hit(&r.source_of_infection, EXCLUDED_SOURCES) || hit(&r.client_gender, EXCLUDED_GENDERS)
}

/// Case counts per age group (rows) and demographic category (columns).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Crosstab {
    pub rows: Vec<String>,
    pub categories: Vec<String>,
    counts: BTreeMap<(String, String), usize>,
}

impl Crosstab {
    pub fn get(&self, row: &str, category: &str) -> usize {
        self.counts
            .get(&(row.to_string(), category.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

/// Cross-tabulate cases with an assigned id by age group and `dimension`.
pub fn case_demographics(records: &[CovidCaseRecord], dimension: Demographic) -> Crosstab {
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    let mut rows = BTreeSet::new();
    let mut categories = BTreeSet::new();

    for r in records.iter().filter(|r| !is_excluded(r)) {
        let (Some(age), Some(category), Some(_)) =
            (r.age_group.clone(), dimension.category(r), r.assigned_id.as_ref())
        else {
            continue;
        };
        rows.insert(age.clone());
        categories.insert(category.clone());
        *counts.entry((age, category)).or_insert(0) += 1;
    }

    Crosstab {
        rows: rows.into_iter().collect(),
        categories: categories.into_iter().collect(),
        counts,
    }
}

// ---------------------------------------------------------------------------
// View tables and CSV export
// ---------------------------------------------------------------------------

/// A small rectangular table shown under a chart and offered for download.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ViewTable {
    /// Every column of a loaded frame, nulls shown blank.
    pub fn from_frame(frame: &DataFrame) -> Result<Self> {
        let headers: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();
        let cells = TextRows::new(frame).context("reading frame as text")?;
        let rows = (0..cells.len())
            .map(|i| {
                let row = cells.row(i);
                headers
                    .iter()
                    .map(|c| row.text(c).unwrap_or_default().to_string())
                    .collect()
            })
            .collect();
        Ok(Self { headers, rows })
    }

    pub fn outbreaks_by_type(counts: &[CategoryCount]) -> Self {
        Self {
            headers: vec![
                outbreaks::TYPE_OF_OUTBREAK.to_string(),
                "Number of Outbreaks".to_string(),
            ],
            rows: counts
                .iter()
                .map(|c| vec![c.label.clone(), c.count.to_string()])
                .collect(),
        }
    }

    pub fn causative_agents(counts: &[AgentCount]) -> Self {
        Self {
            headers: vec![
                outbreaks::TYPE_OF_OUTBREAK.to_string(),
                outbreaks::CAUSATIVE_AGENT_1.to_string(),
                "Number of Outbreaks".to_string(),
            ],
            rows: counts
                .iter()
                .map(|c| vec![c.outbreak_type.clone(), c.agent.clone(), c.count.to_string()])
                .collect(),
        }
    }

    /// The records themselves, one row per outbreak.
    pub fn outbreak_records(records: &[&OutbreakRecord]) -> Self {
        let date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        let text = |t: &Option<String>| t.clone().unwrap_or_default();
        Self {
            headers: [
                outbreaks::INSTITUTION_NAME,
                outbreaks::INSTITUTION_ADDRESS,
                outbreaks::OUTBREAK_SETTING,
                outbreaks::TYPE_OF_OUTBREAK,
                outbreaks::CAUSATIVE_AGENT_1,
                outbreaks::CAUSATIVE_AGENT_2,
                outbreaks::DATE_BEGAN,
                outbreaks::DATE_DECLARED_OVER,
                outbreaks::ACTIVE,
            ]
            .map(str::to_string)
            .to_vec(),
            rows: records
                .iter()
                .map(|r| {
                    vec![
                        r.institution_name.clone(),
                        text(&r.institution_address),
                        r.outbreak_setting.clone(),
                        r.outbreak_type.clone(),
                        text(&r.causative_agent_1),
                        text(&r.causative_agent_2),
                        date(r.date_began),
                        date(r.date_declared_over),
                        text(&r.active),
                    ]
                })
                .collect(),
        }
    }

    /// Months as rows, one column per series.
    pub fn monthly(series: &[MonthlySeries]) -> Self {
        // Keyed by month so rows sort chronologically, not by label.
        let mut months: BTreeMap<NaiveDate, (String, Vec<Option<f64>>)> = BTreeMap::new();
        for (i, s) in series.iter().enumerate() {
            for p in &s.points {
                months
                    .entry(p.month)
                    .or_insert_with(|| (p.label(), vec![None; series.len()]))
                    .1[i] = Some(p.value);
            }
        }
        let mut headers = vec!["month_year".to_string()];
        headers.extend(series.iter().map(|s| s.name.clone()));
        Self {
            headers,
            rows: months
                .into_iter()
                .map(|(_, (label, values))| {
                    let mut row = vec![label];
                    row.extend(
                        values
                            .into_iter()
                            .map(|v| v.map(|v| format!("{v:.2}")).unwrap_or_default()),
                    );
                    row
                })
                .collect(),
        }
    }

    pub fn demographics(tab: &Crosstab) -> Self {
        let mut headers = vec![covid_cases::AGE_GROUP.to_string()];
        headers.extend(tab.categories.iter().cloned());
        Self {
            headers,
            rows: tab
                .rows
                .iter()
                .map(|age| {
                    let mut row = vec![age.clone()];
                    row.extend(tab.categories.iter().map(|c| tab.get(age, c).to_string()));
                    row
                })
                .collect(),
        }
    }

    /// UTF-8 CSV with a header row.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.headers)
            .context("writing CSV header")?;
        for row in &self.rows {
            writer.write_record(row).context("writing CSV row")?;
        }
        writer
            .into_inner()
            .map_err(|e| anyhow!("flushing CSV: {}", e.error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outbreak(name: &str, kind: &str, agent: Option<&str>, began: (i32, u32, u32)) -> OutbreakRecord {
        OutbreakRecord {
            institution_name: name.to_string(),
            institution_address: None,
            outbreak_setting: "Long-Term Care Home".to_string(),
            outbreak_type: kind.to_string(),
            causative_agent_1: agent.map(str::to_string),
            causative_agent_2: None,
            date_began: NaiveDate::from_ymd_opt(began.0, began.1, began.2),
            date_declared_over: None,
            active: None,
        }
    }

    fn outbreaks_fixture() -> Vec<OutbreakRecord> {
        vec![
            outbreak("Sunrise", "Respiratory", Some("COVID-19"), (2023, 1, 5)),
            outbreak("Sunrise", "Respiratory", Some("COVID-19"), (2023, 1, 5)),
            outbreak("Lakeview", "Respiratory", Some("Influenza A"), (2023, 1, 9)),
            outbreak("Lakeview", "Enteric", Some("Norovirus"), (2023, 1, 9)),
            outbreak("Birch", "Enteric", None, (2023, 2, 1)),
        ]
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn counts_by_type() {
        let records = outbreaks_fixture();
        let refs: Vec<&OutbreakRecord> = records.iter().collect();
        assert_eq!(
            outbreaks_by_type(&refs),
            vec![
                CategoryCount { label: "Enteric".into(), count: 2 },
                CategoryCount { label: "Respiratory".into(), count: 3 },
            ]
        );
    }

    #[test]
    fn agents_by_type_with_share() {
        let records = outbreaks_fixture();
        let refs: Vec<&OutbreakRecord> = records.iter().collect();
        let agents = causative_agents_by_type(&refs);
        let keys: Vec<_> = agents
            .iter()
            .map(|a| (a.outbreak_type.as_str(), a.agent.as_str(), a.count))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Enteric", "Norovirus", 1),
                ("Respiratory", "COVID-19", 2),
                ("Respiratory", "Influenza A", 1),
            ]
        );
        assert!((agents[1].percentage - 50.0).abs() < 1e-9);
        let total: f64 = agents.iter().map(|a| a.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn pivot_over_time() {
        let records = outbreaks_fixture();
        let refs: Vec<&OutbreakRecord> = records.iter().collect();
        let series = outbreaks_over_time(&refs);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].name, "Respiratory");
        assert_eq!(
            series[1].points,
            vec![(day(2023, 1, 5), 2), (day(2023, 1, 9), 1)]
        );
    }

    #[test]
    fn top_institutions_descending() {
        let records = outbreaks_fixture();
        let refs: Vec<&OutbreakRecord> = records.iter().collect();
        let top = top_institutions(&refs, 2);
        let labels: Vec<_> = top.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(labels, vec![("Lakeview", 2), ("Sunrise", 2)]);
    }

    fn ltc(d: NaiveDate, homes: f64, res: f64, hcw: f64, deaths: f64) -> LtcSummaryRecord {
        LtcSummaryRecord {
            report_date: d,
            homes_with_active_outbreak: Some(homes),
            active_resident_cases: Some(res),
            active_hcw_cases: Some(hcw),
            total_resident_deaths: Some(deaths),
        }
    }

    fn ltc_fixture() -> Vec<LtcSummaryRecord> {
        vec![
            ltc(day(2020, 6, 1), 5.0, 30.0, 10.0, 120.0),
            ltc(day(2020, 5, 30), 4.0, 20.0, 12.0, 100.0),
            ltc(day(2020, 5, 31), 6.0, 40.0, 14.0, 110.0),
            ltc(day(2020, 6, 2), 7.0, 50.0, 20.0, 125.0),
        ]
    }

    #[test]
    fn monthly_active_outbreaks_sum() {
        let series = ltc_monthly_series(&ltc_fixture(), LtcMetric::ActiveOutbreaks);
        let values: Vec<_> = series[0].points.iter().map(|p| (p.label(), p.value)).collect();
        assert_eq!(
            values,
            vec![("2020 May".to_string(), 10.0), ("2020 Jun".to_string(), 12.0)]
        );
    }

    #[test]
    fn monthly_deaths_from_cumulative() {
        let series = ltc_monthly_series(&ltc_fixture(), LtcMetric::ResidentDeaths);
        let values: Vec<_> = series[0].points.iter().map(|p| p.value).collect();
        // May: 110-100; June: (120-110) + (125-120)
        assert_eq!(values, vec![10.0, 15.0]);
    }

    #[test]
    fn monthly_case_means() {
        let series = ltc_monthly_series(&ltc_fixture(), LtcMetric::HealthWorkerAndResidentCases);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "Health Workers");
        assert_eq!(series[0].points[0].value, 13.0);
        assert_eq!(series[1].points[1].value, 40.0);

        let table = ViewTable::monthly(&series);
        assert_eq!(table.headers, vec!["month_year", "Health Workers", "Residents"]);
        assert_eq!(table.rows[0], vec!["2020 May", "13.00", "30.00"]);
    }

    #[test]
    fn scatter_skips_missing_coordinates() {
        let mut records = ltc_fixture();
        records[0].active_hcw_cases = None;
        assert_eq!(case_comparison(&records).len(), 3);
    }

    fn case(id: Option<&str>, age: &str, gender: &str, source: &str, hosp: &str) -> CovidCaseRecord {
        CovidCaseRecord {
            assigned_id: id.map(str::to_string),
            age_group: Some(age.to_string()),
            client_gender: Some(gender.to_string()),
            source_of_infection: Some(source.to_string()),
            ever_hospitalized: Some(hosp.to_string()),
        }
    }

    #[test]
    fn demographics_drop_and_relabel() {
        let cases = vec![
            case(Some("1"), "20 to 29 Years", "FEMALE", "Community", "Yes"),
            case(Some("2"), "20 to 29 Years", "MALE", "Community", "No"),
            case(Some("3"), "20 to 29 Years", "UNKNOWN", "Community", "No"),
            case(Some("4"), "30 to 39 Years", "FEMALE", "Pending", "No"),
            case(None, "30 to 39 Years", "FEMALE", "Community", "No"),
            case(Some("6"), "30 to 39 Years", "FEMALE", "Travel", "No"),
        ];

        let by_gender = case_demographics(&cases, Demographic::Gender);
        assert_eq!(by_gender.categories, vec!["FEMALE", "MALE"]);
        assert_eq!(by_gender.get("20 to 29 Years", "FEMALE"), 1);
        assert_eq!(by_gender.get("30 to 39 Years", "FEMALE"), 1);

        let by_hosp = case_demographics(&cases, Demographic::Hospitalizations);
        assert_eq!(by_hosp.categories, vec!["Hospitalized", "Not Hospitalized"]);
        assert_eq!(by_hosp.get("20 to 29 Years", "Not Hospitalized"), 1);

        let view = ViewTable::demographics(&by_hosp);
        assert_eq!(view.headers, vec!["Age Group", "Hospitalized", "Not Hospitalized"]);
        assert_eq!(view.rows[1], vec!["30 to 39 Years", "0", "1"]);
    }

    #[test]
    fn outbreak_rows_list_every_field() {
        let records = outbreaks_fixture();
        let refs: Vec<&OutbreakRecord> = records.iter().collect();
        let table = ViewTable::outbreak_records(&refs[..1]);
        assert_eq!(table.headers.len(), 9);
        assert_eq!(
            table.rows[0],
            vec!["Sunrise", "", "Long-Term Care Home", "Respiratory", "COVID-19", "", "2023-01-05", "", ""]
        );
    }

    #[test]
    fn raw_frame_view_blanks_missing_cells() {
        let frame = crate::data::loader::decode_csv("a,b\n007,\n").unwrap();
        let view = ViewTable::from_frame(&frame).unwrap();
        assert_eq!(view.headers, vec!["a", "b"]);
        assert_eq!(view.rows, vec![vec!["007".to_string(), String::new()]]);
    }

    #[test]
    fn view_table_csv() {
        let table = ViewTable::outbreaks_by_type(&[CategoryCount {
            label: "Enteric, other".into(),
            count: 4,
        }]);
        let bytes = table.to_csv_bytes().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap().replace("\r\n", "\n"),
            "Type of Outbreak,Number of Outbreaks\n\"Enteric, other\",4\n"
        );
    }
}
