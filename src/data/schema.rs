//! Typed records for each dataset and the column names they are read from.
//!
//! A fetched frame is validated and converted right after download, so a
//! renamed or missing upstream column fails loudly with
//! [`FetchError::SchemaMismatch`] instead of producing empty charts later.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::DataFrame;

use super::error::FetchError;
use super::model::{has_column, Row, TextRows};

/// Columns of the healthcare-institution outbreak dataset.
pub mod outbreaks {
    pub const INSTITUTION_NAME: &str = "Institution Name";
    pub const INSTITUTION_ADDRESS: &str = "Institution Address";
    pub const OUTBREAK_SETTING: &str = "Outbreak Setting";
    pub const TYPE_OF_OUTBREAK: &str = "Type of Outbreak";
    pub const CAUSATIVE_AGENT_1: &str = "Causative Agent-1";
    pub const CAUSATIVE_AGENT_2: &str = "Causative Agent-2";
    pub const DATE_BEGAN: &str = "Date Outbreak Began";
    pub const DATE_DECLARED_OVER: &str = "Date Declared Over";
    pub const ACTIVE: &str = "Active";
}

/// Columns of the COVID-19 case dataset.
pub mod covid_cases {
    pub const ASSIGNED_ID: &str = "Assigned_ID";
    pub const AGE_GROUP: &str = "Age Group";
    pub const CLIENT_GENDER: &str = "Client Gender";
    pub const SOURCE_OF_INFECTION: &str = "Source of Infection";
    pub const EVER_HOSPITALIZED: &str = "Ever Hospitalized";
}

/// Columns of the long-term-care COVID summary file.
pub mod ltc_summary {
    pub const REPORT_DATE: &str = "Report Date";
    pub const HOMES_WITH_ACTIVE_OUTBREAK: &str = "LTC_Homes_with_Active_Outbreak";
    pub const ACTIVE_RESIDENT_CASES: &str = "Confirmed_Active_LTC_Resident_Cases";
    pub const ACTIVE_HCW_CASES: &str = "Confirmed_Active_LTC_HCW_Cases";
    pub const TOTAL_RESIDENT_DEATHS: &str = "Total_LTC_Resident_Deaths";
}

// ---------------------------------------------------------------------------
// Record trait
// ---------------------------------------------------------------------------

pub trait DatasetRecord: Sized {
    /// Columns that must exist in the table header.
    const REQUIRED: &'static [&'static str];

    fn from_row(row: &Row<'_>) -> Result<Self, FetchError>;
}

/// Validate the header of `frame` and convert every row.
pub fn parse_records<R: DatasetRecord>(frame: &DataFrame) -> Result<Vec<R>, FetchError> {
    let missing: Vec<&str> = R::REQUIRED
        .iter()
        .copied()
        .filter(|c| !has_column(frame, c))
        .collect();
    if !missing.is_empty() {
        return Err(FetchError::schema(format!(
            "missing columns {missing:?} (have {:?})",
            frame.get_column_names()
        )));
    }
    let rows = TextRows::new(frame).map_err(|e| FetchError::schema(e.to_string()))?;
    (0..rows.len()).map(|i| R::from_row(&rows.row(i))).collect()
}

fn text(row: &Row<'_>, column: &str) -> Option<String> {
    row.text(column).map(str::to_string)
}

/// Plain decimal literal: optional sign, digits, at most one point.
fn decimal(s: &str) -> Option<f64> {
    let digits = s.strip_prefix(&['-', '+'][..]).unwrap_or(s);
    let well_formed = digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if well_formed {
        s.parse().ok()
    } else {
        None
    }
}

fn number(row: &Row<'_>, column: &str) -> Result<Option<f64>, FetchError> {
    match row.text(column) {
        None => Ok(None),
        Some(s) => decimal(s).map(Some).ok_or_else(|| {
            FetchError::schema(format!(
                "row {}: '{column}' is not numeric: {s}",
                row.index()
            ))
        }),
    }
}

// Two-digit years first: `%Y` would accept "23" as year 23.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a date in any of the formats the upstream exports have used.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

fn date(row: &Row<'_>, column: &str) -> Result<Option<NaiveDate>, FetchError> {
    match row.text(column) {
        None => Ok(None),
        Some(s) => parse_date(s).map(Some).ok_or_else(|| {
            FetchError::schema(format!(
                "row {}: '{column}' is not a date: {s}",
                row.index()
            ))
        }),
    }
}

// ---------------------------------------------------------------------------
// Outbreaks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OutbreakRecord {
    pub institution_name: String,
    pub institution_address: Option<String>,
    pub outbreak_setting: String,
    pub outbreak_type: String,
    pub causative_agent_1: Option<String>,
    pub causative_agent_2: Option<String>,
    pub date_began: Option<NaiveDate>,
    pub date_declared_over: Option<NaiveDate>,
    pub active: Option<String>,
}

impl DatasetRecord for OutbreakRecord {
    const REQUIRED: &'static [&'static str] = &[
        outbreaks::INSTITUTION_NAME,
        outbreaks::OUTBREAK_SETTING,
        outbreaks::TYPE_OF_OUTBREAK,
        outbreaks::CAUSATIVE_AGENT_1,
        outbreaks::DATE_BEGAN,
    ];

    fn from_row(row: &Row<'_>) -> Result<Self, FetchError> {
        Ok(OutbreakRecord {
            institution_name: text(row, outbreaks::INSTITUTION_NAME).unwrap_or_default(),
            institution_address: text(row, outbreaks::INSTITUTION_ADDRESS),
            outbreak_setting: text(row, outbreaks::OUTBREAK_SETTING)
                .unwrap_or_default()
                .replace("LTCH", "Long-Term Care Home"),
            outbreak_type: text(row, outbreaks::TYPE_OF_OUTBREAK).unwrap_or_default(),
            causative_agent_1: text(row, outbreaks::CAUSATIVE_AGENT_1),
            causative_agent_2: text(row, outbreaks::CAUSATIVE_AGENT_2),
            date_began: date(row, outbreaks::DATE_BEGAN)?,
            date_declared_over: date(row, outbreaks::DATE_DECLARED_OVER)?,
            active: text(row, outbreaks::ACTIVE),
        })
    }
}

// ---------------------------------------------------------------------------
// COVID-19 cases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CovidCaseRecord {
    pub assigned_id: Option<String>,
    pub age_group: Option<String>,
    pub client_gender: Option<String>,
    pub source_of_infection: Option<String>,
    pub ever_hospitalized: Option<String>,
}

impl DatasetRecord for CovidCaseRecord {
    const REQUIRED: &'static [&'static str] = &[
        covid_cases::ASSIGNED_ID,
        covid_cases::AGE_GROUP,
        covid_cases::CLIENT_GENDER,
        covid_cases::SOURCE_OF_INFECTION,
        covid_cases::EVER_HOSPITALIZED,
    ];

    fn from_row(row: &Row<'_>) -> Result<Self, FetchError> {
        Ok(CovidCaseRecord {
            assigned_id: text(row, covid_cases::ASSIGNED_ID),
            age_group: text(row, covid_cases::AGE_GROUP),
            client_gender: text(row, covid_cases::CLIENT_GENDER),
            source_of_infection: text(row, covid_cases::SOURCE_OF_INFECTION),
            ever_hospitalized: text(row, covid_cases::EVER_HOSPITALIZED),
        })
    }
}

// ---------------------------------------------------------------------------
// Long-term-care summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LtcSummaryRecord {
    pub report_date: NaiveDate,
    pub homes_with_active_outbreak: Option<f64>,
    pub active_resident_cases: Option<f64>,
    pub active_hcw_cases: Option<f64>,
    /// Cumulative since the start of reporting.
    pub total_resident_deaths: Option<f64>,
}

impl DatasetRecord for LtcSummaryRecord {
    const REQUIRED: &'static [&'static str] = &[
        ltc_summary::REPORT_DATE,
        ltc_summary::HOMES_WITH_ACTIVE_OUTBREAK,
        ltc_summary::ACTIVE_RESIDENT_CASES,
        ltc_summary::ACTIVE_HCW_CASES,
        ltc_summary::TOTAL_RESIDENT_DEATHS,
    ];

    fn from_row(row: &Row<'_>) -> Result<Self, FetchError> {
        let report_date = date(row, ltc_summary::REPORT_DATE)?.ok_or_else(|| {
            FetchError::schema(format!(
                "row {}: missing '{}'",
                row.index(),
                ltc_summary::REPORT_DATE
            ))
        })?;
        Ok(LtcSummaryRecord {
            report_date,
            homes_with_active_outbreak: number(row, ltc_summary::HOMES_WITH_ACTIVE_OUTBREAK)?,
            active_resident_cases: number(row, ltc_summary::ACTIVE_RESIDENT_CASES)?,
            active_hcw_cases: number(row, ltc_summary::ACTIVE_HCW_CASES)?,
            total_resident_deaths: number(row, ltc_summary::TOTAL_RESIDENT_DEATHS)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::decode_csv;

    const OUTBREAK_CSV: &str = "\
_id,Institution Name,Institution Address,Outbreak Setting,Type of Outbreak,Causative Agent-1,Causative Agent-2,Date Outbreak Began,Date Declared Over,Active
1,Sunrise Manor,1 Main St,LTCH,Respiratory,COVID-19,,2023-01-05,2023-01-20,N
2,Lakeview,2 Lake Rd,Hospital-Acute Care,Enteric,Norovirus,,2023-02-01,,Y
";

    #[test]
    fn parses_outbreaks() {
        let table = decode_csv(OUTBREAK_CSV).unwrap();
        let records: Vec<OutbreakRecord> = parse_records(&table).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outbreak_setting, "Long-Term Care Home");
        assert_eq!(records[0].causative_agent_1.as_deref(), Some("COVID-19"));
        assert_eq!(records[0].causative_agent_2, None);
        assert_eq!(records[0].date_began, NaiveDate::from_ymd_opt(2023, 1, 5));
        assert_eq!(records[1].date_declared_over, None);
        assert_eq!(records[1].active.as_deref(), Some("Y"));
    }

    #[test]
    fn missing_required_column_is_mismatch() {
        let table = decode_csv("Institution Name,Type of Outbreak\nA,Enteric\n").unwrap();
        let err = parse_records::<OutbreakRecord>(&table).unwrap_err();
        match err {
            FetchError::SchemaMismatch { reason } => {
                assert!(reason.contains("Outbreak Setting"), "{reason}")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_date_is_mismatch() {
        let csv = OUTBREAK_CSV.replace("2023-02-01", "sometime");
        let table = decode_csv(&csv).unwrap();
        assert!(matches!(
            parse_records::<OutbreakRecord>(&table),
            Err(FetchError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn text_fields_keep_source_spelling() {
        let csv = OUTBREAK_CSV
            .replace("Sunrise Manor", "007")
            .replace("COVID-19", "nan");
        let table = decode_csv(&csv).unwrap();
        let records: Vec<OutbreakRecord> = parse_records(&table).unwrap();
        assert_eq!(records[0].institution_name, "007");
        assert_eq!(records[0].causative_agent_1.as_deref(), Some("nan"));
    }

    #[test]
    fn counts_must_be_plain_decimals() {
        assert_eq!(decimal("12"), Some(12.0));
        assert_eq!(decimal("-1.50"), Some(-1.5));
        assert_eq!(decimal("nan"), None);
        assert_eq!(decimal("inf"), None);
        assert_eq!(decimal("1e3"), None);
        assert_eq!(decimal("1.2.3"), None);
        assert_eq!(decimal("."), None);

        let csv = "\
Report Date,LTC_Homes_with_Active_Outbreak,Confirmed_Active_LTC_Resident_Cases,Confirmed_Active_LTC_HCW_Cases,Total_LTC_Resident_Deaths
2021-01-01,NaN,40,20,100
";
        let table = decode_csv(csv).unwrap();
        assert!(matches!(
            parse_records::<LtcSummaryRecord>(&table),
            Err(FetchError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn date_formats() {
        let d = NaiveDate::from_ymd_opt(2023, 3, 7);
        assert_eq!(parse_date("2023-03-07"), d);
        assert_eq!(parse_date("03/07/23"), d);
        assert_eq!(parse_date("03/07/2023"), d);
        assert_eq!(parse_date("2023-03-07T00:00:00"), d);
        assert_eq!(parse_date("07.03.2023"), None);
    }

    #[test]
    fn parses_ltc_summary() {
        let csv = "\
Report Date,LTC_Homes_with_Active_Outbreak,Confirmed_Active_LTC_Resident_Cases,Confirmed_Active_LTC_HCW_Cases,Total_LTC_Resident_Deaths
2021-01-01,12,40,20,100
2021-01-02,,41.5,21,104
";
        let table = decode_csv(csv).unwrap();
        let records: Vec<LtcSummaryRecord> = parse_records(&table).unwrap();
        assert_eq!(records[1].homes_with_active_outbreak, None);
        assert_eq!(records[1].active_resident_cases, Some(41.5));
        assert_eq!(records[0].total_resident_deaths, Some(100.0));
    }

    #[test]
    fn parses_covid_cases() {
        let csv = "\
_id,Assigned_ID,Age Group,Client Gender,Source of Infection,Ever Hospitalized
1,101,19 and younger,FEMALE,Community,No
";
        let table = decode_csv(csv).unwrap();
        let records: Vec<CovidCaseRecord> = parse_records(&table).unwrap();
        assert_eq!(records[0].assigned_id.as_deref(), Some("101"));
        assert_eq!(records[0].client_gender.as_deref(), Some("FEMALE"));
    }
}
