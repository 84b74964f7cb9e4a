//! Writes a deterministic pair of long-term-care CSV files
//! (`covidsummary.csv` and `ltc_immunization_data.csv`) so the dashboard can
//! be run without the provincial downloads.
//!
//! Usage: `generate_sample [output-dir]`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};

const DAYS: u64 = 540;
const SUMMARY_FILE: &str = "covidsummary.csv";
const IMMUNIZATION_FILE: &str = "ltc_immunization_data.csv";

/// Small deterministic PRNG (splitmix64).
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for a normal sample.
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Waves of infection: a sum of bumps over the day index.
fn wave(day: f64) -> f64 {
    [(60.0, 25.0, 1.0), (270.0, 40.0, 0.6), (420.0, 20.0, 1.4)]
        .iter()
        .map(|&(mu, sigma, amp)| amp * (-(day - mu).powi(2) / (2.0 * sigma * sigma)).exp())
        .sum()
}

fn counts(value: f64) -> u64 {
    value.round().max(0.0) as u64
}

fn write_summary(path: &Path, start: NaiveDate, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "Report_Data_Extracted",
        "LTC_Homes_with_Active_Outbreak",
        "Confirmed_Active_LTC_Resident_Cases",
        "Confirmed_Active_LTC_HCW_Cases",
        "Total_LTC_Resident_Deaths",
    ])?;

    let mut deaths = 0u64;
    for day in 0..DAYS {
        let date = start + Days::new(day);
        let w = wave(day as f64);
        let residents = counts(w * 900.0 + rng.gauss(0.0, 15.0));
        let workers = counts(w * 600.0 + rng.gauss(0.0, 12.0));
        let homes = counts(w * 180.0 + rng.gauss(5.0, 3.0));
        deaths += counts(residents as f64 * 0.01 + rng.gauss(0.0, 1.0));
        writer.write_record([
            date.to_string(),
            homes.to_string(),
            residents.to_string(),
            workers.to_string(),
            deaths.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_immunization(path: &Path, start: NaiveDate, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "Date",
        "Percent_of_Residents_Fully_Immunized",
        "Percent_of_Staff_Fully_Immunized",
    ])?;

    // Reported weekly from the start of the vaccination campaign.
    for day in (240..DAYS).step_by(7) {
        let date = start + Days::new(day);
        let progress = ((day - 240) as f64 / 120.0).min(1.0);
        let residents = (progress * 94.0 + rng.gauss(0.0, 0.5)).clamp(0.0, 100.0);
        let staff = (progress * 88.0 + rng.gauss(0.0, 0.5)).clamp(0.0, 100.0);
        writer.write_record([
            date.to_string(),
            format!("{residents:.1}"),
            format!("{staff:.1}"),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let start = NaiveDate::from_ymd_opt(2020, 4, 1).context("invalid start date")?;
    let mut rng = SimpleRng::new(42);

    let summary = out_dir.join(SUMMARY_FILE);
    write_summary(&summary, start, &mut rng)?;
    let immunization = out_dir.join(IMMUNIZATION_FILE);
    write_immunization(&immunization, start, &mut rng)?;

    println!(
        "Wrote {DAYS} report days to {} and weekly rates to {}",
        summary.display(),
        immunization.display()
    );
    Ok(())
}
