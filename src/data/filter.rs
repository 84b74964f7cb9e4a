use std::collections::BTreeSet;

use chrono::{Months, NaiveDate};

use super::schema::OutbreakRecord;

// ---------------------------------------------------------------------------
// Outbreak filter: date window, setting, institutions, causes
// ---------------------------------------------------------------------------

/// Selection state of the outbreak widgets.
///
/// * `setting == None` → every setting ("View All")
/// * `institutions` empty → every institution
/// * `causes` empty → every primary causative agent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutbreakFilter {
    /// Exclusive lower bound on the began date.
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound on the began date.
    pub end: Option<NaiveDate>,
    pub setting: Option<String>,
    pub institutions: BTreeSet<String>,
    /// Matched against `Causative Agent-1`.
    pub causes: BTreeSet<String>,
}

impl OutbreakFilter {
    /// Window covering the two months up to the most recent outbreak.
    pub fn with_default_window(records: &[OutbreakRecord]) -> Self {
        let end = records.iter().filter_map(|r| r.date_began).max();
        let start = end.and_then(|d| d.checked_sub_months(Months::new(2)));
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    fn in_window(&self, r: &OutbreakRecord) -> bool {
        let Some(d) = r.date_began else {
            return false;
        };
        self.start.map_or(true, |s| d > s) && self.end.map_or(true, |e| d <= e)
    }

    fn in_setting(&self, r: &OutbreakRecord) -> bool {
        self.setting
            .as_ref()
            .map_or(true, |s| &r.outbreak_setting == s)
    }

    fn in_institutions(&self, r: &OutbreakRecord) -> bool {
        self.institutions.is_empty() || self.institutions.contains(&r.institution_name)
    }

    fn in_causes(&self, r: &OutbreakRecord) -> bool {
        self.causes.is_empty()
            || r.causative_agent_1
                .as_ref()
                .is_some_and(|agent| self.causes.contains(agent))
    }

    pub fn matches(&self, r: &OutbreakRecord) -> bool {
        self.in_window(r) && self.in_setting(r) && self.in_institutions(r) && self.in_causes(r)
    }

    /// Records passing every active constraint, in input order.
    pub fn apply<'a>(&self, records: &'a [OutbreakRecord]) -> Vec<&'a OutbreakRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Settings offered by the radio: those present inside the date window.
    pub fn setting_options(&self, records: &[OutbreakRecord]) -> BTreeSet<String> {
        records
            .iter()
            .filter(|r| self.in_window(r))
            .map(|r| r.outbreak_setting.clone())
            .collect()
    }

    /// Institutions offered by the multiselect: inside the window and setting.
    pub fn institution_options(&self, records: &[OutbreakRecord]) -> BTreeSet<String> {
        records
            .iter()
            .filter(|r| self.in_window(r) && self.in_setting(r))
            .map(|r| r.institution_name.clone())
            .collect()
    }

    /// Primary causative agents inside the window and setting.
    pub fn cause_options(&self, records: &[OutbreakRecord]) -> BTreeSet<String> {
        records
            .iter()
            .filter(|r| self.in_window(r) && self.in_setting(r))
            .filter_map(|r| r.causative_agent_1.clone())
            .collect()
    }

    /// Forget selections the widgets no longer offer after the window or
    /// setting moved. A vanished setting falls back to "View All" and clears
    /// the institutions. Returns true when anything changed.
    pub fn drop_stale_selections(&mut self, records: &[OutbreakRecord]) -> bool {
        let mut changed = false;
        if let Some(setting) = &self.setting {
            if !self.setting_options(records).contains(setting) {
                self.setting = None;
                self.institutions.clear();
                changed = true;
            }
        }
        let institutions = self.institution_options(records);
        let causes = self.cause_options(records);
        let before = self.institutions.len() + self.causes.len();
        self.institutions.retain(|i| institutions.contains(i));
        self.causes.retain(|c| causes.contains(c));
        changed || before != self.institutions.len() + self.causes.len()
    }
}
