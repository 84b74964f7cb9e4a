use chrono::Local;
use eframe::egui::{self, Grid, ScrollArea, Ui};

use crate::color::ColorMap;
use crate::data::aggregate::{
    case_comparison, case_demographics, causative_agents_by_type, ltc_monthly_series,
    outbreaks_by_type, outbreaks_over_time, top_institutions, Demographic, LtcMetric, ViewTable,
};
use crate::state::AppState;
use crate::ui::charts;

const TOP_INSTITUTIONS: usize = 20;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render every chart from the current state.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Our Healthcare Dashboard");
            ui.label(
                "Outbreaks and COVID-19 data in care homes and other healthcare institutions.",
            );
            ui.separator();

            outbreak_section(ui, state);
            ui.separator();
            ltc_section(ui, state);
            ui.separator();
            demographics_section(ui, state);
        });
}

fn outbreak_section(ui: &mut Ui, state: &mut AppState) {
    if state.outbreaks.is_empty() {
        ui.label("No outbreak data loaded (File → Reload from catalog).");
        return;
    }

    let visible = state.visible_outbreaks();
    let over_time = outbreaks_over_time(&visible);
    let agents = causative_agents_by_type(&visible);
    let by_type = outbreaks_by_type(&visible);
    let colors = ColorMap::new(
        by_type
            .iter()
            .map(|c| c.label.as_str())
            .chain(agents.iter().map(|a| a.agent.as_str())),
    );
    let all: Vec<_> = state.outbreaks.iter().collect();
    let top = top_institutions(&all, TOP_INSTITUTIONS);

    let mut downloads: Vec<(&'static str, ViewTable)> = Vec::new();

    ui.columns(2, |cols| {
        cols[0].strong("Outbreaks Over Time");
        charts::outbreaks_line_chart(&mut cols[0], &over_time, &colors);
        cols[1].strong("Causative Agent Per Outbreak Type");
        charts::causative_agent_bar_chart(&mut cols[1], &agents, &colors);
    });

    ui.columns(2, |cols| {
        if let Some(table) = view_data(&mut cols[0], "View Data (Outbreaks by Type)", || {
            ViewTable::outbreaks_by_type(&by_type)
        }) {
            downloads.push(("OutbreakType.csv", table));
        }
        if let Some(table) = view_data(&mut cols[1], "View Data (Outbreaks by Causative Agent)", || {
            ViewTable::causative_agents(&agents)
        }) {
            downloads.push(("CausativeAgents.csv", table));
        }
    });

    ui.columns(2, |cols| {
        cols[0].strong("Type of Outbreak");
        charts::pie_chart(&mut cols[0], &by_type, &colors);
        cols[1].strong(format!(
            "Top {TOP_INSTITUTIONS} Outbreak Numbers by Institution (all years)"
        ));
        charts::ranked_bar_chart(&mut cols[1], "top_institutions", &top, "Total Outbreaks");
    });

    if let Some(table) = view_data(ui, "View Data (Filtered Outbreaks)", || {
        ViewTable::outbreak_records(&visible)
    }) {
        downloads.push(("Outbreaks.csv", table));
    }

    for (name, table) in downloads {
        save_dialog(state, name, table.to_csv_bytes());
    }
}

fn ltc_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("COVID-19 Long Term Care Home Data");
    let Some(ltc) = &state.ltc else {
        ui.label("No long-term-care summary loaded (File → Open LTC summary…).");
        return;
    };

    let mut metric = state.ltc_metric;
    egui::ComboBox::from_id_salt("ltc_metric")
        .selected_text(metric.label())
        .show_ui(ui, |ui: &mut Ui| {
            for m in LtcMetric::ALL {
                ui.selectable_value(&mut metric, m, m.label());
            }
        });

    let series = ltc_monthly_series(&ltc.summary, metric);
    let y_label = match metric {
        LtcMetric::HealthWorkerAndResidentCases => "Average Cases",
        LtcMetric::ActiveOutbreaks => "Active Outbreaks",
        LtcMetric::ResidentDeaths => "Resident Deaths",
    };
    let scatter = case_comparison(&ltc.summary);

    charts::monthly_line_chart(ui, &series, y_label);
    charts::source_note(
        ui,
        &format!(
            "Ontario Long-Term Care Home COVID-19 Data (open.canada.ca) / {}  Source: Government of Canada",
            Local::now().date_naive()
        ),
    );
    let monthly = view_data(ui, &format!("View Data ({})", metric.label()), || {
        ViewTable::monthly(&series)
    });

    ui.strong("Resident Covid-19 Cases and Resident Deaths");
    charts::case_comparison_scatter(ui, &scatter);
    let report_bytes = view_loaded(ui, "View Data (Daily Reports)", &ltc.report)
        .then(|| ltc.report.to_csv_bytes());

    state.ltc_metric = metric;
    if let Some(table) = monthly {
        save_dialog(state, "TimeSeries.csv", table.to_csv_bytes());
    }
    if let Some(bytes) = report_bytes {
        save_dialog(state, "LtcReports.csv", bytes);
    }
}

fn demographics_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Covid-19 Case Distribution by Age (2020 to Present)");
    if state.covid_cases.is_empty() {
        ui.label("No COVID-19 case data loaded.");
        return;
    }

    let mut dimension = state.demographic;
    egui::ComboBox::from_id_salt("demographic")
        .selected_text(dimension.label())
        .show_ui(ui, |ui: &mut Ui| {
            for d in Demographic::ALL {
                ui.selectable_value(&mut dimension, d, d.label());
            }
        });
    state.demographic = dimension;

    let tab = case_demographics(&state.covid_cases, dimension);
    charts::demographics_bar_chart(ui, &tab);
    charts::source_note(
        ui,
        &format!(
            "COVID-19 Cases in Toronto (open.toronto.ca) / {}  Source: Toronto Public Health",
            Local::now().date_naive()
        ),
    );
    if let Some(table) = view_data(ui, "View Data (Cases by Age Group)", || {
        ViewTable::demographics(&tab)
    }) {
        save_dialog(state, "CaseDistribution.csv", table.to_csv_bytes());
    }
}

// ---------------------------------------------------------------------------
// View data + download
// ---------------------------------------------------------------------------

/// Collapsible grid of a table built only while the header is open.
/// Returns the table when "Download Data" was clicked.
fn view_data(ui: &mut Ui, title: &str, build: impl FnOnce() -> ViewTable) -> Option<ViewTable> {
    egui::CollapsingHeader::new(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let table = build();
            table_grid(ui, title, &table).then_some(table)
        })
        .body_returned
        .flatten()
}

/// Collapsible grid of a table that is already loaded. Returns true when
/// "Download Data" was clicked.
fn view_loaded(ui: &mut Ui, title: &str, table: &ViewTable) -> bool {
    egui::CollapsingHeader::new(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| table_grid(ui, title, table))
        .body_returned
        .unwrap_or(false)
}

fn table_grid(ui: &mut Ui, title: &str, table: &ViewTable) -> bool {
    ScrollArea::both()
        .id_salt(title)
        .max_height(240.0)
        .show(ui, |ui: &mut Ui| {
            Grid::new(title).striped(true).show(ui, |ui: &mut Ui| {
                for h in &table.headers {
                    ui.strong(h);
                }
                ui.end_row();
                for row in &table.rows {
                    for cell in row {
                        ui.label(cell);
                    }
                    ui.end_row();
                }
            });
        });
    ui.button("Download Data")
        .on_hover_text("Click here to download the data as a CSV file")
        .clicked()
}

fn save_dialog(state: &mut AppState, file_name: &str, bytes: anyhow::Result<Vec<u8>>) {
    let target = rfd::FileDialog::new()
        .set_title("Download data")
        .set_file_name(file_name)
        .add_filter("CSV", &["csv"])
        .save_file();
    if let Some(path) = target {
        state.save_bytes(&path, bytes);
    }
}
