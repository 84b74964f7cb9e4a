use chrono::{Local, NaiveDate};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::AppState;

const VIEW_ALL: &str = "--- View All ---";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Choose your filter:");
    ui.separator();

    if state.outbreaks.is_empty() {
        ui.label("No outbreak data loaded.");
        return;
    }

    // ---- Date window ----
    let today = Local::now().date_naive();
    date_input(ui, "Start Date", "start_date", &mut state.filter.start, today);
    date_input(ui, "End Date", "end_date", &mut state.filter.end, today);
    if state.filter.drop_stale_selections(&state.outbreaks) {
        log::debug!("dropped filter selections outside the date window");
    }
    ui.separator();

    // ---- Setting radio ----
    ui.strong("Select by Setting");
    let settings = state.filter.setting_options(&state.outbreaks);
    let mut selected = state.filter.setting.clone();
    ui.radio_value(&mut selected, None, VIEW_ALL);
    for s in &settings {
        ui.radio_value(&mut selected, Some(s.clone()), s);
    }
    if selected != state.filter.setting {
        state.filter.setting = selected;
        state.filter.institutions.clear();
        state.filter.drop_stale_selections(&state.outbreaks);
    }
    ui.separator();

    // ---- Institution multiselect ----
    let institutions = state.filter.institution_options(&state.outbreaks);
    let n_selected = state.filter.institutions.len();
    let header = format!("Select by Location  ({n_selected}/{})", institutions.len());
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("institutions")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                state.filter.institutions.clear();
            }
            ScrollArea::vertical()
                .auto_shrink([false, true])
                .max_height(400.0)
                .show(ui, |ui: &mut Ui| {
                    for name in &institutions {
                        let mut checked = state.filter.institutions.contains(name);
                        if ui.checkbox(&mut checked, name).changed() {
                            if checked {
                                state.filter.institutions.insert(name.clone());
                            } else {
                                state.filter.institutions.remove(name);
                            }
                        }
                    }
                });
        });
    ui.separator();

    // ---- Cause multiselect ----
    let causes = state.filter.cause_options(&state.outbreaks);
    let header = format!(
        "Select by Cause  ({}/{})",
        state.filter.causes.len(),
        causes.len()
    );
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("causes")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                state.filter.causes.clear();
            }
            ScrollArea::vertical()
                .id_salt("cause_list")
                .auto_shrink([false, true])
                .max_height(300.0)
                .show(ui, |ui: &mut Ui| {
                    for cause in &causes {
                        let mut checked = state.filter.causes.contains(cause);
                        if ui.checkbox(&mut checked, cause).changed() {
                            if checked {
                                state.filter.causes.insert(cause.clone());
                            } else {
                                state.filter.causes.remove(cause);
                            }
                        }
                    }
                });
        });
}

fn date_input(ui: &mut Ui, label: &str, id: &str, value: &mut Option<NaiveDate>, fallback: NaiveDate) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        let mut date = value.unwrap_or(fallback);
        ui.push_id(id, |ui: &mut Ui| {
            ui.add(DatePickerButton::new(&mut date));
        });
        if Some(date) != *value && (value.is_some() || date != fallback) {
            *value = Some(date);
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Reload from catalog").clicked() {
                state.reload_remote();
                ui.close_menu();
            }
            if ui.button("Open LTC summary…").clicked() {
                open_ltc_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open vaccination rates…").clicked() {
                open_vaccination_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} outbreaks ({} visible), {} cases",
            state.outbreaks.len(),
            state.visible_outbreaks().len(),
            state.covid_cases.len()
        ));
        if let Some(ltc) = &state.ltc {
            ui.separator();
            ui.label(format!("{} LTC report days", ltc.summary.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn csv_dialog(title: &str) -> rfd::FileDialog {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("CSV", &["csv"])
}

pub fn open_ltc_dialog(state: &mut AppState) {
    if let Some(path) = csv_dialog("Open long-term-care summary").pick_file() {
        let vaccination = state.config.ltc_vaccination_path.clone();
        state.status_message = None;
        state.open_ltc(&path, vaccination.as_deref());
    }
}

pub fn open_vaccination_dialog(state: &mut AppState) {
    if let Some(path) = csv_dialog("Open long-term-care vaccination rates").pick_file() {
        state.status_message = None;
        state.open_vaccination(path);
    }
}
