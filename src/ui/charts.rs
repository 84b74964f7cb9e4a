use std::f32::consts::TAU;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{generate_palette, ColorMap};
use crate::data::aggregate::{
    AgentCount, CategoryCount, Crosstab, DateSeries, MonthlySeries, ScatterPoint,
};

const PLOT_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

fn date_to_x(d: NaiveDate) -> f64 {
    d.num_days_from_ce() as f64
}

fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

fn date_axis(mark: GridMark, _range: &std::ops::RangeInclusive<f64>) -> String {
    x_to_date(mark.value)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn month_axis(mark: GridMark, _range: &std::ops::RangeInclusive<f64>) -> String {
    x_to_date(mark.value)
        .map(|d| d.format("%Y %b").to_string())
        .unwrap_or_default()
}

/// Axis labels for categorical positions 0, 1, 2…; blank between them.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

fn truncate(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let mut s: String = label.chars().take(max).collect();
        s.push('…');
        s
    }
}

fn empty_notice(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label("No data for the current selection.");
    });
}

// ---------------------------------------------------------------------------
// Outbreaks
// ---------------------------------------------------------------------------

/// Outbreaks per began-date, one line per outbreak type.
pub fn outbreaks_line_chart(ui: &mut Ui, series: &[DateSeries], colors: &ColorMap) {
    Plot::new("outbreaks_over_time")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_formatter(date_axis)
        .y_axis_label("Number of Outbreaks")
        .show(ui, |plot_ui| {
            for s in series {
                let points: PlotPoints = s
                    .points
                    .iter()
                    .map(|(d, n)| [date_to_x(*d), *n as f64])
                    .collect();
                plot_ui.line(
                    Line::new(points)
                        .name(&s.name)
                        .color(colors.color_for(&s.name))
                        .width(1.5),
                );
            }
        });
}

/// Stacked bars: outbreak types on x, one stack segment per causative agent.
pub fn causative_agent_bar_chart(ui: &mut Ui, counts: &[AgentCount], colors: &ColorMap) {
    // Types ordered by total, largest first.
    let mut totals: Vec<(String, usize)> = Vec::new();
    for c in counts {
        match totals.iter_mut().find(|(t, _)| *t == c.outbreak_type) {
            Some((_, n)) => *n += c.count,
            None => totals.push((c.outbreak_type.clone(), c.count)),
        }
    }
    totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let types: Vec<String> = totals.into_iter().map(|(t, _)| t).collect();

    let mut agents: Vec<&str> = counts.iter().map(|c| c.agent.as_str()).collect();
    agents.sort_unstable();
    agents.dedup();

    let mut charts: Vec<BarChart> = Vec::new();
    for agent in agents {
        let bars: Vec<Bar> = counts
            .iter()
            .filter(|c| c.agent == agent)
            .filter_map(|c| {
                let x = types.iter().position(|t| *t == c.outbreak_type)?;
                Some(
                    Bar::new(x as f64, c.count as f64)
                        .name(format!("{agent}: {} ({:.2}%)", c.count, c.percentage))
                        .width(0.6),
                )
            })
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(agent)
            .color(colors.color_for(agent))
            .stack_on(&below);
        charts.push(chart);
    }

    Plot::new("causative_agents")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_formatter(category_axis(types))
        .y_axis_label("Total Outbreaks")
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

/// Horizontal bars, largest at the top.
pub fn ranked_bar_chart(ui: &mut Ui, id: &str, counts: &[CategoryCount], x_label: &str) {
    let n = counts.len();
    let labels: Vec<String> = counts
        .iter()
        .rev()
        .map(|c| truncate(&c.label, 32))
        .collect();
    let palette = generate_palette(n.max(1));
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(rank, c)| {
            Bar::new((n - 1 - rank) as f64, c.count as f64)
                .name(&c.label)
                .fill(palette[rank % palette.len()])
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT + 120.0)
        .x_axis_label(x_label)
        .y_axis_formatter(category_axis(labels))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

/// Share of outbreaks per type, drawn as a pie with a legend.
pub fn pie_chart(ui: &mut Ui, counts: &[CategoryCount], colors: &ColorMap) {
    let total: usize = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        empty_notice(ui);
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        let size = PLOT_HEIGHT.min(ui.available_width() * 0.5);
        let (response, painter) = ui.allocate_painter(Vec2::splat(size), Sense::hover());
        let center = response.rect.center();
        let radius = size * 0.45;

        let mut start = -TAU / 4.0;
        for c in counts {
            let sweep = TAU * c.count as f32 / total as f32;
            // Split into segments of at most a quarter turn so every
            // polygon stays convex.
            let segments = (sweep / (TAU / 4.0)).ceil().max(1.0) as usize;
            for s in 0..segments {
                let a0 = start + sweep * s as f32 / segments as f32;
                let a1 = start + sweep * (s + 1) as f32 / segments as f32;
                let steps = 16;
                let mut points = vec![center];
                for k in 0..=steps {
                    let a = a0 + (a1 - a0) * k as f32 / steps as f32;
                    points.push(center + radius * Vec2::angled(a));
                }
                painter.add(Shape::convex_polygon(
                    points,
                    colors.color_for(&c.label),
                    Stroke::NONE,
                ));
            }
            let edge: Pos2 = center + radius * Vec2::angled(start);
            painter.line_segment([center, edge], Stroke::new(1.0, Color32::WHITE));
            start += sweep;
        }

        ui.vertical(|ui: &mut Ui| {
            for c in counts {
                let pct = c.count as f64 / total as f64 * 100.0;
                ui.label(
                    RichText::new(format!("■ {}  {} ({pct:.1}%)", c.label, c.count))
                        .color(colors.color_for(&c.label)),
                );
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Long-term care
// ---------------------------------------------------------------------------

pub fn monthly_line_chart(ui: &mut Ui, series: &[MonthlySeries], y_label: &str) {
    let colors = ColorMap::new(series.iter().map(|s| s.name.as_str()));
    Plot::new("ltc_monthly")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_formatter(month_axis)
        .x_axis_label("Date")
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            for s in series {
                let points: PlotPoints = s
                    .points
                    .iter()
                    .map(|p| [date_to_x(p.month), p.value])
                    .collect();
                plot_ui.line(
                    Line::new(points)
                        .name(&s.name)
                        .color(colors.color_for(&s.name))
                        .width(2.0),
                );
            }
        });
}

/// Resident vs. worker cases; marker size grows with cumulative deaths.
pub fn case_comparison_scatter(ui: &mut Ui, points: &[ScatterPoint]) {
    const BUCKETS: usize = 5;
    let max_deaths = points
        .iter()
        .map(|p| p.resident_deaths)
        .fold(0.0_f64, f64::max);

    let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); BUCKETS];
    for p in points {
        let b = if max_deaths > 0.0 {
            ((p.resident_deaths / max_deaths) * (BUCKETS - 1) as f64).round() as usize
        } else {
            0
        };
        buckets[b.min(BUCKETS - 1)].push([p.resident_cases, p.hcw_cases]);
    }

    Plot::new("case_comparison")
        .height(PLOT_HEIGHT + 120.0)
        .x_axis_label("LTCH Resident Cases")
        .y_axis_label("LTCH Healthcare Worker Cases")
        .show(ui, |plot_ui| {
            for (i, pts) in buckets.into_iter().enumerate() {
                if pts.is_empty() {
                    continue;
                }
                plot_ui.points(
                    Points::new(PlotPoints::from(pts))
                        .radius(2.0 + 2.0 * i as f32)
                        .color(Color32::from_rgba_unmultiplied(99, 110, 250, 150)),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// COVID-19 cases
// ---------------------------------------------------------------------------

/// Horizontal stacked bars: age groups on y, one segment per category.
pub fn demographics_bar_chart(ui: &mut Ui, tab: &Crosstab) {
    if tab.rows.is_empty() {
        empty_notice(ui);
        return;
    }
    let colors = ColorMap::new(tab.categories.iter().map(String::as_str));
    // First age group at the top.
    let n = tab.rows.len();
    let mut charts: Vec<BarChart> = Vec::new();
    for category in &tab.categories {
        let bars: Vec<Bar> = tab
            .rows
            .iter()
            .enumerate()
            .map(|(i, age)| {
                Bar::new((n - 1 - i) as f64, tab.get(age, category) as f64)
                    .name(format!("{age} – {category}"))
                    .width(0.7)
            })
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(category)
            .color(colors.color_for(category))
            .horizontal()
            .stack_on(&below);
        charts.push(chart);
    }
    let labels: Vec<String> = tab.rows.iter().rev().cloned().collect();

    Plot::new("case_demographics")
        .height(PLOT_HEIGHT + 80.0)
        .legend(Legend::default())
        .x_axis_label("Number of Cases")
        .y_axis_formatter(category_axis(labels))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

/// Small grey source line under a chart.
pub fn source_note(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).small().color(Color32::GRAY));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_axis_roundtrips_days() {
        let d = NaiveDate::from_ymd_opt(2023, 4, 9).unwrap();
        assert_eq!(x_to_date(date_to_x(d)), Some(d));
    }

    #[test]
    fn category_labels_only_on_integers() {
        let fmt = category_axis(vec!["Enteric".into(), "Respiratory".into()]);
        let mark = |value| GridMark { value, step_size: 0.5 };
        assert_eq!(fmt(mark(1.0), &(0.0..=2.0)), "Respiratory");
        assert_eq!(fmt(mark(0.5), &(0.0..=2.0)), "");
        assert_eq!(fmt(mark(5.0), &(0.0..=2.0)), "");
    }

    #[test]
    fn long_labels_truncated() {
        assert_eq!(truncate("Sunrise Manor", 7), "Sunrise…");
        assert_eq!(truncate("Short", 7), "Short");
    }
}
