use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{
    uniform_grid_spacer, Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot,
    PlotPoints, Points,
};

use crate::color::{ColorMap, Palette};
use crate::data::aggregate::{BoxStats, CategoryCounts, ChartSet, GroupMean, ScatterSeries, TimeSeries};

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Visualizations section
// ---------------------------------------------------------------------------

/// Render all charts of the Visualizations section.
pub fn visualizations(ui: &mut Ui, charts: &ChartSet) {
    count_chart(ui, "Gender Distribution", "gender", &charts.gender_counts, Palette::Set2);
    count_chart(
        ui,
        "Employee Count by Department",
        "department",
        &charts.department_counts,
        Palette::Muted,
    );
    count_chart(
        ui,
        "Employee Count by Region",
        "region",
        &charts.region_counts,
        Palette::Dark,
    );
    mean_chart(
        ui,
        "Average Number of Trainings by Department",
        ("department", "no_of_trainings"),
        &charts.trainings_by_department,
        Palette::Coolwarm,
    );
    box_chart(
        ui,
        "Length of Service by Gender",
        ("gender", "length_of_service"),
        &charts.service_by_gender,
        Palette::Pastel,
    );
    scatter_chart(
        ui,
        "Performance Rating vs Age",
        ("age", "previous_year_rating"),
        &charts.rating_vs_age,
        Palette::Set1,
    );
    if let Some(series) = &charts.rating_over_time {
        line_chart(
            ui,
            "Average Performance Rating over Time",
            ("date", "previous_year_rating"),
            series,
        );
    }
}

// ---------------------------------------------------------------------------
// Shared plot setup
// ---------------------------------------------------------------------------

/// A fixed-size, non-scrolling plot so the page itself can scroll.
fn base_plot(title: &str, (x_label, y_label): (&str, &str)) -> Plot<'static> {
    Plot::new(title.to_string())
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x_label.to_string())
        .y_axis_label(y_label.to_string())
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_boxed_zoom(true)
}

/// Label integer x positions with `labels`; everything else stays blank.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let pos = mark.value.round();
        if (mark.value - pos).abs() > 1e-6 || pos < 0.0 {
            return String::new();
        }
        labels.get(pos as usize).cloned().unwrap_or_default()
    }
}

fn categorical_plot(title: &str, axes: (&str, &str), labels: Vec<String>) -> Plot<'static> {
    base_plot(title, axes)
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(category_axis(labels))
        .include_y(0.0)
}

fn chart_title(ui: &mut Ui, title: &str) {
    ui.add_space(8.0);
    ui.label(RichText::new(title).strong().size(15.0));
}

fn empty_chart(ui: &mut Ui) {
    ui.label(RichText::new("No data for this chart.").weak());
}

// ---------------------------------------------------------------------------
// Chart kinds
// ---------------------------------------------------------------------------

/// Bar per category with the number of rows in it.
pub fn count_chart(ui: &mut Ui, title: &str, x_label: &str, counts: &CategoryCounts, palette: Palette) {
    chart_title(ui, title);
    if counts.entries.is_empty() {
        empty_chart(ui);
        return;
    }

    let labels: Vec<String> = counts.entries.iter().map(|(c, _)| c.clone()).collect();
    let colors = ColorMap::new(&labels, palette);

    categorical_plot(title, (x_label, "count"), labels).show(ui, |plot_ui| {
        for (pos, (category, n)) in counts.entries.iter().enumerate() {
            let color = colors.color_for(category);
            let bar = Bar::new(pos as f64, *n as f64)
                .width(0.7)
                .name(category)
                .fill(color);
            plot_ui.bar_chart(BarChart::new(vec![bar]).name(category).color(color));
        }
    });
}

/// Bar per category at the group mean, with a 95% interval whisker.
pub fn mean_chart(ui: &mut Ui, title: &str, axes: (&str, &str), means: &[GroupMean], palette: Palette) {
    chart_title(ui, title);
    if means.is_empty() {
        empty_chart(ui);
        return;
    }

    let labels: Vec<String> = means.iter().map(|m| m.category.clone()).collect();
    let colors = ColorMap::new(&labels, palette);

    categorical_plot(title, axes, labels).show(ui, |plot_ui| {
        for (pos, m) in means.iter().enumerate() {
            let x = pos as f64;
            let color = colors.color_for(&m.category);
            let bar = Bar::new(x, m.mean)
                .width(0.7)
                .name(format!("{} (n = {})", m.category, m.n))
                .fill(color);
            plot_ui.bar_chart(BarChart::new(vec![bar]).name(&m.category).color(color));

            let whisker = Line::new(PlotPoints::from(vec![[x, m.ci_low], [x, m.ci_high]]))
                .color(Color32::DARK_GRAY)
                .width(2.0);
            plot_ui.line(whisker);
        }
    });
}

/// Box and whiskers per category; outliers drawn as points.
pub fn box_chart(ui: &mut Ui, title: &str, axes: (&str, &str), boxes: &[BoxStats], palette: Palette) {
    chart_title(ui, title);
    if boxes.is_empty() {
        empty_chart(ui);
        return;
    }

    let labels: Vec<String> = boxes.iter().map(|b| b.category.clone()).collect();
    let colors = ColorMap::new(&labels, palette);

    categorical_plot(title, axes, labels).show(ui, |plot_ui| {
        for (pos, b) in boxes.iter().enumerate() {
            let x = pos as f64;
            let color = colors.color_for(&b.category);
            let spread = BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker);
            let elem = BoxElem::new(x, spread)
                .name(&b.category)
                .box_width(0.6)
                .whisker_width(0.3)
                .fill(color)
                .stroke(Stroke::new(1.5, Color32::DARK_GRAY));
            plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&b.category));

            if !b.outliers.is_empty() {
                let points: PlotPoints = b.outliers.iter().map(|&v| [x, v]).collect();
                plot_ui.points(Points::new(points).color(Color32::DARK_GRAY).radius(2.5));
            }
        }
    });
}

/// One point cloud per hue category.
pub fn scatter_chart(
    ui: &mut Ui,
    title: &str,
    axes: (&str, &str),
    series: &[ScatterSeries],
    palette: Palette,
) {
    chart_title(ui, title);
    if series.is_empty() {
        empty_chart(ui);
        return;
    }

    let labels: Vec<&str> = series.iter().map(|s| s.category.as_str()).collect();
    let colors = ColorMap::new(&labels, palette);

    base_plot(title, axes).show(ui, |plot_ui| {
        for s in series {
            let points: PlotPoints = s.points.iter().copied().collect();
            plot_ui.points(
                Points::new(points)
                    .name(&s.category)
                    .color(colors.color_for(&s.category))
                    .radius(2.5),
            );
        }
    });
    legend_row(ui, &colors);
}

/// Mean per date, joined in date order.
pub fn line_chart(ui: &mut Ui, title: &str, axes: (&str, &str), series: &TimeSeries) {
    chart_title(ui, title);
    if series.points.is_empty() {
        empty_chart(ui);
        return;
    }

    let labels: Vec<String> = series.points.iter().map(|(d, _)| d.clone()).collect();
    let points: PlotPoints = series
        .points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| [i as f64, *v])
        .collect();

    base_plot(title, axes)
        .x_axis_formatter(category_axis(labels))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name(axes.1)
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
        });
}

/// Colour swatches under a chart, one per category.
fn legend_row(ui: &mut Ui, colors: &ColorMap) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, color) in colors.legend_entries() {
            ui.label(RichText::new("■").color(color));
            ui.label(label);
        }
    });
}
