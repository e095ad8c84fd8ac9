//! Human-readable rendering of session views.

use crate::colors::GreenModelColors;
use colored::Colorize;
use comfy_table::{Cell, Table};
use greenmodel_core::{EquivalenceReport, LatestRunFootprint, SessionView, TrainingRunRecord};

/// Run table in insertion order, with the greenest row highlighted.
pub fn runs_table(runs: &[TrainingRunRecord], greenest: Option<&TrainingRunRecord>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Dataset", "Model", "Params", "Accuracy (%)", "Emissions (g CO₂eq)"]);

    let mut highlighted = false;
    for (idx, run) in runs.iter().enumerate() {
        let is_greenest = !highlighted && greenest.is_some_and(|g| g == run);
        highlighted |= is_greenest;

        let mut emissions = Cell::new(format!("{:.4}", run.emissions_g()));
        if is_greenest {
            emissions = emissions.fg(GreenModelColors::cell(GreenModelColors::PRIMARY_RGB));
        }

        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(run.dataset().label()).fg(GreenModelColors::cell(GreenModelColors::ACCENT_RGB)),
            Cell::new(run.model_kind().label()),
            Cell::new(run.params_summary()),
            Cell::new(format!("{:.4}", run.accuracy_pct())),
            emissions,
        ]);
    }
    table
}

pub fn print_record(heading: &str, record: &TrainingRunRecord) {
    println!("{}", heading.bold());
    println!("  Dataset:   {}", record.dataset().label());
    println!("  Model:     {}", record.model_kind().label());
    println!("  Params:    {}", record.params_summary());
    println!("  Accuracy:  {:.4}", record.accuracy_pct());
    println!("  Emissions: {} g CO₂eq", format!("{:.4}", record.emissions_g()).color(GreenModelColors::primary()));
}

pub fn print_equivalents(report: &EquivalenceReport) {
    println!("{}", "Real-world CO₂ equivalent".bold());
    for (label, formatted) in report.iter() {
        println!("  {:<28} {}", label, formatted.color(GreenModelColors::accent()));
    }
}

pub fn print_footprint(footprint: &LatestRunFootprint) {
    println!("  Watching HD video for {:.4} seconds", footprint.streaming_seconds);
    println!("  Breathing (average human) for {:.2} seconds", footprint.breathing_seconds);
    println!("  Walking {:.6} meters", footprint.walking_meters);
    println!("  Driving {:.6} km in a petrol car", footprint.driving_km);
}

/// Trend line as a row of block characters, scaled to the largest run.
pub fn sparkline(values: &[f64]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    values
        .iter()
        .map(|v| {
            if max <= 0.0 {
                BARS[0]
            } else {
                let idx = ((v / max) * (BARS.len() - 1) as f64).round() as usize;
                BARS[idx.min(BARS.len() - 1)]
            }
        })
        .collect()
}

/// Everything a `SessionView` carries, in the order a user reads it.
pub fn print_view(view: &SessionView) {
    if let Some(appended) = &view.appended {
        println!(
            "{} Accuracy: {:.2}%, Emissions: {:.4} g CO₂eq",
            "✓".color(GreenModelColors::primary()),
            appended.accuracy_pct(),
            appended.emissions_g()
        );
        println!();
    }

    if view.runs.is_empty() {
        println!("{}", "No training runs yet.".dimmed());
        return;
    }

    println!("{}", "Previous runs".bold());
    println!("{}", runs_table(&view.runs, view.greenest.as_ref()));
    println!();
    println!("{} {}", "Emissions trend:".bold(), sparkline(&view.trend).color(GreenModelColors::primary()));
    println!();

    match &view.greenest {
        Some(greenest) => {
            print_record(&format!("Greenest configuration (for {} dataset)", view.selected_dataset), greenest);
        }
        None => println!("{}", format!("No training runs for the {} dataset yet.", view.selected_dataset).yellow()),
    }
    println!();

    if let (Some(latest), Some(report)) = (view.latest(), &view.latest_equivalents) {
        print_record("Latest run", latest);
        if let Some(footprint) = &view.latest_footprint {
            print_footprint(footprint);
        }
        println!();
        print_equivalents(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenmodel_training::{DatasetName, HyperParams};

    #[test]
    fn test_sparkline_scales_to_max() {
        assert_eq!(sparkline(&[0.0, 0.5, 1.0]), "▁▅█");
        assert_eq!(sparkline(&[0.0, 0.0]), "▁▁");
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn test_runs_table_has_one_row_per_run() {
        let runs: Vec<TrainingRunRecord> = [0.3, 0.1]
            .into_iter()
            .map(|g| TrainingRunRecord::new(DatasetName::Iris, HyperParams::RandomForest { tree_count: 10 }, 90.0, g).unwrap())
            .collect();
        let table = runs_table(&runs, runs.get(1));
        assert_eq!(table.row_iter().count(), 2);
        assert!(table.to_string().contains("Trees: 10"));
    }
}
