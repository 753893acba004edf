use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::analysis::{ConsumptionVariance, CycleSummary, DailyExpectation, FarmReport};
use crate::models::DailyRecordLedger;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn heading(output: &mut String, title: &str, width: usize) {
    output.push_str(&format!("\n{}\n", title.bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(width)));
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

/// Format a cycle summary table as a string.
pub fn format_cycle_summary(summary: &CycleSummary) -> String {
    let mut output = String::new();
    heading(&mut output, "Cycle Summary", 50);
    output.push_str(&format!(
        "{}\n",
        format!(
            "{} | {} | {} to {}",
            summary.curve_name, summary.status, summary.start_date, summary.reference_end_date
        )
        .dimmed()
    ));

    let mut table = new_table(vec!["Metric", "Value", "Unit"]);
    let rows = [
        ("Elapsed Days", summary.elapsed_days.to_string(), "days"),
        ("Recorded Days", summary.recorded_days.to_string(), "days"),
        ("Initial Birds", summary.initial_bird_count.to_string(), "birds"),
        ("Added Birds", summary.added_birds.to_string(), "birds"),
        ("Current Birds", summary.current_bird_count.to_string(), "birds"),
        ("Mortality", summary.cumulative_mortality.to_string(), "birds"),
        ("Mortality Rate", format!("{:.2}", summary.mortality_percent), "%"),
        ("Expected Feed (cycle)", format!("{:.1}", summary.expected_total_kg), "kg"),
        ("Expected Feed (to date)", format!("{:.1}", summary.expected_to_date_kg), "kg"),
        ("Feed Consumed", format!("{:.1}", summary.consumed_kg), "kg"),
        ("Concentrate Received", format!("{:.1}", summary.received_kg), "kg"),
        ("Concentrate Reserve", format!("{:.1}", summary.reserve_kg), "kg"),
    ];
    for (name, value, unit) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value), Cell::new(unit)]);
    }
    if let Some(fcr) = summary.feed_conversion_ratio {
        table.add_row(vec![
            Cell::new("Feed Conversion Ratio"),
            Cell::new(format!("{fcr:.3}")),
            Cell::new("kg/kg"),
        ]);
    }
    if !summary.shortfall_days.is_empty() {
        let days: Vec<String> = summary.shortfall_days.iter().map(u32::to_string).collect();
        table.add_row(vec![
            Cell::new("Shortfall Days"),
            Cell::new(days.join(", ")),
            Cell::new(""),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Format every ledger row, superseded revisions included.
pub fn format_daily_ledger(ledger: &DailyRecordLedger) -> String {
    let mut output = String::new();
    heading(&mut output, "Daily Records", 70);

    let mut table = new_table(vec![
        "Day",
        "Date",
        "Rev",
        "Birds",
        "Mortality",
        "Expected (kg)",
        "Actual (kg)",
        "Received (kg)",
        "Water (L)",
        "Weight (g)",
        "Flag",
    ]);
    for record in ledger.records() {
        let flag = if record.reserve_shortfall { "shortfall" } else { "" };
        table.add_row(vec![
            Cell::new(record.day),
            Cell::new(record.date),
            Cell::new(record.revision),
            Cell::new(record.bird_count),
            Cell::new(record.mortality),
            Cell::new(format!("{:.2}", record.expected_consumption_kg)),
            Cell::new(format!("{:.2}", record.actual_consumption_kg)),
            Cell::new(format!("{:.2}", record.concentrate_received_kg)),
            Cell::new(optional(record.actual_water_liters, 1)),
            Cell::new(optional(record.bird_weight_g, 0)),
            Cell::new(flag),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Format the expected per-day series as a string.
pub fn format_expected_series(series: &[DailyExpectation]) -> String {
    let mut output = String::new();
    heading(&mut output, "Expected Consumption", 60);

    let mut table = new_table(vec!["Day", "Birds", "Feed (kg)", "Water (L)", "Weight (g)"]);
    for e in series {
        table.add_row(vec![
            Cell::new(e.day),
            Cell::new(e.bird_count),
            Cell::new(format!("{:.2}", e.feed_kg)),
            Cell::new(format!("{:.1}", e.water_liters)),
            Cell::new(format!("{:.0}", e.weight_g)),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Format consumption deviation statistics with confidence intervals.
pub fn format_variance_table(variance: &ConsumptionVariance) -> String {
    let mut output = String::new();
    heading(&mut output, "Consumption Deviation", 70);
    output.push_str(&format!(
        "{}\n",
        format!(
            "Confidence Level: {:.0}% | Sample Size: {} days",
            variance.deviation_kg.confidence_level * 100.0,
            variance.deviation_kg.sample_size
        )
        .dimmed()
    ));

    let mut table = new_table(vec!["Metric", "Mean", "Std Error", "Lower CI", "Upper CI"]);
    let mut rows = vec![("Deviation (kg/day)", &variance.deviation_kg)];
    if let Some(pct) = &variance.deviation_percent {
        rows.push(("Deviation (%)", pct));
    }
    for (name, ci) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{:.2}", ci.mean)),
            Cell::new(format!("{:.3}", ci.std_error)),
            Cell::new(format!("{:.2}", ci.lower)),
            Cell::new(format!("{:.2}", ci.upper)),
        ]);
    }

    output.push_str(&format!("{table}"));
    output.push_str(&format!(
        "\nLargest daily deviation: {:.2} kg\n",
        variance.max_abs_deviation_kg
    ));
    output
}

/// Format a multi-cycle farm report as a string.
pub fn format_farm_report(report: &FarmReport) -> String {
    let mut output = String::new();
    heading(&mut output, "Farm Report", 70);
    output.push_str(&format!(
        "{}\n",
        format!(
            "{} cycles | {} active | {} birds housed",
            report.cycles.len(),
            report.active_cycles,
            report.total_birds
        )
        .dimmed()
    ));

    let mut table = new_table(vec![
        "Cycle",
        "Status",
        "Curve",
        "Birds",
        "Expected (kg)",
        "Consumed (kg)",
        "Reserve (kg)",
        "Shortfalls",
    ]);
    for c in &report.cycles {
        table.add_row(vec![
            Cell::new(c.cycle_id),
            Cell::new(c.status),
            Cell::new(&c.curve_name),
            Cell::new(c.current_bird_count),
            Cell::new(format!("{:.1}", c.expected_total_kg)),
            Cell::new(format!("{:.1}", c.consumed_kg)),
            Cell::new(format!("{:.1}", c.reserve_kg)),
            Cell::new(c.shortfall_days.len()),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(""),
        Cell::new(""),
        Cell::new(report.total_birds),
        Cell::new(format!("{:.1}", report.expected_total_kg)),
        Cell::new(format!("{:.1}", report.consumed_kg)),
        Cell::new(format!("{:.1}", report.reserve_kg)),
        Cell::new(report.cycles_with_shortfall),
    ]);

    output.push_str(&format!("{table}"));
    output
}
