//! Table rendering for terminal output

use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use valuation_engine::engine::{DcfBreakdown, ScreeningResult, SensitivityGrid};
use valuation_engine::format::{
    format_compact, format_currency, format_percent, format_rate, format_score,
};
use valuation_engine::{AnalysisReport, ScreeningOutcome};

fn table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table
}

fn or_na(value: Option<f64>, fmt: impl Fn(f64) -> String) -> String {
    value.map_or_else(|| "n/a".to_string(), fmt)
}

pub fn dcf_table(breakdown: &DcfBreakdown, currency: &str) -> Table {
    let mut table = table();
    table.set_header(vec!["Year", "Projected FCF", "Discount factor", "Present value"]);

    for year in &breakdown.years {
        table.add_row(vec![
            year.year.to_string(),
            format_currency(year.cash_flow, currency),
            format!("{:.4}", year.discount_factor),
            format_currency(year.present_value, currency),
        ]);
    }
    table.add_row(vec![
        "Terminal".to_string(),
        format_currency(breakdown.terminal_value, currency),
        String::new(),
        format_currency(breakdown.terminal_present_value, currency),
    ]);
    table
}

pub fn sensitivity_table(grid: &SensitivityGrid, currency: &str) -> Table {
    let mut table = table();

    let mut header = vec!["Growth \\ Discount".to_string()];
    header.extend(grid.discount_rates.iter().map(|&r| format_rate(r)));
    table.set_header(header);

    for (growth, values) in grid.growth_rates.iter().zip(grid.rows()) {
        let mut row = vec![format_rate(*growth)];
        row.extend(values.iter().map(|&v| format_currency(v, currency)));
        table.add_row(row);
    }
    table
}

pub fn screening_table(result: &ScreeningResult) -> Table {
    let points = &result.breakdown;
    let mut table = table();
    table.set_header(vec!["Criterion", "Points"]);
    table.add_row(vec!["PER".to_string(), format!("{:.0} / 50", points.per)]);
    table.add_row(vec!["PBV".to_string(), format!("{:.0} / 50", points.pbv)]);
    table.add_row(vec!["ROE".to_string(), format!("{:.0} / 100", points.roe)]);
    table.add_row(vec!["EPS growth".to_string(), format!("{:.0} / 100", points.eps_growth)]);
    table.add_row(vec!["DER".to_string(), format!("{:.0} / 100", points.der)]);
    table.add_row(vec!["Score".to_string(), format!("{} / 100", format_score(result.score))]);
    table.add_row(vec![
        "Checklist".to_string(),
        format!("{} / 5", result.checklist_passed),
    ]);
    table
}

pub fn report(report: &AnalysisReport, currency: &str) -> String {
    let f = &report.fundamentals;
    let mut out = String::new();

    out.push_str(&format!("Fundamentals for {}\n", report.symbol));
    let mut fundamentals = table();
    fundamentals.set_header(vec!["Metric", "Value"]);
    fundamentals.add_row(vec!["Price".to_string(), or_na(f.price, |p| format_currency(p, currency))]);
    fundamentals.add_row(vec!["PER".to_string(), or_na(f.per, |v| format!("{v:.2}"))]);
    fundamentals.add_row(vec!["PBV".to_string(), or_na(f.pbv, |v| format!("{v:.2}"))]);
    fundamentals.add_row(vec!["ROE".to_string(), or_na(f.roe, format_percent)]);
    fundamentals.add_row(vec!["DER".to_string(), or_na(f.der, |v| format!("{v:.2}"))]);
    fundamentals.add_row(vec!["EPS growth".to_string(), or_na(f.eps_growth, format_percent)]);
    fundamentals.add_row(vec!["Free cash flow".to_string(), or_na(f.fcf, |v| format_compact(v, currency))]);
    fundamentals.add_row(vec!["Market cap".to_string(), or_na(f.market_cap, |v| format_compact(v, currency))]);
    out.push_str(&format!("{fundamentals}\n\n"));

    out.push_str("Value investing score\n");
    match &report.screening {
        ScreeningOutcome::Scored(result) => out.push_str(&format!("{}\n\n", screening_table(result))),
        ScreeningOutcome::Missing { field } => {
            out.push_str(&format!("Not scored: {field} is missing\n\n"));
        }
    }

    let p = &report.parameters;
    out.push_str(&format!(
        "DCF valuation (growth {}, discount {}, terminal {}, {} years)\n",
        format_rate(p.growth_rate),
        format_rate(p.discount_rate),
        format_rate(p.terminal_growth),
        p.years
    ));
    out.push_str(&format!(
        "Intrinsic value: {}\n",
        format_currency(report.intrinsic_value, currency)
    ));
    if let Some(per_share) = report.intrinsic_per_share {
        out.push_str(&format!(
            "Intrinsic value per share: {}\n",
            format_currency(per_share, currency)
        ));
    }
    if let Some(verdict) = &report.verdict {
        out.push_str(&format!(
            "Market price: {}\n{}\n",
            format_currency(verdict.price, currency),
            verdict.valuation
        ));
        if let Some(margin) = verdict.margin_of_safety {
            out.push_str(&format!("Margin of safety: {}\n", format_percent(margin)));
        }
    }

    out.push_str(&format!(
        "\nSensitivity\n{}\n",
        sensitivity_table(&report.sensitivity, currency)
    ));

    for warning in &report.warnings {
        out.push_str(&format!("warning: {warning}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_engine::engine::{ScreeningInput, ValuationInput, project_cash_flows};
    use valuation_engine::{compute_screening_score, compute_sensitivity_grid};

    #[test]
    fn test_sensitivity_table_layout() {
        let grid = compute_sensitivity_grid(&ValuationInput::new(1000.0, 0.10, 0.12, 0.02, 5)).unwrap();
        let rendered = sensitivity_table(&grid, "Rp").to_string();

        assert!(rendered.contains("12.00%"));
        assert!(rendered.contains("10.00%"));
        assert!(rendered.contains("Rp 14,060"));
    }

    #[test]
    fn test_dcf_table_has_terminal_row() {
        let breakdown = project_cash_flows(&ValuationInput::new(100.0, 0.0, 0.10, 0.03, 5)).unwrap();
        let rendered = dcf_table(&breakdown, "$").to_string();

        assert!(rendered.contains("Terminal"));
        assert!(rendered.contains("$ 1,471"));
    }

    #[test]
    fn test_screening_table() {
        let result = compute_screening_score(&ScreeningInput::new(8.0, 0.7, 20.0, 0.2, 15.0)).unwrap();
        let rendered = screening_table(&result).to_string();

        assert!(rendered.contains("85.00 / 100"));
        assert!(rendered.contains("5 / 5"));
    }
}
