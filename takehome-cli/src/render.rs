//! Plain-text tables for terminal output.

use rust_decimal::Decimal;
use takehome_core::calculations::{ComparisonSummary, Preference, StateTaxResolver, SweepPoint};
use takehome_core::format::{
    format_currency, format_currency_detailed, format_percentage, format_rate,
};
use takehome_core::{CalculationResult, SalaryInput, SavedCalculation, StateTaxType};

const LABEL_WIDTH: usize = 24;
const AMOUNT_WIDTH: usize = 14;

fn row(
    label: &str,
    amount: Decimal,
) -> String {
    format!(
        "  {:<LABEL_WIDTH$}{:>AMOUNT_WIDTH$}",
        label,
        format_currency_detailed(amount)
    )
}

fn heading(input: &SalaryInput) -> String {
    format!(
        "{} {} salary in {}, {}",
        format_currency_detailed(input.gross_salary),
        input.salary_period.as_str(),
        input.state,
        input.filing_status.label()
    )
}

/// Full breakdown of one calculation.
pub fn render_result(
    input: &SalaryInput,
    result: &CalculationResult,
) -> String {
    let mut lines = vec![heading(input), String::new()];

    lines.push(row("Gross annual", result.gross_annual));
    for item in result.deduction_lines() {
        lines.push(row(&item.name, item.amount));
    }
    if result.total_deductions > Decimal::ZERO {
        lines.push(row("Adjusted gross income", result.adjusted_gross_income));
    }
    lines.push(row("Taxable income (federal)", result.taxable_income));
    lines.push(String::new());

    for item in result.tax_lines() {
        let mut line = format!(
            "{}  {:>7}",
            row(&item.name, item.amount),
            format_percentage(item.rate)
        );
        if let Some(description) = &item.description {
            line.push_str("  ");
            line.push_str(description);
        }
        lines.push(line);
    }
    lines.push(row("Total tax", result.total_tax));
    lines.push(String::new());

    lines.push(row("Net annual", result.net_annual));
    lines.push(row("Net monthly", result.net_monthly));
    lines.push(row("Net biweekly", result.net_biweekly));
    lines.push(row("Net weekly", result.net_weekly));
    lines.push(row(
        &format!("Per paycheck ({})", input.pay_frequency.as_str()),
        result.net_per_pay_period(input.pay_frequency),
    ));
    lines.push(String::new());
    lines.push(format!(
        "  Effective tax rate {}, marginal federal rate {}",
        format_percentage(result.effective_tax_rate),
        format_percentage(result.marginal_tax_rate)
    ));

    lines.join("\n")
}

/// Two scenarios side by side followed by the differences.
pub fn render_comparison(
    first: (&SalaryInput, &CalculationResult),
    second: (&SalaryInput, &CalculationResult),
    summary: &ComparisonSummary,
) -> String {
    let (first_input, a) = first;
    let (second_input, b) = second;

    let pair = |label: &str, left: Decimal, right: Decimal| {
        format!(
            "  {:<LABEL_WIDTH$}{:>AMOUNT_WIDTH$}{:>AMOUNT_WIDTH$}",
            label,
            format_currency(left),
            format_currency(right)
        )
    };

    let mut lines = vec![
        format!("A: {}", heading(first_input)),
        format!("B: {}", heading(second_input)),
        String::new(),
        format!("  {:<LABEL_WIDTH$}{:>AMOUNT_WIDTH$}{:>AMOUNT_WIDTH$}", "", "A", "B"),
        pair("Gross annual", a.gross_annual, b.gross_annual),
        pair("Federal tax", a.federal_tax, b.federal_tax),
        pair("State tax", a.state_tax, b.state_tax),
        pair("FICA", a.fica_total(), b.fica_total()),
        pair("Total tax", a.total_tax, b.total_tax),
        pair("Net annual", a.net_annual, b.net_annual),
        pair("Net monthly", a.net_monthly, b.net_monthly),
        format!(
            "  {:<LABEL_WIDTH$}{:>AMOUNT_WIDTH$}{:>AMOUNT_WIDTH$}",
            "Effective rate",
            format_percentage(a.effective_tax_rate),
            format_percentage(b.effective_tax_rate)
        ),
        String::new(),
        format!(
            "  B - A: {} per year ({} per month, {}), tax {}",
            format_currency(summary.net_difference),
            format_currency(summary.monthly_net_difference),
            format_percentage(summary.net_percent_difference),
            format_currency(summary.tax_difference)
        ),
    ];

    lines.push(match summary.preferred {
        Preference::First => "  A leaves more take-home pay".to_string(),
        Preference::Second => "  B leaves more take-home pay".to_string(),
        Preference::Equal => "  Both leave the same take-home pay".to_string(),
    });

    lines.join("\n")
}

pub fn render_sweep(points: &[SweepPoint]) -> String {
    let mut lines = vec![format!(
        "{:>12}{:>12}{:>10}{:>10}{:>12}{:>12}{:>12}",
        "Gross", "Net", "Eff.", "Marg.", "Federal", "State", "FICA"
    )];
    for point in points {
        lines.push(format!(
            "{:>12}{:>12}{:>10}{:>10}{:>12}{:>12}{:>12}",
            format_currency(point.gross_salary),
            format_currency(point.net_salary),
            format_percentage(point.effective_tax_rate),
            format_percentage(point.combined_marginal_rate),
            format_currency(point.federal_tax),
            format_currency(point.state_tax),
            format_currency(point.fica_tax),
        ));
    }
    lines.join("\n")
}

/// Every configured state with its regime; flat-tax states show their rate.
pub fn render_states(resolver: &StateTaxResolver<'_>) -> String {
    resolver
        .states()
        .into_iter()
        .map(|state| {
            let regime = match state.tax_type {
                StateTaxType::Flat => match resolver.flat_rate(&state.code) {
                    Some(rate) => format!("flat {}", format_rate(rate)),
                    None => "flat".to_string(),
                },
                other => other.as_str().to_string(),
            };
            format!("{}  {:<16}{}", state.code, state.name, regime)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_saved_list(saved: &[SavedCalculation]) -> String {
    if saved.is_empty() {
        return "No saved calculations".to_string();
    }

    saved
        .iter()
        .map(|calc| {
            format!(
                "{:>4}  {}  {:<24}{:>4}{:>14}",
                calc.id,
                calc.created_at.format("%Y-%m-%d %H:%M"),
                calc.name,
                calc.input.state,
                format_currency(calc.result.net_annual)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per batch row.
pub fn render_batch(rows: &[(String, SalaryInput, CalculationResult)]) -> String {
    let mut lines = vec![format!(
        "{:<24}{:>6}{:>20}{:>14}{:>14}{:>10}",
        "Name", "State", "Filing status", "Total tax", "Net annual", "Eff."
    )];
    for (label, input, result) in rows {
        lines.push(format!(
            "{:<24}{:>6}{:>20}{:>14}{:>14}{:>10}",
            label,
            input.state,
            input.filing_status.label(),
            format_currency(result.total_tax),
            format_currency(result.net_annual),
            format_percentage(result.effective_tax_rate),
        ));
    }
    lines.join("\n")
}
