//! Budget display formatting

use tabled::Tabled;

use crate::models::Selection;
use crate::services::budget::BudgetSummary;

use super::{render_table, NameLookup};

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Limit")]
    limit: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// `42.5%`, or `∞%` for spending against a zero limit
pub fn format_percent(percent: f64) -> String {
    if percent.is_infinite() {
        "∞%".to_string()
    } else {
        format!("{:.1}%", percent)
    }
}

pub fn format_budget_list(summaries: &[BudgetSummary]) -> String {
    if summaries.is_empty() {
        return "No budgets found.\n".to_string();
    }

    render_table(
        summaries
            .iter()
            .map(|s| BudgetRow {
                id: s.budget.id.to_string(),
                name: s.budget.name.clone(),
                month: s.budget.selected_month.clone(),
                spent: s.spent.formatted.clone(),
                limit: s.limit.formatted.clone(),
                used: format_percent(s.percent),
                status: s.color.to_string(),
            })
            .collect(),
    )
}

fn selection_names<T: Copy + PartialEq>(
    selection: &Selection<T>,
    name: impl Fn(T) -> String,
) -> String {
    if selection.is_all() {
        "All".to_string()
    } else {
        selection
            .items()
            .iter()
            .map(|id| name(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn format_budget_details(summary: &BudgetSummary, names: &NameLookup) -> String {
    let budget = &summary.budget;
    let mut output = String::new();

    output.push_str(&format!("Budget: {}\n", budget.name));
    output.push_str(&format!("  ID:         {}\n", budget.id.as_key()));
    output.push_str(&format!("  Month:      {}\n", budget.selected_month));
    output.push_str(&format!("  Limit:      {}\n", summary.limit.formatted));
    output.push_str(&format!("  Spent:      {}\n", summary.spent.formatted));
    output.push_str(&format!(
        "  Used:       {} ({})\n",
        format_percent(summary.percent),
        summary.color
    ));
    output.push_str(&format!(
        "  Accounts:   {}\n",
        selection_names(&budget.accounts, |id| names.account(id))
    ));
    output.push_str(&format!(
        "  Categories: {}\n",
        selection_names(&budget.categories, |id| names.category(id))
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(35.0), "35.0%");
        assert_eq!(format_percent(85.004), "85.0%");
        assert_eq!(format_percent(f64::INFINITY), "∞%");
    }

    #[test]
    fn test_selection_names() {
        let all: Selection<u8> = Selection::All;
        assert_eq!(selection_names(&all, |n| n.to_string()), "All");

        let some = Selection::Only(vec![1u8, 2]);
        assert_eq!(selection_names(&some, |n| format!("#{}", n)), "#1, #2");
    }
}
