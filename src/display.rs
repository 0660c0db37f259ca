//! Display and formatting utilities for grindplan.
//!
//! This module provides functions for formatting output and displaying
//! ranked grinds and card selections to the user in a readable format.

use crate::cards::CardSelection;
use crate::models::{Catalog, Grind, MinGains, ResourceKind};

/// Formats an action count or resource quantity with at most three decimals.
///
/// Trailing zeros are dropped, so whole numbers print without a fraction.
///
/// # Example
///
/// ```
/// use grindplan::display::format_count;
///
/// assert_eq!(format_count(2.5), "2.5");
/// assert_eq!(format_count(10.0), "10");
/// assert_eq!(format_count(1.0 / 3.0), "0.333");
/// assert_eq!(format_count(-0.0001), "0");
/// ```
pub fn format_count(value: f64) -> String {
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Describes a goal as a comma separated list like `25 x Penny`.
pub fn describe_goal(min_gains: &MinGains) -> String {
    let parts: Vec<String> = min_gains
        .positive_targets()
        .map(|(name, amount)| format!("{} x {}", format_count(amount), name))
        .collect();
    if parts.is_empty() {
        "nothing".to_string()
    } else {
        parts.join(", ")
    }
}

fn display_grind(index: usize, grind: &Grind, catalog: &Catalog, verbose: bool) {
    if (grind.cost - grind.gross_action_cost).abs() > 1e-9 {
        println!(
            "  Grind {}: {} actions ({} before background credit)",
            index,
            format_count(grind.cost),
            format_count(grind.gross_action_cost)
        );
    } else {
        println!("  Grind {}: {} actions", index, format_count(grind.cost));
    }

    let mut actions: Vec<_> = grind.actions.iter().collect();
    actions.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (name, count) in actions {
        println!("    {:>10} x {}", format_count(*count), name);
    }

    if verbose {
        println!("    net resource flow:");
        for (resource, amount) in grind.net_flows(catalog) {
            if amount.abs() > 1e-9 {
                println!("    {:>+12.3} {}", amount, resource);
            }
        }
    }
    println!();
}

/// Displays ranked grinds to stdout.
///
/// # Arguments
///
/// * `grinds` - Grinds in ascending cost order
/// * `min_gains` - The goal the grinds achieve
/// * `catalog` - Used to compute net flows in verbose mode
/// * `verbose` - Also print every resource each grind gains or spends
pub fn display_grinds(grinds: &[Grind], min_gains: &MinGains, catalog: &Catalog, verbose: bool) {
    println!();
    println!("[BEST GRINDS] for {}", describe_goal(min_gains));
    println!("----------------------------------------------------------------");

    if grinds.is_empty() {
        println!("  No grind within the cost limit.");
        return;
    }

    for (i, grind) in grinds.iter().enumerate() {
        display_grind(i + 1, grind, catalog, verbose);
    }
}

fn format_optional_cost(cost: Option<f64>) -> String {
    cost.map(format_count).unwrap_or_else(|| "infeasible".to_string())
}

/// Displays the outcome of a card selection to stdout.
pub fn display_card_selection(
    selection: &CardSelection,
    min_gains: &MinGains,
    catalog: &Catalog,
    verbose: bool,
) {
    println!();
    println!("[CARD SELECTION] for {}", describe_goal(min_gains));
    println!("----------------------------------------------------------------");

    if !selection.free_cards.is_empty() {
        println!("  Always available: {}", selection.free_cards.join(", "));
    }
    println!("  Without cards:    {}", format_optional_cost(selection.baseline_cost));
    println!("  With all cards:   {}", format_count(selection.all_cards_cost));
    println!("  With chosen:      {}", format_count(selection.cost));
    println!();

    if selection.chosen_cards.is_empty() {
        println!("  No card makes this grind cheaper.");
    } else {
        println!("  Cards worth drawing:");
        for card in &selection.chosen_cards {
            println!("    - {}", card);
        }
    }

    if !selection.exact {
        println!();
        println!(
            "  [NOTE] The {} search adds one card at a time and may miss a cheaper",
            selection.strategy
        );
        println!("  combination of cards that only help together.");
    }

    if let Some(ref effects) = selection.per_card_effect {
        println!();
        println!("[EACH CARD ALONE]");
        println!("----------------------------------------------------------------");
        println!("{:<40} {:>12} {:>10}", "Card", "Cost", "Saves");
        let mut rows: Vec<_> = effects.iter().collect();
        rows.sort_by(|a, b| {
            a.1.unwrap_or(f64::INFINITY)
                .partial_cmp(&b.1.unwrap_or(f64::INFINITY))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (card, cost) in rows {
            let saves = match (selection.baseline_cost, cost) {
                (Some(base), Some(c)) => format_count(base - c),
                (None, Some(_)) => "feasible".to_string(),
                _ => "-".to_string(),
            };
            println!("{:<40} {:>12} {:>10}", card, format_optional_cost(*cost), saves);
        }
    }

    if let Some(ref grind) = selection.grind {
        println!();
        display_grind(1, grind, catalog, verbose);
    }
}

/// Lists every known resource, grouped by kind.
pub fn display_items(catalog: &Catalog) {
    let kinds = [
        (ResourceKind::Standard, "Items"),
        (ResourceKind::Favour, "Favours"),
        (ResourceKind::Card, "Cards"),
        (ResourceKind::Choice, "Choices"),
        (ResourceKind::Internal, "Internal"),
    ];

    for (kind, title) in kinds {
        let names: Vec<&str> = catalog
            .resources()
            .filter(|(_, k)| *k == kind)
            .map(|(name, _)| name)
            .collect();
        if names.is_empty() {
            continue;
        }
        println!();
        println!("[{}]", title.to_uppercase());
        for name in names {
            println!("  {}", name);
        }
    }
}
