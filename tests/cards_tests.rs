//! Tests for card availability and card selection.

use grindplan::cards::{
    apply_sources, best_card_grinds, CardOptions, ExhaustiveSearch, GreedySearch,
};
use grindplan::error::PlanError;
use grindplan::models::{
    Action, Background, CardDeck, CardKind, Catalog, MinGains, SourceOptions, UNLIMITED,
};
use grindplan::optimizer::background_rate;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

fn card_catalog() -> Catalog {
    Catalog::new(
        vec![
            Action::new("Beg").with("Penny", 5.0),
            Action::new("Rob the Bank")
                .with("Card: Heist", -1.0)
                .with("Penny", 50.0),
            Action::new("Win a Card Game")
                .with("Card: Secrets", -1.0)
                .with("Penny", 20.0),
            Action::new("Grind Docks Favours")
                .with("Card: Meta Favours", -1.0)
                .with("Favours: Docks", 1.0),
            Action::new("Call in Favours")
                .with("Favours: Docks", -1.0)
                .with("Penny", 30.0),
            Action::new("Read the Paper")
                .with("Card: Gazette", -1.0)
                .with("News", 1.0),
            Action::new("Write a Letter")
                .with("Card: Quill", -1.0)
                .with("Ink", 1.0),
        ],
        vec![],
    )
    .unwrap()
}

fn card_deck() -> CardDeck {
    let mut deck = CardDeck::new();
    deck.add_unlock("Heist", CardKind::Standard, "Card: Heist");
    deck.add_unlock("Secrets", CardKind::Gift, "Card: Secrets");
    deck.add_unlock("Docks Favours", CardKind::Favour, "Card: Meta Favours");
    deck.add_unlock("Gazette", CardKind::Standard, "Card: Gazette");
    deck.add_unlock("Nowhere", CardKind::Standard, "Card: Nowhere");
    deck
}

#[test]
fn test_apply_sources_defaults_free_gifts() {
    let mut gains = MinGains::single("Penny", 100.0);
    let freed = apply_sources(&mut gains, &card_deck(), &SourceOptions::default());

    assert_eq!(freed, vec!["Secrets".to_string()]);
    assert_eq!(gains.bound("Card: Secrets"), -UNLIMITED);
    assert_eq!(gains.bound("Card: Heist"), 0.0);
}

#[test]
fn test_apply_sources_flags() {
    let deck = card_deck();

    let mut gains = MinGains::new();
    let freed = apply_sources(
        &mut gains,
        &deck,
        &SourceOptions {
            no_gift_cards: true,
            favours: true,
            cards_available: false,
        },
    );
    assert_eq!(freed, vec!["Docks Favours".to_string()]);

    let mut gains = MinGains::new();
    let freed = apply_sources(
        &mut gains,
        &deck,
        &SourceOptions {
            no_gift_cards: true,
            favours: false,
            cards_available: true,
        },
    );
    assert_eq!(freed.len(), deck.len());
    assert_eq!(gains.bound("Card: Heist"), -UNLIMITED);
}

#[test]
fn test_greedy_picks_helpful_card() {
    let selection = best_card_grinds(
        &card_catalog(),
        &card_deck(),
        &MinGains::single("Penny", 100.0),
        &CardOptions::default(),
        &GreedySearch,
    )
    .unwrap();

    assert_eq!(selection.chosen_cards.len(), 1);
    assert!(selection.chosen_cards.contains("Heist"));
    assert_close(selection.cost, 2.0);
    assert_close(selection.baseline_cost.unwrap(), 5.0);
    assert_close(selection.all_cards_cost, 2.0);
    assert_eq!(selection.free_cards, vec!["Secrets".to_string()]);
    assert_eq!(selection.strategy, "greedy");
    assert!(!selection.exact);

    let grind = selection.grind.expect("a grind with the chosen cards");
    assert_close(grind.actions["Rob the Bank"], 2.0);
}

#[test]
fn test_selection_is_bounded_by_baseline_and_all_cards() {
    for no_gift_cards in [false, true] {
        let options = CardOptions {
            no_gift_cards,
            ..CardOptions::default()
        };
        let selection = best_card_grinds(
            &card_catalog(),
            &card_deck(),
            &MinGains::single("Penny", 300.0),
            &options,
            &GreedySearch,
        )
        .unwrap();

        let baseline = selection.baseline_cost.unwrap();
        assert!(selection.cost <= baseline + 1e-9);
        assert!(selection.cost + 1e-9 >= selection.all_cards_cost);
    }
}

#[test]
fn test_no_gift_cards_raises_baseline() {
    let options = CardOptions {
        no_gift_cards: true,
        ..CardOptions::default()
    };
    let selection = best_card_grinds(
        &card_catalog(),
        &card_deck(),
        &MinGains::single("Penny", 100.0),
        &options,
        &GreedySearch,
    )
    .unwrap();

    assert!(selection.free_cards.is_empty());
    assert_close(selection.baseline_cost.unwrap(), 20.0);
    assert!(selection.chosen_cards.contains("Heist"));
    assert!(!selection.chosen_cards.contains("Secrets"));
    assert_close(selection.cost, 2.0);
}

#[test]
fn test_favours_frees_favour_cards() {
    let options = CardOptions {
        favours: true,
        ..CardOptions::default()
    };
    let selection = best_card_grinds(
        &card_catalog(),
        &card_deck(),
        &MinGains::single("Penny", 100.0),
        &options,
        &GreedySearch,
    )
    .unwrap();

    assert!(selection.free_cards.contains(&"Docks Favours".to_string()));
    assert!(!selection.chosen_cards.contains("Docks Favours"));
}

#[test]
fn test_print_all_reports_every_candidate() {
    let options = CardOptions {
        print_all: true,
        ..CardOptions::default()
    };
    let selection = best_card_grinds(
        &card_catalog(),
        &card_deck(),
        &MinGains::single("Penny", 100.0),
        &options,
        &GreedySearch,
    )
    .unwrap();

    let effects = selection.per_card_effect.expect("per-card effects");
    let names: Vec<&str> = effects.keys().map(|k| k.as_str()).collect();
    assert_eq!(names, vec!["Docks Favours", "Gazette", "Heist"]);
    assert_close(effects["Heist"].unwrap(), 2.0);
    assert_close(effects["Gazette"].unwrap(), 5.0);
    assert_close(effects["Docks Favours"].unwrap(), 5.0);
}

#[test]
fn test_useless_cards_skip_the_search() {
    let mut deck = CardDeck::new();
    deck.add_unlock("Secrets", CardKind::Gift, "Card: Secrets");
    deck.add_unlock("Gazette", CardKind::Standard, "Card: Gazette");

    let selection = best_card_grinds(
        &card_catalog(),
        &deck,
        &MinGains::single("Penny", 100.0),
        &CardOptions::default(),
        &GreedySearch,
    )
    .unwrap();

    assert!(selection.chosen_cards.is_empty());
    assert!(selection.exact);
    assert_close(selection.cost, 5.0);
    assert_eq!(selection.solves, 2);
}

#[test]
fn test_card_needed_for_feasibility() {
    let selection = best_card_grinds(
        &card_catalog(),
        &card_deck(),
        &MinGains::single("News", 3.0),
        &CardOptions::default(),
        &GreedySearch,
    )
    .unwrap();

    assert_eq!(selection.baseline_cost, None);
    assert!(selection.chosen_cards.contains("Gazette"));
    assert_close(selection.cost, 3.0);
}

#[test]
fn test_infeasible_even_with_every_card() {
    let result = best_card_grinds(
        &card_catalog(),
        &card_deck(),
        &MinGains::single("Ink", 1.0),
        &CardOptions::default(),
        &GreedySearch,
    );

    assert_eq!(result.unwrap_err(), PlanError::Infeasible);
}

fn combo_catalog() -> (Catalog, CardDeck) {
    let catalog = Catalog::new(
        vec![
            Action::new("Beg").with("Penny", 1.0),
            Action::new("Grand Scheme")
                .with("Card: Map", -1.0)
                .with("Card: Key", -1.0)
                .with("Penny", 100.0),
        ],
        vec![],
    )
    .unwrap();
    let mut deck = CardDeck::new();
    deck.add_unlock("Map", CardKind::Standard, "Card: Map");
    deck.add_unlock("Key", CardKind::Standard, "Card: Key");
    (catalog, deck)
}

#[test]
fn test_greedy_misses_cards_that_only_help_together() {
    let (catalog, deck) = combo_catalog();
    let selection = best_card_grinds(
        &catalog,
        &deck,
        &MinGains::single("Penny", 100.0),
        &CardOptions::default(),
        &GreedySearch,
    )
    .unwrap();

    assert!(selection.chosen_cards.is_empty());
    assert_close(selection.cost, 100.0);
    assert_close(selection.all_cards_cost, 1.0);
    assert!(!selection.exact);
}

#[test]
fn test_exhaustive_finds_combination() {
    let (catalog, deck) = combo_catalog();
    let selection = best_card_grinds(
        &catalog,
        &deck,
        &MinGains::single("Penny", 100.0),
        &CardOptions::default(),
        &ExhaustiveSearch::default(),
    )
    .unwrap();

    let chosen: Vec<&str> = selection.chosen_cards.iter().map(|c| c.as_str()).collect();
    assert_eq!(chosen, vec!["Key", "Map"]);
    assert_close(selection.cost, 1.0);
    assert!(selection.exact);
    assert_eq!(selection.strategy, "exhaustive");
}

#[test]
fn test_exhaustive_falls_back_above_limit() {
    let (catalog, deck) = combo_catalog();
    let search = ExhaustiveSearch { max_candidates: 1 };
    let selection = best_card_grinds(
        &catalog,
        &deck,
        &MinGains::single("Penny", 100.0),
        &CardOptions::default(),
        &search,
    )
    .unwrap();

    assert!(!selection.exact);
    assert!(selection.chosen_cards.is_empty());
}

#[test]
fn test_background_is_repriced_for_each_card_subset() {
    let catalog = Catalog::new(
        vec![
            Action::new("Beg").with("Penny", 5.0),
            Action::new("Rob the Bank")
                .with("Card: Heist", -1.0)
                .with("Penny", 50.0),
            Action::new("Craft").with("Widget", 1.0),
        ],
        vec![],
    )
    .unwrap();
    let mut deck = CardDeck::new();
    deck.add_unlock("Heist", CardKind::Standard, "Card: Heist");

    let rate = background_rate(&catalog, &MinGains::new(), "Penny", 100.0).unwrap();
    assert_close(rate, 0.2);
    let mut background = Background::new();
    background.insert("Penny".to_string(), rate);
    let options = CardOptions {
        background,
        ..CardOptions::default()
    };

    let selection = best_card_grinds(
        &catalog,
        &deck,
        &MinGains::single("Widget", 1.0),
        &options,
        &GreedySearch,
    )
    .unwrap();

    assert!(selection.cost >= 0.0);
    assert_close(selection.cost, 1.0);
    assert_close(selection.all_cards_cost, 1.0);
    assert!(selection.chosen_cards.is_empty());
    let grind = selection.grind.expect("a grind for the widget");
    assert_close(grind.actions["Craft"], 1.0);
    assert!(!grind.actions.contains_key("Rob the Bank"));
}
