//! Card availability and card selection.
//!
//! A card that is available supplies the resources it unlocks without limit.
//! [`apply_sources`] frees cards up front from configuration flags, and
//! [`best_card_grinds`] searches for the subset of the remaining cards that
//! makes a grind cheapest. The search strategy is pluggable through
//! [`CardSearch`]: [`GreedySearch`] is the default and only approximates the
//! best subset, since cards can substitute for one another;
//! [`ExhaustiveSearch`] is exact for small candidate sets.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::models::{
    Background, Card, CardDeck, CardKind, Catalog, Grind, MinGains, Solution, SourceOptions,
};
use crate::optimizer::{background_rate, solve, DEFAULT_BACKGROUND_QUANTITY};
use crate::ranker::{best_grinds, RankOptions};

/// Cost reductions at or below this are not worth drawing a card for.
pub const CARD_EPSILON: f64 = 1e-6;

/// Candidate count above which [`ExhaustiveSearch`] falls back to greedy.
pub const DEFAULT_EXHAUSTIVE_LIMIT: usize = 12;

const MAX_EXHAUSTIVE_BITS: usize = 24;

/// Releases the resources of every card the configuration makes free.
///
/// Returns the names of the cards that were freed.
///
/// # Example
///
/// ```
/// use grindplan::cards::apply_sources;
/// use grindplan::models::{CardDeck, CardKind, MinGains, SourceOptions, UNLIMITED};
///
/// let mut deck = CardDeck::new();
/// deck.add_unlock("Secrets and Spending", CardKind::Gift, "Card: Secrets and Spending");
/// deck.add_unlock("The Docks", CardKind::Standard, "Card: The Docks");
///
/// let mut gains = MinGains::single("Penny", 100.0);
/// let freed = apply_sources(&mut gains, &deck, &SourceOptions::default());
///
/// assert_eq!(freed, vec!["Secrets and Spending".to_string()]);
/// assert_eq!(gains.bound("Card: Secrets and Spending"), -UNLIMITED);
/// assert_eq!(gains.bound("Card: The Docks"), 0.0);
/// ```
pub fn apply_sources(min_gains: &mut MinGains, deck: &CardDeck, sources: &SourceOptions) -> Vec<String> {
    if sources.cards_available {
        log::info!("assuming any card can be drawn indefinitely, including favour cards");
    } else if sources.favours {
        log::info!("assuming favours are freely available at one action per favour");
    }

    let mut freed = Vec::new();
    for card in deck.iter() {
        let free = match card.kind {
            CardKind::Gift => !sources.no_gift_cards || sources.cards_available,
            CardKind::Favour => sources.favours || sources.cards_available,
            CardKind::Standard => sources.cards_available,
        };
        if free {
            release_card(min_gains, card);
            freed.push(card.name.clone());
        }
    }
    freed
}

fn release_card(min_gains: &mut MinGains, card: &Card) {
    for resource in &card.unlocks {
        min_gains.release(resource.clone());
    }
}

/// Evaluates the cost of a grind for card subsets, memoizing every subset.
///
/// Subsets under which the grind is infeasible cost `f64::INFINITY`.
/// Background rates are re-priced for every subset: a card can unlock a
/// cheaper producer of a background resource, and a rate computed without it
/// would then pay out more than the resource costs.
pub struct SubsetEvaluator<'a> {
    catalog: &'a Catalog,
    deck: &'a CardDeck,
    base: &'a MinGains,
    background: &'a Background,
    cache: HashMap<BTreeSet<String>, f64>,
    solves: usize,
}

impl<'a> SubsetEvaluator<'a> {
    pub fn new(
        catalog: &'a Catalog,
        deck: &'a CardDeck,
        base: &'a MinGains,
        background: &'a Background,
    ) -> Self {
        SubsetEvaluator {
            catalog,
            deck,
            base,
            background,
            cache: HashMap::new(),
            solves: 0,
        }
    }

    /// The goal with every card of `subset` made available.
    pub fn gains_for(&self, subset: &BTreeSet<String>) -> MinGains {
        let mut gains = self.base.clone();
        for name in subset {
            if let Some(card) = self.deck.get(name) {
                release_card(&mut gains, card);
            }
        }
        gains
    }

    /// Background rates with `subset` available.
    ///
    /// Each rate is the cheaper of the given one and the rate of grinding the
    /// resource on its own with the subset's cards. A resource that cannot be
    /// re-priced keeps its given rate.
    pub fn background_for(&self, subset: &BTreeSet<String>) -> Background {
        if self.background.is_empty() {
            return Background::new();
        }
        let availability = self.gains_for(subset).availability();
        self.background
            .iter()
            .map(|(resource, rate)| {
                let rate = match background_rate(
                    self.catalog,
                    &availability,
                    resource,
                    DEFAULT_BACKGROUND_QUANTITY,
                ) {
                    Ok(fresh) => fresh.min(*rate),
                    Err(e) => {
                        log::debug!("keeping background rate of '{}': {}", resource, e);
                        *rate
                    }
                };
                (resource.clone(), rate)
            })
            .collect()
    }

    /// Solves the grind with `subset` available, without caching.
    pub fn solve(&mut self, subset: &BTreeSet<String>) -> Result<Solution, PlanError> {
        self.solves += 1;
        let background = self.background_for(subset);
        solve(
            self.catalog,
            &self.gains_for(subset),
            &background,
            &BTreeSet::new(),
        )
    }

    /// Cost of the grind with `subset` available.
    pub fn cost(&mut self, subset: &BTreeSet<String>) -> Result<f64, PlanError> {
        if let Some(cost) = self.cache.get(subset) {
            return Ok(*cost);
        }
        let cost = match self.solve(subset) {
            Ok(solution) => solution.cost,
            Err(PlanError::Infeasible) => f64::INFINITY,
            Err(e) => return Err(e),
        };
        self.cache.insert(subset.clone(), cost);
        Ok(cost)
    }

    /// Number of LP solves performed so far.
    pub fn solves(&self) -> usize {
        self.solves
    }
}

/// A subset chosen by a [`CardSearch`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub cards: BTreeSet<String>,
    /// Whether the subset is guaranteed to be the cheapest
    pub exact: bool,
}

/// Strategy for choosing which candidate cards to make available.
pub trait CardSearch {
    fn name(&self) -> &'static str;

    /// Picks a subset of `candidates` (sorted, distinct card names).
    fn select(
        &self,
        candidates: &[String],
        evaluator: &mut SubsetEvaluator<'_>,
    ) -> Result<SearchOutcome, PlanError>;
}

/// Adds the single most helpful card until no card helps any more.
///
/// This is a local search: two cards that only help together, or a card made
/// redundant by a later pick, can lead it away from the cheapest subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySearch;

impl CardSearch for GreedySearch {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn select(
        &self,
        candidates: &[String],
        evaluator: &mut SubsetEvaluator<'_>,
    ) -> Result<SearchOutcome, PlanError> {
        let mut chosen = BTreeSet::new();
        let mut current = evaluator.cost(&chosen)?;

        loop {
            let mut best: Option<(f64, &String)> = None;
            for card in candidates.iter().filter(|c| !chosen.contains(*c)) {
                let mut trial = chosen.clone();
                trial.insert(card.clone());
                let cost = evaluator.cost(&trial)?;
                if best.map_or(true, |(b, _)| cost < b) {
                    best = Some((cost, card));
                }
            }

            // inf - inf is NaN and fails the test, so an infeasible round stops here
            match best {
                Some((cost, card)) if current - cost > CARD_EPSILON => {
                    log::debug!("card '{}' lowers the grind to {:.4} actions", card, cost);
                    chosen.insert(card.clone());
                    current = cost;
                }
                _ => break,
            }
        }

        Ok(SearchOutcome {
            cards: chosen,
            exact: false,
        })
    }
}

/// Tries every subset of the candidates; exact, but exponential.
///
/// With more than `max_candidates` candidates it falls back to
/// [`GreedySearch`] and reports the outcome as inexact.
#[derive(Debug, Clone, Copy)]
pub struct ExhaustiveSearch {
    pub max_candidates: usize,
}

impl Default for ExhaustiveSearch {
    fn default() -> Self {
        ExhaustiveSearch {
            max_candidates: DEFAULT_EXHAUSTIVE_LIMIT,
        }
    }
}

impl CardSearch for ExhaustiveSearch {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn select(
        &self,
        candidates: &[String],
        evaluator: &mut SubsetEvaluator<'_>,
    ) -> Result<SearchOutcome, PlanError> {
        if candidates.len() > self.max_candidates.min(MAX_EXHAUSTIVE_BITS) {
            log::warn!(
                "{} candidate cards exceed the exhaustive limit of {}; using greedy search",
                candidates.len(),
                self.max_candidates
            );
            return GreedySearch.select(candidates, evaluator);
        }

        let mut best: Option<(f64, BTreeSet<String>)> = None;
        for mask in 0u64..(1u64 << candidates.len()) {
            let subset: BTreeSet<String> = candidates
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1u64 << *i) != 0)
                .map(|(_, c)| c.clone())
                .collect();
            let cost = evaluator.cost(&subset)?;

            let better = match &best {
                None => true,
                Some((best_cost, best_cards)) => {
                    if cost < best_cost - CARD_EPSILON {
                        true
                    } else if cost <= best_cost + CARD_EPSILON {
                        (subset.len(), &subset) < (best_cards.len(), best_cards)
                    } else {
                        false
                    }
                }
            };
            if better {
                best = Some((cost, subset));
            }
        }

        Ok(SearchOutcome {
            cards: best.map(|(_, cards)| cards).unwrap_or_default(),
            exact: true,
        })
    }
}

/// Options of [`best_card_grinds`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CardOptions {
    /// Do not make gift cards freely available
    #[serde(default)]
    pub no_gift_cards: bool,
    /// Favour cards are free
    #[serde(default)]
    pub favours: bool,
    /// Also report the cost of each candidate card on its own
    #[serde(default)]
    pub print_all: bool,
    /// Per-unit action rates of resources ground in parallel
    #[serde(default)]
    pub background: Background,
}

/// Outcome of a card selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardSelection {
    /// Cards worth drawing for this grind
    pub chosen_cards: BTreeSet<String>,
    /// Cost of the grind with the chosen cards available
    pub cost: f64,
    /// Cost without any candidate card, `None` when infeasible
    pub baseline_cost: Option<f64>,
    /// Cost with every candidate card available
    pub all_cards_cost: f64,
    /// Cards that were free regardless of the selection
    pub free_cards: Vec<String>,
    /// Best grind with the chosen cards available
    pub grind: Option<Grind>,
    /// Cost with each candidate card alone, `None` when infeasible
    pub per_card_effect: Option<BTreeMap<String, Option<f64>>>,
    /// Name of the search strategy used
    pub strategy: &'static str,
    /// Whether the chosen subset is guaranteed to be the cheapest
    pub exact: bool,
    /// LP solves spent on the selection
    pub solves: usize,
}

/// Finds which cards are worth drawing for the grind described by `min_gains`.
///
/// Gift cards are free unless suppressed, favour cards are free when favours
/// are assumed available, and every other card that touches a resource used
/// by some action is a candidate. `strategy` picks the candidate subset.
///
/// The returned cost never exceeds the no-card baseline and is never below
/// the cost with all cards available.
///
/// # Errors
///
/// Returns the failure of the all-cards solve when even every card together
/// cannot make the grind feasible.
///
/// # Example
///
/// ```
/// use grindplan::cards::{best_card_grinds, CardOptions, GreedySearch};
/// use grindplan::models::{Action, CardDeck, CardKind, Catalog, MinGains};
///
/// let catalog = Catalog::new(
///     vec![
///         Action::new("Beg").with("Penny", 5.0),
///         Action::new("Rob the Bank").with("Card: Heist", -1.0).with("Penny", 50.0),
///     ],
///     vec![],
/// )
/// .unwrap();
/// let mut deck = CardDeck::new();
/// deck.add_unlock("Heist", CardKind::Standard, "Card: Heist");
///
/// let selection = best_card_grinds(
///     &catalog,
///     &deck,
///     &MinGains::single("Penny", 100.0),
///     &CardOptions::default(),
///     &GreedySearch,
/// )
/// .unwrap();
///
/// assert!(selection.chosen_cards.contains("Heist"));
/// assert!((selection.cost - 2.0).abs() < 1e-6);
/// assert_eq!(selection.baseline_cost.map(|c| c.round()), Some(20.0));
/// ```
pub fn best_card_grinds(
    catalog: &Catalog,
    deck: &CardDeck,
    min_gains: &MinGains,
    options: &CardOptions,
    strategy: &dyn CardSearch,
) -> Result<CardSelection, PlanError> {
    let sources = SourceOptions {
        no_gift_cards: options.no_gift_cards,
        favours: options.favours,
        cards_available: false,
    };
    let mut base = min_gains.clone();
    let free_cards = apply_sources(&mut base, deck, &sources);

    let candidates: Vec<String> = deck
        .iter()
        .filter(|card| !free_cards.contains(&card.name))
        .filter(|card| card.unlocks.iter().any(|r| catalog.touches(r)))
        .map(|card| card.name.clone())
        .collect();

    let mut evaluator = SubsetEvaluator::new(catalog, deck, &base, &options.background);

    let everything: BTreeSet<String> = candidates.iter().cloned().collect();
    let all_cards_cost = evaluator.solve(&everything)?.cost;
    let baseline = evaluator.cost(&BTreeSet::new())?;

    let mut outcome = if baseline - all_cards_cost <= CARD_EPSILON {
        SearchOutcome {
            cards: BTreeSet::new(),
            exact: true,
        }
    } else {
        strategy.select(&candidates, &mut evaluator)?
    };
    let mut cost = evaluator.cost(&outcome.cards)?;

    // no single card made the grind feasible, so greedy never left the baseline
    if !cost.is_finite() {
        log::warn!("card search found no feasible subset; assuming every candidate card");
        outcome = SearchOutcome {
            cards: everything,
            exact: false,
        };
        cost = all_cards_cost;
    }

    let per_card_effect = if options.print_all {
        let mut effects = BTreeMap::new();
        for card in &candidates {
            let alone = BTreeSet::from([card.clone()]);
            let cost = evaluator.cost(&alone)?;
            effects.insert(card.clone(), cost.is_finite().then_some(cost));
        }
        Some(effects)
    } else {
        None
    };

    let gains = evaluator.gains_for(&outcome.cards);
    let background = evaluator.background_for(&outcome.cards);
    let grind = best_grinds(catalog, &gains, 1, &background, &RankOptions::default())?
    .into_iter()
    .next();

    log::info!(
        "{} card search chose {:?}: {:.4} actions (baseline {:.4}, all cards {:.4})",
        strategy.name(),
        outcome.cards,
        cost,
        baseline,
        all_cards_cost
    );

    Ok(CardSelection {
        chosen_cards: outcome.cards,
        cost,
        baseline_cost: baseline.is_finite().then_some(baseline),
        all_cards_cost,
        free_cards,
        grind,
        per_card_effect,
        strategy: strategy.name(),
        exact: outcome.exact,
        solves: evaluator.solves(),
    })
}
