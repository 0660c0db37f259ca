//! Data models and structures for grindplan.
//!
//! This module contains the core data structures used throughout the crate:
//! resources and their classification, actions and the catalog that owns them,
//! per-call goal vectors, solver results and cards.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, SolveStatus};

/// Lower bound used to model "available without limit".
///
/// No single grind should ever need more than this many units of a card or
/// favour, so a bound of `-UNLIMITED` behaves as an unbounded supply.
pub const UNLIMITED: f64 = 100_000.0;

/// Counts below this are treated as zero when reading solutions.
pub const COUNT_EPSILON: f64 = 1e-7;

/// Per-unit action rates of resources ground in parallel.
pub type Background = BTreeMap<String, f64>;

/// Classification of a resource.
///
/// The optimization core treats every kind identically; the kind only
/// matters to callers that list or bulk-grind items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// An ordinary grindable item.
    #[default]
    Standard,
    /// The drawable side of a card.
    Card,
    /// A favour currency.
    Favour,
    /// A branch marker for mutually exclusive outcomes.
    Choice,
    /// Bookkeeping quantities that are never a grind goal.
    Internal,
}

impl ResourceKind {
    /// Whether a resource of this kind is a sensible goal for a bulk grind.
    pub fn is_grindable(self) -> bool {
        self == ResourceKind::Standard
    }

    /// Infers a kind from the legacy name prefixes of hand-written catalogs.
    ///
    /// Only the data layer calls this, once, for resources that have no
    /// explicit kind.
    ///
    /// # Example
    ///
    /// ```
    /// use grindplan::models::ResourceKind;
    ///
    /// assert_eq!(ResourceKind::infer_from_name("Card: Secrets and Spending"), ResourceKind::Card);
    /// assert_eq!(ResourceKind::infer_from_name("Favours: Docks"), ResourceKind::Favour);
    /// assert_eq!(ResourceKind::infer_from_name("Penny"), ResourceKind::Standard);
    /// ```
    pub fn infer_from_name(name: &str) -> Self {
        if name.starts_with("Card:") {
            ResourceKind::Card
        } else if name.starts_with("Favours:") {
            ResourceKind::Favour
        } else if name.starts_with("Choice:") {
            ResourceKind::Choice
        } else if name.starts_with("Meta:") {
            ResourceKind::Internal
        } else {
            ResourceKind::Standard
        }
    }
}

/// A named resource with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub kind: ResourceKind,
}

impl Resource {
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Resource { name: name.into(), kind }
    }
}

/// A repeatable action with fixed resource deltas and a cost of one action.
///
/// # Example
///
/// ```
/// use grindplan::models::Action;
///
/// let sell = Action::new("Sell Rostygold")
///     .with("Rostygold", -100.0)
///     .with("Penny", 100.0);
///
/// assert!(sell.produces("Penny"));
/// assert!(!sell.produces("Rostygold"));
/// assert_eq!(sell.delta("Echo"), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Unique action name
    pub name: String,
    /// Signed quantity per execution: negative is consumed, positive is produced
    pub deltas: BTreeMap<String, f64>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Action {
            name: name.into(),
            deltas: BTreeMap::new(),
        }
    }

    /// Adds `delta` to this action's effect on `resource`.
    pub fn with(mut self, resource: impl Into<String>, delta: f64) -> Self {
        *self.deltas.entry(resource.into()).or_insert(0.0) += delta;
        self
    }

    pub fn delta(&self, resource: &str) -> f64 {
        self.deltas.get(resource).copied().unwrap_or(0.0)
    }

    pub fn produces(&self, resource: &str) -> bool {
        self.delta(resource) > 0.0
    }
}

/// The read-only set of actions and resources a plan can draw on.
///
/// Actions are kept sorted by name so that every formulation built from a
/// catalog has the same column order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    actions: Vec<Action>,
    resources: BTreeMap<String, ResourceKind>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate action names and non-finite deltas.
    ///
    /// Resources referenced by an action but missing from `resources` are
    /// registered as [`ResourceKind::Standard`].
    pub fn new(mut actions: Vec<Action>, resources: Vec<Resource>) -> Result<Self, PlanError> {
        actions.sort_by(|a, b| a.name.cmp(&b.name));
        for pair in actions.windows(2) {
            if pair[0].name == pair[1].name {
                return Err(PlanError::DuplicateAction(pair[0].name.clone()));
            }
        }

        let mut kinds: BTreeMap<String, ResourceKind> = resources
            .into_iter()
            .map(|r| (r.name, r.kind))
            .collect();

        for action in &actions {
            for (resource, delta) in &action.deltas {
                if !delta.is_finite() {
                    return Err(PlanError::InvalidDelta {
                        action: action.name.clone(),
                        resource: resource.clone(),
                    });
                }
                kinds.entry(resource.clone()).or_default();
            }
        }

        Ok(Catalog {
            actions,
            resources: kinds,
        })
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions
            .binary_search_by(|a| a.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.actions[i])
    }

    /// All known resources with their kinds, sorted by name.
    pub fn resources(&self) -> impl Iterator<Item = (&str, ResourceKind)> + '_ {
        self.resources.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn kind(&self, resource: &str) -> Option<ResourceKind> {
        self.resources.get(resource).copied()
    }

    pub fn contains_resource(&self, resource: &str) -> bool {
        self.resources.contains_key(resource)
    }

    /// Whether any action yields a positive amount of `resource`.
    pub fn is_produced(&self, resource: &str) -> bool {
        self.actions.iter().any(|a| a.produces(resource))
    }

    /// Whether any action consumes or produces `resource`.
    pub fn touches(&self, resource: &str) -> bool {
        self.actions
            .iter()
            .any(|a| a.deltas.get(resource).is_some_and(|d| *d != 0.0))
    }
}

/// Minimum net gains required of a plan, plus availability overrides.
///
/// `targets` are what the caller asks for. `overrides` relax the lower bound
/// of a resource for this call only (cards drawn at will, free favours) and
/// do not say why the bound was relaxed.
///
/// # Example
///
/// ```
/// use grindplan::models::{MinGains, UNLIMITED};
///
/// let mut gains = MinGains::single("Penny", 25.0);
/// gains.release("Card: Secrets and Spending");
///
/// assert_eq!(gains.bound("Penny"), 25.0);
/// assert_eq!(gains.bound("Card: Secrets and Spending"), -UNLIMITED);
/// assert_eq!(gains.bound("Echo"), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinGains {
    targets: BTreeMap<String, f64>,
    overrides: BTreeMap<String, f64>,
}

impl MinGains {
    pub fn new() -> Self {
        MinGains::default()
    }

    /// A goal of `amount` units of one resource.
    pub fn single(resource: impl Into<String>, amount: f64) -> Self {
        MinGains::new().with_target(resource, amount)
    }

    pub fn with_target(mut self, resource: impl Into<String>, amount: f64) -> Self {
        self.set_target(resource, amount);
        self
    }

    pub fn set_target(&mut self, resource: impl Into<String>, amount: f64) {
        self.targets.insert(resource.into(), amount);
    }

    /// The same availability overrides with no targets.
    pub fn availability(&self) -> MinGains {
        MinGains {
            targets: BTreeMap::new(),
            overrides: self.overrides.clone(),
        }
    }

    /// Overrides the lower bound of `resource` for this call.
    pub fn set_override(&mut self, resource: impl Into<String>, bound: f64) {
        self.overrides.insert(resource.into(), bound);
    }

    /// Makes `resource` available without limit.
    pub fn release(&mut self, resource: impl Into<String>) {
        self.set_override(resource, -UNLIMITED);
    }

    pub fn targets(&self) -> &BTreeMap<String, f64> {
        &self.targets
    }

    pub fn overrides(&self) -> &BTreeMap<String, f64> {
        &self.overrides
    }

    /// Effective lower bound on the net gain of `resource`.
    pub fn bound(&self, resource: &str) -> f64 {
        self.overrides
            .get(resource)
            .or_else(|| self.targets.get(resource))
            .copied()
            .unwrap_or(0.0)
    }

    /// Every resource named by a target or an override, without duplicates.
    pub fn resources(&self) -> BTreeSet<&str> {
        self.targets
            .keys()
            .chain(self.overrides.keys())
            .map(String::as_str)
            .collect()
    }

    /// Targets that ask for a strictly positive amount.
    pub fn positive_targets(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.targets
            .iter()
            .filter(|(_, amount)| **amount > 0.0)
            .map(|(name, amount)| (name.as_str(), *amount))
    }
}

/// An optimal action mix returned by the solver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// Times each action is used; zero counts are omitted
    pub action_counts: BTreeMap<String, f64>,
    /// Sum of all action counts
    pub gross_action_cost: f64,
    /// Objective value: the gross cost minus background credits
    pub cost: f64,
}

impl Solution {
    pub fn status(&self) -> SolveStatus {
        SolveStatus::Optimal
    }

    /// Names of the actions with a non-zero count, sorted.
    pub fn support(&self) -> Vec<&str> {
        self.action_counts.keys().map(String::as_str).collect()
    }

    /// Net amount of every resource the plan gains or spends.
    pub fn net_flows(&self, catalog: &Catalog) -> BTreeMap<String, f64> {
        net_flows(catalog, &self.action_counts)
    }
}

fn net_flows(catalog: &Catalog, counts: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let mut flows: BTreeMap<String, f64> = BTreeMap::new();
    for (name, count) in counts {
        if let Some(action) = catalog.action(name) {
            for (resource, delta) in &action.deltas {
                *flows.entry(resource.clone()).or_insert(0.0) += delta * count;
            }
        }
    }
    flows
}

/// One ranked plan produced by the grind ranker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grind {
    /// Total action cost net of background credits
    pub cost: f64,
    /// Sum of action counts
    pub gross_action_cost: f64,
    /// Action name to count
    pub actions: BTreeMap<String, f64>,
}

impl Grind {
    /// Net amount of every resource the grind gains or spends.
    pub fn net_flows(&self, catalog: &Catalog) -> BTreeMap<String, f64> {
        net_flows(catalog, &self.actions)
    }
}

impl From<Solution> for Grind {
    fn from(solution: Solution) -> Self {
        Grind {
            cost: solution.cost,
            gross_action_cost: solution.gross_action_cost,
            actions: solution.action_counts,
        }
    }
}

/// How a card becomes available before any selection happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    /// Always free unless gift cards are suppressed.
    Gift,
    /// Free when favours are assumed to be available.
    Favour,
    /// Only available if the selector picks it.
    #[default]
    Standard,
}

/// A card group and the resources it unlocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub name: String,
    pub kind: CardKind,
    pub unlocks: Vec<String>,
}

/// All known cards, keyed by group name.
#[derive(Debug, Clone, Default)]
pub struct CardDeck {
    cards: BTreeMap<String, Card>,
}

impl CardDeck {
    pub fn new() -> Self {
        CardDeck::default()
    }

    /// Records that card `name` unlocks `resource`, creating the card if needed.
    pub fn add_unlock(&mut self, name: &str, kind: CardKind, resource: &str) {
        let card = self.cards.entry(name.to_string()).or_insert_with(|| Card {
            name: name.to_string(),
            kind,
            unlocks: Vec::new(),
        });
        if !card.unlocks.iter().any(|r| r == resource) {
            card.unlocks.push(resource.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&Card> {
        self.cards.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> + '_ {
        self.cards.values()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn of_kind(&self, kind: CardKind) -> impl Iterator<Item = &Card> + '_ {
        self.cards.values().filter(move |c| c.kind == kind)
    }
}

/// Which auxiliary resources are assumed to be freely available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourceOptions {
    /// Do not make gift cards freely available
    #[serde(default)]
    pub no_gift_cards: bool,
    /// Favours can be ground at one favour per action
    #[serde(default)]
    pub favours: bool,
    /// Any card can be drawn at will
    #[serde(default)]
    pub cards_available: bool,
}

// ============================================================================
// CSV Row Structures
// ============================================================================

/// CSV row structure for `actions.csv`: one row per (action, resource) delta.
#[derive(Debug, Deserialize)]
pub struct ActionRow {
    /// Action name
    pub action: String,
    /// Resource affected
    pub resource: String,
    /// Signed quantity per execution
    pub delta: f64,
}

/// CSV row structure for `resources.csv`.
#[derive(Debug, Deserialize)]
pub struct ResourceRow {
    /// Resource name
    pub name: String,
    /// Explicit classification
    pub kind: ResourceKind,
}

/// CSV row structure for `cards.csv`.
#[derive(Debug, Deserialize)]
pub struct CardRow {
    /// Card group name
    pub card: String,
    /// Resource the card unlocks
    pub resource: String,
    /// Availability class (`gift`, `favour`, `standard`)
    #[serde(default)]
    pub kind: CardKind,
}
