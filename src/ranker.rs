//! Ranking of distinct grinds.
//!
//! A single LP solve yields one optimum, usually a mix of several actions.
//! To offer alternatives, the ranker runs a best-first search over sets of
//! excluded actions: every solved plan spawns one child per action it uses,
//! with that action additionally forbidden. Children can only cost more than
//! their parent, so popping the cheapest solved candidate from a heap emits
//! plans in ascending cost order.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashSet};

use serde::Deserialize;

use crate::error::PlanError;
use crate::models::{Background, Catalog, Grind, MinGains, Solution};
use crate::optimizer::solve;

/// Number of grinds listed when the caller does not say.
pub const DEFAULT_NUM_GRINDS: usize = 15;

fn default_max_solves() -> usize {
    250
}

fn default_epsilon() -> f64 {
    1e-6
}

/// Tuning knobs of [`best_grinds`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RankOptions {
    /// Plans costing more than this many actions are dropped
    #[serde(default)]
    pub max_actions: Option<f64>,
    /// Upper bound on LP solves per call, root included
    #[serde(default = "default_max_solves")]
    pub max_solves: usize,
    /// Costs closer than this are considered equal; non-positive values fall back to the default
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

impl Default for RankOptions {
    fn default() -> Self {
        RankOptions {
            max_actions: None,
            max_solves: default_max_solves(),
            epsilon: default_epsilon(),
        }
    }
}

/// Total order on plans: cost (to within epsilon), then fewer actions, then names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    cost: i64,
    actions: usize,
    names: Vec<String>,
}

impl RankKey {
    fn new(solution: &Solution, epsilon: f64) -> Self {
        RankKey {
            cost: (solution.cost / epsilon).round() as i64,
            actions: solution.action_counts.len(),
            names: solution.action_counts.keys().cloned().collect(),
        }
    }
}

struct Candidate {
    solution: Solution,
    excluded: BTreeSet<String>,
}

/// Finds up to `num_grinds` distinct plans meeting `min_gains`, cheapest first.
///
/// Plans are distinct when they use different sets of actions. Ties in cost
/// are broken by fewer actions, then by action names. Finding fewer plans
/// than requested is not an error.
///
/// # Arguments
///
/// * `catalog` - Available actions
/// * `min_gains` - Targets and availability overrides
/// * `num_grinds` - Maximum number of plans to return
/// * `background` - Per-unit action rates of resources ground in parallel
/// * `options` - Cost cutoff, solve budget and tolerance
///
/// # Errors
///
/// Any failure of the first, unrestricted solve is returned as is. Later
/// infeasible branches are simply dropped.
///
/// # Example
///
/// ```
/// use grindplan::models::{Action, Background, Catalog, MinGains};
/// use grindplan::ranker::{best_grinds, RankOptions};
///
/// let catalog = Catalog::new(
///     vec![
///         Action::new("Beg").with("Penny", 5.0),
///         Action::new("Busk").with("Penny", 10.0),
///     ],
///     vec![],
/// )
/// .unwrap();
///
/// let grinds = best_grinds(
///     &catalog,
///     &MinGains::single("Penny", 20.0),
///     2,
///     &Background::new(),
///     &RankOptions::default(),
/// )
/// .unwrap();
///
/// assert_eq!(grinds.len(), 2);
/// assert!(grinds[0].actions.contains_key("Busk"));
/// assert!(grinds[1].actions.contains_key("Beg"));
/// ```
pub fn best_grinds(
    catalog: &Catalog,
    min_gains: &MinGains,
    num_grinds: usize,
    background: &Background,
    options: &RankOptions,
) -> Result<Vec<Grind>, PlanError> {
    if num_grinds == 0 {
        return Ok(Vec::new());
    }

    let epsilon = if options.epsilon.is_finite() && options.epsilon > 0.0 {
        options.epsilon
    } else {
        log::warn!(
            "ignoring cost tolerance {}; using {}",
            options.epsilon,
            default_epsilon()
        );
        default_epsilon()
    };

    let within_cutoff = |solution: &Solution| {
        options
            .max_actions
            .map_or(true, |max| solution.cost <= max + epsilon)
    };

    let root = solve(catalog, min_gains, background, &BTreeSet::new())?;
    let mut solves = 1;

    let mut arena: Vec<Candidate> = Vec::new();
    let mut heap: BinaryHeap<Reverse<(RankKey, usize)>> = BinaryHeap::new();
    let mut visited: HashSet<BTreeSet<String>> = HashSet::new();
    let mut emitted: HashSet<Vec<String>> = HashSet::new();
    let mut grinds = Vec::new();

    visited.insert(BTreeSet::new());
    if within_cutoff(&root) {
        heap.push(Reverse((RankKey::new(&root, epsilon), 0)));
        arena.push(Candidate {
            solution: root,
            excluded: BTreeSet::new(),
        });
    }

    while let Some(Reverse((key, index))) = heap.pop() {
        if emitted.insert(key.names.clone()) {
            log::debug!(
                "grind #{}: {:.4} actions using {:?}",
                grinds.len() + 1,
                arena[index].solution.cost,
                key.names
            );
            grinds.push((key.clone(), Grind::from(arena[index].solution.clone())));
            if grinds.len() >= num_grinds {
                break;
            }
        }

        for action in &key.names {
            if solves >= options.max_solves {
                break;
            }
            let mut excluded = arena[index].excluded.clone();
            excluded.insert(action.clone());
            if !visited.insert(excluded.clone()) {
                continue;
            }

            solves += 1;
            match solve(catalog, min_gains, background, &excluded) {
                Ok(solution) if within_cutoff(&solution) => {
                    heap.push(Reverse((RankKey::new(&solution, epsilon), arena.len())));
                    arena.push(Candidate { solution, excluded });
                }
                Ok(_) | Err(PlanError::Infeasible) | Err(PlanError::UnknownResource { .. }) => {}
                Err(e) => return Err(e),
            }
        }
    }

    log::debug!("ranked {} grinds with {} LP solves", grinds.len(), solves);
    // equal-cost children may pop after a parent with a larger tie-break key
    grinds.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(grinds.into_iter().map(|(_, grind)| grind).collect())
}
