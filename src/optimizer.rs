//! Linear-programming core of grindplan.
//!
//! This module turns a [`Catalog`] and a [`MinGains`] goal into a linear
//! program, solves it, and reads the continuous optimum back as a
//! [`Solution`]:
//!
//! - one non-negative variable per action (the number of times it is used)
//! - one `>=` row per resource: the net gain of the resource must reach its bound
//! - minimize the number of actions taken
//!
//! Resources ground in the background are priced into the objective instead
//! of getting a balance row; see [`formulate`].

use std::collections::{BTreeMap, BTreeSet};

use microlp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem};

use crate::error::PlanError;
use crate::models::{Action, Background, Catalog, MinGains, Solution, COUNT_EPSILON};

/// Quantity ground by [`background_rate`] when the caller has no preference.
pub const DEFAULT_BACKGROUND_QUANTITY: f64 = 100.0;

/// Effective action costs closer to zero than this are taken as exactly zero.
const COST_EPSILON: f64 = 1e-9;

/// One resource-balance constraint: `sum(coefficient * count) >= bound`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub resource: String,
    /// (column index, delta) for every action that touches the resource
    pub terms: Vec<(usize, f64)>,
    pub bound: f64,
}

/// A formulated linear program over the actions of a catalog.
#[derive(Debug, Clone)]
pub struct Formulation<'a> {
    columns: Vec<&'a Action>,
    costs: Vec<f64>,
    rows: Vec<Row>,
}

impl<'a> Formulation<'a> {
    /// Cost of one use of `action`, if it is a column of this program.
    pub fn cost_of(&self, action: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|a| a.name == action)
            .map(|i| self.costs[i])
    }

    pub fn row(&self, resource: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.resource == resource)
    }

    /// Solves the program and reads back the action counts.
    ///
    /// A negative total cost means some action produces a background resource
    /// cheaper than its rate, bounded only by a released card. That is reported
    /// as [`PlanError::Unbounded`] like the uncapped case.
    pub fn solve(&self) -> Result<Solution, PlanError> {
        if self.columns.is_empty() {
            // every remaining row has terms, so no row can be left
            return Ok(Solution {
                action_counts: BTreeMap::new(),
                gross_action_cost: 0.0,
                cost: 0.0,
            });
        }

        let mut problem = Problem::new(OptimizationDirection::Minimize);
        let vars: Vec<_> = self
            .costs
            .iter()
            .map(|cost| problem.add_var(*cost, (0.0, f64::INFINITY)))
            .collect();

        for row in &self.rows {
            let mut expr = LinearExpr::empty();
            for (column, delta) in &row.terms {
                expr.add(vars[*column], *delta);
            }
            problem.add_constraint(expr, ComparisonOp::Ge, row.bound);
        }

        log::debug!(
            "solving LP: {} actions x {} resources",
            self.columns.len(),
            self.rows.len()
        );

        let solved = match problem.solve() {
            Ok(solved) => solved,
            Err(microlp::Error::Infeasible) => return Err(PlanError::Infeasible),
            Err(microlp::Error::Unbounded) => return Err(PlanError::Unbounded),
            #[allow(unreachable_patterns)]
            Err(other) => return Err(PlanError::Solver(other.to_string())),
        };

        let mut action_counts = BTreeMap::new();
        let mut gross_action_cost = 0.0;
        let mut cost = 0.0;
        for (i, var) in vars.iter().enumerate() {
            let count = solved[*var];
            if count > COUNT_EPSILON {
                action_counts.insert(self.columns[i].name.clone(), count);
                gross_action_cost += count;
                cost += self.costs[i] * count;
            }
        }

        log::debug!(
            "LP optimum: {:.4} actions ({:.4} net) over {} distinct actions",
            gross_action_cost,
            cost,
            action_counts.len()
        );

        // a consistent background rate never pays for more than it costs
        if cost < -COST_EPSILON {
            log::warn!(
                "grind earns {:.4} actions from background credits; the background rate is too high",
                -cost
            );
            return Err(PlanError::Unbounded);
        }

        Ok(Solution {
            action_counts,
            gross_action_cost,
            cost,
        })
    }
}

/// Builds the linear program for one planning call.
///
/// # Arguments
///
/// * `catalog` - Available actions and resources
/// * `min_gains` - Targets and availability overrides for this call
/// * `background` - Per-unit action rates of resources ground in parallel
/// * `excluded` - Actions that may not be used in this call
///
/// # Background resources
///
/// A background resource `r` with rate `p` gets no balance row. Instead every
/// action's cost is debited by `p * delta(r)`: an action yielding `r` on the
/// side gets cheaper, an action spending `r` pays `p` per unit. A background
/// resource that is also a positive target is left alone for the call.
///
/// # Errors
///
/// * [`PlanError::UnknownResource`] if a positive target has no producer
/// * [`PlanError::ConflictingBound`] if a resource is both a positive target and overridden
/// * [`PlanError::Infeasible`] if a positive target's producers are all excluded
pub fn formulate<'a>(
    catalog: &'a Catalog,
    min_gains: &MinGains,
    background: &Background,
    excluded: &BTreeSet<String>,
) -> Result<Formulation<'a>, PlanError> {
    for resource in min_gains.overrides().keys() {
        if min_gains.targets().get(resource).is_some_and(|t| *t > 0.0) {
            return Err(PlanError::ConflictingBound {
                resource: resource.clone(),
            });
        }
    }

    for (resource, _) in min_gains.positive_targets() {
        if !catalog.is_produced(resource) {
            return Err(PlanError::UnknownResource {
                resource: resource.to_string(),
            });
        }
    }

    let mut priced: BTreeMap<&str, f64> = BTreeMap::new();
    for (resource, rate) in background {
        if min_gains.targets().get(resource).is_some_and(|t| *t > 0.0) {
            log::warn!(
                "'{}' is a goal of this grind; not treating it as a background resource",
                resource
            );
            continue;
        }
        priced.insert(resource.as_str(), *rate);
    }

    let columns: Vec<&Action> = catalog
        .actions()
        .iter()
        .filter(|a| !excluded.contains(&a.name))
        .collect();

    let costs: Vec<f64> = columns
        .iter()
        .map(|action| {
            let cost = priced
                .iter()
                .fold(1.0, |cost, (resource, rate)| cost - rate * action.delta(resource));
            // a rate of 1/60 times 60 pennies must not leave a negative cost behind
            if cost.abs() < COST_EPSILON {
                0.0
            } else {
                cost
            }
        })
        .collect();

    let mut resources: BTreeSet<&str> = min_gains.resources();
    for action in catalog.actions() {
        resources.extend(action.deltas.keys().map(String::as_str));
    }

    let mut rows = Vec::new();
    for resource in resources {
        if priced.contains_key(resource) {
            continue;
        }
        let bound = min_gains.bound(resource);
        let terms: Vec<(usize, f64)> = columns
            .iter()
            .enumerate()
            .map(|(i, action)| (i, action.delta(resource)))
            .filter(|(_, delta)| *delta != 0.0)
            .collect();

        if terms.is_empty() {
            if bound > 0.0 {
                return Err(PlanError::Infeasible);
            }
            continue;
        }
        rows.push(Row {
            resource: resource.to_string(),
            terms,
            bound,
        });
    }

    Ok(Formulation {
        columns,
        costs,
        rows,
    })
}

/// Solves one planning call with background pricing and action exclusions.
pub fn solve(
    catalog: &Catalog,
    min_gains: &MinGains,
    background: &Background,
    excluded: &BTreeSet<String>,
) -> Result<Solution, PlanError> {
    formulate(catalog, min_gains, background, excluded)?.solve()
}

/// Finds the cheapest action mix meeting `min_gains`.
///
/// # Example
///
/// ```
/// use grindplan::models::{Action, Catalog, MinGains};
/// use grindplan::optimizer::optimize;
///
/// let catalog = Catalog::new(vec![Action::new("Beg").with("Penny", 10.0)], vec![]).unwrap();
/// let solution = optimize(&catalog, &MinGains::single("Penny", 25.0)).unwrap();
///
/// assert!((solution.gross_action_cost - 2.5).abs() < 1e-9);
/// assert!((solution.action_counts["Beg"] - 2.5).abs() < 1e-9);
/// ```
pub fn optimize(catalog: &Catalog, min_gains: &MinGains) -> Result<Solution, PlanError> {
    solve(catalog, min_gains, &Background::new(), &BTreeSet::new())
}

/// Computes the action cost per unit of `resource` when ground on its own.
///
/// `base` carries the availability overrides the background grind may use.
/// The result is suitable as a [`Background`] rate.
pub fn background_rate(
    catalog: &Catalog,
    base: &MinGains,
    resource: &str,
    quantity: f64,
) -> Result<f64, PlanError> {
    let gains = base.clone().with_target(resource, quantity);
    let solution = optimize(catalog, &gains)?;
    let rate = solution.gross_action_cost / quantity;
    log::info!(
        "background '{}': {:.4} actions per unit ({:.4} per action)",
        resource,
        rate,
        1.0 / rate
    );
    Ok(rate)
}

/// Computes the best per-unit action cost of every grindable resource.
///
/// Each grindable resource that is neither a background resource nor
/// already named in `base` is ground `quantity` times on its own. Unobtainable
/// resources map to `None`. Background rates are included as given.
pub fn unit_costs(
    catalog: &Catalog,
    base: &MinGains,
    quantity: f64,
    background: &Background,
) -> Result<BTreeMap<String, Option<f64>>, PlanError> {
    let mut costs: BTreeMap<String, Option<f64>> = background
        .iter()
        .map(|(name, rate)| (name.clone(), Some(*rate)))
        .collect();
    let named = base.resources();

    for (name, kind) in catalog.resources() {
        if !kind.is_grindable() || background.contains_key(name) || named.contains(name) {
            continue;
        }
        let gains = base.clone().with_target(name, quantity);
        let cost = match solve(catalog, &gains, background, &BTreeSet::new()) {
            Ok(solution) => Some(solution.cost / quantity),
            Err(PlanError::UnknownResource { .. }) | Err(PlanError::Infeasible) => None,
            Err(e) => return Err(e),
        };
        log::debug!("unit cost of '{}': {:?}", name, cost);
        costs.insert(name.to_string(), cost);
    }

    Ok(costs)
}
