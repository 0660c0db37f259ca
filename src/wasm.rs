//! WebAssembly bindings for grindplan.
//!
//! This module provides JavaScript-accessible functions for the planner.
//! Every function takes and returns JSON strings and never panics; failures
//! come back as `{"success": false, "error": ...}`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use wasm_bindgen::prelude::*;

use crate::cards::{
    apply_sources, best_card_grinds, CardOptions, CardSearch, CardSelection, ExhaustiveSearch,
    GreedySearch,
};
use crate::data::{build_catalog, read_actions, read_cards, read_resources};
use crate::error::{PlanError, SolveStatus};
use crate::models::{Background, CardDeck, Catalog, Grind, MinGains, ResourceKind, SourceOptions};
use crate::optimizer::{background_rate, DEFAULT_BACKGROUND_QUANTITY};
use crate::ranker::{best_grinds, RankOptions, DEFAULT_NUM_GRINDS};

fn default_num() -> f64 {
    1.0
}

fn default_max() -> usize {
    DEFAULT_NUM_GRINDS
}

/// JavaScript-friendly input for ranking grinds.
#[derive(Debug, Clone, Deserialize)]
pub struct JsGrindInput {
    pub grind: String,
    #[serde(default = "default_num")]
    pub num: f64,
    #[serde(default = "default_max")]
    pub max: usize,
    #[serde(default)]
    pub max_actions: Option<f64>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub sources: SourceOptions,
}

/// JavaScript-friendly input for card selection.
#[derive(Debug, Clone, Deserialize)]
pub struct JsCardInput {
    pub grind: String,
    #[serde(default = "default_num")]
    pub num: f64,
    #[serde(default)]
    pub no_gift_cards: bool,
    #[serde(default)]
    pub favours: bool,
    #[serde(default)]
    pub print_all: bool,
    #[serde(default)]
    pub exhaustive: bool,
    #[serde(default)]
    pub background: Option<String>,
}

/// JavaScript-friendly result of [`plan_grinds`].
#[derive(Debug, Clone, Serialize)]
pub struct JsGrindResult {
    pub success: bool,
    pub status: Option<SolveStatus>,
    pub error: Option<String>,
    pub background_rate: Option<f64>,
    pub grinds: Vec<Grind>,
}

/// JavaScript-friendly result of [`plan_cards`].
#[derive(Debug, Clone, Serialize)]
pub struct JsCardResult {
    pub success: bool,
    pub status: Option<SolveStatus>,
    pub error: Option<String>,
    pub selection: Option<CardSelection>,
}

/// A failed request: the solve status if the planner got that far.
struct Failure {
    status: Option<SolveStatus>,
    message: String,
}

impl From<PlanError> for Failure {
    fn from(e: PlanError) -> Self {
        Failure {
            status: Some(e.status()),
            message: e.to_string(),
        }
    }
}

impl From<Box<dyn Error>> for Failure {
    fn from(e: Box<dyn Error>) -> Self {
        Failure {
            status: None,
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for Failure {
    fn from(e: serde_json::Error) -> Self {
        Failure {
            status: None,
            message: format!("Invalid input: {}", e),
        }
    }
}

/// Get embedded catalog data.
/// This embeds the CSV data directly into the WASM binary.
fn embedded_data() -> Result<(Catalog, CardDeck), Box<dyn Error>> {
    let actions = read_actions(include_str!("../data/actions.csv").as_bytes())?;
    let resources = read_resources(include_str!("../data/resources.csv").as_bytes())?;
    let deck = read_cards(include_str!("../data/cards.csv").as_bytes())?;
    let catalog = build_catalog(actions, resources, &deck)?;
    Ok((catalog, deck))
}

fn background_for(
    catalog: &Catalog,
    deck: &CardDeck,
    sources: &SourceOptions,
    item: Option<&str>,
) -> Result<(Background, Option<f64>), PlanError> {
    let mut background = Background::new();
    let Some(item) = item else {
        return Ok((background, None));
    };
    let mut base = MinGains::new();
    apply_sources(&mut base, deck, sources);
    let rate = background_rate(catalog, &base, item, DEFAULT_BACKGROUND_QUANTITY)?;
    background.insert(item.to_string(), rate);
    Ok((background, Some(rate)))
}

fn run_grinds(input_json: &str) -> Result<(Option<f64>, Vec<Grind>), Failure> {
    let input: JsGrindInput = serde_json::from_str(input_json)?;
    let (catalog, deck) = embedded_data()?;

    let (background, rate) =
        background_for(&catalog, &deck, &input.sources, input.background.as_deref())?;

    let mut gains = MinGains::single(input.grind, input.num);
    apply_sources(&mut gains, &deck, &input.sources);
    let options = RankOptions {
        max_actions: input.max_actions,
        ..RankOptions::default()
    };
    let grinds = best_grinds(&catalog, &gains, input.max, &background, &options)?;
    Ok((rate, grinds))
}

fn run_cards(input_json: &str) -> Result<CardSelection, Failure> {
    let input: JsCardInput = serde_json::from_str(input_json)?;
    let (catalog, deck) = embedded_data()?;

    let sources = SourceOptions {
        no_gift_cards: input.no_gift_cards,
        favours: input.favours,
        cards_available: false,
    };
    let (background, _) = background_for(&catalog, &deck, &sources, input.background.as_deref())?;

    let options = CardOptions {
        no_gift_cards: input.no_gift_cards,
        favours: input.favours,
        print_all: input.print_all,
        background,
    };
    let greedy = GreedySearch;
    let exhaustive = ExhaustiveSearch::default();
    let strategy: &dyn CardSearch = if input.exhaustive { &exhaustive } else { &greedy };
    let min_gains = MinGains::single(input.grind, input.num);
    Ok(best_card_grinds(&catalog, &deck, &min_gains, &options, strategy)?)
}

/// Rank the best grinds for an item.
///
/// Takes a JSON string input and returns a JSON string result.
#[wasm_bindgen]
pub fn plan_grinds(input_json: &str) -> String {
    let result = match run_grinds(input_json) {
        Ok((background_rate, grinds)) => JsGrindResult {
            success: true,
            status: Some(SolveStatus::Optimal),
            error: None,
            background_rate,
            grinds,
        },
        Err(failure) => JsGrindResult {
            success: false,
            status: failure.status,
            error: Some(failure.message),
            background_rate: None,
            grinds: vec![],
        },
    };
    serde_json::to_string(&result).unwrap_or_default()
}

/// Find the cards worth drawing for an item.
///
/// Takes a JSON string input and returns a JSON string result.
#[wasm_bindgen]
pub fn plan_cards(input_json: &str) -> String {
    let result = match run_cards(input_json) {
        Ok(selection) => JsCardResult {
            success: true,
            status: Some(SolveStatus::Optimal),
            error: None,
            selection: Some(selection),
        },
        Err(failure) => JsCardResult {
            success: false,
            status: failure.status,
            error: Some(failure.message),
            selection: None,
        },
    };
    serde_json::to_string(&result).unwrap_or_default()
}

/// Get the version of the planner.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get the list of known resources.
/// Returns JSON array of resource names and their kinds.
#[wasm_bindgen]
pub fn list_items() -> String {
    #[derive(Serialize)]
    struct ItemInfo<'a> {
        name: &'a str,
        kind: ResourceKind,
        producible: bool,
    }

    let Ok((catalog, _)) = embedded_data() else {
        return "[]".to_string();
    };
    let items: Vec<ItemInfo> = catalog
        .resources()
        .map(|(name, kind)| ItemInfo {
            name,
            kind,
            producible: catalog.is_produced(name),
        })
        .collect();

    serde_json::to_string(&items).unwrap_or_default()
}
