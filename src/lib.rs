//! # grindplan
//!
//! A command-line tool and library for finding the cheapest way to grind
//! items in a game where every action costs the same.
//!
//! A catalog of actions, each consuming and producing resources, is turned
//! into a linear program: minimize the number of actions taken while every
//! resource ends at or above its required net gain. On top of the LP this
//! crate provides:
//!
//! - Several distinct, ranked grinds instead of a single continuous optimum
//! - A search for the cards worth drawing to make a grind cheaper
//! - Background pricing for items that are ground in parallel anyway
//!
//! ## Modules
//!
//! - [`models`] - Core data structures for actions, resources, goals and cards
//! - [`error`] - Planning errors and status tags
//! - [`data`] - CSV catalog loading and the cached cost file
//! - [`optimizer`] - LP formulation and solving, background rates, bulk unit costs
//! - [`ranker`] - Ranked distinct grinds
//! - [`cards`] - Card availability and card selection
//! - [`display`] - Output formatting and display utilities
//!
//! ## Example Usage
//!
//! ```no_run
//! use grindplan::{
//!     cards::apply_sources,
//!     data::load_all_data,
//!     display::display_grinds,
//!     models::{Background, MinGains, SourceOptions},
//!     ranker::{best_grinds, RankOptions},
//! };
//! use std::path::Path;
//!
//! // Load the catalog
//! let (catalog, deck) = load_all_data(Path::new("data")).unwrap();
//!
//! // Ask for 500 pennies, with gift cards freely available
//! let mut gains = MinGains::single("Penny", 500.0);
//! apply_sources(&mut gains, &deck, &SourceOptions::default());
//!
//! // Find the five cheapest distinct grinds
//! let grinds = best_grinds(&catalog, &gains, 5, &Background::new(), &RankOptions::default()).unwrap();
//! display_grinds(&grinds, &gains, &catalog, false);
//! ```
//!
//! ## Card Search
//!
//! The card selector supports two strategies:
//!
//! 1. **Greedy** (default): Adds the most helpful card until none helps.
//!    Cheap, but cards that only help in combination can be missed.
//!
//! 2. **Exhaustive**: Tries every subset of candidate cards. Exact, and used
//!    only while the number of candidates stays small.

pub mod cards;
pub mod data;
pub mod display;
pub mod error;
pub mod models;
pub mod optimizer;
pub mod ranker;
pub mod wasm;
