//! grindplan - Command Line Interface
//!
//! This is the main entry point for the grind planner.
//! Run with `--help` to see all available options.

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

use grindplan::{
    cards::{apply_sources, best_card_grinds, CardOptions, CardSearch, ExhaustiveSearch, GreedySearch},
    data::{load_all_data, write_action_costs},
    display::{display_card_selection, display_grinds, display_items},
    models::{Background, MinGains, SourceOptions},
    optimizer::{background_rate, unit_costs, DEFAULT_BACKGROUND_QUANTITY},
    ranker::{best_grinds, RankOptions},
};

/// Command-line arguments for grindplan.
#[derive(Parser, Debug)]
#[command(name = "grindplan")]
#[command(author, version, about = "Find the cheapest grinds for an item", long_about = None)]
struct Args {
    /// Item to grind for (see --list-items)
    #[arg(short, long, value_name = "ITEM")]
    grind: Option<String>,

    /// Number of items we have to grind
    #[arg(short, long, default_value = "1")]
    num: f64,

    /// Write out at most this many grinds
    #[arg(short, long, default_value = "15")]
    max: usize,

    /// Drop grinds costing more than this many actions
    #[arg(long, value_name = "ACTIONS")]
    max_actions: Option<f64>,

    /// Show which cards are worth drawing for the grind
    #[arg(short, long)]
    cards: bool,

    /// With --cards, also list the effect of every card on its own
    #[arg(short, long)]
    all: bool,

    /// With --cards, try every card combination instead of adding cards one at a time
    #[arg(long)]
    exhaustive: bool,

    /// Assume favours can be ground indefinitely at one favour per action
    #[arg(short, long)]
    favours: bool,

    /// Assume any card can be drawn indefinitely
    #[arg(short = 'C', long)]
    cards_available: bool,

    /// Do not make gift cards freely available
    #[arg(short = 'X', long)]
    no_gift_cards: bool,

    /// List all items the program knows about
    #[arg(short = 'L', long)]
    list_items: bool,

    /// Compute the per-unit cost of every grindable item
    #[arg(short = 'A', long)]
    grind_all_items: bool,

    /// Where --grind-all-items writes its results
    #[arg(short, long, default_value = "actioncosts.json")]
    output: PathBuf,

    /// Item ground in parallel; actions yielding it as a side effect get cheaper
    #[arg(short, long, value_name = "ITEM")]
    background: Option<String>,

    /// Print every resource each grind gains or spends
    #[arg(short, long)]
    verbose: bool,

    /// Print debug output
    #[arg(short, long)]
    debug: bool,

    /// Directory holding actions.csv, resources.csv and cards.csv
    #[arg(long, default_value = "data")]
    data: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if !args.data.exists() {
        eprintln!(
            "Error: data directory '{}' not found. Use --data to point at it.",
            args.data.display()
        );
        std::process::exit(1);
    }

    let (catalog, deck) = load_all_data(&args.data)?;

    if args.list_items {
        println!("Known items:");
        display_items(&catalog);
        return Ok(());
    }

    let sources = SourceOptions {
        no_gift_cards: args.no_gift_cards,
        favours: args.favours,
        cards_available: args.cards_available,
    };

    let mut background = Background::new();
    if let Some(ref item) = args.background {
        println!("Calculating action cost per background item {}", item);
        let mut base = MinGains::new();
        apply_sources(&mut base, &deck, &sources);
        let rate = background_rate(&catalog, &base, item, DEFAULT_BACKGROUND_QUANTITY)?;
        println!(
            "Will assume that the best grind for {} takes {:.4} actions per unit ({:.4} per action)",
            item,
            rate,
            1.0 / rate
        );
        background.insert(item.clone(), rate);
    }

    if args.grind_all_items {
        if args.cards || args.grind.is_some() {
            eprintln!("Error: --grind-all-items cannot be combined with --grind or --cards.");
            std::process::exit(2);
        }
        let mut base = MinGains::new();
        apply_sources(&mut base, &deck, &sources);
        let costs = unit_costs(&catalog, &base, args.num, &background)?;
        write_action_costs(&args.output, &costs)?;
        println!(
            "Per-unit costs of {} items were written to {}",
            costs.len(),
            args.output.display()
        );
        return Ok(());
    }

    let Some(ref item) = args.grind else {
        eprintln!("Error: nothing to do. Use --grind, --grind-all-items or --list-items.");
        std::process::exit(2);
    };

    if !catalog.contains_resource(item) {
        eprintln!("Error: I do not know of any item '{}'. See --list-items.", item);
        std::process::exit(1);
    }

    let min_gains = MinGains::single(item.clone(), args.num);

    if args.cards {
        let options = CardOptions {
            no_gift_cards: args.no_gift_cards,
            favours: args.favours,
            print_all: args.all,
            background,
        };
        let greedy = GreedySearch;
        let exhaustive = ExhaustiveSearch::default();
        let strategy: &dyn CardSearch = if args.exhaustive { &exhaustive } else { &greedy };
        let selection = best_card_grinds(&catalog, &deck, &min_gains, &options, strategy)?;
        display_card_selection(&selection, &min_gains, &catalog, args.verbose);
        return Ok(());
    }

    let mut gains = min_gains.clone();
    apply_sources(&mut gains, &deck, &sources);
    let options = RankOptions {
        max_actions: args.max_actions,
        ..RankOptions::default()
    };
    let grinds = best_grinds(&catalog, &gains, args.max, &background, &options)?;
    display_grinds(&grinds, &min_gains, &catalog, args.verbose);

    Ok(())
}
