//! Data loading functionality for grindplan.
//!
//! This module handles loading the action catalog and card deck from CSV
//! files located in a data directory, and writing the cached unit-cost file
//! produced by a grind-all run.
//!
//! Three files are read:
//!
//! - `actions.csv`: `action, resource, delta`, one row per delta
//! - `resources.csv`: `name, kind`, optional explicit classifications
//! - `cards.csv`: `card, resource, kind`, optional card groups

use csv::ReaderBuilder;
use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::models::{
    Action, ActionRow, CardDeck, CardRow, Catalog, Resource, ResourceKind, ResourceRow,
};

/// Parses action rows into actions, merging rows that share an action name.
///
/// # CSV Format
///
/// Expected columns: `action, resource, delta`
pub fn read_actions<R: Read>(reader: R) -> Result<Vec<Action>, Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut actions: BTreeMap<String, Action> = BTreeMap::new();
    for result in rdr.deserialize() {
        let row: ActionRow = result?;
        let action = actions
            .remove(&row.action)
            .unwrap_or_else(|| Action::new(row.action.clone()));
        actions.insert(row.action, action.with(row.resource, row.delta));
    }
    Ok(actions.into_values().collect())
}

/// Parses explicit resource classifications.
///
/// # CSV Format
///
/// Expected columns: `name, kind` where kind is one of
/// `standard, card, favour, choice, internal`.
pub fn read_resources<R: Read>(reader: R) -> Result<Vec<Resource>, Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut resources = Vec::new();
    for result in rdr.deserialize() {
        let row: ResourceRow = result?;
        resources.push(Resource::new(row.name, row.kind));
    }
    Ok(resources)
}

/// Parses card groups.
///
/// # CSV Format
///
/// Expected columns: `card, resource, kind` where kind is one of
/// `gift, favour, standard`. A card that unlocks several resources has one
/// row per resource.
pub fn read_cards<R: Read>(reader: R) -> Result<CardDeck, Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut deck = CardDeck::new();
    for result in rdr.deserialize() {
        let row: CardRow = result?;
        deck.add_unlock(&row.card, row.kind, &row.resource);
    }
    Ok(deck)
}

/// Builds a catalog from parsed parts.
///
/// Resources without an explicit classification get one inferred from their
/// name; resources unlocked by a card are always classified as cards.
pub fn build_catalog(
    actions: Vec<Action>,
    resources: Vec<Resource>,
    deck: &CardDeck,
) -> Result<Catalog, Box<dyn Error>> {
    let mut known: BTreeMap<String, ResourceKind> =
        resources.into_iter().map(|r| (r.name, r.kind)).collect();

    for card in deck.iter() {
        for resource in &card.unlocks {
            if let Some(previous) = known.insert(resource.clone(), ResourceKind::Card) {
                if previous != ResourceKind::Card {
                    log::debug!(
                        "'{}' is unlocked by card '{}'; classifying it as a card",
                        resource,
                        card.name
                    );
                }
            }
        }
    }

    for action in &actions {
        for name in action.deltas.keys() {
            known
                .entry(name.clone())
                .or_insert_with(|| ResourceKind::infer_from_name(name));
        }
    }

    let resources = known
        .into_iter()
        .map(|(name, kind)| Resource::new(name, kind))
        .collect();
    Ok(Catalog::new(actions, resources)?)
}

/// Loads the catalog and card deck from a data directory.
///
/// `actions.csv` is required; `resources.csv` and `cards.csv` are optional.
///
/// # Example
///
/// ```no_run
/// use grindplan::data::load_all_data;
/// use std::path::Path;
///
/// let (catalog, deck) = load_all_data(Path::new("data")).unwrap();
/// println!("{} actions, {} cards", catalog.actions().len(), deck.len());
/// ```
pub fn load_all_data(data_dir: &Path) -> Result<(Catalog, CardDeck), Box<dyn Error>> {
    let actions = read_actions(File::open(data_dir.join("actions.csv"))?)?;

    let resources_path = data_dir.join("resources.csv");
    let resources = if resources_path.exists() {
        read_resources(File::open(resources_path)?)?
    } else {
        Vec::new()
    };

    let cards_path = data_dir.join("cards.csv");
    let deck = if cards_path.exists() {
        read_cards(File::open(cards_path)?)?
    } else {
        CardDeck::new()
    };

    let catalog = build_catalog(actions, resources, &deck)?;
    log::debug!(
        "loaded {} actions, {} cards from {}",
        catalog.actions().len(),
        deck.len(),
        data_dir.display()
    );
    Ok((catalog, deck))
}

/// Writes per-unit action costs as a JSON object, `null` for unobtainable items.
pub fn write_action_costs(
    path: &Path,
    costs: &BTreeMap<String, Option<f64>>,
) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, costs)?;
    Ok(())
}

/// Reads a cost file previously written by [`write_action_costs`].
pub fn read_action_costs(path: &Path) -> Result<BTreeMap<String, Option<f64>>, Box<dyn Error>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}
