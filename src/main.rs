//! Headless driver: plays demo matches, banks the coins, opens loot boxes

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use plinko_pong::consts::TICK_RATE;
use plinko_pong::inventory::{Category, Ledger};
use plinko_pong::loot::Catalog;
use plinko_pong::persistence::{JsonFileStore, KvStore, MemoryStore};
use plinko_pong::session::MatchSession;
use plinko_pong::settings::Settings;
use plinko_pong::shop::{PurchaseOutcome, Shop};
use plinko_pong::sim::Difficulty;

/// Give up on a demo match after ten simulated minutes
const MAX_MATCH_TICKS: u64 = 10 * 60 * TICK_RATE as u64;

/// Plinko Pong headless demo
#[derive(Parser)]
#[command(name = "plinko-pong", version, about = "Play autopilot Pong matches and spend the winnings on Plinko loot boxes")]
struct Cli {
    /// easy, medium or hard (default: saved preference)
    #[arg(long)]
    difficulty: Option<String>,

    /// Seed for matches and drops
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of demo matches to play
    #[arg(long, default_value = "3")]
    matches: u32,

    /// Number of loot boxes to try to open afterwards
    #[arg(long, default_value = "1")]
    boxes: u32,

    /// Which box to open
    #[arg(long, default_value = "basic_box")]
    box_id: String,

    /// JSON save file (in-memory if omitted)
    #[arg(long)]
    save: Option<PathBuf>,
}

fn open_store(path: Option<&PathBuf>) -> Result<Box<dyn KvStore>> {
    Ok(match path {
        Some(path) => Box::new(
            JsonFileStore::open(path)
                .with_context(|| format!("opening save file {}", path.display()))?,
        ),
        None => Box::new(MemoryStore::new()),
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let catalog = Arc::new(Catalog::standard().context("catalog failed validation")?);
    let store = open_store(cli.save.as_ref())?;
    let settings = Settings::load(&store);

    let difficulty = match cli.difficulty.as_deref() {
        Some(name) => Difficulty::from_str(name)
            .with_context(|| format!("Unknown difficulty '{name}'. Valid values: easy, medium, hard"))?,
        None => settings.default_difficulty,
    };

    let mut ledger = Ledger::new(store, catalog.clone());
    ledger.initialize_defaults();
    log::info!("Plinko Pong starting with {} coins", ledger.coins());

    println!("=== Matches ({}) ===", difficulty.as_str());
    for i in 0..cli.matches {
        let mut session = MatchSession::new(difficulty, cli.seed.wrapping_add(i as u64), settings.control_style);
        session.set_idle(true);
        let ticks = session.run_to_end(MAX_MATCH_TICKS);
        let credited = session.exit(&mut ledger);

        match session.state().outcome() {
            Some(outcome) => println!(
                "Match {}: {:?} wins {}-{} in {:.1}s, +{} coins",
                i + 1,
                outcome.winner,
                outcome.score.player,
                outcome.score.ai,
                ticks as f64 / TICK_RATE as f64,
                credited
            ),
            None => println!(
                "Match {}: unfinished after {} ticks, +{} coins",
                i + 1,
                ticks,
                credited
            ),
        }
    }

    let shop = Shop::new(catalog.clone());
    println!();
    println!("=== Plinko odds ===");
    for (rarity, share) in shop.board().slot_distribution() {
        println!("  {:10} {:5.1}%", rarity.info().label, share);
    }

    println!();
    println!("=== Loot boxes ({}) ===", cli.box_id);
    let mut rng = Pcg32::seed_from_u64(cli.seed);
    for _ in 0..cli.boxes {
        match shop.open_box(&mut ledger, &cli.box_id, &mut rng)? {
            PurchaseOutcome::Opened(opening) => {
                let note = if opening.duplicate {
                    format!(" (duplicate, +{} refund)", opening.refund)
                } else {
                    String::new()
                };
                println!(
                    "Slot {:2} -> {} {}{}",
                    opening.landing.slot,
                    opening.rarity.info().label,
                    opening.item.name,
                    note
                );
            }
            PurchaseOutcome::InsufficientFunds { price, balance } => {
                println!("Need {price} coins, have {balance}");
                break;
            }
        }
    }

    println!();
    println!("=== Inventory ===");
    println!("Coins: {}", ledger.coins());
    for category in Category::ALL {
        let unlocked = ledger.unlocked(category);
        println!(
            "{:7} {}/{} owned, equipped {}",
            category.as_str(),
            unlocked.len(),
            catalog.items_of(category).count(),
            ledger.equipped(category)
        );
    }

    Ok(())
}
