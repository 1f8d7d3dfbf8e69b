//! # Cast Simulation
//!
//! Plays one angler through many casts against an in-memory store and
//! reports how outcomes, catch tiers and earnings come out.
//!
//! ```text
//! cast_simulation [--casts N] [--seed S] [--rod T] [--hook T] [--catalog PATH]
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use fishy_economy::{
    CastRates, CastResult, Catalog, CatchOutcome, Dice, EngineConfig, FishingError, FishingResult,
    FishingService, Scope,
};
use fishy_store::{ManualClock, MemoryStore};

const PLAYER: &str = "simulated-angler";
const GUILD: &str = "simulation";

/// Command-line settings.
struct Args {
    casts: u32,
    seed: u64,
    rod: u8,
    hook: u8,
    catalog: String,
}

impl Args {
    fn parse() -> FishingResult<Self> {
        let mut args = Self {
            casts: 10_000,
            seed: 42,
            rod: 1,
            hook: 1,
            catalog: "data/catalog.toml".to_string(),
        };

        let mut raw = std::env::args().skip(1);
        while let Some(flag) = raw.next() {
            let value = raw
                .next()
                .ok_or_else(|| FishingError::Config(format!("{flag} needs a value")))?;
            let bad = |_| FishingError::Config(format!("bad value for {flag}: {value}"));
            match flag.as_str() {
                "--casts" => args.casts = value.parse().map_err(bad)?,
                "--seed" => args.seed = value.parse().map_err(bad)?,
                "--rod" => args.rod = value.parse().map_err(bad)?,
                "--hook" => args.hook = value.parse().map_err(bad)?,
                "--catalog" => args.catalog = value,
                _ => return Err(FishingError::Config(format!("unknown flag {flag}"))),
            }
        }
        Ok(args)
    }
}

#[derive(Default)]
struct Tally {
    caught: u32,
    garbage: u32,
    no_bite: u32,
    lost: u32,
    thrown_back: u32,
    rejected: u32,
    tiers: BTreeMap<u8, u32>,
    biggest: Option<(String, f64)>,
    earnings: i64,
}

fn main() -> FishingResult<()> {
    let args = Args::parse()?;

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║           FISHY CAST SIMULATION                                  ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let clock = ManualClock::default();
    let store = Arc::new(MemoryStore::with_clock(Arc::new(clock.clone())));
    let catalog = Arc::new(Catalog::load(&args.catalog)?);
    let config = EngineConfig::default();
    let cooldown = config.cast_cooldown;
    let service = FishingService::new(
        store,
        catalog,
        config,
        Arc::new(Dice::seeded(args.seed)),
        Arc::new(clock.clone()),
    )?;

    service.buy_item(PLAYER, "rod", args.rod, &[args.rod])?;
    service.buy_item(PLAYER, "hook", args.hook, &[args.hook])?;
    service.buy_item(PLAYER, "vehicle", 4, &[4])?;
    service.buy_item(PLAYER, "baitbox", 4, &[4])?;
    let bait_capacity = service.player_overview(PLAYER)?.bait_capacity;

    let expected = CastRates::derive(100, args.rod, args.hook).fish_probability();
    println!("Casts: {}  Seed: {}  Rod: {}  Hook: {}", args.casts, args.seed, args.rod, args.hook);
    println!("Expected P(fish) at baseline density: {expected:.4}");
    println!();

    let mut tally = Tally::default();
    let start = Instant::now();

    for _ in 0..args.casts {
        service.flush_tasks()?;
        let bait = service.bait_inventory(PLAYER)?.tier(1);
        if bait < 1 {
            service.add_bait(PLAYER, 1, bait_capacity - bait)?;
        }

        match service.resolve_cast(PLAYER, GUILD)? {
            CastResult::Caught { fish, .. } => {
                tally.caught += 1;
                *tally.tiers.entry(fish.tier).or_default() += 1;
                if tally.biggest.as_ref().map_or(true, |(_, size)| fish.size > *size) {
                    tally.biggest = Some((fish.name.clone(), fish.size));
                }
            }
            CastResult::CaughtGarbage { .. } => tally.garbage += 1,
            CastResult::Failed { reason, .. } => {
                if CatchOutcome::NoBite.failure_reason() == Some(reason.as_str()) {
                    tally.no_bite += 1;
                } else {
                    tally.lost += 1;
                }
            }
            CastResult::InventoryFull { .. } => {
                tally.thrown_back += 1;
                tally.earnings += service.sell_inventory(PLAYER)?.worth;
            }
            _ => tally.rejected += 1,
        }
        clock.advance(cooldown);
    }
    service.flush_tasks()?;
    tally.earnings += service.sell_inventory(PLAYER)?.worth;
    let elapsed = start.elapsed();

    let casts = f64::from(args.casts.max(1));
    println!("Outcomes:");
    println!("  fish       {:>8}  ({:.4})", tally.caught, f64::from(tally.caught) / casts);
    println!("  garbage    {:>8}", tally.garbage);
    println!("  no bite    {:>8}", tally.no_bite);
    println!("  got away   {:>8}", tally.lost);
    println!("  thrown back{:>8}", tally.thrown_back);
    println!("  rejected   {:>8}", tally.rejected);
    println!();
    println!("Catch tiers:");
    for (tier, count) in &tally.tiers {
        println!("  tier {tier}     {count:>8}");
    }
    if let Some((name, size)) = &tally.biggest {
        println!();
        println!("Biggest catch: {name} ({size:.1} cm)");
    }

    let standing = service.get_rank(PLAYER, &Scope::Global)?;
    let stats = service.player_stats(PLAYER, &Scope::Global)?;
    println!();
    println!("Final density:   {}", service.density(PLAYER)?);
    println!("Global score:    {}", standing.score);
    println!("Average length:  {:.1} cm", stats.avg_length);
    println!("Earnings:        {}", tally.earnings);
    println!(
        "Elapsed:         {:.2?} ({:.1} us/cast)",
        elapsed,
        elapsed.as_secs_f64() * 1e6 / casts
    );
    println!("Tasks:           {:?}", service.task_stats());
    Ok(())
}
