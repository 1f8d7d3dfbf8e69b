//! # Fishy Economy
//!
//! Fishing resolution and player economy for a turn-based fishing minigame.
//!
//! ## Design Principles
//!
//! 1. **Injected store** - every ledger takes a [`SharedStore`]; there is no global handle
//! 2. **Static data from TOML** - species, prices and thresholds live in the [`Catalog`]
//! 3. **CSPRNG draws** - all randomness goes through [`Dice`] (ChaCha20, OS-seeded)
//! 4. **Per-player serialization** - capacity checks run under [`PlayerLocks`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use fishy_economy::{Catalog, EngineConfig, FishingService};
//! use fishy_store::MemoryStore;
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(Catalog::load("data/catalog.toml")?);
//! let config = EngineConfig::load("data/engine.toml")?;
//! let service = FishingService::with_system_sources(Arc::new(MemoryStore::new()), catalog, config)?;
//!
//! match service.resolve_cast("player-1", "guild-1")? {
//!     CastResult::Caught { fish, .. } => println!("{} ({:.1} cm)", fish.name, fish.size),
//!     other => println!("{other:?}"),
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bait;
pub mod catalog;
pub mod config;
pub mod dice;
pub mod engine;
pub mod equipment;
pub mod error;
pub mod generator;
pub mod inventory;
pub mod keys;
pub mod location;
pub mod locks;
pub mod maintenance;
pub mod profile;
pub mod rarity;
pub mod rate_limit;
pub mod rates;
pub mod resolver;
pub mod score;
pub mod stats;
pub mod tasks;
pub mod tracking;

/// Store handle shared by every ledger.
pub type SharedStore = std::sync::Arc<dyn fishy_store::KeyValueStore>;

pub use bait::{BaitChange, BaitEconomy, BaitInventory};
pub use catalog::{Catalog, ItemDef, PriceBracket, Species, Treasure};
pub use config::{EngineConfig, CAST_COMMAND};
pub use dice::Dice;
pub use engine::{CastResult, FishingService, PlayerOverview};
pub use equipment::{Equipment, EquipmentCategory, EquipmentSlot, EquipmentStore};
pub use error::{ErrorKind, FishingError, FishingResult};
pub use generator::{FishGenerator, FishInstance};
pub use inventory::{CatchKind, FishInventory, InventoryLedger};
pub use location::{Density, DensityModel, Location, Locations};
pub use locks::PlayerLocks;
pub use maintenance::MaintenanceTicker;
pub use profile::{Identity, Profiles};
pub use rarity::{select_tier, Levels};
pub use rate_limit::RateLimiter;
pub use rates::CastRates;
pub use resolver::{resolve, CatchOutcome};
pub use score::{ScoreEntry, ScoreLedger, Scope, Standing};
pub use stats::{CastStats, StatsLedger};
pub use tasks::{TaskQueue, TaskStats};
pub use tracking::{CommandStats, CommandTracker};
