//! # Fishing Service
//!
//! The facade the command layer talks to. It wires every ledger to one
//! store, one catalog and one source of randomness, and runs a cast from
//! eligibility gates to recorded catch.
//!
//! ## Cast flow
//!
//! ```text
//! blacklist -> gather timer -> cooldown -> rod/hook -> bait -> claim cooldown
//!     -> density + gear -> rates -> resolve
//!          NoBite      : nothing recorded
//!          BitButLost  : one bait consumed
//!          Garbage     : trash recorded in the inventory
//!          Fish        : tier rolled, fish generated and stored, density
//!                        redistributed, bait consumed, scores raised
//! ```
//!
//! The response only waits on what it reports: the fish inventory write
//! decides whether the fish is kept, and the redistributed density is part
//! of the result. Everything else is submitted to the [`TaskQueue`].

use crate::bait::{BaitChange, BaitEconomy, BaitInventory};
use crate::catalog::{Catalog, ItemDef, Treasure};
use crate::config::{EngineConfig, CAST_COMMAND};
use crate::dice::Dice;
use crate::equipment::{Equipment, EquipmentCategory, EquipmentStore};
use crate::error::{FishingError, FishingResult};
use crate::generator::{FishGenerator, FishInstance};
use crate::inventory::{CatchKind, FishInventory, InventoryLedger};
use crate::location::{Density, DensityModel, Location, Locations};
use crate::locks::PlayerLocks;
use crate::maintenance::MaintenanceTicker;
use crate::profile::{Identity, Profiles};
use crate::rarity::{select_tier, MAX_TIER};
use crate::rate_limit::RateLimiter;
use crate::rates::CastRates;
use crate::resolver::{resolve, CatchOutcome};
use crate::score::{ScoreEntry, ScoreLedger, Scope, Standing};
use crate::stats::{CastStats, StatsLedger};
use crate::tasks::{TaskQueue, TaskStats};
use crate::tracking::{CommandStats, CommandTracker};
use crate::SharedStore;
use fishy_store::{Clock, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of [`FishingService::resolve_cast`].
#[derive(Clone, Debug, PartialEq)]
pub enum CastResult {
    /// The player is blacklisted.
    Blacklisted,
    /// The player is gathering bait for this much longer.
    Gathering(Duration),
    /// The cast cooldown has this much left.
    RateLimited(Duration),
    /// Required gear not equipped.
    MissingGear(Vec<EquipmentCategory>),
    /// No bait of the equipped tier.
    OutOfBait,
    /// A fish was landed and stored.
    Caught {
        /// The fish.
        fish: FishInstance,
        /// Density after redistribution.
        density: Density,
    },
    /// Trash was reeled in.
    CaughtGarbage {
        /// What was reeled in.
        description: String,
        /// Where.
        location: Location,
        /// Density, unchanged by the cast.
        density: Density,
    },
    /// Nothing was landed.
    Failed {
        /// Why.
        reason: String,
        /// Where.
        location: Location,
        /// Density, unchanged by the cast.
        density: Density,
    },
    /// A fish was landed but the inventory is full, so it was thrown back.
    InventoryFull {
        /// Species that got away.
        species: String,
        /// Inventory capacity.
        capacity: i64,
    },
}

/// What the inventory screen shows.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerOverview {
    /// Gear per category.
    pub equipment: Equipment,
    /// Fish inventory counters.
    pub inventory: FishInventory,
    /// Fish inventory capacity.
    pub fish_capacity: i64,
    /// Bait capacity per tier.
    pub bait_capacity: i64,
    /// Bait per tier.
    pub bait: BaitInventory,
    /// Highest catch tier unlocked by the global score.
    pub unlocked_tier: u8,
}

/// Fishing resolution and player economy over one store.
pub struct FishingService {
    config: EngineConfig,
    catalog: Arc<Catalog>,
    dice: Arc<Dice>,
    rate_limiter: RateLimiter,
    equipment: EquipmentStore,
    bait: BaitEconomy,
    locations: Locations,
    density: DensityModel,
    inventory: InventoryLedger,
    scores: ScoreLedger,
    stats: StatsLedger,
    profiles: Profiles,
    generator: FishGenerator,
    tracker: Arc<CommandTracker>,
    tasks: TaskQueue,
}

impl FishingService {
    /// Builds the service and starts its task worker.
    pub fn new(
        store: SharedStore,
        catalog: Arc<Catalog>,
        config: EngineConfig,
        dice: Arc<Dice>,
        clock: Arc<dyn Clock>,
    ) -> FishingResult<Self> {
        config.validate()?;
        let locks = Arc::new(PlayerLocks::default());
        let equipment = EquipmentStore::new(Arc::clone(&store), Arc::clone(&locks));

        Ok(Self {
            rate_limiter: RateLimiter::new(Arc::clone(&store)),
            bait: BaitEconomy::new(Arc::clone(&store), equipment.clone(), Arc::clone(&locks)),
            locations: Locations::new(Arc::clone(&store)),
            density: DensityModel::new(
                Arc::clone(&store),
                Arc::clone(&dice),
                Arc::clone(&locks),
                config.density_ttl,
            ),
            inventory: InventoryLedger::new(Arc::clone(&store), equipment.clone(), Arc::clone(&locks)),
            scores: ScoreLedger::new(Arc::clone(&store)),
            stats: StatsLedger::new(Arc::clone(&store), Arc::clone(&locks)),
            profiles: Profiles::new(Arc::clone(&store), config.gather_bait),
            generator: FishGenerator::new(Arc::clone(&catalog), Arc::clone(&dice)),
            tracker: Arc::new(CommandTracker::new(
                store,
                clock,
                config.hourly_window,
                config.daily_window,
            )),
            tasks: TaskQueue::start(config.task_queue_capacity)?,
            equipment,
            catalog,
            dice,
            config,
        })
    }

    /// Builds the service with OS-seeded randomness and the system clock.
    pub fn with_system_sources(
        store: SharedStore,
        catalog: Arc<Catalog>,
        config: EngineConfig,
    ) -> FishingResult<Self> {
        let dice = Arc::new(Dice::from_os()?);
        Self::new(store, catalog, config, dice, Arc::new(SystemClock))
    }

    /// Runs one cast for `player` fishing in `guild`.
    pub fn resolve_cast(&self, player: &str, guild: &str) -> FishingResult<CastResult> {
        self.cast(player, guild)
            .map_err(|error| log_failure("resolve_cast", player, error))
    }

    fn cast(&self, player: &str, guild: &str) -> FishingResult<CastResult> {
        {
            let tracker = Arc::clone(&self.tracker);
            let player = player.to_string();
            self.background("track_command", move || tracker.record(CAST_COMMAND, &player));
        }

        if self.profiles.is_blacklisted(player)? {
            return Ok(CastResult::Blacklisted);
        }
        if let Some(remaining) = self.profiles.check_gather_bait(player)? {
            return Ok(CastResult::Gathering(remaining));
        }
        if let Some(remaining) = self.rate_limiter.check(CAST_COMMAND, player)? {
            return Ok(CastResult::RateLimited(remaining));
        }

        let equipment = self.equipment.get(player)?;
        let missing = equipment.missing_required();
        if !missing.is_empty() {
            return Ok(CastResult::MissingGear(missing));
        }
        if self.bait.current_tier_amount(player)? < 1 {
            return Ok(CastResult::OutOfBait);
        }

        if !self
            .rate_limiter
            .try_claim(CAST_COMMAND, player, self.config.cast_cooldown)?
        {
            let remaining = self
                .rate_limiter
                .check(CAST_COMMAND, player)?
                .unwrap_or(self.config.cast_cooldown);
            return Ok(CastResult::RateLimited(remaining));
        }

        let guild_scope = Scope::Guild(guild.to_string());
        {
            let stats = self.stats.clone();
            let (player, guild_scope) = (player.to_string(), guild_scope.clone());
            self.background("record_cast", move || {
                stats.record_cast(&player, &Scope::Global)?;
                stats.record_cast(&player, &guild_scope)
            });
        }

        let location = self.locations.get(player)?;
        let density = self.density.get(player)?;
        let rates = CastRates::derive(
            density.at(location),
            equipment.rod.current,
            equipment.hook.current,
        );
        let outcome = resolve(&self.dice, &rates);
        tracing::debug!(
            player,
            guild,
            location = %location,
            bite = rates.bite,
            catch = rates.catch,
            fish = rates.fish,
            ?outcome,
            "cast resolved"
        );

        match outcome {
            CatchOutcome::NoBite | CatchOutcome::BitButLost => {
                if outcome == CatchOutcome::BitButLost {
                    self.consume_bait(player);
                }
                Ok(CastResult::Failed {
                    reason: outcome.failure_reason().unwrap_or_default().to_string(),
                    location,
                    density,
                })
            }
            CatchOutcome::Garbage => Ok(self.land_garbage(player, guild_scope, location, density)),
            CatchOutcome::Fish => self.land_fish(player, guild_scope, location, density),
        }
    }

    fn land_garbage(
        &self,
        player: &str,
        guild_scope: Scope,
        location: Location,
        density: Density,
    ) -> CastResult {
        let description = self.generator.garbage();
        tracing::debug!(player, location = %location, garbage = %description, "garbage caught");

        let inventory = self.inventory.clone();
        let stats = self.stats.clone();
        let worth = self.config.garbage_worth;
        let player_id = player.to_string();
        self.background("record_garbage", move || {
            stats.record_garbage(&player_id, &Scope::Global)?;
            stats.record_garbage(&player_id, &guild_scope)?;
            inventory.add(&player_id, CatchKind::Garbage, worth)
        });

        CastResult::CaughtGarbage {
            description,
            location,
            density,
        }
    }

    fn land_fish(
        &self,
        player: &str,
        guild_scope: Scope,
        location: Location,
        density: Density,
    ) -> FishingResult<CastResult> {
        let score = self.scores.get(player, &Scope::Global)?;
        let unlocked = self.catalog.levels().unlocked_tier(score);
        let tier = select_tier(&self.dice, unlocked);
        let fish = self.generator.generate(tier, location)?;

        match self
            .inventory
            .add(player, CatchKind::for_tier(tier), fish.price)
        {
            Ok(()) => {}
            Err(FishingError::InventoryFull { capacity, .. }) => {
                tracing::debug!(player, species = %fish.name, capacity, "inventory full, fish released");
                return Ok(CastResult::InventoryFull {
                    species: fish.name,
                    capacity,
                });
            }
            Err(error) => return Err(error),
        }

        let density = match self.density.redistribute(player, location) {
            Ok(updated) => updated,
            Err(error) => {
                tracing::warn!(player, location = %location, %error, "density redistribution failed");
                density
            }
        };

        self.consume_bait(player);
        {
            let scores = self.scores.clone();
            let stats = self.stats.clone();
            let (player, size) = (player.to_string(), fish.size);
            self.background("record_fish", move || {
                scores.increment(&player, &Scope::Global, 1.0)?;
                scores.increment(&player, &guild_scope, 1.0)?;
                stats.record_fish(&player, &Scope::Global, size)?;
                stats.record_fish(&player, &guild_scope, size)?;
                Ok(())
            });
        }

        tracing::debug!(
            player,
            species = %fish.name,
            tier,
            size = fish.size,
            price = fish.price,
            density = %density,
            "fish caught"
        );
        Ok(CastResult::Caught { fish, density })
    }

    fn consume_bait(&self, player: &str) {
        let bait = self.bait.clone();
        let player = player.to_string();
        self.background("consume_bait", move || {
            bait.decrement_after_catch(&player).map(|_| ())
        });
    }

    fn background<F>(&self, name: &'static str, job: F)
    where
        F: FnOnce() -> FishingResult<()> + Send + 'static,
    {
        if let Err(error) = self.tasks.submit(name, job) {
            tracing::warn!(task = name, %error, "background task dropped");
        }
    }

    /// Equips `tier` in `category` and adds `owned_variants` to the owned
    /// set. No progression check; the purchase flow decides the policy.
    pub fn buy_item(
        &self,
        player: &str,
        category: &str,
        tier: u8,
        owned_variants: &[u8],
    ) -> FishingResult<Equipment> {
        self.buy(player, category, tier, owned_variants)
            .map_err(|error| log_failure("buy_item", player, error))
    }

    fn buy(
        &self,
        player: &str,
        category: &str,
        tier: u8,
        owned_variants: &[u8],
    ) -> FishingResult<Equipment> {
        if self.profiles.is_blacklisted(player)? {
            return Err(FishingError::Blacklisted);
        }
        let category = category.parse::<EquipmentCategory>()?;
        if !(1..=MAX_TIER).contains(&tier) {
            return Err(FishingError::InvalidTier {
                what: category.as_str().to_string(),
                tier: i64::from(tier),
            });
        }

        self.equipment.set_tier(player, category, tier)?;
        self.equipment.add_owned(player, category, owned_variants)?;
        tracing::debug!(player, category = %category, tier, "item bought");
        self.equipment.get(player)
    }

    /// Moves `category` up exactly one tier.
    pub fn upgrade_item(&self, player: &str, category: &str, tier: u8) -> FishingResult<Equipment> {
        self.equipment
            .edit_tier_safe(player, category, tier)
            .and_then(|()| self.equipment.get(player))
            .map_err(|error| log_failure("upgrade_item", player, error))
    }

    /// Gear per category.
    pub fn equipment(&self, player: &str) -> FishingResult<Equipment> {
        self.equipment
            .get(player)
            .map_err(|error| log_failure("equipment", player, error))
    }

    /// Current fishing location.
    pub fn get_location(&self, player: &str) -> FishingResult<Location> {
        self.locations
            .get(player)
            .map_err(|error| log_failure("get_location", player, error))
    }

    /// Changes the fishing location.
    pub fn set_location(&self, player: &str, location: &str) -> FishingResult<Location> {
        self.locations
            .set(player, location)
            .map_err(|error| log_failure("set_location", player, error))
    }

    /// Current fish density per location.
    pub fn density(&self, player: &str) -> FishingResult<Density> {
        self.density
            .get(player)
            .map_err(|error| log_failure("density", player, error))
    }

    /// Adds bait of one tier.
    pub fn add_bait(&self, player: &str, tier: u8, amount: i64) -> FishingResult<BaitChange> {
        self.bait
            .add(player, tier, amount)
            .map_err(|error| log_failure("add_bait", player, error))
    }

    /// Equips a bait tier.
    pub fn set_equipped_bait_tier(&self, player: &str, tier: u8) -> FishingResult<()> {
        self.bait
            .set_current_tier(player, tier)
            .map_err(|error| log_failure("set_equipped_bait_tier", player, error))
    }

    /// Bait per tier.
    pub fn bait_inventory(&self, player: &str) -> FishingResult<BaitInventory> {
        self.bait
            .inventory(player)
            .map_err(|error| log_failure("bait_inventory", player, error))
    }

    /// Empties the fish inventory and returns what it held.
    pub fn sell_inventory(&self, player: &str) -> FishingResult<FishInventory> {
        self.inventory
            .sell(player)
            .map_err(|error| log_failure("sell_inventory", player, error))
    }

    /// One page of a leaderboard.
    pub fn get_score_page(&self, scope: &Scope, page: u64) -> FishingResult<Vec<ScoreEntry>> {
        self.scores.page(scope, page).map_err(|error| {
            tracing::error!(op = "get_score_page", scope = ?scope, page, %error, "operation failed");
            error
        })
    }

    /// A player's position on a leaderboard.
    pub fn get_rank(&self, player: &str, scope: &Scope) -> FishingResult<Standing> {
        self.scores
            .rank(player, scope)
            .map_err(|error| log_failure("get_rank", player, error))
    }

    /// Cast statistics of a player.
    pub fn player_stats(&self, player: &str, scope: &Scope) -> FishingResult<CastStats> {
        self.stats
            .get(player, scope)
            .map_err(|error| log_failure("player_stats", player, error))
    }

    /// Blocks a player from fishing and buying.
    pub fn blacklist(&self, player: &str) -> FishingResult<()> {
        self.profiles
            .blacklist(player)
            .map_err(|error| log_failure("blacklist", player, error))
    }

    /// Lifts a blacklist.
    pub fn unblacklist(&self, player: &str) -> FishingResult<bool> {
        self.profiles
            .unblacklist(player)
            .map_err(|error| log_failure("unblacklist", player, error))
    }

    /// Whether a player is blacklisted.
    pub fn is_blacklisted(&self, player: &str) -> FishingResult<bool> {
        self.profiles
            .is_blacklisted(player)
            .map_err(|error| log_failure("is_blacklisted", player, error))
    }

    /// Sends the player gathering bait.
    pub fn start_gather_bait(&self, player: &str) -> FishingResult<()> {
        self.profiles
            .start_gather_bait(player)
            .map_err(|error| log_failure("start_gather_bait", player, error))
    }

    /// Remaining gathering time, if any.
    pub fn check_gather_bait(&self, player: &str) -> FishingResult<Option<Duration>> {
        self.profiles
            .check_gather_bait(player)
            .map_err(|error| log_failure("check_gather_bait", player, error))
    }

    /// Stores the player's display identity.
    pub fn track_identity(&self, player: &str, identity: &Identity) -> FishingResult<()> {
        self.profiles
            .track_identity(player, identity)
            .map_err(|error| log_failure("track_identity", player, error))
    }

    /// The player's stored display identity.
    pub fn tracked_identity(&self, player: &str) -> FishingResult<Option<Identity>> {
        self.profiles
            .tracked_identity(player)
            .map_err(|error| log_failure("tracked_identity", player, error))
    }

    /// Equipment, inventory, capacities, bait and unlocked tier in one read.
    pub fn player_overview(&self, player: &str) -> FishingResult<PlayerOverview> {
        self.overview(player)
            .map_err(|error| log_failure("player_overview", player, error))
    }

    fn overview(&self, player: &str) -> FishingResult<PlayerOverview> {
        let score = self.scores.get(player, &Scope::Global)?;
        Ok(PlayerOverview {
            equipment: self.equipment.get(player)?,
            inventory: self.inventory.get(player)?,
            fish_capacity: self.inventory.capacity(player)?,
            bait_capacity: self.bait.capacity(player)?,
            bait: self.bait.inventory(player)?,
            unlocked_tier: self.catalog.levels().unlocked_tier(score),
        })
    }

    /// Usage of a tracked command.
    pub fn command_stats(&self, command: &str) -> FishingResult<CommandStats> {
        self.tracker.stats(command).map_err(|error| {
            tracing::error!(op = "command_stats", command, %error, "operation failed");
            error
        })
    }

    /// Starts pruning the configured tracked commands.
    pub fn start_maintenance(&self) -> FishingResult<MaintenanceTicker> {
        MaintenanceTicker::start(
            Arc::clone(&self.tracker),
            self.config.tracked_commands.clone(),
            self.config.maintenance_interval,
        )
    }

    /// Waits for every submitted side effect to finish.
    pub fn flush_tasks(&self) -> FishingResult<()> {
        self.tasks.flush()
    }

    /// Background task counters.
    #[must_use]
    pub fn task_stats(&self) -> TaskStats {
        self.tasks.stats()
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shared catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Shop listing of one category, cheapest tier first.
    pub fn shop_items(&self, category: &str) -> FishingResult<Vec<ItemDef>> {
        let category = category.parse::<EquipmentCategory>()?;
        Ok(self.catalog.items(category).into_iter().cloned().collect())
    }

    /// Treasure finds listed in the catalog.
    #[must_use]
    pub fn treasure(&self) -> &[Treasure] {
        self.catalog.treasure()
    }
}

impl std::fmt::Debug for FishingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FishingService")
            .field("config", &self.config)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

/// Logs infrastructure failures. Rejections are expected and stay quiet.
fn log_failure(op: &'static str, player: &str, error: FishingError) -> FishingError {
    if error.is_infrastructure() {
        tracing::error!(op, player, %error, "operation failed");
    }
    error
}
