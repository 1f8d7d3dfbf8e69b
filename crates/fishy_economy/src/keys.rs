//! Store key layout. One record per player per logical entity.

/// Current fishing location (string).
pub fn location(player: &str) -> String {
    format!("user:location:{player}")
}

/// Per-location fish density (hash, expiring).
pub fn density(player: &str) -> String {
    format!("user:locationdensity:{player}")
}

/// Equipped tier per equipment category (hash).
pub fn equipment(player: &str) -> String {
    format!("user:inventory:{player}")
}

/// Owned variants of one equipment category (set).
pub fn owned(player: &str, category: &str) -> String {
    format!("user:inventory:{player}:{category}")
}

/// Bait count per tier (hash).
pub fn bait(player: &str) -> String {
    format!("bait:inventory:{player}")
}

/// Equipped bait tier (string).
pub fn bait_tier(player: &str) -> String {
    format!("bait:tier:{player}")
}

/// Fish inventory counters (hash).
pub fn fish_inventory(player: &str) -> String {
    format!("fish:{player}")
}

/// Global leaderboard (sorted set).
pub const GLOBAL_SCORE: &str = "exp:global";

/// Guild leaderboard (sorted set).
pub fn guild_score(guild: &str) -> String {
    format!("exp:guild:{guild}")
}

/// Command cooldown marker (string, expiring).
pub fn rate_limit(command: &str, player: &str) -> String {
    format!("ratelimit:{command}:{player}")
}

/// Blacklist flag (string).
pub fn blacklist(player: &str) -> String {
    format!("user:blacklist:{player}")
}

/// Bait-gathering timer (string, expiring).
pub fn gather_bait(player: &str) -> String {
    format!("user:gatherbait:{player}")
}

/// Tracked display identity (hash).
pub fn identity(player: &str) -> String {
    format!("user:{player}")
}

/// Global cast statistics (hash).
pub fn global_stats(player: &str) -> String {
    format!("statistics:global:{player}")
}

/// Guild cast statistics (hash).
pub fn guild_stats(guild: &str, player: &str) -> String {
    format!("statistics:{guild}:{player}")
}

/// Lifetime invocation count of a command (string counter).
pub fn tracking_total(command: &str) -> String {
    format!("tracking:total:{command}")
}

/// Invocations in the last hour (sorted set scored by unix time).
pub fn tracking_hourly(command: &str) -> String {
    format!("tracking:hourly:{command}")
}

/// Invocations in the last day (sorted set scored by unix time).
pub fn tracking_daily(command: &str) -> String {
    format!("tracking:daily:{command}")
}
