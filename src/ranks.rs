//! Rank medal artwork shipped with the page overlay.
//!
//! A season rank ("tier") packs the medal and the star count into one
//! number: `45` is medal 4 with 5 stars. Tier 80 is Immortal, whose medal
//! variant depends on the player's leaderboard position.

pub const IMMORTAL_TIER: u32 = 80;

const RANKS_DIR: &str = "images/ranks";
const IMMORTAL_MEDAL: &str = "images/ranks/medal_8.png";
const IMMORTAL_TOP_100_MEDAL: &str = "images/ranks/medal_8b.png";
const IMMORTAL_TOP_10_MEDAL: &str = "images/ranks/medal_8c.png";

pub fn medal_image(tier: u32) -> String {
    if tier == IMMORTAL_TIER {
        return IMMORTAL_MEDAL.to_string();
    }
    format!("{}/medal_{}.png", RANKS_DIR, tier / 10)
}

/// Empty when the tier has no stars to show.
pub fn star_image(tier: u32) -> String {
    let stars = tier % 10;
    if tier == 0 || tier >= IMMORTAL_TIER || stars == 0 {
        return String::new();
    }
    format!("{}/star_{}.png", RANKS_DIR, stars)
}

/// Only Immortal players with a known leaderboard position get one.
pub fn leaderboard_medal_image(tier: u32, leaderboard_rank: Option<u32>) -> String {
    match (tier, leaderboard_rank) {
        (IMMORTAL_TIER, Some(rank)) if rank <= 10 => IMMORTAL_TOP_10_MEDAL.to_string(),
        (IMMORTAL_TIER, Some(rank)) if rank <= 100 => IMMORTAL_TOP_100_MEDAL.to_string(),
        (IMMORTAL_TIER, Some(_)) => IMMORTAL_MEDAL.to_string(),
        _ => String::new(),
    }
}
