use tracing::warn;

use crate::content::Catalog;

pub const DEFAULT_COINS_PER_LEVEL: u32 = 5;
pub const DEFAULT_TOTAL_COINS: u32 = 5;
pub const DEFAULT_TOTAL_XP: u32 = 10;

/// Reward metadata the catalog keeps for a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMeta {
    pub id: String,
    pub coins: Option<u32>,
    pub xp: Option<u32>,
}

/// What the caller handed over when it opened the game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    pub coins_per_level: Option<u32>,
    pub total_coins: Option<u32>,
    pub total_xp: Option<u32>,
    pub next_game_path: Option<String>,
    pub next_game_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardConfig {
    pub coins_per_level: u32,
    pub total_coins: u32,
    pub total_xp: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            coins_per_level: DEFAULT_COINS_PER_LEVEL,
            total_coins: DEFAULT_TOTAL_COINS,
            total_xp: DEFAULT_TOTAL_XP,
        }
    }
}

impl RewardConfig {
    /// Resolves each value from the game metadata, then navigation, then
    /// the defaults. Zero counts as unset at every tier.
    pub fn resolve(game_id: &str, meta: Option<&GameMeta>, nav: &Navigation) -> Self {
        if meta.is_none() {
            warn!(game = game_id, "no game metadata found, using fallback rewards");
        }
        let coins = meta.and_then(|m| m.coins).filter(|&c| c > 0);
        let xp = meta.and_then(|m| m.xp).filter(|&x| x > 0);

        Self {
            coins_per_level: first_set(&[coins, nav.coins_per_level], DEFAULT_COINS_PER_LEVEL),
            total_coins: first_set(&[coins, nav.total_coins], DEFAULT_TOTAL_COINS),
            total_xp: first_set(&[xp, nav.total_xp], DEFAULT_TOTAL_XP),
        }
    }

    /// Same as [`Self::resolve`], looking the metadata up in `catalog`.
    pub fn for_game(catalog: &Catalog, game_id: &str, nav: &Navigation) -> Self {
        let meta = catalog.lookup(game_id);
        Self::resolve(game_id, meta.as_ref(), nav)
    }

    /// Coins for a run with `correct` correct entries.
    pub fn coins_earned(&self, correct: u32) -> u32 {
        self.coins_per_level
            .saturating_mul(correct)
            .min(self.total_coins)
    }
}

fn first_set(tiers: &[Option<u32>], default: u32) -> u32 {
    tiers
        .iter()
        .flatten()
        .copied()
        .find(|&v| v > 0)
        .unwrap_or(default)
}

/// Where the shell goes after the game is over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextGame {
    pub path: Option<String>,
    pub id: Option<String>,
}

/// The navigation target wins; otherwise the game after `game_id` in the catalog.
pub fn resolve_next_game(catalog: &Catalog, game_id: &str, nav: &Navigation) -> NextGame {
    if let Some(path) = &nav.next_game_path {
        return NextGame {
            path: Some(path.clone()),
            id: nav.next_game_id.clone(),
        };
    }
    match catalog.next_after(game_id) {
        Some(next) => NextGame {
            path: Some(format!("/games/{}", next.id())),
            id: Some(next.id().to_string()),
        },
        None => NextGame::default(),
    }
}
