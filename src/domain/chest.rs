//! Loot chests.
//!
//! Opening a chest yields two or three independent rewards. Each reward first
//! picks a rarity by weight, then one of that rarity's reward generators, which
//! rolls a bounded amount. Duplicates are expected.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Rarity bands, from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Weight 70.
    Common,
    /// Weight 22.
    Uncommon,
    /// Weight 7.
    Rare,
    /// Weight 1.
    Epic,
}

impl Rarity {
    /// Every rarity in roll order.
    pub const ALL: [Self; 4] = [Self::Common, Self::Uncommon, Self::Rare, Self::Epic];

    /// Relative selection weight.
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::Common => 70,
            Self::Uncommon => 22,
            Self::Rare => 7,
            Self::Epic => 1,
        }
    }

    /// Reward generators available at this rarity.
    #[must_use]
    pub const fn pool(self) -> &'static [RewardGenerator] {
        match self {
            Self::Common => COMMON_POOL,
            Self::Uncommon => UNCOMMON_POOL,
            Self::Rare => RARE_POOL,
            Self::Epic => EPIC_POOL,
        }
    }
}

/// Inventory items a chest can drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Restores a little HP.
    SmallPotion,
    /// Restores a moderate amount of HP.
    MediumPotion,
    /// Restores a lot of HP.
    LargePotion,
    /// Cheap attack item.
    Knife,
    /// Basic attack unit.
    Soldier,
    /// Mid-tier attack item.
    Gun,
    /// Blocks incoming attacks for a while.
    Firewall,
    /// Reduces incoming damage.
    Kevlar,
    /// High-tier attack unit.
    Drone,
    /// Top-tier attack item.
    Nuke,
}

/// What a loot entry pays out. On the wire the variant is `type` and the
/// item, when there is one, is `item_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "item_type", rename_all = "snake_case")]
pub enum LootKind {
    /// Spit credited to the wallet.
    Credits,
    /// Gold credited to the wallet.
    Gold,
    /// Items of the given type added to the inventory.
    Item(ItemType),
}

/// One reward produced by opening a chest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChestLootReward {
    /// Payout kind.
    #[serde(flatten)]
    pub kind: LootKind,
    /// Quantity; always at least one.
    pub amount: u32,
    /// Rarity band the reward was drawn from.
    pub rarity: Rarity,
}

/// A reward template with an inclusive amount range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardGenerator {
    /// Spit between `min` and `max`.
    Credits {
        /// Lowest amount.
        min: u32,
        /// Highest amount.
        max: u32,
    },
    /// Gold between `min` and `max`.
    Gold {
        /// Lowest amount.
        min: u32,
        /// Highest amount.
        max: u32,
    },
    /// Between `min` and `max` copies of `item`.
    Item {
        /// Item dropped.
        item: ItemType,
        /// Lowest count.
        min: u32,
        /// Highest count.
        max: u32,
    },
}

const COMMON_POOL: &[RewardGenerator] = &[
    RewardGenerator::Credits { min: 5, max: 15 },
    RewardGenerator::Credits { min: 10, max: 25 },
    RewardGenerator::Item {
        item: ItemType::SmallPotion,
        min: 1,
        max: 2,
    },
    RewardGenerator::Item {
        item: ItemType::Knife,
        min: 1,
        max: 1,
    },
];

const UNCOMMON_POOL: &[RewardGenerator] = &[
    RewardGenerator::Credits { min: 25, max: 60 },
    RewardGenerator::Gold { min: 1, max: 3 },
    RewardGenerator::Item {
        item: ItemType::MediumPotion,
        min: 1,
        max: 1,
    },
    RewardGenerator::Item {
        item: ItemType::Soldier,
        min: 1,
        max: 2,
    },
];

const RARE_POOL: &[RewardGenerator] = &[
    RewardGenerator::Credits { min: 75, max: 150 },
    RewardGenerator::Gold { min: 3, max: 8 },
    RewardGenerator::Item {
        item: ItemType::LargePotion,
        min: 1,
        max: 1,
    },
    RewardGenerator::Item {
        item: ItemType::Gun,
        min: 1,
        max: 1,
    },
    RewardGenerator::Item {
        item: ItemType::Firewall,
        min: 1,
        max: 1,
    },
    RewardGenerator::Item {
        item: ItemType::Kevlar,
        min: 1,
        max: 1,
    },
];

const EPIC_POOL: &[RewardGenerator] = &[
    RewardGenerator::Credits { min: 200, max: 500 },
    RewardGenerator::Gold { min: 10, max: 25 },
    RewardGenerator::Item {
        item: ItemType::Drone,
        min: 1,
        max: 1,
    },
    RewardGenerator::Item {
        item: ItemType::Nuke,
        min: 1,
        max: 1,
    },
];

impl RewardGenerator {
    /// Rolls a concrete reward tagged with `rarity`.
    pub fn generate<R: Rng + ?Sized>(self, rarity: Rarity, rng: &mut R) -> ChestLootReward {
        let (kind, min, max) = match self {
            Self::Credits { min, max } => (LootKind::Credits, min, max),
            Self::Gold { min, max } => (LootKind::Gold, min, max),
            Self::Item { item, min, max } => (LootKind::Item(item), min, max),
        };
        let low = min.max(1);
        let high = max.max(low);
        ChestLootReward {
            kind,
            amount: rng.random_range(low..=high),
            rarity,
        }
    }
}

/// Picks a rarity by cumulative weight.
pub fn roll_rarity<R: Rng + ?Sized>(rng: &mut R) -> Rarity {
    let total: u32 = Rarity::ALL.iter().map(|r| r.weight()).sum();
    let draw = rng.random_range(0..total);
    let mut cumulative = 0;
    Rarity::ALL
        .into_iter()
        .find(|r| {
            cumulative += r.weight();
            draw < cumulative
        })
        .unwrap_or(Rarity::Epic)
}

/// Rolls the contents of one chest: two or three rewards.
pub fn roll_loot<R: Rng + ?Sized>(rng: &mut R) -> Vec<ChestLootReward> {
    let count = rng.random_range(2..=3);
    (0..count)
        .map(|_| {
            let rarity = roll_rarity(rng);
            let generator = rarity
                .pool()
                .choose(rng)
                .copied()
                .unwrap_or(RewardGenerator::Credits { min: 1, max: 1 });
            generator.generate(rarity, rng)
        })
        .collect()
}

/// Rolls one chest with the thread-local RNG.
#[must_use]
pub fn roll_chest_loot() -> Vec<ChestLootReward> {
    roll_loot(&mut rand::rng())
}
