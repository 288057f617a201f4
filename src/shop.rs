/// Shop catalogue and offer rolling.
///
/// The engine never checks whether a one-time unlock is already owned;
/// that filtering happens here, before anything is offered.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::compute::buy_item;
use crate::entities::{RunState, ShopItem, ShopItemKind};

/// How many items the shop shows per visit.
pub const OFFER_COUNT: usize = 3;

pub const SHOP_ITEMS: [ShopItem; 4] = [
    ShopItem {
        kind: ShopItemKind::DoubleJump,
        name: "HIGH HEELS HOP",
        description: "Jump again in mid-air.",
        cost: 1000,
        one_time: true,
    },
    ShopItem {
        kind: ShopItemKind::MaxLife,
        name: "EXTRA GLOW",
        description: "Permanently adds a heart slot.",
        cost: 1500,
        one_time: false,
    },
    ShopItem {
        kind: ShopItemKind::Heal,
        name: "TOUCH UP",
        description: "Restores 1 life instantly.",
        cost: 1000,
        one_time: false,
    },
    ShopItem {
        kind: ShopItemKind::Immortal,
        name: "QUEEN ENERGY",
        description: "Press Space to be invincible for 5s.",
        cost: 3000,
        one_time: true,
    },
];

fn already_owned(state: &RunState, kind: ShopItemKind) -> bool {
    match kind {
        ShopItemKind::DoubleJump => state.has_double_jump,
        ShopItemKind::Immortal => state.has_immortality,
        ShopItemKind::MaxLife | ShopItemKind::Heal => false,
    }
}

/// Items the player may still buy, in catalogue order.
pub fn available_items(state: &RunState) -> Vec<ShopItem> {
    prune_offers(state, &SHOP_ITEMS)
}

/// Pick up to `OFFER_COUNT` random offers for one shop visit.
pub fn roll_offers(state: &RunState, rng: &mut impl Rng) -> Vec<ShopItem> {
    let mut pool = available_items(state);
    pool.shuffle(rng);
    pool.truncate(OFFER_COUNT);
    pool
}

pub fn can_afford(state: &RunState, item: &ShopItem) -> bool {
    state.score >= item.cost
}

/// Buy the offer at `slot`.  An empty slot or an unaffordable item is
/// reported as a failed purchase with the state unchanged.
pub fn purchase(state: &RunState, offers: &[ShopItem], slot: usize) -> (RunState, bool) {
    match offers.get(slot) {
        Some(item) => buy_item(state, item.kind, item.cost),
        None => (state.clone(), false),
    }
}

/// Drop offers for one-time unlocks that have just been bought.
pub fn prune_offers(state: &RunState, offers: &[ShopItem]) -> Vec<ShopItem> {
    offers
        .iter()
        .filter(|item| !(item.one_time && already_owned(state, item.kind)))
        .cloned()
        .collect()
}
