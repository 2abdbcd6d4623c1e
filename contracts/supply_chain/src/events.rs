//! Contract events.
//!
//! Every successful mutation publishes one event whose topics are
//! `(symbol, upc)`, except `buy_item`, which publishes `sold` followed by
//! `payout`. The off-chain indexer keys on the leading symbol.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::types::{ItemState, SettlementTask};

pub const HARVEST: Symbol = symbol_short!("harvest");
pub const PROCESS: Symbol = symbol_short!("process");
pub const PACK: Symbol = symbol_short!("pack");
pub const FOR_SALE: Symbol = symbol_short!("for_sale");
pub const SOLD: Symbol = symbol_short!("sold");
pub const SHIP: Symbol = symbol_short!("ship");
pub const RECEIVE: Symbol = symbol_short!("receive");
pub const PURCHASE: Symbol = symbol_short!("purchase");
pub const PAYOUT: Symbol = symbol_short!("payout");
pub const SETTLED: Symbol = symbol_short!("settled");

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ItemHarvested {
    pub upc: u64,
    pub sku: u64,
    pub farmer: Address,
}

/// A custody step that carries no payload beyond who performed it.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ItemTransition {
    pub upc: u64,
    pub actor: Address,
    pub state: ItemState,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ItemListed {
    pub upc: u64,
    pub farmer: Address,
    pub price: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ItemSold {
    pub upc: u64,
    pub distributor: Address,
    pub price: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PayoutCompleted {
    pub upc: u64,
    pub recipient: Address,
    pub amount: u128,
}

pub fn emit_harvested(env: &Env, upc: u64, sku: u64, farmer: Address) {
    env.events()
        .publish((HARVEST, upc), ItemHarvested { upc, sku, farmer });
}

pub fn emit_transition(env: &Env, topic: Symbol, upc: u64, actor: Address, state: ItemState) {
    env.events()
        .publish((topic, upc), ItemTransition { upc, actor, state });
}

pub fn emit_listed(env: &Env, upc: u64, farmer: Address, price: u128) {
    env.events()
        .publish((FOR_SALE, upc), ItemListed { upc, farmer, price });
}

pub fn emit_sold(env: &Env, upc: u64, distributor: Address, price: u128) {
    env.events().publish(
        (SOLD, upc),
        ItemSold {
            upc,
            distributor,
            price,
        },
    );
}

/// Publish the scheduled continuation so the off-chain scheduler can pick it up.
pub fn emit_payout_scheduled(env: &Env, task: &SettlementTask) {
    env.events().publish((PAYOUT, task.upc), task.clone());
}

pub fn emit_payout_completed(env: &Env, task: &SettlementTask) {
    env.events().publish(
        (SETTLED, task.upc),
        PayoutCompleted {
            upc: task.upc,
            recipient: task.recipient.clone(),
            amount: task.amount,
        },
    );
}
