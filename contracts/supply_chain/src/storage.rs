//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by the ledger:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key            | Type       | Description                               |
//! |----------------|------------|-------------------------------------------|
//! | `SkuCounter`   | `u64`      | Next sku to assign                        |
//! | `PaymentToken` | `Address`  | Token contract fixed at deployment        |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key               | Type             | Description                    |
//! |-------------------|------------------|--------------------------------|
//! | `Product(upc)`    | `Product`        | Product record                 |
//! | `SkuUpc(sku)`     | `u64`            | upc harvested under that sku   |
//! | `Settlement(upc)` | `SettlementTask` | Payout continuation for a sale |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! The host cannot enumerate persistent keys. Skus are dense, so `SkuUpc`
//! entries let `list_products` walk harvest order one bounded page at a time
//! without any entry that grows with the product count.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{Product, SettlementTask};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

/// First sku handed out on a fresh ledger.
pub const FIRST_SKU: u64 = 1;

// ── Storage Keys ─────────────────────────────────────────────────────

/// All contract storage keys.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Next sku counter (Instance).
    SkuCounter,
    /// Settlement token address (Instance).
    PaymentToken,
    /// Product record keyed by upc (Persistent).
    Product(u64),
    /// upc of the product harvested under a sku (Persistent).
    SkuUpc(u64),
    /// Settlement task keyed by upc (Persistent).
    Settlement(u64),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Reads, increments, and stores the sku counter.
/// Returns the sku for the *current* product (pre-increment value).
pub fn get_and_increment_sku(env: &Env) -> u64 {
    bump_instance(env);
    let current: u64 = env
        .storage()
        .instance()
        .get(&DataKey::SkuCounter)
        .unwrap_or(FIRST_SKU);
    env.storage()
        .instance()
        .set(&DataKey::SkuCounter, &(current + 1));
    current
}

/// The sku the next harvested product will receive.
pub fn peek_next_sku(env: &Env) -> u64 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::SkuCounter)
        .unwrap_or(FIRST_SKU)
}

pub fn set_payment_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::PaymentToken, token);
    bump_instance(env);
}

/// Retrieve the settlement token, or `NotInitialized` if the entry is missing.
pub fn get_payment_token(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::PaymentToken)
        .ok_or(Error::NotInitialized)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

pub fn has_product(env: &Env, upc: u64) -> bool {
    env.storage().persistent().has(&DataKey::Product(upc))
}

/// Store a freshly harvested product and map its sku back to the upc.
pub fn insert_product(env: &Env, product: &Product) {
    save_product(env, product);
    let key = DataKey::SkuUpc(product.sku);
    env.storage().persistent().set(&key, &product.upc);
    bump_persistent(env, &key);
}

/// Overwrite an existing product record.
pub fn save_product(env: &Env, product: &Product) {
    let key = DataKey::Product(product.upc);
    env.storage().persistent().set(&key, product);
    bump_persistent(env, &key);
}

/// Load a product record, `None` if the upc was never harvested.
pub fn find_product(env: &Env, upc: u64) -> Option<Product> {
    let key = DataKey::Product(upc);
    let product: Option<Product> = env.storage().persistent().get(&key);
    if product.is_some() {
        bump_persistent(env, &key);
    }
    product
}

/// upc harvested under `sku`, if that sku has been handed out.
pub fn find_upc_by_sku(env: &Env, sku: u64) -> Option<u64> {
    let key = DataKey::SkuUpc(sku);
    let upc: Option<u64> = env.storage().persistent().get(&key);
    if upc.is_some() {
        bump_persistent(env, &key);
    }
    upc
}

/// Load a product record or fail with `ProductNotFound`.
pub fn load_product(env: &Env, upc: u64) -> Result<Product, Error> {
    find_product(env, upc).ok_or(Error::ProductNotFound)
}

pub fn save_settlement(env: &Env, task: &SettlementTask) {
    let key = DataKey::Settlement(task.upc);
    env.storage().persistent().set(&key, task);
    bump_persistent(env, &key);
}

pub fn find_settlement(env: &Env, upc: u64) -> Option<SettlementTask> {
    let key = DataKey::Settlement(upc);
    let task: Option<SettlementTask> = env.storage().persistent().get(&key);
    if task.is_some() {
        bump_persistent(env, &key);
    }
    task
}
