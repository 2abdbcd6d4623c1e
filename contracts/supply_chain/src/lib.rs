//! # Supply Chain Contract
//!
//! Tracks coffee through a fixed custody chain (farmer, distributor,
//! retailer, consumer). It exposes the single Soroban contract `SupplyChain`
//! whose entry points cover the full product lifecycle:
//!
//! | Phase        | Entry Point(s)                                        | Caller          |
//! |--------------|-------------------------------------------------------|-----------------|
//! | Deployment   | `__constructor`                                       | deployer        |
//! | Farm         | `harvest_item`, `process_item`, `pack_item`, `sell_item` | origin farmer |
//! | Purchase     | [`SupplyChain::buy_item`]                             | any buyer       |
//! | Distribution | `ship_item`                                           | distributor     |
//! | Retail       | `receive_item`, `purchase_item`                       | retailer        |
//! | Settlement   | [`SupplyChain::on_payout_complete`]                   | buyer           |
//! | Queries      | `get_product`, `list_products`, `get_settlement`, `next_sku`, `payment_token` | anyone |
//!
//! ## Architecture
//!
//! Precondition checks live in [`lifecycle`], storage access in [`storage`]
//! and event shapes in [`events`]. Every entry point loads one record, runs
//! all of its checks, and only then mutates and writes back. A returned
//! [`Error`] aborts the invocation, so the host discards every write and
//! token transfer made before it.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, token, Address, Env, Map, String, Symbol,
};

mod events;
mod lifecycle;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_settlement;

pub use events::{ItemHarvested, ItemListed, ItemSold, ItemTransition, PayoutCompleted};
pub use types::{ItemState, Product, SettlementStatus, SettlementTask};

use lifecycle::{advance, require_caller, require_payment, require_state};

/// Entry point the scheduler invokes once a payout has settled.
pub const PAYOUT_CALLBACK: &str = "on_payout_complete";

/// CPU instructions the scheduler should reserve when it submits the
/// `on_payout_complete` continuation. Equal to the network's per-transaction
/// instruction ceiling; the contract itself never meters against it.
pub const PAYOUT_CALLBACK_BUDGET: u64 = 100_000_000;

/// Largest page `list_products` returns.
pub const MAX_PAGE_SIZE: u32 = 50;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    ProductNotFound            = 1,
    InvalidStateTransition     = 2,
    Unauthorized               = 3,
    InsufficientPayment        = 4,
    ProductAlreadyExists       = 5,
    NotInitialized             = 6,
    InvalidAmount              = 7,
    SettlementNotFound         = 8,
    SettlementAlreadyCompleted = 9,
}

/// Token amounts are `i128`; prices above `i128::MAX` cannot be settled.
fn to_token_amount(amount: u128) -> Result<i128, Error> {
    i128::try_from(amount).map_err(|_| Error::InvalidAmount)
}

#[contract]
pub struct SupplyChain;

#[contractimpl]
impl SupplyChain {
    // ─────────────────────────────────────────────────────────
    // Deployment
    // ─────────────────────────────────────────────────────────

    /// Fix the token contract purchases are settled in.
    ///
    /// Runs once, atomically with deployment, so the token can never be
    /// chosen or replaced by a later caller.
    pub fn __constructor(env: Env, payment_token: Address) {
        storage::set_payment_token(&env, &payment_token);
    }

    // ─────────────────────────────────────────────────────────
    // Farm
    // ─────────────────────────────────────────────────────────

    /// Create the record for a freshly harvested product.
    ///
    /// The farmer becomes the first owner. A upc can only be harvested once.
    #[allow(clippy::too_many_arguments)]
    pub fn harvest_item(
        env: Env,
        upc: u64,
        origin_farmer_id: Address,
        origin_farm_name: String,
        origin_farm_information: String,
        origin_farm_latitude: String,
        origin_farm_longitude: String,
        product_notes: String,
    ) -> Result<Product, Error> {
        if storage::has_product(&env, upc) {
            return Err(Error::ProductAlreadyExists);
        }

        let sku = storage::get_and_increment_sku(&env);
        let product = Product {
            sku,
            upc,
            origin_farmer_id: origin_farmer_id.clone(),
            origin_farm_name,
            origin_farm_information,
            origin_farm_latitude,
            origin_farm_longitude,
            product_notes,
            product_price: 0,
            item_state: ItemState::Harvested,
            distributor_id: None,
            retailer_id: None,
            consumer_id: None,
            owner_id: origin_farmer_id.clone(),
        };

        storage::insert_product(&env, &product);
        events::emit_harvested(&env, upc, sku, origin_farmer_id);
        Ok(product)
    }

    /// Mark a harvested product `Processed`. Origin farmer only.
    pub fn process_item(env: Env, upc: u64, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        let mut product = storage::load_product(&env, upc)?;
        require_state(&product, ItemState::Harvested)?;
        require_caller(&caller, Some(&product.origin_farmer_id))?;

        let state = advance(&mut product)?;
        storage::save_product(&env, &product);
        events::emit_transition(&env, events::PROCESS, upc, caller, state);
        Ok(())
    }

    /// Mark a processed product `Packed`. Origin farmer only.
    pub fn pack_item(env: Env, upc: u64, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        let mut product = storage::load_product(&env, upc)?;
        require_state(&product, ItemState::Processed)?;
        require_caller(&caller, Some(&product.origin_farmer_id))?;

        let state = advance(&mut product)?;
        storage::save_product(&env, &product);
        events::emit_transition(&env, events::PACK, upc, caller, state);
        Ok(())
    }

    /// List a packed product for sale at `price`. Origin farmer only.
    pub fn sell_item(env: Env, upc: u64, caller: Address, price: u128) -> Result<(), Error> {
        caller.require_auth();
        let mut product = storage::load_product(&env, upc)?;
        require_state(&product, ItemState::Packed)?;
        require_caller(&caller, Some(&product.origin_farmer_id))?;
        to_token_amount(price)?;

        product.product_price = price;
        advance(&mut product)?;
        storage::save_product(&env, &product);
        events::emit_listed(&env, upc, caller, price);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Purchase
    // ─────────────────────────────────────────────────────────

    /// Buy a listed product.
    ///
    /// `payment` is escrowed from the caller into the contract, the listed
    /// price is paid out to the origin farmer and the remainder goes back to
    /// the caller, all inside this invocation. The caller becomes distributor
    /// and owner. The returned [`SettlementTask`] is also stored and
    /// published so the scheduler can run `on_payout_complete` later.
    pub fn buy_item(
        env: Env,
        upc: u64,
        caller: Address,
        payment: u128,
    ) -> Result<SettlementTask, Error> {
        caller.require_auth();
        let mut product = storage::load_product(&env, upc)?;
        require_state(&product, ItemState::ForSale)?;
        require_payment(&product, payment)?;

        let escrow = to_token_amount(payment)?;
        let price = to_token_amount(product.product_price)?;
        let token_client = token::Client::new(&env, &storage::get_payment_token(&env)?);
        let contract = env.current_contract_address();

        if escrow > 0 {
            token_client.transfer(&caller, &contract, &escrow);
        }
        if price > 0 {
            token_client.transfer(&contract, &product.origin_farmer_id, &price);
        }
        let change = escrow - price;
        if change > 0 {
            token_client.transfer(&contract, &caller, &change);
        }

        advance(&mut product)?;
        product.distributor_id = Some(caller.clone());
        product.owner_id = caller.clone();
        storage::save_product(&env, &product);

        let task = SettlementTask {
            upc,
            recipient: product.origin_farmer_id.clone(),
            amount: product.product_price,
            callback_target: caller.clone(),
            callback: Symbol::new(&env, PAYOUT_CALLBACK),
            budget: PAYOUT_CALLBACK_BUDGET,
            status: SettlementStatus::Pending,
        };
        storage::save_settlement(&env, &task);

        events::emit_sold(&env, upc, caller, product.product_price);
        events::emit_payout_scheduled(&env, &task);
        Ok(task)
    }

    // ─────────────────────────────────────────────────────────
    // Distribution and retail
    // ─────────────────────────────────────────────────────────

    /// Mark a sold product `Shipped`. Distributor only.
    pub fn ship_item(env: Env, upc: u64, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        let mut product = storage::load_product(&env, upc)?;
        require_state(&product, ItemState::Sold)?;
        require_caller(&caller, product.distributor_id.as_ref())?;

        let state = advance(&mut product)?;
        storage::save_product(&env, &product);
        events::emit_transition(&env, events::SHIP, upc, caller, state);
        Ok(())
    }

    /// Take in a shipped product. Open to any authenticated retailer, who
    /// becomes owner.
    pub fn receive_item(env: Env, upc: u64, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        let mut product = storage::load_product(&env, upc)?;
        require_state(&product, ItemState::Shipped)?;

        let state = advance(&mut product)?;
        product.retailer_id = Some(caller.clone());
        product.owner_id = caller.clone();
        storage::save_product(&env, &product);
        events::emit_transition(&env, events::RECEIVE, upc, caller, state);
        Ok(())
    }

    /// Mark a received product `Purchased`. Retailer only; the caller is
    /// recorded as consumer and owner.
    pub fn purchase_item(env: Env, upc: u64, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        let mut product = storage::load_product(&env, upc)?;
        require_state(&product, ItemState::Received)?;
        require_caller(&caller, product.retailer_id.as_ref())?;

        let state = advance(&mut product)?;
        product.consumer_id = Some(caller.clone());
        product.owner_id = caller.clone();
        storage::save_product(&env, &product);
        events::emit_transition(&env, events::PURCHASE, upc, caller, state);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Settlement
    // ─────────────────────────────────────────────────────────

    /// Acknowledge that the payout scheduled by `buy_item` has settled.
    ///
    /// Runs against the buyer's identity. Only flips the task to
    /// `Completed`; the product record is left alone.
    pub fn on_payout_complete(env: Env, upc: u64, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        let mut task = storage::find_settlement(&env, upc).ok_or(Error::SettlementNotFound)?;
        require_caller(&caller, Some(&task.callback_target))?;
        if task.status == SettlementStatus::Completed {
            return Err(Error::SettlementAlreadyCompleted);
        }

        task.status = SettlementStatus::Completed;
        storage::save_settlement(&env, &task);
        events::emit_payout_completed(&env, &task);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn get_product(env: Env, upc: u64) -> Option<Product> {
        storage::find_product(&env, upc)
    }

    /// One page of products keyed by upc.
    ///
    /// `start` is the zero-based position in harvest order. At most
    /// [`MAX_PAGE_SIZE`] records are returned however large `limit` is.
    pub fn list_products(env: Env, start: u64, limit: u32) -> Map<u64, Product> {
        let mut products = Map::new(&env);
        let first = storage::FIRST_SKU.saturating_add(start);
        let end = first
            .saturating_add(u64::from(limit.min(MAX_PAGE_SIZE)))
            .min(storage::peek_next_sku(&env));
        for sku in first..end {
            let Some(upc) = storage::find_upc_by_sku(&env, sku) else {
                continue;
            };
            if let Some(product) = storage::find_product(&env, upc) {
                products.set(upc, product);
            }
        }
        products
    }

    pub fn get_settlement(env: Env, upc: u64) -> Option<SettlementTask> {
        storage::find_settlement(&env, upc)
    }

    /// The sku the next harvested product will receive.
    pub fn next_sku(env: Env) -> u64 {
        storage::peek_next_sku(&env)
    }

    pub fn payment_token(env: Env) -> Result<Address, Error> {
        storage::get_payment_token(&env)
    }
}
