//! # Types
//!
//! Shared data structures used across all modules of the supply chain contract.
//!
//! ## Item state as a Finite-State Machine
//!
//! [`ItemState`] enforces a strict forward-only lifecycle, one step per call:
//!
//! ```text
//! Harvested ──► Processed ──► Packed ──► ForSale ──► Sold ──► Shipped ──► Received ──► Purchased
//! ```
//!
//! Backward transitions, skipped states and transitions out of `Purchased` are
//! rejected by [`crate::lifecycle::advance`].
//!
//! ## Settlement tasks
//!
//! A purchase by a distributor pays the farmer inside the same invocation and
//! leaves behind a [`SettlementTask`]. The task is the scheduled continuation:
//! an off-chain scheduler calls `on_payout_complete` on behalf of the task's
//! `callback_target` once the payout has been acknowledged.

use soroban_sdk::{contracttype, Address, String, Symbol};

/// Lifecycle state of a product, in required order.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum ItemState {
    /// Picked by the farmer; the record was just created.
    Harvested,
    Processed,
    Packed,
    /// Listed by the farmer at `product_price`.
    ForSale,
    /// Bought and paid for by a distributor.
    Sold,
    Shipped,
    /// Taken in by a retailer.
    Received,
    /// Bought by the end consumer. Terminal.
    Purchased,
}

impl ItemState {
    /// The state that directly follows `self`, or `None` for `Purchased`.
    pub fn next(self) -> Option<ItemState> {
        match self {
            ItemState::Harvested => Some(ItemState::Processed),
            ItemState::Processed => Some(ItemState::Packed),
            ItemState::Packed => Some(ItemState::ForSale),
            ItemState::ForSale => Some(ItemState::Sold),
            ItemState::Sold => Some(ItemState::Shipped),
            ItemState::Shipped => Some(ItemState::Received),
            ItemState::Received => Some(ItemState::Purchased),
            ItemState::Purchased => None,
        }
    }
}

/// Full on-chain record of one product, keyed by `upc`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Product {
    /// Internal sequence number (auto-incremented, starts at 1).
    pub sku: u64,
    /// External product code; the lookup key.
    pub upc: u64,
    /// Farmer who harvested the product.
    pub origin_farmer_id: Address,
    pub origin_farm_name: String,
    pub origin_farm_information: String,
    pub origin_farm_latitude: String,
    pub origin_farm_longitude: String,
    pub product_notes: String,
    /// Sale price set by the farmer; zero until listed.
    pub product_price: u128,
    /// Current lifecycle state.
    pub item_state: ItemState,
    pub distributor_id: Option<Address>,
    pub retailer_id: Option<Address>,
    pub consumer_id: Option<Address>,
    /// Current custodian.
    pub owner_id: Address,
}

/// Whether a scheduled payout continuation has run.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SettlementStatus {
    Pending,
    Completed,
}

/// Payout follow-up scheduled by `buy_item`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SettlementTask {
    pub upc: u64,
    /// Origin farmer who was paid.
    pub recipient: Address,
    pub amount: u128,
    /// The buyer; the continuation runs against this identity.
    pub callback_target: Address,
    /// Entry point the scheduler invokes, always `on_payout_complete`.
    pub callback: Symbol,
    /// CPU instructions to reserve when submitting the continuation.
    pub budget: u64,
    pub status: SettlementStatus,
}
