//! Event types emitted by the supply chain contract.
//!
//! These mirror the topics published from `contracts/supply_chain/src/events.rs`.
//! Every contract event carries `(symbol, upc)` topics.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the supply chain contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A product record was created (`harvest` topic).
    Harvested,
    Processed,
    Packed,
    /// The farmer listed the product (`for_sale` topic).
    Listed,
    /// A distributor bought and paid (`sold` topic).
    Sold,
    Shipped,
    Received,
    Purchased,
    /// A payout continuation was scheduled (`payout` topic).
    PayoutScheduled,
    /// The continuation ran (`settled` topic).
    PayoutCompleted,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "harvest" => Self::Harvested,
            "process" => Self::Processed,
            "pack" => Self::Packed,
            "for_sale" => Self::Listed,
            "sold" => Self::Sold,
            "ship" => Self::Shipped,
            "receive" => Self::Received,
            "purchase" => Self::Purchased,
            "payout" => Self::PayoutScheduled,
            "settled" => Self::PayoutCompleted,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Harvested => "item_harvested",
            Self::Processed => "item_processed",
            Self::Packed => "item_packed",
            Self::Listed => "item_listed",
            Self::Sold => "item_sold",
            Self::Shipped => "item_shipped",
            Self::Received => "item_received",
            Self::Purchased => "item_purchased",
            Self::PayoutScheduled => "payout_scheduled",
            Self::PayoutCompleted => "payout_completed",
            Self::Unknown => "unknown",
        }
    }

    /// Data-map keys that name the acting party, in lookup order.
    pub fn actor_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Harvested | Self::Listed => &["farmer"],
            Self::Sold => &["distributor"],
            Self::Processed | Self::Packed | Self::Shipped | Self::Received | Self::Purchased => {
                &["actor"]
            }
            Self::PayoutScheduled => &["callback_target"],
            Self::PayoutCompleted => &["recipient"],
            Self::Unknown => &[],
        }
    }

    /// Data-map keys that carry a token amount, in lookup order.
    pub fn amount_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Listed | Self::Sold => &["price"],
            Self::PayoutScheduled | Self::PayoutCompleted => &["amount"],
            _ => &[],
        }
    }
}

/// A fully decoded contract event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// RPC event id; the de-duplication key.
    pub event_id: String,
    pub event_type: String,
    pub upc: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub upc: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
