//! # Lifecycle guards
//!
//! Precondition checks shared by every transition entry point. Each guard
//! returns an [`Error`] instead of mutating, so an entry point can run all of
//! its checks before it touches the record.
//!
//! Checks run in a fixed order: existence (done by the storage loader), state,
//! then identity or payment.

use soroban_sdk::Address;

use crate::types::{ItemState, Product};
use crate::Error;

/// True when `caller` is the party the record expects. An unset party never matches.
pub fn caller_matches(caller: &Address, expected: Option<&Address>) -> bool {
    expected.map_or(false, |expected| caller == expected)
}

/// Fail with `InvalidStateTransition` unless the record is exactly in `expected`.
pub fn require_state(product: &Product, expected: ItemState) -> Result<(), Error> {
    if product.item_state != expected {
        return Err(Error::InvalidStateTransition);
    }
    Ok(())
}

/// Fail with `Unauthorized` unless `caller` is the expected party.
pub fn require_caller(caller: &Address, expected: Option<&Address>) -> Result<(), Error> {
    if !caller_matches(caller, expected) {
        return Err(Error::Unauthorized);
    }
    Ok(())
}

/// Fail with `InsufficientPayment` when the payment does not cover the price.
pub fn require_payment(product: &Product, payment: u128) -> Result<(), Error> {
    if payment < product.product_price {
        return Err(Error::InsufficientPayment);
    }
    Ok(())
}

/// Move the record exactly one step forward and return the new state.
pub fn advance(product: &mut Product) -> Result<ItemState, Error> {
    let next = product
        .item_state
        .next()
        .ok_or(Error::InvalidStateTransition)?;
    product.item_state = next;
    Ok(next)
}
