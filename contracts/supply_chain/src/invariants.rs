#![allow(dead_code)]

extern crate std;

use crate::types::{ItemState, Product, SettlementStatus, SettlementTask};

/// INV-1: Custody fields are only populated once the product has reached the
/// state that sets them.
pub fn assert_custody_matches_state(product: &Product) {
    let state = product.item_state;
    assert_eq!(
        product.distributor_id.is_some(),
        state >= ItemState::Sold,
        "INV-1 violated: product {} in {:?} has distributor {:?}",
        product.upc,
        state,
        product.distributor_id
    );
    assert_eq!(
        product.retailer_id.is_some(),
        state >= ItemState::Received,
        "INV-1 violated: product {} in {:?} has retailer {:?}",
        product.upc,
        state,
        product.retailer_id
    );
    assert_eq!(
        product.consumer_id.is_some(),
        state >= ItemState::Purchased,
        "INV-1 violated: product {} in {:?} has consumer {:?}",
        product.upc,
        state,
        product.consumer_id
    );
}

/// INV-2: The owner is the most recent party to take custody.
pub fn assert_owner_is_latest_custodian(product: &Product) {
    let expected = match product.item_state {
        ItemState::Purchased => product.consumer_id.clone(),
        ItemState::Received => product.retailer_id.clone(),
        ItemState::Sold | ItemState::Shipped => product.distributor_id.clone(),
        _ => Some(product.origin_farmer_id.clone()),
    };
    assert_eq!(
        Some(product.owner_id.clone()),
        expected,
        "INV-2 violated: product {} in {:?} owned by the wrong party",
        product.upc,
        product.item_state
    );
}

/// INV-3: No price before listing; a listed price is always settleable.
pub fn assert_price_matches_state(product: &Product) {
    if product.item_state < ItemState::ForSale {
        assert_eq!(
            product.product_price, 0,
            "INV-3 violated: product {} priced before listing",
            product.upc
        );
    }
    assert!(
        product.product_price <= i128::MAX as u128,
        "INV-3 violated: product {} price exceeds token range",
        product.upc
    );
}

/// INV-4: A state change is exactly one step forward.
pub fn assert_single_step(from: &ItemState, to: &ItemState) {
    assert_eq!(
        from.next(),
        Some(*to),
        "INV-4 violated: invalid state transition from {:?} to {:?}",
        from,
        to
    );
}

/// INV-5: Provenance fields never change after harvest.
pub fn assert_immutable_fields(original: &Product, current: &Product) {
    assert_eq!(original.sku, current.sku, "INV-5 violated: sku changed");
    assert_eq!(original.upc, current.upc, "INV-5 violated: upc changed");
    assert_eq!(
        original.origin_farmer_id, current.origin_farmer_id,
        "INV-5 violated: origin farmer changed"
    );
    assert_eq!(
        original.origin_farm_name, current.origin_farm_name,
        "INV-5 violated: farm name changed"
    );
    assert_eq!(
        original.origin_farm_information, current.origin_farm_information,
        "INV-5 violated: farm information changed"
    );
    assert_eq!(
        original.origin_farm_latitude, current.origin_farm_latitude,
        "INV-5 violated: latitude changed"
    );
    assert_eq!(
        original.origin_farm_longitude, current.origin_farm_longitude,
        "INV-5 violated: longitude changed"
    );
    assert_eq!(
        original.product_notes, current.product_notes,
        "INV-5 violated: notes changed"
    );
}

/// INV-6: Skus are handed out sequentially from 1, in harvest order.
pub fn assert_sequential_skus(products: &[Product]) {
    for (i, product) in products.iter().enumerate() {
        assert_eq!(
            product.sku,
            i as u64 + 1,
            "INV-6 violated: expected sku {}, got {}",
            i + 1,
            product.sku
        );
    }
}

/// INV-7: A settlement pays the origin farmer the listed price and targets the buyer.
pub fn assert_settlement_matches_sale(task: &SettlementTask, product: &Product) {
    assert_eq!(task.upc, product.upc, "INV-7 violated: upc mismatch");
    assert_eq!(
        task.recipient, product.origin_farmer_id,
        "INV-7 violated: payout not addressed to the origin farmer"
    );
    assert_eq!(
        task.amount, product.product_price,
        "INV-7 violated: payout {} differs from price {}",
        task.amount, product.product_price
    );
    assert_eq!(
        Some(task.callback_target.clone()),
        product.distributor_id,
        "INV-7 violated: continuation not targeted at the buyer"
    );
}

/// INV-8: Settlement status only moves from Pending to Completed.
pub fn assert_settlement_progress(before: &SettlementStatus, after: &SettlementStatus) {
    assert!(
        matches!(
            (before, after),
            (SettlementStatus::Pending, SettlementStatus::Pending)
                | (SettlementStatus::Pending, SettlementStatus::Completed)
                | (SettlementStatus::Completed, SettlementStatus::Completed)
        ),
        "INV-8 violated: settlement moved from {:?} to {:?}",
        before,
        after
    );
}

/// Run all stateless product invariants.
pub fn assert_all_product_invariants(product: &Product) {
    assert_custody_matches_state(product);
    assert_owner_is_latest_custodian(product);
    assert_price_matches_state(product);
}
