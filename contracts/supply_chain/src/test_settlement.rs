extern crate std;

use soroban_sdk::{testutils::Address as _, token, Address, Env, String, Symbol};

use crate::invariants::{assert_settlement_matches_sale, assert_settlement_progress};
use crate::{
    Error, SettlementStatus, SupplyChain, SupplyChainClient, PAYOUT_CALLBACK,
    PAYOUT_CALLBACK_BUDGET,
};

const UPC: u64 = 7;
const PRICE: u128 = 900;

struct Fixture {
    env: Env,
    client: SupplyChainClient<'static>,
    token: token::Client<'static>,
    farmer: Address,
    buyer: Address,
}

fn listed_product() -> Fixture {
    let env = Env::default();
    env.mock_all_auths();
    let token_admin = Address::generate(&env);
    let sac = env.register_stellar_asset_contract_v2(token_admin);
    let contract_id = env.register(SupplyChain, (sac.address(),));
    let client = SupplyChainClient::new(&env, &contract_id);

    let farmer = Address::generate(&env);
    let buyer = Address::generate(&env);
    token::StellarAssetClient::new(&env, &sac.address()).mint(&buyer, &10_000);

    client.harvest_item(
        &UPC,
        &farmer,
        &String::from_str(&env, "Kiambu Estate"),
        &String::from_str(&env, "Central Kenya"),
        &String::from_str(&env, "-1.171"),
        &String::from_str(&env, "36.835"),
        &String::from_str(&env, "SL28"),
    );
    client.process_item(&UPC, &farmer);
    client.pack_item(&UPC, &farmer);
    client.sell_item(&UPC, &farmer, &PRICE);

    let token = token::Client::new(&env, &sac.address());
    Fixture {
        env,
        client,
        token,
        farmer,
        buyer,
    }
}

#[test]
fn test_buy_schedules_pending_settlement() {
    let f = listed_product();
    assert_eq!(f.client.get_settlement(&UPC), None);

    let task = f.client.buy_item(&UPC, &f.buyer, &PRICE);

    assert_eq!(task.status, SettlementStatus::Pending);
    assert_eq!(task.callback, Symbol::new(&f.env, PAYOUT_CALLBACK));
    assert_eq!(task.budget, PAYOUT_CALLBACK_BUDGET);
    assert_eq!(f.client.get_settlement(&UPC), Some(task.clone()));

    let product = f.client.get_product(&UPC).unwrap();
    assert_settlement_matches_sale(&task, &product);

    // The payout itself does not wait for the continuation.
    assert_eq!(f.token.balance(&f.farmer), PRICE as i128);
    assert_eq!(f.token.balance(&f.buyer), 10_000 - PRICE as i128);
}

#[test]
fn test_payout_complete_marks_task_done() {
    let f = listed_product();
    let before = f.client.buy_item(&UPC, &f.buyer, &PRICE);
    let product_before = f.client.get_product(&UPC).unwrap();

    f.client.on_payout_complete(&UPC, &f.buyer);

    let after = f.client.get_settlement(&UPC).unwrap();
    assert_eq!(after.status, SettlementStatus::Completed);
    assert_settlement_progress(&before.status, &after.status);

    // Acknowledgement never touches the product or moves funds.
    assert_eq!(f.client.get_product(&UPC), Some(product_before));
    assert_eq!(f.token.balance(&f.farmer), PRICE as i128);
}

#[test]
fn test_payout_complete_only_for_buyer() {
    let f = listed_product();
    f.client.buy_item(&UPC, &f.buyer, &PRICE);

    assert_eq!(
        f.client.try_on_payout_complete(&UPC, &f.farmer),
        Err(Ok(Error::Unauthorized))
    );
    assert_eq!(
        f.client.get_settlement(&UPC).unwrap().status,
        SettlementStatus::Pending
    );
}

#[test]
fn test_payout_complete_runs_once() {
    let f = listed_product();
    f.client.buy_item(&UPC, &f.buyer, &PRICE);
    f.client.on_payout_complete(&UPC, &f.buyer);

    assert_eq!(
        f.client.try_on_payout_complete(&UPC, &f.buyer),
        Err(Ok(Error::SettlementAlreadyCompleted))
    );
}

#[test]
fn test_payout_complete_without_sale() {
    let f = listed_product();
    assert_eq!(
        f.client.try_on_payout_complete(&UPC, &f.buyer),
        Err(Ok(Error::SettlementNotFound))
    );
}

#[test]
fn test_free_listing_settles_without_transfer() {
    let env = Env::default();
    env.mock_all_auths();
    let sac = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let contract_id = env.register(SupplyChain, (sac.address(),));
    let client = SupplyChainClient::new(&env, &contract_id);
    let farmer = Address::generate(&env);
    let buyer = Address::generate(&env);

    client.harvest_item(
        &UPC,
        &farmer,
        &String::from_str(&env, "Sample lot"),
        &String::from_str(&env, ""),
        &String::from_str(&env, "0"),
        &String::from_str(&env, "0"),
        &String::from_str(&env, "Cupping sample"),
    );
    client.process_item(&UPC, &farmer);
    client.pack_item(&UPC, &farmer);
    client.sell_item(&UPC, &farmer, &0);

    let task = client.buy_item(&UPC, &buyer, &0);
    assert_eq!(task.amount, 0);
    assert_eq!(token::Client::new(&env, &sac.address()).balance(&farmer), 0);
}
