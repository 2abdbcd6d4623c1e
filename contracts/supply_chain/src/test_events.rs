extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    token, vec, Address, Env, IntoVal, String, Symbol, TryIntoVal, Val, Vec,
};

use crate::events::{ItemHarvested, ItemListed, ItemSold, ItemTransition, PayoutCompleted};
use crate::{ItemState, SettlementStatus, SettlementTask, SupplyChain, SupplyChainClient};

const UPC: u64 = 42;
const PRICE: u128 = 2_500;

fn setup() -> (Env, SupplyChainClient<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();
    let token_admin = Address::generate(&env);
    let sac = env.register_stellar_asset_contract_v2(token_admin);
    let contract_id = env.register(SupplyChain, (sac.address(),));
    let client = SupplyChainClient::new(&env, &contract_id);
    (env, client, sac.address())
}

fn harvest(env: &Env, client: &SupplyChainClient, farmer: &Address) {
    client.harvest_item(
        &UPC,
        farmer,
        &String::from_str(env, "Finca La Esperanza"),
        &String::from_str(env, "Huila, Colombia"),
        &String::from_str(env, "2.535"),
        &String::from_str(env, "-75.527"),
        &String::from_str(env, "Washed Caturra"),
    );
}

/// Events published by the supply chain contract itself, oldest first.
fn contract_events(env: &Env, contract: &Address) -> std::vec::Vec<(Vec<Val>, Val)> {
    env.events()
        .all()
        .iter()
        .filter(|(emitter, _, _)| emitter == contract)
        .map(|(_, topics, data)| (topics, data))
        .collect()
}

fn topics(env: &Env, name: Symbol, upc: u64) -> Vec<Val> {
    vec![env, name.into_val(env), upc.into_val(env)]
}

#[test]
fn test_harvest_event() {
    let (env, client, _) = setup();
    let farmer = Address::generate(&env);
    harvest(&env, &client, &farmer);

    let events = contract_events(&env, &client.address);
    let (event_topics, data) = events.last().expect("No events found").clone();
    assert_eq!(event_topics, topics(&env, symbol_short!("harvest"), UPC));

    let event_data: ItemHarvested = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ItemHarvested {
            upc: UPC,
            sku: 1,
            farmer: farmer.clone(),
        }
    );
}

#[test]
fn test_farm_transition_events() {
    let (env, client, _) = setup();
    let farmer = Address::generate(&env);
    harvest(&env, &client, &farmer);

    client.process_item(&UPC, &farmer);
    let (event_topics, data) = contract_events(&env, &client.address).last().unwrap().clone();
    assert_eq!(event_topics, topics(&env, symbol_short!("process"), UPC));
    let event_data: ItemTransition = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ItemTransition {
            upc: UPC,
            actor: farmer.clone(),
            state: ItemState::Processed,
        }
    );

    client.pack_item(&UPC, &farmer);
    let (event_topics, _) = contract_events(&env, &client.address).last().unwrap().clone();
    assert_eq!(event_topics, topics(&env, symbol_short!("pack"), UPC));

    client.sell_item(&UPC, &farmer, &PRICE);
    let (event_topics, data) = contract_events(&env, &client.address).last().unwrap().clone();
    assert_eq!(event_topics, topics(&env, symbol_short!("for_sale"), UPC));
    let event_data: ItemListed = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ItemListed {
            upc: UPC,
            farmer: farmer.clone(),
            price: PRICE,
        }
    );
}

#[test]
fn test_buy_emits_sold_then_payout() {
    let (env, client, token) = setup();
    let farmer = Address::generate(&env);
    let distributor = Address::generate(&env);
    token::StellarAssetClient::new(&env, &token).mint(&distributor, &(PRICE as i128));

    harvest(&env, &client, &farmer);
    client.process_item(&UPC, &farmer);
    client.pack_item(&UPC, &farmer);
    client.sell_item(&UPC, &farmer, &PRICE);
    client.buy_item(&UPC, &distributor, &PRICE);

    let events = contract_events(&env, &client.address);
    let n = events.len();
    assert!(n >= 2);

    let (sold_topics, sold_data) = events[n - 2].clone();
    assert_eq!(sold_topics, topics(&env, symbol_short!("sold"), UPC));
    let sold: ItemSold = sold_data.try_into_val(&env).unwrap();
    assert_eq!(
        sold,
        ItemSold {
            upc: UPC,
            distributor: distributor.clone(),
            price: PRICE,
        }
    );

    let (payout_topics, payout_data) = events[n - 1].clone();
    assert_eq!(payout_topics, topics(&env, symbol_short!("payout"), UPC));
    let task: SettlementTask = payout_data.try_into_val(&env).unwrap();
    assert_eq!(task.recipient, farmer);
    assert_eq!(task.amount, PRICE);
    assert_eq!(task.callback_target, distributor);
    assert_eq!(task.callback, Symbol::new(&env, "on_payout_complete"));
    assert_eq!(task.status, SettlementStatus::Pending);
}

#[test]
fn test_retail_and_settlement_events() {
    let (env, client, token) = setup();
    let farmer = Address::generate(&env);
    let distributor = Address::generate(&env);
    let retailer = Address::generate(&env);
    token::StellarAssetClient::new(&env, &token).mint(&distributor, &(PRICE as i128));

    harvest(&env, &client, &farmer);
    client.process_item(&UPC, &farmer);
    client.pack_item(&UPC, &farmer);
    client.sell_item(&UPC, &farmer, &PRICE);
    client.buy_item(&UPC, &distributor, &PRICE);

    client.on_payout_complete(&UPC, &distributor);
    let (event_topics, data) = contract_events(&env, &client.address).last().unwrap().clone();
    assert_eq!(event_topics, topics(&env, symbol_short!("settled"), UPC));
    let done: PayoutCompleted = data.try_into_val(&env).unwrap();
    assert_eq!(
        done,
        PayoutCompleted {
            upc: UPC,
            recipient: farmer.clone(),
            amount: PRICE,
        }
    );

    client.ship_item(&UPC, &distributor);
    let (event_topics, _) = contract_events(&env, &client.address).last().unwrap().clone();
    assert_eq!(event_topics, topics(&env, symbol_short!("ship"), UPC));

    client.receive_item(&UPC, &retailer);
    let (event_topics, data) = contract_events(&env, &client.address).last().unwrap().clone();
    assert_eq!(event_topics, topics(&env, symbol_short!("receive"), UPC));
    let received: ItemTransition = data.try_into_val(&env).unwrap();
    assert_eq!(received.actor, retailer);
    assert_eq!(received.state, ItemState::Received);

    client.purchase_item(&UPC, &retailer);
    let (event_topics, data) = contract_events(&env, &client.address).last().unwrap().clone();
    assert_eq!(event_topics, topics(&env, symbol_short!("purchase"), UPC));
    let purchased: ItemTransition = data.try_into_val(&env).unwrap();
    assert_eq!(purchased.state, ItemState::Purchased);
}
