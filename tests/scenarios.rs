//! End-to-end scenarios for the router, the Revnet floor, the samplers and
//! whole simulation runs.

use approx::assert_relative_eq;
use rand_distr::Distribution;
use revnet_simulation::sampling::Poisson;
use revnet_simulation::{
    purchase, run_simulation, sell, LiquidityPool, RandomStream, Revnet, RevnetParams,
    SimulationConfig, Venue,
};

fn flat_revnet() -> Revnet {
    Revnet::new(RevnetParams {
        price_ceiling_increase_percentage: 0.0,
        price_ceiling_increase_frequency_in_days: 7,
        price_floor_tax_intensity: 0.5,
        premint_amount: 0.0,
        boost_percent: 0.0,
        boost_duration_in_days: 1,
    })
    .unwrap()
}

#[test]
fn test_flat_ceiling_issues_one_token_per_eth() {
    let mut revnet = flat_revnet();
    for _ in 0..100 {
        assert_eq!(revnet.tokens_created_per_eth(), 1.0);
        revnet.increment_day();
    }
}

#[test]
fn test_cheap_pool_wins_purchase() {
    // 100 tokens per ETH at the margin against 1 from the Revnet
    let mut revnet = flat_revnet();
    let mut pool = LiquidityPool::new(10.0, 1000.0, 0).unwrap();
    assert_relative_eq!(pool.marginal_price_of_eth().unwrap(), 100.0);

    let outcome = purchase(1.0, &mut revnet, &mut pool).unwrap();
    assert_eq!(outcome.source, Venue::Pool);
    assert_relative_eq!(outcome.tokens_received, 1000.0 - 10_000.0 / 11.0, epsilon = 1e-9);
}

#[test]
fn test_expensive_pool_loses_purchase() {
    let mut revnet = flat_revnet();
    let mut pool = LiquidityPool::new(1000.0, 10.0, 0).unwrap();

    let outcome = purchase(1.0, &mut revnet, &mut pool).unwrap();
    assert_eq!(outcome.source, Venue::Revnet);
    assert_eq!(outcome.tokens_received, 1.0);
}

#[test]
fn test_untaxed_floor_is_pro_rata() {
    // One 50% ceiling step: 100 ETH buys 50 tokens
    let mut revnet = Revnet::new(RevnetParams {
        price_ceiling_increase_percentage: 0.5,
        price_ceiling_increase_frequency_in_days: 1,
        price_floor_tax_intensity: 0.0,
        premint_amount: 0.0,
        boost_percent: 0.0,
        boost_duration_in_days: 1,
    })
    .unwrap();
    revnet.increment_day();
    revnet.create_tokens_at_ceiling(100.0).unwrap();

    assert_relative_eq!(revnet.eth_balance(), 100.0);
    assert_relative_eq!(revnet.token_supply(), 50.0);
    assert_relative_eq!(revnet.eth_reclaim_amount(5.0), 10.0, epsilon = 1e-12);
}

#[test]
fn test_zero_lambda_never_arrives() {
    let poisson = Poisson::new(0.0).unwrap();
    for seed in 0..20 {
        let mut stream = RandomStream::new(seed);
        for _ in 0..50 {
            assert_eq!(poisson.sample(&mut stream), 0);
        }
    }
}

#[test]
fn test_sell_after_pool_runs_dry_falls_back_to_revnet() {
    let mut revnet = flat_revnet();
    revnet.create_tokens_at_ceiling(50.0).unwrap();
    let mut pool = LiquidityPool::new(0.0, 500.0, 0).unwrap();

    // 50 ETH * (10 / 50) * (1 - 0.5 * (1 - 10 / 50))
    let outcome = sell(10.0, &mut revnet, &mut pool).unwrap();
    assert_eq!(outcome.source(), Some(Venue::Revnet));
    assert_relative_eq!(outcome.eth_received(), 6.0, epsilon = 1e-9);
    assert_relative_eq!(revnet.eth_balance(), 44.0, epsilon = 1e-9);
    assert_eq!(pool.token(), 500.0);
}

#[test]
fn test_identical_runs_serialize_identically() {
    let config = SimulationConfig {
        days_to_calculate: 120,
        day_deployed: 20,
        daily_purchases_lambda: 8.0,
        sale_probability: 0.1,
        ..Default::default()
    };

    let first = serde_json::to_vec(&run_simulation(&config).unwrap()).unwrap();
    let second = serde_json::to_vec(&run_simulation(&config).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_sale_probability_does_not_shift_arrivals() {
    let base = SimulationConfig {
        days_to_calculate: 90,
        ..Default::default()
    };
    let quiet = run_simulation(&SimulationConfig {
        sale_probability: 0.0,
        ..base.clone()
    })
    .unwrap();
    let busy = run_simulation(&SimulationConfig {
        sale_probability: 0.5,
        ..base
    })
    .unwrap();

    let arrivals = |output: &revnet_simulation::SimulationOutput| -> Vec<usize> {
        output.snapshots.iter().map(|s| s.purchases.len()).collect()
    };
    assert_eq!(arrivals(&quiet), arrivals(&busy));

    let spends = |output: &revnet_simulation::SimulationOutput| -> Vec<f64> {
        output.traders.iter().map(|t| t.purchase().eth_spent).collect()
    };
    assert_eq!(spends(&quiet), spends(&busy));
}

#[test]
fn test_snapshots_never_hold_non_finite_values() {
    let output = run_simulation(&SimulationConfig {
        days_to_calculate: 200,
        initial_eth: 0.0,
        initial_token: 0.0,
        day_deployed: 0,
        sale_probability: 0.3,
        minimum_days_held: 1,
        ..Default::default()
    })
    .unwrap();

    for snapshot in &output.snapshots {
        assert!(snapshot.revnet.price_ceiling.is_finite());
        assert!(snapshot.revnet.price_floor.is_finite());
        assert!(snapshot.revnet.reclaim_amounts.iter().all(|r| r.is_finite()));
        assert!(snapshot.pool.eth.is_finite() && snapshot.pool.token.is_finite());
        if let Some(price) = snapshot.pool.token_price {
            assert!(price.is_finite());
        }
    }
}
