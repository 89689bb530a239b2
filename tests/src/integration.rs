// ============ Pool Swap Integration Tests ============
// Full lifecycle tests across the libraries and both scripts.
//
// Every transition goes through the simulated ledger in `fixtures`: the
// honest client derives the outputs, both holder locks must unlock, the
// pool type script must accept, and the ledger moves to the successor.
//
// Test categories:
// 1. Genesis layout
// 2. Liquidity lifecycle through the terminal exit
// 3. Swaps in both directions with fee accrual
// 4. Custody conservation across mixed sequences
// 5. Change outputs and donated currency

use crate::fixtures::*;
use pool_type::{pool_outputs, verify_pool_genesis};
use poolswap_math as math;
use poolswap_types::*;

// ============ Helpers ============

fn standard_pool() -> PoolHarness {
    PoolHarness::new(make_pool(100_000, 5_000_000, 100_000))
}

/// Holder outputs must carry exactly reserve + accrued fee
fn assert_custody(outputs: &[TxOutput], state: &PoolState) {
    assert_eq!(outputs[CURRENCY_HOLDER_POSITION as usize].value, state.currency_reserve + state.currency_fee_accrued);
    assert_eq!(
        token_amount(&outputs[TOKEN_HOLDER_POSITION as usize]),
        Some(state.token_reserve + state.token_fee_accrued)
    );
    let root = PoolRecord::from_locking_script(&outputs[ROOT_POSITION as usize].script).unwrap();
    assert_eq!(&root.state, state);
}

// ============ Test 1: Genesis Layout ============

#[test]
fn test_genesis_outputs_parse_back() {
    let pool = make_pool(100_000, 5_000_000, 100_000);
    let outputs = pool_outputs(&pool, &pool.state).unwrap();
    let record = verify_pool_genesis(&outputs).unwrap();
    assert_eq!(record.lp_issued(), Some(100_000));

    assert_eq!(outputs.len(), 3);
    assert_eq!(outputs[0].value, DUST_VALUE);
    assert_eq!(token_amount(&outputs[0]), Some(LP_MAX - 100_000));
    assert_custody(&outputs, &pool.state);

    let currency = HolderRecord::from_locking_script(&outputs[1].script).unwrap();
    assert_eq!(currency.position, CURRENCY_HOLDER_POSITION);
    let token = HolderRecord::from_locking_script(&outputs[2].script).unwrap();
    assert_eq!(token.position, TOKEN_HOLDER_POSITION);
    assert_eq!(token.asset, HolderAsset::Token(pool.descriptor.token.clone()));
}

// ============ Test 2: Liquidity Lifecycle ============

#[test]
fn test_liquidity_lifecycle_to_terminal_exit() {
    let mut h = standard_pool();

    // ratio is 50 currency per token
    let t = h.add_liquidity(2_000).unwrap();
    assert_eq!(token_amount(&t.outputs[3]), Some(2_000));
    assert_eq!(t.outputs[4].value, DEFAULT_PRIMARY_FUND_PAYOUT);
    assert_eq!(t.outputs[5].value, DEFAULT_SECONDARY_FUND_PAYOUT);
    assert_eq!(h.state().token_reserve, 102_000);
    assert_eq!(h.state().currency_reserve, 5_100_000);
    assert_custody(&t.outputs, h.state());

    h.add_liquidity(18_000).unwrap();
    assert_eq!(h.state().token_reserve, 120_000);
    assert_eq!(h.state().currency_reserve, 6_000_000);
    assert_eq!(h.record.lp_issued(), Some(120_000));

    let t = h.remove_liquidity(20_000).unwrap();
    assert_eq!(token_amount(&t.outputs[3]), Some(20_000));
    assert_eq!(t.outputs[4].value, 1_000_000);
    assert_eq!(h.state().token_reserve, 100_000);
    assert_eq!(h.state().currency_reserve, 5_000_000);
    assert_eq!(h.record.lp_issued(), Some(100_000));

    // last LP out drains both reserves: no successor pool
    let t = h.remove_liquidity(100_000).unwrap();
    assert_eq!(t.next, None);
    assert!(!h.live);
    assert_eq!(t.outputs.len(), 3);
    assert_eq!(token_amount(&t.outputs[0]), Some(100_000));
    assert_eq!(t.outputs[1].value, 5_000_000);
    assert_eq!(t.outputs[2].value, DEFAULT_PRIMARY_FUND_PAYOUT);
}

#[test]
fn test_terminal_exit_sweeps_accrued_fees() {
    let mut pool = make_pool(100_000, 5_000_000, 100_000);
    pool.state.token_fee_accrued = 13;
    pool.state.currency_fee_accrued = 777;
    let mut h = PoolHarness::new(pool);

    let t = h.remove_liquidity(100_000).unwrap();
    assert_eq!(t.next, None);
    assert_eq!(token_amount(&t.outputs[0]), Some(100_013));
    assert_eq!(t.outputs[1].value, 5_000_777);
}

#[test]
fn test_excess_currency_is_donated() {
    let mut h = standard_pool();
    let t = h.add_liquidity_with(2_000, 150_000).unwrap();

    // LP follows the token side only
    assert_eq!(token_amount(&t.outputs[3]), Some(2_000));
    assert_eq!(h.state().currency_reserve, 5_150_000);
    assert_custody(&t.outputs, h.state());
}

// ============ Test 3: Swaps ============

#[test]
fn test_swap_token_to_currency_reference() {
    let mut h = standard_pool();
    let t = h.swap_token_to_currency(2_000).unwrap();

    assert_eq!(t.outputs[3].value, 97_550);
    assert_eq!(t.outputs[4].value, 82);
    assert_eq!(t.outputs[5].value, DEFAULT_PRIMARY_FUND_PAYOUT);
    assert_eq!(t.outputs[6].value, DEFAULT_SECONDARY_FUND_PAYOUT);

    let state = h.state();
    assert_eq!(state.token_reserve, 102_000);
    assert_eq!(state.currency_reserve, 4_901_960);
    assert_eq!(state.currency_fee_accrued, 408);
    assert_eq!(t.outputs[1].value, 4_902_368);
}

#[test]
fn test_swap_back_accrues_both_buckets() {
    let mut h = standard_pool();
    h.swap_token_to_currency(2_000).unwrap();
    let t = h.swap_currency_to_token(100_000).unwrap();

    assert_eq!(token_amount(&t.outputs[3]), Some(2_030));
    assert_eq!(token_amount(&t.outputs[4]), Some(2));
    // deposit side pays the primary amount
    assert_eq!(t.outputs[5].value, DEFAULT_SECONDARY_FUND_PAYOUT);
    assert_eq!(t.outputs[6].value, DEFAULT_PRIMARY_FUND_PAYOUT);

    let state = h.state();
    assert_eq!(state.token_reserve, 99_960);
    assert_eq!(state.currency_reserve, 5_001_960);
    assert_eq!(state.token_fee_accrued, 8);
    assert_eq!(state.currency_fee_accrued, 408);
    assert_custody(&t.outputs, state);
}

#[test]
fn test_lp_supply_untouched_by_swaps() {
    let mut h = standard_pool();
    let before = h.state().lp_remaining;
    for amount in [1_000, 5_000, 250] {
        h.swap_token_to_currency(amount).unwrap();
    }
    h.swap_currency_to_token(75_000).unwrap();
    assert_eq!(h.state().lp_remaining, before);
}

// ============ Test 4: Conservation ============

#[test]
fn test_swap_custody_conservation() {
    let mut h = standard_pool();

    for round in 0..10u64 {
        let before = h.state().clone();
        if round % 2 == 0 {
            let amount = 500 + round * 300;
            let t = h.swap_token_to_currency(amount).unwrap();
            let after = h.state();
            assert_eq!(after.token_custody().unwrap(), before.token_custody().unwrap() + amount);
            assert_eq!(
                before.currency_custody().unwrap() - after.currency_custody().unwrap(),
                t.outputs[3].value + t.outputs[4].value
            );
        } else {
            let amount = 20_000 + round * 5_000;
            let t = h.swap_currency_to_token(amount).unwrap();
            let after = h.state();
            assert_eq!(after.currency_custody().unwrap(), before.currency_custody().unwrap() + amount);
            assert_eq!(
                before.token_custody().unwrap() - after.token_custody().unwrap(),
                token_amount(&t.outputs[3]).unwrap() + token_amount(&t.outputs[4]).unwrap()
            );
        }
    }
}

#[test]
fn test_withdrawal_pays_fee_share() {
    let mut h = standard_pool();
    for amount in [100_000, 250_000, 40_000] {
        h.swap_currency_to_token(amount).unwrap();
    }
    assert_eq!(h.state().token_reserve, 92_763);
    assert_eq!(h.state().currency_reserve, 5_390_000);
    assert_eq!(h.state().token_fee_accrued, 27);

    let before = h.state().clone();
    let t = h.remove_liquidity(10_000).unwrap();
    let after = h.state();

    // 10,000 LP at ratio 1 and 58 currency per token, plus 2 fee tokens
    assert_eq!(token_amount(&t.outputs[3]), Some(10_002));
    assert_eq!(t.outputs[4].value, 580_000);
    assert_eq!(after.token_fee_accrued, 25);
    assert_eq!(after.lp_remaining, before.lp_remaining + 10_000);
    assert_eq!(
        before.token_custody().unwrap() - after.token_custody().unwrap(),
        token_amount(&t.outputs[3]).unwrap()
    );
    assert_eq!(
        before.currency_custody().unwrap() - after.currency_custody().unwrap(),
        t.outputs[4].value
    );
}

#[test]
fn test_lp_minted_follows_issued_ratio() {
    // 350,000 LP issued against 100,000 tokens: 3 LP per token
    let mut h = PoolHarness::new(make_pool(100_000, 5_000_000, 350_000));
    let t = h.add_liquidity(2_000).unwrap();
    assert_eq!(token_amount(&t.outputs[3]), Some(6_000));
    assert_eq!(h.record.lp_issued(), Some(356_000));
}

// ============ Test 5: Change Output ============

#[test]
fn test_change_output_follows_pool_outputs() {
    let mut h = standard_pool();
    let plan = h.plan_swap_token_to_currency(2_000).unwrap();

    let change = TxOutput::new(9_999, address(0x99));
    let mut committed = plan.outputs.clone();
    committed.push(change.clone());
    let mut ctx = h.context(&plan.inputs, &committed);
    ctx.change = Some(change);

    let t = h.submit_with(&plan.action, &ctx).unwrap();
    assert_eq!(t.outputs.len(), 8);
    assert_eq!(t.outputs[7].value, 9_999);
}

#[test]
fn test_many_rounds_stay_consistent() {
    let mut h = PoolHarness::new(make_pool(1_000_000, 50_000_000, 1_000_000));

    for round in 0..30u64 {
        let t = match round % 3 {
            0 => h.swap_token_to_currency(1_000 + round * 17),
            1 => h.swap_currency_to_token(40_000 + round * 333),
            _ => h.add_liquidity(500),
        }
        .unwrap();
        assert_custody(&t.outputs, h.state());
        assert!(h.state().token_reserve > 0 && h.state().currency_reserve > 0);
        assert!(h.state().lp_remaining <= LP_MAX);
    }

    let quote = math::get_swap_quote(10, h.state().token_reserve, h.state().currency_reserve).unwrap();
    assert!(quote.new_reserve_out > 0);
}
