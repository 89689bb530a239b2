// ============ Pool Swap Math ============
// Integer formulas for the token/currency pool.
//
// All amounts are u64; products are taken in u128. Every division truncates
// toward zero and the order of operations is part of the pool's consensus:
// ratios are taken first and multiplied afterwards wherever the pool prices
// liquidity, which rounds differently from a single mul_div.

#![cfg_attr(feature = "no_std", no_std)]

// ============ Constants ============

pub const SWAP_FEE_NUMERATOR: u64 = 5;
pub const SWAP_FEE_DENOMINATOR: u64 = 1000; // 0.5%
pub const LP_FEE_SHARE_NUMERATOR: u64 = 5;
pub const LP_FEE_SHARE_DENOMINATOR: u64 = 6; // 5/6 of the fee stays with LPs

// ============ Error Types ============

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    ZeroReserve,
    ZeroAmount,
    Overflow,
    InsufficientReserve,
    ExceedsIssuedSupply,
}

// ============ Swaps ============

/// Result of a constant-product swap. `gross_out` leaves the reserve;
/// the trader receives `net_out`, the app receives `app_fee`, and `lp_fee`
/// stays in custody as accrued fee.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapQuote {
    pub new_reserve_in: u64,
    pub new_reserve_out: u64,
    pub gross_out: u64,
    pub fee: u64,
    pub lp_fee: u64,
    pub app_fee: u64,
    pub net_out: u64,
}

/// Split a gross payout into (fee, lp_fee, app_fee)
pub fn split_fee(gross_out: u64) -> (u64, u64, u64) {
    let fee = (gross_out as u128 * SWAP_FEE_NUMERATOR as u128 / SWAP_FEE_DENOMINATOR as u128) as u64;
    let lp_fee = (fee as u128 * LP_FEE_SHARE_NUMERATOR as u128 / LP_FEE_SHARE_DENOMINATOR as u128) as u64;
    (fee, lp_fee, fee - lp_fee)
}

/// k = reserve_in * reserve_out; new_reserve_out = k / (reserve_in + amount_in)
pub fn get_swap_quote(
    amount_in: u64,
    reserve_in: u64,
    reserve_out: u64,
) -> Result<SwapQuote, MathError> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(MathError::ZeroReserve);
    }
    if amount_in == 0 {
        return Err(MathError::ZeroAmount);
    }

    let k = reserve_in as u128 * reserve_out as u128;
    let new_reserve_in = reserve_in.checked_add(amount_in).ok_or(MathError::Overflow)?;
    // k / new_reserve_in <= reserve_out, so it fits back into u64
    let new_reserve_out = (k / new_reserve_in as u128) as u64;
    let gross_out = reserve_out - new_reserve_out;
    let (fee, lp_fee, app_fee) = split_fee(gross_out);

    Ok(SwapQuote {
        new_reserve_in,
        new_reserve_out,
        gross_out,
        fee,
        lp_fee,
        app_fee,
        net_out: gross_out - fee,
    })
}

// ============ Liquidity ============

/// Currency a depositor must bring alongside `token_amount`:
/// `token_amount * (currency_reserve / token_reserve)`.
pub fn required_currency(
    token_amount: u64,
    token_reserve: u64,
    currency_reserve: u64,
) -> Result<u64, MathError> {
    if token_reserve == 0 {
        return Err(MathError::ZeroReserve);
    }
    let ratio = currency_reserve / token_reserve;
    token_amount.checked_mul(ratio).ok_or(MathError::Overflow)
}

/// LP units minted for a deposit: `(lp_issued / token_reserve) * token_amount`.
pub fn lp_to_mint(
    token_amount: u64,
    token_reserve: u64,
    lp_issued: u64,
) -> Result<u64, MathError> {
    if token_reserve == 0 {
        return Err(MathError::ZeroReserve);
    }
    if token_amount == 0 {
        return Err(MathError::ZeroAmount);
    }
    let ratio = lp_issued / token_reserve;
    ratio.checked_mul(token_amount).ok_or(MathError::Overflow)
}

/// Share of an accrued fee bucket owed to `lp_amount` burned LP units:
/// `lp_amount / (lp_issued / fee_accrued)`, never more than the bucket.
/// When the bucket outgrows the issued supply the ratio collapses to zero
/// and the share falls back to `lp_amount * fee_accrued / lp_issued`.
pub fn fee_share(lp_amount: u64, lp_issued: u64, fee_accrued: u64) -> u64 {
    if fee_accrued == 0 || lp_issued == 0 {
        return 0;
    }
    let ratio = lp_issued / fee_accrued;
    let share = if ratio == 0 {
        (lp_amount as u128 * fee_accrued as u128 / lp_issued as u128) as u64
    } else {
        lp_amount / ratio
    };
    share.min(fee_accrued)
}

/// Amounts released by burning LP units
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Withdrawal {
    pub token_out: u64,
    pub currency_out: u64,
    pub token_fee_share: u64,
    pub currency_fee_share: u64,
}

/// Pro-rata withdrawal, computed in two steps:
/// `token_out = lp_amount * (lp_issued / token_reserve)`, then
/// `currency_out = token_out * (currency_reserve / token_reserve)`.
pub fn withdrawal(
    lp_amount: u64,
    lp_issued: u64,
    token_reserve: u64,
    currency_reserve: u64,
    token_fee_accrued: u64,
    currency_fee_accrued: u64,
) -> Result<Withdrawal, MathError> {
    if token_reserve == 0 {
        return Err(MathError::ZeroReserve);
    }
    if lp_amount == 0 {
        return Err(MathError::ZeroAmount);
    }
    if lp_amount > lp_issued {
        return Err(MathError::ExceedsIssuedSupply);
    }

    let token_out = lp_amount
        .checked_mul(lp_issued / token_reserve)
        .ok_or(MathError::Overflow)?;
    let currency_out = token_out
        .checked_mul(currency_reserve / token_reserve)
        .ok_or(MathError::Overflow)?;

    if token_out > token_reserve || currency_out > currency_reserve {
        return Err(MathError::InsufficientReserve);
    }

    Ok(Withdrawal {
        token_out,
        currency_out,
        token_fee_share: fee_share(lp_amount, lp_issued, token_fee_accrued),
        currency_fee_share: fee_share(lp_amount, lp_issued, currency_fee_accrued),
    })
}

// ============ Tests ============
