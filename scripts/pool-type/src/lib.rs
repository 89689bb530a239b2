// ============ Pool Type Script ============
// Validates every state transition of a token/currency constant-product pool.
//
// The pool is three outputs of one transaction: the root record at 0 (state,
// descriptor, undistributed LP supply), the currency holder at 1 and the
// token holder at 2. A transition spends all three and must recreate them,
// plus the payouts the transition owes, in a fixed order. The script never
// trusts the proposed outputs: it derives the successor state, rebuilds the
// full output set and compares its hash with the transaction's commitment.
//
// Transitions:
// - add liquidity (oracle-attested tokens + currency read from its raw tx)
// - swap token -> currency (oracle-attested tokens)
// - swap currency -> token (currency read from its raw tx)
// - remove liquidity (oracle-attested LP burn, terminal exit when drained)

#![cfg_attr(feature = "ckb", no_std)]

#[cfg(feature = "ckb")]
extern crate alloc;
#[cfg(feature = "ckb")]
use alloc::vec::Vec;

use holder_lock::{verify_holders, HolderLockError};
use poolswap_math::{self as math, MathError};
use poolswap_txutil::{prevout, raw_tx::RawTxReader, TxParseError};
use poolswap_types::*;

// ============ Oracle Interface ============

/// Signature scheme the pool's oracle signs attestations with.
pub trait AttestationVerifier {
    fn verify(&self, pubkey: &[u8; 32], message: &[u8], signature: &[u8]) -> bool;
}

// ============ Execution Context ============

/// What the ledger tells the script about the spending transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptContext {
    /// Outpoint the root record is spent from
    pub outpoint: OutPoint,
    /// Prevouts blob of the spending transaction
    pub prevouts: Vec<u8>,
    /// hash256 of the spending transaction's serialized outputs
    pub hash_outputs: [u8; 32],
    /// Change output appended after the pool's own outputs
    pub change: Option<TxOutput>,
}

/// Successor of a validated transition. `next` is `None` once the pool
/// has been fully drained and its records are not recreated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: Option<PoolState>,
    pub outputs: Vec<TxOutput>,
}

// ============ Script Entry Point ============

pub fn verify_pool_type<V: AttestationVerifier + ?Sized>(
    record_data: &[u8],
    witness: &[u8],
    ctx: &ScriptContext,
    oracle: &V,
) -> Result<Transition, PoolTypeError> {
    let record = PoolRecord::from_locking_script(record_data)
        .ok_or(PoolTypeError::InvalidRecord)?;
    let action = PoolAction::deserialize(witness).ok_or(PoolTypeError::InvalidWitness)?;

    apply_action(&record, &action, ctx, oracle)
}

pub fn apply_action<V: AttestationVerifier + ?Sized>(
    record: &PoolRecord,
    action: &PoolAction,
    ctx: &ScriptContext,
    oracle: &V,
) -> Result<Transition, PoolTypeError> {
    match action {
        PoolAction::AddLiquidity { attestation, deposit_tx, recipient } => {
            add_liquidity(record, attestation, deposit_tx, recipient, ctx, oracle)
        }
        PoolAction::SwapTokenToCurrency { attestation, recipient, app_fee_script } => {
            swap_token_to_currency(record, attestation, recipient, app_fee_script, ctx, oracle)
        }
        PoolAction::SwapCurrencyToToken { deposit_tx, recipient, app_fee_script } => {
            swap_currency_to_token(record, deposit_tx, recipient, app_fee_script, ctx)
        }
        PoolAction::RemoveLiquidity { attestation, token_recipient, currency_recipient } => {
            remove_liquidity(record, attestation, token_recipient, currency_recipient, ctx, oracle)
        }
    }
}

// ============ Pool Genesis ============

/// Check the outputs of a pool creation transaction. The root record and
/// both holders must be created together at their pinned positions, each
/// holder custodying its opening reserve. Returns the parsed record.
pub fn verify_pool_genesis(outputs: &[TxOutput]) -> Result<PoolRecord, PoolTypeError> {
    let root = outputs.get(ROOT_POSITION as usize).ok_or(PoolTypeError::InvalidRecord)?;
    let record = PoolRecord::from_locking_script(&root.script)
        .ok_or(PoolTypeError::InvalidRecord)?;
    let state = &record.state;

    if state.token_reserve == 0 || state.currency_reserve == 0 {
        return Err(PoolTypeError::ZeroReserve);
    }

    if state.lp_remaining >= record.lp_max() {
        return Err(PoolTypeError::InvalidLpSupply);
    }

    if state.token_fee_accrued != 0 || state.currency_fee_accrued != 0 {
        return Err(PoolTypeError::NonZeroGenesisFees);
    }

    let token_id = &record.descriptor.token.id;
    let lp_id = &record.descriptor.lp_token.id;
    if token_id == &[0u8; 32] || lp_id == &[0u8; 32] || token_id == lp_id {
        return Err(PoolTypeError::InvalidTokenIds);
    }

    let expected = pool_outputs(&record, state)?;
    if outputs.get(..expected.len()) != Some(&expected[..]) {
        return Err(PoolTypeError::GenesisLayoutMismatch);
    }

    Ok(record)
}

/// Root, currency holder and token holder outputs for a pool in `state`.
pub fn pool_outputs(record: &PoolRecord, state: &PoolState) -> Result<Vec<TxOutput>, PoolTypeError> {
    let currency = state.currency_custody().ok_or(PoolTypeError::Overflow)?;
    let token = state.token_custody().ok_or(PoolTypeError::Overflow)?;

    let mut outputs = Vec::with_capacity(8);
    outputs.push(record.with_state(state.clone()).output());
    outputs.push(HolderRecord::currency().output(currency));
    outputs.push(HolderRecord::token(record.descriptor.token.clone()).output(token));
    Ok(outputs)
}

// ============ Add Liquidity ============

fn add_liquidity<V: AttestationVerifier + ?Sized>(
    record: &PoolRecord,
    attestation: &Attestation,
    deposit_tx: &[u8],
    recipient: &[u8],
    ctx: &ScriptContext,
    oracle: &V,
) -> Result<Transition, PoolTypeError> {
    verify_root(ctx, CURRENCY_DEPOSIT_SLOT + 1)?;
    let token_amount = verify_attestation(record, attestation, ctx, oracle)?;
    let state = &record.state;

    let needed = math::required_currency(token_amount, state.token_reserve, state.currency_reserve)?;
    let deposit = read_deposit(deposit_tx, &ctx.prevouts, CURRENCY_DEPOSIT_SLOT)?;
    // Anything above `needed` is kept by the pool without extra LP
    if deposit < needed {
        return Err(PoolTypeError::InsufficientDeposit);
    }

    let lp_issued = record.lp_issued().ok_or(PoolTypeError::CorruptState)?;
    let lp_minted = math::lp_to_mint(token_amount, state.token_reserve, lp_issued)?;

    let next = PoolState {
        token_reserve: state.token_reserve.checked_add(token_amount).ok_or(PoolTypeError::Overflow)?,
        currency_reserve: state.currency_reserve.checked_add(deposit).ok_or(PoolTypeError::Overflow)?,
        lp_remaining: state.lp_remaining.checked_sub(lp_minted).ok_or(PoolTypeError::LpSupplyExhausted)?,
        ..state.clone()
    };

    let funds = &record.descriptor.funds;
    let mut outputs = pool_outputs(record, &next)?;
    outputs.push(token_output(&record.descriptor.lp_token.id, lp_minted, recipient));
    outputs.push(funds.token_fund_output(funds.primary_payout));
    outputs.push(funds.currency_fund_output(funds.secondary_payout));

    seal(outputs, Some(next), ctx)
}

// ============ Swap Token -> Currency ============

fn swap_token_to_currency<V: AttestationVerifier + ?Sized>(
    record: &PoolRecord,
    attestation: &Attestation,
    recipient: &[u8],
    app_fee_script: &[u8],
    ctx: &ScriptContext,
    oracle: &V,
) -> Result<Transition, PoolTypeError> {
    verify_root(ctx, ASSET_DEPOSIT_SLOT + 1)?;
    let token_amount = verify_attestation(record, attestation, ctx, oracle)?;
    let state = &record.state;

    let quote = math::get_swap_quote(token_amount, state.token_reserve, state.currency_reserve)?;
    if quote.new_reserve_out == 0 {
        return Err(PoolTypeError::ReserveDepleted);
    }

    let next = PoolState {
        token_reserve: quote.new_reserve_in,
        currency_reserve: quote.new_reserve_out,
        currency_fee_accrued: state
            .currency_fee_accrued
            .checked_add(quote.lp_fee)
            .ok_or(PoolTypeError::Overflow)?,
        ..state.clone()
    };

    let funds = &record.descriptor.funds;
    let mut outputs = pool_outputs(record, &next)?;
    outputs.push(TxOutput::new(quote.net_out, recipient.to_vec()));
    outputs.push(TxOutput::new(quote.app_fee, app_fee_script.to_vec()));
    outputs.push(funds.token_fund_output(funds.primary_payout));
    outputs.push(funds.currency_fund_output(funds.secondary_payout));

    seal(outputs, Some(next), ctx)
}

// ============ Swap Currency -> Token ============

fn swap_currency_to_token(
    record: &PoolRecord,
    deposit_tx: &[u8],
    recipient: &[u8],
    app_fee_script: &[u8],
    ctx: &ScriptContext,
) -> Result<Transition, PoolTypeError> {
    verify_root(ctx, ASSET_DEPOSIT_SLOT + 1)?;
    let currency_amount = read_deposit(deposit_tx, &ctx.prevouts, ASSET_DEPOSIT_SLOT)?;
    let state = &record.state;

    let quote = math::get_swap_quote(currency_amount, state.currency_reserve, state.token_reserve)?;
    if quote.new_reserve_out == 0 {
        return Err(PoolTypeError::ReserveDepleted);
    }

    let next = PoolState {
        currency_reserve: quote.new_reserve_in,
        token_reserve: quote.new_reserve_out,
        token_fee_accrued: state
            .token_fee_accrued
            .checked_add(quote.lp_fee)
            .ok_or(PoolTypeError::Overflow)?,
        ..state.clone()
    };

    let token_id = &record.descriptor.token.id;
    let funds = &record.descriptor.funds;
    let mut outputs = pool_outputs(record, &next)?;
    outputs.push(token_output(token_id, quote.net_out, recipient));
    outputs.push(token_output(token_id, quote.app_fee, app_fee_script));
    // Currency side is the deposit side here: fund amounts swap places
    outputs.push(funds.token_fund_output(funds.secondary_payout));
    outputs.push(funds.currency_fund_output(funds.primary_payout));

    seal(outputs, Some(next), ctx)
}

// ============ Remove Liquidity ============

fn remove_liquidity<V: AttestationVerifier + ?Sized>(
    record: &PoolRecord,
    attestation: &Attestation,
    token_recipient: &[u8],
    currency_recipient: &[u8],
    ctx: &ScriptContext,
    oracle: &V,
) -> Result<Transition, PoolTypeError> {
    verify_root(ctx, ASSET_DEPOSIT_SLOT + 1)?;
    let lp_amount = verify_attestation(record, attestation, ctx, oracle)?;
    let state = &record.state;

    let lp_issued = record.lp_issued().ok_or(PoolTypeError::CorruptState)?;
    let w = math::withdrawal(
        lp_amount,
        lp_issued,
        state.token_reserve,
        state.currency_reserve,
        state.token_fee_accrued,
        state.currency_fee_accrued,
    )?;

    // withdrawal() keeps every subtraction below in range
    let next = PoolState {
        token_reserve: state.token_reserve - w.token_out,
        currency_reserve: state.currency_reserve - w.currency_out,
        lp_remaining: state.lp_remaining + lp_amount,
        token_fee_accrued: state.token_fee_accrued - w.token_fee_share,
        currency_fee_accrued: state.currency_fee_accrued - w.currency_fee_share,
    };

    let token_id = &record.descriptor.token.id;
    let funds = &record.descriptor.funds;

    if next.is_drained() {
        // Terminal exit: everything left in custody goes out, no successor
        let token_total = w
            .token_out
            .checked_add(state.token_fee_accrued)
            .ok_or(PoolTypeError::Overflow)?;
        let currency_total = w
            .currency_out
            .checked_add(state.currency_fee_accrued)
            .ok_or(PoolTypeError::Overflow)?;

        let outputs = Vec::from([
            token_output(token_id, token_total, token_recipient),
            TxOutput::new(currency_total, currency_recipient.to_vec()),
            funds.token_fund_output(funds.primary_payout),
        ]);
        return seal(outputs, None, ctx);
    }

    if next.token_reserve == 0 || next.currency_reserve == 0 {
        return Err(PoolTypeError::PartialDrain);
    }

    let token_total = w
        .token_out
        .checked_add(w.token_fee_share)
        .ok_or(PoolTypeError::Overflow)?;
    let currency_total = w
        .currency_out
        .checked_add(w.currency_fee_share)
        .ok_or(PoolTypeError::Overflow)?;

    let mut outputs = pool_outputs(record, &next)?;
    outputs.push(token_output(token_id, token_total, token_recipient));
    outputs.push(TxOutput::new(currency_total, currency_recipient.to_vec()));
    outputs.push(funds.token_fund_output(funds.primary_payout));
    outputs.push(funds.currency_fund_output(funds.secondary_payout));

    seal(outputs, Some(next), ctx)
}

// ============ Shared Checks ============

/// Root spent from output 0, listed as input 0, with both holders
/// spent from the same transaction. `required_inputs` covers every
/// prevout slot the transition reads.
fn verify_root(ctx: &ScriptContext, required_inputs: usize) -> Result<(), PoolTypeError> {
    if ctx.outpoint.index as u64 != ROOT_POSITION {
        return Err(PoolTypeError::RootNotAtPosition);
    }

    if prevout::input_count(&ctx.prevouts) < required_inputs {
        return Err(PoolTypeError::MissingInput);
    }

    let (root_txid, root_index) =
        prevout::get_outpoint(&ctx.prevouts, ROOT_SLOT).ok_or(PoolTypeError::MissingInput)?;
    if root_txid != ctx.outpoint.txid || root_index != ctx.outpoint.index as u64 {
        return Err(PoolTypeError::RootInputMismatch);
    }

    verify_holders(&ctx.prevouts, &ctx.outpoint.txid)?;

    Ok(())
}

/// Verify the oracle's signature and that it attests the outpoint
/// actually spent at the asset deposit slot. Returns the attested amount.
fn verify_attestation<V: AttestationVerifier + ?Sized>(
    record: &PoolRecord,
    attestation: &Attestation,
    ctx: &ScriptContext,
    oracle: &V,
) -> Result<u64, PoolTypeError> {
    if !oracle.verify(&record.descriptor.oracle_pubkey, &attestation.message, &attestation.signature) {
        return Err(PoolTypeError::InvalidSignature);
    }

    let message = OracleMessage::deserialize(&attestation.message)
        .ok_or(PoolTypeError::MalformedAttestation)?;

    let (txid, index) = prevout::get_outpoint(&ctx.prevouts, ASSET_DEPOSIT_SLOT)
        .ok_or(PoolTypeError::MissingInput)?;
    if message.txid != txid || message.output_index != index {
        return Err(PoolTypeError::AttestedOutpointMismatch);
    }

    if message.amount == 0 {
        return Err(PoolTypeError::ZeroAmount);
    }

    Ok(message.amount)
}

/// Value of the output spent at `slot`, read from the raw transaction that
/// created it. The raw bytes must hash to the txid the slot references.
fn read_deposit(deposit_tx: &[u8], prevouts: &[u8], slot: usize) -> Result<u64, PoolTypeError> {
    let (txid, index) = prevout::get_outpoint(prevouts, slot).ok_or(PoolTypeError::MissingInput)?;
    if hash256(deposit_tx) != txid {
        return Err(PoolTypeError::DepositTxMismatch);
    }

    let output = RawTxReader::new().read_output(deposit_tx, index)?;
    Ok(output.value)
}

/// Append change, then compare against the commitment. Always last.
fn seal(
    mut outputs: Vec<TxOutput>,
    next: Option<PoolState>,
    ctx: &ScriptContext,
) -> Result<Transition, PoolTypeError> {
    if let Some(change) = &ctx.change {
        outputs.push(change.clone());
    }

    if hash_outputs(&outputs) != ctx.hash_outputs {
        return Err(PoolTypeError::CommitmentMismatch);
    }

    Ok(Transition { next, outputs })
}

// ============ Error Types ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Position,
    Attestation,
    Value,
    Parse,
    Commitment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolTypeError {
    // Decoding
    InvalidRecord,
    InvalidWitness,
    TxParse(TxParseError),

    // Position
    RootNotAtPosition,
    RootInputMismatch,
    HolderNotLinked,
    MissingInput,

    // Attestation
    InvalidSignature,
    MalformedAttestation,
    AttestedOutpointMismatch,
    DepositTxMismatch,

    // Value
    InsufficientDeposit,
    ZeroReserve,
    ZeroAmount,
    Overflow,
    InsufficientReserve,
    ExceedsIssuedSupply,
    LpSupplyExhausted,
    ReserveDepleted,
    PartialDrain,
    CorruptState,

    // Genesis
    InvalidLpSupply,
    NonZeroGenesisFees,
    InvalidTokenIds,
    GenesisLayoutMismatch,

    // Commitment
    CommitmentMismatch,
}

impl PoolTypeError {
    pub fn class(&self) -> ErrorClass {
        match self {
            PoolTypeError::InvalidRecord
            | PoolTypeError::InvalidWitness
            | PoolTypeError::TxParse(_) => ErrorClass::Parse,

            PoolTypeError::RootNotAtPosition
            | PoolTypeError::RootInputMismatch
            | PoolTypeError::HolderNotLinked
            | PoolTypeError::MissingInput
            | PoolTypeError::GenesisLayoutMismatch => ErrorClass::Position,

            PoolTypeError::InvalidSignature
            | PoolTypeError::MalformedAttestation
            | PoolTypeError::AttestedOutpointMismatch
            | PoolTypeError::DepositTxMismatch => ErrorClass::Attestation,

            PoolTypeError::CommitmentMismatch => ErrorClass::Commitment,

            _ => ErrorClass::Value,
        }
    }

    /// Exit code returned by an on-chain entry point
    pub fn error_code(&self) -> i8 {
        match self.class() {
            ErrorClass::Position => -11,
            ErrorClass::Attestation => -12,
            ErrorClass::Value => -13,
            ErrorClass::Parse => -14,
            ErrorClass::Commitment => -15,
        }
    }
}

impl From<TxParseError> for PoolTypeError {
    fn from(err: TxParseError) -> Self {
        PoolTypeError::TxParse(err)
    }
}

impl From<MathError> for PoolTypeError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::ZeroReserve => PoolTypeError::ZeroReserve,
            MathError::ZeroAmount => PoolTypeError::ZeroAmount,
            MathError::Overflow => PoolTypeError::Overflow,
            MathError::InsufficientReserve => PoolTypeError::InsufficientReserve,
            MathError::ExceedsIssuedSupply => PoolTypeError::ExceedsIssuedSupply,
        }
    }
}

impl From<HolderLockError> for PoolTypeError {
    fn from(err: HolderLockError) -> Self {
        match err {
            HolderLockError::MissingInput => PoolTypeError::MissingInput,
            _ => PoolTypeError::HolderNotLinked,
        }
    }
}
