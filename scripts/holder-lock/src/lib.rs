// ============ Holder Lock Script — Library ============
// Lock for the two custody records that travel with a pool root record.
//
// A pool lives in three outputs of one transaction:
//   0 = root record (state + LP supply)
//   1 = currency holder
//   2 = token holder
// The three are always spent together and recreated together. Relocking is
// checked by the root's type logic; this lock only proves that a holder is
// being spent alongside the root and sibling it was created with, so a stale
// holder can never be paired with a newer root or vice versa.

#![cfg_attr(feature = "ckb", no_std)]

use poolswap_txutil::prevout;
use poolswap_types::{
    HolderRecord, OutPoint, CURRENCY_HOLDER_POSITION, CURRENCY_HOLDER_SLOT, ROOT_SLOT,
    TOKEN_HOLDER_POSITION, TOKEN_HOLDER_SLOT,
};

// ============ Script Entry Point ============

/// Holder lock verification
///
/// - `holder_data` is the holder record being unlocked
/// - `prevouts` is the spending transaction's prevouts blob
/// - `outpoint` is the outpoint this holder is spent from
pub fn verify_holder_lock(
    holder_data: &[u8],
    prevouts: &[u8],
    outpoint: &OutPoint,
) -> Result<(), HolderLockError> {
    let record = HolderRecord::from_locking_script(holder_data)
        .ok_or(HolderLockError::InvalidRecord)?;

    verify_holder(prevouts, outpoint.index as u64, record.position, &outpoint.txid)
}

// ============ Peg Checks ============

/// A holder spent from output `self_output_index` of `self_prev_txid`:
/// - must sit at its declared position
/// - input 0 (the root) must come from the same transaction
/// - the other holder's input must come from the same transaction
pub fn verify_holder(
    prevouts: &[u8],
    self_output_index: u64,
    declared_position: u64,
    self_prev_txid: &[u8; 32],
) -> Result<(), HolderLockError> {
    let sibling_slot = match declared_position {
        CURRENCY_HOLDER_POSITION => TOKEN_HOLDER_SLOT,
        TOKEN_HOLDER_POSITION => CURRENCY_HOLDER_SLOT,
        _ => return Err(HolderLockError::InvalidPosition),
    };

    if self_output_index != declared_position {
        return Err(HolderLockError::WrongPosition);
    }

    let root_txid = prevout::get_txid(prevouts, ROOT_SLOT).ok_or(HolderLockError::MissingInput)?;
    if &root_txid != self_prev_txid {
        return Err(HolderLockError::RootNotLinked);
    }

    let sibling_txid =
        prevout::get_txid(prevouts, sibling_slot).ok_or(HolderLockError::MissingInput)?;
    if &sibling_txid != self_prev_txid {
        return Err(HolderLockError::SiblingNotLinked);
    }

    Ok(())
}

/// Root-side counterpart: both holder inputs must come from the
/// transaction the root itself is spent from.
pub fn verify_holders(prevouts: &[u8], self_txid: &[u8; 32]) -> Result<(), HolderLockError> {
    let currency_txid =
        prevout::get_txid(prevouts, CURRENCY_HOLDER_SLOT).ok_or(HolderLockError::MissingInput)?;
    if &currency_txid != self_txid {
        return Err(HolderLockError::CurrencyHolderNotLinked);
    }

    let token_txid =
        prevout::get_txid(prevouts, TOKEN_HOLDER_SLOT).ok_or(HolderLockError::MissingInput)?;
    if &token_txid != self_txid {
        return Err(HolderLockError::TokenHolderNotLinked);
    }

    Ok(())
}

// ============ Error Types ============

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolderLockError {
    InvalidRecord,
    InvalidPosition,
    WrongPosition,
    MissingInput,
    RootNotLinked,
    SiblingNotLinked,
    CurrencyHolderNotLinked,
    TokenHolderNotLinked,
}

impl HolderLockError {
    /// Exit code returned by the on-chain entry point
    pub fn error_code(&self) -> i8 {
        match self {
            HolderLockError::InvalidRecord => -2,
            HolderLockError::InvalidPosition => -3,
            HolderLockError::WrongPosition => -4,
            HolderLockError::MissingInput => -5,
            HolderLockError::RootNotLinked => -6,
            HolderLockError::SiblingNotLinked => -7,
            HolderLockError::CurrencyHolderNotLinked => -8,
            HolderLockError::TokenHolderNotLinked => -9,
        }
    }
}
