// ============ Pool Swap Types ============
// Shared record layouts for the pool scripts.
//
// Every on-ledger record (root pool record, currency holder, token holder)
// is a locking script produced by the encoders below. The pool validator
// rebuilds the records it expects to see and compares the hash of the whole
// output set, so these layouts are a consensus contract: change one byte and
// every live pool stops validating.

#![cfg_attr(feature = "no_std", no_std)]

#[cfg(feature = "no_std")]
extern crate alloc;
#[cfg(feature = "no_std")]
use alloc::vec::Vec;

use poolswap_txutil::varint;
pub use poolswap_txutil::{MAX_INPUTS_OUTPUTS, OUTPOINT_LEN, TXID_LEN};
use sha2::{Digest, Sha256};

// ============ Position Constants ============

// Output positions, pinned for the lifetime of a pool
pub const ROOT_POSITION: u64 = 0;
pub const CURRENCY_HOLDER_POSITION: u64 = 1;
pub const TOKEN_HOLDER_POSITION: u64 = 2;

// Prevout slots with a fixed role
pub const ROOT_SLOT: usize = 0;
pub const CURRENCY_HOLDER_SLOT: usize = 1;
pub const TOKEN_HOLDER_SLOT: usize = 2;
pub const ASSET_DEPOSIT_SLOT: usize = 3;
pub const CURRENCY_DEPOSIT_SLOT: usize = 4;

// ============ Record Constants ============

pub const RECORD_MAGIC: [u8; 4] = *b"PSWP";
pub const RECORD_VERSION: u8 = 1;
pub const RECORD_HEADER_LEN: usize = 6;

pub const KIND_ROOT: u8 = 0;
pub const KIND_CURRENCY_HOLDER: u8 = 1;
pub const KIND_TOKEN_HOLDER: u8 = 2;

pub const TOKEN_TRANSFER_TAG: [u8; 2] = *b"TX";
pub const ADDRESS_LEN: usize = 20;
pub const ORACLE_MSG_HEADER_LEN: usize = TXID_LEN + 8; // 40

/// Value carried by outputs whose worth is in a token payload
pub const DUST_VALUE: u64 = 1;

// ============ Default Config ============

pub const DEFAULT_PRIMARY_FUND_PAYOUT: u64 = 2_000;
pub const DEFAULT_SECONDARY_FUND_PAYOUT: u64 = 1_000;

// ============ Action Tags ============

pub const ACTION_ADD_LIQUIDITY: u8 = 0;
pub const ACTION_SWAP_TOKEN_TO_CURRENCY: u8 = 1;
pub const ACTION_SWAP_CURRENCY_TO_TOKEN: u8 = 2;
pub const ACTION_REMOVE_LIQUIDITY: u8 = 3;

// ============ Hashing ============

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Double SHA-256. Transaction ids and the output commitment both use it.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

// ============ Outpoints and Outputs ============

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutPoint {
    pub txid: [u8; 32],
    pub index: u32,
}

impl OutPoint {
    pub const SERIALIZED_SIZE: usize = OUTPOINT_LEN;

    pub fn new(txid: [u8; 32], index: u32) -> Self {
        Self { txid, index }
    }

    pub fn serialize(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut buf = [0u8; Self::SERIALIZED_SIZE];
        buf[0..32].copy_from_slice(&self.txid);
        buf[32..36].copy_from_slice(&self.index.to_le_bytes());
        buf
    }
}

/// Concatenate outpoints into a prevouts blob, in input order.
pub fn serialize_prevouts(outpoints: &[OutPoint]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(outpoints.len() * OUTPOINT_LEN);
    for outpoint in outpoints {
        buf.extend_from_slice(&outpoint.serialize());
    }
    buf
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxOutput {
    pub value: u64,
    pub script: Vec<u8>,
}

impl TxOutput {
    pub fn new(value: u64, script: Vec<u8>) -> Self {
        Self { value, script }
    }

    /// value (8 LE) || compact size script length || script
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.value.to_le_bytes());
        varint::write(buf, self.script.len() as u64);
        buf.extend_from_slice(&self.script);
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + varint::encoded_len(self.script.len() as u64) + self.script.len());
        self.serialize_into(&mut buf);
        buf
    }
}

pub fn serialize_outputs(outputs: &[TxOutput]) -> Vec<u8> {
    let mut buf = Vec::new();
    for output in outputs {
        output.serialize_into(&mut buf);
    }
    buf
}

/// Commitment over a full output set
pub fn hash_outputs(outputs: &[TxOutput]) -> [u8; 32] {
    hash256(&serialize_outputs(outputs))
}

/// Pay-to-pubkey-hash locking script for a 20-byte address
pub fn pay_to_address(address: &[u8; ADDRESS_LEN]) -> Vec<u8> {
    let mut script = Vec::with_capacity(25);
    script.extend_from_slice(&[0x76, 0xa9, 0x14]);
    script.extend_from_slice(address);
    script.extend_from_slice(&[0x88, 0xac]);
    script
}

// ============ Token Descriptors ============

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenInfo {
    pub id: [u8; 32],
    pub symbol: [u8; 8],
    pub max_supply: u64,
    pub decimals: u8,
}

impl TokenInfo {
    pub const SERIALIZED_SIZE: usize = 32 + 8 + 8 + 1; // 49

    pub fn serialize(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut buf = [0u8; Self::SERIALIZED_SIZE];
        buf[0..32].copy_from_slice(&self.id);
        buf[32..40].copy_from_slice(&self.symbol);
        buf[40..48].copy_from_slice(&self.max_supply.to_le_bytes());
        buf[48] = self.decimals;
        buf
    }

    pub fn deserialize(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SERIALIZED_SIZE {
            return None;
        }
        Some(Self {
            id: data[0..32].try_into().ok()?,
            symbol: data[32..40].try_into().ok()?,
            max_supply: u64::from_le_bytes(data[40..48].try_into().ok()?),
            decimals: data[48],
        })
    }
}

/// Prefix marking an output as carrying `amount` units of `token_id`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenTransfer {
    pub token_id: [u8; 32],
    pub amount: u64,
}

impl TokenTransfer {
    pub const SERIALIZED_SIZE: usize = 2 + 32 + 8; // 42

    pub fn serialize(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut buf = [0u8; Self::SERIALIZED_SIZE];
        buf[0..2].copy_from_slice(&TOKEN_TRANSFER_TAG);
        buf[2..34].copy_from_slice(&self.token_id);
        buf[34..42].copy_from_slice(&self.amount.to_le_bytes());
        buf
    }

    pub fn deserialize(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SERIALIZED_SIZE || data[0..2] != TOKEN_TRANSFER_TAG {
            return None;
        }
        Some(Self {
            token_id: data[2..34].try_into().ok()?,
            amount: u64::from_le_bytes(data[34..42].try_into().ok()?),
        })
    }
}

/// Dust output moving `amount` of a token to `script`
pub fn token_output(token_id: &[u8; 32], amount: u64, script: &[u8]) -> TxOutput {
    let transfer = TokenTransfer { token_id: *token_id, amount };
    let mut full = Vec::with_capacity(TokenTransfer::SERIALIZED_SIZE + script.len());
    full.extend_from_slice(&transfer.serialize());
    full.extend_from_slice(script);
    TxOutput::new(DUST_VALUE, full)
}

// ============ Record Headers ============

fn record_header(kind: u8) -> [u8; RECORD_HEADER_LEN] {
    let mut buf = [0u8; RECORD_HEADER_LEN];
    buf[0..4].copy_from_slice(&RECORD_MAGIC);
    buf[4] = kind;
    buf[5] = RECORD_VERSION;
    buf
}

/// Strip and check a record header, returning the record body.
fn strip_header(data: &[u8], kind: u8) -> Option<&[u8]> {
    if data.len() < RECORD_HEADER_LEN
        || data[0..4] != RECORD_MAGIC
        || data[4] != kind
        || data[5] != RECORD_VERSION
    {
        return None;
    }
    Some(&data[RECORD_HEADER_LEN..])
}

// ============ Pool Config ============

/// Fee funds paid a flat amount on every pool transaction.
/// `primary_payout` goes to the side the trader deposits into,
/// `secondary_payout` to the other side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundConfig {
    pub token_fund: [u8; ADDRESS_LEN],
    pub currency_fund: [u8; ADDRESS_LEN],
    pub primary_payout: u64,
    pub secondary_payout: u64,
}

impl Default for FundConfig {
    fn default() -> Self {
        Self {
            token_fund: [0u8; ADDRESS_LEN],
            currency_fund: [0u8; ADDRESS_LEN],
            primary_payout: DEFAULT_PRIMARY_FUND_PAYOUT,
            secondary_payout: DEFAULT_SECONDARY_FUND_PAYOUT,
        }
    }
}

impl FundConfig {
    pub const SERIALIZED_SIZE: usize = 20 + 20 + 8 + 8; // 56

    pub fn serialize(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut buf = [0u8; Self::SERIALIZED_SIZE];
        buf[0..20].copy_from_slice(&self.token_fund);
        buf[20..40].copy_from_slice(&self.currency_fund);
        buf[40..48].copy_from_slice(&self.primary_payout.to_le_bytes());
        buf[48..56].copy_from_slice(&self.secondary_payout.to_le_bytes());
        buf
    }

    pub fn deserialize(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SERIALIZED_SIZE {
            return None;
        }
        Some(Self {
            token_fund: data[0..20].try_into().ok()?,
            currency_fund: data[20..40].try_into().ok()?,
            primary_payout: u64::from_le_bytes(data[40..48].try_into().ok()?),
            secondary_payout: u64::from_le_bytes(data[48..56].try_into().ok()?),
        })
    }

    pub fn token_fund_output(&self, amount: u64) -> TxOutput {
        TxOutput::new(amount, pay_to_address(&self.token_fund))
    }

    pub fn currency_fund_output(&self, amount: u64) -> TxOutput {
        TxOutput::new(amount, pay_to_address(&self.currency_fund))
    }
}

// ============ Pool Record ============

/// Immutable part of a pool, fixed at genesis
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolDescriptor {
    pub token: TokenInfo,
    pub lp_token: TokenInfo,
    pub oracle_pubkey: [u8; 32],
    pub funds: FundConfig,
}

impl PoolDescriptor {
    pub const SERIALIZED_SIZE: usize =
        TokenInfo::SERIALIZED_SIZE * 2 + 32 + FundConfig::SERIALIZED_SIZE; // 186

    pub fn serialize(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut buf = [0u8; Self::SERIALIZED_SIZE];
        let mut offset = 0;

        buf[offset..offset + TokenInfo::SERIALIZED_SIZE].copy_from_slice(&self.token.serialize());
        offset += TokenInfo::SERIALIZED_SIZE;
        buf[offset..offset + TokenInfo::SERIALIZED_SIZE].copy_from_slice(&self.lp_token.serialize());
        offset += TokenInfo::SERIALIZED_SIZE;
        buf[offset..offset + 32].copy_from_slice(&self.oracle_pubkey);
        offset += 32;
        buf[offset..offset + FundConfig::SERIALIZED_SIZE].copy_from_slice(&self.funds.serialize());

        buf
    }

    pub fn deserialize(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SERIALIZED_SIZE {
            return None;
        }
        let mut offset = 0;

        let token = TokenInfo::deserialize(&data[offset..])?;
        offset += TokenInfo::SERIALIZED_SIZE;
        let lp_token = TokenInfo::deserialize(&data[offset..])?;
        offset += TokenInfo::SERIALIZED_SIZE;
        let oracle_pubkey = data[offset..offset + 32].try_into().ok()?;
        offset += 32;
        let funds = FundConfig::deserialize(&data[offset..])?;

        Some(Self { token, lp_token, oracle_pubkey, funds })
    }
}

/// Mutable pool state. Reserves exclude accrued fees; both fee buckets are
/// custodied by the holders on top of the reserves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolState {
    pub token_reserve: u64,
    pub currency_reserve: u64,
    pub lp_remaining: u64,
    pub token_fee_accrued: u64,
    pub currency_fee_accrued: u64,
}

impl PoolState {
    pub const SERIALIZED_SIZE: usize = 8 * 5; // 40

    pub fn serialize(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut buf = [0u8; Self::SERIALIZED_SIZE];
        buf[0..8].copy_from_slice(&self.token_reserve.to_le_bytes());
        buf[8..16].copy_from_slice(&self.currency_reserve.to_le_bytes());
        buf[16..24].copy_from_slice(&self.lp_remaining.to_le_bytes());
        buf[24..32].copy_from_slice(&self.token_fee_accrued.to_le_bytes());
        buf[32..40].copy_from_slice(&self.currency_fee_accrued.to_le_bytes());
        buf
    }

    pub fn deserialize(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SERIALIZED_SIZE {
            return None;
        }
        Some(Self {
            token_reserve: u64::from_le_bytes(data[0..8].try_into().ok()?),
            currency_reserve: u64::from_le_bytes(data[8..16].try_into().ok()?),
            lp_remaining: u64::from_le_bytes(data[16..24].try_into().ok()?),
            token_fee_accrued: u64::from_le_bytes(data[24..32].try_into().ok()?),
            currency_fee_accrued: u64::from_le_bytes(data[32..40].try_into().ok()?),
        })
    }

    pub fn is_drained(&self) -> bool {
        self.token_reserve == 0 && self.currency_reserve == 0
    }

    /// Token units the token holder must carry
    pub fn token_custody(&self) -> Option<u64> {
        self.token_reserve.checked_add(self.token_fee_accrued)
    }

    /// Currency units the currency holder must carry
    pub fn currency_custody(&self) -> Option<u64> {
        self.currency_reserve.checked_add(self.currency_fee_accrued)
    }
}

/// Root pool record: descriptor and state, carried at output 0.
/// The locking script is an LP transfer of the undistributed LP supply
/// followed by the record body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolRecord {
    pub descriptor: PoolDescriptor,
    pub state: PoolState,
}

impl PoolRecord {
    pub const BODY_SIZE: usize =
        RECORD_HEADER_LEN + PoolDescriptor::SERIALIZED_SIZE + PoolState::SERIALIZED_SIZE; // 232

    pub fn new(descriptor: PoolDescriptor, state: PoolState) -> Self {
        Self { descriptor, state }
    }

    pub fn lp_max(&self) -> u64 {
        self.descriptor.lp_token.max_supply
    }

    /// LP units in circulation, `None` if the state is corrupt
    pub fn lp_issued(&self) -> Option<u64> {
        self.lp_max().checked_sub(self.state.lp_remaining)
    }

    pub fn with_state(&self, state: PoolState) -> Self {
        Self { descriptor: self.descriptor.clone(), state }
    }

    pub fn serialize_body(&self) -> [u8; Self::BODY_SIZE] {
        let mut buf = [0u8; Self::BODY_SIZE];
        let mut offset = 0;

        buf[offset..offset + RECORD_HEADER_LEN].copy_from_slice(&record_header(KIND_ROOT));
        offset += RECORD_HEADER_LEN;
        buf[offset..offset + PoolDescriptor::SERIALIZED_SIZE].copy_from_slice(&self.descriptor.serialize());
        offset += PoolDescriptor::SERIALIZED_SIZE;
        buf[offset..offset + PoolState::SERIALIZED_SIZE].copy_from_slice(&self.state.serialize());

        buf
    }

    pub fn deserialize_body(data: &[u8]) -> Option<Self> {
        let body = strip_header(data, KIND_ROOT)?;
        let descriptor = PoolDescriptor::deserialize(body)?;
        let state = PoolState::deserialize(&body[PoolDescriptor::SERIALIZED_SIZE..])?;
        Some(Self { descriptor, state })
    }

    pub fn locking_script(&self) -> Vec<u8> {
        let transfer = TokenTransfer {
            token_id: self.descriptor.lp_token.id,
            amount: self.state.lp_remaining,
        };
        let mut script = Vec::with_capacity(TokenTransfer::SERIALIZED_SIZE + Self::BODY_SIZE);
        script.extend_from_slice(&transfer.serialize());
        script.extend_from_slice(&self.serialize_body());
        script
    }

    /// Parse a root locking script. The LP transfer prefix must agree with
    /// the record it wraps, and nothing may follow the body.
    pub fn from_locking_script(script: &[u8]) -> Option<Self> {
        if script.len() != TokenTransfer::SERIALIZED_SIZE + Self::BODY_SIZE {
            return None;
        }
        let transfer = TokenTransfer::deserialize(script)?;
        let record = Self::deserialize_body(&script[TokenTransfer::SERIALIZED_SIZE..])?;
        if transfer.token_id != record.descriptor.lp_token.id
            || transfer.amount != record.state.lp_remaining
        {
            return None;
        }
        Some(record)
    }

    pub fn output(&self) -> TxOutput {
        TxOutput::new(DUST_VALUE, self.locking_script())
    }
}

// ============ Holder Records ============

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HolderAsset {
    Currency,
    Token(TokenInfo),
}

/// Custody shell for one reserve asset, pinned to `position`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HolderRecord {
    pub asset: HolderAsset,
    pub position: u64,
}

impl HolderRecord {
    pub fn currency() -> Self {
        Self { asset: HolderAsset::Currency, position: CURRENCY_HOLDER_POSITION }
    }

    pub fn token(token: TokenInfo) -> Self {
        Self { asset: HolderAsset::Token(token), position: TOKEN_HOLDER_POSITION }
    }

    pub fn kind(&self) -> u8 {
        match self.asset {
            HolderAsset::Currency => KIND_CURRENCY_HOLDER,
            HolderAsset::Token(_) => KIND_TOKEN_HOLDER,
        }
    }

    pub fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(RECORD_HEADER_LEN + TokenInfo::SERIALIZED_SIZE + 8);
        buf.extend_from_slice(&record_header(self.kind()));
        if let HolderAsset::Token(token) = &self.asset {
            buf.extend_from_slice(&token.serialize());
        }
        buf.extend_from_slice(&self.position.to_le_bytes());
        buf
    }

    pub fn deserialize_body(data: &[u8]) -> Option<Self> {
        let (asset, rest) = if let Some(body) = strip_header(data, KIND_CURRENCY_HOLDER) {
            (HolderAsset::Currency, body)
        } else {
            let body = strip_header(data, KIND_TOKEN_HOLDER)?;
            let token = TokenInfo::deserialize(body)?;
            (HolderAsset::Token(token), &body[TokenInfo::SERIALIZED_SIZE..])
        };
        if rest.len() != 8 {
            return None;
        }
        let position = u64::from_le_bytes(rest.try_into().ok()?);
        Some(Self { asset, position })
    }

    /// Parse a holder locking script, skipping the token transfer prefix
    /// a token holder carries.
    pub fn from_locking_script(script: &[u8]) -> Option<Self> {
        match TokenTransfer::deserialize(script) {
            Some(_) => Self::deserialize_body(&script[TokenTransfer::SERIALIZED_SIZE..]),
            None => Self::deserialize_body(script),
        }
    }

    /// Output custodying `amount` units of the held asset
    pub fn output(&self, amount: u64) -> TxOutput {
        match &self.asset {
            HolderAsset::Currency => TxOutput::new(amount, self.serialize_body()),
            HolderAsset::Token(token) => token_output(&token.id, amount, &self.serialize_body()),
        }
    }
}

// ============ Oracle Messages ============

/// `[txid (32)][output index (8 LE)][amount (LE, any width)]`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OracleMessage {
    pub txid: [u8; 32],
    pub output_index: u64,
    pub amount: u64,
}

impl OracleMessage {
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ORACLE_MSG_HEADER_LEN + 8);
        buf.extend_from_slice(&self.txid);
        buf.extend_from_slice(&self.output_index.to_le_bytes());
        buf.extend_from_slice(&self.amount.to_le_bytes());
        buf
    }

    /// Amounts wider than 8 bytes are accepted only when the extra
    /// high-order bytes are zero.
    pub fn deserialize(data: &[u8]) -> Option<Self> {
        if data.len() < ORACLE_MSG_HEADER_LEN {
            return None;
        }
        let txid = data[0..32].try_into().ok()?;
        let output_index = u64::from_le_bytes(data[32..40].try_into().ok()?);

        let amount_bytes = &data[ORACLE_MSG_HEADER_LEN..];
        let (low, high) = amount_bytes.split_at(amount_bytes.len().min(8));
        if high.iter().any(|&b| b != 0) {
            return None;
        }
        let mut buf = [0u8; 8];
        buf[..low.len()].copy_from_slice(low);

        Some(Self { txid, output_index, amount: u64::from_le_bytes(buf) })
    }
}

/// Oracle message plus its signature, as submitted by the spender
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attestation {
    pub message: Vec<u8>,
    pub signature: Vec<u8>,
}

// ============ Pool Actions (Witness) ============

/// One pool transition, as carried in the spending witness.
/// Scripts are full locking scripts of the recipients.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolAction {
    AddLiquidity {
        attestation: Attestation,
        deposit_tx: Vec<u8>,
        recipient: Vec<u8>,
    },
    SwapTokenToCurrency {
        attestation: Attestation,
        recipient: Vec<u8>,
        app_fee_script: Vec<u8>,
    },
    SwapCurrencyToToken {
        deposit_tx: Vec<u8>,
        recipient: Vec<u8>,
        app_fee_script: Vec<u8>,
    },
    RemoveLiquidity {
        attestation: Attestation,
        token_recipient: Vec<u8>,
        currency_recipient: Vec<u8>,
    },
}

fn write_field(buf: &mut Vec<u8>, field: &[u8]) {
    buf.extend_from_slice(&(field.len() as u32).to_le_bytes());
    buf.extend_from_slice(field);
}

struct FieldReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> FieldReader<'a> {
    fn next(&mut self) -> Option<Vec<u8>> {
        let len_bytes: [u8; 4] = self.data.get(self.offset..self.offset + 4)?.try_into().ok()?;
        let len = u32::from_le_bytes(len_bytes) as usize;
        let start = self.offset + 4;
        let field = self.data.get(start..start.checked_add(len)?)?;
        self.offset = start + len;
        Some(field.to_vec())
    }

    fn attestation(&mut self) -> Option<Attestation> {
        Some(Attestation { message: self.next()?, signature: self.next()? })
    }

    fn finished(&self) -> bool {
        self.offset == self.data.len()
    }
}

impl PoolAction {
    pub fn tag(&self) -> u8 {
        match self {
            PoolAction::AddLiquidity { .. } => ACTION_ADD_LIQUIDITY,
            PoolAction::SwapTokenToCurrency { .. } => ACTION_SWAP_TOKEN_TO_CURRENCY,
            PoolAction::SwapCurrencyToToken { .. } => ACTION_SWAP_CURRENCY_TO_TOKEN,
            PoolAction::RemoveLiquidity { .. } => ACTION_REMOVE_LIQUIDITY,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.push(self.tag());
        match self {
            PoolAction::AddLiquidity { attestation, deposit_tx, recipient } => {
                write_field(&mut buf, &attestation.message);
                write_field(&mut buf, &attestation.signature);
                write_field(&mut buf, deposit_tx);
                write_field(&mut buf, recipient);
            }
            PoolAction::SwapTokenToCurrency { attestation, recipient, app_fee_script } => {
                write_field(&mut buf, &attestation.message);
                write_field(&mut buf, &attestation.signature);
                write_field(&mut buf, recipient);
                write_field(&mut buf, app_fee_script);
            }
            PoolAction::SwapCurrencyToToken { deposit_tx, recipient, app_fee_script } => {
                write_field(&mut buf, deposit_tx);
                write_field(&mut buf, recipient);
                write_field(&mut buf, app_fee_script);
            }
            PoolAction::RemoveLiquidity { attestation, token_recipient, currency_recipient } => {
                write_field(&mut buf, &attestation.message);
                write_field(&mut buf, &attestation.signature);
                write_field(&mut buf, token_recipient);
                write_field(&mut buf, currency_recipient);
            }
        }
        buf
    }

    pub fn deserialize(data: &[u8]) -> Option<Self> {
        let (&tag, rest) = data.split_first()?;
        let mut reader = FieldReader { data: rest, offset: 0 };

        let action = match tag {
            ACTION_ADD_LIQUIDITY => PoolAction::AddLiquidity {
                attestation: reader.attestation()?,
                deposit_tx: reader.next()?,
                recipient: reader.next()?,
            },
            ACTION_SWAP_TOKEN_TO_CURRENCY => PoolAction::SwapTokenToCurrency {
                attestation: reader.attestation()?,
                recipient: reader.next()?,
                app_fee_script: reader.next()?,
            },
            ACTION_SWAP_CURRENCY_TO_TOKEN => PoolAction::SwapCurrencyToToken {
                deposit_tx: reader.next()?,
                recipient: reader.next()?,
                app_fee_script: reader.next()?,
            },
            ACTION_REMOVE_LIQUIDITY => PoolAction::RemoveLiquidity {
                attestation: reader.attestation()?,
                token_recipient: reader.next()?,
                currency_recipient: reader.next()?,
            },
            _ => return None,
        };

        if !reader.finished() {
            return None;
        }
        Some(action)
    }
}

// ============ Tests ============
