// ============ Pool Transaction Utilities ============
// Byte-level readers for the two blobs every pool script has to trust:
// - the prevouts commitment (one 36-byte outpoint per input)
// - raw serialized transactions supplied by the spender
//
// Nothing here allocates except varint encoding.

#![cfg_attr(feature = "no_std", no_std)]

#[cfg(feature = "no_std")]
extern crate alloc;
#[cfg(feature = "no_std")]
use alloc::vec::Vec;

// ============ Constants ============

pub const TXID_LEN: usize = 32;
pub const OUTPOINT_LEN: usize = TXID_LEN + 4; // 36
pub const MAX_INPUTS_OUTPUTS: u64 = 32;

// ============ Error Types ============

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxParseError {
    Truncated,
    LengthOverflow,
    TooManyInputs,
    TooManyOutputs,
    OutputIndexOutOfRange,
}

// ============ Byte Cursor ============

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], TxParseError> {
        let end = self.pos.checked_add(len).ok_or(TxParseError::LengthOverflow)?;
        let bytes = self.data.get(self.pos..end).ok_or(TxParseError::Truncated)?;
        self.pos = end;
        Ok(bytes)
    }

    fn skip(&mut self, len: usize) -> Result<(), TxParseError> {
        self.take(len).map(|_| ())
    }

    fn read_u64_le(&mut self) -> Result<u64, TxParseError> {
        let bytes = self.take(8)?;
        Ok(u64::from_le_bytes(bytes.try_into().map_err(|_| TxParseError::Truncated)?))
    }

    fn read_varint(&mut self) -> Result<u64, TxParseError> {
        let (value, next) = varint::read(self.data, self.pos)?;
        self.pos = next;
        Ok(value)
    }

    fn read_var_bytes(&mut self) -> Result<&'a [u8], TxParseError> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| TxParseError::LengthOverflow)?;
        self.take(len)
    }
}

// ============ Compact Size Integers ============

pub mod varint {
    use super::*;

    /// Read a compact size integer at `pos`, returning the value and the
    /// position of the first byte after it. Non-canonical encodings are
    /// accepted as written.
    pub fn read(data: &[u8], pos: usize) -> Result<(u64, usize), TxParseError> {
        let marker = *data.get(pos).ok_or(TxParseError::Truncated)?;
        let width = match marker {
            0xfd => 2,
            0xfe => 4,
            0xff => 8,
            n => return Ok((n as u64, pos + 1)),
        };

        let start = pos + 1;
        let bytes = data.get(start..start + width).ok_or(TxParseError::Truncated)?;
        let mut buf = [0u8; 8];
        buf[..width].copy_from_slice(bytes);
        Ok((u64::from_le_bytes(buf), start + width))
    }

    /// Append the canonical encoding of `value`.
    pub fn write(buf: &mut Vec<u8>, value: u64) {
        match value {
            0..=0xfc => buf.push(value as u8),
            0xfd..=0xffff => {
                buf.push(0xfd);
                buf.extend_from_slice(&(value as u16).to_le_bytes());
            }
            0x1_0000..=0xffff_ffff => {
                buf.push(0xfe);
                buf.extend_from_slice(&(value as u32).to_le_bytes());
            }
            _ => {
                buf.push(0xff);
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
    }

    pub fn encoded_len(value: u64) -> usize {
        match value {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x1_0000..=0xffff_ffff => 5,
            _ => 9,
        }
    }
}

// ============ Prevout Index ============

/// Accessors over the prevouts blob: input `i` spends the outpoint stored at
/// `prevouts[i * 36 .. i * 36 + 36]` (txid, then a 4-byte LE output index).
///
/// Slots past the end of the blob yield `None`; callers check the slots an
/// operation needs before relying on them.
pub mod prevout {
    use super::*;

    pub fn input_count(prevouts: &[u8]) -> usize {
        prevouts.len() / OUTPOINT_LEN
    }

    pub fn get_txid(prevouts: &[u8], i: usize) -> Option<[u8; TXID_LEN]> {
        let offset = i.checked_mul(OUTPOINT_LEN)?;
        prevouts.get(offset..offset + TXID_LEN)?.try_into().ok()
    }

    pub fn get_output_index(prevouts: &[u8], i: usize) -> Option<u64> {
        let offset = i.checked_mul(OUTPOINT_LEN)? + TXID_LEN;
        let bytes: [u8; 4] = prevouts.get(offset..offset + 4)?.try_into().ok()?;
        Some(u32::from_le_bytes(bytes) as u64)
    }

    pub fn get_outpoint(prevouts: &[u8], i: usize) -> Option<([u8; TXID_LEN], u64)> {
        Some((get_txid(prevouts, i)?, get_output_index(prevouts, i)?))
    }
}

// ============ Raw Transaction Reader ============

pub mod raw_tx {
    use super::*;

    /// One output of a raw transaction, borrowed from the transaction bytes.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct OutputRef<'a> {
        pub value: u64,
        pub script: &'a [u8],
    }

    /// Reads a single output out of a serialized transaction.
    ///
    /// Only the layout needed to reach the outputs is understood: version,
    /// inputs (outpoint, script, sequence), then outputs. Lock time is never
    /// read. Input and output counts above `max_entries` are rejected before
    /// any entry is walked.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RawTxReader {
        max_entries: u64,
    }

    impl Default for RawTxReader {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RawTxReader {
        pub const fn new() -> Self {
            Self { max_entries: MAX_INPUTS_OUTPUTS }
        }

        pub const fn with_max_entries(max_entries: u64) -> Self {
            Self { max_entries }
        }

        pub fn max_entries(&self) -> u64 {
            self.max_entries
        }

        pub fn read_output<'a>(
            &self,
            tx: &'a [u8],
            output_index: u64,
        ) -> Result<OutputRef<'a>, TxParseError> {
            let mut cursor = Cursor::new(tx);

            // version
            cursor.skip(4)?;

            let input_count = cursor.read_varint()?;
            if input_count > self.max_entries {
                return Err(TxParseError::TooManyInputs);
            }
            for _ in 0..input_count {
                cursor.skip(OUTPOINT_LEN)?;
                cursor.read_var_bytes()?;
                // sequence
                cursor.skip(4)?;
            }

            let output_count = cursor.read_varint()?;
            if output_count > self.max_entries {
                return Err(TxParseError::TooManyOutputs);
            }
            if output_index >= output_count {
                return Err(TxParseError::OutputIndexOutOfRange);
            }

            for i in 0..output_count {
                let value = cursor.read_u64_le()?;
                let script = cursor.read_var_bytes()?;
                if i == output_index {
                    return Ok(OutputRef { value, script });
                }
            }

            Err(TxParseError::OutputIndexOutOfRange)
        }
    }

    /// Read output `output_index` with the default 32-entry ceiling.
    pub fn read_output(tx: &[u8], output_index: u64) -> Result<OutputRef<'_>, TxParseError> {
        RawTxReader::new().read_output(tx, output_index)
    }
}

// ============ Tests ============
