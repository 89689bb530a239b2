// ============ Holder Lock Script — CKB-VM Entry Point ============
// Lock script for the currency and token holder cells of a pool.
// On CKB the holder record lives in the cell data; capacity is the value.

#![cfg_attr(feature = "ckb", no_std)]
#![cfg_attr(feature = "ckb", no_main)]

#[cfg(feature = "ckb")]
extern crate alloc;

#[cfg(feature = "ckb")]
ckb_std::default_alloc!();

#[cfg(feature = "ckb")]
ckb_std::entry!(program);

// ============ CKB-VM Entry Point ============

#[cfg(feature = "ckb")]
fn program() -> i8 {
    use alloc::vec::Vec;
    use ckb_std::ckb_constants::Source;
    use ckb_std::ckb_types::prelude::*;
    use ckb_std::debug;
    use ckb_std::high_level::{load_cell_data, load_input_out_point, QueryIter};
    use holder_lock::verify_holder_lock;
    use poolswap_types::OutPoint;

    let own = match load_input_out_point(0, Source::GroupInput) {
        Ok(o) => o,
        Err(_) => return -1,
    };
    let mut txid = [0u8; 32];
    txid.copy_from_slice(&own.tx_hash().raw_data());
    let index: u32 = own.index().unpack();

    let holder_data = match load_cell_data(0, Source::GroupInput) {
        Ok(d) => d,
        Err(_) => return -1,
    };

    // Rebuild the prevouts blob from every input of the transaction
    let mut prevouts = Vec::new();
    for out_point in QueryIter::new(load_input_out_point, Source::Input) {
        prevouts.extend_from_slice(&out_point.tx_hash().raw_data());
        let idx: u32 = out_point.index().unpack();
        prevouts.extend_from_slice(&idx.to_le_bytes());
    }

    match verify_holder_lock(&holder_data, &prevouts, &OutPoint::new(txid, index)) {
        Ok(()) => 0,
        Err(err) => {
            debug!("holder lock rejected: {:?}", err);
            err.error_code()
        }
    }
}

// ============ Native Entry Point ============

#[cfg(not(feature = "ckb"))]
fn main() {
    println!("Holder Lock Script — compile with --features ckb for CKB-VM");
}

// ============ Tests ============
