// ============ Pool Type Script — CKB-VM Entry Point ============
// The library logic lives in lib.rs; this binary is compiled for RISC-V.

fn main() {
    println!("Pool Type Script — compile with RISC-V target for CKB-VM");
}

// ============ Tests ============
