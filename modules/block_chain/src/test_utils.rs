//! Builders for blocks and transactions used across the module's tests.

use std::sync::atomic::{AtomicU64, Ordering};

use arbor_common::{
    AddressHash, Block, Transaction, TxInput, TxOutput, UTxOIdentifier, UtxoSnapshot,
};

pub const REWARD: u64 = 25;

static NEXT_NONCE: AtomicU64 = AtomicU64::new(1);

fn next_nonce() -> u64 {
    NEXT_NONCE.fetch_add(1, Ordering::Relaxed)
}

pub fn address(n: u8) -> AddressHash {
    AddressHash::new([n; 28])
}

pub fn genesis() -> Block {
    Block::genesis(Transaction::coinbase(address(0), REWARD, 0))
}

/// Fresh coinbase, never equal to any other built by these helpers
pub fn coinbase() -> Transaction {
    Transaction::coinbase(address(1), REWARD, next_nonce())
}

/// Empty block on top of `parent`
pub fn child(parent: &Block) -> Block {
    child_with(parent, Vec::new())
}

/// Block on top of `parent` carrying the given transactions
pub fn child_with(parent: &Block, transactions: Vec<Transaction>) -> Block {
    Block::new(parent.hash(), coinbase(), transactions)
}

/// The single output created by a block's coinbase
pub fn coinbase_utxo(block: &Block) -> UTxOIdentifier {
    UTxOIdentifier::new(block.coinbase.hash(), 0)
}

/// Spend `inputs`, paying `(address, value)` pairs
pub fn spend(inputs: &[UTxOIdentifier], outputs: &[(u8, u64)]) -> Transaction {
    Transaction::new(
        inputs.iter().copied().map(TxInput::new).collect(),
        outputs.iter().map(|&(to, value)| TxOutput::new(address(to), value)).collect(),
    )
}

/// Snapshot holding a single output of the given value
pub fn funded_snapshot(value: u64) -> (UtxoSnapshot, UTxOIdentifier) {
    let tx = Transaction::coinbase(address(1), value, next_nonce());
    let mut snapshot = UtxoSnapshot::new();
    snapshot.apply_outputs(tx.hash(), &tx.outputs);
    (snapshot, UTxOIdentifier::new(tx.hash(), 0))
}
