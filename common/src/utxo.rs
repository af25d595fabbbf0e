//! Unspent-output snapshot for one point in chain history.
//!
//! Backed by a persistent hash map, so cloning is O(1) and later mutations
//! copy only the touched paths. A clone can be changed freely without
//! affecting the snapshot it was taken from.

use crate::hash::TxHash;
use crate::types::{TxOutput, UTxOIdentifier};
use imbl::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoSnapshot {
    utxos: HashMap<UTxOIdentifier, TxOutput>,
}

impl UtxoSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every output of transaction `tx_hash`, indexed by position
    pub fn apply_outputs(&mut self, tx_hash: TxHash, outputs: &[TxOutput]) {
        for (index, output) in outputs.iter().enumerate() {
            self.utxos.insert(UTxOIdentifier::new(tx_hash, index as u32), output.clone());
        }
    }

    /// Add a single output
    pub fn add(&mut self, id: UTxOIdentifier, output: TxOutput) {
        self.utxos.insert(id, output);
    }

    /// Remove an output, returning it if it was unspent
    pub fn spend(&mut self, id: &UTxOIdentifier) -> Option<TxOutput> {
        self.utxos.remove(id)
    }

    pub fn lookup(&self, id: &UTxOIdentifier) -> Option<&TxOutput> {
        self.utxos.get(id)
    }

    pub fn contains(&self, id: &UTxOIdentifier) -> bool {
        self.utxos.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Sum of all unspent value, saturating at `u64::MAX`
    pub fn total_value(&self) -> u64 {
        self.utxos.values().fold(0u64, |acc, output| acc.saturating_add(output.value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UTxOIdentifier, &TxOutput)> {
        self.utxos.iter()
    }
}
