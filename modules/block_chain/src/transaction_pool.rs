//! Pool of transactions waiting to be included in a block.
//!
//! Independent of chain state: entries are only added and removed
//! explicitly, never on block acceptance.

use std::collections::HashMap;

use arbor_common::{Transaction, TxHash};

#[derive(Debug, Default, Clone)]
pub struct TransactionPool {
    transactions: HashMap<TxHash, Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transaction; returns false if one with the same hash is
    /// already pooled
    pub fn add_transaction(&mut self, tx: Transaction) -> bool {
        let hash = tx.hash();
        if self.transactions.contains_key(&hash) {
            return false;
        }
        self.transactions.insert(hash, tx);
        true
    }

    pub fn remove_transaction(&mut self, hash: &TxHash) -> Option<Transaction> {
        self.transactions.remove(hash)
    }

    pub fn get_transaction(&self, hash: &TxHash) -> Option<&Transaction> {
        self.transactions.get(hash)
    }

    pub fn contains(&self, hash: &TxHash) -> bool {
        self.transactions.contains_key(hash)
    }

    /// Copy of every pooled transaction, in no particular order
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
