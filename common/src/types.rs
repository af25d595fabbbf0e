//! Definition of Arbor ledger types
//!
//! Blocks and transactions are immutable once built; their identities are
//! Blake2b-256 hashes over a fixed little-endian byte encoding.

use crate::crypto::blake2b_256;
use crate::hash::{AddressHash, BlockHash, TxHash};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a single transaction output
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UTxOIdentifier {
    /// Hash of the transaction which created the output
    pub tx_hash: TxHash,

    /// Position of the output within that transaction
    pub output_index: u32,
}

impl UTxOIdentifier {
    pub fn new(tx_hash: TxHash, output_index: u32) -> Self {
        Self {
            tx_hash,
            output_index,
        }
    }
}

impl fmt::Display for UTxOIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_hash, self.output_index)
    }
}

/// Value locked to an address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: AddressHash,
    pub value: u64,
}

impl TxOutput {
    pub fn new(address: AddressHash, value: u64) -> Self {
        Self { address, value }
    }
}

/// Claim on an existing output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxInput {
    pub utxo: UTxOIdentifier,

    /// Opaque witness; checked by the signature layer, not here
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
}

impl TxInput {
    pub fn new(utxo: UTxOIdentifier) -> Self {
        Self {
            utxo,
            signature: Vec::new(),
        }
    }
}

/// A transaction moving value from spent outputs to new ones.
///
/// A transaction without inputs is a coinbase: its outputs are newly minted
/// value and only valid as a block's reward transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,

    /// Distinguishes otherwise identical transactions, e.g. two coinbases
    /// paying the same reward to the same address
    pub nonce: u64,
}

impl Transaction {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            inputs,
            outputs,
            nonce: 0,
        }
    }

    /// Reward transaction paying `value` to `address`
    pub fn coinbase(address: AddressHash, value: u64, nonce: u64) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: vec![TxOutput::new(address, value)],
            nonce,
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Sum of all output values, `None` on overflow
    pub fn total_output(&self) -> Option<u64> {
        self.outputs.iter().try_fold(0u64, |acc, output| acc.checked_add(output.value))
    }

    /// Identifiers of the outputs this transaction creates, in order
    pub fn output_identifiers(&self) -> impl Iterator<Item = (UTxOIdentifier, &TxOutput)> + '_ {
        let tx_hash = self.hash();
        self.outputs
            .iter()
            .enumerate()
            .map(move |(index, output)| (UTxOIdentifier::new(tx_hash, index as u32), output))
    }

    pub fn hash(&self) -> TxHash {
        let mut buffer = Vec::new();
        self.encode_into(&mut buffer);
        blake2b_256(&buffer)
    }

    fn encode_into(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            buffer.extend_from_slice(input.utxo.tx_hash.as_ref());
            buffer.extend_from_slice(&input.utxo.output_index.to_le_bytes());
            buffer.extend_from_slice(&(input.signature.len() as u32).to_le_bytes());
            buffer.extend_from_slice(&input.signature);
        }

        buffer.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            buffer.extend_from_slice(output.address.as_ref());
            buffer.extend_from_slice(&output.value.to_le_bytes());
        }

        buffer.extend_from_slice(&self.nonce.to_le_bytes());
    }
}

/// A block: a coinbase reward plus an ordered list of regular transactions,
/// linked to its parent by hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Parent block hash; `None` only for genesis
    pub parent: Option<BlockHash>,
    pub coinbase: Transaction,
    pub transactions: Vec<Transaction>,
    pub nonce: u64,
}

impl Block {
    pub fn new(parent: BlockHash, coinbase: Transaction, transactions: Vec<Transaction>) -> Self {
        Self {
            parent: Some(parent),
            coinbase,
            transactions,
            nonce: 0,
        }
    }

    pub fn genesis(coinbase: Transaction) -> Self {
        Self {
            parent: None,
            coinbase,
            transactions: Vec::new(),
            nonce: 0,
        }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn parent(&self) -> Option<BlockHash> {
        self.parent
    }

    pub fn hash(&self) -> BlockHash {
        let mut buffer = Vec::new();
        match &self.parent {
            Some(parent) => {
                buffer.push(1);
                buffer.extend_from_slice(parent.as_ref());
            }
            None => buffer.push(0),
        }
        buffer.extend_from_slice(self.coinbase.hash().as_ref());
        buffer.extend_from_slice(&(self.transactions.len() as u32).to_le_bytes());
        for tx in &self.transactions {
            buffer.extend_from_slice(tx.hash().as_ref());
        }
        buffer.extend_from_slice(&self.nonce.to_le_bytes());
        blake2b_256(&buffer)
    }
}
