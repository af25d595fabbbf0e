//! Arbor common library - ledger types shared by the block chain module
//! and its collaborators

pub mod crypto;
pub mod hash;
pub mod types;
pub mod utxo;

// Flattened re-exports
pub use self::hash::{AddressHash, BlockHash, Hash, TxHash};
pub use self::types::*;
pub use self::utxo::UtxoSnapshot;
