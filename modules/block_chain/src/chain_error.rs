//! Error types for block acceptance and transaction validation.

use arbor_common::{BlockHash, UTxOIdentifier};

/// Reasons a candidate block is turned away by
/// [`ForkTree::add_block`](crate::fork_tree::ForkTree::add_block).
///
/// All of these are ordinary bad input: the tree is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockRejection {
    /// The block claims to be a genesis block.
    #[error("block {hash} has no parent reference")]
    MissingParentReference { hash: BlockHash },

    /// A block with this hash is already in the tree.
    #[error("block already known: {hash}")]
    AlreadyKnown { hash: BlockHash },

    /// The parent hash is not in the tree (orphan or pruned).
    #[error("parent not found: {hash}")]
    UnknownParent { hash: BlockHash },

    /// The parent is too far behind the best chain to be extended.
    #[error(
        "parent height {parent_height} outside retention window: best {best_height}, cut-off age {cut_off_age}"
    )]
    ParentOutsideWindow {
        parent_height: u64,
        best_height: u64,
        cut_off_age: u64,
    },

    /// At least one transaction failed validation.
    #[error("only {accepted} of {submitted} transactions valid")]
    InvalidTransactions { accepted: usize, submitted: usize },
}

/// Why a single transaction is invalid against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionValidationError {
    /// Only coinbase transactions may have no inputs.
    #[error("transaction has no inputs")]
    NoInputs,

    /// An input refers to an output that is not unspent.
    #[error("input {utxo} is not unspent")]
    MissingInput { utxo: UTxOIdentifier },

    /// The same output is claimed twice by one transaction.
    #[error("input {utxo} claimed more than once")]
    DuplicateInput { utxo: UTxOIdentifier },

    /// More value is produced than consumed.
    #[error("value not conserved: consumed {consumed}, produced {produced}")]
    ValueNotConserved { consumed: u128, produced: u128 },
}
