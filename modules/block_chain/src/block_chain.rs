//! Arbor block chain module
//! Tracks every fork inside a bounded retention window, the best chain
//! among them and the unspent outputs at each block

pub mod block_node;
pub mod chain_error;
pub mod chain_observer;
pub mod configuration;
pub mod fork_tree;
pub mod height_index;
pub mod transaction_pool;
pub mod tx_validator;

#[cfg(test)]
mod test_utils;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arbor_common::{Block, BlockHash, Transaction, UtxoSnapshot};
use tracing::debug;

pub use chain_error::{BlockRejection, TransactionValidationError};
pub use chain_observer::BlockChainObserver;
pub use configuration::BlockChainConfig;
pub use fork_tree::ForkTree;
pub use transaction_pool::TransactionPool;
pub use tx_validator::{TransactionValidator, UtxoTransactionValidator, ValidatedTransactions};

use chain_observer::NoOpObserver;

/// Everything guarded by the acceptance lock
struct ChainState {
    tree: ForkTree,
    validator: Box<dyn TransactionValidator + Send>,
}

/// Fork-aware block chain
///
/// All methods take `&self`, so one instance can be shared between threads.
/// Block acceptance and pruning run under a single lock; the pending
/// transaction pool has its own.
pub struct BlockChain {
    state: Mutex<ChainState>,
    pool: Arc<Mutex<TransactionPool>>,
}

impl BlockChain {
    /// Start a chain from a trusted genesis block with default settings
    pub fn new(genesis: Block) -> Self {
        Self::with_config(genesis, BlockChainConfig::default())
    }

    pub fn with_config(genesis: Block, config: BlockChainConfig) -> Self {
        Self::with_parts(
            genesis,
            config,
            Box::new(UtxoTransactionValidator),
            Box::new(NoOpObserver),
        )
    }

    /// Start a chain with a custom validator and observer
    pub fn with_parts(
        genesis: Block,
        config: BlockChainConfig,
        validator: Box<dyn TransactionValidator + Send>,
        observer: Box<dyn BlockChainObserver + Send>,
    ) -> Self {
        let tree = ForkTree::new(genesis, config.cut_off_age, observer);
        Self {
            state: Mutex::new(ChainState { tree, validator }),
            pool: Arc::new(Mutex::new(TransactionPool::new())),
        }
    }

    // Every mutation completes before its guard drops, so a poisoned
    // lock still holds consistent state
    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The block at the tip of the best chain
    pub fn max_height_block(&self) -> Arc<Block> {
        self.state().tree.best().block.clone()
    }

    /// Private copy of the best block's snapshot, free to mutate
    pub fn max_height_snapshot(&self) -> UtxoSnapshot {
        self.state().tree.best().snapshot_copy()
    }

    /// The live pending-transaction pool, shared with every other holder
    pub fn pending_transaction_pool(&self) -> Arc<Mutex<TransactionPool>> {
        self.pool.clone()
    }

    /// Add a transaction to the pending pool; false if already pooled
    pub fn add_transaction(&self, tx: Transaction) -> bool {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner).add_transaction(tx)
    }

    /// Offer a block; true if it was accepted into the tree
    pub fn add_block(&self, block: Block) -> bool {
        self.try_add_block(block).is_ok()
    }

    /// Offer a block, returning its hash or why it was turned away
    pub fn try_add_block(&self, block: Block) -> Result<BlockHash, BlockRejection> {
        let mut state = self.state();
        let ChainState { tree, validator } = &mut *state;

        let result = tree.add_block(block, validator.as_ref());
        if let Err(e) = &result {
            debug!("Block rejected: {e}");
        }
        result
    }

    pub fn best_hash(&self) -> BlockHash {
        self.state().tree.best_hash()
    }

    pub fn best_height(&self) -> u64 {
        self.state().tree.best_height()
    }

    /// Number of blocks currently retained
    pub fn block_count(&self) -> usize {
        self.state().tree.len()
    }

    pub fn cut_off_age(&self) -> u64 {
        self.state().tree.cut_off_age()
    }

    pub fn contains_block(&self, hash: &BlockHash) -> bool {
        self.state().tree.contains(hash)
    }

    pub fn get_block(&self, hash: &BlockHash) -> Option<Arc<Block>> {
        self.state().tree.get_block(hash).map(|node| node.block.clone())
    }

    pub fn height_of(&self, hash: &BlockHash) -> Option<u64> {
        self.state().tree.get_block(hash).map(|node| node.height)
    }

    /// Private copy of the snapshot after the given block
    pub fn snapshot_at(&self, hash: &BlockHash) -> Option<UtxoSnapshot> {
        self.state().tree.get_block(hash).map(|node| node.snapshot_copy())
    }

    /// Retained hashes of the best chain, oldest first
    pub fn canonical_chain(&self) -> Vec<BlockHash> {
        self.state().tree.canonical_chain()
    }

    pub fn find_common_ancestor(&self, a: BlockHash, b: BlockHash) -> Option<BlockHash> {
        self.state().tree.find_common_ancestor(a, b)
    }
}
