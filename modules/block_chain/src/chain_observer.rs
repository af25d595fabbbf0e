//! Observer trait for fork tree events.

use arbor_common::BlockHash;

/// Callback receiver for fork tree events.
///
/// Called from inside the acceptance critical section, so
/// implementations must not call back into the block chain.
pub trait BlockChainObserver {
    /// A block has been accepted into the tree at the given height.
    fn block_accepted(&self, height: u64, hash: BlockHash);

    /// The best chain moved to a block that does not extend the old best.
    ///
    /// `common_ancestor` is `None` when the fork point has already been
    /// pruned.
    fn best_chain_switched(&self, from: BlockHash, to: BlockHash, common_ancestor: Option<BlockHash>);

    /// Blocks have fallen out of the retention window and been removed.
    fn blocks_pruned(&self, hashes: &[BlockHash]);
}

/// Observer used when the owner is not interested in events.
pub(crate) struct NoOpObserver;

impl BlockChainObserver for NoOpObserver {
    fn block_accepted(&self, _: u64, _: BlockHash) {}
    fn best_chain_switched(&self, _: BlockHash, _: BlockHash, _: Option<BlockHash>) {}
    fn blocks_pruned(&self, _: &[BlockHash]) {}
}
