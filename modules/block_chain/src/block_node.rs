//! Block representation within the fork tree.

use std::sync::Arc;

use arbor_common::{Block, BlockHash, UtxoSnapshot};

/// Height of the genesis block.
pub const GENESIS_HEIGHT: u64 = 1;

/// A node in the fork tree: an accepted block together with the
/// unspent-output state that results from applying it.
///
/// Parent and child links are hashes into the owning
/// [`ForkTree`](crate::fork_tree::ForkTree); the tree owns every node.
#[derive(Debug, Clone)]
pub struct BlockNode {
    /// 32-byte block hash (identity key).
    pub hash: BlockHash,
    /// The accepted block.
    pub block: Arc<Block>,
    /// Parent block hash; `None` for genesis, or once the parent has been
    /// pruned out of the retention window.
    pub parent: Option<BlockHash>,
    /// Child block hashes, in acceptance order.
    pub children: Vec<BlockHash>,
    /// Block height; genesis is 1.
    pub height: u64,
    /// Outputs spendable after this block. Never handed out by reference
    /// to callers that may want to mutate it.
    snapshot: UtxoSnapshot,
}

impl BlockNode {
    /// Create a new node with no children.
    pub fn new(
        hash: BlockHash,
        block: Arc<Block>,
        parent: Option<BlockHash>,
        height: u64,
        snapshot: UtxoSnapshot,
    ) -> Self {
        Self {
            hash,
            block,
            parent,
            children: Vec::new(),
            height,
            snapshot,
        }
    }

    /// Private copy of the node's snapshot, free to mutate.
    pub fn snapshot_copy(&self) -> UtxoSnapshot {
        self.snapshot.clone()
    }

    /// Read-only view of the node's snapshot.
    pub fn snapshot(&self) -> &UtxoSnapshot {
        &self.snapshot
    }

    /// True when the parent is absent (genesis or pruned away).
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
