//! Fork tree tracking every block still inside the retention window.
//!
//! A candidate block may extend any retained block that is at most
//! `cut_off_age` heights behind the best block. The best block is the
//! highest accepted so far; on equal height the earlier arrival keeps the
//! title. Whenever the best height advances, blocks below the new floor
//! are removed and their retained children become roots, so the tree
//! holds at most `cut_off_age + 1` heights of blocks however long the
//! chain grows.

use std::collections::HashMap;
use std::sync::Arc;

use arbor_common::{Block, BlockHash, UtxoSnapshot};
use tracing::{debug, info};

use crate::block_node::{BlockNode, GENESIS_HEIGHT};
use crate::chain_error::BlockRejection;
use crate::chain_observer::BlockChainObserver;
use crate::height_index::HeightIndex;
use crate::tx_validator::TransactionValidator;

/// Blocks keyed by hash, plus the best-chain pointer and retention floor.
///
/// Operations are single-threaded; the owning
/// [`BlockChain`](crate::BlockChain) serialises access.
pub struct ForkTree {
    /// All retained blocks keyed by hash.
    blocks: HashMap<BlockHash, BlockNode>,
    /// The same blocks grouped by height, for pruning.
    heights: HeightIndex,
    /// Tip of the best chain.
    best: BlockHash,
    /// Maximum distance behind the best height a parent may be.
    cut_off_age: u64,
    /// Callback receiver.
    observer: Box<dyn BlockChainObserver + Send>,
}

impl ForkTree {
    /// Create a tree holding only the genesis block.
    ///
    /// Genesis is trusted: only its coinbase is applied, nothing is
    /// validated.
    pub fn new(
        genesis: Block,
        cut_off_age: u64,
        observer: Box<dyn BlockChainObserver + Send>,
    ) -> Self {
        let hash = genesis.hash();
        let mut snapshot = UtxoSnapshot::new();
        apply_coinbase(&genesis, &mut snapshot);

        let mut tree = Self {
            blocks: HashMap::new(),
            heights: HeightIndex::new(GENESIS_HEIGHT),
            best: hash,
            cut_off_age,
            observer,
        };
        tree.insert(BlockNode::new(hash, Arc::new(genesis), None, GENESIS_HEIGHT, snapshot));
        tree
    }

    /// Returns the block with the given hash, if retained.
    pub fn get_block(&self, hash: &BlockHash) -> Option<&BlockNode> {
        self.blocks.get(hash)
    }

    pub fn contains(&self, hash: &BlockHash) -> bool {
        self.blocks.contains_key(hash)
    }

    /// The tip of the best chain.
    pub fn best(&self) -> &BlockNode {
        &self.blocks[&self.best]
    }

    pub fn best_hash(&self) -> BlockHash {
        self.best
    }

    pub fn best_height(&self) -> u64 {
        self.best().height
    }

    pub fn cut_off_age(&self) -> u64 {
        self.cut_off_age
    }

    /// Lowest height a parent may have and still be extended.
    pub fn floor(&self) -> u64 {
        self.best_height().saturating_sub(self.cut_off_age)
    }

    /// Returns the number of retained blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Never true: the best block is always retained.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Hashes of the retained blocks at a height, in arrival order.
    pub fn blocks_at(&self, height: u64) -> &[BlockHash] {
        self.heights.at(height)
    }

    /// Validate a candidate block and, if it passes, link it into the tree.
    ///
    /// On rejection nothing is changed. On acceptance the best chain moves
    /// to the new block if it is strictly higher, and the tree is pruned to
    /// the new floor.
    pub fn add_block(
        &mut self,
        block: Block,
        validator: &dyn TransactionValidator,
    ) -> Result<BlockHash, BlockRejection> {
        let hash = block.hash();
        let parent_hash = block.parent().ok_or(BlockRejection::MissingParentReference { hash })?;

        if self.blocks.contains_key(&hash) {
            return Err(BlockRejection::AlreadyKnown { hash });
        }

        let parent = self
            .blocks
            .get(&parent_hash)
            .ok_or(BlockRejection::UnknownParent { hash: parent_hash })?;

        let best_height = self.best_height();
        if parent.height < self.floor() {
            return Err(BlockRejection::ParentOutsideWindow {
                parent_height: parent.height,
                best_height,
                cut_off_age: self.cut_off_age,
            });
        }

        let submitted = block.transactions.len();
        let validated = validator.validate(parent.snapshot_copy(), &block.transactions);
        if validated.accepted.len() < submitted {
            return Err(BlockRejection::InvalidTransactions {
                accepted: validated.accepted.len(),
                submitted,
            });
        }

        let height = parent.height + 1;
        let mut snapshot = validated.snapshot;
        apply_coinbase(&block, &mut snapshot);

        self.insert(BlockNode::new(hash, Arc::new(block), Some(parent_hash), height, snapshot));
        self.observer.block_accepted(height, hash);

        if height > best_height {
            self.set_best(hash);
            self.prune();
        }

        Ok(hash)
    }

    /// Link a node to its parent and index it.
    fn insert(&mut self, node: BlockNode) {
        let hash = node.hash;
        assert!(!self.blocks.contains_key(&hash), "block {hash} indexed twice");

        if let Some(parent) = node.parent.and_then(|p| self.blocks.get_mut(&p)) {
            parent.children.push(hash);
        }
        self.heights.insert(node.height, hash);
        self.blocks.insert(hash, node);
    }

    /// Move the best pointer, reporting a chain switch if the new best
    /// does not extend the old one.
    fn set_best(&mut self, new_best: BlockHash) {
        let old_best = self.best;
        self.best = new_best;

        if !self.chain_contains(old_best, new_best) {
            let ancestor = self.find_common_ancestor(old_best, new_best);
            info!(
                from = %old_best,
                to = %new_best,
                height = self.best_height(),
                "Best chain switched (common ancestor {ancestor:?})"
            );
            self.observer.best_chain_switched(old_best, new_best, ancestor);
        }
    }

    /// Check if a block is on the chain ending at the given tip.
    ///
    /// Walks back from `tip` as far as the retained ancestry goes.
    pub fn chain_contains(&self, block_hash: BlockHash, tip: BlockHash) -> bool {
        let mut current = Some(tip);
        while let Some(h) = current {
            if h == block_hash {
                return true;
            }
            current = self.blocks.get(&h).and_then(|b| b.parent);
        }
        false
    }

    /// Find the deepest block that is an ancestor of both `a` and `b`.
    ///
    /// Returns `None` if either block is unknown or the fork point has
    /// been pruned.
    pub fn find_common_ancestor(&self, a: BlockHash, b: BlockHash) -> Option<BlockHash> {
        let mut node_a = self.blocks.get(&a)?;
        let mut node_b = self.blocks.get(&b)?;

        // Walk the higher block down to the same level
        while node_a.height > node_b.height {
            node_a = self.blocks.get(&node_a.parent?)?;
        }
        while node_b.height > node_a.height {
            node_b = self.blocks.get(&node_b.parent?)?;
        }

        // Walk both up until they meet
        while node_a.hash != node_b.hash {
            node_a = self.blocks.get(&node_a.parent?)?;
            node_b = self.blocks.get(&node_b.parent?)?;
        }

        Some(node_a.hash)
    }

    /// Retained hashes of the best chain, oldest first.
    pub fn canonical_chain(&self) -> Vec<BlockHash> {
        let mut chain = Vec::new();
        let mut current = Some(self.best);
        while let Some(h) = current {
            chain.push(h);
            current = self.blocks.get(&h).and_then(|b| b.parent);
        }
        chain.reverse();
        chain
    }

    /// Remove every block below the retention floor.
    ///
    /// Retained children of a removed block become roots. Returns the
    /// removed hashes in ascending height order.
    pub fn prune(&mut self) -> Vec<BlockHash> {
        let floor = self.floor();
        let pruned = self.heights.prune_before(floor);
        if pruned.is_empty() {
            return pruned;
        }

        for hash in &pruned {
            let node = match self.blocks.remove(hash) {
                Some(n) => n,
                None => continue,
            };

            if let Some(parent) = node.parent.and_then(|p| self.blocks.get_mut(&p)) {
                parent.children.retain(|h| h != hash);
            }
            for child_hash in &node.children {
                if let Some(child) = self.blocks.get_mut(child_hash) {
                    child.parent = None;
                }
            }
        }

        debug!(
            floor,
            pruned = pruned.len(),
            retained = self.blocks.len(),
            "Pruned blocks below retention floor"
        );
        self.observer.blocks_pruned(&pruned);
        pruned
    }
}

/// Coinbase outputs are new value and go in without validation.
fn apply_coinbase(block: &Block, snapshot: &mut UtxoSnapshot) {
    snapshot.apply_outputs(block.coinbase.hash(), &block.coinbase.outputs);
}
