//! Index of retained blocks by height
//! Maps each height inside the retention window to the blocks at that height
use std::collections::VecDeque;
use tracing::error;

use arbor_common::BlockHash;

pub struct HeightIndex {
    /// Height represented by the front of `heights`
    first_height: u64,

    /// Block hashes for each height, contiguous from `first_height`
    heights: VecDeque<Vec<BlockHash>>,
}

impl HeightIndex {
    /// Create an index whose lowest height is `first_height`
    pub fn new(first_height: u64) -> Self {
        Self {
            first_height,
            heights: VecDeque::new(),
        }
    }

    /// Total number of indexed blocks
    pub fn len(&self) -> usize {
        self.heights.iter().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.iter().all(|v| v.is_empty())
    }

    /// Lowest height still held
    pub fn first_height(&self) -> u64 {
        self.first_height
    }

    /// Record a block at the given height
    pub fn insert(&mut self, height: u64, hash: BlockHash) {
        if height < self.first_height {
            error!("Block {hash} at height {height} is below indexed height {}", self.first_height);
            return;
        }

        let offset = (height - self.first_height) as usize;
        while self.heights.len() <= offset {
            self.heights.push_back(Vec::new());
        }
        self.heights[offset].push(hash);
    }

    /// Blocks at the given height
    pub fn at(&self, height: u64) -> &[BlockHash] {
        height
            .checked_sub(self.first_height)
            .and_then(|offset| self.heights.get(offset as usize))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Drop every height below the boundary, returning the blocks removed
    /// in ascending height order
    pub fn prune_before(&mut self, boundary: u64) -> Vec<BlockHash> {
        let mut pruned = Vec::new();

        while self.first_height < boundary {
            match self.heights.pop_front() {
                Some(hashes) => pruned.extend(hashes),
                None => {
                    // Nothing indexed; just move the floor
                    self.first_height = boundary;
                    break;
                }
            }
            self.first_height += 1;
        }

        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(n: u8) -> BlockHash {
        let mut bytes = [0u8; 32];
        bytes[0] = n;
        BlockHash::from(bytes)
    }

    #[test]
    fn new_index_is_empty() {
        let index = HeightIndex::new(1);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert!(index.at(1).is_empty());
    }

    #[test]
    fn insert_groups_by_height() {
        let mut index = HeightIndex::new(1);
        index.insert(1, hash(1));
        index.insert(2, hash(2));
        index.insert(2, hash(3));
        index.insert(4, hash(4));

        assert_eq!(index.len(), 4);
        assert_eq!(index.at(2), &[hash(2), hash(3)]);
        assert!(index.at(3).is_empty());
        assert_eq!(index.at(4), &[hash(4)]);
        assert!(index.at(0).is_empty());
    }

    #[test]
    fn insert_below_first_height_is_ignored() {
        let mut index = HeightIndex::new(5);
        index.insert(4, hash(1));
        assert!(index.is_empty());
    }

    #[test]
    fn prune_before_returns_lower_heights_in_order() {
        let mut index = HeightIndex::new(1);
        index.insert(1, hash(1));
        index.insert(2, hash(2));
        index.insert(2, hash(3));
        index.insert(3, hash(4));

        let pruned = index.prune_before(3);
        assert_eq!(pruned, vec![hash(1), hash(2), hash(3)]);
        assert_eq!(index.first_height(), 3);
        assert_eq!(index.at(3), &[hash(4)]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn prune_before_is_noop_at_or_below_first_height() {
        let mut index = HeightIndex::new(3);
        index.insert(3, hash(1));
        assert!(index.prune_before(3).is_empty());
        assert!(index.prune_before(1).is_empty());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn prune_past_end_moves_floor() {
        let mut index = HeightIndex::new(1);
        index.insert(1, hash(1));
        assert_eq!(index.prune_before(10), vec![hash(1)]);
        assert_eq!(index.first_height(), 10);

        index.insert(10, hash(2));
        assert_eq!(index.at(10), &[hash(2)]);
    }
}
