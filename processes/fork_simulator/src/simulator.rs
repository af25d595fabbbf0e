//! Random block producer feeding a block chain

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arbor_common::{AddressHash, Block, BlockHash, Transaction, TxInput, TxOutput};
use arbor_module_block_chain::{
    BlockChain, BlockChainConfig, BlockChainObserver, UtxoTransactionValidator,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Reward paid by every coinbase
pub const REWARD: u64 = 50;

/// Counters fed by the chain's observer callbacks
#[derive(Default)]
pub struct ChainEvents {
    pub accepted: AtomicU64,
    pub switches: AtomicU64,
    pub pruned: AtomicU64,
}

struct CountingObserver {
    events: Arc<ChainEvents>,
}

impl BlockChainObserver for CountingObserver {
    fn block_accepted(&self, _height: u64, _hash: BlockHash) {
        self.events.accepted.fetch_add(1, Ordering::Relaxed);
    }

    fn best_chain_switched(&self, _from: BlockHash, _to: BlockHash, _ancestor: Option<BlockHash>) {
        self.events.switches.fetch_add(1, Ordering::Relaxed);
    }

    fn blocks_pruned(&self, hashes: &[BlockHash]) {
        self.events.pruned.fetch_add(hashes.len() as u64, Ordering::Relaxed);
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub submitted: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub best_height: u64,
    pub retained: usize,
    pub max_retained: usize,
    pub switches: u64,
    pub pruned: u64,
}

pub struct Simulator {
    chain: BlockChain,
    events: Arc<ChainEvents>,
    rng: StdRng,
    fork_probability: f64,
    /// Recently produced blocks, candidates for forking
    recent: VecDeque<BlockHash>,
    recent_limit: usize,
    nonce: u64,
}

impl Simulator {
    pub fn new(config: BlockChainConfig, seed: u64, fork_probability: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let genesis = Block::genesis(Transaction::coinbase(random_address(&mut rng), REWARD, 0));
        let events = Arc::new(ChainEvents::default());

        let chain = BlockChain::with_parts(
            genesis.clone(),
            config,
            Box::new(UtxoTransactionValidator),
            Box::new(CountingObserver {
                events: events.clone(),
            }),
        );

        // Reach a little past the window so some forks land on pruned parents
        let recent_limit = config.cut_off_age as usize + 3;

        Self {
            chain,
            events,
            rng,
            fork_probability,
            recent: VecDeque::from([genesis.hash()]),
            recent_limit,
            nonce: 0,
        }
    }

    pub fn chain(&self) -> &BlockChain {
        &self.chain
    }

    /// Produce and submit `blocks` blocks
    pub fn run(&mut self, blocks: u64) -> SimulationReport {
        let mut rejected = 0;
        let mut max_retained = self.chain.block_count();

        for _ in 0..blocks {
            let parent = self.pick_parent();
            let Some(block) = self.build_block(parent) else {
                rejected += 1;
                continue;
            };

            let tx_hashes: Vec<_> = block.transactions.iter().map(|tx| tx.hash()).collect();
            match self.chain.try_add_block(block) {
                Ok(hash) => {
                    self.recent.push_back(hash);
                    if self.recent.len() > self.recent_limit {
                        self.recent.pop_front();
                    }
                    let pool = self.chain.pending_transaction_pool();
                    let mut pool = pool.lock().unwrap_or_else(|e| e.into_inner());
                    for tx_hash in &tx_hashes {
                        pool.remove_transaction(tx_hash);
                    }
                }
                Err(e) => {
                    debug!("Simulated block rejected: {e}");
                    rejected += 1;
                }
            }

            max_retained = max_retained.max(self.chain.block_count());
        }

        SimulationReport {
            submitted: blocks,
            accepted: self.events.accepted.load(Ordering::Relaxed),
            rejected,
            best_height: self.chain.best_height(),
            retained: self.chain.block_count(),
            max_retained,
            switches: self.events.switches.load(Ordering::Relaxed),
            pruned: self.events.pruned.load(Ordering::Relaxed),
        }
    }

    fn pick_parent(&mut self) -> BlockHash {
        if self.rng.random_bool(self.fork_probability) {
            let index = self.rng.random_range(0..self.recent.len());
            self.recent[index]
        } else {
            self.chain.best_hash()
        }
    }

    /// Block on `parent` spending one output of its snapshot, or `None` if
    /// the parent has been pruned
    fn build_block(&mut self, parent: BlockHash) -> Option<Block> {
        let snapshot = self.chain.snapshot_at(&parent)?;

        self.nonce += 1;
        let coinbase = Transaction::coinbase(random_address(&mut self.rng), REWARD, self.nonce);

        let mut transactions = Vec::new();
        if !snapshot.is_empty() {
            let index = self.rng.random_range(0..snapshot.len());
            if let Some((utxo, output)) = snapshot.iter().nth(index) {
                let tx = Transaction::new(
                    vec![TxInput::new(*utxo)],
                    vec![TxOutput::new(random_address(&mut self.rng), output.value)],
                );
                self.chain.add_transaction(tx.clone());
                transactions.push(tx);
            }
        }

        Some(Block::new(parent, coinbase, transactions))
    }
}

fn random_address(rng: &mut StdRng) -> AddressHash {
    AddressHash::new(rng.random())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_stays_bounded_over_long_run() {
        let config = BlockChainConfig { cut_off_age: 5 };
        let mut simulator = Simulator::new(config, 42, 0.3);
        let report = simulator.run(2_000);

        assert!(report.best_height > 100);
        assert!(report.pruned > 0);
        assert_eq!(report.accepted + report.rejected, report.submitted);
        assert_eq!(report.retained, simulator.chain().block_count());
        // Each retained height holds at most the blocks produced at it, and
        // forks only reach back a bounded distance
        assert!(report.max_retained < 200);
    }

    #[test]
    fn straight_chain_without_forks() {
        let config = BlockChainConfig { cut_off_age: 10 };
        let mut simulator = Simulator::new(config, 7, 0.0);
        let report = simulator.run(50);

        assert_eq!(report.rejected, 0);
        assert_eq!(report.accepted, 50);
        assert_eq!(report.best_height, 51);
        assert_eq!(report.retained, 11);
        assert_eq!(report.switches, 0);
    }

    #[test]
    fn same_seed_same_outcome() {
        let config = BlockChainConfig::default();
        let a = Simulator::new(config, 3, 0.5).run(300);
        let b = Simulator::new(config, 3, 0.5).run(300);
        assert_eq!(a, b);
    }
}
