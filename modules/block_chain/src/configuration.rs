use anyhow::{bail, Result};
use config::Config;
use tracing::info;

pub const CONFIG_KEY_CUT_OFF_AGE: &str = "cut-off-age";

/// How many heights behind the best block a block may still be extended.
pub const DEFAULT_CUT_OFF_AGE: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockChainConfig {
    pub cut_off_age: u64,
}

impl Default for BlockChainConfig {
    fn default() -> Self {
        Self {
            cut_off_age: DEFAULT_CUT_OFF_AGE,
        }
    }
}

impl BlockChainConfig {
    pub fn from_config(config: &Config) -> Result<Self> {
        let cut_off_age =
            config.get_int(CONFIG_KEY_CUT_OFF_AGE).unwrap_or(DEFAULT_CUT_OFF_AGE as i64);
        if cut_off_age < 0 {
            bail!("{CONFIG_KEY_CUT_OFF_AGE} must not be negative, got {cut_off_age}");
        }
        info!("Cut-off age {cut_off_age}");

        Ok(Self {
            cut_off_age: cut_off_age as u64,
        })
    }
}
