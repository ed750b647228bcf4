//! Runner configuration from command-line arguments and environment variables.
//!
//! Environment variables give the baseline; arguments override them:
//!
//! | Argument | Env var | Meaning |
//! |----------|---------|---------|
//! | `--level <path>` | | JSON level file (default: random board from default rules) |
//! | `--seed <n>` | `TILE_BLAST_SEED` | override the level seed |
//! | `--moves <n>` | | override the move budget |
//! | `--steps <n>` | | stop after this many pops (default 50) |
//! | `--log <path>` | `TILE_BLAST_LOG_PATH` | append events as JSONL |
//! | `--quiet` | | only print the summary |

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::log::log_path_from_env;

pub const SEED_ENV: &str = "TILE_BLAST_SEED";

pub const DEFAULT_MAX_STEPS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub level_path: Option<PathBuf>,
    pub seed: Option<u32>,
    pub moves: Option<u32>,
    pub max_steps: u32,
    pub log_path: Option<String>,
    pub quiet: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            level_path: None,
            seed: None,
            moves: None,
            max_steps: DEFAULT_MAX_STEPS,
            log_path: None,
            quiet: false,
        }
    }
}

impl RunnerConfig {
    /// Baseline from environment variables
    pub fn from_env() -> Self {
        let seed = env::var(SEED_ENV).ok().and_then(|s| s.trim().parse().ok());
        Self {
            seed,
            log_path: log_path_from_env(),
            ..Self::default()
        }
    }

    /// Environment baseline overridden by `args` (program name excluded)
    pub fn parse(args: &[String]) -> Result<Self> {
        Self::from_env().apply_args(args)
    }

    pub fn apply_args(mut self, args: &[String]) -> Result<Self> {
        let mut i = 0usize;
        while i < args.len() {
            match args[i].as_str() {
                "--level" => {
                    i += 1;
                    self.level_path = Some(PathBuf::from(value(args, i, "--level")?));
                }
                "--seed" => {
                    i += 1;
                    self.seed = Some(number(args, i, "--seed")?);
                }
                "--moves" => {
                    i += 1;
                    self.moves = Some(number(args, i, "--moves")?);
                }
                "--steps" => {
                    i += 1;
                    self.max_steps = number(args, i, "--steps")?;
                }
                "--log" => {
                    i += 1;
                    self.log_path = Some(value(args, i, "--log")?.to_string());
                }
                "--quiet" => {
                    self.quiet = true;
                }
                other => {
                    return Err(anyhow!("runner: unknown argument: {}", other));
                }
            }
            i += 1;
        }
        Ok(self)
    }
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("runner: missing value for {}", flag))
}

fn number(args: &[String], i: usize, flag: &str) -> Result<u32> {
    let v = value(args, i, flag)?;
    v.parse::<u32>()
        .map_err(|_| anyhow!("runner: invalid {} value: {}", flag, v))
}
