/*!
 * Replacement Types
 * Policies, per-step records and per-policy results
 */

use super::tlb::TlbStats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Virtual page number
pub type PageNumber = u64;

/// Physical frame slot
pub type FrameNumber = usize;

/// Page replacement policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Evict the page loaded longest ago
    Fifo,
    /// Evict the least recently used page
    Lru,
    /// Evict the page used farthest in the future (Belady)
    Optimal,
    /// Evict the page with the highest age/frequency score
    Custom,
    /// Second chance with reference bits and a rotating hand
    Clock,
}

impl Policy {
    pub const ALL: [Policy; 5] = [
        Policy::Fifo,
        Policy::Lru,
        Policy::Optimal,
        Policy::Custom,
        Policy::Clock,
    ];
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Policy::Fifo => write!(f, "FIFO"),
            Policy::Lru => write!(f, "LRU"),
            Policy::Optimal => write!(f, "Optimal"),
            Policy::Custom => write!(f, "Custom"),
            Policy::Clock => write!(f, "Clock"),
        }
    }
}

/// State after one reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub page: PageNumber,
    /// Resident page per frame slot
    pub frames: Vec<PageNumber>,
    pub fault: bool,
    pub tlb_miss: bool,
    pub virtual_addr: u64,
    pub physical_addr: u64,
    /// Clock hand position (Clock only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_hand: Option<usize>,
    /// Reference bits per slot (Clock only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_bits: Option<Vec<bool>>,
}

/// One policy over one reference string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRun {
    pub policy: Policy,
    pub frame_count: usize,
    pub faults: usize,
    pub tlb: TlbStats,
    pub steps: Vec<Step>,
}

impl PolicyRun {
    pub fn hits(&self) -> usize {
        self.steps.len() - self.faults
    }

    /// Page hit ratio in percent
    pub fn hit_ratio(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        self.hits() as f64 / self.steps.len() as f64 * 100.0
    }
}

/// Simulator parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub frames: usize,
    pub tlb_entries: usize,
    pub page_size: u64,
    /// Seed for per-reference offsets within a page
    pub seed: u64,
}
