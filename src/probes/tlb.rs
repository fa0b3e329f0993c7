/*!
 * TLB Locality Probe
 *
 * Sequential reads walk each page once per pass and hit the TLB almost
 * always; uniformly random reads over a 256MB array touch a new page on
 * nearly every access. Compare the timings, or run one pattern under
 * `perf stat -e dTLB-load-misses,dTLB-loads`.
 */

use super::Probe;
use crate::core::config::{require_nonzero, ProbeConfig};
use crate::core::errors::ProbeError;
use crate::core::limits::{RANDOM_ACCESSES, RANDOM_SEED, SEQUENTIAL_ITERATIONS, TLB_ARRAY_ELEMENTS};
use crate::core::types::{mib, ProbeResult};
use crate::report::Reporter;
use nix::errno::Errno;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::hint::black_box;
use std::io::Write;
use std::time::Instant;

/// Memory access pattern under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AccessPattern {
    Sequential,
    Random,
}

/// TLB probe settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlbSettings {
    pub elements: usize,
    pub sequential_iterations: usize,
    pub random_accesses: usize,
    pub seed: u64,
    /// Run only this pattern; both when unset
    pub pattern: Option<AccessPattern>,
}

impl Default for TlbSettings {
    fn default() -> Self {
        Self {
            elements: TLB_ARRAY_ELEMENTS,
            sequential_iterations: SEQUENTIAL_ITERATIONS,
            random_accesses: RANDOM_ACCESSES,
            seed: RANDOM_SEED,
            pattern: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTiming {
    pub pattern: AccessPattern,
    pub accesses: u64,
    pub seconds: f64,
    pub sum: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TlbReport {
    pub elements: usize,
    pub array_bytes: usize,
    pub timings: Vec<AccessTiming>,
}

/// Array with `a[i] = i` (wrapping past i32::MAX)
pub fn build_array(elements: usize) -> ProbeResult<Vec<i32>> {
    let mut array = Vec::new();
    array
        .try_reserve_exact(elements)
        .map_err(|_| ProbeError::Allocation {
            size: elements.saturating_mul(std::mem::size_of::<i32>()),
            source: Errno::ENOMEM,
        })?;
    array.extend((0..elements).map(|i| i as i32));
    Ok(array)
}

/// Sum every element, `iterations` times over
pub fn sequential_sum(array: &[i32], iterations: usize) -> i64 {
    let mut sum = 0i64;
    for _ in 0..iterations {
        for &value in array {
            sum = sum.wrapping_add(i64::from(black_box(value)));
        }
    }
    sum
}

/// `count` indices in `0..len` from a seeded generator
pub fn random_indices(len: usize, count: usize, seed: u64) -> ProbeResult<Vec<usize>> {
    if len == 0 {
        return Ok(Vec::new());
    }
    let mut indices = Vec::new();
    indices
        .try_reserve_exact(count)
        .map_err(|_| ProbeError::Allocation {
            size: count.saturating_mul(std::mem::size_of::<usize>()),
            source: Errno::ENOMEM,
        })?;
    let mut rng = StdRng::seed_from_u64(seed);
    indices.extend((0..count).map(|_| rng.gen_range(0..len)));
    Ok(indices)
}

/// Sum the elements at `indices`
pub fn random_sum(array: &[i32], indices: &[usize]) -> i64 {
    indices.iter().fold(0i64, |sum, &i| {
        let value = array.get(i).copied().unwrap_or_default();
        sum.wrapping_add(i64::from(black_box(value)))
    })
}

pub struct TlbProbe {
    config: ProbeConfig,
    settings: TlbSettings,
}

impl TlbProbe {
    pub fn new(config: ProbeConfig, settings: TlbSettings) -> Self {
        Self { config, settings }
    }

    fn run_sequential<W: Write>(&self, array: &[i32], reporter: &mut Reporter<W>) -> ProbeResult<AccessTiming> {
        let start = Instant::now();
        let sum = black_box(sequential_sum(array, self.settings.sequential_iterations));
        let seconds = start.elapsed().as_secs_f64();

        reporter.line(format!("Sequential access time: {:.6} seconds", seconds))?;
        Ok(AccessTiming {
            pattern: AccessPattern::Sequential,
            accesses: (array.len() as u64).saturating_mul(self.settings.sequential_iterations as u64),
            seconds,
            sum,
        })
    }

    fn run_random<W: Write>(&self, array: &[i32], reporter: &mut Reporter<W>) -> ProbeResult<AccessTiming> {
        // Index generation stays outside the timed region.
        let indices = random_indices(array.len(), self.settings.random_accesses, self.settings.seed)?;

        let start = Instant::now();
        let sum = black_box(random_sum(array, &indices));
        let seconds = start.elapsed().as_secs_f64();

        reporter.line(format!("Random access time: {:.6} seconds", seconds))?;
        Ok(AccessTiming {
            pattern: AccessPattern::Random,
            accesses: indices.len() as u64,
            seconds,
            sum,
        })
    }
}

impl Probe for TlbProbe {
    type Report = TlbReport;

    fn name(&self) -> &'static str {
        "tlb"
    }

    fn run<W: Write>(&self, reporter: &mut Reporter<W>) -> ProbeResult<TlbReport> {
        self.config.validate()?;
        require_nonzero("element count", self.settings.elements)?;

        let array_bytes = self.settings.elements.saturating_mul(std::mem::size_of::<i32>());
        reporter.line("TLB Effects Demonstration")?;
        reporter.line(format!(
            "Array size: {} elements ({} MB)",
            self.settings.elements,
            array_bytes / mib(1)
        ))?;

        let array = build_array(self.settings.elements)?;

        let timings = match self.settings.pattern {
            Some(AccessPattern::Sequential) => vec![self.run_sequential(&array, reporter)?],
            Some(AccessPattern::Random) => vec![self.run_random(&array, reporter)?],
            None => {
                reporter.blank()?;
                reporter.line("Sequential vs Random Memory Access:")?;
                let timings = vec![
                    self.run_sequential(&array, reporter)?,
                    self.run_random(&array, reporter)?,
                ];
                reporter.blank()?;
                reporter.line("To observe dTLB-load-misses with perf:")?;
                reporter.line("  perf stat -e dTLB-load-misses,dTLB-loads memprobe tlb sequential")?;
                reporter.line("  perf stat -e dTLB-load-misses,dTLB-loads memprobe tlb random")?;
                timings
            }
        };

        Ok(TlbReport {
            elements: self.settings.elements,
            array_bytes,
            timings,
        })
    }
}
