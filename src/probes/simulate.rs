/*!
 * Page Replacement Simulation
 * Prints per-policy step tables and a fault/TLB comparison
 */

use super::Probe;
use crate::core::config::ProbeConfig;
use crate::core::errors::ProbeError;
use crate::core::limits::{DEFAULT_TLB_ENTRIES, RANDOM_SEED, SIM_PAGE_SIZE};
use crate::core::types::ProbeResult;
use crate::replacement::{simulate_policies, PageNumber, Policy, PolicyRun, SimulationConfig, Step};
use crate::report::Reporter;
use serde::{Deserialize, Serialize};
use std::io::Write;

const RULE_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulateSettings {
    pub reference: Vec<PageNumber>,
    pub frames: usize,
    pub tlb_entries: usize,
    pub seed: u64,
    /// Restrict to one policy; all policies when unset
    pub policy: Option<Policy>,
}

impl SimulateSettings {
    pub fn new(reference: Vec<PageNumber>, frames: usize) -> Self {
        Self {
            reference,
            frames,
            tlb_entries: DEFAULT_TLB_ENTRIES,
            seed: RANDOM_SEED,
            policy: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateReport {
    pub reference: Vec<PageNumber>,
    pub frames: usize,
    pub tlb_entries: usize,
    pub page_size: u64,
    pub runs: Vec<PolicyRun>,
}

/// `[7|0|-]` with `-` for an empty slot
pub fn render_frames(frames: &[PageNumber], frame_count: usize) -> String {
    let slots: Vec<String> = (0..frame_count)
        .map(|i| frames.get(i).map_or_else(|| "-".to_string(), |p| p.to_string()))
        .collect();
    format!("[{}]", slots.join("|"))
}

fn render_step(index: usize, step: &Step, frame_count: usize) -> String {
    format!(
        "{:4} | {:4} | 0x{:08X} | 0x{:08X} | {:12} | {:7} | {}",
        index + 1,
        step.page,
        step.virtual_addr,
        step.physical_addr,
        render_frames(&step.frames, frame_count),
        if step.fault { "YES" } else { "NO" },
        if step.tlb_miss { "MISS" } else { "HIT" },
    )
}

pub struct SimulateProbe {
    config: ProbeConfig,
    settings: SimulateSettings,
}

impl SimulateProbe {
    pub fn new(config: ProbeConfig, settings: SimulateSettings) -> Self {
        Self { config, settings }
    }

    fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            frames: self.settings.frames,
            tlb_entries: self.settings.tlb_entries,
            page_size: SIM_PAGE_SIZE,
            seed: self.settings.seed,
        }
    }

    fn print_run<W: Write>(&self, run: &PolicyRun, reporter: &mut Reporter<W>) -> ProbeResult<()> {
        reporter.blank()?;
        reporter.line(format!("{} Algorithm:", run.policy))?;
        reporter.line("-".repeat(RULE_WIDTH))?;
        reporter.line("Step | Page | Virtual    | Physical   | Frames       | P.Fault | TLB")?;
        reporter.line("-".repeat(RULE_WIDTH))?;
        for (i, step) in run.steps.iter().enumerate() {
            reporter.line(render_step(i, step, run.frame_count))?;
        }
        reporter.blank()?;
        reporter.line(format!("Page Faults: {}", run.faults))?;
        reporter.line(format!("Page Hits: {}", run.hits()))?;
        reporter.line(format!("Page Hit Ratio: {:.1}%", run.hit_ratio()))?;
        reporter.line(format!("TLB Hits: {}", run.tlb.hits))?;
        reporter.line(format!("TLB Misses: {}", run.tlb.misses))?;
        reporter.line(format!("TLB Hit Ratio: {:.1}%", run.tlb.hit_ratio()))?;
        Ok(())
    }
}

impl Probe for SimulateProbe {
    type Report = SimulateReport;

    fn name(&self) -> &'static str {
        "simulate"
    }

    fn run<W: Write>(&self, reporter: &mut Reporter<W>) -> ProbeResult<SimulateReport> {
        self.config.validate()?;
        if self.settings.reference.is_empty() {
            return Err(ProbeError::InvalidConfig("reference string is empty".into()));
        }

        let sim = self.simulation_config();
        let policies: Vec<Policy> = match self.settings.policy {
            Some(policy) => vec![policy],
            None => Policy::ALL.to_vec(),
        };
        let runs = simulate_policies(&policies, &self.settings.reference, &sim)?;

        let reference: Vec<String> = self.settings.reference.iter().map(|p| p.to_string()).collect();
        reporter.line("=".repeat(RULE_WIDTH))?;
        reporter.line("PAGE REPLACEMENT SIMULATION RESULTS WITH ADDRESS TRANSLATION")?;
        reporter.line("=".repeat(RULE_WIDTH))?;
        reporter.line(format!("Reference String: {}", reference.join(" ")))?;
        reporter.line(format!("Frame Size: {}", sim.frames))?;
        reporter.line(format!("TLB Size: {}", sim.tlb_entries))?;
        reporter.line(format!("Page Size: {} bytes", sim.page_size))?;

        for run in &runs {
            self.print_run(run, reporter)?;
        }

        if runs.len() > 1 {
            reporter.blank()?;
            reporter.line("FINAL RESULTS:")?;
            for run in &runs {
                reporter.line(format!(
                    "{}: {} page faults, TLB hit ratio: {:.1}%",
                    run.policy,
                    run.faults,
                    run.tlb.hit_ratio()
                ))?;
            }
        }

        Ok(SimulateReport {
            reference: self.settings.reference.clone(),
            frames: sim.frames,
            tlb_entries: sim.tlb_entries,
            page_size: sim.page_size,
            runs,
        })
    }
}
