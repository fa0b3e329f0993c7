/*!
 * Simulation Engine
 * Drives a replacement policy over a reference string with address
 * translation through a page table and a TLB
 */

use super::policies::make_policy;
use super::tlb::Tlb;
use super::types::*;
use crate::core::errors::ProbeError;
use crate::core::types::ProbeResult;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

impl SimulationConfig {
    pub fn validate(&self) -> ProbeResult<()> {
        if self.frames == 0 {
            return Err(ProbeError::InvalidConfig("frame count must be greater than zero".into()));
        }
        if self.tlb_entries == 0 {
            return Err(ProbeError::InvalidConfig("TLB size must be greater than zero".into()));
        }
        if self.page_size == 0 {
            return Err(ProbeError::InvalidConfig("page size must be greater than zero".into()));
        }
        Ok(())
    }
}

/// Random byte offset within the page for each reference
pub fn generate_offsets(count: usize, page_size: u64, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| rng.gen_range(0..page_size.max(1))).collect()
}

/// Build virtual addresses `page * page_size + offset`
pub fn virtual_addresses(reference: &[PageNumber], offsets: &[u64], page_size: u64) -> ProbeResult<Vec<u64>> {
    reference
        .iter()
        .zip(offsets)
        .map(|(&page, &offset)| {
            page.checked_mul(page_size)
                .and_then(|base| base.checked_add(offset))
                .ok_or_else(|| ProbeError::InvalidConfig(format!("page {} is out of the address range", page)))
        })
        .collect()
}

/// Translate through the TLB, falling back to the page table on a miss
///
/// Returns the physical address and whether the TLB missed. The page must
/// be resident.
fn translate(
    virtual_addr: u64,
    page_size: u64,
    page_table: &HashMap<PageNumber, FrameNumber>,
    tlb: &mut Tlb,
) -> (u64, bool) {
    let page = virtual_addr / page_size;
    let offset = virtual_addr % page_size;

    let (frame, miss) = match tlb.lookup(page) {
        Some(frame) => (frame, false),
        None => {
            let frame = page_table.get(&page).copied().unwrap_or_default();
            tlb.update(page, frame);
            (frame, true)
        }
    };

    ((frame as u64) * page_size + offset, miss)
}

/// Run one policy over `reference` using precomputed virtual addresses
pub fn simulate_with_addresses(
    policy: Policy,
    reference: &[PageNumber],
    addresses: &[u64],
    config: &SimulationConfig,
) -> ProbeResult<PolicyRun> {
    config.validate()?;
    if addresses.len() != reference.len() {
        return Err(ProbeError::InvalidConfig(format!(
            "{} addresses for {} references",
            addresses.len(),
            reference.len()
        )));
    }

    let mut replacer = make_policy(policy, config.frames);
    let mut frames: Vec<PageNumber> = Vec::with_capacity(config.frames);
    let mut page_table: HashMap<PageNumber, FrameNumber> = HashMap::new();
    let mut tlb = Tlb::new(config.tlb_entries);
    let mut faults = 0;
    let mut steps = Vec::with_capacity(reference.len());

    for (step, (&page, &virtual_addr)) in reference.iter().zip(addresses).enumerate() {
        replacer.on_reference(page, step);

        let (physical_addr, tlb_miss, fault) = match page_table.get(&page).copied() {
            Some(slot) => {
                replacer.on_hit(slot, page, step);
                let (physical, miss) = translate(virtual_addr, config.page_size, &page_table, &mut tlb);
                (physical, miss, false)
            }
            None => {
                faults += 1;
                let slot = if frames.len() < config.frames {
                    frames.push(page);
                    frames.len() - 1
                } else {
                    let upcoming = reference.get(step + 1..).unwrap_or_default();
                    let victim = replacer.choose_victim(&frames, step, upcoming);
                    let evicted = frames[victim];
                    page_table.remove(&evicted);
                    tlb.invalidate(evicted);
                    frames[victim] = page;
                    victim
                };
                page_table.insert(page, slot);
                replacer.on_load(slot, page, step);

                // A fresh mapping is never in the TLB; the lookup counts the miss.
                let (physical, _) = translate(virtual_addr, config.page_size, &page_table, &mut tlb);
                (physical, true, true)
            }
        };

        let (clock_hand, reference_bits) = match replacer.clock_state() {
            Some((hand, bits)) => (Some(hand), Some(bits)),
            None => (None, None),
        };

        steps.push(Step {
            page,
            frames: frames.clone(),
            fault,
            tlb_miss,
            virtual_addr,
            physical_addr,
            clock_hand,
            reference_bits,
        });
    }

    Ok(PolicyRun {
        policy,
        frame_count: config.frames,
        faults,
        tlb: tlb.stats(),
        steps,
    })
}

/// Run one policy with offsets generated from the config seed
pub fn simulate(policy: Policy, reference: &[PageNumber], config: &SimulationConfig) -> ProbeResult<PolicyRun> {
    let offsets = generate_offsets(reference.len(), config.page_size, config.seed);
    let addresses = virtual_addresses(reference, &offsets, config.page_size)?;
    simulate_with_addresses(policy, reference, &addresses, config)
}

/// Run `policies` over the same virtual addresses
pub fn simulate_policies(
    policies: &[Policy],
    reference: &[PageNumber],
    config: &SimulationConfig,
) -> ProbeResult<Vec<PolicyRun>> {
    config.validate()?;
    let offsets = generate_offsets(reference.len(), config.page_size, config.seed);
    let addresses = virtual_addresses(reference, &offsets, config.page_size)?;
    policies
        .iter()
        .map(|&policy| simulate_with_addresses(policy, reference, &addresses, config))
        .collect()
}
