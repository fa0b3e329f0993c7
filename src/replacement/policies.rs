/*!
 * Replacement Policies
 *
 * Frames are fixed physical slots; a policy only decides which slot to
 * reuse when all are occupied. Ties always go to the lowest slot.
 */

use super::types::{FrameNumber, PageNumber, Policy};
use std::collections::{HashMap, VecDeque};

/// Victim selection and bookkeeping for one policy
pub trait ReplacementPolicy {
    fn kind(&self) -> Policy;

    /// Called for every reference before hit/fault handling
    fn on_reference(&mut self, _page: PageNumber, _step: usize) {}

    fn on_hit(&mut self, slot: FrameNumber, page: PageNumber, step: usize);

    /// A page was placed into `slot` (free or just vacated)
    fn on_load(&mut self, slot: FrameNumber, page: PageNumber, step: usize);

    /// Pick the slot to evict; `frames` is full, `upcoming` is the rest of
    /// the reference string after the current step
    fn choose_victim(&mut self, frames: &[PageNumber], step: usize, upcoming: &[PageNumber]) -> FrameNumber;

    /// Hand position and reference bits, for policies that keep them
    fn clock_state(&self) -> Option<(usize, Vec<bool>)> {
        None
    }
}

/// Build the policy implementation for `kind`
pub fn make_policy(kind: Policy, frames: usize) -> Box<dyn ReplacementPolicy> {
    match kind {
        Policy::Fifo => Box::new(Fifo::default()),
        Policy::Lru => Box::new(Lru::new(frames)),
        Policy::Optimal => Box::new(Optimal),
        Policy::Custom => Box::new(Custom::default()),
        Policy::Clock => Box::new(Clock::new(frames)),
    }
}

#[derive(Debug, Default)]
pub struct Fifo {
    loaded: VecDeque<FrameNumber>,
}

impl ReplacementPolicy for Fifo {
    fn kind(&self) -> Policy {
        Policy::Fifo
    }

    fn on_hit(&mut self, _slot: FrameNumber, _page: PageNumber, _step: usize) {}

    fn on_load(&mut self, slot: FrameNumber, _page: PageNumber, _step: usize) {
        self.loaded.push_back(slot);
    }

    fn choose_victim(&mut self, _frames: &[PageNumber], _step: usize, _upcoming: &[PageNumber]) -> FrameNumber {
        self.loaded.pop_front().unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct Lru {
    last_used: Vec<usize>,
}

impl Lru {
    pub fn new(frames: usize) -> Self {
        Self {
            last_used: vec![0; frames],
        }
    }

    fn mark(&mut self, slot: FrameNumber, step: usize) {
        if let Some(entry) = self.last_used.get_mut(slot) {
            *entry = step;
        }
    }
}

impl ReplacementPolicy for Lru {
    fn kind(&self) -> Policy {
        Policy::Lru
    }

    fn on_hit(&mut self, slot: FrameNumber, _page: PageNumber, step: usize) {
        self.mark(slot, step);
    }

    fn on_load(&mut self, slot: FrameNumber, _page: PageNumber, step: usize) {
        self.mark(slot, step);
    }

    fn choose_victim(&mut self, frames: &[PageNumber], _step: usize, _upcoming: &[PageNumber]) -> FrameNumber {
        (0..frames.len())
            .min_by_key(|&slot| (self.last_used.get(slot).copied().unwrap_or(0), slot))
            .unwrap_or(0)
    }
}

#[derive(Debug, Default)]
pub struct Optimal;

impl ReplacementPolicy for Optimal {
    fn kind(&self) -> Policy {
        Policy::Optimal
    }

    fn on_hit(&mut self, _slot: FrameNumber, _page: PageNumber, _step: usize) {}

    fn on_load(&mut self, _slot: FrameNumber, _page: PageNumber, _step: usize) {}

    fn choose_victim(&mut self, frames: &[PageNumber], _step: usize, upcoming: &[PageNumber]) -> FrameNumber {
        let mut victim = 0;
        let mut farthest = None;
        for (slot, page) in frames.iter().enumerate() {
            // Never used again sorts after every real distance
            let next_use = upcoming
                .iter()
                .position(|p| p == page)
                .unwrap_or(usize::MAX);
            if farthest.map_or(true, |f| next_use > f) {
                farthest = Some(next_use);
                victim = slot;
            }
        }
        victim
    }
}

/// Evicts the page with the highest `age / frequency`
///
/// Frequency counts every reference so far, resident or not; age is steps
/// since the page was last accessed.
#[derive(Debug, Default)]
pub struct Custom {
    frequency: HashMap<PageNumber, usize>,
    last_access: HashMap<PageNumber, usize>,
}

impl Custom {
    fn score(&self, page: PageNumber, step: usize) -> f64 {
        let frequency = self.frequency.get(&page).copied().unwrap_or(0);
        let age = step.saturating_sub(self.last_access.get(&page).copied().unwrap_or(0));
        if frequency == 0 {
            f64::INFINITY
        } else {
            age as f64 / frequency as f64
        }
    }
}

impl ReplacementPolicy for Custom {
    fn kind(&self) -> Policy {
        Policy::Custom
    }

    fn on_reference(&mut self, page: PageNumber, _step: usize) {
        *self.frequency.entry(page).or_insert(0) += 1;
    }

    fn on_hit(&mut self, _slot: FrameNumber, page: PageNumber, step: usize) {
        self.last_access.insert(page, step);
    }

    fn on_load(&mut self, _slot: FrameNumber, page: PageNumber, step: usize) {
        self.last_access.insert(page, step);
    }

    fn choose_victim(&mut self, frames: &[PageNumber], step: usize, _upcoming: &[PageNumber]) -> FrameNumber {
        let mut victim = 0;
        let mut highest = f64::NEG_INFINITY;
        for (slot, &page) in frames.iter().enumerate() {
            let score = self.score(page, step);
            if score > highest {
                highest = score;
                victim = slot;
            }
        }
        victim
    }
}

#[derive(Debug)]
pub struct Clock {
    referenced: Vec<bool>,
    hand: usize,
}

impl Clock {
    pub fn new(frames: usize) -> Self {
        Self {
            referenced: vec![false; frames],
            hand: 0,
        }
    }

    fn set(&mut self, slot: FrameNumber) {
        if let Some(bit) = self.referenced.get_mut(slot) {
            *bit = true;
        }
    }
}

impl ReplacementPolicy for Clock {
    fn kind(&self) -> Policy {
        Policy::Clock
    }

    fn on_hit(&mut self, slot: FrameNumber, _page: PageNumber, _step: usize) {
        self.set(slot);
    }

    fn on_load(&mut self, slot: FrameNumber, _page: PageNumber, _step: usize) {
        self.set(slot);
    }

    fn choose_victim(&mut self, frames: &[PageNumber], _step: usize, _upcoming: &[PageNumber]) -> FrameNumber {
        let len = frames.len().min(self.referenced.len());
        if len == 0 {
            return 0;
        }
        // Terminates within two sweeps: the first clears every set bit.
        loop {
            let slot = self.hand % len;
            self.hand = (slot + 1) % len;
            if self.referenced[slot] {
                self.referenced[slot] = false;
            } else {
                return slot;
            }
        }
    }

    fn clock_state(&self) -> Option<(usize, Vec<bool>)> {
        Some((self.hand, self.referenced.clone()))
    }
}
