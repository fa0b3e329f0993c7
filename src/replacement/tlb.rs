/*!
 * Simulated TLB
 * Fixed-capacity LRU cache of page -> frame translations
 */

use super::types::{FrameNumber, PageNumber};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlbStats {
    pub hits: u64,
    pub misses: u64,
}

impl TlbStats {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit ratio in percent; 0 when nothing was looked up
    pub fn hit_ratio(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64 * 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tlb {
    capacity: usize,
    entries: HashMap<PageNumber, FrameNumber>,
    /// Least recently used first
    order: VecDeque<PageNumber>,
    stats: TlbStats,
}

impl Tlb {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            stats: TlbStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> TlbStats {
        self.stats
    }

    fn promote(&mut self, page: PageNumber) {
        if let Some(pos) = self.order.iter().position(|&p| p == page) {
            self.order.remove(pos);
        }
        self.order.push_back(page);
    }

    /// Translate `page`, counting a hit or a miss
    pub fn lookup(&mut self, page: PageNumber) -> Option<FrameNumber> {
        match self.entries.get(&page).copied() {
            Some(frame) => {
                self.stats.hits += 1;
                self.promote(page);
                Some(frame)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Insert or refresh a translation, evicting the LRU entry when full
    pub fn update(&mut self, page: PageNumber, frame: FrameNumber) {
        if !self.entries.contains_key(&page) && self.entries.len() >= self.capacity {
            if let Some(lru) = self.order.pop_front() {
                self.entries.remove(&lru);
            }
        }
        self.entries.insert(page, frame);
        self.promote(page);
    }

    /// Drop the translation for an evicted page
    pub fn invalidate(&mut self, page: PageNumber) {
        if self.entries.remove(&page).is_some() {
            if let Some(pos) = self.order.iter().position(|&p| p == page) {
                self.order.remove(pos);
            }
        }
    }
}
