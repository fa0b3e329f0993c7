/*!
 * Page Replacement Simulator
 *
 * Offline model of demand paging: a reference string is replayed against a
 * fixed number of frames under FIFO, LRU, Optimal, Custom and Clock, with
 * address translation through a small LRU TLB.
 */

pub mod engine;
pub mod policies;
pub mod tlb;
pub mod types;

pub use engine::{generate_offsets, simulate, simulate_policies, simulate_with_addresses, virtual_addresses};
pub use policies::{make_policy, ReplacementPolicy};
pub use tlb::{Tlb, TlbStats};
pub use types::*;
