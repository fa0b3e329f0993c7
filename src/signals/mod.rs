/*!
 * Signals Module
 * Signal-driven cooperative shutdown
 */

mod stop;
pub mod traits;

// Re-export public API
pub use stop::StopSignal;
pub use traits::Cancellation;
