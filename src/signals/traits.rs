/*!
 * Signal Traits
 * Cooperative cancellation abstraction
 */

use std::sync::atomic::{AtomicBool, Ordering};

/// A flag polled by work loops at safe points
///
/// Checked between iterations, never inside one.
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;
}

impl Cancellation for AtomicBool {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: Cancellation + ?Sized> Cancellation for &T {
    #[inline]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}
