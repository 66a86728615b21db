//! Sharing the receiver between the main thread and its interrupt handlers.
//!
//! ```ignore
//! static CSI2: SharedCsi2<Mmio, MyDma, EventSink<'static, 8>> = Shared::new();
//!
//! #[interrupt]
//! fn CSI2() {
//!     CSI2.with(|csi2| csi2.handle_interrupt());
//! }
//! ```

use core::cell::RefCell;

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;
use critical_section::Mutex;

use crate::csi2::Csi2;

/// A value owned by whoever installed it and borrowed inside critical sections.
pub struct Shared<T> {
    inner: Mutex<RefCell<Option<T>>>,
}

/// The receiver as shared with its interrupt handlers.
pub type SharedCsi2<R, D, C> = Shared<Csi2<R, D, C>>;

impl<T> Shared<T> {
    pub const fn new() -> Self {
        Shared {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Hand `value` over, returning whatever was installed before.
    pub fn install(&self, value: T) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow(cs).replace(Some(value)))
    }

    /// Take the value back out.
    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow(cs).take())
    }

    /// Run `f` on the value with interrupts masked. `None` if nothing is installed.
    pub fn with<U, F: FnOnce(&mut T) -> U>(&self, f: F) -> Option<U> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().as_mut().map(f))
    }
}

impl<T> Default for Shared<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A raw interrupt number, for devices without a PAC interrupt enum.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Irq(pub u16);

unsafe impl InterruptNumber for Irq {
    fn number(self) -> u16 {
        self.0
    }
}

/// Unmask `irq` in the NVIC.
///
/// # Safety
/// Can break critical sections based on masking, see `cortex_m::peripheral::NVIC::unmask`.
pub unsafe fn unmask(irq: Irq) {
    NVIC::unmask(irq);
}

pub fn mask(irq: Irq) {
    NVIC::mask(irq);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_runs_only_when_installed() {
        let shared: Shared<u32> = Shared::new();
        assert_eq!(shared.with(|v| *v), None);

        assert_eq!(shared.install(5), None);
        let bumped = shared.with(|v| {
            *v += 1;
            *v
        });
        assert_eq!(bumped, Some(6));

        assert_eq!(shared.install(9), Some(6));
        assert_eq!(shared.take(), Some(9));
        assert_eq!(shared.with(|v| *v), None);
    }

    #[test]
    fn irq_number_is_passed_through() {
        assert_eq!(Irq(93).number(), 93);
    }
}
