//! Per-instance reentrancy guard.
//!
//! Detects a guarded operation being entered while another operation on the
//! same map is still running (for example from inside a user equality
//! callback). With the `strict` feature the nested entry is refused with
//! [`Busy`] so the caller can return its failure sentinel. Without it, debug
//! builds panic and release builds compile the guard away.

#[cfg(any(debug_assertions, feature = "strict"))]
use core::cell::Cell;
use core::marker::PhantomData;

use crate::error::Busy;

/// Embed this in structs and guard entry points with
/// `let _g = self.guard.enter()?;`.
#[derive(Debug)]
pub struct EntryGuard {
    #[cfg(any(debug_assertions, feature = "strict"))]
    depth: Cell<u32>,
}

impl EntryGuard {
    pub const fn new() -> Self {
        Self {
            #[cfg(any(debug_assertions, feature = "strict"))]
            depth: Cell::new(0),
        }
    }

    /// Enter a guarded section.
    ///
    /// Strict builds return `Err(Busy)` on nested entry; other debug builds
    /// panic; release builds always succeed.
    #[inline]
    pub fn enter(&self) -> Result<Held<'_>, Busy> {
        #[cfg(any(debug_assertions, feature = "strict"))]
        {
            let d = self.depth.get();
            if d != 0 {
                #[cfg(feature = "strict")]
                {
                    log::warn!("seq_map: nested entry refused (depth={})", d);
                    return Err(Busy);
                }
                #[cfg(not(feature = "strict"))]
                panic!("reentrancy detected: nested entry into data structure");
            }
            self.depth.set(d + 1);
            return Ok(Held {
                owner: self,
                _lt: PhantomData,
            });
        }

        #[cfg(not(any(debug_assertions, feature = "strict")))]
        {
            return Ok(Held { _lt: PhantomData });
        }
    }
}

impl Default for EntryGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII token returned by `EntryGuard::enter`.
pub struct Held<'a> {
    #[cfg(any(debug_assertions, feature = "strict"))]
    owner: &'a EntryGuard,
    _lt: PhantomData<&'a ()>,
}

impl<'a> Drop for Held<'a> {
    fn drop(&mut self) {
        #[cfg(any(debug_assertions, feature = "strict"))]
        {
            let d = self.owner.depth.get();
            debug_assert!(d > 0);
            self.owner.depth.set(d - 1);
        }
    }
}
