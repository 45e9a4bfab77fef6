#![forbid(unsafe_code)]

//! SIGINT/SIGTERM as a pollable flag.
//!
//! Neither stage of the program wants the default "kill the process" signal
//! disposition: the phase stage has to print its farewell and the rain stage
//! has to restore the terminal before leaving. Instead, an
//! [`InterruptGuard`] swaps the disposition for one that raises a shared
//! [`InterruptFlag`], and the loops poll that flag between frames or delays.
//!
//! Dropping the guard unregisters the handlers again. On non-unix targets no
//! handler is installed and the flag is only ever raised by hand.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};

/// A cheaply clonable "an interrupt arrived" flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    /// Create a lowered flag with no handlers attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an interrupt has been delivered since the last [`clear`](Self::clear).
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Relaxed)
    }

    /// Raise the flag manually.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Relaxed);
    }

    /// Lower the flag.
    pub fn clear(&self) {
        self.raised.store(false, Ordering::Relaxed);
    }
}

/// Keeps SIGINT/SIGTERM routed to an [`InterruptFlag`] while alive.
#[derive(Debug)]
pub struct InterruptGuard {
    flag: InterruptFlag,
    #[cfg(unix)]
    ids: Vec<signal_hook::SigId>,
}

impl InterruptGuard {
    /// Route SIGINT and SIGTERM to a fresh flag.
    ///
    /// # Errors
    ///
    /// Returns an error if a handler cannot be registered.
    pub fn install() -> io::Result<Self> {
        Self::install_for(InterruptFlag::new())
    }

    /// Route SIGINT and SIGTERM to an existing flag.
    ///
    /// # Errors
    ///
    /// Returns an error if a handler cannot be registered.
    pub fn install_for(flag: InterruptFlag) -> io::Result<Self> {
        #[cfg(unix)]
        {
            let mut ids = Vec::with_capacity(2);
            for signal in [SIGINT, SIGTERM] {
                ids.push(signal_hook::flag::register(
                    signal,
                    Arc::clone(&flag.raised),
                )?);
            }
            crate::debug!("interrupt handlers installed");
            Ok(Self { flag, ids })
        }
        #[cfg(not(unix))]
        {
            Ok(Self { flag })
        }
    }

    /// The flag this guard raises.
    #[must_use]
    pub fn flag(&self) -> &InterruptFlag {
        &self.flag
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        for id in self.ids.drain(..) {
            signal_hook::low_level::unregister(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_starts_lowered() {
        assert!(!InterruptFlag::new().is_raised());
    }

    #[test]
    fn clones_share_state() {
        let flag = InterruptFlag::new();
        let other = flag.clone();
        other.raise();
        assert!(flag.is_raised());
        flag.clear();
        assert!(!other.is_raised());
    }

    #[test]
    fn guard_exposes_its_flag() {
        let flag = InterruptFlag::new();
        let guard = InterruptGuard::install_for(flag.clone()).expect("install handlers");
        guard.flag().raise();
        assert!(flag.is_raised());
        drop(guard);
        assert!(flag.is_raised(), "dropping the guard must not reset the flag");
    }
}
