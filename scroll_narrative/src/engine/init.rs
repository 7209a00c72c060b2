//! Process-wide one-time setup.

use std::sync::Once;

/// Runs a registration closure at most once per guard.
///
/// Hosts install process-wide hooks (custom tile protocols and the like)
/// through a guard owned by the composition root instead of doing it as a
/// side effect of loading a module.
#[derive(Debug)]
pub struct InitGuard {
    once: Once,
}

impl InitGuard {
    /// A guard that has not run yet; usable in a `static`.
    pub const fn new() -> Self {
        Self { once: Once::new() }
    }

    /// Run `register` if this guard has not run yet. Returns whether it ran.
    pub fn run(&self, register: impl FnOnce()) -> bool {
        let mut ran = false;
        self.once.call_once(|| {
            register();
            ran = true;
        });
        ran
    }

    /// Whether the registration has completed.
    pub fn is_done(&self) -> bool {
        self.once.is_completed()
    }
}

impl Default for InitGuard {
    fn default() -> Self {
        Self::new()
    }
}

static HOST_INIT: InitGuard = InitGuard::new();

/// Run the host's process-wide registration exactly once.
///
/// Call from the composition root before mounting the first engine; later
/// calls are no-ops and return false.
pub fn initialize_host(register: impl FnOnce()) -> bool {
    let ran = HOST_INIT.run(register);
    if ran {
        tracing::debug!("host integrations registered");
    }
    ran
}
