//! Discovery and lifecycle of CLR instances in the current process.
//!
//! The original hosting API is driven through process-wide globals; here the
//! same lifecycle is held by an explicit [`ClrContext`] so ownership and
//! teardown order are visible. One context per process is the intended use.

use crate::runtime::ClrRuntime;
use crate::Result;
use tracing::debug;

/// Access to the platform's runtime-hosting service.
///
/// Attaching loads the hosting library and resolves its factory entry point.
/// An `Err` means the environment simply has no hosting service; discovery
/// problems past that point are the session's business.
pub trait HostEnvironment {
    fn attach(&self) -> Result<Box<dyn HostSession>>;
}

/// A live attachment to the hosting service.
///
/// The session owns the metadata-discovery service and the hosting library
/// handle; dropping it releases both, in that order.
pub trait HostSession {
    /// Enumerate the runtimes already loaded into this process, in whatever
    /// order the platform enumerator yields them. Discovery failures degrade
    /// to an empty list; entries that fail to resolve are skipped.
    fn loaded_runtimes(&mut self) -> Vec<ClrRuntime>;
}

/// Process-wide registry of discovered runtimes.
///
/// Not synchronized: discovery, registry access and teardown must be
/// serialized by the caller.
pub struct ClrContext {
    environment: Box<dyn HostEnvironment>,
    initialized: bool,
    // Field order is load-bearing: runtime handles hold references into the
    // hosting library and must drop before the session unloads it.
    runtimes: Vec<ClrRuntime>,
    session: Option<Box<dyn HostSession>>,
}

impl ClrContext {
    /// Context over the Windows runtime-hosting service (mscoree.dll).
    #[cfg(windows)]
    pub fn new() -> Self {
        Self::with_environment(Box::new(crate::mscoree::MscoreeEnvironment))
    }

    /// Context over a caller-supplied hosting environment.
    pub fn with_environment(environment: Box<dyn HostEnvironment>) -> Self {
        Self {
            environment,
            initialized: false,
            runtimes: Vec::new(),
            session: None,
        }
    }

    /// Attach to the hosting service and populate the registry.
    ///
    /// Returns false if already initialized, or if the hosting library or
    /// its entry point cannot be resolved (in which case all state is rolled
    /// back). Returns true otherwise, even when discovery found no runtimes.
    pub fn init(&mut self) -> bool {
        if self.initialized {
            debug!("init called on an initialized context");
            return false;
        }

        let mut session = match self.environment.attach() {
            Ok(session) => session,
            Err(e) => {
                debug!("hosting service unavailable: {e}");
                self.uninit();
                return false;
            }
        };

        self.runtimes = session.loaded_runtimes();
        debug!("discovered {} loaded runtime(s)", self.runtimes.len());

        self.session = Some(session);
        self.initialized = true;
        true
    }

    /// Drop every handle, release the discovery service, unload the hosting
    /// library. Safe to call at any point, including after a failed init.
    pub fn uninit(&mut self) {
        self.runtimes.clear();
        self.session = None;
        self.initialized = false;
    }

    /// True iff at least one runtime was discovered.
    pub fn is_loaded(&self) -> bool {
        !self.runtimes.is_empty()
    }

    /// The discovered runtimes, in enumeration order. The slice is valid
    /// until the next `uninit`/`init` cycle.
    pub fn runtimes(&self) -> &[ClrRuntime] {
        &self.runtimes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{AppDomainProc, RuntimeBinding};
    use crate::Error;
    use std::ffi::c_void;

    struct FakeBinding {
        version: &'static str,
    }

    impl RuntimeBinding for FakeBinding {
        fn version(&self) -> Result<String> {
            Ok(self.version.to_string())
        }

        fn current_domain_id(&self) -> Result<u32> {
            Ok(1)
        }

        fn run_in_domain(
            &self,
            _domain_id: u32,
            proc: AppDomainProc,
            args: *mut c_void,
        ) -> Result<()> {
            proc(args);
            Ok(())
        }
    }

    struct FakeEnvironment {
        attachable: bool,
        versions: &'static [&'static str],
    }

    impl HostEnvironment for FakeEnvironment {
        fn attach(&self) -> Result<Box<dyn HostSession>> {
            if !self.attachable {
                return Err(Error::HostingUnavailable);
            }
            Ok(Box::new(FakeSession {
                versions: self.versions,
            }))
        }
    }

    struct FakeSession {
        versions: &'static [&'static str],
    }

    impl HostSession for FakeSession {
        fn loaded_runtimes(&mut self) -> Vec<ClrRuntime> {
            self.versions
                .iter()
                .map(|v| ClrRuntime::new(Box::new(FakeBinding { version: v })))
                .collect()
        }
    }

    fn context(attachable: bool, versions: &'static [&'static str]) -> ClrContext {
        ClrContext::with_environment(Box::new(FakeEnvironment {
            attachable,
            versions,
        }))
    }

    #[test]
    fn init_populates_registry_in_enumeration_order() {
        let mut ctx = context(true, &["v2.0.50727", "v4.0.30319"]);
        assert!(ctx.init());
        assert!(ctx.is_loaded());

        let versions: Vec<_> = ctx
            .runtimes()
            .iter()
            .map(|r| r.version().unwrap())
            .collect();
        assert_eq!(versions, ["v2.0.50727", "v4.0.30319"]);
    }

    #[test]
    fn second_init_fails_and_leaves_registry_unchanged() {
        let mut ctx = context(true, &["v4.0.30319"]);
        assert!(ctx.init());
        assert!(!ctx.init());
        assert_eq!(ctx.runtimes().len(), 1);
        assert_eq!(ctx.runtimes()[0].version().unwrap(), "v4.0.30319");
    }

    #[test]
    fn init_succeeds_with_zero_runtimes() {
        let mut ctx = context(true, &[]);
        assert!(ctx.init());
        assert!(!ctx.is_loaded());
        assert!(ctx.runtimes().is_empty());
    }

    #[test]
    fn init_fails_when_hosting_service_is_absent() {
        let mut ctx = context(false, &[]);
        assert!(!ctx.init());
        assert!(!ctx.is_loaded());

        // Teardown after the failed init must not fault on unset resources.
        ctx.uninit();
        assert!(!ctx.is_loaded());
        assert!(ctx.runtimes().is_empty());

        // A failed init rolls back fully, so a later attempt starts clean.
        assert!(!ctx.init());
    }

    #[test]
    fn uninit_clears_registry_regardless_of_prior_state() {
        let mut ctx = context(true, &["v4.0.30319"]);
        assert!(ctx.init());
        ctx.uninit();
        assert!(!ctx.is_loaded());
        assert!(ctx.runtimes().is_empty());

        // Safe on an already-clean context too.
        ctx.uninit();
        assert!(!ctx.is_loaded());
    }

    #[test]
    fn registry_is_rebuilt_on_each_init_cycle() {
        let mut ctx = context(true, &["v4.0.30319"]);
        assert!(ctx.init());
        ctx.uninit();
        assert!(ctx.init());
        assert_eq!(ctx.runtimes().len(), 1);
    }
}
