//! The per-runtime handle.

use crate::binding::{AppDomainProc, RuntimeBinding};
use crate::Result;
use std::ffi::c_void;

/// Handle to one CLR instance discovered in the current process.
///
/// A handle owns its binding exclusively: it is not `Clone`, moving it
/// transfers the underlying attachment, and dropping it releases the
/// attachment. Handles are only constructed by the discovery context and are
/// invalidated (dropped) when the context tears down.
pub struct ClrRuntime {
    binding: Box<dyn RuntimeBinding>,
}

impl ClrRuntime {
    pub(crate) fn new(binding: Box<dyn RuntimeBinding>) -> Self {
        Self { binding }
    }

    /// Version string of this runtime, e.g. "v4.0.30319".
    pub fn version(&self) -> Result<String> {
        self.binding.version()
    }

    /// Id of the AppDomain active on the calling thread.
    pub fn current_domain_id(&self) -> Result<u32> {
        self.binding.current_domain_id()
    }

    /// Run `proc(args)` inside the AppDomain with id `domain_id`.
    ///
    /// The call is synchronous: `proc` has been invoked exactly once, with
    /// exactly `args`, by the time this returns `Ok`. `args` must stay valid
    /// for the duration of the call; it is not retained afterwards.
    pub fn execute_in_domain(
        &self,
        domain_id: u32,
        proc: AppDomainProc,
        args: *mut c_void,
    ) -> Result<()> {
        self.binding.run_in_domain(domain_id, proc, args)
    }
}

impl std::fmt::Debug for ClrRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClrRuntime")
            .field("version", &self.binding.version().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeBinding {
        version: &'static str,
        domain_id: u32,
        invoked: Rc<Cell<u32>>,
    }

    impl RuntimeBinding for FakeBinding {
        fn version(&self) -> Result<String> {
            Ok(self.version.to_string())
        }

        fn current_domain_id(&self) -> Result<u32> {
            Ok(self.domain_id)
        }

        fn run_in_domain(
            &self,
            domain_id: u32,
            proc: AppDomainProc,
            args: *mut c_void,
        ) -> Result<()> {
            if domain_id != self.domain_id {
                return Err(Error::Other(format!("unknown domain {domain_id}")));
            }
            self.invoked.set(self.invoked.get() + 1);
            proc(args);
            Ok(())
        }
    }

    fn fake_runtime(version: &'static str, domain_id: u32) -> (ClrRuntime, Rc<Cell<u32>>) {
        let invoked = Rc::new(Cell::new(0));
        let runtime = ClrRuntime::new(Box::new(FakeBinding {
            version,
            domain_id,
            invoked: invoked.clone(),
        }));
        (runtime, invoked)
    }

    #[test]
    fn version_round_trips_from_binding() {
        let (runtime, _) = fake_runtime("v4.0.30319", 1);
        assert_eq!(runtime.version().unwrap(), "v4.0.30319");
        assert_eq!(runtime.current_domain_id().unwrap(), 1);
    }

    #[test]
    fn moving_a_handle_transfers_the_binding() {
        let (runtime, _) = fake_runtime("v2.0.50727", 1);
        let before = runtime.version().unwrap();

        // Ownership transfer; the destination answers exactly as the
        // original did, and the compiler forbids touching the source.
        let moved = runtime;
        assert_eq!(moved.version().unwrap(), before);

        let mut held = Vec::new();
        held.push(moved);
        assert_eq!(held[0].version().unwrap(), "v2.0.50727");
    }

    struct CallRecord {
        calls: u32,
        payload: u64,
    }

    extern "system" fn record_call(args: *mut c_void) {
        let record = unsafe { &mut *(args as *mut CallRecord) };
        record.calls += 1;
        record.payload = 0xC0FFEE;
    }

    #[test]
    fn execute_invokes_callback_exactly_once_before_returning() {
        let (runtime, invoked) = fake_runtime("v4.0.30319", 7);

        let mut record = CallRecord { calls: 0, payload: 0 };
        runtime
            .execute_in_domain(7, record_call, &mut record as *mut CallRecord as *mut c_void)
            .unwrap();

        // Synchronous and exactly once, with the pointer we supplied.
        assert_eq!(record.calls, 1);
        assert_eq!(record.payload, 0xC0FFEE);
        assert_eq!(invoked.get(), 1);
    }

    #[test]
    fn execute_surfaces_host_failure() {
        let (runtime, invoked) = fake_runtime("v4.0.30319", 1);

        let mut record = CallRecord { calls: 0, payload: 0 };
        let err = runtime
            .execute_in_domain(99, record_call, &mut record as *mut CallRecord as *mut c_void)
            .unwrap_err();

        assert!(matches!(err, Error::Other(_)));
        assert_eq!(record.calls, 0);
        assert_eq!(invoked.get(), 0);
    }
}
