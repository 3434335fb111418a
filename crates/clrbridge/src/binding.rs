//! Runtime binding abstraction.
//!
//! A binding is one live attachment to a CLR instance. The Windows
//! implementation lives in [`crate::mscoree`]; tests substitute their own.

use crate::Result;
use std::ffi::c_void;

/// Native callback executed inside an AppDomain.
///
/// The argument is the exact pointer handed to
/// [`run_in_domain`](RuntimeBinding::run_in_domain); it is never retained
/// past the call.
pub type AppDomainProc = extern "system" fn(args: *mut c_void);

/// Operations on a single CLR instance loaded in this process.
pub trait RuntimeBinding {
    /// Version string as the runtime reports it (e.g. "v4.0.30319").
    fn version(&self) -> Result<String>;

    /// Id of the AppDomain active on the calling thread.
    fn current_domain_id(&self) -> Result<u32>;

    /// Invoke `proc(args)` synchronously inside the AppDomain with the given
    /// id. Returns once the callback has run exactly once.
    fn run_in_domain(&self, domain_id: u32, proc: AppDomainProc, args: *mut c_void) -> Result<()>;
}
