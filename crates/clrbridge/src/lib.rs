//! Enumerate CLR instances loaded into the current process and run native
//! callbacks inside their AppDomains.
//!
//! The entry point is [`ClrContext`]: init it once, inspect the discovered
//! [`ClrRuntime`] handles, tear it down when done.
//!
//! ```no_run
//! use clrbridge::ClrContext;
//!
//! # #[cfg(windows)] {
//! let mut ctx = ClrContext::new();
//! if ctx.init() && ctx.is_loaded() {
//!     let runtime = &ctx.runtimes()[0];
//!     println!("CLR {}", runtime.version().unwrap());
//! }
//! ctx.uninit();
//! # }
//! ```
//!
//! Only Windows provides the underlying hosting service; on other platforms
//! the platform bindings are absent and a context can only be built over a
//! caller-supplied [`HostEnvironment`].

pub mod binding;
pub mod context;
pub mod error;
#[cfg(windows)]
pub mod hosting;
#[cfg(windows)]
pub mod mscoree;
pub mod runtime;

pub use binding::{AppDomainProc, RuntimeBinding};
pub use context::{ClrContext, HostEnvironment, HostSession};
pub use error::{Error, Result};
pub use runtime::ClrRuntime;
