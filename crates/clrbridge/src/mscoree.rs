//! Windows implementation of runtime discovery over mscoree.dll.
//!
//! Discovery walks `CLRCreateInstance` -> `ICLRMetaHost` ->
//! `EnumerateLoadedRuntimes`; each enumerated `ICLRRuntimeInfo` becomes one
//! [`MetaHostBinding`]. Every hosting-API failure along the way degrades to
//! "that runtime is unavailable" rather than aborting discovery.

use crate::binding::{AppDomainProc, RuntimeBinding};
use crate::context::{HostEnvironment, HostSession};
use crate::hosting::*;
use crate::runtime::ClrRuntime;
use crate::{Error, Result};
use std::ffi::c_void;
use std::ptr;
use tracing::{debug, warn};
use windows::core::{GUID, HRESULT, s, w};
use windows::Win32::Foundation::{FreeLibrary, HMODULE, MAX_PATH, S_OK};
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::Win32::System::Threading::GetCurrentProcess;

// Minimal IUnknown vtable for raw QueryInterface/Release on enumerated items.
#[repr(C)]
struct IUnknownVtbl {
    query_interface:
        unsafe extern "system" fn(*mut c_void, *const GUID, *mut *mut c_void) -> HRESULT,
    add_ref: unsafe extern "system" fn(*mut c_void) -> u32,
    release: unsafe extern "system" fn(*mut c_void) -> u32,
}

/// The Windows runtime-hosting service.
pub struct MscoreeEnvironment;

impl HostEnvironment for MscoreeEnvironment {
    fn attach(&self) -> Result<Box<dyn HostSession>> {
        let library =
            unsafe { LoadLibraryW(w!("mscoree.dll")) }.map_err(|_| Error::HostingUnavailable)?;

        let Some(create_instance) = (unsafe { GetProcAddress(library, s!("CLRCreateInstance")) })
        else {
            unsafe {
                let _ = FreeLibrary(library);
            }
            return Err(Error::HostingUnavailable);
        };
        let create_instance: CLRCreateInstanceFn =
            unsafe { std::mem::transmute(create_instance) };

        Ok(Box::new(MscoreeSession {
            library,
            create_instance,
            meta_host: ptr::null_mut(),
        }))
    }
}

/// A live attachment to mscoree.dll.
///
/// Owns the library handle and, once discovery has run, the `ICLRMetaHost`
/// reference. Dropped last by the context, after every runtime handle has
/// released its own references.
pub struct MscoreeSession {
    library: HMODULE,
    create_instance: CLRCreateInstanceFn,
    meta_host: *mut ICLRMetaHost,
}

impl HostSession for MscoreeSession {
    fn loaded_runtimes(&mut self) -> Vec<ClrRuntime> {
        // One discovery pass per session; a second call would leak the
        // stored meta host reference.
        debug_assert!(self.meta_host.is_null());

        let mut runtimes = Vec::new();

        unsafe {
            let mut meta_host: *mut ICLRMetaHost = ptr::null_mut();
            let hr = (self.create_instance)(
                &CLSID_CLR_META_HOST,
                &IID_ICLR_META_HOST,
                &mut meta_host as *mut _ as *mut *mut c_void,
            );
            if hr.is_err() || meta_host.is_null() {
                debug!("CLRCreateInstance(ICLRMetaHost) failed: 0x{:08X}", hr.0);
                return runtimes;
            }
            self.meta_host = meta_host;

            let mut enum_unknown: *mut IEnumUnknown = ptr::null_mut();
            let hr = ((*(*meta_host).vtbl).enumerate_loaded_runtimes)(
                meta_host,
                GetCurrentProcess().0,
                &mut enum_unknown,
            );
            if hr.is_err() || enum_unknown.is_null() {
                debug!("EnumerateLoadedRuntimes failed: 0x{:08X}", hr.0);
                return runtimes;
            }

            loop {
                let mut unknown: *mut c_void = ptr::null_mut();
                let mut fetched: u32 = 0;
                let hr =
                    ((*(*enum_unknown).vtbl).next)(enum_unknown, 1, &mut unknown, &mut fetched);
                if hr.is_err() || fetched == 0 || unknown.is_null() {
                    break;
                }

                let unknown_vtbl = unknown as *mut *const IUnknownVtbl;
                let mut info: *mut ICLRRuntimeInfo = ptr::null_mut();
                let hr = ((**unknown_vtbl).query_interface)(
                    unknown,
                    &IID_ICLR_RUNTIME_INFO,
                    &mut info as *mut _ as *mut *mut c_void,
                );
                if hr.is_ok() && !info.is_null() {
                    runtimes.push(ClrRuntime::new(Box::new(MetaHostBinding::new(info))));
                } else {
                    warn!("skipping runtime entry, QueryInterface failed: 0x{:08X}", hr.0);
                }

                ((**unknown_vtbl).release)(unknown);
            }

            ((*(*enum_unknown).vtbl).release)(enum_unknown);
        }

        runtimes
    }
}

impl Drop for MscoreeSession {
    fn drop(&mut self) {
        unsafe {
            if !self.meta_host.is_null() {
                ((*(*self.meta_host).vtbl).release)(self.meta_host);
                self.meta_host = ptr::null_mut();
            }
            let _ = FreeLibrary(self.library);
        }
    }
}

/// Binding to one loaded CLR via `ICLRRuntimeInfo` / `ICLRRuntimeHost`.
///
/// The host reference is derived once at construction. When derivation
/// fails the binding still exists (the version stays readable) but
/// host-dependent calls report [`Error::HostUnavailable`].
pub struct MetaHostBinding {
    info: *mut ICLRRuntimeInfo,
    host: Option<*mut ICLRRuntimeHost>,
}

impl MetaHostBinding {
    /// Takes ownership of an already-referenced `ICLRRuntimeInfo`.
    pub(crate) fn new(info: *mut ICLRRuntimeInfo) -> Self {
        let mut host: *mut ICLRRuntimeHost = ptr::null_mut();
        let hr = unsafe {
            ((*(*info).vtbl).get_interface)(
                info,
                &CLSID_CLR_RUNTIME_HOST,
                &IID_ICLR_RUNTIME_HOST,
                &mut host as *mut _ as *mut *mut c_void,
            )
        };

        let host = if hr.is_ok() && !host.is_null() {
            Some(host)
        } else {
            warn!("ICLRRuntimeHost not available for runtime: 0x{:08X}", hr.0);
            None
        };

        Self { info, host }
    }

    fn host(&self) -> Result<*mut ICLRRuntimeHost> {
        self.host.ok_or(Error::HostUnavailable)
    }
}

struct DomainCallbackData {
    proc: AppDomainProc,
    args: *mut c_void,
}

unsafe extern "system" fn domain_callback_entry(cookie: *mut c_void) -> HRESULT {
    let data = unsafe { &*(cookie as *const DomainCallbackData) };
    (data.proc)(data.args);
    S_OK
}

impl RuntimeBinding for MetaHostBinding {
    fn version(&self) -> Result<String> {
        // Zeroed so a partial write never leaks stale buffer contents.
        let mut buffer = [0u16; MAX_PATH as usize];
        let mut length = MAX_PATH;
        unsafe {
            ((*(*self.info).vtbl).get_version_string)(
                self.info,
                buffer.as_mut_ptr(),
                &mut length,
            )
            .ok()?;
        }

        let end = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
        Ok(String::from_utf16_lossy(&buffer[..end]))
    }

    fn current_domain_id(&self) -> Result<u32> {
        let host = self.host()?;
        let mut domain_id: u32 = 0;
        unsafe {
            ((*(*host).vtbl).get_current_app_domain_id)(host, &mut domain_id).ok()?;
        }
        Ok(domain_id)
    }

    fn run_in_domain(&self, domain_id: u32, proc: AppDomainProc, args: *mut c_void) -> Result<()> {
        let host = self.host()?;

        // Lives only for the duration of this call; the host invokes the
        // trampoline synchronously before ExecuteInAppDomain returns.
        let mut data = DomainCallbackData { proc, args };
        unsafe {
            ((*(*host).vtbl).execute_in_app_domain)(
                host,
                domain_id,
                domain_callback_entry,
                &mut data as *mut DomainCallbackData as *mut c_void,
            )
            .ok()?;
        }
        Ok(())
    }
}

impl Drop for MetaHostBinding {
    fn drop(&mut self) {
        unsafe {
            if let Some(host) = self.host.take() {
                ((*(*host).vtbl).release)(host);
            }
            ((*(*self.info).vtbl).release)(self.info);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ClrContext;

    #[test]
    fn discovery_degrades_gracefully_in_a_native_process() {
        // The test binary is not a .NET process: mscoree.dll resolves, so
        // init succeeds, but the enumerator yields nothing.
        let mut ctx = ClrContext::new();
        if ctx.init() {
            assert!(!ctx.is_loaded());
            assert!(ctx.runtimes().is_empty());
        }
        ctx.uninit();
        assert!(!ctx.is_loaded());
    }
}
