//! CLR hosting interfaces (mscoree.dll).
//!
//! None of these interfaces are included in the windows crate, so they are
//! defined manually. Vtable layout follows metahost.h exactly.

use std::ffi::c_void;
use windows::core::{GUID, HRESULT, PCWSTR};

pub const CLSID_CLR_META_HOST: GUID = GUID::from_u128(0x9280188d_0e8e_4867_b30c_7fa83884e8de);
pub const IID_ICLR_META_HOST: GUID = GUID::from_u128(0xD332DB9E_B9B3_4125_8207_A14884F53216);
pub const IID_ICLR_RUNTIME_INFO: GUID = GUID::from_u128(0xBD39D1D2_BA2F_486a_89B0_B4B0CB466891);
pub const CLSID_CLR_RUNTIME_HOST: GUID = GUID::from_u128(0x90F1A06E_7712_4762_86B5_7A5EBA6BDB02);
pub const IID_ICLR_RUNTIME_HOST: GUID = GUID::from_u128(0x90F1A06C_7712_4762_86B5_7A5EBA6BDB02);

/// `CLRCreateInstance` export of mscoree.dll.
pub type CLRCreateInstanceFn = unsafe extern "system" fn(
    clsid: *const GUID,
    riid: *const GUID,
    ppinterface: *mut *mut c_void,
) -> HRESULT;

/// Callback shape `ICLRRuntimeHost::ExecuteInAppDomain` expects.
pub type ExecuteInAppDomainCallbackFn =
    unsafe extern "system" fn(cookie: *mut c_void) -> HRESULT;

// ICLRMetaHost
#[repr(C)]
pub struct ICLRMetaHostVtbl {
    // IUnknown
    pub query_interface:
        unsafe extern "system" fn(*mut ICLRMetaHost, *const GUID, *mut *mut c_void) -> HRESULT,
    pub add_ref: unsafe extern "system" fn(*mut ICLRMetaHost) -> u32,
    pub release: unsafe extern "system" fn(*mut ICLRMetaHost) -> u32,
    // ICLRMetaHost
    pub get_runtime: unsafe extern "system" fn(
        *mut ICLRMetaHost,
        PCWSTR,
        *const GUID,
        *mut *mut c_void,
    ) -> HRESULT,
    pub get_version_from_file:
        unsafe extern "system" fn(*mut ICLRMetaHost, PCWSTR, *mut u16, *mut u32) -> HRESULT,
    pub enumerate_installed_runtimes:
        unsafe extern "system" fn(*mut ICLRMetaHost, *mut *mut c_void) -> HRESULT,
    pub enumerate_loaded_runtimes: unsafe extern "system" fn(
        *mut ICLRMetaHost,
        *mut c_void, // process handle
        *mut *mut IEnumUnknown,
    ) -> HRESULT,
    pub request_runtime_loaded_notification:
        unsafe extern "system" fn(*mut ICLRMetaHost, *mut c_void) -> HRESULT,
    pub query_legacy_v2_runtime_binding:
        unsafe extern "system" fn(*mut ICLRMetaHost, *const GUID, *mut *mut c_void) -> HRESULT,
    pub exit_process: unsafe extern "system" fn(*mut ICLRMetaHost, i32) -> HRESULT,
}

#[repr(C)]
pub struct ICLRMetaHost {
    pub vtbl: *const ICLRMetaHostVtbl,
}

// ICLRRuntimeInfo
#[repr(C)]
pub struct ICLRRuntimeInfoVtbl {
    // IUnknown
    pub query_interface:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, *const GUID, *mut *mut c_void) -> HRESULT,
    pub add_ref: unsafe extern "system" fn(*mut ICLRRuntimeInfo) -> u32,
    pub release: unsafe extern "system" fn(*mut ICLRRuntimeInfo) -> u32,
    // ICLRRuntimeInfo
    pub get_version_string:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, *mut u16, *mut u32) -> HRESULT,
    pub get_runtime_directory:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, *mut u16, *mut u32) -> HRESULT,
    pub is_loaded:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, *mut c_void, *mut i32) -> HRESULT,
    pub load_error_string:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, u32, *mut u16, *mut u32, i32) -> HRESULT,
    pub load_library:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, PCWSTR, *mut *mut c_void) -> HRESULT,
    pub get_proc_address:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, *const i8, *mut *mut c_void) -> HRESULT,
    pub get_interface: unsafe extern "system" fn(
        *mut ICLRRuntimeInfo,
        *const GUID,
        *const GUID,
        *mut *mut c_void,
    ) -> HRESULT,
    pub is_loadable: unsafe extern "system" fn(*mut ICLRRuntimeInfo, *mut i32) -> HRESULT,
    pub set_default_startup_flags:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, u32, PCWSTR) -> HRESULT,
    pub get_default_startup_flags:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, *mut u32, *mut u16, *mut u32) -> HRESULT,
    pub bind_as_legacy_v2_runtime: unsafe extern "system" fn(*mut ICLRRuntimeInfo) -> HRESULT,
    pub is_started: unsafe extern "system" fn(*mut ICLRRuntimeInfo, *mut i32, *mut u32) -> HRESULT,
}

#[repr(C)]
pub struct ICLRRuntimeInfo {
    pub vtbl: *const ICLRRuntimeInfoVtbl,
}

// ICLRRuntimeHost
#[repr(C)]
pub struct ICLRRuntimeHostVtbl {
    // IUnknown
    pub query_interface:
        unsafe extern "system" fn(*mut ICLRRuntimeHost, *const GUID, *mut *mut c_void) -> HRESULT,
    pub add_ref: unsafe extern "system" fn(*mut ICLRRuntimeHost) -> u32,
    pub release: unsafe extern "system" fn(*mut ICLRRuntimeHost) -> u32,
    // ICLRRuntimeHost
    pub start: unsafe extern "system" fn(*mut ICLRRuntimeHost) -> HRESULT,
    pub stop: unsafe extern "system" fn(*mut ICLRRuntimeHost) -> HRESULT,
    pub set_host_control:
        unsafe extern "system" fn(*mut ICLRRuntimeHost, *mut c_void) -> HRESULT,
    pub get_clr_control:
        unsafe extern "system" fn(*mut ICLRRuntimeHost, *mut *mut c_void) -> HRESULT,
    pub unload_app_domain:
        unsafe extern "system" fn(*mut ICLRRuntimeHost, u32, i32) -> HRESULT,
    pub execute_in_app_domain: unsafe extern "system" fn(
        *mut ICLRRuntimeHost,
        u32,
        ExecuteInAppDomainCallbackFn,
        *mut c_void,
    ) -> HRESULT,
    pub get_current_app_domain_id:
        unsafe extern "system" fn(*mut ICLRRuntimeHost, *mut u32) -> HRESULT,
    pub execute_application: unsafe extern "system" fn(
        *mut ICLRRuntimeHost,
        PCWSTR,
        u32,
        *const PCWSTR,
        u32,
        *const PCWSTR,
        *mut i32,
    ) -> HRESULT,
    pub execute_in_default_app_domain: unsafe extern "system" fn(
        *mut ICLRRuntimeHost,
        PCWSTR,
        PCWSTR,
        PCWSTR,
        PCWSTR,
        *mut u32,
    ) -> HRESULT,
}

#[repr(C)]
pub struct ICLRRuntimeHost {
    pub vtbl: *const ICLRRuntimeHostVtbl,
}

// IEnumUnknown
#[repr(C)]
pub struct IEnumUnknownVtbl {
    // IUnknown
    pub query_interface:
        unsafe extern "system" fn(*mut IEnumUnknown, *const GUID, *mut *mut c_void) -> HRESULT,
    pub add_ref: unsafe extern "system" fn(*mut IEnumUnknown) -> u32,
    pub release: unsafe extern "system" fn(*mut IEnumUnknown) -> u32,
    // IEnumUnknown
    pub next: unsafe extern "system" fn(
        *mut IEnumUnknown,
        u32,
        *mut *mut c_void,
        *mut u32,
    ) -> HRESULT,
    pub skip: unsafe extern "system" fn(*mut IEnumUnknown, u32) -> HRESULT,
    pub reset: unsafe extern "system" fn(*mut IEnumUnknown) -> HRESULT,
    pub clone: unsafe extern "system" fn(*mut IEnumUnknown, *mut *mut IEnumUnknown) -> HRESULT,
}

#[repr(C)]
pub struct IEnumUnknown {
    pub vtbl: *const IEnumUnknownVtbl,
}
