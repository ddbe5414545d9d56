//! FFI bindings for Xian Universe
//!
//! C-compatible entry points. Strings are null-terminated UTF-8; every
//! non-null string returned here must be released with `xian_free_string`.
//! On failure functions return NULL (or -1) and record a message readable
//! through `xian_last_error`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::error::UniverseError;
use crate::pipeline::{match_users, users_to_profiles, UniverseProcessor};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Borrow a required string argument, naming it in the error
unsafe fn arg<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, String> {
    if ptr.is_null() {
        return Err(format!("{name} is NULL"));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| format!("{name} is not valid UTF-8"))
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => {
            set_last_error("output contains an interior NUL byte");
            ptr::null_mut()
        }
    }
}

/// Hand a JSON result across the boundary
fn json_result(result: Result<String, String>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(msg) => {
            set_last_error(&msg);
            ptr::null_mut()
        }
    }
}

fn describe(e: UniverseError) -> String {
    e.to_string()
}

// ============================================================================
// Stateless API
// ============================================================================

/// Convert a users document into a profiles payload.
///
/// # Safety
/// - `users_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `xian_free_string`.
/// - Returns NULL on error; call `xian_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn xian_users_to_profiles(users_json: *const c_char) -> *mut c_char {
    clear_last_error();
    json_result(arg(users_json, "users_json").and_then(|json| users_to_profiles(json).map_err(describe)))
}

/// Analyze two users of a document.
///
/// # Safety
/// - All arguments must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `xian_free_string`.
/// - Returns NULL on error; call `xian_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn xian_match_users(
    users_json: *const c_char,
    id_a: *const c_char,
    id_b: *const c_char,
) -> *mut c_char {
    clear_last_error();
    let result = (|| {
        let json = arg(users_json, "users_json")?;
        let a = arg(id_a, "id_a")?;
        let b = arg(id_b, "id_b")?;
        match_users(json, a, b).map_err(describe)
    })();
    json_result(result)
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a UniverseProcessor
pub struct UniverseProcessorHandle {
    processor: UniverseProcessor,
}

/// Borrow the processor behind a handle
unsafe fn handle<'a>(
    processor: *mut UniverseProcessorHandle,
) -> Result<&'a mut UniverseProcessor, String> {
    if processor.is_null() {
        return Err("Null processor pointer".to_string());
    }
    Ok(&mut (*processor).processor)
}

/// Create a processor.
///
/// # Safety
/// - `config_json` may be NULL for the standard tables, otherwise it must be a
///   valid null-terminated C string holding an engine configuration.
/// - Must be freed with `xian_processor_free`.
/// - Returns NULL if the configuration is invalid.
#[no_mangle]
pub unsafe extern "C" fn xian_processor_new(
    config_json: *const c_char,
) -> *mut UniverseProcessorHandle {
    clear_last_error();

    let processor = if config_json.is_null() {
        Ok(UniverseProcessor::new())
    } else {
        arg(config_json, "config_json").and_then(|json| {
            EngineConfig::from_json(json)
                .and_then(UniverseProcessor::with_config)
                .map_err(describe)
        })
    };

    match processor {
        Ok(processor) => Box::into_raw(Box::new(UniverseProcessorHandle { processor })),
        Err(msg) => {
            set_last_error(&msg);
            ptr::null_mut()
        }
    }
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a pointer returned by `xian_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn xian_processor_free(processor: *mut UniverseProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Load a users document into a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `xian_processor_new`.
/// - `users_json` must be a valid null-terminated C string.
/// - Returns the number of users in the document, or -1 on error.
#[no_mangle]
pub unsafe extern "C" fn xian_processor_load_users(
    processor: *mut UniverseProcessorHandle,
    users_json: *const c_char,
) -> i32 {
    clear_last_error();
    let result = handle(processor).and_then(|p| {
        let json = arg(users_json, "users_json")?;
        p.load_users(json).map_err(describe)
    });

    match result {
        Ok(count) => i32::try_from(count).unwrap_or(i32::MAX),
        Err(msg) => {
            set_last_error(&msg);
            -1
        }
    }
}

/// Profiles payload for every loaded user.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `xian_processor_new`.
/// - Returns a newly allocated string that must be freed with `xian_free_string`.
/// - Returns NULL on error; call `xian_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn xian_processor_profiles(
    processor: *mut UniverseProcessorHandle,
) -> *mut c_char {
    clear_last_error();
    json_result(handle(processor).and_then(|p| p.profiles().map_err(describe)))
}

/// Match payload for two loaded users.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `xian_processor_new`.
/// - `id_a` and `id_b` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `xian_free_string`.
/// - Returns NULL on error; call `xian_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn xian_processor_match(
    processor: *mut UniverseProcessorHandle,
    id_a: *const c_char,
    id_b: *const c_char,
) -> *mut c_char {
    clear_last_error();
    let result = handle(processor).and_then(|p| {
        let a = arg(id_a, "id_a")?;
        let b = arg(id_b, "id_b")?;
        p.match_pair(a, b, None).map_err(describe)
    });
    json_result(result)
}

/// JSON array of the `top` users most similar to `id`.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `xian_processor_new`.
/// - `id` must be a valid null-terminated C string.
/// - A non-positive `top` yields an empty array.
/// - Returns a newly allocated string that must be freed with `xian_free_string`.
/// - Returns NULL on error; call `xian_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn xian_processor_rank(
    processor: *mut UniverseProcessorHandle,
    id: *const c_char,
    top: i32,
) -> *mut c_char {
    clear_last_error();
    let result = handle(processor).and_then(|p| {
        let id = arg(id, "id")?;
        let ranked = p
            .rank(id, usize::try_from(top).unwrap_or(0))
            .map_err(describe)?;
        serde_json::to_string(&ranked).map_err(|e| e.to_string())
    });
    json_result(result)
}

/// Save the processor configuration to JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `xian_processor_new`.
/// - Returns a newly allocated string that must be freed with `xian_free_string`.
/// - Returns NULL on error; call `xian_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn xian_processor_save_config(
    processor: *mut UniverseProcessorHandle,
) -> *mut c_char {
    clear_last_error();
    json_result(handle(processor).and_then(|p| p.save_config().map_err(describe)))
}

/// Replace the processor configuration.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `xian_processor_new`.
/// - `config_json` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error (the previous configuration is kept).
#[no_mangle]
pub unsafe extern "C" fn xian_processor_load_config(
    processor: *mut UniverseProcessorHandle,
    config_json: *const c_char,
) -> i32 {
    clear_last_error();
    let result = handle(processor).and_then(|p| {
        let json = arg(config_json, "config_json")?;
        p.load_config(json).map_err(describe)
    });

    match result {
        Ok(()) => 0,
        Err(msg) => {
            set_last_error(&msg);
            -1
        }
    }
}

/// Number of loaded users, or -1 for a NULL processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `xian_processor_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn xian_processor_user_count(processor: *mut UniverseProcessorHandle) -> i32 {
    clear_last_error();
    match handle(processor) {
        Ok(p) => i32::try_from(p.user_count()).unwrap_or(i32::MAX),
        Err(msg) => {
            set_last_error(&msg);
            -1
        }
    }
}

/// Drop all loaded users.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `xian_processor_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn xian_processor_clear(processor: *mut UniverseProcessorHandle) {
    if let Ok(p) = handle(processor) {
        p.clear();
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by a xian function.
///
/// # Safety
/// - `ptr` must be a pointer returned by a xian function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn xian_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - The returned pointer is valid until the next xian call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if the last call succeeded.
#[no_mangle]
pub unsafe extern "C" fn xian_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn xian_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
