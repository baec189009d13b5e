//! C-compatible API for the Forthic runtime client.
//!
//! Every object crossing the boundary is an opaque, heap-allocated handle.
//! Ownership rules:
//!
//! - `*_create*` functions and `stack_value_get_array` return owned handles;
//!   the caller releases each with the matching `*_destroy` function.
//! - Output arrays are released together with their length through
//!   `stack_value_array_destroy`, which also releases every element.
//! - `const char*` results are borrowed from their owning handle and stay
//!   valid until that handle is destroyed. They must not be freed.
//! - Input handles passed to a call are borrowed and remain owned by the
//!   caller.
//!
//! The C declarations live in `include/forthic_grpc.h`.

use std::collections::BTreeMap;
use std::ffi::{CStr, CString, c_char};
use std::ptr;
use std::sync::OnceLock;

use crate::client::BlockingRuntimeClient;
use crate::codec::ExecutionOutcome;
use crate::config::ClientConfig;
use crate::error::{ErrorInfo, GrpcErrorCode};
use crate::value::{Instant, PlainDate, StackValue, StackValueType, ZonedDateTime};

const EMPTY: &CStr = c"";

/// Opaque `StackValue` handle.
pub struct StackValueHandle {
    value: StackValue,
    // NUL-terminated view of the string payload or zone name, built on demand.
    c_text: OnceLock<CString>,
}

impl StackValueHandle {
    fn into_raw(value: StackValue) -> *mut StackValueHandle {
        Box::into_raw(Box::new(StackValueHandle {
            value,
            c_text: OnceLock::new(),
        }))
    }

    fn c_text(&self) -> *const c_char {
        let text = match &self.value {
            StackValue::String(text) => text.as_str(),
            StackValue::ZonedDateTime(zoned) => zoned.timezone.as_str(),
            _ => return EMPTY.as_ptr(),
        };
        self.c_text.get_or_init(|| c_string_lossy(text)).as_ptr()
    }
}

/// Opaque `ErrorInfo` handle.
pub struct ErrorInfoHandle {
    message: CString,
    runtime: CString,
    error_type: CString,
}

impl ErrorInfoHandle {
    fn into_raw(info: &ErrorInfo) -> *mut ErrorInfoHandle {
        Box::into_raw(Box::new(ErrorInfoHandle {
            message: c_string_lossy(&info.message),
            runtime: c_string_lossy(&info.runtime),
            error_type: c_string_lossy(&info.error_type),
        }))
    }
}

/// Opaque client handle.
pub struct GrpcClient {
    client: BlockingRuntimeClient,
}

/// Opaque server handle. No server can be created through the C API yet.
pub struct GrpcServer {
    _private: (),
}

// Interior NULs cannot be represented in C; the C view ends at the first one.
fn c_string_lossy(text: &str) -> CString {
    let bytes = text.as_bytes();
    let end = bytes.iter().position(|byte| *byte == 0).unwrap_or(bytes.len());
    CString::new(&bytes[..end]).unwrap_or_default()
}

unsafe fn read_str<'a>(text: *const c_char) -> Option<&'a str> {
    if text.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(text) }.to_str().ok()
}

unsafe fn read_value<'a>(value: *const StackValueHandle) -> Option<&'a StackValue> {
    unsafe { value.as_ref() }.map(|handle| &handle.value)
}

/// Copy borrowed handles into owned values. Null entries read as `Null`.
unsafe fn copy_values(
    items: *const *const StackValueHandle,
    len: usize,
) -> Result<Vec<StackValue>, GrpcErrorCode> {
    if len == 0 {
        return Ok(Vec::new());
    }
    if items.is_null() {
        return Err(GrpcErrorCode::InvalidArgument);
    }
    let items = unsafe { std::slice::from_raw_parts(items, len) };
    Ok(items
        .iter()
        .map(|item| unsafe { read_value(*item) }.cloned().unwrap_or_default())
        .collect())
}

unsafe fn read_strs<'a>(
    texts: *const *const c_char,
    len: usize,
) -> Result<Vec<&'a str>, GrpcErrorCode> {
    if len == 0 {
        return Ok(Vec::new());
    }
    if texts.is_null() {
        return Err(GrpcErrorCode::InvalidArgument);
    }
    let texts = unsafe { std::slice::from_raw_parts(texts, len) };
    texts
        .iter()
        .map(|text| unsafe { read_str(*text) }.ok_or(GrpcErrorCode::InvalidArgument))
        .collect()
}

fn into_raw_array(values: Vec<StackValue>) -> (*mut *mut StackValueHandle, usize) {
    if values.is_empty() {
        return (ptr::null_mut(), 0);
    }
    let handles: Box<[*mut StackValueHandle]> =
        values.into_iter().map(StackValueHandle::into_raw).collect();
    let len = handles.len();
    (Box::into_raw(handles) as *mut *mut StackValueHandle, len)
}

// =============================================================================
// StackValue API
// =============================================================================

#[unsafe(no_mangle)]
pub extern "C" fn stack_value_create_null() -> *mut StackValueHandle {
    StackValueHandle::into_raw(StackValue::Null)
}

#[unsafe(no_mangle)]
pub extern "C" fn stack_value_create_int(value: i64) -> *mut StackValueHandle {
    StackValueHandle::into_raw(StackValue::Int(value))
}

/// Create a string value. A null pointer creates an empty string; invalid
/// UTF-8 is replaced.
///
/// # Safety
/// `value` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_create_string(value: *const c_char) -> *mut StackValueHandle {
    let text = if value.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(value) }
            .to_string_lossy()
            .into_owned()
    };
    StackValueHandle::into_raw(StackValue::String(text))
}

#[unsafe(no_mangle)]
pub extern "C" fn stack_value_create_bool(value: bool) -> *mut StackValueHandle {
    StackValueHandle::into_raw(StackValue::Bool(value))
}

#[unsafe(no_mangle)]
pub extern "C" fn stack_value_create_float(value: f64) -> *mut StackValueHandle {
    StackValueHandle::into_raw(StackValue::Float(value))
}

/// Create an array holding deep copies of `items`.
///
/// The caller keeps ownership of `items` and must still destroy them.
///
/// # Safety
/// `items` must point to `len` handle pointers (each null or valid), or be
/// null when `len` is zero.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_create_array(
    items: *const *const StackValueHandle,
    len: usize,
) -> *mut StackValueHandle {
    let items = unsafe { copy_values(items, len) }.unwrap_or_default();
    StackValueHandle::into_raw(StackValue::Array(items))
}

/// Create a record from parallel key and value arrays. Values are deep
/// copied; a later duplicate key replaces an earlier one. Returns null if any
/// key is null or not UTF-8.
///
/// # Safety
/// `keys` and `values` must each point to `len` entries, or be null when
/// `len` is zero.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_create_record(
    keys: *const *const c_char,
    values: *const *const StackValueHandle,
    len: usize,
) -> *mut StackValueHandle {
    let (Ok(keys), Ok(values)) = (unsafe { read_strs(keys, len) }, unsafe {
        copy_values(values, len)
    }) else {
        return ptr::null_mut();
    };
    let fields: BTreeMap<String, StackValue> = keys
        .into_iter()
        .map(str::to_string)
        .zip(values)
        .collect();
    StackValueHandle::into_raw(StackValue::Record(fields))
}

#[unsafe(no_mangle)]
pub extern "C" fn stack_value_create_instant(seconds: i64, nanos: i32) -> *mut StackValueHandle {
    StackValueHandle::into_raw(StackValue::Instant(Instant::new(seconds, nanos)))
}

#[unsafe(no_mangle)]
pub extern "C" fn stack_value_create_plain_date(
    year: i32,
    month: u32,
    day: u32,
) -> *mut StackValueHandle {
    StackValueHandle::into_raw(StackValue::PlainDate(PlainDate::new(year, month, day)))
}

/// # Safety
/// `timezone` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_create_zoned_datetime(
    seconds: i64,
    nanos: i32,
    timezone: *const c_char,
) -> *mut StackValueHandle {
    let timezone = if timezone.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(timezone) }
            .to_string_lossy()
            .into_owned()
    };
    StackValueHandle::into_raw(StackValue::ZonedDateTime(ZonedDateTime::new(
        Instant::new(seconds, nanos),
        timezone,
    )))
}

/// Type tag of `value`. A null handle reports `Null`.
///
/// # Safety
/// `value` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_get_type(value: *const StackValueHandle) -> StackValueType {
    unsafe { read_value(value) }
        .map(StackValue::value_type)
        .unwrap_or(StackValueType::Null)
}

/// # Safety
/// `value` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_get_int(value: *const StackValueHandle) -> i64 {
    unsafe { read_value(value) }
        .map(StackValue::int_value)
        .unwrap_or_default()
}

/// Borrowed string payload; `""` for other variants. Valid until `value` is
/// destroyed.
///
/// # Safety
/// `value` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_get_string(value: *const StackValueHandle) -> *const c_char {
    match unsafe { value.as_ref() } {
        Some(handle) if matches!(handle.value, StackValue::String(_)) => handle.c_text(),
        _ => EMPTY.as_ptr(),
    }
}

/// # Safety
/// `value` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_get_bool(value: *const StackValueHandle) -> bool {
    unsafe { read_value(value) }
        .map(StackValue::bool_value)
        .unwrap_or_default()
}

/// # Safety
/// `value` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_get_float(value: *const StackValueHandle) -> f64 {
    unsafe { read_value(value) }
        .map(StackValue::float_value)
        .unwrap_or_default()
}

/// Copy out the items of an array value.
///
/// Writes a freshly allocated array of owned handles and its length; release
/// both with `stack_value_array_destroy`. Non-array and empty values produce
/// `(NULL, 0)`.
///
/// # Safety
/// `value` must be null or a live handle; `out_items` and `out_len` must be
/// null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_get_array(
    value: *const StackValueHandle,
    out_items: *mut *mut *mut StackValueHandle,
    out_len: *mut usize,
) {
    if out_items.is_null() || out_len.is_null() {
        return;
    }
    let items = unsafe { read_value(value) }
        .map(|value| value.array_items().to_vec())
        .unwrap_or_default();
    let (items, len) = into_raw_array(items);
    unsafe {
        *out_items = items;
        *out_len = len;
    }
}

/// Copy out the fields of a record value, ordered by key.
///
/// Keys are released with `stack_value_record_keys_destroy`, values with
/// `stack_value_array_destroy`, both using the same length. Non-record and
/// empty values produce `(NULL, NULL, 0)`.
///
/// # Safety
/// `value` must be null or a live handle; the output pointers must be null or
/// valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_get_record(
    value: *const StackValueHandle,
    out_keys: *mut *mut *mut c_char,
    out_values: *mut *mut *mut StackValueHandle,
    out_len: *mut usize,
) {
    if out_keys.is_null() || out_values.is_null() || out_len.is_null() {
        return;
    }
    let fields = unsafe { read_value(value) }
        .and_then(StackValue::record_fields)
        .cloned()
        .unwrap_or_default();
    let (keys, values): (Vec<String>, Vec<StackValue>) = fields.into_iter().unzip();
    let (values, len) = into_raw_array(values);
    let keys = if keys.is_empty() {
        ptr::null_mut()
    } else {
        let keys: Box<[*mut c_char]> = keys
            .iter()
            .map(|key| c_string_lossy(key).into_raw())
            .collect();
        Box::into_raw(keys) as *mut *mut c_char
    };
    unsafe {
        *out_keys = keys;
        *out_values = values;
        *out_len = len;
    }
}

/// # Safety
/// `keys` and `len` must come from the same `stack_value_get_record` call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_record_keys_destroy(keys: *mut *mut c_char, len: usize) {
    if keys.is_null() {
        return;
    }
    let keys = unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(keys, len)) };
    for key in keys.iter() {
        if !key.is_null() {
            drop(unsafe { CString::from_raw(*key) });
        }
    }
}

/// Writes `(0, 0)` unless `value` is an instant.
///
/// # Safety
/// `value` must be null or a live handle; the output pointers must be null or
/// valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_get_instant(
    value: *const StackValueHandle,
    out_seconds: *mut i64,
    out_nanos: *mut i32,
) {
    if out_seconds.is_null() || out_nanos.is_null() {
        return;
    }
    let instant = unsafe { read_value(value) }
        .map(StackValue::instant_value)
        .unwrap_or_default();
    unsafe {
        *out_seconds = instant.seconds;
        *out_nanos = instant.nanos;
    }
}

/// # Safety
/// `value` must be null or a live handle; the output pointers must be null or
/// valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_get_plain_date(
    value: *const StackValueHandle,
    out_year: *mut i32,
    out_month: *mut u32,
    out_day: *mut u32,
) {
    if out_year.is_null() || out_month.is_null() || out_day.is_null() {
        return;
    }
    let date = unsafe { read_value(value) }
        .map(StackValue::plain_date_value)
        .unwrap_or_default();
    unsafe {
        *out_year = date.year;
        *out_month = date.month;
        *out_day = date.day;
    }
}

/// Writes the instant of a zoned date-time and returns its borrowed zone
/// name. Other variants produce `(0, 0)` and `""`.
///
/// # Safety
/// `value` must be null or a live handle; the output pointers must be null or
/// valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_get_zoned_datetime(
    value: *const StackValueHandle,
    out_seconds: *mut i64,
    out_nanos: *mut i32,
) -> *const c_char {
    let handle = unsafe { value.as_ref() };
    let zoned = handle.and_then(|handle| handle.value.zoned_datetime_value());
    let instant = zoned.map(|zoned| zoned.instant).unwrap_or_default();
    if !out_seconds.is_null() && !out_nanos.is_null() {
        unsafe {
            *out_seconds = instant.seconds;
            *out_nanos = instant.nanos;
        }
    }
    match (handle, zoned) {
        (Some(handle), Some(_)) => handle.c_text(),
        _ => EMPTY.as_ptr(),
    }
}

/// Release a value and everything nested in it. Null is a no-op.
///
/// # Safety
/// `value` must be null or a handle that has not been destroyed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_destroy(value: *mut StackValueHandle) {
    if !value.is_null() {
        drop(unsafe { Box::from_raw(value) });
    }
}

/// Release an array returned by `stack_value_get_array` or a call's result
/// stack, including every element.
///
/// # Safety
/// `array` and `len` must come from the same call, and neither the array nor
/// its elements may have been destroyed already.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_value_array_destroy(array: *mut *mut StackValueHandle, len: usize) {
    if array.is_null() {
        return;
    }
    let handles = unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(array, len)) };
    for handle in handles.iter() {
        unsafe { stack_value_destroy(*handle) };
    }
}

// =============================================================================
// Client API
// =============================================================================

struct CallOutputs {
    result_stack: *mut *mut *mut StackValueHandle,
    result_len: *mut usize,
    error: *mut *mut ErrorInfoHandle,
}

impl CallOutputs {
    /// Reset every output slot, or `None` if one is missing.
    unsafe fn init(
        result_stack: *mut *mut *mut StackValueHandle,
        result_len: *mut usize,
        error: *mut *mut ErrorInfoHandle,
    ) -> Option<Self> {
        if result_stack.is_null() || result_len.is_null() || error.is_null() {
            return None;
        }
        unsafe {
            *result_stack = ptr::null_mut();
            *result_len = 0;
            *error = ptr::null_mut();
        }
        Some(Self {
            result_stack,
            result_len,
            error,
        })
    }

    unsafe fn write(self, outcome: ExecutionOutcome) {
        match outcome {
            ExecutionOutcome::Stack(stack) => {
                let (items, len) = into_raw_array(stack);
                unsafe {
                    *self.result_stack = items;
                    *self.result_len = len;
                }
            }
            ExecutionOutcome::Error(info) => unsafe {
                *self.error = ErrorInfoHandle::into_raw(&info);
            },
        }
    }
}

/// Create a client for `address` (`host:port` or `http://host:port`).
///
/// The channel connects lazily, so an unreachable server is reported by the
/// first call, not here. On failure `*out_client` is set to null.
///
/// # Safety
/// `address` must be null or a valid NUL-terminated string; `out_client` must
/// be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn grpc_client_create(
    address: *const c_char,
    out_client: *mut *mut GrpcClient,
) -> GrpcErrorCode {
    if out_client.is_null() {
        return GrpcErrorCode::InvalidArgument;
    }
    unsafe { *out_client = ptr::null_mut() };
    let Some(address) = (unsafe { read_str(address) }) else {
        return GrpcErrorCode::InvalidArgument;
    };
    match BlockingRuntimeClient::connect_lazy(&ClientConfig::new(address)) {
        Ok(client) => {
            unsafe { *out_client = Box::into_raw(Box::new(GrpcClient { client })) };
            GrpcErrorCode::Ok
        }
        Err(err) => err.code(),
    }
}

/// Execute one word.
///
/// On `GRPC_OK` exactly one of the outputs is populated: the result stack
/// (possibly empty) or `*out_error`. Any other code leaves every output
/// null/zero.
///
/// # Safety
/// `client` must be a live client; `word_name` a valid NUL-terminated string;
/// `stack` must point to `stack_len` handle pointers; the output pointers
/// must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn grpc_client_execute_word(
    client: *mut GrpcClient,
    word_name: *const c_char,
    stack: *const *const StackValueHandle,
    stack_len: usize,
    out_result_stack: *mut *mut *mut StackValueHandle,
    out_result_len: *mut usize,
    out_error: *mut *mut ErrorInfoHandle,
) -> GrpcErrorCode {
    let Some(outputs) = (unsafe { CallOutputs::init(out_result_stack, out_result_len, out_error) })
    else {
        return GrpcErrorCode::InvalidArgument;
    };
    let (Some(client), Some(word_name)) = (unsafe { client.as_ref() }, unsafe {
        read_str(word_name)
    }) else {
        return GrpcErrorCode::InvalidArgument;
    };
    let stack = match unsafe { copy_values(stack, stack_len) } {
        Ok(stack) => stack,
        Err(code) => return code,
    };
    match client.client.execute_word(word_name, &stack) {
        Ok(outcome) => {
            unsafe { outputs.write(outcome) };
            GrpcErrorCode::Ok
        }
        Err(err) => err.code(),
    }
}

/// Execute several words in one round trip. Same output contract as
/// `grpc_client_execute_word`.
///
/// # Safety
/// As for `grpc_client_execute_word`; `word_names` must point to
/// `word_names_len` valid NUL-terminated strings.
#[allow(clippy::too_many_arguments)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn grpc_client_execute_sequence(
    client: *mut GrpcClient,
    word_names: *const *const c_char,
    word_names_len: usize,
    stack: *const *const StackValueHandle,
    stack_len: usize,
    out_result_stack: *mut *mut *mut StackValueHandle,
    out_result_len: *mut usize,
    out_error: *mut *mut ErrorInfoHandle,
) -> GrpcErrorCode {
    let Some(outputs) = (unsafe { CallOutputs::init(out_result_stack, out_result_len, out_error) })
    else {
        return GrpcErrorCode::InvalidArgument;
    };
    let Some(client) = (unsafe { client.as_ref() }) else {
        return GrpcErrorCode::InvalidArgument;
    };
    let word_names = match unsafe { read_strs(word_names, word_names_len) } {
        Ok(word_names) => word_names,
        Err(code) => return code,
    };
    let stack = match unsafe { copy_values(stack, stack_len) } {
        Ok(stack) => stack,
        Err(code) => return code,
    };
    match client.client.execute_sequence(&word_names, &stack) {
        Ok(outcome) => {
            unsafe { outputs.write(outcome) };
            GrpcErrorCode::Ok
        }
        Err(err) => err.code(),
    }
}

/// Release a client. Must not be called while a call on it is in flight.
///
/// # Safety
/// `client` must be null or a client that has not been destroyed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn grpc_client_destroy(client: *mut GrpcClient) {
    if !client.is_null() {
        drop(unsafe { Box::from_raw(client) });
    }
}

// =============================================================================
// ErrorInfo API
// =============================================================================

/// # Safety
/// `error` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn error_info_get_message(error: *const ErrorInfoHandle) -> *const c_char {
    unsafe { error.as_ref() }
        .map(|error| error.message.as_ptr())
        .unwrap_or(EMPTY.as_ptr())
}

/// # Safety
/// `error` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn error_info_get_runtime(error: *const ErrorInfoHandle) -> *const c_char {
    unsafe { error.as_ref() }
        .map(|error| error.runtime.as_ptr())
        .unwrap_or(EMPTY.as_ptr())
}

/// # Safety
/// `error` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn error_info_get_error_type(
    error: *const ErrorInfoHandle,
) -> *const c_char {
    unsafe { error.as_ref() }
        .map(|error| error.error_type.as_ptr())
        .unwrap_or(EMPTY.as_ptr())
}

/// # Safety
/// `error` must be null or a handle that has not been destroyed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn error_info_destroy(error: *mut ErrorInfoHandle) {
    if !error.is_null() {
        drop(unsafe { Box::from_raw(error) });
    }
}

// =============================================================================
// Server API
// =============================================================================
//
// Serving requires an interpreter, which C callers cannot hand over yet. Rust
// embedders use `server::RuntimeService` instead.

/// # Safety
/// `out_server` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn forthic_grpc_server_create(
    _port: u16,
    out_server: *mut *mut GrpcServer,
) -> GrpcErrorCode {
    if out_server.is_null() {
        return GrpcErrorCode::InvalidArgument;
    }
    unsafe { *out_server = ptr::null_mut() };
    GrpcErrorCode::Unimplemented
}

#[unsafe(no_mangle)]
pub extern "C" fn forthic_grpc_server_start(_server: *mut GrpcServer) -> GrpcErrorCode {
    GrpcErrorCode::Unimplemented
}

#[unsafe(no_mangle)]
pub extern "C" fn forthic_grpc_server_stop(_server: *mut GrpcServer) -> GrpcErrorCode {
    GrpcErrorCode::Unimplemented
}

/// # Safety
/// `server` must be null or a server that has not been destroyed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn forthic_grpc_server_destroy(server: *mut GrpcServer) {
    if !server.is_null() {
        drop(unsafe { Box::from_raw(server) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(ptr: *const c_char) -> String {
        unsafe { CStr::from_ptr(ptr) }.to_str().expect("utf8").to_string()
    }

    #[test]
    fn scalar_values_round_trip_through_handles() {
        unsafe {
            let int = stack_value_create_int(42);
            let string = stack_value_create_string(c"hello".as_ptr());
            let boolean = stack_value_create_bool(true);
            let float = stack_value_create_float(2.5);
            let null = stack_value_create_null();

            assert_eq!(stack_value_get_type(int), StackValueType::Int);
            assert_eq!(stack_value_get_int(int), 42);
            assert_eq!(text(stack_value_get_string(string)), "hello");
            assert!(stack_value_get_bool(boolean));
            assert_eq!(stack_value_get_float(float), 2.5);
            assert_eq!(stack_value_get_type(null), StackValueType::Null);

            for value in [int, string, boolean, float, null] {
                stack_value_destroy(value);
            }
        }
    }

    #[test]
    fn mismatched_accessors_return_defaults() {
        unsafe {
            let string = stack_value_create_string(c"x".as_ptr());
            let null = stack_value_create_null();
            assert_eq!(stack_value_get_int(string), 0);
            assert!(!stack_value_get_bool(null));
            assert_eq!(stack_value_get_float(string), 0.0);
            assert_eq!(text(stack_value_get_string(null)), "");

            let mut items = ptr::null_mut();
            let mut len = 7usize;
            stack_value_get_array(string, &mut items, &mut len);
            assert!(items.is_null());
            assert_eq!(len, 0);

            stack_value_destroy(string);
            stack_value_destroy(null);
        }
    }

    #[test]
    fn null_handles_read_as_null_defaults() {
        unsafe {
            assert_eq!(stack_value_get_type(ptr::null()), StackValueType::Null);
            assert_eq!(stack_value_get_int(ptr::null()), 0);
            assert_eq!(text(stack_value_get_string(ptr::null())), "");
            assert_eq!(text(error_info_get_message(ptr::null())), "");
            stack_value_destroy(ptr::null_mut());
            stack_value_array_destroy(ptr::null_mut(), 0);
            error_info_destroy(ptr::null_mut());
            grpc_client_destroy(ptr::null_mut());
        }
    }

    #[test]
    fn interior_nul_truncates_c_view() {
        let handle = StackValueHandle::into_raw(StackValue::from("ab\0cd"));
        unsafe {
            assert_eq!(text(stack_value_get_string(handle)), "ab");
            stack_value_destroy(handle);
        }
    }

    #[test]
    fn array_copies_survive_release_of_originals() {
        unsafe {
            let a = stack_value_create_int(1);
            let b = stack_value_create_string(c"two".as_ptr());
            let items = [a as *const StackValueHandle, b as *const StackValueHandle];
            let array = stack_value_create_array(items.as_ptr(), items.len());
            stack_value_destroy(a);
            stack_value_destroy(b);

            assert_eq!(stack_value_get_type(array), StackValueType::Array);
            let mut out = ptr::null_mut();
            let mut len = 0usize;
            stack_value_get_array(array, &mut out, &mut len);
            assert_eq!(len, 2);
            let copies = std::slice::from_raw_parts(out, len);
            assert_eq!(stack_value_get_int(copies[0]), 1);
            assert_eq!(text(stack_value_get_string(copies[1])), "two");

            // Copies are independent of the parent.
            stack_value_destroy(array);
            assert_eq!(stack_value_get_int(copies[0]), 1);
            stack_value_array_destroy(out, len);
        }
    }

    #[test]
    fn nested_arrays_are_deep_copied() {
        unsafe {
            let inner_item = stack_value_create_int(7);
            let inner = stack_value_create_array(
                [inner_item as *const StackValueHandle].as_ptr(),
                1,
            );
            let outer = stack_value_create_array([inner as *const StackValueHandle].as_ptr(), 1);
            stack_value_destroy(inner_item);
            stack_value_destroy(inner);

            let expected = StackValue::Array(vec![StackValue::Array(vec![StackValue::Int(7)])]);
            assert_eq!(read_value(outer), Some(&expected));
            stack_value_destroy(outer);
        }
    }

    #[test]
    fn record_and_temporal_values_through_handles() {
        unsafe {
            let one = stack_value_create_int(1);
            let name = stack_value_create_string(c"ada".as_ptr());
            let keys = [c"n".as_ptr(), c"name".as_ptr()];
            let values = [one as *const StackValueHandle, name as *const StackValueHandle];
            let record = stack_value_create_record(keys.as_ptr(), values.as_ptr(), 2);
            stack_value_destroy(one);
            stack_value_destroy(name);
            assert_eq!(stack_value_get_type(record), StackValueType::Record);

            let mut out_keys = ptr::null_mut();
            let mut out_values = ptr::null_mut();
            let mut len = 0usize;
            stack_value_get_record(record, &mut out_keys, &mut out_values, &mut len);
            assert_eq!(len, 2);
            let keys = std::slice::from_raw_parts(out_keys, len);
            let values = std::slice::from_raw_parts(out_values, len);
            assert_eq!(text(keys[0]), "n");
            assert_eq!(stack_value_get_int(values[0]), 1);
            assert_eq!(text(keys[1]), "name");
            assert_eq!(text(stack_value_get_string(values[1])), "ada");
            stack_value_record_keys_destroy(out_keys, len);
            stack_value_array_destroy(out_values, len);
            stack_value_destroy(record);

            let zoned = stack_value_create_zoned_datetime(100, 5, c"Europe/Paris".as_ptr());
            let (mut seconds, mut nanos) = (0i64, 0i32);
            let zone = stack_value_get_zoned_datetime(zoned, &mut seconds, &mut nanos);
            assert_eq!((seconds, nanos), (100, 5));
            assert_eq!(text(zone), "Europe/Paris");
            stack_value_get_instant(zoned, &mut seconds, &mut nanos);
            assert_eq!((seconds, nanos), (0, 0));
            stack_value_destroy(zoned);

            let date = stack_value_create_plain_date(2024, 12, 31);
            let (mut year, mut month, mut day) = (0i32, 0u32, 0u32);
            stack_value_get_plain_date(date, &mut year, &mut month, &mut day);
            assert_eq!((year, month, day), (2024, 12, 31));
            assert_eq!(stack_value_get_type(date), StackValueType::PlainDate);
            stack_value_destroy(date);
        }
    }

    #[test]
    fn record_with_null_key_is_rejected() {
        unsafe {
            let value = stack_value_create_null();
            let keys = [ptr::null::<c_char>()];
            let values = [value as *const StackValueHandle];
            let record = stack_value_create_record(keys.as_ptr(), values.as_ptr(), 1);
            assert!(record.is_null());
            stack_value_destroy(value);
        }
    }

    #[test]
    fn client_create_rejects_empty_address() {
        unsafe {
            let mut client = ptr::null_mut();
            let code = grpc_client_create(c"".as_ptr(), &mut client);
            assert_eq!(code, GrpcErrorCode::InvalidArgument);
            assert!(client.is_null());

            let code = grpc_client_create(ptr::null(), &mut client);
            assert_eq!(code, GrpcErrorCode::InvalidArgument);
            assert!(client.is_null());

            let code = grpc_client_create(c"localhost:50051".as_ptr(), ptr::null_mut());
            assert_eq!(code, GrpcErrorCode::InvalidArgument);
        }
    }

    #[test]
    fn execute_requires_every_output_slot() {
        unsafe {
            let mut client = ptr::null_mut();
            assert_eq!(
                grpc_client_create(c"127.0.0.1:1".as_ptr(), &mut client),
                GrpcErrorCode::Ok
            );
            let mut stack = ptr::null_mut();
            let mut len = 0usize;
            let code = grpc_client_execute_word(
                client,
                c"DUP".as_ptr(),
                ptr::null(),
                0,
                &mut stack,
                &mut len,
                ptr::null_mut(),
            );
            assert_eq!(code, GrpcErrorCode::InvalidArgument);

            let mut error = ptr::null_mut();
            let code = grpc_client_execute_word(
                client,
                ptr::null(),
                ptr::null(),
                0,
                &mut stack,
                &mut len,
                &mut error,
            );
            assert_eq!(code, GrpcErrorCode::InvalidArgument);

            let code = grpc_client_execute_word(
                client,
                c"DUP".as_ptr(),
                ptr::null(),
                3,
                &mut stack,
                &mut len,
                &mut error,
            );
            assert_eq!(code, GrpcErrorCode::InvalidArgument);
            assert!(stack.is_null());
            assert!(error.is_null());
            grpc_client_destroy(client);
        }
    }

    #[test]
    fn server_entry_points_are_unimplemented() {
        unsafe {
            let mut server = ptr::null_mut();
            assert_eq!(
                forthic_grpc_server_create(50051, &mut server),
                GrpcErrorCode::Unimplemented
            );
            assert!(server.is_null());
            assert_eq!(
                forthic_grpc_server_start(server),
                GrpcErrorCode::Unimplemented
            );
            assert_eq!(forthic_grpc_server_stop(server), GrpcErrorCode::Unimplemented);
            forthic_grpc_server_destroy(server);
        }
    }
}
