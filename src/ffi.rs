//! C ABI exports.
//!
//! Every buffer returned from here is owned by the caller and must be
//! released with the matching `tee_secure_free*` function; releasing it with
//! the host's `free` is undefined behavior. Failures are reported as a null
//! return.

use std::ffi::c_char;
use std::ffi::CStr;
use std::ffi::CString;
use std::ptr;
use std::slice;
use std::sync::Once;

use log::error;
use log::warn;

use crate::reverser::reverse;
use crate::reverser::reverse_with_headroom;

static LOGGER: Once = Once::new();

// A host that installed its own logger keeps it.
fn init_logging()
{
    LOGGER.call_once(|| {
        let _ = env_logger::try_init();
    });
}

/// Reverses a NUL-terminated string.
///
/// The payload is every byte before the first NUL. The result is a new
/// NUL-terminated string of the same payload length.
///
/// # Returns
/// An owned pointer to release with [`tee_secure_free`], or null if `input`
/// is null or the result could not be allocated.
///
/// # Safety
/// `input` must be null or point to a readable NUL-terminated string that is
/// not mutated during the call.
#[no_mangle]
pub unsafe extern "C" fn tee_secure_process(input: *const c_char) -> *mut c_char
{
    init_logging();

    if input.is_null()
    {
        warn!("tee_secure_process: input is null");
        return ptr::null_mut();
    }

    let payload = CStr::from_ptr(input).to_bytes();

    let mut buffer = match reverse_with_headroom(payload, 1)
    {
        Ok(buffer) => buffer,
        Err(e) =>
        {
            error!("tee_secure_process: {}", e);
            return ptr::null_mut();
        },
    };
    buffer.push(0);
    debug_assert_eq!(buffer.capacity(), buffer.len());

    match CString::from_vec_with_nul(buffer)
    {
        Ok(reversed) => reversed.into_raw(),
        Err(e) =>
        {
            error!("tee_secure_process: {}", e);
            ptr::null_mut()
        },
    }
}

/// Reverses `len` bytes starting at `input`. Embedded NUL bytes are payload.
///
/// # Arguments
/// * `input` - Start of the input bytes (may be null only when `len` is 0)
/// * `len` - Number of input bytes
/// * `out_len` - Receives the length of the returned buffer
///
/// # Returns
/// An owned pointer to release with [`tee_secure_free_bytes`], or null on
/// failure. Zero-length input yields a non-null, zero-length buffer.
///
/// # Safety
/// `input` must be valid for reads of `len` bytes and `out_len` must be
/// valid for a `usize` write.
#[no_mangle]
pub unsafe extern "C" fn tee_secure_process_bytes(input: *const u8, len: usize, out_len: *mut usize) -> *mut u8
{
    init_logging();

    if out_len.is_null()
    {
        warn!("tee_secure_process_bytes: out_len is null");
        return ptr::null_mut();
    }

    let payload: &[u8] = if len == 0
    {
        &[]
    }
    else if input.is_null()
    {
        warn!("tee_secure_process_bytes: input is null with len={}", len);
        return ptr::null_mut();
    }
    else
    {
        slice::from_raw_parts(input, len)
    };

    match reverse(payload)
    {
        Ok(buffer) =>
        {
            // Exact reservation: into_boxed_slice must not reallocate
            debug_assert_eq!(buffer.capacity(), buffer.len());
            let reversed = buffer.into_boxed_slice();
            *out_len = reversed.len();
            Box::into_raw(reversed) as *mut u8
        },
        Err(e) =>
        {
            error!("tee_secure_process_bytes: {}", e);
            ptr::null_mut()
        },
    }
}

/// Releases a string returned by [`tee_secure_process`]. Null is ignored.
///
/// # Safety
/// `ptr` must be null or a pointer obtained from [`tee_secure_process`] that
/// has not been released yet.
#[no_mangle]
pub unsafe extern "C" fn tee_secure_free(ptr: *mut c_char)
{
    if ptr.is_null()
    {
        return;
    }
    drop(CString::from_raw(ptr));
}

/// Releases a buffer returned by [`tee_secure_process_bytes`]. Null is ignored.
///
/// # Safety
/// `ptr` must be null or a pointer obtained from [`tee_secure_process_bytes`]
/// that has not been released yet, and `len` must be the length reported for
/// it.
#[no_mangle]
pub unsafe extern "C" fn tee_secure_free_bytes(ptr: *mut u8, len: usize)
{
    if ptr.is_null()
    {
        return;
    }
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)));
}
