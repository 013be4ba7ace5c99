use crate::Core::Packet;
use crate::Queue::{QueueHandle, QueueManager};
use libc::{c_char, c_int};
use std::ffi::{CStr, CString};
use std::sync::Arc;
use tracing::error;

// Error codes
pub const CCQ_SUCCESS: c_int = 0;
pub const CCQ_ERROR_NULL_POINTER: c_int = -1;
pub const CCQ_ERROR_INVALID_ARG: c_int = -2;
pub const CCQ_ERROR_INVALID_QUEUE: c_int = -3;
pub const CCQ_ERROR_QUEUE_DISABLED: c_int = -4;
pub const CCQ_ERROR_EMPTY: c_int = -5;
pub const CCQ_ERROR_MALFORMED_JSON: c_int = -6;
pub const CCQ_ERROR_INTERNAL: c_int = -7;

/// Handle to a queue pool (opaque pointer)
pub struct ManagerHandle {
    inner: Arc<QueueManager>,
}

/// Resolve `qid` to a bound queue handle, or the error code to return.
fn lookup(handle: *mut ManagerHandle, qid: c_int) -> Result<QueueHandle, c_int> {
    if handle.is_null() {
        return Err(CCQ_ERROR_NULL_POINTER);
    }
    if qid < 0 {
        return Err(CCQ_ERROR_INVALID_ARG);
    }
    let manager = unsafe { &(*handle).inner };
    let queue = manager.acquire(Some(qid as usize));
    if queue.is_bound() {
        Ok(queue)
    } else {
        Err(CCQ_ERROR_INVALID_QUEUE)
    }
}

/// Borrow a C string as UTF-8.
fn borrow_str<'a>(s: *const c_char) -> Result<&'a str, c_int> {
    if s.is_null() {
        return Err(CCQ_ERROR_NULL_POINTER);
    }
    unsafe { CStr::from_ptr(s) }
        .to_str()
        .map_err(|_| CCQ_ERROR_INVALID_ARG)
}

// -----------------------------------------------------------------------------
// Pool API
// -----------------------------------------------------------------------------

/// Create a new, empty queue pool.
///
/// # Returns
/// * Pointer to `ManagerHandle`. Free it with `ccq_manager_free`.
#[no_mangle]
pub extern "C" fn ccq_manager_new() -> *mut ManagerHandle {
    let handle = Box::new(ManagerHandle {
        inner: Arc::new(QueueManager::new()),
    });
    Box::into_raw(handle)
}

/// Free a pool handle.
#[no_mangle]
pub extern "C" fn ccq_manager_free(handle: *mut ManagerHandle) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle); // Dropped automatically
        }
    }
}

/// Get a queue from the pool.
///
/// # Arguments
/// * `handle` - Pointer to `ManagerHandle`.
/// * `qid` - Negative to recycle or allocate a queue, otherwise an existing queue id.
///
/// # Returns
/// * The queue id (>= 0), negative error code otherwise.
#[no_mangle]
pub extern "C" fn ccq_acquire(handle: *mut ManagerHandle, qid: c_int) -> c_int {
    if handle.is_null() {
        return CCQ_ERROR_NULL_POINTER;
    }
    if qid >= 0 {
        return match lookup(handle, qid) {
            Ok(_) => qid,
            Err(code) => code,
        };
    }

    let manager = unsafe { &(*handle).inner };
    match manager.acquire(None).id().map(c_int::try_from) {
        Some(Ok(id)) => id,
        _ => {
            error!("FFI Error: queue id does not fit in a C int");
            CCQ_ERROR_INTERNAL
        }
    }
}

/// Hand a queue back to the pool. Pending packets are dropped.
#[no_mangle]
pub extern "C" fn ccq_release(handle: *mut ManagerHandle, qid: c_int) -> c_int {
    let queue = match lookup(handle, qid) {
        Ok(queue) => queue,
        Err(code) => return code,
    };
    let manager = unsafe { &(*handle).inner };
    if manager.release(&queue) {
        CCQ_SUCCESS
    } else {
        CCQ_ERROR_INVALID_QUEUE
    }
}

// -----------------------------------------------------------------------------
// Queue API
// -----------------------------------------------------------------------------

/// Push a JSON message.
///
/// # Arguments
/// * `handle` - Pointer to `ManagerHandle`.
/// * `qid` - Target queue id.
/// * `sender` - NUL-terminated sender name.
/// * `json` - NUL-terminated JSON text. Checked before it is queued.
///
/// # Returns
/// * 0 on success, negative error code otherwise.
#[no_mangle]
pub extern "C" fn ccq_push_json(
    handle: *mut ManagerHandle,
    qid: c_int,
    sender: *const c_char,
    json: *const c_char,
) -> c_int {
    let queue = match lookup(handle, qid) {
        Ok(queue) => queue,
        Err(code) => return code,
    };
    let (sender, json) = match (borrow_str(sender), borrow_str(json)) {
        (Ok(sender), Ok(json)) => (sender, json),
        (Err(code), _) | (_, Err(code)) => return code,
    };

    let value = match serde_json::from_str::<serde_json::Value>(json) {
        Ok(value) => value,
        Err(e) => {
            error!("FFI Error: rejected malformed JSON from '{}': {}", sender, e);
            return CCQ_ERROR_MALFORMED_JSON;
        }
    };

    if queue.push(Packet::from_structured(sender, value)) {
        CCQ_SUCCESS
    } else {
        CCQ_ERROR_QUEUE_DISABLED
    }
}

/// Wait for a message.
///
/// # Arguments
/// * `timeout_ms` - Maximum wait; zero or negative waits until a message
///   arrives or the queue is released.
///
/// # Returns
/// * 1 if a message is ready, 0 on timeout or release, negative error code otherwise.
#[no_mangle]
pub extern "C" fn ccq_wait(handle: *mut ManagerHandle, qid: c_int, timeout_ms: i64) -> c_int {
    match lookup(handle, qid) {
        Ok(queue) => c_int::from(queue.wait_ms(timeout_ms)),
        Err(code) => code,
    }
}

/// Pop the oldest message.
///
/// # Arguments
/// * `out_sender` - Receives a newly allocated sender string (may be NULL to skip).
/// * `out_json` - Receives a newly allocated JSON string.
///
/// Strings returned here must be freed with `ccq_string_free`.
///
/// # Returns
/// * 0 on success.
/// * CCQ_ERROR_EMPTY if nothing is queued.
/// * CCQ_ERROR_INTERNAL if the head packet holds a NUL byte; it stays queued.
#[no_mangle]
pub extern "C" fn ccq_pop_json(
    handle: *mut ManagerHandle,
    qid: c_int,
    out_sender: *mut *mut c_char,
    out_json: *mut *mut c_char,
) -> c_int {
    if out_json.is_null() {
        return CCQ_ERROR_NULL_POINTER;
    }
    let queue = match lookup(handle, qid) {
        Ok(queue) => queue,
        Err(code) => return code,
    };
    // Pop only once both strings exist, so an unrepresentable packet stays queued.
    let popped = queue.pop_with(|packet| {
        let json = packet
            .get_serialized()
            .and_then(|text| CString::new(text).ok());
        let sender = CString::new(packet.sender()).ok();
        match (json, sender) {
            (Some(json), Some(sender)) => Ok((json, sender)),
            _ => Err(()),
        }
    });
    let (json, sender) = match popped {
        None => return CCQ_ERROR_EMPTY,
        Some(Ok(strings)) => strings,
        Some(Err(())) => {
            error!("FFI Error: head packet cannot be represented as C strings; left queued");
            return CCQ_ERROR_INTERNAL;
        }
    };

    unsafe {
        *out_json = json.into_raw();
        if !out_sender.is_null() {
            *out_sender = sender.into_raw();
        }
    }
    CCQ_SUCCESS
}

/// Free a string returned by `ccq_pop_json`.
#[no_mangle]
pub extern "C" fn ccq_string_free(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            let _ = CString::from_raw(s);
        }
    }
}

/// # Returns
/// * 1 if the queue is empty, 0 if not, negative error code otherwise.
#[no_mangle]
pub extern "C" fn ccq_is_empty(handle: *mut ManagerHandle, qid: c_int) -> c_int {
    match lookup(handle, qid) {
        Ok(queue) => c_int::from(queue.is_empty()),
        Err(code) => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn pop_keeps_packets_that_cannot_cross_as_c_strings() {
        let manager = Arc::new(QueueManager::new());
        let queue = manager.acquire(None);
        let mgr = Box::into_raw(Box::new(ManagerHandle {
            inner: Arc::clone(&manager),
        }));

        queue.push(Packet::from_serialized("bad\0sender", "[1]"));
        queue.push(Packet::from_serialized("ok", "[2]"));

        let mut out_json: *mut c_char = ptr::null_mut();
        assert_eq!(ccq_pop_json(mgr, 0, ptr::null_mut(), &mut out_json), CCQ_ERROR_INTERNAL);
        assert!(out_json.is_null());
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek_front().map(|p| p.sender().to_string()).as_deref(), Some("bad\0sender"));

        // The Rust side can still drain it.
        assert!(queue.pop().is_some());
        assert_eq!(ccq_pop_json(mgr, 0, ptr::null_mut(), &mut out_json), CCQ_SUCCESS);
        assert_eq!(unsafe { CStr::from_ptr(out_json) }.to_str().unwrap(), "[2]");

        ccq_string_free(out_json);
        ccq_manager_free(mgr);
    }
}
