use ccq_msgqueue::ffi::*;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

fn cstr(s: &str) -> CString {
    CString::new(s).unwrap()
}

#[test]
fn push_wait_pop_through_c_abi() {
    let mgr = ccq_manager_new();
    assert!(!mgr.is_null());

    let qid = ccq_acquire(mgr, -1);
    assert_eq!(qid, 0);
    assert_eq!(ccq_is_empty(mgr, qid), 1);

    let sender = cstr("c-side");
    let json = cstr(r#"{"action": "command", "n": 3}"#);
    assert_eq!(ccq_push_json(mgr, qid, sender.as_ptr(), json.as_ptr()), CCQ_SUCCESS);
    assert_eq!(ccq_wait(mgr, qid, 1000), 1);
    assert_eq!(ccq_is_empty(mgr, qid), 0);

    let mut out_sender: *mut c_char = ptr::null_mut();
    let mut out_json: *mut c_char = ptr::null_mut();
    assert_eq!(ccq_pop_json(mgr, qid, &mut out_sender, &mut out_json), CCQ_SUCCESS);

    let got_sender = unsafe { CStr::from_ptr(out_sender) }.to_str().unwrap().to_string();
    let got_json = unsafe { CStr::from_ptr(out_json) }.to_str().unwrap().to_string();
    assert_eq!(got_sender, "c-side");
    let value: serde_json::Value = serde_json::from_str(&got_json).unwrap();
    assert_eq!(value, serde_json::json!({"action": "command", "n": 3}));

    ccq_string_free(out_sender);
    ccq_string_free(out_json);

    assert_eq!(ccq_pop_json(mgr, qid, ptr::null_mut(), &mut out_json), CCQ_ERROR_EMPTY);
    ccq_manager_free(mgr);
}

#[test]
fn errors_are_reported_as_codes() {
    let mgr = ccq_manager_new();
    let qid = ccq_acquire(mgr, -1);
    let sender = cstr("c-side");
    let bad = cstr("{oops");
    let good = cstr("[]");

    assert_eq!(ccq_acquire(ptr::null_mut(), -1), CCQ_ERROR_NULL_POINTER);
    assert_eq!(ccq_acquire(mgr, 7), CCQ_ERROR_INVALID_QUEUE);
    assert_eq!(ccq_acquire(mgr, qid), qid);
    assert_eq!(ccq_wait(mgr, 7, 10), CCQ_ERROR_INVALID_QUEUE);
    assert_eq!(
        ccq_push_json(mgr, qid, sender.as_ptr(), bad.as_ptr()),
        CCQ_ERROR_MALFORMED_JSON
    );
    assert_eq!(
        ccq_push_json(mgr, qid, ptr::null(), good.as_ptr()),
        CCQ_ERROR_NULL_POINTER
    );
    assert_eq!(ccq_pop_json(mgr, qid, ptr::null_mut(), ptr::null_mut()), CCQ_ERROR_NULL_POINTER);

    assert_eq!(ccq_release(mgr, qid), CCQ_SUCCESS);
    assert_eq!(
        ccq_push_json(mgr, qid, sender.as_ptr(), good.as_ptr()),
        CCQ_ERROR_QUEUE_DISABLED
    );
    assert_eq!(ccq_wait(mgr, qid, 0), 0);
    assert_eq!(ccq_acquire(mgr, -1), qid);

    ccq_manager_free(mgr);
    ccq_manager_free(ptr::null_mut());
    ccq_string_free(ptr::null_mut());
}
