//! FFI bindings for Mindwell
//!
//! C-compatible functions for embedding the engine in mobile and desktop
//! hosts. Inputs and outputs are null-terminated JSON strings; every returned
//! string is allocated here and must be released with `mindwell_free_string`.

use chrono::Utc;
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::behavior::BehaviorEvent;
use crate::config::EngineConfig;
use crate::error::WellnessError;
use crate::pipeline::{insights_from_json, score_from_json, ScoreRequest, WellnessProcessor};
use crate::storage::MemoryStore;

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

/// Read a required string argument, recording an error when it is unusable
unsafe fn required_str(ptr: *const c_char, name: &str) -> Option<String> {
    if ptr.is_null() {
        set_last_error(&format!("Null {name} pointer"));
        return None;
    }
    match CStr::from_ptr(ptr).to_str() {
        Ok(s) => Some(s.to_string()),
        Err(_) => {
            set_last_error(&format!("{name} is not valid UTF-8"));
            None
        }
    }
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => {
            set_last_error("Output contains an interior NUL byte");
            ptr::null_mut()
        }
    }
}

fn json_result(result: Result<String, WellnessError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

fn status_result(result: Result<(), WellnessError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute insights (behavior, recommendations, reminders, quote) for a
/// serialized behavior log.
///
/// # Safety
/// - `log_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `mindwell_free_string`.
/// - Returns NULL on error; call `mindwell_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindwell_insights(log_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json) = required_str(log_json, "log_json") else {
        return ptr::null_mut();
    };
    json_result(insights_from_json(&json, Utc::now()))
}

/// Compute a wellness score for a score request
/// (`{ log?, mood_entries, journal_entries, mindfulness_sessions }`).
///
/// # Safety
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `mindwell_free_string`.
/// - Returns NULL on error; call `mindwell_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindwell_score(request_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json) = required_str(request_json, "request_json") else {
        return ptr::null_mut();
    };
    json_result(score_from_json(&json, Utc::now()))
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to an in-memory WellnessProcessor
pub struct MindwellProcessorHandle {
    processor: WellnessProcessor<MemoryStore>,
}

/// Create a processor. `config_json` may be NULL for the default configuration.
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Must be freed with `mindwell_processor_free`.
/// - Returns NULL on error; call `mindwell_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindwell_processor_new(
    config_json: *const c_char,
) -> *mut MindwellProcessorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        Ok(EngineConfig::default())
    } else {
        let Some(json) = required_str(config_json, "config_json") else {
            return ptr::null_mut();
        };
        EngineConfig::from_json(&json)
    };

    match config.and_then(|c| WellnessProcessor::with_config(MemoryStore::new(), c)) {
        Ok(processor) => Box::into_raw(Box::new(MindwellProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `mindwell_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mindwell_processor_free(processor: *mut MindwellProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Record a behavior event, e.g.
/// `{"timestamp":"...","event_type":"feature_used","feature":"journal"}`.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `mindwell_processor_new`.
/// - `event_json` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn mindwell_processor_record_event(
    processor: *mut MindwellProcessorHandle,
    event_json: *const c_char,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }
    let handle = &mut *processor;

    let Some(json) = required_str(event_json, "event_json") else {
        return -1;
    };

    let result = serde_json::from_str::<BehaviorEvent>(&json)
        .map_err(WellnessError::from)
        .and_then(|event| handle.processor.record_event(event));
    status_result(result)
}

/// Current insights for the processor's behavior log.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `mindwell_processor_new`.
/// - Returns a newly allocated string that must be freed with `mindwell_free_string`.
/// - Returns NULL on error; call `mindwell_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindwell_processor_insights(
    processor: *mut MindwellProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }
    let handle = &*processor;

    let insights = handle.processor.insights(Utc::now());
    json_result(serde_json::to_string(&insights).map_err(WellnessError::from))
}

/// Calculate and store today's wellness score. Any `log` in the request is
/// ignored in favour of the processor's own log.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `mindwell_processor_new`.
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `mindwell_free_string`.
/// - Returns NULL on error; call `mindwell_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindwell_processor_score(
    processor: *mut MindwellProcessorHandle,
    request_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }
    let handle = &mut *processor;

    let Some(json) = required_str(request_json, "request_json") else {
        return ptr::null_mut();
    };

    let result = serde_json::from_str::<ScoreRequest>(&json)
        .map_err(WellnessError::from)
        .and_then(|request| {
            handle.processor.calculate_score(
                &request.mood_entries,
                &request.journal_entries,
                &request.mindfulness_sessions,
                Utc::now(),
            )
        })
        .and_then(|score| serde_json::to_string(&score).map_err(WellnessError::from));
    json_result(result)
}

/// Serialize the processor's behavior log.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `mindwell_processor_new`.
/// - Returns a newly allocated string that must be freed with `mindwell_free_string`.
/// - Returns NULL on error; call `mindwell_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindwell_processor_save_log(
    processor: *mut MindwellProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }
    let handle = &*processor;

    json_result(handle.processor.save_log())
}

/// Replace the processor's behavior log.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `mindwell_processor_new`.
/// - `log_json` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn mindwell_processor_load_log(
    processor: *mut MindwellProcessorHandle,
    log_json: *const c_char,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }
    let handle = &mut *processor;

    let Some(json) = required_str(log_json, "log_json") else {
        return -1;
    };
    status_result(handle.processor.load_log(&json))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Mindwell functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Mindwell function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mindwell_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - The returned pointer is valid until the next Mindwell call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn mindwell_last_error() -> *const c_char {
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
pub unsafe extern "C" fn mindwell_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        mindwell_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_insights() {
        let log = CString::new(crate::behavior::BehaviorLog::default().to_json().unwrap()).unwrap();

        unsafe {
            let json = take_string(mindwell_insights(log.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert!(value["behavior"].is_null());
            assert_eq!(value["recommendations"][0]["type"], "mood-tracker");
            assert_eq!(value["reminders"].as_array().unwrap().len(), 4);
        }
    }

    #[test]
    fn test_ffi_score() {
        let request = CString::new(
            r#"{"mood_entries": [], "journal_entries": [], "mindfulness_sessions": []}"#,
        )
        .unwrap();

        unsafe {
            let json = take_string(mindwell_score(request.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            let overall = value["overall"].as_f64().unwrap();
            assert!((0.0..=100.0).contains(&overall));
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        let event = CString::new(format!(
            r#"{{"timestamp":"{}","event_type":"mood_logged","mood":"Sad"}}"#,
            Utc::now().to_rfc3339()
        ))
        .unwrap();
        let request = CString::new("{}").unwrap();

        unsafe {
            let processor = mindwell_processor_new(ptr::null());
            assert!(!processor.is_null());

            assert_eq!(mindwell_processor_record_event(processor, event.as_ptr()), 0);

            let insights = take_string(mindwell_processor_insights(processor));
            assert!(insights.contains("\"Sad\""));

            let score = take_string(mindwell_processor_score(processor, request.as_ptr()));
            assert!(score.contains("overall"));

            let saved = mindwell_processor_save_log(processor);
            assert!(!saved.is_null());

            let processor2 = mindwell_processor_new(ptr::null());
            assert_eq!(mindwell_processor_load_log(processor2, saved), 0);
            assert_eq!((*processor2).processor.log().len(), 1);

            mindwell_free_string(saved);
            mindwell_processor_free(processor);
            mindwell_processor_free(processor2);
        }
    }

    #[test]
    fn test_ffi_invalid_config() {
        let config = CString::new(r#"{"engagement": {"window_days": 0}}"#).unwrap();

        unsafe {
            let processor = mindwell_processor_new(config.as_ptr());
            assert!(processor.is_null());

            let error = CStr::from_ptr(mindwell_last_error()).to_str().unwrap();
            assert!(error.contains("window_days"));
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let invalid = CString::new("not json").unwrap();

        unsafe {
            assert!(mindwell_insights(invalid.as_ptr()).is_null());
            let error = mindwell_last_error();
            assert!(!error.is_null());
            assert!(!CStr::from_ptr(error).to_str().unwrap().is_empty());

            assert!(mindwell_score(ptr::null()).is_null());
            let error = CStr::from_ptr(mindwell_last_error()).to_str().unwrap();
            assert!(error.contains("request_json"));

            assert_eq!(
                mindwell_processor_record_event(ptr::null_mut(), invalid.as_ptr()),
                -1
            );
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = CStr::from_ptr(mindwell_version()).to_str().unwrap();
            assert_eq!(version, env!("CARGO_PKG_VERSION"));
        }
    }
}
