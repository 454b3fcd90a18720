use ocr_batch::engine::EngineError;
use ocr_batch::retry::{transient_message, with_retry, RetryPolicy};
use std::cell::Cell;
use std::time::Duration;

fn quick(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        delay: Duration::ZERO,
    }
}

#[test]
fn transient_errors_consume_the_full_budget() {
    let calls = Cell::new(0u32);
    let res: Result<(), EngineError> = with_retry(&quick(3), "item 1/1", || {
        calls.set(calls.get() + 1);
        Err(EngineError::transient("engine timed out"))
    });
    assert!(res.is_err());
    assert_eq!(calls.get(), 3);
}

#[test]
fn permanent_errors_fail_on_first_attempt() {
    let calls = Cell::new(0u32);
    let res: Result<(), EngineError> = with_retry(&quick(3), "item 1/1", || {
        calls.set(calls.get() + 1);
        Err(EngineError::permanent("bad image header"))
    });
    assert!(res.is_err());
    assert_eq!(calls.get(), 1);
}

#[test]
fn succeeds_after_a_transient_failure() {
    let calls = Cell::new(0u32);
    let res: Result<u32, EngineError> = with_retry(&quick(3), "item 1/1", || {
        calls.set(calls.get() + 1);
        if calls.get() < 2 {
            Err(EngineError::transient("connection reset"))
        } else {
            Ok(42)
        }
    });
    assert_eq!(res.unwrap(), 42);
    assert_eq!(calls.get(), 2);
}

#[test]
fn opaque_errors_fall_back_to_message_classification() {
    // "connection timeout" style message: retried to the budget.
    let calls = Cell::new(0u32);
    let res: Result<(), EngineError> = with_retry(&quick(2), "item 1/1", || {
        calls.set(calls.get() + 1);
        Err(EngineError::unknown("Connection timeout while loading model"))
    });
    assert!(res.is_err());
    assert_eq!(calls.get(), 2);

    // Nothing transient-looking: one attempt only.
    let calls = Cell::new(0u32);
    let res: Result<(), EngineError> = with_retry(&quick(2), "item 1/1", || {
        calls.set(calls.get() + 1);
        Err(EngineError::unknown("unsupported image format"))
    });
    assert!(res.is_err());
    assert_eq!(calls.get(), 1);
}

#[test]
fn transient_marker_matching_is_case_insensitive() {
    assert!(transient_message("Read timed out"));
    assert!(transient_message("NETWORK unreachable"));
    assert!(transient_message("IO Error: resource busy"));
    assert!(transient_message("connection refused"));
    assert!(!transient_message("invalid image dimensions"));
}

#[test]
fn zero_max_attempts_still_runs_once() {
    let calls = Cell::new(0u32);
    let _: Result<(), EngineError> = with_retry(&quick(0), "item 1/1", || {
        calls.set(calls.get() + 1);
        Err(EngineError::transient("timeout"))
    });
    assert_eq!(calls.get(), 1);
}
