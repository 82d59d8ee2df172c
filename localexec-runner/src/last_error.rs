//! Per-thread slot holding the most recent low-level failure message.
//!
//! Strategies that call into libc directly record the OS error here when
//! opening, reading or closing a stream fails. An
//! [`ExecError`](crate::ExecError) built without diagnostic text consumes the
//! slot so the caller still learns why the process never produced output.

use std::cell::RefCell;
use std::fmt::Display;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Remember `error` as the latest system-level failure on this thread.
pub fn record(error: impl Display) {
    let message = error.to_string();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

/// Take the latest recorded failure, leaving the slot empty.
pub fn take() -> Option<String> {
    LAST_ERROR
        .with(|slot| slot.borrow_mut().take())
        .filter(|message| !message.is_empty())
}

/// Drop whatever is recorded.
pub fn clear() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}
