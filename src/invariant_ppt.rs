//! Invariant checks with an optional record of which ones fired.
//!
//! With the `ppt` feature every passing [`assert_invariant`] is remembered,
//! so integration tests can call [`contract_test`] to prove an operation
//! really checked what it claims to. Checks run at construction, reset and
//! export setup, never inside the per-sample advance path.

#[cfg(feature = "ppt")]
use lazy_static::lazy_static;
#[cfg(feature = "ppt")]
use std::collections::HashSet;
#[cfg(feature = "ppt")]
use std::sync::{Mutex, MutexGuard};

/// Children always precede their parent in the arena.
pub const GRAPH_ACYCLIC: u32 = 1;
/// A node's child count matches its type.
pub const GRAPH_ARITY: u32 = 2;
/// A plan lists each reachable node once, root last.
pub const PLAN_REACHABLE_ONCE: u32 = 3;
/// Reset leaves every reachable generation at zero.
pub const RESET_COMPLETE: u32 = 4;
/// Patch compilation makes one node per distinct signal.
pub const PATCH_SHARES_IDENTICAL: u32 = 5;
/// A sample sequence starts from a freshly reset root.
pub const EXPORT_STARTS_RESET: u32 = 6;
/// Encoded WAV length equals header plus sample data.
pub const WAV_SIZES_CONSISTENT: u32 = 7;
/// Each reachable node advanced exactly once in a tick.
pub const TICK_SINGLE_ADVANCE: u32 = 8;

fn failure(id: u32, message: &str, context: Option<&str>) -> String {
    match context {
        Some(ctx) => format!("Invariant {id} failed: {message} (context: {ctx})"),
        None => format!("Invariant {id} failed: {message}"),
    }
}

#[cfg(feature = "ppt")]
lazy_static! {
    static ref ASSERTED: Mutex<HashSet<u32>> = Mutex::new(HashSet::new());
}

#[cfg(feature = "ppt")]
fn asserted() -> MutexGuard<'static, HashSet<u32>> {
    // A panicking test must not hide the log from the others.
    ASSERTED.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Panic with a diagnostic if `condition` is false; otherwise record `id`.
pub fn assert_invariant(id: u32, condition: bool, message: &str, context: Option<&str>) {
    if !condition {
        let report = failure(id, message, context);
        eprintln!("{report}");
        panic!("{report}");
    }
    record(id);
}

#[cfg(feature = "ppt")]
fn record(id: u32) {
    asserted().insert(id);
}

#[cfg(not(feature = "ppt"))]
fn record(_id: u32) {}

/// Panic unless every id in `required` has been asserted in this process.
#[cfg(feature = "ppt")]
pub fn contract_test(test_name: &str, required: &[u32]) {
    let missing: Vec<u32> = {
        let log = asserted();
        required.iter().copied().filter(|id| !log.contains(id)).collect()
    };
    if !missing.is_empty() {
        panic!("Contract test '{test_name}' failed: invariants not enforced: {missing:?}");
    }
}

/// Without `ppt` nothing is recorded, so contracts always pass.
#[cfg(not(feature = "ppt"))]
pub fn contract_test(_test_name: &str, _required: &[u32]) {}

/// Forget everything recorded so far.
#[cfg(feature = "ppt")]
pub fn clear_invariant_log() {
    asserted().clear();
}

#[cfg(not(feature = "ppt"))]
pub fn clear_invariant_log() {}
