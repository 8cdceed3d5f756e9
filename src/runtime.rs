//! Shared background runtime for callback/async dispatch and detached downloads.
//!
//! The blocking dispatch style drives this runtime from the caller's thread;
//! the callback and async styles spawn onto it. Lazily initialized on first
//! use so purely-synchronous callers never pay for it.

use std::sync::OnceLock;

use tokio::runtime::Runtime;

static SHARED: OnceLock<Runtime> = OnceLock::new();

/// Returns the process-wide background runtime, creating it on first use.
///
/// # Panics
///
/// Panics if the runtime cannot be built with the static configuration.
/// This should never happen in practice.
#[allow(clippy::expect_used)]
pub(crate) fn shared() -> &'static Runtime {
    SHARED.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("netkit-worker")
            .build()
            .expect("failed to build background runtime with static configuration")
    })
}
