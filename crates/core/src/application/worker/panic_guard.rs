// Catches panics from host calls so they surface as values, not unwinds
use std::any::Any;
use std::panic::{catch_unwind, UnwindSafe};
use tracing::error;

/// Outcome of a call made under [`execute_guarded`]
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    Success(T),
    /// Carries the panic payload rendered as text
    Panicked(String),
}

/// Run `f`, turning a panic into [`PanicGuardResult::Panicked`].
///
/// ```text
/// match execute_guarded(AssertUnwindSafe(|| frames.save_frame(&frame, &path))) {
///     PanicGuardResult::Success(result) => result?,
///     PanicGuardResult::Panicked(msg) => return Err(AppError::Internal(msg)),
/// }
/// ```
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T + UnwindSafe,
{
    catch_unwind(f)
        .map(PanicGuardResult::Success)
        .unwrap_or_else(|payload| {
            let msg = panic_message(payload.as_ref());
            error!(panic_msg = %msg, "Host call panicked");
            PanicGuardResult::Panicked(msg)
        })
}

/// Text of a panic payload (`panic!` with a literal or a formatted message)
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
