//! Keeps faults inside language implementations from taking down the process.
//!
//! Languages report faults they cannot recover from through a [`FatalErrorHook`]. Outside of a
//! conversion such a report terminates the process. While a [`CrashGuard`] is held, reports are
//! forwarded to the progress sink of the conversion instead, and panics raised on any thread
//! are reported there rather than printed.
//!
//! The hooks and the panic hook are process wide state. Only one guard can exist at a time, a
//! second top-level conversion blocks until the guard of the first one is released.

use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Once},
    thread,
    time::Duration,
};

use parking_lot::{const_mutex, const_rwlock, Mutex, MutexGuard, RwLock};

use crate::{ConversionProgress, ProgressSink, TranslationError};

const EXCHANGE_TIMEOUT: Duration = Duration::from_millis(100);

static SINGLE_FLIGHT: Mutex<()> = const_mutex(());

/// A fault reported by a language that it cannot recover from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFault {
    pub message: String,
}

impl EngineFault {
    pub fn new(message: impl Into<String>) -> Self {
        EngineFault {
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub type FatalErrorHandler = Arc<dyn Fn(&EngineFault) + Send + Sync>;

/// A process wide slot for the handler of fatal faults of a language.
///
/// ```
/// use convey_conversion::{EngineFault, FatalErrorHook};
///
/// static SIMPLIFIER_FAULTS: FatalErrorHook = FatalErrorHook::new("simplifier");
///
/// fn simplify(valid: bool) -> Result<(), ()> {
///     if !valid {
///         SIMPLIFIER_FAULTS.report(EngineFault::new("unreachable state"));
///         return Err(());
///     }
///     Ok(())
/// }
/// # assert!(simplify(true).is_ok());
/// ```
pub struct FatalErrorHook {
    name: &'static str,
    handler: RwLock<Option<FatalErrorHandler>>,
}

impl FatalErrorHook {
    pub const fn new(name: &'static str) -> Self {
        FatalErrorHook {
            name,
            handler: const_rwlock(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Reports a fault. Without an installed handler the fault is logged and the process is
    /// aborted.
    pub fn report(&self, fault: EngineFault) {
        let handler = self.handler.read().clone();
        match handler {
            Some(handler) => handler(&fault),
            None => {
                log::error!("fatal fault in {}: {fault}", self.name);
                std::process::abort();
            }
        }
    }

    /// Replaces the installed handler and returns the previous one. Returns `None` when the
    /// slot could not be locked in time, in which case nothing was replaced.
    fn exchange(&self, handler: Option<FatalErrorHandler>) -> Option<Option<FatalErrorHandler>> {
        let mut slot = self.handler.try_write_for(EXCHANGE_TIMEOUT)?;
        Some(std::mem::replace(&mut *slot, handler))
    }
}

impl fmt::Debug for FatalErrorHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FatalErrorHook")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

type PanicHandler = Arc<dyn Fn(&str) + Send + Sync>;

static PANIC_HANDLER: RwLock<Option<PanicHandler>> = const_rwlock(None);
static INSTALL_PANIC_HOOK: Once = Once::new();

/// Installs the process wide panic hook that forwards to [`PANIC_HANDLER`], or to the hook it
/// replaced when no handler is installed. `panic::set_hook` cannot be called while panicking,
/// the hook is installed by the first guard acquired outside of a panic.
fn install_panic_hook() {
    if thread::panicking() {
        return;
    }
    INSTALL_PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let handler = PANIC_HANDLER
                .try_read_for(EXCHANGE_TIMEOUT)
                .and_then(|slot| slot.clone());
            match handler {
                Some(handler) => handler(&info.to_string()),
                None => previous(info),
            }
        }));
    });
}

fn exchange_panic_handler(handler: Option<PanicHandler>) -> Option<Option<PanicHandler>> {
    let mut slot = PANIC_HANDLER.try_write_for(EXCHANGE_TIMEOUT)?;
    Some(std::mem::replace(&mut *slot, handler))
}

/// Forwards fatal faults and panics to a progress sink for as long as it is held.
///
/// Dropping the guard restores the previous handlers, also when it is dropped while unwinding.
#[must_use]
pub struct CrashGuard {
    swapped: Vec<(&'static FatalErrorHook, Option<FatalErrorHandler>)>,
    previous_panic_handler: Option<Option<PanicHandler>>,
    _single_flight: MutexGuard<'static, ()>,
}

impl CrashGuard {
    /// Installs forwarding handlers in `hooks` and for panics. Blocks while another guard is
    /// held.
    ///
    /// Installing a handler is best effort: a hook that cannot be locked is left alone.
    pub fn acquire(hooks: &[&'static FatalErrorHook], progress: ProgressSink) -> CrashGuard {
        let single_flight = SINGLE_FLIGHT.lock();

        let handler: FatalErrorHandler = {
            let progress = progress.clone();
            Arc::new(move |fault: &EngineFault| {
                log::error!("trapped fatal fault: {fault}");
                progress.report(ConversionProgress::new(format!(
                    "the language engine reported a fatal error: {fault}"
                )));
            })
        };

        let swapped = hooks
            .iter()
            .filter_map(|&hook| match hook.exchange(Some(handler.clone())) {
                Some(previous) => Some((hook, previous)),
                None => {
                    log::warn!("could not install fault handler for {}", hook.name());
                    None
                }
            })
            .collect();

        install_panic_hook();
        let previous_panic_handler = exchange_panic_handler(Some(Arc::new(move |info: &str| {
            log::error!("panic during conversion: {info}");
            progress.report(ConversionProgress::new(format!("conversion panicked: {info}")));
        })));
        if previous_panic_handler.is_none() {
            log::warn!("could not install the panic handler");
        }

        CrashGuard {
            swapped,
            previous_panic_handler,
            _single_flight: single_flight,
        }
    }
}

impl Drop for CrashGuard {
    fn drop(&mut self) {
        for (hook, previous) in self.swapped.drain(..) {
            if hook.exchange(previous).is_none() {
                log::warn!("could not restore fault handler for {}", hook.name());
            }
        }

        if let Some(previous) = self.previous_panic_handler.take() {
            if exchange_panic_handler(previous).is_none() {
                log::warn!("could not restore the panic handler");
            }
        }
    }
}

/// Returns true if a guard forwards panics or faults of one of `hooks`. Waits for the guard
/// that is currently held, if any, to be released.
#[cfg(test)]
pub(crate) fn is_forwarding(hooks: &[&'static FatalErrorHook]) -> bool {
    let _single_flight = SINGLE_FLIGHT.lock();
    PANIC_HANDLER.read().is_some() || hooks.iter().any(|hook| hook.handler.read().is_some())
}

/// Calls into a language and turns a panic into a [`TranslationError`].
pub(crate) fn catch_fault<R>(
    f: impl FnOnce() -> Result<R, TranslationError>,
) -> Result<R, TranslationError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(TranslationError::new(format!(
            "conversion panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

/// Calls into a language method that cannot fail and turns a panic into a
/// [`TranslationError`].
pub(crate) fn catch_panic<R>(f: impl FnOnce() -> R) -> Result<R, TranslationError> {
    catch_fault(|| Ok(f()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
