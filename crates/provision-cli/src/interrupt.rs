use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use provision_contracts::{ProvisionError, EXIT_INTERRUPTED};

/// How long a run may keep going after the first Ctrl-C before it is torn down.
pub const INTERRUPT_GRACE: Duration = Duration::from_secs(3);

#[cfg(unix)]
type InterruptStream = tokio::signal::unix::Signal;
#[cfg(windows)]
type InterruptStream = tokio::signal::windows::CtrlC;

#[cfg(unix)]
fn interrupt_stream() -> std::io::Result<InterruptStream> {
    use tokio::signal::unix::{signal, SignalKind};
    signal(SignalKind::interrupt())
}

#[cfg(windows)]
fn interrupt_stream() -> std::io::Result<InterruptStream> {
    tokio::signal::windows::ctrl_c()
}

/// Returns a flag that flips to `true` on the first Ctrl-C.
///
/// Transfers are blocking and checked cooperatively, so a transfer stuck on
/// a silent server never sees the flag. A second Ctrl-C, or the end of
/// [`INTERRUPT_GRACE`], runs `cleanup` and exits with [`EXIT_INTERRUPTED`].
///
/// The handler is registered before this returns.
pub fn install_interrupt_flag<C>(cleanup: C) -> Result<Arc<AtomicBool>>
where
    C: FnOnce() + Send + 'static,
{
    let interrupted = Arc::new(AtomicBool::new(false));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("create signal runtime")?;
    let mut signals = {
        let _guard = runtime.enter();
        interrupt_stream().context("install interrupt handler")?
    };

    let interrupted_signal = Arc::clone(&interrupted);
    thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            let abort = runtime.block_on(async move {
                if signals.recv().await.is_none() {
                    return false;
                }
                tracing::warn!("Interrupt received; stopping (press Ctrl-C again to abort now)");
                interrupted_signal.store(true, Ordering::SeqCst);

                if tokio::time::timeout(INTERRUPT_GRACE, signals.recv())
                    .await
                    .is_err()
                {
                    tracing::debug!("grace period elapsed");
                }
                true
            });
            if abort {
                cleanup();
                eprintln!("{}", ProvisionError::Interrupted);
                std::process::exit(EXIT_INTERRUPTED);
            }
        })
        .context("spawn signal watcher")?;

    Ok(interrupted)
}
