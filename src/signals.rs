use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Catch Ctrl-C for the rest of the process lifetime so it only reaches the
/// attached child. Each interrupt sets `interrupted`.
///
/// Must be called from inside a tokio runtime. On unix the handler is
/// registered before this returns.
pub fn watch_interrupts(interrupted: Arc<AtomicBool>) -> io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupts = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            while interrupts.recv().await.is_some() {
                interrupted.store(true, Ordering::SeqCst);
            }
        });
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                interrupted.store(true, Ordering::SeqCst);
            }
        });
    }

    Ok(())
}
