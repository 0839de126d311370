use crate::error::VoltResult;
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a loop and its controllers
///
/// The execution loop checks the flag at tick boundaries only; an `advance`
/// call in progress always completes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can guard another run
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Cancel this token on Ctrl+C
    ///
    /// A process can only install one handler; a second call returns an error.
    pub fn install_ctrlc_handler(&self) -> VoltResult<()> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            eprintln!("{}", "\nCtrl+C received! Cancelling running actions...".red());
            token.cancel();
        })?;
        Ok(())
    }
}
