//! Raw-mode / alternate-screen lifetime for the replay viewer.
//!
//! [`TerminalGuard::enter`] switches the terminal over and the guard switches it
//! back on [`TerminalGuard::cleanup`], on drop, or (with [`install_panic_hook`])
//! before a panic message is printed.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    /// Enable raw mode, enter the alternate screen and hide the cursor.
    ///
    /// If entering the alternate screen fails, raw mode is undone before returning.
    pub fn enter() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let guard = Self { active: true };
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(guard)
    }

    /// Restore the terminal now; later calls and the drop are no-ops.
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        restore()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = restore() {
                tracing::debug!(error = %e, "Terminal restore failed in Drop");
            }
        }
    }
}

fn restore() -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen, Show)?;
    stdout.flush()?;
    Ok(())
}

/// Restore the terminal before the default hook prints a panic.
///
/// Install once, before [`TerminalGuard::enter`].
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if let Err(e) = restore() {
            tracing::debug!(error = %e, "Terminal restore failed in panic hook");
        }
        previous(info);
    }));
}
