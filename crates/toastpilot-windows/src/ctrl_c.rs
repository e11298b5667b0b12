//! Console shutdown handler using `SetConsoleCtrlHandler`.

use std::sync::OnceLock;
use std::sync::mpsc::Sender;

use toastpilot_core::CoreResult;
use windows::Win32::System::Console::{
    CTRL_BREAK_EVENT, CTRL_C_EVENT, CTRL_CLOSE_EVENT, SetConsoleCtrlHandler,
};
use windows::core::BOOL;

/// Written once by `set_handler`, read by the callback.
static SENDER: OnceLock<Sender<()>> = OnceLock::new();

/// Registers a handler that sends `()` on Ctrl+C, Ctrl+Break, or when
/// the console window is closed.
pub fn set_handler(tx: Sender<()>) -> CoreResult<()> {
    SENDER
        .set(tx)
        .map_err(|_| "Ctrl+C handler already registered")?;
    // SAFETY: `handler` only touches the OnceLock above.
    unsafe { SetConsoleCtrlHandler(Some(handler), true)? };
    Ok(())
}

unsafe extern "system" fn handler(ctrl_type: u32) -> BOOL {
    if matches!(ctrl_type, CTRL_C_EVENT | CTRL_BREAK_EVENT | CTRL_CLOSE_EVENT)
        && let Some(tx) = SENDER.get()
    {
        let _ = tx.send(());
        return BOOL(1);
    }
    BOOL(0)
}
