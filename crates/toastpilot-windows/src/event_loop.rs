//! Message-pump threads for WinEvent hooks and display notifications.
//!
//! Each subscription owns a dedicated thread: it installs its resource
//! (a `SetWinEventHook` registration or a hidden window), runs a message
//! pump until `WM_QUIT`, then tears the resource down on that same
//! thread, as Win32 requires.

use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc;
use std::thread;

use toastpilot_core::{
    CoreResult, DisplaySink, EventSink, RawEvent, Subscription, log_debug, log_error,
};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Accessibility::{HWINEVENTHOOK, SetWinEventHook, UnhookWinEvent};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, MSG,
    PostThreadMessageW, RegisterClassW, SPI_SETWORKAREA, TranslateMessage, WINEVENT_OUTOFCONTEXT,
    WINEVENT_SKIPOWNPROCESS, WM_DISPLAYCHANGE, WM_QUIT, WM_SETTINGCHANGE, WNDCLASSW,
    WS_EX_TOOLWINDOW,
};
use windows::core::w;

// Sinks for the callbacks running on each pump thread.
thread_local! {
    static WINDOW_SINK: RefCell<Option<EventSink>> = const { RefCell::new(None) };
    static DISPLAY_SINK: RefCell<Option<DisplaySink>> = const { RefCell::new(None) };
}

/// A running pump thread, stopped through `Subscription::unsubscribe`.
pub struct PumpThread {
    thread_id: u32,
    handle: thread::JoinHandle<()>,
}

impl Subscription for PumpThread {
    fn unsubscribe(self: Box<Self>) {
        self.stop();
    }
}

impl PumpThread {
    /// Signals the pump to quit and waits for its cleanup, unless called
    /// from the pump thread itself.
    pub fn stop(self) {
        // SAFETY: posting to a thread id has no memory-safety requirements.
        unsafe {
            let _ = PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
        }
        if self.handle.thread().id() != thread::current().id() {
            let _ = self.handle.join();
        }
    }
}

/// Installs a WinEvent hook for `min..=max` on a new pump thread.
pub fn watch_window_events(min: u32, max: u32, sink: EventSink) -> CoreResult<PumpThread> {
    spawn_pump(
        "toastpilot-hook",
        move || {
            WINDOW_SINK.with(|cell| *cell.borrow_mut() = Some(sink));

            // SAFETY: WINEVENT_OUTOFCONTEXT delivers the callback on this
            // thread's message queue. WINEVENT_SKIPOWNPROCESS ignores our
            // own windows.
            let hook = unsafe {
                SetWinEventHook(
                    min,
                    max,
                    None,
                    Some(win_event_proc),
                    0,
                    0,
                    WINEVENT_OUTOFCONTEXT | WINEVENT_SKIPOWNPROCESS,
                )
            };
            if hook.is_invalid() {
                return Err("SetWinEventHook failed".to_string());
            }
            log_debug!("WinEvent hook installed for 0x{min:X}..=0x{max:X}");
            Ok(hook)
        },
        |hook| {
            // SAFETY: the hook was installed on this thread.
            unsafe {
                let _ = UnhookWinEvent(hook);
            }
            WINDOW_SINK.with(|cell| cell.borrow_mut().take());
        },
    )
}

/// Creates a hidden window that reports display and work-area changes.
pub fn watch_display_changes(sink: DisplaySink) -> CoreResult<PumpThread> {
    spawn_pump(
        "toastpilot-display",
        move || {
            DISPLAY_SINK.with(|cell| *cell.borrow_mut() = Some(sink));
            create_event_sink().ok_or_else(|| "failed to create display event window".to_string())
        },
        |hwnd| {
            // SAFETY: the window was created on this thread.
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
            DISPLAY_SINK.with(|cell| cell.borrow_mut().take());
        },
    )
}

fn spawn_pump<R>(
    name: &str,
    install: impl FnOnce() -> Result<R, String> + Send + 'static,
    uninstall: impl FnOnce(R) + Send + 'static,
) -> CoreResult<PumpThread> {
    let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, String>>();

    let handle = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            // SAFETY: no preconditions.
            let thread_id = unsafe { GetCurrentThreadId() };
            let resource = match install() {
                Ok(resource) => resource,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(thread_id));

            run_message_pump();
            uninstall(resource);
        })?;

    let thread_id = ready_rx
        .recv()
        .map_err(|_| "pump thread exited unexpectedly")??;

    Ok(PumpThread { thread_id, handle })
}

/// Blocks until `WM_QUIT` is received.
fn run_message_pump() {
    let mut msg = MSG::default();

    while unsafe { GetMessageW(&mut msg, None, 0, 0).as_bool() } {
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

/// Creates a hidden window that receives `WM_DISPLAYCHANGE`.
///
/// Must NOT be a message-only window (`HWND_MESSAGE` parent) because those
/// do not receive broadcast messages. `WS_EX_TOOLWINDOW` keeps it out of
/// the taskbar.
fn create_event_sink() -> Option<HWND> {
    unsafe {
        let class_name = w!("ToastpilotEventSink");
        let wc = WNDCLASSW {
            lpfnWndProc: Some(event_sink_proc),
            lpszClassName: class_name,
            ..Default::default()
        };

        // Fails harmlessly when a previous subscription registered it.
        let _ = RegisterClassW(&wc);

        let hwnd = CreateWindowExW(
            WS_EX_TOOLWINDOW,
            class_name,
            w!("ToastpilotEventSink"),
            Default::default(),
            0,
            0,
            0,
            0,
            None,
            None,
            None,
            None,
        );

        match hwnd {
            Ok(h) if !h.is_invalid() => Some(h),
            _ => None,
        }
    }
}

/// WNDPROC for the event sink window.
///
/// Display-mode changes and work-area changes (taskbar moved or resized)
/// both invalidate the monitor table.
unsafe extern "system" fn event_sink_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let changed = msg == WM_DISPLAYCHANGE
        || (msg == WM_SETTINGCHANGE && wparam.0 == SPI_SETWORKAREA.0 as usize);
    if changed {
        let sink = DISPLAY_SINK.with(|cell| cell.borrow().clone());
        if let Some(sink) = sink
            && catch_unwind(AssertUnwindSafe(|| sink())).is_err()
        {
            log_error!("Display change handler panicked");
        }
    }
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

/// The WinEvent callback.
///
/// The sink is cloned out of the thread-local before it runs, since a
/// nested event may arrive while the sink waits on another window.
/// Panics are contained here: unwinding across the callback boundary
/// would abort the process.
unsafe extern "system" fn win_event_proc(
    _hook: HWINEVENTHOOK,
    event: u32,
    hwnd: HWND,
    id_object: i32,
    _id_child: i32,
    event_thread: u32,
    _event_time: u32,
) {
    let raw = RawEvent {
        code: event,
        hwnd: hwnd.0 as usize,
        id_object,
        thread_id: event_thread,
    };
    let sink = WINDOW_SINK.with(|cell| cell.borrow().clone());
    if let Some(sink) = sink
        && catch_unwind(AssertUnwindSafe(|| sink(raw))).is_err()
    {
        log_error!("Window event handler panicked on 0x{event:X}");
    }
}
