use toastpilot_core::{CoreResult, Rect, WindowHandle};

use windows::Win32::Foundation::{HWND, RECT};
use windows::Win32::UI::WindowsAndMessaging::{
    GetWindowRect, GetWindowTextLengthW, GetWindowTextW, GetWindowThreadProcessId, IsIconic,
    IsWindow, IsWindowVisible, RealGetWindowClassW, SWP_NOACTIVATE, SWP_NOSIZE, SWP_NOZORDER,
    SetWindowPos,
};

/// A top-level window, wrapping a Win32 `HWND`.
///
/// Every query goes to the OS; nothing is cached here.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    hwnd: HWND,
}

impl Window {
    pub fn new(hwnd: HWND) -> Self {
        Self { hwnd }
    }

    /// Creates a `Window` from the pointer-sized handle the core uses.
    pub fn from_raw(handle: WindowHandle) -> Self {
        Self {
            hwnd: HWND(handle as *mut _),
        }
    }

    pub fn handle(&self) -> WindowHandle {
        self.hwnd.0 as usize
    }

    pub fn title(&self) -> CoreResult<String> {
        self.ensure_alive()?;
        // SAFETY: both calls only read the window text into our buffer.
        unsafe {
            let length = GetWindowTextLengthW(self.hwnd);
            if length == 0 {
                return Ok(String::new());
            }

            // +1 for the null terminator that Windows requires
            let mut buffer = vec![0u16; (length + 1) as usize];
            let copied = GetWindowTextW(self.hwnd, &mut buffer);
            Ok(String::from_utf16_lossy(&buffer[..copied as usize]))
        }
    }

    pub fn class(&self) -> CoreResult<String> {
        // SAFETY: RealGetWindowClassW reads the class name. 256 is the
        // maximum class name length in Win32.
        let mut buffer = [0u16; 256];
        let length = unsafe { RealGetWindowClassW(self.hwnd, &mut buffer) };
        if length == 0 {
            return Err(format!("no class for window 0x{:X}", self.handle()).into());
        }
        Ok(String::from_utf16_lossy(&buffer[..length as usize]))
    }

    /// Bounding rectangle in screen coordinates, as `SetWindowPos` uses.
    pub fn rect(&self) -> CoreResult<Rect> {
        let mut rc = RECT::default();
        // SAFETY: GetWindowRect fills `rc` for a valid HWND and fails otherwise.
        unsafe { GetWindowRect(self.hwnd, &mut rc)? };
        Ok(Rect::from_edges(rc.left, rc.top, rc.right, rc.bottom))
    }

    pub fn process_id(&self) -> CoreResult<u32> {
        let mut pid = 0u32;
        // SAFETY: writes the owning process id into `pid`.
        let thread = unsafe { GetWindowThreadProcessId(self.hwnd, Some(&mut pid)) };
        if thread == 0 {
            return Err(format!("invalid window handle 0x{:X}", self.handle()).into());
        }
        Ok(pid)
    }

    pub fn is_alive(&self) -> bool {
        // SAFETY: IsWindow accepts any handle value.
        unsafe { IsWindow(Some(self.hwnd)).as_bool() }
    }

    pub fn is_iconic(&self) -> bool {
        // SAFETY: simple state query.
        unsafe { IsIconic(self.hwnd).as_bool() }
    }

    /// Moves the window without resizing it, changing its z-order, or
    /// activating it.
    pub fn move_to(&self, x: i32, y: i32) -> CoreResult<()> {
        let flags = SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE;
        // SAFETY: SetWindowPos fails cleanly on a destroyed window.
        unsafe { SetWindowPos(self.hwnd, None, x, y, 0, 0, flags)? };
        Ok(())
    }

    /// Returns whether this looks like a real application window.
    ///
    /// Checks for a caption bar (`WS_CAPTION`) and rejects tool windows
    /// (`WS_EX_TOOLWINDOW`).
    pub fn is_app_window(&self) -> bool {
        use windows::Win32::UI::WindowsAndMessaging::{
            GWL_EXSTYLE, GWL_STYLE, GetWindowLongPtrW, WS_CAPTION, WS_EX_TOOLWINDOW,
        };

        unsafe {
            if !IsWindowVisible(self.hwnd).as_bool() {
                return false;
            }
            let style = GetWindowLongPtrW(self.hwnd, GWL_STYLE) as u32;
            let ex_style = GetWindowLongPtrW(self.hwnd, GWL_EXSTYLE) as u32;

            let has_caption = (style & WS_CAPTION.0) == WS_CAPTION.0;
            let is_tool = (ex_style & WS_EX_TOOLWINDOW.0) == WS_EX_TOOLWINDOW.0;

            has_caption && !is_tool
        }
    }

    fn ensure_alive(&self) -> CoreResult<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(format!("invalid window handle 0x{:X}", self.handle()).into())
        }
    }
}
