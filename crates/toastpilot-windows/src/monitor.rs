use std::mem;

use toastpilot_core::{CoreResult, MonitorInfo, Rect};
use windows::Win32::Foundation::{LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO};
use windows::core::BOOL;

/// `dwFlags` bit marking the primary monitor.
const MONITORINFOF_PRIMARY: u32 = 1;

/// Lists every monitor in OS enumeration order.
pub fn enumerate_monitors() -> CoreResult<Vec<MonitorInfo>> {
    let mut handles: Vec<HMONITOR> = Vec::new();

    // SAFETY: EnumDisplayMonitors is synchronous; the Vec behind LPARAM
    // outlives the callbacks.
    let ok = unsafe {
        EnumDisplayMonitors(
            None,
            None,
            Some(enum_monitor_callback),
            LPARAM(&mut handles as *mut _ as isize),
        )
    };
    if !ok.as_bool() {
        return Err("EnumDisplayMonitors failed".into());
    }

    handles.into_iter().map(monitor_info).collect()
}

unsafe extern "system" fn enum_monitor_callback(
    monitor: HMONITOR,
    _hdc: HDC,
    _clip: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    // SAFETY: lparam is the Vec pointer passed by enumerate_monitors().
    let handles = unsafe { &mut *(lparam.0 as *mut Vec<HMONITOR>) };
    handles.push(monitor);
    BOOL(1)
}

fn monitor_info(monitor: HMONITOR) -> CoreResult<MonitorInfo> {
    let mut info = MONITORINFO {
        cbSize: mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };

    // SAFETY: cbSize is set as the API requires.
    let success = unsafe { GetMonitorInfoW(monitor, &mut info) };
    if !success.as_bool() {
        return Err("Failed to get monitor info".into());
    }

    Ok(MonitorInfo {
        handle: monitor.0 as usize,
        bounds: to_rect(&info.rcMonitor),
        work_area: to_rect(&info.rcWork),
        primary: info.dwFlags & MONITORINFOF_PRIMARY != 0,
    })
}

fn to_rect(rc: &RECT) -> Rect {
    Rect::from_edges(rc.left, rc.top, rc.right, rc.bottom)
}
