use toastpilot_core::OsGeneration;
use windows::Win32::System::Registry::{HKEY_LOCAL_MACHINE, RRF_RT_REG_SZ, RegGetValueW};
use windows::core::w;

/// Reads `CurrentBuildNumber` from the registry.
///
/// `GetVersionEx` reports a capped version to unmanifested processes.
pub fn build_number() -> Option<u32> {
    let mut buffer = [0u16; 32];
    let mut size = (buffer.len() * 2) as u32;

    // SAFETY: `size` holds the buffer size in bytes and RRF_RT_REG_SZ
    // guarantees a null-terminated string on success.
    let status = unsafe {
        RegGetValueW(
            HKEY_LOCAL_MACHINE,
            w!(r"SOFTWARE\Microsoft\Windows NT\CurrentVersion"),
            w!("CurrentBuildNumber"),
            RRF_RT_REG_SZ,
            None,
            Some(buffer.as_mut_ptr().cast()),
            Some(&mut size),
        )
    };
    status.ok().ok()?;

    let chars = (size as usize / 2).saturating_sub(1);
    String::from_utf16_lossy(&buffer[..chars]).trim().parse().ok()
}

/// Detects the OS generation, assuming Modern if the build is unknown.
pub fn os_generation() -> OsGeneration {
    match build_number() {
        Some(build) => {
            toastpilot_core::log_debug!("Windows build {build}");
            OsGeneration::from_build(build)
        }
        None => {
            toastpilot_core::log_warn!("Could not read the Windows build number");
            OsGeneration::Modern
        }
    }
}
