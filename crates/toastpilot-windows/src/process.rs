use toastpilot_core::CoreResult;
use windows::Win32::Foundation::CloseHandle;
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION, QueryFullProcessImageNameW,
};
use windows::core::PWSTR;

/// Returns the executable file name of a process, e.g. `explorer.exe`.
///
/// Fails if the process has exited or cannot be opened.
pub fn image_name(pid: u32) -> CoreResult<String> {
    if pid == 0 {
        return Err("pid 0 has no image".into());
    }

    // SAFETY: PROCESS_QUERY_LIMITED_INFORMATION is the least-privilege
    // right that allows QueryFullProcessImageNameW, and works for
    // elevated processes too.
    let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid)? };

    let mut buffer = [0u16; 1024];
    let mut len = buffer.len() as u32;
    // SAFETY: `len` holds the buffer capacity and is updated with the
    // number of characters written.
    let result = unsafe {
        QueryFullProcessImageNameW(
            handle,
            PROCESS_NAME_WIN32,
            PWSTR(buffer.as_mut_ptr()),
            &mut len,
        )
    };
    // SAFETY: the handle was opened above and is not used afterwards.
    unsafe {
        let _ = CloseHandle(handle);
    }
    result?;

    let path = String::from_utf16_lossy(&buffer[..len as usize]);
    Ok(file_name(&path).to_string())
}

fn file_name(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_strips_directories() {
        assert_eq!(
            file_name(r"C:\Windows\explorer.exe"),
            "explorer.exe"
        );
        assert_eq!(file_name("dwm.exe"), "dwm.exe");
    }

    #[test]
    fn own_process_has_an_image_name() {
        // Act
        let name = image_name(std::process::id()).unwrap();

        // Assert
        assert!(name.to_ascii_lowercase().ends_with(".exe"));
    }

    #[test]
    fn pid_zero_is_rejected() {
        assert!(image_name(0).is_err());
    }
}
