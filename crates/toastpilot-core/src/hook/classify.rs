//! Notification popup heuristics.
//!
//! A window counts as a notification only when its owning process,
//! window class, and title all match. Windows 10 and Windows 11 host
//! toasts differently, so the allow-lists depend on the OS generation.

use crate::platform::OsGeneration;
use crate::process::normalize_process_name;

const CORE_WINDOW_CLASS: &str = "Windows.UI.Core.CoreWindow";
const APP_FRAME_CLASS: &str = "ApplicationFrameWindow";

const MODERN_PROCESSES: &[&str] = &["explorer", "shellexperiencehost", "dwm"];
const LEGACY_PROCESSES: &[&str] = &["shellexperiencehost"];

const CLASS_FRAGMENTS: &[&str] = &["NotificationWindow", "ToastWindow"];

/// Lowercase title fragments. The last entry is the Chinese word for
/// "notification", for the secondary UI language.
const TITLE_KEYWORDS: &[&str] = &["notification", "toast", "通知"];

const NEW_NOTIFICATION_TITLE: &str = "new notification";

/// Classification rules for one OS generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationPolicy {
    /// Windows 10: toasts are CoreWindows owned by ShellExperienceHost.
    Legacy,
    /// Windows 11: toasts may be hosted by explorer, ShellExperienceHost
    /// or dwm, in several window classes.
    Modern,
}

impl ClassificationPolicy {
    pub fn for_generation(generation: OsGeneration) -> Self {
        match generation {
            OsGeneration::Legacy => Self::Legacy,
            OsGeneration::Modern => Self::Modern,
        }
    }

    /// Whether the owning process may host notification popups.
    pub fn allows_process(&self, process_name: &str) -> bool {
        let name = normalize_process_name(process_name);
        let allowed = match self {
            Self::Legacy => LEGACY_PROCESSES,
            Self::Modern => MODERN_PROCESSES,
        };
        allowed.contains(&name.as_str())
    }

    /// Whether the window class is one notification popups use.
    pub fn allows_class(&self, class: &str) -> bool {
        match self {
            Self::Legacy => class == CORE_WINDOW_CLASS,
            Self::Modern => {
                class == CORE_WINDOW_CLASS
                    || class == APP_FRAME_CLASS
                    || CLASS_FRAGMENTS.iter().any(|f| class.contains(f))
            }
        }
    }

    /// Whether the title looks like a notification popup's.
    ///
    /// Toast windows usually have an empty title or a generic one such
    /// as "New notification".
    pub fn is_notification_title(&self, title: &str) -> bool {
        if title.is_empty() {
            return true;
        }
        let lower = title.to_lowercase();
        lower == NEW_NOTIFICATION_TITLE || TITLE_KEYWORDS.iter().any(|k| lower.contains(k))
    }

    /// Runs all three gates.
    pub fn is_notification(&self, process_name: &str, class: &str, title: &str) -> bool {
        self.allows_process(process_name)
            && self.allows_class(class)
            && self.is_notification_title(title)
    }
}

impl std::fmt::Display for ClassificationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Modern => write!(f, "modern"),
        }
    }
}
