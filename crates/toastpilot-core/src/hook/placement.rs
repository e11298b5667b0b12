use crate::Rect;
use crate::monitor::Monitor;

/// Gap between a popup and the work-area corner, matching the inset
/// Windows itself uses for toasts.
pub const DEFAULT_MARGIN: i32 = 16;

/// What to do with a notification popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Leave the popup where it is.
    Stay,
    /// Move the popup's top-left corner here, keeping its size.
    MoveTo { x: i32, y: i32 },
}

/// Top-left position that anchors a popup of this size to the
/// bottom-right corner of the monitor's work area.
pub fn bottom_right(rect: &Rect, target: &Monitor, margin: i32) -> (i32, i32) {
    let work = &target.work_area;
    (
        work.right() - rect.width - margin,
        work.bottom() - rect.height - margin,
    )
}

/// Decides where a popup currently at `rect` should go.
///
/// Returns [`Placement::Stay`] when the popup is already on the target
/// monitor or the target is unknown.
pub fn plan(
    rect: &Rect,
    current: Option<&Monitor>,
    target: Option<&Monitor>,
    margin: i32,
) -> Placement {
    let Some(target) = target else {
        return Placement::Stay;
    };
    if current.is_some_and(|c| c.handle == target.handle) {
        return Placement::Stay;
    }
    let (x, y) = bottom_right(rect, target, margin);
    Placement::MoveTo { x, y }
}
