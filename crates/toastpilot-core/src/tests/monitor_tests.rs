use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::*;
use crate::fake::{FakeEvents, FakePlatform, monitor_info};

fn manager(platform: FakePlatform) -> (Arc<MonitorManager>, Arc<FakePlatform>, Arc<FakeEvents>) {
    let platform = Arc::new(platform);
    let events = Arc::new(FakeEvents::new());
    let manager = Arc::new(MonitorManager::new(platform.clone(), events.clone()));
    manager.refresh();
    (manager, platform, events)
}

#[test]
fn indices_follow_enumeration_order() {
    // Arrange
    let platform = FakePlatform::new();
    platform.set_monitors(vec![
        monitor_info(30, Rect::from_edges(1920, 0, 3840, 1080), false),
        monitor_info(10, Rect::from_edges(0, 0, 1920, 1080), true),
        monitor_info(20, Rect::from_edges(-1280, 0, 0, 1024), false),
    ]);

    // Act
    let (manager, _, _) = manager(platform);
    let monitors = manager.all_monitors();

    // Assert
    let indices: Vec<usize> = monitors.iter().map(|m| m.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(monitors[0].handle, 30);
    assert_eq!(monitors.iter().filter(|m| m.primary).count(), 1);
    assert_eq!(manager.primary().map(|m| m.handle), Some(10));
}

#[test]
fn duplicate_primary_flags_keep_only_the_first() {
    let platform = FakePlatform::new();
    platform.set_monitors(vec![
        monitor_info(1, Rect::from_edges(0, 0, 1920, 1080), true),
        monitor_info(2, Rect::from_edges(1920, 0, 3840, 1080), true),
    ]);

    let (manager, _, _) = manager(platform);

    let flagged: Vec<usize> = manager
        .all_monitors()
        .iter()
        .filter(|m| m.primary)
        .map(|m| m.index)
        .collect();
    assert_eq!(flagged, vec![0]);
}

#[test]
fn first_monitor_is_primary_when_none_flagged() {
    let platform = FakePlatform::new();
    platform.set_monitors(vec![
        monitor_info(7, Rect::from_edges(0, 0, 1920, 1080), false),
        monitor_info(8, Rect::from_edges(1920, 0, 3840, 1080), false),
    ]);

    let (manager, _, _) = manager(platform);

    assert_eq!(manager.primary().map(|m| m.handle), Some(7));
}

#[test]
fn by_index_is_bounds_checked() {
    let (manager, _, _) = manager(FakePlatform::with_two_monitors());

    assert_eq!(manager.by_index(1).map(|m| m.handle), Some(2));
    assert_eq!(manager.by_index(2), None);
}

#[test]
fn containment_uses_center_point() {
    // Arrange
    let (manager, _, _) = manager(FakePlatform::with_two_monitors());
    // Straddles the shared edge, centered at x = 1930.
    let straddling = Rect::new(1000, 100, 1860, 400);

    // Act
    let monitor = manager.monitor_containing(&straddling);

    // Assert
    assert_eq!(monitor.map(|m| m.index), Some(1));
}

#[test]
fn moving_within_a_monitor_keeps_the_same_result() {
    let (manager, _, _) = manager(FakePlatform::with_two_monitors());

    for x in [1920, 2200, 3000, 3500] {
        let rect = Rect::new(x, 300, 300, 200);
        assert_eq!(manager.monitor_containing(&rect).map(|m| m.index), Some(1));
    }
}

#[test]
fn point_outside_all_monitors_falls_back_to_primary() {
    let (manager, _, _) = manager(FakePlatform::with_two_monitors());

    assert_eq!(manager.monitor_from_point(5000, 5000).map(|m| m.index), Some(0));
    assert_eq!(manager.monitor_from_point(2500, 500).map(|m| m.index), Some(1));
}

#[test]
fn enumeration_failure_yields_no_monitor() {
    // Arrange
    let platform = FakePlatform::with_two_monitors();
    platform.fail_enumeration();

    // Act
    let (manager, _, _) = manager(platform);

    // Assert
    assert!(manager.all_monitors().is_empty());
    assert_eq!(manager.primary(), None);
    assert_eq!(manager.monitor_from_point(10, 10), None);
    assert_eq!(manager.monitor_containing(&Rect::new(0, 0, 10, 10)), None);
}

#[test]
fn refresh_emits_changed_with_new_list() {
    // Arrange
    let (manager, _, _) = manager(FakePlatform::with_two_monitors());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    manager.changed.subscribe(move |list: &Vec<Monitor>| {
        s.lock().unwrap().push(list.len());
    });

    // Act
    manager.refresh();

    // Assert
    assert_eq!(*seen.lock().unwrap(), vec![2]);
}

#[test]
fn display_change_triggers_refresh_while_watching() {
    // Arrange
    let (manager, platform, events) = manager(FakePlatform::with_two_monitors());
    let refreshes = Arc::new(AtomicUsize::new(0));
    let r = refreshes.clone();
    manager.changed.subscribe(move |_| {
        r.fetch_add(1, Ordering::Relaxed);
    });
    assert!(manager.start_watching());
    assert!(manager.start_watching());
    assert_eq!(events.display_sink_count(), 1);

    // Act: unplug the second monitor.
    platform.set_monitors(vec![monitor_info(
        1,
        Rect::from_edges(0, 0, 1920, 1080),
        true,
    )]);
    events.display_changed();

    // Assert
    assert_eq!(refreshes.load(Ordering::Relaxed), 1);
    assert_eq!(manager.all_monitors().len(), 1);

    // Act: after stop, changes are ignored.
    manager.stop_watching();
    manager.stop_watching();
    events.display_changed();

    // Assert
    assert_eq!(refreshes.load(Ordering::Relaxed), 1);
    assert!(!manager.is_watching());
}
