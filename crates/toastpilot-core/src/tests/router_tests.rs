use std::time::Duration;

use super::*;
use crate::Rect;
use crate::clock::ManualClock;
use crate::fake::{FakeEvents, FakePlatform};
use crate::process::{CacheTimings, ProcessNameCache};
use crate::tracker::TrackedWindow;

struct Fixture {
    platform: Arc<FakePlatform>,
    monitors: Arc<MonitorManager>,
    router: NotificationRouter,
}

fn fixture() -> Fixture {
    fixture_with(FakePlatform::with_two_monitors())
}

fn fixture_with(platform: FakePlatform) -> Fixture {
    let platform = Arc::new(platform);
    let clock = Arc::new(ManualClock::new());
    let monitors = Arc::new(MonitorManager::new(
        platform.clone(),
        Arc::new(FakeEvents::new()),
    ));
    monitors.refresh();
    let processes = Arc::new(ProcessNameCache::new(CacheTimings::default(), clock.clone()));
    let tracker = Arc::new(WindowTracker::new(
        platform.clone(),
        monitors.clone(),
        processes,
        clock,
        Duration::from_millis(500),
    ));
    let router = NotificationRouter::new(monitors.clone(), tracker);
    Fixture {
        platform,
        monitors,
        router,
    }
}

fn monitor(f: &Fixture, index: usize) -> Monitor {
    f.monitors.by_index(index).unwrap()
}

fn request_from(process: &str) -> NotificationRequest {
    NotificationRequest::new("New message", "hello").with_process_name(process)
}

#[test]
fn live_window_wins_over_stale_mapping_and_is_learned() {
    // Arrange
    let f = fixture();
    f.platform.add_process(100, "chat.exe");
    f.platform.add_window(0xA, 100, Rect::new(2300, 300, 400, 400), "Chat");
    f.router.set_app_monitor("chat", monitor(&f, 0));
    let mut request = request_from("chat");

    // Act
    let source = f.router.route(&mut request).unwrap();

    // Assert
    assert_eq!(source, RouteSource::LiveWindow);
    assert_eq!(request.target().map(|m| m.index), Some(1));
    assert_eq!(f.router.app_monitor("chat").map(|m| m.index), Some(1));
}

#[test]
fn learned_mapping_used_without_live_window() {
    let f = fixture();
    f.router.set_app_monitor("Chat.exe", monitor(&f, 1));
    let mut request = request_from("chat");

    let source = f.router.route(&mut request).unwrap();

    assert_eq!(source, RouteSource::LearnedMapping);
    assert_eq!(request.target().map(|m| m.index), Some(1));
}

#[test]
fn active_window_used_when_process_unknown() {
    // Arrange
    let f = fixture();
    f.platform.add_process(200, "editor.exe");
    f.platform.add_window(0xB, 200, Rect::new(2300, 300, 400, 400), "Editor");
    f.platform.set_foreground(Some(0xB));
    let mut request = request_from("chat");

    // Act
    let source = f.router.route(&mut request).unwrap();

    // Assert
    assert_eq!(source, RouteSource::ActiveWindow);
    assert_eq!(request.target().map(|m| m.index), Some(1));
}

#[test]
fn cleared_mapping_falls_through_to_primary() {
    // Arrange
    let f = fixture();
    f.router.set_app_monitor("chat", monitor(&f, 1));
    assert!(f.router.clear_app_monitor("chat"));
    let mut request = request_from("chat");

    // Act
    let source = f.router.route(&mut request).unwrap();

    // Assert
    assert_eq!(source, RouteSource::Primary);
    assert_eq!(request.target().map(|m| m.index), Some(0));
    assert!(!f.router.clear_app_monitor("chat"));
}

#[test]
fn pre_assigned_target_is_kept() {
    let f = fixture();
    f.platform.add_process(100, "chat.exe");
    f.platform.add_window(0xA, 100, Rect::new(2300, 300, 400, 400), "Chat");
    let mut request = request_from("chat").with_target(monitor(&f, 0));

    let source = f.router.route(&mut request).unwrap();

    assert_eq!(source, RouteSource::PreAssigned);
    assert_eq!(request.target().map(|m| m.index), Some(0));
    // Nothing learned: the live window was never consulted.
    assert_eq!(f.router.app_monitor("chat"), None);
}

#[test]
fn routing_without_monitors_fails() {
    let platform = FakePlatform::new();
    platform.fail_enumeration();
    let f = fixture_with(platform);
    let mut request = request_from("chat");

    assert!(f.router.route(&mut request).is_err());
    assert_eq!(request.target(), None);
}

#[test]
fn routed_signal_carries_resolved_request() {
    // Arrange
    let f = fixture();
    let routed = Arc::new(Mutex::new(Vec::new()));
    let sink = routed.clone();
    f.router.routed.subscribe(move |r: &NotificationRequest| {
        sink.lock().unwrap().push(r.target().map(|m| m.index));
    });

    // Act
    f.router.route(&mut request_from("chat")).unwrap();

    // Assert
    assert_eq!(*routed.lock().unwrap(), vec![Some(0)]);
}

#[test]
fn window_move_retrains_mapping() {
    // Arrange
    let f = fixture();
    f.router.set_app_monitor("chat", monitor(&f, 0));
    let moved = WindowMoved {
        window: TrackedWindow {
            hwnd: 0xA,
            title: "Chat".into(),
            process_id: 100,
            process_name: "chat.exe".into(),
            rect: Rect::new(2300, 300, 400, 400),
            monitor: Some(monitor(&f, 1)),
            last_update: std::time::Instant::now(),
        },
        from: Some(monitor(&f, 0)),
        to: monitor(&f, 1),
    };

    // Act
    f.router.learn_from_move(&moved);

    // Assert
    assert_eq!(f.router.app_monitor("chat").map(|m| m.index), Some(1));
}

#[test]
fn unknown_process_moves_are_not_learned() {
    let f = fixture();
    let moved = WindowMoved {
        window: TrackedWindow {
            hwnd: 0xA,
            title: String::new(),
            process_id: 0,
            process_name: UNKNOWN_PROCESS.into(),
            rect: Rect::new(0, 0, 10, 10),
            monitor: None,
            last_update: std::time::Instant::now(),
        },
        from: None,
        to: monitor(&f, 1),
    };

    f.router.learn_from_move(&moved);

    assert!(f.router.mappings().is_empty());
}

#[test]
fn mapping_to_unplugged_monitor_reads_as_absent() {
    // Arrange
    let f = fixture();
    f.router.set_app_monitor("chat", monitor(&f, 1));

    // Act
    f.platform.set_monitors(vec![crate::fake::monitor_info(
        1,
        Rect::from_edges(0, 0, 1920, 1080),
        true,
    )]);
    f.monitors.refresh();

    // Assert
    assert_eq!(f.router.app_monitor("chat"), None);
}

#[test]
fn clear_all_forgets_everything() {
    let f = fixture();
    f.router.set_app_monitor("chat", monitor(&f, 1));
    f.router.set_app_monitor("mail", monitor(&f, 0));
    assert_eq!(
        f.router
            .mappings()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>(),
        vec!["chat", "mail"]
    );

    f.router.clear_all();

    assert!(f.router.mappings().is_empty());
}
