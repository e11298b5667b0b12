use std::sync::atomic::AtomicUsize;

use super::*;
use crate::Rect;
use crate::clock::ManualClock;
use crate::event::{
    EVENT_OBJECT_CREATE, EVENT_OBJECT_LOCATIONCHANGE, EVENT_OBJECT_SHOW, OBJID_WINDOW,
};
use crate::fake::{FakeEvents, FakePlatform, TOAST_CLASS};
use crate::process::CacheTimings;

const SHELL_PID: u32 = 4;
const CHAT_PID: u32 = 100;
const TOAST: usize = 0x7000;
const CHAT_WINDOW: usize = 0xA;

struct Fixture {
    platform: Arc<FakePlatform>,
    events: Arc<FakeEvents>,
    engine: WindowHookEngine,
    tracker: Arc<WindowTracker>,
    received: Arc<Signal<NotificationRequest>>,
}

fn fixture() -> Fixture {
    fixture_with(ClassificationPolicy::Modern)
}

fn fixture_with(policy: ClassificationPolicy) -> Fixture {
    let platform = Arc::new(FakePlatform::with_two_monitors());
    platform.add_process(SHELL_PID, "ShellExperienceHost.exe");
    platform.add_process(CHAT_PID, "chat.exe");
    let events = Arc::new(FakeEvents::new());
    let clock = Arc::new(ManualClock::new());
    let monitors = Arc::new(MonitorManager::new(platform.clone(), events.clone()));
    monitors.refresh();
    let processes = Arc::new(ProcessNameCache::new(CacheTimings::default(), clock.clone()));
    let tracker = Arc::new(WindowTracker::new(
        platform.clone(),
        monitors.clone(),
        processes.clone(),
        clock.clone(),
        Duration::from_millis(500),
    ));
    let received = Arc::new(Signal::new());
    let engine = WindowHookEngine::new(
        platform.clone(),
        events.clone(),
        monitors,
        tracker.clone(),
        processes,
        clock,
        HookSettings {
            policy,
            margin: DEFAULT_MARGIN,
            stats_interval: Duration::from_secs(60),
        },
        received.clone(),
    );
    Fixture {
        platform,
        events,
        engine,
        tracker,
        received,
    }
}

/// A toast on monitor 0 and the focused chat window on monitor 1.
fn toast_on_primary_chat_on_secondary(f: &Fixture) {
    f.platform.add_window_with_class(
        TOAST,
        SHELL_PID,
        Rect::from_edges(100, 900, 400, 1000),
        "New notification",
        TOAST_CLASS,
    );
    f.platform
        .add_window(CHAT_WINDOW, CHAT_PID, Rect::new(2300, 300, 400, 400), "Chat");
    f.platform.set_foreground(Some(CHAT_WINDOW));
}

fn raw(code: u32, hwnd: usize, id_object: i32) -> RawEvent {
    RawEvent {
        code,
        hwnd,
        id_object,
        thread_id: 1,
    }
}

#[test]
fn toast_is_moved_to_foreground_monitor() {
    // Arrange
    let f = fixture();
    toast_on_primary_chat_on_secondary(&f);
    assert!(f.engine.start());

    // Act
    f.events.show(TOAST);

    // Assert
    assert_eq!(*f.platform.moves.lock().unwrap(), vec![(TOAST, 3524, 964)]);
    assert_eq!(f.engine.stats().moves, 1);
}

#[test]
fn toast_already_on_target_is_not_moved() {
    // Arrange
    let f = fixture();
    toast_on_primary_chat_on_secondary(&f);
    f.platform.set_rect(TOAST, Rect::new(3524, 964, 300, 100));
    f.engine.start();

    // Act
    f.events.show(TOAST);
    f.events.fire(raw(EVENT_OBJECT_LOCATIONCHANGE, TOAST, OBJID_WINDOW));

    // Assert
    assert_eq!(f.platform.move_count(), 0);
    assert_eq!(f.engine.stats().skipped, 2);
}

#[test]
fn follow_up_location_events_do_not_move_again() {
    let f = fixture();
    toast_on_primary_chat_on_secondary(&f);
    f.engine.start();

    f.events.show(TOAST);
    for _ in 0..5 {
        f.events
            .fire(raw(EVENT_OBJECT_LOCATIONCHANGE, TOAST, OBJID_WINDOW));
    }

    assert_eq!(f.platform.move_count(), 1);
}

#[test]
fn no_foreground_window_leaves_toast_in_place() {
    let f = fixture();
    toast_on_primary_chat_on_secondary(&f);
    f.platform.set_foreground(None);

    let outcome = f.engine.handle_event(raw(EVENT_OBJECT_SHOW, TOAST, OBJID_WINDOW));

    // Not started yet: nothing happens at all.
    assert_eq!(outcome, EventOutcome::Inactive);

    f.engine.start();
    let outcome = f.engine.handle_event(raw(EVENT_OBJECT_SHOW, TOAST, OBJID_WINDOW));
    assert_eq!(outcome, EventOutcome::Stayed);
    assert_eq!(f.platform.move_count(), 0);
}

#[test]
fn structural_and_type_filters_run_first() {
    // Arrange
    let f = fixture();
    toast_on_primary_chat_on_secondary(&f);
    f.engine.start();
    let lookups_before = f.platform.process_lookups.load(Ordering::Relaxed);

    // Act
    let child = f.engine.handle_event(raw(EVENT_OBJECT_SHOW, TOAST, -4));
    let null = f.engine.handle_event(raw(EVENT_OBJECT_SHOW, 0, OBJID_WINDOW));
    let hide = f.engine.handle_event(raw(0x8003, TOAST, OBJID_WINDOW));

    // Assert
    assert_eq!(child, EventOutcome::Filtered);
    assert_eq!(null, EventOutcome::Filtered);
    assert_eq!(hide, EventOutcome::Filtered);
    assert_eq!(
        f.platform.process_lookups.load(Ordering::Relaxed),
        lookups_before
    );
    let stats = f.engine.stats();
    assert_eq!(stats.seen, 3);
    assert_eq!(stats.filtered, 3);
    assert_eq!(stats.processed, 0);
}

#[test]
fn non_shell_windows_are_not_notifications() {
    let f = fixture();
    toast_on_primary_chat_on_secondary(&f);
    f.engine.start();

    let outcome = f
        .engine
        .handle_event(raw(EVENT_OBJECT_SHOW, CHAT_WINDOW, OBJID_WINDOW));

    assert_eq!(outcome, EventOutcome::NotNotification);
}

#[test]
fn legacy_policy_rejects_explorer_hosted_toasts() {
    // Arrange
    let f = fixture_with(ClassificationPolicy::Legacy);
    f.platform.add_process(5, "explorer.exe");
    f.platform.add_window_with_class(
        TOAST,
        5,
        Rect::from_edges(100, 900, 400, 1000),
        "",
        TOAST_CLASS,
    );
    f.platform
        .add_window(CHAT_WINDOW, CHAT_PID, Rect::new(2300, 300, 400, 400), "Chat");
    f.platform.set_foreground(Some(CHAT_WINDOW));
    f.engine.start();

    // Act
    let outcome = f.engine.handle_event(raw(EVENT_OBJECT_SHOW, TOAST, OBJID_WINDOW));

    // Assert
    assert_eq!(outcome, EventOutcome::NotNotification);
}

#[test]
fn process_names_are_cached_across_events() {
    let f = fixture();
    toast_on_primary_chat_on_secondary(&f);
    f.engine.start();

    for _ in 0..10 {
        f.events
            .fire(raw(EVENT_OBJECT_LOCATIONCHANGE, TOAST, OBJID_WINDOW));
    }

    let stats = f.engine.stats();
    assert!(stats.cache.hits >= 9);
    // One lookup for the shell, one for the chat process.
    assert_eq!(f.platform.process_lookups.load(Ordering::Relaxed), 2);
}

#[test]
fn platform_errors_are_absorbed() {
    // Arrange
    let f = fixture();
    toast_on_primary_chat_on_secondary(&f);
    f.platform.fail_moves.store(true, Ordering::Relaxed);
    f.engine.start();

    // Act
    let failed = f.engine.handle_event(raw(EVENT_OBJECT_SHOW, TOAST, OBJID_WINDOW));
    // The window vanished between the event and our queries.
    let vanished = f.engine.handle_event(raw(EVENT_OBJECT_SHOW, 0xDEAD, OBJID_WINDOW));

    // Assert
    assert_eq!(failed, EventOutcome::Failed);
    assert_eq!(vanished, EventOutcome::Failed);
    assert_eq!(f.engine.state(), HookState::Active);
    assert_eq!(f.engine.stats().failures, 2);

    // The hook keeps working for later events.
    f.platform.fail_moves.store(false, Ordering::Relaxed);
    f.events.show(TOAST);
    assert_eq!(f.platform.move_count(), 1);
}

#[test]
fn start_is_idempotent() {
    let f = fixture();

    assert!(f.engine.start());
    assert!(f.engine.start());

    assert_eq!(f.engine.state(), HookState::Active);
    assert_eq!(f.events.installs.load(Ordering::Relaxed), 1);
    assert_eq!(f.events.window_sink_count(), 1);
}

#[test]
fn failed_registration_leaves_engine_stopped() {
    // Arrange
    let f = fixture();
    f.events.fail_subscribe.store(true, Ordering::Relaxed);

    // Act / Assert
    assert!(!f.engine.start());
    assert_eq!(f.engine.state(), HookState::Stopped);

    // The caller may retry once the platform recovers.
    f.events.fail_subscribe.store(false, Ordering::Relaxed);
    assert!(f.engine.start());
    assert_eq!(f.engine.state(), HookState::Active);
}

#[test]
fn stop_is_repeatable_and_terminal() {
    // Arrange
    let f = fixture();
    toast_on_primary_chat_on_secondary(&f);
    f.engine.start();

    // Act
    f.engine.stop();
    f.engine.stop();
    f.events.show(TOAST);
    let direct = f.engine.handle_event(raw(EVENT_OBJECT_SHOW, TOAST, OBJID_WINDOW));

    // Assert
    assert_eq!(f.engine.state(), HookState::Stopped);
    assert_eq!(f.events.window_sink_count(), 0);
    assert_eq!(direct, EventOutcome::Inactive);
    assert_eq!(f.platform.move_count(), 0);
}

#[test]
fn received_fires_once_per_popup_appearance() {
    // Arrange
    let f = fixture();
    toast_on_primary_chat_on_secondary(&f);
    let count = Arc::new(AtomicUsize::new(0));
    let targets = Arc::new(Mutex::new(Vec::new()));
    let c = count.clone();
    let t = targets.clone();
    f.received.subscribe(move |r: &NotificationRequest| {
        c.fetch_add(1, Ordering::Relaxed);
        t.lock().unwrap().push(r.target().map(|m| m.index));
    });
    f.engine.start();

    // Act
    f.events.fire(raw(EVENT_OBJECT_CREATE, TOAST, OBJID_WINDOW));
    f.events.show(TOAST);
    f.events
        .fire(raw(EVENT_OBJECT_LOCATIONCHANGE, TOAST, OBJID_WINDOW));

    // Assert
    assert_eq!(count.load(Ordering::Relaxed), 1);
    assert_eq!(*targets.lock().unwrap(), vec![Some(1)]);
}

#[test]
fn hook_events_race_tracker_polling() {
    // Arrange
    let f = fixture();
    toast_on_primary_chat_on_secondary(&f);
    f.engine.start();
    f.tracker.poll_once();
    let engine = Arc::new(f.engine);

    // Act: the hook thread fires while the poll thread tracks the chat
    // window hopping between monitors.
    let hook_thread = {
        let engine = engine.clone();
        std::thread::spawn(move || {
            for _ in 0..200 {
                let outcome = engine.handle_event(raw(EVENT_OBJECT_SHOW, TOAST, OBJID_WINDOW));
                assert_ne!(outcome, EventOutcome::Failed);
            }
        })
    };
    let poll_thread = {
        let platform = f.platform.clone();
        let tracker = f.tracker.clone();
        std::thread::spawn(move || {
            for i in 0..200 {
                let x = if i % 2 == 0 { 100 } else { 2300 };
                platform.set_rect(CHAT_WINDOW, Rect::new(x, 300, 400, 400));
                tracker.poll_once();
            }
        })
    };
    hook_thread.join().unwrap();
    poll_thread.join().unwrap();

    // Settle on the secondary monitor and send one more popup.
    f.platform
        .set_rect(CHAT_WINDOW, Rect::new(2300, 300, 400, 400));
    f.tracker.poll_once();
    f.platform
        .set_rect(TOAST, Rect::from_edges(100, 900, 400, 1000));
    let last = engine.handle_event(raw(EVENT_OBJECT_SHOW, TOAST, OBJID_WINDOW));

    // Assert
    let stats = engine.stats();
    assert_eq!(stats.notifications, 201);
    assert_eq!(stats.failures, 0);
    assert_eq!(last, EventOutcome::Moved);
    assert_eq!(f.platform.moves.lock().unwrap().last(), Some(&(TOAST, 3524, 964)));
    let chat = f
        .tracker
        .all_tracked_windows()
        .into_iter()
        .find(|w| w.hwnd == CHAT_WINDOW)
        .and_then(|w| w.monitor);
    assert_eq!(chat.map(|m| m.index), Some(1));
}
