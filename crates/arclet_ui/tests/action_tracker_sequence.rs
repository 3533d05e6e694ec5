//! End-to-end action tracker sequences against the frame scheduler

use arclet_animation::AnimationScheduler;
use arclet_ui::prelude::*;
use arclet_ui::ActionTrackerChanges;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

struct Rig {
    scheduler: AnimationScheduler,
    tracker: ActionTracker,
    spinner: ProgressSpinner,
    checkmark: Checkmark,
    log: Rc<RefCell<Vec<String>>>,
}

fn rig(defaults: &ComponentDefaults) -> Rig {
    let scheduler = AnimationScheduler::new();
    let tracker = ActionTracker::mount(Rc::new(scheduler.handle()), defaults);
    let spinner = tracker.spinner().expect("mounted spinner");
    let checkmark = tracker.checkmark().expect("mounted checkmark");
    let log = Rc::new(RefCell::new(Vec::new()));

    let l = log.clone();
    spinner
        .animation_done()
        .subscribe(move |e| l.borrow_mut().push(format!("spinner:{}", e.mode)));
    let l = log.clone();
    checkmark
        .animation_done()
        .subscribe(move |_| l.borrow_mut().push("checkmark".to_string()));
    let l = log.clone();
    tracker
        .animation_done()
        .subscribe(move |_| l.borrow_mut().push("tracker".to_string()));

    Rig {
        scheduler,
        tracker,
        spinner,
        checkmark,
        log,
    }
}

fn count(log: &[String], entry: &str) -> usize {
    log.iter().filter(|e| *e == entry).count()
}

#[test]
fn test_mounted_widgets_wait_for_start() {
    let r = rig(&ComponentDefaults::default());

    assert!(!r.spinner.is_playing());
    assert!(!r.checkmark.is_playing());
    assert_eq!(r.checkmark.dash_offset(), -r.checkmark.config().dash_array());
    assert_eq!(r.tracker.state(), ActionTrackerState::Idle);
}

#[test]
fn test_full_sequence() {
    let r = rig(&ComponentDefaults::default());
    r.tracker.start().unwrap();
    assert!(r.spinner.is_playing());

    r.scheduler.advance(ms(1000));
    r.scheduler.advance(ms(1000));
    assert_eq!(r.tracker.state(), ActionTrackerState::Playing);
    assert!(r.log.borrow().is_empty());

    // Finishing mid-cycle lets the cycle complete first
    r.scheduler.advance(ms(500));
    r.tracker.finish().unwrap();
    assert_eq!(r.tracker.state(), ActionTrackerState::Finishing);

    r.scheduler.advance(ms(499));
    assert!(!r.checkmark.is_playing());
    assert!(r.log.borrow().is_empty());

    r.scheduler.advance(ms(1));
    assert_eq!(*r.log.borrow(), vec!["spinner:indeterminate"]);
    assert!(r.checkmark.is_playing());
    assert!(r.spinner.is_playing());

    let config = r.spinner.config();
    assert_eq!(config.mode, ProgressSpinnerMode::Determinate);
    assert_eq!(config.stroke, "green");
    assert_eq!(config.value, 100.0);

    r.scheduler.advance(ms(225));
    let log = r.log.borrow();
    assert_eq!(log.len(), 4);
    assert_eq!(count(&log, "spinner:determinate"), 1);
    assert_eq!(count(&log, "checkmark"), 1);
    assert_eq!(count(&log, "tracker"), 1);

    assert_eq!(r.tracker.state(), ActionTrackerState::Idle);
    assert_eq!(r.spinner.dash_offset(), 0.0);
    assert_eq!(r.checkmark.dash_offset(), 0.0);
    assert!(!r.scheduler.has_active_animations());
}

#[test]
fn test_guards_during_sequence() {
    let r = rig(&ComponentDefaults::default());
    assert_eq!(r.tracker.finish(), Err(ActionTrackerError::NotStarted));

    r.tracker.start().unwrap();
    assert_eq!(r.tracker.start(), Err(ActionTrackerError::AlreadyRunning));

    r.tracker.finish().unwrap();
    assert_eq!(r.tracker.finish(), Err(ActionTrackerError::AlreadyFinishing));
    assert_eq!(r.tracker.start(), Err(ActionTrackerError::AlreadyRunning));
}

#[test]
fn test_reset_abandons_sequence_and_allows_restart() {
    let r = rig(&ComponentDefaults::default());
    r.tracker.start().unwrap();
    r.tracker.finish().unwrap();
    r.scheduler.advance(ms(1000));
    assert!(r.checkmark.is_playing());

    r.tracker.reset();
    assert_eq!(r.tracker.state(), ActionTrackerState::Idle);
    assert!(!r.spinner.is_playing());
    assert!(!r.checkmark.is_playing());
    assert_eq!(r.checkmark.dash_offset(), -r.checkmark.config().dash_array());

    let config = r.spinner.config();
    assert_eq!(config.mode, ProgressSpinnerMode::Indeterminate);
    assert_eq!(config.stroke, "#7DB0D5");
    assert_eq!(config.value, 0.0);
    assert_eq!(r.spinner.dash_offset(), config.stroke_circumference());

    r.scheduler.advance(ms(1000));
    assert_eq!(count(&r.log.borrow(), "tracker"), 0);

    // A fresh sequence runs to completion
    r.tracker.start().unwrap();
    r.scheduler.advance(ms(1000));
    assert!(r.spinner.is_playing());
    r.tracker.finish().unwrap();
    while r.scheduler.has_active_animations() {
        r.scheduler.advance(ms(16));
    }
    assert_eq!(count(&r.log.borrow(), "tracker"), 1);
    assert_eq!(r.tracker.state(), ActionTrackerState::Idle);
}

#[test]
fn test_back_to_back_sequences_without_reset() {
    let r = rig(&ComponentDefaults::default());

    for run in 1..=2 {
        r.tracker.start().unwrap();
        let config = r.spinner.config();
        assert_eq!(config.mode, ProgressSpinnerMode::Indeterminate);
        assert_eq!(config.stroke, "#7DB0D5");
        assert!(r.spinner.is_playing());
        assert!(!r.checkmark.is_playing());
        assert_eq!(r.checkmark.dash_offset(), -r.checkmark.config().dash_array());

        r.scheduler.advance(ms(3200));
        r.tracker.finish().unwrap();
        for _ in 0..1000 {
            if !r.scheduler.has_active_animations() {
                break;
            }
            r.scheduler.advance(ms(16));
        }

        assert_eq!(r.tracker.state(), ActionTrackerState::Idle);
        assert_eq!(count(&r.log.borrow(), "tracker"), run);
        assert_eq!(count(&r.log.borrow(), "checkmark"), run);
        assert_eq!(r.spinner.config().mode, ProgressSpinnerMode::Determinate);
    }
}

#[test]
fn test_defaults_flow_into_sub_widgets() {
    let defaults = ComponentDefaults::from_toml_str(
        r#"
        [action_tracker]
        circle_diameter = 24.0
        circle_stroke_width = 3.0
        stroke_success = "teal"

        [progress_spinner]
        diameter = 40.0
        indeterminate_timing = "500ms linear"

        [checkmark]
        timing = "100ms linear"
        "#,
    )
    .unwrap();
    let r = rig(&defaults);

    let spinner = r.spinner.config();
    assert_eq!(spinner.diameter, 24.0);
    assert_eq!(spinner.stroke_width, 3.0);
    assert_eq!(spinner.indeterminate_timing.duration, ms(500));
    assert!(!spinner.play_on_init);

    let checkmark = r.checkmark.config();
    assert_eq!(checkmark.container_size, 10.82);
    assert_eq!(checkmark.stroke, "teal");
    assert_eq!(checkmark.stroke_width, 2.0);

    r.tracker.start().unwrap();
    r.tracker.finish().unwrap();
    r.scheduler.advance(ms(500));
    assert_eq!(r.spinner.config().stroke, "teal");

    r.scheduler.advance(ms(100));
    assert_eq!(count(&r.log.borrow(), "checkmark"), 1);
    assert_eq!(count(&r.log.borrow(), "tracker"), 0);

    r.scheduler.advance(ms(125));
    assert_eq!(count(&r.log.borrow(), "tracker"), 1);
}

#[test]
fn test_input_changes_reach_sub_widgets() {
    let r = rig(&ComponentDefaults::default());
    r.tracker.on_inputs_changed(ActionTrackerChanges {
        circle_diameter: Some(24.0),
        stroke_success: Some("lime".into()),
        ..Default::default()
    });

    assert_eq!(r.tracker.config().checkmark_container_size(), 12.02);
    assert_eq!(r.spinner.config().diameter, 24.0);
    assert_eq!(r.checkmark.config().container_size, 12.02);
    assert_eq!(r.checkmark.config().stroke, "lime");
}

#[test]
fn test_dispose_releases_everything() {
    let r = rig(&ComponentDefaults::default());
    r.tracker.start().unwrap();
    r.tracker.finish().unwrap();
    r.tracker.dispose();

    assert_eq!(r.scheduler.player_count(), 0);
    assert!(r.spinner.animation_done().is_stopped());
    assert!(r.checkmark.animation_done().is_stopped());
    assert!(r.tracker.animation_done().is_stopped());

    r.scheduler.advance(ms(2000));
    assert!(r.log.borrow().is_empty());
}
