//! Action Tracker Demo
//!
//! Runs one full "working... done" sequence against a simulated 60fps
//! frame clock and logs every transition.
//!
//! Run with: cargo run -p arclet_ui --example action_tracker_demo [-- path/to/arclet.toml]
//!
//! `ARCLET_SPIN_TIMING` (e.g. `"600ms ease-in-out"`) overrides the spin timing.

use anyhow::{Context, Result};
use arclet_animation::AnimationScheduler;
use arclet_ui::options::parse_timing;
use arclet_ui::prelude::*;
use arclet_ui::SpinnerSvgBuilder;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let mut defaults = match std::env::args().nth(1) {
        Some(path) => ComponentDefaults::load(&path)
            .with_context(|| format!("Failed to load component defaults from {path}"))?,
        None => ComponentDefaults::default(),
    };

    if let Ok(value) = std::env::var("ARCLET_SPIN_TIMING") {
        let timing = parse_timing(&value).context("Invalid ARCLET_SPIN_TIMING")?;
        defaults
            .progress_spinner
            .get_or_insert_with(Default::default)
            .indeterminate_timing = Some(timing);
    }

    let scheduler = AnimationScheduler::new();
    let tracker = ActionTracker::mount(Rc::new(scheduler.handle()), &defaults);

    let config = tracker.config();
    tracing::info!(
        diameter = config.circle_diameter,
        circumference = SpinnerSvgBuilder::circumference(config.circle_diameter, config.circle_stroke_width),
        checkmark_container = config.checkmark_container_size(),
        "tracker mounted"
    );

    let finished = Rc::new(Cell::new(false));
    let finished_clone = finished.clone();
    tracker
        .animation_done()
        .once(move |_| finished_clone.set(true));

    tracker.start()?;

    // Pretend the tracked action takes 1.5s
    let mut elapsed = Duration::ZERO;
    while elapsed < Duration::from_millis(1500) {
        scheduler.advance(FRAME);
        elapsed += FRAME;
    }

    tracker.finish()?;
    if let Err(err) = tracker.finish() {
        tracing::info!(%err, "second finish rejected");
    }

    let mut frames = 0;
    while scheduler.has_active_animations() {
        scheduler.advance(FRAME);
        frames += 1;
    }

    if let Some(checkmark) = tracker.checkmark() {
        tracing::info!(points = %checkmark.config().points(), "checkmark drawn");
    }
    tracing::info!(
        frames,
        done = finished.get(),
        state = %tracker.state(),
        "sequence finished"
    );

    tracker.dispose();
    Ok(())
}
