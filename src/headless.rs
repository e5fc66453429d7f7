//! Headless host
//!
//! Drives a [`SimulationState`] without a browser: frames come from a
//! [`ManualClock`] and are drawn into a [`PixelSurface`].

use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::lifecycle::SimulationState;
use crate::simulation::{FrameClock, FrameOutcome};
use crate::surface::PixelSurface;
use crate::viewport::Viewport;

/// A frame clock stepped by hand
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    pending: bool,
    requests: u64,
    cancellations: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn cancellations(&self) -> u64 {
        self.cancellations
    }

    /// Consume the pending request, as a display refresh would
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl FrameClock for ManualClock {
    fn request_frame(&mut self) {
        self.pending = true;
        self.requests += 1;
    }

    fn cancel_frame(&mut self) {
        if self.pending {
            self.cancellations += 1;
        }
        self.pending = false;
    }
}

/// What to do during a headless run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Frames to deliver
    pub ticks: u64,
    /// Canvas-local pointer position sent once before the first frame
    pub pointer: Option<(f32, f32)>,
    /// Extra viewports applied at evenly spaced points during the run
    pub resizes: Vec<Viewport>,
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub frames: u64,
    pub rendered: u64,
    pub regenerations: u64,
    pub particles: usize,
    pub scale: f32,
    pub alpha: f32,
    pub anchor: Option<(f32, f32)>,
    pub covered_pixels: usize,
}

/// A run's report and its last frame
#[derive(Debug)]
pub struct RunOutput {
    pub report: RunReport,
    pub surface: PixelSurface,
}

/// Tick index (0-based) before which resize `index` of `count` is applied
fn resize_point(ticks: u64, index: usize, count: usize) -> u64 {
    let point = ticks as u128 * (index as u128 + 1) / (count as u128 + 1);
    point as u64
}

/// Run the simulation for `options.ticks` frames
pub fn run(config: SimulationConfig, viewport: Viewport, options: &RunOptions) -> RunOutput {
    let mut state = SimulationState::new(config, ManualClock::new());
    let (backing_width, backing_height) = viewport.backing_size();
    let mut surface = PixelSurface::new(backing_width, backing_height);
    let mut current = viewport;

    state.resize(viewport);
    if let Some((x, y)) = options.pointer {
        state.pointer_moved(x, y, viewport.width as f32, viewport.height as f32);
    }

    let mut pending_resizes = options.resizes.iter().enumerate().peekable();
    let mut frames = 0;
    let mut rendered = 0;

    for tick in 0..options.ticks {
        while let Some((index, next)) = pending_resizes
            .next_if(|(index, _)| resize_point(options.ticks, *index, options.resizes.len()) <= tick)
        {
            debug!(index, tick, width = next.width, height = next.height, "scheduled resize");
            let (w, h) = next.backing_size();
            surface.resize(w, h);
            state.resize(*next);
            current = *next;
        }

        if !state.clock_mut().take_pending() {
            break;
        }
        frames += 1;
        if state.on_frame(Some(&mut surface)) == FrameOutcome::Rendered {
            rendered += 1;
        }
    }

    let particles = state.particles().unwrap_or_default();
    let report = RunReport {
        frames,
        rendered,
        regenerations: state.regenerations(),
        particles: particles.len(),
        scale: current.scale_parameter(state.config()),
        alpha: state.alpha().unwrap_or(0.0),
        anchor: particles
            .iter()
            .find(|p| p.is_anchor())
            .map(|p| (p.position.x, p.position.y)),
        covered_pixels: surface.covered_pixels(),
    };
    state.teardown();

    info!(
        frames = report.frames,
        particles = report.particles,
        regenerations = report.regenerations,
        "headless run finished"
    );
    RunOutput { report, surface }
}

/// Render coverage of `surface` as text, `columns` characters wide
///
/// Terminal cells are about twice as tall as wide, so each row spans two
/// columns' worth of pixels. Characters by covered fraction: `.` none,
/// `+` under half, `o` half or more, `#` full.
pub fn ascii_preview(surface: &PixelSurface, columns: usize) -> String {
    let (width, height) = (surface.width() as usize, surface.height() as usize);
    if width == 0 || height == 0 || columns == 0 {
        return String::new();
    }
    let columns = columns.min(width);
    let rows = (columns * height / width / 2).clamp(1, height);

    let span = |cell: usize, cells: usize, extent: usize| {
        let start = cell * extent / cells;
        let end = ((cell + 1) * extent / cells).max(start + 1);
        start..end
    };

    let mut lines = Vec::with_capacity(rows);
    for row in 0..rows {
        let ys = span(row, rows, height);
        let line: String = (0..columns)
            .map(|col| {
                let xs = span(col, columns, width);
                let total = xs.len() * ys.len();
                let covered = ys
                    .clone()
                    .flat_map(|y| xs.clone().map(move |x| (x, y)))
                    .filter(|&(x, y)| {
                        surface
                            .pixel(x as u32, y as u32)
                            .is_some_and(|px| px.a != 0)
                    })
                    .count();
                match covered {
                    0 => '.',
                    c if c == total => '#',
                    c if c * 2 >= total => 'o',
                    _ => '+',
                }
            })
            .collect();
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Rgba, Surface};

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            particle_count: 60,
            seed: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn manual_clock_counts_requests() {
        let mut clock = ManualClock::new();
        clock.cancel_frame();
        clock.request_frame();
        assert!(clock.take_pending());
        assert!(!clock.take_pending());
        clock.request_frame();
        clock.cancel_frame();

        assert_eq!(clock.requests(), 2);
        assert_eq!(clock.cancellations(), 1);
        assert!(!clock.is_pending());
    }

    #[test]
    fn resize_points_are_spread_over_the_run() {
        assert_eq!(resize_point(120, 0, 2), 40);
        assert_eq!(resize_point(120, 1, 2), 80);
        assert_eq!(resize_point(10, 0, 1), 5);
    }

    #[test]
    fn resize_points_do_not_overflow_for_huge_runs() {
        assert_eq!(resize_point(u64::MAX, 0, 1), u64::MAX / 2);
        assert_eq!(resize_point(u64::MAX, 2, 3), 3 * (1_u64 << 62) - 1);
        assert!(resize_point(u64::MAX, 9, 10) < u64::MAX);
    }

    #[test]
    fn run_renders_every_frame() {
        let options = RunOptions {
            ticks: 30,
            ..Default::default()
        };
        let output = run(small_config(), Viewport::new(400, 300, 1.0), &options);

        assert_eq!(output.report.frames, 30);
        assert_eq!(output.report.rendered, 30);
        assert_eq!(output.report.particles, 60);
        assert_eq!(output.report.anchor, Some((0.0, 0.0)));
        assert!(output.report.covered_pixels > 0);
        assert_eq!(output.surface.width(), 400);
    }

    #[test]
    fn pointer_pins_anchor_for_the_whole_run() {
        let options = RunOptions {
            ticks: 20,
            pointer: Some((300.0, 100.0)),
            ..Default::default()
        };
        let output = run(small_config(), Viewport::new(400, 300, 1.0), &options);

        assert_eq!(output.report.anchor, Some((100.0, -50.0)));
    }

    #[test]
    fn scheduled_resizes_restart_and_regenerate() {
        let options = RunOptions {
            ticks: 30,
            pointer: None,
            resizes: vec![Viewport::new(405, 300, 1.0), Viewport::new(900, 300, 2.0)],
        };
        let output = run(small_config(), Viewport::new(400, 300, 1.0), &options);

        // 400 -> 405 stays in bucket 2, 900 moves to bucket 4
        assert_eq!(output.report.regenerations, 2);
        assert_eq!(output.report.frames, 30);
        assert_eq!(output.report.scale, 4.5);
        assert_eq!(output.surface.width(), 1800);
        assert_eq!(output.surface.height(), 600);
    }

    #[test]
    fn zero_ticks_renders_nothing() {
        let output = run(small_config(), Viewport::new(200, 200, 1.0), &RunOptions::default());
        assert_eq!(output.report.frames, 0);
        assert_eq!(output.report.covered_pixels, 0);
    }

    #[test]
    fn preview_shows_coverage() {
        let mut surface = PixelSurface::new(8, 8);
        let color = Rgba::rgb(0x7F, 0x64, 0xA8);
        surface.fill_circle(2.0, 2.0, 2.0, color);
        surface.fill_circle(6.5, 6.5, 0.4, color);

        let preview = ascii_preview(&surface, 4);

        insta::assert_snapshot!(preview, @r"
        oo..
        ...+
        ");
    }

    #[test]
    fn preview_of_empty_surface_is_empty() {
        assert_eq!(ascii_preview(&PixelSurface::new(0, 0), 10), "");
        assert_eq!(ascii_preview(&PixelSurface::new(4, 2), 0), "");
    }
}
