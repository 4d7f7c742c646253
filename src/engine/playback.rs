use std::time::Duration;

use crate::engine::registry::SignalRegistry;
use crate::engine::scheduler::TickTimer;
use crate::types::{GraphId, PlaybackState, Rgb, SignalId};

/// Maps the speed slider onto a tick period: `max(1, baseline - speed)` ms.
/// `speed` is clamped into `[min, max]` first.
pub fn speed_interval(baseline: Duration, speed: i32, min: i32, max: i32) -> Duration {
    let speed = i64::from(speed.clamp(min, max.max(min)));
    let baseline_ms = baseline.as_millis() as i64;
    Duration::from_millis((baseline_ms - speed).max(1) as u64)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The cursor moved to the contained position.
    Advanced(usize),
    /// Playing, but every visible signal is fully revealed.
    Finished,
    /// Not playing; nothing happened.
    Idle,
}

/// Revealed prefix of one visible signal.
#[derive(Clone, Copy, Debug)]
pub struct SignalWindow<'a> {
    pub id: SignalId,
    pub label: &'a str,
    pub color: Rgb,
    pub samples: &'a [f64],
}

impl<'a> SignalWindow<'a> {
    /// `(index, value)` pairs ready for plotting.
    pub fn points(&self) -> impl Iterator<Item = [f64; 2]> + 'a {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, v)| [i as f64, *v])
    }
}

/// Everything a graph shows at its current cursor.
#[derive(Clone, Debug)]
pub struct GraphFrame<'a> {
    pub graph: GraphId,
    pub cursor: usize,
    pub windows: Vec<SignalWindow<'a>>,
}

impl GraphFrame<'_> {
    /// Smallest and largest revealed value over all windows.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        self.windows
            .iter()
            .flat_map(|w| w.samples.iter().copied())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.windows.iter().all(|w| w.samples.is_empty())
    }
}

/// Cursor and tick source of one graph.
///
/// Playback is a growing prefix reveal: every tick shows one more sample of
/// each visible signal, the viewport produces the scrolling effect.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    graph: GraphId,
    state: PlaybackState,
    cursor: usize,
    last_position: usize,
    baseline: Duration,
    timer: TickTimer,
}

impl PlaybackController {
    pub fn new(graph: GraphId, baseline: Duration) -> Self {
        Self {
            graph,
            state: PlaybackState::Stopped,
            cursor: 0,
            last_position: 0,
            baseline,
            timer: TickTimer::new(baseline),
        }
    }

    pub fn graph(&self) -> GraphId {
        self.graph
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn last_position(&self) -> usize {
        self.last_position
    }

    pub fn interval(&self) -> Duration {
        self.timer.interval()
    }

    pub fn is_ticking(&self) -> bool {
        self.timer.is_active()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timer.next_due()
    }

    /// Enters Playing and restarts the tick at the baseline period.
    pub fn play(&mut self, now: Duration) {
        self.state = PlaybackState::Playing;
        self.timer.start(now, self.baseline);
        log::debug!("{}: playing from {}", self.graph, self.cursor);
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            self.timer.stop();
            log::debug!("{}: paused at {}", self.graph, self.cursor);
        }
    }

    pub fn reset(&mut self, now: Duration) {
        self.cursor = 0;
        self.play(now);
    }

    /// Re-times the tick source; the cursor is left alone.
    pub fn set_interval(&mut self, now: Duration, interval: Duration) {
        self.timer.set_interval(now, interval);
    }

    /// Advances the cursor by one sample while there is something left to
    /// reveal among the visible signals of this graph.
    pub fn on_tick(&mut self, registry: &SignalRegistry) -> TickOutcome {
        if self.state != PlaybackState::Playing {
            return TickOutcome::Idle;
        }
        if self.cursor < registry.longest_visible_in_graph(self.graph) {
            self.cursor += 1;
            TickOutcome::Advanced(self.cursor)
        } else {
            TickOutcome::Finished
        }
    }

    pub fn is_finished(&self, registry: &SignalRegistry) -> bool {
        self.cursor >= registry.longest_visible_in_graph(self.graph)
    }

    /// Revealed prefixes of the visible signals assigned to this graph.
    pub fn window<'a>(&self, registry: &'a SignalRegistry) -> GraphFrame<'a> {
        let windows = registry
            .in_graph(self.graph)
            .filter(|s| s.visible)
            .map(|s| SignalWindow {
                id: s.id,
                label: &s.label,
                color: s.color,
                samples: &s.samples[..self.cursor.min(s.len())],
            })
            .collect();
        GraphFrame {
            graph: self.graph,
            cursor: self.cursor,
            windows,
        }
    }

    /// Ticks that came due by `now`.
    pub fn due_ticks(&mut self, now: Duration, max: u32) -> Vec<Duration> {
        self.timer.drain_due(now, max)
    }

    /// Remembers the cursor when the graph loses focus.
    pub fn save_position(&mut self) {
        self.last_position = self.cursor;
    }

    /// Returns to the remembered cursor when the graph regains focus. A
    /// playing graph keeps its cursor and only restarts the tick at the
    /// baseline period.
    pub fn restore_position(&mut self, now: Duration) {
        if self.state == PlaybackState::Playing {
            self.timer.start(now, self.baseline);
        } else {
            self.cursor = self.last_position;
        }
    }

    /// Keeps the cursor within the longest signal still assigned.
    pub fn clamp_cursor(&mut self, limit: usize) {
        self.cursor = self.cursor.min(limit);
        self.last_position = self.last_position.min(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use proptest::prelude::*;

    const BASE: Duration = Duration::from_millis(60);

    fn registry_with(lengths: &[usize]) -> SignalRegistry {
        let mut reg = SignalRegistry::new(ViewerConfig::default().palette_colors().unwrap());
        for (i, len) in lengths.iter().enumerate() {
            let samples = (0..*len).map(|k| k as f64).collect();
            reg.import(format!("sig{i}"), samples).unwrap();
        }
        reg
    }

    #[test]
    fn starts_stopped_and_ignores_ticks() {
        let reg = registry_with(&[10]);
        let mut pb = PlaybackController::new(GraphId::First, BASE);
        assert_eq!(pb.state(), PlaybackState::Stopped);
        assert_eq!(pb.on_tick(&reg), TickOutcome::Idle);
        assert_eq!(pb.cursor(), 0);
    }

    #[test]
    fn ticks_reveal_prefixes_until_exhausted() {
        let reg = registry_with(&[3, 5]);
        let mut pb = PlaybackController::new(GraphId::First, BASE);
        pb.play(Duration::ZERO);
        for _ in 0..4 {
            pb.on_tick(&reg);
        }
        let frame = pb.window(&reg);
        assert_eq!(frame.cursor, 4);
        assert_eq!(frame.windows[0].samples.len(), 3);
        assert_eq!(frame.windows[1].samples, &[0.0, 1.0, 2.0, 3.0]);

        assert_eq!(pb.on_tick(&reg), TickOutcome::Advanced(5));
        assert_eq!(pb.on_tick(&reg), TickOutcome::Finished);
        assert_eq!(pb.cursor(), 5);
        assert_eq!(pb.state(), PlaybackState::Playing);
        assert!(pb.is_finished(&reg));
    }

    #[test]
    fn pause_freezes_and_reset_rewinds() {
        let reg = registry_with(&[100]);
        let mut pb = PlaybackController::new(GraphId::First, BASE);
        pb.play(Duration::ZERO);
        pb.on_tick(&reg);
        pb.on_tick(&reg);
        pb.pause();
        assert!(!pb.is_ticking());
        assert_eq!(pb.on_tick(&reg), TickOutcome::Idle);
        assert_eq!(pb.cursor(), 2);

        pb.reset(Duration::ZERO);
        assert_eq!(pb.cursor(), 0);
        assert_eq!(pb.state(), PlaybackState::Playing);
        assert!(pb.is_ticking());
    }

    #[test]
    fn play_restores_baseline_interval() {
        let mut pb = PlaybackController::new(GraphId::First, BASE);
        pb.play(Duration::ZERO);
        pb.set_interval(Duration::ZERO, Duration::from_millis(10));
        assert_eq!(pb.interval(), Duration::from_millis(10));
        pb.pause();
        pb.play(Duration::ZERO);
        assert_eq!(pb.interval(), BASE);
    }

    #[test]
    fn hidden_signals_are_left_out_of_the_frame() {
        let mut reg = registry_with(&[10, 10]);
        reg.set_visible(SignalId(0), false).unwrap();
        let mut pb = PlaybackController::new(GraphId::First, BASE);
        pb.play(Duration::ZERO);
        pb.on_tick(&reg);
        let frame = pb.window(&reg);
        assert_eq!(frame.windows.len(), 1);
        assert_eq!(frame.windows[0].id, SignalId(1));
    }

    #[test]
    fn focus_switch_never_rewinds_a_playing_graph() {
        let reg = registry_with(&[100]);
        let mut pb = PlaybackController::new(GraphId::First, BASE);
        pb.play(Duration::ZERO);
        for _ in 0..7 {
            pb.on_tick(&reg);
        }
        pb.save_position();
        for _ in 0..5 {
            pb.on_tick(&reg);
        }
        pb.restore_position(Duration::from_millis(500));
        assert_eq!(pb.cursor(), 12);
        assert_eq!(pb.state(), PlaybackState::Playing);
        assert_eq!(pb.next_due(), Some(Duration::from_millis(560)));
    }

    #[test]
    fn focus_switch_returns_paused_graph_to_saved_cursor() {
        let reg = registry_with(&[100]);
        let mut pb = PlaybackController::new(GraphId::First, BASE);
        pb.play(Duration::ZERO);
        for _ in 0..7 {
            pb.on_tick(&reg);
        }
        pb.save_position();
        pb.pause();
        pb.cursor = 3;
        pb.restore_position(Duration::ZERO);
        assert_eq!(pb.cursor(), 7);
        assert_eq!(pb.state(), PlaybackState::Paused);
    }

    #[test]
    fn clamp_shrinks_cursor_and_saved_position() {
        let mut pb = PlaybackController::new(GraphId::Second, BASE);
        let reg = registry_with(&[]);
        assert_eq!(pb.window(&reg).y_bounds(), None);
        pb.cursor = 40;
        pb.last_position = 30;
        pb.clamp_cursor(20);
        assert_eq!((pb.cursor(), pb.last_position()), (20, 20));
    }

    #[test]
    fn speed_mapping_matches_slider_formula() {
        assert_eq!(speed_interval(BASE, 1, -50, 49), Duration::from_millis(59));
        assert_eq!(speed_interval(BASE, -50, -50, 49), Duration::from_millis(110));
        assert_eq!(speed_interval(BASE, 49, -50, 49), Duration::from_millis(11));
        // out of range values are clamped to the slider bounds
        assert_eq!(speed_interval(BASE, 500, -50, 49), Duration::from_millis(11));
        // the floor only matters for small baselines
        assert_eq!(speed_interval(Duration::from_millis(5), 49, -50, 49), Duration::from_millis(1));
    }

    proptest! {
        #[test]
        fn faster_slider_never_slows_ticks(a in -50i32..=49, b in -50i32..=49, base in 1u64..200) {
            let base = Duration::from_millis(base);
            let (lo, hi) = (a.min(b), a.max(b));
            let slow = speed_interval(base, lo, -50, 49);
            let fast = speed_interval(base, hi, -50, 49);
            prop_assert!(fast <= slow);
            prop_assert!(fast >= Duration::from_millis(1));
        }

        #[test]
        fn cursor_tracks_min_of_ticks_and_length(lengths in prop::collection::vec(1usize..60, 1..4), ticks in 0usize..120) {
            let reg = registry_with(&lengths);
            let mut pb = PlaybackController::new(GraphId::First, BASE);
            pb.play(Duration::ZERO);
            for _ in 0..ticks {
                pb.on_tick(&reg);
            }
            let longest = *lengths.iter().max().unwrap();
            prop_assert_eq!(pb.cursor(), ticks.min(longest));
            for (window, len) in pb.window(&reg).windows.iter().zip(&lengths) {
                prop_assert_eq!(window.samples.len(), pb.cursor().min(*len));
            }
        }
    }
}
