use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ViewerConfig;
use crate::drivers::{ImportError, Renderer, SignalSource, ViewerError};
use crate::engine::link::LinkCoordinator;
use crate::engine::playback::{speed_interval, GraphFrame, PlaybackController, TickOutcome};
use crate::engine::registry::{SignalRegistry, IMPORT_GRAPH};
use crate::engine::scheduler::{Clock, SystemClock};
use crate::engine::snapshot::{take_snapshot, Snapshot};
use crate::engine::stats::{stats_for, SignalStats};
use crate::engine::viewport::ViewportController;
use crate::types::{ControlCommand, GraphId, PlaybackState, Rgb, SignalId};

/// Row of a graph's signal table.
#[derive(Clone, Debug, PartialEq)]
pub struct SignalRow {
    pub id: SignalId,
    pub label: String,
    pub color: Rgb,
    pub visible: bool,
    pub len: usize,
}

/// Read model of one graph for the control surface.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphStatus {
    pub graph: GraphId,
    pub state: PlaybackState,
    pub cursor: usize,
    pub interval: Duration,
    pub finished: bool,
    pub signals: Vec<SignalRow>,
}

/// Outcome of a batch import. Failed files are skipped, not fatal.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<SignalId>,
    pub failed: Vec<(PathBuf, ImportError)>,
}

/// The whole two-graph viewer state: signals, both playback/viewport pairs
/// and the link mode. Everything runs on the caller's thread; time only
/// moves when [`Session::pump`] (or [`Session::tick`]) is called.
pub struct Session<C: Clock = SystemClock> {
    config: ViewerConfig,
    registry: SignalRegistry,
    playback: [PlaybackController; 2],
    viewports: [ViewportController; 2],
    link: LinkCoordinator,
    speed: i32,
    clock: C,
}

impl<C: Clock> Session<C> {
    pub fn new(config: ViewerConfig, clock: C) -> Self {
        let palette = config.palette_colors().unwrap_or_else(|err| {
            log::warn!("{err}; falling back to the default palette");
            ViewerConfig::default().palette_colors().unwrap_or_default()
        });
        let baseline = config.baseline_interval();
        let viewport = || ViewportController::new(config.visible_width, config.range_padding);
        Self {
            registry: SignalRegistry::new(palette),
            playback: GraphId::ALL.map(|g| PlaybackController::new(g, baseline)),
            viewports: [viewport(), viewport()],
            link: LinkCoordinator::default(),
            speed: config.initial_speed,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn registry(&self) -> &SignalRegistry {
        &self.registry
    }

    pub fn playback(&self, graph: GraphId) -> &PlaybackController {
        &self.playback[graph.index()]
    }

    pub fn viewport(&self, graph: GraphId) -> &ViewportController {
        &self.viewports[graph.index()]
    }

    pub fn link(&self) -> &LinkCoordinator {
        &self.link
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_linked()
    }

    pub fn selected_graph(&self) -> GraphId {
        self.link.selected()
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Adds a signal to graph 1 and restarts that graph from the beginning.
    pub fn import_signal(
        &mut self,
        label: impl Into<String>,
        samples: Vec<f64>,
    ) -> Result<SignalId, ImportError> {
        let id = self.registry.import(label, samples)?;
        let now = self.clock.now();
        self.playback[IMPORT_GRAPH.index()].reset(now);
        Ok(id)
    }

    /// Reads and imports every path; a file that fails is logged, recorded
    /// in the report and skipped.
    pub fn import_files<S: SignalSource + ?Sized>(
        &mut self,
        source: &S,
        paths: &[PathBuf],
    ) -> ImportReport {
        let mut report = ImportReport::default();
        for path in paths {
            let result = source
                .read_samples(path)
                .and_then(|samples| self.import_signal(file_label(path), samples));
            match result {
                Ok(id) => report.imported.push(id),
                Err(err) => {
                    log::warn!("skipping {}: {err}", path.display());
                    report.failed.push((path.clone(), err));
                }
            }
        }
        report
    }

    pub fn play(&mut self) {
        let now = self.clock.now();
        for graph in self.link.targets() {
            self.playback[graph.index()].play(now);
        }
    }

    pub fn pause(&mut self) {
        for graph in self.link.targets() {
            self.playback[graph.index()].pause();
        }
    }

    /// Pauses the targets if the selected graph is playing, plays them otherwise.
    pub fn toggle_play_pause(&mut self) {
        if self.playback[self.link.selected().index()].state().is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn reset(&mut self) {
        let now = self.clock.now();
        for graph in self.link.targets() {
            self.playback[graph.index()].reset(now);
        }
    }

    pub fn set_speed(&mut self, speed: i32) {
        let config = &self.config;
        self.speed = speed.clamp(config.speed_min, config.speed_max.max(config.speed_min));
        let interval = speed_interval(
            config.baseline_interval(),
            self.speed,
            config.speed_min,
            config.speed_max,
        );
        let now = self.clock.now();
        for graph in self.link.targets() {
            self.playback[graph.index()].set_interval(now, interval);
        }
        log::debug!("speed {} -> {:?}", self.speed, interval);
    }

    pub fn zoom(&mut self, factor: f64) {
        let targets = self.link.targets();
        if self.config.link_axes {
            // shared axes: one zoom moves both graphs
            let graph = targets[0];
            self.viewports[graph.index()].zoom(factor);
            self.mirror_axes(graph);
        } else {
            for graph in targets {
                self.viewports[graph.index()].zoom(factor);
            }
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom(self.config.zoom_in_factor);
    }

    pub fn zoom_out(&mut self) {
        self.zoom(self.config.zoom_out_factor);
    }

    /// Switches link mode and resets whatever the new mode targets.
    pub fn set_linked(&mut self, linked: bool) {
        if self.link.set_linked(linked) {
            log::info!("graphs {}", if linked { "linked" } else { "unlinked" });
        }
        self.reset();
    }

    /// Moves the focus to `graph`. The newly selected graph remembers its
    /// cursor and, if playing, restarts its tick; the cursor never moves.
    pub fn select_graph(&mut self, graph: GraphId) {
        if let Some(previous) = self.link.select(graph) {
            let now = self.clock.now();
            let playback = &mut self.playback[graph.index()];
            playback.save_position();
            playback.restore_position(now);
            log::debug!("selected {graph} (was {previous})");
        }
    }

    /// Shows or hides a signal. A graph holding a single signal stops
    /// ticking while that signal is hidden and resumes when it is shown.
    pub fn set_visible(&mut self, id: SignalId, visible: bool) -> Result<(), ViewerError> {
        let signal = self.registry.get(id)?;
        let (graph, was_visible) = (signal.graph, signal.visible);
        self.registry.set_visible(id, visible)?;
        if was_visible != visible && self.registry.count_in_graph(graph) == 1 {
            let playback = &mut self.playback[graph.index()];
            if visible {
                playback.play(self.clock.now());
            } else {
                playback.pause();
            }
        }
        Ok(())
    }

    pub fn set_color(&mut self, id: SignalId, color: Rgb) -> Result<(), ViewerError> {
        self.registry.set_color(id, color)
    }

    /// Moves a signal to the other graph, which starts playing. Returns the
    /// destination.
    pub fn switch_graph(&mut self, id: SignalId) -> Result<GraphId, ViewerError> {
        let from = self.registry.get(id)?.graph;
        let to = from.other();
        self.registry.move_to_graph(id, to)?;
        let remaining = self.registry.longest_in_graph(from);
        self.playback[from.index()].clamp_cursor(remaining);
        self.playback[to.index()].play(self.clock.now());
        self.refresh(from);
        self.refresh(to);
        log::info!("moved signal {id} from {from} to {to}");
        Ok(to)
    }

    /// Advances one graph by a single tick.
    pub fn tick(&mut self, graph: GraphId) -> TickOutcome {
        let outcome = self.playback[graph.index()].on_tick(&self.registry);
        if let TickOutcome::Advanced(_) = outcome {
            self.refresh(graph);
        }
        outcome
    }

    /// Fires every tick that came due on either graph, oldest first.
    /// Returns how many ticks ran.
    pub fn pump(&mut self) -> usize {
        let now = self.clock.now();
        let max = self.config.max_catch_up_ticks.max(1);
        let mut due = Vec::new();
        for graph in GraphId::ALL {
            let ticks = self.playback[graph.index()].due_ticks(now, max);
            due.extend(ticks.into_iter().map(|at| (at, graph)));
        }
        due.sort_by_key(|(at, graph)| (*at, graph.index()));
        for (_, graph) in &due {
            self.tick(*graph);
        }
        due.len()
    }

    /// Earliest pending tick of either graph.
    pub fn next_due(&self) -> Option<Duration> {
        self.playback.iter().filter_map(PlaybackController::next_due).min()
    }

    pub fn frame(&self, graph: GraphId) -> GraphFrame<'_> {
        self.playback[graph.index()].window(&self.registry)
    }

    pub fn status(&self, graph: GraphId) -> GraphStatus {
        let playback = &self.playback[graph.index()];
        GraphStatus {
            graph,
            state: playback.state(),
            cursor: playback.cursor(),
            interval: playback.interval(),
            finished: playback.state().is_playing() && playback.is_finished(&self.registry),
            signals: self
                .registry
                .in_graph(graph)
                .map(|s| SignalRow {
                    id: s.id,
                    label: s.label.clone(),
                    color: s.color,
                    visible: s.visible,
                    len: s.len(),
                })
                .collect(),
        }
    }

    /// Stats of a signal up to its graph's cursor.
    pub fn stats_for(&self, id: SignalId) -> Result<SignalStats, ViewerError> {
        let signal = self.registry.get(id)?;
        let cursor = self.playback[signal.graph.index()].cursor();
        Ok(stats_for(&signal.samples, cursor)?)
    }

    pub fn snapshot<R: Renderer + ?Sized>(
        &self,
        graph: GraphId,
        renderer: &R,
    ) -> Result<Snapshot, ViewerError> {
        take_snapshot(
            &self.registry,
            &self.playback[graph.index()],
            &self.viewports[graph.index()],
            renderer,
        )
    }

    /// Runs a command that only touches engine state. Import, snapshot and
    /// export need I/O collaborators and are left to the control surface.
    pub fn apply(&mut self, command: &ControlCommand) -> Result<(), ViewerError> {
        log::debug!("command {command:?}");
        match command {
            ControlCommand::TogglePlayPause => self.toggle_play_pause(),
            ControlCommand::Play => self.play(),
            ControlCommand::Pause => self.pause(),
            ControlCommand::Reset => self.reset(),
            ControlCommand::SetSpeed(speed) => self.set_speed(*speed),
            ControlCommand::ZoomIn => self.zoom_in(),
            ControlCommand::ZoomOut => self.zoom_out(),
            ControlCommand::SetLinked(linked) => self.set_linked(*linked),
            ControlCommand::SelectGraph(graph) => self.select_graph(*graph),
            ControlCommand::SetVisible(id, visible) => self.set_visible(*id, *visible)?,
            ControlCommand::SetColor(id, color) => self.set_color(*id, *color)?,
            ControlCommand::SwitchGraph(id) => {
                self.switch_graph(*id)?;
            }
            ControlCommand::Import(_) | ControlCommand::TakeSnapshot | ControlCommand::ExportReport => {
                log::warn!("{command:?} is handled by the control surface");
            }
        }
        Ok(())
    }

    /// Recomputes a graph's window and axes without moving its cursor.
    fn refresh(&mut self, graph: GraphId) {
        let frame = self.playback[graph.index()].window(&self.registry);
        self.viewports[graph.index()].auto_range(&frame);
        self.mirror_axes(graph);
    }

    fn mirror_axes(&mut self, from: GraphId) {
        if !self.config.link_axes {
            return;
        }
        let [first, second] = &mut self.viewports;
        match from {
            GraphId::First => second.mirror(first),
            GraphId::Second => first.mirror(second),
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
