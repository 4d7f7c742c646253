// src/gui.rs
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use eframe::egui;
use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints};

use crate::config::ViewerConfig;
use crate::drivers::{DocumentReport, FileSource, PlotStyle, PlottersRenderer, SourceFormat};
use crate::engine::{Clock, Session, SystemClock};
use crate::types::{ControlCommand, GraphId, Rgb};
use crate::worker::{spawn_report_worker, ReportEvent, ReportJob};

const IDLE_REPAINT: Duration = Duration::from_millis(250);
const MAX_LOG_LINES: usize = 8;

pub struct SignalViewerApp {
    session: Session<SystemClock>,
    source: FileSource,
    renderer: PlottersRenderer,
    // slider position, mirrors the session speed
    speed: i32,
    log_messages: Vec<String>,
    // report worker
    jobs: Sender<ReportJob>,
    events: Receiver<ReportEvent>,
}

impl SignalViewerApp {
    pub fn new(config: ViewerConfig) -> Self {
        let renderer = PlottersRenderer::new(PlotStyle {
            width: config.report.image_width,
            height: config.report.image_height,
            ..PlotStyle::default()
        });
        let (jobs, events) = spawn_report_worker(DocumentReport::from_config(&config.report));
        let source = FileSource::new(config.csv_value_column.clone());
        let speed = config.initial_speed;
        Self {
            session: Session::new(config, SystemClock::new()),
            source,
            renderer,
            speed,
            log_messages: vec!["Signal viewer ready.".to_owned()],
            jobs,
            events,
        }
    }

    fn log(&mut self, msg: impl Into<String>) {
        self.log_messages.push(format!("> {}", msg.into()));
        if self.log_messages.len() > MAX_LOG_LINES {
            self.log_messages.remove(0);
        }
    }

    fn send_job(&mut self, job: ReportJob) {
        if self.jobs.send(job).is_err() {
            self.log("report worker is gone");
        }
    }

    fn dispatch(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::Import(paths) => {
                let report = self.session.import_files(&self.source, &paths);
                let mut lines: Vec<String> = report
                    .imported
                    .iter()
                    .filter_map(|id| self.session.registry().get(*id).ok())
                    .map(|s| format!("imported {} ({} samples)", s.label, s.len()))
                    .collect();
                lines.extend(
                    report
                        .failed
                        .iter()
                        .map(|(path, err)| format!("{}: {err}", path.display())),
                );
                for line in lines {
                    self.log(line);
                }
            }
            ControlCommand::TakeSnapshot => {
                for &graph in self.session.link().targets() {
                    match self.session.snapshot(graph, &self.renderer) {
                        Ok(snapshot) => self.send_job(ReportJob::Append(snapshot)),
                        Err(err) => self.log(format!("{graph}: {err}")),
                    }
                }
            }
            ControlCommand::ExportReport => self.send_job(ReportJob::ExportPdf),
            other => {
                if let Err(err) = self.session.apply(&other) {
                    self.log(err.to_string());
                }
            }
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui, commands: &mut Vec<ControlCommand>) {
        ui.add_space(10.0);
        ui.heading("Signal Viewer");
        ui.separator();

        if ui.button("📂 Import…").clicked() {
            if let Some(paths) = rfd::FileDialog::new()
                .add_filter("Signals", &SourceFormat::EXTENSIONS)
                .pick_files()
            {
                commands.push(ControlCommand::Import(paths));
            }
        }

        let selected = self.session.selected_graph();
        let playing = self.session.playback(selected).state().is_playing();
        ui.horizontal(|ui| {
            let label = if playing { "⏸ Pause" } else { "▶ Play" };
            if ui.button(label).clicked() {
                commands.push(ControlCommand::TogglePlayPause);
            }
            if ui.button("⏮ Reset").clicked() {
                commands.push(ControlCommand::Reset);
            }
        });
        ui.horizontal(|ui| {
            if ui.button("🔍 Zoom in").clicked() {
                commands.push(ControlCommand::ZoomIn);
            }
            if ui.button("Zoom out").clicked() {
                commands.push(ControlCommand::ZoomOut);
            }
        });

        let config = self.session.config();
        let range = config.speed_min..=config.speed_max;
        if ui
            .add(egui::Slider::new(&mut self.speed, range).text("Speed"))
            .changed()
        {
            commands.push(ControlCommand::SetSpeed(self.speed));
        }

        let mut graph = selected;
        egui::ComboBox::from_label("Graph")
            .selected_text(graph.to_string())
            .show_ui(ui, |ui| {
                for g in GraphId::ALL {
                    ui.selectable_value(&mut graph, g, g.to_string());
                }
            });
        if graph != selected {
            commands.push(ControlCommand::SelectGraph(graph));
        }
        let mut linked = self.session.is_linked();
        if ui.checkbox(&mut linked, "Link graphs").changed() {
            commands.push(ControlCommand::SetLinked(linked));
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("📷 Snapshot").clicked() {
                commands.push(ControlCommand::TakeSnapshot);
            }
            if ui.button("📄 Export PDF").clicked() {
                commands.push(ControlCommand::ExportReport);
            }
        });

        ui.separator();
        for g in GraphId::ALL {
            let status = self.session.status(g);
            let end = if status.finished { ", end" } else { "" };
            ui.label(format!(
                "{g}: {:?} at {} ({} ms{end})",
                status.state,
                status.cursor,
                status.interval.as_millis()
            ));
        }

        ui.add_space(10.0);
        egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
            for m in &self.log_messages {
                ui.monospace(m);
            }
        });
    }

    fn graph_panel(
        &self,
        ui: &mut egui::Ui,
        graph: GraphId,
        plot_height: f32,
        commands: &mut Vec<ControlCommand>,
    ) {
        let status = self.session.status(graph);
        ui.horizontal(|ui| {
            ui.strong(graph.to_string());
            ui.label(format!("sample {}", status.cursor));
        });

        egui::Grid::new(("signals", graph.index()))
            .striped(true)
            .num_columns(4)
            .show(ui, |ui| {
                for row in &status.signals {
                    ui.label(&row.label);
                    let mut rgb = row.color.to_array();
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        commands.push(ControlCommand::SetColor(row.id, Rgb::from(rgb)));
                    }
                    let mut visible = row.visible;
                    if ui.checkbox(&mut visible, "visible").changed() {
                        commands.push(ControlCommand::SetVisible(row.id, visible));
                    }
                    if ui.button(format!("→ {}", graph.other())).clicked() {
                        commands.push(ControlCommand::SwitchGraph(row.id));
                    }
                    ui.end_row();
                }
            });

        let frame = self.session.frame(graph);
        let view = self.session.viewport(graph).effective_view();
        Plot::new(("plot", graph.index()))
            .height(plot_height)
            .legend(Legend::default())
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .allow_double_click_reset(false)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [view.x.min, view.y.min],
                    [view.x.max, view.y.max],
                ));
                for window in &frame.windows {
                    let [r, g, b] = window.color.to_array();
                    plot_ui.line(
                        Line::new(PlotPoints::new(window.points().collect()))
                            .color(Color32::from_rgb(r, g, b))
                            .name(window.label),
                    );
                }
            });
    }
}

impl eframe::App for SignalViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1. report worker feedback
        while let Ok(event) = self.events.try_recv() {
            match event {
                ReportEvent::Appended(path) => self.log(format!("snapshot saved to {}", path.display())),
                ReportEvent::Exported(path) => self.log(format!("PDF written to {}", path.display())),
                ReportEvent::Failed(err) => self.log(format!("report failed: {err}")),
            }
        }

        // 2. fire due ticks
        self.session.pump();

        // 3. UI
        ctx.set_visuals(egui::Visuals::dark());
        let mut commands = Vec::new();
        egui::SidePanel::left("controls").min_width(260.0).show(ctx, |ui| {
            self.controls(ui, &mut commands);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            let plot_height = (ui.available_height() / 2.0 - 90.0).max(120.0);
            for graph in GraphId::ALL {
                self.graph_panel(ui, graph, plot_height, &mut commands);
                ui.separator();
            }
        });

        for command in commands {
            self.dispatch(command);
        }

        let wait = self
            .session
            .next_due()
            .map(|due| due.saturating_sub(self.session.clock().now()))
            .unwrap_or(IDLE_REPAINT);
        ctx.request_repaint_after(wait.min(IDLE_REPAINT));
    }
}
