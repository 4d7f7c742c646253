use serde::{Deserialize, Serialize};

use crate::drivers::{EmptyDataError, Renderer, ViewerError};
use crate::engine::playback::PlaybackController;
use crate::engine::registry::SignalRegistry;
use crate::engine::stats::{stats_for, SignalStats};
use crate::engine::viewport::ViewportController;
use crate::types::{GraphId, SignalId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub id: SignalId,
    pub label: String,
    pub visible: bool,
    /// `None` when nothing of the signal has been played yet.
    pub stats: Option<SignalStats>,
}

/// Statistics and picture of one graph at the moment it was taken.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub graph: GraphId,
    pub cursor: usize,
    pub signals: Vec<SignalSummary>,
    pub image_png: Vec<u8>,
}

/// Gathers stats for every signal on the controller's graph, hidden ones
/// included, and renders the graph's current view.
pub fn take_snapshot<R: Renderer + ?Sized>(
    registry: &SignalRegistry,
    playback: &PlaybackController,
    viewport: &ViewportController,
    renderer: &R,
) -> Result<Snapshot, ViewerError> {
    let graph = playback.graph();
    let cursor = playback.cursor();
    let signals: Vec<SignalSummary> = registry
        .in_graph(graph)
        .map(|s| SignalSummary {
            id: s.id,
            label: s.label.clone(),
            visible: s.visible,
            stats: stats_for(&s.samples, cursor).ok(),
        })
        .collect();
    if signals.is_empty() {
        log::info!("no signals found for {graph}");
        return Err(EmptyDataError.into());
    }
    let frame = playback.window(registry);
    let image_png = renderer.render_png(&frame, viewport.effective_view())?;
    log::info!("snapshot of {graph} at sample {cursor} ({} signals)", signals.len());
    Ok(Snapshot {
        graph,
        cursor,
        signals,
        image_png,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::drivers::ExportError;
    use crate::engine::playback::GraphFrame;
    use crate::engine::viewport::ViewRange;
    use std::cell::RefCell;
    use std::time::Duration;

    /// Records what it was asked to draw.
    #[derive(Default)]
    struct RecordingRenderer {
        drawn: RefCell<Vec<(usize, ViewRange)>>,
        fail: bool,
    }

    impl Renderer for RecordingRenderer {
        fn render_png(&self, frame: &GraphFrame<'_>, view: ViewRange) -> Result<Vec<u8>, ExportError> {
            if self.fail {
                return Err(ExportError::Plot("backend gone".into()));
            }
            self.drawn.borrow_mut().push((frame.windows.len(), view));
            Ok(vec![1, 2, 3])
        }
    }

    fn setup() -> (SignalRegistry, PlaybackController, ViewportController) {
        let mut reg = SignalRegistry::new(ViewerConfig::default().palette_colors().unwrap());
        reg.import("ramp", (0..20).map(f64::from).collect()).unwrap();
        let hidden = reg.import("flat", vec![4.0; 20]).unwrap();
        reg.set_visible(hidden, false).unwrap();
        let mut pb = PlaybackController::new(GraphId::First, Duration::from_millis(60));
        pb.play(Duration::ZERO);
        (reg, pb, ViewportController::new(150.0, 0.1))
    }

    #[test]
    fn covers_hidden_signals_but_draws_visible_ones() {
        let (reg, mut pb, vp) = setup();
        for _ in 0..5 {
            pb.on_tick(&reg);
        }
        let renderer = RecordingRenderer::default();
        let snap = take_snapshot(&reg, &pb, &vp, &renderer).unwrap();
        assert_eq!(snap.cursor, 5);
        assert_eq!(snap.signals.len(), 2);
        assert_eq!(snap.signals[0].stats.unwrap().mean, 2.0);
        assert_eq!(snap.signals[1].stats.unwrap().max, 4.0);
        assert!(!snap.signals[1].visible);
        assert_eq!(renderer.drawn.borrow()[0].0, 1);
        assert_eq!(snap.image_png, vec![1, 2, 3]);
    }

    #[test]
    fn nothing_played_reports_no_data_per_signal() {
        let (reg, pb, vp) = setup();
        let snap = take_snapshot(&reg, &pb, &vp, &RecordingRenderer::default()).unwrap();
        assert!(snap.signals.iter().all(|s| s.stats.is_none()));
    }

    #[test]
    fn empty_graph_and_renderer_failure_are_errors() {
        let (reg, _, vp) = setup();
        let other = PlaybackController::new(GraphId::Second, Duration::from_millis(60));
        assert!(matches!(
            take_snapshot(&reg, &other, &vp, &RecordingRenderer::default()),
            Err(ViewerError::EmptyData(_))
        ));

        let (reg, pb, vp) = setup();
        let broken = RecordingRenderer {
            fail: true,
            ..RecordingRenderer::default()
        };
        assert!(matches!(
            take_snapshot(&reg, &pb, &vp, &broken),
            Err(ViewerError::Export(ExportError::Plot(_)))
        ));
    }
}
