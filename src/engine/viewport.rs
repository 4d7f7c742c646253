use crate::engine::playback::GraphFrame;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Scales the range about its own center.
    pub fn scaled(&self, factor: f64) -> Self {
        let c = self.center();
        Self {
            min: c + (self.min - c) * factor,
            max: c + (self.max - c) * factor,
        }
    }

    /// `[lo, hi]` widened by `padding * span` on both sides. A flat range is
    /// opened to a unit span so the axis never collapses.
    pub fn padded(lo: f64, hi: f64, padding: f64) -> Self {
        let span = hi - lo;
        if span.abs() < f64::EPSILON {
            return Self::new(lo - 0.5, hi + 0.5);
        }
        Self::new(lo - span * padding, hi + span * padding)
    }

    /// Intersection with `limits`; falls back to `limits` when they don't overlap.
    pub fn clamped_to(&self, limits: AxisRange) -> Self {
        let lo = self.min.max(limits.min);
        let hi = self.max.min(limits.max);
        if lo < hi {
            Self::new(lo, hi)
        } else {
            limits
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewRange {
    pub x: AxisRange,
    pub y: AxisRange,
}

impl Default for ViewRange {
    fn default() -> Self {
        Self {
            x: AxisRange::new(0.0, 1.0),
            y: AxisRange::new(-1.0, 1.0),
        }
    }
}

/// Axis state of one graph.
#[derive(Debug, Clone)]
pub struct ViewportController {
    view: ViewRange,
    x_limits: Option<AxisRange>,
    visible_width: f64,
    padding: f64,
}

impl ViewportController {
    pub fn new(visible_width: f64, padding: f64) -> Self {
        Self {
            view: ViewRange::default(),
            x_limits: None,
            visible_width,
            padding,
        }
    }

    /// Requested range, as last set by auto-range or zoom.
    pub fn view(&self) -> ViewRange {
        self.view
    }

    pub fn x_limits(&self) -> Option<AxisRange> {
        self.x_limits
    }

    /// What actually ends up on screen: the requested x range kept inside
    /// the x limits.
    pub fn effective_view(&self) -> ViewRange {
        match self.x_limits {
            Some(limits) => ViewRange {
                x: self.view.x.clamped_to(limits),
                y: self.view.y,
            },
            None => self.view,
        }
    }

    /// Fits y to the revealed data and scrolls x so the cursor sits at the
    /// right edge of a `visible_width` window.
    pub fn auto_range(&mut self, frame: &GraphFrame<'_>) {
        let cursor = frame.cursor as f64;
        if let Some((lo, hi)) = frame.y_bounds() {
            self.view.y = AxisRange::padded(lo, hi, self.padding);
        }
        self.x_limits = Some(AxisRange::new(0.0, cursor + 0.1));
        self.view.x = AxisRange::new(cursor - self.visible_width, cursor);
    }

    /// `factor < 1` zooms in, `factor > 1` zooms out.
    pub fn zoom(&mut self, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            log::warn!("ignoring zoom factor {factor}");
            return;
        }
        self.view = ViewRange {
            x: self.view.x.scaled(factor),
            y: self.view.y.scaled(factor),
        };
    }

    /// Takes over another viewport's axes (shared-axis mode).
    pub fn mirror(&mut self, other: &ViewportController) {
        self.view = other.view;
        self.x_limits = other.x_limits;
    }
}
