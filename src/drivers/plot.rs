use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb as ImageRgb};
use plotters::prelude::LineSeries;
use plotters::prelude::*;

use crate::drivers::error::ExportError;
use crate::engine::{AxisRange, GraphFrame, ViewRange};

/// Turns what a graph currently shows into a bitmap.
pub trait Renderer {
    fn render_png(&self, frame: &GraphFrame<'_>, view: ViewRange) -> Result<Vec<u8>, ExportError>;
}

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub foreground: RGBColor,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: BLACK,
            foreground: WHITE,
        }
    }
}

/// Software renderer built on the plotters bitmap backend.
#[derive(Clone, Debug, Default)]
pub struct PlottersRenderer {
    pub style: PlotStyle,
}

impl PlottersRenderer {
    pub fn new(style: PlotStyle) -> Self {
        Self { style }
    }
}

impl Renderer for PlottersRenderer {
    fn render_png(&self, frame: &GraphFrame<'_>, view: ViewRange) -> Result<Vec<u8>, ExportError> {
        let style = &self.style;
        if style.width == 0 || style.height == 0 {
            return Err(ExportError::Plot("image size must be non-zero".into()));
        }
        let x = drawable(view.x);
        let y = drawable(view.y);
        let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
                .into_drawing_area();
            root.fill(&style.background)?;
            let mut chart = ChartBuilder::on(&root)
                .margin(10)
                .caption(
                    frame.graph.to_string(),
                    ("sans-serif", 20).into_font().color(&style.foreground),
                )
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 40)
                .build_cartesian_2d(x.min..x.max, y.min..y.max)?;
            chart
                .configure_mesh()
                .axis_style(&style.foreground)
                .label_style(("sans-serif", 12).into_font().color(&style.foreground))
                .light_line_style(&style.foreground.mix(0.1))
                .draw()?;
            for window in &frame.windows {
                let color = RGBColor(window.color.r, window.color.g, window.color.b);
                // plotters does not clip paths, keep points inside the plotting area
                let series = window
                    .points()
                    .filter(|[px, _]| *px >= x.min - 1.0 && *px <= x.max + 1.0)
                    .map(|[px, py]| (px.clamp(x.min, x.max), py.clamp(y.min, y.max)));
                chart
                    .draw_series(LineSeries::new(series, &color))?
                    .label(window.label.to_owned())
                    .legend(move |(lx, ly)| PathElement::new(vec![(lx, ly), (lx + 20, ly)], &color));
            }
            if !frame.windows.is_empty() {
                chart
                    .configure_series_labels()
                    .label_font(("sans-serif", 12).into_font().color(&style.foreground))
                    .border_style(&style.foreground.mix(0.2))
                    .background_style(&style.background)
                    .draw()?;
            }
            root.present()?;
        }
        encode_png(&buffer, style.width, style.height)
    }
}

/// plotters needs a non-empty, finite coordinate range.
fn drawable(range: AxisRange) -> AxisRange {
    if !(range.min.is_finite() && range.max.is_finite()) {
        return AxisRange::new(0.0, 1.0);
    }
    if range.span() <= f64::EPSILON {
        return AxisRange::new(range.min - 0.5, range.min + 0.5);
    }
    range
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    let image = ImageBuffer::<ImageRgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| ExportError::Image("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SignalWindow;
    use crate::types::{GraphId, Rgb, SignalId};
    use image::GenericImageView;

    #[test]
    fn renders_png_bytes() {
        let samples: Vec<f64> = (0..40).map(|i| (i as f64 / 5.0).sin()).collect();
        let frame = GraphFrame {
            graph: GraphId::Second,
            cursor: 40,
            windows: vec![SignalWindow {
                id: SignalId(0),
                label: "sine",
                color: Rgb::new(0, 255, 0),
                samples: &samples,
            }],
        };
        let view = ViewRange {
            x: AxisRange::new(0.0, 40.0),
            y: AxisRange::new(-1.2, 1.2),
        };
        let png = PlottersRenderer::default().render_png(&frame, view).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (900, 400));
    }

    #[test]
    fn empty_and_flat_views_still_render() {
        let frame = GraphFrame {
            graph: GraphId::First,
            cursor: 0,
            windows: vec![],
        };
        let view = ViewRange {
            x: AxisRange::new(3.0, 3.0),
            y: AxisRange::new(f64::NAN, 1.0),
        };
        let renderer = PlottersRenderer::new(PlotStyle {
            width: 200,
            height: 100,
            ..PlotStyle::default()
        });
        assert!(!renderer.render_png(&frame, view).unwrap().is_empty());
    }
}
