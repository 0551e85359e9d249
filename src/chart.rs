//! Comparative temperature bar chart
//!
//! Renders one bar per city with the mean temperature as a dashed line and
//! the ±1 standard deviation range as a shaded band. Output is an SVG document.

use plotters::prelude::*;
use plotters::style::FontTransform;
use tracing::debug;

use crate::TrackerError;
use crate::aggregator::{SummaryStatistics, summarize};
use crate::config::ChartConfig;
use crate::models::ObservationSet;

const BAR_FILL: RGBColor = RGBColor(173, 216, 230);
const BAR_EDGE: RGBColor = BLUE;
const MEAN_LINE: RGBColor = RED;
const BAND_FILL: RGBColor = YELLOW;

/// Rendered chart plus the statistics it was drawn from
#[derive(Debug, Clone)]
pub struct Chart {
    pub statistics: SummaryStatistics,
    pub svg: String,
}

/// Y axis range covering zero, every bar and the whole band, padded by 10%
fn value_range(temperatures: &[f64], stats: &SummaryStatistics) -> (f64, f64) {
    let (low, high) = temperatures.iter().fold(
        (stats.lower().min(0.0), stats.upper().max(0.0)),
        |(low, high), t| (low.min(*t), high.max(*t)),
    );
    let padding = if (high - low).abs() > 1e-6 {
        (high - low) * 0.1
    } else {
        1.0
    };
    (low - padding, high + padding)
}

/// Draw the comparison chart for two or more observations
pub fn render_temperature_chart(
    observations: &ObservationSet,
    config: &ChartConfig,
) -> crate::Result<Chart> {
    if !observations.is_chartable() {
        return Err(TrackerError::validation(format!(
            "a temperature chart needs at least two cities, got {}",
            observations.len()
        )));
    }

    let statistics = summarize(observations);
    let mut svg = String::new();
    draw(&mut svg, observations, &statistics, config)
        .map_err(|e| TrackerError::chart(e.to_string()))?;

    debug!(
        "Rendered temperature chart for {} cities ({} bytes)",
        observations.len(),
        svg.len()
    );
    Ok(Chart { statistics, svg })
}

fn draw(
    svg: &mut String,
    observations: &ObservationSet,
    stats: &SummaryStatistics,
    config: &ChartConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let names: Vec<String> = observations.names().iter().map(|n| n.to_string()).collect();
    let temperatures = observations.temperatures();
    let count = names.len();
    let (y_min, y_max) = value_range(&temperatures, stats);

    let root = SVGBackend::with_string(svg, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Temperature Comparison", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(60)
        .build_cartesian_2d((0..count - 1).into_segmented(), y_min..y_max)?;

    let tick_style = ("sans-serif", 14)
        .into_font()
        .transform(FontTransform::Rotate90);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Cities")
        .y_desc("Temperature (°C)")
        .x_labels(count)
        .x_label_style(tick_style)
        .x_label_formatter(&|value: &SegmentValue<usize>| match value {
            SegmentValue::CenterOf(index) => names.get(*index).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .light_line_style(BLACK.mix(0.1))
        .draw()?;

    chart
        .draw_series(std::iter::once(Rectangle::new(
            [
                (SegmentValue::Exact(0), stats.lower()),
                (SegmentValue::Last, stats.upper()),
            ],
            BAND_FILL.mix(0.2).filled(),
        )))?
        .label("±1 Std Dev")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], BAND_FILL.mix(0.4).filled()));

    chart.draw_series(temperatures.iter().enumerate().map(|(index, temperature)| {
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(index), 0.0),
                (SegmentValue::Exact(index + 1), *temperature),
            ],
            BAR_FILL.filled(),
        );
        bar.set_margin(0, 0, 8, 8);
        bar
    }))?;

    chart.draw_series(temperatures.iter().enumerate().map(|(index, temperature)| {
        let mut edge = Rectangle::new(
            [
                (SegmentValue::Exact(index), 0.0),
                (SegmentValue::Exact(index + 1), *temperature),
            ],
            BAR_EDGE.stroke_width(1),
        );
        edge.set_margin(0, 0, 8, 8);
        edge
    }))?;

    chart
        .draw_series(DashedLineSeries::new(
            [
                (SegmentValue::Exact(0), stats.mean),
                (SegmentValue::Last, stats.mean),
            ],
            10,
            6,
            MEAN_LINE.stroke_width(2),
        ))?
        .label(format!("Average Temp: {:.2}°C", stats.mean))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MEAN_LINE.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
