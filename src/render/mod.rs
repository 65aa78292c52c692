//! Draws a `MinMaxList` as one vertical segment per pixel column.
//!
//! Layout is computed once in pixel space and shared by every output
//! format, so a raster and a vector rendering of the same list cover the
//! same rows.

pub mod raster;
pub mod vector;

use tracing::debug;

use crate::decimation::MinMaxList;
use crate::error::{GraphError, Result};
use crate::scales::LinearScale;
use crate::style::{OutputFormat, RenderStyle};

pub use raster::{Canvas, PngWriter, RawWriter, Rgba8};
pub use vector::{PdfWriter, PostScriptWriter, SvgWriter};

/// The filled pixel rows `[row_top, row_bottom]` of one column, top row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub column: u32,
    pub row_top: u32,
    pub row_bottom: u32,
}

/// Turns laid-out segments into the bytes of one output format.
pub trait GraphEncoder: Send + Sync {
    fn encode(&self, segments: &[Segment], style: &RenderStyle) -> Result<Vec<u8>>;
}

/// Maps every bucket with data onto the pixel rows it covers.
/// Gap buckets produce no segment.
pub fn layout(list: &MinMaxList, height: u32) -> Vec<Segment> {
    let Some(domain) = list.value_range() else {
        return Vec::new();
    };
    let bottom_row = (height.max(1) - 1) as f64;
    let scale = LinearScale::new(domain, (bottom_row, 0.0));

    list.iter()
        .enumerate()
        .filter(|(_, b)| b.has_data)
        .map(|(i, b)| {
            let top = scale.map(b.max).round().clamp(0.0, bottom_row) as u32;
            let bottom = scale.map(b.min).round().clamp(0.0, bottom_row) as u32;
            Segment {
                column: i as u32,
                row_top: top.min(bottom),
                row_bottom: top.max(bottom),
            }
        })
        .collect()
}

pub fn encoder_for(format: OutputFormat) -> &'static dyn GraphEncoder {
    match format {
        OutputFormat::Png => &PngWriter,
        OutputFormat::Raw => &RawWriter,
        OutputFormat::Svg => &SvgWriter,
        OutputFormat::Ps => &PostScriptWriter,
        OutputFormat::Pdf => &PdfWriter,
    }
}

/// Renders `list` with `style`. The list must hold one bucket per column.
pub fn render(list: &MinMaxList, style: &RenderStyle) -> Result<Vec<u8>> {
    style.validate()?;
    if list.width() != style.width as usize {
        return Err(GraphError::invalid(format!(
            "min/max list has {} buckets but the graph is {} pixels wide",
            list.width(),
            style.width
        )));
    }

    let segments = layout(list, style.height);
    let bytes = encoder_for(style.format).encode(&segments, style)?;
    debug!(
        format = %style.format,
        width = style.width,
        height = style.height,
        segments = segments.len(),
        bytes = bytes.len(),
        "graph rendered"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimation::downsample;
    use crate::source::Sample;
    use crate::time::TimeRange;

    #[test]
    fn test_layout_skips_gaps_and_spans_height() {
        // Columns 0 and 3 hold data, 1 and 2 are gaps.
        let samples = vec![
            Sample::new(0, -5.0),
            Sample::new(5, 5.0),
            Sample::new(30, 0.0),
        ];
        let list = downsample(samples, 4, TimeRange::new(0, 40).unwrap(), None).unwrap();
        let segments = layout(&list, 11);
        assert_eq!(
            segments,
            vec![
                Segment { column: 0, row_top: 0, row_bottom: 10 },
                Segment { column: 3, row_top: 5, row_bottom: 5 },
            ]
        );
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let list = downsample(vec![Sample::new(0, 1.0)], 4, TimeRange::new(0, 40).unwrap(), None).unwrap();
        let style = RenderStyle::default().with_size(5, 5);
        assert!(matches!(render(&list, &style), Err(GraphError::InvalidArgument(_))));
    }
}
