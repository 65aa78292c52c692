//! SVG, PostScript and PDF output. All three draw the same 1px wide
//! strokes the raster path fills.

use super::{GraphEncoder, Segment};
use crate::color::Color;
use crate::error::Result;
use crate::style::RenderStyle;

/// Stroke endpoints in a top-left origin pixel space: the segment covers
/// rows `row_top..=row_bottom`, so the stroke spans `row_top` to `row_bottom + 1`.
fn stroke_span(seg: &Segment) -> (f64, f64, f64) {
    (
        seg.column as f64 + 0.5,
        seg.row_top as f64,
        seg.row_bottom as f64 + 1.0,
    )
}

fn rgb_triplet(c: Color) -> String {
    let (r, g, b) = c.unit_rgb();
    format!("{r:.4} {g:.4} {b:.4}")
}

pub struct SvgWriter;

impl GraphEncoder for SvgWriter {
    fn encode(&self, segments: &[Segment], style: &RenderStyle) -> Result<Vec<u8>> {
        let (w, h) = (style.width, style.height);
        let mut out = String::with_capacity(256 + segments.len() * 24);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
        out.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n"
        ));
        if !style.transparent {
            out.push_str(&format!(
                "<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"{}\"{}/>\n",
                hex_rgb(style.background),
                opacity_attr("fill-opacity", style.background)
            ));
        }
        if !segments.is_empty() {
            out.push_str("<path d=\"");
            for (i, seg) in segments.iter().enumerate() {
                let (x, y0, y1) = stroke_span(seg);
                if i > 0 {
                    out.push(' ');
                }
                out.push_str(&format!("M{x} {y0}V{y1}"));
            }
            out.push_str(&format!(
                "\" fill=\"none\" stroke=\"{}\"{} stroke-width=\"1\" shape-rendering=\"crispEdges\"/>\n",
                hex_rgb(style.color),
                opacity_attr("stroke-opacity", style.color)
            ));
        }
        out.push_str("</svg>\n");
        Ok(out.into_bytes())
    }
}

fn hex_rgb(c: Color) -> String {
    c.with_alpha(255).to_hex()
}

fn opacity_attr(name: &str, c: Color) -> String {
    if c.a == 255 {
        String::new()
    } else {
        format!(" {name}=\"{:.4}\"", c.a as f64 / 255.0)
    }
}

/// Encapsulated PostScript, one page. PostScript's origin is bottom-left.
pub struct PostScriptWriter;

impl GraphEncoder for PostScriptWriter {
    fn encode(&self, segments: &[Segment], style: &RenderStyle) -> Result<Vec<u8>> {
        let (w, h) = (style.width, style.height);
        let mut out = String::with_capacity(256 + segments.len() * 32);
        out.push_str("%!PS-Adobe-3.0 EPSF-3.0\n");
        out.push_str(&format!("%%BoundingBox: 0 0 {w} {h}\n"));
        out.push_str("%%Pages: 1\n%%EndComments\n");
        out.push_str("%%Page: 1 1\ngsave\n");
        if !style.transparent {
            out.push_str(&format!(
                "{} setrgbcolor\n0 0 {w} {h} rectfill\n",
                rgb_triplet(style.background)
            ));
        }
        if !segments.is_empty() {
            out.push_str(&format!(
                "{} setrgbcolor\n1 setlinewidth\n0 setlinecap\nnewpath\n",
                rgb_triplet(style.color)
            ));
            for seg in segments {
                let (x, y0, y1) = stroke_span(seg);
                out.push_str(&format!(
                    "{x} {} moveto {x} {} lineto\n",
                    h as f64 - y0,
                    h as f64 - y1
                ));
            }
            out.push_str("stroke\n");
        }
        out.push_str("grestore\nshowpage\n%%EOF\n");
        Ok(out.into_bytes())
    }
}

/// Single page PDF 1.4 with an uncompressed content stream.
pub struct PdfWriter;

impl PdfWriter {
    fn content_stream(segments: &[Segment], style: &RenderStyle) -> String {
        let (w, h) = (style.width, style.height);
        let mut content = String::from("q\n");
        if !style.transparent {
            content.push_str(&format!(
                "{} rg\n0 0 {w} {h} re f\n",
                rgb_triplet(style.background)
            ));
        }
        if !segments.is_empty() {
            content.push_str(&format!("{} RG\n1 w\n0 J\n", rgb_triplet(style.color)));
            for seg in segments {
                let (x, y0, y1) = stroke_span(seg);
                content.push_str(&format!("{x} {} m {x} {} l\n", h as f64 - y0, h as f64 - y1));
            }
            content.push_str("S\n");
        }
        content.push_str("Q\n");
        content
    }
}

impl GraphEncoder for PdfWriter {
    fn encode(&self, segments: &[Segment], style: &RenderStyle) -> Result<Vec<u8>> {
        let content = Self::content_stream(segments, style);
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Contents 4 0 R /Resources << >> >>",
                style.width, style.height
            ),
            format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ),
        ];

        let mut out: Vec<u8> = Vec::with_capacity(512 + content.len());
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for off in &offsets {
            xref.push_str(&format!("{off:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        ));
        out.extend_from_slice(xref.as_bytes());
        Ok(out)
    }
}
