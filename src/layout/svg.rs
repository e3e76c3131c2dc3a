//! Static SVG snapshot of a [`Scene`].

use std::fmt::Write as _;

use super::color::{LINK_OPACITY, LINK_STROKE};
use super::scene::{LinkShape, Scene};

/// Renders the scene as a standalone SVG document.
#[must_use]
pub fn render(scene: &Scene) -> String {
    let (w, h) = (num(scene.width), num(scene.height));
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#
    );
    match scene.transform {
        Some(t) => {
            let _ = writeln!(
                out,
                r#"  <g transform="translate({},{}) scale({})">"#,
                num(t.x),
                num(t.y),
                num(t.k)
            );
        }
        None => out.push_str("  <g>\n"),
    }

    let _ = writeln!(
        out,
        r#"    <g class="links" stroke="{LINK_STROKE}" stroke-opacity="{LINK_OPACITY}" fill="none">"#
    );
    for link in &scene.links {
        let width = num(link.width);
        match &link.shape {
            LinkShape::Line { from, to } => {
                let _ = writeln!(
                    out,
                    r#"      <line x1="{}" y1="{}" x2="{}" y2="{}" stroke-width="{width}"/>"#,
                    num(from.x),
                    num(from.y),
                    num(to.x),
                    num(to.y)
                );
            }
            LinkShape::Curve { path } => {
                let _ = writeln!(out, r#"      <path d="{}" stroke-width="{width}"/>"#, escape(path));
            }
        }
    }
    out.push_str("    </g>\n    <g class=\"nodes\">\n");
    for node in &scene.nodes {
        let _ = writeln!(
            out,
            r#"      <circle cx="{}" cy="{}" r="{}" fill="{}"><title>{}</title></circle>"#,
            num(node.x),
            num(node.y),
            num(node.radius),
            escape(&node.fill),
            escape(&node.id)
        );
    }
    out.push_str(
        "    </g>\n    <g class=\"labels\" text-anchor=\"middle\" dominant-baseline=\"middle\" fill=\"white\">\n",
    );
    for node in &scene.nodes {
        let weight = if node.bold { r#" font-weight="bold""# } else { "" };
        let _ = writeln!(
            out,
            r#"      <text x="{}" y="{}" font-size="{}"{weight}>{}</text>"#,
            num(node.x),
            num(node.y),
            num(node.font_size),
            escape(&node.label)
        );
    }
    out.push_str("    </g>\n  </g>\n</svg>\n");
    out
}

/// Formats a coordinate with at most two decimals.
fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
