// src/utils/svg.rs

use std::collections::HashSet;

const ALLOWED_TAGS: &[&str] = &[
    "svg", "g", "defs", "title", "desc", "path", "rect", "circle", "ellipse", "line", "polyline",
    "polygon", "text", "tspan",
];

const ALLOWED_ATTRIBUTES: &[&str] = &[
    "d", "x", "y", "x1", "y1", "x2", "y2", "cx", "cy", "r", "rx", "ry", "width", "height",
    "viewbox", "viewBox", "points", "transform", "fill", "stroke", "stroke-width",
    "stroke-linecap", "stroke-linejoin", "stroke-dasharray", "opacity", "fill-opacity",
    "stroke-opacity", "font-size", "font-family", "font-weight", "text-anchor", "xmlns",
    "version", "id", "class",
];

/// Clean diagram markup coming from the AI collaborator.
///
/// Allow-list sanitization: only plain SVG shape/text elements and their
/// presentational attributes survive. Scripts (and their content), event
/// handler attributes and anything URL-bearing are stripped. All
/// externally-sourced vector markup must pass through here before it is
/// stored or returned to a rendering surface.
pub fn sanitize_svg(input: &str) -> String {
    ammonia::Builder::default()
        .tags(HashSet::from_iter(ALLOWED_TAGS.iter().copied()))
        .generic_attributes(HashSet::from_iter(ALLOWED_ATTRIBUTES.iter().copied()))
        .clean(input)
        .to_string()
}
