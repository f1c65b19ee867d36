//! Conversion of arbitrary shapes into path geometry.
//!
//! The selection tool only needs the [`PathConverter`] capability; hosts may
//! inject their own. [`GeometryPathConverter`] covers the built-in variants.

use std::fmt::Write as _;

use egui::{Pos2, pos2};

use crate::document::Document;
use crate::geometry::flatten_conic;
use crate::shape::{FillRule, Shape, ShapeId, ShapeKind};

pub trait PathConverter {
    /// Build a new path shape (in the arena, not in any container) out of `shapes`.
    fn to_path_shape(&self, doc: &mut Document, shapes: &[ShapeId]) -> Option<ShapeId>;

    /// SVG path data describing `shapes`.
    fn to_svg_path_data(&self, doc: &Document, shapes: &[ShapeId]) -> Option<String>;
}

/// Quarter-ellipse conic weight
const QUARTER_WEIGHT: f32 = std::f32::consts::FRAC_1_SQRT_2;

#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryPathConverter;

impl GeometryPathConverter {
    /// Segments making up `id`, with a flag telling whether they close.
    /// New corner points are created in `doc` where the source has none.
    fn segments(doc: &mut Document, id: ShapeId, out: &mut Vec<(Vec<ShapeId>, bool)>) {
        let Some(shape) = doc.get(id).cloned() else {
            return;
        };
        match &shape.kind {
            ShapeKind::Line { .. }
            | ShapeKind::CubicBezier { .. }
            | ShapeKind::QuadraticBezier { .. }
            | ShapeKind::Conic { .. } => {
                let start = shape.kind.structural_points()[0];
                match out.last_mut() {
                    Some((segments, false)) if last_end(doc, segments) == Some(start) => segments.push(id),
                    _ => out.push((vec![id], false)),
                }
            }
            ShapeKind::Rectangle { top_left, bottom_right, .. } => {
                let (Some(a), Some(b)) = (doc.position(*top_left), doc.position(*bottom_right)) else {
                    return;
                };
                let style = shape.style.clone();
                let top_right = doc.add_point(pos2(b.x, a.y), style.clone(), None);
                let bottom_left = doc.add_point(pos2(a.x, b.y), style.clone(), None);
                let corners = [*top_left, top_right, *bottom_right, bottom_left, *top_left];
                let lines = corners
                    .windows(2)
                    .map(|w| doc.insert(Shape::new(ShapeKind::Line { start: w[0], end: w[1] }, style.clone())))
                    .collect();
                out.push((lines, true));
            }
            ShapeKind::Ellipse { .. } | ShapeKind::Circle { .. } => {
                let Some(rect) = doc.bounds(id) else {
                    return;
                };
                let style = shape.style.clone();
                let c = rect.center();
                let rims = [
                    pos2(rect.max.x, c.y),
                    pos2(c.x, rect.max.y),
                    pos2(rect.min.x, c.y),
                    pos2(c.x, rect.min.y),
                ];
                let corners = [rect.right_bottom(), rect.left_bottom(), rect.left_top(), rect.right_top()];
                let rim_ids: Vec<ShapeId> = rims.iter().map(|p| doc.add_point(*p, style.clone(), None)).collect();
                let conics = (0..4)
                    .map(|i| {
                        let control = doc.add_point(corners[i], style.clone(), None);
                        doc.insert(Shape::new(
                            ShapeKind::Conic {
                                start: rim_ids[i],
                                point1: control,
                                point2: rim_ids[(i + 1) % 4],
                                weight: QUARTER_WEIGHT,
                            },
                            style.clone(),
                        ))
                    })
                    .collect();
                out.push((conics, true));
            }
            ShapeKind::Figure { shapes, is_closed, .. } => out.push((shapes.clone(), *is_closed)),
            ShapeKind::Path { figures, .. } => {
                for figure in figures {
                    Self::segments(doc, *figure, out);
                }
            }
            ShapeKind::Group { shapes, .. } => {
                for child in shapes {
                    Self::segments(doc, *child, out);
                }
            }
            ShapeKind::Point { .. }
            | ShapeKind::Text { .. }
            | ShapeKind::Reference { .. }
            | ShapeKind::Canvas { .. } => {}
        }
    }
}

fn last_end(doc: &Document, segments: &[ShapeId]) -> Option<ShapeId> {
    segments
        .last()
        .and_then(|s| doc.kind(*s))
        .and_then(|k| k.structural_points().last().copied())
}

fn fmt_point(out: &mut String, p: Pos2) {
    let _ = write!(out, "{},{}", p.x, p.y);
}

impl PathConverter for GeometryPathConverter {
    fn to_path_shape(&self, doc: &mut Document, shapes: &[ShapeId]) -> Option<ShapeId> {
        let mut figures = Vec::new();
        for id in shapes {
            Self::segments(doc, *id, &mut figures);
        }
        if figures.is_empty() {
            return None;
        }
        let style = shapes.first().and_then(|s| doc.get(*s)).and_then(|s| s.style.clone());
        let figure_ids = figures
            .into_iter()
            .map(|(segments, is_closed)| {
                doc.insert(Shape::new(
                    ShapeKind::Figure {
                        shapes: segments,
                        is_closed,
                        is_filled: is_closed,
                    },
                    style.clone(),
                ))
            })
            .collect();
        Some(doc.insert(Shape::new(
            ShapeKind::Path {
                figures: figure_ids,
                fill_rule: FillRule::EvenOdd,
            },
            style,
        )))
    }

    fn to_svg_path_data(&self, doc: &Document, shapes: &[ShapeId]) -> Option<String> {
        // Work on a scratch copy so rectangle and ellipse corners are not
        // added to the caller's document.
        let mut scratch = doc.clone();
        let mut figures = Vec::new();
        for id in shapes {
            Self::segments(&mut scratch, *id, &mut figures);
        }
        let mut data = String::new();
        for (segments, is_closed) in figures {
            let mut first = true;
            for segment in segments {
                let positions = scratch.structural_positions(segment);
                let Some(kind) = scratch.kind(segment) else {
                    continue;
                };
                if first {
                    let Some(start) = positions.first() else {
                        continue;
                    };
                    data.push_str(if data.is_empty() { "M" } else { " M" });
                    fmt_point(&mut data, *start);
                    first = false;
                }
                match (kind, positions.as_slice()) {
                    (ShapeKind::Line { .. }, [_, end]) => {
                        data.push_str(" L");
                        fmt_point(&mut data, *end);
                    }
                    (ShapeKind::CubicBezier { .. }, [_, p1, p2, p3]) => {
                        data.push_str(" C");
                        fmt_point(&mut data, *p1);
                        data.push(' ');
                        fmt_point(&mut data, *p2);
                        data.push(' ');
                        fmt_point(&mut data, *p3);
                    }
                    (ShapeKind::QuadraticBezier { .. }, [_, p1, p2]) => {
                        data.push_str(" Q");
                        fmt_point(&mut data, *p1);
                        data.push(' ');
                        fmt_point(&mut data, *p2);
                    }
                    // SVG has no conics: emit a polyline
                    (ShapeKind::Conic { weight, .. }, [p0, p1, p2]) => {
                        for p in flatten_conic(*p0, *p1, *p2, *weight, 8).into_iter().skip(1) {
                            data.push_str(" L");
                            fmt_point(&mut data, p);
                        }
                    }
                    _ => {}
                }
            }
            if is_closed && !first {
                data.push_str(" Z");
            }
        }
        (!data.is_empty()).then_some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connected_lines_share_a_figure() {
        let mut doc = Document::new();
        let a = doc.add_point(pos2(0.0, 0.0), None, None);
        let b = doc.add_point(pos2(10.0, 0.0), None, None);
        let c = doc.add_point(pos2(10.0, 10.0), None, None);
        let l1 = doc.insert(Shape::new(ShapeKind::Line { start: a, end: b }, None));
        let l2 = doc.insert(Shape::new(ShapeKind::Line { start: b, end: c }, None));

        let converter = GeometryPathConverter;
        let path = converter.to_path_shape(&mut doc, &[l1, l2]).unwrap();
        assert_eq!(doc.shapes_of(path).len(), 1);
        let figure = doc.shapes_of(path)[0];
        assert_eq!(doc.shapes_of(figure), &[l1, l2]);

        let data = converter.to_svg_path_data(&doc, &[l1, l2]).unwrap();
        assert_eq!(data, "M0,0 L10,0 L10,10");
    }

    #[test]
    fn test_rectangle_closes() {
        let mut doc = Document::new();
        let a = doc.add_point(pos2(0.0, 0.0), None, None);
        let b = doc.add_point(pos2(10.0, 5.0), None, None);
        let rect = doc.insert(Shape::new(
            ShapeKind::Rectangle {
                top_left: a,
                bottom_right: b,
                radius_x: 0.0,
                radius_y: 0.0,
            },
            None,
        ));
        let before = doc.len();
        let data = GeometryPathConverter.to_svg_path_data(&doc, &[rect]).unwrap();
        assert_eq!(data, "M0,0 L10,0 L10,5 L0,5 L0,0 Z");
        assert_eq!(doc.len(), before);
    }
}
