//! The shape arena.
//!
//! All shapes of a drawing live in one map keyed by [`ShapeId`]. Canvases,
//! figures, paths and groups hold ordered id lists, which is how the same point
//! can be the end of several lines at once: moving it moves all of them.

use std::collections::{BTreeMap, HashMap, HashSet};

use egui::{Pos2, Rect, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};
use crate::shape::{Shape, ShapeId, ShapeKind, ShapeStyle, StyleId};

/// Named styles plus the one stamped onto newly drawn shapes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleLibrary {
    pub styles: BTreeMap<StyleId, ShapeStyle>,
    pub current: Option<StyleId>,
    /// Style given to newly created points
    pub point_style: Option<StyleId>,
}

impl StyleLibrary {
    pub fn get(&self, id: &str) -> Option<&ShapeStyle> {
        self.styles.get(id)
    }

    pub fn insert(&mut self, id: impl Into<StyleId>, style: ShapeStyle) {
        self.styles.insert(id.into(), style);
    }
}

/// A group registered as a reusable template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupTemplate {
    pub title: String,
    pub group: ShapeId,
}

/// Group templates looked up by title. Template shapes live in the arena
/// outside any canvas and survive pruning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupLibrary {
    pub templates: Vec<GroupTemplate>,
}

impl GroupLibrary {
    pub fn find(&self, title: &str) -> Option<ShapeId> {
        self.templates.iter().find(|t| t.title == title).map(|t| t.group)
    }

    pub fn add(&mut self, title: impl Into<String>, group: ShapeId) {
        let title = title.into();
        self.templates.retain(|t| t.title != title);
        self.templates.push(GroupTemplate { title, group });
    }
}

/// A detached copy of some shapes and everything they reach.
///
/// Importing a fragment gives every shape a fresh id, so the same fragment
/// can be pasted repeatedly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fragment {
    pub roots: Vec<ShapeId>,
    shapes: HashMap<ShapeId, Shape>,
}

impl Fragment {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    shapes: HashMap<ShapeId, Shape>,
    pub styles: StyleLibrary,
    pub groups: GroupLibrary,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape to the arena (not to any container).
    pub fn insert(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id;
        self.shapes.insert(id, shape);
        id
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    pub fn kind(&self, id: ShapeId) -> Option<&ShapeKind> {
        self.shapes.get(&id).map(|s| &s.kind)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    /// Drop a shape from the arena. References to it are left untouched.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        self.shapes.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn is_point(&self, id: ShapeId) -> bool {
        self.get(id).is_some_and(Shape::is_point)
    }

    pub fn add_point(&mut self, position: Pos2, style: Option<StyleId>, owner: Option<ShapeId>) -> ShapeId {
        let mut point = Shape::point(position, style);
        point.owner = owner;
        self.insert(point)
    }

    pub fn add_canvas(&mut self, width: f32, height: f32) -> ShapeId {
        self.insert(Shape::new(
            ShapeKind::Canvas {
                shapes: Vec::new(),
                guides: Vec::new(),
                width,
                height,
            },
            None,
        ))
    }

    pub fn position(&self, id: ShapeId) -> Option<Pos2> {
        self.get(id).and_then(Shape::position)
    }

    /// Move a point. Non-point ids are ignored.
    pub fn set_position(&mut self, id: ShapeId, to: Pos2) {
        if let Some(shape) = self.shapes.get_mut(&id) {
            if let ShapeKind::Point { position } = &mut shape.kind {
                *position = to;
                shape.is_dirty = true;
            }
        }
    }

    pub fn mark_dirty(&mut self, id: ShapeId) {
        if let Some(shape) = self.shapes.get_mut(&id) {
            shape.is_dirty = true;
        }
    }

    // --- containers ----------------------------------------------------------

    /// Ordered children of a canvas, figure, group or path. Empty for anything else.
    pub fn shapes_of(&self, container: ShapeId) -> &[ShapeId] {
        self.kind(container).map(ShapeKind::children).unwrap_or(&[])
    }

    /// Guide lines of a canvas. Other containers have none.
    pub fn guides_of(&self, container: ShapeId) -> &[ShapeId] {
        match self.kind(container) {
            Some(ShapeKind::Canvas { guides, .. }) => guides,
            _ => &[],
        }
    }

    fn children_mut(&mut self, container: ShapeId) -> EditorResult<&mut Vec<ShapeId>> {
        let shape = self
            .shapes
            .get_mut(&container)
            .ok_or(EditorError::ShapeNotFound(container))?;
        shape.is_dirty = true;
        match &mut shape.kind {
            ShapeKind::Canvas { shapes, .. }
            | ShapeKind::Figure { shapes, .. }
            | ShapeKind::Group { shapes, .. } => Ok(shapes),
            ShapeKind::Path { figures, .. } => Ok(figures),
            _ => Err(EditorError::NotAContainer(container)),
        }
    }

    /// Append a shape to a container.
    ///
    /// # Errors
    ///
    /// Fails if `container` is missing or cannot hold shapes.
    pub fn add_shape(&mut self, container: ShapeId, id: ShapeId) -> EditorResult<()> {
        self.children_mut(container)?.push(id);
        Ok(())
    }

    /// Insert a shape at `index` (clamped to the end).
    ///
    /// # Errors
    ///
    /// Fails if `container` is missing or cannot hold shapes.
    pub fn insert_shape(&mut self, container: ShapeId, index: usize, id: ShapeId) -> EditorResult<()> {
        let children = self.children_mut(container)?;
        let index = index.min(children.len());
        children.insert(index, id);
        Ok(())
    }

    /// Replace the whole child list of a container, e.g. after reordering.
    ///
    /// # Errors
    ///
    /// Fails if `container` is missing or cannot hold shapes.
    pub fn set_shapes(&mut self, container: ShapeId, shapes: Vec<ShapeId>) -> EditorResult<()> {
        *self.children_mut(container)? = shapes;
        Ok(())
    }

    /// Remove a shape from a container, returning whether it was there.
    pub fn remove_shape(&mut self, container: ShapeId, id: ShapeId) -> bool {
        match self.children_mut(container) {
            Ok(children) => {
                let before = children.len();
                children.retain(|s| *s != id);
                before != children.len()
            }
            Err(_) => false,
        }
    }

    pub fn contains_shape(&self, container: ShapeId, id: ShapeId) -> bool {
        self.shapes_of(container).contains(&id)
    }

    /// Add a guide line to a canvas. Other containers silently ignore guides.
    pub fn add_guide(&mut self, container: ShapeId, id: ShapeId) {
        if let Some(shape) = self.shapes.get_mut(&container) {
            if let ShapeKind::Canvas { guides, .. } = &mut shape.kind {
                guides.push(id);
                shape.is_dirty = true;
            }
        }
    }

    pub fn remove_guide(&mut self, container: ShapeId, id: ShapeId) -> bool {
        if let Some(shape) = self.shapes.get_mut(&container) {
            if let ShapeKind::Canvas { guides, .. } = &mut shape.kind {
                let before = guides.len();
                guides.retain(|g| *g != id);
                shape.is_dirty = true;
                return before != guides.len();
            }
        }
        false
    }

    /// Width and height of a canvas
    pub fn canvas_size(&self, container: ShapeId) -> Option<Vec2> {
        match self.kind(container) {
            Some(ShapeKind::Canvas { width, height, .. }) => Some(Vec2::new(*width, *height)),
            _ => None,
        }
    }

    // --- points --------------------------------------------------------------

    /// Distinct points reachable from `id` (the point itself for a point).
    /// References are skipped: their template geometry is shared.
    pub fn points_of(&self, id: ShapeId) -> Vec<ShapeId> {
        let mut seen = HashSet::new();
        let mut points = Vec::new();
        self.collect_points(id, &mut seen, &mut points);
        points
    }

    fn collect_points(&self, id: ShapeId, seen: &mut HashSet<ShapeId>, points: &mut Vec<ShapeId>) {
        let Some(shape) = self.get(id) else {
            return;
        };
        if shape.is_point() {
            if seen.insert(id) {
                points.push(id);
            }
            return;
        }
        for point in shape.direct_points() {
            self.collect_points(point, seen, points);
        }
        for child in shape.kind.children() {
            self.collect_points(*child, seen, points);
        }
    }

    /// Positions of the structural points of `id`, in order.
    pub fn structural_positions(&self, id: ShapeId) -> Vec<Pos2> {
        self.kind(id)
            .map(|k| {
                k.structural_points()
                    .into_iter()
                    .filter_map(|p| self.position(p))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Translate shapes by `delta`, moving each distinct point exactly once.
    /// References move their offset instead of their template.
    pub fn translate(&mut self, ids: &[ShapeId], delta: Vec2) {
        let mut seen = HashSet::new();
        let mut points = Vec::new();
        for id in ids {
            if let Some(ShapeKind::Reference { .. }) = self.kind(*id) {
                if let Some(shape) = self.shapes.get_mut(id) {
                    if let ShapeKind::Reference { offset, .. } = &mut shape.kind {
                        *offset += delta;
                    }
                    shape.is_dirty = true;
                }
                continue;
            }
            self.collect_points(*id, &mut seen, &mut points);
            self.mark_dirty(*id);
        }
        for point in points {
            if let Some(p) = self.position(point) {
                self.set_position(point, p + delta);
            }
        }
    }

    /// Shapes inside `container` (recursively) whose structure or point list
    /// refers to `point`, in container order.
    pub fn shapes_referencing(&self, container: ShapeId, point: ShapeId) -> Vec<ShapeId> {
        let mut found = Vec::new();
        self.collect_referencing(container, point, &mut found);
        found
    }

    fn collect_referencing(&self, container: ShapeId, point: ShapeId, found: &mut Vec<ShapeId>) {
        for id in self.shapes_of(container) {
            let Some(shape) = self.get(*id) else {
                continue;
            };
            if shape.direct_points().contains(&point) {
                found.push(*id);
            }
            if !shape.kind.children().is_empty() {
                self.collect_referencing(*id, point, found);
            }
        }
    }

    /// Make every shape in the arena that refers to `from` refer to `to` instead.
    /// Returns how many shapes changed.
    pub fn replace_point(&mut self, from: ShapeId, to: ShapeId) -> usize {
        let mut changed = 0;
        for shape in self.shapes.values_mut() {
            let mut hit = shape.kind.replace_point(from, to);
            for p in &mut shape.points {
                if *p == from {
                    *p = to;
                    hit = true;
                }
            }
            if hit {
                shape.is_dirty = true;
                changed += 1;
            }
        }
        changed
    }

    /// Replace `from` with `to` inside one shape only.
    pub fn replace_point_in(&mut self, shape: ShapeId, from: ShapeId, to: ShapeId) -> bool {
        let Some(shape) = self.shapes.get_mut(&shape) else {
            return false;
        };
        let mut hit = shape.kind.replace_point(from, to);
        for p in &mut shape.points {
            if *p == from {
                *p = to;
                hit = true;
            }
        }
        shape.is_dirty |= hit;
        hit
    }

    /// End point of the last segment of a figure, `None` if the figure is empty.
    ///
    /// # Errors
    ///
    /// Fails if `figure` is not a figure, or if its last shape is not a segment.
    pub fn last_point(&self, figure: ShapeId) -> EditorResult<Option<ShapeId>> {
        let Some(ShapeKind::Figure { shapes, .. }) = self.kind(figure) else {
            return Err(EditorError::NotAContainer(figure));
        };
        let Some(last) = shapes.last() else {
            return Ok(None);
        };
        let kind = self.kind(*last).ok_or(EditorError::ShapeNotFound(*last))?;
        match kind {
            ShapeKind::Line { end, .. } => Ok(Some(*end)),
            ShapeKind::CubicBezier { point3, .. } => Ok(Some(*point3)),
            ShapeKind::QuadraticBezier { point2, .. } | ShapeKind::Conic { point2, .. } => Ok(Some(*point2)),
            other => Err(EditorError::MissingLastPoint {
                figure,
                kind: other.name(),
            }),
        }
    }

    // --- geometry ------------------------------------------------------------

    /// Axis-aligned bounds of a shape, `None` when it has no geometry.
    pub fn bounds(&self, id: ShapeId) -> Option<Rect> {
        let shape = self.get(id)?;
        let rect = match &shape.kind {
            ShapeKind::Point { position } => Rect::from_min_max(*position, *position),
            ShapeKind::Circle { center, point } => {
                let c = self.position(*center)?;
                let r = c.distance(self.position(*point)?);
                Rect::from_center_size(c, Vec2::splat(r * 2.0))
            }
            ShapeKind::Reference { template, offset, .. } => self.bounds(*template)?.translate(*offset),
            ShapeKind::Figure { .. }
            | ShapeKind::Path { .. }
            | ShapeKind::Group { .. }
            | ShapeKind::Canvas { .. } => {
                let mut rect = Rect::NOTHING;
                for child in shape.kind.children().iter().chain(shape.points.iter()) {
                    if let Some(r) = self.bounds(*child) {
                        rect = rect.union(r);
                    }
                }
                if rect == Rect::NOTHING {
                    return None;
                }
                rect
            }
            _ => {
                let positions: Vec<Pos2> = shape
                    .direct_points()
                    .into_iter()
                    .filter_map(|p| self.position(p))
                    .collect();
                if positions.is_empty() {
                    return None;
                }
                Rect::from_points(&positions)
            }
        };
        Some(rect)
    }

    /// Bounds of several shapes together.
    pub fn bounds_of_all(&self, ids: &[ShapeId]) -> Option<Rect> {
        ids.iter()
            .filter_map(|id| self.bounds(*id))
            .reduce(|a, b| a.union(b))
    }

    // --- copying -------------------------------------------------------------

    /// Clone `roots` and everything they reach into a detached fragment.
    pub fn extract(&self, roots: &[ShapeId]) -> Fragment {
        let mut shapes = HashMap::new();
        let mut stack: Vec<ShapeId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            if shapes.contains_key(&id) {
                continue;
            }
            let Some(shape) = self.get(id) else {
                continue;
            };
            stack.extend(shape.direct_points());
            stack.extend_from_slice(shape.kind.children());
            if let ShapeKind::Canvas { guides, .. } = &shape.kind {
                stack.extend_from_slice(guides);
            }
            shapes.insert(id, shape.clone());
        }
        Fragment {
            roots: roots.iter().copied().filter(|r| shapes.contains_key(r)).collect(),
            shapes,
        }
    }

    /// Insert a fragment under fresh ids.
    ///
    /// A remapping table (old id to new id) is built for every shape up front
    /// and applied to every reference, so points shared inside the fragment
    /// stay shared between the copies. Returns the new ids of the roots.
    pub fn import(&mut self, fragment: &Fragment) -> Vec<ShapeId> {
        let table: HashMap<ShapeId, ShapeId> = fragment
            .shapes
            .keys()
            .map(|old| (*old, ShapeId::new()))
            .collect();

        for (old, shape) in &fragment.shapes {
            let mut copy = shape.clone();
            copy.id = table[old];
            copy.kind.remap(&mut |id| table.get(&id).copied().unwrap_or(id));
            for p in &mut copy.points {
                *p = table.get(p).copied().unwrap_or(*p);
            }
            copy.owner = copy.owner.and_then(|o| table.get(&o).copied());
            copy.is_dirty = true;
            self.shapes.insert(copy.id, copy);
        }

        debug!("imported {} shapes ({} roots)", fragment.shapes.len(), fragment.roots.len());
        fragment.roots.iter().map(|r| table[r]).collect()
    }

    /// Deep copy shapes inside this document.
    pub fn deep_copy(&mut self, roots: &[ShapeId]) -> Vec<ShapeId> {
        let fragment = self.extract(roots);
        self.import(&fragment)
    }

    // --- housekeeping --------------------------------------------------------

    /// Remove arena entries unreachable from any canvas or library template.
    /// Returns how many shapes were dropped.
    pub fn prune(&mut self) -> usize {
        let mut roots: Vec<ShapeId> = self
            .shapes
            .values()
            .filter(|s| matches!(s.kind, ShapeKind::Canvas { .. }))
            .map(|s| s.id)
            .collect();
        roots.extend(self.groups.templates.iter().map(|t| t.group));

        let mut reachable: HashSet<ShapeId> = HashSet::new();
        let mut stack = roots;
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                continue;
            }
            let Some(shape) = self.get(id) else {
                continue;
            };
            stack.extend(shape.direct_points());
            stack.extend_from_slice(shape.kind.children());
            match &shape.kind {
                ShapeKind::Canvas { guides, .. } => stack.extend_from_slice(guides),
                ShapeKind::Reference { template, .. } => stack.push(*template),
                _ => {}
            }
        }

        let before = self.shapes.len();
        self.shapes.retain(|id, _| reachable.contains(id));
        let removed = before - self.shapes.len();
        if removed > 0 {
            debug!("pruned {removed} unreachable shapes");
        }
        removed
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn line(doc: &mut Document, a: ShapeId, b: ShapeId) -> ShapeId {
        doc.insert(Shape::new(ShapeKind::Line { start: a, end: b }, None))
    }

    #[test]
    fn test_shared_point_moves_once() {
        let mut doc = Document::new();
        let a = doc.add_point(pos2(0.0, 0.0), None, None);
        let b = doc.add_point(pos2(10.0, 0.0), None, None);
        let c = doc.add_point(pos2(10.0, 10.0), None, None);
        let l1 = line(&mut doc, a, b);
        let l2 = line(&mut doc, b, c);

        doc.translate(&[l1, l2], vec2(1.0, 1.0));

        assert_eq!(doc.position(b), Some(pos2(11.0, 1.0)));
        assert_eq!(doc.position(a), Some(pos2(1.0, 1.0)));
    }

    #[test]
    fn test_deep_copy_keeps_sharing_inside_copy() {
        let mut doc = Document::new();
        let a = doc.add_point(pos2(0.0, 0.0), None, None);
        let b = doc.add_point(pos2(10.0, 0.0), None, None);
        let c = doc.add_point(pos2(10.0, 10.0), None, None);
        let l1 = line(&mut doc, a, b);
        let l2 = line(&mut doc, b, c);

        let copies = doc.deep_copy(&[l1, l2]);
        assert_eq!(copies.len(), 2);

        let Some(ShapeKind::Line { end: e1, .. }) = doc.kind(copies[0]).cloned() else {
            panic!("expected line");
        };
        let Some(ShapeKind::Line { start: s2, .. }) = doc.kind(copies[1]).cloned() else {
            panic!("expected line");
        };
        assert_eq!(e1, s2);
        assert_ne!(e1, b);
    }

    #[test]
    fn test_prune_keeps_reachable() {
        let mut doc = Document::new();
        let canvas = doc.add_canvas(100.0, 100.0);
        let a = doc.add_point(pos2(0.0, 0.0), None, None);
        let b = doc.add_point(pos2(10.0, 0.0), None, None);
        let l = line(&mut doc, a, b);
        doc.add_shape(canvas, l).unwrap();
        let orphan = doc.add_point(pos2(5.0, 5.0), None, None);

        assert_eq!(doc.prune(), 1);
        assert!(!doc.contains(orphan));
        assert!(doc.contains(a));
    }

    #[test]
    fn test_last_point_rejects_unknown_tail() {
        let mut doc = Document::new();
        let p = doc.add_point(pos2(0.0, 0.0), None, None);
        let figure = doc.insert(Shape::new(
            ShapeKind::Figure {
                shapes: vec![p],
                is_closed: false,
                is_filled: false,
            },
            None,
        ));
        assert!(matches!(
            doc.last_point(figure),
            Err(EditorError::MissingLastPoint { .. })
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_identity() {
        let mut doc = Document::new();
        let canvas = doc.add_canvas(100.0, 100.0);
        let a = doc.add_point(pos2(0.0, 0.0), None, None);
        let b = doc.add_point(pos2(10.0, 0.0), None, None);
        let l = line(&mut doc, a, b);
        doc.add_shape(canvas, l).unwrap();

        let json = doc.to_json().unwrap();
        let restored = Document::from_json(&json).unwrap();
        assert_eq!(restored.shapes_of(canvas), &[l]);
        assert_eq!(restored.position(b), Some(pos2(10.0, 0.0)));
    }
}
