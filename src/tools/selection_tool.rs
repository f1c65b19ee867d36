use egui::{Modifiers, Pos2, Rect, Vec2, vec2};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{Tool, ToolOutcome, create_shape, find_point, move_points, new_point, structural_points};
use crate::context::ToolContext;
use crate::document::Fragment;
use crate::error::EditorResult;
use crate::geometry::hit_testing::DEFAULT_HIT_RADIUS;
use crate::input::is_held;
use crate::shape::{ShapeId, ShapeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionToolState {
    #[default]
    None,
    /// Dragging a selection rectangle
    Selection,
    /// Pressed on a shape; dragging moves the selection
    Move,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionToolSettings {
    /// Held to add to (or toggle within) the selection instead of replacing it
    pub selection_modifier: Modifiers,
    /// Held on release to merge a dragged point into the point under it
    pub connection_modifier: Modifiers,
    /// Held while dragging a single point to detach it from other shapes
    pub disconnect_modifier: Modifiers,
    /// Held when a drag starts to move a copy of the selection
    pub copy_modifier: Modifiers,
    pub connect_points: bool,
    pub disconnect_points: bool,
    pub hit_threshold: f32,
    pub connect_threshold: f32,
    /// Distance a point must travel before it is detached
    pub disconnect_threshold: f32,
}

impl Default for SelectionToolSettings {
    fn default() -> Self {
        Self {
            selection_modifier: Modifiers::SHIFT,
            connection_modifier: Modifiers::ALT,
            disconnect_modifier: Modifiers::SHIFT,
            copy_modifier: Modifiers::CTRL,
            connect_points: true,
            disconnect_points: true,
            hit_threshold: DEFAULT_HIT_RADIUS,
            connect_threshold: DEFAULT_HIT_RADIUS,
            disconnect_threshold: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    Left,
    Centered,
    Right,
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distribute {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stack {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZOrder {
    BringToFront,
    BringForward,
    SendBackward,
    SendToBack,
}

/// Operations on the current selection that are not pointer gestures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionCommand {
    Cut,
    Copy,
    Paste,
    Duplicate,
    Delete,
    Group,
    /// Ungroup groups, split paths into their segments and turn references
    /// into private copies of their template
    Break,
    CreatePath,
    CopyAsPathData,
    /// Register selected groups as templates and replace them by references
    Reference,
    InsertReference(String),
    Align(Align),
    Distribute(Distribute),
    Stack(Stack),
    ZOrder(ZOrder),
    SelectAll,
    DeselectAll,
    Connect,
    Disconnect,
}

/// Selects, moves, connects and disconnects shapes, and runs the
/// [`SelectionCommand`]s.
///
/// A press on empty space starts a selection rectangle; a press on a point
/// or shape starts a move. A click that does not drag is only resolved on
/// release: on an already selected target it deselects it when the
/// selection modifier is held and selects it alone otherwise.
#[derive(Debug, Clone)]
pub struct SelectionTool {
    pub settings: SelectionToolSettings,
    state: SelectionToolState,
    start: Pos2,
    previous: Pos2,
    rectangle: Option<ShapeId>,
    target: Option<ShapeId>,
    was_selected: bool,
    extend: bool,
    copy: bool,
    copied: bool,
    disconnected: bool,
    moved: bool,
    clipboard: Option<Fragment>,
    path_data: Option<String>,
}

impl Default for SelectionTool {
    fn default() -> Self {
        Self::new(SelectionToolSettings::default())
    }
}

impl SelectionTool {
    pub fn new(settings: SelectionToolSettings) -> Self {
        Self {
            settings,
            state: SelectionToolState::None,
            start: Pos2::ZERO,
            previous: Pos2::ZERO,
            rectangle: None,
            target: None,
            was_selected: false,
            extend: false,
            copy: false,
            copied: false,
            disconnected: false,
            moved: false,
            clipboard: None,
            path_data: None,
        }
    }

    pub fn state(&self) -> SelectionToolState {
        self.state
    }

    pub fn clipboard(&self) -> Option<&Fragment> {
        self.clipboard.as_ref()
    }

    /// SVG path data produced by the last [`SelectionCommand::CopyAsPathData`]
    pub fn path_data(&self) -> Option<&str> {
        self.path_data.as_deref()
    }

    /// Point or shape under `pos`; points win over the shapes they belong to.
    fn hit_target(&self, ctx: &dyn ToolContext, pos: Pos2, modifier: Modifiers) -> Option<ShapeId> {
        let radius = self.settings.hit_threshold;
        if let Some(point) = find_point(ctx, pos, radius, modifier, None) {
            return Some(point);
        }
        let hit_test = ctx.hit_test()?;
        let doc = ctx.document();
        let shapes = doc.shapes_of(ctx.current_container());
        hit_test.try_to_get_shape(doc, shapes, pos, radius, ctx.view_scale(), modifier)
    }

    fn single_point(ctx: &dyn ToolContext) -> Option<ShapeId> {
        ctx.selection().single().filter(|id| ctx.document().is_point(*id))
    }

    fn remove_rectangle(&mut self, ctx: &mut dyn ToolContext) {
        let Some(rectangle) = self.rectangle.take() else {
            return;
        };
        let points = structural_points(ctx, rectangle);
        let working = ctx.working_container();
        let doc = ctx.document_mut();
        doc.remove_shape(working, rectangle);
        doc.remove(rectangle);
        for point in points {
            doc.remove(point);
        }
    }

    fn end_gesture(&mut self, ctx: &mut dyn ToolContext) {
        self.target = None;
        self.state = SelectionToolState::None;
        ctx.release();
        ctx.redraw();
    }

    fn drag(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<()> {
        let delta = pos - self.previous;
        if delta == Vec2::ZERO {
            return Ok(());
        }
        self.moved = true;

        if self.copy && !self.copied {
            self.copied = true;
            duplicate(ctx)?;
        }

        if let Some(point) = Self::single_point(ctx) {
            let far_enough = pos.distance(self.start) > self.settings.disconnect_threshold / ctx.view_scale();
            if self.settings.disconnect_points
                && !self.disconnected
                && far_enough
                && is_held(modifier, self.settings.disconnect_modifier)
            {
                self.disconnected = disconnect_point(ctx, point);
            }
        }

        let selected = ctx.selection().snapshot();
        ctx.document_mut().translate(&selected, delta);
        self.previous = pos;
        ctx.redraw();
        Ok(())
    }

    /// Run a non-pointer operation on a snapshot of the selection.
    ///
    /// Returns [`ToolOutcome::Committed`] with the affected shapes when the
    /// document changed.
    ///
    /// # Errors
    ///
    /// Fails if the current container is not a container.
    pub fn execute(&mut self, ctx: &mut dyn ToolContext, command: SelectionCommand) -> EditorResult<ToolOutcome> {
        self.clean(ctx);
        debug!("selection command {command:?}");
        let affected = match command {
            SelectionCommand::Cut => {
                self.copy_selection(ctx);
                delete(ctx)?
            }
            SelectionCommand::Copy => {
                self.copy_selection(ctx);
                Vec::new()
            }
            SelectionCommand::Paste => self.paste(ctx)?,
            SelectionCommand::Duplicate => duplicate(ctx)?,
            SelectionCommand::Delete => delete(ctx)?,
            SelectionCommand::Group => group(ctx)?,
            SelectionCommand::Break => break_apart(ctx)?,
            SelectionCommand::CreatePath => create_path(ctx)?,
            SelectionCommand::CopyAsPathData => {
                self.copy_as_path_data(ctx);
                Vec::new()
            }
            SelectionCommand::Reference => reference(ctx)?,
            SelectionCommand::InsertReference(title) => insert_reference(ctx, title)?,
            SelectionCommand::Align(align) => align_selection(ctx, align),
            SelectionCommand::Distribute(axis) => distribute(ctx, axis == Distribute::Horizontal),
            SelectionCommand::Stack(axis) => stack(ctx, axis == Stack::Horizontal),
            SelectionCommand::ZOrder(order) => z_order(ctx, order)?,
            SelectionCommand::SelectAll => {
                let all = ctx.document().shapes_of(ctx.current_container()).to_vec();
                ctx.selection_mut().select_all(all);
                Vec::new()
            }
            SelectionCommand::DeselectAll => {
                ctx.selection_mut().clear();
                ctx.selection_mut().dehover();
                Vec::new()
            }
            SelectionCommand::Connect => connect_selected(ctx, self.settings.connect_threshold),
            SelectionCommand::Disconnect => disconnect_selected(ctx),
        };
        ctx.redraw();
        if affected.is_empty() {
            Ok(ToolOutcome::None)
        } else {
            Ok(ToolOutcome::Committed(affected))
        }
    }

    fn copy_selection(&mut self, ctx: &dyn ToolContext) {
        let roots = top_level_selected(ctx);
        if roots.is_empty() {
            return;
        }
        let fragment = ctx.document().extract(&roots);
        debug!("copied {} shapes", fragment.len());
        self.clipboard = Some(fragment);
    }

    fn paste(&self, ctx: &mut dyn ToolContext) -> EditorResult<Vec<ShapeId>> {
        let Some(fragment) = &self.clipboard else {
            return Ok(Vec::new());
        };
        let current = ctx.current_container();
        let pasted = ctx.document_mut().import(fragment);
        for id in &pasted {
            ctx.document_mut().add_shape(current, *id)?;
        }
        ctx.selection_mut().clear();
        ctx.selection_mut().select_all(pasted.iter().copied());
        Ok(pasted)
    }

    fn copy_as_path_data(&mut self, ctx: &dyn ToolContext) {
        let shapes = top_level_selected(ctx);
        let Some(converter) = ctx.path_converter() else {
            debug!("no path converter, nothing copied");
            return;
        };
        self.path_data = converter.to_svg_path_data(ctx.document(), &shapes);
    }
}

impl Tool for SelectionTool {
    fn name(&self) -> &'static str {
        "Selection"
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            SelectionToolState::None => "None",
            SelectionToolState::Selection => "Selection",
            SelectionToolState::Move => "Move",
        }
    }

    fn left_down(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if self.state != SelectionToolState::None {
            return Ok(ToolOutcome::None);
        }
        self.start = pos;
        self.previous = pos;
        self.moved = false;
        self.copied = false;
        self.disconnected = false;
        self.copy = is_held(modifier, self.settings.copy_modifier);
        self.extend = is_held(modifier, self.settings.selection_modifier);

        match self.hit_target(ctx, pos, modifier) {
            Some(target) => {
                self.target = Some(target);
                self.was_selected = ctx.selection().is_selected(target);
                if !self.was_selected {
                    if !self.extend {
                        ctx.selection_mut().clear();
                    }
                    ctx.selection_mut().select(target);
                }
                self.state = SelectionToolState::Move;
            }
            None => {
                if !self.extend {
                    ctx.selection_mut().clear();
                }
                let top_left = new_point(ctx, pos);
                let bottom_right = new_point(ctx, pos);
                let rectangle = create_shape(
                    ctx,
                    ShapeKind::Rectangle {
                        top_left,
                        bottom_right,
                        radius_x: 0.0,
                        radius_y: 0.0,
                    },
                );
                let working = ctx.working_container();
                ctx.document_mut().add_shape(working, rectangle)?;
                self.rectangle = Some(rectangle);
                self.state = SelectionToolState::Selection;
            }
        }
        ctx.capture();
        ctx.redraw();
        Ok(ToolOutcome::None)
    }

    fn left_up(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        match self.state {
            SelectionToolState::None => Ok(ToolOutcome::None),
            SelectionToolState::Selection => {
                self.remove_rectangle(ctx);
                let rect = Rect::from_two_pos(self.start, pos);
                let found = ctx.hit_test().and_then(|hit_test| {
                    let doc = ctx.document();
                    let shapes = doc.shapes_of(ctx.current_container());
                    hit_test.try_to_get_shapes(doc, shapes, rect, self.settings.hit_threshold, ctx.view_scale(), modifier)
                });
                if let Some(found) = found {
                    debug!("rectangle selected {} shapes", found.len());
                    ctx.selection_mut().select_all(found);
                }
                self.end_gesture(ctx);
                Ok(ToolOutcome::None)
            }
            SelectionToolState::Move => {
                let outcome = if self.moved {
                    if let Some(point) = Self::single_point(ctx) {
                        if self.settings.connect_points && is_held(modifier, self.settings.connection_modifier) {
                            connect_point(ctx, point, self.settings.connect_threshold);
                        }
                    }
                    ToolOutcome::Committed(ctx.selection().snapshot())
                } else {
                    if let (Some(target), true) = (self.target, self.was_selected) {
                        if self.extend {
                            ctx.selection_mut().deselect(target);
                        } else {
                            ctx.selection_mut().clear();
                            ctx.selection_mut().select(target);
                        }
                    }
                    ToolOutcome::None
                };
                self.end_gesture(ctx);
                Ok(outcome)
            }
        }
    }

    fn right_down(&mut self, ctx: &mut dyn ToolContext, _pos: Pos2, _modifier: Modifiers) -> EditorResult<ToolOutcome> {
        if self.state != SelectionToolState::Selection {
            return Ok(ToolOutcome::None);
        }
        self.clean(ctx);
        Ok(ToolOutcome::Cancelled)
    }

    fn move_pointer(&mut self, ctx: &mut dyn ToolContext, pos: Pos2, modifier: Modifiers) -> EditorResult<ToolOutcome> {
        match self.state {
            SelectionToolState::None => {
                let target = self.hit_target(ctx, pos, modifier);
                if ctx.selection().hovered() != target {
                    match target {
                        Some(id) => ctx.selection_mut().hover(id),
                        None => ctx.selection_mut().dehover(),
                    }
                    ctx.redraw();
                }
            }
            SelectionToolState::Selection => {
                if let Some(rectangle) = self.rectangle {
                    if let [_, bottom_right] = structural_points(ctx, rectangle)[..] {
                        move_points(ctx, &[bottom_right], pos);
                    }
                }
            }
            SelectionToolState::Move => self.drag(ctx, pos, modifier)?,
        }
        Ok(ToolOutcome::None)
    }

    fn clean(&mut self, ctx: &mut dyn ToolContext) {
        self.remove_rectangle(ctx);
        self.end_gesture(ctx);
    }
}

// --- operations --------------------------------------------------------------

/// Selected shapes that sit directly in the current container, in container order.
fn top_level_selected(ctx: &dyn ToolContext) -> Vec<ShapeId> {
    let selection = ctx.selection();
    ctx.document()
        .shapes_of(ctx.current_container())
        .iter()
        .copied()
        .filter(|id| selection.is_selected(*id))
        .collect()
}

fn index_in_current(ctx: &dyn ToolContext, id: ShapeId) -> usize {
    ctx.document()
        .shapes_of(ctx.current_container())
        .iter()
        .position(|s| *s == id)
        .unwrap_or(usize::MAX)
}

/// Replace `removed` in the current container by `added`, placed where the
/// first removed shape was.
fn replace_in_current(ctx: &mut dyn ToolContext, removed: &[ShapeId], added: &[ShapeId]) -> EditorResult<()> {
    let index = removed
        .first()
        .map(|id| index_in_current(ctx, *id))
        .unwrap_or(usize::MAX);
    let current = ctx.current_container();
    let doc = ctx.document_mut();
    for id in removed {
        doc.remove_shape(current, *id);
    }
    for (i, id) in added.iter().enumerate() {
        doc.insert_shape(current, index.saturating_add(i), *id)?;
    }
    Ok(())
}

fn reselect(ctx: &mut dyn ToolContext, ids: &[ShapeId]) {
    let selection = ctx.selection_mut();
    selection.clear();
    selection.select_all(ids.iter().copied());
}

fn duplicate(ctx: &mut dyn ToolContext) -> EditorResult<Vec<ShapeId>> {
    let roots = top_level_selected(ctx);
    if roots.is_empty() {
        return Ok(Vec::new());
    }
    let current = ctx.current_container();
    let copies = ctx.document_mut().deep_copy(&roots);
    for id in &copies {
        ctx.document_mut().add_shape(current, *id)?;
    }
    reselect(ctx, &copies);
    debug!("duplicated {} shapes", copies.len());
    Ok(copies)
}

/// Remove selected shapes from the current container. A selected point that
/// is not itself in the container takes the shapes built on it along.
fn delete(ctx: &mut dyn ToolContext) -> EditorResult<Vec<ShapeId>> {
    let selected = ctx.selection().snapshot();
    let current = ctx.current_container();
    let doc = ctx.document();
    let removed: Vec<ShapeId> = doc
        .shapes_of(current)
        .iter()
        .copied()
        .filter(|id| {
            selected.contains(id)
                || doc
                    .get(*id)
                    .is_some_and(|s| s.direct_points().iter().any(|p| selected.contains(p)))
        })
        .collect();
    let doc = ctx.document_mut();
    for id in &removed {
        doc.remove_shape(current, *id);
    }
    ctx.selection_mut().clear();
    debug!("deleted {} shapes", removed.len());
    Ok(removed)
}

fn group(ctx: &mut dyn ToolContext) -> EditorResult<Vec<ShapeId>> {
    let members = top_level_selected(ctx);
    if members.is_empty() {
        return Ok(Vec::new());
    }
    let title = next_group_title(ctx);
    let group = create_shape(
        ctx,
        ShapeKind::Group {
            title,
            shapes: members.clone(),
        },
    );
    replace_in_current(ctx, &members, &[group])?;
    reselect(ctx, &[group]);
    Ok(vec![group])
}

/// "Group", then "Group 2", "Group 3"... skipping titles used by templates
/// or by groups of the current container.
fn next_group_title(ctx: &dyn ToolContext) -> String {
    let doc = ctx.document();
    let shapes = doc.shapes_of(ctx.current_container());
    let taken = |title: &str| {
        doc.groups.find(title).is_some()
            || shapes
                .iter()
                .any(|id| matches!(doc.kind(*id), Some(ShapeKind::Group { title: t, .. }) if t == title))
    };
    (1..)
        .map(|n| if n == 1 { "Group".to_string() } else { format!("Group {n}") })
        .find(|title| !taken(title))
        .unwrap_or_default()
}

fn break_apart(ctx: &mut dyn ToolContext) -> EditorResult<Vec<ShapeId>> {
    let mut pieces = Vec::new();
    for id in top_level_selected(ctx) {
        let Some(shape) = ctx.document().get(id).cloned() else {
            continue;
        };
        let parts: Vec<ShapeId> = match &shape.kind {
            ShapeKind::Group { shapes, .. } => shapes.iter().chain(shape.points.iter()).copied().collect(),
            ShapeKind::Path { figures, .. } => {
                let doc = ctx.document();
                figures.iter().flat_map(|f| doc.shapes_of(*f).to_vec()).collect()
            }
            ShapeKind::Reference { template, offset, .. } => {
                let copies = ctx.document_mut().deep_copy(&[*template]);
                ctx.document_mut().translate(&copies, *offset);
                copies
            }
            _ => continue,
        };
        replace_in_current(ctx, &[id], &parts)?;
        let doc = ctx.document_mut();
        if let ShapeKind::Path { figures, .. } = &shape.kind {
            for figure in figures {
                doc.remove(*figure);
            }
        }
        doc.remove(id);
        debug!("broke {} into {} shapes", shape.kind.name(), parts.len());
        pieces.extend(parts);
    }
    if !pieces.is_empty() {
        reselect(ctx, &pieces);
    }
    Ok(pieces)
}

fn create_path(ctx: &mut dyn ToolContext) -> EditorResult<Vec<ShapeId>> {
    let members = top_level_selected(ctx);
    if members.is_empty() {
        return Ok(Vec::new());
    }
    let path = {
        let (doc, converter) = ctx.document_with_converter();
        let Some(converter) = converter else {
            debug!("no path converter, nothing created");
            return Ok(Vec::new());
        };
        converter.to_path_shape(doc, &members)
    };
    let Some(path) = path else {
        warn!("selection could not be converted to a path");
        return Ok(Vec::new());
    };
    replace_in_current(ctx, &members, &[path])?;
    reselect(ctx, &[path]);
    Ok(vec![path])
}

fn reference(ctx: &mut dyn ToolContext) -> EditorResult<Vec<ShapeId>> {
    let mut references = Vec::new();
    for id in top_level_selected(ctx) {
        let Some(ShapeKind::Group { mut title, .. }) = ctx.document().kind(id).cloned() else {
            continue;
        };
        if ctx.document().groups.find(&title).is_some_and(|other| other != id) {
            title = next_group_title(ctx);
            if let Some(ShapeKind::Group { title: t, .. }) = ctx.document_mut().get_mut(id).map(|s| &mut s.kind) {
                *t = title.clone();
            }
        }
        ctx.document_mut().groups.add(title.clone(), id);
        let reference = create_shape(
            ctx,
            ShapeKind::Reference {
                title,
                template: id,
                offset: Vec2::ZERO,
            },
        );
        replace_in_current(ctx, &[id], &[reference])?;
        references.push(reference);
    }
    if !references.is_empty() {
        reselect(ctx, &references);
    }
    Ok(references)
}

fn insert_reference(ctx: &mut dyn ToolContext, title: String) -> EditorResult<Vec<ShapeId>> {
    let Some(template) = ctx.document().groups.find(&title) else {
        warn!("no group template titled {title:?}");
        return Ok(Vec::new());
    };
    let reference = create_shape(
        ctx,
        ShapeKind::Reference {
            title,
            template,
            offset: Vec2::ZERO,
        },
    );
    let current = ctx.current_container();
    ctx.document_mut().add_shape(current, reference)?;
    reselect(ctx, &[reference]);
    Ok(vec![reference])
}

/// Start and extent of `rect` along one axis.
fn span(rect: Rect, horizontal: bool) -> (f32, f32) {
    if horizontal {
        (rect.min.x, rect.width())
    } else {
        (rect.min.y, rect.height())
    }
}

fn along(horizontal: bool, d: f32) -> Vec2 {
    if horizontal { vec2(d, 0.0) } else { vec2(0.0, d) }
}

/// Selected shapes with their bounds, ordered along the axis.
fn sorted_bounds(ctx: &dyn ToolContext, horizontal: bool) -> Vec<(ShapeId, Rect)> {
    let doc = ctx.document();
    let mut items: Vec<(ShapeId, Rect)> = top_level_selected(ctx)
        .into_iter()
        .filter_map(|id| doc.bounds(id).map(|b| (id, b)))
        .collect();
    items.sort_by(|a, b| span(a.1, horizontal).0.total_cmp(&span(b.1, horizontal).0));
    items
}

/// Align each selected shape to the bounds of the whole selection. Shapes
/// are moved one by one, so a point shared by two of them moves twice.
fn align_selection(ctx: &mut dyn ToolContext, align: Align) -> Vec<ShapeId> {
    let members = top_level_selected(ctx);
    if members.len() < 2 {
        return Vec::new();
    }
    let Some(target) = ctx.document().bounds_of_all(&members) else {
        return Vec::new();
    };
    for id in &members {
        let Some(b) = ctx.document().bounds(*id) else {
            continue;
        };
        let delta = match align {
            Align::Left => vec2(target.min.x - b.min.x, 0.0),
            Align::Centered => vec2(target.center().x - b.center().x, 0.0),
            Align::Right => vec2(target.max.x - b.max.x, 0.0),
            Align::Top => vec2(0.0, target.min.y - b.min.y),
            Align::Center => vec2(0.0, target.center().y - b.center().y),
            Align::Bottom => vec2(0.0, target.max.y - b.max.y),
        };
        if delta != Vec2::ZERO {
            ctx.document_mut().translate(&[*id], delta);
        }
    }
    members
}

/// Equal gaps between the selected shapes; the outermost ones stay put.
fn distribute(ctx: &mut dyn ToolContext, horizontal: bool) -> Vec<ShapeId> {
    let items = sorted_bounds(ctx, horizontal);
    if items.len() < 3 {
        return Vec::new();
    }
    let (first, _) = span(items[0].1, horizontal);
    let last = items
        .iter()
        .map(|(_, b)| span(*b, horizontal))
        .map(|(start, size)| start + size)
        .fold(f32::MIN, f32::max);
    let total: f32 = items.iter().map(|(_, b)| span(*b, horizontal).1).sum();
    let gap = (last - first - total) / (items.len() - 1) as f32;

    let mut cursor = first;
    for (id, b) in &items {
        let (start, size) = span(*b, horizontal);
        ctx.document_mut().translate(&[*id], along(horizontal, cursor - start));
        cursor += size + gap;
    }
    items.into_iter().map(|(id, _)| id).collect()
}

/// Place the selected shapes edge to edge, starting at the first one.
fn stack(ctx: &mut dyn ToolContext, horizontal: bool) -> Vec<ShapeId> {
    let items = sorted_bounds(ctx, horizontal);
    if items.len() < 2 {
        return Vec::new();
    }
    let mut cursor = span(items[0].1, horizontal).0;
    for (id, b) in &items {
        let (start, size) = span(*b, horizontal);
        ctx.document_mut().translate(&[*id], along(horizontal, cursor - start));
        cursor += size;
    }
    items.into_iter().map(|(id, _)| id).collect()
}

fn z_order(ctx: &mut dyn ToolContext, order: ZOrder) -> EditorResult<Vec<ShapeId>> {
    let members = top_level_selected(ctx);
    if members.is_empty() {
        return Ok(Vec::new());
    }
    let current = ctx.current_container();
    let mut shapes = ctx.document().shapes_of(current).to_vec();
    let selected = |id: &ShapeId| members.contains(id);
    match order {
        ZOrder::BringToFront => {
            shapes.retain(|id| !selected(id));
            shapes.extend_from_slice(&members);
        }
        ZOrder::SendToBack => {
            shapes.retain(|id| !selected(id));
            shapes.splice(0..0, members.iter().copied());
        }
        ZOrder::BringForward => {
            for i in (0..shapes.len().saturating_sub(1)).rev() {
                if selected(&shapes[i]) && !selected(&shapes[i + 1]) {
                    shapes.swap(i, i + 1);
                }
            }
        }
        ZOrder::SendBackward => {
            for i in 1..shapes.len() {
                if selected(&shapes[i]) && !selected(&shapes[i - 1]) {
                    shapes.swap(i - 1, i);
                }
            }
        }
    }
    ctx.document_mut().set_shapes(current, shapes)?;
    Ok(members)
}

/// Merge `point` into the nearest other point of the current container
/// within `threshold`: every shape using `point` uses that one instead.
/// Returns the point it was merged into.
fn connect_point(ctx: &mut dyn ToolContext, point: ShapeId, threshold: f32) -> Option<ShapeId> {
    let pos = ctx.document().position(point)?;
    let target = {
        let hit_test = ctx.hit_test()?;
        let doc = ctx.document();
        let shapes = doc.shapes_of(ctx.current_container());
        hit_test.nearest_point(doc, shapes, pos, threshold, ctx.view_scale(), Some(point))?
    };
    let current = ctx.current_container();
    let doc = ctx.document_mut();
    let changed = doc.replace_point(point, target);
    doc.remove_shape(current, point);
    doc.remove(point);
    let selection = ctx.selection_mut();
    selection.deselect(point);
    selection.select(target);
    debug!("connected {point} to {target} ({changed} shapes)");
    Some(target)
}

/// Give every shape but the first one using `point` its own copy of it.
/// The owner of the point, if among them, keeps the original.
fn disconnect_point(ctx: &mut dyn ToolContext, point: ShapeId) -> bool {
    let current = ctx.current_container();
    let doc = ctx.document();
    let mut users = doc.shapes_referencing(current, point);
    if users.len() < 2 {
        return false;
    }
    let (Some(pos), Some(shape)) = (doc.position(point), doc.get(point)) else {
        return false;
    };
    let style = shape.style.clone();
    if let Some(owner) = shape.owner {
        if let Some(i) = users.iter().position(|u| *u == owner) {
            users.swap(0, i);
        }
    }

    let doc = ctx.document_mut();
    for user in &users[1..] {
        let copy = doc.add_point(pos, style.clone(), Some(*user));
        doc.replace_point_in(*user, point, copy);
    }
    debug!("disconnected {point} from {} shapes", users.len() - 1);
    true
}

/// Give a selected shape private copies of the points it shares.
fn detach_shape(ctx: &mut dyn ToolContext, shape: ShapeId) -> bool {
    let current = ctx.current_container();
    let Some(points) = ctx.document().get(shape).map(|s| s.direct_points()) else {
        return false;
    };
    let mut detached = false;
    for point in points {
        let doc = ctx.document();
        if doc.shapes_referencing(current, point).len() < 2 {
            continue;
        }
        let Some(pos) = doc.position(point) else {
            continue;
        };
        let style = doc.get(point).and_then(|p| p.style.clone());
        let doc = ctx.document_mut();
        let copy = doc.add_point(pos, style, Some(shape));
        detached |= doc.replace_point_in(shape, point, copy);
    }
    detached
}

fn connect_selected(ctx: &mut dyn ToolContext, threshold: f32) -> Vec<ShapeId> {
    let points: Vec<ShapeId> = ctx
        .selection()
        .snapshot()
        .into_iter()
        .filter(|id| ctx.document().is_point(*id))
        .collect();
    points
        .into_iter()
        .filter_map(|point| connect_point(ctx, point, threshold))
        .collect()
}

fn disconnect_selected(ctx: &mut dyn ToolContext) -> Vec<ShapeId> {
    let mut changed = Vec::new();
    for id in ctx.selection().snapshot() {
        let done = if ctx.document().is_point(id) {
            disconnect_point(ctx, id)
        } else {
            detach_shape(ctx, id)
        };
        if done {
            changed.push(id);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use egui::pos2;

    use super::*;
    use crate::context::EditorContext;
    use crate::shape::Shape;

    fn line(ctx: &mut EditorContext, a: Pos2, b: Pos2) -> ShapeId {
        let doc = &mut ctx.document;
        let start = doc.add_point(a, None, None);
        let end = doc.add_point(b, None, None);
        let id = doc.insert(Shape::new(ShapeKind::Line { start, end }, None));
        doc.add_shape(ctx.current_container, id).unwrap();
        id
    }

    #[test]
    fn test_click_selects_and_drag_moves() {
        let mut ctx = EditorContext::new(500.0, 500.0);
        let id = line(&mut ctx, pos2(0.0, 50.0), pos2(100.0, 50.0));
        let mut tool = SelectionTool::default();
        let none = Modifiers::NONE;

        tool.left_down(&mut ctx, pos2(50.0, 50.0), none).unwrap();
        assert!(ctx.selection.is_selected(id));
        tool.move_pointer(&mut ctx, pos2(50.0, 60.0), none).unwrap();
        let outcome = tool.left_up(&mut ctx, pos2(50.0, 60.0), none).unwrap();

        assert!(outcome.is_committed());
        assert_eq!(ctx.document.structural_positions(id), vec![pos2(0.0, 60.0), pos2(100.0, 60.0)]);
        assert!(!ctx.input.is_captured());
    }

    #[test]
    fn test_shift_click_on_selected_deselects() {
        let mut ctx = EditorContext::new(500.0, 500.0);
        let id = line(&mut ctx, pos2(0.0, 50.0), pos2(100.0, 50.0));
        let mut tool = SelectionTool::default();
        ctx.selection.select(id);

        tool.left_down(&mut ctx, pos2(50.0, 50.0), Modifiers::SHIFT).unwrap();
        assert!(ctx.selection.is_selected(id));
        tool.left_up(&mut ctx, pos2(50.0, 50.0), Modifiers::SHIFT).unwrap();
        assert!(!ctx.selection.is_selected(id));
    }

    #[test]
    fn test_rectangle_selects_touching_shapes() {
        let mut ctx = EditorContext::new(500.0, 500.0);
        let a = line(&mut ctx, pos2(10.0, 10.0), pos2(40.0, 10.0));
        let b = line(&mut ctx, pos2(300.0, 300.0), pos2(350.0, 300.0));
        let mut tool = SelectionTool::default();
        let none = Modifiers::NONE;

        tool.left_down(&mut ctx, pos2(100.0, 100.0), none).unwrap();
        tool.move_pointer(&mut ctx, pos2(0.0, 0.0), none).unwrap();
        assert_eq!(ctx.document.shapes_of(ctx.working_container).len(), 1);
        tool.left_up(&mut ctx, pos2(0.0, 0.0), none).unwrap();

        assert!(ctx.selection.is_selected(a));
        assert!(!ctx.selection.is_selected(b));
        assert!(ctx.document.shapes_of(ctx.working_container).is_empty());
    }

    #[test]
    fn test_z_order_bring_forward_steps_over_one() {
        let mut ctx = EditorContext::new(500.0, 500.0);
        let a = line(&mut ctx, pos2(0.0, 0.0), pos2(10.0, 0.0));
        let b = line(&mut ctx, pos2(0.0, 20.0), pos2(10.0, 20.0));
        let c = line(&mut ctx, pos2(0.0, 40.0), pos2(10.0, 40.0));
        let mut tool = SelectionTool::default();
        ctx.selection.select(a);

        tool.execute(&mut ctx, SelectionCommand::ZOrder(ZOrder::BringForward)).unwrap();
        assert_eq!(ctx.document.shapes_of(ctx.current_container), &[b, a, c]);

        tool.execute(&mut ctx, SelectionCommand::ZOrder(ZOrder::BringToFront)).unwrap();
        assert_eq!(ctx.document.shapes_of(ctx.current_container), &[b, c, a]);
    }
}
