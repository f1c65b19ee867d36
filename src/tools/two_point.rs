//! The gesture shared by shapes defined by two points.

use egui::{Modifiers, Pos2};

use super::{begin_shape, commit_shape, create_shape, discard_shape, move_points, new_point, resolve_point, structural_points};
use crate::context::ToolContext;
use crate::error::EditorResult;
use crate::shape::{ShapeId, ShapeKind};

/// First click fixes the first point, the second point follows the pointer
/// until the next click commits.
#[derive(Debug, Clone, Default)]
pub(crate) struct TwoPointGesture {
    shape: Option<ShapeId>,
}

impl TwoPointGesture {
    pub(crate) fn shape(&self) -> Option<ShapeId> {
        self.shape
    }

    pub(crate) fn begin(
        &mut self,
        ctx: &mut dyn ToolContext,
        pos: Pos2,
        modifier: Modifiers,
        (connect, radius): (bool, f32),
        make: impl FnOnce(ShapeId, ShapeId) -> ShapeKind,
    ) -> EditorResult<ShapeId> {
        let first = ctx.get_next_point(pos, connect, radius, modifier);
        let second = new_point(ctx, pos);
        let shape = create_shape(ctx, make(first, second));
        begin_shape(ctx, shape)?;
        self.shape = Some(shape);
        Ok(shape)
    }

    /// Second point of the in-progress shape
    fn second(&self, ctx: &dyn ToolContext) -> Option<(ShapeId, ShapeId)> {
        let shape = self.shape?;
        structural_points(ctx, shape).get(1).map(|p| (shape, *p))
    }

    pub(crate) fn follow(&self, ctx: &mut dyn ToolContext, pos: Pos2) {
        if let Some((_, second)) = self.second(ctx) {
            move_points(ctx, &[second], pos);
        }
    }

    /// Resolve the second point and commit. `None` if nothing was in progress.
    pub(crate) fn finish(
        &mut self,
        ctx: &mut dyn ToolContext,
        pos: Pos2,
        modifier: Modifiers,
        (connect, radius): (bool, f32),
    ) -> EditorResult<Option<ShapeId>> {
        let Some((shape, second)) = self.second(ctx) else {
            self.shape = None;
            return Ok(None);
        };
        resolve_point(ctx, shape, second, pos, connect, radius, modifier);
        commit_shape(ctx, shape)?;
        self.shape = None;
        Ok(Some(shape))
    }

    pub(crate) fn cancel(&mut self, ctx: &mut dyn ToolContext) {
        if let Some(shape) = self.shape.take() {
            discard_shape(ctx, shape);
        }
        ctx.release();
    }
}
