use egui::{Pos2, pos2};
use serde::{Deserialize, Serialize};

use super::{GuideSet, PointFilter};
use crate::context::ToolContext;
use crate::shape::StyleId;

/// Axes the grid snaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GridSnapMode {
    #[default]
    Both,
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSnapSettings {
    pub is_enabled: bool,
    pub enable_guides: bool,
    pub mode: GridSnapMode,
    pub grid_size_x: f32,
    pub grid_size_y: f32,
    pub guide_style: Option<StyleId>,
}

impl Default for GridSnapSettings {
    fn default() -> Self {
        Self {
            is_enabled: false,
            enable_guides: false,
            mode: GridSnapMode::Both,
            grid_size_x: 30.0,
            grid_size_y: 30.0,
            guide_style: None,
        }
    }
}

/// Rounds coordinates to the nearest grid intersection.
#[derive(Debug, Clone, Default)]
pub struct GridSnapPointFilter {
    pub settings: GridSnapSettings,
    guides: GuideSet,
}

impl GridSnapPointFilter {
    pub fn new(settings: GridSnapSettings) -> Self {
        Self {
            settings,
            guides: GuideSet::default(),
        }
    }

    fn snap(value: f32, size: f32) -> f32 {
        if size <= 0.0 {
            return value;
        }
        (value / size).round() * size
    }
}

impl PointFilter for GridSnapPointFilter {
    fn title(&self) -> &'static str {
        "Grid"
    }

    fn process(&mut self, ctx: &mut dyn ToolContext, pos: &mut Pos2) -> bool {
        if !self.settings.is_enabled {
            return false;
        }
        let snap_x = matches!(self.settings.mode, GridSnapMode::Both | GridSnapMode::Horizontal);
        let snap_y = matches!(self.settings.mode, GridSnapMode::Both | GridSnapMode::Vertical);
        if snap_x {
            pos.x = Self::snap(pos.x, self.settings.grid_size_x);
        }
        if snap_y {
            pos.y = Self::snap(pos.y, self.settings.grid_size_y);
        }

        if self.settings.enable_guides {
            let working = ctx.working_container();
            if let Some(size) = ctx.document().canvas_size(working) {
                let style = self.settings.guide_style.clone();
                if snap_y {
                    self.guides.add(ctx, pos2(0.0, pos.y), pos2(size.x, pos.y), style.clone());
                }
                if snap_x {
                    self.guides.add(ctx, pos2(pos.x, 0.0), pos2(pos.x, size.y), style);
                }
            }
        }
        true
    }

    fn clear(&mut self, ctx: &mut dyn ToolContext) {
        self.guides.clear(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EditorContext;

    #[test]
    fn test_rounds_to_grid() {
        let mut ctx = EditorContext::new(300.0, 300.0);
        let mut filter = GridSnapPointFilter::new(GridSnapSettings {
            is_enabled: true,
            ..Default::default()
        });
        let mut pos = pos2(44.0, 16.0);
        assert!(filter.process(&mut ctx, &mut pos));
        assert_eq!(pos, pos2(30.0, 30.0));
    }

    #[test]
    fn test_guides_are_cleared() {
        let mut ctx = EditorContext::new(300.0, 300.0);
        let before = ctx.document.len();
        let mut filter = GridSnapPointFilter::new(GridSnapSettings {
            is_enabled: true,
            enable_guides: true,
            ..Default::default()
        });
        let mut pos = pos2(61.0, 89.0);
        filter.process(&mut ctx, &mut pos);
        assert_eq!(ctx.document.guides_of(ctx.working_container).len(), 2);

        filter.clear(&mut ctx);
        assert!(ctx.document.guides_of(ctx.working_container).is_empty());
        assert_eq!(ctx.document.len(), before);
    }
}
