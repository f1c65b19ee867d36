//! Editor configuration: every tool, filter and service setting in one
//! serializable document.
//!
//! Missing fields fall back to their defaults, so a config file only needs
//! to mention what it changes.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};
use crate::filters::{GridSnapPointFilter, GridSnapSettings, LineSnapPointFilter, LineSnapSettings, PointFilterType};
use crate::geometry::hit_testing::{HitTest, HitTestSettings};
use crate::intersections::{
    EllipseLineIntersection, IntersectionSettings, LineLineIntersection, PointIntersectionType,
    RectangleLineIntersection,
};
use crate::tools::{
    CircleTool, CircleToolSettings, ConicTool, ConicToolSettings, CubicBezierTool, CubicBezierToolSettings,
    EllipseTool, EllipseToolSettings, LineTool, LineToolSettings, PathTool, PathToolSettings, PolyLineTool,
    QuadraticBezierTool, QuadraticBezierToolSettings, RectangleTool, RectangleToolSettings, ScribbleTool,
    ScribbleToolSettings, SelectionTool, SelectionToolSettings, TOOL_NAMES, TextTool, TextToolSettings, ToolType,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Version of the crate that wrote the config
    pub version: String,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub hit_test: HitTestSettings,
    pub grid_snap: GridSnapSettings,
    pub line_snap: LineSnapSettings,
    pub line_intersection: IntersectionSettings,
    pub rectangle_intersection: IntersectionSettings,
    pub ellipse_intersection: IntersectionSettings,
    pub selection: SelectionToolSettings,
    pub line: LineToolSettings,
    pub polyline: LineToolSettings,
    pub cubic_bezier: CubicBezierToolSettings,
    pub quadratic_bezier: QuadraticBezierToolSettings,
    pub conic: ConicToolSettings,
    pub rectangle: RectangleToolSettings,
    pub ellipse: EllipseToolSettings,
    pub circle: CircleToolSettings,
    pub text: TextToolSettings,
    pub scribble: ScribbleToolSettings,
    pub path: PathToolSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            canvas_width: 800.0,
            canvas_height: 600.0,
            hit_test: HitTestSettings::default(),
            grid_snap: GridSnapSettings::default(),
            line_snap: LineSnapSettings::default(),
            line_intersection: IntersectionSettings::default(),
            rectangle_intersection: IntersectionSettings::default(),
            ellipse_intersection: IntersectionSettings::default(),
            selection: SelectionToolSettings::default(),
            line: LineToolSettings::default(),
            polyline: LineToolSettings::default(),
            cubic_bezier: CubicBezierToolSettings::default(),
            quadratic_bezier: QuadraticBezierToolSettings::default(),
            conic: ConicToolSettings::default(),
            rectangle: RectangleToolSettings::default(),
            ellipse: EllipseToolSettings::default(),
            circle: CircleToolSettings::default(),
            text: TextToolSettings::default(),
            scribble: ScribbleToolSettings::default(),
            path: PathToolSettings::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.version != env!("CARGO_PKG_VERSION") {
            warn!(
                "config version {} differs from current version {}",
                config.version,
                env!("CARGO_PKG_VERSION")
            );
        }
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> EditorResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        debug!("loading config from {}", path.display());
        Self::from_json(&json)
    }

    /// # Errors
    ///
    /// Fails if the config cannot be serialized or the file written.
    pub fn save(&self, path: impl AsRef<Path>) -> EditorResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        debug!("saved config to {}", path.display());
        Ok(())
    }

    pub fn hit_test(&self) -> HitTest {
        HitTest::new(self.hit_test.clone())
    }

    /// Snapping chain for drawing tools: line snap first, then the grid.
    pub fn filters(&self) -> Vec<PointFilterType> {
        vec![
            PointFilterType::LineSnap(LineSnapPointFilter::new(self.line_snap.clone())),
            PointFilterType::Grid(GridSnapPointFilter::new(self.grid_snap.clone())),
        ]
    }

    pub fn intersections(&self) -> Vec<PointIntersectionType> {
        vec![
            PointIntersectionType::Line(LineLineIntersection::new(self.line_intersection.clone())),
            PointIntersectionType::Rectangle(RectangleLineIntersection::new(self.rectangle_intersection.clone())),
            PointIntersectionType::Ellipse(EllipseLineIntersection::new(self.ellipse_intersection.clone())),
        ]
    }

    /// Build one tool by name with these settings.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownTool`] for names not in [`TOOL_NAMES`].
    pub fn tool(&self, name: &str) -> EditorResult<ToolType> {
        let tool = match name {
            "Selection" => ToolType::Selection(SelectionTool::new(self.selection.clone())),
            "Line" => ToolType::Line(LineTool::new(self.line.clone(), self.filters(), self.intersections())),
            "PolyLine" => ToolType::PolyLine(PolyLineTool::new(
                self.polyline.clone(),
                self.filters(),
                self.intersections(),
            )),
            "CubicBezier" => ToolType::CubicBezier(CubicBezierTool::new(self.cubic_bezier.clone(), self.filters())),
            "QuadraticBezier" => ToolType::QuadraticBezier(QuadraticBezierTool::new(
                self.quadratic_bezier.clone(),
                self.filters(),
            )),
            "Conic" => ToolType::Conic(ConicTool::new(self.conic.clone(), self.filters())),
            "Rectangle" => ToolType::Rectangle(RectangleTool::new(self.rectangle.clone(), self.filters())),
            "Ellipse" => ToolType::Ellipse(EllipseTool::new(self.ellipse.clone(), self.filters())),
            "Circle" => ToolType::Circle(CircleTool::new(self.circle.clone(), self.filters())),
            "Text" => ToolType::Text(TextTool::new(self.text.clone(), self.filters())),
            "Scribble" => ToolType::Scribble(ScribbleTool::new(self.scribble.clone(), self.filters())),
            "Path" => ToolType::Path(PathTool::new(self.path.clone(), self.filters())),
            other => return Err(EditorError::UnknownTool(other.to_string())),
        };
        Ok(tool)
    }

    /// Every tool, in [`TOOL_NAMES`] order.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in names; the error is propagated from [`EditorConfig::tool`].
    pub fn tools(&self) -> EditorResult<Vec<ToolType>> {
        TOOL_NAMES.iter().map(|name| self.tool(name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Tool;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{ "grid_snap": { "is_enabled": true, "grid_size_x": 10.0 } }"#).unwrap();
        assert!(config.grid_snap.is_enabled);
        assert_eq!(config.grid_snap.grid_size_x, 10.0);
        assert_eq!(config.grid_snap.grid_size_y, 30.0);
        assert_eq!(config.line_snap, LineSnapSettings::default());
        assert_eq!(config.conic.weight, 0.5);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = EditorConfig::default();
        config.line.split_intersections = true;
        config.text.text = "Label".to_string();
        let restored = EditorConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_builds_every_tool() {
        let tools = EditorConfig::default().tools().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(names, TOOL_NAMES);
        assert!(matches!(
            EditorConfig::default().tool("Spray"),
            Err(EditorError::UnknownTool(name)) if name == "Spray"
        ));
    }
}
