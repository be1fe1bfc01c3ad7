use std::collections::HashMap;

use crate::features::geometry::{Point, Size};

pub const DEFAULT_EXPORT_FILE_NAME: &str = "signature-coordinates.txt";

/// Tunables the host may override on `init`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerConfig {
    /// Where new placeholders appear, relative to the visible window.
    pub default_position: Point,
    pub default_size: Size,
    pub label_prefix: String,
    pub export_file_name: String,
    /// Viewport pixels per PDF point, used until the host reports real bounds.
    pub px_per_point: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            default_position: Point::new(50.0, 100.0),
            default_size: Size::new(150.0, 50.0),
            label_prefix: "Signature".to_string(),
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            px_per_point: 1.0,
        }
    }
}

impl MarkerConfig {
    /// Parse bindings coming from the host. Anything missing or out of range
    /// keeps its default.
    pub fn from_bindings(bindings: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let number = |key: &str| {
            bindings
                .get(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };

        let default_position = Point::new(
            number("marker_default_x")
                .filter(|v| *v >= 0.0)
                .unwrap_or(defaults.default_position.x),
            number("marker_default_y")
                .filter(|v| *v >= 0.0)
                .unwrap_or(defaults.default_position.y),
        );
        let default_size = Size::new(
            number("marker_default_width")
                .filter(|v| (8.0..=2000.0).contains(v))
                .unwrap_or(defaults.default_size.width),
            number("marker_default_height")
                .filter(|v| (8.0..=2000.0).contains(v))
                .unwrap_or(defaults.default_size.height),
        );
        let label_prefix = bindings
            .get("marker_label_prefix")
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or(defaults.label_prefix);
        let export_file_name = bindings
            .get("marker_export_file_name")
            .map(|v| v.trim())
            .filter(|v| is_plain_file_name(v))
            .map(str::to_string)
            .unwrap_or(defaults.export_file_name);
        let px_per_point = number("marker_px_per_point")
            .filter(|v| *v > 0.0 && *v <= 10.0)
            .unwrap_or(defaults.px_per_point);

        Self {
            default_position,
            default_size,
            label_prefix,
            export_file_name,
            px_per_point,
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}
