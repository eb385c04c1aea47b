use crate::error::{PicassoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An RGB colour with each channel in `[0.0, 1.0]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f64, pub f64, pub f64);

impl Rgb {
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);

    fn is_valid(&self) -> bool {
        [self.0, self.1, self.2]
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Circle,
    Rectangle,
}

impl FromStr for ShapeKind {
    type Err = PicassoError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "circle" => Ok(ShapeKind::Circle),
            "rectangle" => Ok(ShapeKind::Rectangle),
            other => Err(PicassoError::InvalidShape(other.to_string())),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Circle => write!(f, "circle"),
            ShapeKind::Rectangle => write!(f, "rectangle"),
        }
    }
}

/// Parameters shared by every encoding style.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GeneralParams {
    /// Keep percussion notes instead of stripping them.
    pub use_drum: bool,

    /// Hold notes until the sustain pedal is released.
    pub sustain: bool,

    /// Longest stretch of music (seconds) that gets painted.
    pub max_length: f64,

    pub width: u32,
    pub height: u32,

    /// Device pixels per drawing unit.
    pub scale: f64,

    pub shape: ShapeKind,

    /// Let rectangle rotations pile up across notes instead of applying each one on its own.
    pub accumulate_rotation: bool,
}

impl Default for GeneralParams {
    fn default() -> Self {
        Self {
            use_drum: false,
            sustain: false,
            max_length: 1024.0,
            width: 1024,
            height: 1024,
            scale: 80.0,
            shape: ShapeKind::Circle,
            accumulate_rotation: false,
        }
    }
}

impl GeneralParams {
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(PicassoError::config(format!(
                "scale must be larger than 0, got {}",
                self.scale
            )));
        }

        if self.width == 0 || self.height == 0 {
            return Err(PicassoError::config(format!(
                "canvas must be at least 1x1 pixels, got {}x{}",
                self.width, self.height
            )));
        }

        // shapes are placed within height / scale units and drawn through an f32 transform
        let device_scale = self.scale as f32;
        let extent = self.height as f64 / self.scale;
        if !device_scale.is_finite() || device_scale <= 0.0 || !extent.is_finite() {
            return Err(PicassoError::config(format!(
                "scale {} is out of range for a {} pixel tall canvas",
                self.scale, self.height
            )));
        }

        if self.max_length.is_nan() || self.max_length < 0.0 {
            return Err(PicassoError::config(format!(
                "max_length must not be negative, got {}",
                self.max_length
            )));
        }

        Ok(())
    }

    pub fn with_use_drum(mut self, use_drum: bool) -> Self {
        self.use_drum = use_drum;
        self
    }

    pub fn with_sustain(mut self, sustain: bool) -> Self {
        self.sustain = sustain;
        self
    }

    pub fn with_max_length(mut self, max_length: f64) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_shape(mut self, shape: ShapeKind) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_accumulate_rotation(mut self, accumulate: bool) -> Self {
        self.accumulate_rotation = accumulate;
        self
    }
}

/// Per-run look of the picture. Shape tags stay strings so that a bad tag only fails once drawn.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StyleParams {
    pub background_color: Rgb,
    pub shape_colors: Vec<Rgb>,
    pub shapes: Vec<String>,
}

impl StyleParams {
    pub fn new(background_color: Rgb, shape_colors: Vec<Rgb>, shapes: &[&str]) -> Self {
        Self {
            background_color,
            shape_colors,
            shapes: shapes.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.shape_colors.is_empty() {
            return Err(PicassoError::config("shape_colors must not be empty"));
        }

        if self.shapes.is_empty() {
            return Err(PicassoError::config("shapes must not be empty"));
        }

        if let Some(bad) = std::iter::once(&self.background_color)
            .chain(self.shape_colors.iter())
            .find(|rgb| !rgb.is_valid())
        {
            return Err(PicassoError::config(format!(
                "colour channels must be within [0, 1], got {:?}",
                bad
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_non_positive_scale() {
        env_logger::try_init().unwrap_or(());

        for scale in [0.0, -5.0, f64::NAN] {
            let params = GeneralParams::default().with_scale(scale);
            assert!(matches!(params.validate(), Err(PicassoError::Config(_))));
        }

        assert!(GeneralParams::default().with_scale(0.5).validate().is_ok());
    }

    #[test]
    fn rejects_scales_that_break_placement() {
        env_logger::try_init().unwrap_or(());

        // overflows height / scale, vanishes as f32, overflows as f32
        for scale in [1e-307, 1e-50, 1e300] {
            let params = GeneralParams::default().with_scale(scale);
            assert!(
                matches!(params.validate(), Err(PicassoError::Config(_))),
                "scale {} was accepted",
                scale
            );
        }
    }

    #[test]
    fn rejects_empty_canvas_and_negative_length() {
        env_logger::try_init().unwrap_or(());

        let empty = GeneralParams::default().with_size(0, 100);
        assert!(matches!(empty.validate(), Err(PicassoError::Config(_))));

        let negative = GeneralParams::default().with_max_length(-1.0);
        assert!(matches!(negative.validate(), Err(PicassoError::Config(_))));
    }

    #[test]
    fn overrides_leave_other_fields_alone() {
        let params = GeneralParams::default()
            .with_size(100, 200)
            .with_use_drum(true);

        assert_eq!(params.width, 100);
        assert_eq!(params.height, 200);
        assert!(params.use_drum);
        assert_eq!(params.scale, GeneralParams::default().scale);
        assert_eq!(params.max_length, GeneralParams::default().max_length);
    }

    #[test]
    fn empty_style_lists_are_config_errors() {
        env_logger::try_init().unwrap_or(());

        let no_colors = StyleParams::new(Rgb::WHITE, vec![], &["circle"]);
        assert!(matches!(no_colors.validate(), Err(PicassoError::Config(_))));

        let no_shapes = StyleParams::new(Rgb::WHITE, vec![Rgb(1.0, 0.0, 0.0)], &[]);
        assert!(matches!(no_shapes.validate(), Err(PicassoError::Config(_))));

        let out_of_range = StyleParams::new(Rgb(2.0, 0.0, 0.0), vec![Rgb::WHITE], &["circle"]);
        assert!(matches!(out_of_range.validate(), Err(PicassoError::Config(_))));
    }

    #[test]
    fn unknown_shape_tags_are_kept_until_parsed() {
        let style = StyleParams::new(Rgb::WHITE, vec![Rgb::WHITE], &["triangle"]);
        assert!(style.validate().is_ok());

        let parsed = style.shapes[0].parse::<ShapeKind>();
        assert!(matches!(parsed, Err(PicassoError::InvalidShape(tag)) if tag == "triangle"));
        assert_eq!("rectangle".parse::<ShapeKind>().unwrap(), ShapeKind::Rectangle);
    }
}
