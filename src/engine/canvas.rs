use crate::error::{PicassoError, Result};
use crate::model::params::Rgb;
use log::debug;
use std::fs;
use std::path::Path;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

/// How rectangle rotations combine from one shape to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationMode {
    /// Every rectangle turns about its own origin; nothing carries over.
    #[default]
    PerShape,

    /// Rotations add up about the canvas origin and apply to every later shape.
    Accumulate,
}

/// An owned raster surface addressed in scaled units, where one unit is `scale` pixels.
pub struct Canvas {
    pixmap: Pixmap,
    base: Transform,
    rotation_mode: RotationMode,
    drift_degrees: f32,
}

impl Canvas {
    pub fn new(width: u32, height: u32, scale: f64, background: Rgb) -> Result<Self> {
        let device_scale = scale as f32;
        if !scale.is_finite() || scale <= 0.0 || !device_scale.is_finite() || device_scale <= 0.0 {
            return Err(PicassoError::config(format!(
                "scale must be larger than 0, got {}",
                scale
            )));
        }

        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            PicassoError::config(format!("cannot allocate a {}x{} canvas", width, height))
        })?;

        let Rgb(r, g, b) = background;
        pixmap.fill(Color::from_rgba8(channel(r), channel(g), channel(b), u8::MAX));

        Ok(Self {
            pixmap,
            base: Transform::from_scale(device_scale, device_scale),
            rotation_mode: RotationMode::default(),
            drift_degrees: 0.0,
        })
    }

    pub fn with_rotation_mode(mut self, mode: RotationMode) -> Self {
        self.rotation_mode = mode;
        self
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Rotation (degrees) every later shape is drawn with in accumulate mode.
    pub fn drift_degrees(&self) -> f32 {
        self.drift_degrees
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> Option<tiny_skia::ColorU8> {
        self.pixmap.pixel(x, y).map(|p| p.demultiply())
    }

    /// Scale plus, in accumulate mode, the rotation built up so far.
    fn shared_transform(&self) -> Transform {
        match self.rotation_mode {
            RotationMode::PerShape => self.base,
            RotationMode::Accumulate => self
                .base
                .pre_concat(Transform::from_rotate(self.drift_degrees)),
        }
    }

    /// Fills a circle. A non-positive radius paints nothing. In accumulate mode the circle is
    /// drawn in the frame left behind by earlier rectangles.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb, alpha: f64) {
        let Some(path) = PathBuilder::from_circle(cx as f32, cy as f32, radius as f32) else {
            debug!("Skipping degenerate circle with radius {}", radius);
            return;
        };

        self.pixmap.fill_path(
            &path,
            &paint(color, alpha),
            FillRule::Winding,
            self.shared_transform(),
            None,
        );
    }

    /// Fills a `width x height` rectangle at `(x, y)`, turned by `degrees` according to the
    /// canvas rotation mode. Negative sizes paint nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        degrees: f64,
        color: Rgb,
        alpha: f64,
    ) {
        let transform = match self.rotation_mode {
            RotationMode::PerShape => self.base.pre_concat(Transform::from_rotate_at(
                degrees as f32,
                x as f32,
                y as f32,
            )),
            RotationMode::Accumulate => {
                self.drift_degrees += degrees as f32;
                self.shared_transform()
            }
        };

        let Some(rect) = Rect::from_xywh(x as f32, y as f32, width as f32, height as f32) else {
            debug!("Skipping degenerate rectangle {}x{}", width, height);
            return;
        };

        self.pixmap.fill_rect(
            rect,
            &paint(color, alpha),
            transform,
            None,
        );
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self
            .pixmap
            .encode_png()
            .map_err(|e| PicassoError::io(path.as_ref(), std::io::Error::other(e.to_string())))?;

        fs::write(path.as_ref(), bytes).map_err(|e| PicassoError::io(path.as_ref(), e))
    }
}

/// Unit-range colour channel to a byte. Out-of-range values saturate.
fn channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn paint(color: Rgb, alpha: f64) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(channel(color.0), channel(color.1), channel(color.2), channel(alpha));
    paint.anti_alias = true;
    paint
}
