use crate::engine::EncoderStyle;
use crate::engine::canvas::{Canvas, RotationMode};
use crate::error::{PicassoError, Result};
use crate::model::params::{GeneralParams, ShapeKind, StyleParams};
use crate::model::song::{Note, NoteSequence};
use crate::util::velocity_to_alpha;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::path::Path;

/// Largest tilt, in degrees, applied to a single rectangle.
const MAX_TILT_DEGREES: f64 = 5.0;

/// Each note becomes one randomly placed shape. The note duration sets the size and the
/// velocity sets the opacity.
pub struct FreeStyle<R: Rng = StdRng> {
    general: GeneralParams,
    rng: R,
}

impl FreeStyle<StdRng> {
    pub fn seeded(general: GeneralParams, seed: u64) -> Result<Self> {
        Self::new(general, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(general: GeneralParams) -> Result<Self> {
        Self::new(general, StdRng::from_entropy())
    }
}

impl<R: Rng> FreeStyle<R> {
    pub fn new(general: GeneralParams, rng: R) -> Result<Self> {
        general.validate()?;

        debug!(
            "FreeStyle encoder: {}x{} px, scale {}, default shape {}",
            general.width, general.height, general.scale, general.shape
        );

        Ok(Self { general, rng })
    }

    fn paint_note(&mut self, canvas: &mut Canvas, note: &Note, style: &StyleParams) -> Result<()> {
        let alpha = velocity_to_alpha(note.velocity);

        let color = *style
            .shape_colors
            .choose(&mut self.rng)
            .ok_or_else(|| PicassoError::config("shape_colors must not be empty"))?;

        let shape: ShapeKind = style
            .shapes
            .choose(&mut self.rng)
            .ok_or_else(|| PicassoError::config("shapes must not be empty"))?
            .parse()?;

        let duration = note.duration();

        // placement is square in both axes, using the canvas height
        let extent = self.general.height as f64 / self.general.scale;
        let x = self.rng.gen_range(0.0..=extent);
        let y = self.rng.gen_range(0.0..=extent);

        match shape {
            ShapeKind::Circle => canvas.fill_circle(x, y, duration, color, alpha),
            ShapeKind::Rectangle => {
                let radian = self.rng.gen_range(PI / 8.0..=PI / 4.0);
                let sign = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                let degrees = sign * self.rng.gen_range(0.0..=MAX_TILT_DEGREES);

                canvas.fill_rect(
                    x,
                    y,
                    radian.cos() * duration,
                    radian.sin() * duration,
                    degrees,
                    color,
                    alpha,
                );
            }
        }

        Ok(())
    }
}

impl<R: Rng> EncoderStyle for FreeStyle<R> {
    fn general(&self) -> &GeneralParams {
        &self.general
    }

    fn encode_sequence(
        &mut self,
        sequence: &NoteSequence,
        output: &Path,
        style: &StyleParams,
    ) -> Result<()> {
        style.validate()?;

        let rotation_mode = if self.general.accumulate_rotation {
            RotationMode::Accumulate
        } else {
            RotationMode::PerShape
        };

        let mut canvas = Canvas::new(
            self.general.width,
            self.general.height,
            self.general.scale,
            style.background_color,
        )?
        .with_rotation_mode(rotation_mode);

        info!(
            "Painting {} notes onto a {}x{} canvas..!",
            sequence.notes.len(),
            canvas.width(),
            canvas.height()
        );

        for note in sequence.notes.iter() {
            self.paint_note(&mut canvas, note, style)?;
        }

        if rotation_mode == RotationMode::Accumulate {
            debug!("Canvas drifted {:.2} degrees", canvas.drift_degrees());
        }

        canvas.save_png(output)?;
        info!("Wrote image '{}'", output.display());

        Ok(())
    }
}
