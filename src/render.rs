//! Paints the occupancy grid onto a template image.

use crate::error::AppError;
use crate::grid::{BLOCKS_PER_DAY, GridDay, OccupancyGrid};
use crate::layout::GridLayout;
use image::{ImageError, ImageFormat, ImageReader, Rgb, RgbImage};
use std::path::Path;
use tracing::{debug, info};

/// A decoded template together with the format it was stored in.
#[derive(Debug, Clone)]
pub struct Template {
    pub image: RgbImage,
    pub format: ImageFormat,
}

/// Red for 0, yellow around the midpoint, green for 255.
pub fn cell_color(value: u8) -> Rgb<u8> {
    let value = u16::from(value);
    let green = (value * 2).min(255) as u8;
    let red = ((255 - value) * 2).min(255) as u8;
    Rgb([red, green, 0])
}

pub fn load_template(path: &Path) -> Result<Template, AppError> {
    let load_error = |source: ImageError| AppError::TemplateLoad {
        path: path.to_path_buf(),
        source,
    };
    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| load_error(ImageError::IoError(e)))?;
    let format = reader.format().unwrap_or(ImageFormat::Png);
    let image = reader.decode().map_err(load_error)?.into_rgb8();
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        ?format,
        "Template loaded"
    );
    Ok(Template { image, format })
}

/// Returns a copy of `template` with one rectangle per slot painted over it.
/// Pixels outside the rectangles keep their template value.
pub fn render(
    grid: &OccupancyGrid,
    template: &RgbImage,
    layout: &GridLayout,
) -> Result<RgbImage, AppError> {
    let (min_width, min_height) = layout.required_size().ok_or(AppError::LayoutOverflow)?;
    if template.width() < min_width || template.height() < min_height {
        return Err(AppError::TemplateTooSmall {
            width: template.width(),
            height: template.height(),
            min_width,
            min_height,
        });
    }

    let mut output = template.clone();
    for day in GridDay::ALL {
        for block in 0..BLOCKS_PER_DAY {
            let Some(cells) = grid.block(day, block) else {
                continue;
            };
            for (slot, value) in cells.iter().enumerate() {
                let pixel = cell_color(*value);
                let (x0, y) = layout.slot_origin(day.index(), block, slot);
                for x in x0..x0 + layout.block_width() {
                    output.put_pixel(x, y, pixel);
                }
            }
        }
    }
    Ok(output)
}

/// Deletes a previous output so a failed run cannot leave it behind.
pub fn remove_stale_output(path: &Path) -> Result<(), AppError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed previous output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(AppError::StaleOutput {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn write_image(image: &RgbImage, format: ImageFormat, path: &Path) -> Result<(), AppError> {
    image
        .save_with_format(path, format)
        .map_err(|source| AppError::ImageWrite {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), ?format, "Heatmap written");
    Ok(())
}
