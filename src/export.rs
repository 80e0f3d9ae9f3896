use crate::error::{PercolationError, Result};
use crate::grid::{CellStatus, Grid};
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Map a cell status onto a grey level in `[0, 255]`
///
/// `min` maps to black and `max` to white, everything in between linearly.
pub fn grey_level(status: CellStatus, min: CellStatus, max: CellStatus) -> Result<u8> {
    if max <= min {
        return Err(PercolationError::Export(format!(
            "empty intensity range {:?}..{:?}",
            min, max
        )));
    }

    let value = status.value().clamp(min.value(), max.value()) as u32;
    let (min, max) = (min.value() as u32, max.value() as u32);
    Ok((255 * (value - min) / (max - min)) as u8)
}

/// Render the grid as an RGB image, each cell drawn as an `upscale` x `upscale` block
pub fn grid_to_image(
    grid: &Grid,
    min: CellStatus,
    max: CellStatus,
    upscale: usize,
) -> Result<RgbImage> {
    let upscale = upscale.max(1);
    let width = image_extent(grid.cols(), upscale)?;
    let height = image_extent(grid.rows(), upscale)?;

    // Precompute the palette so per-pixel work is a lookup
    let palette = [
        grey_level(CellStatus::Closed, min, max)?,
        grey_level(CellStatus::Opened, min, max)?,
        grey_level(CellStatus::OpenedAndFilled, min, max)?,
    ];

    let cells = grid.cells();
    let cols = grid.cols();
    Ok(RgbImage::from_fn(width, height, |x, y| {
        // Map pixel coordinates back to the cell they cover
        let row = y as usize / upscale;
        let col = x as usize / upscale;
        let grey = palette[cells[row * cols + col].value() as usize];
        Rgb([grey, grey, grey])
    }))
}

/// Pixel block size per cell so the larger grid side reaches `image_min_res`
pub fn upscale_factor(rows: usize, cols: usize, image_min_res: usize) -> usize {
    let res = rows.max(cols).max(1);
    if res < image_min_res {
        image_min_res / res
    } else {
        1
    }
}

fn image_extent(cells: usize, upscale: usize) -> Result<u32> {
    cells
        .checked_mul(upscale)
        .and_then(|pixels| u32::try_from(pixels).ok())
        .ok_or_else(|| {
            PercolationError::Export(format!(
                "{} cells upscaled by {} do not fit an image side",
                cells, upscale
            ))
        })
}

/// Export the grid to a binary PPM file
///
/// # Arguments
/// * `grid` - The grid to export
/// * `path` - Destination file
/// * `min` - Status drawn black
/// * `max` - Status drawn white
/// * `upscale` - Pixel block size per cell
pub fn export_grid_to_ppm(
    grid: &Grid,
    path: &Path,
    min: CellStatus,
    max: CellStatus,
    upscale: usize,
) -> Result<()> {
    let image = grid_to_image(grid, min, max, upscale)?;

    let writer = BufWriter::new(File::create(path)?);
    let encoder =
        PnmEncoder::new(writer).with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary));
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;

    Ok(())
}

/// Path of the image written for `iteration`, e.g. `saves/000042.ppm`
pub fn frame_path(saves_dir: &Path, iteration: usize) -> PathBuf {
    saves_dir.join(format!("{:06}.ppm", iteration))
}

/// Create the saves directory if it does not exist yet
pub fn ensure_saves_dir(saves_dir: &Path) -> Result<()> {
    if !saves_dir.exists() {
        fs::create_dir_all(saves_dir)?;
    }
    Ok(())
}
