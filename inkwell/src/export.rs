use anyhow::Context;
use inkwell_core::raster::RasterSurface;

/// Straight-alpha RGBA8, which is exactly the surface's memory layout.
pub fn to_image(surface: RasterSurface) -> anyhow::Result<image::RgbaImage> {
    let [width, height] = surface.dimensions();
    image::RgbaImage::from_raw(width, height, surface.into_bytes())
        .ok_or_else(|| anyhow::anyhow!("surface buffer doesn't match {width}x{height}"))
}

pub fn write_png(surface: RasterSurface, path: &std::path::Path) -> anyhow::Result<()> {
    let [width, height] = surface.dimensions();
    to_image(surface)?
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote {width}x{height} image to {}", path.display());
    Ok(())
}

/// `out.png` -> `out-1.png`, for additional exports alongside the main one.
#[must_use]
pub fn numbered(path: &std::path::Path, n: usize) -> std::path::PathBuf {
    let stem = path
        .file_stem()
        .map_or_else(|| "export".into(), |stem| stem.to_string_lossy());
    let name = match path.extension() {
        Some(ext) => format!("{stem}-{n}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{n}"),
    };
    path.with_file_name(name)
}
