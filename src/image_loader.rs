//! Photo decoding into 8-bit RGB
//!
//! Single entry point for loading portraits from disk or from uploaded bytes.
//!
//! ## Supported Formats
//!
//! Standard formats (via `image` crate):
//! - JPEG, PNG, GIF, WebP, TIFF, BMP, ICO, TGA, EXR, PNM, QOI, DDS, HDR
//!
//! Apple formats (via `libheif-rs`, feature `heic`):
//! - HEIC, HEIF
//!
//! Every image is converted to `RgbImage`; alpha is dropped and
//! multi-frame formats yield their first frame. EXIF orientation is not
//! applied.

use std::io::Cursor;
use std::path::Path;

use image::{ImageReader, RgbImage};
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    /// First frame only
    Gif,
    WebP,
    Tiff,
    Bmp,
    Ico,
    Tga,
    Exr,
    /// PBM, PGM, PPM
    Pnm,
    Qoi,
    Dds,
    Hdr,
    /// HEIC/HEIF (Apple)
    Heic,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "bmp" => Some(ImageFormat::Bmp),
            "ico" => Some(ImageFormat::Ico),
            "tga" => Some(ImageFormat::Tga),
            "exr" => Some(ImageFormat::Exr),
            "pbm" | "pgm" | "ppm" | "pnm" => Some(ImageFormat::Pnm),
            "qoi" => Some(ImageFormat::Qoi),
            "dds" => Some(ImageFormat::Dds),
            "hdr" => Some(ImageFormat::Hdr),
            "heic" | "heif" => Some(ImageFormat::Heic),
            _ => None,
        }
    }

    /// Sniff an ISO-BMFF `ftyp` box carrying a HEIF brand
    pub fn is_heif_bytes(bytes: &[u8]) -> bool {
        const BRANDS: [&[u8; 4]; 6] = [b"heic", b"heix", b"hevc", b"heif", b"mif1", b"msf1"];
        bytes.len() >= 12 && &bytes[4..8] == b"ftyp" && BRANDS.iter().any(|brand| &bytes[8..12] == *brand)
    }

    /// Check if format requires libheif
    pub fn requires_heif(&self) -> bool {
        matches!(self, ImageFormat::Heic)
    }
}

/// Load an image from disk as 8-bit RGB
///
/// The format is chosen from the file extension. HEIC/HEIF files go through
/// libheif; everything else through the `image` crate.
///
/// # Errors
///
/// Returns `AnalysisError` if:
/// - the extension is unknown, or HEIC support is not compiled in (`InvalidInput`)
/// - the file cannot be opened or decoded (`ImageLoadError`)
///
/// # Example
///
/// ```rust,no_run
/// use season_scan::image_loader::load_image;
/// use std::path::Path;
///
/// let image = load_image(Path::new("portrait.jpg"))?;
/// println!("Loaded image: {}x{}", image.width(), image.height());
/// # Ok::<(), season_scan::AnalysisError>(())
/// ```
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let format = ImageFormat::from_extension(path).ok_or_else(|| {
        AnalysisError::invalid_input(format!("Unknown image format for file: {}", path.display()))
    })?;

    let image = if format.requires_heif() {
        let bytes = std::fs::read(path).map_err(|e| {
            AnalysisError::image_load(format!("Failed to read HEIC file: {}", path.display()), e)
        })?;
        decode_heic(&bytes)?
    } else {
        ImageReader::open(path)
            .map_err(|e| {
                AnalysisError::image_load(format!("Failed to open image file: {}", path.display()), e)
            })?
            .decode()
            .map_err(|e| {
                AnalysisError::image_load(format!("Failed to decode image: {}", path.display()), e)
            })?
            .to_rgb8()
    };

    debug!(?format, width = image.width(), height = image.height(), "image loaded");
    Ok(image)
}

/// Decode raw uploaded bytes as 8-bit RGB, sniffing the format
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    if bytes.is_empty() {
        return Err(AnalysisError::invalid_input("image data is empty"));
    }
    if ImageFormat::is_heif_bytes(bytes) {
        return decode_heic(bytes);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AnalysisError::image_load("Failed to read image data", e))?;
    let image = reader
        .decode()
        .map_err(|e| AnalysisError::image_load("Failed to decode image data", e))?;
    Ok(image.to_rgb8())
}

#[cfg(feature = "heic")]
fn decode_heic(bytes: &[u8]) -> Result<RgbImage> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(bytes)
        .map_err(|e| AnalysisError::image_load("Failed to read HEIC container", e))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| AnalysisError::image_load("Failed to get primary image handle", e))?;
    let image = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| AnalysisError::image_load("Failed to decode HEIC image", e))?;

    let planes = image.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| AnalysisError::invalid_input("HEIC image has no interleaved RGB data"))?;

    let width = handle.width();
    let height = handle.height();
    let row_bytes = width as usize * 3;

    // Rows may carry stride padding
    let mut rgb = Vec::with_capacity(row_bytes * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        let pixels = row
            .get(..row_bytes)
            .ok_or_else(|| AnalysisError::invalid_input("HEIC row shorter than image width"))?;
        rgb.extend_from_slice(pixels);
    }

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| AnalysisError::invalid_input("HEIC plane smaller than image dimensions"))
}

#[cfg(not(feature = "heic"))]
fn decode_heic(_bytes: &[u8]) -> Result<RgbImage> {
    Err(AnalysisError::invalid_input(
        "HEIC/HEIF support is not enabled (build with the `heic` feature)",
    ))
}

/// Get list of all supported file extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &[
        "jpg", "jpeg", "png", "gif", "webp", "tiff", "tif", "bmp", "ico", "tga", "exr", "pbm",
        "pgm", "ppm", "pnm", "qoi", "dds", "hdr", "heic", "heif",
    ]
}

/// Check if a file extension is supported
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_extensions().contains(&ext_lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat as Encoding, Rgb};

    fn png_bytes(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), Encoding::Png).unwrap();
        bytes
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_extension(Path::new("photo.jpg")), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension(Path::new("photo.JPEG")), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension(Path::new("photo.heic")), Some(ImageFormat::Heic));
        assert_eq!(ImageFormat::from_extension(Path::new("photo.HEIF")), Some(ImageFormat::Heic));
        assert_eq!(ImageFormat::from_extension(Path::new("photo.webp")), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_extension(Path::new("photo.xyz")), None);
        assert_eq!(ImageFormat::from_extension(Path::new("photo")), None);
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_extension("jpg"));
        assert!(is_supported_extension("PNG"));
        assert!(is_supported_extension("HEIF"));
        assert!(!is_supported_extension("doc"));
        for ext in supported_extensions() {
            let path = format!("photo.{}", ext);
            assert!(ImageFormat::from_extension(Path::new(&path)).is_some(), "{}", ext);
        }
    }

    #[test]
    fn test_heif_sniffing() {
        let mut header = vec![0, 0, 0, 24];
        header.extend_from_slice(b"ftypheic");
        header.extend_from_slice(&[0; 12]);
        assert!(ImageFormat::is_heif_bytes(&header));
        assert!(!ImageFormat::is_heif_bytes(b"\x89PNG\r\n\x1a\n...."));
        assert!(!ImageFormat::is_heif_bytes(b"ftyp"));
    }

    #[test]
    fn test_decode_png_bytes() {
        let mut source = RgbImage::new(3, 2);
        source.put_pixel(2, 1, Rgb([10, 20, 30]));

        let decoded = decode_image(&png_bytes(&source)).unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_decode_garbage_bytes() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AnalysisError::ImageLoadError { .. }));
        assert!(matches!(decode_image(&[]), Err(AnalysisError::InvalidInput { .. })));
    }

    #[test]
    fn test_load_image_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portrait.png");
        RgbImage::from_pixel(4, 4, Rgb([200, 150, 120])).save(&path).unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.get_pixel(0, 0), &Rgb([200, 150, 120]));
    }

    #[test]
    fn test_load_unknown_extension() {
        let err = load_image(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));
    }

    #[cfg(not(feature = "heic"))]
    #[test]
    fn test_heic_without_feature() {
        let mut header = vec![0, 0, 0, 24];
        header.extend_from_slice(b"ftypheic");
        header.extend_from_slice(&[0; 12]);
        assert!(matches!(decode_image(&header), Err(AnalysisError::InvalidInput { .. })));
    }
}
