//! # Image Processing Module
//!
//! Questo modulo comprime una singola immagine già materializzata nel workspace
//! e restituisce il path effettivamente scritto.
//!
//! ## Strategia
//!
//! La scelta dipende solo dall'estensione di input (mai dal contenuto) e, per i PNG,
//! dal numero di colori distinti:
//!
//! | Input             | Primario                   | Fallback                   |
//! |-------------------|----------------------------|----------------------------|
//! | PNG fotografico   | JPEG (`.jpg`)              | PNG palette 128 colori     |
//! | PNG grafico       | PNG palette 128 colori     | JPEG (`.jpg`)              |
//! | altro, out `.webp`| WebP lossy, method 6       | salvataggio nativo         |
//! | altro             | JPEG (`.jpg`)              | salvataggio nativo         |
//!
//! Un PNG è **fotografico** se ha più di 256 colori distinti (contati fino a 2M).
//!
//! ## Trasparenza
//!
//! Le immagini con canale alpha (o tRNS) vengono composte su sfondo bianco prima
//! di qualsiasi codifica lossy; la palette PNG invece conserva l'alpha.
//!
//! ## Path di output
//!
//! Il path richiesto dal chiamante è solo un suggerimento: le codifiche JPEG
//! forzano l'estensione `.jpg`. Il chiamante deve usare il `ResolvedArtifact`
//! restituito.
//!
//! ## Codec
//!
//! - **JPEG**: mozjpeg con Huffman ottimizzato
//! - **WebP**: libwebp tramite il crate `webp`
//! - **PNG palette**: quantizzazione NeuQuant (`color_quant`) e scrittura indicizzata (`png`)
//! - **Decodifica / nativo**: crate `image`
//!
//! ## Esempio
//!
//! ```rust,ignore
//! let artifact = ImageProcessor::compress_to_path(
//!     Path::new("/tmp/ifo_x/input_1_logo.png"),
//!     Path::new("/tmp/ifo_x/optimized_logo.png"),
//!     QualityTier::Avg,
//! )?;
//! println!("written {}", artifact.path.display());
//! ```

use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::media::QualityTier;
use crate::optimizer::path_resolver::ResolvedArtifact;
use color_quant::NeuQuant;
use image::{DynamicImage, ImageError, Rgb, RgbImage};
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// More distinct colours than this makes a PNG photographic
pub const PHOTOGRAPHIC_COLOR_THRESHOLD: usize = 256;

/// Colour counting stops past this many distinct colours
pub const COLOR_COUNT_CAP: usize = 2_000_000;

/// Size of the adaptive palette used for graphic PNGs
pub const PALETTE_SIZE: usize = 128;

/// libwebp effort parameter (0 = fast, 6 = slowest/best)
pub const WEBP_METHOD: i32 = 6;

/// Colour statistics of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorStats {
    /// Distinct RGBA colours, saturating at `COLOR_COUNT_CAP + 1`
    pub distinct_colors: usize,
}

impl ColorStats {
    pub fn collect(img: &DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let mut seen = HashSet::new();

        for px in rgba.pixels() {
            seen.insert(u32::from_be_bytes(px.0));
            if seen.len() > COLOR_COUNT_CAP {
                break;
            }
        }

        Self {
            distinct_colors: seen.len(),
        }
    }

    pub fn is_photographic(&self) -> bool {
        self.distinct_colors > PHOTOGRAPHIC_COLOR_THRESHOLD
    }
}

/// One concrete way of writing the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Lossy JPEG of the flattened RGB rendition, extension forced to `.jpg`
    Jpeg,
    /// Adaptive palette PNG at the requested path
    PalettePng,
    /// Lossy WebP of the flattened RGB rendition at the requested path
    WebP,
    /// Original decode saved at the requested path in the format its extension implies
    Native,
}

/// Compression strategy, an ordered pair of encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    PngPhotographic,
    PngGraphic,
    LossyWebp,
    LossyJpeg,
}

impl Strategy {
    /// (primary, fallback)
    pub fn encodings(self) -> (Encoding, Encoding) {
        match self {
            Strategy::PngPhotographic => (Encoding::Jpeg, Encoding::PalettePng),
            Strategy::PngGraphic => (Encoding::PalettePng, Encoding::Jpeg),
            Strategy::LossyWebp => (Encoding::WebP, Encoding::Native),
            Strategy::LossyJpeg => (Encoding::Jpeg, Encoding::Native),
        }
    }
}

/// Pick a strategy from lowercase extensions and, for PNG input, colour statistics.
///
/// PNG input without statistics is treated as photographic.
pub fn choose_strategy(
    input_ext: &str,
    requested_ext: &str,
    stats: Option<&ColorStats>,
) -> Strategy {
    if input_ext == "png" {
        return match stats {
            Some(stats) if !stats.is_photographic() => Strategy::PngGraphic,
            _ => Strategy::PngPhotographic,
        };
    }

    if requested_ext == "webp" {
        Strategy::LossyWebp
    } else {
        Strategy::LossyJpeg
    }
}

/// Inputs shared by every encoding attempt for one image
struct EncodeSource<'a> {
    original: &'a DynamicImage,
    rgb: &'a RgbImage,
    quality: u8,
}

/// Compresses single images with the `image` decoder and dedicated encoders
pub struct ImageProcessor;

impl ImageProcessor {
    /// Compress `input_path` towards `requested_path` and return what was actually written.
    ///
    /// # Errors
    /// - `OptimizeError::Decode` when the input cannot be decoded
    /// - `OptimizeError::Encode` when primary and fallback encodings both fail
    /// - `OptimizeError::Io` when the output cannot be written
    pub fn compress_to_path(
        input_path: &Path,
        requested_path: &Path,
        tier: QualityTier,
    ) -> Result<ResolvedArtifact, OptimizeError> {
        let img = Self::decode(input_path)?;

        let input_ext = FileManager::extension_of(input_path);
        let requested_ext = FileManager::extension_of(requested_path);
        let stats = (input_ext == "png").then(|| ColorStats::collect(&img));
        let strategy = choose_strategy(&input_ext, &requested_ext, stats.as_ref());

        debug!(
            input = %input_path.display(),
            ?strategy,
            colors = ?stats.map(|s| s.distinct_colors),
            quality = tier.image_quality(),
            "Selected image strategy"
        );

        let rgb = flatten_onto_white(&img);
        let source = EncodeSource {
            original: &img,
            rgb: &rgb,
            quality: tier.image_quality(),
        };

        let (primary, fallback) = strategy.encodings();
        match Self::write(primary, &source, requested_path) {
            Ok(artifact) => Ok(artifact),
            Err(primary_err) => {
                warn!(
                    "{:?} encoding failed for {}: {}, trying {:?}",
                    primary,
                    input_path.display(),
                    primary_err,
                    fallback
                );
                Self::write(fallback, &source, requested_path).map_err(|fallback_err| {
                    OptimizeError::Encode {
                        path: requested_path.to_path_buf(),
                        primary: primary_err.to_string(),
                        fallback: fallback_err.to_string(),
                    }
                })
            }
        }
    }

    fn decode(path: &Path) -> Result<DynamicImage, OptimizeError> {
        let to_err = |source: ImageError| OptimizeError::Decode {
            path: path.to_path_buf(),
            source,
        };

        image::io::Reader::open(path)
            .map_err(|e| to_err(ImageError::IoError(e)))?
            .with_guessed_format()
            .map_err(|e| to_err(ImageError::IoError(e)))?
            .decode()
            .map_err(to_err)
    }

    fn write(
        encoding: Encoding,
        source: &EncodeSource<'_>,
        requested_path: &Path,
    ) -> Result<ResolvedArtifact, OptimizeError> {
        let target = target_path(encoding, requested_path);

        let bytes = match encoding {
            Encoding::Jpeg => guarded("JPEG", || encode_jpeg(source.rgb, source.quality))?,
            Encoding::WebP => guarded("WebP", || encode_webp(source.rgb, source.quality))?,
            Encoding::PalettePng => guarded("PNG", || encode_palette_png(source.original))?,
            Encoding::Native => {
                source.original.save(&target)?;
                return Ok(ResolvedArtifact::new(target));
            }
        };

        std::fs::write(&target, bytes)?;
        Ok(ResolvedArtifact::new(target))
    }
}

/// Where an encoding writes for a requested path
fn target_path(encoding: Encoding, requested_path: &Path) -> PathBuf {
    match encoding {
        Encoding::Jpeg => requested_path.with_extension("jpg"),
        Encoding::PalettePng | Encoding::WebP | Encoding::Native => requested_path.to_path_buf(),
    }
}

/// Run a codec, turning a panic inside native code bindings into a codec error
fn guarded<T>(
    format: &'static str,
    encode: impl FnOnce() -> Result<T, OptimizeError>,
) -> Result<T, OptimizeError> {
    panic::catch_unwind(AssertUnwindSafe(encode))
        .unwrap_or_else(|_| Err(OptimizeError::codec(format, "encoder panicked")))
}

/// Composite onto opaque white when the image carries alpha, plain RGB otherwise
pub fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::new(width, height);

    for (x, y, px) in rgba.enumerate_pixels() {
        let alpha = px[3] as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(px[0]), blend(px[1]), blend(px[2])]));
    }

    out
}

fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, OptimizeError> {
    let (width, height) = rgb.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality as f32);
    comp.set_optimize_coding(true);

    let mut comp = comp
        .start_compress(Vec::new())
        .map_err(|e| OptimizeError::codec("JPEG", e))?;
    comp.write_scanlines(rgb.as_raw())
        .map_err(|e| OptimizeError::codec("JPEG", e))?;
    comp.finish().map_err(|e| OptimizeError::codec("JPEG", e))
}

fn encode_webp(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, OptimizeError> {
    let (width, height) = rgb.dimensions();

    let mut config = webp::WebPConfig::new()
        .map_err(|_| OptimizeError::codec("WebP", "unable to initialise encoder config"))?;
    config.quality = quality as f32;
    config.method = WEBP_METHOD;

    let encoded = webp::Encoder::from_rgb(rgb.as_raw(), width, height)
        .encode_advanced(&config)
        .map_err(|e| OptimizeError::codec("WebP", format!("{:?}", e)))?;

    Ok(encoded.to_vec())
}

fn encode_palette_png(img: &DynamicImage) -> Result<Vec<u8>, OptimizeError> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let (palette, indices) = quantize(rgba.as_raw())?;

    let rgb_palette: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    let alpha: Vec<u8> = palette.iter().map(|c| c[3]).collect();

    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_palette(rgb_palette);
        if alpha.iter().any(|&a| a < u8::MAX) {
            encoder.set_trns(alpha);
        }
        encoder.set_compression(png::Compression::Best);

        let mut writer = encoder
            .write_header()
            .map_err(|e| OptimizeError::codec("PNG", e))?;
        writer
            .write_image_data(&indices)
            .map_err(|e| OptimizeError::codec("PNG", e))?;
        writer.finish().map_err(|e| OptimizeError::codec("PNG", e))?;
    }

    Ok(buffer)
}

/// Reduce RGBA pixels to at most `PALETTE_SIZE` colours.
///
/// Images that already fit keep their exact colours, the rest go through NeuQuant.
fn quantize(pixels: &[u8]) -> Result<(Vec<[u8; 4]>, Vec<u8>), OptimizeError> {
    let mut lookup: HashMap<[u8; 4], u8> = HashMap::new();
    let mut palette: Vec<[u8; 4]> = Vec::new();
    let mut fits = true;

    for px in pixels.chunks_exact(4) {
        let color = [px[0], px[1], px[2], px[3]];
        if lookup.contains_key(&color) {
            continue;
        }
        if palette.len() == PALETTE_SIZE {
            fits = false;
            break;
        }
        lookup.insert(color, palette.len() as u8);
        palette.push(color);
    }

    if fits {
        let indices = pixels
            .chunks_exact(4)
            .map(|px| lookup[&[px[0], px[1], px[2], px[3]]])
            .collect();
        return Ok((palette, indices));
    }

    // small images need every pixel as a training sample
    let sample_factor = if pixels.len() / 4 < 10_000 { 1 } else { 10 };
    let quantizer = NeuQuant::new(sample_factor, PALETTE_SIZE, pixels);

    let palette = quantizer
        .color_map_rgba()
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect();
    let indices = pixels
        .chunks_exact(4)
        .map(|px| quantizer.index_of(px) as u8)
        .collect();

    Ok((palette, indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::fs::File;
    use tempfile::TempDir;

    /// 64x64 gradient, 4096 distinct colours
    fn photo() -> RgbImage {
        RgbImage::from_fn(64, 64, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8]))
    }

    /// 32x32 image with 4 flat colours
    fn graphic() -> RgbImage {
        RgbImage::from_fn(32, 32, |x, y| match (x < 16, y < 16) {
            (true, true) => Rgb([255, 0, 0]),
            (true, false) => Rgb([0, 255, 0]),
            (false, true) => Rgb([0, 0, 255]),
            (false, false) => Rgb([255, 255, 255]),
        })
    }

    fn png_color_type(path: &Path) -> png::ColorType {
        let decoder = png::Decoder::new(File::open(path).unwrap());
        let reader = decoder.read_info().unwrap();
        reader.info().color_type
    }

    #[test]
    fn test_choose_strategy_png_branches() {
        let few = ColorStats { distinct_colors: 256 };
        let many = ColorStats { distinct_colors: 257 };

        assert_eq!(choose_strategy("png", "png", Some(&few)), Strategy::PngGraphic);
        assert_eq!(choose_strategy("png", "png", Some(&many)), Strategy::PngPhotographic);
        assert_eq!(choose_strategy("png", "webp", Some(&many)), Strategy::PngPhotographic);
        assert_eq!(choose_strategy("png", "png", None), Strategy::PngPhotographic);
    }

    #[test]
    fn test_choose_strategy_ignores_stats_for_other_inputs() {
        let few = ColorStats { distinct_colors: 2 };
        assert_eq!(choose_strategy("jpg", "jpg", Some(&few)), Strategy::LossyJpeg);
        assert_eq!(choose_strategy("bmp", "bmp", None), Strategy::LossyJpeg);
        assert_eq!(choose_strategy("webp", "webp", None), Strategy::LossyWebp);
        assert_eq!(choose_strategy("jpeg", "webp", None), Strategy::LossyWebp);
    }

    #[test]
    fn test_strategy_fallback_order() {
        assert_eq!(
            Strategy::PngPhotographic.encodings(),
            (Encoding::Jpeg, Encoding::PalettePng)
        );
        assert_eq!(
            Strategy::PngGraphic.encodings(),
            (Encoding::PalettePng, Encoding::Jpeg)
        );
        assert_eq!(Strategy::LossyWebp.encodings(), (Encoding::WebP, Encoding::Native));
        assert_eq!(Strategy::LossyJpeg.encodings(), (Encoding::Jpeg, Encoding::Native));
    }

    #[test]
    fn test_target_path_forces_jpg_only_for_jpeg() {
        let requested = Path::new("/w/optimized_cat.png");
        assert_eq!(target_path(Encoding::Jpeg, requested), PathBuf::from("/w/optimized_cat.jpg"));
        assert_eq!(target_path(Encoding::PalettePng, requested), requested);
        assert_eq!(target_path(Encoding::Native, requested), requested);
    }

    #[test]
    fn test_color_stats() {
        let graphic = DynamicImage::ImageRgb8(graphic());
        assert_eq!(ColorStats::collect(&graphic).distinct_colors, 4);
        assert!(!ColorStats::collect(&graphic).is_photographic());

        let photo = DynamicImage::ImageRgb8(photo());
        assert!(ColorStats::collect(&photo).is_photographic());
    }

    #[test]
    fn test_color_stats_count_alpha_as_distinct() {
        let img = RgbaImage::from_fn(2, 1, |x, _| Rgba([10, 10, 10, if x == 0 { 0 } else { 255 }]));
        let stats = ColorStats::collect(&DynamicImage::ImageRgba8(img));
        assert_eq!(stats.distinct_colors, 2);
    }

    #[test]
    fn test_flatten_onto_white() {
        let img = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([0, 0, 0, 0]),
            1 => Rgba([0, 0, 0, 255]),
            _ => Rgba([0, 0, 0, 128]),
        });
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(img));

        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(flat.get_pixel(1, 0), &Rgb([0, 0, 0]));
        let mid = flat.get_pixel(2, 0)[0];
        assert!((126..=128).contains(&mid));
    }

    #[test]
    fn test_quantize_keeps_exact_small_palettes() {
        let img = graphic();
        let rgba = DynamicImage::ImageRgb8(img).to_rgba8();
        let (palette, indices) = quantize(rgba.as_raw()).unwrap();

        assert_eq!(palette.len(), 4);
        assert_eq!(indices.len(), 32 * 32);
        assert_eq!(palette[indices[0] as usize], [255, 0, 0, 255]);
    }

    #[test]
    fn test_quantize_caps_large_palettes() {
        let rgba = DynamicImage::ImageRgb8(photo()).to_rgba8();
        let (palette, indices) = quantize(rgba.as_raw()).unwrap();

        assert!(palette.len() <= PALETTE_SIZE);
        assert!(indices.iter().all(|&i| (i as usize) < palette.len()));
    }

    #[test]
    fn test_graphic_png_stays_palette_png() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input_logo.png");
        graphic().save(&input).unwrap();
        let requested = dir.path().join("optimized_logo.png");

        let artifact =
            ImageProcessor::compress_to_path(&input, &requested, QualityTier::Avg).unwrap();

        assert_eq!(artifact.path, requested);
        assert_eq!(artifact.extension, "png");
        assert_eq!(png_color_type(&artifact.path), png::ColorType::Indexed);

        let decoded = image::open(&artifact.path).unwrap().to_rgb8();
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(decoded.get_pixel(31, 31), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_two_hundred_colour_png_stays_indexed_png() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input_chart.png");
        let img = RgbImage::from_fn(200, 8, |x, _| {
            Rgb([x as u8, (255 - x) as u8, ((x * 7) % 256) as u8])
        });
        img.save(&input).unwrap();
        let requested = dir.path().join("optimized_chart.png");

        let stats = ColorStats::collect(&DynamicImage::ImageRgb8(img));
        assert_eq!(stats.distinct_colors, 200);
        assert!(stats.distinct_colors > PALETTE_SIZE);

        let artifact =
            ImageProcessor::compress_to_path(&input, &requested, QualityTier::Avg).unwrap();

        assert_eq!(artifact.path, requested);
        assert_eq!(artifact.extension, "png");
        assert_eq!(png_color_type(&artifact.path), png::ColorType::Indexed);
        let decoded = image::open(&artifact.path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 8));
    }

    #[test]
    fn test_missing_output_directory_is_not_recreated() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input_logo.png");
        graphic().save(&input).unwrap();
        let gone = dir.path().join("ifo_removed");

        let err = ImageProcessor::compress_to_path(
            &input,
            &gone.join("optimized_logo.png"),
            QualityTier::Avg,
        )
        .unwrap_err();

        assert!(matches!(err, OptimizeError::Encode { .. }));
        assert!(!gone.exists());
    }

    #[test]
    fn test_photographic_png_becomes_jpeg() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input_photo.png");
        photo().save(&input).unwrap();
        let requested = dir.path().join("optimized_photo.png");

        let artifact =
            ImageProcessor::compress_to_path(&input, &requested, QualityTier::High).unwrap();

        assert_eq!(artifact.path, dir.path().join("optimized_photo.jpg"));
        assert_eq!(artifact.extension, "jpg");
        assert!(!requested.exists());
        assert_eq!(
            image::ImageFormat::from_path(&artifact.path).unwrap(),
            image::ImageFormat::Jpeg
        );
        let decoded = image::open(&artifact.path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[test]
    fn test_photographic_png_with_alpha_is_flattened_on_white() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input_overlay.png");
        let img = RgbaImage::from_fn(64, 64, |x, y| {
            if x < 32 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([(x * 4) as u8, (y * 4) as u8, 90, 255])
            }
        });
        img.save(&input).unwrap();

        let artifact = ImageProcessor::compress_to_path(
            &input,
            &dir.path().join("optimized_overlay.png"),
            QualityTier::High,
        )
        .unwrap();

        assert_eq!(artifact.extension, "jpg");
        let decoded = image::open(&artifact.path).unwrap().to_rgb8();
        let px = decoded.get_pixel(4, 4);
        assert!(px.0.iter().all(|&c| c > 240), "expected white, got {:?}", px);
    }

    #[test]
    fn test_bmp_is_reencoded_as_jpeg() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input_scan.bmp");
        graphic().save(&input).unwrap();

        let artifact = ImageProcessor::compress_to_path(
            &input,
            &dir.path().join("optimized_scan.bmp"),
            QualityTier::Low,
        )
        .unwrap();

        assert_eq!(artifact.path, dir.path().join("optimized_scan.jpg"));
        assert!(image::open(&artifact.path).is_ok());
    }

    #[test]
    fn test_webp_request_is_honoured() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input_pic.jpg");
        photo().save(&input).unwrap();
        let requested = dir.path().join("optimized_pic.webp");

        let artifact =
            ImageProcessor::compress_to_path(&input, &requested, QualityTier::Avg).unwrap();

        assert_eq!(artifact.path, requested);
        assert_eq!(artifact.extension, "webp");
        let decoded = image::open(&artifact.path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[test]
    fn test_lower_tier_produces_smaller_jpeg() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input_pic.jpg");
        RgbImage::from_fn(128, 128, |x, y| {
            Rgb([(x * 2) as u8, (y * 2) as u8, ((x * y) % 251) as u8])
        })
        .save(&input)
        .unwrap();

        let low = ImageProcessor::compress_to_path(
            &input,
            &dir.path().join("optimized_pic_low.jpg"),
            QualityTier::Low,
        )
        .unwrap();
        let high = ImageProcessor::compress_to_path(
            &input,
            &dir.path().join("optimized_pic_high.jpg"),
            QualityTier::High,
        )
        .unwrap();

        let low_size = std::fs::metadata(&low.path).unwrap().len();
        let high_size = std::fs::metadata(&high.path).unwrap().len();
        assert!(low_size < high_size);
    }

    #[test]
    fn test_corrupt_input_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input_broken.png");
        std::fs::write(&input, b"definitely not a png").unwrap();

        let err = ImageProcessor::compress_to_path(
            &input,
            &dir.path().join("optimized_broken.png"),
            QualityTier::Avg,
        )
        .unwrap_err();

        assert!(matches!(err, OptimizeError::Decode { .. }));
        assert!(err.to_string().starts_with("Unable to open image"));
    }
}
