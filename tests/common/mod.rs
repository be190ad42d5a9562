#![allow(dead_code)]

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use space_media_batcher::{Config, EncodeParams, OptimizeError, VideoEncoder};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Copies the input to the output, standing in for ffmpeg
#[derive(Default)]
pub struct CopyEncoder {
    pub calls: AtomicUsize,
}

#[async_trait]
impl VideoEncoder for CopyEncoder {
    async fn encode(
        &self,
        input: &Path,
        output: &Path,
        _params: &EncodeParams,
    ) -> Result<PathBuf, OptimizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::copy(input, output).await?;
        Ok(output.to_path_buf())
    }
}

/// Fails like ffmpeg exiting non-zero
pub struct BrokenEncoder;

#[async_trait]
impl VideoEncoder for BrokenEncoder {
    async fn encode(
        &self,
        _input: &Path,
        _output: &Path,
        _params: &EncodeParams,
    ) -> Result<PathBuf, OptimizeError> {
        Err(OptimizeError::FFmpeg("exit status: 1: Invalid data found".to_string()))
    }
}

/// Config whose scratch and storage directories live under `root`
pub fn config_in(root: &TempDir) -> Config {
    let scratch = root.path().join("scratch");
    std::fs::create_dir_all(&scratch).unwrap();
    Config {
        scratch_dir: Some(scratch),
        storage_dir: root.path().join("storage"),
        ..Default::default()
    }
}

pub fn scratch_entries(root: &TempDir) -> usize {
    std::fs::read_dir(root.path().join("scratch")).unwrap().count()
}

fn encode(img: &RgbImage, format: image::ImageOutputFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// PNG with four flat colours
pub fn graphic_png() -> Vec<u8> {
    let img = RgbImage::from_fn(32, 32, |x, y| match (x < 16, y < 16) {
        (true, true) => Rgb([200, 30, 30]),
        (true, false) => Rgb([30, 200, 30]),
        (false, true) => Rgb([30, 30, 200]),
        (false, false) => Rgb([250, 250, 250]),
    });
    encode(&img, image::ImageOutputFormat::Png)
}

/// PNG gradient with thousands of colours
pub fn photo_png() -> Vec<u8> {
    let img = RgbImage::from_fn(64, 64, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, 128]));
    encode(&img, image::ImageOutputFormat::Png)
}

pub fn photo_jpeg() -> Vec<u8> {
    let img = RgbImage::from_fn(48, 48, |x, y| Rgb([(x * 5) as u8, 90, (y * 5) as u8]));
    encode(&img, image::ImageOutputFormat::Jpeg(95))
}

/// Names of the entries of a zip archive, in order
pub fn zip_entry_names(data: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}
