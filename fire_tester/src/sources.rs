// Frame sources. Each one decodes on a blocking thread and hands finished
// `Frame`s to the async session through a small bounded channel, so a slow
// consumer applies back-pressure to capture instead of buffering without limit.

use anyhow::{Context, Result, bail};
use fire_vision::Frame;
use futures::SinkExt;
use futures::channel::mpsc;
use futures::stream::{BoxStream, StreamExt};
use image::imageops::{self, FilterType};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const FRAME_QUEUE_DEPTH: usize = 4;

/// Lists the images in `dir`, sorted by file name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| image::ImageFormat::from_extension(ext).is_some())
            .unwrap_or(false);
        if is_image {
            paths.push(path);
        }
    }
    paths.sort();
    if paths.is_empty() {
        bail!("no images found in {}", dir.display());
    }
    Ok(paths)
}

/// Loads one image and scales it to the pipeline's frame size.
pub fn load_frame(path: &Path, width: u32, height: u32) -> Result<Frame> {
    let mut image = image::open(path)
        .with_context(|| format!("decoding {}", path.display()))?
        .to_rgb8();
    if image.dimensions() != (width, height) {
        image = imageops::resize(&image, width, height, FilterType::Triangle);
    }
    Ok(Frame::from_image(image)?)
}

/// Streams every image of a directory as a frame.
pub fn image_directory(
    dir: &Path,
    width: u32,
    height: u32,
    fps: f64,
) -> Result<BoxStream<'static, Frame>> {
    let paths = list_images(dir)?;
    info!(count = paths.len(), dir = %dir.display(), "Streaming image directory");

    let pause = (fps > 0.0).then(|| Duration::from_secs_f64(1.0 / fps));
    let (mut tx, rx) = mpsc::channel::<Frame>(FRAME_QUEUE_DEPTH);

    tokio::task::spawn_blocking(move || {
        for path in paths {
            let frame = match load_frame(&path, width, height) {
                Ok(frame) => frame,
                Err(error) => {
                    warn!(path = %path.display(), "Skipping image: {error:#}");
                    continue;
                }
            };
            if futures::executor::block_on(tx.send(frame)).is_err() {
                // Session stopped.
                break;
            }
            if let Some(pause) = pause {
                std::thread::sleep(pause);
            }
        }
    });

    Ok(rx.boxed())
}

#[cfg(feature = "camera")]
pub mod capture {
    use super::*;
    use opencv::{core, imgproc, prelude::*, videoio};

    pub enum Device {
        Camera(i32),
        Video(PathBuf),
    }

    /// Streams frames from a camera or a video file through OpenCV.
    pub fn open(device: Device, width: u32, height: u32) -> Result<BoxStream<'static, Frame>> {
        let mut cap = match &device {
            Device::Camera(index) => {
                let mut cap = videoio::VideoCapture::new(*index, videoio::CAP_ANY)?;
                cap.set(videoio::CAP_PROP_FRAME_WIDTH, width as f64)?;
                cap.set(videoio::CAP_PROP_FRAME_HEIGHT, height as f64)?;
                cap
            }
            Device::Video(path) => {
                let path = path.to_str().context("video path is not valid UTF-8")?;
                videoio::VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };
        if !cap.is_opened()? {
            bail!("could not open capture device");
        }

        let (mut tx, rx) = mpsc::channel::<Frame>(FRAME_QUEUE_DEPTH);
        tokio::task::spawn_blocking(move || {
            let mut mat = core::Mat::default();
            loop {
                match cap.read(&mut mat) {
                    Ok(true) if !mat.empty() => {}
                    Ok(_) => {
                        info!("Capture ended");
                        break;
                    }
                    Err(error) => {
                        warn!(%error, "Error reading frame");
                        break;
                    }
                }
                let frame = match to_frame(&mat, width, height) {
                    Ok(frame) => frame,
                    Err(error) => {
                        warn!("Dropping captured frame: {error:#}");
                        continue;
                    }
                };
                if futures::executor::block_on(tx.send(frame)).is_err() {
                    break;
                }
            }
        });

        Ok(rx.boxed())
    }

    fn to_frame(mat: &core::Mat, width: u32, height: u32) -> Result<Frame> {
        let size = mat.size()?;
        let bgr = if (size.width as u32, size.height as u32) != (width, height) {
            let mut resized = core::Mat::default();
            imgproc::resize(
                mat,
                &mut resized,
                core::Size::new(width as i32, height as i32),
                0.0,
                0.0,
                imgproc::INTER_LINEAR,
            )?;
            resized
        } else {
            mat.try_clone()?
        };
        let bytes = bgr.data_bytes()?.to_vec();
        Ok(Frame::from_bgr(width, height, bytes)?)
    }
}
