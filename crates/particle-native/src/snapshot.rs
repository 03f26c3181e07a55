//! Periodic point-cloud snapshots posted to a configured endpoint.
//!
//! Runs entirely off the render thread: the frame loop hands over a copy of
//! the live buffer when the timer fires, and the uploader rasterizes, encodes
//! and posts it. Failures are logged and dropped.

use crate::render::{projection, view_matrix};
use base64::prelude::*;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use glam::{Mat4, Vec4};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbImage};
use particle_core::{
    capture_allowed, parse_public_ip, RenderConfig, Rgb, SnapshotConfig, SnapshotPayload,
    SnapshotTimer,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const IP_LOOKUP_URL: &str = "https://api.ipify.org?format=json";
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);
const SNAPSHOT_WIDTH: u32 = 640;
const SNAPSHOT_HEIGHT: u32 = 360;
const BACKGROUND: [u8; 3] = [5, 5, 5];

/// Copy of the drawable state at capture time.
pub struct SnapshotFrame {
    pub positions: Vec<f32>,
    pub model: Mat4,
    pub color: Rgb,
}

pub struct SnapshotUploader {
    frames: Sender<SnapshotFrame>,
    allowed: Arc<AtomicBool>,
    timer: SnapshotTimer,
}

impl SnapshotUploader {
    pub fn spawn(config: SnapshotConfig, render: RenderConfig) -> anyhow::Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let allowed = Arc::new(AtomicBool::new(false));
        let timer = SnapshotTimer::new(config.interval());
        let allowed_flag = Arc::clone(&allowed);
        thread::Builder::new()
            .name("snapshot-uploader".into())
            .spawn(move || run_uploader(config, render, rx, allowed_flag))?;
        Ok(Self {
            frames: tx,
            allowed,
            timer,
        })
    }

    /// Hand a frame to the uploader when the interval has passed.
    pub fn poll(&mut self, elapsed: Duration, frame: impl FnOnce() -> SnapshotFrame) {
        if !self.timer.due(elapsed) || !self.allowed.load(Ordering::Relaxed) {
            return;
        }
        match self.frames.try_send(frame()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => log::debug!("[snapshot] previous upload still running"),
            Err(TrySendError::Disconnected(_)) => log::debug!("[snapshot] uploader stopped"),
        }
    }
}

fn run_uploader(
    config: SnapshotConfig,
    render: RenderConfig,
    frames: Receiver<SnapshotFrame>,
    allowed: Arc<AtomicBool>,
) {
    let client = match reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            log::warn!("[snapshot] http client unavailable: {e}");
            return;
        }
    };

    let detected = match client.get(IP_LOOKUP_URL).send().and_then(|r| r.text()) {
        Ok(body) => parse_public_ip(&body),
        Err(e) => {
            log::warn!("[snapshot] public address lookup failed: {e}");
            None
        }
    };
    let enabled = capture_allowed(config.trusted_ip.as_deref(), detected.as_deref());
    if !enabled {
        log::info!("[snapshot] trusted network detected, capture disabled");
        return;
    }
    allowed.store(true, Ordering::Relaxed);
    log::info!(
        "[snapshot] capturing every {:?} to {}",
        config.interval(),
        config.url
    );

    for frame in frames.iter() {
        match upload(&client, &config.url, &render, &frame) {
            Ok(()) => log::debug!("[snapshot] uploaded"),
            Err(e) => log::warn!("[snapshot] upload failed: {e:#}"),
        }
    }
}

fn upload(
    client: &reqwest::blocking::Client,
    url: &str,
    render: &RenderConfig,
    frame: &SnapshotFrame,
) -> anyhow::Result<()> {
    let image = rasterize(frame, render, SNAPSHOT_WIDTH, SNAPSHOT_HEIGHT);
    let payload = SnapshotPayload {
        image: png_data_url(&image)?,
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    };
    client
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=utf-8")
        .body(payload.to_json()?)
        .send()?
        .error_for_status()?;
    Ok(())
}

/// Additive one-pixel splat of every point, from the same camera as the window.
pub fn rasterize(frame: &SnapshotFrame, render: &RenderConfig, width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, image::Rgb(BACKGROUND));
    let clip_from_model =
        projection(render, width as f32 / height as f32) * view_matrix(render) * frame.model;
    let splat = frame
        .color
        .to_array()
        .map(|c| (c.clamp(0.0, 1.0) * render.opacity * 255.0) as u16);
    for p in frame.positions.chunks_exact(3) {
        let clip = clip_from_model * Vec4::new(p[0], p[1], p[2], 1.0);
        if clip.w <= 0.0 {
            continue;
        }
        let ndc = clip.truncate() / clip.w;
        if !(-1.0..=1.0).contains(&ndc.x) || !(-1.0..=1.0).contains(&ndc.y) {
            continue;
        }
        let px = ((ndc.x * 0.5 + 0.5) * (width - 1) as f32).round() as u32;
        let py = ((0.5 - ndc.y * 0.5) * (height - 1) as f32).round() as u32;
        let pixel = img.get_pixel_mut(px, py);
        for (channel, add) in pixel.0.iter_mut().zip(splat) {
            *channel = (*channel as u16 + add).min(255) as u8;
        }
    }
    img
}

pub fn png_data_url(img: &RgbImage) -> anyhow::Result<String> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(img.as_raw(), img.width(), img.height(), ColorType::Rgb8)?;
    Ok(format!("data:image/png;base64,{}", BASE64_STANDARD.encode(&png)))
}
