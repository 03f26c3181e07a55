//! Hand-pose producers for the desktop build.
//!
//! `PointerHandSource` stands in for a camera: the cursor is the palm, the
//! left button closes the fist and the scroll wheel moves the hand nearer or
//! further. `JsonLinesHandSource` reads landmarks from an external tracker
//! through a shared `LandmarkFeed`.

use crossbeam_channel::{Receiver, RecvTimeoutError};
use glam::Vec3;
use particle_core::{
    HandLandmarks, HandObservation, HandPoseSource, SensorError, SignalCell, FINGERTIPS,
    LANDMARK_COUNT, MIDDLE_MCP,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POINTER_FRAME: Duration = Duration::from_millis(33); // ~30 fps, like a webcam
const FIST_RATIO: f32 = 0.6; // fingertip/palm ratio while the button is held
const OPEN_RATIO: f32 = 2.2;
const FINGER_FAN: [f32; 5] = [-0.6, -0.3, 0.0, 0.3, 0.6]; // radians from vertical
pub const PALM_SIZE_DEFAULT: f32 = 0.175; // zoom 1.0
pub const PALM_SIZE_MIN: f32 = 0.05;
pub const PALM_SIZE_MAX: f32 = 0.45;
const LANDMARK_QUEUE: usize = 8;

/// Cursor state as seen by the window, in normalized window coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub inside: bool,
    pub x: f32,
    pub y: f32,
    pub grip: bool,
    pub palm_size: f32,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            inside: false,
            x: 0.5,
            y: 0.5,
            grip: false,
            palm_size: PALM_SIZE_DEFAULT,
        }
    }
}

impl PointerState {
    pub fn scroll(&mut self, lines: f32) {
        self.palm_size = (self.palm_size + lines * 0.01).clamp(PALM_SIZE_MIN, PALM_SIZE_MAX);
    }
}

/// Landmarks a camera would report for a hand posed like the pointer.
///
/// Camera frames are mirrored, so the palm is placed at `1 - x` and reduces
/// back to the cursor position.
pub fn pointer_landmarks(pointer: &PointerState) -> HandLandmarks {
    let palm = pointer.palm_size;
    let knuckle = Vec3::new(1.0 - pointer.x, pointer.y, 0.0);
    let wrist = knuckle + Vec3::new(0.0, palm, 0.0);
    let reach = palm * if pointer.grip { FIST_RATIO } else { OPEN_RATIO };
    let mut landmarks = [wrist; LANDMARK_COUNT];
    landmarks[MIDDLE_MCP] = knuckle;
    for (&tip, angle) in FINGERTIPS.iter().zip(FINGER_FAN) {
        landmarks[tip] = wrist + Vec3::new(angle.sin(), -angle.cos(), 0.0) * reach;
    }
    landmarks
}

pub struct PointerHandSource {
    pointer: SignalCell<PointerState>,
}

impl PointerHandSource {
    pub fn new(pointer: SignalCell<PointerState>) -> Self {
        log::info!("[hand] tracking the pointer (hold left button for a fist, scroll to zoom)");
        Self { pointer }
    }
}

impl HandPoseSource for PointerHandSource {
    fn next_observation(&mut self, timeout: Duration) -> Result<HandObservation, SensorError> {
        thread::sleep(timeout.min(POINTER_FRAME));
        let pointer = self.pointer.get();
        Ok(if pointer.inside {
            HandObservation::Hand(pointer_landmarks(&pointer))
        } else {
            HandObservation::Absent
        })
    }
}

/// Parse one tracker line: `null` for no hand, or 21 `[x, y, z]` triples.
///
/// Blank lines yield `Ok(None)`.
pub fn parse_landmark_line(line: &str) -> Result<Option<HandObservation>, SensorError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let parsed: Option<Vec<[f32; 3]>> = serde_json::from_str(line)
        .map_err(|e| SensorError::Inference(format!("bad landmark line: {e}")))?;
    let Some(points) = parsed else {
        return Ok(Some(HandObservation::Absent));
    };
    if points.len() != LANDMARK_COUNT {
        return Err(SensorError::Inference(format!(
            "expected {LANDMARK_COUNT} landmarks, got {}",
            points.len()
        )));
    }
    let mut landmarks = [Vec3::ZERO; LANDMARK_COUNT];
    for (slot, p) in landmarks.iter_mut().zip(&points) {
        *slot = Vec3::from_array(*p);
    }
    Ok(Some(HandObservation::Hand(landmarks)))
}

/// Where the external tracker writes its landmark stream.
#[derive(Clone, Debug)]
pub enum LandmarkInput {
    Stdin,
    File(PathBuf),
}

impl LandmarkInput {
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            Self::Stdin
        } else {
            Self::File(arg.to_path_buf())
        }
    }
}

type LandmarkItem = Result<HandObservation, SensorError>;

/// The single reader over an external tracker stream.
///
/// The stream is read by one thread for as long as it stays open. Every
/// [`JsonLinesHandSource`] handed out shares that thread's queue, so toggling
/// tracking off and on never races a second reader for the same lines.
pub struct LandmarkFeed {
    lines: Receiver<LandmarkItem>,
    reader: JoinHandle<()>,
}

impl LandmarkFeed {
    pub fn open(input: &LandmarkInput) -> Result<Self, SensorError> {
        let feed = match input {
            LandmarkInput::Stdin => Self::from_reader(BufReader::new(io::stdin())),
            LandmarkInput::File(path) => {
                let file = File::open(path).map_err(|e| {
                    SensorError::Unavailable(format!("{}: {e}", path.display()))
                })?;
                Self::from_reader(BufReader::new(file))
            }
        }?;
        log::info!("[hand] reading landmarks from {input:?}");
        Ok(feed)
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Result<Self, SensorError> {
        let (tx, rx) = crossbeam_channel::bounded(LANDMARK_QUEUE);
        let reader = thread::Builder::new()
            .name("landmark-reader".into())
            .spawn(move || {
                for line in reader.lines() {
                    let item = match line {
                        Ok(line) => match parse_landmark_line(&line) {
                            Ok(Some(obs)) => Ok(obs),
                            Ok(None) => continue,
                            Err(e) => Err(e),
                        },
                        Err(e) => Err(SensorError::Inference(format!("read landmarks: {e}"))),
                    };
                    let failed = item.is_err();
                    if tx.send(item).is_err() || failed {
                        return;
                    }
                }
                // End of stream: dropping the sender reports a disconnect
            })
            .map_err(|e| SensorError::Unavailable(format!("spawn landmark reader: {e}")))?;
        Ok(Self { lines: rx, reader })
    }

    /// False once the reader has hit the end of the stream or an error.
    pub fn is_live(&self) -> bool {
        !self.reader.is_finished()
    }

    pub fn source(&self) -> JsonLinesHandSource {
        JsonLinesHandSource {
            lines: self.lines.clone(),
        }
    }
}

pub struct JsonLinesHandSource {
    lines: Receiver<LandmarkItem>,
}

impl HandPoseSource for JsonLinesHandSource {
    fn next_observation(&mut self, timeout: Duration) -> Result<HandObservation, SensorError> {
        match self.lines.recv_timeout(timeout) {
            Ok(item) => item,
            Err(RecvTimeoutError::Timeout) => Ok(HandObservation::Pending),
            Err(RecvTimeoutError::Disconnected) => Err(SensorError::Disconnected),
        }
    }
}
