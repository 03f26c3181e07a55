mod hand_source;
mod mic;
mod render;
mod snapshot;

use clap::Parser;
use hand_source::{LandmarkFeed, LandmarkInput, PointerHandSource, PointerState};
use particle_core::{
    AnalyserConfig, AudioSession, BlendEngine, FrameInput, HandProducer, HandSession,
    ParticleField, ParticleShape, Rgb, SceneConfig, SensorStatus, SignalCell, PARTICLE_COUNT,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use render::{FrameView, GpuState};
use snapshot::{SnapshotFrame, SnapshotUploader};
use std::path::PathBuf;
use std::time::Instant;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
struct Args {
    /// Path to scene TOML
    #[arg(long, default_value = "particles.toml")]
    config: PathBuf,

    /// Starting shape (overrides config)
    #[arg(long)]
    shape: Option<ParticleShape>,

    /// Base color as #rrggbb (overrides config)
    #[arg(long)]
    color: Option<Rgb>,

    /// Start with hand tracking on (overrides config)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    camera: Option<bool>,

    /// Start with the microphone on (overrides config)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    audio: Option<bool>,

    /// Read hand landmarks as JSON lines from a file, or `-` for stdin, instead of the pointer
    #[arg(long, value_name = "PATH|-")]
    landmarks: Option<PathBuf>,

    /// Seed for the shape generators
    #[arg(long)]
    seed: Option<u64>,
}

/// Base colors the `P` key steps through after the configured one.
const PALETTE: [Rgb; 6] = [
    Rgb::CYAN,
    Rgb::new(1.0, 0.2, 0.4),
    Rgb::new(1.0, 0.667, 0.0),
    Rgb::new(0.4, 1.0, 0.4),
    Rgb::new(0.667, 0.4, 1.0),
    Rgb::new(1.0, 1.0, 1.0),
];

/// Frontend state: the blend engine plus the two sensor toggles.
struct App {
    engine: BlendEngine,
    rng: StdRng,
    hand: HandSession,
    audio: AudioSession,
    camera_enabled: bool,
    audio_enabled: bool,
    colors: Vec<Rgb>,
    color_index: usize,
    pointer: PointerState,
    pointer_cell: SignalCell<PointerState>,
    landmarks: Option<LandmarkInput>,
    feed: Option<LandmarkFeed>,
    analyser: AnalyserConfig,
    snapshot: Option<SnapshotUploader>,
    shown_title: String,
    start: Instant,
    last_tick: Instant,
}

impl App {
    fn new(cfg: &SceneConfig, args: &Args) -> Self {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let field = ParticleField::new(cfg.shape, PARTICLE_COUNT, &mut rng);
        let snapshot = cfg.snapshot.clone().and_then(|s| {
            SnapshotUploader::spawn(s, cfg.render.clone())
                .map_err(|e| log::warn!("[snapshot] uploader not started: {e}"))
                .ok()
        });
        let mut colors = vec![cfg.color];
        colors.extend(PALETTE.into_iter().filter(|c| c.to_hex() != cfg.color.to_hex()));
        let now = Instant::now();
        Self {
            engine: BlendEngine::new(field, cfg.color),
            rng,
            hand: HandSession::new("camera"),
            audio: AudioSession::new("microphone"),
            camera_enabled: false,
            audio_enabled: false,
            colors,
            color_index: 0,
            pointer: PointerState::default(),
            pointer_cell: SignalCell::new(PointerState::default()),
            landmarks: args.landmarks.as_deref().map(LandmarkInput::from_arg),
            feed: None,
            analyser: cfg.audio.clone(),
            snapshot,
            shown_title: String::new(),
            start: now,
            last_tick: now,
        }
    }

    fn set_camera(&mut self, on: bool) {
        if on == self.camera_enabled {
            return;
        }
        if !on {
            self.hand.disable();
            self.camera_enabled = false;
            log::info!("[hand] tracking off");
            return;
        }
        let result = match &self.landmarks {
            Some(input) => {
                let feed = match self.feed.take().filter(LandmarkFeed::is_live) {
                    Some(feed) => feed,
                    None => match LandmarkFeed::open(input) {
                        Ok(feed) => feed,
                        Err(e) => {
                            log::warn!("[hand] {e}");
                            return;
                        }
                    },
                };
                let source = feed.source();
                self.feed = Some(feed);
                self.hand.enable(move || Ok(HandProducer::new(source)))
            }
            None => {
                let pointer = self.pointer_cell.clone();
                self.hand
                    .enable(move || Ok(HandProducer::new(PointerHandSource::new(pointer))))
            }
        };
        // Open failures arrive later through `take_failure` in `tick`
        self.camera_enabled = result.is_ok();
    }

    fn set_audio(&mut self, on: bool) {
        if on == self.audio_enabled {
            return;
        }
        if !on {
            self.audio.disable();
            self.audio_enabled = false;
            log::info!("[audio] microphone off");
            return;
        }
        let analyser = self.analyser.clone();
        self.audio_enabled = self.audio.enable(move || mic::open(&analyser)).is_ok();
    }

    fn set_shape(&mut self, shape: ParticleShape) {
        if shape != self.engine.field().shape() {
            self.engine.set_shape(shape, &mut self.rng);
        }
    }

    fn cycle_color(&mut self) {
        self.color_index = (self.color_index + 1) % self.colors.len();
        let color = self.colors[self.color_index];
        self.engine.set_base_color(color);
        log::info!("[color] base color {}", color.to_hex());
    }

    fn update_pointer(&mut self, f: impl FnOnce(&mut PointerState)) {
        f(&mut self.pointer);
        self.pointer_cell.set(self.pointer);
    }

    fn title(&self) -> String {
        let label = |on: bool, status: SensorStatus| match (on, status) {
            (false, _) => "off",
            (true, SensorStatus::Starting) => "starting",
            (true, _) => "on",
        };
        format!(
            "Particles | {} | {} | camera {} | mic {}",
            self.engine.field().shape(),
            self.engine.base_color().to_hex(),
            label(self.camera_enabled, self.hand.status()),
            label(self.audio_enabled, self.audio.status())
        )
    }

    /// The window title, when it differs from the one shown last.
    fn title_change(&mut self) -> Option<String> {
        let title = self.title();
        if title == self.shown_title {
            return None;
        }
        self.shown_title.clone_from(&title);
        Some(title)
    }

    fn on_key(&mut self, key: &Key) {
        match key {
            Key::Named(NamedKey::Space) => self.set_shape(self.engine.field().shape().next()),
            Key::Character(c) => match c.as_str() {
                "c" | "C" => self.set_camera(!self.camera_enabled),
                "m" | "M" => self.set_audio(!self.audio_enabled),
                "p" | "P" => self.cycle_color(),
                digit => {
                    if let Some(shape) = digit.parse().ok().and_then(ParticleShape::from_index) {
                        self.set_shape(shape);
                    }
                }
            },
            _ => {}
        }
    }

    /// Advance one frame, switching off any toggle whose sensor failed.
    fn tick(&mut self) {
        if self.hand.take_failure().is_some() {
            self.camera_enabled = false;
        }
        if self.audio.take_failure().is_some() {
            self.audio_enabled = false;
        }

        let now = Instant::now();
        let dt = (now - self.last_tick).as_secs_f32();
        self.last_tick = now;
        let elapsed = now - self.start;
        // Both signals are read once so every particle sees the same snapshot
        let input = FrameInput {
            dt,
            elapsed: elapsed.as_secs_f32(),
            hand: self.hand.latest(),
            audio: self.audio.latest(),
            camera_enabled: self.camera_enabled,
        };
        let state = self.engine.tick(&input);

        if let Some(uploader) = self.snapshot.as_mut() {
            let engine = &self.engine;
            uploader.poll(elapsed, || SnapshotFrame {
                positions: engine.positions().to_vec(),
                model: state.rotation.matrix(),
                color: state.color,
            });
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = SceneConfig::load(&args.config)?;
    if let Some(shape) = args.shape {
        cfg.shape = shape;
    }
    if let Some(color) = args.color {
        cfg.color = color;
    }
    if let Some(camera) = args.camera {
        cfg.camera_enabled = camera;
    }
    if let Some(audio) = args.audio {
        cfg.audio_enabled = audio;
    }

    let mut app = App::new(&cfg, &args);
    app.set_camera(cfg.camera_enabled);
    app.set_audio(cfg.audio_enabled);
    log::info!(
        "[shape] keys 1-6 or Space select a shape, P cycles the color, C toggles the camera, M the microphone"
    );

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(app.title_change().unwrap_or_default())
        .build(&event_loop)?;

    let mut state = pollster::block_on(GpuState::new(&window, cfg.render.clone(), PARTICLE_COUNT))?;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if logical_key == Key::Named(NamedKey::Escape) {
                    elwt.exit();
                } else {
                    app.on_key(&logical_key);
                }
            }
            WindowEvent::CursorEntered { .. } => app.update_pointer(|p| p.inside = true),
            WindowEvent::CursorLeft { .. } => app.update_pointer(|p| p.inside = false),
            WindowEvent::CursorMoved { position, .. } => {
                let (w, h) = state.size();
                let x = (position.x / w.max(1) as f64).clamp(0.0, 1.0) as f32;
                let y = (position.y / h.max(1) as f64).clamp(0.0, 1.0) as f32;
                app.update_pointer(|p| {
                    p.inside = true;
                    p.x = x;
                    p.y = y;
                });
            }
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => app.update_pointer(|p| p.grip = button_state == ElementState::Pressed),
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 40.0) as f32,
                };
                app.update_pointer(|p| p.scroll(lines));
            }
            _ => {}
        },
        Event::AboutToWait => {
            app.tick();
            if let Some(title) = app.title_change() {
                state.window.set_title(&title);
            }
            let frame = FrameView {
                positions: app.engine.positions(),
                model: app.engine.rotation().matrix(),
                color: app.engine.color(),
            };
            match state.render(&frame) {
                Ok(_) => state.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(_) => {}
            }
        }
        _ => {}
    })?;
    Ok(())
}
