//! Microphone spectrum producer (cpal input stream feeding the analyser).

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use particle_core::{AnalyserConfig, AudioProducer, SensorError, SpectrumAnalyzer, SpectrumSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Blocks buffered between the audio callback and the producer thread
const BLOCK_QUEUE: usize = 32;

pub struct MicSpectrum {
    // Dropping the stream releases the device
    _stream: cpal::Stream,
    blocks: Receiver<Vec<f32>>,
    analyzer: SpectrumAnalyzer,
    stream_failed: Arc<AtomicBool>,
}

/// Open the default input device and start capturing.
pub fn open(config: &AnalyserConfig) -> Result<AudioProducer<MicSpectrum>, SensorError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| SensorError::Unavailable("no input device".to_string()))?;
    let supported = device
        .default_input_config()
        .map_err(|e| SensorError::Unavailable(format!("input config: {e}")))?;
    let channels = supported.channels() as usize;
    let sample_rate = supported.sample_rate().0;
    let format = supported.sample_format();
    let stream_config: cpal::StreamConfig = supported.into();

    let (tx, rx) = crossbeam_channel::bounded(BLOCK_QUEUE);
    let stream_failed = Arc::new(AtomicBool::new(false));
    let stream = match format {
        cpal::SampleFormat::F32 => {
            build_input::<f32>(&device, &stream_config, channels, tx, Arc::clone(&stream_failed))
        }
        cpal::SampleFormat::I16 => {
            build_input::<i16>(&device, &stream_config, channels, tx, Arc::clone(&stream_failed))
        }
        cpal::SampleFormat::U16 => {
            build_input::<u16>(&device, &stream_config, channels, tx, Arc::clone(&stream_failed))
        }
        other => {
            return Err(SensorError::Unavailable(format!(
                "unsupported sample format {other:?}"
            )))
        }
    }
    .map_err(|e| SensorError::Unavailable(format!("build input stream: {e}")))?;
    stream
        .play()
        .map_err(|e| SensorError::Unavailable(format!("start input stream: {e}")))?;

    log::info!(
        "[audio] capturing from {} ({} Hz, {} ch)",
        device.name().unwrap_or_else(|_| "input".to_string()),
        sample_rate,
        channels
    );
    Ok(AudioProducer::new(MicSpectrum {
        _stream: stream,
        blocks: rx,
        analyzer: SpectrumAnalyzer::new(config.clone()),
        stream_failed,
    }))
}

fn build_input<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    tx: Sender<Vec<f32>>,
    failed: Arc<AtomicBool>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = channels.max(1);
    device.build_input_stream(
        config,
        move |data: &[T], _| {
            // Downmix to mono
            let block: Vec<f32> = data
                .chunks(channels)
                .map(|frame| {
                    frame.iter().map(|s| s.to_sample::<f32>()).sum::<f32>() / frame.len() as f32
                })
                .collect();
            // A full queue drops the block; the analyser only needs the newest window
            _ = tx.try_send(block);
        },
        move |err| {
            log::error!("[audio] input stream error: {err}");
            failed.store(true, Ordering::Relaxed);
        },
        None,
    )
}

impl SpectrumSource for MicSpectrum {
    fn next_spectrum(&mut self, bins: &mut Vec<u8>, timeout: Duration) -> Result<bool, SensorError> {
        if self.stream_failed.load(Ordering::Relaxed) {
            return Err(SensorError::Disconnected);
        }
        let first = match self.blocks.recv_timeout(timeout) {
            Ok(block) => block,
            Err(RecvTimeoutError::Timeout) => return Ok(false),
            Err(RecvTimeoutError::Disconnected) => return Err(SensorError::Disconnected),
        };
        self.analyzer.push_samples(&first);
        for block in self.blocks.try_iter() {
            self.analyzer.push_samples(&block);
        }
        let spectrum = self.analyzer.analyze();
        bins.clear();
        bins.extend_from_slice(spectrum);
        Ok(true)
    }
}
