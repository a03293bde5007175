//! Audio capture
//!
//! Fixed-duration, blocking capture from the default input device using CPAL
//! (Cross-Platform Audio Library). The device is held only for the length of
//! one call.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig};
use log::{debug, info};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::buffer::PcmBuffer;
use crate::error::{ReedError, Result};

/// Default pause before capture so a button press does not end up in the recording
pub const DEFAULT_GUARD_DELAY: Duration = Duration::from_millis(100);

/// Extra time allowed beyond the requested duration before giving up on the device
const CAPTURE_GRACE: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Something that can produce interleaved PCM frames on demand
pub trait AudioSource {
    /// Block until `frames * channels` interleaved samples have been read
    fn record(&mut self, frames: usize, sample_rate: u32, channels: usize) -> Result<Vec<f32>>;
}

/// Default system input device
#[derive(Debug, Default)]
pub struct CpalSource;

impl CpalSource {
    pub fn new() -> Self {
        Self
    }

    fn default_device() -> Result<Device> {
        cpal::default_host()
            .default_input_device()
            .ok_or_else(|| ReedError::Device("no input device available".to_string()))
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        target: usize,
        collected: Arc<Mutex<Vec<f32>>>,
        fault: Arc<Mutex<Option<String>>>,
    ) -> Result<cpal::Stream>
    where
        T: cpal::Sample + cpal::SizedSample + Send + 'static,
        f32: cpal::FromSample<T>,
    {
        device
            .build_input_stream(
                config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buffer) = collected.lock() {
                        let room = target.saturating_sub(buffer.len());
                        buffer.extend(
                            data.iter()
                                .take(room)
                                .map(|&s| <f32 as cpal::Sample>::from_sample(s)),
                        );
                    }
                },
                move |err| {
                    if let Ok(mut slot) = fault.lock() {
                        slot.get_or_insert_with(|| err.to_string());
                    }
                },
                None,
            )
            .map_err(|e| ReedError::Device(e.to_string()))
    }
}

impl AudioSource for CpalSource {
    fn record(&mut self, frames: usize, sample_rate: u32, channels: usize) -> Result<Vec<f32>> {
        let device = Self::default_device()?;
        let sample_format = device
            .default_input_config()
            .map_err(|e| ReedError::Device(e.to_string()))?
            .sample_format();

        let config = StreamConfig {
            channels: channels as u16,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let target = frames * channels;
        let collected = Arc::new(Mutex::new(Vec::with_capacity(target)));
        let fault = Arc::new(Mutex::new(None));

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, target, collected.clone(), fault.clone())?
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, target, collected.clone(), fault.clone())?
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, target, collected.clone(), fault.clone())?
            }
            other => {
                return Err(ReedError::Device(format!("unsupported sample format {:?}", other)));
            }
        };

        stream.play().map_err(|e| ReedError::Device(e.to_string()))?;

        let deadline = Duration::from_secs_f64(frames as f64 / sample_rate as f64) + CAPTURE_GRACE;
        let start = Instant::now();

        loop {
            if let Some(message) = fault.lock().ok().and_then(|mut f| f.take()) {
                return Err(ReedError::Device(message));
            }

            let filled = collected.lock().map(|b| b.len()).unwrap_or(0);
            if filled >= target {
                break;
            }

            if start.elapsed() > deadline {
                return Err(ReedError::Device(format!(
                    "timed out after {:?} with {} of {} samples",
                    start.elapsed(),
                    filled,
                    target
                )));
            }

            thread::sleep(POLL_INTERVAL);
        }

        drop(stream);

        let mut samples = collected
            .lock()
            .map(|mut b| std::mem::take(&mut *b))
            .map_err(|_| ReedError::Device("capture buffer poisoned".to_string()))?;
        samples.truncate(target);
        Ok(samples)
    }
}

/// Names of every input device on the default host
pub fn list_input_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| ReedError::Device(e.to_string()))?;

    Ok(devices
        .map(|d| d.name().unwrap_or_else(|_| "Unknown Device".to_string()))
        .collect())
}

/// Fixed-duration capture with a guard delay in front of it
pub struct AudioCapture<S> {
    source: S,
    guard_delay: Duration,
}

impl<S: AudioSource> AudioCapture<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            guard_delay: DEFAULT_GUARD_DELAY,
        }
    }

    pub fn with_guard_delay(mut self, delay: Duration) -> Self {
        self.guard_delay = delay;
        self
    }

    pub fn guard_delay(&self) -> Duration {
        self.guard_delay
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Sleep for the guard delay, then block for `duration_secs` of audio
    pub fn capture(&mut self, duration_secs: f64, sample_rate: u32, channels: usize) -> Result<PcmBuffer> {
        if !(duration_secs > 0.0) || !duration_secs.is_finite() {
            return Err(ReedError::InvalidDuration(duration_secs));
        }

        let frames = (duration_secs * sample_rate as f64) as usize;
        if frames == 0 {
            return Err(ReedError::InvalidDuration(duration_secs));
        }

        if !self.guard_delay.is_zero() {
            thread::sleep(self.guard_delay);
        }

        info!("recording {:.2}s at {} Hz, {} channels", duration_secs, sample_rate, channels);
        let samples = self.source.record(frames, sample_rate, channels)?;

        if samples.len() != frames * channels {
            return Err(ReedError::Device(format!(
                "device returned {} samples, expected {}",
                samples.len(),
                frames * channels
            )));
        }

        debug!("captured {} frames", frames);
        PcmBuffer::from_interleaved(samples, sample_rate, channels)
    }
}
