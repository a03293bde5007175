// tests/test_utils/mod.rs
//
// Shared fixtures: a scripted audio source and throwaway data roots.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::f64::consts::PI;

use reedrev::{AudioSource, ReedError, ReedSession, Result, SessionConfig};
use tempfile::TempDir;

/// What the scripted device produces on the next capture
#[derive(Debug, Clone)]
pub enum Take {
    Silence,
    /// Sine on both channels
    Tone { freq: f64, amp: f64 },
    /// Silence except one sample on one channel
    Spike { channel: usize, value: f32 },
    /// Square wave of the given amplitude on channel 0 only
    Hum { amp: f32 },
    Fail(String),
}

#[derive(Debug, Default)]
pub struct ScriptedSource {
    takes: VecDeque<Take>,
    pub calls: usize,
}

impl ScriptedSource {
    pub fn new(takes: impl IntoIterator<Item = Take>) -> Self {
        Self {
            takes: takes.into_iter().collect(),
            calls: 0,
        }
    }
}

impl AudioSource for ScriptedSource {
    fn record(&mut self, frames: usize, sample_rate: u32, channels: usize) -> Result<Vec<f32>> {
        self.calls += 1;
        let take = self
            .takes
            .pop_front()
            .ok_or_else(|| ReedError::Device("script exhausted".to_string()))?;

        let mut samples = vec![0.0f32; frames * channels];
        match take {
            Take::Silence => {}
            Take::Tone { freq, amp } => {
                for i in 0..frames {
                    let v = (amp * (2.0 * PI * freq * i as f64 / sample_rate as f64).sin()) as f32;
                    for ch in 0..channels {
                        samples[i * channels + ch] = v;
                    }
                }
            }
            Take::Spike { channel, value } => {
                samples[(frames / 2) * channels + channel] = value;
            }
            Take::Hum { amp } => {
                for i in 0..frames {
                    samples[i * channels] = if i % 2 == 0 { amp } else { -amp };
                }
            }
            Take::Fail(message) => return Err(ReedError::Device(message)),
        }
        Ok(samples)
    }
}

/// Short captures, no guard delay, data under a fresh temp dir
pub fn test_config(root: &TempDir) -> SessionConfig {
    SessionConfig::default()
        .with_data_root(root.path())
        .with_duration(0.05)
        .with_guard_delay_ms(0)
}

pub fn session(root: &TempDir, id: &str, takes: impl IntoIterator<Item = Take>) -> ReedSession<ScriptedSource> {
    ReedSession::new(id, test_config(root), ScriptedSource::new(takes)).unwrap()
}
