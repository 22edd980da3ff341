use std::io::{ErrorKind, Read};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// One block of mono samples, read once and never modified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioFrame(Vec<i16>);

impl AudioFrame {
    pub fn new(samples: Vec<i16>) -> Self {
        Self(samples)
    }

    pub fn samples(&self) -> &[i16] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<i16>> for AudioFrame {
    fn from(samples: Vec<i16>) -> Self {
        Self(samples)
    }
}

pub trait FrameSource {
    /// Blocks until a frame is available. `Ok(None)` means the stream has ended.
    fn read_frame(&mut self) -> Result<Option<AudioFrame>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn read_frame(&mut self) -> Result<Option<AudioFrame>> {
        (**self).read_frame()
    }
}

/// Signed 16 bit little endian mono PCM, e.g. the output of `arecord -f S16_LE -c1`.
pub struct PcmSource<R> {
    reader: R,
    buffer: Vec<u8>,
    ended: bool,
}

impl<R: Read> PcmSource<R> {
    pub fn new(reader: R, frame_size: usize) -> Self {
        Self {
            reader,
            buffer: vec![0; frame_size * 2],
            ended: false,
        }
    }

    fn fill(&mut self) -> Result<usize> {
        let mut filled = 0;
        while filled < self.buffer.len() {
            match self.reader.read(&mut self.buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("Failed to read PCM input"),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> FrameSource for PcmSource<R> {
    fn read_frame(&mut self) -> Result<Option<AudioFrame>> {
        if self.ended {
            return Ok(None);
        }

        let filled = self.fill()?;
        if filled == 0 {
            self.ended = true;
            return Ok(None);
        }
        if filled < self.buffer.len() {
            log::warn!(
                "[source] short read: {filled} of {} bytes, padding with silence",
                self.buffer.len()
            );
            self.buffer[filled..].fill(0);
            self.ended = true;
        }

        let samples: Vec<i16> = self
            .buffer
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Some(samples.into()))
    }
}

/// A mix of sine tones with continuous phase across frames.
pub struct ToneSource {
    sample_rate: u32,
    frame_size: usize,
    tones_hz: Vec<f32>,
    amplitude: f32,
    position: u64,
    frames_left: Option<u64>,
    realtime: bool,
    next_deadline: Option<Instant>,
}

impl ToneSource {
    pub fn new(sample_rate: u32, frame_size: usize, tones_hz: Vec<f32>, amplitude: f32) -> Self {
        Self {
            sample_rate,
            frame_size,
            tones_hz,
            amplitude: amplitude.clamp(0.0, i16::MAX as f32),
            position: 0,
            frames_left: None,
            realtime: false,
            next_deadline: None,
        }
    }

    /// Ends the stream after `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frames_left = Some(frames);
        self
    }

    /// Sleeps so frames arrive no faster than a live capture would deliver them.
    pub fn paced(mut self) -> Self {
        self.realtime = true;
        self
    }

    fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_size as f64 / self.sample_rate as f64)
    }

    fn pace(&mut self) {
        let duration = self.frame_duration();
        let deadline = self.next_deadline.unwrap_or_else(Instant::now) + duration;
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
        self.next_deadline = Some(deadline.max(now));
    }
}

impl FrameSource for ToneSource {
    fn read_frame(&mut self) -> Result<Option<AudioFrame>> {
        if let Some(left) = self.frames_left.as_mut() {
            if *left == 0 {
                return Ok(None);
            }
            *left -= 1;
        }
        if self.realtime {
            self.pace();
        }

        let voices = self.tones_hz.len().max(1) as f32;
        let rate = self.sample_rate as f64;
        let samples: Vec<i16> = (0..self.frame_size as u64)
            .map(|i| {
                let t = (self.position + i) as f64 / rate;
                let mix: f64 = self
                    .tones_hz
                    .iter()
                    .map(|&f| (2.0 * std::f64::consts::PI * f as f64 * t).sin())
                    .sum();
                (self.amplitude * mix as f32 / voices).round() as i16
            })
            .collect();
        self.position += self.frame_size as u64;

        Ok(Some(samples.into()))
    }
}
