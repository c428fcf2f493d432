//! Implements encoding/decoding of frames replayed by a KURO-RS IR blaster.
//!
//! The controller has no notion of pulses: a frame is a fixed 240 byte bitmap of the IR output
//! sampled every 100us, earliest sample in the least significant bit of each byte.
use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::debug;
use thiserror::Error;

pub const SAMPLE_PERIOD: Duration = Duration::from_micros(100);

/// Number of samples in a frame (192ms of signal)
pub const SAMPLE_CAPACITY: usize = 1920;

/// Length of a frame on the wire
pub const FRAME_LENGTH: usize = SAMPLE_CAPACITY / 8;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid frame length: {0}, expected {FRAME_LENGTH}")]
    InvalidLength(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recording {
    samples: [bool; SAMPLE_CAPACITY],
    // Samples written so far, never decreases
    len: usize,
    truncated: bool,
}

impl Default for Recording {
    fn default() -> Self {
        Self::new()
    }
}

impl Recording {
    pub fn new() -> Self {
        Self {
            samples: [false; SAMPLE_CAPACITY],
            len: 0,
            truncated: false,
        }
    }

    /// Resamples on/off pulse pairs onto the 100us grid.
    ///
    /// Sample boundaries are the cumulative elapsed time divided by the sample period, rounded
    /// down. Whatever falls past the end of the frame is dropped; the remaining pulses are still
    /// walked so the truncation is reported.
    pub fn from_pulses(pulses: impl IntoIterator<Item = (Duration, Duration)>) -> Self {
        let mut recording = Self::new();
        let mut elapsed = Duration::ZERO;

        for (on, off) in pulses {
            elapsed += on;
            recording.fill_until(true, elapsed);
            elapsed += off;
            recording.fill_until(false, elapsed);
        }

        if recording.truncated {
            debug!(
                "signal of {}us truncated to {} samples",
                elapsed.as_micros(),
                SAMPLE_CAPACITY
            );
        }

        recording
    }

    fn fill_until(&mut self, level: bool, elapsed: Duration) {
        let end = usize::try_from(elapsed.as_micros() / SAMPLE_PERIOD.as_micros())
            .unwrap_or(usize::MAX);

        if end > SAMPLE_CAPACITY {
            self.truncated = true;
        }

        let end = end.min(SAMPLE_CAPACITY);
        if end > self.len {
            self.samples[self.len..end].fill(level);
            self.len = end;
        }
    }

    pub fn samples(&self) -> &[bool] {
        &self.samples
    }

    /// Number of samples written by the pulses, the rest of the frame is idle
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether part of the signal didn't fit in the frame
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// On-off pulse durations, measured from run lengths on the sample grid.
    ///
    /// The first duration is always a mark (zero long if the frame starts idle), the last one
    /// includes the idle tail of the frame.
    pub fn to_pulses(&self) -> Vec<Duration> {
        let period = SAMPLE_PERIOD.as_micros() as u64;
        let mut pulses = Vec::new();
        let mut level = true;
        let mut run: u64 = 0;

        for &sample in self.samples.iter() {
            if sample != level {
                pulses.push(Duration::from_micros(run * period));
                level = sample;
                run = 0;
            }
            run += 1;
        }
        pulses.push(Duration::from_micros(run * period));

        pulses
    }

    pub fn to_raw_format(&self) -> String {
        self.to_pulses()
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let sign = if i % 2 == 0 { '+' } else { '-' };
                format!("{}{}", sign, p.as_micros())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut b = BytesMut::with_capacity(FRAME_LENGTH);
        for chunk in self.samples.chunks(8) {
            let byte = chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (bit, &sample)| acc | (u8::from(sample) << bit));
            b.put_u8(byte);
        }
        b.freeze()
    }

    pub fn from_bytes(buf: Bytes) -> Result<Self, ParseError> {
        let mut buf = buf;

        if buf.len() != FRAME_LENGTH {
            return Err(ParseError::InvalidLength(buf.len()));
        }

        let mut recording = Self::new();
        for chunk in recording.samples.chunks_mut(8) {
            let byte = buf.get_u8();
            for (bit, sample) in chunk.iter_mut().enumerate() {
                *sample = byte & (1 << bit) != 0;
            }
        }
        recording.len = SAMPLE_CAPACITY;

        Ok(recording)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn us(micros: u64) -> Duration {
        Duration::from_micros(micros)
    }

    #[test]
    fn test_resample_floors_cumulative_time() {
        // 488us on ends inside sample 4, 952us total ends inside sample 9
        let recording = Recording::from_pulses([(us(488), us(464))]);
        assert_eq!(recording.len(), 9);
        assert_eq!(
            &recording.samples()[..10],
            &[true, true, true, true, false, false, false, false, false, false]
        );

        // The second mark starts where the first space was cut, not where it really ended
        let recording = Recording::from_pulses([(us(488), us(464)), (us(488), us(464))]);
        assert_eq!(recording.len(), 19);
        assert_eq!(
            recording.samples()[9..14],
            [true, true, true, true, true]
        );
        assert!(!recording.samples()[14]);
    }

    #[test]
    fn test_resample_short_pulses_never_rewrite() {
        // A 50us pulse doesn't reach a grid boundary, the next one picks up from the last sample
        let recording = Recording::from_pulses([(us(50), us(100)), (us(100), us(50))]);
        assert_eq!(recording.len(), 3);
        assert_eq!(&recording.samples()[..4], &[false, true, false, false]);
        assert!(!recording.is_truncated());
    }

    #[test]
    fn test_resample_truncates() {
        let pulses = (0..100).map(|_| (us(1000), us(1000)));
        let recording = Recording::from_pulses(pulses);
        assert_eq!(recording.len(), SAMPLE_CAPACITY);
        assert!(recording.is_truncated());

        // Exactly 96 periods of 20 samples fit, the rest is dropped
        assert!(!recording.samples()[SAMPLE_CAPACITY - 1]);
        assert!(recording.samples()[SAMPLE_CAPACITY - 11]);
        assert_eq!(recording.to_bytes().len(), FRAME_LENGTH);
    }

    #[test]
    fn test_to_bytes_lsb_first() {
        let recording = Recording::from_pulses([(us(300), us(500)), (us(100), us(0))]);
        let bytes = recording.to_bytes();
        assert_eq!(bytes.len(), FRAME_LENGTH);
        assert_eq!(bytes[0], 0b0000_0111);
        assert_eq!(bytes[1], 0b0000_0001);
        assert!(bytes[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_bytes() {
        let mut frame = vec![0u8; FRAME_LENGTH];
        frame[0] = 0xff;
        frame[1] = 0x01;

        let recording = Recording::from_bytes(Bytes::from(frame.clone())).unwrap();
        assert_eq!(recording.to_bytes(), Bytes::from(frame));
        assert_eq!(
            recording.to_pulses(),
            vec![us(900), us((SAMPLE_CAPACITY as u64 - 9) * 100)]
        );
        assert_eq!(recording.to_raw_format(), "+900 -191100");

        assert_eq!(
            Recording::from_bytes(Bytes::from_static(&[0xff; 13])),
            Err(ParseError::InvalidLength(13))
        );
    }

    #[test]
    fn test_to_pulses_idle_start() {
        let mut frame = vec![0u8; FRAME_LENGTH];
        frame[1] = 0x01;

        let recording = Recording::from_bytes(Bytes::from(frame)).unwrap();
        let pulses = recording.to_pulses();
        assert_eq!(pulses[..3], [us(0), us(800), us(100)]);
    }
}
