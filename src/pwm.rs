//! Mark/space pulse codec: maps pulse symbols to durations and classifies measured ones
use std::{collections::HashMap, hash::Hash, time::Duration};

use thiserror::Error;

/// Whether a pulse is an ON (mark) or OFF (space) interval
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Level {
    Mark,
    Space,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Rule {
    pub level: Level,
    pub duration: Duration,
    pub tolerance: Duration,
    // Accept anything longer than `duration - tolerance`
    pub open_ended: bool,
}

impl Rule {
    pub fn mark(duration: Duration) -> Self {
        Self::new(Level::Mark, duration)
    }

    pub fn space(duration: Duration) -> Self {
        Self::new(Level::Space, duration)
    }

    fn new(level: Level, duration: Duration) -> Self {
        // Use a 20% tolerance by default
        Self {
            level,
            duration,
            tolerance: duration / 5,
            open_ended: false,
        }
    }

    /// Turns the rule into a lower bound, used for end-of-frame gaps whose length depends on the
    /// capture.
    pub fn open_ended(self) -> Self {
        Self {
            open_ended: true,
            ..self
        }
    }

    fn matches(&self, level: Level, duration: Duration) -> bool {
        if level != self.level {
            return false;
        }

        if duration >= self.duration {
            self.open_ended || duration - self.duration <= self.tolerance
        } else {
            self.duration - duration <= self.tolerance
        }
    }
}

#[derive(Error, Debug, Copy, Clone)]
pub enum CodecError<T: Copy + std::fmt::Debug> {
    #[error("invalid {0:?} length: {1:?}")]
    InvalidPulseLength(Level, Duration),

    #[error("a pulse was missing from the rule set: {0:?}")]
    InvalidPulse(T),

    #[error("the pulse list was missing an off pulse value")]
    MissingOffPulse,
}

pub struct Codec<TPulse> {
    rules: HashMap<TPulse, Rule>,
    sorted_rules: Vec<(TPulse, Rule)>,
}

impl<T: Copy + Eq + Hash + std::fmt::Debug> Codec<T> {
    pub fn new(rules: impl Iterator<Item = (T, Rule)>) -> Self {
        let mut sorted_rules: Vec<_> = rules.collect();
        sorted_rules.sort_by_key(|f| f.1.duration);

        let rules = sorted_rules.iter().copied().collect();

        Self {
            rules,
            sorted_rules,
        }
    }

    /// Classifies alternating on/off durations into (mark, space) symbol pairs.
    pub fn decode(
        &self,
        mut pulses: impl Iterator<Item = Duration>,
    ) -> Result<Vec<(T, T)>, CodecError<T>> {
        let mut ret = Vec::new();

        while let Some(on) = pulses.next() {
            let off = pulses.next().ok_or(CodecError::MissingOffPulse)?;
            ret.push((
                self.decode_pulse(Level::Mark, on)?,
                self.decode_pulse(Level::Space, off)?,
            ));
        }

        Ok(ret)
    }

    pub fn decode_pulse(&self, level: Level, pulse: Duration) -> Result<T, CodecError<T>> {
        self.sorted_rules
            .iter()
            .find(|(_, r)| r.matches(level, pulse))
            .map(|(p, _)| *p)
            .ok_or(CodecError::InvalidPulseLength(level, pulse))
    }

    pub fn encode(
        &self,
        pulses: impl Iterator<Item = (T, T)>,
    ) -> Result<Vec<(Duration, Duration)>, CodecError<T>> {
        let mut ret = Vec::new();

        for (on, off) in pulses {
            let on = self.encode_pulse(on).ok_or(CodecError::InvalidPulse(on))?;
            let off = self.encode_pulse(off).ok_or(CodecError::InvalidPulse(off))?;
            ret.push((on, off));
        }

        Ok(ret)
    }

    pub fn encode_pulse(&self, pulse: T) -> Option<Duration> {
        self.rules.get(&pulse).map(|r| r.duration)
    }
}
