pub mod phy;
pub use phy::*;
pub mod packet;

use log::debug;
use strum::{AsRefStr, EnumIter, FromRepr};
use thiserror::Error;

use crate::kuro::Recording;
use packet::{EncodeError, Packet};

// The complete state sent to the air conditioner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    // Power state, not transmitted when full power is given
    pub power: bool,

    // Set temperature in Celsius
    pub temperature: u8,

    pub mode: Mode,

    // Fan volume
    pub volume: Volume,

    // Full power (boost) on/off, None leaves it untouched
    pub full_power: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr, FromRepr)]
#[repr(u8)]
pub enum Mode {
    Auto = 0,
    Heat = 1,
    Cool = 2,
    Dry = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr, FromRepr)]
#[repr(u8)]
pub enum Volume {
    Auto = 0,
    Low = 1,
    Mid = 2,
    High = 3,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required parameter: {0}")]
    Missing(&'static str),

    #[error("power must be 0 (off) or 1 (on), got {0}")]
    Power(u8),

    #[error("temperature must be between 18 and 32, got {0}")]
    Temperature(u8),

    #[error("mode must be 0 (auto), 1 (heat), 2 (cool) or 3 (dry), got {0}")]
    Mode(u8),

    #[error("volume must be between 0 (auto) and 3, got {0}")]
    Volume(u8),

    #[error("full power must be 0 (off) or 1 (on), got {0}")]
    FullPower(u8),
}

impl ControlState {
    pub const MIN_TEMPERATURE: u8 = 18;
    pub const MAX_TEMPERATURE: u8 = 32;

    /// Builds a state from the numeric codes used on the command line.
    pub fn from_raw(
        power: u8,
        temperature: u8,
        mode: u8,
        volume: u8,
        full_power: Option<u8>,
    ) -> Result<Self, ValidationError> {
        let power = parse_flag(power).ok_or(ValidationError::Power(power))?;

        if !(Self::MIN_TEMPERATURE..=Self::MAX_TEMPERATURE).contains(&temperature) {
            return Err(ValidationError::Temperature(temperature));
        }

        let full_power = match full_power {
            Some(v) => Some(parse_flag(v).ok_or(ValidationError::FullPower(v))?),
            None => None,
        };

        Ok(Self {
            power,
            temperature,
            mode: Mode::from_repr(mode).ok_or(ValidationError::Mode(mode))?,
            volume: Volume::from_repr(volume).ok_or(ValidationError::Volume(volume))?,
            full_power,
        })
    }
}

fn parse_flag(v: u8) -> Option<bool> {
    match v {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("Phy error: {0}")]
    Phy(#[from] PhyError),
}

/// Runs a state through the whole pipeline, up to the frame replayed by the controller.
pub fn encode_state(state: &ControlState) -> Result<Recording, Error> {
    let packet = Packet::from_control_state(state)?;
    debug!("payload: {}", hex::encode(packet.0));
    debug!("payload bits: {}", bit_string(&packet.0));

    let pulses = Phy::new().encode(&packet.0)?;
    let recording = Recording::from_pulses(pulses);
    debug!(
        "samples: {}",
        recording
            .samples()
            .iter()
            .map(|&s| if s { '1' } else { '0' })
            .collect::<String>()
    );

    Ok(recording)
}

pub fn decode_recording(recording: &Recording) -> Result<ControlState, Error> {
    let bytes = Phy::new().decode(recording.to_pulses().into_iter())?;
    debug!("payload: {}", hex::encode(&bytes));

    let packet = Packet::from_bytes(&bytes)?;
    Ok(ControlState::try_from(&packet)?)
}

// Bits in transmission order, least significant bit of each byte first
fn bit_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .flat_map(|b| (0..8).map(move |i| if b & (1 << i) != 0 { '1' } else { '0' }))
        .collect()
}
