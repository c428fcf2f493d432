use std::ops::RangeInclusive;

use super::{ControlState, Mode, Volume};
use bitfield::bitfield;
use thiserror::Error;

pub const PAYLOAD_LENGTH: usize = 13;

pub type Payload = [u8; PAYLOAD_LENGTH];

/// Nibbles folded into the checksum: byte 2 high nibble up to byte 12 low nibble. Nibble `n` is
/// the low half of byte `n / 2` when `n` is even.
pub const CHECKSUM_NIBBLES: RangeInclusive<usize> = 5..=24;

// Commands
const CMD_POWER_ON: u8 = 1;
const CMD_POWER_OFF: u8 = 2;
const CMD_FULL_POWER_ON: u8 = 6;
const CMD_FULL_POWER_OFF: u8 = 7;

#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Temperature out of range. Must be between 18C and 32C")]
    TemperatureOutOfRange(u8),

    #[error("Invalid payload length: {0}")]
    InvalidLength(usize),

    #[error("Mode value wasn't recognized")]
    ModeOutOfRange(u8),

    #[error("Volume value wasn't recognized")]
    VolumeOutOfRange(u8),

    #[error("Command value wasn't recognized: {0}")]
    UnknownCommand(u8),

    #[error("Full power flag doesn't match the command")]
    FullPowerFlagMismatch,

    #[error("Unexpected fixed value in packet.")]
    UnexpectedFixedValues,
    #[error("Checksum mismatch")]
    ChecksumMismatch,
}

// Layout of the A486JB remote, bits numbered from the least significant bit of the first byte
bitfield! {
    pub struct Packet([u8]);
    impl Debug;
    u8;
    pub maker_code_low, set_maker_code_low : 7, 0;
    pub maker_code_high, set_maker_code_high : 15, 8;
    pub maker_parity, set_maker_parity : 19, 16;
    pub system_code, set_system_code : 23, 20;
    pub product_code, set_product_code : 31, 24;
    pub temperature_raw, set_temperature_raw : 35, 32;
    filler1, set_filler1 : 43, 36;
    pub command, set_command : 47, 44;
    pub mode_raw, set_mode_raw : 49, 48;
    filler2, set_filler2 : 51, 50;
    pub volume_set, set_volume_set : 52;
    pub volume_raw, set_volume_raw : 54, 53;
    filler3, set_filler3 : 55;
    pub timer_hour, set_timer_hour : 59, 56;
    filler4, set_filler4 : 60;
    pub timer_1h_off, set_timer_1h_off : 61;
    pub timer_mode, set_timer_mode : 63, 62;
    pub direction, set_direction : 66, 64;
    u16, filler5, set_filler5 : 79, 67;
    pub full_power, set_full_power : 80;
    pub timer_30min, set_timer_30min : 84, 81;
    pub eco, set_eco : 85;
    u16, filler6, set_filler6 : 95, 86;
    filler7, set_filler7 : 99, 96;
    pub checksum, set_checksum : 103, 100;
}

impl<T: Clone> Clone for Packet<T> {
    fn clone(&self) -> Self {
        Packet(self.0.clone())
    }
}

impl<T: Copy> Copy for Packet<T> {}

impl Default for Packet<Payload> {
    fn default() -> Self {
        Self::new()
    }
}

impl Packet<Payload> {
    const MAKER_CODE_LOW: u8 = 0xaa;
    const MAKER_CODE_HIGH: u8 = 0x5a;
    const MAKER_PARITY: u8 = 0xf;
    const SYSTEM_CODE: u8 = 0xc;
    const PRODUCT_CODE: u8 = 0x10;

    // Not decoded, the unit checks them
    const FILLER1: u8 = 0b0001_0000;
    const FILLER5: u16 = 0b1_0000_0000_0001;
    const FILLER6: u16 = 0b11_1100_0000;
    const FILLER7: u8 = 0b0001;

    const TEMP_OFFSET: u8 = 17;

    pub fn new() -> Self {
        let mut p = Packet([0; PAYLOAD_LENGTH]);
        p.set_maker_code_low(Self::MAKER_CODE_LOW);
        p.set_maker_code_high(Self::MAKER_CODE_HIGH);
        p.set_maker_parity(Self::MAKER_PARITY);
        p.set_system_code(Self::SYSTEM_CODE);
        p.set_product_code(Self::PRODUCT_CODE);
        p.set_filler1(Self::FILLER1);
        p.set_filler2(0);
        p.set_filler3(false);
        p.set_filler4(false);
        p.set_filler5(Self::FILLER5);
        p.set_filler6(Self::FILLER6);
        p.set_filler7(Self::FILLER7);
        p
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncodeError> {
        let payload =
            <Payload>::try_from(bytes).map_err(|_| EncodeError::InvalidLength(bytes.len()))?;
        Ok(Packet(payload))
    }

    pub fn from_control_state(state: &ControlState) -> Result<Self, EncodeError> {
        let mut packet = Packet::new();
        packet.set_temperature(state.temperature)?;
        packet.set_command(Self::command_for(state.power, state.full_power));
        packet.set_mode(state.mode);
        packet.set_volume(state.volume);
        // Presence, not value: the on/off distinction lives in the command
        packet.set_full_power(state.full_power.is_some());
        packet.apply_checksum();
        Ok(packet)
    }

    fn command_for(power: bool, full_power: Option<bool>) -> u8 {
        match (power, full_power) {
            (true, None) => CMD_POWER_ON,
            (false, None) => CMD_POWER_OFF,
            (_, Some(true)) => CMD_FULL_POWER_ON,
            (_, Some(false)) => CMD_FULL_POWER_OFF,
        }
    }

    pub fn temperature(&self) -> u8 {
        self.temperature_raw() + Self::TEMP_OFFSET
    }

    pub fn set_temperature(&mut self, temp: u8) -> Result<(), EncodeError> {
        if !(ControlState::MIN_TEMPERATURE..=ControlState::MAX_TEMPERATURE).contains(&temp) {
            return Err(EncodeError::TemperatureOutOfRange(temp));
        }

        self.set_temperature_raw(temp - Self::TEMP_OFFSET);
        Ok(())
    }

    pub fn mode(&self) -> Result<Mode, EncodeError> {
        Mode::from_repr(self.mode_raw()).ok_or(EncodeError::ModeOutOfRange(self.mode_raw()))
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.set_mode_raw(mode as u8)
    }

    pub fn volume(&self) -> Result<Volume, EncodeError> {
        if !self.volume_set() {
            return Ok(Volume::Auto);
        }

        match Volume::from_repr(self.volume_raw()) {
            Some(Volume::Auto) | None => Err(EncodeError::VolumeOutOfRange(self.volume_raw())),
            Some(volume) => Ok(volume),
        }
    }

    pub fn set_volume(&mut self, volume: Volume) {
        self.set_volume_set(volume != Volume::Auto);
        self.set_volume_raw(match volume {
            Volume::Low => 1,
            other => other as u8,
        })
    }

    fn has_fixed_values(&self) -> bool {
        self.maker_code_low() == Self::MAKER_CODE_LOW
            && self.maker_code_high() == Self::MAKER_CODE_HIGH
            && self.maker_parity() == Self::MAKER_PARITY
            && self.system_code() == Self::SYSTEM_CODE
            && self.product_code() == Self::PRODUCT_CODE
            && self.filler1() == Self::FILLER1
            && self.filler2() == 0
            && !self.filler3()
            && !self.filler4()
            && self.filler5() == Self::FILLER5
            && self.filler6() == Self::FILLER6
            && self.filler7() == Self::FILLER7
    }

    pub(crate) fn compute_checksum(&self) -> u8 {
        let mut packet = *self;
        packet.set_checksum(0);

        CHECKSUM_NIBBLES.fold(0, |sum, n| sum ^ nibble(&packet.0, n))
    }

    fn apply_checksum(&mut self) {
        self.set_checksum(self.compute_checksum());
    }

    pub fn validate_checksum(&self) -> bool {
        self.compute_checksum() == self.checksum()
    }
}

impl TryFrom<&ControlState> for Packet<Payload> {
    type Error = EncodeError;

    fn try_from(state: &ControlState) -> Result<Self, EncodeError> {
        Packet::from_control_state(state)
    }
}

impl TryFrom<&Packet<Payload>> for ControlState {
    type Error = EncodeError;

    fn try_from(packet: &Packet<Payload>) -> Result<Self, EncodeError> {
        if !packet.has_fixed_values() {
            return Err(EncodeError::UnexpectedFixedValues);
        }

        if !packet.validate_checksum() {
            return Err(EncodeError::ChecksumMismatch);
        }

        let (power, full_power) = match packet.command() {
            CMD_POWER_ON => (true, None),
            CMD_POWER_OFF => (false, None),
            CMD_FULL_POWER_ON => (true, Some(true)),
            CMD_FULL_POWER_OFF => (false, Some(false)),
            cmd => return Err(EncodeError::UnknownCommand(cmd)),
        };

        if packet.full_power() != full_power.is_some() {
            return Err(EncodeError::FullPowerFlagMismatch);
        }

        let temperature = packet.temperature();
        if temperature < ControlState::MIN_TEMPERATURE {
            return Err(EncodeError::TemperatureOutOfRange(temperature));
        }

        Ok(ControlState {
            power,
            temperature,
            mode: packet.mode()?,
            volume: packet.volume()?,
            full_power,
        })
    }
}

fn nibble(bytes: &[u8], n: usize) -> u8 {
    let byte = bytes[n / 2];
    if n % 2 == 0 {
        byte & 0x0f
    } else {
        byte >> 4
    }
}
