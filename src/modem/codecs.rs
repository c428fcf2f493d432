use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

use crate::kuro::Recording;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CodecType {
    Base64,
    Hex,
    Raw,
}

pub trait Codec {
    type Error;

    fn decode(&self, input: &str) -> Result<Recording, Self::Error>;
    fn encode(&self, recording: &Recording) -> Result<String, Self::Error>;
}

pub fn create_codec(ty: CodecType) -> Box<dyn Codec<Error = CodecError>> {
    match ty {
        CodecType::Base64 => Box::new(KuroBase64),
        CodecType::Hex => Box::new(KuroHex),
        CodecType::Raw => Box::new(Raw),
    }
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to decode hex string: {0}")]
    HexDecodeError(#[from] hex::FromHexError),
    #[error("failed to decode base64 string: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),
    #[error("failed to parse KURO-RS frame: {0}")]
    KuroParseError(#[from] crate::kuro::ParseError),
    #[error("failed to decode raw string")]
    RawParseError,
    #[error("empty input")]
    EmptyInput,
}

/// The frame as the controller's hex dump: 480 lowercase characters
pub struct KuroHex;
impl Codec for KuroHex {
    type Error = CodecError;

    fn decode(&self, input: &str) -> Result<Recording, Self::Error> {
        let decoded = hex::decode(input)?;
        if decoded.is_empty() {
            return Err(CodecError::EmptyInput);
        }

        Ok(Recording::from_bytes(Bytes::from(decoded))?)
    }

    fn encode(&self, recording: &Recording) -> Result<String, Self::Error> {
        Ok(hex::encode(recording.to_bytes()))
    }
}

pub struct KuroBase64;
impl Codec for KuroBase64 {
    type Error = CodecError;

    fn decode(&self, input: &str) -> Result<Recording, Self::Error> {
        let decoded = base64::decode(input)?;
        if decoded.is_empty() {
            return Err(CodecError::EmptyInput);
        }

        Ok(Recording::from_bytes(Bytes::from(decoded))?)
    }

    fn encode(&self, recording: &Recording) -> Result<String, Self::Error> {
        Ok(base64::encode(recording.to_bytes()))
    }
}

/// Signed microsecond durations, `+` for marks and `-` for spaces
pub struct Raw;
impl Codec for Raw {
    type Error = CodecError;

    fn decode(&self, input: &str) -> Result<Recording, Self::Error> {
        // Support IrTransmogrifier's format which looks like `Freq=38400Hz[.....][...]`
        let input = if input.starts_with("Freq=") {
            let mut parts = input.splitn(2, '[');
            parts.next();
            let untrimmed = parts.next().ok_or(CodecError::RawParseError)?;
            untrimmed.split(']').next().ok_or(CodecError::RawParseError)?
        } else {
            input
        };

        if input.trim().is_empty() {
            return Err(CodecError::EmptyInput);
        }

        let msg = irp::Message::parse(input).or(Err(CodecError::RawParseError))?;
        let pulses = msg.raw.chunks(2).map(|pair| {
            let on = Duration::from_micros(pair[0] as _);
            let off = pair.get(1).map_or(Duration::ZERO, |&t| Duration::from_micros(t as _));
            (on, off)
        });

        Ok(Recording::from_pulses(pulses))
    }

    fn encode(&self, recording: &Recording) -> Result<String, Self::Error> {
        Ok(recording.to_raw_format())
    }
}
