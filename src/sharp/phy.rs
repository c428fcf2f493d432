use crate::pwm::{Codec, CodecError, Rule};

use std::time::Duration;
use thiserror::Error;

// AEHA timing units, marks and spaces are measured separately on the A486JB
const T_MARK: Duration = Duration::from_micros(488);
const T_SPACE: Duration = Duration::from_micros(464);
const T_TRAILER: Duration = Duration::from_micros(8000);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PulseType {
    LeaderMark,
    LeaderSpace,
    Mark,
    ZeroSpace,
    OneSpace,
    Trailer,
}

#[derive(Error, Debug, Copy, Clone)]
pub enum PhyError {
    #[error("PWM error: {0}")]
    PWMError(#[from] CodecError<PulseType>),
    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),
}

const LEADER: (PulseType, PulseType) = (PulseType::LeaderMark, PulseType::LeaderSpace);
const TRAILER: (PulseType, PulseType) = (PulseType::Mark, PulseType::Trailer);

/// AEHA (家製協) pulse distance framing: leader, one mark/space pair per bit, trailer.
pub struct Phy {
    codec: Codec<PulseType>,
}

impl Default for Phy {
    fn default() -> Self {
        Self::new()
    }
}

impl Phy {
    pub fn new() -> Self {
        let codec = Codec::new(
            [
                (PulseType::LeaderMark, Rule::mark(T_MARK * 8)),
                (PulseType::LeaderSpace, Rule::space(T_SPACE * 4)),
                (PulseType::Mark, Rule::mark(T_MARK)),
                (PulseType::ZeroSpace, Rule::space(T_SPACE)),
                (PulseType::OneSpace, Rule::space(T_SPACE * 3)),
                // Captures run until the end of the frame
                (PulseType::Trailer, Rule::space(T_TRAILER).open_ended()),
            ]
            .into_iter(),
        );

        Self { codec }
    }

    pub fn encode(&self, bytes: &[u8]) -> Result<Vec<(Duration, Duration)>, PhyError> {
        let pulses = self.encode_pulses(bytes);
        Ok(self.codec.encode(pulses.into_iter())?)
    }

    pub fn decode(&self, pulses: impl Iterator<Item = Duration>) -> Result<Vec<u8>, PhyError> {
        let pulses = self.codec.decode(pulses)?;
        Ok(Phy::decode_bits(pulses.into_iter())?)
    }

    /// Encode bytes into (mark, space) pairs, least significant bit of each byte first.
    pub fn encode_pulses(&self, bytes: &[u8]) -> Vec<(PulseType, PulseType)> {
        let mut pulses = Vec::with_capacity(bytes.len() * 8 + 2);

        pulses.push(LEADER);

        for &byte in bytes {
            for bit in 0..8 {
                pulses.push(match byte & (1 << bit) != 0 {
                    true => (PulseType::Mark, PulseType::OneSpace),
                    false => (PulseType::Mark, PulseType::ZeroSpace),
                });
            }
        }

        pulses.push(TRAILER);
        pulses
    }

    fn decode_bits(
        mut pulses: impl Iterator<Item = (PulseType, PulseType)>,
    ) -> Result<Vec<u8>, DecodeError> {
        use PulseType::*;

        let leader = pulses.next().ok_or(DecodeError::TruncatedMessage)?;
        if leader != LEADER {
            return Err(DecodeError::InvalidLeader(leader));
        }

        let mut ret = Vec::new();
        let mut byte: u8 = 0;
        let mut bit = 0;
        loop {
            let value = match pulses.next().ok_or(DecodeError::TruncatedMessage)? {
                (Mark, ZeroSpace) => 0,
                (Mark, OneSpace) => 1,
                (Mark, Trailer) => break,
                any => return Err(DecodeError::InvalidCombination(any)),
            };

            byte |= value << bit;
            bit += 1;
            if bit == 8 {
                ret.push(byte);
                byte = 0;
                bit = 0;
            }
        }

        if bit != 0 {
            return Err(DecodeError::PartialByte(bit));
        }

        Ok(ret)
    }
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid leader: {0:?}")]
    InvalidLeader((PulseType, PulseType)),
    #[error("invalid combination of pulses: {0:?}")]
    InvalidCombination((PulseType, PulseType)),
    #[error("message ended after {0} bits of a byte")]
    PartialByte(u8),
    #[error("truncated message")]
    TruncatedMessage,
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;

    const PAYLOAD: [u8; 13] = hex!("aa5acf1007110000088000f041");

    fn us(micros: u64) -> Duration {
        Duration::from_micros(micros)
    }

    #[test]
    fn test_encode_pulses() {
        let pulses = Phy::new().encode_pulses(&PAYLOAD);
        assert_eq!(pulses.len(), 1 + 13 * 8 + 1);
        assert_eq!(pulses[0], LEADER);
        assert_eq!(pulses[pulses.len() - 1], TRAILER);

        // 0xaa goes out as 0, 1, 0, 1...
        assert_eq!(pulses[1], (PulseType::Mark, PulseType::ZeroSpace));
        assert_eq!(pulses[2], (PulseType::Mark, PulseType::OneSpace));
        assert_eq!(pulses[8], (PulseType::Mark, PulseType::OneSpace));
    }

    #[test]
    fn test_encode() {
        let encoded = Phy::new().encode(&[0x01]).unwrap();
        assert_eq!(encoded.len(), 10);
        assert_eq!(encoded[0], (us(3904), us(1856)));
        assert_eq!(encoded[1], (us(488), us(1392)));
        assert_eq!(encoded[2], (us(488), us(464)));
        assert_eq!(encoded[9], (us(488), us(8000)));
    }

    #[test]
    fn test_decode() {
        let phy = Phy::new();
        let encoded = phy.encode(&PAYLOAD).unwrap();
        let durations = encoded.into_iter().flat_map(|(on, off)| [on, off]);
        assert_eq!(phy.decode(durations).unwrap(), PAYLOAD.to_vec());

        // Durations as measured on the 100us sample grid, with a long idle tail
        let durations = [
            3900, 1800, 500, 1300, 400, 500, 500, 400, 400, 500, 500, 500, 400, 500, 500, 400,
            500, 500, 500, 60000,
        ]
        .map(us);
        assert_eq!(phy.decode(durations.into_iter()).unwrap(), vec![0x01]);
    }

    #[test]
    fn test_decode_errors() {
        use PulseType::*;
        let phy = Phy::new();

        let durations = [488, 464, 488, 8000].map(us);
        assert!(matches!(
            phy.decode(durations.into_iter()),
            Err(PhyError::DecodeError(DecodeError::InvalidLeader((Mark, ZeroSpace))))
        ));

        let durations = [3904, 1856, 488, 464, 488, 8000].map(us);
        assert!(matches!(
            phy.decode(durations.into_iter()),
            Err(PhyError::DecodeError(DecodeError::PartialByte(1)))
        ));

        let durations = [3904, 1856, 488, 464].map(us);
        assert!(matches!(
            phy.decode(durations.into_iter()),
            Err(PhyError::DecodeError(DecodeError::TruncatedMessage))
        ));

        let durations = [3904, 1856, 3904, 1856].map(us);
        assert!(matches!(
            phy.decode(durations.into_iter()),
            Err(PhyError::DecodeError(DecodeError::InvalidCombination(LEADER)))
        ));
    }
}
