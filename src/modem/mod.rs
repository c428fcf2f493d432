/*

Text formats for controller frames
----------------------------------

hex/base64 <> 240 byte frame <> Recording
raw (+on -off microseconds) <> pulses <> Recording

*/

pub mod codecs;
pub use codecs::{create_codec, Codec, CodecError, CodecType};
