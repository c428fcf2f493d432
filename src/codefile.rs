use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    modem::{create_codec, CodecType},
    sharp::{encode_state, ControlState, Mode, Volume},
};

/*
{
   "manufacturer":"Sharp",
   "supportedModels":[
      "A486JB"
   ],
   "supportedController":"KURO-RS",
   "commandsEncoding":"Hex",
   "minTemperature":18.0,
   "maxTemperature":32.0,
   "precision":1,
   "operationModes":[
      "auto",
      "heat",
      "cool",
      "dry"
   ],
   "fanModes":[
      "auto",
      "low",
      "mid",
      "high"
   ],
   */

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CodeFile {
    pub manufacturer: String,
    pub supported_models: Vec<String>,
    pub supported_controller: String,
    pub commands_encoding: String,
    pub min_temperature: f32,
    pub max_temperature: f32,
    pub precision: u8,
    pub operation_modes: Vec<String>,
    pub fan_modes: Vec<String>,
    pub commands: serde_json::Value,
}

/// Generates a code file with the frame of every state the remote can send
pub fn gen_code_file() -> anyhow::Result<CodeFile> {
    let commands: serde_json::Value = {
        // mode -> fan -> temperature, like SmartIR climate files
        let mut all_commands = serde_json::Map::new();

        for mode in Mode::iter() {
            let mut mode_map = serde_json::Map::new();

            for volume in Volume::iter() {
                let mut fan_map = serde_json::Map::new();

                for temperature in ControlState::MIN_TEMPERATURE..=ControlState::MAX_TEMPERATURE {
                    let state = ControlState {
                        power: true,
                        temperature,
                        mode,
                        volume,
                        full_power: None,
                    };

                    fan_map.insert(format!("{}", temperature), encode(&state)?.into());
                }

                mode_map.insert(volume.as_ref().to_lowercase(), fan_map.into());
            }

            all_commands.insert(mode.as_ref().to_lowercase(), mode_map.into());
        }

        // The unit ignores everything but the command when switching off
        let off_state = ControlState {
            power: false,
            temperature: ControlState::MIN_TEMPERATURE,
            mode: Mode::Auto,
            volume: Volume::Auto,
            full_power: None,
        };
        all_commands.insert("off".into(), encode(&off_state)?.into());

        all_commands.into()
    };

    Ok(CodeFile {
        manufacturer: "Sharp".into(),
        supported_models: vec!["A486JB".into()],
        supported_controller: "KURO-RS".into(),
        commands_encoding: "Hex".into(),
        min_temperature: ControlState::MIN_TEMPERATURE.into(),
        max_temperature: ControlState::MAX_TEMPERATURE.into(),
        precision: 1,
        operation_modes: Mode::iter().map(|m| m.as_ref().to_lowercase()).collect(),
        fan_modes: Volume::iter().map(|v| v.as_ref().to_lowercase()).collect(),
        commands,
    })
}

fn encode(state: &ControlState) -> anyhow::Result<String> {
    let recording = encode_state(state)?;
    Ok(create_codec(CodecType::Hex).encode(&recording)?)
}
