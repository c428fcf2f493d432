use std::io::{self, BufRead, Write};

use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand};
use log::info;

use sharp_ir::{
    codefile::gen_code_file,
    modem::{create_codec, CodecType},
    sharp::{decode_recording, encode_state, ControlState, ValidationError},
};

/// Generates IR frames for the KURO-RS blaster to drive a Sharp A486JB air conditioner
#[derive(Parser)]
#[command(name = "sharp-ir", version)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    encode: EncodeArgs,
}

#[derive(Args)]
struct EncodeArgs {
    /// power: 0:off 1:on
    #[arg(short = 'p', required = true)]
    power: Option<u8>,

    /// temp: 18 to 32
    #[arg(short = 't', required = true)]
    temperature: Option<u8>,

    /// mode: 0:auto 1:heat 2:cool 3:dry
    #[arg(short = 'm', required = true)]
    mode: Option<u8>,

    /// volume: 0:auto 1 2 3
    #[arg(short = 'v', required = true)]
    volume: Option<u8>,

    /// full power: 0:off 1:on, replaces the power command when given
    #[arg(short = 'f')]
    full_power: Option<u8>,

    /// Output format of the frame
    #[arg(long, value_enum, default_value_t = CodecType::Hex)]
    format: CodecType,
}

impl EncodeArgs {
    fn control_state(&self) -> Result<ControlState, ValidationError> {
        ControlState::from_raw(
            self.power.ok_or(ValidationError::Missing("-p"))?,
            self.temperature.ok_or(ValidationError::Missing("-t"))?,
            self.mode.ok_or(ValidationError::Missing("-m"))?,
            self.volume.ok_or(ValidationError::Missing("-v"))?,
            self.full_power,
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Read frames from stdin, one per line, and print the state they carry
    Decode {
        #[arg(long, value_enum, default_value_t = CodecType::Hex)]
        format: CodecType,
    },

    /// Print a JSON code file with the frame of every state
    Codes,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Decode { format }) => decode(format),
        Some(Commands::Codes) => {
            println!("{}", serde_json::to_string_pretty(&gen_code_file()?)?);
            Ok(())
        }
        None => encode(&cli.encode),
    }
}

fn encode(args: &EncodeArgs) -> anyhow::Result<()> {
    // Reject before anything gets built, with the usage on stderr
    let state = match args.control_state() {
        Ok(state) => state,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };
    info!(
        "power = {}, temp = {}, mode = {:?}, volume = {:?}, full power = {:?}",
        state.power, state.temperature, state.mode, state.volume, state.full_power
    );

    let recording = encode_state(&state)?;
    let encoded = create_codec(args.format).encode(&recording)?;

    let mut stdout = io::stdout();
    write!(stdout, "{}", encoded)?;
    stdout.flush()?;

    Ok(())
}

fn decode(format: CodecType) -> anyhow::Result<()> {
    let codec = create_codec(format);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let recording = codec.decode(line)?;
        let state = decode_recording(&recording)?;
        println!("{:?}", state);
        io::stdout().flush()?;
    }

    Ok(())
}
