use clap::{Parser, Subcommand};
use sheet2midi::pitch::Clef;
use sheet2midi::{validate_input, Config, SheetToMidi};
use std::path::PathBuf;

/// Sheet-Music-to-MIDI Conversion System
#[derive(Parser)]
#[command(name = "sheet2midi")]
#[command(about = "Convert sheet music images to MIDI using optical music recognition")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single sheet music image to a MIDI file
    Convert {
        /// Input sheet music image (PNG/JPEG/BMP/TIFF)
        input: PathBuf,

        /// Output MIDI file path
        output: PathBuf,

        /// Custom configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Tempo in BPM
        #[arg(long)]
        tempo: Option<u32>,

        /// Musical clef (treble or bass)
        #[arg(long)]
        clef: Option<Clef>,

        /// Save intermediate processing images for debugging
        #[arg(long)]
        save_intermediate: bool,

        /// Quiet output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Convert all images in a directory
    Batch {
        /// Input directory containing sheet music images
        input_dir: PathBuf,

        /// Output directory for MIDI files
        #[arg(short, long, default_value = "./output")]
        output_dir: PathBuf,

        /// Custom configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Tempo in BPM
        #[arg(long)]
        tempo: Option<u32>,

        /// Musical clef (treble or bass)
        #[arg(long)]
        clef: Option<Clef>,
    },
    /// Combine multiple page images into one MIDI file
    Multipage {
        /// Page images in playing order (at least 2)
        #[arg(num_args = 2..)]
        inputs: Vec<PathBuf>,

        /// Output MIDI file path
        #[arg(short, long)]
        output: PathBuf,

        /// Custom configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Tempo in BPM
        #[arg(long)]
        tempo: Option<u32>,

        /// Musical clef (treble or bass)
        #[arg(long)]
        clef: Option<Clef>,
    },
    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config: PathBuf,
    },
    /// Show default configuration
    ShowConfig,
}

fn load_config_with_overrides(
    config_path: Option<PathBuf>,
    tempo: Option<u32>,
    clef: Option<Clef>,
) -> anyhow::Result<Config> {
    let mut config = if let Some(path) = config_path {
        sheet2midi::config::load_config(path)?
    } else {
        Config::default()
    };

    if let Some(tempo) = tempo {
        config.export.tempo_bpm = tempo;
    }
    if let Some(clef) = clef {
        config.pitch.clef = clef;
    }

    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            tempo,
            clef,
            save_intermediate,
            quiet,
        } => {
            let mut config = load_config_with_overrides(config, tempo, clef)?;
            config.qa.save_intermediate = save_intermediate;

            validate_input(&input, &config)?;

            let processor = SheetToMidi::new(config);

            if !quiet {
                println!("Processing {}...", input.display());
            }

            let summary = processor.convert(&input, &output)?;

            if !quiet {
                println!("Results saved to {}", summary.output.display());
            }
        }
        Commands::Batch {
            input_dir,
            output_dir,
            config,
            tempo,
            clef,
        } => {
            let config = load_config_with_overrides(config, tempo, clef)?;
            sheet2midi::config::validate_config(&config)?;

            let processor = SheetToMidi::new(config);
            let outputs = processor.batch_convert(&input_dir, &output_dir)?;

            if outputs.is_empty() {
                anyhow::bail!("No files were converted");
            }
            println!("Successfully converted {} file(s)", outputs.len());
        }
        Commands::Multipage {
            inputs,
            output,
            config,
            tempo,
            clef,
        } => {
            if inputs.len() < 2 {
                anyhow::bail!("Multi-page mode requires at least 2 input images");
            }

            let config = load_config_with_overrides(config, tempo, clef)?;
            for input in &inputs {
                validate_input(input, &config)?;
            }

            let processor = SheetToMidi::new(config);
            let summary = processor.convert_multipage(&inputs, &output)?;

            println!(
                "Combined {} page(s) into {} ({} event group(s))",
                inputs.len(),
                summary.output.display(),
                summary.timeline_groups
            );
        }
        Commands::ValidateConfig { config } => {
            let config = sheet2midi::config::load_config(config)?;
            println!("Configuration is valid");
            if let Ok(json) = serde_json::to_string_pretty(&config) {
                println!("{}", json);
            }
        }
        Commands::ShowConfig => {
            let config = Config::default();
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
    }

    Ok(())
}
