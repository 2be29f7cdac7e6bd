/// Command-line interface definition
use crate::config::{parse_environment, RenderConfig};
use crate::error::Result;
use clap::{Args, Parser, Subcommand};
use roomwalk_audio::resampling::ResamplingQuality;
use roomwalk_audio::OutputFormat;
use roomwalk_core::EnvironmentSpec;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "roomwalk")]
#[command(about = "Render a sound as heard while walking through acoustic environments", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render the output file
    Render(InputArgs),
    /// Print the transition timeline without rendering
    Plan {
        #[command(flatten)]
        inputs: InputArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Inputs shared by every command; flags override the configuration file
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// Configuration file (defaults to ./roomwalk.toml when present)
    #[arg(short, long, env = "ROOMWALK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Dry signal file
    #[arg(short, long)]
    pub dry: Option<PathBuf>,

    /// Environment as IR:START:DURATION, repeated in walking order
    #[arg(short = 'e', long = "env", value_name = "IR:START:DURATION", value_parser = parse_environment)]
    pub environments: Vec<EnvironmentSpec>,

    /// Output WAV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Resampling quality for IRs at a different rate (fast, balanced, high, maximum)
    #[arg(short, long)]
    pub quality: Option<ResamplingQuality>,

    /// Output sample format (pcm16, pcm24, float32)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Output peak amplitude in (0, 1]
    #[arg(long)]
    pub target_peak: Option<f32>,

    /// Process environments one after another instead of in parallel
    #[arg(long)]
    pub serial: bool,
}

impl InputArgs {
    /// Load the configuration layers and apply these flags on top
    pub fn resolve(&self) -> Result<RenderConfig> {
        let mut config = RenderConfig::load(self.config.as_deref())?;
        self.apply_to(&mut config);
        Ok(config)
    }

    /// Override `config` with every flag that was given
    pub fn apply_to(&self, config: &mut RenderConfig) {
        if let Some(dry) = &self.dry {
            config.dry = Some(dry.clone());
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if !self.environments.is_empty() {
            config.environments = self.environments.clone();
        }
        if let Some(quality) = self.quality {
            config.render.quality = quality;
        }
        if let Some(format) = self.format {
            config.render.format = format;
        }
        if let Some(target_peak) = self.target_peak {
            config.render.target_peak = target_peak;
        }
        if self.serial {
            config.render.parallel = false;
        }
    }
}
