use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use common::config::{MagnitudeMode, SpectrumConfig, WindowKind};
use common::config_presets::PRESET_NAMES;
use log::info;
use smart_leds::RGB8;
use smart_leds_trait::SmartLedsWrite;

use spectrum_lights::error_with_location;
use spectrum_lights::lights::{RunStats, run};
use spectrum_lights::report::FpsReporter;
use spectrum_lights::source::{FrameSource, PcmSource, ToneSource};
use spectrum_lights::strand::{RawStrand, TerminalStrand, clear, self_test};
use spectrum_lights::util::init_logging;
use spectrum_lights::SpectrumMapper;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Output {
    /// coloured blocks in the terminal
    Terminal,
    /// raw r g b bytes on stdout
    Raw,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WindowArg {
    Rectangular,
    Hann,
    Hamming,
}

impl From<WindowArg> for WindowKind {
    fn from(value: WindowArg) -> Self {
        match value {
            WindowArg::Rectangular => WindowKind::Rectangular,
            WindowArg::Hann => WindowKind::Hann,
            WindowArg::Hamming => WindowKind::Hamming,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MagnitudeArg {
    Magnitude,
    LogPower,
}

impl From<MagnitudeArg> for MagnitudeMode {
    fn from(value: MagnitudeArg) -> Self {
        match value {
            MagnitudeArg::Magnitude => MagnitudeMode::Magnitude,
            MagnitudeArg::LogPower => MagnitudeMode::LogPower,
        }
    }
}

/// Maps live audio to an LED strand through a windowed FFT.
#[derive(Parser, Debug)]
#[command(name = "spectrum_lights", version)]
struct Cli {
    /// built-in configuration (index_banded, three_band, rainbow, beat, greyscale, level_hue)
    #[arg(short, long, default_value = "rainbow", conflicts_with = "config")]
    preset: String,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// mono s16le PCM file, or `-` for stdin
    #[arg(short, long, conflicts_with = "tone")]
    input: Option<PathBuf>,

    /// synthesise a sine at this frequency instead of reading PCM (repeatable)
    #[arg(long)]
    tone: Vec<f32>,

    /// peak amplitude of the synthesised tones
    #[arg(long, default_value_t = 8000.0)]
    amplitude: f32,

    /// stop after this many synthesised frames
    #[arg(long)]
    frames: Option<u64>,

    /// pace synthesised frames like a live capture
    #[arg(long)]
    realtime: bool,

    #[arg(long)]
    sample_rate: Option<u32>,

    #[arg(long)]
    frame_size: Option<usize>,

    #[arg(long)]
    start_freq: Option<f32>,

    #[arg(long)]
    cutoff_freq: Option<f32>,

    #[arg(long)]
    pixels: Option<usize>,

    #[arg(long, value_enum)]
    window: Option<WindowArg>,

    #[arg(long, value_enum)]
    magnitude: Option<MagnitudeArg>,

    /// threshold multiplier
    #[arg(long)]
    threshold: Option<f32>,

    /// frames between rate reports, 0 to disable
    #[arg(long)]
    report_interval: Option<u32>,

    #[arg(short, long, value_enum, default_value_t = Output::Terminal)]
    output: Output,

    /// global brightness of the terminal strand
    #[arg(long, default_value_t = 255)]
    brightness: u8,

    /// run the red/green/blue/chase check before starting
    #[arg(long)]
    self_test: bool,

    /// leave the last frame on the strand when exiting
    #[arg(long)]
    no_clear: bool,

    /// print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn load_config(&self) -> Result<SpectrumConfig> {
        let mut config = match &self.config {
            Some(path) => SpectrumConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => SpectrumConfig::preset(&self.preset).ok_or_else(|| {
                error_with_location!(
                    "Unknown preset '{}', expected one of {:?}",
                    self.preset,
                    PRESET_NAMES
                )
            })?,
        };

        if let Some(v) = self.sample_rate {
            config.sample_rate = v;
        }
        if let Some(v) = self.frame_size {
            config.frame_size = v;
        }
        if let Some(v) = self.start_freq {
            config.start_freq_hz = v;
        }
        if let Some(v) = self.cutoff_freq {
            config.cutoff_freq_hz = v;
        }
        if let Some(v) = self.pixels {
            config.num_pixels = v;
        }
        if let Some(v) = self.window {
            config.window = v.into();
        }
        if let Some(v) = self.magnitude {
            config.magnitude = v.into();
        }
        if let Some(v) = self.threshold {
            config.threshold.multiplier = v;
        }
        if let Some(v) = self.report_interval {
            config.report_interval = v;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    fn open_source(&self, config: &SpectrumConfig) -> Result<Box<dyn FrameSource>> {
        if !self.tone.is_empty() || self.input.is_none() {
            let tones = if self.tone.is_empty() {
                vec![440.0]
            } else {
                self.tone.clone()
            };
            info!("[main] synthesising {tones:?} Hz");
            let mut source =
                ToneSource::new(config.sample_rate, config.frame_size, tones, self.amplitude);
            if let Some(frames) = self.frames {
                source = source.with_frame_limit(frames);
            }
            if self.realtime {
                source = source.paced();
            }
            return Ok(Box::new(source));
        }

        let reader: Box<dyn Read> = match self.input.as_deref() {
            Some(path) if path.as_os_str() == "-" => {
                info!("[main] reading PCM from stdin");
                Box::new(io::stdin().lock())
            }
            Some(path) => {
                info!("[main] reading PCM from {}", path.display());
                let file = File::open(path)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                Box::new(BufReader::new(file))
            }
            None => return Err(error_with_location!("No audio input")),
        };
        Ok(Box::new(PcmSource::new(reader, config.frame_size)))
    }
}

fn drive<S>(cli: &Cli, config: SpectrumConfig, strand: &mut S, stop: &AtomicBool) -> Result<()>
where
    S: SmartLedsWrite<Color = RGB8>,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    if cli.self_test {
        info!("[main] self test");
        self_test(strand, config.num_pixels, Duration::from_millis(20)).context("Self test failed")?;
    }

    let mut reporter = FpsReporter::new(config.report_interval);
    let mut source = cli.open_source(&config)?;
    let mut mapper = SpectrumMapper::new(config).context("Invalid configuration")?;

    let result = run(&mut *source, &mut mapper, strand, stop, &mut reporter);
    let num_pixels = if cli.no_clear { 0 } else { mapper.config().num_pixels };
    finish(result, strand, num_pixels).map(|stats| info!("[main] done: {stats:?}"))
}

/// Blanks the first `num_pixels` LEDs after the loop. A failed clear is logged and the
/// loop's own result is returned unchanged.
fn finish<S>(result: Result<RunStats>, strand: &mut S, num_pixels: usize) -> Result<RunStats>
where
    S: SmartLedsWrite<Color = RGB8>,
    S::Error: std::fmt::Debug,
{
    if num_pixels > 0
        && let Err(e) = clear(strand, num_pixels)
    {
        log::error!("[main] failed to clear strand: {e:?}");
    }
    result
}

fn _main(cli: Cli) -> Result<()> {
    let config = cli.load_config()?;

    if cli.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || handler_stop.store(true, Ordering::Relaxed))
        .map_err(|e| error_with_location!("Failed to install Ctrl-C handler: {:?}", e))?;

    let stdout = io::stdout().lock();
    match cli.output {
        Output::Terminal => {
            let mut strand = TerminalStrand::new(stdout, cli.brightness);
            let result = drive(&cli, config, &mut strand, &stop);
            println!();
            result
        }
        Output::Raw => drive(&cli, config, &mut RawStrand::new(stdout), &stop),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    info!("[main] spectrum_lights {}", env!("CARGO_PKG_VERSION"));

    match _main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Error!");
            log::error!("{e:?}");
            ExitCode::FAILURE
        }
    }
}
