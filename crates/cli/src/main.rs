use anyhow::{anyhow, bail, Context};
use citygen::{timed, City, CityConfig, Seed};
use config::{Config, File};
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    process,
};
use structopt::StructOpt;
use strum::{Display, EnumString};

/// CLI for generating city road networks
#[derive(Debug, StructOpt)]
#[structopt(name = "citygen")]
struct Opt {
    /// Path to a config file that defines the city to be generated. Supported
    /// formats: JSON, TOML. If omitted, the default config is used.
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Seed for generation, as an integer or any other text. Overrides the
    /// seed in the config file.
    #[structopt(short, long, parse(from_str))]
    seed: Option<Seed>,

    /// If given, the generated city will be saved to this directory. The
    /// exact files that appear in the directory are defined by the output
    /// formats. See `--output-formats` for more info
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// The format(s) to output the city in. Supported formats:
    ///
    /// cfg - The full config object used for the city, in TOML format. Use
    ///   this to regenerate the same city later
    ///
    /// json - JSON summary of the roads and leaves
    ///
    /// svg - 2D top-down rendering of the roads and their exclusion zones
    ///
    /// stl - 3D model of the road surfaces
    #[structopt(short = "f", long)]
    output_formats: Vec<OutputFormat>,

    /// The logging level to use during generation. See
    /// https://docs.rs/log/0.4/log/enum.LevelFilter.html for options
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

/// Different output formats
#[derive(Copy, Clone, Debug, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum OutputFormat {
    // If you change this, make sure to update the help text for
    // `--output-formats`!
    /// The city's full config, in a human-readable file
    Cfg,
    /// A JSON summary of the city
    Json,
    /// Render the city as a 2D SVG
    Svg,
    /// Render the road meshes as a 3D STL
    Stl,
}

impl OutputFormat {
    fn file_ext(self) -> &'static str {
        match self {
            Self::Cfg => "toml",
            Self::Json => "json",
            Self::Svg => "svg",
            Self::Stl => "stl",
        }
    }
}

fn load_config(config_path: &Path) -> anyhow::Result<CityConfig> {
    let mut settings = Config::new();
    let config_path = config_path.to_str().ok_or_else(|| {
        anyhow!("invalid character in path {:?}", config_path)
    })?;
    settings
        .merge(File::with_name(config_path))
        .context("error reading config file")?;
    settings.try_into().context("error reading config")
}

/// Generate an output form of the city in the given format, and write it to
/// the output directory
fn gen_output(
    output_dir: &Path,
    output_format: OutputFormat,
    city: &City,
) -> anyhow::Result<()> {
    fn generate_bytes(
        output_format: OutputFormat,
        city: &City,
    ) -> anyhow::Result<Vec<u8>> {
        Ok(match output_format {
            OutputFormat::Cfg => toml::to_string_pretty(city.config())
                .context("error serializing config")?
                .into_bytes(),
            OutputFormat::Json => city.to_json().into_bytes(),
            OutputFormat::Svg => citygen::render_as_svg(city).into_bytes(),
            OutputFormat::Stl => citygen::render_as_stl(city.network()),
        })
    }

    let output_file_path = output_dir
        .join("city")
        .with_extension(output_format.file_ext());

    timed!(
        format!(
            "Generating {} output and writing to {:?}",
            output_format, &output_file_path
        ),
        log::Level::Info,
        {
            let bytes = generate_bytes(output_format, city)?;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&output_file_path)
                .with_context(|| {
                    format!("error opening output file {:?}", &output_file_path)
                })?;
            file.write_all(&bytes).with_context(|| {
                format!("error writing to file {:?}", &output_file_path)
            })?;
        }
    );

    Ok(())
}

/// Run the CLI with some options
fn run(opt: Opt) -> anyhow::Result<()> {
    SimpleLogger::new().with_level(opt.log_level).init()?;

    let mut config = match &opt.config {
        Some(config_path) => load_config(config_path)?,
        None => CityConfig::default(),
    };
    match opt.seed {
        Some(seed) => config.seed = seed,
        None if opt.config.is_none() => {
            warn!("No config or seed given, using random seed {}", config.seed)
        }
        None => {}
    }

    let city = City::generate(config)?;
    info!(
        "Generated {} roads and {} leaves",
        city.network().len(),
        city.leaves().len()
    );

    // If an output dir was specified, write out output format(s) there
    if let Some(output_dir) = opt.output {
        if opt.output_formats.is_empty() {
            bail!("output dir was specified, but no output formats were given")
        }
        fs::create_dir_all(&output_dir)?;

        for output_format in opt.output_formats {
            gen_output(&output_dir, output_format, &city)?;
        }
    }

    Ok(())
}

fn main() {
    let exit_code = match run(Opt::from_args()) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    process::exit(exit_code);
}
