use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use missify::dataset::Dataset;
use missify::mechanism::{DEFAULT_BETA, DEFAULT_MCAR_PROBABILITY};
use missify::reader::MissingTokens;
use missify::study::{CsvReporter, JsonReporter, TextReporter};
use missify::{
    CsvReadOptions, CsvSink, Mechanism, ResultsReporter, Study, create_rng, logger, read_csv_path,
};

#[derive(Parser)]
#[command(
    name = "missify",
    version,
    about = "Inject MCAR/MAR/NMAR missingness into CSV datasets"
)]
struct Cli {
    /// Append warnings and errors to this file as well as stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print column kinds and missing counts.
    Inspect(InspectArgs),
    /// Apply one mechanism and write the transformed CSV.
    Inject(InjectArgs),
    /// Compare mechanisms over repeated seeded trials.
    Study(StudyArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MechanismArg {
    Mcar,
    Mar,
    Nmar,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Csv,
    Json,
}

#[derive(clap::Args, Clone)]
struct InputArgs {
    /// Input CSV file with a header row.
    input: PathBuf,

    /// Field delimiter of the input.
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Extra spelling treated as missing (repeatable).
    #[arg(long = "na", value_name = "TOKEN")]
    na_tokens: Vec<String>,
}

impl InputArgs {
    fn options(&self) -> Result<CsvReadOptions, AnyError> {
        let mut tokens = MissingTokens::default();
        for token in &self.na_tokens {
            tokens = tokens.with_token(token);
        }
        Ok(CsvReadOptions::new()
            .with_delimiter(delimiter_byte(self.delimiter)?)
            .with_missing_tokens(tokens))
    }

    fn load(&self) -> Result<Dataset, AnyError> {
        Ok(read_csv_path(&self.input, &self.options()?)?)
    }
}

#[derive(Parser, Clone)]
struct InspectArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Emit JSON instead of human readable output.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Clone)]
struct InjectArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Mechanism to apply.
    #[arg(long, value_enum)]
    mechanism: MechanismArg,

    /// Column that receives missing values.
    #[arg(long)]
    column: String,

    /// Column the MAR probability depends on.
    #[arg(long, required_if_eq("mechanism", "mar"))]
    dependent: Option<String>,

    /// MCAR probability of a cell going missing.
    #[arg(long, default_value_t = DEFAULT_MCAR_PROBABILITY)]
    p: f64,

    /// MAR/NMAR scaling factor.
    #[arg(long, default_value_t = DEFAULT_BETA)]
    beta: f64,

    /// Seed for a reproducible pattern. Random when unset.
    #[arg(long)]
    seed: Option<u64>,

    /// Output file; stdout when unset.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write header row.
    #[arg(long = "headers", action = ArgAction::SetTrue, default_value_t = true)]
    headers: bool,
    /// Disable header row.
    #[arg(long = "no-headers", action = ArgAction::SetFalse, overrides_with = "headers")]
    _no_headers: bool,
}

#[derive(Parser, Clone)]
struct StudyArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Column that receives missing values.
    #[arg(long)]
    column: String,

    /// Dependent column; adds a MAR row when set.
    #[arg(long)]
    dependent: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MCAR_PROBABILITY)]
    p: f64,

    #[arg(long, default_value_t = DEFAULT_BETA)]
    beta: f64,

    /// Trials per mechanism.
    #[arg(long, default_value_t = 100)]
    trials: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of worker threads.
    #[arg(long)]
    jobs: Option<usize>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

type AnyError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            logger::log_error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AnyError> {
    if let Some(path) = &cli.log_file {
        logger::set_log_file(path)?;
    }
    match cli.command {
        Command::Inspect(args) => run_inspect(&args),
        Command::Inject(args) => run_inject(&args),
        Command::Study(args) => run_study(&args),
    }
}

fn run_inspect(args: &InspectArgs) -> Result<(), AnyError> {
    let dataset = args.input.load()?;
    if args.json {
        #[derive(serde::Serialize)]
        struct ColumnJson<'a> {
            name: &'a str,
            kind: missify::ColumnKind,
            missing: usize,
        }
        #[derive(serde::Serialize)]
        struct InspectJson<'a> {
            row_count: usize,
            column_count: usize,
            columns: Vec<ColumnJson<'a>>,
        }
        let payload = InspectJson {
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            columns: dataset
                .columns()
                .iter()
                .map(|c| ColumnJson {
                    name: c.name(),
                    kind: c.kind(),
                    missing: c.missing_count(),
                })
                .collect(),
        };
        serde_json::to_writer_pretty(io::stdout(), &payload)?;
        println!();
    } else {
        println!(
            "Rows: {}  Columns: {}",
            dataset.row_count(),
            dataset.column_count()
        );
        for (idx, c) in dataset.columns().iter().enumerate() {
            println!(
                "[{idx:>3}] {name:<24}  {kind:<7}  missing={missing}",
                name = c.name(),
                kind = c.kind().as_str(),
                missing = c.missing_count()
            );
        }
    }
    Ok(())
}

fn run_inject(args: &InjectArgs) -> Result<(), AnyError> {
    let mechanism = match args.mechanism {
        MechanismArg::Mcar => Mechanism::mcar(&args.column, args.p),
        MechanismArg::Mar => {
            let dependent = args
                .dependent
                .as_deref()
                .ok_or("--dependent is required for MAR")?;
            Mechanism::mar(&args.column, dependent, args.beta)
        }
        MechanismArg::Nmar => Mechanism::nmar(&args.column, args.beta),
    };

    let dataset = args.input.load()?;
    let mut rng = args
        .seed
        .map_or_else(missify::sampler::from_entropy, create_rng);
    let injected = mechanism.apply(&dataset, &mut rng)?;

    let delimiter = delimiter_byte(args.input.delimiter)?;
    match &args.out {
        Some(path) => {
            let file = BufWriter::new(File::create(path)?);
            write_dataset(&injected.dataset, file, delimiter, args.headers)?;
        }
        None => write_dataset(&injected.dataset, io::stdout().lock(), delimiter, args.headers)?,
    }

    eprintln!(
        "{mechanism}: {written} of {rows} cells in '{column}' set missing",
        written = injected.written,
        rows = dataset.row_count(),
        column = args.column
    );
    Ok(())
}

fn write_dataset<W: Write>(
    dataset: &Dataset,
    out: W,
    delimiter: u8,
    headers: bool,
) -> Result<(), AnyError> {
    let mut sink = CsvSink::new(out)
        .with_delimiter(delimiter)
        .with_headers(headers);
    dataset.write_to(&mut sink)?;
    sink.into_inner()?.flush()?;
    Ok(())
}

fn run_study(args: &StudyArgs) -> Result<(), AnyError> {
    if let Some(jobs) = args.jobs {
        // Best-effort: configure global rayon pool once. Ignore error if already set.
        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global();
    }

    let dataset = args.input.load()?;
    let matrix = Study::new(dataset, &args.column)
        .with_standard_mechanisms(args.dependent.as_deref(), args.p, args.beta)
        .with_trials(args.trials)
        .with_seed(args.seed)
        .run()?;

    let stdout = io::stdout().lock();
    match args.format {
        ReportFormat::Text => TextReporter::new(stdout).report(&matrix)?,
        ReportFormat::Csv => CsvReporter::new(stdout).report(&matrix)?,
        ReportFormat::Json => JsonReporter::new(stdout).report(&matrix)?,
    }
    Ok(())
}

fn delimiter_byte(delimiter: char) -> Result<u8, AnyError> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| format!("delimiter '{delimiter}' must be a single ASCII character").into())
}

