use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use grammar_testgen::{
    backends::{json::JsonWriter, text::TextWriter, write_to_file},
    error::Error,
    generator::{GeneratorConfig, TestGenerator},
    grammar::ContextFreeGrammar,
};
use log::error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Generate labelled membership tests for a context-free grammar.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Grammar file in text format. Read from stdin if absent.
    #[arg(long, value_name = "GRAMMAR")]
    grammar: Option<PathBuf>,

    /// Number of tests.
    #[arg(short = 'n', long, default_value_t = 10)]
    tests: usize,

    /// File the tests are written to.
    #[arg(short, long, default_value = "Tests.txt")]
    output: PathBuf,

    /// Format of the output file.
    #[arg(long, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Share of positive tests in percent.
    #[arg(long, default_value_t = 50)]
    percent: u32,

    /// Whether the share refers to the actual answers (true) or only to the synthesis targets.
    #[arg(long, value_name = "BOOL")]
    necessary: Option<bool>,

    /// JSON file with generator settings. Flags take precedence.
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum length of a test string.
    #[arg(long)]
    max_len: Option<usize>,

    /// Seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of worker threads, 0 for available parallelism.
    #[arg(long)]
    workers: Option<usize>,

    /// Allow the empty string as a test.
    #[arg(long)]
    allow_empty: bool,

    /// Draw random terminals from a..z instead of the grammar's terminals.
    #[arg(long)]
    full_alphabet: bool,

    /// Start symbol. Defaults to the left-hand side of the first rule.
    #[arg(long)]
    entrypoint: Option<String>,

    /// Print the grammar in Chomsky normal form.
    #[arg(long)]
    dump_cnf: bool,
}

fn load_config(args: &Args) -> Result<GeneratorConfig, Error> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_json_file(path)?,
        None => GeneratorConfig::default(),
    };

    if let Some(necessary) = args.necessary {
        config.necessary = necessary;
    }
    if let Some(max_len) = args.max_len {
        config.max_test_length = max_len;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if args.allow_empty {
        config.allow_empty_tests = true;
    }
    if args.full_alphabet {
        config.use_full_alphabet = true;
    }

    Ok(config)
}

fn run(args: Args) -> Result<(), Error> {
    let config = load_config(&args)?;

    let mut builder = match &args.grammar {
        Some(path) => ContextFreeGrammar::builder().text_grammar(path)?,
        None => ContextFreeGrammar::builder().text_reader(std::io::stdin().lock())?,
    };

    if let Some(entrypoint) = &args.entrypoint {
        builder = builder.entrypoint(entrypoint);
    }

    let generator = TestGenerator::new(builder.build()?, config)?;

    if args.dump_cnf {
        println!("{}", generator.grammar());
    }

    let tests = generator.generate(args.tests, args.percent)?;

    for test in &tests {
        println!("{:>5} <- {}", test.answer, test.question);
    }

    match args.format {
        OutputFormat::Text => write_to_file(&TextWriter::new(), &tests, &args.output)?,
        OutputFormat::Json => write_to_file(&JsonWriter::new(), &tests, &args.output)?,
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        },
    }
}
