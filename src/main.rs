use std::{fs::File, io::BufWriter, path::PathBuf};

use clap::Parser;
use repeat_donors::{
    analyzer::run,
    parser::{parse_percentile, ValidationRules, DEFAULT_MAX_YEAR},
};
use tracing_subscriber::EnvFilter;

/// Running percentile, total and count of contributions from repeat donors
#[derive(Parser)]
#[clap(version)]
struct Cli {
    /// Pipe-delimited FEC contributions file (itcont.txt)
    input: PathBuf,
    /// File whose first line holds the percentile to report (1-100)
    percentile: PathBuf,
    /// Where to write the repeat donor lines
    output: PathBuf,
    /// Contributions dated after this year are rejected
    #[clap(long, default_value_t = DEFAULT_MAX_YEAR)]
    max_year: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "repeat_donors=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let percentile = parse_percentile(&std::fs::read_to_string(&cli.percentile)?)?;
    let rules = ValidationRules {
        max_year: cli.max_year,
    };

    let input = File::open(&cli.input)?;
    let output = BufWriter::new(File::create(&cli.output)?);
    tracing::info!(
        input = %cli.input.display(),
        output = %cli.output.display(),
        percentile,
        max_year = rules.max_year,
        "analyzing contributions"
    );

    run(input, output, percentile, &rules)?;
    Ok(())
}
