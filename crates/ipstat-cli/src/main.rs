use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, Level};

use ipstat_core::IpStatError;

mod batch;
mod output;

use batch::BatchProcessor;
use output::Printer;

/// IPv4 CIDR calculator: mask, network, usable range, broadcast and size
#[derive(Parser)]
#[command(name = "ipstat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CIDR block, e.g. 192.168.22.5/20
    #[arg(value_name = "IP/Mask")]
    cidr: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    output: OutputFormat,

    /// Leave the original CIDR out of the output
    #[arg(long)]
    no_echo: bool,

    /// Also show addresses in dotted binary (human output only)
    #[arg(short, long)]
    binary: bool,

    /// Read one CIDR per line from FILE (use '-' for stdin)
    #[arg(short = 'f', long, value_name = "FILE", conflicts_with = "cidr")]
    batch: Option<PathBuf>,

    /// Number of worker threads for batch mode
    #[arg(short, long)]
    workers: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Fixed-width label/value lines
    Human,
    /// JSON output (pretty-printed)
    Json,
    /// JSON output (compact)
    JsonCompact,
    /// CSV output
    Csv,
}

impl Cli {
    fn printer(&self) -> Printer {
        Printer {
            format: self.output,
            echo: !self.no_echo,
            binary: self.binary,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (message, code) = report_error(&err, &program_name());
            eprint!("{}", message);
            ExitCode::from(code)
        }
    }
}

/// Message and exit code for a failed run
///
/// Validation errors get the usage text and their own exit code; anything
/// else (I/O, batch failures) is a plain error with exit code 1.
fn report_error(err: &anyhow::Error, program: &str) -> (String, u8) {
    match err.downcast_ref::<IpStatError>() {
        Some(stat_err) => (
            output::usage_message(program, stat_err),
            stat_err.exit_code(),
        ),
        None => (format!("{} {:#}\n", "Error:".red().bold(), err), 1),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn program_name() -> String {
    std::env::args()
        .next()
        .unwrap_or_else(|| "ipstat".to_string())
}

fn run(cli: &Cli) -> Result<()> {
    if let Some(ref path) = cli.batch {
        return handle_batch(cli, path);
    }

    let cidr = cli.cidr.as_deref().ok_or(IpStatError::MissingArgument)?;
    handle_single(cli, cidr)
}

fn handle_single(cli: &Cli, cidr: &str) -> Result<()> {
    debug!(cidr, "resolving single block");
    let stats = ipstat_cidr::resolve(cidr)?;
    cli.printer().print_single(std::io::stdout().lock(), &stats)?;
    Ok(())
}

fn handle_batch(cli: &Cli, path: &Path) -> Result<()> {
    let inputs = batch::read_inputs(path)?;
    let processor = BatchProcessor::new(cli.workers)?;
    debug!(
        inputs = inputs.len(),
        threads = processor.thread_count(),
        "starting batch"
    );

    let results = processor.process(inputs);
    let total = results.len();

    let mut stats = Vec::with_capacity(total);
    let mut failed = 0usize;
    for item in results {
        match item.result {
            Ok(s) => stats.push(s),
            Err(err) => {
                failed += 1;
                eprintln!(
                    "{} line {} ({}): {}",
                    "Error:".red().bold(),
                    item.line,
                    item.input,
                    err
                );
            }
        }
    }

    cli.printer().print_batch(std::io::stdout().lock(), &stats)?;

    if failed > 0 {
        anyhow::bail!("{} of {} inputs failed validation", failed, total);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["ipstat", "192.168.22.5/20"]);
        assert_eq!(cli.cidr.as_deref(), Some("192.168.22.5/20"));
        assert_eq!(cli.output, OutputFormat::Human);
        assert!(!cli.no_echo);
        assert!(cli.batch.is_none());
    }

    #[test]
    fn test_missing_argument_is_not_a_parse_error() {
        let cli = Cli::try_parse_from(["ipstat"]).expect("cidr is optional");
        assert!(cli.cidr.is_none());

        let err = run(&cli).unwrap_err();
        assert_eq!(
            err.downcast_ref::<IpStatError>(),
            Some(&IpStatError::MissingArgument)
        );
    }

    #[test]
    fn test_invalid_cidr_surfaces_stat_error() {
        let cli = Cli::parse_from(["ipstat", "10.0.0.1/33"]);
        let err = run(&cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IpStatError>(),
            Some(IpStatError::InvalidPrefixLength(_))
        ));
    }

    #[test]
    fn test_report_error_missing_argument() {
        let cli = Cli::parse_from(["ipstat"]);
        let err = run(&cli).unwrap_err();
        let (message, code) = report_error(&err, "ipstat");
        assert_eq!(code, 2);
        assert!(message.starts_with("Error   : Enter a valid CIDR block value\n"));
        assert!(message.contains("Usage   : ipstat IP/Mask"));
    }

    #[test]
    fn test_report_error_invalid_prefix() {
        let cli = Cli::parse_from(["ipstat", "10.0.0.1/33"]);
        let err = run(&cli).unwrap_err();
        let (message, code) = report_error(&err, "ipstat");
        assert_eq!(code, 1);
        assert!(message.contains("Invalid prefix length: '33'"));
        assert!(message.contains("Example : ipstat 192.168.22.5/20"));
    }

    #[test]
    fn test_report_error_batch_with_bad_line() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "10.0.0.0/8").unwrap();
        writeln!(file, "bad").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::parse_from(["ipstat", "--no-color", "-o", "csv", "-f", &path]);
        colored::control::set_override(false);
        let err = run(&cli).unwrap_err();
        assert!(err.downcast_ref::<IpStatError>().is_none());

        let (message, code) = report_error(&err, "ipstat");
        assert_eq!(code, 1);
        assert_eq!(message, "Error: 1 of 2 inputs failed validation\n");
    }

    #[test]
    fn test_batch_all_valid_succeeds() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "10.0.0.0/8").unwrap();
        writeln!(file, "192.168.1.5/32").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::parse_from(["ipstat", "-o", "json-compact", "-f", &path]);
        assert!(run(&cli).is_ok());
    }

    #[test]
    fn test_output_format_json() {
        let cli = Cli::parse_from(["ipstat", "--output", "json-compact", "10.0.0.0/8"]);
        assert_eq!(cli.output, OutputFormat::JsonCompact);
    }

    #[test]
    fn test_printer_flags() {
        let cli = Cli::parse_from(["ipstat", "--no-echo", "-b", "10.0.0.0/8"]);
        let printer = cli.printer();
        assert!(!printer.echo);
        assert!(printer.binary);
    }

    #[test]
    fn test_batch_args() {
        let cli = Cli::parse_from(["ipstat", "--batch", "blocks.txt", "--workers", "4"]);
        assert_eq!(cli.batch, Some(PathBuf::from("blocks.txt")));
        assert_eq!(cli.workers, Some(4));
    }

    #[test]
    fn test_batch_conflicts_with_positional() {
        assert!(Cli::try_parse_from(["ipstat", "-f", "blocks.txt", "10.0.0.0/8"]).is_err());
    }

    #[test]
    fn test_verbose_count() {
        let cli = Cli::parse_from(["ipstat", "-vv", "1.1.1.1/32"]);
        assert_eq!(cli.verbose, 2);
    }
}
