#![forbid(unsafe_code)]

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use tb_export::{ExportResult, export_cmd};

#[derive(Parser, Debug)]
#[command(name = "tb-export")]
#[command(about = "Export scalar summaries from TensorBoard event logs to CSV", long_about = None)]
struct Cli {
    /// Directory of the logs (or a single event file)
    #[arg(long, value_name = "/path/to/logs/")]
    logs: std::path::PathBuf,

    /// Metric file (csv) [default: metrics.csv]
    #[arg(long, value_name = "metrics_file")]
    file: Option<std::path::PathBuf>,

    /// Export settings (TOML): output, alignment, purge_orphaned, size_guidance
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Require every scalar tag to have as many samples as the first one
    #[arg(long)]
    strict: bool,

    /// Write machine-readable JSON report to this file
    #[arg(long)]
    json: Option<std::path::PathBuf>,

    /// Print the tags found per summary kind instead of exporting
    #[arg(long)]
    list_tags: bool,

    /// Enable verbose logging (or set TB_EXPORT_LOG)
    #[arg(long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("TB_EXPORT_LOG").unwrap_or_else(|_| {
        if verbose { "tb_export=debug".to_string() } else { "tb_export=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn execute(cli: Cli) -> ExportResult<()> {
    if cli.list_tags {
        export_cmd::list_tags(cli.logs, cli.config)
    } else {
        export_cmd::run(cli.logs, cli.file, cli.config, cli.strict, cli.json).map(|_| ())
    }
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = execute(cli) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use tb_export::ExportError;

    #[test]
    fn test_file_defaults_to_metrics_csv() {
        let cli = Cli::try_parse_from(["tb-export", "--logs", "runs/"]).unwrap();
        assert_eq!(cli.logs, PathBuf::from("runs/"));
        assert!(cli.file.is_none());
        assert!(!cli.strict && !cli.list_tags);

        let cfg = export_cmd::resolve_config(None, cli.file, cli.strict).unwrap();
        assert_eq!(cfg.output, PathBuf::from("metrics.csv"));
    }

    #[test]
    fn test_logs_is_required() {
        assert!(Cli::try_parse_from(["tb-export", "--file", "out.csv"]).is_err());
    }

    #[test]
    fn test_failed_export_is_reported_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("missing");
        let out = dir.path().join("out.csv");
        let cli = Cli::try_parse_from([
            "tb-export",
            "--logs",
            logs.to_str().unwrap(),
            "--file",
            out.to_str().unwrap(),
        ])
        .unwrap();

        assert!(matches!(execute(cli), Err(ExportError::LogRead { .. })));
        assert!(!out.exists());
    }
}
