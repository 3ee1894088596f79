use lcc::{
    cli::Args,
    profile::Profiler,
    survey::{Outcome, Survey, SurveyError},
};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use std::io::Write;

fn main() {
    let args = Args::from_cli();
    init_tracing(args.verbose);
    let mut profiler = Profiler::new(args.profile);
    let r = try_main(&args, &mut profiler);
    if let Err(e) = profiler.report(&mut std::io::stderr()) {
        eprintln!("error: failed to write profile report: {e}");
    }
    if let Err(e) = r {
        eprintln!("error: {e:?}");
        std::process::exit(1)
    }
}

/// Installs a stderr subscriber filtered by `LCC_LOG`, falling back to
/// `debug` with `--verbose` and `warn` otherwise.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("LCC_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn try_main(args: &Args, profiler: &mut Profiler) -> Result<()> {
    let opts = args.lang_options();
    tracing::debug!(standard = %args.standard, "building identifier table");
    let mut survey = profiler.time("Keyword registration", || Survey::new(opts));

    let mut stdout = std::io::stdout().lock();
    for path in &args.paths {
        let path = path
            .to_str()
            .ok_or_else(|| SurveyError::NonUtf8Path(path.display().to_string()))?;
        let outcome = profiler
            .time(format!("Survey {path}"), || survey.add_file(path))
            .with_context(|| format!("failed to survey {path}"))?;
        match outcome {
            Outcome::Surveyed(report) => writeln!(
                stdout,
                "{}: uid {}, {} bytes, {} words, {} keywords ({} extensions)",
                survey.display_name(report.file),
                report.uid,
                report.size,
                report.words,
                report.keywords,
                report.extensions,
            )?,
            Outcome::Duplicate { first, .. } => {
                writeln!(stdout, "{path}: same file as {first}")?
            }
        }
    }

    if args.dump_identifiers {
        survey
            .dump_identifiers(&mut stdout)
            .context("failed to dump identifiers")?;
    }
    if args.print_stats {
        survey
            .print_stats(&mut std::io::stderr())
            .context("failed to print statistics")?;
    }
    Ok(())
}
