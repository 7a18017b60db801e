use anyhow::{Context, Result};
use rxrename_core::{
    apply_plan, format_warning, plan_operation, ApplyFailure, ApplyOptions, ApplyResult, Config,
    Environment, LocalFs, OutputFormat, OutputFormatter, PlanResult, PlanWarning, RenameError,
    RenameRequest,
};
use tracing::debug;

use crate::cli::Cli;

/// Build the request from flags and config defaults. Flags win.
pub fn build_request(cli: &Cli, config: &Config) -> RenameRequest {
    let defaults = &config.defaults;
    RenameRequest {
        pattern: cli.regex.clone().or_else(|| defaults.pattern.clone()),
        template: cli.out.clone().or_else(|| defaults.template.clone()),
        files: cli.files.clone(),
        strict: cli.strict || defaults.strict,
        renumber: cli.renumber.map_or(defaults.renumber, Into::into),
        make_dirs: cli.mkdir || defaults.mkdir,
        env: Environment::from_process(),
    }
}

/// Colour decisions, made separately because listings and diagnostics go to
/// different streams.
#[derive(Debug, Clone, Copy)]
pub struct Colors {
    pub stdout: bool,
    pub stderr: bool,
}

pub fn handle_rename(cli: &Cli, config: &Config, colors: Colors) -> Result<()> {
    let request = build_request(cli, config);
    let output: OutputFormat = cli.output.into();
    let preview = cli
        .preview
        .map(Into::into)
        .or(config.defaults.preview)
        .unwrap_or_default();

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    debug!(dir = %working_dir.display(), doit = cli.doit, "planning renames");

    let mut warnings = Vec::new();
    let planned = plan_operation(&request, Some(&working_dir), &mut warnings);
    report_warnings(&warnings, cli.verbose, colors.stderr);
    let plan = planned?;

    let listing = PlanResult {
        dry_run: !cli.doit,
        plan,
        warnings,
        preview,
        use_color: colors.stdout,
    };

    if !cli.doit {
        print!("{}", with_newline(listing.format(output)));
        return Ok(());
    }

    if cli.verbose && output == OutputFormat::Summary {
        print!("{}", listing.format(output));
    }

    let fs = LocalFs::new(&working_dir);
    let options = ApplyOptions {
        log_file: cli.log_file.clone(),
    };
    let report = match apply_plan(&listing.plan, &fs, &options) {
        Ok(report) => report,
        Err(error) => {
            report_failure(&error, output);
            return Err(error.into());
        },
    };

    print!("{}", with_newline(ApplyResult { report }.format(output)));
    Ok(())
}

/// Duplicate names are only worth mentioning when asked for detail.
fn report_warnings(warnings: &[PlanWarning], verbose: bool, use_color: bool) {
    for warning in warnings {
        if matches!(warning, PlanWarning::DuplicateSource { .. }) && !verbose {
            continue;
        }
        eprintln!("{}", format_warning(warning, use_color));
    }
}

/// Tell the user where stranded files ended up so the batch can be finished by hand.
fn report_failure(error: &RenameError, output: OutputFormat) {
    let Some(failure) = ApplyFailure::from_error(error) else {
        return;
    };
    match output {
        OutputFormat::Json => println!("{}", failure.format_json()),
        OutputFormat::Summary => eprint!("{}", failure.format_summary()),
    }
}

fn with_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
