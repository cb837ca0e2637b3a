// crates/quick-surveys-cli/src/main.rs
// ============================================================================
// Module: Quick Surveys CLI Entry Point
// Description: Command dispatcher for survey configuration and selection.
// Purpose: Provide a safe, localized CLI for operators authoring surveys.
// Dependencies: clap, quick-surveys-config, quick-surveys-core, rand, serde.
// ============================================================================

//! ## Overview
//! The Quick Surveys CLI validates survey configuration, lists and exports
//! the enabled surveys, enumerates the message keys a deployment must
//! translate, and dry-runs the per-page selection for a viewer file. All
//! user-facing strings are routed through the i18n catalog; survey rejections
//! go to the audit sink (stderr unless `engine.audit_log` is set).

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use quick_surveys_cli::i18n::Locale;
use quick_surveys_cli::i18n::set_locale;
use quick_surveys_cli::input::InputError;
use quick_surveys_cli::input::MAX_VIEWER_BYTES;
use quick_surveys_cli::input::read_viewer_document;
use quick_surveys_cli::t;
use quick_surveys_config::QuickSurveysConfig;
use quick_surveys_core::CandidateOutcome;
use quick_surveys_core::FileSurveyAuditSink;
use quick_surveys_core::InMemoryTokenStore;
use quick_surveys_core::MessageResolver;
use quick_surveys_core::SelectionReport;
use quick_surveys_core::StderrSurveyAuditSink;
use quick_surveys_core::Survey;
use quick_surveys_core::SurveyAuditSink;
use quick_surveys_core::SurveySelection;
use quick_surveys_core::ViewerContext;
use quick_surveys_core::runtime::select_with_report;
use quick_surveys_core::runtime::viewer_link;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable selecting the output language.
const LANG_ENV: &str = "QUICK_SURVEYS_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "quick-surveys", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `QUICK_SURVEYS_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Inspect the enabled surveys.
    Surveys {
        /// Selected surveys subcommand.
        #[command(subcommand)]
        command: SurveysCommand,
    },
    /// Dry-run survey selection for a viewer file.
    Select(SelectCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load the config and validate every survey.
    Validate(ConfigArgs),
}

/// Surveys subcommands.
#[derive(Subcommand, Debug)]
enum SurveysCommand {
    /// One line per enabled survey.
    List(ConfigArgs),
    /// JSON array of client projections.
    Export(ConfigArgs),
    /// Sorted, de-duplicated message keys.
    Messages(ConfigArgs),
}

/// Shared config location argument.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Optional config file path (defaults to quick-surveys.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for a selection dry run.
#[derive(Args, Debug)]
struct SelectCommand {
    /// Path to the viewer JSON document.
    #[arg(long, value_name = "PATH")]
    viewer: PathBuf,
    /// Config location.
    #[command(flatten)]
    config: ConfigArgs,
    /// Force a survey by name, or `true` for a random one.
    #[arg(long, value_name = "NAME")]
    force: Option<String>,
    /// Seed for token generation and tie-breaks.
    #[arg(long, value_name = "N")]
    seed: Option<u64>,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Config {
            command: ConfigCommand::Validate(args),
        } => command_config_validate(&args),
        Commands::Surveys {
            command,
        } => command_surveys(command),
        Commands::Select(command) => command_select(&command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Configuration plus the surveys that passed validation.
struct LoadedSurveys {
    /// Loaded configuration.
    config: QuickSurveysConfig,
    /// Enabled, valid surveys in configuration order.
    surveys: Vec<Survey>,
    /// Number of enabled specs that were rejected.
    rejected: usize,
}

/// Loads the config and runs the survey factory over it.
fn load_surveys(args: &ConfigArgs) -> CliResult<LoadedSurveys> {
    let config = QuickSurveysConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let audit = audit_sink(&config)?;
    let load = config
        .survey_factory(audit)
        .parse_report(&config.surveys)
        .map_err(|err| CliError::new(t!("config.surveys_rejected", error = err)))?;
    Ok(LoadedSurveys {
        rejected: load.rejections.len(),
        surveys: load.surveys,
        config,
    })
}

/// Builds the audit sink named by the config, defaulting to stderr.
fn audit_sink(config: &QuickSurveysConfig) -> CliResult<Arc<dyn SurveyAuditSink>> {
    let Some(path) = config.engine.audit_log_path() else {
        return Ok(Arc::new(StderrSurveyAuditSink));
    };
    let sink = FileSurveyAuditSink::new(path).map_err(|err| {
        CliError::new(t!("audit.open_failed", path = path.display(), error = err))
    })?;
    Ok(Arc::new(sink))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes the config validation command.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    let loaded = load_surveys(args)?;
    write_stdout_line(&t!(
        "config.validate.summary",
        accepted = loaded.surveys.len(),
        rejected = loaded.rejected
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    if loaded.rejected > 0 {
        return Err(CliError::new(t!("config.validate.failed")));
    }
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Surveys Commands
// ============================================================================

/// Dispatches surveys subcommands.
fn command_surveys(command: SurveysCommand) -> CliResult<ExitCode> {
    match command {
        SurveysCommand::List(args) => command_surveys_list(&args),
        SurveysCommand::Export(args) => command_surveys_export(&args),
        SurveysCommand::Messages(args) => command_surveys_messages(&args),
    }
}

/// Prints one line per enabled survey.
fn command_surveys_list(args: &ConfigArgs) -> CliResult<ExitCode> {
    let loaded = load_surveys(args)?;
    let mut output = String::new();
    if loaded.surveys.is_empty() {
        output.push_str(&t!("surveys.list.empty"));
        output.push('\n');
    }
    for survey in &loaded.surveys {
        output.push_str(&t!(
            "surveys.list.entry",
            name = survey.name().as_str(),
            kind = survey.survey_type().as_str(),
            coverage = survey.coverage()
        ));
        output.push('\n');
    }
    write_stdout_bytes(output.as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the client projections as a JSON array.
fn command_surveys_export(args: &ConfigArgs) -> CliResult<ExitCode> {
    let loaded = load_surveys(args)?;
    let projections: Vec<_> = loaded.surveys.iter().map(Survey::projection).collect();
    write_json(&projections)?;
    Ok(ExitCode::SUCCESS)
}

/// Prints every message key used by the enabled surveys.
fn command_surveys_messages(args: &ConfigArgs) -> CliResult<ExitCode> {
    let loaded = load_surveys(args)?;
    let keys: BTreeSet<String> = loaded.surveys.iter().flat_map(Survey::messages).collect();
    let mut output = String::new();
    for key in keys {
        output.push_str(&key);
        output.push('\n');
    }
    write_stdout_bytes(output.as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Select Command
// ============================================================================

/// Runs the selection for a viewer file and prints the outcome as JSON.
fn command_select(command: &SelectCommand) -> CliResult<ExitCode> {
    let loaded = load_surveys(&command.config)?;
    let document = read_viewer_document(&command.viewer, MAX_VIEWER_BYTES)
        .map_err(|err| viewer_error(&command.viewer, err))?;
    let store = InMemoryTokenStore::from_tokens(document.tokens);
    let mut rng = command.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let report = select_with_report(
        &loaded.surveys,
        &document.viewer,
        &store,
        command.force.as_deref(),
        &mut rng,
    );
    let output =
        SelectionOutput::new(&report, &document.viewer, &loaded.config.messages, store.snapshot());
    write_json(&output)?;
    Ok(ExitCode::SUCCESS)
}

/// Maps viewer input failures to localized messages.
fn viewer_error(path: &Path, err: InputError) -> CliError {
    let message = match err {
        InputError::Io(error) => t!("viewer.read_failed", path = path.display(), error = error),
        InputError::TooLarge {
            size,
            limit,
        } => t!("viewer.too_large", path = path.display(), size = size, limit = limit),
        InputError::Parse(error) => {
            t!("viewer.parse_failed", path = path.display(), error = error)
        }
    };
    CliError::new(message)
}

/// JSON shape printed by `select`.
#[derive(Debug, Serialize)]
struct SelectionOutput {
    /// Selection kind: `none`, `forced`, `embedded`, or `floating`.
    mode: &'static str,
    /// Selected surveys in display order.
    selected: Vec<SelectedSurvey>,
    /// Per-survey candidate checks; empty for forced selections.
    outcomes: Vec<OutcomeEntry>,
    /// Token store contents after selection.
    tokens: BTreeMap<String, String>,
}

/// A selected survey.
#[derive(Debug, Serialize)]
struct SelectedSurvey {
    /// Survey name.
    name: String,
    /// Survey type tag.
    #[serde(rename = "type")]
    kind: &'static str,
    /// Link the viewer would follow, for external surveys.
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

/// Outcome of one candidate check.
#[derive(Debug, Serialize)]
struct OutcomeEntry {
    /// Survey name.
    survey: String,
    /// Outcome label.
    outcome: &'static str,
    /// First audience filter that failed, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'static str>,
}

impl SelectionOutput {
    /// Builds the printable selection output.
    fn new(
        report: &SelectionReport<'_>,
        viewer: &ViewerContext,
        messages: &dyn MessageResolver,
        tokens: BTreeMap<String, String>,
    ) -> Self {
        let selected = report
            .selection
            .surveys()
            .into_iter()
            .map(|survey| SelectedSurvey {
                name: survey.name().as_str().to_string(),
                kind: survey.survey_type().as_str(),
                link: match survey {
                    Survey::External(external) => {
                        viewer_link(&external.question, viewer, Some(messages))
                            .map(|url| url.to_string())
                    }
                    Survey::Internal(_) => None,
                },
            })
            .collect();
        let outcomes = report
            .outcomes
            .iter()
            .map(|(survey, outcome)| OutcomeEntry {
                survey: survey.name().as_str().to_string(),
                outcome: outcome.as_str(),
                filter: match outcome {
                    CandidateOutcome::OutOfAudience(filter) => Some(filter.as_str()),
                    _ => None,
                },
            })
            .collect();
        Self {
            mode: selection_mode(&report.selection),
            selected,
            outcomes,
            tokens,
        }
    }
}

/// Returns the label of a selection kind.
const fn selection_mode(selection: &SurveySelection<'_>) -> &'static str {
    match selection {
        SurveySelection::None => "none",
        SurveySelection::Forced(_) => "forced",
        SurveySelection::Embedded(_) => "embedded",
        SurveySelection::Floating(_) => "floating",
    }
}

// ============================================================================
// SECTION: Locale
// ============================================================================

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a value to stdout as pretty JSON.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
