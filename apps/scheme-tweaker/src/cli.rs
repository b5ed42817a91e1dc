use anyhow::{bail, Context as _, Result};
use clap::{Args, Parser, Subcommand};
use scheme_tweak::{
    from_legacy, Adjustment, ColorScheme, Context, Direction, FilterKind, SchemeFormat, TweakError,
    TweakSession, TweakSettings, CURRENT_EXTENSION,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::state::TweakState;

#[derive(Debug, Parser)]
#[command(
    name = "scheme-tweaker",
    about = "Apply color filters to editor color schemes",
    version
)]
pub struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Tweak state file (defaults to the user data directory)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Filter a scheme once and print or write the result.
    Apply(ApplyArgs),

    /// Begin a tweak session on a scheme.
    Start(StartArgs),

    /// Apply a filter chain to the session's working scheme.
    Tweak {
        /// Filter chain, e.g. "brightness(1.1);hue(10)@fg"
        filters: String,
    },

    /// Nudge one filter by its configured step.
    Adjust(AdjustArgs),

    /// Revert the last applied filter.
    Undo,

    /// Re-apply the last reverted filter.
    Redo,

    /// Drop every filter and restore the original scheme.
    Clear,

    /// Forget undo/redo history, keeping the working scheme as the new base.
    #[command(name = "clear-history")]
    ClearHistory,

    /// Show the current session.
    Status,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Scheme file to read
    pub scheme: PathBuf,

    /// Filter chain
    pub filters: String,

    /// Output format: current or legacy (defaults to the input's format)
    #[arg(long)]
    pub format: Option<SchemeFormat>,

    /// Write here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Scheme file to tweak
    pub scheme: PathBuf,

    /// Where the tweaked scheme is written; the extension picks the format
    #[arg(long)]
    pub working: PathBuf,
}

#[derive(Debug, Args)]
pub struct AdjustArgs {
    /// Filter to adjust
    pub kind: FilterKind,

    /// + or -
    #[arg(long, default_value = "+", allow_hyphen_values = true)]
    pub direction: Direction,

    /// Step size (defaults to the configured step)
    #[arg(long, allow_hyphen_values = true)]
    pub step: Option<f64>,

    /// Limit to foreground (fg) or background (bg)
    #[arg(long)]
    pub context: Option<Context>,
}

/// Load settings from `--config` or the default location.
pub fn load_settings(path: Option<&Path>) -> Result<TweakSettings> {
    let settings = match path {
        Some(path) => TweakSettings::load(path)
            .with_context(|| format!("failed to load settings {}", path.display()))?,
        None => TweakSettings::load_default().context("failed to load settings")?,
    };
    Ok(settings)
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli, settings: &TweakSettings) -> Result<()> {
    match cli.command {
        Commands::Apply(args) => run_apply(args),
        Commands::Start(args) => run_start(&state_path(cli.state)?, args),
        Commands::Tweak { filters } => run_tweak(&state_path(cli.state)?, &filters),
        Commands::Adjust(args) => run_adjust(&state_path(cli.state)?, args, settings),
        Commands::Undo => run_undo(&state_path(cli.state)?),
        Commands::Redo => run_redo(&state_path(cli.state)?),
        Commands::Clear => run_clear(&state_path(cli.state)?),
        Commands::ClearHistory => run_clear_history(&state_path(cli.state)?),
        Commands::Status => run_status(&state_path(cli.state)?),
    }
}

fn state_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => TweakState::default_path().context("no data directory for tweak state"),
    }
}

/// Read a scheme file in either format, reporting which one it was.
fn load_scheme(path: &Path) -> Result<(ColorScheme, SchemeFormat)> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;

    let is_legacy = value.get("settings").is_some_and(Value::is_array) && value.get("rules").is_none();
    let (scheme, format) = if is_legacy {
        (from_legacy(&value, true), SchemeFormat::Legacy)
    } else {
        (ColorScheme::from_value(value), SchemeFormat::Current)
    };
    let scheme = scheme.with_context(|| format!("invalid scheme {}", path.display()))?;
    Ok((scheme, format))
}

fn render(scheme: &ColorScheme, format: SchemeFormat) -> Result<String> {
    let value = format.render(scheme)?;
    let mut text = serde_json::to_string_pretty(&value)?;
    text.push('\n');
    Ok(text)
}

/// Write a scheme, in the format its file name implies.
fn write_scheme(path: &Path, scheme: &ColorScheme) -> Result<()> {
    let text = render(scheme, SchemeFormat::from_path(path))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

fn run_apply(args: ApplyArgs) -> Result<()> {
    let (mut scheme, detected) = load_scheme(&args.scheme)?;
    let applied = scheme_tweak::tweak(&mut scheme, &args.filters);
    if applied.is_empty() {
        warn!(filters = %args.filters, "no valid filters");
    } else {
        info!(filters = %applied.join(";"), "applied filters");
    }

    let text = render(&scheme, args.format.unwrap_or(detected))?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn run_start(state_path: &Path, args: StartArgs) -> Result<()> {
    let (original, _) = load_scheme(&args.scheme)?;
    write_scheme(&args.working, &original)?;

    let state = TweakState::new(args.scheme, args.working);
    state.save(state_path)?;
    println!("Tweaking {} -> {}", state.original.display(), state.working.display());
    Ok(())
}

fn open_session(state: &TweakState) -> Result<TweakSession> {
    let (original, _) = load_scheme(&state.original)?;
    Ok(TweakSession::with_history(original, state.history()))
}

fn save_session(state_path: &Path, mut state: TweakState, session: &TweakSession) -> Result<()> {
    write_scheme(&state.working, session.working())?;
    state.set_history(session.history());
    state.save(state_path)
}

fn apply_filters(state_path: &Path, filters: &str) -> Result<()> {
    let state = TweakState::load(state_path)?;
    let mut session = open_session(&state)?;
    let applied = session.run(filters);
    if applied.is_empty() {
        warn!(filters, "no valid filters");
        return Ok(());
    }
    save_session(state_path, state, &session)?;
    println!("Applied {}", applied.join(";"));
    Ok(())
}

fn run_tweak(state_path: &Path, filters: &str) -> Result<()> {
    apply_filters(state_path, filters)
}

fn run_adjust(state_path: &Path, args: AdjustArgs, settings: &TweakSettings) -> Result<()> {
    let mut adjustment = Adjustment::new(args.kind)
        .direction(args.direction)
        .context(args.context.unwrap_or_default());
    if let Some(step) = args.step {
        adjustment = adjustment.step(step);
    }

    let Some(filter) = adjustment.to_filter(settings) else {
        bail!("{} adjustment is out of range", args.kind);
    };
    apply_filters(state_path, &filter.token())
}

fn run_undo(state_path: &Path) -> Result<()> {
    let state = TweakState::load(state_path)?;
    let mut session = open_session(&state)?;
    match session.undo() {
        Ok(token) => {
            save_session(state_path, state, &session)?;
            println!("Undid {}", token);
        }
        Err(TweakError::NothingToUndo) => println!("Nothing to undo"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn run_redo(state_path: &Path) -> Result<()> {
    let state = TweakState::load(state_path)?;
    let mut session = open_session(&state)?;
    match session.redo() {
        Ok(token) => {
            save_session(state_path, state, &session)?;
            println!("Redid {}", token);
        }
        Err(TweakError::NothingToRedo) => println!("Nothing to redo"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn run_clear(state_path: &Path) -> Result<()> {
    let state = TweakState::load(state_path)?;
    let mut session = open_session(&state)?;
    session.clear();
    save_session(state_path, state, &session)?;
    println!("Cleared all filters");
    Ok(())
}

/// Where the rebased original is kept once history is cleared.
fn base_path(state_path: &Path) -> PathBuf {
    state_path.with_file_name(format!("tweak-base.{}", CURRENT_EXTENSION))
}

fn run_clear_history(state_path: &Path) -> Result<()> {
    let mut state = TweakState::load(state_path)?;
    let mut session = open_session(&state)?;
    session.clear_history();

    let base = base_path(state_path);
    write_scheme(&base, session.original())?;
    state.original = base;
    save_session(state_path, state, &session)?;
    println!("Cleared history");
    Ok(())
}

fn run_status(state_path: &Path) -> Result<()> {
    let state = TweakState::load(state_path)?;
    println!("original: {}", state.original.display());
    println!("working:  {}", state.working.display());
    println!("applied:  {}", state.undo);
    println!("undone:   {}", state.redo);
    Ok(())
}
