// Command-line surface: argument parsing, one-shot commands, and the
// interactive `browse` walk through the flow.
//
// Output goes to a caller-supplied writer and input comes from any
// `AsyncBufRead`, so the whole surface can be driven from tests.

use std::io::Write;

use anyhow::Context;
use artweave_client::{ApiError, ErrorKind};
use artweave_core::config::{Config, BASE_URL_ENV, CONFIG_FILE};
use artweave_core::model::{CompareResponse, Painting, SetSummary};
use artweave_core::session::{Selection, Toggle};
use clap::{Parser, Subcommand};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::flow::{Flow, Outcome, Route};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "artweave", version, about = "Compare paintings with ArtWeave")]
pub struct Cli {
    /// Per-request timeout in milliseconds (overrides config and env).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List the available painting sets.
    Sets,
    /// List the paintings in a set.
    Paintings { set_id: String },
    /// Compare two paintings by id.
    Compare {
        painting_a_id: String,
        painting_b_id: String,
    },
    /// Check that the API is reachable.
    Health,
    /// Walk through set choice, painting selection, and comparison.
    Browse,
}

/// Exit status for configuration and usage problems.
pub const EXIT_USAGE: u8 = 2;

/// Exit status for failed API calls and output errors.
pub const EXIT_FAILURE: u8 = 1;

/// Fold command-line overrides into `config` and refuse configurations that
/// cannot serve a single request.
pub fn prepare_config(args: &Cli, config: &mut Config) -> Result<(), CommandError> {
    if let Some(ms) = args.timeout_ms {
        if ms == 0 {
            return Err(CommandError::Usage(
                "--timeout-ms must be greater than 0".into(),
            ));
        }
        config.api.timeout_ms = ms;
    }
    if config.api.base_url.is_none() {
        return Err(CommandError::Usage(format!(
            "Missing API base URL. Set {BASE_URL_ENV} or add `base_url` under [api] in config/{CONFIG_FILE}."
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// One-shot commands
// ---------------------------------------------------------------------------

/// Run a single non-interactive command. API failures are returned as-is so
/// the caller can pick an exit status.
pub async fn run_command<W: Write>(
    command: &Command,
    flow: &mut Flow<'_>,
    out: &mut W,
) -> Result<(), CommandError> {
    match command {
        Command::Sets => {
            let sets = flow.load_sets().await?;
            render_sets(&sets, out)?;
        }
        Command::Paintings { set_id } => {
            flow.choose_set(set_id);
            if let Outcome::Ready(paintings) = flow.load_paintings().await? {
                render_paintings(flow, &paintings, &Selection::new(), out)?;
            }
        }
        Command::Compare {
            painting_a_id,
            painting_b_id,
        } => {
            if painting_a_id == painting_b_id {
                return Err(CommandError::Usage(
                    "choose two different paintings to compare".into(),
                ));
            }
            flow.clear_selection();
            flow.toggle_painting(painting_a_id)?;
            flow.toggle_painting(painting_b_id)?;
            if let Outcome::Ready(result) = flow.compare().await? {
                render_comparison(&result, out)?;
            }
        }
        Command::Health => {
            let health = flow.client().health().await?;
            writeln!(out, "API {}", if health.ok { "ok" } else { "unhealthy" })?;
        }
        Command::Browse => {
            return Err(CommandError::Usage("browse is interactive; use run_browse".into()));
        }
    }
    Ok(())
}

/// Failure of a one-shot command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{}", api_message(.0))]
    Api(#[from] ApiError),
    #[error("{0}")]
    Usage(String),
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandError::Usage(_) => EXIT_USAGE,
            CommandError::Api(e) if e.kind() == ErrorKind::Config => EXIT_USAGE,
            CommandError::Api(_) | CommandError::Io(_) => EXIT_FAILURE,
        }
    }
}

fn api_message(err: &ApiError) -> String {
    err.user_message()
}

// ---------------------------------------------------------------------------
// Interactive walk
// ---------------------------------------------------------------------------

/// Drive the flow from `input` until the user quits or input ends.
pub async fn run_browse<R, W>(flow: &mut Flow<'_>, input: R, out: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        match flow.route() {
            Route::Landing => {
                writeln!(out, "Welcome to ArtWeave.")?;
                writeln!(
                    out,
                    "Explore quick comparisons between artworks and discover concise, curated summaries."
                )?;
                flow.navigate(Route::Tutorial);
            }
            Route::Tutorial => {
                writeln!(out, "1. Choose a painting set.")?;
                writeln!(out, "2. Pick exactly two paintings.")?;
                writeln!(out, "3. Read the generated comparison.")?;
                flow.navigate(Route::Sets);
            }
            Route::Sets => {
                let sets = match flow.load_sets().await {
                    Ok(sets) => sets,
                    Err(e) => {
                        if !offer_retry(&e, &mut lines, flow, out).await? {
                            return Ok(());
                        }
                        continue;
                    }
                };
                writeln!(out, "Choose the painting set")?;
                render_sets(&sets, out)?;
                let Some(answer) = prompt(&mut lines, out, "set number or id, b back, q quit").await? else {
                    return Ok(());
                };
                match answer.as_str() {
                    "q" => return Ok(()),
                    "b" => {
                        flow.back();
                    }
                    other => match pick_set(&sets, other) {
                        Some(set) => {
                            flow.choose_set(&set.set_id);
                        }
                        None => writeln!(out, "No set matches `{other}`.")?,
                    },
                }
            }
            Route::Paintings => {
                let paintings = match flow.load_paintings().await {
                    Ok(Outcome::Ready(paintings)) => paintings,
                    Ok(Outcome::Redirect(_)) => continue,
                    Err(e) => {
                        if !offer_retry(&e, &mut lines, flow, out).await? {
                            return Ok(());
                        }
                        continue;
                    }
                };
                let selection = flow.session().selection();
                render_paintings(flow, &paintings, &selection, out)?;
                let Some(answer) =
                    prompt(&mut lines, out, "painting number to toggle, c compare, b back, q quit").await?
                else {
                    return Ok(());
                };
                match answer.as_str() {
                    "q" => return Ok(()),
                    "b" => {
                        flow.back();
                    }
                    "c" => flow.navigate(Route::Result),
                    other => match pick_painting(&paintings, other) {
                        Some(painting) => match flow.toggle_painting(&painting.id)? {
                            Toggle::Full => writeln!(
                                out,
                                "Two paintings are already selected. Deselect one first."
                            )?,
                            Toggle::Added | Toggle::Removed => {}
                        },
                        None => writeln!(out, "No painting matches `{other}`.")?,
                    },
                }
            }
            Route::Result => {
                writeln!(out, "Generating summary...")?;
                match flow.compare().await {
                    Ok(Outcome::Ready(result)) => {
                        render_comparison(&result, out)?;
                        let Some(answer) = prompt(&mut lines, out, "b back, s new set, q quit").await?
                        else {
                            return Ok(());
                        };
                        match answer.as_str() {
                            "b" => {
                                flow.back();
                            }
                            "s" => flow.navigate(Route::Sets),
                            _ => return Ok(()),
                        }
                    }
                    Ok(Outcome::Redirect(_)) => {
                        writeln!(out, "Select exactly two paintings to compare.")?;
                    }
                    Err(e) => {
                        if !offer_retry(&e, &mut lines, flow, out).await? {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

/// Show `err` and ask whether to retry. `r` retries the current step, `b`
/// goes back; anything else (or end of input) ends the session.
async fn offer_retry<R, W>(
    err: &ApiError,
    lines: &mut Lines<R>,
    flow: &mut Flow<'_>,
    out: &mut W,
) -> anyhow::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{}", err.user_message())?;
    let Some(answer) = prompt(lines, out, "r try again, b back, q quit").await? else {
        return Ok(false);
    };
    match answer.as_str() {
        "r" => Ok(true),
        "b" => {
            flow.back();
            Ok(true)
        }
        _ => Ok(false),
    }
}

async fn prompt<R, W>(lines: &mut Lines<R>, out: &mut W, hint: &str) -> anyhow::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "[{hint}] > ")?;
    out.flush()?;
    let line = lines.next_line().await.context("failed to read input")?;
    Ok(line.map(|l| l.trim().to_string()))
}

/// Match by 1-based position or by id.
fn pick_set<'a>(sets: &'a [SetSummary], answer: &str) -> Option<&'a SetSummary> {
    answer
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| sets.get(i))
        .or_else(|| sets.iter().find(|s| s.set_id == answer))
}

/// Match by 1-based position or by id.
fn pick_painting<'a>(paintings: &'a [Painting], answer: &str) -> Option<&'a Painting> {
    answer
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| paintings.get(i))
        .or_else(|| paintings.iter().find(|p| p.id == answer))
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render_sets<W: Write>(sets: &[SetSummary], out: &mut W) -> std::io::Result<()> {
    if sets.is_empty() {
        return writeln!(out, "No painting sets are available.");
    }
    for (i, set) in sets.iter().enumerate() {
        writeln!(out, "{:>2}. {} ({} paintings) [{}]", i + 1, set.label, set.count, set.set_id)?;
    }
    Ok(())
}

pub fn render_paintings<W: Write>(
    flow: &Flow<'_>,
    paintings: &[Painting],
    selection: &Selection,
    out: &mut W,
) -> std::io::Result<()> {
    if paintings.is_empty() {
        return writeln!(out, "This set has no paintings.");
    }
    for (i, painting) in paintings.iter().enumerate() {
        let mark = if selection.contains(&painting.id) { "*" } else { " " };
        writeln!(
            out,
            "{mark}{:>2}. {} - {} ({})",
            i + 1,
            painting.title,
            painting.artist,
            painting.year_label()
        )?;
        if let Some(url) = flow.image_url(painting) {
            writeln!(out, "     {url}")?;
        }
    }
    writeln!(out, "{} of {} selected", selection.len(), Selection::CAPACITY)
}

pub fn render_comparison<W: Write>(result: &CompareResponse, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Comparison Summary")?;
    if let Some(overview) = &result.overview {
        writeln!(out, "A: {}", overview.artwork_a.alt_text())?;
        writeln!(out, "B: {}", overview.artwork_b.alt_text())?;
    }
    writeln!(out)?;
    writeln!(out, "{}", result.summary)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use artweave_core::config::DEFAULT_TIMEOUT_MS;

    fn sets() -> Vec<SetSummary> {
        vec![
            SetSummary {
                set_id: "A".into(),
                label: "Set A".into(),
                count: 12,
            },
            SetSummary {
                set_id: "B".into(),
                label: "Set B".into(),
                count: 9,
            },
        ]
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::parse_from(["artweave", "compare", "1", "2", "--timeout-ms", "500"]);
        assert_eq!(cli.timeout_ms, Some(500));
        assert_eq!(
            cli.command,
            Some(Command::Compare {
                painting_a_id: "1".into(),
                painting_b_id: "2".into(),
            })
        );

        let cli = Cli::parse_from(["artweave"]);
        assert!(cli.command.is_none());
    }

    fn configured() -> Config {
        let mut config = Config::default();
        config.api.base_url = Some("http://localhost:8000".into());
        config
    }

    #[test]
    fn prepare_config_applies_timeout_override() {
        let mut config = configured();
        let args = Cli::parse_from(["artweave", "sets", "--timeout-ms", "250"]);
        prepare_config(&args, &mut config).unwrap();
        assert_eq!(config.api.timeout_ms, 250);
    }

    #[test]
    fn prepare_config_rejects_zero_timeout() {
        let mut config = configured();
        let args = Cli::parse_from(["artweave", "--timeout-ms", "0"]);
        let err = prepare_config(&args, &mut config).unwrap_err();
        assert!(matches!(err, CommandError::Usage(_)));
        assert_eq!(err.exit_code(), EXIT_USAGE);
        assert!(err.to_string().contains("--timeout-ms"));
        assert_eq!(config.api.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn prepare_config_requires_base_url() {
        let mut config = Config::default();
        let args = Cli::parse_from(["artweave", "sets"]);
        let err = prepare_config(&args, &mut config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let message = err.to_string();
        assert!(message.contains("ARTWEAVE_API_BASE_URL"), "{message}");
        assert!(message.contains("artweave.toml"), "{message}");
    }

    #[test]
    fn exit_codes_separate_usage_from_api_failures() {
        assert_eq!(CommandError::Api(ApiError::MissingBaseUrl).exit_code(), EXIT_USAGE);
        let timeout = ApiError::Timeout(std::time::Duration::from_millis(10));
        assert_eq!(CommandError::Api(timeout).exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn pick_set_by_position_or_id() {
        let sets = sets();
        assert_eq!(pick_set(&sets, "2").map(|s| s.set_id.as_str()), Some("B"));
        assert_eq!(pick_set(&sets, "A").map(|s| s.set_id.as_str()), Some("A"));
        assert!(pick_set(&sets, "0").is_none());
        assert!(pick_set(&sets, "3").is_none());
        assert!(pick_set(&sets, "Z").is_none());
    }

    #[test]
    fn render_sets_lists_labels_and_counts() {
        let mut out = Vec::new();
        render_sets(&sets(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(" 1. Set A (12 paintings) [A]"));
        assert!(text.contains(" 2. Set B (9 paintings) [B]"));
    }

    #[test]
    fn render_empty_sets() {
        let mut out = Vec::new();
        render_sets(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No painting sets are available.\n");
    }

    #[test]
    fn command_error_shows_user_message() {
        let err = CommandError::from(ApiError::Http {
            status: 404,
            message: "Set not found".into(),
        });
        assert_eq!(err.to_string(), "Set not found");
    }
}
