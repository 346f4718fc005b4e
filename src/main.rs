//! Command line front end for the adaptive quiz
//!
//! Plays questions from bank files in the terminal, recording every answer
//! in the player's persisted session, and prints statistics and history.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use quiz_elo::config::{validate_config, AppConfig};
use quiz_elo::questions::{QuestionBank, QuestionDeck};
use quiz_elo::utils::{format_delta, format_percentage};
use quiz_elo::{
    AdaptiveEloCalculator, FileStore, HistoryView, KeyValueStore, QuizSession, RatingEngine,
    SessionRepository,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

/// Quiz ELO - adaptive trivia quiz with rated questions
#[derive(Parser)]
#[command(
    name = "quiz-elo",
    version,
    about = "An adaptive trivia quiz that rates you against question difficulty",
    long_about = "Quiz ELO plays multiple-choice questions from JSON question banks and \
                  updates your rating after every answer with an ELO formula whose K factor \
                  shrinks as you gain experience. Rating, answer history and statistics are \
                  kept in a local state file."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// State file override
    #[arg(
        long,
        value_name = "FILE",
        global = true,
        help = "Override the state file path"
    )]
    state: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        global = true,
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(
        short,
        long,
        global = true,
        help = "Enable debug mode with verbose logging"
    )]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit")]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Answer questions interactively
    Play {
        /// Question bank files; several are combined into one bank
        #[arg(short, long = "bank", value_name = "FILE")]
        banks: Vec<PathBuf>,

        /// Label for the combined bank
        #[arg(long, value_name = "NAME")]
        label: Option<String>,

        /// Stop after this many questions
        #[arg(short, long, value_name = "N")]
        rounds: Option<u32>,

        /// Seed the shuffle for a reproducible question order
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },
    /// Show rating and statistics
    Stats,
    /// List answered questions
    History {
        /// Only show the most recent entries
        #[arg(short = 'n', long, value_name = "N")]
        limit: Option<usize>,
    },
    /// Delete the stored rating, history and statistics
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from file, environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(state) = &args.state {
        config.storage.state_path = state.clone();
    }

    validate_config(&config)?;
    Ok(config)
}

fn open_repository(config: &AppConfig) -> Result<SessionRepository<FileStore>> {
    let store = FileStore::open(&config.storage.state_path)?;
    Ok(SessionRepository::new(
        store,
        config.storage.state_keys(),
        config.rating.initial_rating,
    ))
}

/// Build the bank to play from the given files, or the configured ones.
///
/// Files that fail to load are skipped; when none loads, the built-in bank
/// is played instead.
fn load_bank(
    config: &AppConfig,
    banks: Vec<PathBuf>,
    label: Option<String>,
) -> Result<QuestionBank> {
    let paths = if banks.is_empty() {
        config.quiz.bank_paths.clone()
    } else {
        banks
    };
    if paths.is_empty() {
        bail!("No question banks given; pass --bank FILE or set quiz.bank_paths");
    }

    let mut loaded: Vec<QuestionBank> = paths
        .iter()
        .filter_map(|path| match QuestionBank::load(path) {
            Ok(bank) => Some(bank),
            Err(e) => {
                warn!("Skipping question bank {}: {:#}", path.display(), e);
                None
            }
        })
        .collect();

    if loaded.is_empty() {
        warn!("No question bank could be loaded, using the built-in questions");
        return Ok(QuestionBank::fallback());
    }
    if loaded.len() == 1 && label.is_none() {
        return Ok(loaded.remove(0));
    }
    let label = label.unwrap_or_else(|| config.quiz.general_label.clone());
    QuestionBank::combine(loaded, label)
}

/// Read one answer; Ok(None) means the player quit
fn read_choice<I, W>(lines: &mut I, out: &mut W, option_count: usize) -> Result<Option<usize>>
where
    I: Iterator<Item = io::Result<String>>,
    W: Write,
{
    loop {
        write!(out, "Answer [1-{}, q to quit]: ", option_count)?;
        out.flush()?;

        let Some(line) = lines.next() else {
            return Ok(None);
        };
        let line = line?;
        let input = line.trim();

        if input.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match input.parse::<usize>() {
            Ok(n) if (1..=option_count).contains(&n) => return Ok(Some(n - 1)),
            _ => writeln!(out, "Please enter a number between 1 and {}", option_count)?,
        }
    }
}

/// Play dealt questions until the round limit or the player quits, saving
/// after every rated answer. Returns the number of questions answered.
fn play<S, I, W>(
    repository: &SessionRepository<S>,
    engine: &RatingEngine,
    deck: &mut QuestionDeck,
    rounds: Option<u32>,
    lines: &mut I,
    out: &mut W,
) -> Result<u32>
where
    S: KeyValueStore,
    I: Iterator<Item = io::Result<String>>,
    W: Write,
{
    let mut session = repository.load();

    info!(
        "Playing '{}' ({} questions) at rating {}",
        deck.label(),
        deck.len(),
        session.rating()
    );
    writeln!(out, "{} - rating {}", deck.label(), session.rating())?;

    let mut asked = 0u32;

    while rounds.map_or(true, |limit| asked < limit) {
        let presented = deck.deal();

        writeln!(out)?;
        writeln!(
            out,
            "[{}] {} (rating {})",
            presented.question.category, presented.question.question, presented.question.rating
        )?;
        for (i, option) in presented.options.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, option)?;
        }

        let started = Instant::now();
        let Some(index) = read_choice(lines, out, presented.options.len())? else {
            break;
        };
        let is_correct = presented.is_correct(index).unwrap_or(false);
        let item = presented.question.answered_item(Some(started.elapsed()));

        if is_correct {
            writeln!(out, "Correct!")?;
        } else {
            writeln!(out, "Wrong - the answer was {}", presented.question.answer)?;
        }

        match engine.record_answer(&mut session, &item, is_correct) {
            Ok(entry) => {
                writeln!(
                    out,
                    "Rating {} ({})  streak {}",
                    entry.rating,
                    format_delta(entry.delta),
                    session.streak()
                )?;
                if let Err(e) = repository.save(&session) {
                    error!("Failed to save quiz state: {}", e);
                }
            }
            Err(e) => warn!("Skipping rating update for this answer: {}", e),
        }

        asked += 1;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Answered {} question(s); rating {} ({} overall)",
        asked,
        session.rating(),
        format_delta(HistoryView::net_change(&session.statistics, session.rating()))
    )?;
    Ok(asked)
}

fn print_stats<W: Write>(session: &QuizSession, out: &mut W) -> io::Result<()> {
    let stats = &session.statistics;

    writeln!(out, "Current rating:  {}", session.rating())?;
    writeln!(out, "Starting rating: {}", stats.starting_rating)?;
    writeln!(
        out,
        "Net change:      {}",
        format_delta(HistoryView::net_change(stats, session.rating()))
    )?;
    writeln!(
        out,
        "Answered:        {} ({} correct, {} wrong)",
        stats.total_questions,
        stats.correct_answers,
        stats.incorrect_answers()
    )?;
    if let Some(accuracy) = stats.accuracy() {
        writeln!(out, "Accuracy:        {}", format_percentage(accuracy))?;
    }
    if stats.timed_answers > 0 {
        writeln!(
            out,
            "Avg. response:   {:.1}s",
            stats.average_response_time / 1000.0
        )?;
    }
    writeln!(out, "Sessions:        {}", stats.session_count)?;

    match HistoryView::summarize(&session.history) {
        Some(summary) => writeln!(
            out,
            "History:         {} entries, highest {}, lowest {}, average {}",
            summary.count, summary.highest, summary.lowest, summary.average
        )?,
        None => writeln!(out, "History:         no questions answered yet")?,
    }

    let categories = HistoryView::category_accuracy(stats);
    if !categories.is_empty() {
        writeln!(out)?;
        writeln!(out, "{:<24} {:>8} {:>8}", "Category", "Answered", "Accuracy")?;
        for (name, accuracy) in categories {
            let perf = &stats.category_performance[name];
            writeln!(
                out,
                "{:<24} {:>8} {:>8}",
                name,
                perf.total,
                format_percentage(accuracy)
            )?;
        }
    }
    Ok(())
}

fn print_history(session: &QuizSession, limit: Option<usize>) {
    let entries = match limit {
        Some(n) => HistoryView::recent(&session.history, n),
        None => &session.history[..],
    };
    if entries.is_empty() {
        println!("No questions answered yet");
        return;
    }

    for entry in HistoryView::chronological(entries) {
        println!(
            "#{:<5} {:<7} {:>5} -> {:<5} [{}] {} (rating {})",
            entry.question_number,
            if entry.is_correct { "correct" } else { "wrong" },
            format_delta(entry.delta),
            entry.rating,
            entry.category,
            entry.item_text,
            entry.item_rating
        );
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        info!("   State file: {}", config.storage.state_path.display());
        info!("   Key prefix: {}", config.storage.key_prefix);
        info!("   Initial rating: {}", config.rating.initial_rating);
        info!("   Base K factor: {}", config.rating.k_factor.base);
        return Ok(());
    }

    let repository = open_repository(&config)?;

    match args.command.unwrap_or(Command::Stats) {
        Command::Play {
            banks,
            label,
            rounds,
            seed,
        } => {
            let engine = RatingEngine::new(AdaptiveEloCalculator::new(config.rating.clone())?);
            let bank = load_bank(&config, banks, label)?;
            let mut deck = match seed {
                Some(seed) => QuestionDeck::with_seed(bank, seed),
                None => QuestionDeck::new(bank),
            };
            info!("Playing as {}", config.service.name);

            let stdin = io::stdin();
            let mut lines = stdin.lock().lines();
            play(
                &repository,
                &engine,
                &mut deck,
                rounds,
                &mut lines,
                &mut io::stdout(),
            )?;
        }
        Command::Stats => print_stats(&repository.load(), &mut io::stdout())?,
        Command::History { limit } => print_history(&repository.load(), limit),
        Command::Reset { yes } => {
            if !yes {
                bail!("Refusing to delete quiz state without --yes");
            }
            if repository.clear()? {
                info!(
                    "Removed quiz state from {}",
                    config.storage.state_path.display()
                );
            } else {
                info!("No quiz state to remove");
            }
        }
    }

    Ok(())
}
