/*!
# mindwell

Command-line front end: log moods, keep a journal, take the stress quiz and
chat with a wellness companion backed by a local Ollama model.

## Usage

```text
mindwell [--user <ID>] [-v] [--log-format text|json] <COMMAND>

Commands:
  journal    add | list | summarize <id> | sentiment <id> | tips <id>
  mood       log <mood> | list | analyze
  chat       Talk with the wellness companion
  stress     advice <1-5> | quiz --sleep --workload --mood --relaxation
  quote      Show an inspirational quote
  dashboard  Latest entry and mood, a wellness tip and a quote
  exercise   breathe [--cycles N] | mindfulness | gratitude
```

Configuration comes from `MINDWELL_*` environment variables (see `Config`).
Logs are written to stderr; results go to stdout.
*/

use chrono::Local;
use clap::Parser;
use mindwell::ai::{FlowInvoker, OllamaClient};
use mindwell::cli::{
    CliArgs, Command, ExerciseCommand, JournalCommand, LogFormat, MoodCommand, StressCommand,
};
use mindwell::config::Config;
use mindwell::constants::{
    DEFAULT_LOG_LEVEL, MOOD_ANALYSIS_FALLBACK, SENTIMENT_FALLBACK, STRESS_FALLBACK_ADVICE,
    SUMMARY_FALLBACK, TIPS_FALLBACK, TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME,
};
use mindwell::db::{open_store, WellnessStore};
use mindwell::errors::{AppError, AppResult};
use mindwell::models::{NewJournalEntry, NewMoodLog};
use mindwell::ops::{self, ChatSession};
use mindwell::stress::{get_stress_advice, get_stress_advice_from_quiz, StressLevel};
use std::io;
use std::sync::Arc;
use tracing::{debug, error, info, warn, Instrument};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_tracing(args.verbose, args.log_format);

    let span = tracing::info_span!(
        TRACING_ROOT_SPAN_NAME,
        service = TRACING_SERVICE_NAME,
        correlation_id = %Uuid::new_v4(),
    );

    if let Err(e) = run(args).instrument(span).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn run(args: CliArgs) -> AppResult<()> {
    debug!("CLI arguments: {:?}", args);

    let config = Config::load()?;
    debug!("Configuration: {:?}", config);

    let store = open_store(&config)?;
    let client = OllamaClient::new(&config.ollama_url, &config.model, config.timeout)?;
    let invoker = FlowInvoker::with_builtin_catalog(Arc::new(client))?;
    info!(user = %args.user, model = %config.model, "Starting mindwell");

    let user = args.user.as_str();
    match args.command {
        Command::Journal(command) => journal(&store, &invoker, user, command).await,
        Command::Mood(command) => mood(&store, &invoker, user, command).await,
        Command::Chat { session } => {
            let session_id = session.unwrap_or_else(|| user.to_string());
            let chat =
                ChatSession::open(store, invoker, session_id, config.history_limit).await?;
            let mut stdout = io::stdout();
            chat.converse(io::stdin().lock(), &mut stdout).await
        }
        Command::Stress(StressCommand::Advice { level }) => {
            let level = StressLevel::new(i64::from(level))?;
            match get_stress_advice(&invoker, level).await {
                Ok(advice) => {
                    println!("Stress level {} ({})", advice.level, advice.tier);
                    println!("{}", advice.advice);
                }
                Err(e) => {
                    warn!(error = %e, "Stress advice failed, using fallback");
                    println!("Stress level {} ({})", level, level.tier());
                    println!("{}", STRESS_FALLBACK_ADVICE);
                }
            }
            Ok(())
        }
        Command::Stress(StressCommand::Quiz(quiz)) => {
            let scoring = quiz.scoring.unwrap_or(config.quiz_scoring);
            let result = get_stress_advice_from_quiz(&invoker, &quiz.answers(), scoring).await;
            println!("Stress level {} ({})", result.level, result.tier);
            println!("{}", result.justification);
            println!();
            println!("{}", result.advice);
            println!();
            println!("(scored by: {})", result.source);
            Ok(())
        }
        Command::Quote { theme } => {
            let quote = ops::quote_of_the_day(&invoker, &theme).await;
            println!("\"{}\"\n  - {}", quote.quote, quote.author);
            Ok(())
        }
        Command::Dashboard { theme } => {
            let dashboard = ops::load_dashboard(&store, &invoker, user, &theme).await?;
            match &dashboard.latest_entry {
                Some(entry) => println!(
                    "Latest entry: {} ({})",
                    entry.title,
                    entry.created_at.format("%Y-%m-%d %H:%M")
                ),
                None => println!("Latest entry: none yet"),
            }
            match &dashboard.latest_mood {
                Some(log) => println!("Latest mood: {} on {}", log.mood, log.date),
                None => println!("Latest mood: none yet"),
            }
            println!("\nTip: {}", dashboard.tip);
            println!("\n\"{}\"\n  - {}", dashboard.quote.quote, dashboard.quote.author);
            Ok(())
        }
        Command::Exercise(ExerciseCommand::Breathe { cycles }) => {
            ops::run_breathing(cycles, &mut io::stdout()).await
        }
        Command::Exercise(ExerciseCommand::Mindfulness) => {
            println!("{}", ops::mindfulness_tip(Local::now().date_naive()));
            Ok(())
        }
        Command::Exercise(ExerciseCommand::Gratitude) => {
            println!("{}", ops::gratitude_prompt(Local::now().date_naive()));
            Ok(())
        }
    }
}

async fn journal(
    store: &Arc<dyn WellnessStore>,
    invoker: &FlowInvoker,
    user: &str,
    command: JournalCommand,
) -> AppResult<()> {
    match command {
        JournalCommand::Add { title, content } => {
            let entry = ops::add_entry(store, user, NewJournalEntry { title, content }).await?;
            println!("Saved entry {}", entry.id);
        }
        JournalCommand::List { limit } => {
            let entries = ops::list_entries(store, user, limit).await?;
            if entries.is_empty() {
                println!("No journal entries yet.");
            }
            for entry in entries {
                let sentiment = entry
                    .sentiment
                    .map(|s| format!(" [{} {:.2}]", s.sentiment, s.score))
                    .unwrap_or_default();
                println!(
                    "{}  {}  {}{}",
                    entry.id,
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.title,
                    sentiment
                );
            }
        }
        JournalCommand::Summarize { id } => {
            let summary = ops::summarize_entry(store, invoker, user, &id).await;
            if let Some(summary) = or_fallback(summary, SUMMARY_FALLBACK)? {
                println!("{}", summary);
            }
        }
        JournalCommand::Sentiment { id } => {
            let sentiment = ops::detect_entry_sentiment(store, invoker, user, &id).await;
            if let Some(sentiment) = or_fallback(sentiment, SENTIMENT_FALLBACK)? {
                println!("{} ({:.2})", sentiment.sentiment, sentiment.score);
            }
        }
        JournalCommand::Tips { id } => {
            let tips = ops::tips_for_entry(store, invoker, user, &id).await;
            if let Some(tips) = or_fallback(tips, TIPS_FALLBACK)? {
                println!("{}", tips);
            }
        }
    }
    Ok(())
}

async fn mood(
    store: &Arc<dyn WellnessStore>,
    invoker: &FlowInvoker,
    user: &str,
    command: MoodCommand,
) -> AppResult<()> {
    match command {
        MoodCommand::Log { mood, notes } => {
            let log = ops::log_mood(store, user, NewMoodLog { mood, notes }).await?;
            println!("Logged {} for {}", log.mood, log.date);
        }
        MoodCommand::List { limit } => {
            let logs = ops::list_moods(store, user, limit).await?;
            if logs.is_empty() {
                println!("No moods logged yet.");
            }
            for log in logs {
                match log.notes {
                    Some(notes) => println!("{}  {:<8} {}", log.date, log.mood.as_str(), notes),
                    None => println!("{}  {}", log.date, log.mood),
                }
            }
        }
        MoodCommand::Analyze => {
            let analysis = ops::analyze_patterns(store, invoker, user).await;
            if let Some(analysis) = or_fallback(analysis, MOOD_ANALYSIS_FALLBACK)? {
                println!("{}", analysis);
            }
        }
    }
    Ok(())
}

/// Prints `fallback` in place of a failed flow. Other errors still fail the
/// command.
fn or_fallback<T>(result: AppResult<T>, fallback: &str) -> AppResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AppError::Flow(e)) => {
            warn!(error = %e, "Flow failed, using fallback");
            println!("{}", fallback);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
