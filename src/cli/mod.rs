//! Command-line interface.
//!
//! Global flags select the user and logging; each subcommand maps onto one
//! operation in `ops` or `stress`.

use crate::constants::{
    APP_DESCRIPTION, APP_NAME, DEFAULT_BREATHING_CYCLES, DEFAULT_QUOTE_THEME, DEFAULT_USER_ID,
    MAX_BREATHING_CYCLES,
};
use crate::models::Mood;
use crate::stress::{MoodFrequency, QuizAnswers, QuizScoring, RelaxationTime, SleepQuality, Workload};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION)]
#[command(author, version, long_about = None)]
pub struct CliArgs {
    /// User whose journal and moods are used
    #[arg(long, global = true, default_value = DEFAULT_USER_ID)]
    pub user: String,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write and review journal entries
    #[command(subcommand)]
    Journal(JournalCommand),

    /// Log and review moods
    #[command(subcommand)]
    Mood(MoodCommand),

    /// Talk with the wellness companion
    Chat {
        /// Session to continue (defaults to the user id)
        #[arg(long)]
        session: Option<String>,
    },

    /// Stress advice and the stress quiz
    #[command(subcommand)]
    Stress(StressCommand),

    /// Show an inspirational quote
    Quote {
        #[arg(long, default_value = DEFAULT_QUOTE_THEME)]
        theme: String,
    },

    /// Latest entry and mood, a wellness tip and a quote
    Dashboard {
        /// Theme for the quote
        #[arg(long, default_value = DEFAULT_QUOTE_THEME)]
        theme: String,
    },

    /// Guided breathing, mindfulness and gratitude exercises
    #[command(subcommand)]
    Exercise(ExerciseCommand),
}

#[derive(Subcommand, Debug)]
pub enum ExerciseCommand {
    /// Paced breathing: in for 4s, hold for 2s, out for 6s
    Breathe {
        #[arg(
            long,
            default_value_t = DEFAULT_BREATHING_CYCLES,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_BREATHING_CYCLES)),
        )]
        cycles: u32,
    },
    /// Today's mindfulness tip
    Mindfulness,
    /// Today's gratitude prompt
    Gratitude,
}

#[derive(Subcommand, Debug)]
pub enum JournalCommand {
    /// Add an entry
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// List recent entries
    List {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Summarize an entry
    Summarize { id: String },
    /// Detect and save the sentiment of an entry
    Sentiment { id: String },
    /// Wellness tips based on an entry and recent moods
    Tips { id: String },
}

#[derive(Subcommand, Debug)]
pub enum MoodCommand {
    /// Log today's mood (awful, bad, neutral, good, great)
    Log {
        mood: Mood,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List recent mood logs
    List {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Describe trends in recent moods
    Analyze,
}

#[derive(Subcommand, Debug)]
pub enum StressCommand {
    /// Advice for a stress level from 1 (calm) to 5 (overwhelmed)
    Advice {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        level: u8,
    },
    /// Rate stress from four questions
    Quiz(QuizArgs),
}

#[derive(Args, Debug)]
pub struct QuizArgs {
    /// How well have you been sleeping? (very well, okay, poorly)
    #[arg(long)]
    pub sleep: SleepQuality,

    /// How is your workload? (manageable, busy, overwhelming)
    #[arg(long)]
    pub workload: Workload,

    /// How often do you feel anxious or irritable? (rarely, sometimes, frequently)
    #[arg(long)]
    pub mood: MoodFrequency,

    /// Time for relaxation? (plenty of time, a little but not enough, almost none)
    #[arg(long)]
    pub relaxation: RelaxationTime,

    /// Overrides MINDWELL_QUIZ_SCORING
    #[arg(long)]
    pub scoring: Option<QuizScoring>,
}

impl QuizArgs {
    pub fn answers(&self) -> QuizAnswers {
        QuizAnswers {
            sleep: self.sleep,
            workload: self.workload,
            mood: self.mood,
            relaxation: self.relaxation,
        }
    }
}
