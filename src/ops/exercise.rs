//! Guided exercises: paced breathing, mindfulness tips and gratitude prompts.
//!
//! None of these call the model. Breathing is timed with `tokio::time`, and
//! the tip and prompt of the day are picked from fixed lists by day of year.

use crate::constants::MAX_BREATHING_CYCLES;
use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

const MINDFULNESS_TIPS: &[&str] = &[
    "Focus on your breath for one minute. Notice the sensation of air entering and leaving your body.",
    "Pay attention to the sounds around you. Can you identify five different sounds?",
    "Mindfully eat a meal or snack. Notice the textures, smells, and tastes.",
    "Take a short walk and notice the feeling of your feet on the ground.",
    "Observe your thoughts without judgment, like clouds passing in the sky.",
];

const GRATITUDE_PROMPTS: &[&str] = &[
    "What is one thing that made you smile today?",
    "Who is someone you are grateful for, and why?",
    "What is a small pleasure you enjoyed recently?",
    "What is something beautiful you saw today?",
    "What is a skill or ability you are thankful to have?",
];

/// One step of a breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
}

impl BreathPhase {
    /// The phases of one cycle, in order.
    pub const CYCLE: [BreathPhase; 3] = [BreathPhase::Inhale, BreathPhase::Hold, BreathPhase::Exhale];

    /// How long the phase lasts.
    pub fn duration(self) -> Duration {
        match self {
            BreathPhase::Inhale => Duration::from_secs(4),
            BreathPhase::Hold => Duration::from_secs(2),
            BreathPhase::Exhale => Duration::from_secs(6),
        }
    }

    /// Cue shown while the phase runs.
    pub fn cue(self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Breathe In...",
            BreathPhase::Hold => "Hold",
            BreathPhase::Exhale => "Breathe Out...",
        }
    }
}

impl fmt::Display for BreathPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}s)", self.cue(), self.duration().as_secs())
    }
}

/// The phases of `cycles` full breathing cycles.
pub fn breathing_phases(cycles: u32) -> impl Iterator<Item = BreathPhase> {
    BreathPhase::CYCLE
        .into_iter()
        .cycle()
        .take(cycles as usize * BreathPhase::CYCLE.len())
}

/// Walks the user through `cycles` breathing cycles, writing each cue to
/// `output` and waiting out its duration.
///
/// # Errors
///
/// Returns `AppError::Validation` if `cycles` is zero or above
/// `MAX_BREATHING_CYCLES`, or an I/O error from `output`.
pub async fn run_breathing<W: Write>(cycles: u32, output: &mut W) -> AppResult<()> {
    if cycles == 0 || cycles > MAX_BREATHING_CYCLES {
        return Err(AppError::Validation(format!(
            "Cycles must be between 1 and {}",
            MAX_BREATHING_CYCLES
        )));
    }

    info!(cycles, "Starting breathing exercise");
    for (step, phase) in breathing_phases(cycles).enumerate() {
        if step % BreathPhase::CYCLE.len() == 0 {
            writeln!(output, "Cycle {}/{}", step / BreathPhase::CYCLE.len() + 1, cycles)?;
        }
        writeln!(output, "  {}", phase)?;
        output.flush()?;
        debug!(?phase, "Breathing phase");
        tokio::time::sleep(phase.duration()).await;
    }
    writeln!(output, "Well done. Notice how you feel.")?;
    Ok(())
}

/// The mindfulness tip for `date`.
pub fn mindfulness_tip(date: NaiveDate) -> &'static str {
    MINDFULNESS_TIPS[date.ordinal0() as usize % MINDFULNESS_TIPS.len()]
}

/// The gratitude prompt for `date`.
pub fn gratitude_prompt(date: NaiveDate) -> &'static str {
    GRATITUDE_PROMPTS[date.ordinal0() as usize % GRATITUDE_PROMPTS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_cycle_is_inhale_hold_exhale() {
        let phases: Vec<BreathPhase> = breathing_phases(2).collect();
        assert_eq!(
            phases,
            vec![
                BreathPhase::Inhale,
                BreathPhase::Hold,
                BreathPhase::Exhale,
                BreathPhase::Inhale,
                BreathPhase::Hold,
                BreathPhase::Exhale,
            ]
        );
        assert_eq!(breathing_phases(0).count(), 0);
    }

    #[test]
    fn test_phase_durations() {
        let secs: Vec<u64> = BreathPhase::CYCLE.iter().map(|p| p.duration().as_secs()).collect();
        assert_eq!(secs, vec![4, 2, 6]);
        assert_eq!(BreathPhase::Exhale.to_string(), "Breathe Out... (6s)");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_breathing_waits_out_each_phase() {
        let start = Instant::now();
        let mut out = Vec::new();
        run_breathing(2, &mut out).await.unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(24));
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Cycle 1/2\n  Breathe In... (4s)\n  Hold (2s)\n"));
        assert!(text.contains("Cycle 2/2\n"));
        assert!(text.ends_with("Well done. Notice how you feel.\n"));
    }

    #[tokio::test]
    async fn test_run_breathing_rejects_bad_cycle_counts() {
        let mut out = Vec::new();
        for cycles in [0, MAX_BREATHING_CYCLES + 1] {
            let err = run_breathing(cycles, &mut out).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert!(out.is_empty());
    }

    #[test]
    fn test_tip_and_prompt_by_day_of_year() {
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let jan6 = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        let jan2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        assert!(mindfulness_tip(jan1).starts_with("Focus on your breath"));
        assert_eq!(mindfulness_tip(jan6), mindfulness_tip(jan1));
        assert!(mindfulness_tip(jan2).contains("five different sounds"));

        assert_eq!(gratitude_prompt(jan1), "What is one thing that made you smile today?");
        assert_eq!(gratitude_prompt(jan6), gratitude_prompt(jan1));
    }
}
