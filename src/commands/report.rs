use clap::Args;
use serde::Serialize;

use super::{resolve_range, OutputFormat};
use crate::db::{ExerciseRepository, WellnessRepository};
use crate::models::{ExerciseEntry, Mood, WellnessEntry};
use crate::session::SessionStore;

/// Show a wellness trend report for a date range
#[derive(Args)]
pub struct ReportCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Start date (YYYY-MM-DD), defaults to 7 days ago
    #[arg(long)]
    from: Option<String>,

    /// End date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrendReport {
    pub from: chrono::NaiveDate,
    pub to: chrono::NaiveDate,
    pub wellness_days: usize,
    pub average_mood_score: Option<f64>,
    pub average_sleep_hours: Option<f64>,
    pub average_stress_level: Option<f64>,
    pub mood_distribution: Vec<MoodShare>,
    pub exercise: ExerciseSummary,
}

#[derive(Debug, Serialize)]
pub struct MoodShare {
    pub mood: Mood,
    pub count: usize,
    pub percent: u32,
}

#[derive(Debug, Serialize)]
pub struct ExerciseSummary {
    pub sessions: usize,
    pub total_minutes: i64,
    pub total_calories: i64,
}

impl ReportCommand {
    pub async fn run(
        &self,
        wellness_repo: &WellnessRepository,
        exercise_repo: &ExerciseRepository,
        session: &SessionStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (from, to) = resolve_range(&self.from, &self.to)?;
        let user_id = session.current_user_id().unwrap_or_default();

        let entries = wellness_repo.list_range(&user_id, from, to).await?;
        let exercises = exercise_repo.list_range(&user_id, from, to).await?;

        let report = build_report(&entries, &exercises, from, to);

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => print_report(&report),
        }
        Ok(())
    }
}

fn build_report(
    entries: &[WellnessEntry],
    exercises: &[ExerciseEntry],
    from: chrono::NaiveDate,
    to: chrono::NaiveDate,
) -> TrendReport {
    let n = entries.len();

    let (average_mood_score, average_sleep_hours, average_stress_level) = if n == 0 {
        (None, None, None)
    } else {
        let mood_sum: f64 = entries.iter().map(|e| e.mood.score() as f64).sum();
        let sleep_sum: f64 = entries.iter().map(|e| e.sleep_hours).sum();
        let stress_sum: f64 = entries.iter().map(|e| e.stress_level as f64).sum();
        (
            Some(mood_sum / n as f64),
            Some(sleep_sum / n as f64),
            Some(stress_sum / n as f64),
        )
    };

    let mood_distribution = Mood::all()
        .iter()
        .map(|&mood| {
            let count = entries.iter().filter(|e| e.mood == mood).count();
            let percent = if n == 0 {
                0
            } else {
                (count as f64 / n as f64 * 100.0).round() as u32
            };
            MoodShare {
                mood,
                count,
                percent,
            }
        })
        .collect();

    TrendReport {
        from,
        to,
        wellness_days: n,
        average_mood_score,
        average_sleep_hours,
        average_stress_level,
        mood_distribution,
        exercise: ExerciseSummary {
            sessions: exercises.len(),
            total_minutes: exercises.iter().map(|e| e.duration_minutes).sum(),
            total_calories: exercises.iter().map(|e| e.calories_burned).sum(),
        },
    }
}

fn print_report(report: &TrendReport) {
    println!("Wellness Report: {} to {}", report.from, report.to);
    println!("========================================");
    println!();

    if report.wellness_days == 0 {
        println!("No wellness entries in this period.");
    } else {
        println!("Wellness ({} day(s) logged)", report.wellness_days);
        if let Some(mood) = report.average_mood_score {
            println!("  Average mood:   {:.1} / 5", mood);
        }
        if let Some(sleep) = report.average_sleep_hours {
            println!("  Average sleep:  {:.1}h", sleep);
        }
        if let Some(stress) = report.average_stress_level {
            println!("  Average stress: {:.1} / 5", stress);
        }
        println!();
        println!("Mood distribution");
        for share in &report.mood_distribution {
            println!("  {:10} {:>3}%  ({})", share.mood.to_string(), share.percent, share.count);
        }
    }

    println!();
    if report.exercise.sessions == 0 {
        println!("No exercise logged in this period.");
    } else {
        println!("Exercise");
        println!("  Sessions: {}", report.exercise.sessions);
        println!("  Minutes:  {}", report.exercise.total_minutes);
        println!("  Calories: {}", report.exercise.total_calories);
    }
}
