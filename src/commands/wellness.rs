use chrono::Local;
use clap::{Args, Subcommand};

use super::{parse_date, resolve_range, OutputFormat};
use crate::db::WellnessRepository;
use crate::models::{Mood, WellnessEntry};
use crate::session::SessionStore;

/// Manage daily wellness entries
#[derive(Args)]
pub struct WellnessCommand {
    #[command(subcommand)]
    command: WellnessSubcommand,
}

#[derive(Subcommand)]
enum WellnessSubcommand {
    /// Log a wellness entry for a day
    Log {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Mood (very-sad, sad, neutral, happy, very-happy)
        #[arg(long, short)]
        mood: String,

        /// Hours of sleep
        #[arg(long, short)]
        sleep: f64,

        /// Stress level (1-5)
        #[arg(long, short = 't')]
        stress: u8,

        /// Optional notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List wellness entries
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Start date (YYYY-MM-DD), defaults to 7 days ago
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        to: Option<String>,

        /// List all entries, ignoring the date range
        #[arg(long)]
        all: bool,
    },

    /// Edit an existing entry
    Edit {
        /// Entry ID
        id: i64,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        mood: Option<String>,

        #[arg(long)]
        sleep: Option<f64>,

        #[arg(long)]
        stress: Option<u8>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete an entry
    Delete {
        /// Entry ID
        id: i64,
    },
}

impl WellnessCommand {
    pub async fn run(
        &self,
        repo: &WellnessRepository,
        session: &SessionStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WellnessSubcommand::Log {
                date,
                mood,
                sleep,
                stress,
                notes,
            } => self.log(date, mood, *sleep, *stress, notes, repo, session).await,
            WellnessSubcommand::List {
                format,
                from,
                to,
                all,
            } => self.list(format, from, to, *all, repo, session).await,
            WellnessSubcommand::Edit {
                id,
                date,
                mood,
                sleep,
                stress,
                notes,
            } => self.edit(*id, date, mood, sleep, stress, notes, repo).await,
            WellnessSubcommand::Delete { id } => {
                repo.delete(*id).await?;
                println!("Deleted wellness entry {}", id);
                Ok(())
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn log(
        &self,
        date: &Option<String>,
        mood: &str,
        sleep: f64,
        stress: u8,
        notes: &Option<String>,
        repo: &WellnessRepository,
        session: &SessionStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let parsed_date = match date {
            Some(d) => parse_date(d)?,
            None => Local::now().date_naive(),
        };
        let parsed_mood: Mood = mood.parse().map_err(|e: String| e)?;

        if !(1..=5).contains(&stress) {
            return Err("Stress level must be between 1 and 5".into());
        }
        if !(0.0..=24.0).contains(&sleep) {
            return Err("Sleep hours must be between 0 and 24".into());
        }

        // Entries logged before login sync once a session exists.
        let user_id = session.current_user_id().unwrap_or_default();

        let mut entry =
            WellnessEntry::new(parsed_date, parsed_mood, sleep, stress).with_user_id(user_id);
        if let Some(n) = notes {
            entry = entry.with_notes(n);
        }

        let created = repo.create(&entry).await?;

        println!("Logged wellness entry:");
        println!();
        print_entry(&created);
        Ok(())
    }

    async fn list(
        &self,
        format: &OutputFormat,
        from: &Option<String>,
        to: &Option<String>,
        all: bool,
        repo: &WellnessRepository,
        session: &SessionStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let user_id = session.current_user_id().unwrap_or_default();

        let entries = if all {
            repo.list_for_user(&user_id).await?
        } else {
            let (from_date, to_date) = resolve_range(from, to)?;
            repo.list_range(&user_id, from_date, to_date).await?
        };

        if entries.is_empty() {
            println!("No wellness entries found");
            return Ok(());
        }

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
            OutputFormat::Text => {
                for entry in &entries {
                    println!(
                        "  [{}] {}  {:10}  sleep {:>4.1}h  stress {}  {}",
                        entry.id,
                        entry.date,
                        entry.mood.to_string(),
                        entry.sleep_hours,
                        entry.stress_level,
                        entry.notes
                    );
                }
                println!("\nTotal: {} entr{}", entries.len(), plural_y(entries.len()));
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn edit(
        &self,
        id: i64,
        date: &Option<String>,
        mood: &Option<String>,
        sleep: &Option<f64>,
        stress: &Option<u8>,
        notes: &Option<String>,
        repo: &WellnessRepository,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut entry = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| format!("Wellness entry not found: {}", id))?;

        if let Some(d) = date {
            entry.date = parse_date(d)?;
        }
        if let Some(m) = mood {
            entry.mood = m.parse().map_err(|e: String| e)?;
        }
        if let Some(s) = sleep {
            entry.sleep_hours = *s;
        }
        if let Some(s) = stress {
            if !(1..=5).contains(s) {
                return Err("Stress level must be between 1 and 5".into());
            }
            entry.stress_level = *s;
        }
        if let Some(n) = notes {
            entry.notes = n.clone();
        }

        let updated = repo.update(&entry).await?;

        println!("Updated wellness entry:");
        println!();
        print_entry(&updated);
        Ok(())
    }
}

fn print_entry(entry: &WellnessEntry) {
    println!("  Date:   {}", entry.date);
    println!("  Mood:   {}", entry.mood);
    println!("  Sleep:  {}h", entry.sleep_hours);
    println!("  Stress: {}", entry.stress_level);
    if !entry.notes.is_empty() {
        println!("  Notes:  {}", entry.notes);
    }
    println!();
    println!("Entry ID: {}", entry.id);
}

fn plural_y(n: usize) -> &'static str {
    if n == 1 {
        "y"
    } else {
        "ies"
    }
}
