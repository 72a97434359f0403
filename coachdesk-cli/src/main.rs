use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use std::fmt;

use coachdesk::config::{Backend, LlmConfig};
use coachdesk::logging;
use coachdesk::models::{AiWorkoutParams, Level, MuscleGroup, WorkoutDay};
use coachdesk::thumbnail::{display_image, youtube_thumbnail};
use coachdesk::{CoachDesk, LlmPlanRequester, PlanGenerator};

mod tui;

#[derive(Parser, Debug)]
#[command(version, about = "CoachDesk - personal trainer workspace", long_about = None)]
struct Args {
    /// off, error, warn, info, debug or trace
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Gemini,
    #[value(name = "openai")]
    OpenAI,
    Ollama,
}

impl fmt::Display for BackendArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendArg::Gemini => write!(f, "gemini"),
            BackendArg::OpenAI => write!(f, "openai"),
            BackendArg::Ollama => write!(f, "ollama"),
        }
    }
}

impl From<BackendArg> for Backend {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Gemini => Backend::Gemini,
            BackendArg::OpenAI => Backend::OpenAi,
            BackendArg::Ollama => Backend::Ollama,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LevelArg {
    Beginner,
    Intermediate,
    Advanced,
}

impl From<LevelArg> for Level {
    fn from(l: LevelArg) -> Self {
        match l {
            LevelArg::Beginner => Level::Beginner,
            LevelArg::Intermediate => Level::Intermediate,
            LevelArg::Advanced => Level::Advanced,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GroupArg {
    Chest,
    Back,
    Legs,
    Shoulders,
    Biceps,
    Triceps,
    Core,
}

impl From<GroupArg> for MuscleGroup {
    fn from(g: GroupArg) -> Self {
        match g {
            GroupArg::Chest => MuscleGroup::Chest,
            GroupArg::Back => MuscleGroup::Back,
            GroupArg::Legs => MuscleGroup::Legs,
            GroupArg::Shoulders => MuscleGroup::Shoulders,
            GroupArg::Biceps => MuscleGroup::Biceps,
            GroupArg::Triceps => MuscleGroup::Triceps,
            GroupArg::Core => MuscleGroup::Core,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive roster, exercise library and plan generator
    Interactive {
        #[arg(short, long)]
        backend: Option<BackendArg>,
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Generate a weekly plan with the AI service
    Generate {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "Hypertrophy")]
        goal: String,
        #[arg(short, long, value_enum, default_value_t = LevelArg::Intermediate)]
        level: LevelArg,
        #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=7))]
        days: u8,
        #[arg(short, long)]
        backend: Option<BackendArg>,
        #[arg(short, long)]
        model: Option<String>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the YouTube thumbnail for a video URL
    Thumbnail { url: String },
    /// List the students on the starter roster
    Roster {
        #[arg(short, long)]
        verbose: bool,
    },
    /// List the exercise library
    Exercises {
        #[arg(short, long, value_enum)]
        group: Option<GroupArg>,
    },
}

pub(crate) fn build_requester(
    backend: Option<BackendArg>,
    model: Option<String>,
) -> Result<LlmPlanRequester> {
    let config = LlmConfig::resolve(backend.map(Backend::from), model)?;
    Ok(LlmPlanRequester::new(config.into_interface()?))
}

fn print_schedule(days: &[WorkoutDay]) {
    for day in days {
        println!("== {} [{}]", day.day_name, day.muscle_groups.join(", "));
        for ex in &day.exercises {
            println!(
                "  {} ({}): {} sets x {}",
                ex.name, ex.muscle_group, ex.sets, ex.reps
            );
            if let Some(video) = &ex.video_url {
                println!("    video: {}", video);
            }
            println!(
                "    cover: {}",
                display_image(ex).unwrap_or_else(|| "-".to_string())
            );
        }
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    // Log lines would tear the terminal UI, so it stays quiet unless asked.
    let default_level = match args.command {
        Commands::Interactive { .. } => "off",
        _ => "warn",
    };
    let level = args.log_level.as_deref().unwrap_or(default_level);
    if !logging::set_log_level(level) {
        eprintln!("Unknown log level '{}', logging disabled", level);
    }

    match args.command {
        Commands::Interactive { backend, model } => {
            let requester = build_requester(backend, model);
            let terminal = ratatui::init();
            let result = tui::run(terminal, CoachDesk::with_defaults(), requester).await;
            ratatui::restore();
            result
        }
        Commands::Generate {
            name,
            goal,
            level,
            days,
            backend,
            model,
            json,
        } => {
            let requester = build_requester(backend, model)?;
            let params = AiWorkoutParams {
                name,
                goal,
                level: Level::from(level).label().to_string(),
                days_per_week: days,
            };
            println!(
                "Generating a {}-day plan for {} with {}...",
                params.days_per_week,
                params.name,
                requester.backend()
            );
            let plan = requester.generate(&params).await.map_err(|e| {
                eprintln!("Could not generate the workout plan. Please try again.");
                anyhow!(e)
            })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_schedule(&plan);
            }
            Ok(())
        }
        Commands::Thumbnail { url } => {
            match youtube_thumbnail(Some(&url)) {
                Some(thumb) => println!("{}", thumb),
                None => println!("No thumbnail can be derived from {}", url),
            }
            Ok(())
        }
        Commands::Roster { verbose } => {
            let desk = CoachDesk::with_defaults();
            for student in desk.students() {
                println!(
                    "{}, {} ({} - {})",
                    student.id, student.name, student.goal, student.level
                );
                if verbose {
                    print_schedule(&student.weekly_schedule);
                }
            }
            Ok(())
        }
        Commands::Exercises { group } => {
            let desk = CoachDesk::with_defaults();
            let exercises = match group {
                Some(g) => desk.exercises_in_group(g.into()),
                None => desk.exercises().iter().collect(),
            };
            if exercises.is_empty() {
                println!("No exercises found");
            }
            for ex in exercises {
                println!(
                    "{}\t{} [{}] {} x {}\t{}",
                    ex.id,
                    ex.name,
                    ex.muscle_group,
                    ex.sets,
                    ex.reps,
                    display_image(ex).unwrap_or_else(|| "(no cover)".to_string())
                );
            }
            Ok(())
        }
    }
}
