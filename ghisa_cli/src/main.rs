use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use ghisa_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ghisa")]
#[command(about = "Workout session execution engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the execution trace of the demo card (default)
    Preview,

    /// Simulate a full session over the demo card
    Run {
        /// RPE to report for every step
        #[arg(long, default_value_t = 8)]
        rpe: u8,

        /// Simulated seconds between step confirmations
        #[arg(long, default_value_t = 60)]
        step_seconds: i64,

        /// Emit the session summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a cluster load curve
    Curve {
        /// Number of clusters
        #[arg(long)]
        count: u32,

        /// Curve shape: constant, ascending, descending, wave
        #[arg(long, default_value = "constant")]
        shape: String,

        /// Lower percentage bound
        #[arg(long)]
        min: f64,

        /// Upper percentage bound
        #[arg(long)]
        max: f64,
    },
}

fn main() -> Result<()> {
    ghisa_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Some(Commands::Preview) | None => cmd_preview(),
        Some(Commands::Run {
            rpe,
            step_seconds,
            json,
        }) => cmd_run(config, rpe, step_seconds, json),
        Some(Commands::Curve {
            count,
            shape,
            min,
            max,
        }) => cmd_curve(count, &shape, min, max),
    }
}

fn cmd_preview() -> Result<()> {
    let card = demo_card();
    let library = demo_library();
    let maxes = demo_one_rep_maxes();

    println!("{}", card.name);
    println!();
    for line in execution_trace(&card, &library, &maxes) {
        println!("{line}");
    }
    Ok(())
}

fn cmd_run(config: Config, rpe: u8, step_seconds: i64, json: bool) -> Result<()> {
    let card = demo_card();
    let mut session = WorkoutSession::new(
        card,
        config,
        Box::new(demo_library()),
        Box::new(demo_one_rep_maxes()),
        Box::new(NullSink),
        Utc::now(),
    );

    let mut now = Utc::now();
    while let Some(step) = session.current_step() {
        match step.weight_kg {
            Some(kg) => println!(
                "[{}/{}] {} - {:.1} kg",
                step.set_number, step.set_count, step.title, kg
            ),
            None => println!("[{}/{}] {}", step.set_number, step.set_count, step.title),
        }

        let observed = ObservedValues {
            actual_reps: step.target.and_then(|t| match t {
                SetTarget::Reps { count } => Some(count),
                SetTarget::Duration { .. } => None,
            }),
            actual_weight_kg: step.weight_kg,
            rpe: Some(rpe),
            ..Default::default()
        };
        now += Duration::seconds(step_seconds);
        session.complete_current_step(observed, now);
    }

    let summary = session.summary(now);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!();
        println!("Completed: {:.0}%", summary.completion_ratio * 100.0);
        println!("Tonnage:   {:.1} kg", summary.total_tonnage_kg);
        match summary.average_rpe {
            Some(rpe) => println!("Avg RPE:   {:.1}", rpe),
            None => println!("Avg RPE:   -"),
        }
        println!();
        for (name, breakdown) in &summary.by_exercise {
            println!(
                "  {name}: {} sets, {} reps, {:.1} kg moved",
                breakdown.set_count, breakdown.total_reps, breakdown.tonnage_kg
            );
        }
        println!();
        for (muscle, breakdown) in &summary.by_muscle {
            println!(
                "  {muscle:?}: {} sets, {:.1} kg moved",
                breakdown.set_count, breakdown.tonnage_kg
            );
        }
    }
    Ok(())
}

fn cmd_curve(count: u32, shape: &str, min: f64, max: f64) -> Result<()> {
    let shape = match shape.to_lowercase().as_str() {
        "constant" => ProgressionShape::Constant,
        "ascending" => ProgressionShape::Ascending,
        "descending" => ProgressionShape::Descending,
        "wave" => ProgressionShape::Wave,
        other => {
            return Err(Error::Other(format!("unknown shape: {other}")));
        }
    };

    match cluster_load_curve(count, shape, Some(min), Some(max)) {
        Some(curve) => {
            for (i, pct) in curve.iter().enumerate() {
                println!("cluster {}: {:.1}%", i + 1, pct);
            }
            Ok(())
        }
        None => Err(Error::Other("cannot build curve from these inputs".into())),
    }
}
