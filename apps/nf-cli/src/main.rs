use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use nf_app::{AppResult, RunOptions, RunProgressEvent, RunRequest, RunStage, query, run_service};

#[derive(Parser)]
#[command(name = "nf-cli")]
#[command(about = "netfunc CLI - network functionality under Monte Carlo damage sampling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an analysis definition and check its input files
    Validate {
        /// Path to the analysis YAML (or JSON) file
        definition: PathBuf,
    },
    /// Run the analysis
    Run {
        /// Path to the analysis YAML (or JSON) file
        definition: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Evaluate samples on the calling thread only
        #[arg(long)]
        sequential: bool,
    },
    /// List cached runs of an analysis
    Runs {
        /// Path to the analysis YAML (or JSON) file
        definition: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the analysis YAML (or JSON) file
        definition: PathBuf,
        /// Run ID to display
        run_id: String,
        /// Number of most failure-prone nodes to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { definition } => cmd_validate(&definition),
        Commands::Run {
            definition,
            no_cache,
            sequential,
        } => cmd_run(&definition, !no_cache, sequential),
        Commands::Runs { definition } => cmd_runs(&definition),
        Commands::ShowRun {
            definition,
            run_id,
            top,
        } => cmd_show_run(&definition, &run_id, top),
    }
}

fn cmd_validate(definition: &Path) -> AppResult<()> {
    println!("Validating analysis: {}", definition.display());
    let summary = nf_app::check_definition(definition)?;
    println!("✓ Definition is valid");
    println!("  Analysis: {} ({})", summary.result_name, summary.analysis);
    println!("  Weight column: {}", summary.plan.weight_field);
    println!("  Topology: {:?}", summary.plan.topology);
    match &summary.plan.role_field {
        Some(field) => println!("  Sources: by class {:?} on {}", summary.plan.sources, field),
        None => println!("  Sources: {} listed", summary.source_count),
    }
    if summary.excluded_count > 0 {
        println!("  Excluded: {}", summary.excluded_count);
    }
    for path in summary.inputs.all() {
        println!("  Input: {}", path.display());
    }
    Ok(())
}

fn cmd_run(definition: &Path, use_cache: bool, sequential: bool) -> AppResult<()> {
    println!("Running analysis: {}", definition.display());

    let request = RunRequest {
        definition_path: definition,
        options: RunOptions {
            use_cache,
            sequential,
            ..RunOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_stage = None;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event| {
            let emit_now =
                last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Analysis completed: {}", response.run_id);
    }
    let m = &response.manifest;
    println!(
        "  {} nodes x {} samples, mean failure probability {:.4}",
        m.distribution_nodes, m.num_samples, m.mean_failure_probability
    );

    let t = &response.timing;
    tracing::debug!(
        read_inputs_s = t.read_inputs_time_s,
        build_s = t.build_time_s,
        evaluate_s = t.evaluate_time_s,
        save_s = t.save_time_s,
        "run timing"
    );
    println!("  Total time: {:.3}s", t.total_time_s);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (event.stage, event.samples) {
        (RunStage::EvaluatingSamples, Some(p)) => {
            let width = 28usize;
            let filled = ((p.fraction() * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  samples={}/{}  elapsed={:.1}s",
                bar,
                p.fraction() * 100.0,
                p.completed,
                p.total,
                event.elapsed_wall_s
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(message) = &event.message {
                line.push_str("  ");
                line.push_str(message);
            }
            print!("{line}");
        }
    }
    let _ = io::stdout().flush();
}

fn cmd_runs(definition: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(definition)?;

    if runs.is_empty() {
        println!("No cached runs found for: {}", definition.display());
    } else {
        println!("Cached runs:");
        for manifest in runs {
            println!(
                "  {} ({}, {} samples)",
                manifest.run_id, manifest.timestamp, manifest.num_samples
            );
        }
    }
    Ok(())
}

fn cmd_show_run(definition: &Path, run_id: &str, top: usize) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, tables) = run_service::load_run(definition, run_id)?;
    let summary = query::get_run_summary(&tables)?;

    println!("\nRun Summary:");
    println!("  Analysis: {} ({})", manifest.result_name, manifest.analysis);
    println!("  Created: {}", manifest.timestamp);
    println!("  Samples: {}", manifest.num_samples);
    println!("  Nodes: {}", summary.node_count);
    println!(
        "  Mean failure probability: {:.4}",
        summary.mean_failure_probability
    );
    println!("  Always functional: {}", summary.always_functional);
    println!("  Never functional: {}", summary.never_functional);

    println!("\nMost likely to fail:");
    for row in query::top_failures(&tables, top) {
        println!("  {}  {:.4}", row.guid, row.failure_probability);
    }

    Ok(())
}
