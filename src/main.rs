//! Dispatch runner entry point: CLI wiring and config-driven horizon runs.

use std::path::Path;
use std::process;

use tracing_subscriber::EnvFilter;

use hybrid_dispatch::config::ScenarioConfig;
use hybrid_dispatch::dispatch::policy::PolicyTable;
use hybrid_dispatch::horizon::runner::run_scenario;
use hybrid_dispatch::io::export::{RunReport, export_csv, export_report};
use hybrid_dispatch::io::policy::load_policy_csv;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    policy_path: Option<String>,
    results_out: Option<String>,
    report_out: Option<String>,
}

fn print_help() {
    eprintln!("hybrid-dispatch: PV/wind/grid dispatch over a simulated horizon");
    eprintln!();
    eprintln!("Usage: hybrid-dispatch [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --policy <path>          Load policy table from CSV");
    eprintln!("  --results-out <path>     Export per-interval results to CSV");
    eprintln!("  --report-out <path>      Export run summary to JSON");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: hybrid_dispatch=info).");
}

/// Returns the value following a flag or exits with an error.
fn flag_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    match args.get(i) {
        Some(v) => v.clone(),
        None => {
            eprintln!("error: {flag} requires a {what} argument");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        policy_path: None,
        results_out: None,
        report_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                cli.scenario_path = Some(flag_value(&args, i, "--scenario", "path"));
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(flag_value(&args, i, "--preset", "name"));
            }
            "--seed" => {
                i += 1;
                let raw = flag_value(&args, i, "--seed", "u64");
                if let Ok(s) = raw.parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{raw}\" is not a valid u64");
                    process::exit(1);
                }
            }
            "--policy" => {
                i += 1;
                cli.policy_path = Some(flag_value(&args, i, "--policy", "path"));
            }
            "--results-out" => {
                i += 1;
                cli.results_out = Some(flag_value(&args, i, "--results-out", "path"));
            }
            "--report-out" => {
                i += 1;
                cli.report_out = Some(flag_value(&args, i, "--report-out", "path"));
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hybrid_dispatch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();

    // --scenario takes priority, then --preset, then baseline default
    let (mut scenario, scenario_name) = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => (cfg, path.clone()),
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => (cfg, name.clone()),
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        (ScenarioConfig::baseline(), "baseline".to_string())
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if cli.policy_path.is_some() {
        scenario.simulation.policy_path.clone_from(&cli.policy_path);
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // An empty table sends every interval to the fallback draw.
    let policy = match scenario.simulation.policy_path {
        Some(ref path) => match load_policy_csv(Path::new(path)) {
            Ok(table) => table,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        },
        None => PolicyTable::new(),
    };

    let run = match run_scenario(&scenario, policy) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    for (hour, r) in run.results.iter().enumerate() {
        println!("[{hour:>3}] {r}");
    }

    println!("\nEngine");
    println!("{}", run.summary);
    println!("Naive baseline ({} capped intervals)", run.baseline.cap_violations);
    println!("{}", run.baseline_summary);

    if let Some(ref path) = cli.results_out {
        if let Err(e) = export_csv(&run.results, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Results written to {path}");
    }

    if let Some(ref path) = cli.report_out {
        let report = RunReport {
            scenario: &scenario_name,
            seed: scenario.simulation.seed,
            engine: &run.summary,
            baseline: &run.baseline_summary,
            baseline_cap_violations: run.baseline.cap_violations,
        };
        if let Err(e) = export_report(&report, Path::new(path)) {
            eprintln!("error: failed to write report: {e}");
            process::exit(1);
        }
        eprintln!("Report written to {path}");
    }
}
