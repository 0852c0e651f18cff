// Dispensary Delivery Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/dispensary-delivery-simulator
// ```
//
// Or with custom configuration:
//
// ```console
// $ ./target/release/dispensary-delivery-simulator --num-pharmacists 2 --seed 42 --output-directory results --verbose
// ```

use anyhow::Context;
use clap::Parser;
use dispensary_delivery_simulator::simulation::{
    export_outcome, LoggingConfig, SimulationOrchestrator, SimulationOutcome,
};
use dispensary_delivery_simulator::types::config::CliArgs;
use dispensary_delivery_simulator::types::RunParameters;
use std::process;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    // Handle special CLI flags that don't require full initialization
    if args.print_config {
        let default_config = RunParameters::default();
        match default_config.print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // Initialize logging based on CLI flags
    let logging_result = if args.debug {
        LoggingConfig::init_debug()
    } else if args.verbose {
        LoggingConfig::init_verbose()
    } else if let Some(directory) = &args.output_directory {
        // Runs that export results keep a JSON log next to them
        LoggingConfig::init_archived(format!("{}/logs", directory))
    } else {
        LoggingConfig::init_quiet()
    };

    // Dropping the guard flushes the archived log file
    let _log_guard = match logging_result {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting Dispensary Simulator");

    let dry_run = args.dry_run;
    let config = match load_configuration(args) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    };

    info!("Configuration loaded and validated successfully");

    // Handle dry run mode
    if dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config);
        return;
    }

    print_startup_banner(&config);

    match run_simulation(config) {
        Ok(outcome) => {
            eprintln!("{}", outcome.summary);
            match serde_json::to_string_pretty(&outcome.summary) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    error!("Failed to serialize run summary: {}", e);
                    process::exit(1);
                }
            }
            info!("Dispensary Simulator completed successfully");
        }
        Err(e) => {
            error!("Simulation failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Merge defaults, config file and CLI overrides, then validate
fn load_configuration(args: CliArgs) -> anyhow::Result<RunParameters> {
    let config =
        RunParameters::from_cli_args(args).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

/// Run one week and export the results if an output directory is configured
fn run_simulation(config: RunParameters) -> anyhow::Result<SimulationOutcome> {
    let output_directory = config.output_directory.clone();

    eprintln!("Running one week of dispensary operation...");
    let outcome = SimulationOrchestrator::new(config)
        .context("Failed to initialize simulation")?
        .run()
        .context("Simulation run aborted")?;

    eprintln!(
        "Processed {} events in {:.2?} ({:.0} events/s)",
        outcome.runtime.events_dispatched,
        outcome.runtime.wall_clock,
        outcome.runtime.events_per_second()
    );

    if let Some(directory) = output_directory {
        let paths = export_outcome(&outcome, &directory)
            .with_context(|| format!("Failed to export results to {}", directory))?;
        eprintln!("Prescriptions written to: {}", paths.prescriptions.display());
        eprintln!("Pickups written to: {}", paths.pickups.display());
        eprintln!("Summary written to: {}", paths.summary.display());
    }

    Ok(outcome)
}

/// Print startup banner with configuration
fn print_startup_banner(config: &RunParameters) {
    eprintln!("Dispensary Simulator");
    eprintln!("====================");
    eprintln!("One week of prescriptions from arrival to ward delivery");
    eprintln!();
    print_configuration_summary(config);
    eprintln!();
}

/// Print configuration summary
fn print_configuration_summary(config: &RunParameters) {
    eprintln!("Configuration:");
    eprintln!("  Average Step Duration: {:.3} h", config.average_step_duration);
    eprintln!("  Interarrival Time: {:.3} h", config.interarrival_time);
    eprintln!(
        "  Staffing (pharmacists/labellers/dispensers/final checkers): {}/{}/{}/{}",
        config.num_pharmacists,
        config.num_labellers,
        config.num_dispensers,
        config.num_final_checkers
    );
    eprintln!(
        "  Transport: {:.2} h (sd {:.2} h)",
        config.average_transport_duration, config.transport_duration_std_dev
    );
    eprintln!("  Weekday Pickups: {:?}", config.weekday_pickup_times);
    eprintln!("  Weekend Pickups: {:?}", config.weekend_pickup_times);
    eprintln!(
        "  Opening Hours: weekdays {}-{}, weekends {}-{}",
        config.weekday_opening_hours.open,
        config.weekday_opening_hours.close,
        config.weekend_opening_hours.open,
        config.weekend_opening_hours.close
    );
    eprintln!("  Couriers: {}", config.pickup_instances);
    eprintln!("  Adjustment Anchor: {}", config.adjustment_anchor);
    eprintln!("  Sampling: {}", config.sampling);
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed: {}", seed);
    }
}
