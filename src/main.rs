use anyhow::Result;
use std::time::Instant;
use std::fs::File;
use std::io::Write;
use log::{info, warn, error, debug, trace};

use flock_engine::config::SimulationConfig;
use flock_engine::simulation::FlockSimulation;

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting Flock Engine...");

    // --- Load Configuration ---
    let config = SimulationConfig::load("config.toml")?;

    info!("Using {} Rayon threads.", rayon::current_num_threads());

    // --- Initialize Simulation ---
    info!("Initializing flock...");
    let mut sim = FlockSimulation::new(config)?;
    info!("Flock initialized with {} agents.", sim.agent_count());
    debug!("Simulation Parameters: {:#?}", sim.params()); // More detailed params at debug level

    // --- Simulation Loop ---
    let total_steps = sim.config.timing.total_steps;
    let mut record_interval_steps = sim.config.timing.record_interval_steps;
    if record_interval_steps == 0 {
        warn!("record_interval_steps is 0. Recording every step.");
        record_interval_steps = 1;
    }
    info!("Recording snapshot every {} steps.", record_interval_steps);

    info!("Starting simulation loop for {} steps...", total_steps);
    let start_time = Instant::now();
    let mut previous_print_time = start_time;

    // --- Initial Snapshot (step = 0) ---
    info!("Recording initial snapshot (step 0)...");
    sim.record_snapshot();

    for step in 0..total_steps {
        let step_start_time = Instant::now();
        if let Err(e) = sim.step() {
            error!("Error during simulation step {}: {}", step + 1, e);
            anyhow::bail!("Simulation step failed.");
        }
        let step_duration = step_start_time.elapsed();

        // Print status periodically
        let current_time = Instant::now();
        let print_interval_secs = 5.0;
        let should_print_status = current_time.duration_since(previous_print_time).as_secs_f64() >= print_interval_secs;
        let is_record_step = (step + 1) % record_interval_steps == 0;
        let is_last_step = step == total_steps - 1;

        // Only log at intervals or when a snapshot is being taken
        if should_print_status || is_record_step || is_last_step {
            let elapsed_total = start_time.elapsed();

            info!(
                "Step [{}/{}] | Agents: {} | Step Time: {:6.2} ms | Elapsed: {:.2} s",
                step + 1,
                total_steps,
                sim.agent_count(),
                step_duration.as_secs_f64() * 1000.0,
                elapsed_total.as_secs_f64()
            );
            previous_print_time = current_time;

            // --- Record Snapshot ---
            if is_record_step || is_last_step {
                sim.record_snapshot();
            }
        } else {
            // For other steps, just log at trace level for detailed debugging if needed
            trace!(
                "Step [{}/{}] completed in {:.2} ms",
                step + 1,
                total_steps,
                step_duration.as_secs_f64() * 1000.0
            );
        }
    }

    let total_duration = start_time.elapsed();
    info!(
        "Simulation finished in {:.3} seconds ({:.3} minutes).",
        total_duration.as_secs_f64(),
        total_duration.as_secs_f64() / 60.0
    );

    // --- Save Recorded Data ---
    info!("Saving recorded data...");
    if sim.config.output.save_stats {
        let filename = format!("{}_snapshots.json", sim.config.output.base_filename);
        let snapshots = sim.get_recorded_snapshots();
        match File::create(&filename) {
            Ok(mut file) => {
                match serde_json::to_string(snapshots) {
                    Ok(json_string) => {
                        if let Err(e) = file.write_all(json_string.as_bytes()) {
                            error!("Error writing snapshot JSON to file '{}': {}", filename, e);
                        } else {
                            info!("All snapshots saved to {}", filename);
                        }
                    }
                    Err(e) => error!("Error serializing snapshots to JSON: {}", e),
                }
            }
            Err(e) => error!("Error creating snapshot file '{}': {}", filename, e),
        }
    } else {
        info!("Skipping saving snapshots as per config (save_stats is false).");
    }

    // Save final positions if requested (separate from full snapshots)
    if sim.config.output.save_positions {
        let filename = format!("{}_final_positions.csv", sim.config.output.base_filename);

        match csv::Writer::from_path(&filename) {
            Ok(mut writer) => {
                writer.write_record(["x", "y", "category"])?;
                for agent in sim.agents() {
                    writer.write_record([
                        format!("{:.4}", agent.position.x),
                        format!("{:.4}", agent.position.y),
                        agent.category.name().to_string(),
                    ])?;
                }
                writer.flush()?;
                info!("Final positions saved to {}", filename);
            }
            Err(e) => error!("Error saving CSV file '{}': {}", filename, e),
        }
    } else {
        info!("Skipping saving final positions as per config.");
    }

    info!("Simulation Complete.");
    Ok(())
}
