//! Metro Occupancy - interactive console
//!
//! Loads the network named in the config (first argument, optional), then
//! steps the simulation on command and prints occupancy.

use metro_occupancy::core::config::AppConfig;
use metro_occupancy::core::error::Result;
use metro_occupancy::loader::load_engine;
use metro_occupancy::simulation::SimulationEngine;

use std::io::{self, Write};
use std::path::PathBuf;

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metro_occupancy=info".into()),
        )
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load_or_default(config_path.as_deref())?;
    let mut engine = load_engine(&config)?;

    println!("\n=== METRO OCCUPANCY ===");
    println!(
        "{} stations on {} lines, {} passengers at start",
        engine.graph().len(),
        engine.graph().lines().count(),
        engine.total_occupancy()
    );
    println!();
    println!("Commands:");
    println!("  tick / t        - Advance simulation by one tick");
    println!("  run <n>         - Run n simulation ticks");
    println!("  status / s      - Show the busiest stations");
    println!("  neighbors <id>  - List stations connected to <id>");
    println!("  quit / q        - Exit");
    println!();

    loop {
        print!("[tick {}] > ", engine.tick());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "tick" || input == "t" {
            engine.step();
            println!(
                "Tick {} complete. {} passengers in system.",
                engine.tick(),
                engine.total_occupancy()
            );
            continue;
        }

        if input == "status" || input == "s" {
            display_status(&engine);
            continue;
        }

        if let Some(arg) = input.strip_prefix("run ") {
            match arg.trim().parse::<usize>() {
                Ok(n) => {
                    println!("Running {} ticks...", n);
                    for _ in engine.steps(n) {}
                    println!("Completed {} ticks. Now at tick {}.", n, engine.tick());
                }
                Err(_) => println!("Usage: run <number>"),
            }
            continue;
        }

        if let Some(id) = input.strip_prefix("neighbors ") {
            match engine.connected_stations(id.trim()) {
                Ok(neighbors) => {
                    for neighbor in neighbors {
                        let occupancy = engine.occupancy(neighbor.as_str()).unwrap_or(0);
                        println!("  {:<24} {:>7}", neighbor, occupancy);
                    }
                }
                Err(e) => println!("{}", e),
            }
            continue;
        }

        println!("Unknown command. Available: tick, run <n>, status, neighbors <id>, quit");
    }

    println!(
        "\nGoodbye! Final state: {} passengers after {} ticks.",
        engine.total_occupancy(),
        engine.tick()
    );
    Ok(())
}

/// Print the ten busiest stations and anything over capacity
fn display_status(engine: &SimulationEngine) {
    let state = engine.current_state();
    let mut busiest: Vec<_> = state.occupancy.iter().collect();
    busiest.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    println!("\n--- Tick {} ---", state.tick);
    println!(
        "Total: {} passengers, network capacity {}",
        state.total(),
        engine.graph().total_capacity()
    );
    for (id, occupancy) in busiest.into_iter().take(10) {
        let name = engine.name(id.as_str()).unwrap_or("?");
        let capacity = engine.capacity(id.as_str()).unwrap_or(0);
        println!("  {:<24} {:<20} {:>7} / {}", id, name, occupancy, capacity);
    }

    let congested = engine.congested_stations();
    if !congested.is_empty() {
        println!("Over capacity: {}", congested.len());
    }
    println!();
}
