//! Check command implementation
//!
//! Validates a run without pricing: loads every input, generates the
//! scenarios and reports what the run would compute.

use sensi_risk::scenarios::ScenarioGenerator;
use tracing::info;

use crate::config::RunConfig;
use crate::error::Result;
use crate::inputs::RunInputs;

/// Run the check command
pub fn run(config: &RunConfig) -> Result<()> {
    info!("Checking run configuration...");
    let inputs = RunInputs::load(&config.inputs)?;
    let scenarios = ScenarioGenerator::new(&inputs.shifts)?.generate(&inputs.market);
    let (up, down, cross) = scenarios.counts();
    let cells = inputs.trades.len() * scenarios.len();

    println!("Inputs");
    println!("  Shift entries:   {}", inputs.shifts.shifts.len());
    println!("  Market objects:  {}", inputs.market.len());
    println!("  Trades:          {}", inputs.trades.len());
    println!("Scenarios");
    println!("  Factors:         {}", scenarios.factors().len());
    println!("  Up / Down:       {} / {}", up, down);
    println!("  Cross:           {}", cross);
    println!("  Total (w/ base): {}", scenarios.len());
    println!("Valuation");
    println!("  Backend:         {}", config.valuation.backend);
    println!("  Cube cells:      {}", cells);
    match config.valuation.threads {
        Some(n) => println!("  Threads:         {}", n),
        None => println!("  Threads:         global pool ({} CPUs)", num_cpus::get()),
    }

    if scenarios.skipped().is_empty() {
        println!("All configured factors are simulated.");
    } else {
        println!("Skipped factors:");
        for skipped in scenarios.skipped() {
            println!(
                "  {}/{}: {}",
                skipped.category, skipped.qualifier, skipped.reason
            );
        }
    }
    info!("Check complete");
    Ok(())
}
