//! Scenarios command implementation
//!
//! Lists the generated scenarios in cube column order.

use sensi_risk::scenarios::ScenarioGenerator;

use crate::config::RunConfig;
use crate::error::Result;
use crate::inputs::{load_market, load_shifts};

/// Run the scenarios command
pub fn run(config: &RunConfig) -> Result<()> {
    let shifts = load_shifts(&config.inputs.shifts)?;
    let market = load_market(&config.inputs.market)?;
    let scenarios = ScenarioGenerator::new(&shifts)?.generate(&market);

    println!("{:>6}  {:>7}  Scenario", "Index", "Quotes");
    for scenario in scenarios.iter() {
        println!(
            "{:>6}  {:>7}  {}",
            scenario.index(),
            scenario.shifts().len(),
            scenario.label()
        );
    }
    Ok(())
}
