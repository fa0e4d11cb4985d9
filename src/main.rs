use anyhow::Result;
use clap::Parser;
use std::fs;
use tracing::info;

use lacam::config::{Cli, Config};
use lacam::scenario::Scenario;
use lacam::solver::{LaCAM, Solver};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_yaml_str(&fs::read_to_string(path)?)?,
        None => Config::default(),
    }
    .override_from_command_line(&cli)?;

    let scenario = Scenario::from_yaml(&config.scenario_path)?;
    let graph = scenario.to_graph()?;
    let agents = scenario.to_agents(&graph)?;

    let mut solver = LaCAM::new(agents.clone(), &graph);
    match solver.solve() {
        Some(solution) => {
            assert!(solution.verify(&graph, &agents));
            info!(
                "solved in {} synchronous steps over {} configurations",
                solution.makespan(),
                solution.configurations.len()
            );
        }
        None => info!("no solution"),
    }

    Ok(())
}
