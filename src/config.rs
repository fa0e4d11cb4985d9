use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(
    name = "lacam",
    about = "LaCAM multi-agent path finding solver.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, short, help = "Path to the YAML config file")]
    pub config: Option<String>,

    #[arg(long, short, help = "Path to the scenario file, overrides the config")]
    pub scenario: Option<String>,
}

#[derive(Serialize, Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub scenario_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scenario_path: "scenarios/bypass.yaml".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(config_str: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(config_str)?;
        config.validate()
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(scenario) = &cli.scenario {
            self.scenario_path = scenario.clone();
        }
        self.validate()
    }

    pub fn validate(self) -> anyhow::Result<Self> {
        if self.scenario_path.is_empty() {
            anyhow::bail!("scenario_path must not be empty");
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_and_yaml_override() {
        let config = Config::default();
        assert_eq!(config.scenario_path, "scenarios/bypass.yaml");

        let config = Config::from_yaml_str("scenario_path: scenarios/grid.yaml\n").unwrap();
        assert_eq!(config.scenario_path, "scenarios/grid.yaml");
    }
}
