use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub steps: usize,
    pub nodes_generated: usize,
    pub configurations_explored: usize,
    pub time_ms: usize,
}

impl Stats {
    pub(crate) fn print(&self) {
        info!(
            "Steps {:?} Time(ms) {:?} High level nodes generated: {:?} Configurations explored: {:?}",
            self.steps, self.time_ms, self.nodes_generated, self.configurations_explored
        );
    }
}
