//! Mission file loading and validation.
//!
//! A mission is a YAML document listing every agent's start/goal pair, the
//! static obstacle field, and optional overrides for any subset of the
//! control parameters:
//!
//! ```yaml
//! agents:
//!   - start: [0.0, 0.0, 0.0]
//!     goal: [5.0, 0.0, 0.0]
//!   - start: [5.0, 0.0, 0.0]
//!     goal: [0.0, 0.0, 0.0]
//! obstacles:
//!   - position: [2.5, 0.5, 0.0]
//!     radius: 0.4
//! params:
//!   q: 2.0
//! ```
//!
//! All validation happens at load time: a malformed mission is an error
//! before any control tick runs, never a mid-run surprise.

use crate::error::ApfError;
use crate::structs::{AgentTask, ControlParams, Obstacle, Vec3};
use pyo3::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct AgentEntry {
    start: [f64; 3],
    goal: [f64; 3],
}

#[derive(Debug, Deserialize)]
struct ObstacleEntry {
    position: [f64; 3],
    radius: f64,
}

#[derive(Debug, Deserialize)]
struct MissionFile {
    agents: Vec<AgentEntry>,
    #[serde(default)]
    obstacles: Vec<ObstacleEntry>,
    #[serde(default)]
    params: ControlParams,
}

/// Validated mission configuration shared by every agent instance.
#[pyclass]
#[derive(Debug, Clone)]
pub struct Mission {
    #[pyo3(get)]
    pub agents: Vec<AgentTask>,
    #[pyo3(get)]
    pub obstacles: Vec<Obstacle>,
    #[pyo3(get)]
    pub params: ControlParams,
}

#[pymethods]
impl Mission {
    #[new]
    pub fn new(
        agents: Vec<AgentTask>,
        obstacles: Vec<Obstacle>,
        params: ControlParams,
    ) -> Result<Self, ApfError> {
        let mission = Mission {
            agents,
            obstacles,
            params,
        };
        mission.validate()?;
        Ok(mission)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Mission record for one agent, bounds-checked.
    pub fn task(&self, agent_id: usize) -> Result<AgentTask, ApfError> {
        self.agents
            .get(agent_id)
            .copied()
            .ok_or(ApfError::AgentIdOutOfRange {
                id: agent_id,
                count: self.agents.len(),
            })
    }

    pub fn __str__(&self) -> String {
        format!(
            "Mission({} agents, {} obstacles)",
            self.agents.len(),
            self.obstacles.len()
        )
    }
}

impl Mission {
    /// Parse and validate a mission from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ApfError> {
        let file: MissionFile = serde_yaml::from_str(text)?;

        let agents = file
            .agents
            .iter()
            .enumerate()
            .map(|(agent_id, entry)| {
                AgentTask::new(agent_id, Vec3::from(entry.start), Vec3::from(entry.goal))
            })
            .collect();
        let obstacles = file
            .obstacles
            .iter()
            .map(|entry| Obstacle::new(Vec3::from(entry.position), entry.radius))
            .collect();

        let mission = Mission {
            agents,
            obstacles,
            params: file.params,
        };
        mission.validate()?;
        Ok(mission)
    }

    /// Load a mission from a YAML file on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ApfError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ApfError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    fn validate(&self) -> Result<(), ApfError> {
        if self.agents.is_empty() {
            return Err(ApfError::InvalidConfig(
                "mission declares no agents".into(),
            ));
        }
        for (obs_id, obstacle) in self.obstacles.iter().enumerate() {
            if !(obstacle.radius >= 0.0) {
                return Err(ApfError::InvalidConfig(format!(
                    "obstacle {} has negative radius {}",
                    obs_id, obstacle.radius
                )));
            }
        }
        self.params.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TWO_AGENT_MISSION: &str = r#"
agents:
  - start: [0.0, 0.0, 0.0]
    goal: [5.0, 0.0, 0.0]
  - start: [5.0, 0.0, 0.0]
    goal: [0.0, 0.0, 0.0]
obstacles:
  - position: [2.5, 0.5, 0.0]
    radius: 0.4
"#;

    #[test]
    fn test_parse_two_agent_mission() {
        let mission = Mission::from_yaml_str(TWO_AGENT_MISSION).unwrap();

        assert_eq!(mission.agent_count(), 2);
        assert_eq!(mission.obstacles.len(), 1);
        assert_eq!(mission.agents[0].agent_id, 0);
        assert_eq!(mission.agents[0].goal, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(mission.agents[1].start, Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(mission.obstacles[0].radius, 0.4);

        // No params block: deployment defaults apply
        assert_relative_eq!(mission.params.dt, 0.02);
        assert_relative_eq!(mission.params.obs, 20.0);
    }

    #[test]
    fn test_obstacles_are_optional() {
        let mission = Mission::from_yaml_str(
            "agents:\n  - start: [0.0, 0.0, 0.0]\n    goal: [1.0, 1.0, 1.0]\n",
        )
        .unwrap();
        assert!(mission.obstacles.is_empty());
    }

    #[test]
    fn test_params_block_overrides_subset() {
        let mission = Mission::from_yaml_str(
            "agents:\n  - start: [0.0, 0.0, 0.0]\n    goal: [1.0, 0.0, 0.0]\nparams:\n  q: 2.0\n  zeta: 0.5\n",
        )
        .unwrap();
        assert_relative_eq!(mission.params.q, 2.0);
        assert_relative_eq!(mission.params.zeta, 0.5);
        // Untouched fields keep their defaults
        assert_relative_eq!(mission.params.damp, 1.0);
        assert_relative_eq!(mission.params.radius, 0.15);
    }

    #[test]
    fn test_negative_obstacle_radius_is_fatal() {
        let result = Mission::from_yaml_str(
            "agents:\n  - start: [0.0, 0.0, 0.0]\n    goal: [1.0, 0.0, 0.0]\nobstacles:\n  - position: [0.5, 0.0, 0.0]\n    radius: -0.1\n",
        );
        assert!(matches!(result, Err(ApfError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_params_are_fatal() {
        let result = Mission::from_yaml_str(
            "agents:\n  - start: [0.0, 0.0, 0.0]\n    goal: [1.0, 0.0, 0.0]\nparams:\n  dt: 0.0\n",
        );
        assert!(matches!(result, Err(ApfError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_agent_list_is_fatal() {
        let result = Mission::from_yaml_str("agents: []\n");
        assert!(matches!(result, Err(ApfError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        let result = Mission::from_yaml_str("agents:\n  - start: [0.0, 0.0]\n");
        assert!(matches!(result, Err(ApfError::Parse(_))));
    }

    #[test]
    fn test_task_lookup_bounds_checked() {
        let mission = Mission::from_yaml_str(TWO_AGENT_MISSION).unwrap();
        assert!(mission.task(1).is_ok());
        assert!(matches!(
            mission.task(2),
            Err(ApfError::AgentIdOutOfRange { id: 2, count: 2 })
        ));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = Mission::load("/nonexistent/mission.yaml");
        assert!(matches!(result, Err(ApfError::Io { .. })));
    }
}
