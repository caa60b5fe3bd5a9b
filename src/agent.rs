//! Per-agent control loop wrapper.
//!
//! `ApfAgent` owns one agent's kinematic state and runs the tick sequence of
//! the original system: compute the APF command from the supplied peer
//! snapshot, integrate the double-integrator state, then run the collision
//! diagnostic. Scheduling belongs to the caller: an external fixed-period
//! tick driver refreshes the snapshot and invokes [`ApfAgent::tick`], and
//! reads the updated pose back out afterwards. Agents are independent
//! instances sharing no mutable state.

use crate::apf::{apf_command, check_collisions, CollisionReport};
use crate::dynamics::integrate;
use crate::error::ApfError;
use crate::mission::Mission;
use crate::structs::{AgentState, ControlParams, Obstacle, PeerSnapshot, Vec3};
use pyo3::prelude::*;

#[pyclass]
#[derive(Debug, Clone)]
pub struct ApfAgent {
    #[pyo3(get)]
    pub agent_id: usize,
    #[pyo3(get)]
    pub goal: Vec3,
    #[pyo3(get)]
    pub state: AgentState,
    params: ControlParams,
    obstacles: Vec<Obstacle>,
}

#[pymethods]
impl ApfAgent {
    /// Build the agent for `agent_id` from a validated mission: position at
    /// the mission start point, velocity zero.
    #[new]
    pub fn new(mission: &Mission, agent_id: usize) -> Result<Self, ApfError> {
        let task = mission.task(agent_id)?;
        Ok(ApfAgent {
            agent_id,
            goal: task.goal,
            state: AgentState::at_rest(task.start),
            params: mission.params,
            obstacles: mission.obstacles.clone(),
        })
    }

    /// Run one control tick against the externally refreshed peer snapshot
    /// and return the applied acceleration command.
    pub fn tick(&mut self, peers: &PeerSnapshot) -> Vec3 {
        let u = apf_command(
            self.agent_id,
            &self.state,
            self.goal,
            peers,
            &self.obstacles,
            &self.params,
        );
        integrate(&mut self.state, u, self.params.dt);
        check_collisions(
            self.agent_id,
            self.state.position,
            peers,
            &self.obstacles,
            &self.params,
        );
        u
    }

    /// Collision diagnostic for the current position, without advancing state.
    pub fn collision_report(&self, peers: &PeerSnapshot) -> CollisionReport {
        check_collisions(
            self.agent_id,
            self.state.position,
            peers,
            &self.obstacles,
            &self.params,
        )
    }

    /// Current position, for the pose sink / peer exchange boundary.
    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.state.velocity
    }

    pub fn at_goal(&self, tolerance: f64) -> bool {
        self.state.position.distance(&self.goal) <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solo_mission() -> Mission {
        Mission::from_yaml_str(
            "agents:\n  - start: [0.0, 0.0, 0.0]\n    goal: [5.0, 0.0, 0.0]\n",
        )
        .unwrap()
    }

    /// Snapshot where only the agent itself has reported.
    fn self_only(agent: &ApfAgent, count: usize) -> PeerSnapshot {
        let mut snap = PeerSnapshot::new(count);
        snap.record(agent.agent_id, agent.position()).unwrap();
        snap
    }

    #[test]
    fn test_first_tick_matches_hand_computation() {
        // zeta = damp = 1, dt = 0.02; at rest 5 m from the goal the command
        // is the unit pull (1, 0, 0) and the first step covers 0.5*dt^2.
        let mut agent = ApfAgent::new(&solo_mission(), 0).unwrap();
        let peers = self_only(&agent, 1);

        let u = agent.tick(&peers);

        assert_relative_eq!(u.x, 1.0);
        assert_relative_eq!(u.y, 0.0);
        assert_relative_eq!(u.z, 0.0);
        assert_relative_eq!(agent.position().x, 0.0002, max_relative = 1e-12);
        assert_relative_eq!(agent.velocity().x, 0.02);
    }

    #[test]
    fn test_agent_converges_to_goal() {
        let mut agent = ApfAgent::new(&solo_mission(), 0).unwrap();

        // 60 simulated seconds at dt = 0.02
        for _ in 0..3000 {
            let peers = self_only(&agent, 1);
            agent.tick(&peers);
        }

        assert!(
            agent.at_goal(0.2),
            "agent ended {} from the goal",
            agent.position().distance(&agent.goal)
        );
    }

    #[test]
    fn test_unavailable_peer_does_not_stall_the_tick() {
        let mission = Mission::from_yaml_str(
            "agents:\n  - start: [0.0, 0.0, 0.0]\n    goal: [5.0, 0.0, 0.0]\n  - start: [5.0, 0.0, 0.0]\n    goal: [0.0, 0.0, 0.0]\n",
        )
        .unwrap();
        let mut agent = ApfAgent::new(&mission, 0).unwrap();

        // Peer 1 never reports; the tick proceeds on attraction alone
        let peers = self_only(&agent, 2);
        let u = agent.tick(&peers);

        assert_relative_eq!(u.x, 1.0);
        assert!(agent.position().x > 0.0);
    }

    #[test]
    fn test_agent_id_out_of_range_is_fatal() {
        assert!(matches!(
            ApfAgent::new(&solo_mission(), 3),
            Err(ApfError::AgentIdOutOfRange { id: 3, count: 1 })
        ));
    }

    #[test]
    fn test_collision_report_does_not_advance_state() {
        let agent = ApfAgent::new(&solo_mission(), 0).unwrap();
        let before = agent.state;

        let report = agent.collision_report(&self_only(&agent, 1));

        assert!(!report.any());
        assert_eq!(agent.state, before);
    }
}
