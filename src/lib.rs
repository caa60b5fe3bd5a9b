//! # APF Core
//!
//! A multi-agent Artificial Potential Field (APF) controller library with
//! Python bindings.
//!
//! ## Algorithm
//!
//! Each agent runs a purely reactive control loop at a fixed rate: the goal
//! pulls with a conic attractive potential, nearby peers and static spherical
//! obstacles push with inverse-distance repulsive potentials, a damping term
//! stabilizes the closed loop, and the summed command is clamped per axis
//! before a double-integrator state update. See [`apf`] for the force model
//! and [`dynamics`] for the integrator.
//!
//! ## Usage
//!
//! The library is primarily used through Python bindings via PyO3. A driver
//! loads a [`mission::Mission`], builds one [`agent::ApfAgent`] per mission
//! entry, and per tick refreshes a [`structs::PeerSnapshot`] from whatever
//! position exchange is in use before calling `tick`. Transport, scheduling,
//! and visualization stay on the Python side; the crate is the control law.

use pyo3::prelude::*;

pub mod agent;
pub mod apf;
pub mod dynamics;
pub mod error;
pub mod mission;
pub mod structs;

use agent::ApfAgent;
use apf::CollisionReport;
use mission::Mission;
use structs::{AgentState, AgentTask, ControlParams, Obstacle, PeerSnapshot, Vec3};

#[pyfunction]
fn compute_apf_command(
    agent_id: usize,
    state: &AgentState,
    goal: Vec3,
    peers: &PeerSnapshot,
    obstacles: Vec<Obstacle>,
    params: &ControlParams,
) -> Vec3 {
    apf::apf_command(agent_id, state, goal, peers, &obstacles, params)
}

#[pyfunction]
fn integrate_state(state: &mut AgentState, command: Vec3, dt: f64) {
    dynamics::integrate(state, command, dt);
}

#[pyfunction]
fn check_collisions(
    agent_id: usize,
    position: Vec3,
    peers: &PeerSnapshot,
    obstacles: Vec<Obstacle>,
    params: &ControlParams,
) -> CollisionReport {
    apf::check_collisions(agent_id, position, peers, &obstacles, params)
}

#[pyfunction]
fn load_mission(path: &str) -> PyResult<Mission> {
    Ok(Mission::load(path)?)
}

/// Evenly space `count` agents on a circle of radius `circle_radius` in the
/// z = 0 plane, each tasked with reaching its antipodal point. The classic
/// all-cross-the-center stress test for reactive avoidance.
#[pyfunction]
fn create_circle_exchange_scenario(
    count: usize,
    circle_radius: f64,
    params: ControlParams,
) -> PyResult<Mission> {
    let mut agents = Vec::with_capacity(count);
    for agent_id in 0..count {
        let angle = 2.0 * std::f64::consts::PI * agent_id as f64 / count as f64;
        let start = Vec3::new(circle_radius * angle.cos(), circle_radius * angle.sin(), 0.0);
        agents.push(AgentTask::new(agent_id, start, -start));
    }
    Ok(Mission::new(agents, Vec::new(), params)?)
}

/// Two agents facing each other along the x axis, swapping positions, with
/// an optional obstacle midway between them.
#[pyfunction]
#[pyo3(signature = (separation, params, obstacle_radius = None))]
fn create_head_on_scenario(
    separation: f64,
    params: ControlParams,
    obstacle_radius: Option<f64>,
) -> PyResult<Mission> {
    let half = separation / 2.0;
    let left = Vec3::new(-half, 0.0, 0.0);
    let right = Vec3::new(half, 0.0, 0.0);
    let agents = vec![
        AgentTask::new(0, left, right),
        AgentTask::new(1, right, left),
    ];
    let obstacles = match obstacle_radius {
        Some(radius) => vec![Obstacle::new(Vec3::zeros(), radius)],
        None => Vec::new(),
    };
    Ok(Mission::new(agents, obstacles, params)?)
}

#[pymodule]
fn apf_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data structures
    m.add_class::<Vec3>()?;
    m.add_class::<AgentState>()?;
    m.add_class::<Obstacle>()?;
    m.add_class::<ControlParams>()?;
    m.add_class::<PeerSnapshot>()?;
    m.add_class::<AgentTask>()?;
    m.add_class::<Mission>()?;
    m.add_class::<CollisionReport>()?;
    m.add_class::<ApfAgent>()?;

    // Core algorithms
    m.add_function(wrap_pyfunction!(compute_apf_command, m)?)?;
    m.add_function(wrap_pyfunction!(integrate_state, m)?)?;
    m.add_function(wrap_pyfunction!(check_collisions, m)?)?;

    // Mission and scenario utilities
    m.add_function(wrap_pyfunction!(load_mission, m)?)?;
    m.add_function(wrap_pyfunction!(create_circle_exchange_scenario, m)?)?;
    m.add_function(wrap_pyfunction!(create_head_on_scenario, m)?)?;

    Ok(())
}
