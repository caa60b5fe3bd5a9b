//! # APF - Artificial Potential Field Controller
//!
//! This module implements the classical APF reactive controller: the goal is
//! an attractive potential source, peers and static obstacles are repulsive
//! sources, and the acceleration command is the superposition of their
//! gradients plus a velocity damping term.
//!
//! ## Algorithm Overview
//!
//! Per control tick the command is assembled from four parts:
//! 1. **Attraction**: a conic potential toward the goal. Within unit distance
//!    the pull is linear in the offset (`zeta * d`), so it vanishes smoothly
//!    at the goal; beyond unit distance it is a constant-magnitude unit pull
//!    (`zeta * d / |d|`). The two branches agree at `|d| = 1`, so the field
//!    is continuous there (though not differentiable).
//! 2. **Repulsion**: for every repulsive source within its influence radius
//!    `Q`, the gradient of the potential `0.5 * obs * (1/d - 1/Q)^2`:
//!
//!    ```text
//!    u += obs * (1/Q - 1/d) * (1/d^2) * (source - position) / d
//!    ```
//!
//!    Sources at or beyond `Q` contribute nothing, and the contribution goes
//!    to zero continuously as `d` approaches `Q`. For a peer agent
//!    `Q = q * 2 * radius`; for a static obstacle `Q = q * (radius + obstacle_radius)`.
//!    All in-range sources are summed (vector superposition).
//! 3. **Damping**: `-damp * velocity`, always active. This is what keeps the
//!    attraction/repulsion interplay from ringing forever.
//! 4. **Saturation**: each axis independently clamped to `[-max_acc, +max_acc]`.
//!    Axis-wise clamping can distort the direction of large commands, but it
//!    matches the actuator model this controller was tuned against, so it is
//!    kept rather than replaced with vector-norm clamping.
//!
//! ## Singularity Handling
//!
//! The repulsive gradient grows without bound as the separation approaches
//! zero. The separation fed into the gradient is floored at
//! `params.dist_floor`, so a touching or overlapping pair produces a large
//! but finite command (which the saturation then bounds) instead of
//! `inf`/`NaN`.
//!
//! ## Pros and Cons
//!
//! **Pros:**
//! - Purely reactive: needs only current positions, no map or plan
//! - Cheap: O(peers + obstacles) per tick
//! - Smooth commands away from the singular points
//!
//! **Cons:**
//! - Local minima can trap the agent (no planner behind it)
//! - Near-contact commands are dominated by the repulsion singularity
//! - Axis-wise saturation skews the direction of large commands
//!
//! The collision check in this module is a *diagnostic*: it reports contact
//! events for logging and analysis but feeds nothing back into the command.

use crate::structs::{AgentState, ControlParams, Obstacle, PeerSnapshot, Vec3};
use pyo3::prelude::*;

/// Compute the bounded acceleration command for one agent.
///
/// Pure function of its inputs; peers whose snapshot slot is unavailable are
/// skipped for this tick (with a warning) rather than treated as an error.
pub fn apf_command(
    agent_id: usize,
    state: &AgentState,
    goal: Vec3,
    peers: &PeerSnapshot,
    obstacles: &[Obstacle],
    params: &ControlParams,
) -> Vec3 {
    let u_goal = attraction(state.position, goal, params.zeta);
    let u_rep = repulsion(agent_id, state.position, peers, obstacles, params);
    let u_damp = state.velocity * -params.damp;

    clamp_axes(u_goal + u_rep + u_damp, params.max_acc)
}

/// Conic attractive term: linear well inside unit distance, constant-magnitude
/// pull outside.
fn attraction(position: Vec3, goal: Vec3, zeta: f64) -> Vec3 {
    let d = goal - position;
    let r = d.norm();
    if r < 1.0 {
        d * zeta
    } else {
        d * (zeta / r)
    }
}

/// Summed repulsive gradient over all in-range peers and obstacles.
fn repulsion(
    agent_id: usize,
    position: Vec3,
    peers: &PeerSnapshot,
    obstacles: &[Obstacle],
    params: &ControlParams,
) -> Vec3 {
    let mut u = Vec3::zeros();

    // Peers: influence radius scales the contact distance of two agent bodies.
    let peer_range = params.q * (2.0 * params.radius);
    for (id, peer_position) in peers.iter_available() {
        if id == agent_id {
            continue;
        }
        u = u + repulsive_gradient(position, peer_position, peer_range, params);
    }
    for id in 0..peers.len() {
        if id != agent_id && !peers.is_available(id) {
            log::warn!("peer {id} unavailable this tick, skipping its repulsion term");
        }
    }

    for obstacle in obstacles {
        let range = params.q * (params.radius + obstacle.radius);
        u = u + repulsive_gradient(position, obstacle.position, range, params);
    }

    u
}

/// Gradient of the inverse-distance repulsive potential `0.5*obs*(1/d - 1/Q)^2`
/// for a single source. Zero at and beyond the influence radius `Q`.
fn repulsive_gradient(position: Vec3, source: Vec3, q_range: f64, params: &ControlParams) -> Vec3 {
    let offset = source - position;
    // Floored so a touching pair yields a large but finite push.
    let distance = offset.norm().max(params.dist_floor);
    if distance >= q_range {
        return Vec3::zeros();
    }
    let magnitude = params.obs * (1.0 / q_range - 1.0 / distance) / (distance * distance);
    offset * (magnitude / distance)
}

/// Clamp each axis independently to `[-max_acc, +max_acc]`.
fn clamp_axes(u: Vec3, max_acc: f64) -> Vec3 {
    Vec3::new(
        u.x.clamp(-max_acc, max_acc),
        u.y.clamp(-max_acc, max_acc),
        u.z.clamp(-max_acc, max_acc),
    )
}

/// Per-tick contact report produced by [`check_collisions`].
#[pyclass]
#[derive(Debug, Clone)]
pub struct CollisionReport {
    /// Smallest distance to any available peer, `inf` when none are reachable.
    #[pyo3(get)]
    pub min_peer_distance: f64,
    /// True when the nearest peer is at or inside body contact (`2 * radius`).
    #[pyo3(get)]
    pub peer_collision: bool,
    /// Indices of obstacles at or inside surface contact.
    #[pyo3(get)]
    pub obstacle_collisions: Vec<usize>,
}

#[pymethods]
impl CollisionReport {
    pub fn any(&self) -> bool {
        self.peer_collision || !self.obstacle_collisions.is_empty()
    }

    pub fn __str__(&self) -> String {
        format!(
            "CollisionReport(min_peer_dist={:.3}, peer={}, obstacles={:?})",
            self.min_peer_distance, self.peer_collision, self.obstacle_collisions
        )
    }
}

/// Scan all peer and obstacle distances and report contact events.
///
/// Diagnostic only: the result is logged and returned, never fed back into
/// the force computation. The contact boundary is inclusive, so a pair at
/// exact surface contact counts as a collision.
pub fn check_collisions(
    agent_id: usize,
    position: Vec3,
    peers: &PeerSnapshot,
    obstacles: &[Obstacle],
    params: &ControlParams,
) -> CollisionReport {
    let mut min_peer_distance = f64::INFINITY;
    for (id, peer_position) in peers.iter_available() {
        if id == agent_id {
            continue;
        }
        let distance = position.distance(&peer_position);
        if distance < min_peer_distance {
            min_peer_distance = distance;
        }
    }

    let peer_collision = min_peer_distance <= 2.0 * params.radius;
    if peer_collision {
        log::warn!(
            "collision: agent {agent_id} minimum peer distance {min_peer_distance}"
        );
    }

    let mut obstacle_collisions = Vec::new();
    for (obs_id, obstacle) in obstacles.iter().enumerate() {
        let distance = position.distance(&obstacle.position);
        if distance <= params.radius + obstacle.radius {
            log::warn!(
                "collision: agent {agent_id} is {distance} from obstacle {obs_id}"
            );
            obstacle_collisions.push(obs_id);
        }
    }

    CollisionReport {
        min_peer_distance,
        peer_collision,
        obstacle_collisions,
    }
}
