//! Double-integrator (point-mass) state update.
//!
//! Fixed-step Taylor update for position with an explicit velocity step:
//!
//! ```text
//! x_{n+1} = x_n + v_n * dt + 0.5 * u * dt^2
//! v_{n+1} = v_n + u * dt
//! ```
//!
//! No stability bound is enforced here; `dt` must be chosen small enough for
//! the gains in play, which is a tuning concern of the deployment.

use crate::structs::{AgentState, Vec3};

/// Advance `state` by one tick under the constant acceleration `u`.
pub fn integrate(state: &mut AgentState, u: Vec3, dt: f64) {
    state.position = state.position + state.velocity * dt + u * (0.5 * dt * dt);
    state.velocity = state.velocity + u * dt;
}
