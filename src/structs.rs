//! # Core Data Structures
//!
//! This module defines the fundamental data types used throughout the library:
//!
//! - **Vec3**: 3D position/velocity/acceleration vector with arithmetic operations
//! - **AgentState**: Kinematic state of an agent (position, velocity)
//! - **Obstacle**: Static spherical obstacle
//! - **ControlParams**: APF gains and integration settings
//! - **PeerSnapshot**: Per-tick snapshot of every agent's last known position
//! - **AgentTask**: Mission record with start/goal positions for one agent

use crate::error::ApfError;
use pyo3::prelude::*;
use serde::Deserialize;
use std::ops::{Add, Mul, Neg, Sub};

#[pyclass]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    #[pyo3(get, set)]
    pub x: f64,
    #[pyo3(get, set)]
    pub y: f64,
    #[pyo3(get, set)]
    pub z: f64,
}

#[pymethods]
impl Vec3 {
    #[new]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    #[staticmethod]
    pub fn zeros() -> Self {
        Vec3::new(0.0, 0.0, 0.0)
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Unit vector in the same direction; the zero vector is returned unchanged.
    pub fn normalized(&self) -> Vec3 {
        let n = self.norm();
        if n == 0.0 {
            return *self;
        }
        Vec3::new(self.x / n, self.y / n, self.z / n)
    }

    pub fn distance(&self, other: &Vec3) -> f64 {
        (*other - *self).norm()
    }

    pub fn __str__(&self) -> String {
        format!("Vec3({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }

    pub fn __add__(&self, other: &Vec3) -> Vec3 {
        *self + *other
    }

    pub fn __sub__(&self, other: &Vec3) -> Vec3 {
        *self - *other
    }

    pub fn __mul__(&self, scalar: f64) -> Vec3 {
        *self * scalar
    }

    pub fn __rmul__(&self, scalar: f64) -> Vec3 {
        *self * scalar
    }

    pub fn __neg__(&self) -> Vec3 {
        -*self
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, scalar: f64) -> Vec3 {
        Vec3 {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(a: [f64; 3]) -> Vec3 {
        Vec3::new(a[0], a[1], a[2])
    }
}

#[pyclass]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentState {
    #[pyo3(get, set)]
    pub position: Vec3,
    #[pyo3(get, set)]
    pub velocity: Vec3,
}

#[pymethods]
impl AgentState {
    #[new]
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        AgentState { position, velocity }
    }

    /// Initial state at the mission start point with zero velocity.
    #[staticmethod]
    pub fn at_rest(position: Vec3) -> Self {
        AgentState {
            position,
            velocity: Vec3::zeros(),
        }
    }

    pub fn __str__(&self) -> String {
        format!(
            "AgentState(pos={}, vel={})",
            self.position.__str__(),
            self.velocity.__str__()
        )
    }
}

#[pyclass]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    #[pyo3(get, set)]
    pub position: Vec3,
    #[pyo3(get, set)]
    pub radius: f64,
}

#[pymethods]
impl Obstacle {
    #[new]
    pub fn new(position: Vec3, radius: f64) -> Self {
        Obstacle { position, radius }
    }

    pub fn __str__(&self) -> String {
        format!("Obstacle(pos={}, r={:.2})", self.position.__str__(), self.radius)
    }
}

/// APF gains and integration settings, fixed for the lifetime of a run.
///
/// Defaults match the original deployment tuning. `dist_floor` bounds the
/// separation distance fed into the repulsive gradient so the command stays
/// finite when two bodies touch.
#[pyclass]
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlParams {
    /// Attraction gain toward the goal.
    #[pyo3(get, set)]
    pub zeta: f64,
    /// Velocity damping gain.
    #[pyo3(get, set)]
    pub damp: f64,
    /// Repulsion gain for peers and obstacles.
    #[pyo3(get, set)]
    pub obs: f64,
    /// Repulsion-zone multiplier; the influence radius is `q` times the
    /// contact distance.
    #[pyo3(get, set)]
    pub q: f64,
    /// Agent body radius (m).
    #[pyo3(get, set)]
    pub radius: f64,
    /// Per-axis acceleration bound (m/s^2).
    #[pyo3(get, set)]
    pub max_acc: f64,
    /// Control tick period (s).
    #[pyo3(get, set)]
    pub dt: f64,
    /// Minimum separation fed into the repulsive gradient.
    #[pyo3(get, set)]
    pub dist_floor: f64,
}

impl Default for ControlParams {
    fn default() -> Self {
        ControlParams {
            zeta: 1.0,
            damp: 1.0,
            obs: 20.0,
            q: 3.0,
            radius: 0.15,
            max_acc: 6.0,
            dt: 0.02,
            dist_floor: 1e-6,
        }
    }
}

#[pymethods]
impl ControlParams {
    #[new]
    #[pyo3(signature = (
        zeta = 1.0,
        damp = 1.0,
        obs = 20.0,
        q = 3.0,
        radius = 0.15,
        max_acc = 6.0,
        dt = 0.02,
        dist_floor = 1e-6,
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        zeta: f64,
        damp: f64,
        obs: f64,
        q: f64,
        radius: f64,
        max_acc: f64,
        dt: f64,
        dist_floor: f64,
    ) -> Self {
        ControlParams {
            zeta,
            damp,
            obs,
            q,
            radius,
            max_acc,
            dt,
            dist_floor,
        }
    }

    /// Check the parameter invariants. Fatal at load time: a violated
    /// invariant would make the force computation meaningless.
    pub fn validate(&self) -> Result<(), ApfError> {
        if !(self.radius > 0.0) {
            return Err(ApfError::InvalidConfig(format!(
                "agent radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.dt > 0.0) {
            return Err(ApfError::InvalidConfig(format!(
                "tick period dt must be positive, got {}",
                self.dt
            )));
        }
        if !(self.q >= 1.0) {
            return Err(ApfError::InvalidConfig(format!(
                "repulsion-zone multiplier q must be >= 1, got {}",
                self.q
            )));
        }
        if !(self.max_acc > 0.0) {
            return Err(ApfError::InvalidConfig(format!(
                "max_acc must be positive, got {}",
                self.max_acc
            )));
        }
        if !(self.dist_floor > 0.0) {
            return Err(ApfError::InvalidConfig(format!(
                "dist_floor must be positive, got {}",
                self.dist_floor
            )));
        }
        Ok(())
    }

    pub fn __str__(&self) -> String {
        format!(
            "ControlParams(zeta={}, damp={}, obs={}, q={}, radius={}, max_acc={}, dt={})",
            self.zeta, self.damp, self.obs, self.q, self.radius, self.max_acc, self.dt
        )
    }
}

/// Last observed position of every agent, indexed by agent id.
///
/// A slot holds `None` until the external position source has produced a
/// reading for that agent; consumers skip `None` slots rather than reading a
/// stale or default position. Refreshed externally once per tick.
#[pyclass]
#[derive(Debug, Clone)]
pub struct PeerSnapshot {
    slots: Vec<Option<Vec3>>,
}

#[pymethods]
impl PeerSnapshot {
    /// Snapshot for `count` agents with every slot unavailable.
    #[new]
    pub fn new(count: usize) -> Self {
        PeerSnapshot {
            slots: vec![None; count],
        }
    }

    /// Record a position reading for `id`.
    pub fn record(&mut self, id: usize, position: Vec3) -> Result<(), ApfError> {
        let slot = self.slot_mut(id)?;
        *slot = Some(position);
        Ok(())
    }

    /// Mark `id` as unavailable for this tick (e.g. a failed lookup).
    pub fn clear(&mut self, id: usize) -> Result<(), ApfError> {
        let slot = self.slot_mut(id)?;
        *slot = None;
        Ok(())
    }

    pub fn get(&self, id: usize) -> Result<Option<Vec3>, ApfError> {
        self.slots
            .get(id)
            .copied()
            .ok_or(ApfError::PeerIndexOutOfRange {
                id,
                count: self.slots.len(),
            })
    }

    pub fn is_available(&self, id: usize) -> bool {
        matches!(self.slots.get(id), Some(Some(_)))
    }

    pub fn __len__(&self) -> usize {
        self.slots.len()
    }
}

impl PeerSnapshot {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate `(id, position)` over available slots only.
    pub fn iter_available(&self) -> impl Iterator<Item = (usize, Vec3)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.map(|p| (id, p)))
    }

    fn slot_mut(&mut self, id: usize) -> Result<&mut Option<Vec3>, ApfError> {
        let count = self.slots.len();
        self.slots
            .get_mut(id)
            .ok_or(ApfError::PeerIndexOutOfRange { id, count })
    }
}

#[pyclass]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentTask {
    #[pyo3(get, set)]
    pub agent_id: usize,
    #[pyo3(get, set)]
    pub start: Vec3,
    #[pyo3(get, set)]
    pub goal: Vec3,
}

#[pymethods]
impl AgentTask {
    #[new]
    pub fn new(agent_id: usize, start: Vec3, goal: Vec3) -> Self {
        AgentTask {
            agent_id,
            start,
            goal,
        }
    }

    pub fn __str__(&self) -> String {
        format!(
            "AgentTask(agent={}, start={}, goal={})",
            self.agent_id,
            self.start.__str__(),
            self.goal.__str__()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vec3_arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, -2.0, 0.5);

        assert_eq!(a + b, Vec3::new(5.0, 0.0, 3.5));
        assert_eq!(a - b, Vec3::new(-3.0, 4.0, 2.5));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
        assert_relative_eq!(a.dot(&b), 1.5);
    }

    #[test]
    fn test_vec3_norm_and_normalized() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        assert_relative_eq!(v.norm(), 5.0);
        assert_relative_eq!(v.normalized().norm(), 1.0);

        // Zero vector stays zero instead of producing NaN
        assert_eq!(Vec3::zeros().normalized(), Vec3::zeros());
    }

    #[test]
    fn test_params_defaults_are_valid() {
        assert!(ControlParams::default().validate().is_ok());
    }

    #[test]
    fn test_params_invariants_rejected() {
        let mut p = ControlParams::default();
        p.radius = 0.0;
        assert!(p.validate().is_err());

        let mut p = ControlParams::default();
        p.dt = -0.02;
        assert!(p.validate().is_err());

        let mut p = ControlParams::default();
        p.q = 0.5;
        assert!(p.validate().is_err());

        let mut p = ControlParams::default();
        p.dist_floor = 0.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_peer_snapshot_availability() {
        let mut snap = PeerSnapshot::new(3);
        assert!(!snap.is_available(0));

        snap.record(1, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(snap.is_available(1));
        assert_eq!(snap.get(1).unwrap(), Some(Vec3::new(1.0, 0.0, 0.0)));

        snap.clear(1).unwrap();
        assert!(!snap.is_available(1));
        assert_eq!(snap.get(1).unwrap(), None);
    }

    #[test]
    fn test_peer_snapshot_bounds_checked() {
        let mut snap = PeerSnapshot::new(2);
        assert!(snap.record(2, Vec3::zeros()).is_err());
        assert!(snap.clear(5).is_err());
        assert!(snap.get(2).is_err());
    }

    #[test]
    fn test_iter_available_skips_missing_slots() {
        let mut snap = PeerSnapshot::new(4);
        snap.record(0, Vec3::zeros()).unwrap();
        snap.record(3, Vec3::new(1.0, 1.0, 1.0)).unwrap();

        let ids: Vec<usize> = snap.iter_available().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 3]);
    }
}
