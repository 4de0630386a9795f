//! # Flow Particles
//!
//! Procedural points that stream along each wire to show where current
//! flows. Nothing is simulated: positions are a pure function of elapsed time,
//! so the same `(time, currents)` always yields the same frame.

use log::debug;

use super::{wire_span, CurrentSet};
use crate::color::{ColorScale, Rgb};
use crate::config::CurrentOptions;
use crate::coords::sim_to_render;
use crate::types::{Vec3, WireId, WireSample};

/// Per-wire animation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FlowWire {
    pub tag: WireId,
    /// Render-space wire ends; first and last segment sample when the wire
    /// geometry is unknown
    pub start: Vec3,
    pub end: Vec3,
    /// Mean current over the wire, normalized by the global peak
    pub level: f64,
    pub count: usize,
    /// Loop fractions per second
    pub speed: f64,
    pub size: f64,
    pub color: Rgb,
}

impl FlowWire {
    /// Position of particle `i` at time `t`
    pub fn position(&self, i: usize, t: f64) -> Vec3 {
        let phase = (i as f64 / self.count.max(1) as f64 + t * self.speed).rem_euclid(1.0);
        self.start.lerp(&self.end, phase)
    }
}

/// One point of the particle stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowParticle {
    pub tag: WireId,
    pub position: Vec3,
    pub size: f64,
    pub color: Rgb,
}

/// Scales counts down by one shared ratio when they exceed `budget`.
///
/// Each count is first rounded down; the leftover goes one at a time to the
/// largest remainders, ties to the lower index. The result sums to exactly
/// `budget`, and a non-increasing input stays non-increasing.
pub fn allocate_counts(raw: &[usize], budget: usize) -> Vec<usize> {
    let total: usize = raw.iter().sum();
    if total <= budget {
        return raw.to_vec();
    }
    let (total, share) = (total as u128, budget as u128);
    let mut counts = Vec::with_capacity(raw.len());
    let mut remainders = Vec::with_capacity(raw.len());
    for &c in raw {
        let scaled = c as u128 * share;
        counts.push((scaled / total) as usize);
        remainders.push(scaled % total);
    }

    let leftover = budget - counts.iter().sum::<usize>();
    let mut order: Vec<usize> = (0..raw.len()).collect();
    order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]).then(a.cmp(&b)));
    for &i in order.iter().take(leftover) {
        counts[i] += 1;
    }
    counts
}

/// Time-driven particle model for all wires
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowModel {
    pub wires: Vec<FlowWire>,
}

impl FlowModel {
    /// Particles run along each wire in `wires` from `p1` to `p2`
    pub fn new(set: &CurrentSet, wires: &[WireSample], options: &CurrentOptions) -> Self {
        if set.max_magnitude <= 0.0 {
            return Self::default();
        }
        let scale = ColorScale::current();

        let mut flows: Vec<FlowWire> = set
            .wires
            .iter()
            .filter_map(|w| {
                let (start, end) = match wire_span(wires, w.tag) {
                    Some(span) => span,
                    None => (
                        sim_to_render(w.samples.first()?.position),
                        sim_to_render(w.samples.last()?.position),
                    ),
                };
                if start.distance(&end) <= 1e-12 {
                    return None;
                }
                let level = set.normalized(w.mean_magnitude());
                let raw = (level * options.particles_per_wire_max as f64).round() as usize;
                Some(FlowWire {
                    tag: w.tag,
                    start,
                    end,
                    level,
                    count: raw.min(options.particles_per_wire_max),
                    speed: options.particle_speed * (0.25 + 0.75 * level),
                    size: options.particle_size * (0.5 + 0.5 * level),
                    color: scale.sample(level),
                })
            })
            .collect();

        let raw: Vec<usize> = flows.iter().map(|w| w.count).collect();
        let scaled = allocate_counts(&raw, options.particle_budget);
        for (flow, count) in flows.iter_mut().zip(scaled) {
            flow.count = count;
        }

        let model = Self { wires: flows };
        debug!(
            "flow particles: {} wires, {} particles (budget {})",
            model.wires.len(),
            model.total(),
            options.particle_budget
        );
        model
    }

    pub fn total(&self) -> usize {
        self.wires.iter().map(|w| w.count).sum()
    }

    /// Every particle at elapsed time `t` (seconds)
    pub fn particles(&self, t: f64) -> Vec<FlowParticle> {
        let mut out = Vec::with_capacity(self.total());
        for w in &self.wires {
            for i in 0..w.count {
                out.push(FlowParticle { tag: w.tag, position: w.position(i, t), size: w.size, color: w.color });
            }
        }
        out
    }
}
