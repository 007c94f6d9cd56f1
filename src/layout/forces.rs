use emath::{Vec2, vec2};

use super::quadtree::QuadTree;

/// Below this squared distance two points count as coincident.
const MIN_DISTANCE_SQ: f32 = 1.0;

/// A link pulling two bodies toward `distance`, split by `bias`.
#[derive(Clone, Copy, Debug)]
pub(super) struct Spring {
    pub(super) from: usize,
    pub(super) to: usize,
    pub(super) distance: f32,
    pub(super) strength: f32,
    pub(super) bias: f32,
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    /// Already scaled by alpha.
    pub(super) strength: f32,
    pub(super) theta_sq: f32,
}

fn fallback_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

pub(super) fn apply_springs(
    springs: &[Spring],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    alpha: f32,
) {
    for spring in springs {
        let predicted_to = positions[spring.to] + velocities[spring.to];
        let predicted_from = positions[spring.from] + velocities[spring.from];
        let mut delta = predicted_to - predicted_from;
        let mut length = delta.length();
        if length < 1e-4 {
            delta = fallback_direction(spring.from, spring.to) * 1e-3;
            length = delta.length();
        }

        let pull = (length - spring.distance) / length * alpha * spring.strength;
        let correction = delta * pull;
        velocities[spring.to] -= correction * spring.bias;
        velocities[spring.from] += correction * (1.0 - spring.bias);
    }
}

/// Many-body push on every body: exact inside near leaves, one centroid term for
/// cells that look small from where the body stands.
pub(super) fn apply_charge(
    tree: &QuadTree,
    positions: &[Vec2],
    velocities: &mut [Vec2],
    params: ChargeParams,
) {
    for (body, velocity) in velocities.iter_mut().enumerate() {
        let point = positions[body];
        tree.visit(|cell| {
            if cell.is_leaf() {
                for &other in cell.bodies.iter().filter(|&&other| other != body) {
                    let mut delta = positions[other] - point;
                    let mut distance_sq = delta.length_sq();
                    if distance_sq < 1e-8 {
                        delta = fallback_direction(body, other);
                        distance_sq = 1.0;
                    }
                    *velocity += delta * (params.strength / distance_sq.max(MIN_DISTANCE_SQ));
                }
                return false;
            }

            let delta = cell.centroid - point;
            let distance_sq = delta.length_sq().max(MIN_DISTANCE_SQ);
            let side = cell.square.half * 2.0;
            let far = !cell.square.contains(point) && side * side < params.theta_sq * distance_sq;
            if far {
                *velocity += delta * (params.strength * cell.mass / distance_sq);
            }
            !far
        });
    }
}

fn collide_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    deltas: &mut [Vec2],
) {
    let min_distance = radii[from] + radii[to];
    let mut delta = positions[from] - positions[to];
    let mut distance = delta.length();
    if distance >= min_distance {
        return;
    }
    if distance < 1e-4 {
        delta = fallback_direction(from, to);
        distance = 1.0;
    }

    let overlap = (min_distance - distance) / distance * strength;
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let share = to_sq / (from_sq + to_sq);

    deltas[from] += delta * overlap * share;
    deltas[to] -= delta * overlap * (1.0 - share);
}

/// Pushes overlapping circles apart. Each body only descends into cells it
/// could reach with its own radius plus the cell's largest one, and each pair
/// is resolved once, by its lower index.
pub(super) fn accumulate_collisions(
    tree: &QuadTree,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    deltas: &mut [Vec2],
) {
    for body in 0..positions.len() {
        let point = positions[body];
        let reach = radii[body];
        tree.visit(|cell| {
            if cell.square.gap_to(point) > reach + cell.max_radius {
                return false;
            }
            for &other in cell.bodies.iter().filter(|&&other| other > body) {
                collide_pair(body, other, positions, radii, strength, deltas);
            }
            true
        });
    }
}

/// Translation that moves the free bodies' centroid toward `center`.
pub(super) fn center_shift(positions: &[Vec2], pinned: &[bool], center: Vec2, strength: f32) -> Vec2 {
    let mut sum = Vec2::ZERO;
    let mut count = 0usize;
    for (position, &is_pinned) in positions.iter().zip(pinned) {
        if !is_pinned {
            sum += *position;
            count += 1;
        }
    }

    if count == 0 {
        return Vec2::ZERO;
    }

    (center - sum / count as f32) * strength
}
