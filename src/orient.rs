use crate::settings::ANGLE_BLEND;
use crate::stroke::{Particle, Stroke};
use std::f32::consts::{PI, TAU};

/// Wrap an angle into `[-PI, PI]`
pub fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}

/// Interpolate from `from` toward `to` along the shorter arc
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let delta = wrap_angle(to - from);
    wrap_angle(from + delta * t)
}

fn heading(dx: f32, dy: f32) -> Option<f32> {
    (dx != 0.0 || dy != 0.0).then(|| dy.atan2(dx))
}

/// Tangent direction at particle `i`: central difference, one-sided at the ends,
/// then velocity, then seed direction, then +x
pub fn desired_angle(particles: &[Particle], i: usize) -> f32 {
    let p = &particles[i];
    let prev = i.checked_sub(1).and_then(|j| particles.get(j));
    let next = particles.get(i + 1);

    let tangent = match (prev, next) {
        (Some(a), Some(b)) => heading(b.x - a.x, b.y - a.y),
        (None, Some(b)) => heading(b.x - p.x, b.y - p.y),
        (Some(a), None) => heading(p.x - a.x, p.y - a.y),
        (None, None) => None,
    };

    tangent
        .or_else(|| heading(p.vx, p.vy))
        .or_else(|| heading(p.dir_x, p.dir_y))
        .unwrap_or(0.0)
}

/// Ease every particle's render angle toward its tangent
pub fn smooth(stroke: &mut Stroke) {
    for i in 0..stroke.particles.len() {
        let target = desired_angle(&stroke.particles, i);
        let p = &mut stroke.particles[i];
        p.last_angle = lerp_angle(p.last_angle, target, ANGLE_BLEND);
    }
}
