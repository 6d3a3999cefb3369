//! Gravity, neighbour springs, damping and semi-implicit Euler integration.

use crate::settings::Params;
use crate::stroke::{Particle, Stroke};

/// Unit vector from `a` to `b` and their distance; `(1, 0)` when they coincide
pub fn direction(ax: f32, ay: f32, bx: f32, by: f32) -> (f32, f32, f32) {
    let dx = bx - ax;
    let dy = by - ay;
    let d = (dx * dx + dy * dy).sqrt();
    if d > 0.0 {
        (dx / d, dy / d, d)
    } else {
        (1.0, 0.0, 0.0)
    }
}

/// Spring rest length between two neighbours: mean of their advances
pub fn rest_length(a: &Particle, b: &Particle) -> f32 {
    (a.w + b.w) * 0.5
}

/// Apply gravity and the chain springs to velocities only
fn accumulate(particles: &mut [Particle], params: &Params) {
    for p in particles.iter_mut() {
        p.vy += params.gravity;
    }

    for i in 1..particles.len() {
        let (head, tail) = particles.split_at_mut(i);
        let prev = &mut head[i - 1];
        let cur = &mut tail[0];

        let (nx, ny, d) = direction(prev.x, prev.y, cur.x, cur.y);
        let diff = d - rest_length(prev, cur);
        let force = -params.stiffness * diff;

        cur.vx += force * nx;
        cur.vy += force * ny;
        prev.vx -= force * nx;
        prev.vy -= force * ny;
    }

    let keep = 1.0 - params.damping;
    for p in particles.iter_mut() {
        p.vx *= keep;
        p.vy *= keep;
    }
}

/// Advance every stroke by one frame. All velocity updates finish before any
/// position moves. Strokes holding non-finite state are skipped.
pub fn integrate<'a, I>(strokes: I, params: &Params)
where
    I: IntoIterator<Item = &'a mut Stroke>,
{
    let mut live: Vec<&mut Stroke> = Vec::new();
    for stroke in strokes {
        if !stroke.is_finite() {
            tracing::warn!(particles = stroke.len(), "skipping stroke with non-finite state");
            continue;
        }
        if stroke.has_springs() {
            accumulate(&mut stroke.particles, params);
        } else {
            // No spring partner: gravity and damping still apply
            for p in stroke.particles.iter_mut() {
                p.vy += params.gravity;
                p.vx *= 1.0 - params.damping;
                p.vy *= 1.0 - params.damping;
            }
        }
        live.push(stroke);
    }

    for stroke in live {
        for p in stroke.particles.iter_mut() {
            p.x += p.vx;
            p.y += p.vy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(xs: &[f32], w: f32) -> Stroke {
        let mut stroke = Stroke::new(0.0, 0.0, "AB");
        for (i, &x) in xs.iter().enumerate() {
            let mut p = Particle::new(x, 100.0, if i % 2 == 0 { 'A' } else { 'B' }, 1.0, 0.0);
            p.w = w;
            stroke.particles.push(p);
        }
        stroke
    }

    fn no_gravity() -> Params {
        Params {
            gravity: 0.0,
            damping: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_gravity_and_integration() {
        let mut stroke = chain(&[10.0], 20.0);
        let params = Params {
            gravity: 0.5,
            damping: 0.0,
            ..Default::default()
        };
        integrate([&mut stroke], &params);
        let p = &stroke.particles[0];
        assert_eq!(p.vy, 0.5);
        assert_eq!(p.y, 100.5);
        assert_eq!(p.x, 10.0);
    }

    #[test]
    fn test_stretched_spring_pulls_together_symmetrically() {
        let mut stroke = chain(&[0.0, 30.0], 20.0);
        let params = Params {
            stiffness: 0.1,
            ..no_gravity()
        };
        integrate([&mut stroke], &params);

        let (a, b) = (&stroke.particles[0], &stroke.particles[1]);
        // diff = 10, force = -1
        assert!((a.vx - 1.0).abs() < 1e-6);
        assert!((b.vx + 1.0).abs() < 1e-6);
        assert!((a.vx + b.vx).abs() < 1e-6);
    }

    #[test]
    fn test_compressed_spring_pushes_apart() {
        let mut stroke = chain(&[0.0, 10.0], 20.0);
        integrate([&mut stroke], &no_gravity());
        assert!(stroke.particles[0].vx < 0.0);
        assert!(stroke.particles[1].vx > 0.0);
    }

    #[test]
    fn test_variable_rest_length() {
        let mut a = Particle::new(0.0, 0.0, 'A', 1.0, 0.0);
        let mut b = Particle::new(0.0, 0.0, 'B', 1.0, 0.0);
        a.w = 30.0;
        b.w = 26.0;
        assert_eq!(rest_length(&a, &b), 28.0);
    }

    #[test]
    fn test_coincident_particles_stay_finite() {
        let mut stroke = chain(&[50.0, 50.0, 50.0], 20.0);
        integrate([&mut stroke], &no_gravity());
        assert!(stroke.is_finite());
        assert!(stroke.particles[0].x != stroke.particles[1].x);
    }

    #[test]
    fn test_damping_scales_velocity() {
        let mut stroke = chain(&[0.0], 20.0);
        stroke.particles[0].vx = 10.0;
        let params = Params {
            damping: 0.25,
            ..no_gravity()
        };
        integrate([&mut stroke], &params);
        assert_eq!(stroke.particles[0].vx, 7.5);
        assert_eq!(stroke.particles[0].x, 7.5);
    }

    #[test]
    fn test_non_finite_stroke_is_skipped() {
        let mut bad = chain(&[0.0, 20.0], 20.0);
        bad.particles[1].vx = f32::NAN;
        let mut good = chain(&[0.0, 20.0], 20.0);
        let params = Params {
            gravity: 1.0,
            damping: 0.0,
            ..Default::default()
        };
        integrate([&mut bad, &mut good], &params);

        assert_eq!(bad.particles[0].y, 100.0);
        assert_eq!(good.particles[0].y, 101.0);
    }

    #[test]
    fn test_free_falling_chain_keeps_rest_spacing() {
        let rest = 20.0;
        let mut stroke = chain(&[0.0, 20.0, 40.0, 60.0, 80.0], rest);
        let params = Params {
            gravity: 0.3,
            stiffness: 0.8,
            damping: 0.1,
            ..Default::default()
        };
        for _ in 0..200 {
            integrate([&mut stroke], &params);
        }
        for pair in stroke.particles.windows(2) {
            let d = ((pair[1].x - pair[0].x).powi(2) + (pair[1].y - pair[0].y).powi(2)).sqrt();
            assert!((d - rest).abs() < 0.01, "distance {d} drifted from {rest}");
        }
    }
}
