//! Broad-phase spatial hash and pairwise overlap resolution across all strokes.

use crate::settings::MAX_COLLISION_CANDIDATES;
use crate::stroke::Stroke;
use std::collections::HashMap;

/// Pack two cell coordinates into one map key
pub fn cell_key(cx: i32, cy: i32) -> u64 {
    (u64::from(cx as u32) << 32) | u64::from(cy as u32)
}

/// Flattened copy of a particle used during one resolve pass
#[derive(Debug, Clone, Copy)]
struct Body {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    r: f32,
    stroke: usize,
    index: usize,
}

impl Body {
    /// Neighbours within a chain are held apart by their spring
    fn is_chain_neighbour(&self, other: &Body) -> bool {
        self.stroke == other.stroke && self.index.abs_diff(other.index) <= 1
    }
}

/// Uniform grid over every particle, rebuilt each frame
#[derive(Debug, Default)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<u64, Vec<usize>>,
    bodies: Vec<Body>,
}

impl SpatialHash {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell_of(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Snapshot all finite particles and bucket them by cell
    fn rebuild<'a, I>(&mut self, strokes: I, cell_size: f32)
    where
        I: IntoIterator<Item = &'a Stroke>,
    {
        self.cell_size = cell_size.max(1.0);
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.bodies.clear();

        for (stroke_idx, stroke) in strokes.into_iter().enumerate() {
            if !stroke.is_finite() {
                continue;
            }
            for (index, p) in stroke.particles.iter().enumerate() {
                self.bodies.push(Body {
                    x: p.x,
                    y: p.y,
                    vx: p.vx,
                    vy: p.vy,
                    r: p.r,
                    stroke: stroke_idx,
                    index,
                });
            }
        }

        for i in 0..self.bodies.len() {
            let (cx, cy) = self.cell_of(self.bodies[i].x, self.bodies[i].y);
            self.cells.entry(cell_key(cx, cy)).or_default().push(i);
        }
    }

    /// Separate overlapping non-neighbour particles and damp their closing speed.
    /// `strength` scales both the positional push and the velocity correction.
    pub fn resolve<'a, I>(&mut self, strokes: I, cell_size: f32, strength: f32)
    where
        I: IntoIterator<Item = &'a mut Stroke>,
    {
        let mut strokes: Vec<&mut Stroke> = strokes.into_iter().collect();
        self.rebuild(strokes.iter().map(|s| &**s), cell_size);

        let mut candidates = Vec::with_capacity(MAX_COLLISION_CANDIDATES);
        for a in 0..self.bodies.len() {
            self.gather(a, &mut candidates);
            for &b in &candidates {
                let (left, right) = self.bodies.split_at_mut(b);
                separate(&mut left[a], &mut right[0], strength);
            }
        }

        for body in &self.bodies {
            if let Some(p) = strokes
                .get_mut(body.stroke)
                .and_then(|s| s.particles.get_mut(body.index))
            {
                p.x = body.x;
                p.y = body.y;
                p.vx = body.vx;
                p.vy = body.vy;
            }
        }
    }

    /// Partners for `a` from the surrounding 3x3 cells, capped. Only higher
    /// indices are gathered so each unordered pair is owned by its lower body.
    fn gather(&self, a: usize, out: &mut Vec<usize>) {
        out.clear();
        let body = self.bodies[a];
        let (cx, cy) = self.cell_of(body.x, body.y);

        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(bucket) = self.cells.get(&cell_key(cx + dx, cy + dy)) else {
                    continue;
                };
                for &b in bucket {
                    if b <= a || body.is_chain_neighbour(&self.bodies[b]) {
                        continue;
                    }
                    out.push(b);
                    if out.len() >= MAX_COLLISION_CANDIDATES {
                        return;
                    }
                }
            }
        }
    }
}

fn separate(a: &mut Body, b: &mut Body, strength: f32) {
    let min_dist = (a.r + b.r) * 0.98;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist >= min_dist {
        return;
    }
    let (nx, ny) = if dist > 0.0 {
        (dx / dist, dy / dist)
    } else {
        (1.0, 0.0)
    };

    let push = (min_dist - dist) * 0.5 * strength;
    a.x -= nx * push;
    a.y -= ny * push;
    b.x += nx * push;
    b.y += ny * push;

    // Only approaching pairs lose speed; nothing is ever added
    let closing = (b.vx - a.vx) * nx + (b.vy - a.vy) * ny;
    if closing < 0.0 {
        let share = closing * 0.25 * strength * 0.5;
        a.vx += nx * share;
        a.vy += ny * share;
        b.vx -= nx * share;
        b.vy -= ny * share;
    }
}
