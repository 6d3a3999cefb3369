use crate::stroke::{Particle, Stroke};

/// Usable rectangle plus the vertical font extents used in baseline mode
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub ascent: f32,
    pub descent: f32,
}

impl Bounds {
    /// The whole canvas
    pub const fn new(width: f32, height: f32, ascent: f32, descent: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            right: width,
            bottom: height,
            ascent,
            descent,
        }
    }

    /// Shrink by `[top, right, bottom, left]`; negative insets count as zero
    pub fn inset(self, padding: [f32; 4]) -> Self {
        let [top, right, bottom, left] = padding.map(|p| p.max(0.0));
        Self {
            left: self.left + left,
            top: self.top + top,
            right: (self.right - right).max(self.left + left),
            bottom: (self.bottom - bottom).max(self.top + top),
            ..self
        }
    }
}

/// Clamp `v` into `[lo, hi]`, reflecting `vel` away from whichever wall was hit.
/// If the span is narrower than the body both limits collapse to the centre line.
fn clamp_axis(
    v: &mut f32,
    vel: &mut f32,
    (lo, hi): (f32, f32),
    (min, max): (f32, f32),
    bounce: f32,
) {
    let (lo, hi) = if lo > hi {
        let mid = (lo + hi) * 0.5;
        (mid, mid)
    } else {
        (lo, hi)
    };
    if *v < lo {
        *v = lo;
        *vel = vel.abs() * bounce;
    } else if *v > hi {
        *v = hi;
        *vel = -vel.abs() * bounce;
    }
    // Keep inside the rectangle even for bodies larger than it
    *v = v.clamp(min, max.max(min));
}

/// Aligned mode: each particle is a circle of radius `r`
pub fn clamp_circle(p: &mut Particle, bounds: &Bounds, bounce: f32) {
    let r = p.r;
    let xs = (bounds.left, bounds.right);
    let ys = (bounds.top, bounds.bottom);
    clamp_axis(&mut p.x, &mut p.vx, (xs.0 + r, xs.1 - r), xs, bounce);
    clamp_axis(&mut p.y, &mut p.vy, (ys.0 + r, ys.1 - r), ys, bounce);
}

/// Baseline mode: each particle is its glyph box, horizontally centred on `x`
/// with the baseline at `y`
pub fn clamp_box(p: &mut Particle, bounds: &Bounds, bounce: f32) {
    let half = p.w * 0.5;
    let xs = (bounds.left, bounds.right);
    let ys = (bounds.top, bounds.bottom);
    clamp_axis(&mut p.x, &mut p.vx, (xs.0 + half, xs.1 - half), xs, bounce);
    clamp_axis(
        &mut p.y,
        &mut p.vy,
        (ys.0 + bounds.ascent, ys.1 - bounds.descent),
        ys,
        bounce,
    );
}

pub fn clamp<'a, I>(strokes: I, bounds: &Bounds, aligned: bool, bounce: f32)
where
    I: IntoIterator<Item = &'a mut Stroke>,
{
    for stroke in strokes {
        if !stroke.is_finite() {
            continue;
        }
        for p in stroke.particles.iter_mut() {
            if aligned {
                clamp_circle(p, bounds, bounce);
            } else {
                clamp_box(p, bounds, bounce);
            }
        }
    }
}
