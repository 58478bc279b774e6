/// Planar point or vector: `[x, y]`. Used for both positions and velocities.
pub type Point = [f64; 2];

/// Default top speed for a massless cell.
pub const MAX_SPEED: f64 = 25.0;

/// Mass at which the speed cap is halved.
pub const SPEED_SOFTENING_MASS: f64 = 50.0;

pub fn distance(a: Point, b: Point) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

pub fn speed(v: Point) -> f64 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}

/// Mass-adjusted speed cap. Heavier cells get a smoothly lower limit.
pub fn speed_cap(mass: f64, max_speed: f64) -> f64 {
    max_speed * SPEED_SOFTENING_MASS / (SPEED_SOFTENING_MASS + mass)
}

/// Clamp `v` to the mass-adjusted cap for [`MAX_SPEED`].
pub fn rescale_velocity(v: Point, mass: f64) -> Point {
    rescale_velocity_capped(v, mass, MAX_SPEED)
}

/// Clamp `v` to `speed_cap(mass, max_speed)`.
///
/// Vectors already under the cap are returned untouched, so a slow cell
/// never has its heading or speed perturbed by rounding.
pub fn rescale_velocity_capped(v: Point, mass: f64, max_speed: f64) -> Point {
    let cap = speed_cap(mass, max_speed);
    let len = speed(v);
    if len > cap {
        let scale = cap / len;
        [v[0] * scale, v[1] * scale]
    } else {
        v
    }
}
