/// Integer pixel coordinates, y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Iv2 {
    pub x: i32,
    pub y: i32,
}

pub const fn iv2(x: i32, y: i32) -> Iv2 {
    Iv2 { x, y }
}

impl Iv2 {
    #[inline]
    pub fn sub(self, other: Iv2) -> Iv2 {
        iv2(self.x - other.x, self.y - other.y)
    }

    #[inline]
    pub fn add(self, other: Iv2) -> Iv2 {
        iv2(self.x + other.x, self.y + other.y)
    }
}

/// z-component of the cross product of `a` and `b`.
#[inline]
pub fn cross(a: Iv2, b: Iv2) -> i64 {
    (a.x as i64) * (b.y as i64) - (a.y as i64) * (b.x as i64)
}

#[inline]
pub fn dot(a: Iv2, b: Iv2) -> i64 {
    (a.x as i64) * (b.x as i64) + (a.y as i64) * (b.y as i64)
}

#[inline]
pub fn dist(p1: Iv2, p2: Iv2) -> f64 {
    let dx = (p2.x - p1.x) as f64;
    let dy = (p2.y - p1.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Angle in whole degrees between the vectors `p1→p2` and `q1→q2`.
/// The cosine is clamped before `acos`, so degenerate inputs saturate
/// instead of producing NaN.
pub fn angle_deg(p1: Iv2, p2: Iv2, q1: Iv2, q2: Iv2) -> i32 {
    let v1 = p2.sub(p1);
    let v2 = q2.sub(q1);

    let d = dot(v1, v2) as f64;
    let m1 = ((v1.x as f64).powi(2) + (v1.y as f64).powi(2)).sqrt();
    let m2 = ((v2.x as f64).powi(2) + (v2.y as f64).powi(2)).sqrt();

    if m1 == 0.0 || m2 == 0.0 {
        return 0;
    }

    let a = (d / (m1 * m2)).clamp(-1.0, 1.0);
    a.acos().to_degrees() as i32
}

/// Midpoint with floor division (matches pixel-grid snapping everywhere else).
#[inline]
pub fn midpoint(p1: Iv2, p2: Iv2) -> Iv2 {
    iv2(
        (p1.x + p2.x).div_euclid(2),
        (p1.y + p2.y).div_euclid(2),
    )
}

#[inline]
pub fn centroid3(p1: Iv2, p2: Iv2, p3: Iv2) -> Iv2 {
    iv2(
        (p1.x + p2.x + p3.x).div_euclid(3),
        (p1.y + p2.y + p3.y).div_euclid(3),
    )
}

/// Perpendicular distance from `p` to the infinite line through `p1`,`p2`.
/// Collapses to point distance when the segment is degenerate.
pub fn line_point_dist(p1: Iv2, p2: Iv2, p: Iv2) -> f64 {
    if p1 == p2 {
        return dist(p1, p);
    }

    let num = ((p2.x - p1.x) as f64) * ((p1.y - p.y) as f64)
        - ((p1.x - p.x) as f64) * ((p2.y - p1.y) as f64);
    let den = (((p2.x - p1.x) as f64).powi(2) + ((p2.y - p1.y) as f64).powi(2)).sqrt();

    num.abs() / den
}
