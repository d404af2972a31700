//! Triangle mesh geometry and local-space ray queries.

use glam::Vec3;

const EPSILON: f32 = 1e-7;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Bounds of a point set, or `None` when empty.
    #[must_use]
    pub fn from_points(points: &[[f32; 3]]) -> Option<Self> {
        let first = Vec3::from_array(*points.first()?);
        let (min, max) = points.iter().skip(1).fold((first, first), |(lo, hi), p| {
            let p = Vec3::from_array(*p);
            (lo.min(p), hi.max(p))
        });
        Some(Self { min, max })
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Slab test. Returns the entry distance along `dir` (clamped to 0 when
    /// the origin is inside), or `None` on a miss or when the box is
    /// entirely behind the origin.
    #[must_use]
    pub fn ray_entry(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let inv = dir.recip();
        let t0 = (self.min - origin) * inv;
        let t1 = (self.max - origin) * inv;
        let t_near = t0.min(t1).max_element();
        let t_far = t0.max(t1).min_element();
        // NaN from 0 * inf (origin on a slab plane with a parallel ray)
        // fails both comparisons and is treated as a miss.
        if t_far >= t_near.max(0.0) {
            Some(t_near.max(0.0))
        } else {
            None
        }
    }
}

/// Indexed triangle mesh in node-local space.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals (same length as `positions`).
    pub normals: Vec<[f32; 3]>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
    /// Base color (linear RGBA).
    pub color: [f32; 4],
    bounds: Option<Aabb>,
}

impl MeshData {
    /// Build a mesh, generating area-weighted vertex normals when none are
    /// supplied (or when their count does not match the positions).
    ///
    /// Indices referencing missing vertices are dropped along with the rest
    /// of their triangle.
    #[must_use]
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Option<Vec<[f32; 3]>>,
        indices: Vec<u32>,
        color: [f32; 4],
    ) -> Self {
        let vertex_count = positions.len() as u32;
        let indices: Vec<u32> = indices
            .chunks_exact(3)
            .filter(|tri| tri.iter().all(|&i| i < vertex_count))
            .flatten()
            .copied()
            .collect();
        let normals = match normals {
            Some(n) if n.len() == positions.len() => n,
            _ => generate_normals(&positions, &indices),
        };
        let bounds = Aabb::from_points(&positions);
        Self {
            positions,
            normals,
            indices,
            color,
            bounds,
        }
    }

    /// Local-space bounds, `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append another mesh's geometry (used to merge glTF primitives).
    pub fn append(&mut self, other: &Self) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|i| i + base));
        self.bounds = Aabb::from_points(&self.positions);
    }

    /// Nearest double-sided triangle hit along a local-space ray.
    ///
    /// Returns the ray parameter `t` (hit point = `origin + dir * t`).
    #[must_use]
    pub fn raycast(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        if self.bounds?.ray_entry(origin, dir).is_none() {
            return None;
        }
        self.indices
            .chunks_exact(3)
            .filter_map(|tri| {
                let [a, b, c] = [tri[0], tri[1], tri[2]]
                    .map(|i| Vec3::from_array(self.positions[i as usize]));
                ray_triangle(origin, dir, a, b, c)
            })
            .min_by(f32::total_cmp)
    }
}

/// Möller–Trumbore ray/triangle intersection, double-sided.
fn ray_triangle(origin: Vec3, dir: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = dir.cross(edge2);
    let det = edge1.dot(p);
    // relative to the operands so small or finely scaled meshes still hit
    if det.abs() <= EPSILON * edge1.length() * p.length() {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    (t > 0.0).then_some(t)
}

/// Area-weighted vertex normals.
fn generate_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let pa = Vec3::from_array(positions[a]);
        let face = (Vec3::from_array(positions[b]) - pa)
            .cross(Vec3::from_array(positions[c]) - pa);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }
    accum
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Axis-aligned unit cube centred on the origin (12 triangles).
    pub(crate) fn unit_cube() -> MeshData {
        let positions = vec![
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5],
            [0.5, 0.5, -0.5],
            [-0.5, 0.5, -0.5],
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5],
            [0.5, 0.5, 0.5],
            [-0.5, 0.5, 0.5],
        ];
        let indices = vec![
            0, 2, 1, 0, 3, 2, // -z
            4, 5, 6, 4, 6, 7, // +z
            0, 1, 5, 0, 5, 4, // -y
            3, 7, 6, 3, 6, 2, // +y
            0, 4, 7, 0, 7, 3, // -x
            1, 2, 6, 1, 6, 5, // +x
        ];
        MeshData::new(positions, None, indices, [0.8, 0.8, 0.8, 1.0])
    }

    #[test]
    fn ray_hits_near_face_of_cube() {
        let cube = unit_cube();
        let t = cube
            .raycast(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0))
            .unwrap();
        assert!((t - 4.5).abs() < 1e-5);
    }

    #[test]
    fn millimetre_cube_is_still_hit() {
        let cube = unit_cube();
        let positions = cube
            .positions
            .iter()
            .map(|p| (Vec3::from_array(*p) * 1e-3).to_array())
            .collect();
        let tiny = MeshData::new(positions, None, cube.indices, cube.color);
        let t = tiny
            .raycast(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0))
            .unwrap();
        assert!((t - 0.9995).abs() < 1e-5);
    }

    #[test]
    fn ray_pointing_away_misses() {
        let cube = unit_cube();
        assert!(cube
            .raycast(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0))
            .is_none());
    }

    #[test]
    fn ray_beside_cube_misses() {
        let cube = unit_cube();
        assert!(cube
            .raycast(Vec3::new(2.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0))
            .is_none());
    }

    #[test]
    fn generated_normals_are_unit_length() {
        let cube = unit_cube();
        assert_eq!(cube.normals.len(), cube.positions.len());
        for n in &cube.normals {
            assert!((Vec3::from_array(*n).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn out_of_range_triangles_are_dropped() {
        let mesh = MeshData::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            None,
            vec![0, 1, 2, 0, 1, 9],
            [1.0; 4],
        );
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn append_offsets_indices_and_grows_bounds() {
        let mut a = unit_cube();
        let mut b = unit_cube();
        for p in &mut b.positions {
            p[0] += 3.0;
        }
        b.bounds = Aabb::from_points(&b.positions);
        a.append(&b);
        assert_eq!(a.triangle_count(), 24);
        assert_eq!(a.indices[36], 8);
        assert_eq!(a.bounds().unwrap().max.x, 3.5);
    }
}
