//! Voxel-grid spatial hash for neighbor search.
//!
//! Space is partitioned into cubic voxels of a fixed edge length. Voxels are
//! keyed by integer coordinates in an `FxHashMap`, so the grid is unbounded
//! and only occupied voxels cost memory.

use glam::DVec3;
use rustc_hash::FxHashMap;

/// Largest number of voxel rings searched around a query voxel.
///
/// The search visits `(2 * reach + 1)^3` voxels, so the voxel edge may not be
/// much smaller than the smoothing radius.
pub const MAX_VOXEL_REACH: i64 = 8;

/// Integer coordinates of a voxel: `floor(position / edge_length)` per axis.
///
/// Coordinates beyond the `i64` range saturate, so very distant particles
/// share the outermost voxel instead of wrapping around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoxelKey {
    /// X voxel coordinate
    pub x: i64,
    /// Y voxel coordinate
    pub y: i64,
    /// Z voxel coordinate
    pub z: i64,
}

impl VoxelKey {
    /// Key for `(x, y, z)`.
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Neighboring key, or `None` past the edge of the key space.
    #[inline]
    fn offset(self, dx: i64, dy: i64, dz: i64) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
            self.z.checked_add(dz)?,
        ))
    }
}

/// Voxel rings needed so that a block around a voxel covers `search_radius`.
pub fn voxel_reach(edge_length: f64, search_radius: f64) -> f64 {
    (search_radius / edge_length).ceil().max(1.0)
}

/// Uniform voxel grid over particle indices.
///
/// The grid searches a ring of `reach` voxels around a query voxel, where
/// `reach = ceil(search_radius / edge_length)`. With the edge length equal
/// to the smoothing radius the reach is 1, i.e. the 3x3x3 block of 27
/// voxels, and any pair closer than the radius is always found.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    edge_length: f64,
    reach: i64,
    /// Voxel of each particle from the last rebuild (parallel to the arena).
    keys: Vec<VoxelKey>,
    /// Particle indices per occupied voxel.
    voxels: FxHashMap<VoxelKey, Vec<usize>>,
}

impl VoxelGrid {
    /// Create an empty grid.
    ///
    /// # Panics
    /// If `edge_length` or `search_radius` is not a positive finite number,
    /// or if the edge is so small that the reach exceeds [`MAX_VOXEL_REACH`].
    pub fn new(edge_length: f64, search_radius: f64) -> Self {
        assert!(
            edge_length.is_finite() && edge_length > 0.0,
            "edge_length must be positive"
        );
        assert!(
            search_radius.is_finite() && search_radius > 0.0,
            "search_radius must be positive"
        );
        let reach = voxel_reach(edge_length, search_radius);
        assert!(
            reach <= MAX_VOXEL_REACH as f64,
            "voxel edge {edge_length} is too small for search radius {search_radius}"
        );
        let reach = reach as i64;
        Self {
            edge_length,
            reach,
            keys: Vec::new(),
            voxels: FxHashMap::default(),
        }
    }

    /// Voxel edge length.
    pub fn edge_length(&self) -> f64 {
        self.edge_length
    }

    /// Number of voxels searched on each side of the query voxel.
    pub fn reach(&self) -> i64 {
        self.reach
    }

    /// Number of particles indexed by the last rebuild.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Return `true` if the last rebuild indexed no particles.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of voxels holding at least one particle.
    pub fn occupied_voxels(&self) -> usize {
        self.voxels.len()
    }

    /// Voxel containing `point`.
    #[inline]
    pub fn key_for(&self, point: DVec3) -> VoxelKey {
        let cell = (point / self.edge_length).floor();
        VoxelKey::new(cell.x as i64, cell.y as i64, cell.z as i64)
    }

    /// Voxel that particle `index` was filed under by the last rebuild.
    pub fn voxel_of(&self, index: usize) -> VoxelKey {
        self.keys[index]
    }

    /// Particle indices filed under `key`.
    pub fn bucket(&self, key: VoxelKey) -> &[usize] {
        self.voxels.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Clear and repopulate the grid.
    ///
    /// Particle `i` is the `i`-th position yielded by `positions`.
    pub fn rebuild<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = DVec3>,
    {
        self.keys.clear();
        // Keep bucket allocations alive across ticks, then drop voxels that
        // stayed empty so lookups never see stale cells.
        for bucket in self.voxels.values_mut() {
            bucket.clear();
        }
        for (i, position) in positions.into_iter().enumerate() {
            let key = self.key_for(position);
            self.keys.push(key);
            self.voxels.entry(key).or_default().push(i);
        }
        self.voxels.retain(|_, bucket| !bucket.is_empty());
    }

    /// Visit every particle in the block of voxels around `center`.
    fn for_each_in_block<F>(&self, center: VoxelKey, mut f: F)
    where
        F: FnMut(usize),
    {
        let reach = self.reach;
        for dz in -reach..=reach {
            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let Some(key) = center.offset(dx, dy, dz) else {
                        continue;
                    };
                    if let Some(bucket) = self.voxels.get(&key) {
                        for &j in bucket {
                            f(j);
                        }
                    }
                }
            }
        }
    }

    /// Visit the neighbor candidates of particle `index`: every particle in
    /// its own and the adjacent voxels, excluding itself. No distance
    /// filtering is done here.
    pub fn for_each_candidate<F>(&self, index: usize, mut f: F)
    where
        F: FnMut(usize),
    {
        self.for_each_in_block(self.keys[index], |j| {
            if j != index {
                f(j);
            }
        });
    }

    /// Collect the neighbor candidates of particle `index`.
    ///
    /// Order is unspecified.
    pub fn candidates_for(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        self.for_each_candidate(index, |j| out.push(j));
        out
    }

    /// Collect every indexed particle in the voxel block around `point`.
    pub fn candidates_near(&self, point: DVec3) -> Vec<usize> {
        let mut out = Vec::new();
        self.for_each_in_block(self.key_for(point), |j| out.push(j));
        out
    }
}
