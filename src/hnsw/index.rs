//! HNSW index type, parameters, and graph introspection.
//!
//! The algorithmic work is split across sibling modules, each adding an `impl` block to
//! [`HnswIndex`]: `search` (traversal primitives), `construction` (insertion), `repair`
//! (shrink and refill), `deletion`, and `query` (top-k).

use crate::ann::AnnStats;
use crate::error::{IndexError, Result};
use crate::hnsw::graph::{EntryPoint, GraphStore};
use crate::hnsw::visited::VisitedPool;
use crate::vectors::{DocId, VectorSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default target degree at levels >= 1. Level 0 allows twice as many links.
pub const DEFAULT_M: usize = 16;

/// Default beam width used while inserting.
pub const DEFAULT_EF_CONSTRUCTION: usize = 200;

/// Default cap on the level a node can be assigned.
pub const DEFAULT_MAX_LEVEL: usize = 16;

/// Construction parameters for [`HnswIndex`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct HnswParams {
    /// Maximum links per node at levels >= 1 (`2 * m` at level 0).
    pub m: usize,
    /// Beam width during insertion. Larger values give better links and slower builds.
    pub ef_construction: usize,
    /// Level multiplier `mL` in `floor(-ln(U) * mL)`. `None` means `1 / ln(m)`.
    pub level_mult: Option<f64>,
    /// Highest level a node may be assigned.
    pub max_level: usize,
    /// Seed for the level generator. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: DEFAULT_M,
            ef_construction: DEFAULT_EF_CONSTRUCTION,
            level_mult: None,
            max_level: DEFAULT_MAX_LEVEL,
            seed: None,
        }
    }
}

impl HnswParams {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.m < 2 {
            return Err(IndexError::InvalidParameter(format!(
                "m must be at least 2, got {}",
                self.m
            )));
        }
        if self.ef_construction == 0 {
            return Err(IndexError::InvalidParameter(
                "ef_construction must be greater than 0".into(),
            ));
        }
        if let Some(ml) = self.level_mult {
            if !ml.is_finite() || ml <= 0.0 {
                return Err(IndexError::InvalidParameter(format!(
                    "level_mult must be positive and finite, got {ml}"
                )));
            }
        }
        Ok(())
    }

    /// Effective level multiplier.
    pub fn level_mult(&self) -> f64 {
        self.level_mult
            .unwrap_or_else(|| 1.0 / (self.m as f64).ln())
    }
}

/// Hierarchical navigable small world graph over an external vector source.
///
/// Mutations (`add_doc`, `remove_doc`) take `&mut self`; queries take `&self` and may run
/// from several threads at once. See [`crate::SharedIndex`] for mixing the two.
#[derive(Debug)]
pub struct HnswIndex<V> {
    pub(crate) vectors: V,
    pub(crate) num_dims: usize,
    pub(crate) params: HnswParams,
    pub(crate) level_mult: f64,
    pub(crate) graph: GraphStore,
    pub(crate) visited: VisitedPool,
    pub(crate) level_rng: StdRng,
    pub(crate) num_docs: usize,
}

impl<V: VectorSource> HnswIndex<V> {
    /// Create an empty index over `vectors`.
    pub fn new(num_dims: usize, vectors: V, params: HnswParams) -> Result<Self> {
        params.validate()?;
        if num_dims == 0 {
            return Err(IndexError::InvalidParameter(
                "num_dims must be greater than 0".into(),
            ));
        }
        if vectors.num_dims() != num_dims {
            return Err(IndexError::DimensionMismatch {
                expected: num_dims,
                actual: vectors.num_dims(),
            });
        }

        let level_rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            vectors,
            num_dims,
            level_mult: params.level_mult(),
            params,
            graph: GraphStore::new(),
            visited: VisitedPool::new(),
            level_rng,
            num_docs: 0,
        })
    }

    /// Create an empty index with default parameters.
    pub fn with_defaults(num_dims: usize, vectors: V) -> Result<Self> {
        Self::new(num_dims, vectors, HnswParams::default())
    }

    pub fn params(&self) -> &HnswParams {
        &self.params
    }

    pub fn vectors(&self) -> &V {
        &self.vectors
    }

    /// Mutable access to the vector source, e.g. to append vectors before `add_doc`.
    ///
    /// Changing the vector of a document that is already indexed leaves its links
    /// pointing at stale neighbors; remove and re-add it instead.
    pub fn vectors_mut(&mut self) -> &mut V {
        &mut self.vectors
    }

    pub fn into_vectors(self) -> V {
        self.vectors
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.num_docs
    }

    pub fn is_empty(&self) -> bool {
        self.num_docs == 0
    }

    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.graph.is_live(id)
    }

    pub fn entry_point(&self) -> Option<EntryPoint> {
        self.graph.entry()
    }

    /// Number of levels `id` participates in (0 if not indexed).
    pub fn node_levels(&self, id: DocId) -> usize {
        self.graph.num_levels(id)
    }

    /// Neighbors of `id` at `level`, or `None` if the node has no such level.
    pub fn neighbors(&self, id: DocId, level: usize) -> Option<&[DocId]> {
        self.graph
            .node(id)
            .filter(|node| node.has_level(level))
            .map(|_| self.graph.links(id, level).as_slice())
    }

    /// Ids of all indexed documents in ascending order.
    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.graph.live_ids()
    }

    /// Degree cap at `level`.
    #[inline]
    pub(crate) fn max_links(&self, level: usize) -> usize {
        if level == 0 {
            self.params.m * 2
        } else {
            self.params.m
        }
    }

    /// Degree below which a node is reconnected after losing links.
    #[inline]
    pub(crate) fn low_watermark(&self, level: usize) -> usize {
        self.max_links(level) / 2
    }

    #[inline]
    pub(crate) fn distance_to(&self, query: &[f32], id: DocId) -> f32 {
        crate::distance::l2_distance_squared(query, self.vectors.vector(id))
    }

    #[inline]
    pub(crate) fn distance_between(&self, a: DocId, b: DocId) -> f32 {
        crate::distance::l2_distance_squared(self.vectors.vector(a), self.vectors.vector(b))
    }

    /// Draw a level from `floor(-ln(U) * mL)`, `U ~ Uniform(0, 1]`.
    pub(crate) fn random_level(&mut self) -> usize {
        // random() is in [0, 1); flip it so ln never sees 0.
        let u = 1.0 - self.level_rng.random::<f64>();
        let level = (-u.ln() * self.level_mult).floor() as usize;
        level.min(self.params.max_level)
    }

    /// Check structural invariants of the link graph.
    ///
    /// Verifies, for every live node and level: no self links, no duplicates, degree within
    /// the level cap, every neighbor live at that level, and the symmetric-link property.
    /// Also checks that the entry point is live at its recorded level and that an entry
    /// exists exactly when the index is non-empty.
    pub fn validate_links(&self) -> Result<()> {
        let inconsistent = |id: DocId, level: usize, reason: String| -> Result<()> {
            Err(IndexError::InconsistentGraph { id, level, reason })
        };

        let mut live = 0usize;
        for id in self.graph.live_ids() {
            live += 1;
            for level in 0..self.graph.num_levels(id) {
                let links = self.graph.links(id, level);
                if links.len() > self.max_links(level) {
                    return inconsistent(
                        id,
                        level,
                        format!("degree {} exceeds cap {}", links.len(), self.max_links(level)),
                    );
                }
                for (i, n) in links.iter().enumerate() {
                    if n == id {
                        return inconsistent(id, level, "self link".into());
                    }
                    if links.as_slice()[..i].contains(&n) {
                        return inconsistent(id, level, format!("duplicate link to {n}"));
                    }
                    if self.graph.num_levels(n) <= level {
                        return inconsistent(
                            id,
                            level,
                            format!("neighbor {n} is not live at this level"),
                        );
                    }
                    if !self.graph.links(n, level).contains(id) {
                        return inconsistent(id, level, format!("link to {n} is not mutual"));
                    }
                }
            }
        }

        if live != self.num_docs {
            return inconsistent(
                0,
                0,
                format!("{live} live nodes but {} documents counted", self.num_docs),
            );
        }

        match self.graph.entry() {
            Some(entry) if self.graph.num_levels(entry.id) != entry.level + 1 => inconsistent(
                entry.id,
                entry.level,
                format!(
                    "entry point has {} levels",
                    self.graph.num_levels(entry.id)
                ),
            ),
            None if live > 0 => inconsistent(0, 0, "non-empty index without entry point".into()),
            Some(entry) if live == 0 => {
                inconsistent(entry.id, entry.level, "empty index with entry point".into())
            }
            _ => Ok(()),
        }
    }

    /// Approximate memory used by the graph (vectors are not owned and not counted).
    pub fn size_bytes(&self) -> usize {
        self.graph.size_bytes()
    }

    pub fn stats(&self) -> AnnStats {
        AnnStats {
            num_docs: self.num_docs,
            num_dims: self.num_dims,
            size_bytes: self.size_bytes(),
            max_level: self.graph.entry().map(|e| e.level),
            algorithm: "HNSW",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectors::FlatVectors;

    #[test]
    fn rejects_bad_params() {
        let store = FlatVectors::new(4).unwrap();
        let bad_m = HnswParams {
            m: 1,
            ..Default::default()
        };
        assert!(matches!(
            HnswIndex::new(4, &store, bad_m),
            Err(IndexError::InvalidParameter(_))
        ));

        let bad_ml = HnswParams {
            level_mult: Some(f64::NAN),
            ..Default::default()
        };
        assert!(bad_ml.validate().is_err());

        assert!(matches!(
            HnswIndex::with_defaults(8, &store),
            Err(IndexError::DimensionMismatch {
                expected: 8,
                actual: 4
            })
        ));
    }

    #[test]
    fn default_level_mult_is_inverse_ln_m() {
        let params = HnswParams::default();
        assert!((params.level_mult() - 1.0 / (16f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn levels_decay_geometrically() {
        let store = FlatVectors::new(2).unwrap();
        let params = HnswParams {
            seed: Some(7),
            ..Default::default()
        };
        let mut index = HnswIndex::new(2, &store, params).unwrap();

        let draws = 20_000;
        let mut counts = [0usize; 4];
        for _ in 0..draws {
            let level = index.random_level();
            assert!(level <= DEFAULT_MAX_LEVEL);
            if level < counts.len() {
                counts[level] += 1;
            }
        }
        // P(level >= 1) = 1/M; allow generous slack.
        let upper = (draws - counts[0]) as f64 / draws as f64;
        assert!((upper - 1.0 / 16.0).abs() < 0.02, "upper fraction {upper}");
        assert!(counts[1] > counts[2]);
    }

    #[test]
    fn max_level_caps_draws() {
        let store = FlatVectors::new(2).unwrap();
        let params = HnswParams {
            level_mult: Some(50.0),
            max_level: 3,
            seed: Some(1),
            ..Default::default()
        };
        let mut index = HnswIndex::new(2, &store, params).unwrap();
        assert!((0..1000).all(|_| index.random_level() <= 3));
    }
}
