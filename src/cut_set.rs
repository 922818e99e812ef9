//! A `CutSet` is either a single manifest or a weighted mix of other cut sets. Mixing is done
//! lazily while iterating: every draw picks one of the sources that still has cuts left, with
//! probability proportional to its weight, and takes the next cut from it. Nothing is shuffled
//! within a source so the output preserves each source's own ordering.
use crate::cut::Cut;
use crate::error::Error;
use crate::manifest::LazyManifest;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

pub type CutIter = Box<dyn Iterator<Item = Result<Cut, Error>>>;

#[derive(Debug, Clone)]
pub enum CutSet {
    Manifest(LazyManifest),
    Mux(Mux),
}

#[derive(Debug, Clone)]
pub struct Mux {
    sources: Vec<CutSet>,
    weights: Vec<f64>,
    seed: u64,
    stop_early: bool,
}

impl From<LazyManifest> for CutSet {
    fn from(manifest: LazyManifest) -> Self {
        Self::Manifest(manifest)
    }
}

impl CutSet {
    /// Mix several cut sets together. There must be one weight per set and weights can't be
    /// negative, NaN or infinite. The default seed is 0 so the mix is reproducible unless a seed is
    /// set with [`CutSet::with_seed`].
    pub fn mux(sources: Vec<CutSet>, weights: Vec<f64>) -> Result<Self, Error> {
        if sources.len() != weights.len() {
            return Err(Error::InvalidWeights(format!(
                "{} cut sets but {} weights",
                sources.len(),
                weights.len()
            )));
        }
        if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(Error::InvalidWeights(format!(
                "weights must be finite and non-negative, got {}",
                w
            )));
        }
        Ok(Self::Mux(Mux {
            sources,
            weights,
            seed: 0,
            stop_early: false,
        }))
    }

    /// Mix cut sets weighting each one by the number of cuts it has, so every cut has the same
    /// chance of coming next regardless of which corpus it's in.
    pub fn mux_by_len(sources: Vec<CutSet>) -> Result<Self, Error> {
        let weights = sources
            .iter()
            .map(|s| s.len().map(|x| x as f64))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Muxing {} cut sets with weights {:?}", sources.len(), weights);
        Self::mux(sources, weights)
    }

    /// Sets the seed used when iterating a mux. Has no effect on a plain manifest.
    pub fn with_seed(self, seed: u64) -> Self {
        match self {
            Self::Mux(mux) => Self::Mux(Mux { seed, ..mux }),
            s => s,
        }
    }

    /// When set a mux stops as soon as any of its sources runs out, rather than carrying on with
    /// the remaining ones.
    pub fn with_stop_early(self, stop_early: bool) -> Self {
        match self {
            Self::Mux(mux) => Self::Mux(Mux { stop_early, ..mux }),
            s => s,
        }
    }

    /// Total number of cuts. For a mux this is the sum of its sources, even with `stop_early`
    /// set, as that's an upper bound on what iteration will produce.
    pub fn len(&self) -> Result<usize, Error> {
        match self {
            Self::Manifest(m) => m.len(),
            Self::Mux(mux) => mux.sources.iter().map(|s| s.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        self.len().map(|x| x == 0)
    }

    /// The sources and their weights if this is a mux
    pub fn mux_parts(&self) -> Option<(&[CutSet], &[f64])> {
        match self {
            Self::Mux(mux) => Some((&mux.sources, &mux.weights)),
            Self::Manifest(_) => None,
        }
    }

    /// Iterate over the cuts. Can be called as many times as needed, each one starts from the
    /// beginning and with the same seed produces the same order.
    pub fn iter(&self) -> Result<CutIter, Error> {
        match self {
            Self::Manifest(m) => Ok(Box::new(m.iter()?)),
            Self::Mux(mux) => {
                let iters = mux
                    .sources
                    .iter()
                    .map(|s| s.iter())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Box::new(MuxIter {
                    iters: iters.into_iter().map(Some).collect(),
                    weights: mux.weights.clone(),
                    rng: StdRng::seed_from_u64(mux.seed),
                    stop_early: mux.stop_early,
                    done: false,
                }))
            }
        }
    }
}

struct MuxIter {
    /// Exhausted sources are set to `None`
    iters: Vec<Option<CutIter>>,
    weights: Vec<f64>,
    rng: StdRng,
    stop_early: bool,
    done: bool,
}

impl MuxIter {
    fn pick(&mut self) -> Option<usize> {
        let live = self
            .iters
            .iter()
            .enumerate()
            .filter(|(_, it)| it.is_some())
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        if live.is_empty() {
            return None;
        }
        match WeightedIndex::new(live.iter().map(|i| self.weights[*i])) {
            Ok(dist) => Some(live[dist.sample(&mut self.rng)]),
            // Everything left has zero weight, just drain them in order
            Err(_) => Some(live[0]),
        }
    }
}

impl Iterator for MuxIter {
    type Item = Result<Cut, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let Some(index) = self.pick() else {
                self.done = true;
                break;
            };
            match self.iters[index].as_mut().and_then(|it| it.next()) {
                Some(cut) => return Some(cut),
                None => {
                    self.iters[index] = None;
                    if self.stop_early {
                        self.done = true;
                    }
                }
            }
        }
        None
    }
}
