use crate::config::SampleConfig;
use rand::Rng;
use serde::Serialize;
use tracing::trace;

/// An ordered set of integers drawn uniformly from an inclusive range.
/// The default shape is five values from `1..=100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RandomSample {
    values: Vec<u32>,
    sum: u64,
}

impl RandomSample {
    /// Draw a default-shaped sample from the thread-local generator
    pub fn generate() -> Self {
        Self::draw(&mut rand::thread_rng())
    }

    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::draw_with(rng, &SampleConfig::default())
    }

    /// Draw `config.len` values from `config.min..=config.max`.
    ///
    /// The config is expected to have passed [`SampleConfig::validate`].
    pub fn draw_with<R: Rng + ?Sized>(rng: &mut R, config: &SampleConfig) -> Self {
        let values: Vec<u32> = (0..config.len)
            .map(|_| rng.gen_range(config.min..=config.max))
            .collect();
        trace!("Drew sample values {:?}", values);
        Self::from_values(values)
    }

    pub fn from_values(values: Vec<u32>) -> Self {
        let sum = values.iter().map(|&v| u64::from(v)).sum();
        Self { values, sum }
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn sum(&self) -> u64 {
        self.sum
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
