use crate::error::{QuantizeError, Result};

/// How initial centroids are picked at the start of each attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Seeding {
    /// First centroid uniform, each further one sampled with probability
    /// proportional to its squared distance from the nearest chosen centroid.
    #[default]
    Spread,
    /// `k` distinct points chosen uniformly at random.
    Uniform,
}

/// Configuration for [`ClusterEngine`](super::ClusterEngine).
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Upper bound on assign/update rounds per attempt.
    pub max_iterations: usize,

    /// Stop once the summed squared centroid movement of one round drops
    /// below this value.
    pub convergence_epsilon: f64,

    /// Independent seedings to run; the most compact result wins.
    pub attempts: usize,

    pub seeding: Seeding,

    /// Run attempts on the rayon pool (only with the `parallel` feature).
    pub parallel: bool,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            convergence_epsilon: 1.0,
            attempts: 3,
            seeding: Seeding::Spread,
            parallel: true,
        }
    }
}

impl KMeansConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.convergence_epsilon = epsilon;
        self
    }

    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_seeding(mut self, seeding: Seeding) -> Self {
        self.seeding = seeding;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(QuantizeError::invalid("max_iterations must be at least 1"));
        }
        if self.attempts == 0 {
            return Err(QuantizeError::invalid("attempts must be at least 1"));
        }
        if !self.convergence_epsilon.is_finite() || self.convergence_epsilon < 0.0 {
            return Err(QuantizeError::invalid(format!(
                "convergence_epsilon must be finite and non-negative, got {}",
                self.convergence_epsilon
            )));
        }
        Ok(())
    }
}

impl std::str::FromStr for Seeding {
    type Err = QuantizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "spread" | "kmeans++" | "plusplus" => Ok(Seeding::Spread),
            "uniform" | "random" => Ok(Seeding::Uniform),
            other => Err(QuantizeError::invalid(format!("unknown seeding strategy: {other}"))),
        }
    }
}
