use parking_lot::RwLock;

/// Settings a newly constructed iterative solver starts from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationDefaults {
	/// Relative residual at which a solve counts as converged.
	pub tolerance: f64,
	/// Iteration limit per unknown, used while no explicit limit is set.
	pub max_iterations_factor: usize,
}

impl IterationDefaults {
	pub const DEFAULT: Self = Self {
		tolerance: f64::EPSILON,
		max_iterations_factor: 2,
	};
}

impl Default for IterationDefaults {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/// Process-wide defaults. Solvers read them once, when constructed.
pub static ITERATION_DEFAULTS: RwLock<IterationDefaults> = RwLock::new(IterationDefaults::DEFAULT);

pub fn iteration_defaults() -> IterationDefaults {
	*ITERATION_DEFAULTS.read()
}
