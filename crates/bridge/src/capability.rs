/// A unit of binding behavior an exposed type can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
	/// Row, column and size queries.
	Dimensions,
	/// `solve` for vector right-hand sides.
	Solve,
	/// `solve` for matrix right-hand sides.
	MatrixSolve,
	/// `compute` and `info`.
	Compute,
	/// Iteration count, tolerance and convergence status.
	Iterative,
	/// `solveWithGuess`.
	WarmStart,
	/// Borrowed access to the preconditioner.
	Preconditioned,
	/// Per-instance identity query.
	Identity,
}

bitflags::bitflags! {
	/// A set of capabilities applied to an exposed type.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct CapabilitySet: u32 {
		const DIMENSIONS = 1 << 0;
		const SOLVE = 1 << 1;
		const MATRIX_SOLVE = 1 << 2;
		const COMPUTE = 1 << 3;
		const ITERATIVE = 1 << 4;
		const WARM_START = 1 << 5;
		const PRECONDITIONED = 1 << 6;
		const IDENTITY = 1 << 7;
	}
}

impl Capability {
	pub const ALL: [Capability; 8] = [
		Self::Dimensions,
		Self::Solve,
		Self::MatrixSolve,
		Self::Compute,
		Self::Iterative,
		Self::WarmStart,
		Self::Preconditioned,
		Self::Identity,
	];

	/// Returns the bitflag for this capability.
	pub const fn as_set(self) -> CapabilitySet {
		match self {
			Self::Dimensions => CapabilitySet::DIMENSIONS,
			Self::Solve => CapabilitySet::SOLVE,
			Self::MatrixSolve => CapabilitySet::MATRIX_SOLVE,
			Self::Compute => CapabilitySet::COMPUTE,
			Self::Iterative => CapabilitySet::ITERATIVE,
			Self::WarmStart => CapabilitySet::WARM_START,
			Self::Preconditioned => CapabilitySet::PRECONDITIONED,
			Self::Identity => CapabilitySet::IDENTITY,
		}
	}
}

impl From<Capability> for CapabilitySet {
	fn from(cap: Capability) -> Self {
		cap.as_set()
	}
}

impl FromIterator<Capability> for CapabilitySet {
	fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
		let mut set = CapabilitySet::empty();
		for cap in iter {
			set |= cap.as_set();
		}
		set
	}
}

impl CapabilitySet {
	/// Capabilities in declaration order.
	pub fn capabilities(self) -> impl Iterator<Item = Capability> {
		Capability::ALL.into_iter().filter(move |cap| self.contains(cap.as_set()))
	}
}
