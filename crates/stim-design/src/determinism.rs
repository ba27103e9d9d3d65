use stim_core::rng::{iteration_seed, stream_seed};

/// Primes deriving the six section-scope streams.
pub const SECTION_PRIMES: [u64; 6] = [101, 257, 307, 401, 631, 733];

/// Primes deriving the seven block-randomization streams.
pub const BLOCK_PRIMES: [u64; 7] = [163, 229, 347, 409, 503, 701, 811];

/// Seed streams used at section scope, derived from the section's base seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSeeds {
    /// Base seed read from the registry or freshly drawn.
    pub base: u64,
    /// Random-equal draws (×101).
    pub random_equal: u64,
    /// Random-different permutations (×257).
    pub random_different: u64,
    /// Shuffled big-block orders (×307).
    pub shuffled: u64,
    /// Shuffled alternate orders (×401).
    pub alternate: u64,
    /// Jitter, variable term (×631).
    pub jitter_variable: u64,
    /// Jitter, trial term (×733).
    pub jitter_trial: u64,
}

impl SectionSeeds {
    /// Derives every stream from `base`.
    pub fn new(base: u64) -> Self {
        let [a, b, c, d, e, f] = SECTION_PRIMES;
        Self {
            base,
            random_equal: stream_seed(base, a),
            random_different: stream_seed(base, b),
            shuffled: stream_seed(base, c),
            alternate: stream_seed(base, d),
            jitter_variable: stream_seed(base, e),
            jitter_trial: stream_seed(base, f),
        }
    }

    /// Random-equal seed of the variable at `index` in the section.
    pub fn variable_equal(&self, index: usize) -> u64 {
        rank_seed(self.random_equal, index)
    }

    /// Random-different seed of the variable at `index` in the section.
    pub fn variable_different(&self, index: usize) -> u64 {
        rank_seed(self.random_different, index)
    }

    /// Big-block shuffle seed of the list at sorted `rank`.
    pub fn list_shuffled(&self, rank: usize) -> u64 {
        rank_seed(self.shuffled, rank)
    }

    /// Alternate shuffle seed of the list at sorted `rank`.
    pub fn list_alternate(&self, rank: usize) -> u64 {
        rank_seed(self.alternate, rank)
    }

    /// Jitter seed of `trial` for the task at `task_index`:
    /// `jitter_variable * (task_index + 1) + jitter_trial * (trial + 1)`.
    pub fn jitter(&self, task_index: usize, trial: usize) -> u64 {
        rank_seed(self.jitter_variable, task_index)
            .wrapping_add(rank_seed(self.jitter_trial, trial))
    }
}

/// Seed streams used by the block randomizer, derived from the list's base seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSeeds {
    /// Base seed read from the registry or freshly drawn.
    pub base: u64,
    /// Starting population (×163).
    pub starting_block: u64,
    /// Starting list of population one (×229).
    pub first_starting_list: u64,
    /// Starting list of population two (×347).
    pub second_starting_list: u64,
    /// Population order across blocks (×409).
    pub block_order: u64,
    /// Re-rolled starting lists for blocks after the first (×503).
    pub starting_list: u64,
    /// List order within blocks (×701).
    pub list_order: u64,
    /// Value draws within lists (×811).
    pub value_draw: u64,
}

impl BlockSeeds {
    /// Derives every stream from `base`.
    pub fn new(base: u64) -> Self {
        let [a, b, c, d, e, f, g] = BLOCK_PRIMES;
        Self {
            base,
            starting_block: stream_seed(base, a),
            first_starting_list: stream_seed(base, b),
            second_starting_list: stream_seed(base, c),
            block_order: stream_seed(base, d),
            starting_list: stream_seed(base, e),
            list_order: stream_seed(base, f),
            value_draw: stream_seed(base, g),
        }
    }
}

/// `seed * (rank + 1)`, wrapping.
pub fn rank_seed(seed: u64, rank: usize) -> u64 {
    seed.wrapping_mul(rank as u64 + 1)
}

/// Seed of `trial` within a stream: `seed + trial + 1`, wrapping.
pub fn trial_seed(seed: u64, trial: usize) -> u64 {
    iteration_seed(seed, trial)
}
