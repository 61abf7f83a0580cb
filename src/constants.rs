//! # Constants — Prime Sets and Compile-Time Scalars
//!
//! Every prime set and derived scalar used by the sieve is fixed at compile
//! time. The search space is the family of arithmetic progressions
//! `n + j·K·PRIM23` whose terms avoid all small prime factors; the constants
//! here partition the small primes into the roles they play:
//!
//! 1. **Wheel primes** (3, 5, 31..59) — handled structurally by the seed
//!    wheel and the four nested walk levels. Each level-p walk makes `p − 24`
//!    iterations: of the p residues of a term index mod p, exactly 24 would
//!    place a multiple of p inside the 24-term candidate window.
//! 2. **Sieve primes** (61..277) — the 42 primes tested per 64-candidate
//!    block through the folded bitmask tables.
//! 3. **Post primes** (7..23 and 281..541) — tested per surviving candidate
//!    in a scalar short-circuit cascade. The primes dividing [`MOD`] need a
//!    single residue check, since every term of a progression is congruent
//!    to its first term modulo them.
//!
//! Notably absent: 29. It divides neither [`MOD`] nor any table's prime set;
//! a candidate with a term divisible by 29 survives to the probe and fails
//! its first primality test there.

/// 23# = 2·3·5·7·11·13·17·19·23, the residue wheel modulus. Candidate first
/// terms are tracked as residues mod 23# plus a 64-bit shift offset.
pub const MOD: u64 = 223_092_870;

/// 2·23#, the unit of common differences: every progression searched for a
/// given multiplier K has common difference `K · PRIM23`.
pub const PRIM23: u64 = 2 * MOD;

/// Radix of the split multiply `(c·(k % SPLIT) + ((c·SPLIT) % MOD)·(k / SPLIT)) % MOD`,
/// which evaluates `c·k mod MOD` without leaving 64 bits for any 32-bit k.
pub const SPLIT: u64 = 17_835;

/// Number of progression positions that must be clear of a prime's multiples:
/// positions 0..=23 of the candidate window (length-20 target plus margin for
/// extension in both directions).
pub const WINDOW: u64 = 24;

/// Wheel primes beyond 3 and 5. The first three index the seed wheel, the
/// last four drive the nested walk levels (43, 47, 53, 59).
pub const WHEEL_PRIMES: [u64; 7] = [31, 37, 41, 43, 47, 53, 59];

/// Iterations of the walk level for wheel prime `p`: `p − 24`.
pub const fn wheel_iterations(p: u64) -> u64 {
    p - WINDOW
}

/// The 42 primes sieved through the folded 64-bit mask tables.
pub const SIEVE_PRIMES: [u64; 42] = [
    61, 67, 71, 73, 79, 83, 89, 97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157,
    163, 167, 173, 179, 181, 191, 193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263,
    269, 271, 277,
];

/// Residue bit widths per sieve prime (6 bits for 61, 7 for 67..127, 8 for
/// 131..251, 9 for 257..277). The kernel keeps all residues in 16-bit lanes,
/// so these serve as documentation of the packing headroom; a unit test pins
/// them against the prime values.
pub const SIEVE_PRIME_BITS: [u32; 42] = [
    6, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,
    8, 8, 8, 8, 8, 8, 9, 9, 9, 9, 9,
];

/// Post-cascade primes that divide [`MOD`]: every term of a progression
/// shares the first term's residue, so `n % p != 0` clears the whole window.
pub const POST_PRIMES_LOW: [u64; 6] = [7, 11, 13, 17, 19, 23];

/// Post-cascade primes above the sieve set, tested per surviving candidate
/// against their admissibility tables in ascending order.
pub const POST_PRIMES_HIGH: [u64; 41] = [
    281, 283, 293, 307, 311, 313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397,
    401, 409, 419, 421, 431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503, 509,
    521, 523, 541,
];

/// Number of seed residues produced by the outer wheel for any K:
/// 2 (mod 3) × 4 (mod 5) × 1355 filtered (i31, i37, i41) triples.
pub const NUM_SEEDS: usize = 10_840;

/// Candidate shifts folded into one sieve word.
pub const SHIFT_WINDOW: u64 = 64;

/// Shift windows swept per K invocation: `start_shift .. start_shift + 640`.
pub const WINDOWS_PER_PASS: u64 = 10;

/// Progressions shorter than this are revalidated and counted but not
/// written to the results file.
pub const MIN_REPORT_LEN: u32 = 20;

/// Minimum probe length for a progression to reach the solution sink.
pub const MIN_PROBE_LEN: u32 = 10;

/// Wrap bound for the running results checksum (fits a 32-bit signed int).
pub const CKSUM_WRAP: u64 = 2_000_000_000;
