/// Bucket counts used by the hash tables. Each is a prime roughly double the one before, so a
/// table grows geometrically and the modulo spreads keys well.
pub(crate) const PRIMES: [usize; 28] = [
    53,
    97,
    193,
    389,
    769,
    1543,
    3079,
    6151,
    12289,
    24593,
    49157,
    98317,
    196613,
    393241,
    786433,
    1572869,
    3145739,
    6291469,
    12582917,
    25165843,
    50331653,
    100663319,
    201326611,
    402653189,
    805306457,
    1610612741,
    3221225473,
    4294967291,
];

/// The smallest bucket count the tables will use.
pub(crate) const MIN_BUCKETS: usize = PRIMES[0];

/// The largest bucket count a table may be asked to hold.
pub(crate) const MAX_BUCKETS: usize = PRIMES[PRIMES.len() - 1] / 4;

/// Returns the smallest tabled prime which is at least `n`, or the largest tabled prime if `n`
/// exceeds all of them.
pub(crate) const fn next_prime(n: usize) -> usize {
    let mut low = 0;
    let mut high = PRIMES.len();
    while low < high {
        let mid = low + (high - low) / 2;
        if PRIMES[mid] < n {
            low = mid + 1;
        } else {
            high = mid;
        }
    }

    if low == PRIMES.len() {
        PRIMES[PRIMES.len() - 1]
    } else {
        PRIMES[low]
    }
}
