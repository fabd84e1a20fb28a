//! Id namespaces for generated cells.
//!
//! Every table shape (and the connector set) draws one namespace and numbers
//! its cells `<namespace>-<index>`, so ids never collide across shapes.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxy0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NAMESPACE_LEN: usize = 20;

pub trait IdSource {
    /// A token that no earlier call on this source has returned.
    fn namespace(&mut self) -> String;
}

/// Random 20-character tokens, as draw.io itself generates.
pub struct RandomIds<R: Rng = ThreadRng> {
    rng: R,
}

impl RandomIds {
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomIds<StdRng> {
    /// Reproducible ids: the same seed yields the same namespaces.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> IdSource for RandomIds<R> {
    fn namespace(&mut self) -> String {
        (0..NAMESPACE_LEN)
            .map(|_| {
                let idx = self.rng.random_range(0..ALPHABET.len());
                ALPHABET[idx] as char
            })
            .collect()
    }
}

/// Counter namespaces (`t0`, `t1`, ...). Readable ids for tests and diffs.
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl IdSource for SequentialIds {
    fn namespace(&mut self) -> String {
        let ns = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        ns
    }
}

/// Hands out `<namespace>-<index>` ids, starting at index 0.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    namespace: String,
    next: usize,
}

impl IdAllocator {
    pub fn new(namespace: String) -> Self {
        Self { namespace, next: 0 }
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.namespace, self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_namespace_shape() {
        let ns = RandomIds::new().namespace();
        assert_eq!(ns.len(), NAMESPACE_LEN);
        assert!(ns.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = RandomIds::seeded(7);
        let mut b = RandomIds::seeded(7);
        assert_eq!(a.namespace(), b.namespace());
        assert_eq!(a.namespace(), b.namespace());
    }

    #[test]
    fn test_seeded_namespaces_differ() {
        let mut ids = RandomIds::seeded(7);
        assert_ne!(ids.namespace(), ids.namespace());
    }

    #[test]
    fn test_sequential() {
        let mut ids = SequentialIds::new("t");
        assert_eq!(ids.namespace(), "t0");
        assert_eq!(ids.namespace(), "t1");
    }

    #[test]
    fn test_allocator() {
        let mut alloc = IdAllocator::new("abc".to_string());
        assert_eq!(alloc.next_id(), "abc-0");
        assert_eq!(alloc.next_id(), "abc-1");
    }
}
