//! Reference-counted string interning.
//!
//! Per-core cpuinfo fields are usually identical across cores; the
//! inspectors intern each value here so a later pass can render
//! "4x Cortex-A53" style summaries from the occurrence counts instead
//! of storing four copies.

use std::rc::Rc;

struct Entry {
    s: Rc<str>,
    refs: u32,
}

/// Owns a set of unique strings, each with an occurrence count.
/// Insertion order is preserved for display. Lookup is a linear scan,
/// which is fine for the at-most-128 distinct values seen here.
#[derive(Default)]
pub struct StringTable {
    entries: Vec<Entry>,
}

impl StringTable {
    pub fn new() -> Self {
        StringTable::default()
    }

    /// Interns `s` with weight 1, returning the canonical copy.
    pub fn add(&mut self, s: &str) -> Rc<str> {
        self.add_weighted(s, 1)
    }

    /// Interns `s`, incrementing its count by `weight` if already
    /// present, inserting at count `weight` otherwise. The returned
    /// `Rc` is the same allocation for every add of an equal string.
    pub fn add_weighted(&mut self, s: &str, weight: u32) -> Rc<str> {
        for e in &mut self.entries {
            if &*e.s == s {
                e.refs += weight;
                return Rc::clone(&e.s);
            }
        }
        let rc: Rc<str> = Rc::from(s);
        self.entries.push(Entry {
            s: Rc::clone(&rc),
            refs: weight,
        });
        rc
    }

    pub fn ref_count(&self, s: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| &*e.s == s)
            .map(|e| e.refs)
            .unwrap_or(0)
    }

    /// `(value, count)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|e| (&*e.s, e.refs))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_twice_increments_and_returns_same_rc() {
        let mut t = StringTable::new();
        let a = t.add("Cortex-A53");
        let b = t.add("Cortex-A53");
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(t.ref_count("Cortex-A53"), 2);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_weights_accumulate() {
        let mut t = StringTable::new();
        t.add_weighted("sse2", 3);
        t.add_weighted("sse2", 2);
        assert_eq!(t.ref_count("sse2"), 5);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut t = StringTable::new();
        t.add("b");
        t.add("a");
        t.add("b");
        let order: Vec<_> = t.iter().map(|(s, _)| s.to_string()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_missing_string_has_zero_count() {
        let t = StringTable::new();
        assert_eq!(t.ref_count("nope"), 0);
        assert!(t.is_empty());
    }
}
