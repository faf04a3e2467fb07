//! Shared transposition table.
//!
//! A vector of three-entry buckets. Entries are two atomic words each;
//! writers race freely and readers validate the 16-bit key tag before
//! trusting anything, so no locks are needed. Entries age by a
//! generation counter bumped at every new search.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use crate::board::types::moves::Move;
use crate::board::types::{Depth, Value, VALUE_MATED_MAX, VALUE_MATE_MAX, VALUE_NONE};

/// Bound kinds, stored in the low two bits of the generation byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    None,
    Exact,
    Upper,
    Lower,
}

impl Bound {
    #[inline]
    const fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Bound::None,
            1 => Bound::Exact,
            2 => Bound::Upper,
            _ => Bound::Lower,
        }
    }

    #[inline]
    const fn bits(self) -> u8 {
        self as u8
    }
}

const BOUND_MASK: u8 = 0x3;
const GENERATION_MASK: u8 = 0xFC;
/// One probe-visible aging step: the bound bits stay untouched.
pub const GENERATION_STEP: u8 = BOUND_MASK + 1;

const BUCKET_SIZE: usize = 3;
const MEGABYTE: usize = 0x100000;

/// A decoded entry snapshot.
#[derive(Clone, Copy, Debug)]
pub struct TtData {
    pub mv: Move,
    pub value: Value,
    pub eval: Value,
    pub depth: Depth,
    pub bound: Bound,
}

/// One entry in two atomic words.
///
/// word0: key16 | move16 << 16 | value16 << 32 | eval16 << 48
/// word1: depth8 | gen_bound8 << 8
///
/// A torn write leaves word0's tag mismatched with the probe key and the
/// entry is simply ignored; a stale word1 only degrades replacement
/// decisions, never correctness.
#[derive(Default)]
struct Entry {
    word0: AtomicU64,
    word1: AtomicU64,
}

impl Entry {
    #[inline]
    fn key16(&self) -> u16 {
        self.word0.load(Ordering::Relaxed) as u16
    }

    #[inline]
    fn depth(&self) -> Depth {
        Depth::from(self.word1.load(Ordering::Relaxed) as u8 as i8)
    }

    #[inline]
    fn gen_bound(&self) -> u8 {
        (self.word1.load(Ordering::Relaxed) >> 8) as u8
    }

    #[inline]
    fn generation(&self) -> u8 {
        self.gen_bound() & GENERATION_MASK
    }

    #[inline]
    fn bound(&self) -> Bound {
        Bound::from_bits(self.gen_bound())
    }

    fn decode(&self) -> TtData {
        let word0 = self.word0.load(Ordering::Relaxed);
        TtData {
            mv: Move::from_u16((word0 >> 16) as u16),
            value: Value::from((word0 >> 32) as u16 as i16),
            eval: Value::from((word0 >> 48) as u16 as i16),
            depth: self.depth(),
            bound: self.bound(),
        }
    }

    fn write(&self, key16: u16, generation: u8, bound: Bound, depth: Depth, value: Value, eval: Value, mv: Move) {
        let word0 = u64::from(key16)
            | (u64::from(mv.as_u16()) << 16)
            | (u64::from(value as i16 as u16) << 32)
            | (u64::from(eval as i16 as u16) << 48);
        let word1 = u64::from(depth as i8 as u8)
            | (u64::from(generation | bound.bits()) << 8);
        self.word0.store(word0, Ordering::Relaxed);
        self.word1.store(word1, Ordering::Relaxed);
    }

    /// A slot that has never been written.
    #[inline]
    fn is_empty(&self) -> bool {
        self.word0.load(Ordering::Relaxed) == 0 && self.word1.load(Ordering::Relaxed) == 0
    }

    /// Refresh the age of a probed entry without touching its payload.
    fn refresh_generation(&self, generation: u8) {
        let word1 = self.word1.load(Ordering::Relaxed);
        let gen_bound = (word1 >> 8) as u8;
        let new_word1 =
            (word1 & 0xFF) | (u64::from(generation | (gen_bound & BOUND_MASK)) << 8);
        self.word1.store(new_word1, Ordering::Relaxed);
    }
}

struct Bucket {
    entries: [Entry; BUCKET_SIZE],
}

impl Default for Bucket {
    fn default() -> Self {
        Bucket {
            entries: [Entry::default(), Entry::default(), Entry::default()],
        }
    }
}

pub struct TranspositionTable {
    buckets: Vec<Bucket>,
    mask: usize,
    generation: AtomicU8,
}

impl TranspositionTable {
    /// Allocate a table of at most `megabytes` MB, rounded down to a
    /// power-of-two bucket count.
    #[must_use]
    pub fn new(megabytes: usize) -> Self {
        let bucket_bytes = std::mem::size_of::<Bucket>();
        let mut bucket_count = (MEGABYTE * megabytes.max(1)) / bucket_bytes;
        bucket_count = bucket_count.next_power_of_two() / 2;
        if bucket_count == 0 {
            bucket_count = 1024;
        }

        let mut buckets = Vec::new();
        if buckets.try_reserve_exact(bucket_count).is_err() {
            // The engine cannot run without its hash table.
            eprintln!("Error: failed to allocate {megabytes} MB for the transposition table");
            std::process::exit(1);
        }
        buckets.resize_with(bucket_count, Bucket::default);

        TranspositionTable {
            buckets,
            mask: bucket_count - 1,
            generation: AtomicU8::new(0),
        }
    }

    #[inline]
    fn bucket(&self, key: u64) -> &Bucket {
        &self.buckets[(key as usize) & self.mask]
    }

    #[inline]
    fn current_generation(&self) -> u8 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Begin a new search: age every resident entry by one step.
    pub fn new_search(&self) {
        self.generation
            .fetch_add(GENERATION_STEP, Ordering::Relaxed);
    }

    /// Drop every entry and reset the aging counter.
    pub fn clear(&self) {
        for bucket in &self.buckets {
            for entry in &bucket.entries {
                entry.word0.store(0, Ordering::Relaxed);
                entry.word1.store(0, Ordering::Relaxed);
            }
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    /// Look up a position. A hit refreshes the entry's generation.
    #[must_use]
    pub fn probe(&self, key: u64) -> Option<TtData> {
        let key16 = (key >> 48) as u16;
        let bucket = self.bucket(key);

        for entry in &bucket.entries {
            if entry.key16() == key16 && !entry.is_empty() {
                entry.refresh_generation(self.current_generation());
                return Some(entry.decode());
            }
        }

        None
    }

    /// Store an entry, preferring to reuse a slot with a matching tag and
    /// otherwise evicting the slot with the worst depth-for-age score.
    pub fn store(
        &self,
        key: u64,
        depth: Depth,
        value: Value,
        eval: Value,
        mv: Move,
        bound: Bound,
    ) {
        let key16 = (key >> 48) as u16;
        let bucket = self.bucket(key);
        let generation = self.current_generation();

        let mut replace = &bucket.entries[0];
        for entry in &bucket.entries {
            if entry.key16() == key16 {
                replace = entry;
                break;
            }
            let age = |e: &Entry| {
                Depth::from(generation.wrapping_sub(e.generation()))
            };
            if replace.depth() - age(replace) >= entry.depth() - age(entry) {
                replace = entry;
            }
        }

        // Keep deeper results for the same position unless the new entry
        // carries an exact bound.
        if bound != Bound::Exact && key16 == replace.key16() && depth < replace.depth() - 3 {
            return;
        }

        replace.write(key16, generation, bound, depth, value, eval, mv);
    }

    /// Permill of recently-touched entries, sampled over the first 1000
    /// buckets.
    #[must_use]
    pub fn hashfull(&self) -> u32 {
        let generation = self.current_generation();
        let sample = self.buckets.len().min(1000);
        let mut used = 0u32;
        for bucket in &self.buckets[..sample] {
            for entry in &bucket.entries {
                if entry.bound() != Bound::None && entry.generation() == generation {
                    used += 1;
                }
            }
        }
        used / BUCKET_SIZE as u32
    }
}

/// Shift a mate value so the stored distance is from this node rather
/// than from the root.
#[inline]
#[must_use]
pub fn value_to_tt(value: Value, plies: Depth) -> Value {
    debug_assert!(value != VALUE_NONE);
    if value >= VALUE_MATE_MAX {
        value + plies
    } else if value <= VALUE_MATED_MAX {
        value - plies
    } else {
        value
    }
}

/// Undo `value_to_tt` at probe time.
#[inline]
#[must_use]
pub fn value_from_tt(value: Value, plies: Depth) -> Value {
    if value == VALUE_NONE {
        VALUE_NONE
    } else if value >= VALUE_MATE_MAX {
        value - plies
    } else if value <= VALUE_MATED_MAX {
        value + plies
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::moves::{MOVE_NONE, NORMAL};
    use crate::board::types::VALUE_MATE;

    #[test]
    fn test_store_probe_round_trip() {
        let tt = TranspositionTable::new(1);
        let key = 0x1234_5678_9ABC_DEF0;
        let mv = Move::new(11, 27, NORMAL);

        assert!(tt.probe(key).is_none());
        tt.store(key, 7, 42, 17, mv, Bound::Exact);

        let data = tt.probe(key).expect("stored entry");
        assert_eq!(data.mv, mv);
        assert_eq!(data.value, 42);
        assert_eq!(data.eval, 17);
        assert_eq!(data.depth, 7);
        assert_eq!(data.bound, Bound::Exact);
    }

    #[test]
    fn test_probe_rejects_wrong_key() {
        let tt = TranspositionTable::new(1);
        tt.store(0xAAAA_0000_0000_0001, 3, 1, 1, MOVE_NONE, Bound::Lower);
        // Same bucket index, different tag.
        assert!(tt.probe(0xBBBB_0000_0000_0001).is_none());
    }

    #[test]
    fn test_matching_key_keeps_deeper_entry() {
        let tt = TranspositionTable::new(1);
        let key = 0x0123_4567_89AB_CDEF;
        tt.store(key, 10, 100, 0, MOVE_NONE, Bound::Lower);
        // A much shallower non-exact store must not clobber it.
        tt.store(key, 2, -100, 0, MOVE_NONE, Bound::Lower);
        assert_eq!(tt.probe(key).unwrap().depth, 10);
        // An exact store may.
        tt.store(key, 2, -100, 0, MOVE_NONE, Bound::Exact);
        assert_eq!(tt.probe(key).unwrap().depth, 2);
    }

    #[test]
    fn test_clear_empties_table(){
        let tt = TranspositionTable::new(1);
        let key = 0x1111_2222_3333_4444;
        tt.store(key, 5, 9, 9, MOVE_NONE, Bound::Upper);
        assert!(tt.probe(key).is_some());
        tt.clear();
        assert!(tt.probe(key).is_none());
    }

    #[test]
    fn test_negative_values_survive_packing() {
        let tt = TranspositionTable::new(1);
        let key = 0xFEDC_BA98_7654_3210;
        tt.store(key, -1, -321, -1234, MOVE_NONE, Bound::Upper);
        let data = tt.probe(key).unwrap();
        assert_eq!(data.value, -321);
        assert_eq!(data.eval, -1234);
        assert_eq!(data.depth, -1);
    }

    #[test]
    fn test_mate_value_round_trip() {
        let mate_in_3 = VALUE_MATE - 3;
        let stored = value_to_tt(mate_in_3, 5);
        assert_eq!(value_from_tt(stored, 5), mate_in_3);

        let mated_in_4 = -VALUE_MATE + 4;
        let stored = value_to_tt(mated_in_4, 7);
        assert_eq!(value_from_tt(stored, 7), mated_in_4);

        assert_eq!(value_from_tt(value_to_tt(123, 9), 9), 123);
    }

    #[test]
    fn test_generation_aging_prefers_old_victims() {
        let tt = TranspositionTable::new(1);
        let key = 0x4242_0000_0000_0100;
        tt.store(key, 6, 50, 0, MOVE_NONE, Bound::Exact);
        tt.new_search();
        // After aging, a probe still hits and refreshes the entry.
        assert!(tt.probe(key).is_some());
        assert!(tt.hashfull() <= 1000);
    }
}
