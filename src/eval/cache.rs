//! Per-thread evaluation caches.
//!
//! The pawn table caches the pawn-structure score together with the
//! bitboards later evaluation stages need; the material table caches the
//! imbalance score. Both are private to a search worker, so plain arrays
//! suffice.

use crate::board::types::bitboard::Bitboard;
use crate::board::types::score::Score;

const PAWN_TABLE_SIZE: usize = 0x10000;
const MATERIAL_TABLE_SIZE: usize = 0x2000;

#[derive(Clone, Copy, Default)]
pub struct PawnEntry {
    pub key: u64,
    pub value: Score,
    pub pawn_attacks: [Bitboard; 2],
    pub passed_pawns: Bitboard,
    pub attack_span: [Bitboard; 2],
}

pub struct PawnTable {
    entries: Vec<PawnEntry>,
}

impl PawnTable {
    #[must_use]
    pub fn new() -> Self {
        PawnTable {
            entries: vec![PawnEntry::default(); PAWN_TABLE_SIZE],
        }
    }

    #[must_use]
    pub fn probe(&self, key: u64) -> Option<&PawnEntry> {
        let entry = &self.entries[key as usize % PAWN_TABLE_SIZE];
        (entry.key == key).then_some(entry)
    }

    pub fn store(&mut self, entry: PawnEntry) {
        self.entries[entry.key as usize % PAWN_TABLE_SIZE] = entry;
    }

    pub fn clear(&mut self) {
        self.entries.fill(PawnEntry::default());
    }
}

impl Default for PawnTable {
    fn default() -> Self {
        PawnTable::new()
    }
}

#[derive(Clone, Copy, Default)]
pub struct MaterialEntry {
    pub key: u64,
    pub value: Score,
}

pub struct MaterialTable {
    entries: Vec<MaterialEntry>,
}

impl MaterialTable {
    #[must_use]
    pub fn new() -> Self {
        MaterialTable {
            entries: vec![MaterialEntry::default(); MATERIAL_TABLE_SIZE],
        }
    }

    #[must_use]
    pub fn probe(&self, key: u64) -> Option<Score> {
        let entry = &self.entries[key as usize % MATERIAL_TABLE_SIZE];
        (entry.key == key).then_some(entry.value)
    }

    pub fn store(&mut self, key: u64, value: Score) {
        self.entries[key as usize % MATERIAL_TABLE_SIZE] = MaterialEntry { key, value };
    }

    pub fn clear(&mut self) {
        self.entries.fill(MaterialEntry::default());
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        MaterialTable::new()
    }
}

/// The caches a single search worker owns.
#[derive(Default)]
pub struct EvalCaches {
    pub pawn: PawnTable,
    pub material: MaterialTable,
}

impl EvalCaches {
    #[must_use]
    pub fn new() -> Self {
        EvalCaches {
            pawn: PawnTable::new(),
            material: MaterialTable::new(),
        }
    }

    pub fn clear(&mut self) {
        self.pawn.clear();
        self.material.clear();
    }
}
