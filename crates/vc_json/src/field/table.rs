use alloc::vec::Vec;
use core::any::type_name;

use foldhash::fast::FixedState;
use hashbrown::HashMap;

use super::FieldEnum;
use crate::Error;
use crate::cell::TypeCell;

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x3C6E_F372_FE94_F82B);

// -----------------------------------------------------------------------------
// FieldEntry

/// One tokenized constant of a [`FieldTable`].
#[derive(Debug, Clone, Copy)]
pub struct FieldEntry<T> {
    pub name: &'static str,
    pub token: &'static str,
    pub value: T,
    pub bits: u64,
}

// -----------------------------------------------------------------------------
// FieldTable

/// Immutable token table of a [`FieldEnum`].
///
/// Built once per enum type by [`FieldTable::of`], then shared.
/// The table is validated when it is built and the outcome is kept,
/// so [`validate`](FieldTable::validate) only reports it again.
pub struct FieldTable<T: FieldEnum> {
    // declaration order, ignored constants excluded
    entries: Vec<FieldEntry<T>>,
    by_token: HashMap<&'static str, usize, FixedState>,
    by_bits: HashMap<u64, usize, FixedState>,
    // non-zero constants, ascending bits, one per bit pattern
    flag_order: Vec<usize>,
    duplicate: Option<(&'static str, &'static str, &'static str)>,
}

impl<T: FieldEnum> FieldTable<T> {
    /// The shared table of `T`.
    pub fn of() -> &'static Self {
        static TABLES: TypeCell = TypeCell::new();
        TABLES.get_or_insert::<T, Self>(Self::build)
    }

    fn build() -> Self {
        let mut entries = Vec::with_capacity(T::FIELDS.len());
        let mut by_token = HashMap::with_hasher(FIXED_HASH_STATE);
        let mut by_bits = HashMap::with_hasher(FIXED_HASH_STATE);
        let mut duplicate = None;

        for field in T::FIELDS.iter().filter(|field| !field.is_ignored()) {
            let entry = FieldEntry {
                name: field.name(),
                token: field.token(),
                value: *field.value(),
                bits: field.value().to_bits(),
            };
            let index = entries.len();

            match by_token.get(entry.token) {
                Some(&other) => {
                    let other: &FieldEntry<T> = &entries[other];
                    // Aliases of one value may share a token.
                    if other.bits != entry.bits && duplicate.is_none() {
                        log::warn!(
                            "token '{}' of `{}::{}` collides with `{}::{}`",
                            entry.token,
                            type_name::<T>(),
                            other.name,
                            type_name::<T>(),
                            entry.name,
                        );
                        duplicate = Some((entry.token, other.name, entry.name));
                    }
                }
                None => {
                    by_token.insert(entry.token, index);
                }
            }
            by_bits.entry(entry.bits).or_insert(index);
            entries.push(entry);
        }

        let mut flag_order: Vec<usize> = by_bits
            .values()
            .copied()
            .filter(|&index| entries[index].bits != 0)
            .collect();
        flag_order.sort_unstable_by_key(|&index| entries[index].bits);

        log::debug!(
            "built field table of `{}` with {} tokens",
            type_name::<T>(),
            entries.len(),
        );

        Self {
            entries,
            by_token,
            by_bits,
            flag_order,
            duplicate,
        }
    }

    /// Fails with [`Error::DuplicateToken`] if two distinct constants share a token.
    #[inline]
    pub fn validate(&self) -> Result<(), Error> {
        match self.duplicate {
            None => Ok(()),
            Some((token, first, second)) => Err(Error::DuplicateToken {
                ty: type_name::<T>(),
                token,
                first,
                second,
            }),
        }
    }

    /// Tokenized constants in declaration order.
    #[inline]
    pub fn entries(&self) -> &[FieldEntry<T>] {
        &self.entries
    }

    /// The constant named by `token`.
    pub fn lookup(&self, token: &str) -> Option<&FieldEntry<T>> {
        self.by_token.get(token).map(|&index| &self.entries[index])
    }

    /// The first declared constant with exactly these bits.
    pub fn lookup_bits(&self, bits: u64) -> Option<&FieldEntry<T>> {
        self.by_bits.get(&bits).map(|&index| &self.entries[index])
    }

    /// Non-zero constants whose bits are all set in `bits`, ascending.
    pub fn contained_in(&self, bits: u64) -> impl Iterator<Item = &FieldEntry<T>> {
        self.flag_order
            .iter()
            .map(|&index| &self.entries[index])
            .filter(move |entry| entry.bits & bits == entry.bits)
    }
}

// -----------------------------------------------------------------------------
// Tests
