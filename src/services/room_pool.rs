// src/services/room_pool.rs
use rand::{seq::SliceRandom, Rng};

/// A named cluster of co-located rooms.
pub struct Block {
    pub name: &'static str,
    pub rooms: BlockRooms,
}

/// How a block numbers its rooms.
pub enum BlockRooms {
    /// `<NAME><n>` for every n in the inclusive range (e.g. WB301).
    Numbered { first: u32, last: u32 },
    /// `<NAME><nn>` zero-padded to two digits (e.g. LAB01).
    Padded { first: u32, last: u32 },
}

pub const BLOCKS: &[Block] = &[
    Block { name: "WB", rooms: BlockRooms::Numbered { first: 301, last: 310 } },
    Block { name: "EB", rooms: BlockRooms::Numbered { first: 301, last: 310 } },
    Block { name: "SB", rooms: BlockRooms::Numbered { first: 301, last: 310 } },
    Block { name: "NB", rooms: BlockRooms::Numbered { first: 301, last: 310 } },
    Block { name: "CB", rooms: BlockRooms::Numbered { first: 301, last: 310 } },
    Block { name: "LAB", rooms: BlockRooms::Padded { first: 1, last: 12 } },
];

impl Block {
    pub fn room_ids(&self) -> Vec<String> {
        match self.rooms {
            BlockRooms::Numbered { first, last } => {
                (first..=last).map(|n| format!("{}{}", self.name, n)).collect()
            }
            BlockRooms::Padded { first, last } => {
                (first..=last).map(|n| format!("{}{:02}", self.name, n)).collect()
            }
        }
    }
}

/// Every room of every block, in block order.
pub fn all_rooms() -> Vec<String> {
    BLOCKS.iter().flat_map(Block::room_ids).collect()
}

/// All rooms, randomly permuted with the given generator.
pub fn generate_pool<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    let mut rooms = all_rooms();
    rooms.shuffle(rng);
    rooms
}

/// All rooms, shuffled with the thread-local generator.
pub fn shuffled_pool() -> Vec<String> {
    generate_pool(&mut rand::rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn all_rooms_covers_every_block() {
        let rooms = all_rooms();
        assert_eq!(rooms.len(), 62);
        assert_eq!(rooms.first().map(String::as_str), Some("WB301"));
        assert!(rooms.contains(&"CB310".to_string()));
        assert!(rooms.contains(&"LAB01".to_string()));
        assert_eq!(rooms.last().map(String::as_str), Some("LAB12"));
    }

    #[test]
    fn room_ids_are_unique() {
        let rooms = all_rooms();
        let unique: HashSet<_> = rooms.iter().collect();
        assert_eq!(unique.len(), rooms.len());
    }

    #[test]
    fn pool_is_a_permutation_of_all_rooms() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pool = generate_pool(&mut rng);
        let mut expected = all_rooms();
        pool.sort();
        expected.sort();
        assert_eq!(pool, expected);
    }

    #[test]
    fn same_seed_gives_same_pool() {
        let a = generate_pool(&mut StdRng::seed_from_u64(42));
        let b = generate_pool(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn shuffled_pool_has_every_room() {
        assert_eq!(shuffled_pool().len(), all_rooms().len());
    }
}
