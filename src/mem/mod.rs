pub mod addr_list;
pub mod buddy;

pub use addr_list::OrderedAddressList;
pub use buddy::BuddyAllocator;

pub type Addr = u32;

pub const POOL_SIZE: u32 = 1024;
pub const MIN_BLOCK: u32 = 2;
pub const MAX_BLOCK: u32 = 256;
// Classes 2^1 ..= 2^8
pub const NUM_CLASSES: usize = 8;

pub const fn block_size(class: usize) -> u32 {
    MIN_BLOCK << class
}

/// Size class holding blocks of exactly `size` units.
pub fn class_of(size: u32) -> Option<usize> {
    if size.is_power_of_two() && (MIN_BLOCK..=MAX_BLOCK).contains(&size) {
        Some(size.trailing_zeros() as usize - 1)
    } else {
        None
    }
}

/// Rounds a request up to the block size actually reserved for it.
pub fn round_to_block(requested: u32) -> u32 {
    requested.max(MIN_BLOCK).next_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding() {
        assert_eq!(round_to_block(1), 2);
        assert_eq!(round_to_block(2), 2);
        assert_eq!(round_to_block(3), 4);
        assert_eq!(round_to_block(200), 256);
        assert_eq!(round_to_block(256), 256);
    }

    #[test]
    fn classes() {
        assert_eq!(class_of(2), Some(0));
        assert_eq!(class_of(256), Some(7));
        assert_eq!(class_of(1), None);
        assert_eq!(class_of(12), None);
        assert_eq!(class_of(512), None);
        for class in 0..NUM_CLASSES {
            assert_eq!(class_of(block_size(class)), Some(class));
        }
    }
}
