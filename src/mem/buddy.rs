use log::{debug, trace};

use super::{Addr, MAX_BLOCK, NUM_CLASSES, OrderedAddressList, POOL_SIZE, block_size, class_of};
use crate::error::AllocError;

/// Buddy allocator over the fixed synthetic address space `0..POOL_SIZE`.
///
/// Class `i` holds free blocks of `2^(i+1)` units. The pool starts out as
/// `POOL_SIZE / MAX_BLOCK` blocks of the largest class; blocks are split on
/// allocation and buddies are coalesced back on release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuddyAllocator {
    classes: [OrderedAddressList; NUM_CLASSES],
    free: u32,
}

impl Default for BuddyAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl BuddyAllocator {
    pub fn new() -> Self {
        let mut classes: [OrderedAddressList; NUM_CLASSES] = Default::default();
        for addr in (0..POOL_SIZE).step_by(MAX_BLOCK as usize) {
            classes[NUM_CLASSES - 1].insert(addr);
        }
        Self {
            classes,
            free: POOL_SIZE,
        }
    }

    pub fn free_memory(&self) -> u32 {
        self.free
    }

    pub fn free_blocks(&self, class: usize) -> &[Addr] {
        self.classes[class].as_slice()
    }

    /// Sum of every block sitting in a free list; equals `free_memory()`
    /// whenever the allocator is consistent.
    pub fn free_in_lists(&self) -> u32 {
        self.classes
            .iter()
            .enumerate()
            .map(|(class, list)| list.len() as u32 * block_size(class))
            .sum()
    }

    pub fn allocate(&mut self, size: u32) -> Result<Addr, AllocError> {
        let desired = class_of(size).ok_or(AllocError::InvalidSize { size })?;

        let mut found = (desired..NUM_CLASSES)
            .find(|&class| !self.classes[class].is_empty())
            .ok_or(AllocError::Rejected { size })?;

        while found > desired {
            let addr = self.classes[found]
                .pop_first()
                .expect("class was checked non-empty");
            let half = block_size(found) / 2;
            found -= 1;
            self.classes[found].insert(addr);
            self.classes[found].insert(addr + half);
            trace!("split block {addr} ({}) into {addr} and {}", block_size(found + 1), addr + half);
        }

        let addr = self.classes[desired]
            .pop_first()
            .expect("split loop leaves the desired class non-empty");
        self.free -= size;
        debug!("allocated {size} units at {addr}, {} free", self.free);
        Ok(addr)
    }

    pub fn free(&mut self, addr: Addr, size: u32) -> Result<(), AllocError> {
        let index = class_of(size).ok_or(AllocError::InvalidSize { size })?;
        if addr >= POOL_SIZE || addr + size > POOL_SIZE {
            return Err(AllocError::OutOfRange { addr });
        }
        if addr % size != 0 {
            return Err(AllocError::Misaligned { addr, size });
        }
        if self.overlaps_free(addr, size) {
            return Err(AllocError::DoubleFree { addr, size });
        }

        self.free += size;
        self.classes[index].insert(addr);
        self.coalesce(index);
        debug!("freed {size} units at {addr}, {} free", self.free);
        Ok(())
    }

    // Walk each class from `index` upward and merge adjacent buddy pairs.
    // The top class is never merged: the pool is made of independent
    // MAX_BLOCK blocks.
    fn coalesce(&mut self, index: usize) {
        for class in index..NUM_CLASSES - 1 {
            let size = block_size(class);
            let mut i = 0;
            while let (Some(left), Some(right)) = (self.classes[class].get(i), self.classes[class].get(i + 1)) {
                if (left / size) % 2 == 0 && right == left + size {
                    self.classes[class].remove_pair_at(i);
                    self.classes[class + 1].insert(left);
                    trace!("merged buddies {left} and {right} into {left} ({})", size * 2);
                } else {
                    i += 1;
                }
            }
        }
    }

    fn overlaps_free(&self, addr: Addr, size: u32) -> bool {
        let end = addr + size;
        self.classes.iter().enumerate().any(|(class, list)| {
            let bs = block_size(class);
            list.as_slice()
                .iter()
                .any(|&start| start < end && addr < start + bs)
        })
    }
}
