use super::Addr;

/// Free block addresses of one size class, kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedAddressList {
    addrs: Vec<Addr>,
}

impl OrderedAddressList {
    pub fn new() -> Self {
        Self { addrs: Vec::new() }
    }

    /// Returns false if `addr` was already present.
    pub fn insert(&mut self, addr: Addr) -> bool {
        match self.addrs.binary_search(&addr) {
            Ok(_) => false,
            Err(pos) => {
                self.addrs.insert(pos, addr);
                true
            }
        }
    }

    pub fn pop_first(&mut self) -> Option<Addr> {
        if self.addrs.is_empty() {
            None
        } else {
            Some(self.addrs.remove(0))
        }
    }

    pub fn remove(&mut self, addr: Addr) -> bool {
        match self.addrs.binary_search(&addr) {
            Ok(pos) => {
                self.addrs.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn first(&self) -> Option<Addr> {
        self.addrs.first().copied()
    }

    pub fn contains(&self, addr: Addr) -> bool {
        self.addrs.binary_search(&addr).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn as_slice(&self) -> &[Addr] {
        &self.addrs
    }

    // Index-based access for the coalescing scan, which removes while walking
    pub(super) fn get(&self, index: usize) -> Option<Addr> {
        self.addrs.get(index).copied()
    }

    pub(super) fn remove_pair_at(&mut self, index: usize) {
        self.addrs.drain(index..index + 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_ascending_order() {
        let mut list = OrderedAddressList::new();
        for addr in [512, 0, 768, 256] {
            assert!(list.insert(addr));
        }
        assert_eq!(list.as_slice(), &[0, 256, 512, 768]);
        assert!(!list.insert(256), "duplicate insert must be refused");
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn pop_first_takes_smallest() {
        let mut list = OrderedAddressList::new();
        list.insert(64);
        list.insert(32);
        assert_eq!(list.first(), Some(32));
        assert_eq!(list.pop_first(), Some(32));
        assert_eq!(list.pop_first(), Some(64));
        assert_eq!(list.pop_first(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn remove_arbitrary() {
        let mut list = OrderedAddressList::new();
        for addr in [8, 16, 24] {
            list.insert(addr);
        }
        assert!(list.remove(16));
        assert!(!list.remove(16));
        assert!(!list.contains(16));
        assert_eq!(list.as_slice(), &[8, 24]);
    }
}
