use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    rc::Rc,
};

/// Maps identifiers to the memory address they were first bound to.
///
/// Entries are never removed or renumbered; declaring an identifier a second
/// time keeps its original address.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    addresses: HashMap<Rc<str>, usize>,
    order: Vec<Rc<str>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `address` if it has not been seen, providing the address the name is bound to
    pub fn declare(&mut self, name: &str, address: usize) -> usize {
        match self.addresses.entry(name.into()) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                self.order.push(e.key().clone());
                *e.insert(address)
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.addresses.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over names and addresses in first-declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.order
            .iter()
            .filter_map(|n| self.addresses.get(n).map(|a| (n.as_ref(), *a)))
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, addr)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={addr}")?;
        }
        write!(f, "}}")
    }
}
