use hashbrown::{HashMap, HashSet};
use std::rc::Rc;

/// Per-call scratch space of the keyed child reconciliation.
#[derive(Debug, Default)]
pub struct KeyIndex {
	/// Position of the first old child with each key.
	pub old: HashMap<Rc<str>, usize>,
	/// Keys already matched to a new child.
	pub claimed: HashSet<Rc<str>>,
}

impl KeyIndex {
	fn clear(&mut self) {
		self.old.clear();
		self.claimed.clear();
	}

	/// The effective key of the old child at `i`: duplicates after the first are treated as unkeyed.
	pub fn old_key<'a>(&self, i: usize, key: Option<&'a Rc<str>>) -> Option<&'a Rc<str>> {
		key.filter(|key| self.old.get(&***key) == Some(&i))
	}
}

/// Recycles [`KeyIndex`]es across (recursive) reconciliations so that steady-state patching doesn't allocate.
#[derive(Debug, Default)]
pub struct KeyIndexPool(Vec<KeyIndex>);
impl KeyIndexPool {
	pub fn new() -> Self {
		Self(Vec::new())
	}

	/// Hands out an empty index.
	pub fn take(&mut self) -> KeyIndex {
		self.0.pop().unwrap_or_default()
	}

	pub fn give_back(&mut self, mut index: KeyIndex) {
		index.clear();
		self.0.push(index)
	}

	/// Total retained capacity across pooled indices.
	pub fn capacity(&self) -> usize {
		self.0.iter().map(|index| index.old.capacity() + index.claimed.capacity()).sum()
	}
}
