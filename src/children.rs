use crate::{
	diff::Renderer,
	error::{self, Error},
	host::Host,
	node::Node,
};
use hashbrown::hash_map::Entry;
use tracing::{instrument, trace, warn};

impl<H: Host> Renderer<H> {
	/// Aligns `parent`'s live children (rendered from `old`) with `new` in a single forward scan.
	///
	/// Keyed children are matched by key and moved as necessary. Unkeyed children are matched by position only, skipping
	/// over keyed ones. While `recycling`, everything is matched by position since the old children carry no keys.
	///
	/// Duplicate keys among siblings are unsupported: only the first old child with a key is reusable, and repeated new
	/// keys each get a fresh node.
	#[allow(clippy::too_many_lines)]
	#[instrument(skip(self, old, new), fields(old.len = old.len(), new.len = new.len()))]
	pub(crate) fn patch_children(&mut self, parent: &H::Node, old: &[Node<H::Event>], new: &[Node<H::Event>], svg: bool, recycling: bool, depth: usize) -> Result<(), Error<H::Error>> {
		if old.is_empty() && new.is_empty() {
			return Ok(());
		}

		let live = self.host.child_nodes(parent);
		if live.len() != old.len() {
			warn!("Expected {} live child node(s) but found {}.", old.len(), live.len());
		}

		let mut index = self.key_indices.take();
		for (i, old_child) in old.iter().enumerate() {
			if let Some(key) = old_child.key() {
				match index.old.entry(key.clone()) {
					Entry::Occupied(_) => warn!("Duplicate key among old siblings at position {}. Only the first is reusable.", i),
					Entry::Vacant(vacant) => {
						vacant.insert(i);
					}
				}
			}
		}

		let mut i = 0;
		let mut k = 0;
		while let Some(new_child) = new.get(k) {
			let old_key = index.old_key(i, old.get(i).and_then(Node::key));
			let new_key = new_child.key();

			if old_key.map_or(false, |old_key| index.claimed.contains(old_key)) {
				// Already moved into place further up.
				i += 1;
				continue;
			}

			if let Some(new_key) = new_key {
				if Some(new_key) == index.old_key(i + 1, old.get(i + 1).and_then(Node::key)) {
					// The current old child was dropped in front of a surviving keyed one.
					if old_key.is_none() {
						if let (Some(live_child), Some(old_child)) = (live.get(i), old.get(i)) {
							self.remove_node(parent, live_child, old_child)?;
						}
					}
					i += 1;
					continue;
				}
			}

			match new_key {
				Some(new_key) if !recycling => {
					let reusable = if index.claimed.contains(&**new_key) {
						warn!("Duplicate key among new siblings at position {}. Creating a new node.", k);
						None
					} else {
						index.old.get(&**new_key).copied()
					};

					match reusable {
						Some(j) if old_key == Some(new_key) => {
							trace!(position = k, "Keyed node in place");
							self.patch_node(parent, live.get(j), old.get(j), new_child, svg, recycling, depth)?;
							i += 1;
						}
						Some(j) => match live.get(j) {
							Some(moved) => {
								trace!(from = j, to = k, "Moving keyed node");
								self.host.insert_before(parent, moved, live.get(i)).map_err(error::host("move node"))?;
								self.patch_node(parent, Some(moved), old.get(j), new_child, svg, recycling, depth)?;
							}
							None => {
								warn!("Keyed live node at position {} is missing. Creating a new one.", j);
								self.patch_node(parent, live.get(i), None, new_child, svg, recycling, depth)?;
							}
						},
						None => {
							trace!(position = k, "Creating keyed node");
							self.patch_node(parent, live.get(i), None, new_child, svg, recycling, depth)?;
						}
					}

					index.claimed.insert(new_key.clone());
					k += 1;
				}
				_ => {
					if old_key.is_none() {
						let old_child = old.get(i);
						let live_child = if old_child.is_some() { live.get(i) } else { None };
						self.patch_node(parent, live_child, old_child, new_child, svg, recycling, depth)?;
						k += 1;
					}
					i += 1;
				}
			}
		}

		for (j, old_child) in old.iter().enumerate().skip(i) {
			if index.old_key(j, old_child.key()).is_none() {
				if let Some(live_child) = live.get(j) {
					trace!(position = j, "Removing surplus node");
					self.remove_node(parent, live_child, old_child)?;
				}
			}
		}

		for (key, &j) in &index.old {
			if !index.claimed.contains(key) {
				if let (Some(live_child), Some(old_child)) = (live.get(j), old.get(j)) {
					trace!(position = j, "Removing unclaimed keyed node");
					self.remove_node(parent, live_child, old_child)?;
				}
			}
		}

		self.key_indices.give_back(index);
		Ok(())
	}
}
