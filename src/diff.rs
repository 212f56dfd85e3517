use crate::{
	error::{self, Error},
	host::{Host, NodeId},
	key_index::KeyIndexPool,
	node::{Node, Properties},
	props, recycle,
};
use hashbrown::HashMap;
use tracing::{error, info, instrument, trace, trace_span, warn};

/// Runtime configuration of a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
	/// Maximum element nesting below a container before [`Error::DepthLimit`] is returned.
	pub depth_limit: usize,
}

impl Default for Options {
	fn default() -> Self {
		Self { depth_limit: 1024 }
	}
}

/// Patches descriptor trees onto containers of a [`Host`], remembering what was rendered where.
///
/// # Correct Use
///
/// The live nodes below each container are owned by the [`Renderer`] after the first [`patch`](`Renderer::patch`).
/// Changing them out-of-band (except for inline styles and attributes the descriptors don't mention) leads to
/// unspecified (but memory-safe) results on the next patch.
///
/// Listeners bound by a [`Renderer`] are unbound when their nodes are removed through it, but not when it's dropped.
#[derive(Debug)]
pub struct Renderer<H: Host> {
	pub(crate) host: H,
	pub(crate) options: Options,
	/// The descriptor each managed root node was last patched to.
	roots: HashMap<NodeId, Node<H::Event>>,
	pub(crate) key_indices: KeyIndexPool,
}

impl<H: Host> Renderer<H> {
	#[must_use]
	pub fn new(host: H) -> Self {
		Self::with_options(host, Options::default())
	}

	#[must_use]
	pub fn with_options(host: H, options: Options) -> Self {
		Self {
			host,
			options,
			roots: HashMap::new(),
			key_indices: KeyIndexPool::new(),
		}
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	pub fn into_host(self) -> H {
		self.host
	}

	pub fn options(&self) -> Options {
		self.options
	}

	/// The descriptor `root` was last patched to, if it's a root managed by this [`Renderer`].
	pub fn descriptor(&self, root: &H::Node) -> Option<&Node<H::Event>> {
		self.roots.get(&self.host.node_id(root))
	}

	/// Makes `descriptor` the only child of `container`, reusing whatever is already there as far as possible.
	///
	/// Returns the live root node that now represents `descriptor`.
	///
	/// On the first call against a `container` that already has children, the existing markup is
	/// [recycled](`crate::recycle`) instead of being rebuilt.
	///
	/// # Errors
	///
	/// Iff a host operation fails or the tree is too deep. The live tree may be left partially patched.
	#[instrument(skip(self, descriptor))]
	pub fn patch(&mut self, container: &H::Node, descriptor: Node<H::Event>) -> Result<H::Node, Error<H::Error>> {
		let old_root = self.host.child_nodes(container).into_iter().next();
		let (old_descriptor, recycling) = match &old_root {
			None => (None, false),
			Some(old_root) => match self.descriptor(old_root) {
				Some(old_descriptor) => (Some(old_descriptor.clone()), false),
				None => {
					info!("No descriptor recorded for the existing root. Recycling it.");
					(Some(recycle::load(&self.host, old_root)), true)
				}
			},
		};

		let root = self.patch_node(container, old_root.as_ref(), old_descriptor.as_ref(), &descriptor, false, recycling, 0)?;

		if let Some(old_root) = old_root {
			self.roots.remove(&self.host.node_id(&old_root));
		}
		self.roots.insert(self.host.node_id(&root), descriptor);

		for stray in self.host.child_nodes(container).into_iter().filter(|child| *child != root) {
			warn!("Removing unmanaged sibling of the root node: {:?}", stray);
			self.host.remove_child(container, &stray).map_err(error::host("remove stray node"))?;
		}

		info!("Key index pool capacity: {}", self.key_indices.capacity());
		Ok(root)
	}

	/// Removes the managed root of `container`, unbinding its listeners.
	///
	/// Returns whether there was anything to remove.
	///
	/// # Errors
	///
	/// Iff a host operation fails.
	#[instrument(skip(self))]
	pub fn remove(&mut self, container: &H::Node) -> Result<bool, Error<H::Error>> {
		let root = match self.host.child_nodes(container).into_iter().next() {
			Some(root) => root,
			None => return Ok(false),
		};
		match self.roots.remove(&self.host.node_id(&root)) {
			Some(descriptor) => {
				self.remove_node(container, &root, &descriptor)?;
				Ok(true)
			}
			None => {
				warn!("The container's first child isn't managed by this renderer. Leaving it in place.");
				Ok(false)
			}
		}
	}

	/// Patches `live` (which was rendered from `old`) into `new`, returning the node representing `new`.
	///
	/// If `old` is [`None`], a new node is created and inserted before `live` (or appended if that's [`None`], too).
	/// Mismatching kinds or tags are replaced, losing node identity.
	#[allow(clippy::too_many_arguments)]
	#[instrument(skip(self, old, new))]
	pub(crate) fn patch_node(
		&mut self,
		parent: &H::Node,
		live: Option<&H::Node>,
		old: Option<&Node<H::Event>>,
		new: &Node<H::Event>,
		svg: bool,
		recycling: bool,
		depth: usize,
	) -> Result<H::Node, Error<H::Error>> {
		if depth > self.options.depth_limit {
			error!("Depth limit reached");
			return Err(Error::DepthLimit { limit: self.options.depth_limit });
		}

		match (live, old, new) {
			(Some(live), Some(old), new) if old.same(new) => {
				trace!("Unchanged descriptor. Skipping.");
				Ok(live.clone())
			}

			(Some(live), Some(Node::Text(t_1)), Node::Text(t_2)) => {
				let span = if cfg!(feature = "dangerous-logging") {
					trace_span!("Patching text node", t_1 = &**t_1, t_2 = &**t_2)
				} else {
					trace_span!("Patching text node", len_1 = t_1.len(), len_2 = t_2.len())
				};
				let _enter = span.enter();
				if t_1 != t_2 {
					self.host.set_text(live, t_2).map_err(error::host("set text"))?;
				}
				Ok(live.clone())
			}

			(Some(live), Some(Node::Element(e_1)), Node::Element(e_2)) if e_1.tag() == e_2.tag() => {
				let span = trace_span!("Patching element", tag = e_2.tag());
				let _enter = span.enter();
				let svg = svg || e_2.tag() == "svg";
				props::patch_properties(&mut self.host, live, e_1.properties(), e_2.properties(), svg)?;
				self.patch_children(live, e_1.children(), e_2.children(), svg, recycling, depth + 1)?;
				Ok(live.clone())
			}

			(live, old, new) => {
				let span = trace_span!("Creating node", replacing = old.is_some());
				let _enter = span.enter();
				let created = self.create_node(new, svg, depth)?;
				self.host.insert_before(parent, &created, live).map_err(error::host("insert node"))?;
				if let (Some(live), Some(old)) = (live, old) {
					trace!("Removing mismatching node");
					self.remove_node(parent, live, old)?;
				}
				Ok(created)
			}
		}
	}

	/// Builds a detached live tree for `node`.
	#[instrument(skip(self, node))]
	fn create_node(&mut self, node: &Node<H::Event>, svg: bool, depth: usize) -> Result<H::Node, Error<H::Error>> {
		if depth > self.options.depth_limit {
			error!("Depth limit reached");
			return Err(Error::DepthLimit { limit: self.options.depth_limit });
		}

		match node {
			Node::Text(text) => self.host.create_text(text).map_err(error::host("create text node")),
			Node::Element(element) => {
				let svg = svg || element.tag() == "svg";
				let live = self.host.create_element(element.tag(), svg).map_err(error::host("create element"))?;
				trace!(tag = element.tag(), svg, "Created element");

				// Children go first so that e.g. `<select value=…>` can find its option.
				for child in element.children() {
					let child = self.create_node(child, svg, depth + 1)?;
					self.host.insert_before(&live, &child, None).map_err(error::host("append child"))?;
				}
				props::patch_properties(&mut self.host, &live, &Properties::new(), element.properties(), svg)?;
				Ok(live)
			}
		}
	}

	/// Unbinds `live`'s listeners according to `old` and detaches it from `parent`.
	#[instrument(skip(self, old))]
	pub(crate) fn remove_node(&mut self, parent: &H::Node, live: &H::Node, old: &Node<H::Event>) -> Result<(), Error<H::Error>> {
		self.unbind_node(live, old, 0)?;
		self.host.remove_child(parent, live).map_err(error::host("remove node"))
	}

	/// Unbinds listeners of a to-be-removed subtree without removing anything from the DOM.
	fn unbind_node(&mut self, live: &H::Node, old: &Node<H::Event>, depth: usize) -> Result<(), Error<H::Error>> {
		let element = match old {
			Node::Element(element) => element,
			Node::Text(_) => return Ok(()),
		};
		if depth > self.options.depth_limit {
			error!("Depth limit reached while unbinding. Leaving remaining listeners bound.");
			return Ok(());
		}

		let span = trace_span!("Unbinding element", tag = element.tag());
		let _enter = span.enter();
		for (name, _) in element.properties().iter().filter(|(_, value)| value.as_handler().is_some()) {
			if let Some(event) = name.strip_prefix("on") {
				self.host.set_listener(live, &event.to_ascii_lowercase(), None).map_err(error::host("unbind listener"))?;
			}
		}

		if !element.children().is_empty() {
			let live_children = self.host.child_nodes(live);
			if live_children.len() != element.children().len() {
				warn!(
					"Expected {} child node(s) to unbind but found {}. Unbinding positionally anyway.",
					element.children().len(),
					live_children.len()
				);
			}
			for (live_child, old_child) in live_children.iter().zip(element.children()) {
				self.unbind_node(live_child, old_child, depth + 1)?;
			}
		}
		Ok(())
	}
}
