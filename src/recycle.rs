//! Adopting markup that was rendered out-of-band, e.g. on the server.
//!
//! When [`Renderer::patch`](`crate::Renderer::patch`) finds a root node it has no descriptor for, it [`load`]s one from
//! the live tree and patches against that. Loaded descriptors carry no properties, so attributes already present in the
//! markup are kept unless the new descriptor sets them. Children are then matched purely by position, which lets
//! pre-rendered nodes pick up listeners instead of being rebuilt.

use crate::{
	host::{Host, LiveKind},
	node::{Element, Node, Properties},
};
use std::rc::Rc;
use tracing::{instrument, trace};

/// Reads the live subtree at `node` back into a baseline descriptor.
///
/// Elements keep their local name and children, but no properties. Nodes other than elements and text (like comments)
/// become elements named after their node name (`#comment`), which never match a real tag and so are replaced.
#[instrument(skip(host))]
pub fn load<H: Host>(host: &H, node: &H::Node) -> Node<H::Event> {
	match host.inspect(node) {
		LiveKind::Element { tag } => {
			let children = host.child_nodes(node).iter().map(|child| load(host, child)).collect();
			Node::Element(Rc::new(Element::new(tag, Properties::new(), children)))
		}
		LiveKind::Text(text) => Node::Text(text.into()),
		LiveKind::Other { name } => {
			trace!(%name, "Loading unrecognised node as placeholder");
			Node::Element(Rc::new(Element::new(name, Properties::new(), Vec::new())))
		}
	}
}
