//! The retained-mode UI tree that descriptors are patched onto.
//!
//! [`WebDom`](`crate::web::WebDom`) implements this for the browser, [`MemoryDom`](`crate::memory::MemoryDom`) for
//! tests and server-side rendering.

use crate::node::Handler;
use core::fmt::Debug;

/// A stable identity token for a live node, used as key into the [`Renderer`](`crate::Renderer`)'s metadata side-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// A live property value, as assigned to or read from a reflected DOM property like `value` or `checked`.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
	Text(String),
	Bool(bool),
	/// Numeric properties like `<li>`'s `value`.
	Number(f64),
}

impl Scalar {
	/// Converts `self` to the type of `like`, the way assigning it to a DOM property of that type would.
	#[must_use]
	pub fn coerce_like(&self, like: &Scalar) -> Scalar {
		match (self, like) {
			(Scalar::Text(text), Scalar::Bool(_)) => Scalar::Bool(!text.is_empty()),
			(Scalar::Number(number), Scalar::Bool(_)) => Scalar::Bool(*number != 0.0 && !number.is_nan()),
			(Scalar::Bool(value), Scalar::Text(_)) => Scalar::Text(value.to_string()),
			(Scalar::Number(number), Scalar::Text(_)) => Scalar::Text(number.to_string()),
			(Scalar::Text(text), Scalar::Number(_)) => Scalar::Number(match text.trim() {
				"" => 0.0,
				text => text.parse().unwrap_or(f64::NAN),
			}),
			(Scalar::Bool(value), Scalar::Number(_)) => Scalar::Number(if *value { 1.0 } else { 0.0 }),
			(same, _) => same.clone(),
		}
	}
}

/// What a live node turned out to be when inspected, as far as recycling is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveKind {
	/// `tag` is the local name, i.e. lowercase for HTML elements.
	Element { tag: String },
	Text(String),
	/// Comments, processing instructions and the like. `name` is the node name, e.g. `#comment`.
	Other { name: String },
}

/// Host DOM operations the patcher relies on.
///
/// All mutating operations may fail. Failures aren't recovered from, but propagate out of
/// [`Renderer::patch`](`crate::Renderer::patch`) as [`Error::Host`](`crate::Error::Host`).
pub trait Host {
	type Node: Clone + PartialEq + Debug;
	type Event: 'static;
	type Error: Debug;

	/// Creates a detached element. `svg` elements are created in the SVG namespace.
	fn create_element(&mut self, tag: &str, svg: bool) -> Result<Self::Node, Self::Error>;
	/// Creates a detached text node.
	fn create_text(&mut self, text: &str) -> Result<Self::Node, Self::Error>;
	/// Replaces the character data of a text node.
	fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<(), Self::Error>;

	fn inspect(&self, node: &Self::Node) -> LiveKind;
	/// A snapshot of `parent`'s current child nodes.
	fn child_nodes(&self, parent: &Self::Node) -> Vec<Self::Node>;
	/// Inserts `child` into `parent` before `reference`, or appends it if `reference` is [`None`].
	///
	/// `child` is moved if it's already attached somewhere.
	fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, reference: Option<&Self::Node>) -> Result<(), Self::Error>;
	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

	fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<(), Self::Error>;
	fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), Self::Error>;

	/// Whether `node` has a live property `name` that should be assigned directly instead of through its attribute.
	fn has_property(&self, node: &Self::Node, name: &str) -> bool;
	fn property(&self, node: &Self::Node, name: &str) -> Option<Scalar>;
	fn set_property(&mut self, node: &Self::Node, name: &str, value: Scalar) -> Result<(), Self::Error>;

	/// Sets (or with [`None`] clears) a single inline style declaration, leaving all others in place.
	fn set_style(&mut self, node: &Self::Node, property: &str, value: Option<&str>) -> Result<(), Self::Error>;

	/// Binds `handler` as the one listener for `event` on `node`, replacing any previous one.
	///
	/// [`None`] unbinds the current listener, if any.
	fn set_listener(&mut self, node: &Self::Node, event: &str, handler: Option<Handler<Self::Event>>) -> Result<(), Self::Error>;

	fn node_id(&self, node: &Self::Node) -> NodeId;
}
