//! An arena-backed in-memory DOM.
//!
//! [`MemoryDom`] implements [`Host`] without a browser. Every host call is recorded as a [`Mutation`], which makes it
//! possible to assert on exactly how much work a patch did. Nodes are never freed; detached ones simply stay in the
//! arena.

use crate::{
	host::{Host, LiveKind, NodeId, Scalar},
	node::{kebab_case, Handler},
	props::REFLECTED_PROPERTIES,
};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::trace;

/// Handle to a node in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryNode(usize);

/// The event passed to handlers by [`MemoryDom::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
	pub name: String,
	pub target: MemoryNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	#[error("invalid tag name {0:?}")]
	InvalidTag(String),
	#[error("{child:?} is not a child of {parent:?}")]
	NotAChild { parent: MemoryNode, child: MemoryNode },
	#[error("{0:?} doesn't belong to this document")]
	UnknownNode(MemoryNode),
	#[error("{0:?} can't have attributes or children")]
	NotAnElement(MemoryNode),
	#[error("{0:?} has no character data")]
	NotText(MemoryNode),
	#[error("inserting {child:?} into {parent:?} would create a cycle")]
	Cycle { parent: MemoryNode, child: MemoryNode },
}

/// A recorded host call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
	CreateElement { node: MemoryNode, tag: String },
	CreateText { node: MemoryNode },
	SetText { node: MemoryNode },
	Insert { parent: MemoryNode, child: MemoryNode },
	Remove { parent: MemoryNode, child: MemoryNode },
	SetAttribute { node: MemoryNode, name: String },
	RemoveAttribute { node: MemoryNode, name: String },
	SetProperty { node: MemoryNode, name: String },
	SetStyle { node: MemoryNode, property: String },
	SetListener { node: MemoryNode, event: String, bound: bool },
}

impl Mutation {
	/// Whether this mutation created or destroyed a node.
	#[must_use]
	pub fn is_create_or_remove(&self) -> bool {
		matches!(self, Mutation::CreateElement { .. } | Mutation::CreateText { .. } | Mutation::Remove { .. })
	}
}

/// Tags whose elements have live form properties like `value` and `checked`.
const FORM_TAGS: &[&str] = &["button", "input", "option", "select", "textarea"];

/// Serialised without closing tag.
const VOID_TAGS: &[&str] = &["area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr"];

#[derive(Debug)]
enum Kind {
	Element { tag: String, svg: bool },
	Text(String),
	Comment(String),
}

#[derive(Debug)]
struct Data {
	kind: Kind,
	parent: Option<MemoryNode>,
	children: Vec<MemoryNode>,
	attributes: BTreeMap<String, String>,
	properties: BTreeMap<String, Scalar>,
	styles: BTreeMap<String, String>,
	listeners: BTreeMap<String, Handler<Event>>,
}

impl Data {
	fn new(kind: Kind) -> Self {
		Self {
			kind,
			parent: None,
			children: Vec::new(),
			attributes: BTreeMap::new(),
			properties: BTreeMap::new(),
			styles: BTreeMap::new(),
			listeners: BTreeMap::new(),
		}
	}
}

#[derive(Debug, Default)]
pub struct MemoryDom {
	nodes: Vec<Data>,
	log: Vec<Mutation>,
}

impl MemoryDom {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a detached element to render into. Not recorded in the [`log`](`MemoryDom::log`).
	pub fn container(&mut self, tag: &str) -> MemoryNode {
		self.push(Kind::Element { tag: tag.to_owned(), svg: false })
	}

	/// Creates a detached comment node. Not recorded in the [`log`](`MemoryDom::log`).
	pub fn create_comment(&mut self, text: &str) -> MemoryNode {
		self.push(Kind::Comment(text.to_owned()))
	}

	fn push(&mut self, kind: Kind) -> MemoryNode {
		self.nodes.push(Data::new(kind));
		MemoryNode(self.nodes.len() - 1)
	}

	fn data(&self, node: MemoryNode) -> Result<&Data, Error> {
		self.nodes.get(node.0).ok_or(Error::UnknownNode(node))
	}

	fn data_mut(&mut self, node: MemoryNode) -> Result<&mut Data, Error> {
		self.nodes.get_mut(node.0).ok_or(Error::UnknownNode(node))
	}

	fn element_mut(&mut self, node: MemoryNode) -> Result<&mut Data, Error> {
		let data = self.data_mut(node)?;
		match data.kind {
			Kind::Element { .. } => Ok(data),
			_ => Err(Error::NotAnElement(node)),
		}
	}

	/// All host calls so far.
	#[must_use]
	pub fn log(&self) -> &[Mutation] {
		&self.log
	}

	/// Returns and clears the [`log`](`MemoryDom::log`).
	pub fn take_log(&mut self) -> Vec<Mutation> {
		std::mem::take(&mut self.log)
	}

	#[must_use]
	pub fn tag(&self, node: MemoryNode) -> Option<&str> {
		match &self.nodes.get(node.0)?.kind {
			Kind::Element { tag, .. } => Some(tag),
			_ => None,
		}
	}

	#[must_use]
	pub fn is_svg(&self, node: MemoryNode) -> bool {
		matches!(self.nodes.get(node.0).map(|data| &data.kind), Some(Kind::Element { svg: true, .. }))
	}

	/// The character data of a text or comment node.
	#[must_use]
	pub fn text(&self, node: MemoryNode) -> Option<&str> {
		match &self.nodes.get(node.0)?.kind {
			Kind::Text(text) | Kind::Comment(text) => Some(text),
			Kind::Element { .. } => None,
		}
	}

	#[must_use]
	pub fn parent(&self, node: MemoryNode) -> Option<MemoryNode> {
		self.nodes.get(node.0)?.parent
	}

	#[must_use]
	pub fn children(&self, node: MemoryNode) -> &[MemoryNode] {
		self.nodes.get(node.0).map(|data| data.children.as_slice()).unwrap_or(&[])
	}

	#[must_use]
	pub fn attribute(&self, node: MemoryNode, name: &str) -> Option<&str> {
		self.nodes.get(node.0)?.attributes.get(name).map(String::as_str)
	}

	#[must_use]
	pub fn style(&self, node: MemoryNode, property: &str) -> Option<&str> {
		self.nodes.get(node.0)?.styles.get(property).map(String::as_str)
	}

	#[must_use]
	pub fn has_listener(&self, node: MemoryNode, event: &str) -> bool {
		self.nodes.get(node.0).map_or(false, |data| data.listeners.contains_key(event))
	}

	#[must_use]
	pub fn listener_count(&self, node: MemoryNode) -> usize {
		self.nodes.get(node.0).map_or(0, |data| data.listeners.len())
	}

	/// Calls the listener for `event` on `target`, if there is one. Events don't propagate.
	pub fn dispatch(&self, target: MemoryNode, event: &str) -> bool {
		match self.nodes.get(target.0).and_then(|data| data.listeners.get(event)) {
			Some(handler) => {
				trace!(?target, event, "Dispatching");
				handler.call(&Event { name: event.to_owned(), target });
				true
			}
			None => false,
		}
	}

	/// Serialises `node` and its descendants. Live properties aren't included, just like with `outerHTML`.
	#[must_use]
	pub fn to_html(&self, node: MemoryNode) -> String {
		let mut html = String::new();
		self.write_html(node, &mut html);
		html
	}

	fn write_html(&self, node: MemoryNode, html: &mut String) {
		let data = match self.nodes.get(node.0) {
			Some(data) => data,
			None => return,
		};
		match &data.kind {
			Kind::Text(text) => escape(text, false, html),
			Kind::Comment(text) => {
				html.push_str("<!--");
				html.push_str(text);
				html.push_str("-->");
			}
			Kind::Element { tag, .. } => {
				html.push('<');
				html.push_str(tag);
				for (name, value) in &data.attributes {
					html.push(' ');
					html.push_str(name);
					html.push_str("=\"");
					escape(value, true, html);
					html.push('"');
				}
				if !data.styles.is_empty() {
					html.push_str(" style=\"");
					escape(&serialize_styles(&data.styles), true, html);
					html.push('"');
				}
				html.push('>');
				if data.children.is_empty() && VOID_TAGS.contains(&tag.as_str()) {
					return;
				}
				for &child in &data.children {
					self.write_html(child, html);
				}
				html.push_str("</");
				html.push_str(tag);
				html.push('>');
			}
		}
	}
}

impl MemoryDom {
	/// The initial value of a live property, which also fixes its type.
	fn property_default(&self, node: MemoryNode, name: &str) -> Option<Scalar> {
		if !self.has_property(&node, name) {
			return None;
		}
		Some(match (self.tag(node), name) {
			(Some("li"), "value") => Scalar::Number(0.0),
			(_, "value") => Scalar::Text(String::new()),
			_ => Scalar::Bool(false),
		})
	}
}

fn escape(text: &str, attribute: bool, html: &mut String) {
	for c in text.chars() {
		match c {
			'&' => html.push_str("&amp;"),
			'<' if !attribute => html.push_str("&lt;"),
			'>' if !attribute => html.push_str("&gt;"),
			'"' if attribute => html.push_str("&quot;"),
			c => html.push(c),
		}
	}
}

fn serialize_styles(styles: &BTreeMap<String, String>) -> String {
	styles.iter().map(|(property, value)| format!("{}: {};", kebab_case(property), value)).collect::<Vec<_>>().join(" ")
}

fn parse_styles(css: &str) -> BTreeMap<String, String> {
	css.split(';')
		.filter_map(|declaration| declaration.split_once(':'))
		.map(|(property, value)| (property.trim().to_owned(), value.trim().to_owned()))
		.filter(|(property, _)| !property.is_empty())
		.collect()
}

fn is_valid_tag(tag: &str) -> bool {
	let mut chars = tag.chars();
	matches!(chars.next(), Some(c) if c.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

impl Host for MemoryDom {
	type Node = MemoryNode;
	type Event = Event;
	type Error = Error;

	fn create_element(&mut self, tag: &str, svg: bool) -> Result<MemoryNode, Error> {
		if !is_valid_tag(tag) {
			return Err(Error::InvalidTag(tag.to_owned()));
		}
		let node = self.push(Kind::Element { tag: tag.to_owned(), svg });
		self.log.push(Mutation::CreateElement { node, tag: tag.to_owned() });
		Ok(node)
	}

	fn create_text(&mut self, text: &str) -> Result<MemoryNode, Error> {
		let node = self.push(Kind::Text(text.to_owned()));
		self.log.push(Mutation::CreateText { node });
		Ok(node)
	}

	fn set_text(&mut self, node: &MemoryNode, text: &str) -> Result<(), Error> {
		match &mut self.data_mut(*node)?.kind {
			Kind::Text(data) | Kind::Comment(data) => text.clone_into(data),
			Kind::Element { .. } => return Err(Error::NotText(*node)),
		}
		self.log.push(Mutation::SetText { node: *node });
		Ok(())
	}

	fn inspect(&self, node: &MemoryNode) -> LiveKind {
		match self.nodes.get(node.0).map(|data| &data.kind) {
			Some(Kind::Element { tag, .. }) => LiveKind::Element { tag: tag.clone() },
			Some(Kind::Text(text)) => LiveKind::Text(text.clone()),
			Some(Kind::Comment(_)) => LiveKind::Other { name: "#comment".to_owned() },
			None => LiveKind::Other { name: "#unknown".to_owned() },
		}
	}

	fn child_nodes(&self, parent: &MemoryNode) -> Vec<MemoryNode> {
		self.children(*parent).to_vec()
	}

	fn insert_before(&mut self, parent: &MemoryNode, child: &MemoryNode, reference: Option<&MemoryNode>) -> Result<(), Error> {
		let (parent, child) = (*parent, *child);
		self.element_mut(parent)?;
		self.data(child)?;
		if reference == Some(&child) {
			return Ok(());
		}
		if let Some(&reference) = reference {
			if self.data(reference)?.parent != Some(parent) {
				return Err(Error::NotAChild { parent, child: reference });
			}
		}

		let mut ancestor = Some(parent);
		while let Some(current) = ancestor {
			if current == child {
				return Err(Error::Cycle { parent, child });
			}
			ancestor = self.data(current)?.parent;
		}

		let previous_parent = self.data(child)?.parent;
		if let Some(previous_parent) = previous_parent {
			self.data_mut(previous_parent)?.children.retain(|&sibling| sibling != child);
		}
		let siblings = &mut self.data_mut(parent)?.children;
		let position = reference.and_then(|reference| siblings.iter().position(|sibling| sibling == reference)).unwrap_or(siblings.len());
		siblings.insert(position, child);
		self.data_mut(child)?.parent = Some(parent);

		self.log.push(Mutation::Insert { parent, child });
		Ok(())
	}

	fn remove_child(&mut self, parent: &MemoryNode, child: &MemoryNode) -> Result<(), Error> {
		let (parent, child) = (*parent, *child);
		if self.data(child)?.parent != Some(parent) {
			return Err(Error::NotAChild { parent, child });
		}
		self.data_mut(parent)?.children.retain(|&sibling| sibling != child);
		self.data_mut(child)?.parent = None;
		self.log.push(Mutation::Remove { parent, child });
		Ok(())
	}

	fn set_attribute(&mut self, node: &MemoryNode, name: &str, value: &str) -> Result<(), Error> {
		let data = self.element_mut(*node)?;
		if name == "style" {
			data.styles = parse_styles(value);
		} else {
			data.attributes.insert(name.to_owned(), value.to_owned());
		}
		self.log.push(Mutation::SetAttribute { node: *node, name: name.to_owned() });
		Ok(())
	}

	fn remove_attribute(&mut self, node: &MemoryNode, name: &str) -> Result<(), Error> {
		let data = self.element_mut(*node)?;
		if name == "style" {
			data.styles.clear();
		} else {
			data.attributes.remove(name);
		}
		self.log.push(Mutation::RemoveAttribute { node: *node, name: name.to_owned() });
		Ok(())
	}

	fn has_property(&self, node: &MemoryNode, name: &str) -> bool {
		match self.nodes.get(node.0).map(|data| &data.kind) {
			Some(Kind::Element { svg: false, tag }) => {
				REFLECTED_PROPERTIES.contains(&name) && (name == "hidden" || FORM_TAGS.contains(&tag.as_str()) || (tag.as_str() == "li" && name == "value"))
			}
			_ => false,
		}
	}

	fn property(&self, node: &MemoryNode, name: &str) -> Option<Scalar> {
		let default = self.property_default(*node, name)?;
		Some(self.nodes.get(node.0)?.properties.get(name).cloned().unwrap_or(default))
	}

	fn set_property(&mut self, node: &MemoryNode, name: &str, value: Scalar) -> Result<(), Error> {
		let value = match self.property_default(*node, name) {
			Some(default) => value.coerce_like(&default),
			None => value,
		};
		self.element_mut(*node)?.properties.insert(name.to_owned(), value);
		self.log.push(Mutation::SetProperty { node: *node, name: name.to_owned() });
		Ok(())
	}

	fn set_style(&mut self, node: &MemoryNode, property: &str, value: Option<&str>) -> Result<(), Error> {
		let styles = &mut self.element_mut(*node)?.styles;
		match value {
			Some(value) => {
				styles.insert(property.to_owned(), value.to_owned());
			}
			None => {
				styles.remove(property);
			}
		}
		self.log.push(Mutation::SetStyle { node: *node, property: property.to_owned() });
		Ok(())
	}

	fn set_listener(&mut self, node: &MemoryNode, event: &str, handler: Option<Handler<Event>>) -> Result<(), Error> {
		let listeners = &mut self.element_mut(*node)?.listeners;
		let bound = handler.is_some();
		match handler {
			Some(handler) => {
				listeners.insert(event.to_owned(), handler);
			}
			None => {
				listeners.remove(event);
			}
		}
		self.log.push(Mutation::SetListener { node: *node, event: event.to_owned(), bound });
		Ok(())
	}

	fn node_id(&self, node: &MemoryNode) -> NodeId {
		NodeId(node.0 as u64)
	}
}
