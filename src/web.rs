//! [`Host`] implementation for the browser DOM.
//!
//! All event listeners registered through a [`WebDom`] share a single [`Closure`], which looks up the Rust-side
//! [`Handler`] by node and event name when it's invoked. Replacing a handler therefore never touches the DOM.

use crate::{
	host::{Host, LiveKind, NodeId, Scalar},
	node::Handler,
};
use hashbrown::HashMap;
use js_sys::{Function, Reflect};
use std::{
	cell::RefCell,
	rc::Rc,
	sync::atomic::{AtomicU64, Ordering},
};
use tracing::{error, trace, trace_span, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

/// Expando property that holds each managed node's [`NodeId`].
const ID_PROPERTY: &str = "__patchworkDomId";

/// Shared by all [`WebDom`]s, since they may manage nodes of the same document.
static NEXT_ID: AtomicU64 = AtomicU64::new(0);
const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

type Listeners = Rc<RefCell<HashMap<(u64, String), Handler<web_sys::Event>>>>;

/// A [`web_sys::Document`] as [`Host`].
///
/// # Safety
///
/// Listeners bound through this instance start throwing errors into JavaScript once it is dropped.
#[derive(Debug)]
pub struct WebDom {
	document: web_sys::Document,
	listeners: Listeners,
	common_handler: Closure<dyn Fn(web_sys::Event)>,
}

impl WebDom {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		let listeners = Listeners::default();
		let common_handler = {
			let listeners = Rc::clone(&listeners);
			Closure::wrap(Box::new(move |event: web_sys::Event| {
				let span = trace_span!("common_handler", event = %event.type_());
				let _enter = span.enter();

				let id = match event.current_target().and_then(|target| read_id(target.as_ref())) {
					Some(id) => id,
					None => return warn!("Event dispatched to a target without node id. Ignoring."),
				};
				// Released before the call, since handlers may patch (and so rebind) synchronously.
				let handler = listeners.borrow().get(&(id, event.type_())).cloned();
				match handler {
					Some(handler) => handler.call(&event),
					None => trace!("No handler bound (anymore)."),
				}
			}) as Box<dyn Fn(web_sys::Event)>)
		};

		Self {
			document,
			listeners,
			common_handler,
		}
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}

	/// The number of currently bound listeners.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.listeners.borrow().len()
	}

	fn common_handler(&self) -> &Function {
		self.common_handler.as_ref().unchecked_ref()
	}
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn read_id(value: &JsValue) -> Option<u64> {
	Reflect::get(value, &JsValue::from_str(ID_PROPERTY)).ok()?.as_f64().map(|id| id as u64)
}

fn as_element(node: &web_sys::Node) -> Result<&web_sys::Element, JsValue> {
	node.dyn_ref::<web_sys::Element>().ok_or_else(|| JsValue::from_str("patchwork-dom: Expected an element."))
}

impl Host for WebDom {
	type Node = web_sys::Node;
	type Event = web_sys::Event;
	type Error = JsValue;

	fn create_element(&mut self, tag: &str, svg: bool) -> Result<web_sys::Node, JsValue> {
		let element = if svg {
			self.document.create_element_ns(Some(SVG_NAMESPACE), tag)?
		} else {
			self.document.create_element(tag)?
		};
		Ok(element.into())
	}

	fn create_text(&mut self, text: &str) -> Result<web_sys::Node, JsValue> {
		Ok(self.document.create_text_node(text).into())
	}

	fn set_text(&mut self, node: &web_sys::Node, text: &str) -> Result<(), JsValue> {
		node.set_node_value(Some(text));
		Ok(())
	}

	fn inspect(&self, node: &web_sys::Node) -> LiveKind {
		match node.node_type() {
			web_sys::Node::ELEMENT_NODE => match node.dyn_ref::<web_sys::Element>() {
				Some(element) => LiveKind::Element { tag: element.local_name() },
				None => {
					error!("Element node {:?} isn't a `web_sys::Element`.", node);
					LiveKind::Other { name: node.node_name() }
				}
			},
			web_sys::Node::TEXT_NODE => LiveKind::Text(node.node_value().unwrap_or_default()),
			_ => LiveKind::Other { name: node.node_name() },
		}
	}

	fn child_nodes(&self, parent: &web_sys::Node) -> Vec<web_sys::Node> {
		let child_nodes = parent.child_nodes();
		(0..child_nodes.length()).filter_map(|i| child_nodes.get(i)).collect()
	}

	fn insert_before(&mut self, parent: &web_sys::Node, child: &web_sys::Node, reference: Option<&web_sys::Node>) -> Result<(), JsValue> {
		parent.insert_before(child, reference).map(drop)
	}

	fn remove_child(&mut self, parent: &web_sys::Node, child: &web_sys::Node) -> Result<(), JsValue> {
		parent.remove_child(child).map(drop)
	}

	fn set_attribute(&mut self, node: &web_sys::Node, name: &str, value: &str) -> Result<(), JsValue> {
		as_element(node)?.set_attribute(name, value)
	}

	fn remove_attribute(&mut self, node: &web_sys::Node, name: &str) -> Result<(), JsValue> {
		as_element(node)?.remove_attribute(name)
	}

	fn has_property(&self, node: &web_sys::Node, name: &str) -> bool {
		Reflect::has(node.as_ref(), &JsValue::from_str(name)).unwrap_or(false)
	}

	fn property(&self, node: &web_sys::Node, name: &str) -> Option<Scalar> {
		let value = Reflect::get(node.as_ref(), &JsValue::from_str(name)).ok()?;
		if let Some(value) = value.as_bool() {
			Some(Scalar::Bool(value))
		} else if let Some(value) = value.as_f64() {
			Some(Scalar::Number(value))
		} else {
			value.as_string().map(Scalar::Text)
		}
	}

	fn set_property(&mut self, node: &web_sys::Node, name: &str, value: Scalar) -> Result<(), JsValue> {
		let value = match value {
			Scalar::Text(text) => JsValue::from_str(&text),
			Scalar::Bool(value) => JsValue::from_bool(value),
			Scalar::Number(value) => JsValue::from_f64(value),
		};
		Reflect::set(node.as_ref(), &JsValue::from_str(name), &value).map(drop)
	}

	fn set_style(&mut self, node: &web_sys::Node, property: &str, value: Option<&str>) -> Result<(), JsValue> {
		let style = if let Some(element) = node.dyn_ref::<web_sys::HtmlElement>() {
			element.style()
		} else if let Some(element) = node.dyn_ref::<web_sys::SvgElement>() {
			element.style()
		} else {
			return Err(JsValue::from_str("patchwork-dom: Expected an HTML or SVG element to style."));
		};

		// Custom properties are only reachable through `setProperty`, everything else is set camelCased.
		if property.starts_with('-') {
			match value {
				Some(value) => style.set_property(property, value),
				None => style.remove_property(property).map(drop),
			}
		} else {
			Reflect::set(style.as_ref(), &JsValue::from_str(property), &JsValue::from_str(value.unwrap_or(""))).map(drop)
		}
	}

	fn set_listener(&mut self, node: &web_sys::Node, event: &str, handler: Option<Handler<web_sys::Event>>) -> Result<(), JsValue> {
		let key = (self.node_id(node).0, event.to_owned());
		match handler {
			Some(handler) => {
				if self.listeners.borrow_mut().insert(key, handler).is_none() {
					node.add_event_listener_with_callback(event, self.common_handler())?;
				}
			}
			None => {
				if self.listeners.borrow_mut().remove(&key).is_some() {
					node.remove_event_listener_with_callback(event, self.common_handler())?;
				}
			}
		}
		Ok(())
	}

	#[allow(clippy::cast_precision_loss)]
	fn node_id(&self, node: &web_sys::Node) -> NodeId {
		if let Some(id) = read_id(node.as_ref()) {
			return NodeId(id);
		}

		let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
		if let Err(error) = Reflect::set(node.as_ref(), &JsValue::from_str(ID_PROPERTY), &JsValue::from_f64(id as f64)) {
			error!("Failed to tag node with its id: {:?}", error);
		}
		NodeId(id)
	}
}
