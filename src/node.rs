//! Immutable descriptors of the desired DOM shape.
//!
//! A [`Node`] is cheap to clone: both variants are reference-counted, and the [`Renderer`](`crate::Renderer`)
//! skips any subtree whose previous and next descriptors are the same allocation.

use core::{
	fmt::{self, Debug, Display, Formatter},
	iter::FromIterator,
};
use std::{collections::BTreeMap, rc::Rc};

/// The reserved property name used for sibling identity. Never written to the DOM.
pub const KEY: &str = "key";

/// Either an element or a text descriptor.
pub enum Node<E> {
	Element(Rc<Element<E>>),
	Text(Rc<str>),
}

/// An element descriptor: tag name, properties and child descriptors.
///
/// Construct these through [`element`].
pub struct Element<E> {
	tag: String,
	properties: Properties<E>,
	children: Vec<Node<E>>,
	key: Option<Rc<str>>,
}

/// The property mapping of an [`Element`], ordered by name.
pub struct Properties<E>(BTreeMap<String, Value<E>>);

/// A property value.
pub enum Value<E> {
	/// Written as attribute or live property. Numbers are converted into this variant.
	Text(String),
	/// `true` sets an empty attribute, `false` removes it.
	Bool(bool),
	/// Only meaningful for the `style` property, which is then patched per CSS property.
	Style(Style),
	/// Only meaningful for `on…` properties.
	Handler(Handler<E>),
}

/// Inline style declarations by (camelCase or `--custom`) CSS property name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style(BTreeMap<String, String>);

/// A shared event callback.
///
/// Two handlers are equal only if they are clones of each other.
/// Reuse handlers across renders to avoid rebinding listeners.
pub struct Handler<E>(Rc<dyn Fn(&E)>);

/// Creates an element descriptor.
///
/// `children` may be a single [`Node`], a [`Vec`] or array of anything convertible into one, a string or number (which
/// become a text child) or `()` for no children.
///
/// The `tag` isn't validated here. Invalid tags fail on creation in the [`Host`](`crate::Host`).
pub fn element<E>(tag: impl Into<String>, properties: impl Into<Properties<E>>, children: impl IntoChildren<E>) -> Node<E> {
	Node::Element(Rc::new(Element::new(tag.into(), properties.into(), children.into_children())))
}

/// Creates a text descriptor from a string or number.
pub fn text<E>(value: impl Display) -> Node<E> {
	Node::Text(value.to_string().into())
}

/// Builds [`Properties`] from `name => value` pairs.
///
/// ```
/// use patchwork_dom::{props, Properties};
///
/// let properties: Properties<()> = props! {
/// 	"class" => "counter",
/// 	"disabled" => true,
/// };
/// assert_eq!(properties.len(), 2);
/// ```
#[macro_export]
macro_rules! props {
	() => { $crate::Properties::new() };
	($($name:expr => $value:expr),+ $(,)?) => {{
		let mut properties = $crate::Properties::new();
		$(properties.insert($name, $value);)+
		properties
	}};
}

impl<E> Node<E> {
	/// The `key` property of an element descriptor.
	#[must_use]
	pub fn key(&self) -> Option<&Rc<str>> {
		match self {
			Node::Element(element) => element.key.as_ref(),
			Node::Text(_) => None,
		}
	}

	/// Whether both descriptors are the same allocation, in which case patching is a no-op.
	#[must_use]
	pub fn same(&self, other: &Self) -> bool {
		match (self, other) {
			(Node::Element(a), Node::Element(b)) => Rc::ptr_eq(a, b),
			(Node::Text(a), Node::Text(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}

	#[must_use]
	pub fn as_element(&self) -> Option<&Element<E>> {
		match self {
			Node::Element(element) => Some(element),
			Node::Text(_) => None,
		}
	}

	#[must_use]
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Node::Element(_) => None,
			Node::Text(text) => Some(text),
		}
	}
}

impl<E> Element<E> {
	pub(crate) fn new(tag: String, properties: Properties<E>, children: Vec<Node<E>>) -> Self {
		let key = match properties.get(KEY) {
			Some(Value::Text(key)) => Some(key.as_str().into()),
			_ => None,
		};
		Self { tag, properties, children, key }
	}

	#[must_use]
	pub fn tag(&self) -> &str {
		&self.tag
	}

	#[must_use]
	pub fn properties(&self) -> &Properties<E> {
		&self.properties
	}

	#[must_use]
	pub fn children(&self) -> &[Node<E>] {
		&self.children
	}

	#[must_use]
	pub fn key(&self) -> Option<&Rc<str>> {
		self.key.as_ref()
	}
}

impl<E> Properties<E> {
	#[must_use]
	pub fn new() -> Self {
		Self(BTreeMap::new())
	}

	/// Inserts or replaces a property.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value<E>>) -> &mut Self {
		self.0.insert(name.into(), value.into());
		self
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&Value<E>> {
		self.0.get(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value<E>)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value))
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<E> Default for Properties<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E> From<()> for Properties<E> {
	fn from((): ()) -> Self {
		Self::new()
	}
}

impl<E> From<BTreeMap<String, Value<E>>> for Properties<E> {
	fn from(map: BTreeMap<String, Value<E>>) -> Self {
		Self(map)
	}
}

impl<E, K: Into<String>, V: Into<Value<E>>> FromIterator<(K, V)> for Properties<E> {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self(iter.into_iter().map(|(name, value)| (name.into(), value.into())).collect())
	}
}

impl Style {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insertion.
	#[must_use]
	pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(property.into(), value.into());
		self
	}

	#[must_use]
	pub fn get(&self, property: &str) -> Option<&str> {
		self.0.get(property).map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(property, value)| (property.as_str(), value.as_str()))
	}

	/// Serialises the declarations into a `style` attribute value, converting camelCase names to kebab-case.
	#[must_use]
	pub fn to_css(&self) -> String {
		let mut css = String::new();
		for (property, value) in &self.0 {
			if !css.is_empty() {
				css.push(' ');
			}
			css.push_str(&kebab_case(property));
			css.push_str(": ");
			css.push_str(value);
			css.push(';');
		}
		css
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Style {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self(iter.into_iter().map(|(property, value)| (property.into(), value.into())).collect())
	}
}

/// `fontSize` → `font-size`. Custom properties (`--x`) and names that are already kebab-case pass through unchanged.
#[must_use]
pub fn kebab_case(property: &str) -> String {
	if property.starts_with('-') {
		return property.to_owned();
	}
	let mut kebab = String::with_capacity(property.len() + 2);
	for c in property.chars() {
		if c.is_ascii_uppercase() {
			kebab.push('-');
			kebab.push(c.to_ascii_lowercase());
		} else {
			kebab.push(c);
		}
	}
	kebab
}

impl<E> Handler<E> {
	pub fn new(callback: impl 'static + Fn(&E)) -> Self {
		Self(Rc::new(callback))
	}

	pub fn call(&self, event: &E) {
		(self.0)(event)
	}

	fn address(&self) -> *const () {
		Rc::as_ptr(&self.0).cast::<()>()
	}
}

impl<E> Clone for Handler<E> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}

impl<E> PartialEq for Handler<E> {
	fn eq(&self, other: &Self) -> bool {
		self.address() == other.address()
	}
}

impl<E> Debug for Handler<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Handler").field(&self.address()).finish()
	}
}

impl<E> Value<E> {
	#[must_use]
	pub fn as_handler(&self) -> Option<&Handler<E>> {
		match self {
			Value::Handler(handler) => Some(handler),
			_ => None,
		}
	}
}

impl<E> Clone for Value<E> {
	fn clone(&self) -> Self {
		match self {
			Value::Text(text) => Value::Text(text.clone()),
			Value::Bool(value) => Value::Bool(*value),
			Value::Style(style) => Value::Style(style.clone()),
			Value::Handler(handler) => Value::Handler(handler.clone()),
		}
	}
}

impl<E> PartialEq for Value<E> {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Text(a), Value::Text(b)) => a == b,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Style(a), Value::Style(b)) => a == b,
			(Value::Handler(a), Value::Handler(b)) => a == b,
			_ => false,
		}
	}
}

impl<E> Debug for Value<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Value::Text(text) if cfg!(feature = "dangerous-logging") => f.debug_tuple("Text").field(text).finish(),
			Value::Text(text) => write!(f, "Text(<{} bytes>)", text.len()),
			Value::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
			Value::Style(style) => f.debug_tuple("Style").field(style).finish(),
			Value::Handler(handler) => Debug::fmt(handler, f),
		}
	}
}

impl<E> From<&str> for Value<E> {
	fn from(text: &str) -> Self {
		Value::Text(text.to_owned())
	}
}

impl<E> From<String> for Value<E> {
	fn from(text: String) -> Self {
		Value::Text(text)
	}
}

impl<E> From<bool> for Value<E> {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl<E> From<Style> for Value<E> {
	fn from(style: Style) -> Self {
		Value::Style(style)
	}
}

impl<E> From<Handler<E>> for Value<E> {
	fn from(handler: Handler<E>) -> Self {
		Value::Handler(handler)
	}
}

/// Conversion into an element's child list.
pub trait IntoChildren<E> {
	fn into_children(self) -> Vec<Node<E>>;
}

impl<E> IntoChildren<E> for () {
	fn into_children(self) -> Vec<Node<E>> {
		Vec::new()
	}
}

impl<E> IntoChildren<E> for Node<E> {
	fn into_children(self) -> Vec<Node<E>> {
		vec![self]
	}
}

impl<E, T: Into<Node<E>>> IntoChildren<E> for Vec<T> {
	fn into_children(self) -> Vec<Node<E>> {
		self.into_iter().map(Into::into).collect()
	}
}

impl<E, T: Into<Node<E>>, const N: usize> IntoChildren<E> for [T; N] {
	fn into_children(self) -> Vec<Node<E>> {
		IntoIterator::into_iter(self).map(Into::into).collect()
	}
}

impl<E> IntoChildren<E> for &str {
	fn into_children(self) -> Vec<Node<E>> {
		vec![text(self)]
	}
}

impl<E> IntoChildren<E> for String {
	fn into_children(self) -> Vec<Node<E>> {
		vec![Node::Text(self.into())]
	}
}

impl<E> From<&str> for Node<E> {
	fn from(value: &str) -> Self {
		text(value)
	}
}

impl<E> From<String> for Node<E> {
	fn from(value: String) -> Self {
		Node::Text(value.into())
	}
}

macro_rules! numeric_conversions {
	($($number:ty),*$(,)?) => {$(
		impl<E> From<$number> for Value<E> {
			fn from(number: $number) -> Self {
				Value::Text(number.to_string())
			}
		}

		impl<E> From<$number> for Node<E> {
			fn from(number: $number) -> Self {
				text(number)
			}
		}

		impl<E> IntoChildren<E> for $number {
			fn into_children(self) -> Vec<Node<E>> {
				vec![text(self)]
			}
		}
	)*};
}
numeric_conversions!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<E> Clone for Node<E> {
	fn clone(&self) -> Self {
		match self {
			Node::Element(element) => Node::Element(Rc::clone(element)),
			Node::Text(text) => Node::Text(Rc::clone(text)),
		}
	}
}

/// Structural equality. Handlers still compare by identity.
impl<E> PartialEq for Node<E> {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Node::Element(a), Node::Element(b)) => Rc::ptr_eq(a, b) || (a.tag == b.tag && a.properties == b.properties && a.children == b.children),
			(Node::Text(a), Node::Text(b)) => a == b,
			_ => false,
		}
	}
}

impl<E> PartialEq for Properties<E> {
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}

impl<E> Clone for Properties<E> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<E> Debug for Node<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Node::Element(element) => Debug::fmt(&**element, f),
			Node::Text(text) if cfg!(feature = "dangerous-logging") => f.debug_tuple("Text").field(text).finish(),
			Node::Text(text) => write!(f, "Text(<{} bytes>)", text.len()),
		}
	}
}

impl<E> Debug for Element<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Element")
			.field("tag", &self.tag)
			.field("properties", &self.properties)
			.field("children", &self.children)
			.finish()
	}
}

impl<E> Debug for Properties<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.0.iter()).finish()
	}
}
