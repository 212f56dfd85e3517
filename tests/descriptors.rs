use patchwork_dom::{element, props, text, Handler, Node, Properties, Style, Value};

type N = Node<()>;

#[test]
fn children_are_coerced() {
	let single: N = element("p", (), "hello");
	let numeric: N = element("p", (), 42);
	let mixed: N = element("p", (), vec![text("a"), element("b", (), ()), text(1.5)]);
	let array: N = element("p", (), ["x", "y"]);

	assert_eq!(single.as_element().unwrap().children(), &[text("hello")]);
	assert_eq!(numeric.as_element().unwrap().children()[0].as_text(), Some("42"));
	assert_eq!(mixed.as_element().unwrap().children()[2].as_text(), Some("1.5"));
	assert_eq!(array.as_element().unwrap().children().len(), 2);
	let empty: N = element("br", (), ());
	assert!(empty.as_element().unwrap().children().is_empty());
}

#[test]
fn keys_are_read_from_properties() {
	let by_text: N = element("li", props! { "key" => "a" }, ());
	let by_number: N = element("li", props! { "key" => 7 }, ());
	let by_bool: N = element("li", props! { "key" => true }, ());

	assert_eq!(by_text.key().map(|key| &**key), Some("a"));
	assert_eq!(by_number.key().map(|key| &**key), Some("7"));
	assert_eq!(by_bool.key(), None);
	let leaf: N = text("a");
	assert_eq!(leaf.key(), None);
}

#[test]
fn sameness_is_identity_and_equality_is_structural() {
	let a: N = element("div", props! { "id" => "x" }, "content");
	let b: N = element("div", props! { "id" => "x" }, "content");

	assert!(a.same(&a.clone()));
	assert!(!a.same(&b));
	assert_eq!(a, b);
	assert_ne!(a, element("div", props! { "id" => "y" }, "content"));
	assert_ne!(a, text("content"));
}

#[test]
fn handlers_compare_by_identity() {
	let handler = Handler::new(|_: &()| ());
	let other = Handler::new(|_: &()| ());

	assert_eq!(handler, handler.clone());
	assert_ne!(handler, other);
	assert_eq!(Value::from(handler.clone()), Value::Handler(handler));
}

#[test]
fn style_serialises_to_css() {
	let style = Style::new().with("fontSize", "1em").with("color", "red").with("--accent", "blue");
	assert_eq!(style.to_css(), "--accent: blue; color: red; font-size: 1em;");
	assert_eq!(Style::new().to_css(), "");
}

#[test]
fn properties_collect_from_pairs() {
	let properties: Properties<()> = vec![("class", "a"), ("id", "b")].into_iter().collect();
	assert_eq!(properties.len(), 2);
	assert_eq!(properties.get("class"), Some(&Value::Text("a".to_owned())));
	assert_eq!(properties.names().collect::<Vec<_>>(), ["class", "id"]);
}
