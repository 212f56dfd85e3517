#![cfg(target_arch = "wasm32")]

use patchwork_dom::{element, props, text, Handler, Node};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

use web_setup_::setup;

type WebNode = Node<web_sys::Event>;

#[wasm_bindgen_test]
fn minimal_div() {
	test_create_diff_identical_remove(element("div", (), ()), "<div></div>", 0);
}

#[wasm_bindgen_test]
fn nested_text() {
	test_create_diff_identical_remove(
		element("p", (), vec![text("Hello"), text(" multiple "), text("nodes!")]),
		"<p>Hello multiple nodes!</p>",
		0,
	);
}

#[wasm_bindgen_test]
fn keyed() {
	test_create_diff_identical_remove(
		element(
			"ul",
			(),
			vec![
				element("li", props! { "key" => 0 }, "zero"),
				element("li", props! { "key" => 0 }, "duplicate"), // Intentionally the same as above.
				element("li", props! { "key" => 1 }, "one"),
			],
		),
		"<ul><li>zero</li><li>duplicate</li><li>one</li></ul>",
		0,
	);
}

#[wasm_bindgen_test]
fn clickable_div() {
	let clicked = Handler::new(|_: &web_sys::Event| ());
	test_create_diff_identical_remove(element("div", props! { "onclick" => clicked }, ()), "<div></div>", 1);
}

#[wasm_bindgen_test]
fn minimal_svg() {
	test_create_diff_identical_remove(element("svg", props! { "viewBox" => "0 0 1 1" }, ()), r#"<svg viewBox="0 0 1 1"></svg>"#, 0);
}

fn test_create_diff_identical_remove(vdom: WebNode, html: &str, listener_count: usize) {
	let (mut renderer, container) = setup();

	let root = renderer.patch(container.as_ref(), vdom.clone()).unwrap();
	assert_eq!(container.inner_html(), html);
	assert_eq!(renderer.host().listener_count(), listener_count);

	// Same allocation.
	assert!(renderer.patch(container.as_ref(), vdom.clone()).unwrap().is_same_node(Some(&root)));
	assert_eq!(container.inner_html(), html);
	assert_eq!(renderer.host().listener_count(), listener_count);

	// Structurally equal, handlers shared.
	let equal = element(vdom.as_element().unwrap().tag(), vdom.as_element().unwrap().properties().clone(), vdom.as_element().unwrap().children().to_vec());
	assert!(renderer.patch(container.as_ref(), equal).unwrap().is_same_node(Some(&root)));
	assert_eq!(container.inner_html(), html);

	assert!(renderer.remove(container.as_ref()).unwrap());
	assert_eq!(container.inner_html(), "");
	assert_eq!(renderer.host().listener_count(), 0);
}
