use patchwork_dom::{
	element,
	memory::{self, Event, MemoryDom, Mutation},
	props, text, Error, Handler, Node, Options, Renderer, Style,
};

mod memory_setup_;
use memory_setup_::{created_or_removed, setup};

fn list(keys: &[&str]) -> Node<Event> {
	element("ul", (), keys.iter().map(|&key| element("li", props! { "key" => key }, key)).collect::<Vec<_>>())
}

#[test]
fn first_patch_creates() {
	let (mut renderer, container) = setup();
	let root = renderer
		.patch(&container, element("main", props! { "id" => "app" }, vec![element("h1", (), "Hello"), text(" world")]))
		.unwrap();

	assert_eq!(renderer.host().children(container), &[root]);
	assert_eq!(renderer.host().to_html(container), r#"<body><main id="app"><h1>Hello</h1> world</main></body>"#);
	assert!(renderer.descriptor(&root).is_some());
}

#[test]
fn identical_descriptor_is_a_no_op() {
	let (mut renderer, container) = setup();
	let descriptor = list(&["a", "b", "c"]);
	renderer.patch(&container, descriptor.clone()).unwrap();
	renderer.host_mut().take_log();

	renderer.patch(&container, descriptor).unwrap();
	assert!(renderer.host().log().is_empty());
}

#[test]
fn equal_descriptor_is_a_no_op() {
	let (mut renderer, container) = setup();
	let submit = Handler::new(|_: &Event| ());
	let view = || {
		element(
			"form",
			props! { "class" => "login", "onsubmit" => submit.clone() },
			vec![
				element("input", props! { "type" => "checkbox", "checked" => true, "disabled" => false }, ()),
				element("input", props! { "value" => "name" }, ()),
				element("span", props! { "style" => Style::new().with("color", "red"), "hidden" => true }, "label"),
				text(3),
			],
		)
	};

	let root = renderer.patch(&container, view()).unwrap();
	let html = renderer.host().to_html(container);
	renderer.host_mut().take_log();

	assert_eq!(renderer.patch(&container, view()).unwrap(), root);
	assert!(renderer.host().log().is_empty());
	assert_eq!(renderer.host().to_html(container), html);
}

#[test]
fn structure_mirrors_descriptor_regardless_of_history() {
	let (mut renderer, container) = setup();
	renderer
		.patch(
			&container,
			element("section", props! { "id" => "x", "title" => "old" }, vec![element("p", (), "old"), text("tail")]),
		)
		.unwrap();

	renderer.patch(&container, element("section", props! { "id" => "y" }, element("h2", (), "new"))).unwrap();
	assert_eq!(renderer.host().to_html(container), r#"<body><section id="y"><h2>new</h2></section></body>"#);
}

#[test]
fn keyed_children_are_moved_not_recreated() {
	let (mut renderer, container) = setup();
	let root = renderer.patch(&container, list(&["a", "b", "c"])).unwrap();
	let before = renderer.host().children(root).to_vec();
	renderer.host_mut().take_log();

	assert_eq!(renderer.patch(&container, list(&["c", "a", "b"])).unwrap(), root);

	assert_eq!(renderer.host().log(), &[Mutation::Insert { parent: root, child: before[2] }]);
	assert_eq!(renderer.host().children(root), &[before[2], before[0], before[1]]);
	assert_eq!(renderer.host().to_html(root), "<ul><li>c</li><li>a</li><li>b</li></ul>");
}

#[test]
fn keyed_insertion_and_removal() {
	let (mut renderer, container) = setup();
	let root = renderer.patch(&container, list(&["a", "b", "c"])).unwrap();
	let before = renderer.host().children(root).to_vec();
	renderer.host_mut().take_log();

	renderer.patch(&container, list(&["d", "a", "c"])).unwrap();

	let after = renderer.host().children(root).to_vec();
	assert_eq!(after.len(), 3);
	assert!(!before.contains(&after[0]));
	assert_eq!(&after[1..], &[before[0], before[2]]);
	assert_eq!(renderer.host().parent(before[1]), None);
	assert_eq!(renderer.host().to_html(root), "<ul><li>d</li><li>a</li><li>c</li></ul>");

	// <li>, its text and the removal of "b".
	assert_eq!(created_or_removed(renderer.host().log()), 3);
}

#[test]
fn keyed_reversal() {
	let (mut renderer, container) = setup();
	let root = renderer.patch(&container, list(&["1", "2", "3", "4", "5"])).unwrap();
	let before = renderer.host().children(root).to_vec();
	renderer.host_mut().take_log();

	renderer.patch(&container, list(&["5", "4", "3", "2", "1"])).unwrap();

	let mut reversed = before;
	reversed.reverse();
	assert_eq!(renderer.host().children(root), reversed.as_slice());
	assert_eq!(created_or_removed(renderer.host().log()), 0);
}

#[test]
fn keyed_clear_and_refill() {
	let (mut renderer, container) = setup();
	let root = renderer.patch(&container, list(&["a", "b"])).unwrap();

	renderer.patch(&container, list(&[])).unwrap();
	assert!(renderer.host().children(root).is_empty());

	renderer.patch(&container, list(&["b", "c"])).unwrap();
	assert_eq!(renderer.host().to_html(root), "<ul><li>b</li><li>c</li></ul>");
}

#[test]
fn unkeyed_children_are_patched_by_position() {
	let (mut renderer, container) = setup();
	let root = renderer.patch(&container, element("p", (), vec![text("x"), text("y")])).unwrap();
	let before = renderer.host().children(root).to_vec();
	renderer.host_mut().take_log();

	renderer.patch(&container, element("p", (), vec![text("y"), text("z")])).unwrap();

	assert_eq!(renderer.host().children(root), before.as_slice());
	assert_eq!(
		renderer.host().log(),
		&[Mutation::SetText { node: before[0] }, Mutation::SetText { node: before[1] }]
	);
	assert_eq!(renderer.host().to_html(root), "<p>yz</p>");
}

#[test]
fn unkeyed_children_grow_and_shrink_at_the_end() {
	let (mut renderer, container) = setup();
	let root = renderer.patch(&container, element("ol", (), vec![element("li", (), 1)])).unwrap();
	let first = renderer.host().children(root)[0];

	renderer.patch(&container, element("ol", (), vec![element("li", (), 1), element("li", (), 2), element("li", (), 3)])).unwrap();
	assert_eq!(renderer.host().children(root)[0], first);
	assert_eq!(renderer.host().to_html(root), "<ol><li>1</li><li>2</li><li>3</li></ol>");

	renderer.patch(&container, element("ol", (), vec![element("li", (), 1)])).unwrap();
	assert_eq!(renderer.host().children(root), &[first]);
}

#[test]
fn mixed_keyed_and_unkeyed_siblings() {
	let (mut renderer, container) = setup();
	let root = renderer
		.patch(
			&container,
			element("ul", (), vec![element("li", props! { "key" => "a" }, "a"), element("li", (), "u1"), element("li", props! { "key" => "b" }, "b")]),
		)
		.unwrap();
	let before = renderer.host().children(root).to_vec();
	renderer.host_mut().take_log();

	renderer
		.patch(
			&container,
			element("ul", (), vec![element("li", props! { "key" => "b" }, "b"), element("li", (), "u2"), element("li", props! { "key" => "a" }, "a")]),
		)
		.unwrap();

	assert_eq!(renderer.host().children(root), &[before[2], before[1], before[0]]);
	assert_eq!(renderer.host().to_html(root), "<ul><li>b</li><li>u2</li><li>a</li></ul>");
	assert_eq!(created_or_removed(renderer.host().log()), 0);
}

#[test]
fn duplicate_keys_do_not_fail() {
	let (mut renderer, container) = setup();
	let root = renderer.patch(&container, list(&["a", "a", "b"])).unwrap();

	renderer.patch(&container, list(&["b", "a", "a"])).unwrap();
	assert_eq!(renderer.host().to_html(root), "<ul><li>b</li><li>a</li><li>a</li></ul>");
}

#[test]
fn tag_change_replaces_the_node() {
	let (mut renderer, container) = setup();
	let span = renderer.patch(&container, element("span", (), "hello")).unwrap();
	let div = renderer.patch(&container, element("div", (), "hello")).unwrap();

	assert_ne!(span, div);
	assert_eq!(renderer.host().children(container), &[div]);
	assert_eq!(renderer.host().parent(span), None);
	assert_eq!(renderer.host().to_html(container), "<body><div>hello</div></body>");
	assert!(renderer.descriptor(&span).is_none());
	assert!(renderer.descriptor(&div).is_some());
}

#[test]
fn kind_change_replaces_the_child() {
	let (mut renderer, container) = setup();
	let root = renderer.patch(&container, element("p", (), vec![text("a"), text("b")])).unwrap();
	let before = renderer.host().children(root).to_vec();

	renderer.patch(&container, element("p", (), vec![element("b", (), "a"), text("b")])).unwrap();

	let after = renderer.host().children(root).to_vec();
	assert_ne!(after[0], before[0]);
	assert_eq!(after[1], before[1]);
	assert_eq!(renderer.host().to_html(root), "<p><b>a</b>b</p>");
}

#[test]
fn remove_unbinds_and_detaches_the_root() {
	let (mut renderer, container) = setup();
	let root = renderer.patch(&container, element("button", props! { "onclick" => Handler::new(|_: &Event| ()) }, "x")).unwrap();
	assert!(renderer.host().has_listener(root, "click"));

	assert!(renderer.remove(&container).unwrap());
	assert!(renderer.host().children(container).is_empty());
	assert!(!renderer.host().has_listener(root, "click"));
	assert!(renderer.descriptor(&root).is_none());

	assert!(!renderer.remove(&container).unwrap());
}

#[test]
fn depth_limit_is_enforced() {
	let mut renderer = Renderer::with_options(MemoryDom::new(), Options { depth_limit: 2 });
	let container = renderer.host_mut().container("body");

	let deep = element("a", (), element("b", (), element("c", (), element("d", (), ()))));
	assert!(matches!(renderer.patch(&container, deep), Err(Error::DepthLimit { limit: 2 })));

	let shallow = element("a", (), element("b", (), element("c", (), ())));
	assert!(renderer.patch(&container, shallow).is_ok());
}

#[test]
fn invalid_tag_propagates_host_error() {
	let (mut renderer, container) = setup();
	match renderer.patch(&container, element("not a tag", (), ())) {
		Err(Error::Host(memory::Error::InvalidTag(tag))) => assert_eq!(tag, "not a tag"),
		other => panic!("Expected invalid tag error, got {:?}", other),
	}
}

#[test]
fn containers_are_independent() {
	let (mut renderer, first) = setup();
	let second = renderer.host_mut().container("body");

	let a = renderer.patch(&first, list(&["a"])).unwrap();
	let b = renderer.patch(&second, list(&["b"])).unwrap();
	renderer.patch(&first, list(&["a", "c"])).unwrap();

	assert_eq!(renderer.host().to_html(a), "<ul><li>a</li><li>c</li></ul>");
	assert_eq!(renderer.host().to_html(b), "<ul><li>b</li></ul>");
}
