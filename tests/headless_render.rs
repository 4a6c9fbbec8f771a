use app_dom::{
	dom::Dom,
	headless::Document,
	lignin::{Attribute, Element, ElementCreationOptions, Node, ReorderableFragment, ThreadBound},
	render::materialize,
};

fn element<'a>(name: &'a str, attributes: &'a [Attribute<'a>], content: Node<'a, ThreadBound>) -> Element<'a, ThreadBound> {
	Element {
		name,
		creation_options: ElementCreationOptions::new(),
		attributes,
		content,
		event_bindings: &[],
	}
}

#[test]
fn fragments_flatten_in_order() {
	let document = Document::new();
	let body = document.body();

	let first = element("em", &[], Node::Text { text: "a", dom_binding: None });
	let second = element("STRONG", &[Attribute { name: "Title", value: "b" }], Node::Multi(&[]));
	let keyed = [
		ReorderableFragment {
			dom_key: 7,
			content: Node::Text { text: "c", dom_binding: None },
		},
		ReorderableFragment {
			dom_key: 3,
			content: Node::HtmlElement { element: &second, dom_binding: None },
		},
	];
	let memoized = Node::Comment { comment: "skipped", dom_binding: None };
	let vdom = [
		Node::HtmlElement { element: &first, dom_binding: None },
		Node::Keyed(&keyed),
		Node::Memoized {
			state_key: 1,
			content: &memoized,
		},
	];

	let created = materialize(&document, &body, &vdom, 8);
	assert_eq!(created.len(), 2);
	assert_eq!(document.inner_html(&body), r#"<em>a</em>c<strong title="b"></strong>"#);
}

#[test]
fn svg_keeps_case() {
	let document = Document::new();
	let body = document.body();

	let gradient = element("linearGradient", &[Attribute { name: "viewBox", value: "0 0 1 1" }], Node::Multi(&[]));
	let vdom = [Node::SvgElement { element: &gradient, dom_binding: None }];
	materialize(&document, &body, &vdom, 2);

	assert_eq!(document.inner_html(&body), r#"<linearGradient viewBox="0 0 1 1"></linearGradient>"#);
}

#[test]
fn depth_limit_truncates() {
	let document = Document::new();
	let body = document.body();

	let text = [Node::Text { text: "deep", dom_binding: None }];
	let inner = element("span", &[], Node::Multi(&text));
	let inner_content = [Node::HtmlElement { element: &inner, dom_binding: None }];
	let outer = element("div", &[], Node::Multi(&inner_content));
	let vdom = [Node::HtmlElement { element: &outer, dom_binding: None }];

	materialize(&document, &body, &vdom, 1);
	assert_eq!(document.inner_html(&body), "<div></div>");

	let fresh = Document::new();
	let fresh_body = fresh.body();
	materialize(&fresh, &fresh_body, &vdom, 8);
	assert_eq!(fresh.inner_html(&fresh_body), "<div><span>deep</span></div>");
}

#[test]
fn removed_nodes_stay_addressable() {
	let document = Document::new();
	let body = document.body();

	let label = element("label", &[Attribute { name: "for", value: "x" }], Node::Text { text: "kept", dom_binding: None });
	let vdom = [Node::HtmlElement { element: &label, dom_binding: None }];
	let created = materialize(&document, &body, &vdom, 2);
	let node = created[0];

	document.remove(&node);
	assert!(!document.is_connected(&node));
	assert_eq!(document.parent(node), None);
	assert_eq!(document.text_content(node), "kept");
	assert_eq!(document.attribute(&node, "for").as_deref(), Some("x"));
	assert_eq!(document.inner_html(&body), "");
}
