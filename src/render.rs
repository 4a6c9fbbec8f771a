//! Materializes [`lignin`] VDOM trees through a [`Dom`].
//!
//! This is a create-only counterpart to a differ: the nodes are appended to a parent once and never updated afterwards.
//! [`lignin::Node::Text`] always becomes a text node, so VDOM content can carry arbitrary user input.

use crate::dom::{Dom, Namespace};
use lignin::ThreadBound;
use tracing::{error, instrument, trace_span, warn};

/// Appends `vdom` to `parent`, returning the top-level elements that were created in order.
///
/// `depth_limit` counts element and fragment nesting levels. Content below the limit is skipped with an error.
#[instrument(skip(dom, vdom))]
pub fn materialize<D: Dom>(dom: &D, parent: &D::Node, vdom: &[lignin::Node<'_, ThreadBound>], depth_limit: usize) -> Vec<D::Node> {
	let mut created = Vec::new();
	append_nodes(dom, parent, vdom, depth_limit, &mut created);
	created
}

fn append_nodes<D: Dom>(dom: &D, parent: &D::Node, vdom: &[lignin::Node<'_, ThreadBound>], depth_limit: usize, created: &mut Vec<D::Node>) {
	if depth_limit == 0 {
		return error!("Depth limit reached");
	}

	for new_node in vdom {
		match *new_node {
			lignin::Node::Comment { .. } => {
				warn!("Comments are not materialized.");
			}

			lignin::Node::HtmlElement { element, .. } => {
				if let Some(element) = append_element(dom, parent, Namespace::Html, element, depth_limit) {
					created.push(element)
				}
			}
			lignin::Node::MathMlElement { element, .. } => {
				if let Some(element) = append_element(dom, parent, Namespace::MathMl, element, depth_limit) {
					created.push(element)
				}
			}
			lignin::Node::SvgElement { element, .. } => {
				if let Some(element) = append_element(dom, parent, Namespace::Svg, element, depth_limit) {
					created.push(element)
				}
			}

			lignin::Node::Memoized { state_key, content } => {
				let span = trace_span!("Creating memoized", state_key);
				let _enter = span.enter();
				append_nodes(dom, parent, core::slice::from_ref(content), depth_limit - 1, created)
			}
			lignin::Node::Multi(nodes) => {
				let span = trace_span!("Creating multi", "nodes.len()" = nodes.len());
				let _enter = span.enter();
				if !nodes.is_empty() {
					append_nodes(dom, parent, nodes, depth_limit - 1, created)
				}
			}
			lignin::Node::Keyed(reorderable_fragments) => {
				let span = trace_span!("Creating keyed", "reorderable_fragments.len()" = reorderable_fragments.len());
				let _enter = span.enter();
				for reorderable_fragment in reorderable_fragments {
					append_nodes(dom, parent, core::slice::from_ref(&reorderable_fragment.content), depth_limit - 1, created)
				}
			}

			lignin::Node::Text { text, .. } => {
				let span = trace_span!("Creating text node", "text.len()" = text.len());
				let _enter = span.enter();
				dom.append_text(parent, text)
			}

			lignin::Node::RemnantSite(_) => {
				error!("Remnant sites can't be materialized. Skipping.");
			}
		}
	}
}

fn append_element<D: Dom>(dom: &D, parent: &D::Node, namespace: Namespace, element: &lignin::Element<'_, ThreadBound>, depth_limit: usize) -> Option<D::Node> {
	let &lignin::Element {
		name,
		attributes,
		content,
		event_bindings,
		..
	} = element;
	let span = trace_span!("Creating element", name, ?namespace);
	let _enter = span.enter();

	let dom_element = match dom.create_element(namespace, name) {
		Some(dom_element) => dom_element,
		None => {
			error!("Failed to create element <{}>.", name);
			return None;
		}
	};

	for &lignin::Attribute { name, value } in attributes {
		dom.set_attribute(&dom_element, name, value)
	}
	if !event_bindings.is_empty() {
		warn!("Ignoring {} event binding(s) on <{}>; listen through `Dom` instead.", event_bindings.len(), name);
	}

	// Empty content doesn't count against the depth limit.
	if !matches!(content, lignin::Node::Multi(nodes) if nodes.is_empty()) {
		append_nodes(dom, &dom_element, &[content], depth_limit - 1, &mut Vec::new());
	}
	dom.append_child(parent, &dom_element);
	Some(dom_element)
}
