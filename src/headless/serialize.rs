//! HTML fragment serialization, as used by ***innerHTML***.

use super::{NodeData, NodeId, Tree};
use crate::dom::Namespace;

const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext"];

impl Tree {
	pub(super) fn serialize_children(&self, node: NodeId, out: &mut String) {
		let raw = match &self.slot(node).data {
			NodeData::Element(element) => element.namespace == Namespace::Html && RAW_TEXT_ELEMENTS.contains(&element.name.as_str()),
			NodeData::Text(_) => false,
		};
		for &child in &self.slot(node).children {
			match &self.slot(child).data {
				NodeData::Text(text) if raw => out.push_str(text),
				NodeData::Text(text) => escape(text, false, out),
				NodeData::Element(_) => self.serialize_element(child, out),
			}
		}
	}

	pub(super) fn serialize_element(&self, node: NodeId, out: &mut String) {
		let element = match &self.slot(node).data {
			NodeData::Element(element) => element,
			NodeData::Text(text) => return escape(text, false, out),
		};
		out.push('<');
		out.push_str(&element.name);
		for (name, value) in &element.attributes {
			out.push(' ');
			out.push_str(name);
			out.push_str("=\"");
			escape(value, true, out);
			out.push('"');
		}
		out.push('>');
		if element.namespace == Namespace::Html && VOID_ELEMENTS.contains(&element.name.as_str()) {
			return;
		}
		self.serialize_children(node, out);
		out.push_str("</");
		out.push_str(&element.name);
		out.push('>');
	}
}

fn escape(text: &str, attribute_mode: bool, out: &mut String) {
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'\u{a0}' => out.push_str("&nbsp;"),
			'"' if attribute_mode => out.push_str("&quot;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			c => out.push(c),
		}
	}
}
