//! An in-memory [`Dom`] with a virtual clock.
//!
//! [`Document`] models just enough of a page for the bindings in this crate: an element tree with attributes,
//! text and form values, event listeners with bubbling, and timers that only run when [`Document::advance`] is called.
//! This makes toast lifetimes and shortcut handling testable without a browser and without waiting.
//!
//! ```
//! use app_dom::{headless::Document, toast::ToastManager, Config};
//! use core::time::Duration;
//!
//! let document = Document::new();
//! let container = document.append_element(document.body(), "div", &[("id", "toast-container")]);
//!
//! let toasts = ToastManager::new(document.clone(), Config::default());
//! let id = toasts.show("Saved", "success").unwrap();
//! assert_eq!(document.children(container).len(), 1);
//!
//! document.advance(Duration::from_millis(4999));
//! assert!(toasts.contains(id.as_str()));
//! document.advance(Duration::from_millis(1));
//! assert!(document.children(container).is_empty());
//! ```

mod selector;
mod serialize;

pub use selector::{SelectorError, SelectorList};

use crate::dom::{Dom, Event, EventKind, Handler, KeyPress, Namespace, Target};
use core::{cell::RefCell, time::Duration};
use selector::Subject;
use std::{collections::BTreeMap, rc::Rc};
use tracing::{error, trace, warn};

/// Identifies a node in a [`Document`]. Detached nodes stay valid.
///
/// Ids index their document's node arena, which never shrinks.
/// Using an id with a different [`Document`] panics or refers to an unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
pub struct ListenerId(usize);

#[derive(Debug)]
pub struct TimerId {
	due: Duration,
	sequence: u64,
}

#[derive(Debug)]
struct ElementData {
	namespace: Namespace,
	name: String,
	attributes: Vec<(String, String)>,
	value: String,
}
impl Subject for ElementData {
	fn local_name(&self) -> &str {
		&self.name
	}

	fn is_html(&self) -> bool {
		self.namespace == Namespace::Html
	}

	fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.iter().find(|(n, _)| self.attribute_name_matches(n, name)).map(|(_, v)| v.as_str())
	}
}
impl ElementData {
	fn attribute_name_matches(&self, stored: &str, requested: &str) -> bool {
		if self.is_html() {
			stored.eq_ignore_ascii_case(requested)
		} else {
			stored == requested
		}
	}

	fn set_attribute(&mut self, name: &str, value: &str) {
		let name = if self.is_html() { name.to_ascii_lowercase() } else { name.to_owned() };
		match self.attributes.iter_mut().find(|(n, _)| *n == name) {
			Some((_, existing)) => *existing = value.to_owned(),
			None => self.attributes.push((name, value.to_owned())),
		}
	}

	fn remove_attribute(&mut self, name: &str) {
		let html = self.is_html();
		self.attributes.retain(|(n, _)| if html { !n.eq_ignore_ascii_case(name) } else { n != name })
	}
}

#[derive(Debug)]
enum NodeData {
	Element(ElementData),
	Text(String),
}

#[derive(Debug)]
struct Slot {
	data: NodeData,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

struct Registration {
	target: Option<NodeId>,
	kind: EventKind,
	handler: Handler<NodeId>,
}

struct Tree {
	slots: Vec<Slot>,
	root: NodeId,
	head: NodeId,
	body: NodeId,
	listeners: Vec<Option<Registration>>,
	loading: bool,
	reduced_motion: bool,
	focused: Option<NodeId>,
}
impl Tree {
	/// Panics for ids of other documents that are out of range.
	fn slot(&self, node: NodeId) -> &Slot {
		&self.slots[node.0]
	}

	fn element(&self, node: NodeId) -> Option<&ElementData> {
		match &self.slots.get(node.0)?.data {
			NodeData::Element(element) => Some(element),
			NodeData::Text(_) => None,
		}
	}

	fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
		match &mut self.slots.get_mut(node.0)?.data {
			NodeData::Element(element) => Some(element),
			NodeData::Text(_) => None,
		}
	}

	fn push(&mut self, data: NodeData) -> NodeId {
		self.slots.push(Slot {
			data,
			parent: None,
			children: Vec::new(),
		});
		NodeId(self.slots.len() - 1)
	}

	fn push_element(&mut self, namespace: Namespace, name: &str) -> NodeId {
		let name = if namespace == Namespace::Html { name.to_ascii_lowercase() } else { name.to_owned() };
		self.push(NodeData::Element(ElementData {
			namespace,
			name,
			attributes: Vec::new(),
			value: String::new(),
		}))
	}

	fn detach(&mut self, node: NodeId) {
		if let Some(parent) = self.slots[node.0].parent.take() {
			self.slots[parent.0].children.retain(|&child| child != node);
		}
	}

	fn attach(&mut self, parent: NodeId, child: NodeId) {
		self.detach(child);
		self.slots[child.0].parent = Some(parent);
		self.slots[parent.0].children.push(child);
	}

	/// `node` and its ancestors, innermost first.
	fn ancestry(&self, node: NodeId) -> Vec<NodeId> {
		let mut ancestry = vec![node];
		let mut current = node;
		while let Some(parent) = self.slot(current).parent {
			ancestry.push(parent);
			current = parent;
		}
		ancestry
	}

	fn is_connected(&self, node: NodeId) -> bool {
		self.ancestry(node).last() == Some(&self.root)
	}

	/// Elements below `node` in tree order, excluding `node` itself.
	fn descendant_elements(&self, node: NodeId, out: &mut Vec<NodeId>) {
		for &child in &self.slot(node).children {
			if self.element(child).is_some() {
				out.push(child);
				self.descendant_elements(child, out);
			}
		}
	}

	fn text_content(&self, node: NodeId, out: &mut String) {
		match &self.slot(node).data {
			NodeData::Text(text) => out.push_str(text),
			NodeData::Element(_) => {
				for &child in &self.slot(node).children {
					self.text_content(child, out)
				}
			}
		}
	}
}

struct Clock {
	epoch_ms: f64,
	now: Duration,
	sequence: u64,
	pending: BTreeMap<(Duration, u64), Box<dyn FnOnce()>>,
}

/// A headless page. Clones share the same tree, listeners and clock.
#[derive(Clone)]
pub struct Document {
	tree: Rc<RefCell<Tree>>,
	clock: Rc<RefCell<Clock>>,
}
impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}
impl Document {
	/// The virtual clock starts at this many milliseconds after the Unix epoch.
	pub const DEFAULT_EPOCH_MS: f64 = 1_700_000_000_000.0;

	/// Creates a still-loading document with empty `head` and `body`.
	#[must_use]
	pub fn new() -> Self {
		Self::with_epoch_ms(Self::DEFAULT_EPOCH_MS)
	}

	#[must_use]
	pub fn with_epoch_ms(epoch_ms: f64) -> Self {
		let mut tree = Tree {
			slots: Vec::new(),
			root: NodeId(0),
			head: NodeId(0),
			body: NodeId(0),
			listeners: Vec::new(),
			loading: true,
			reduced_motion: false,
			focused: None,
		};
		let root = tree.push_element(Namespace::Html, "html");
		let head = tree.push_element(Namespace::Html, "head");
		let body = tree.push_element(Namespace::Html, "body");
		tree.attach(root, head);
		tree.attach(root, body);
		tree.root = root;
		tree.head = head;
		tree.body = body;

		Self {
			tree: Rc::new(RefCell::new(tree)),
			clock: Rc::new(RefCell::new(Clock {
				epoch_ms,
				now: Duration::default(),
				sequence: 0,
				pending: BTreeMap::new(),
			})),
		}
	}

	#[must_use]
	pub fn body(&self) -> NodeId {
		self.tree.borrow().body
	}

	#[must_use]
	pub fn root(&self) -> NodeId {
		self.tree.borrow().root
	}

	/// Creates an HTML element with `attributes` and appends it to `parent`.
	pub fn append_element(&self, parent: NodeId, name: &str, attributes: &[(&str, &str)]) -> NodeId {
		let mut tree = self.tree.borrow_mut();
		let node = tree.push_element(Namespace::Html, name);
		if let Some(element) = tree.element_mut(node) {
			for &(name, value) in attributes {
				element.set_attribute(name, value)
			}
		}
		tree.attach(parent, node);
		node
	}

	/// Sets the value of a form control, as typing into it would.
	pub fn set_value(&self, node: NodeId, value: &str) {
		match self.tree.borrow_mut().element_mut(node) {
			Some(element) => element.value = value.to_owned(),
			None => warn!("Can't set the value of text node {:?}.", node),
		}
	}

	pub fn set_prefers_reduced_motion(&self, reduced_motion: bool) {
		self.tree.borrow_mut().reduced_motion = reduced_motion
	}

	/// Child nodes of `node`, including text nodes.
	#[must_use]
	pub fn children(&self, node: NodeId) -> Vec<NodeId> {
		self.tree.borrow().slot(node).children.clone()
	}

	#[must_use]
	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.tree.borrow().slot(node).parent
	}

	#[must_use]
	pub fn text_content(&self, node: NodeId) -> String {
		let mut text = String::new();
		self.tree.borrow().text_content(node, &mut text);
		text
	}

	#[must_use]
	pub fn outer_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		self.tree.borrow().serialize_element(node, &mut html);
		html
	}

	#[must_use]
	pub fn tag_name(&self, node: NodeId) -> Option<String> {
		self.tree.borrow().element(node).map(|element| element.name.clone())
	}

	#[must_use]
	pub fn focused(&self) -> Option<NodeId> {
		self.tree.borrow().focused
	}

	/// The number of registered event listeners.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.tree.borrow().listeners.iter().filter(|listener| listener.is_some()).count()
	}

	/// Ends loading and fires `DOMContentLoaded`. Does nothing if loading already ended.
	pub fn finish_loading(&self) {
		let was_loading = std::mem::replace(&mut self.tree.borrow_mut().loading, false);
		if was_loading {
			self.dispatch(&Event::new(EventKind::ContentLoaded, None));
		}
	}

	/// Dispatches `event` to its target, then (for bubbling events) to the target's ancestors and the document.
	///
	/// Returns `false` if a handler prevented the default action.
	pub fn dispatch(&self, event: &Event<NodeId>) -> bool {
		let handlers: Vec<Handler<NodeId>> = {
			let tree = self.tree.borrow();
			let kind = event.kind();
			let path: Vec<Option<NodeId>> = match event.target() {
				Some(&target) if kind.bubbles() => {
					let ancestry = tree.ancestry(target);
					let connected = ancestry.last() == Some(&tree.root);
					let mut path: Vec<_> = ancestry.into_iter().map(Some).collect();
					if connected {
						path.push(None)
					}
					path
				}
				Some(&target) => vec![Some(target)],
				None => vec![None],
			};
			path.iter()
				.flat_map(|&at| {
					tree.listeners
						.iter()
						.flatten()
						.filter(move |registration| registration.kind == kind && registration.target == at)
						.map(|registration| Rc::clone(&registration.handler))
				})
				.collect()
		};
		trace!(kind = event.kind().name(), handlers = handlers.len(), "Dispatching event.");
		for handler in handlers {
			handler(event)
		}
		!event.default_prevented()
	}

	pub fn click(&self, node: NodeId) -> bool {
		self.dispatch(&Event::new(EventKind::Click, Some(node)))
	}

	/// Sends `key` to the focused element, or to `body` if nothing is focused.
	pub fn key_down(&self, key: KeyPress) -> bool {
		let target = {
			let tree = self.tree.borrow();
			tree.focused.filter(|&focused| tree.is_connected(focused)).unwrap_or(tree.body)
		};
		self.dispatch(&Event::new(EventKind::KeyDown, Some(target)).with_key(key))
	}

	pub fn pointer_enter(&self, node: NodeId) {
		self.dispatch(&Event::new(EventKind::MouseEnter, Some(node)));
	}

	pub fn pointer_leave(&self, node: NodeId) {
		self.dispatch(&Event::new(EventKind::MouseLeave, Some(node)));
	}

	/// Returns `false` if submission was prevented.
	pub fn submit(&self, form: NodeId) -> bool {
		self.dispatch(&Event::new(EventKind::Submit, Some(form)))
	}

	/// Time passed on the virtual clock.
	#[must_use]
	pub fn elapsed(&self) -> Duration {
		self.clock.borrow().now
	}

	#[must_use]
	pub fn pending_timers(&self) -> usize {
		self.clock.borrow().pending.len()
	}

	/// Moves the virtual clock forward by `by`, running due timers in order of their deadlines.
	///
	/// Timers scheduled by these tasks also run if they fall due within `by`.
	pub fn advance(&self, by: Duration) {
		let deadline = self.clock.borrow().now + by;
		loop {
			let task = {
				let mut clock = self.clock.borrow_mut();
				let key = match clock.pending.keys().next() {
					Some(&key) if key.0 <= deadline => key,
					_ => break,
				};
				clock.now = clock.now.max(key.0);
				clock.pending.remove(&key)
			};
			if let Some(task) = task {
				task()
			}
		}
		self.clock.borrow_mut().now = deadline;
	}
}

impl Dom for Document {
	type Node = NodeId;
	type Listener = ListenerId;
	type Timer = TimerId;

	fn element_by_id(&self, id: &str) -> Option<NodeId> {
		let tree = self.tree.borrow();
		let mut elements = vec![tree.root];
		tree.descendant_elements(tree.root, &mut elements);
		elements.into_iter().find(|&node| tree.element(node).and_then(|element| element.attribute("id")) == Some(id))
	}

	fn query_selector_all(&self, scope: Option<&NodeId>, selector: &str) -> Vec<NodeId> {
		let selector = match SelectorList::parse(selector) {
			Ok(selector) => selector,
			Err(error) => {
				error!("{} in {:?}", error, selector);
				return Vec::new();
			}
		};
		let tree = self.tree.borrow();
		let mut elements = Vec::new();
		match scope {
			Some(&scope) => tree.descendant_elements(scope, &mut elements),
			None => {
				elements.push(tree.root);
				tree.descendant_elements(tree.root, &mut elements)
			}
		}
		elements.retain(|&node| tree.element(node).map_or(false, |element| selector.matches(element)));
		elements
	}

	fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
		let selector = match SelectorList::parse(selector) {
			Ok(selector) => selector,
			Err(error) => {
				error!("{} in {:?}", error, selector);
				return None;
			}
		};
		let tree = self.tree.borrow();
		tree.ancestry(*node).into_iter().find(|&ancestor| tree.element(ancestor).map_or(false, |element| selector.matches(element)))
	}

	fn head(&self) -> Option<NodeId> {
		Some(self.tree.borrow().head)
	}

	fn create_element(&self, namespace: Namespace, name: &str) -> Option<NodeId> {
		if name.is_empty() {
			return None;
		}
		Some(self.tree.borrow_mut().push_element(namespace, name))
	}

	fn append_child(&self, parent: &NodeId, child: &NodeId) {
		let mut tree = self.tree.borrow_mut();
		if tree.element(*parent).is_none() {
			return error!("Can't append to text node {:?}.", parent);
		}
		if tree.ancestry(*parent).contains(child) {
			return error!("Can't append {:?} to its own descendant {:?}.", child, parent);
		}
		tree.attach(*parent, *child)
	}

	fn append_text(&self, parent: &NodeId, text: &str) {
		let mut tree = self.tree.borrow_mut();
		if tree.element(*parent).is_none() {
			return error!("Can't append to text node {:?}.", parent);
		}
		let node = tree.push(NodeData::Text(text.to_owned()));
		tree.attach(*parent, node)
	}

	fn remove(&self, node: &NodeId) {
		self.tree.borrow_mut().detach(*node)
	}

	fn is_connected(&self, node: &NodeId) -> bool {
		self.tree.borrow().is_connected(*node)
	}

	fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
		self.tree.borrow().element(*node)?.attribute(name).map(ToOwned::to_owned)
	}

	fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
		if let Some(element) = self.tree.borrow_mut().element_mut(*node) {
			element.set_attribute(name, value)
		}
	}

	fn add_class(&self, node: &NodeId, class: &str) {
		if let Some(element) = self.tree.borrow_mut().element_mut(*node) {
			let classes = element.attribute("class").unwrap_or_default().to_owned();
			if !classes.split_ascii_whitespace().any(|c| c == class) {
				let classes = classes.split_ascii_whitespace().chain(Some(class)).collect::<Vec<_>>().join(" ");
				element.set_attribute("class", &classes)
			}
		}
	}

	fn remove_class(&self, node: &NodeId, class: &str) {
		if let Some(element) = self.tree.borrow_mut().element_mut(*node) {
			if let Some(classes) = element.attribute("class") {
				let classes = classes.split_ascii_whitespace().filter(|&c| c != class).collect::<Vec<_>>().join(" ");
				element.set_attribute("class", &classes)
			}
		}
	}

	fn has_class(&self, node: &NodeId, class: &str) -> bool {
		self.tree
			.borrow()
			.element(*node)
			.and_then(|element| element.attribute("class"))
			.map_or(false, |classes| classes.split_ascii_whitespace().any(|c| c == class))
	}

	fn set_text_content(&self, node: &NodeId, text: &str) {
		let mut tree = self.tree.borrow_mut();
		if tree.element(*node).is_none() {
			if let NodeData::Text(existing) = &mut tree.slots[node.0].data {
				*existing = text.to_owned()
			}
			return;
		}
		let children = tree.slot(*node).children.clone();
		for child in children {
			tree.detach(child)
		}
		if !text.is_empty() {
			let text = tree.push(NodeData::Text(text.to_owned()));
			tree.attach(*node, text)
		}
	}

	fn inner_html(&self, node: &NodeId) -> String {
		let mut html = String::new();
		self.tree.borrow().serialize_children(*node, &mut html);
		html
	}

	fn value(&self, node: &NodeId) -> String {
		self.tree.borrow().element(*node).map(|element| element.value.clone()).unwrap_or_default()
	}

	fn set_disabled(&self, node: &NodeId, disabled: bool) {
		if let Some(element) = self.tree.borrow_mut().element_mut(*node) {
			if disabled {
				element.set_attribute("disabled", "")
			} else {
				element.remove_attribute("disabled")
			}
		}
	}

	fn is_disabled(&self, node: &NodeId) -> bool {
		self.tree.borrow().element(*node).map_or(false, |element| element.attribute("disabled").is_some())
	}

	fn style_display(&self, node: &NodeId) -> String {
		let tree = self.tree.borrow();
		let style = tree.element(*node).and_then(|element| element.attribute("style")).unwrap_or_default();
		style_declarations(style)
			.filter(|(property, _)| property.eq_ignore_ascii_case("display"))
			.map(|(_, value)| value.to_owned())
			.last()
			.unwrap_or_default()
	}

	fn set_style_display(&self, node: &NodeId, display: &str) {
		if let Some(element) = self.tree.borrow_mut().element_mut(*node) {
			let style = element.attribute("style").unwrap_or_default();
			let mut declarations: Vec<String> = style_declarations(style)
				.filter(|(property, _)| !property.eq_ignore_ascii_case("display"))
				.map(|(property, value)| format!("{}: {};", property, value))
				.collect();
			declarations.push(format!("display: {};", display));
			element.set_attribute("style", &declarations.join(" "))
		}
	}

	fn focus(&self, node: &NodeId) {
		let mut tree = self.tree.borrow_mut();
		if tree.element(*node).is_some() && tree.is_connected(*node) {
			tree.focused = Some(*node)
		}
	}

	fn dispatch_submit(&self, form: &NodeId) {
		self.submit(*form);
	}

	fn prefers_reduced_motion(&self) -> bool {
		self.tree.borrow().reduced_motion
	}

	fn is_loading(&self) -> bool {
		self.tree.borrow().loading
	}

	fn listen(&self, target: Target<'_, NodeId>, kind: EventKind, handler: Handler<NodeId>) -> Option<ListenerId> {
		let mut tree = self.tree.borrow_mut();
		let target = match target {
			Target::Document => None,
			Target::Node(&node) => Some(node),
		};
		tree.listeners.push(Some(Registration { target, kind, handler }));
		Some(ListenerId(tree.listeners.len() - 1))
	}

	fn unlisten(&self, listener: ListenerId) {
		// The handler is dropped only after the tree borrow ends.
		let removed = self.tree.borrow_mut().listeners.get_mut(listener.0).and_then(Option::take);
		if removed.is_none() {
			warn!("Listener {:?} was already removed.", listener);
		}
	}

	fn now_ms(&self) -> f64 {
		let clock = self.clock.borrow();
		clock.epoch_ms + clock.now.as_secs_f64() * 1000.0
	}

	fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Option<TimerId> {
		let mut clock = self.clock.borrow_mut();
		let due = clock.now + delay;
		let sequence = clock.sequence;
		clock.sequence += 1;
		clock.pending.insert((due, sequence), task);
		Some(TimerId { due, sequence })
	}

	fn clear_timeout(&self, timer: TimerId) {
		let removed = self.clock.borrow_mut().pending.remove(&(timer.due, timer.sequence));
		drop(removed)
	}
}

fn style_declarations(style: &str) -> impl Iterator<Item = (&str, &str)> {
	style.split(';').filter_map(|declaration| {
		let mut parts = declaration.splitn(2, ':');
		let property = parts.next()?.trim();
		let value = parts.next()?.trim();
		if property.is_empty() {
			None
		} else {
			Some((property, value))
		}
	})
}
