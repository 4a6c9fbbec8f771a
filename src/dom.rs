//! The rendering target abstraction.
//!
//! Everything else in this crate only talks to a page through [`Dom`], so the same toast lifecycle,
//! validation and shortcut logic runs against a live [***Document***](https://developer.mozilla.org/en-US/docs/Web/API/Document)
//! ([`crate::web::WebDom`]) or against the in-memory [`crate::headless::Document`].
//!
//! Implementations are expected to be cheap handles: [`Dom`] requires [`Clone`] and clones share the same page.

use core::{cell::Cell, fmt::Debug, time::Duration};
use std::rc::Rc;

/// The XML namespace an element is created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
	Html,
	Svg,
	MathMl,
}
impl Namespace {
	#[must_use]
	pub fn uri(self) -> &'static str {
		match self {
			Namespace::Html => "http://www.w3.org/1999/xhtml",
			Namespace::Svg => "http://www.w3.org/2000/svg",
			Namespace::MathMl => "http://www.w3.org/1998/Math/MathML",
		}
	}
}

/// The events this crate listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	Click,
	KeyDown,
	Submit,
	MouseEnter,
	MouseLeave,
	ContentLoaded,
}
impl EventKind {
	/// The event type name as passed to [***addEventListener***](https://developer.mozilla.org/en-US/docs/Web/API/EventTarget/addEventListener).
	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			EventKind::Click => "click",
			EventKind::KeyDown => "keydown",
			EventKind::Submit => "submit",
			EventKind::MouseEnter => "mouseenter",
			EventKind::MouseLeave => "mouseleave",
			EventKind::ContentLoaded => "DOMContentLoaded",
		}
	}

	/// Whether the event travels from its target up through the ancestors to the document.
	#[must_use]
	pub fn bubbles(self) -> bool {
		match self {
			EventKind::Click | EventKind::KeyDown | EventKind::Submit => true,
			EventKind::MouseEnter | EventKind::MouseLeave | EventKind::ContentLoaded => false,
		}
	}
}

/// The parts of a [***KeyboardEvent***](https://developer.mozilla.org/en-US/docs/Web/API/KeyboardEvent) shortcuts look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
	pub key: String,
	pub ctrl: bool,
}
impl KeyPress {
	pub fn new(key: impl Into<String>) -> Self {
		Self { key: key.into(), ctrl: false }
	}

	pub fn ctrl(key: impl Into<String>) -> Self {
		Self { key: key.into(), ctrl: true }
	}
}

/// A dispatched event as seen by a [`Handler`].
///
/// [`Event::prevent_default`] only records the request. The [`Dom`] implementation forwards it to the platform once handlers return.
#[derive(Debug)]
pub struct Event<N> {
	kind: EventKind,
	target: Option<N>,
	key: Option<KeyPress>,
	default_prevented: Cell<bool>,
}
impl<N> Event<N> {
	pub fn new(kind: EventKind, target: Option<N>) -> Self {
		Self {
			kind,
			target,
			key: None,
			default_prevented: Cell::new(false),
		}
	}

	#[must_use]
	pub fn with_key(mut self, key: KeyPress) -> Self {
		self.key = Some(key);
		self
	}

	pub fn kind(&self) -> EventKind {
		self.kind
	}

	/// The element the event was dispatched to, if it was an element.
	pub fn target(&self) -> Option<&N> {
		self.target.as_ref()
	}

	pub fn key(&self) -> Option<&KeyPress> {
		self.key.as_ref()
	}

	pub fn prevent_default(&self) {
		self.default_prevented.set(true)
	}

	pub fn default_prevented(&self) -> bool {
		self.default_prevented.get()
	}
}

pub type Handler<N> = Rc<dyn Fn(&Event<N>)>;

/// Where a listener is attached.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a, N> {
	Document,
	Node(&'a N),
}

/// Capability interface over a page.
///
/// All operations degrade silently: failures are logged by the implementation and otherwise ignored.
pub trait Dom: Clone + 'static {
	/// An element handle. Equality is identity.
	type Node: Clone + PartialEq + Debug + 'static;
	/// Keeps a listener registered until passed to [`Dom::unlisten`].
	type Listener: Debug;
	/// A pending timeout that can be passed to [`Dom::clear_timeout`].
	type Timer: Debug;

	fn element_by_id(&self, id: &str) -> Option<Self::Node>;

	/// All elements matching `selector` in tree order, below `scope` or in the whole document.
	fn query_selector_all(&self, scope: Option<&Self::Node>, selector: &str) -> Vec<Self::Node>;

	fn query_selector(&self, scope: Option<&Self::Node>, selector: &str) -> Option<Self::Node> {
		self.query_selector_all(scope, selector).into_iter().next()
	}

	/// The inclusive ancestor of `node` closest to it that matches `selector`.
	fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;

	fn head(&self) -> Option<Self::Node>;

	/// Creates a detached element.
	fn create_element(&self, namespace: Namespace, name: &str) -> Option<Self::Node>;

	fn append_child(&self, parent: &Self::Node, child: &Self::Node);

	/// Appends a text node. The text is never interpreted as markup.
	fn append_text(&self, parent: &Self::Node, text: &str);

	/// Detaches `node` from its parent. Does nothing if it is already detached.
	fn remove(&self, node: &Self::Node);

	fn is_connected(&self, node: &Self::Node) -> bool;

	fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
	fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);

	fn add_class(&self, node: &Self::Node, class: &str);
	fn remove_class(&self, node: &Self::Node, class: &str);
	fn has_class(&self, node: &Self::Node, class: &str) -> bool;

	/// Replaces all children of `node` with a single text node.
	fn set_text_content(&self, node: &Self::Node, text: &str);

	/// The markup serialization of the children of `node`.
	fn inner_html(&self, node: &Self::Node) -> String;

	/// The current value of a form control, or an empty string for other elements.
	fn value(&self, node: &Self::Node) -> String;

	fn set_disabled(&self, node: &Self::Node, disabled: bool);
	fn is_disabled(&self, node: &Self::Node) -> bool;

	/// The inline `display` style of `node`.
	fn style_display(&self, node: &Self::Node) -> String;
	fn set_style_display(&self, node: &Self::Node, display: &str);

	fn focus(&self, node: &Self::Node);

	/// Dispatches a synthetic `submit` event to `form`.
	fn dispatch_submit(&self, form: &Self::Node);

	/// Whether the platform reports `(prefers-reduced-motion: reduce)`.
	fn prefers_reduced_motion(&self) -> bool;

	/// Whether `DOMContentLoaded` is still pending.
	fn is_loading(&self) -> bool;

	fn listen(&self, target: Target<'_, Self::Node>, kind: EventKind, handler: Handler<Self::Node>) -> Option<Self::Listener>;
	fn unlisten(&self, listener: Self::Listener);

	/// Milliseconds since the Unix epoch.
	fn now_ms(&self) -> f64;

	/// Runs `task` once after `delay`, unless cleared first.
	fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Option<Self::Timer>;
	fn clear_timeout(&self, timer: Self::Timer);
}
