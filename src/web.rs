//! [`Dom`] over a live [***Window***](https://developer.mozilla.org/en-US/docs/Web/API/Window) and its [***Document***](https://developer.mozilla.org/en-US/docs/Web/API/Document).
//!
//! Listener and timer handles own their [`Closure`]s, so [unlistening](`Dom::unlisten`) or [clearing](`Dom::clear_timeout`) frees them.
//! Dropping a handle without either leaves a listener that throws into ***JavaScript*** when called.

use crate::dom::{Dom, Event, EventKind, Handler, KeyPress, Namespace, Target};
use core::{convert::TryFrom, time::Duration};
use js_sys::Function;
use tracing::{error, instrument, trace, trace_span, warn};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Element, EventTarget, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement, KeyboardEvent, NodeList, Window};

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

#[derive(Debug, Clone)]
pub struct WebDom {
	window: Window,
	document: web_sys::Document,
}

#[derive(Debug)]
pub struct WebListener {
	target: EventTarget,
	kind: EventKind,
	closure: Closure<dyn Fn(web_sys::Event)>,
}

#[derive(Debug)]
pub struct WebTimer {
	handle: i32,
	_closure: Closure<dyn FnMut()>,
}

impl WebDom {
	/// The current global `window` and its `document`, if there are both.
	#[must_use]
	pub fn from_window() -> Option<Self> {
		let window = web_sys::window()?;
		let document = window.document()?;
		Some(Self { window, document })
	}

	#[must_use]
	pub fn new(window: Window, document: web_sys::Document) -> Self {
		Self { window, document }
	}

	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}
}

fn elements(list: &NodeList) -> Vec<Element> {
	(0..list.length()).filter_map(|i| list.item(i)).filter_map(|node| node.dyn_into::<Element>().ok()).collect()
}

impl Dom for WebDom {
	type Node = Element;
	type Listener = WebListener;
	type Timer = WebTimer;

	fn element_by_id(&self, id: &str) -> Option<Element> {
		self.document.get_element_by_id(id)
	}

	fn query_selector_all(&self, scope: Option<&Element>, selector: &str) -> Vec<Element> {
		let list = match scope {
			Some(scope) => scope.query_selector_all(selector),
			None => self.document.query_selector_all(selector),
		};
		match list {
			Ok(list) => elements(&list),
			Err(error) => {
				error!("Failed to query {:?}: {:?}", selector, error);
				Vec::new()
			}
		}
	}

	fn query_selector(&self, scope: Option<&Element>, selector: &str) -> Option<Element> {
		let found = match scope {
			Some(scope) => scope.query_selector(selector),
			None => self.document.query_selector(selector),
		};
		found.unwrap_or_else(|error| {
			error!("Failed to query {:?}: {:?}", selector, error);
			None
		})
	}

	fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
		node.closest(selector).unwrap_or_else(|error| {
			error!("Failed to match {:?}: {:?}", selector, error);
			None
		})
	}

	fn head(&self) -> Option<Element> {
		self.document.head().map(Element::from)
	}

	fn create_element(&self, namespace: Namespace, name: &str) -> Option<Element> {
		let created = match namespace {
			Namespace::Html => self.document.create_element(name),
			Namespace::Svg | Namespace::MathMl => self.document.create_element_ns(Some(namespace.uri()), name),
		};
		created
			.map_err(|error| error!("Failed to create {:?} element <{}>: {:?}", namespace, name, error))
			.ok()
	}

	fn append_child(&self, parent: &Element, child: &Element) {
		if let Err(error) = parent.append_child(child) {
			error!("Failed to append element: {:?}", error)
		}
	}

	fn append_text(&self, parent: &Element, text: &str) {
		let text = self.document.create_text_node(text);
		if let Err(error) = parent.append_child(&text) {
			error!("Failed to append text: {:?}", error)
		}
	}

	fn remove(&self, node: &Element) {
		node.remove()
	}

	fn is_connected(&self, node: &Element) -> bool {
		node.is_connected()
	}

	fn attribute(&self, node: &Element, name: &str) -> Option<String> {
		node.get_attribute(name)
	}

	fn set_attribute(&self, node: &Element, name: &str, value: &str) {
		if let Err(error) = node.set_attribute(name, value) {
			error!("Failed to set attribute {:?}: {:?}", name, error)
		}
	}

	fn add_class(&self, node: &Element, class: &str) {
		if let Err(error) = node.class_list().add_1(class) {
			error!("Failed to add class {:?}: {:?}", class, error)
		}
	}

	fn remove_class(&self, node: &Element, class: &str) {
		if let Err(error) = node.class_list().remove_1(class) {
			error!("Failed to remove class {:?}: {:?}", class, error)
		}
	}

	fn has_class(&self, node: &Element, class: &str) -> bool {
		node.class_list().contains(class)
	}

	fn set_text_content(&self, node: &Element, text: &str) {
		node.set_text_content(Some(text))
	}

	fn inner_html(&self, node: &Element) -> String {
		node.inner_html()
	}

	fn value(&self, node: &Element) -> String {
		if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
			input.value()
		} else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
			select.value()
		} else if let Some(text_area) = node.dyn_ref::<HtmlTextAreaElement>() {
			text_area.value()
		} else {
			String::new()
		}
	}

	fn set_disabled(&self, node: &Element, disabled: bool) {
		if let Some(button) = node.dyn_ref::<HtmlButtonElement>() {
			button.set_disabled(disabled)
		} else if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
			input.set_disabled(disabled)
		} else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
			select.set_disabled(disabled)
		} else if let Some(text_area) = node.dyn_ref::<HtmlTextAreaElement>() {
			text_area.set_disabled(disabled)
		} else if disabled {
			self.set_attribute(node, "disabled", "")
		} else if let Err(error) = node.remove_attribute("disabled") {
			error!("Failed to remove attribute \"disabled\": {:?}", error)
		}
	}

	fn is_disabled(&self, node: &Element) -> bool {
		node.has_attribute("disabled")
	}

	fn style_display(&self, node: &Element) -> String {
		match node.dyn_ref::<HtmlElement>() {
			Some(element) => element.style().get_property_value("display").unwrap_or_else(|error| {
				error!("Failed to read display: {:?}", error);
				String::new()
			}),
			None => String::new(),
		}
	}

	fn set_style_display(&self, node: &Element, display: &str) {
		match node.dyn_ref::<HtmlElement>() {
			Some(element) => {
				if let Err(error) = element.style().set_property("display", display) {
					error!("Failed to set display: {:?}", error)
				}
			}
			None => warn!("Can't style non-HTML element {:?}.", node),
		}
	}

	fn focus(&self, node: &Element) {
		match node.dyn_ref::<HtmlElement>() {
			Some(element) => {
				if let Err(error) = element.focus() {
					error!("Failed to focus: {:?}", error)
				}
			}
			None => warn!("Can't focus non-HTML element {:?}.", node),
		}
	}

	fn dispatch_submit(&self, form: &Element) {
		let dispatched = web_sys::Event::new(EventKind::Submit.name()).and_then(|event| form.dispatch_event(&event));
		if let Err(error) = dispatched {
			error!("Failed to dispatch submit: {:?}", error)
		}
	}

	fn prefers_reduced_motion(&self) -> bool {
		match self.window.match_media(REDUCED_MOTION_QUERY) {
			Ok(Some(query)) => query.matches(),
			Ok(None) => false,
			Err(error) => {
				error!("Failed to query {:?}: {:?}", REDUCED_MOTION_QUERY, error);
				false
			}
		}
	}

	fn is_loading(&self) -> bool {
		self.document.ready_state() == "loading"
	}

	#[instrument(skip(self, target, handler))]
	fn listen(&self, target: Target<'_, Element>, kind: EventKind, handler: Handler<Element>) -> Option<WebListener> {
		let target: EventTarget = match target {
			Target::Document => self.document.clone().into(),
			Target::Node(element) => element.clone().into(),
		};
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
			let span = trace_span!("listener", kind = kind.name());
			let _enter = span.enter();

			let mut wrapped = Event::new(kind, event.target().and_then(|target| target.dyn_into::<Element>().ok()));
			if let Some(keyboard_event) = event.dyn_ref::<KeyboardEvent>() {
				wrapped = wrapped.with_key(KeyPress {
					key: keyboard_event.key(),
					ctrl: keyboard_event.ctrl_key(),
				});
			}
			handler(&wrapped);
			if wrapped.default_prevented() {
				trace!("Preventing default.");
				event.prevent_default()
			}
		}) as Box<dyn Fn(web_sys::Event)>);

		match target.add_event_listener_with_callback(kind.name(), closure.as_ref().unchecked_ref::<Function>()) {
			Ok(()) => Some(WebListener { target, kind, closure }),
			Err(error) => {
				error!("Failed to add event listener: {:?}", error);
				None
			}
		}
	}

	fn unlisten(&self, listener: WebListener) {
		let WebListener { target, kind, closure } = listener;
		if let Err(error) = target.remove_event_listener_with_callback(kind.name(), closure.as_ref().unchecked_ref::<Function>()) {
			error!("Failed to remove event listener: {:?}", error);
		}
	}

	fn now_ms(&self) -> f64 {
		js_sys::Date::now()
	}

	fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Option<WebTimer> {
		let closure: Closure<dyn FnMut()> = Closure::once(move || task());
		let timeout = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
		match self
			.window
			.set_timeout_with_callback_and_timeout_and_arguments_0(closure.as_ref().unchecked_ref::<Function>(), timeout)
		{
			Ok(handle) => Some(WebTimer { handle, _closure: closure }),
			Err(error) => {
				error!("Failed to set timeout: {:?}", error);
				None
			}
		}
	}

	fn clear_timeout(&self, timer: WebTimer) {
		self.window.clear_timeout_with_handle(timer.handle)
	}
}
