//! Transient notifications inside a single container element.
//!
//! Each toast goes through `Displayed → (expired | closed) → removed`, and may spend any number of
//! hover periods in between. While the pointer is over a toast, its pending removal is cancelled.
//! Leaving it schedules a fresh removal after the full original duration.

use crate::{
	config::Config,
	dom::{Dom, Event, EventKind, Handler, Target},
	render,
};
use core::{
	borrow::Borrow,
	cell::{Cell, RefCell},
	fmt::{self, Display, Formatter},
	mem,
	time::Duration,
};
use hashbrown::HashMap;
use lignin::{Attribute, Element, ElementCreationOptions, Node, ThreadBound};
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, instrument, trace, warn};

const DEPTH_LIMIT: usize = 32;

/// Matches the close button inside a toast.
pub const CLOSE_CONTROL: &str = "[data-close-toast]";

/// Matches toast elements, managed or not.
pub const TOAST_ELEMENT: &str = r#"[id^="toast-"]"#;

/// Controls a toast's palette and icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
	Success,
	Error,
	Warning,
	Info,
}
impl Default for Severity {
	fn default() -> Self {
		Severity::Info
	}
}
impl Severity {
	/// Unrecognised names become [`Severity::Info`].
	#[must_use]
	pub fn parse(name: &str) -> Self {
		match name {
			"success" => Severity::Success,
			"error" => Severity::Error,
			"warning" => Severity::Warning,
			_ => Severity::Info,
		}
	}

	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Severity::Success => "success",
			Severity::Error => "error",
			Severity::Warning => "warning",
			Severity::Info => "info",
		}
	}

	#[must_use]
	pub fn palette(self) -> &'static str {
		match self {
			Severity::Success => "bg-green-50 border-green-200 text-green-800",
			Severity::Error => "bg-red-50 border-red-200 text-red-800",
			Severity::Warning => "bg-yellow-50 border-yellow-200 text-yellow-800",
			Severity::Info => "bg-blue-50 border-blue-200 text-blue-800",
		}
	}

	fn icon_path(self) -> &'static str {
		match self {
			Severity::Success => "M10 18a8 8 0 100-16 8 8 0 000 16zm3.707-9.293a1 1 0 00-1.414-1.414L9 10.586 7.707 9.293a1 1 0 00-1.414 1.414l2 2a1 1 0 001.414 0l4-4z",
			Severity::Error => "M10 18a8 8 0 100-16 8 8 0 000 16zM8.707 7.293a1 1 0 00-1.414 1.414L8.586 10l-1.293 1.293a1 1 0 101.414 1.414L10 11.414l1.293 1.293a1 1 0 001.414-1.414L11.414 10l1.293-1.293a1 1 0 00-1.414-1.414L10 8.586 8.707 7.293z",
			Severity::Warning => "M8.257 3.099c.765-1.36 2.722-1.36 3.486 0l5.58 9.92c.75 1.334-.213 2.98-1.742 2.98H4.42c-1.53 0-2.493-1.646-1.743-2.98l5.58-9.92zM11 13a1 1 0 11-2 0 1 1 0 012 0zm-1-8a1 1 0 00-1 1v3a1 1 0 002 0V6a1 1 0 00-1-1z",
			Severity::Info => "M18 10a8 8 0 11-16 0 8 8 0 0116 0zm-7-4a1 1 0 11-2 0 1 1 0 012 0zM9 9a1 1 0 000 2v3a1 1 0 001 1h1a1 1 0 100-2v-3a1 1 0 00-1-1H9z",
		}
	}
}
impl From<&str> for Severity {
	fn from(name: &str) -> Self {
		Self::parse(name)
	}
}
impl Display for Severity {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

const CLOSE_ICON_PATH: &str = "M4.293 4.293a1 1 0 011.414 0L10 8.586l4.293-4.293a1 1 0 111.414 1.414L11.414 10l4.293 4.293a1 1 0 01-1.414 1.414L10 11.414l-4.293 4.293a1 1 0 01-1.414-1.414L8.586 10 4.293 5.707a1 1 0 010-1.414z";

/// The element id of a toast: `toast-<epoch milliseconds>-<sequence number>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToastId(String);
impl ToastId {
	pub const PREFIX: &'static str = "toast-";

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for ToastId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for ToastId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Display for ToastId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A pending timeout that is cleared when dropped.
#[must_use = "Dropping a `ScheduledRemoval` cancels it."]
pub struct ScheduledRemoval<D: Dom> {
	dom: D,
	timer: Option<D::Timer>,
	delay: Duration,
}
impl<D: Dom> ScheduledRemoval<D> {
	fn schedule(dom: &D, delay: Duration, task: Box<dyn FnOnce()>) -> Self {
		let timer = dom.set_timeout(delay, task);
		if timer.is_none() {
			error!("Failed to schedule removal after {:?}. The toast will stay until closed.", delay);
		}
		Self { dom: dom.clone(), timer, delay }
	}

	#[must_use]
	pub fn delay(&self) -> Duration {
		self.delay
	}

	/// Clears the timeout. Same as dropping.
	pub fn cancel(self) {}
}
impl<D: Dom> Drop for ScheduledRemoval<D> {
	fn drop(&mut self) {
		if let Some(timer) = self.timer.take() {
			self.dom.clear_timeout(timer)
		}
	}
}

enum Phase<D: Dom> {
	Displayed(ScheduledRemoval<D>),
	Hovered,
}

struct ActiveToast<D: Dom> {
	dom: D,
	element: D::Node,
	duration: Duration,
	phase: Phase<D>,
	listeners: Vec<D::Listener>,
}
impl<D: Dom> Drop for ActiveToast<D> {
	fn drop(&mut self) {
		for listener in self.listeners.drain(..) {
			self.dom.unlisten(listener)
		}
	}
}

/// Creates, expires and removes toasts in the element with id [`Config::container_id`].
///
/// Toasts hold only [`Weak`] references to their manager. Once the manager is dropped, pending timers and hover listeners are released and existing toast elements stay where they are.
pub struct ToastManager<D: Dom> {
	dom: D,
	config: Config,
	sequence: Cell<u64>,
	active: RefCell<HashMap<ToastId, ActiveToast<D>>>,
	this: Weak<Self>,
}
impl<D: Dom> ToastManager<D> {
	#[must_use]
	pub fn new(dom: D, config: Config) -> Rc<Self> {
		Rc::new_cyclic(|this| Self {
			dom,
			config,
			sequence: Cell::new(0),
			active: RefCell::default(),
			this: this.clone(),
		})
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Shows `message` for [`Config::default_duration`].
	///
	/// Returns [`None`] without side effects if the container is missing.
	pub fn show(&self, message: &str, severity: impl Into<Severity>) -> Option<ToastId> {
		self.show_for(message, severity.into(), self.config.default_duration)
	}

	/// Shows `message` as plain text and schedules its removal after `duration`.
	#[instrument(skip(self, message))]
	pub fn show_for(&self, message: &str, severity: Severity, duration: Duration) -> Option<ToastId> {
		let container = match self.dom.element_by_id(&self.config.container_id) {
			Some(container) => container,
			None => {
				debug!("No toast container #{} found. Skipping toast.", self.config.container_id);
				return None;
			}
		};

		let id = self.next_id();
		let element = self.render(&container, &id, message, severity)?;
		let listeners = self.hover_listeners(&element, &id);
		let removal = self.schedule_removal(id.as_str(), duration);

		#[cfg(feature = "dangerous-logging")]
		info!(%id, text = message, "Showing toast.");
		#[cfg(not(feature = "dangerous-logging"))]
		info!(%id, message_len = message.len(), "Showing toast.");

		self.active.borrow_mut().insert(
			id.clone(),
			ActiveToast {
				dom: self.dom.clone(),
				element,
				duration,
				phase: Phase::Displayed(removal),
				listeners,
			},
		);
		Some(id)
	}

	/// Removes the toast with element id `id`.
	///
	/// Ids not managed here still remove a matching `toast-…` element if there is one.
	/// Returns whether anything was removed, so repeated calls are no-ops.
	#[instrument(skip(self))]
	pub fn close(&self, id: &str) -> bool {
		let removed = self.active.borrow_mut().remove(id);
		if let Some(toast) = removed {
			let element = toast.element.clone();
			drop(toast);
			self.dom.remove(&element);
			info!("Closed toast.");
			return true;
		}

		if !id.starts_with(ToastId::PREFIX) {
			return false;
		}
		match self.dom.element_by_id(id) {
			Some(element) if self.dom.is_connected(&element) => {
				self.dom.remove(&element);
				debug!("Removed unmanaged toast element.");
				true
			}
			_ => false,
		}
	}

	/// Closes every managed toast.
	pub fn close_all(&self) {
		let ids: Vec<ToastId> = self.active.borrow().keys().cloned().collect();
		for id in ids {
			self.close(id.as_str());
		}
	}

	/// Removes a toast by its element, as the delegated close button handler does.
	pub fn close_element(&self, element: &D::Node) {
		let id = self.active.borrow().iter().find(|(_, toast)| &toast.element == element).map(|(id, _)| id.clone());
		match id {
			Some(id) => {
				self.close(id.as_str());
			}
			None => {
				debug!("Removing unmanaged toast element {:?}.", element);
				self.dom.remove(element)
			}
		}
	}

	/// Cancels the pending removal until [`ToastManager::pointer_left`].
	pub fn pointer_entered(&self, id: &str) {
		let previous = match self.active.borrow_mut().get_mut(id) {
			Some(toast) => mem::replace(&mut toast.phase, Phase::Hovered),
			None => return trace!(id, "Pointer entered a toast that is already gone."),
		};
		if let Phase::Displayed(removal) = previous {
			trace!(id, remaining_of = ?removal.delay(), "Paused toast.");
			removal.cancel()
		}
	}

	/// Schedules a fresh removal after the toast's full duration.
	pub fn pointer_left(&self, id: &str) {
		let duration = match self.active.borrow().get(id) {
			Some(toast) => toast.duration,
			None => return trace!(id, "Pointer left a toast that is already gone."),
		};
		let removal = self.schedule_removal(id, duration);
		let previous = match self.active.borrow_mut().get_mut(id) {
			Some(toast) => mem::replace(&mut toast.phase, Phase::Displayed(removal)),
			None => return,
		};
		if let Phase::Displayed(_) = previous {
			warn!(id, "Pointer left a toast that wasn't hovered. Restarting its timer.");
		}
		trace!(id, ?duration, "Resumed toast.");
	}

	/// The number of toasts currently shown.
	pub fn len(&self) -> usize {
		self.active.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.active.borrow().is_empty()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.active.borrow().contains_key(id)
	}

	/// Whether the toast is shown and its removal is paused.
	pub fn is_paused(&self, id: &str) -> bool {
		matches!(self.active.borrow().get(id), Some(ActiveToast { phase: Phase::Hovered, .. }))
	}

	pub fn element(&self, id: &str) -> Option<D::Node> {
		self.active.borrow().get(id).map(|toast| toast.element.clone())
	}

	fn expire(&self, id: &str) {
		let displayed = matches!(self.active.borrow().get(id), Some(ActiveToast { phase: Phase::Displayed(_), .. }));
		if displayed {
			trace!(id, "Toast expired.");
			self.close(id);
		} else {
			trace!(id, "Ignoring stale removal.");
		}
	}

	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	fn next_id(&self) -> ToastId {
		let sequence = self.sequence.get();
		self.sequence.set(sequence.wrapping_add(1));
		ToastId(format!("{}{}-{}", ToastId::PREFIX, self.dom.now_ms().max(0.0) as u64, sequence))
	}

	fn schedule_removal(&self, id: &str, delay: Duration) -> ScheduledRemoval<D> {
		let this = self.this.clone();
		let id = id.to_owned();
		ScheduledRemoval::schedule(
			&self.dom,
			delay,
			Box::new(move || {
				if let Some(this) = this.upgrade() {
					this.expire(&id)
				}
			}),
		)
	}

	fn hover_listeners(&self, element: &D::Node, id: &ToastId) -> Vec<D::Listener> {
		let mut listeners = Vec::with_capacity(2);
		for &(kind, entering) in &[(EventKind::MouseEnter, true), (EventKind::MouseLeave, false)] {
			let this = self.this.clone();
			let toast_id = id.clone();
			let handler: Handler<D::Node> = Rc::new(move |_: &Event<D::Node>| {
				if let Some(this) = this.upgrade() {
					if entering {
						this.pointer_entered(toast_id.as_str())
					} else {
						this.pointer_left(toast_id.as_str())
					}
				}
			});
			match self.dom.listen(Target::Node(element), kind, handler) {
				Some(listener) => listeners.push(listener),
				None => error!("Failed to listen for {} on toast {}.", kind.name(), id),
			}
		}
		listeners
	}

	fn render(&self, container: &D::Node, id: &ToastId, message: &str, severity: Severity) -> Option<D::Node> {
		let alert_class = format!("max-w-sm w-full {} border rounded-lg p-4 shadow-lg", severity.palette());

		let icon_path_attributes = [
			Attribute { name: "fill-rule", value: "evenodd" },
			Attribute { name: "d", value: severity.icon_path() },
			Attribute { name: "clip-rule", value: "evenodd" },
		];
		let icon_path = element("path", &icon_path_attributes, Node::Multi(&[]));
		let icon_content = [svg(&icon_path)];
		let icon = element(
			"svg",
			&[
				Attribute { name: "class", value: "h-5 w-5" },
				Attribute { name: "fill", value: "currentColor" },
				Attribute { name: "viewBox", value: "0 0 20 20" },
			],
			Node::Multi(&icon_content),
		);
		let icon_slot_content = [svg(&icon)];
		let icon_slot = element("div", &[Attribute { name: "class", value: "flex-shrink-0" }], Node::Multi(&icon_slot_content));

		let message_text = [Node::Text { text: message, dom_binding: None }];
		let message_element = element("p", &[Attribute { name: "class", value: "text-sm font-medium" }], Node::Multi(&message_text));
		let message_slot_content = [html(&message_element)];
		let message_slot = element("div", &[Attribute { name: "class", value: "ml-3" }], Node::Multi(&message_slot_content));

		let label_text = [Node::Text {
			text: &self.config.close_label,
			dom_binding: None,
		}];
		let label = element("span", &[Attribute { name: "class", value: "sr-only" }], Node::Multi(&label_text));
		let close_path = element(
			"path",
			&[
				Attribute { name: "fill-rule", value: "evenodd" },
				Attribute { name: "d", value: CLOSE_ICON_PATH },
				Attribute { name: "clip-rule", value: "evenodd" },
			],
			Node::Multi(&[]),
		);
		let close_icon_content = [svg(&close_path)];
		let close_icon = element(
			"svg",
			&[
				Attribute { name: "class", value: "h-3 w-3" },
				Attribute { name: "fill", value: "currentColor" },
				Attribute { name: "viewBox", value: "0 0 20 20" },
			],
			Node::Multi(&close_icon_content),
		);
		let button_content = [html(&label), svg(&close_icon)];
		let button = element(
			"button",
			&[
				Attribute { name: "data-close-toast", value: "" },
				Attribute {
					name: "class",
					value: "inline-flex rounded-md p-1.5 focus:outline-none focus:ring-2 focus:ring-offset-2 focus:ring-offset-blue-50 focus:ring-blue-600",
				},
			],
			Node::Multi(&button_content),
		);
		let button_wrapper_content = [html(&button)];
		let button_wrapper = element("div", &[Attribute { name: "class", value: "-mx-1.5 -my-1.5" }], Node::Multi(&button_wrapper_content));
		let button_slot_content = [html(&button_wrapper)];
		let button_slot = element("div", &[Attribute { name: "class", value: "ml-auto pl-3" }], Node::Multi(&button_slot_content));

		let row_content = [html(&icon_slot), html(&message_slot), html(&button_slot)];
		let row = element("div", &[Attribute { name: "class", value: "flex" }], Node::Multi(&row_content));
		let alert_content = [html(&row)];
		let alert_attributes = [Attribute { name: "class", value: &alert_class }, Attribute { name: "role", value: "alert" }];
		let alert = element("div", &alert_attributes, Node::Multi(&alert_content));
		let toast_content = [html(&alert)];
		let toast_attributes = [Attribute { name: "id", value: id.as_str() }];
		let toast = element("div", &toast_attributes, Node::Multi(&toast_content));

		let created = render::materialize(&self.dom, container, &[html(&toast)], DEPTH_LIMIT);
		if created.is_empty() {
			error!(%id, "Failed to create toast element.");
		}
		created.into_iter().next()
	}
}

fn element<'a>(name: &'a str, attributes: &'a [Attribute<'a>], content: Node<'a, ThreadBound>) -> Element<'a, ThreadBound> {
	Element {
		name,
		creation_options: ElementCreationOptions::new(),
		attributes,
		content,
		event_bindings: &[],
	}
}

fn html<'a>(element: &'a Element<'a, ThreadBound>) -> Node<'a, ThreadBound> {
	Node::HtmlElement { element, dom_binding: None }
}

fn svg<'a>(element: &'a Element<'a, ThreadBound>) -> Node<'a, ThreadBound> {
	Node::SvgElement { element, dom_binding: None }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_severities_are_info() {
		for name in &["", "INFO", "Success", "danger", "notice", " error"] {
			assert_eq!(Severity::parse(name), Severity::Info, "{:?}", name);
		}
	}

	#[test]
	fn known_severities() {
		for &severity in &[Severity::Success, Severity::Error, Severity::Warning, Severity::Info] {
			assert_eq!(Severity::from(severity.as_str()), severity);
			assert_eq!(severity.to_string(), severity.as_str());
		}
	}

	#[test]
	fn palettes_are_distinct() {
		let palettes = [Severity::Success, Severity::Error, Severity::Warning, Severity::Info].map(Severity::palette);
		for (i, a) in palettes.iter().enumerate() {
			for b in &palettes[i + 1..] {
				assert_ne!(a, b);
			}
		}
	}
}
