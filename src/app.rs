use crate::{
	a11y,
	config::Config,
	dom::{Dom, Event, EventKind, Handler, Target},
	format::{self, Numeric},
	forms, shortcuts,
	toast::{Severity, ToastId, ToastManager, CLOSE_CONTROL, TOAST_ELEMENT},
};
use core::{cell::RefCell, mem, time::Duration};
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, instrument, trace, trace_span};

type Listeners<D> = RefCell<Vec<<D as Dom>::Listener>>;

/// The page-wide bindings and their toast manager.
///
/// [`App::install`] attaches:
///
/// - a delegated `click` listener that closes the toast around any [`CLOSE_CONTROL`],
/// - a `keydown` listener for [`shortcuts`],
/// - once the document has loaded: initial focus, a validating `submit` listener per form and a hover hook per tooltip host,
/// - the reduced motion override, if the platform asks for it.
///
/// All of them are removed again when the [`App`] is dropped or [disposed](`App::dispose`).
pub struct App<D: Dom> {
	dom: D,
	toasts: Rc<ToastManager<D>>,
	listeners: Rc<Listeners<D>>,
	motion_override: Option<D::Node>,
}
impl<D: Dom> App<D> {
	/// Installs the bindings. Call this once per page.
	#[must_use]
	#[instrument(skip(dom))]
	pub fn install(dom: D, config: Config) -> Self {
		let toasts = ToastManager::new(dom.clone(), config);
		let listeners: Rc<Listeners<D>> = Rc::default();
		let motion_override = a11y::apply_reduced_motion(&dom);

		listen(&dom, &listeners, Target::Document, EventKind::Click, close_control_handler(&dom, &toasts));
		listen(&dom, &listeners, Target::Document, EventKind::KeyDown, shortcut_handler(&dom));

		if dom.is_loading() {
			let handler = {
				let dom = dom.clone();
				let toasts = Rc::downgrade(&toasts);
				let listeners = Rc::downgrade(&listeners);
				Rc::new(move |_: &Event<D::Node>| {
					if let (Some(toasts), Some(listeners)) = (toasts.upgrade(), listeners.upgrade()) {
						initialize(&dom, &toasts, &listeners)
					}
				})
			};
			listen(&dom, &listeners, Target::Document, EventKind::ContentLoaded, handler);
		} else {
			initialize(&dom, &toasts, &listeners);
		}

		info!("Installed page bindings.");
		Self {
			dom,
			toasts,
			listeners,
			motion_override,
		}
	}

	/// Removes all listeners, toasts and the reduced motion override.
	pub fn dispose(self) {}

	pub fn dom(&self) -> &D {
		&self.dom
	}

	pub fn toasts(&self) -> &Rc<ToastManager<D>> {
		&self.toasts
	}

	pub fn config(&self) -> &Config {
		self.toasts.config()
	}

	/// The number of listeners currently installed by this [`App`], excluding those of individual toasts.
	pub fn listener_count(&self) -> usize {
		self.listeners.borrow().len()
	}

	/// The reduced motion `<style>` element, if it was applied.
	pub fn motion_override(&self) -> Option<&D::Node> {
		self.motion_override.as_ref()
	}

	pub fn show_toast(&self, message: &str, severity: impl Into<Severity>) -> Option<ToastId> {
		self.toasts.show(message, severity)
	}

	pub fn show_toast_for(&self, message: &str, severity: impl Into<Severity>, duration: Duration) -> Option<ToastId> {
		self.toasts.show_for(message, severity.into(), duration)
	}

	pub fn close_toast(&self, id: &str) -> bool {
		self.toasts.close(id)
	}

	/// Formats `value` in [`Config::locale`].
	pub fn format_date(&self, value: &str) -> String {
		format::format_date_in(value, &self.config().locale)
	}

	pub fn format_number(&self, value: impl Numeric, decimals: usize) -> String {
		format::format_number(value, decimals)
	}

	/// [`App::format_number`] with [`format::DEFAULT_DECIMALS`].
	pub fn format_decimal(&self, value: impl Numeric) -> String {
		format::format_number(value, format::DEFAULT_DECIMALS)
	}

	pub fn set_loading(&self, element: &D::Node, loading: bool) {
		forms::set_loading(&self.dom, element, loading)
	}

	pub fn validate_form(&self, form: &D::Node) -> bool {
		forms::validate_form(&self.dom, form)
	}

	pub fn escape_html(&self, value: &str) -> String {
		format::escape_html(&self.dom, value)
	}
}
impl<D: Dom> Drop for App<D> {
	fn drop(&mut self) {
		let listeners = mem::take(&mut *self.listeners.borrow_mut());
		let count = listeners.len();
		for listener in listeners {
			self.dom.unlisten(listener)
		}
		self.toasts.close_all();
		if let Some(style) = self.motion_override.take() {
			self.dom.remove(&style)
		}
		info!(listeners = count, "Disposed page bindings.");
	}
}

fn listen<D: Dom>(dom: &D, listeners: &Listeners<D>, target: Target<'_, D::Node>, kind: EventKind, handler: Handler<D::Node>) {
	match dom.listen(target, kind, handler) {
		Some(listener) => listeners.borrow_mut().push(listener),
		None => error!("Failed to listen for {}.", kind.name()),
	}
}

fn close_control_handler<D: Dom>(dom: &D, toasts: &Rc<ToastManager<D>>) -> Handler<D::Node> {
	let dom = dom.clone();
	let toasts: Weak<ToastManager<D>> = Rc::downgrade(toasts);
	Rc::new(move |event: &Event<D::Node>| {
		let control = match event.target().and_then(|target| dom.closest(target, CLOSE_CONTROL)) {
			Some(control) => control,
			None => return,
		};
		if let Some(toast) = dom.closest(&control, TOAST_ELEMENT) {
			let span = trace_span!("Close control clicked");
			let _enter = span.enter();
			match toasts.upgrade() {
				Some(toasts) => toasts.close_element(&toast),
				None => dom.remove(&toast),
			}
		}
	})
}

fn shortcut_handler<D: Dom>(dom: &D) -> Handler<D::Node> {
	let dom = dom.clone();
	Rc::new(move |event: &Event<D::Node>| {
		if let Some(key) = event.key() {
			if let Some(shortcut) = shortcuts::handle_key(&dom, key) {
				trace!(?shortcut, "Handled shortcut.");
				if shortcut.prevents_default() {
					event.prevent_default()
				}
			}
		}
	})
}

#[instrument(skip(dom, toasts, listeners))]
fn initialize<D: Dom>(dom: &D, toasts: &Rc<ToastManager<D>>, listeners: &Listeners<D>) {
	a11y::focus_first_interactive(dom);

	let forms = dom.query_selector_all(None, "form");
	for form in &forms {
		let handler = {
			let dom = dom.clone();
			let toasts = Rc::downgrade(toasts);
			let form = form.clone();
			Rc::new(move |event: &Event<D::Node>| {
				if !forms::validate_form(&dom, &form) {
					event.prevent_default();
					if let Some(toasts) = toasts.upgrade() {
						toasts.show(&toasts.config().required_fields_message, Severity::Error);
					}
				}
			})
		};
		listen(dom, listeners, Target::Node(form), EventKind::Submit, handler);
	}

	let tooltip_attribute = toasts.config().tooltip_attribute.clone();
	let tooltips = dom.query_selector_all(None, &toasts.config().tooltip_selector());
	for tooltip in &tooltips {
		let handler = {
			let dom = dom.clone();
			let tooltip_attribute = tooltip_attribute.clone();
			Rc::new(move |event: &Event<D::Node>| {
				let text = event.target().and_then(|target| dom.attribute(target, &tooltip_attribute)).unwrap_or_default();
				#[cfg(feature = "dangerous-logging")]
				trace!(text = text.as_str(), "Tooltip host hovered.");
				#[cfg(not(feature = "dangerous-logging"))]
				trace!(text_len = text.len(), "Tooltip host hovered.");
			})
		};
		listen(dom, listeners, Target::Node(tooltip), EventKind::MouseEnter, handler);
	}

	debug!(forms = forms.len(), tooltips = tooltips.len(), "Initialized page.");
}
