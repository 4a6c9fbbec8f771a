//! Page-wide keyboard shortcuts.

use crate::dom::{Dom, KeyPress};
use tracing::{debug, trace};

/// Hidden by [`close_modals`].
pub const MODAL: &str = ".modal";

/// What [`handle_key`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
	/// `Ctrl`+`s`: a `submit` event went to the first form, if there is one. The browser's save dialog must be suppressed.
	Save,
	/// `Escape`: this many modals were hidden.
	CloseModals(usize),
}
impl Shortcut {
	#[must_use]
	pub fn prevents_default(self) -> bool {
		matches!(self, Shortcut::Save)
	}
}

/// Runs the shortcut bound to `key`, if any.
pub fn handle_key<D: Dom>(dom: &D, key: &KeyPress) -> Option<Shortcut> {
	if key.ctrl && key.key == "s" {
		match dom.query_selector(None, "form") {
			Some(form) => {
				debug!("Submitting first form on save shortcut.");
				dom.dispatch_submit(&form)
			}
			None => trace!("Save shortcut without a form."),
		}
		return Some(Shortcut::Save);
	}

	if key.key == "Escape" {
		return Some(Shortcut::CloseModals(close_modals(dom)));
	}
	None
}

/// Sets `display: none` on every visible [`MODAL`]. Returns how many were hidden.
pub fn close_modals<D: Dom>(dom: &D) -> usize {
	let mut closed = 0;
	for modal in dom.query_selector_all(None, MODAL) {
		if dom.style_display(&modal) != "none" {
			dom.set_style_display(&modal, "none");
			closed += 1;
		}
	}
	debug!(closed, "Closed modals.");
	closed
}
