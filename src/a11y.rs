//! Accessibility accommodations.

use crate::dom::{Dom, Namespace};
use tracing::{debug, error, info};

/// Elements that may receive initial focus.
pub const INTERACTIVE: &str = r#"input, button, select, textarea, [tabindex]:not([tabindex="-1"])"#;

/// Cuts all animations and transitions down to practically nothing.
pub const REDUCED_MOTION_CSS: &str = "
*, *::before, *::after {
	animation-duration: 0.01ms !important;
	animation-iteration-count: 1 !important;
	transition-duration: 0.01ms !important;
}
";

/// Appends a [`REDUCED_MOTION_CSS`] stylesheet to `head` if the platform prefers reduced motion.
///
/// Returns the `<style>` element so it can be removed again.
pub fn apply_reduced_motion<D: Dom>(dom: &D) -> Option<D::Node> {
	if !dom.prefers_reduced_motion() {
		return None;
	}
	let head = match dom.head() {
		Some(head) => head,
		None => {
			error!("Reduced motion is preferred, but there's no `head` to add the override to.");
			return None;
		}
	};
	let style = dom.create_element(Namespace::Html, "style")?;
	dom.set_text_content(&style, REDUCED_MOTION_CSS);
	dom.append_child(&head, &style);
	info!("Applied reduced motion override.");
	Some(style)
}

/// Focuses the first [`INTERACTIVE`] element, if any.
pub fn focus_first_interactive<D: Dom>(dom: &D) -> Option<D::Node> {
	let first = dom.query_selector(None, INTERACTIVE)?;
	debug!("Focusing {:?}.", first);
	dom.focus(&first);
	Some(first)
}
