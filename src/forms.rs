use crate::{dom::Dom, format::js_trim};
use tracing::{debug, instrument};

/// Form controls that take part in [`validate_form`].
pub const REQUIRED_FIELDS: &str = "input[required], select[required], textarea[required]";

/// Marks blank required fields.
pub const ERROR_CLASS: &str = "input-error";

/// Marks elements with a pending operation.
pub const LOADING_CLASS: &str = "loading";

/// Checks that every required control below `form` has a value that isn't blank by [`js_trim`].
///
/// Blank controls receive [`ERROR_CLASS`]. It is removed from all others, so a later successful validation clears earlier markers.
#[instrument(skip(dom))]
pub fn validate_form<D: Dom>(dom: &D, form: &D::Node) -> bool {
	let mut valid = true;
	for field in dom.query_selector_all(Some(form), REQUIRED_FIELDS) {
		if js_trim(&dom.value(&field)).is_empty() {
			dom.add_class(&field, ERROR_CLASS);
			valid = false;
		} else {
			dom.remove_class(&field, ERROR_CLASS);
		}
	}
	debug!(valid, "Validated form.");
	valid
}

/// Disables `element` and marks it with [`LOADING_CLASS`] while `loading`, and undoes both otherwise.
pub fn set_loading<D: Dom>(dom: &D, element: &D::Node, loading: bool) {
	if loading {
		dom.add_class(element, LOADING_CLASS);
	} else {
		dom.remove_class(element, LOADING_CLASS);
	}
	dom.set_disabled(element, loading);
}
