use core::time::Duration;

/// Page-level settings for [`App`](`crate::App`) and [`ToastManager`](`crate::toast::ToastManager`).
///
/// The defaults match the markup conventions of the host application: a `#toast-container` element,
/// five second toasts and Czech user-facing strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub container_id: String,
	pub default_duration: Duration,
	/// Used by [`App::format_date`](`crate::App::format_date`).
	pub locale: String,
	/// Screen-reader label of the toast close button.
	pub close_label: String,
	/// Shown as an error toast when a form is submitted with blank required fields.
	pub required_fields_message: String,
	pub tooltip_attribute: String,
}
impl Default for Config {
	fn default() -> Self {
		Self {
			container_id: "toast-container".to_owned(),
			default_duration: Duration::from_millis(5000),
			locale: "cs-CZ".to_owned(),
			close_label: "Zavřít".to_owned(),
			required_fields_message: "Prosím vyplňte všechna povinná pole".to_owned(),
			tooltip_attribute: "data-tooltip".to_owned(),
		}
	}
}
impl Config {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn container_id(mut self, container_id: impl Into<String>) -> Self {
		self.container_id = container_id.into();
		self
	}

	#[must_use]
	pub fn default_duration(mut self, default_duration: Duration) -> Self {
		self.default_duration = default_duration;
		self
	}

	#[must_use]
	pub fn locale(mut self, locale: impl Into<String>) -> Self {
		self.locale = locale.into();
		self
	}

	#[must_use]
	pub fn close_label(mut self, close_label: impl Into<String>) -> Self {
		self.close_label = close_label.into();
		self
	}

	#[must_use]
	pub fn required_fields_message(mut self, message: impl Into<String>) -> Self {
		self.required_fields_message = message.into();
		self
	}

	#[must_use]
	pub fn tooltip_attribute(mut self, attribute: impl Into<String>) -> Self {
		self.tooltip_attribute = attribute.into();
		self
	}

	/// The selector matching tooltip hosts.
	pub(crate) fn tooltip_selector(&self) -> String {
		format!("[{}]", self.tooltip_attribute)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = Config::default();
		assert_eq!(config.container_id, "toast-container");
		assert_eq!(config.default_duration, Duration::from_secs(5));
		assert_eq!(config.tooltip_selector(), "[data-tooltip]");
	}

	#[test]
	fn builder() {
		let config = Config::new().container_id("toasts").default_duration(Duration::from_millis(250)).tooltip_attribute("title");
		assert_eq!(config.container_id, "toasts");
		assert_eq!(config.default_duration, Duration::from_millis(250));
		assert_eq!(config.tooltip_selector(), "[title]");
	}
}
