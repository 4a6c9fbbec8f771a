use app_dom::{
	dom::Dom,
	headless::{Document, NodeId},
	toast::{Severity, ToastManager, CLOSE_CONTROL},
	Config,
};
use core::time::Duration;
use std::rc::Rc;

fn page() -> (Document, NodeId, Rc<ToastManager<Document>>) {
	let document = Document::new();
	let container = document.append_element(document.body(), "div", &[("id", "toast-container")]);
	let toasts = ToastManager::new(document.clone(), Config::default());
	(document, container, toasts)
}

fn ms(millis: u64) -> Duration {
	Duration::from_millis(millis)
}

#[test]
fn expires_after_default_duration() {
	let (document, container, toasts) = page();

	let id = toasts.show("Uloženo", "success").unwrap();
	assert!(id.as_str().starts_with("toast-"));
	assert_eq!(document.children(container).len(), 1);
	assert_eq!(document.pending_timers(), 1);

	document.advance(ms(4999));
	assert!(toasts.contains(id.as_str()));

	document.advance(ms(1));
	assert!(!toasts.contains(id.as_str()));
	assert!(document.children(container).is_empty());
	assert_eq!(document.pending_timers(), 0);
	assert_eq!(document.listener_count(), 0);
}

#[test]
fn custom_duration() {
	let (document, container, toasts) = page();

	toasts.show_for("Short", Severity::Info, ms(100)).unwrap();
	document.advance(ms(99));
	assert_eq!(document.children(container).len(), 1);
	document.advance(ms(1));
	assert!(document.children(container).is_empty());
}

#[test]
fn markup() {
	let (document, container, toasts) = page();

	let id = toasts.show("Hotovo", Severity::Warning).unwrap();
	let element = toasts.element(id.as_str()).unwrap();
	assert_eq!(document.children(container), vec![element]);
	assert_eq!(document.attribute(&element, "id").as_deref(), Some(id.as_str()));

	let alert = document.query_selector(Some(&element), r#"[role="alert"]"#).unwrap();
	for class in Severity::Warning.palette().split(' ') {
		assert!(document.has_class(&alert, class), "{}", class);
	}
	assert_eq!(document.query_selector_all(Some(&element), "svg").len(), 2);

	let button = document.query_selector(Some(&element), CLOSE_CONTROL).unwrap();
	assert_eq!(document.tag_name(button).as_deref(), Some("button"));
	assert_eq!(document.text_content(button), "Zavřít");

	let message = document.query_selector(Some(&element), "p.text-sm").unwrap();
	assert_eq!(document.text_content(message), "Hotovo");
}

#[test]
fn unknown_severity_uses_info_palette() {
	let (document, _, toasts) = page();

	let id = toasts.show("?", "danger").unwrap();
	let element = toasts.element(id.as_str()).unwrap();
	let alert = document.query_selector(Some(&element), r#"[role="alert"]"#).unwrap();
	assert!(document.has_class(&alert, "bg-blue-50"));
	assert!(!document.has_class(&alert, "bg-red-50"));
}

#[test]
fn message_is_text() {
	let (document, _, toasts) = page();

	let message = r#"<img src=x onerror="alert(1)"> & more"#;
	let id = toasts.show(message, "error").unwrap();
	let element = toasts.element(id.as_str()).unwrap();

	assert!(document.query_selector(Some(&element), "img").is_none());
	let paragraph = document.query_selector(Some(&element), "p").unwrap();
	assert_eq!(document.text_content(paragraph), message);
	assert_eq!(
		document.inner_html(&paragraph),
		r#"&lt;img src=x onerror="alert(1)"&gt; &amp; more"#
	);
}

#[test]
fn ids_are_unique_within_a_millisecond() {
	let (document, container, toasts) = page();

	let ids: Vec<_> = (0..5).map(|i| toasts.show(&i.to_string(), "info").unwrap()).collect();
	for (i, a) in ids.iter().enumerate() {
		for b in &ids[i + 1..] {
			assert_ne!(a, b);
		}
	}
	assert_eq!(document.children(container).len(), 5);
	assert_eq!(toasts.len(), 5);
}

#[test]
fn missing_container_is_a_no_op() {
	let document = Document::new();
	let toasts = ToastManager::new(document.clone(), Config::default());

	assert_eq!(toasts.show("Nowhere", "info"), None);
	assert!(toasts.is_empty());
	assert_eq!(document.pending_timers(), 0);
	assert_eq!(document.listener_count(), 0);
}

#[test]
fn hover_pauses_and_restarts_full_duration() {
	let (document, container, toasts) = page();

	let id = toasts.show("Hover me", "info").unwrap();
	let element = toasts.element(id.as_str()).unwrap();

	document.advance(ms(3000));
	document.pointer_enter(element);
	assert!(toasts.is_paused(id.as_str()));
	assert_eq!(document.pending_timers(), 0);

	document.advance(ms(60_000));
	assert!(toasts.contains(id.as_str()));

	document.pointer_leave(element);
	assert!(!toasts.is_paused(id.as_str()));

	document.advance(ms(4999));
	assert_eq!(document.children(container).len(), 1);
	document.advance(ms(1));
	assert!(document.children(container).is_empty());
}

#[test]
fn repeated_hovers() {
	let (document, _, toasts) = page();

	let id = toasts.show("Again", "info").unwrap();
	let element = toasts.element(id.as_str()).unwrap();
	for _ in 0..3 {
		document.advance(ms(4000));
		document.pointer_enter(element);
		document.pointer_leave(element);
	}
	assert_eq!(document.pending_timers(), 1);
	assert!(toasts.contains(id.as_str()));
	document.advance(ms(5000));
	assert!(!toasts.contains(id.as_str()));
}

#[test]
fn close_is_idempotent() {
	let (document, container, toasts) = page();

	let id = toasts.show("Bye", "info").unwrap();
	assert!(toasts.close(id.as_str()));
	assert!(document.children(container).is_empty());
	assert_eq!(document.pending_timers(), 0);
	assert_eq!(document.listener_count(), 0);

	assert!(!toasts.close(id.as_str()));
	assert!(!toasts.close("toast-0-0"));
	assert!(!toasts.close("unrelated"));

	document.advance(ms(10_000));
	assert!(toasts.is_empty());
}

#[test]
fn close_removes_unmanaged_toast_elements() {
	let (document, container, toasts) = page();

	let foreign = document.append_element(container, "div", &[("id", "toast-server-1")]);
	let other = document.append_element(container, "div", &[("id", "notice")]);

	assert!(!toasts.close("notice"));
	assert!(document.is_connected(&other));

	assert!(toasts.close("toast-server-1"));
	assert!(!document.is_connected(&foreign));
	assert!(!toasts.close("toast-server-1"));
}

#[test]
fn close_all() {
	let (document, container, toasts) = page();

	for severity in &["success", "error", "warning", "info"] {
		toasts.show(severity, *severity).unwrap();
	}
	toasts.close_all();
	assert!(toasts.is_empty());
	assert!(document.children(container).is_empty());
	assert_eq!(document.pending_timers(), 0);
}

#[test]
fn close_element() {
	let (document, container, toasts) = page();

	let id = toasts.show("By element", "info").unwrap();
	let element = toasts.element(id.as_str()).unwrap();
	toasts.close_element(&element);
	assert!(!toasts.contains(id.as_str()));
	assert!(document.children(container).is_empty());
	assert_eq!(document.pending_timers(), 0);
}

#[test]
fn dropped_manager_leaves_elements() {
	let (document, container, toasts) = page();

	toasts.show("Orphan", "info").unwrap();
	drop(toasts);
	assert_eq!(document.pending_timers(), 0);
	assert_eq!(document.listener_count(), 0);

	document.advance(ms(10_000));
	assert_eq!(document.children(container).len(), 1);
}
