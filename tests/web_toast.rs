#![cfg(target_arch = "wasm32")]

use app_dom::{toast::CLOSE_CONTROL, web::WebDom, App, Config};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, HtmlElement, KeyboardEvent, KeyboardEventInit};

wasm_bindgen_test_configure!(run_in_browser);

static mut LOG_INITIALIZED: bool = false;

fn init_log() {
	unsafe {
		if !LOG_INITIALIZED {
			tracing_wasm::set_as_global_default();
			LOG_INITIALIZED = true;
		}
	}
}

fn container() -> HtmlElement {
	let document = window().unwrap().document().unwrap();
	let body = document.body().unwrap();
	body.set_inner_html(r#"<div id="toast-container"></div><form><input required></form>"#);
	document.get_element_by_id("toast-container").unwrap().dyn_into().unwrap()
}

#[wasm_bindgen_test]
fn show_and_close() {
	init_log();
	let container = container();
	let app = App::install(WebDom::from_window().unwrap(), Config::default());

	let id = app.show_toast("<b>Uloženo</b>", "success").unwrap();
	assert_eq!(container.child_element_count(), 1);
	let toast = container.first_element_child().unwrap();
	assert_eq!(toast.id(), id.as_str());
	assert!(toast.query_selector("b").unwrap().is_none());
	assert!(toast.text_content().unwrap().contains("<b>Uloženo</b>"));

	let button: HtmlElement = toast.query_selector(CLOSE_CONTROL).unwrap().unwrap().dyn_into().unwrap();
	button.click();
	assert_eq!(container.child_element_count(), 0);
	assert!(app.toasts().is_empty());
}

#[wasm_bindgen_test]
fn svg_namespace() {
	init_log();
	let container = container();
	let app = App::install(WebDom::from_window().unwrap(), Config::default());

	app.show_toast("Icons", "info").unwrap();
	let svg = container.query_selector("svg").unwrap().unwrap();
	assert_eq!(svg.namespace_uri().as_deref(), Some("http://www.w3.org/2000/svg"));
}

#[wasm_bindgen_test]
fn ctrl_s_is_prevented() {
	init_log();
	let container = container();
	let app = App::install(WebDom::from_window().unwrap(), Config::default());

	let mut init = KeyboardEventInit::new();
	init.key("s").ctrl_key(true).bubbles(true).cancelable(true);
	let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
	let document = window().unwrap().document().unwrap();
	assert!(!document.dispatch_event(&event).unwrap());

	// The required input is blank, so the synthetic submit shows an error.
	assert_eq!(container.child_element_count(), 1);
	drop(app);
	assert_eq!(container.child_element_count(), 0);
}

#[wasm_bindgen_test]
fn escape_html() {
	init_log();
	let app = App::install(WebDom::from_window().unwrap(), Config::default());
	assert_eq!(app.escape_html("<script>&"), "&lt;script&gt;&amp;");
}
