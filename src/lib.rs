#![doc(html_root_url = "https://docs.rs/app-dom/0.0.1")]
#![warn(clippy::pedantic)]

pub use lignin;

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod a11y;
pub mod app;
pub mod config;
pub mod dom;
pub mod format;
pub mod forms;
pub mod headless;
pub mod render;
pub mod shortcuts;
pub mod toast;
pub mod web;

pub use app::App;
pub use config::Config;
