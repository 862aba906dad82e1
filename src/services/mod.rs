pub mod cursor_api;
pub mod usage_html;
