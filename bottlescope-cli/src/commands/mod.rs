pub mod common;
pub mod icon;
pub mod info;
pub mod scan;
pub mod shortcut;
