pub mod api;
pub mod application;
pub mod component;
pub mod components;
pub mod html;
