pub mod api;
pub mod controller;
pub mod session;
pub mod store;
pub mod view;
