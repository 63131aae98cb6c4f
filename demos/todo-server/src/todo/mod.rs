pub mod controller;
pub mod model;
pub mod service;

pub use controller::TodoController;
pub use service::TodoService;
