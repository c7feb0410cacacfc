pub mod handlers;
pub mod history;
pub mod jobs;
pub mod routes;
pub mod settings;

pub use routes::create_router;
