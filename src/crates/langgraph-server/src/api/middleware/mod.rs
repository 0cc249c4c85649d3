pub mod logging;

pub use logging::request_id_middleware;
