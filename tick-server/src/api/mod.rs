//! HTTP API handlers for tick-server

pub mod buildinfo;
pub mod health;
pub mod stream;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use stream::stream_timestamps;
