//! API documentation
//!
//! OpenAPI generation with utoipa, served by `routes::docs` and exported by
//! the `export_openapi` binary.

mod openapi;

pub use openapi::GatewayApiDoc;
