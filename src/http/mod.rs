pub mod client;
pub mod method;
pub mod request;
pub mod response;

pub use client::HttpExecutor;
pub use method::HttpMethod;
pub use request::{BaseConfig, ContentType, RequestConfig, RequestInput, DEFAULT_BASE_URI};
pub use response::ResponseOutcome;
