pub(crate) mod request;
pub(crate) mod response;

pub use request::{HttpRequest, RequestKind};
pub use response::HttpResponse;
