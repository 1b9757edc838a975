// JSON-lines over stdio: one request object per line in, one reply
// envelope per line out.

mod error;
mod handlers;
mod helpers;
mod router;
mod types;

pub use router::handle_request;
pub use types::{AppState, Request};
