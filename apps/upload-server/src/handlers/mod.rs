//! Endpoint handlers. Each one is a thin adapter from the wire types onto
//! [`UploadService`](resumable_transfer::UploadService).

mod merge;
mod upload;
mod verify;

pub use merge::merge;
pub use upload::upload;
pub use verify::verify;
