// Uploader module - sends images to Imgur and records the results
//
// The coordinator owns the history; upload tasks only report links back to it.

pub mod coordinator;
pub mod imgur_client;
pub mod multipart;

pub use coordinator::{HistoryView, UploadCoordinator, UploadEvent, UploadId};
pub use imgur_client::ImgurClient;
