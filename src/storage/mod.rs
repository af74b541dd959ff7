pub mod traits;
pub mod feed_state;
pub mod file_store;

pub use traits::FeedStore;
pub use feed_state::FeedState;
pub use file_store::FileFeedStore;
