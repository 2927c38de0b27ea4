pub mod comments;
pub mod share;
pub mod wallet;

pub use comments::{CommentEvent, CommentService, CommentStore};
pub use wallet::{WalletConnector, WalletSession};
