use crate::models::Comment;
use crate::services::comments::CommentService;
use crate::services::wallet::{WalletConnector, WalletSession};

pub struct SocialState {
    pub wallet: Box<dyn WalletConnector>,
    pub session: Option<WalletSession>,
    pub wallet_error: Option<String>,

    pub comment_service: CommentService,
    pub comments: Vec<Comment>,
    pub comments_loading: bool,
    pub comment_draft: String,
    /// Local mock identity, regenerated per run.
    pub user_id: String,
}

impl SocialState {
    pub fn new(wallet: Box<dyn WalletConnector>, comment_service: CommentService) -> Self {
        Self {
            wallet,
            session: None,
            wallet_error: None,
            comment_service,
            comments: Vec::new(),
            comments_loading: false,
            comment_draft: String::new(),
            user_id: format!("guest-{:04x}", rand::random::<u16>()),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.has_sufficient_tokens)
            .unwrap_or(false)
    }
}
