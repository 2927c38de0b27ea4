pub mod comments;
pub mod player;

pub use comments::render_comments;
pub use player::render_player;
