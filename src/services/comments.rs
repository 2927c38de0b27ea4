//! Timestamped comments: storage trait, in-memory and SQLite-backed stores,
//! and a worker-thread service the UI talks to over channels.
//!
//! The store is an explicitly constructed, injected object - never ambient
//! state. Events carry the track id they belong to so responses that resolve
//! after a track switch are dropped by the app.

use crate::models::Comment;
use crate::utils::errors::PlayerError;
use rusqlite::Connection;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub trait CommentStore {
    fn list(&self, track_id: &str) -> Result<Vec<Comment>, PlayerError>;
    fn add(
        &mut self,
        track_id: &str,
        timestamp: f64,
        user_id: &str,
        text: &str,
    ) -> Result<Comment, PlayerError>;
    /// New comments for `track_id` are delivered on the returned channel.
    /// Dropping the receiver unsubscribes.
    fn subscribe(&mut self, track_id: &str) -> Receiver<Comment>;
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Per-track subscriber registry shared by both store implementations.
#[derive(Default)]
struct Subscribers {
    senders: Vec<(String, Sender<Comment>)>,
}

impl Subscribers {
    fn subscribe(&mut self, track_id: &str) -> Receiver<Comment> {
        let (tx, rx) = channel();
        self.senders.push((track_id.to_string(), tx));
        rx
    }

    fn notify(&mut self, comment: &Comment) {
        self.senders
            .retain(|(track_id, tx)| track_id != &comment.track_id || tx.send(comment.clone()).is_ok());
    }
}

// === In-memory store ===

pub struct MemoryCommentStore {
    comments: Vec<Comment>,
    subscribers: Subscribers,
    next_id: u64,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self {
            comments: Vec::new(),
            subscribers: Subscribers::default(),
            next_id: 1,
        }
    }

    /// Store preloaded with the demo comments.
    pub fn with_demo_data() -> Self {
        let mut store = Self::new();
        for (track_id, timestamp, user_id, text) in [
            ("midi-punk-1", 15.0, "user123", "This beat is \u{1f525}"),
            ("midi-punk-1", 45.0, "user456", "Best verse incoming!"),
        ] {
            // Seeding cannot fail for the in-memory store
            let _ = store.add(track_id, timestamp, user_id, text);
        }
        store
    }
}

impl Default for MemoryCommentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentStore for MemoryCommentStore {
    fn list(&self, track_id: &str) -> Result<Vec<Comment>, PlayerError> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.track_id == track_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Ok(comments)
    }

    fn add(
        &mut self,
        track_id: &str,
        timestamp: f64,
        user_id: &str,
        text: &str,
    ) -> Result<Comment, PlayerError> {
        let comment = Comment {
            id: self.next_id.to_string(),
            track_id: track_id.to_string(),
            timestamp,
            user_id: user_id.to_string(),
            text: text.to_string(),
            created_at: unix_now(),
        };
        self.next_id += 1;
        self.comments.push(comment.clone());
        self.subscribers.notify(&comment);
        Ok(comment)
    }

    fn subscribe(&mut self, track_id: &str) -> Receiver<Comment> {
        self.subscribers.subscribe(track_id)
    }
}

// === SQLite-backed store ===

pub struct SqliteCommentStore {
    conn: Connection,
    subscribers: Subscribers,
}

impl SqliteCommentStore {
    pub fn open(path: &Path) -> Result<Self, PlayerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PlayerError::CommentPersist(format!("create {}: {}", parent.display(), e)))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| PlayerError::CommentPersist(format!("open {}: {}", path.display(), e)))?;
        Self::from_connection(conn)
    }

    /// Database under the platform data dir.
    pub fn open_default() -> Result<Self, PlayerError> {
        let dir = dirs::data_dir()
            .ok_or_else(|| PlayerError::CommentPersist("no platform data dir".to_string()))?;
        Self::open(&dir.join("sidebyside").join("comments.db"))
    }

    pub fn open_in_memory() -> Result<Self, PlayerError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| PlayerError::CommentPersist(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, PlayerError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                track_id TEXT NOT NULL,
                timestamp REAL NOT NULL,
                user_id TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| PlayerError::CommentPersist(e.to_string()))?;
        Ok(Self {
            conn,
            subscribers: Subscribers::default(),
        })
    }
}

impl CommentStore for SqliteCommentStore {
    fn list(&self, track_id: &str) -> Result<Vec<Comment>, PlayerError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, track_id, timestamp, user_id, text, created_at
                 FROM comments WHERE track_id = ?1 ORDER BY timestamp ASC",
            )
            .map_err(|e| PlayerError::CommentPersist(e.to_string()))?;
        let rows = stmt
            .query_map([track_id], |row| {
                Ok(Comment {
                    id: row.get::<_, i64>(0)?.to_string(),
                    track_id: row.get(1)?,
                    timestamp: row.get(2)?,
                    user_id: row.get(3)?,
                    text: row.get(4)?,
                    created_at: row.get::<_, i64>(5)? as u64,
                })
            })
            .map_err(|e| PlayerError::CommentPersist(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| PlayerError::CommentPersist(e.to_string()))
    }

    fn add(
        &mut self,
        track_id: &str,
        timestamp: f64,
        user_id: &str,
        text: &str,
    ) -> Result<Comment, PlayerError> {
        let created_at = unix_now();
        self.conn
            .execute(
                "INSERT INTO comments (track_id, timestamp, user_id, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![track_id, timestamp, user_id, text, created_at as i64],
            )
            .map_err(|e| PlayerError::CommentPersist(e.to_string()))?;
        let comment = Comment {
            id: self.conn.last_insert_rowid().to_string(),
            track_id: track_id.to_string(),
            timestamp,
            user_id: user_id.to_string(),
            text: text.to_string(),
            created_at,
        };
        self.subscribers.notify(&comment);
        Ok(comment)
    }

    fn subscribe(&mut self, track_id: &str) -> Receiver<Comment> {
        self.subscribers.subscribe(track_id)
    }
}

// === Worker-thread service ===

pub enum CommentCommand {
    Load { track_id: String },
    Add {
        track_id: String,
        timestamp: f64,
        user_id: String,
        text: String,
    },
}

#[derive(Debug, Clone)]
pub enum CommentEvent {
    Loaded { track_id: String, comments: Vec<Comment> },
    Added(Comment),
    Error { message: String },
}

/// Runs the injected store on its own thread; the UI sends commands and
/// drains events once per frame. New comments reach the UI through the
/// store's own subscription channel for the current track.
pub struct CommentService {
    command_tx: Sender<CommentCommand>,
    event_rx: Receiver<CommentEvent>,
}

impl CommentService {
    pub fn spawn(store: Box<dyn CommentStore + Send>) -> Self {
        let (command_tx, command_rx) = channel::<CommentCommand>();
        let (event_tx, event_rx) = channel::<CommentEvent>();

        std::thread::spawn(move || {
            service_loop(store, command_rx, event_tx);
        });

        Self {
            command_tx,
            event_rx,
        }
    }

    pub fn load(&self, track_id: &str) {
        let _ = self.command_tx.send(CommentCommand::Load {
            track_id: track_id.to_string(),
        });
    }

    pub fn add(&self, track_id: &str, timestamp: f64, user_id: &str, text: &str) {
        let _ = self.command_tx.send(CommentCommand::Add {
            track_id: track_id.to_string(),
            timestamp,
            user_id: user_id.to_string(),
            text: text.to_string(),
        });
    }

    pub fn try_event(&self) -> Option<CommentEvent> {
        self.event_rx.try_recv().ok()
    }
}

fn service_loop(
    mut store: Box<dyn CommentStore + Send>,
    command_rx: Receiver<CommentCommand>,
    event_tx: Sender<CommentEvent>,
) {
    let mut subscription: Option<Receiver<Comment>> = None;

    loop {
        match command_rx.try_recv() {
            Ok(CommentCommand::Load { track_id }) => {
                // Re-subscribe for the newly selected track; the previous
                // receiver is dropped, which unsubscribes it.
                subscription = Some(store.subscribe(&track_id));
                match store.list(&track_id) {
                    Ok(comments) => {
                        log::info!(
                            "[Comments] Loaded {} comments for {}",
                            comments.len(),
                            track_id
                        );
                        let _ = event_tx.send(CommentEvent::Loaded { track_id, comments });
                    }
                    Err(e) => {
                        log::error!("[Comments] Load failed for {}: {}", track_id, e);
                        let _ = event_tx.send(CommentEvent::Error {
                            message: e.to_string(),
                        });
                    }
                }
            }
            Ok(CommentCommand::Add {
                track_id,
                timestamp,
                user_id,
                text,
            }) => {
                // Additive data: the optimistic UI needs no rollback, errors
                // are logged and surfaced as a message.
                if let Err(e) = store.add(&track_id, timestamp, &user_id, &text) {
                    log::error!("[Comments] Persist failed: {}", e);
                    let _ = event_tx.send(CommentEvent::Error {
                        message: e.to_string(),
                    });
                }
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => {}
            Err(std::sync::mpsc::TryRecvError::Disconnected) => return,
        }

        if let Some(rx) = &subscription {
            while let Ok(comment) = rx.try_recv() {
                let _ = event_tx.send(CommentEvent::Added(comment));
            }
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise_store(mut store: impl CommentStore) {
        assert!(store.list("midi-punk-1").unwrap().is_empty());

        let rx = store.subscribe("midi-punk-1");
        let added = store
            .add("midi-punk-1", 15.0, "user123", "This beat!")
            .unwrap();
        assert_eq!(added.track_id, "midi-punk-1");

        // Subscriber saw the new comment
        let delivered = rx.try_recv().unwrap();
        assert_eq!(delivered.text, "This beat!");

        // Comments for another track never reach this subscriber
        store.add("midi-punk-2", 3.0, "user456", "other").unwrap();
        assert!(rx.try_recv().is_err());

        let listed = store.list("midi-punk-1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user_id, "user123");
    }

    #[test]
    fn memory_store_list_add_subscribe() {
        exercise_store(MemoryCommentStore::new());
    }

    #[test]
    fn sqlite_store_list_add_subscribe() {
        exercise_store(SqliteCommentStore::open_in_memory().unwrap());
    }

    #[test]
    fn list_is_ordered_by_timestamp() {
        let mut store = SqliteCommentStore::open_in_memory().unwrap();
        store.add("t", 45.0, "a", "later").unwrap();
        store.add("t", 15.0, "b", "earlier").unwrap();
        let listed = store.list("t").unwrap();
        assert_eq!(listed[0].text, "earlier");
        assert_eq!(listed[1].text, "later");
    }

    #[test]
    fn demo_data_is_seeded() {
        let store = MemoryCommentStore::with_demo_data();
        assert_eq!(store.list("midi-punk-1").unwrap().len(), 2);
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let mut store = MemoryCommentStore::new();
        let rx = store.subscribe("t");
        drop(rx);
        // Next notify prunes the dead sender without error
        store.add("t", 1.0, "u", "x").unwrap();
        assert_eq!(store.subscribers.senders.len(), 0);
    }

    #[test]
    fn service_loads_and_forwards_added() {
        let service = CommentService::spawn(Box::new(MemoryCommentStore::with_demo_data()));
        service.load("midi-punk-1");

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let mut loaded = None;
        while loaded.is_none() && std::time::Instant::now() < deadline {
            if let Some(CommentEvent::Loaded { track_id, comments }) = service.try_event() {
                loaded = Some((track_id, comments));
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        let (track_id, comments) = loaded.expect("load event");
        assert_eq!(track_id, "midi-punk-1");
        assert_eq!(comments.len(), 2);

        service.add("midi-punk-1", 30.0, "guest", "hello");
        let mut added = None;
        while added.is_none() && std::time::Instant::now() < deadline {
            if let Some(CommentEvent::Added(comment)) = service.try_event() {
                added = Some(comment);
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(added.expect("added event").text, "hello");
    }
}
