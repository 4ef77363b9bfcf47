//! # Event Bus System
//!
//! Provides an event-driven architecture for the songbook core using
//! `tokio::sync::broadcast`. This module enables decoupled communication
//! between core modules through typed events.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for different domains
//! - **EventBus**: Central broadcast channel for publishing events
//! - **Subscription Management**: Multiple subscribers can listen independently
//!
//! ## Usage
//!
//! ### Creating an Event Bus
//!
//! ```rust
//! use core_runtime::events::EventBus;
//!
//! let event_bus = EventBus::new(100); // Buffer size of 100 events
//! ```
//!
//! ### Publishing Events
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, AuthEvent};
//!
//! # let event_bus = EventBus::new(100);
//! let event = CoreEvent::Auth(AuthEvent::SignedIn {
//!     user_id: "user-123".to_string(),
//! });
//!
//! event_bus.emit(event).ok();
//! ```
//!
//! ### Subscribing to Events
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent};
//! use tokio::sync::broadcast::error::RecvError;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! tokio::spawn(async move {
//!     loop {
//!         match stream.recv().await {
//!             Ok(event) => println!("Received: {:?}", event),
//!             Err(RecvError::Lagged(n)) => {
//!                 eprintln!("Missed {} events", n);
//!             }
//!             Err(RecvError::Closed) => break,
//!         }
//!     }
//! });
//! # }
//! ```
//!
//! ## Error Handling
//!
//! The event bus uses `tokio::sync::broadcast`, which can produce two types
//! of errors:
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n`
//!   events. Non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped; shutdown signal.
//!
//! ## Thread Safety
//!
//! The event bus is fully thread-safe (`Send + Sync`) and can be shared
//! across async tasks using `Arc`.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// This value balances memory usage with the ability to handle bursts of
/// events. Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
///
/// This is the main event type published and received through the event bus.
/// It wraps domain-specific event types for different modules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Authentication-related events
    Auth(AuthEvent),
    /// Data and cache-related events
    Data(DataEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Auth(e) => e.description(),
            CoreEvent::Data(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(AuthEvent::AuthError { .. }) => EventSeverity::Error,
            CoreEvent::Data(DataEvent::SyncFailed { .. }) => EventSeverity::Error,
            CoreEvent::Auth(AuthEvent::SignedIn { .. }) => EventSeverity::Info,
            CoreEvent::Data(DataEvent::SyncCompleted { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Authentication Events
// ============================================================================

/// Events related to the auth session lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// Startup session check is in flight.
    Authenticating,
    /// User successfully authenticated.
    SignedIn {
        /// The authenticated user identifier.
        user_id: String,
    },
    /// User signed out (explicitly or via an external session change).
    SignedOut {
        /// The user identifier that was signed out, if known.
        user_id: Option<String>,
    },
    /// Session tokens were refreshed without user action.
    SessionRefreshed {
        /// The user whose session was refreshed.
        user_id: String,
        /// Timestamp when the new access token expires (Unix epoch seconds).
        expires_at: i64,
    },
    /// Sign-up succeeded but the backend requires email confirmation
    /// before a session is issued.
    ConfirmationPending {
        /// The email address awaiting confirmation.
        email: String,
    },
    /// Authentication error occurred.
    AuthError {
        /// Human-readable error message.
        message: String,
        /// Whether the error is recoverable (e.g., retry possible).
        recoverable: bool,
    },
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::Authenticating => "Session check in progress",
            AuthEvent::SignedIn { .. } => "User signed in successfully",
            AuthEvent::SignedOut { .. } => "User signed out",
            AuthEvent::SessionRefreshed { .. } => "Session refreshed",
            AuthEvent::ConfirmationPending { .. } => "Email confirmation pending",
            AuthEvent::AuthError { .. } => "Authentication error",
        }
    }
}

// ============================================================================
// Data Events
// ============================================================================

/// Events related to remote collections and the local cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum DataEvent {
    /// Bulk sync of all collections initiated.
    SyncStarted {
        /// The user the sync is scoped to.
        user_id: String,
    },
    /// Bulk sync finished successfully.
    SyncCompleted {
        /// Number of songs fetched.
        songs: usize,
        /// Number of favourites fetched.
        favourites: usize,
        /// Number of folders fetched.
        folders: usize,
    },
    /// Bulk sync failed; the aggregate message names each failed collection.
    SyncFailed {
        /// Combined failure reasons.
        message: String,
    },
    /// A favourite was added.
    FavouriteAdded {
        /// The favourited song identifier.
        song_id: i64,
    },
    /// A favourite was removed.
    FavouriteRemoved {
        /// The unfavourited song identifier.
        song_id: i64,
    },
    /// The folder list changed (create, rename, or delete).
    FoldersChanged,
    /// The songs of one folder changed.
    FolderEntriesChanged {
        /// The folder whose membership changed.
        folder_id: String,
    },
    /// The local cache was cleared.
    CacheCleared,
}

impl DataEvent {
    fn description(&self) -> &str {
        match self {
            DataEvent::SyncStarted { .. } => "Sync started",
            DataEvent::SyncCompleted { .. } => "Sync completed successfully",
            DataEvent::SyncFailed { .. } => "Sync failed",
            DataEvent::FavouriteAdded { .. } => "Favourite added",
            DataEvent::FavouriteRemoved { .. } => "Favourite removed",
            DataEvent::FoldersChanged => "Folders changed",
            DataEvent::FolderEntriesChanged { .. } => "Folder entries changed",
            DataEvent::CacheCleared => "Cache cleared",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to core events.
///
/// Wraps a `tokio::sync::broadcast` channel. Cloning the bus is cheap and
/// all clones publish into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// Returns an error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future
    /// events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_and_receive() {
        let bus = EventBus::new(10);
        let mut receiver = bus.subscribe();

        let event = CoreEvent::Auth(AuthEvent::SignedIn {
            user_id: "user-1".to_string(),
        });
        bus.emit(event.clone()).unwrap();

        let received = receiver.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(CoreEvent::Data(DataEvent::CacheCleared)).unwrap();

        assert_eq!(
            rx1.recv().await.unwrap(),
            CoreEvent::Data(DataEvent::CacheCleared)
        );
        assert_eq!(
            rx2.recv().await.unwrap(),
            CoreEvent::Data(DataEvent::CacheCleared)
        );
    }

    #[test]
    fn test_emit_without_subscribers_errors() {
        let bus = EventBus::new(10);
        let result = bus.emit(CoreEvent::Data(DataEvent::FoldersChanged));
        assert!(result.is_err());
    }

    #[test]
    fn test_event_severity() {
        let error_event = CoreEvent::Auth(AuthEvent::AuthError {
            message: "boom".to_string(),
            recoverable: true,
        });
        assert_eq!(error_event.severity(), EventSeverity::Error);

        let info_event = CoreEvent::Data(DataEvent::SyncCompleted {
            songs: 10,
            favourites: 2,
            folders: 1,
        });
        assert_eq!(info_event.severity(), EventSeverity::Info);
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Data(DataEvent::FavouriteAdded { song_id: 42 });
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }

    #[test]
    fn test_subscriber_count() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
    }
}
