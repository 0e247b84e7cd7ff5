//! Domain layer: identifiers, entities, validation rules and the event bus.
//!
//! Nothing in here touches the database. Value types validate client input
//! (ratings, review and comment text, dates) so the service layer can reject
//! bad requests before any write.

pub mod engagement;
pub mod event_bus;
pub mod feed;
pub mod ids;
pub mod match_log;
pub mod notification;
pub mod profile;

pub use engagement::{Comment, LikeToggle};
pub use event_bus::{EventBus, Inbox};
pub use feed::{
    FeedItem, FeedQuery, FeedSort, FeedTab, MatchLogSort, MatchLogsQuery, RatingStats,
    SchemaCapabilities,
};
pub use ids::{CommentId, LogId, MatchId, NotificationId, UserId};
pub use match_log::{MatchLog, MatchStatus, MatchSummary, NewMatchLog, Rating};
pub use notification::{NewNotification, Notification, NotificationEvent, NotificationKind};
pub use profile::{AuthorSummary, NewProfile, Profile, ProfileInsert, ProfileStats};
