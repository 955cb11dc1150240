pub mod campaign;
pub mod content;
pub mod identity;
pub mod memory;
pub mod moderation;
pub mod notification;
pub mod social_graph;

pub use campaign::{CampaignStore, PgCampaignStore};
pub use content::{ContentStore, InMemoryContentStore};
pub use identity::{IdentityStore, PgIdentityStore};
pub use memory::{
    InMemoryCampaignStore, InMemoryFollowStore, InMemoryIdentityStore, InMemoryLikeStore,
    InMemoryNotificationStore, InMemoryReportStore,
};
pub use moderation::{PgReportStore, ReportStore};
pub use notification::{NotificationStore, PgNotificationStore};
pub use social_graph::{FollowStore, LikeStore, PgFollowStore, PgLikeStore};
