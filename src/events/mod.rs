pub mod bus;
pub mod display;
pub mod notification;

pub use bus::{EventBus, Handler, Priority, SubscriptionId};
pub use display::{DisplayHint, DisplayHintBuilder, StyledText};
pub use notification::{
    EntityId, IdAllocator, Notification, NotificationKind, Payload, RestoreAmount, SkipReason,
    Source,
};
