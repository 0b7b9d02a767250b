pub mod admin_action;
pub mod flagged_content;
pub mod listing;
pub mod listing_image;
pub mod notification;
pub mod refresh_token;
pub mod saved_search;
pub mod user;

pub use admin_action::{Entity as AdminAction, Model as AdminActionModel};
pub use flagged_content::{Entity as FlaggedContent, Model as FlaggedContentModel};
pub use listing::{Entity as Listing, Model as ListingModel};
pub use listing_image::{Entity as ListingImage, Model as ListingImageModel};
pub use notification::{Entity as Notification, Model as NotificationModel};
#[allow(unused_imports)]
pub use refresh_token::Entity as RefreshToken;
pub use saved_search::{Entity as SavedSearch, Model as SavedSearchModel};
pub use user::{Entity as User, Model as UserModel};
