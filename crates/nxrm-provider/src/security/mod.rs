//! Security resources: roles, users, realms, anonymous access and content
//! selectors

pub mod anonymous;
pub mod content_selector;
pub mod realms;
pub mod role;
pub mod user;

pub use anonymous::{AnonymousAccessDescriptor, AnonymousAccessModel};
pub use content_selector::{ContentSelectorDescriptor, ContentSelectorModel};
pub use realms::{RealmsDescriptor, RealmsModel};
pub use role::{RoleDescriptor, RoleModel};
pub use user::{UserDescriptor, UserModel};
