//! 具体渠道实现

pub mod campfire;
pub mod hipchat;
pub mod http;
pub mod slack;

pub use campfire::{CampfireChannel, CampfireConfig};
pub use hipchat::{HipchatChannel, HipchatConfig};
pub use http::HttpSettings;
pub use slack::{SlackChannel, SlackConfig};
