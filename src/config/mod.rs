//! Configuration module

mod site;

pub use site::CommentsConfig;
pub use site::PrismicConfig;
pub use site::RouteConfig;
pub use site::SiteConfig;
pub use site::{ENV_ACCESS_TOKEN, ENV_API_ENDPOINT};
