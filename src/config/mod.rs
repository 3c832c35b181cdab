//! Configuration module

mod site;

pub use site::ArtifactFormat;
pub use site::MarkdownConfig;
pub use site::RemoteConfig;
pub use site::SiteConfig;
