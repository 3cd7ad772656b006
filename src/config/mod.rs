//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::IndexConfig;
pub use site::MarkdownConfig;
pub use site::MathConfig;
pub use site::MessagesConfig;
pub use site::SectionConfig;
pub use site::SiteConfig;
