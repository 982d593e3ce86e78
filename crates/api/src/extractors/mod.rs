//! Request extractors.

pub mod site;

pub use site::SiteContext;
