//! Configuration module

mod site;

pub use site::OnError;
pub use site::SiteConfig;

/// Name of the site configuration file
pub const CONFIG_FILE: &str = "folio.yml";
