pub mod agent_browser;
pub mod api;
pub mod browser_use;
pub mod lux;
pub mod steel;

pub use agent_browser::AgentBrowserProvider;
pub use api::AuraApiProvider;
pub use browser_use::BrowserUseProvider;
pub use lux::LuxProvider;
pub use steel::SteelProvider;
