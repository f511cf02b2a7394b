mod load;
mod types;

pub use load::{get_agent_data_dir, load_default};
pub use types::{
    AgentConfig, ApiConfig, BackendPreference, BinaryConfig, Credentials, EventsOutConfig,
    LoggingConfig, LuxConfig, SteelConfig,
};
