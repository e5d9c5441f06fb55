use std::default::Default;

use modbox_shared::MarshalConfig;

/// Contains Config properties which will be used by a ModuleClient
#[derive(Clone)]
pub struct ClientConfig {
    /// Display name announced to the engine during the handshake
    pub module_name: String,
    /// Must match the engine's wire encoding
    pub marshal: MarshalConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            module_name: "module".to_string(),
            marshal: MarshalConfig::default(),
        }
    }
}
