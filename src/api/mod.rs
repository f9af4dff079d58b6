//! WhatsApp Cloud API endpoint catalogue
//!
//! Each submodule groups the endpoints of one API area and registers them
//! with a [`ToolRegistry`].

pub mod business;
pub mod flows;
pub mod media;
pub mod messages;
pub mod phone_numbers;
pub mod qr_codes;
pub mod scope;
pub mod templates;
pub mod waba;

use crate::tools::ToolRegistry;

pub use scope::{BusinessScope, FlowScope, PhoneNumberScope, VersionScope, WabaScope};

/// Register every endpoint in the catalogue
pub fn register_all(registry: &mut ToolRegistry) {
    messages::register(registry);
    templates::register(registry);
    flows::register(registry);
    media::register(registry);
    phone_numbers::register(registry);
    qr_codes::register(registry);
    business::register(registry);
    waba::register(registry);
}
