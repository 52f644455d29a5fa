use crate::network::packet::packet_registry::{PacketRegistry, RegistryError};

pub mod packets;
pub mod samples;
pub mod types;

/// A registry holding every packet in [`packets`].
pub fn default_registry() -> Result<PacketRegistry, RegistryError> {
    let mut registry = PacketRegistry::new();
    packets::register_all(&mut registry)?;
    Ok(registry)
}
