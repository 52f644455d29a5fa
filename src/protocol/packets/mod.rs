use crate::network::packet::packet_registry::{PacketRegistry, RegistryError};
use crate::protocol::packets::assets::update_interactions::UpdateInteractions;
use crate::protocol::packets::assets::update_weathers::UpdateWeathers;
use crate::protocol::packets::connection::auth_grant::AuthGrant;
use crate::protocol::packets::connection::auth_token::AuthToken;
use crate::protocol::packets::connection::connect::Connect;
use crate::protocol::packets::connection::disconnect::Disconnect;
use crate::protocol::packets::connection::ping::{Ping, Pong};
use crate::protocol::packets::connection::server_auth_token::ServerAuthToken;
use crate::register_packets;

pub mod assets;
pub mod connection;

/// Registers every packet this crate knows about.
pub fn register_all(registry: &mut PacketRegistry) -> Result<(), RegistryError> {
    register_packets!(
        registry;
        Connect,
        Disconnect,
        Ping,
        Pong,
        AuthGrant,
        AuthToken,
        ServerAuthToken,
        UpdateWeathers,
        UpdateInteractions
    );
    Ok(())
}

/// Encodes a packet into a full frame with the default registry.
#[cfg(test)]
pub fn test_encode<P: crate::network::packet::packet::PacketType>(packet: &P) -> Vec<u8> {
    use std::sync::Arc;
    use crate::network::packet::compression::ZstdCompressor;
    use crate::network::packet::packet_encoder::PacketEncoder;

    let registry = crate::protocol::default_registry().expect("default registry is valid");
    match PacketEncoder::new(&registry, Arc::new(ZstdCompressor::default())).encode(packet) {
        Ok(frame) => frame,
        Err(e) => panic!("Failed to encode 0x{:02X}: {:?}", P::INFO.id, e),
    }
}

/// Sends a packet through a frame and back, returning the decoded copy.
#[cfg(test)]
pub fn test_packet<P: crate::network::packet::packet::PacketType>(packet: &P) -> P {
    use std::sync::Arc;
    use crate::network::packet::compression::ZstdCompressor;
    use crate::network::packet::packet_decoder::PacketDecoder;

    let frame = test_encode(packet);
    let registry = crate::protocol::default_registry().expect("default registry is valid");
    let decoded = match PacketDecoder::new(&registry, Arc::new(ZstdCompressor::default())).decode(&frame) {
        Ok(decoded) => decoded,
        Err(e) => panic!("Failed to decode 0x{:02X}: {:?}", P::INFO.id, e),
    };
    let type_name = decoded.type_name();
    match decoded.downcast::<P>() {
        Ok(packet) => *packet,
        Err(_) => panic!("0x{:02X} decoded as {}", P::INFO.id, type_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::packet::packet::PacketType;

    #[test]
    fn test_ids_are_unique_and_layouts_valid() {
        let mut registry = PacketRegistry::new();
        register_all(&mut registry).unwrap();
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.lookup_by_type::<Connect>().map(|info| info.id), Some(0));
        assert_eq!(registry.lookup_by_id(66).map(|entry| entry.info.name), Some("UpdateInteractions"));
        assert!(registry.iter().filter(|info| info.compressed).all(|info| info.id == 47 || info.id == 66));
    }

    #[test]
    fn test_register_twice_fails() {
        let mut registry = PacketRegistry::new();
        register_all(&mut registry).unwrap();
        assert!(matches!(register_all(&mut registry), Err(RegistryError::DuplicateType { .. })));
    }

    #[test]
    fn test_descriptor_matches_type() {
        assert_eq!(Disconnect::INFO.variable_block_start, 6);
        assert_eq!(Connect::INFO.variable_block_start, 66);
        assert!(UpdateWeathers::INFO.compressed);
    }
}
