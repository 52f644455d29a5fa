//! A fixed set of packets covering every registered type, used by the
//! capture tool's `--write-sample` mode.

use ahash::HashMap;
use uuid::Uuid;
use crate::network::packet::packet::Packet;
use crate::protocol::packets::assets::update_interactions::UpdateInteractions;
use crate::protocol::packets::assets::update_weathers::UpdateWeathers;
use crate::protocol::packets::assets::UpdateType;
use crate::protocol::packets::connection::auth_grant::AuthGrant;
use crate::protocol::packets::connection::auth_token::AuthToken;
use crate::protocol::packets::connection::connect::{ClientType, Connect};
use crate::protocol::packets::connection::disconnect::{Disconnect, DisconnectCause};
use crate::protocol::packets::connection::ping::{Ping, Pong, PongType};
use crate::protocol::packets::connection::server_auth_token::ServerAuthToken;
use crate::protocol::types::color::Color;
use crate::protocol::types::host_address::HostAddress;
use crate::protocol::types::interaction::{ChainingInteraction, Interaction, SelectInteraction, SimpleInteraction};
use crate::protocol::types::math::{NearFar, Vector3f};
use crate::protocol::types::selector::{AoeCylinderSelector, Selector};
use crate::protocol::types::weather::{Cloud, Weather, WeatherParticle};

fn weathers() -> HashMap<i32, Weather> {
    let mut moon_colors = HashMap::default();
    moon_colors.insert(0, Color::rgb(230, 230, 255));
    moon_colors.insert(4, Color::rgb(255, 200, 160));

    let mut cloud_speeds = HashMap::default();
    cloud_speeds.insert(0, 0.2);
    cloud_speeds.insert(12, 0.6);

    let mut weathers = HashMap::default();
    weathers.insert(
        0,
        Weather {
            sunlight_damping_multiplier: 1.0,
            sunlight_color: Some(Color::rgb(255, 244, 214)),
            sky_top_color: Some(Color::rgb(64, 128, 255)),
            id: Some("Zone1_Sunny".into()),
            clouds: Some(vec![Cloud { texture: Some("Sky/Clouds/Light.png".into()), speeds: Some(cloud_speeds), colors: None }]),
            moon_colors: Some(moon_colors),
            ..Default::default()
        },
    );
    weathers.insert(
        1,
        Weather {
            sunlight_damping_multiplier: 0.4,
            fog: Some(NearFar { near: 12.0, far: 96.0 }),
            fog_color: Some(Color::rgb(110, 115, 125)),
            id: Some("Zone1_Rain".into()),
            tag_indexes: Some(vec![2, 5]),
            screen_effect: Some("ScreenEffects/Rain.png".into()),
            particle: Some(WeatherParticle {
                system_id: Some("Weather_Rain".into()),
                scale: 1.0,
                is_overground_only: true,
                ..Default::default()
            }),
            ..Default::default()
        },
    );
    weathers
}

fn interactions() -> HashMap<i32, Interaction> {
    let mut flags = HashMap::default();
    flags.insert("Combo".to_string(), 2);

    let mut interactions = HashMap::default();
    interactions.insert(0, Interaction::from(SimpleInteraction { run_time: 0.3, next: 1, failed: -1, ..Default::default() }));
    interactions.insert(
        1,
        Interaction::from(SelectInteraction {
            run_time: 0.15,
            next: 2,
            failed: -1,
            selector: Some(Selector::from(AoeCylinderSelector {
                range: 2.5,
                height: 1.8,
                offset: Some(Vector3f::new(0.0, 0.9, 0.0)),
            })),
            ..Default::default()
        }),
    );
    interactions.insert(
        2,
        Interaction::from(ChainingInteraction {
            run_time: 0.5,
            chaining_allowance: 1.25,
            chain_id: Some("Sword_Swing".into()),
            chaining_next: Some(vec![0, 1]),
            flags: Some(flags),
        }),
    );
    interactions
}

/// Packets in the order a session would send them.
pub fn sample_packets() -> Vec<Box<dyn Packet>> {
    vec![
        Box::new(Connect {
            protocol_crc: 0x2A6F_10C3,
            protocol_build_number: 1,
            client_version: "2026.01.13".into(),
            client_type: ClientType::Game,
            uuid: Uuid::from_u128(0x6B1E_4F0D_92A1_4C33_8E0B_5F6E_7A8B_9C0D),
            username: "Sample".into(),
            identity_token: Some("identity.sample.token".into()),
            language: "en-US".into(),
            referral_data: None,
            referral_source: Some(HostAddress { host: "127.0.0.1".into(), port: 5520 }),
        }),
        Box::new(AuthGrant { auth_grant: Some("grant".into()), server_identity_token: Some("server.identity".into()) }),
        Box::new(AuthToken { access_token: Some("access".into()), server_authorization_grant: Some("server.grant".into()) }),
        Box::new(ServerAuthToken { server_access_token: Some("server.access".into()), password_challenge: Some(vec![7; 16]) }),
        Box::new(Ping { id: 1, sent_at_millis: 1_760_000_000_000, ..Default::default() }),
        Box::new(Pong { id: 1, sent_at_millis: 1_760_000_000_000, kind: PongType::Direct, packet_queue_size: 0 }),
        Box::new(UpdateWeathers { update_type: UpdateType::Init, max_id: 2, weathers: Some(weathers()) }),
        Box::new(UpdateInteractions { update_type: UpdateType::Init, max_id: 3, interactions: Some(interactions()) }),
        Box::new(Disconnect { reason: Some("Sample finished".into()), cause: DisconnectCause::Disconnect }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::network::packet::buffer_pool::BufferPool;
    use crate::network::packet::compression::ZstdCompressor;
    use crate::network::packet::packet_decoder::PacketDecoder;
    use crate::network::packet::packet_encoder::PacketEncoder;
    use crate::network::packet::packet_error::PacketError;
    use crate::network::packet::packet_io::{read_packet, write_packet};
    use crate::protocol::default_registry;

    fn equal_as<T: Packet + PartialEq>(a: &dyn Packet, b: &dyn Packet) -> Option<bool> {
        Some(a.downcast_ref::<T>()? == b.downcast_ref::<T>()?)
    }

    fn same_packet(a: &dyn Packet, b: &dyn Packet) -> Option<bool> {
        equal_as::<Connect>(a, b)
            .or_else(|| equal_as::<AuthGrant>(a, b))
            .or_else(|| equal_as::<AuthToken>(a, b))
            .or_else(|| equal_as::<ServerAuthToken>(a, b))
            .or_else(|| equal_as::<Ping>(a, b))
            .or_else(|| equal_as::<Pong>(a, b))
            .or_else(|| equal_as::<UpdateWeathers>(a, b))
            .or_else(|| equal_as::<UpdateInteractions>(a, b))
            .or_else(|| equal_as::<Disconnect>(a, b))
    }

    #[tokio::test]
    async fn test_sample_capture_round_trip() {
        let registry = default_registry().unwrap();
        let compressor = Arc::new(ZstdCompressor::default());
        let encoder = PacketEncoder::new(&registry, compressor.clone());
        let decoder = PacketDecoder::new(&registry, compressor);
        let pool = BufferPool::default();

        let samples = sample_packets();
        let mut capture = Vec::new();
        for packet in &samples {
            write_packet(&mut capture, &encoder, &**packet).await.unwrap();
        }

        let mut stream: &[u8] = &capture;
        for expected in &samples {
            let decoded = read_packet(&mut stream, &decoder, &pool).await.unwrap();
            assert_eq!(decoded.type_name(), expected.type_name());
            assert_eq!(same_packet(&*decoded, &**expected), Some(true), "{}", expected.type_name());
        }
        assert!(matches!(read_packet(&mut stream, &decoder, &pool).await, Err(PacketError::ConnectionLost)));
    }

    #[test]
    fn test_every_registered_packet_has_a_sample() {
        let registry = default_registry().unwrap();
        let samples = sample_packets();
        assert_eq!(samples.len(), registry.len());
        assert!(samples.iter().all(|packet| registry.lookup_for(&**packet).is_some()));
    }
}
