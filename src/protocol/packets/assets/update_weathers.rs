use ahash::HashMap;
use crate::network::packet::bit_field::BitField;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::{Deserialize, PacketInfo, PacketType, Serialize};
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::MAX_COLLECTION_LEN;
use crate::protocol::packets::assets::{UpdateType, MAX_ASSET_PACKET_SIZE};
use crate::protocol::types::weather::Weather;

/// Weather definitions keyed by their asset index.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateWeathers {
    pub update_type: UpdateType,
    pub max_id: i32,
    pub weathers: Option<HashMap<i32, Weather>>,
}

impl UpdateWeathers {
    const WEATHERS: u64 = 1;
}

impl PacketType for UpdateWeathers {
    const INFO: PacketInfo = PacketInfo {
        id: 47,
        name: "UpdateWeathers",
        compressed: true,
        null_bits_size: 1,
        fixed_block_size: 5,
        variable_field_count: 1,
        variable_block_start: 10,
        max_size: MAX_ASSET_PACKET_SIZE,
    };
}

impl Serialize for UpdateWeathers {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::WEATHERS, self.weathers.is_some())?;
        writer.write_bits(&bits);
        writer.write_enum(self.update_type);
        writer.write_i32(self.max_id);

        let mut offsets = writer.reserve_offsets::<1>();
        offsets.write_opt_dictionary(
            self.weathers.as_ref(),
            MAX_COLLECTION_LEN,
            "weathers",
            |w, index| {
                w.write_i32(*index);
                Ok(())
            },
            |w, weather| w.write_object(weather),
        )?;
        offsets.finish()
    }
}

impl Deserialize for UpdateWeathers {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        self.update_type = reader.read_enum("update_type")?;
        self.max_id = reader.read_i32("max_id")?;

        let [weathers] = reader.read_offsets::<1>()?;
        self.weathers = reader.read_opt_dictionary(
            bits.is_set(Self::WEATHERS),
            weathers,
            MAX_COLLECTION_LEN,
            "weathers",
            |r| r.read_i32("weather_index"),
            |r| r.read_object(),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packets::{test_encode, test_packet};
    use crate::protocol::types::color::Color;
    use crate::protocol::types::math::NearFar;
    use crate::protocol::types::weather::{Cloud, WeatherParticle};

    fn weathers(count: i32) -> HashMap<i32, Weather> {
        (0..count)
            .map(|index| {
                let weather = Weather {
                    sunlight_damping_multiplier: 1.0,
                    fog: Some(NearFar { near: 8.0, far: 128.0 + index as f32 }),
                    fog_color: Some(Color::rgb(120, 130, 140)),
                    id: Some(format!("Zone1_Weather_{index}")),
                    tag_indexes: Some(vec![index, index + 1]),
                    clouds: Some(vec![Cloud { texture: Some("sky/clouds.png".into()), ..Default::default() }]),
                    particle: (index % 2 == 0).then(|| WeatherParticle { scale: 0.5, ..Default::default() }),
                    ..Default::default()
                };
                (index, weather)
            })
            .collect()
    }

    #[test]
    fn test_update_weathers() {
        let packet = UpdateWeathers { update_type: UpdateType::Init, max_id: 40, weathers: Some(weathers(40)) };
        assert_eq!(test_packet(&packet), packet);
    }

    #[test]
    fn test_repetitive_assets_compress() {
        let packet = UpdateWeathers { update_type: UpdateType::AddOrUpdate, max_id: 200, weathers: Some(weathers(200)) };
        let mut raw = FrameWriter::new();
        packet.serialize(&mut raw).unwrap();

        let frame = test_encode(&packet);
        assert!(frame.len() - 8 < raw.position() / 2);
    }

    #[test]
    fn test_remove_without_table() {
        let packet = UpdateWeathers { update_type: UpdateType::Remove, max_id: 0, weathers: None };
        assert_eq!(test_packet(&packet), packet);
    }
}
