use ahash::HashMap;
use crate::network::packet::bit_field::BitField;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::{Deserialize, Serialize};
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::{MAX_COLLECTION_LEN, MAX_STRING_LEN};
use crate::protocol::types::color::Color;
use crate::protocol::types::math::NearFar;

fn write_key(writer: &mut FrameWriter, key: &i32) -> Result<(), PacketError> {
    writer.write_i32(*key);
    Ok(())
}

fn write_color(writer: &mut FrameWriter, color: &Color) -> Result<(), PacketError> {
    writer.write_fixed(color);
    Ok(())
}

/// Sky and fog settings of one weather type.
///
/// Eleven optional fields, so the bitmap takes two bytes. Every fixed field
/// keeps its slot in the fixed block when absent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Weather {
    pub sunlight_damping_multiplier: f32,
    pub fog: Option<NearFar>,
    pub sunlight_color: Option<Color>,
    pub sky_top_color: Option<Color>,
    pub sky_bottom_color: Option<Color>,
    pub fog_color: Option<Color>,
    pub id: Option<String>,
    pub tag_indexes: Option<Vec<i32>>,
    pub clouds: Option<Vec<Cloud>>,
    pub screen_effect: Option<String>,
    pub particle: Option<WeatherParticle>,
    pub moon_colors: Option<HashMap<i32, Color>>,
}

impl Weather {
    pub const NULL_BITS_SIZE: usize = 2;
    pub const VARIABLE_BLOCK_START: usize = 50;

    const FOG: u64 = 1 << 0;
    const SUNLIGHT_COLOR: u64 = 1 << 1;
    const SKY_TOP_COLOR: u64 = 1 << 2;
    const SKY_BOTTOM_COLOR: u64 = 1 << 3;
    const FOG_COLOR: u64 = 1 << 4;
    const ID: u64 = 1 << 5;
    const TAG_INDEXES: u64 = 1 << 6;
    const CLOUDS: u64 = 1 << 7;
    const SCREEN_EFFECT: u64 = 1 << 8;
    const PARTICLE: u64 = 1 << 9;
    const MOON_COLORS: u64 = 1 << 10;
}

impl Serialize for Weather {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(Self::NULL_BITS_SIZE as u8);
        bits.set_if(Self::FOG, self.fog.is_some())?;
        bits.set_if(Self::SUNLIGHT_COLOR, self.sunlight_color.is_some())?;
        bits.set_if(Self::SKY_TOP_COLOR, self.sky_top_color.is_some())?;
        bits.set_if(Self::SKY_BOTTOM_COLOR, self.sky_bottom_color.is_some())?;
        bits.set_if(Self::FOG_COLOR, self.fog_color.is_some())?;
        bits.set_if(Self::ID, self.id.is_some())?;
        bits.set_if(Self::TAG_INDEXES, self.tag_indexes.is_some())?;
        bits.set_if(Self::CLOUDS, self.clouds.is_some())?;
        bits.set_if(Self::SCREEN_EFFECT, self.screen_effect.is_some())?;
        bits.set_if(Self::PARTICLE, self.particle.is_some())?;
        bits.set_if(Self::MOON_COLORS, self.moon_colors.is_some())?;
        writer.write_bits(&bits);

        writer.write_f32(self.sunlight_damping_multiplier);
        writer.write_opt(self.fog.as_ref());
        writer.write_opt(self.sunlight_color.as_ref());
        writer.write_opt(self.sky_top_color.as_ref());
        writer.write_opt(self.sky_bottom_color.as_ref());
        writer.write_opt(self.fog_color.as_ref());

        let mut offsets = writer.reserve_offsets::<6>();
        offsets.write_opt_string(self.id.as_deref(), MAX_STRING_LEN, "id")?;
        offsets.write_opt_array(self.tag_indexes.as_deref(), MAX_COLLECTION_LEN, "tag_indexes", write_key)?;
        offsets.write_opt_array(self.clouds.as_deref(), MAX_COLLECTION_LEN, "clouds", |w, c| w.write_object(c))?;
        offsets.write_opt_string(self.screen_effect.as_deref(), MAX_STRING_LEN, "screen_effect")?;
        offsets.write_opt_object(self.particle.as_ref())?;
        offsets.write_opt_dictionary(self.moon_colors.as_ref(), MAX_COLLECTION_LEN, "moon_colors", write_key, write_color)?;
        offsets.finish()
    }
}

impl Deserialize for Weather {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(Self::NULL_BITS_SIZE)?;
        self.sunlight_damping_multiplier = reader.read_f32("sunlight_damping_multiplier")?;
        self.fog = reader.read_opt(bits.is_set(Self::FOG), "fog")?;
        self.sunlight_color = reader.read_opt(bits.is_set(Self::SUNLIGHT_COLOR), "sunlight_color")?;
        self.sky_top_color = reader.read_opt(bits.is_set(Self::SKY_TOP_COLOR), "sky_top_color")?;
        self.sky_bottom_color = reader.read_opt(bits.is_set(Self::SKY_BOTTOM_COLOR), "sky_bottom_color")?;
        self.fog_color = reader.read_opt(bits.is_set(Self::FOG_COLOR), "fog_color")?;

        let [id, tag_indexes, clouds, screen_effect, particle, moon_colors] = reader.read_offsets::<6>()?;
        self.id = reader.read_opt_var_string(bits.is_set(Self::ID), id, MAX_STRING_LEN, "id")?;
        self.tag_indexes = reader.read_opt_array(
            bits.is_set(Self::TAG_INDEXES),
            tag_indexes,
            MAX_COLLECTION_LEN,
            "tag_indexes",
            |r| r.read_i32("tag_index"),
        )?;
        self.clouds = reader.read_opt_array(bits.is_set(Self::CLOUDS), clouds, MAX_COLLECTION_LEN, "clouds", |r| r.read_object())?;
        self.screen_effect =
            reader.read_opt_var_string(bits.is_set(Self::SCREEN_EFFECT), screen_effect, MAX_STRING_LEN, "screen_effect")?;
        self.particle = reader.read_opt_object(bits.is_set(Self::PARTICLE), particle, "particle")?;
        self.moon_colors = reader.read_opt_dictionary(
            bits.is_set(Self::MOON_COLORS),
            moon_colors,
            MAX_COLLECTION_LEN,
            "moon_colors",
            |r| r.read_i32("moon_phase"),
            |r| r.read_fixed("moon_color"),
        )?;
        Ok(())
    }
}

/// A cloud layer. Its size varies with its content.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Cloud {
    pub texture: Option<String>,
    pub speeds: Option<HashMap<i32, f32>>,
    pub colors: Option<HashMap<i32, Color>>,
}

impl Cloud {
    const TEXTURE: u64 = 1;
    const SPEEDS: u64 = 2;
    const COLORS: u64 = 4;
}

impl Serialize for Cloud {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::TEXTURE, self.texture.is_some())?;
        bits.set_if(Self::SPEEDS, self.speeds.is_some())?;
        bits.set_if(Self::COLORS, self.colors.is_some())?;
        writer.write_bits(&bits);

        let mut offsets = writer.reserve_offsets::<3>();
        offsets.write_opt_string(self.texture.as_deref(), MAX_STRING_LEN, "texture")?;
        offsets.write_opt_dictionary(self.speeds.as_ref(), MAX_COLLECTION_LEN, "speeds", write_key, |w, speed| {
            w.write_f32(*speed);
            Ok(())
        })?;
        offsets.write_opt_dictionary(self.colors.as_ref(), MAX_COLLECTION_LEN, "colors", write_key, write_color)?;
        offsets.finish()
    }
}

impl Deserialize for Cloud {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        let [texture, speeds, colors] = reader.read_offsets::<3>()?;
        self.texture = reader.read_opt_var_string(bits.is_set(Self::TEXTURE), texture, MAX_STRING_LEN, "texture")?;
        self.speeds = reader.read_opt_dictionary(
            bits.is_set(Self::SPEEDS),
            speeds,
            MAX_COLLECTION_LEN,
            "speeds",
            |r| r.read_i32("hour"),
            |r| r.read_f32("speed"),
        )?;
        self.colors = reader.read_opt_dictionary(
            bits.is_set(Self::COLORS),
            colors,
            MAX_COLLECTION_LEN,
            "colors",
            |r| r.read_i32("hour"),
            |r| r.read_fixed("color"),
        )?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct WeatherParticle {
    pub system_id: Option<String>,
    pub color: Option<Color>,
    pub scale: f32,
    pub override_fx_color: bool,
    pub is_overground_only: bool,
}

impl WeatherParticle {
    const SYSTEM_ID: u64 = 1;
    const COLOR: u64 = 2;
}

impl Serialize for WeatherParticle {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::SYSTEM_ID, self.system_id.is_some())?;
        bits.set_if(Self::COLOR, self.color.is_some())?;
        writer.write_bits(&bits);
        writer.write_opt(self.color.as_ref());
        writer.write_f32(self.scale);
        writer.write_bool(self.override_fx_color);
        writer.write_bool(self.is_overground_only);

        let mut offsets = writer.reserve_offsets::<1>();
        offsets.write_opt_string(self.system_id.as_deref(), MAX_STRING_LEN, "system_id")?;
        offsets.finish()
    }
}

impl Deserialize for WeatherParticle {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        self.color = reader.read_opt(bits.is_set(Self::COLOR), "color")?;
        self.scale = reader.read_f32("scale")?;
        self.override_fx_color = reader.read_bool("override_fx_color")?;
        self.is_overground_only = reader.read_bool("is_overground_only")?;

        let [system_id] = reader.read_offsets::<1>()?;
        self.system_id = reader.read_opt_var_string(bits.is_set(Self::SYSTEM_ID), system_id, MAX_STRING_LEN, "system_id")?;
        Ok(())
    }
}
