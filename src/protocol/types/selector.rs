use num_enum::{IntoPrimitive, TryFromPrimitive};
use crate::network::packet::bit_field::BitField;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::{Deserialize, Serialize};
use crate::network::packet::packet_error::PacketError;
use crate::protocol::types::math::Vector3f;
use crate::variant_family;

variant_family! {
    /// How an interaction picks its targets.
    pub enum Selector("Selector") {
        0 => AoeCircle(AoeCircleSelector),
        1 => AoeCylinder(AoeCylinderSelector),
        2 => Raycast(RaycastSelector),
        3 => Horizontal(HorizontalSelector),
        4 => Stab(StabSelector),
    }
}

const OFFSET: u64 = 1;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AoeCircleSelector {
    pub range: f32,
    pub offset: Option<Vector3f>,
}

impl Serialize for AoeCircleSelector {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(OFFSET, self.offset.is_some())?;
        writer.write_bits(&bits);
        writer.write_f32(self.range);
        writer.write_opt(self.offset.as_ref());
        Ok(())
    }

    fn compute_size(&self) -> Option<usize> {
        Some(17)
    }
}

impl Deserialize for AoeCircleSelector {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        self.range = reader.read_f32("range")?;
        self.offset = reader.read_opt(bits.is_set(OFFSET), "offset")?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AoeCylinderSelector {
    pub range: f32,
    pub height: f32,
    pub offset: Option<Vector3f>,
}

impl Serialize for AoeCylinderSelector {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(OFFSET, self.offset.is_some())?;
        writer.write_bits(&bits);
        writer.write_f32(self.range);
        writer.write_f32(self.height);
        writer.write_opt(self.offset.as_ref());
        Ok(())
    }

    fn compute_size(&self) -> Option<usize> {
        Some(21)
    }
}

impl Deserialize for AoeCylinderSelector {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        self.range = reader.read_f32("range")?;
        self.height = reader.read_f32("height")?;
        self.offset = reader.read_opt(bits.is_set(OFFSET), "offset")?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RaycastSelector {
    pub offset: Option<Vector3f>,
    pub distance: i32,
    pub block_tag_index: i32,
    pub ignore_fluids: bool,
    pub ignore_empty_collision_material: bool,
}

impl Serialize for RaycastSelector {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(OFFSET, self.offset.is_some())?;
        writer.write_bits(&bits);
        writer.write_opt(self.offset.as_ref());
        writer.write_i32(self.distance);
        writer.write_i32(self.block_tag_index);
        writer.write_bool(self.ignore_fluids);
        writer.write_bool(self.ignore_empty_collision_material);
        Ok(())
    }

    fn compute_size(&self) -> Option<usize> {
        Some(23)
    }
}

impl Deserialize for RaycastSelector {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        self.offset = reader.read_opt(bits.is_set(OFFSET), "offset")?;
        self.distance = reader.read_i32("distance")?;
        self.block_tag_index = reader.read_i32("block_tag_index")?;
        self.ignore_fluids = reader.read_bool("ignore_fluids")?;
        self.ignore_empty_collision_material = reader.read_bool("ignore_empty_collision_material")?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum HorizontalSelectorDirection {
    #[default]
    ToLeft,
    ToRight,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct HorizontalSelector {
    pub extend_top: f32,
    pub extend_bottom: f32,
    pub yaw_length: f32,
    pub yaw_start_offset: f32,
    pub pitch_offset: f32,
    pub start_distance: f32,
    pub end_distance: f32,
    pub direction: HorizontalSelectorDirection,
    pub test_line_of_sight: bool,
}

impl Serialize for HorizontalSelector {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        writer.write_f32(self.extend_top);
        writer.write_f32(self.extend_bottom);
        writer.write_f32(self.yaw_length);
        writer.write_f32(self.yaw_start_offset);
        writer.write_f32(self.pitch_offset);
        writer.write_f32(self.start_distance);
        writer.write_f32(self.end_distance);
        writer.write_enum(self.direction);
        writer.write_bool(self.test_line_of_sight);
        Ok(())
    }

    fn compute_size(&self) -> Option<usize> {
        Some(30)
    }
}

impl Deserialize for HorizontalSelector {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        self.extend_top = reader.read_f32("extend_top")?;
        self.extend_bottom = reader.read_f32("extend_bottom")?;
        self.yaw_length = reader.read_f32("yaw_length")?;
        self.yaw_start_offset = reader.read_f32("yaw_start_offset")?;
        self.pitch_offset = reader.read_f32("pitch_offset")?;
        self.start_distance = reader.read_f32("start_distance")?;
        self.end_distance = reader.read_f32("end_distance")?;
        self.direction = reader.read_enum("direction")?;
        self.test_line_of_sight = reader.read_bool("test_line_of_sight")?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StabSelector {
    pub extend_top: f32,
    pub extend_bottom: f32,
    pub extend_left: f32,
    pub extend_right: f32,
    pub yaw_offset: f32,
    pub pitch_offset: f32,
    pub roll_offset: f32,
    pub start_distance: f32,
    pub end_distance: f32,
    pub test_line_of_sight: bool,
}

impl Serialize for StabSelector {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        for value in [
            self.extend_top,
            self.extend_bottom,
            self.extend_left,
            self.extend_right,
            self.yaw_offset,
            self.pitch_offset,
            self.roll_offset,
            self.start_distance,
            self.end_distance,
        ] {
            writer.write_f32(value);
        }
        writer.write_bool(self.test_line_of_sight);
        Ok(())
    }

    fn compute_size(&self) -> Option<usize> {
        Some(37)
    }
}

impl Deserialize for StabSelector {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        self.extend_top = reader.read_f32("extend_top")?;
        self.extend_bottom = reader.read_f32("extend_bottom")?;
        self.extend_left = reader.read_f32("extend_left")?;
        self.extend_right = reader.read_f32("extend_right")?;
        self.yaw_offset = reader.read_f32("yaw_offset")?;
        self.pitch_offset = reader.read_f32("pitch_offset")?;
        self.roll_offset = reader.read_f32("roll_offset")?;
        self.start_distance = reader.read_f32("start_distance")?;
        self.end_distance = reader.read_f32("end_distance")?;
        self.test_line_of_sight = reader.read_bool("test_line_of_sight")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::packet::polymorphic::VariantFamily;

    fn round_trip(selector: &Selector) -> (usize, Selector) {
        let mut writer = FrameWriter::new();
        writer.write_tagged(selector).unwrap();
        let data = writer.into_inner();
        let mut reader = FrameReader::new(&data);
        let read = reader.read_tagged::<Selector>().unwrap();
        assert_eq!(reader.remaining(), 0);
        (data.len(), read)
    }

    #[test]
    fn test_every_variant_round_trips_with_its_size() {
        let selectors = [
            Selector::from(AoeCircleSelector { range: 4.0, offset: Some(Vector3f::new(0.0, 1.5, 0.0)) }),
            Selector::from(AoeCylinderSelector { range: 3.0, height: 2.0, offset: None }),
            Selector::from(RaycastSelector { distance: 12, block_tag_index: -1, ignore_fluids: true, ..Default::default() }),
            Selector::from(HorizontalSelector {
                yaw_length: 90.0,
                direction: HorizontalSelectorDirection::ToRight,
                test_line_of_sight: true,
                ..Default::default()
            }),
            Selector::from(StabSelector { end_distance: 2.5, ..Default::default() }),
        ];

        for (tag, selector) in selectors.iter().enumerate() {
            let (len, read) = round_trip(selector);
            assert_eq!(&read, selector);
            assert_eq!(read.type_tag(), tag as i32);

            let expected = match selector {
                Selector::AoeCircle(s) => s.compute_size(),
                Selector::AoeCylinder(s) => s.compute_size(),
                Selector::Raycast(s) => s.compute_size(),
                Selector::Horizontal(s) => s.compute_size(),
                Selector::Stab(s) => s.compute_size(),
            };
            assert_eq!(Some(len - 1), expected);
        }
    }

    #[test]
    fn test_unknown_selector_tag() {
        let data = [0x05, 0x00];
        let mut reader = FrameReader::new(&data);
        assert!(matches!(
            reader.read_tagged::<Selector>(),
            Err(PacketError::UnsupportedVariantTag { family: "Selector", tag: 5 })
        ));
    }
}
