use ahash::HashMap;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use crate::network::packet::bit_field::BitField;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::{Deserialize, Serialize};
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::{MAX_COLLECTION_LEN, MAX_STRING_LEN};
use crate::protocol::types::selector::Selector;
use crate::variant_family;

variant_family! {
    pub enum Interaction("Interaction") {
        0 => Simple(SimpleInteraction),
        1 => Charging(ChargingInteraction),
        2 => Select(SelectInteraction),
        3 => Chaining(ChainingInteraction),
    }
}

/// Which side must supply data before the interaction runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum WaitForDataFrom {
    Client,
    Server,
    #[default]
    None,
}

fn write_index(writer: &mut FrameWriter, index: &i32) -> Result<(), PacketError> {
    writer.write_i32(*index);
    Ok(())
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SimpleInteraction {
    pub wait_for_data_from: WaitForDataFrom,
    pub run_time: f32,
    pub next: i32,
    pub failed: i32,
    pub tags: Option<Vec<i32>>,
}

impl SimpleInteraction {
    const TAGS: u64 = 1;
}

impl Serialize for SimpleInteraction {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::TAGS, self.tags.is_some())?;
        writer.write_bits(&bits);
        writer.write_enum(self.wait_for_data_from);
        writer.write_f32(self.run_time);
        writer.write_i32(self.next);
        writer.write_i32(self.failed);

        let mut offsets = writer.reserve_offsets::<1>();
        offsets.write_opt_array(self.tags.as_deref(), MAX_COLLECTION_LEN, "tags", write_index)?;
        offsets.finish()
    }
}

impl Deserialize for SimpleInteraction {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        self.wait_for_data_from = reader.read_enum("wait_for_data_from")?;
        self.run_time = reader.read_f32("run_time")?;
        self.next = reader.read_i32("next")?;
        self.failed = reader.read_i32("failed")?;

        let [tags] = reader.read_offsets::<1>()?;
        self.tags = reader.read_opt_array(bits.is_set(Self::TAGS), tags, MAX_COLLECTION_LEN, "tags", |r| r.read_i32("tag"))?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChargingInteraction {
    pub run_time: f32,
    pub allow_indefinite_hold: bool,
    pub display_progress: bool,
    pub failed: i32,
    pub charged_next: Option<Vec<i32>>,
}

impl ChargingInteraction {
    const CHARGED_NEXT: u64 = 1;
}

impl Serialize for ChargingInteraction {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::CHARGED_NEXT, self.charged_next.is_some())?;
        writer.write_bits(&bits);
        writer.write_f32(self.run_time);
        writer.write_bool(self.allow_indefinite_hold);
        writer.write_bool(self.display_progress);
        writer.write_i32(self.failed);

        let mut offsets = writer.reserve_offsets::<1>();
        offsets.write_opt_array(self.charged_next.as_deref(), MAX_COLLECTION_LEN, "charged_next", write_index)?;
        offsets.finish()
    }
}

impl Deserialize for ChargingInteraction {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        self.run_time = reader.read_f32("run_time")?;
        self.allow_indefinite_hold = reader.read_bool("allow_indefinite_hold")?;
        self.display_progress = reader.read_bool("display_progress")?;
        self.failed = reader.read_i32("failed")?;

        let [charged_next] = reader.read_offsets::<1>()?;
        self.charged_next = reader.read_opt_array(
            bits.is_set(Self::CHARGED_NEXT),
            charged_next,
            MAX_COLLECTION_LEN,
            "charged_next",
            |r| r.read_i32("charged_next"),
        )?;
        Ok(())
    }
}

/// Runs a [`Selector`] and branches on what it hit.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SelectInteraction {
    pub run_time: f32,
    pub next: i32,
    pub failed: i32,
    pub hit_entity: i32,
    pub hit_block: i32,
    pub selector: Option<Selector>,
    pub ignore_owner: bool,
}

impl SelectInteraction {
    const SELECTOR: u64 = 1;
}

impl Serialize for SelectInteraction {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::SELECTOR, self.selector.is_some())?;
        writer.write_bits(&bits);
        writer.write_f32(self.run_time);
        writer.write_i32(self.next);
        writer.write_i32(self.failed);
        writer.write_i32(self.hit_entity);
        writer.write_i32(self.hit_block);
        writer.write_bool(self.ignore_owner);

        let mut offsets = writer.reserve_offsets::<1>();
        offsets.write_opt_tagged(self.selector.as_ref())?;
        offsets.finish()
    }
}

impl Deserialize for SelectInteraction {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        self.run_time = reader.read_f32("run_time")?;
        self.next = reader.read_i32("next")?;
        self.failed = reader.read_i32("failed")?;
        self.hit_entity = reader.read_i32("hit_entity")?;
        self.hit_block = reader.read_i32("hit_block")?;
        self.ignore_owner = reader.read_bool("ignore_owner")?;

        let [selector] = reader.read_offsets::<1>()?;
        self.selector = reader.read_opt_tagged(bits.is_set(Self::SELECTOR), selector)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChainingInteraction {
    pub run_time: f32,
    pub chaining_allowance: f32,
    pub chain_id: Option<String>,
    pub chaining_next: Option<Vec<i32>>,
    pub flags: Option<HashMap<String, i32>>,
}

impl ChainingInteraction {
    const CHAIN_ID: u64 = 1;
    const CHAINING_NEXT: u64 = 2;
    const FLAGS: u64 = 4;
}

impl Serialize for ChainingInteraction {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::CHAIN_ID, self.chain_id.is_some())?;
        bits.set_if(Self::CHAINING_NEXT, self.chaining_next.is_some())?;
        bits.set_if(Self::FLAGS, self.flags.is_some())?;
        writer.write_bits(&bits);
        writer.write_f32(self.run_time);
        writer.write_f32(self.chaining_allowance);

        let mut offsets = writer.reserve_offsets::<3>();
        offsets.write_opt_string(self.chain_id.as_deref(), MAX_STRING_LEN, "chain_id")?;
        offsets.write_opt_array(self.chaining_next.as_deref(), MAX_COLLECTION_LEN, "chaining_next", write_index)?;
        offsets.write_opt_dictionary(
            self.flags.as_ref(),
            MAX_COLLECTION_LEN,
            "flags",
            |w, key| w.write_var_string(key, MAX_STRING_LEN, "flag"),
            write_index,
        )?;
        offsets.finish()
    }
}

impl Deserialize for ChainingInteraction {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        self.run_time = reader.read_f32("run_time")?;
        self.chaining_allowance = reader.read_f32("chaining_allowance")?;

        let [chain_id, chaining_next, flags] = reader.read_offsets::<3>()?;
        self.chain_id = reader.read_opt_var_string(bits.is_set(Self::CHAIN_ID), chain_id, MAX_STRING_LEN, "chain_id")?;
        self.chaining_next = reader.read_opt_array(
            bits.is_set(Self::CHAINING_NEXT),
            chaining_next,
            MAX_COLLECTION_LEN,
            "chaining_next",
            |r| r.read_i32("chaining_next"),
        )?;
        self.flags = reader.read_opt_dictionary(
            bits.is_set(Self::FLAGS),
            flags,
            MAX_COLLECTION_LEN,
            "flags",
            |r| r.read_var_string(MAX_STRING_LEN, "flag"),
            |r| r.read_i32("flag_value"),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::packet::polymorphic::VariantFamily;
    use crate::protocol::types::math::Vector3f;
    use crate::protocol::types::selector::{AoeCircleSelector, RaycastSelector};

    fn sample_interactions() -> Vec<Interaction> {
        let mut flags = HashMap::default();
        flags.insert("combo".to_string(), 3);
        flags.insert("".to_string(), -1);

        vec![
            Interaction::from(SimpleInteraction { run_time: 0.25, next: 1, failed: -1, tags: Some(vec![4, 5]), ..Default::default() }),
            Interaction::from(ChargingInteraction { run_time: 1.0, display_progress: true, ..Default::default() }),
            Interaction::from(SelectInteraction {
                run_time: 0.1,
                hit_entity: 7,
                selector: Some(Selector::from(AoeCircleSelector { range: 2.0, offset: Some(Vector3f::new(0.0, 1.0, 0.0)) })),
                ..Default::default()
            }),
            Interaction::from(SelectInteraction { selector: None, ..Default::default() }),
            Interaction::from(ChainingInteraction {
                chain_id: Some("sword_swing".into()),
                chaining_next: Some(vec![]),
                flags: Some(flags),
                ..Default::default()
            }),
        ]
    }

    #[test]
    fn test_interactions_round_trip_in_sequence() {
        let interactions = sample_interactions();
        let mut writer = FrameWriter::new();
        writer.write_array(&interactions, 16, "interactions", |w, i| w.write_tagged(i)).unwrap();
        let data = writer.into_inner();

        let mut reader = FrameReader::new(&data);
        let read = reader.read_array(16, "interactions", |r| r.read_tagged::<Interaction>()).unwrap();
        assert_eq!(read, interactions);
        assert_eq!(reader.position(), data.len());
    }

    #[test]
    fn test_nested_selector_keeps_its_type() {
        let select = Interaction::from(SelectInteraction {
            selector: Some(Selector::from(RaycastSelector { distance: 30, ..Default::default() })),
            ..Default::default()
        });
        let mut writer = FrameWriter::new();
        writer.write_tagged(&select).unwrap();
        let data = writer.into_inner();

        let mut reader = FrameReader::new(&data);
        match reader.read_tagged::<Interaction>().unwrap() {
            Interaction::Select(SelectInteraction { selector: Some(Selector::Raycast(raycast)), .. }) => {
                assert_eq!(raycast.distance, 30)
            }
            other => panic!("decoded {:?} (tag {})", other, other.type_tag()),
        }
    }

    #[test]
    fn test_unknown_nested_selector_tag_fails() {
        let select = Interaction::from(SelectInteraction {
            selector: Some(Selector::from(AoeCircleSelector::default())),
            ..Default::default()
        });
        let mut writer = FrameWriter::new();
        writer.write_tagged(&select).unwrap();
        let mut data = writer.into_inner();

        // interaction tag, bitmap, 21 fixed bytes, one offset slot, then the selector tag
        let selector_tag = 1 + 1 + 21 + 4;
        assert_eq!(data[selector_tag], 0);
        data[selector_tag] = 9;

        let mut reader = FrameReader::new(&data);
        assert!(matches!(
            reader.read_tagged::<Interaction>(),
            Err(PacketError::UnsupportedVariantTag { family: "Selector", tag: 9 })
        ));
    }
}
