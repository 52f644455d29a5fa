use ahash::HashMap;
use crate::network::packet::bit_field::BitField;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::{Deserialize, PacketInfo, PacketType, Serialize};
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::MAX_COLLECTION_LEN;
use crate::protocol::packets::assets::{UpdateType, MAX_ASSET_PACKET_SIZE};
use crate::protocol::types::interaction::Interaction;

/// Interaction definitions keyed by asset index. Each value carries its own
/// variant tag.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateInteractions {
    pub update_type: UpdateType,
    pub max_id: i32,
    pub interactions: Option<HashMap<i32, Interaction>>,
}

impl UpdateInteractions {
    const INTERACTIONS: u64 = 1;
}

impl PacketType for UpdateInteractions {
    const INFO: PacketInfo = PacketInfo {
        id: 66,
        name: "UpdateInteractions",
        compressed: true,
        null_bits_size: 1,
        fixed_block_size: 5,
        variable_field_count: 1,
        variable_block_start: 10,
        max_size: MAX_ASSET_PACKET_SIZE,
    };
}

impl Serialize for UpdateInteractions {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::INTERACTIONS, self.interactions.is_some())?;
        writer.write_bits(&bits);
        writer.write_enum(self.update_type);
        writer.write_i32(self.max_id);

        let mut offsets = writer.reserve_offsets::<1>();
        offsets.write_opt_dictionary(
            self.interactions.as_ref(),
            MAX_COLLECTION_LEN,
            "interactions",
            |w, index| {
                w.write_i32(*index);
                Ok(())
            },
            |w, interaction| w.write_tagged(interaction),
        )?;
        offsets.finish()
    }
}

impl Deserialize for UpdateInteractions {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        self.update_type = reader.read_enum("update_type")?;
        self.max_id = reader.read_i32("max_id")?;

        let [interactions] = reader.read_offsets::<1>()?;
        self.interactions = reader.read_opt_dictionary(
            bits.is_set(Self::INTERACTIONS),
            interactions,
            MAX_COLLECTION_LEN,
            "interactions",
            |r| r.read_i32("interaction_index"),
            |r| r.read_tagged(),
        )?;
        Ok(())
    }
}
