use crate::network::packet::bit_field::BitField;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::{Deserialize, PacketInfo, PacketType, Serialize};
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::var_int::var_bytes_size;
use crate::protocol::packets::connection::auth_grant::MAX_TOKEN_LEN;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AuthToken {
    pub access_token: Option<String>,
    pub server_authorization_grant: Option<String>,
}

impl AuthToken {
    const ACCESS_TOKEN: u64 = 1;
    const SERVER_AUTHORIZATION_GRANT: u64 = 2;
}

impl PacketType for AuthToken {
    const INFO: PacketInfo = PacketInfo {
        id: 12,
        name: "AuthToken",
        compressed: false,
        null_bits_size: 1,
        fixed_block_size: 0,
        variable_field_count: 2,
        variable_block_start: 9,
        max_size: 16_397,
    };
}

impl Serialize for AuthToken {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::ACCESS_TOKEN, self.access_token.is_some())?;
        bits.set_if(Self::SERVER_AUTHORIZATION_GRANT, self.server_authorization_grant.is_some())?;
        writer.write_bits(&bits);

        let mut offsets = writer.reserve_offsets::<2>();
        offsets.write_opt_string(self.access_token.as_deref(), MAX_TOKEN_LEN, "access_token")?;
        offsets.write_opt_string(
            self.server_authorization_grant.as_deref(),
            MAX_TOKEN_LEN,
            "server_authorization_grant",
        )?;
        offsets.finish()
    }

    fn compute_size(&self) -> Option<usize> {
        let mut size = Self::INFO.variable_block_start as usize;
        if let Some(token) = &self.access_token {
            size += var_bytes_size(token.len());
        }
        if let Some(grant) = &self.server_authorization_grant {
            size += var_bytes_size(grant.len());
        }
        Some(size)
    }
}

impl Deserialize for AuthToken {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        let [access_token, server_authorization_grant] = reader.read_offsets::<2>()?;
        self.access_token =
            reader.read_opt_var_string(bits.is_set(Self::ACCESS_TOKEN), access_token, MAX_TOKEN_LEN, "access_token")?;
        self.server_authorization_grant = reader.read_opt_var_string(
            bits.is_set(Self::SERVER_AUTHORIZATION_GRANT),
            server_authorization_grant,
            MAX_TOKEN_LEN,
            "server_authorization_grant",
        )?;
        Ok(())
    }
}
