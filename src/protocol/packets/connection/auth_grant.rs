use crate::network::packet::bit_field::BitField;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::{Deserialize, PacketInfo, PacketType, Serialize};
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::var_int::var_bytes_size;

pub const MAX_TOKEN_LEN: usize = 8192;

/// Server reply to `Connect` carrying the grant the client exchanges for a token.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AuthGrant {
    pub auth_grant: Option<String>,
    pub server_identity_token: Option<String>,
}

impl AuthGrant {
    const AUTH_GRANT: u64 = 1;
    const SERVER_IDENTITY_TOKEN: u64 = 2;
}

impl PacketType for AuthGrant {
    const INFO: PacketInfo = PacketInfo {
        id: 11,
        name: "AuthGrant",
        compressed: false,
        null_bits_size: 1,
        fixed_block_size: 0,
        variable_field_count: 2,
        variable_block_start: 9,
        max_size: 16_397,
    };
}

impl Serialize for AuthGrant {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::AUTH_GRANT, self.auth_grant.is_some())?;
        bits.set_if(Self::SERVER_IDENTITY_TOKEN, self.server_identity_token.is_some())?;
        writer.write_bits(&bits);

        let mut offsets = writer.reserve_offsets::<2>();
        offsets.write_opt_string(self.auth_grant.as_deref(), MAX_TOKEN_LEN, "auth_grant")?;
        offsets.write_opt_string(self.server_identity_token.as_deref(), MAX_TOKEN_LEN, "server_identity_token")?;
        offsets.finish()
    }

    fn compute_size(&self) -> Option<usize> {
        let tokens = [&self.auth_grant, &self.server_identity_token]
            .into_iter()
            .flatten()
            .map(|token| var_bytes_size(token.len()))
            .sum::<usize>();
        Some(Self::INFO.variable_block_start as usize + tokens)
    }
}

impl Deserialize for AuthGrant {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        let [auth_grant, server_identity_token] = reader.read_offsets::<2>()?;
        self.auth_grant =
            reader.read_opt_var_string(bits.is_set(Self::AUTH_GRANT), auth_grant, MAX_TOKEN_LEN, "auth_grant")?;
        self.server_identity_token = reader.read_opt_var_string(
            bits.is_set(Self::SERVER_IDENTITY_TOKEN),
            server_identity_token,
            MAX_TOKEN_LEN,
            "server_identity_token",
        )?;
        Ok(())
    }
}
