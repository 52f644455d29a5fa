use crate::network::packet::bit_field::BitField;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::{Deserialize, PacketInfo, PacketType, Serialize};
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::var_int::var_bytes_size;
use crate::protocol::packets::connection::auth_grant::MAX_TOKEN_LEN;

pub const MAX_PASSWORD_CHALLENGE_LEN: usize = 64;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ServerAuthToken {
    pub server_access_token: Option<String>,
    pub password_challenge: Option<Vec<u8>>,
}

impl ServerAuthToken {
    const SERVER_ACCESS_TOKEN: u64 = 1;
    const PASSWORD_CHALLENGE: u64 = 2;
}

impl PacketType for ServerAuthToken {
    const INFO: PacketInfo = PacketInfo {
        id: 13,
        name: "ServerAuthToken",
        compressed: false,
        null_bits_size: 1,
        fixed_block_size: 0,
        variable_field_count: 2,
        variable_block_start: 9,
        max_size: 8_268,
    };
}

impl Serialize for ServerAuthToken {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::SERVER_ACCESS_TOKEN, self.server_access_token.is_some())?;
        bits.set_if(Self::PASSWORD_CHALLENGE, self.password_challenge.is_some())?;
        writer.write_bits(&bits);

        let mut offsets = writer.reserve_offsets::<2>();
        offsets.write_opt_string(self.server_access_token.as_deref(), MAX_TOKEN_LEN, "server_access_token")?;
        offsets.write_opt_bytes(
            self.password_challenge.as_deref(),
            MAX_PASSWORD_CHALLENGE_LEN,
            "password_challenge",
        )?;
        offsets.finish()
    }

    fn compute_size(&self) -> Option<usize> {
        let token = self.server_access_token.as_ref().map_or(0, |t| var_bytes_size(t.len()));
        let challenge = self.password_challenge.as_ref().map_or(0, |c| var_bytes_size(c.len()));
        Some(Self::INFO.variable_block_start as usize + token + challenge)
    }
}

impl Deserialize for ServerAuthToken {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        let [server_access_token, password_challenge] = reader.read_offsets::<2>()?;
        self.server_access_token = reader.read_opt_var_string(
            bits.is_set(Self::SERVER_ACCESS_TOKEN),
            server_access_token,
            MAX_TOKEN_LEN,
            "server_access_token",
        )?;
        self.password_challenge = reader.read_opt_var_bytes(
            bits.is_set(Self::PASSWORD_CHALLENGE),
            password_challenge,
            MAX_PASSWORD_CHALLENGE_LEN,
            "password_challenge",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packets::connection::auth_grant::AuthGrant;
    use crate::protocol::packets::connection::auth_token::AuthToken;
    use crate::protocol::packets::{test_encode, test_packet};

    #[test]
    fn test_auth_handshake_packets() {
        let grant = AuthGrant { auth_grant: Some("grant-abc".into()), server_identity_token: None };
        assert_eq!(test_packet(&grant), grant);
        assert_eq!(Some(test_encode(&grant).len() - 8), grant.compute_size());

        let token = AuthToken {
            access_token: Some("access".into()),
            server_authorization_grant: Some("server-grant".into()),
        };
        assert_eq!(test_packet(&token), token);

        let server = ServerAuthToken {
            server_access_token: Some("server-access".into()),
            password_challenge: Some(vec![0xA5; 32]),
        };
        assert_eq!(test_packet(&server), server);
        assert_eq!(Some(test_encode(&server).len() - 8), server.compute_size());
    }

    #[test]
    fn test_password_challenge_limit() {
        let server = ServerAuthToken { server_access_token: None, password_challenge: Some(vec![0; 65]) };
        let mut writer = FrameWriter::new();
        assert!(matches!(
            server.serialize(&mut writer),
            Err(PacketError::CollectionTooLarge { field: "password_challenge", count: 65, max: 64 })
        ));
    }
}
