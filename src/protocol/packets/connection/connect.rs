use num_enum::{IntoPrimitive, TryFromPrimitive};
use uuid::Uuid;
use crate::network::packet::bit_field::BitField;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::{Deserialize, PacketInfo, PacketType, Serialize};
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::var_int::var_bytes_size;
use crate::protocol::types::host_address::HostAddress;

pub const CLIENT_VERSION_LEN: usize = 20;
pub const MAX_USERNAME_LEN: usize = 16;
pub const MAX_IDENTITY_TOKEN_LEN: usize = 8192;
pub const MAX_LANGUAGE_LEN: usize = 128;
pub const MAX_REFERRAL_DATA_LEN: usize = 4096;

/// First packet a client sends after the stream opens.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Connect {
    pub protocol_crc: i32,
    pub protocol_build_number: i32,
    pub client_version: String,
    pub client_type: ClientType,
    pub uuid: Uuid,
    pub username: String,
    pub identity_token: Option<String>,
    pub language: String,
    pub referral_data: Option<Vec<u8>>,
    pub referral_source: Option<HostAddress>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ClientType {
    #[default]
    Game,
    Editor,
}

impl Connect {
    const IDENTITY_TOKEN: u64 = 1 << 0;
    const REFERRAL_DATA: u64 = 1 << 1;
    const REFERRAL_SOURCE: u64 = 1 << 2;
}

impl PacketType for Connect {
    const INFO: PacketInfo = PacketInfo {
        id: 0,
        name: "Connect",
        compressed: false,
        null_bits_size: 1,
        fixed_block_size: 45,
        variable_field_count: 5,
        variable_block_start: 66,
        max_size: 16_384,
    };
}

impl Serialize for Connect {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::IDENTITY_TOKEN, self.identity_token.is_some())?;
        bits.set_if(Self::REFERRAL_DATA, self.referral_data.is_some())?;
        bits.set_if(Self::REFERRAL_SOURCE, self.referral_source.is_some())?;
        writer.write_bits(&bits);

        writer.write_i32(self.protocol_crc);
        writer.write_i32(self.protocol_build_number);
        writer.write_fixed_string(&self.client_version, CLIENT_VERSION_LEN, "client_version")?;
        writer.write_enum(self.client_type);
        writer.write_uuid(self.uuid);

        let mut offsets = writer.reserve_offsets::<5>();
        offsets.write_string(&self.username, MAX_USERNAME_LEN, "username")?;
        offsets.write_opt_string(self.identity_token.as_deref(), MAX_IDENTITY_TOKEN_LEN, "identity_token")?;
        offsets.write_string(&self.language, MAX_LANGUAGE_LEN, "language")?;
        offsets.write_opt_bytes(self.referral_data.as_deref(), MAX_REFERRAL_DATA_LEN, "referral_data")?;
        offsets.write_opt_object(self.referral_source.as_ref())?;
        offsets.finish()
    }

    fn compute_size(&self) -> Option<usize> {
        let mut size = Self::INFO.variable_block_start as usize
            + var_bytes_size(self.username.len())
            + var_bytes_size(self.language.len());
        if let Some(token) = &self.identity_token {
            size += var_bytes_size(token.len());
        }
        if let Some(data) = &self.referral_data {
            size += var_bytes_size(data.len());
        }
        if let Some(source) = &self.referral_source {
            size += source.compute_size()?;
        }
        Some(size)
    }
}

impl Deserialize for Connect {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        self.protocol_crc = reader.read_i32("protocol_crc")?;
        self.protocol_build_number = reader.read_i32("protocol_build_number")?;
        self.client_version = reader.read_fixed_string(CLIENT_VERSION_LEN, "client_version")?;
        self.client_type = reader.read_enum("client_type")?;
        self.uuid = reader.read_uuid("uuid")?;

        let [username, identity_token, language, referral_data, referral_source] = reader.read_offsets::<5>()?;
        self.username = reader.read_var_string_at(username, MAX_USERNAME_LEN, "username")?;
        self.identity_token = reader.read_opt_var_string(
            bits.is_set(Self::IDENTITY_TOKEN),
            identity_token,
            MAX_IDENTITY_TOKEN_LEN,
            "identity_token",
        )?;
        self.language = reader.read_var_string_at(language, MAX_LANGUAGE_LEN, "language")?;
        self.referral_data = reader.read_opt_var_bytes(
            bits.is_set(Self::REFERRAL_DATA),
            referral_data,
            MAX_REFERRAL_DATA_LEN,
            "referral_data",
        )?;
        self.referral_source =
            reader.read_opt_object(bits.is_set(Self::REFERRAL_SOURCE), referral_source, "referral_source")?;
        Ok(())
    }
}
