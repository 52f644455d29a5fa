use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;

pub mod update_interactions;
pub mod update_weathers;

/// How the receiver applies an asset update to its local table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive, Display)]
#[repr(u8)]
pub enum UpdateType {
    #[default]
    Init,
    AddOrUpdate,
    Remove,
}

/// Asset tables can be large, so their packets get a generous ceiling.
pub const MAX_ASSET_PACKET_SIZE: u32 = 16 * 1024 * 1024;
