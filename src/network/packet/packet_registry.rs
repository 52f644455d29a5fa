use std::any::TypeId;
use ahash::{HashMap, HashMapExt};
use log::info;
use once_cell::sync::OnceCell;
use thiserror::Error;
use crate::network::packet::packet::{Packet, PacketInfo, PacketType};

static PACKET_REGISTRY: OnceCell<PacketRegistry> = OnceCell::new();

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Packet id {id} is already registered to {existing}, cannot register {name}")]
    DuplicatePacketId { id: i32, existing: &'static str, name: &'static str },

    #[error("Type {type_name} is already registered")]
    DuplicateType { type_name: &'static str },

    #[error("Packet {name} has an invalid layout: {reason}")]
    InvalidLayout { name: &'static str, reason: String },

    #[error("The packet registry is already initialized")]
    AlreadyInitialized,
}

pub type PacketFactory = fn() -> Box<dyn Packet>;

#[derive(Debug, Clone, Copy)]
pub struct PacketEntry {
    pub info: PacketInfo,
    pub type_id: TypeId,
    /// `None` for packets that are only ever sent.
    pub factory: Option<PacketFactory>,
}

/// Maps packet ids and runtime types to their descriptors.
///
/// Built once at startup, then only read.
#[derive(Debug, Default)]
pub struct PacketRegistry {
    by_id: HashMap<i32, PacketEntry>,
    by_type: HashMap<TypeId, i32>,
}

fn instantiate_default<T: PacketType + Default>() -> Box<dyn Packet> {
    Box::new(T::default())
}

impl PacketRegistry {
    pub fn new() -> Self {
        Self { by_id: HashMap::new(), by_type: HashMap::new() }
    }

    /// Registers a packet that can be both encoded and decoded.
    pub fn register<T: PacketType + Default>(&mut self) -> Result<(), RegistryError> {
        self.insert::<T>(Some(instantiate_default::<T> as PacketFactory))
    }

    /// Registers a packet that is only encoded. Decoding its id fails with
    /// `InstantiationFailure`.
    pub fn register_outbound<T: PacketType>(&mut self) -> Result<(), RegistryError> {
        self.insert::<T>(None)
    }

    fn insert<T: PacketType>(&mut self, factory: Option<PacketFactory>) -> Result<(), RegistryError> {
        let info = T::INFO;
        info.validate()
            .map_err(|reason| RegistryError::InvalidLayout { name: info.name, reason })?;

        let type_id = TypeId::of::<T>();
        if self.by_type.contains_key(&type_id) {
            return Err(RegistryError::DuplicateType { type_name: std::any::type_name::<T>() });
        }

        if let Some(existing) = self.by_id.get(&info.id) {
            return Err(RegistryError::DuplicatePacketId {
                id: info.id,
                existing: existing.info.name,
                name: info.name,
            });
        }

        self.by_type.insert(type_id, info.id);
        self.by_id.insert(info.id, PacketEntry { info, type_id, factory });
        Ok(())
    }

    #[inline]
    pub fn lookup_by_id(&self, id: i32) -> Option<&PacketEntry> {
        self.by_id.get(&id)
    }

    #[inline]
    pub fn lookup_by_type<T: Packet>(&self) -> Option<&PacketInfo> {
        self.lookup_type_id(TypeId::of::<T>())
    }

    /// Resolves the descriptor of a packet from its runtime type.
    #[inline]
    pub fn lookup_for(&self, packet: &dyn Packet) -> Option<&PacketInfo> {
        self.lookup_type_id(packet.as_any().type_id())
    }

    #[inline]
    fn lookup_type_id(&self, type_id: TypeId) -> Option<&PacketInfo> {
        self.by_type
            .get(&type_id)
            .and_then(|id| self.by_id.get(id))
            .map(|entry| &entry.info)
    }

    /// Creates a default instance to decode into.
    #[inline]
    pub fn instantiate(&self, id: i32) -> Option<Box<dyn Packet>> {
        self.by_id.get(&id)?.factory.map(|factory| factory())
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PacketInfo> {
        self.by_id.values().map(|entry| &entry.info)
    }
}

/// Installs the process wide registry. Can only succeed once.
pub fn init(registry: PacketRegistry) -> Result<&'static PacketRegistry, RegistryError> {
    let count = registry.len();
    PACKET_REGISTRY.set(registry).map_err(|_| RegistryError::AlreadyInitialized)?;
    info!("Packet registry initialized with {} packets", count);
    get().ok_or(RegistryError::AlreadyInitialized)
}

#[inline]
pub fn get() -> Option<&'static PacketRegistry> {
    PACKET_REGISTRY.get()
}
