/// Declares a closed polymorphic family: an enum with one tuple variant per
/// concrete record, its tag table in both directions and `From` conversions.
///
/// ```ignore
/// variant_family! {
///     pub enum Selector("Selector") {
///         0 => AoeCircle(AoeCircleSelector),
///         1 => Raycast(RaycastSelector),
///     }
/// }
/// ```
#[macro_export]
macro_rules! variant_family {
    (
        $(#[$meta:meta])*
        $vis:vis enum $family:ident($name:literal) {
            $($tag:literal => $variant:ident($ty:ty)),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $family {
            $($variant($ty)),*
        }

        impl $crate::network::packet::polymorphic::VariantFamily for $family {
            const FAMILY: &'static str = $name;

            #[inline]
            fn type_tag(&self) -> i32 {
                match self {
                    $(Self::$variant(_) => $tag),*
                }
            }

            fn serialize_variant(
                &self,
                writer: &mut $crate::network::packet::frame_writer::FrameWriter,
            ) -> Result<(), $crate::network::packet::packet_error::PacketError> {
                match self {
                    $(Self::$variant(inner) => writer.write_object(inner)),*
                }
            }

            fn deserialize_variant(
                tag: i32,
                reader: &mut $crate::network::packet::frame_reader::FrameReader<'_>,
            ) -> Result<Self, $crate::network::packet::packet_error::PacketError> {
                match tag {
                    $($tag => reader.read_object::<$ty>().map(Self::$variant),)*
                    tag => Err($crate::network::packet::packet_error::PacketError::UnsupportedVariantTag {
                        family: $name,
                        tag,
                    }),
                }
            }
        }

        $(
            impl From<$ty> for $family {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

/// Registers decodable packet types, propagating the first registry error.
/// Types listed after `outbound:` are registered without a decode factory.
#[macro_export]
macro_rules! register_packets {
    ($registry:expr; $($packet:ty),* ; outbound: $($outbound:ty),* $(,)?) => {{
        $( $registry.register::<$packet>()?; )*
        $( $registry.register_outbound::<$outbound>()?; )*
    }};
    ($registry:expr; $($packet:ty),* $(,)?) => {{
        $( $registry.register::<$packet>()?; )*
    }};
}
