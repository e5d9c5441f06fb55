use std::io::{Read, Write};

use crate::{error::MarshalError, serde::WireSerde};

// Integers are fixed width and sent in network (big-endian) order.
macro_rules! impl_fixed_width {
    ($($ty:ty),*) => {
        $(
            impl WireSerde for $ty {
                fn ser(&self, writer: &mut dyn Write) -> Result<(), MarshalError> {
                    writer.write_all(&self.to_be_bytes())?;
                    Ok(())
                }

                fn de(reader: &mut dyn Read) -> Result<Self, MarshalError> {
                    let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                    reader.read_exact(&mut bytes)?;
                    Ok(<$ty>::from_be_bytes(bytes))
                }

                fn wire_len() -> Option<usize> {
                    Some(std::mem::size_of::<$ty>())
                }
            }
        )*
    };
}

impl_fixed_width!(u64, i64);
