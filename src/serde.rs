//! # Serde module for Sketch
//!
//! `Sketch` is serialized as a tuple `(precision, registers)` where `registers` holds one rank
//! per register.
//!
//! During deserialization the tuple goes through `Sketch::from_registers`, so payloads with an
//! unsupported precision, wrong number of registers, or ranks above the maximum for the precision
//! are rejected rather than producing an inconsistent sketch.
//!
//! Refer to the serde documentation for more details on custom serialization and deserialization:
//! - [Serialization](https://serde.rs/impl-serialize.html)
//! - [Deserialization](https://serde.rs/impl-deserialize.html)
use serde::de::Error;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sketch::Sketch;

impl Serialize for Sketch {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.precision())?;
        tup.serialize_element(self.registers())?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for Sketch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (precision, registers): (u8, Vec<u8>) = Deserialize::deserialize(deserializer)?;
        Sketch::from_registers(precision, registers).map_err(|e| {
            debug!(error = %e, "Rejected serialized sketch.");
            Error::custom(e)
        })
    }
}
