#![deny(unsafe_code)]

//! Service and method identity.
//!
//! Identifiers are a pure function of a name's UTF-8 bytes: no counters, no
//! process state, no randomness. Regenerating code for an unchanged schema
//! yields the same identifiers on every machine.
//!
//! Two name domains are hashed and must not be mixed up:
//! - a service is identified by its fully-qualified path (`foo.bar.Greeter`),
//! - a method is identified by its unqualified name (`SayHello`), scoped by
//!   the service that declares it.
//!
//! Uniqueness is not enforced. [`method_id_collisions`] reports clashes so a
//! caller can decide what to do with them.

use rpcgen_schema::{MethodDetail, MethodId, ServiceDetail, ServiceId};

const HASH_CONSTANT: u32 = 65599;

/// Hash function used to derive identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IdAlgorithm {
    /// The x65599 polynomial hash seeded with the byte length.
    ///
    /// Matches identifiers already deployed by existing runtimes for ASCII
    /// names.
    #[default]
    Pw65599,

    /// First four bytes of the BLAKE3 digest, read little-endian.
    Blake3,
}

impl IdAlgorithm {
    /// Compute the identifier of `name`.
    pub fn calculate(self, name: &str) -> u32 {
        match self {
            IdAlgorithm::Pw65599 => hash_65599(name.as_bytes()),
            IdAlgorithm::Blake3 => hash_blake3(name.as_bytes()),
        }
    }
}

/// Identifier of `name` under the default algorithm.
pub fn identifier_of(name: &str) -> u32 {
    IdAlgorithm::default().calculate(name)
}

/// `h = len; for each byte b at position i: h += b * 65599^(i+1)`, all mod 2^32.
pub fn hash_65599(bytes: &[u8]) -> u32 {
    let mut hash = bytes.len() as u32;
    let mut coefficient = HASH_CONSTANT;

    for &byte in bytes {
        hash = hash.wrapping_add(coefficient.wrapping_mul(u32::from(byte)));
        coefficient = coefficient.wrapping_mul(HASH_CONSTANT);
    }

    hash
}

pub fn hash_blake3(bytes: &[u8]) -> u32 {
    let digest = blake3::hash(bytes);
    let [a, b, c, d, ..] = *digest.as_bytes();
    u32::from_le_bytes([a, b, c, d])
}

/// Identifier of a service, derived from its fully-qualified path.
pub fn service_id(service: &ServiceDetail, algorithm: IdAlgorithm) -> ServiceId {
    ServiceId(algorithm.calculate(&service.path))
}

/// Identifier of a method, derived from its unqualified name.
pub fn method_id(method: &MethodDetail, algorithm: IdAlgorithm) -> MethodId {
    MethodId(algorithm.calculate(&method.name))
}

/// Two methods of the same service that hash to the same identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCollision {
    pub id: MethodId,
    pub first: String,
    pub second: String,
}

/// Report every pair of distinct method names in `service` sharing an id.
///
/// Methods declared twice under the same name are not reported; that is a
/// schema error for the front end to catch.
pub fn method_id_collisions(
    service: &ServiceDetail,
    algorithm: IdAlgorithm,
) -> Vec<IdCollision> {
    let ids: Vec<(MethodId, &str)> = service
        .methods
        .iter()
        .map(|m| (method_id(m, algorithm), m.name.as_str()))
        .collect();

    let mut collisions = Vec::new();
    for (i, (id, first)) in ids.iter().enumerate() {
        for (other_id, second) in &ids[i + 1..] {
            if id == other_id && first != second {
                collisions.push(IdCollision {
                    id: *id,
                    first: (*first).to_string(),
                    second: (*second).to_string(),
                });
            }
        }
    }
    collisions
}
