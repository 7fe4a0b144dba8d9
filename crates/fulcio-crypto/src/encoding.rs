//! Byte-container newtypes with base64 serde encoding
//!
//! Trust material arrives as base64 `rawBytes` fields in JSON; these wrappers
//! keep the different kinds of DER blobs from being mixed up while handling
//! the encoding at the serde boundary.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! base64_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(Vec<u8>);

        impl $name {
            /// Wrap raw bytes
            pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
                Self(bytes.into())
            }

            /// Decode from a standard-base64 string
            pub fn from_base64(s: &str) -> Result<Self> {
                let bytes = STANDARD
                    .decode(s)
                    .map_err(Error::Base64)?;
                Ok(Self(bytes))
            }

            /// Encode as a standard-base64 string
            pub fn to_base64(&self) -> String {
                STANDARD.encode(&self.0)
            }

            /// Raw bytes
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Consume and return the inner bytes
            pub fn into_bytes(self) -> Vec<u8> {
                self.0
            }

            /// Length in bytes
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Whether the container is empty
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_base64())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_base64(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

base64_newtype! {
    /// A DER-encoded X.509 certificate
    DerCertificate
}

base64_newtype! {
    /// A DER-encoded SubjectPublicKeyInfo
    DerPublicKey
}

base64_newtype! {
    /// Raw signature bytes
    SignatureBytes
}
