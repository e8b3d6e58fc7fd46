//! Counted lists (TPML types).
//!
//! On the wire a list is a u32 element count followed by that many encoded
//! elements. The backing capacity is a type-level constant; a count that
//! exceeds it is `Insufficient` on both encode and decode.

use crate::error::{TpmError, TpmResult};
use crate::marshal::WireType;
use crate::types::base::{TpmAlgId, TpmCc, TpmHandle, TpmaCc};
use crate::types::buffers::Tpm2bDigest;
use crate::types::constants::*;
use crate::types::structures::{TpmsAlgProperty, TpmsPcrSelection, TpmsTaggedProperty, TpmtHa};

macro_rules! tpm_list {
    ($(#[$meta:meta])* $name:ident, $field:ident : $elem:ty, $cap:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            pub count: u32,
            pub $field: [$elem; $cap],
        }

        impl $name {
            pub const CAPACITY: usize = $cap;

            /// Builds the list from a slice; fails when the slice exceeds
            /// the backing capacity.
            pub fn from_slice(entries: &[$elem]) -> TpmResult<Self> {
                if entries.len() > $cap {
                    return Err(TpmError::Insufficient);
                }
                let mut list = Self::default();
                list.count = entries.len() as u32;
                list.$field[..entries.len()].clone_from_slice(entries);
                Ok(list)
            }

            /// The first `count` elements.
            pub fn entries(&self) -> &[$elem] {
                &self.$field[..($cap).min(self.count as usize)]
            }

            pub fn is_empty(&self) -> bool {
                self.count == 0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    count: 0,
                    $field: core::array::from_fn(|_| Default::default()),
                }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.entries() == other.entries()
            }
        }

        impl Eq for $name {}

        impl WireType for $name {
            fn serialize(&self, out: &mut Vec<u8>) -> TpmResult<()> {
                if self.count as usize > $cap {
                    return Err(TpmError::Insufficient);
                }
                self.count.serialize(out)?;
                for entry in self.entries() {
                    entry.serialize(out)?;
                }
                Ok(())
            }

            fn parse(buffer: &mut &[u8], mut value_bytes: Option<&mut Vec<u8>>) -> TpmResult<Self> {
                let mut cursor = *buffer;
                let mut raw = Vec::new();
                let count = u32::parse(&mut cursor, Some(&mut raw))?;
                if count as usize > $cap {
                    return Err(TpmError::Insufficient);
                }
                let mut list = Self::default();
                list.count = count;
                for slot in list.$field.iter_mut().take(count as usize) {
                    *slot = <$elem>::parse(&mut cursor, Some(&mut raw))?;
                }
                if let Some(raw_out) = value_bytes.as_deref_mut() {
                    raw_out.extend_from_slice(&raw);
                }
                *buffer = cursor;
                Ok(list)
            }
        }
    };
}

tpm_list! {
    /// List of digests, e.g. PCR values or policy digest branches.
    TpmlDigest, digests: Tpm2bDigest, 8
}
tpm_list! {
    /// One hash-tagged digest per bank.
    TpmlDigestValues, digests: TpmtHa, HASH_COUNT
}
tpm_list! {
    /// One PCR selection per bank.
    TpmlPcrSelection, pcr_selections: TpmsPcrSelection, HASH_COUNT
}
tpm_list! {
    /// List of algorithm identifiers.
    TpmlAlg, algorithms: TpmAlgId, MAX_ALG_LIST_SIZE
}
tpm_list! {
    /// List of handles from a capability query.
    TpmlHandle, handle: TpmHandle, MAX_CAP_HANDLES
}
tpm_list! {
    /// List of command codes.
    TpmlCc, command_codes: TpmCc, MAX_CAP_CC
}
tpm_list! {
    /// List of command attribute words.
    TpmlCca, command_attributes: TpmaCc, MAX_CAP_CC
}
tpm_list! {
    /// List of algorithm properties.
    TpmlAlgProperty, alg_properties: TpmsAlgProperty, MAX_CAP_ALGS
}
tpm_list! {
    /// List of tagged TPM properties.
    TpmlTaggedTpmProperty, tpm_property: TpmsTaggedProperty, MAX_TPM_PROPERTIES
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_list_wire_form() {
        let list = TpmlAlg::from_slice(&[TPM2_ALG_SHA256, TPM2_ALG_SHA1]).expect("list");
        assert_eq!(
            list.to_wire().expect("serialize"),
            hex!("00000002 000B 0004")
        );
    }

    #[test]
    fn test_list_round_trip_with_raw_capture() {
        let list = TpmlDigest::from_slice(&[
            Tpm2bDigest::from_bytes(&[1u8; 20]).expect("digest"),
            Tpm2bDigest::from_bytes(&[2u8; 32]).expect("digest"),
        ])
        .expect("list");
        let wire = list.to_wire().expect("serialize");
        let mut buffer: &[u8] = &wire;
        let mut raw = Vec::new();
        let parsed = TpmlDigest::parse(&mut buffer, Some(&mut raw)).expect("parse");
        assert_eq!(parsed, list);
        assert_eq!(raw, wire);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_count_above_capacity_rejected() {
        let wire = hex!("00000009 000B");
        let mut buffer: &[u8] = &wire;
        assert_eq!(
            TpmlDigest::parse(&mut buffer, None),
            Err(TpmError::Insufficient)
        );
        assert_eq!(buffer.len(), wire.len());

        let selections = [TpmsPcrSelection::default(); HASH_COUNT + 1];
        assert_eq!(
            TpmlPcrSelection::from_slice(&selections),
            Err(TpmError::Insufficient)
        );
    }

    #[test]
    fn test_truncated_element_is_insufficient() {
        // Count of two but only one whole handle present.
        let wire = hex!("00000002 81000001 8100");
        let mut buffer: &[u8] = &wire;
        assert_eq!(
            TpmlHandle::parse(&mut buffer, None),
            Err(TpmError::Insufficient)
        );
    }

    #[test]
    fn test_empty_list_round_trip() {
        let empty = TpmlCc::default();
        let wire = empty.to_wire().expect("serialize");
        assert_eq!(wire, hex!("00000000"));
        let mut buffer: &[u8] = &wire;
        assert_eq!(TpmlCc::parse(&mut buffer, None).expect("parse"), empty);
    }
}
