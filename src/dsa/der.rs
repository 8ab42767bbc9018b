//! ASN.1 DER framing for SM2 signatures.

use alloc::vec::Vec;
use der::{
    asn1::UintRef, Decode, DecodeValue, Encode, EncodeValue, Header, Length, Reader, Sequence,
    Writer,
};
use signature::{Error, Result};

use super::Signature;
use crate::FieldBytes;

/// `SEQUENCE { INTEGER r, INTEGER s }`.
struct SignatureRef<'a> {
    r: UintRef<'a>,
    s: UintRef<'a>,
}

impl EncodeValue for SignatureRef<'_> {
    fn value_len(&self) -> der::Result<Length> {
        self.r.encoded_len()? + self.s.encoded_len()?
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        self.r.encode(writer)?;
        self.s.encode(writer)
    }
}

impl<'a> DecodeValue<'a> for SignatureRef<'a> {
    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: Header) -> der::Result<Self> {
        Ok(Self {
            r: UintRef::decode(reader)?,
            s: UintRef::decode(reader)?,
        })
    }
}

impl<'a> Sequence<'a> for SignatureRef<'a> {}

pub(super) fn encode(signature: &Signature) -> Result<Vec<u8>> {
    let r = signature.r_bytes();
    let s = signature.s_bytes();

    let sequence = SignatureRef {
        r: UintRef::new(r.as_slice()).map_err(|_| Error::new())?,
        s: UintRef::new(s.as_slice()).map_err(|_| Error::new())?,
    };

    sequence.to_der().map_err(|_| Error::new())
}

pub(super) fn decode(input: &[u8]) -> Result<Signature> {
    let SignatureRef { r, s } = SignatureRef::from_der(input).map_err(|_| Error::new())?;
    Signature::from_scalars(left_pad(r.as_bytes())?, left_pad(s.as_bytes())?)
}

/// Re-pad a DER integer (leading zeros trimmed) to scalar width.
fn left_pad(bytes: &[u8]) -> Result<FieldBytes> {
    let mut out = FieldBytes::default();
    let offset = out.len().checked_sub(bytes.len()).ok_or_else(Error::new)?;
    out[offset..].copy_from_slice(bytes);
    Ok(out)
}
