//! ASN.1 framing for SM2 ciphertexts.

use alloc::vec::Vec;
use der::{
    asn1::{OctetStringRef, UintRef},
    Decode, DecodeValue, Encode, EncodeValue, Header, Length, Reader, Sequence, Writer,
};
use elliptic_curve::{sec1::FromEncodedPoint, Error, Result};

use super::{Cipher, Mode, COORDINATE_SIZE, DIGEST_SIZE};
use crate::{codec, AffinePoint, EncodedPoint, FieldBytes, Hash};

/// `SEQUENCE { INTEGER x1, INTEGER y1, OCTET STRING, OCTET STRING }`.
///
/// Which octet string is `C3` and which is `C2` depends on the [`Mode`];
/// the structure itself is order-agnostic.
struct CipherRef<'a> {
    x: UintRef<'a>,
    y: UintRef<'a>,
    first: OctetStringRef<'a>,
    second: OctetStringRef<'a>,
}

impl EncodeValue for CipherRef<'_> {
    fn value_len(&self) -> der::Result<Length> {
        let len = (self.x.encoded_len()? + self.y.encoded_len()?)?;
        let len = (len + self.first.encoded_len()?)?;
        len + self.second.encoded_len()?
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        self.x.encode(writer)?;
        self.y.encode(writer)?;
        self.first.encode(writer)?;
        self.second.encode(writer)
    }
}

impl<'a> DecodeValue<'a> for CipherRef<'a> {
    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: Header) -> der::Result<Self> {
        Ok(Self {
            x: UintRef::decode(reader)?,
            y: UintRef::decode(reader)?,
            first: OctetStringRef::decode(reader)?,
            second: OctetStringRef::decode(reader)?,
        })
    }
}

impl<'a> Sequence<'a> for CipherRef<'a> {}

pub(super) fn encode(cipher: &Cipher, mode: Mode) -> Result<Vec<u8>> {
    let (x, y) = codec::coordinates(cipher.c1())?;
    let (first, second) = match mode {
        Mode::C1C3C2 => (cipher.c3().as_slice(), cipher.c2()),
        Mode::C1C2C3 => (cipher.c2(), cipher.c3().as_slice()),
    };

    let sequence = CipherRef {
        x: UintRef::new(x.as_slice()).map_err(|_| Error)?,
        y: UintRef::new(y.as_slice()).map_err(|_| Error)?,
        first: OctetStringRef::new(first).map_err(|_| Error)?,
        second: OctetStringRef::new(second).map_err(|_| Error)?,
    };

    sequence.to_der().map_err(|_| Error)
}

pub(super) fn decode(cipher: &[u8], mode: Mode) -> Result<Cipher> {
    let parsed = CipherRef::from_der(cipher).map_err(|_| Error)?;

    let x = left_pad(parsed.x.as_bytes())?;
    let y = left_pad(parsed.y.as_bytes())?;
    let encoded = EncodedPoint::from_affine_coordinates(&x, &y, false);
    let c1 = Option::from(AffinePoint::from_encoded_point(&encoded)).ok_or(Error)?;

    let (c3_bytes, c2) = match mode {
        Mode::C1C3C2 => (parsed.first.as_bytes(), parsed.second.as_bytes()),
        Mode::C1C2C3 => (parsed.second.as_bytes(), parsed.first.as_bytes()),
    };
    if c3_bytes.len() != DIGEST_SIZE {
        return Err(Error);
    }

    let mut c3 = Hash::default();
    c3.copy_from_slice(c3_bytes);

    Ok(Cipher {
        c1,
        c2: c2.to_vec(),
        c3,
    })
}

/// Re-pad a DER integer (minimal two's-complement, leading zeros trimmed)
/// back to a fixed-width coordinate.
fn left_pad(bytes: &[u8]) -> Result<FieldBytes> {
    if bytes.len() > COORDINATE_SIZE {
        return Err(Error);
    }
    let mut out = FieldBytes::default();
    out[COORDINATE_SIZE - bytes.len()..].copy_from_slice(bytes);
    Ok(out)
}
