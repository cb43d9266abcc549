//! Helper structures for testing, such as fields

use crate::schema::{KeyDecoder, KeyEncoder, ValueCodec};
use crate::{CodecError, Schema, SeekKeyEncoder};

#[derive(Debug, Eq, PartialEq, Clone)]
/// Key composed of a pair of u32, e.g. `(election, candidate)`
pub struct TestCompositeField(pub u32, pub u32);

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
/// Simple value around u32
pub struct TestField(pub u32);

fn read_u32(data: &[u8], offset: usize) -> Result<u32, CodecError> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or(CodecError::InvalidKeyLength {
            expected: offset + 4,
            got: data.len(),
        })?;
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    Ok(u32::from_be_bytes(buf))
}

impl<S: Schema> KeyEncoder<S> for TestCompositeField {
    fn encode_key(&self) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::with_capacity(8);
        bytes.extend_from_slice(&self.0.to_be_bytes());
        bytes.extend_from_slice(&self.1.to_be_bytes());
        Ok(bytes)
    }
}

impl<S: Schema> KeyDecoder<S> for TestCompositeField {
    fn decode_key(data: &[u8]) -> Result<Self, CodecError> {
        Ok(TestCompositeField(read_u32(data, 0)?, read_u32(data, 4)?))
    }
}

impl<S: Schema> SeekKeyEncoder<S> for TestCompositeField {
    fn encode_seek_key(&self) -> crate::schema::Result<Vec<u8>> {
        <TestCompositeField as KeyEncoder<S>>::encode_key(self)
    }
}

impl<S: Schema> ValueCodec<S> for TestField {
    fn encode_value(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.0.to_be_bytes().to_vec())
    }

    fn decode_value(data: &[u8]) -> Result<Self, CodecError> {
        Ok(TestField(read_u32(data, 0)?))
    }
}

impl<S: Schema> KeyDecoder<S> for TestField {
    fn decode_key(data: &[u8]) -> Result<Self, CodecError> {
        Ok(TestField(read_u32(data, 0)?))
    }
}

impl<S: Schema> KeyEncoder<S> for TestField {
    fn encode_key(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.0.to_be_bytes().to_vec())
    }
}

impl<S: Schema> SeekKeyEncoder<S> for TestField {
    fn encode_seek_key(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.0.to_be_bytes().to_vec())
    }
}

/// KeyPrefix over the first u32 of a [`TestCompositeField`]
pub struct KeyPrefix1(pub u32);

impl<S: Schema> SeekKeyEncoder<S> for KeyPrefix1 {
    fn encode_seek_key(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.0.to_be_bytes().to_vec())
    }
}
