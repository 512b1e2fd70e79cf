use core::any::TypeId;

use vc_json_reflect::Reflect;

use crate::codec::{Codec, CodecRef, FieldPath};
use crate::{Decoder, Error, Session, UnmarshalSession};

/// The codec of a struct replaced by its inline field.
///
/// The field's own JSON form stands for the whole struct, e.g. a [`RawJson`]
/// spliced verbatim.
///
/// [`RawJson`]: crate::RawJson
pub(crate) struct InlineCodec {
    type_id: TypeId,
    type_path: &'static str,
    field: FieldPath,
    codec: CodecRef,
}

impl InlineCodec {
    pub fn new(type_id: TypeId, type_path: &'static str, field: FieldPath, codec: CodecRef) -> Self {
        Self {
            type_id,
            type_path,
            field,
            codec,
        }
    }
}

impl Codec for InlineCodec {
    fn encode(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
        if value.ty_id() != self.type_id {
            return Err(Error::mismatch(self.type_path, value.reflect_type_info().type_path()));
        }
        match self.field.get(value)? {
            Some(field) => self.codec.encode(field, session),
            None => {
                session.buffer().extend_from_slice(b"null");
                Ok(())
            }
        }
    }

    fn decode(
        &self,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        session: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        if value.ty_id() != self.type_id {
            return Err(Error::mismatch(self.type_path, value.reflect_type_info().type_path()));
        }
        let field = self.field.get_mut(value)?;
        self.codec.decode(field, decoder, session)
    }
}
