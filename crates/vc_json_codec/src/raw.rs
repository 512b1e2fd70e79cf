use vc_json_reflect::derive::Reflect;

use crate::codec::{MarshalCustom, TypeTraitMarshal, TypeTraitUnmarshal, UnmarshalCustom};
use crate::{Decoder, Error, Session, UnmarshalSession};

/// A pre-encoded JSON value, written verbatim.
///
/// Empty bytes are written as `null`. Decoding keeps the raw bytes of one value.
///
/// ```
/// use vc_json_codec::{IOConfig, Marshaller, Options, RawJson};
///
/// let marshaller = Marshaller::new(IOConfig::new());
/// let raw = RawJson(br#"{"cached":true}"#.to_vec());
///
/// assert_eq!(marshaller.marshal(&raw, &Options::new()).unwrap(), br#"{"cached":true}"#);
///
/// let mut decoded = RawJson::default();
/// marshaller.unmarshal(b" [1, 2] ", &mut decoded, &Options::new()).unwrap();
/// assert_eq!(decoded.0, b"[1, 2]");
/// ```
#[derive(Reflect, Debug, Clone, Default, PartialEq, Eq)]
#[reflect(opaque, partial_eq, type_trait(TypeTraitMarshal, TypeTraitUnmarshal))]
pub struct RawJson(pub Vec<u8>);

impl MarshalCustom for RawJson {
    fn marshal_json(&self, session: &mut Session<'_>) -> Result<(), Error> {
        if self.0.is_empty() {
            session.buffer().extend_from_slice(b"null");
        } else {
            session.buffer().extend_from_slice(&self.0);
        }
        Ok(())
    }
}

impl UnmarshalCustom for RawJson {
    fn unmarshal_json(
        &mut self,
        decoder: &mut Decoder<'_>,
        _: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        self.0 = decoder.skip_value()?.to_vec();
        Ok(())
    }
}
