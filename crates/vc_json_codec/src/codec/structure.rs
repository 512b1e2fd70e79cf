use core::any::TypeId;
use std::sync::Arc;

use fixedbitset::FixedBitSet;
use foldhash::fast::FixedState;
use hashbrown::HashMap;
use vc_json_reflect::Reflect;
use vc_json_reflect::info::{StructInfo, TypeInfo};
use vc_json_reflect::ops::{ReflectMut, ReflectRef};

use crate::cache::Cache;
use crate::codec::inline::InlineCodec;
use crate::codec::{self, Codec, CodecRef};
use crate::presence::PresenceTracker;
use crate::session::join_path;
use crate::tag::{FieldFlags, FieldTag};
use crate::{DecodeError, Decoder, Error, Session, UnmarshalSession, writer};

/// Embedded structs nested deeper than this are rejected.
const MAX_EMBED_DEPTH: usize = 32;

// -----------------------------------------------------------------------------
// FieldPath

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hop {
    /// A field holding its value.
    Value(usize),
    /// A field holding an embedded struct behind `layers` pointers,
    /// e.g. two for `Option<Box<T>>`.
    Pointer { index: usize, layers: usize },
}

impl Hop {
    #[inline]
    fn index(self) -> usize {
        match self {
            Hop::Value(index) | Hop::Pointer { index, .. } => index,
        }
    }

    #[inline]
    fn layers(self) -> usize {
        match self {
            Hop::Value(_) => 0,
            Hop::Pointer { layers, .. } => layers,
        }
    }
}

/// The field indices leading from a struct to one of its, possibly flattened, fields.
///
/// An absent embedded pointer on the way makes the field absent on encode, and is
/// allocated on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FieldPath {
    hops: Box<[Hop]>,
}

impl FieldPath {
    fn new(prefix: &[Hop], last: Hop) -> Self {
        let mut hops = Vec::with_capacity(prefix.len() + 1);
        hops.extend_from_slice(prefix);
        hops.push(last);
        Self { hops: hops.into() }
    }

    /// The direct field at `index`.
    #[cfg(test)]
    pub fn field(index: usize) -> Self {
        Self::new(&[], Hop::Value(index))
    }

    /// Returns the field of `value`, `None` if an embedded pointer is absent.
    pub fn get<'v>(&self, value: &'v dyn Reflect) -> Result<Option<&'v dyn Reflect>, Error> {
        let mut current = value;
        for &hop in &self.hops {
            let ReflectRef::Struct(node) = current.reflect_ref() else {
                return Err(Error::mismatch("struct", current.reflect_type_info().type_path()));
            };
            let Some(field) = node.field_at(hop.index()) else {
                return Err(missing_field(current, hop.index()));
            };
            current = field;
            for _ in 0..hop.layers() {
                let ReflectRef::Pointer(pointer) = current.reflect_ref() else {
                    return Err(Error::mismatch(
                        "pointer",
                        current.reflect_type_info().type_path(),
                    ));
                };
                match pointer.target() {
                    Some(target) => current = target,
                    None => return Ok(None),
                }
            }
        }
        Ok(Some(current))
    }

    /// Returns the field of `value`, allocating absent embedded pointers.
    pub fn get_mut<'v>(&self, value: &'v mut dyn Reflect) -> Result<&'v mut dyn Reflect, Error> {
        let mut current = value;
        for &hop in &self.hops {
            let node = current;
            let type_path = node.reflect_type_info().type_path();
            let ReflectMut::Struct(node) = node.reflect_mut() else {
                return Err(Error::mismatch("struct", type_path));
            };
            let Some(field) = node.field_at_mut(hop.index()) else {
                return Err(Error::encode(
                    type_path,
                    format_args!("no field at index {}", hop.index()),
                ));
            };
            current = field;
            for _ in 0..hop.layers() {
                let node = current;
                let pointer_path = node.reflect_type_info().type_path();
                let ReflectMut::Pointer(pointer) = node.reflect_mut() else {
                    return Err(Error::mismatch("pointer", pointer_path));
                };
                current = pointer.target_or_default();
            }
        }
        Ok(current)
    }
}

fn missing_field(value: &dyn Reflect, index: usize) -> Error {
    Error::encode(
        value.reflect_type_info().type_path(),
        format_args!("no field at index {index}"),
    )
}

// -----------------------------------------------------------------------------
// FieldDescriptor

/// One encoded field of a struct.
struct FieldDescriptor {
    /// Source field name.
    name: &'static str,
    out_name: Box<str>,
    /// `"out_name":`, escaped.
    key: Box<[u8]>,
    path: FieldPath,
    flags: FieldFlags,
    info: &'static TypeInfo,
    codec: CodecRef,
}

impl FieldDescriptor {
    #[inline]
    fn has(&self, flag: FieldFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Returns `true` if the value is skipped by `omitempty`.
    fn is_empty(&self, value: &dyn Reflect) -> bool {
        match value.reflect_ref() {
            ReflectRef::Pointer(pointer) => pointer.target().is_none(),
            ReflectRef::List(list) => list.is_empty(),
            ReflectRef::Array(array) => array.is_empty(),
            ReflectRef::Map(map) => map.is_empty(),
            ReflectRef::Dynamic(dynamic) => dynamic
                .inner()
                .downcast_ref::<serde_json::Value>()
                .is_some_and(serde_json::Value::is_null),
            ReflectRef::Struct(_) | ReflectRef::Scalar(_) | ReflectRef::Opaque(_) => {
                self.info.is_zero(value).unwrap_or(false)
            }
        }
    }
}

// -----------------------------------------------------------------------------
// StructCodec

/// The codec of a struct with named fields, written as a JSON object.
///
/// Fields are written in declaration order, embedded structs flattened in place.
/// Of flattened fields sharing an output name, the shallowest, then the first
/// declared, is kept.
/// Decoding matches keys exactly first, then case-insensitively, and skips unknown keys.
struct StructCodec {
    type_id: TypeId,
    type_path: &'static str,
    fields: Box<[FieldDescriptor]>,
    index: HashMap<Box<str>, usize, FixedState>,
    presence: Option<PresenceTracker>,
    has_required: bool,
}

impl StructCodec {
    fn lookup(&self, key: &str) -> Option<usize> {
        match self.index.get(key) {
            Some(&index) => Some(index),
            None => self.index.get(key.to_lowercase().as_str()).copied(),
        }
    }

    fn decode_field(
        &self,
        field: &FieldDescriptor,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        session: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        let slot = field.path.get_mut(value)?;
        let mark = session.enter(&field.out_name);
        let result = match session.options().unmarshal_interceptor(session.path()) {
            Some(interceptor) => {
                interceptor(slot, decoder, session.options()).map_err(|source| {
                    Error::Interceptor {
                        path: session.path().to_owned(),
                        source,
                    }
                })
            }
            None => field.codec.decode(slot, decoder, session),
        };
        session.leave(mark);
        result
    }
}

impl Codec for StructCodec {
    fn encode(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
        if value.ty_id() != self.type_id {
            return Err(Error::mismatch(self.type_path, value.reflect_type_info().type_path()));
        }
        let filter = session.options().filter(session.path());

        session.buffer().push(b'{');
        let mut first = true;
        for field in &self.fields {
            if filter.is_some_and(|f| !f.allows(&field.out_name, field.name)) {
                continue;
            }
            let Some(field_value) = field.path.get(value)? else {
                continue;
            };
            if field.has(FieldFlags::OMIT_EMPTY) && field.is_empty(field_value) {
                continue;
            }

            if !first {
                session.buffer().push(b',');
            }
            first = false;
            session.buffer().extend_from_slice(&field.key);

            let mark = session.enter(&field.out_name);
            let result = match session.options().marshal_interceptor(session.path()) {
                Some(interceptor) => match interceptor(session.options()) {
                    Ok(bytes) => {
                        session.buffer().extend_from_slice(&bytes);
                        Ok(())
                    }
                    Err(source) => Err(Error::Interceptor {
                        path: session.path().to_owned(),
                        source,
                    }),
                },
                None => field.codec.encode(field_value, session),
            };
            session.leave(mark);
            result?;
        }
        session.buffer().push(b'}');
        Ok(())
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
        if decoder.try_null()? {
            return Ok(());
        }
        decoder.begin_object()?;
        if let Some(presence) = &self.presence {
            presence.ensure(value)?;
        }

        let tracked = if self.has_required { self.fields.len() } else { 0 };
        let mut seen = FixedBitSet::with_capacity(tracked);
        let mut first = true;
        while let Some(key) = decoder.next_key(first)? {
            first = false;
            let Some(index) = self.lookup(&key) else {
                decoder.skip_value()?;
                continue;
            };
            let field = &self.fields[index];
            self.decode_field(field, value, decoder, session)
                .map_err(|err| DecodeError::wrap(&field.out_name, err))?;
            if let Some(presence) = &self.presence {
                presence.mark(value, index)?;
            }
            if self.has_required {
                seen.insert(index);
            }
        }

        if self.has_required {
            let missing = self
                .fields
                .iter()
                .enumerate()
                .find(|(index, field)| field.has(FieldFlags::REQUIRED) && !seen.contains(*index));
            if let Some((_, field)) = missing {
                let cause = decoder.error("required field is missing");
                return Err(DecodeError::wrap(&field.out_name, cause).into());
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Builder

/// A field found while walking a struct and its embedded structs.
struct Collected {
    depth: usize,
    descriptor: FieldDescriptor,
}

struct Collector<'a> {
    cache: &'a Cache,
    /// Construction path of the struct.
    path: &'a str,
    type_path: &'static str,
    fields: Vec<Collected>,
    marker: Option<(FieldPath, &'static TypeInfo)>,
    inline: Option<(FieldPath, CodecRef)>,
}

impl Collector<'_> {
    fn collect(
        &mut self,
        info: &'static StructInfo,
        prefix: &[Hop],
        depth: usize,
    ) -> Result<(), Error> {
        if depth > MAX_EMBED_DEPTH {
            return Err(Error::construction(
                self.type_path,
                format_args!("embedded structs nest deeper than {MAX_EMBED_DEPTH}"),
            ));
        }
        let config = self.cache.config();

        for field in info.fields() {
            let Some(tag) = FieldTag::parse(field, config)? else {
                continue;
            };
            let field_path = join_path(self.path, &tag.name);
            if config.is_excluded(&field_path) {
                continue;
            }
            let index = field.index();

            if tag.is_flattened() {
                let (embedded, layers) = embedded_struct(field.type_info()).ok_or_else(|| {
                    Error::construction(
                        self.type_path,
                        format_args!(
                            "embedded field `{}` of type `{}` is not a struct",
                            field.name(),
                            field.type_info().type_path(),
                        ),
                    )
                })?;
                let mut hops = prefix.to_vec();
                hops.push(match layers {
                    0 => Hop::Value(index),
                    layers => Hop::Pointer { index, layers },
                });
                self.collect(embedded, &hops, depth + 1)?;
                continue;
            }

            let path = FieldPath::new(prefix, Hop::Value(index));

            if tag.has(FieldFlags::INLINE) {
                if self.inline.is_some() {
                    return Err(Error::construction(self.type_path, "more than one inline field"));
                }
                let codec = codec::build_field(self.cache, field.type_info(), self.path, &tag)?;
                self.inline = Some((path, codec));
                continue;
            }

            if tag.has(FieldFlags::MARKER) {
                if self.marker.is_some() {
                    return Err(Error::construction(
                        self.type_path,
                        "more than one presence marker field",
                    ));
                }
                self.marker = Some((path.clone(), field.type_info()));
            }

            let codec = codec::build_field(self.cache, field.type_info(), &field_path, &tag)?;
            let mut key = Vec::with_capacity(tag.name.len() + 3);
            writer::write_str(&mut key, &tag.name);
            key.push(b':');

            self.push(Collected {
                depth,
                descriptor: FieldDescriptor {
                    name: field.name(),
                    out_name: tag.name.into(),
                    key: key.into(),
                    path,
                    flags: tag.flags,
                    info: field.type_info(),
                    codec,
                },
            });
        }
        Ok(())
    }

    /// Adds a field unless a field of the same output name shadows it.
    ///
    /// The shallowest field wins. At equal depth the field declared first wins
    /// and the later one is dropped, the name never disappears from the output.
    fn push(&mut self, field: Collected) {
        let name = &field.descriptor.out_name;
        match self.fields.iter().position(|f| f.descriptor.out_name == *name) {
            Some(existing) if self.fields[existing].depth > field.depth => {
                self.fields.remove(existing);
                self.fields.push(field);
            }
            Some(_) => {}
            None => self.fields.push(field),
        }
    }
}

/// The struct behind an embedded field and the number of pointers leading to it.
fn embedded_struct(mut info: &'static TypeInfo) -> Option<(&'static StructInfo, usize)> {
    let mut layers = 0;
    loop {
        match info {
            TypeInfo::Struct(embedded) => return Some((embedded, layers)),
            TypeInfo::Pointer(pointer) => {
                info = pointer.target_info();
                layers += 1;
            }
            _ => return None,
        }
    }
}

/// Builds the codec of a struct.
///
/// A struct with an inline field becomes that field's codec.
pub(crate) fn build(
    cache: &Cache,
    info: &'static StructInfo,
    path: &str,
) -> Result<CodecRef, Error> {
    let type_path = info.ty().path();
    let mut collector = Collector {
        cache,
        path,
        type_path,
        fields: Vec::new(),
        marker: None,
        inline: None,
    };
    collector.collect(info, &[], 0)?;

    if let Some((path, codec)) = collector.inline {
        return Ok(Arc::new(InlineCodec::new(info.ty().id(), type_path, path, codec)));
    }

    let fields: Box<[FieldDescriptor]> =
        collector.fields.into_iter().map(|f| f.descriptor).collect();

    let mut index = HashMap::with_capacity_and_hasher(fields.len() * 2, FixedState::default());
    for (i, field) in fields.iter().enumerate() {
        index.insert(field.out_name.clone(), i);
    }
    for (i, field) in fields.iter().enumerate() {
        let lower = field.out_name.to_lowercase();
        index.entry(lower.into_boxed_str()).or_insert(i);
    }

    let presence = match collector.marker {
        Some((marker, marker_info)) => Some(PresenceTracker::build(
            type_path,
            marker,
            marker_info,
            fields.iter().map(|f| f.name),
        )?),
        None => None,
    };

    Ok(Arc::new(StructCodec {
        type_id: info.ty().id(),
        type_path,
        has_required: fields.iter().any(|f| f.has(FieldFlags::REQUIRED)),
        fields,
        index,
        presence,
    }))
}

// -----------------------------------------------------------------------------
// Tests
