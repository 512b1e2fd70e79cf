//! Presence markers: which keys an object actually carried.
//!
//! A struct may declare one marker field, a struct of `bool`s named after its
//! sibling fields. Decoding sets the `bool` of every sibling found in the input,
//! so an omitted field can be told apart from one explicitly set to its zero value.

use vc_json_reflect::Reflect;
use vc_json_reflect::info::{StructInfo, TypeInfo};
use vc_json_reflect::ops::ReflectMut;

use crate::Error;
use crate::codec::FieldPath;

/// Sets marker flags while a struct is decoded.
pub(crate) struct PresenceTracker {
    marker: FieldPath,
    /// Marker field index of each decoded field, `None` if the marker has none.
    slots: Box<[Option<usize>]>,
}

impl PresenceTracker {
    /// Builds the tracker of a marker field of type `info`, reachable through `marker`.
    ///
    /// `names` are the source names of the owning struct's fields, in decode order.
    /// Flags are matched by exact name first, then case-insensitively; fields
    /// without a flag are not tracked.
    pub fn build<'a>(
        owner: &'static str,
        marker: FieldPath,
        info: &'static TypeInfo,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, Error> {
        let flags = marker_struct(info).ok_or_else(|| {
            Error::construction(
                owner,
                format_args!("marker `{}` is not a struct", info.type_path()),
            )
        })?;
        if let Some(field) = flags.fields().iter().find(|f| !f.type_is::<bool>()) {
            return Err(Error::construction(
                owner,
                format_args!(
                    "marker field `{}::{}` is not a `bool`",
                    info.type_path(),
                    field.name(),
                ),
            ));
        }

        let slots = names
            .into_iter()
            .map(|name| {
                flags
                    .index_of(name)
                    .or_else(|| {
                        flags
                            .fields()
                            .iter()
                            .position(|f| f.name().eq_ignore_ascii_case(name))
                    })
            })
            .collect();
        Ok(Self { marker, slots })
    }

    /// Allocates the marker of `value` if absent.
    pub fn ensure(&self, value: &mut dyn Reflect) -> Result<(), Error> {
        self.flags(value).map(|_| ())
    }

    /// Records that field `index` of `value` was present.
    pub fn mark(&self, value: &mut dyn Reflect, index: usize) -> Result<(), Error> {
        let Some(Some(slot)) = self.slots.get(index).copied() else {
            return Ok(());
        };
        let flags = self.flags(value)?;
        let type_path = flags.reflect_type_info().type_path();
        let ReflectMut::Struct(flags) = flags.reflect_mut() else {
            return Err(Error::mismatch("struct", type_path));
        };
        if let Some(flag) = flags.field_at_mut(slot).and_then(|f| f.downcast_mut::<bool>()) {
            *flag = true;
        }
        Ok(())
    }

    // The marker struct itself, behind its pointer if any.
    fn flags<'v>(&self, value: &'v mut dyn Reflect) -> Result<&'v mut dyn Reflect, Error> {
        let marker = self.marker.get_mut(value)?;
        if !matches!(marker.reflect_type_info(), TypeInfo::Pointer(_)) {
            return Ok(marker);
        }
        let type_path = marker.reflect_type_info().type_path();
        match marker.reflect_mut() {
            ReflectMut::Pointer(pointer) => Ok(pointer.target_or_default()),
            _ => Err(Error::mismatch("pointer", type_path)),
        }
    }
}

fn marker_struct(info: &'static TypeInfo) -> Option<&'static StructInfo> {
    match info {
        TypeInfo::Struct(flags) => Some(flags),
        TypeInfo::Pointer(pointer) => pointer.target_info().as_struct().ok(),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use vc_json_reflect::Typed;
    use vc_json_reflect::derive::Reflect;

    use super::PresenceTracker;
    use crate::Error;
    use crate::codec::FieldPath;

    #[derive(Reflect, Default)]
    struct Has {
        id: bool,
        name: bool,
    }

    #[derive(Reflect, Default)]
    struct Row {
        id: i32,
        name: String,
        age: u8,
        has: Option<Has>,
    }

    #[derive(Reflect, Default)]
    struct NotFlags {
        id: i32,
    }

    #[test]
    fn marks_matching_fields() {
        let tracker = PresenceTracker::build(
            "Row",
            FieldPath::field(3),
            <Option<Has>>::type_info(),
            ["id", "Name", "age"],
        )
        .unwrap();

        let mut row = Row::default();
        tracker.ensure(&mut row).unwrap();
        assert!(row.has.as_ref().is_some_and(|has| !has.id && !has.name));

        tracker.mark(&mut row, 1).unwrap();
        // `age` has no flag
        tracker.mark(&mut row, 2).unwrap();
        let has = row.has.unwrap();
        assert!(!has.id);
        assert!(has.name);
    }

    #[test]
    fn rejects_non_bool_flags() {
        let err = PresenceTracker::build(
            "Row",
            FieldPath::field(3),
            NotFlags::type_info(),
            ["id"],
        );
        assert!(matches!(err, Err(Error::Construction { type_path: "Row", .. })));

        let err = PresenceTracker::build("Row", FieldPath::field(0), i32::type_info(), ["id"]);
        assert!(matches!(err, Err(Error::Construction { .. })));
    }
}
