use log::debug;
use vc_json_reflect::Reflect;

use crate::cache::Cache;
use crate::pool::BufferPool;
use crate::{Decoder, Error, IOConfig, Options, Session, UnmarshalSession};

/// The entry point: encodes and decodes reflected values.
///
/// A marshaller owns the codecs built for its [`IOConfig`] and a pool of output
/// buffers. It is meant to be shared, e.g. behind an `Arc`, across threads.
///
/// # Examples
///
/// ```
/// use vc_json_codec::{CaseFormat, IOConfig, Marshaller, Options};
/// use vc_json_reflect::derive::Reflect;
///
/// #[derive(Reflect, Default, Debug, PartialEq)]
/// struct User {
///     id: i64,
///     #[tag(json = "mail,omitempty")]
///     email: String,
///     nick_name: Option<String>,
/// }
///
/// let marshaller = Marshaller::new(IOConfig::new().with_case_format(CaseFormat::LowerCamel));
/// let user = User { id: 7, email: String::new(), nick_name: None };
///
/// let json = marshaller.marshal(&user, &Options::new()).unwrap();
/// assert_eq!(json, br#"{"id":7,"nickName":null}"#);
///
/// let mut decoded = User::default();
/// marshaller
///     .unmarshal(br#"{"id":7,"mail":"a@b.c"}"#, &mut decoded, &Options::new())
///     .unwrap();
/// assert_eq!(decoded.email, "a@b.c");
/// ```
pub struct Marshaller {
    cache: Cache,
    pool: BufferPool,
}

impl Default for Marshaller {
    fn default() -> Self {
        Self::new(IOConfig::new())
    }
}

impl Marshaller {
    /// Creates a marshaller rendering with `config`.
    pub fn new(config: IOConfig) -> Self {
        Self {
            cache: Cache::new(config),
            pool: BufferPool::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &IOConfig {
        self.cache.config()
    }

    /// Encodes `value` into a new buffer.
    ///
    /// An absent `Option` encodes as `null`.
    pub fn marshal(&self, value: &dyn Reflect, options: &Options) -> Result<Vec<u8>, Error> {
        let mut buf = self.pool.acquire();
        let result = self.encode(value, &mut buf, options).map(|()| buf.to_vec());
        self.pool.release(buf);
        result
    }

    /// Encodes `value`, appending to `buf`.
    ///
    /// On error `buf` is restored to its original length.
    pub fn marshal_into(
        &self,
        value: &dyn Reflect,
        buf: &mut Vec<u8>,
        options: &Options,
    ) -> Result<(), Error> {
        let len = buf.len();
        let result = self.encode(value, buf, options);
        if result.is_err() {
            buf.truncate(len);
        }
        result
    }

    /// Decodes `data` into `value`.
    ///
    /// Keys absent from `data` leave their fields untouched, and only whitespace
    /// may follow the value.
    pub fn unmarshal(
        &self,
        data: &[u8],
        value: &mut dyn Reflect,
        options: &Options,
    ) -> Result<(), Error> {
        let codec = self.cache.get_or_build(value.reflect_type_info(), "")?;
        let mut decoder = Decoder::new(data);
        let mut session = UnmarshalSession::new(&self.cache, options);
        codec.decode(value, &mut decoder, &mut session)?;
        decoder.finish()
    }

    /// Drops every built codec and pooled buffer.
    pub fn reset(&self) {
        self.cache.clear();
        self.pool.clear();
        debug!("marshaller reset");
    }

    fn encode(&self, value: &dyn Reflect, buf: &mut Vec<u8>, options: &Options) -> Result<(), Error> {
        let codec = self.cache.get_or_build(value.reflect_type_info(), "")?;
        codec.encode(value, &mut Session::new(buf, &self.cache, options))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};
    use vc_json_reflect::derive::Reflect;

    use super::Marshaller;
    use crate::codec::{TypeTraitUnmarshal, UnmarshalCustom};
    use crate::{
        CaseFormat, Decoder, Error, Filter, IOConfig, Options, RawJson, UnmarshalSession,
    };

    fn upper_camel() -> Marshaller {
        Marshaller::new(IOConfig::new().with_case_format(CaseFormat::UpperCamel))
    }

    fn to_string(marshaller: &Marshaller, value: &dyn vc_json_reflect::Reflect) -> String {
        let json = marshaller.marshal(value, &Options::new()).unwrap();
        String::from_utf8(json).unwrap()
    }

    // -------------------------------------------------------------------------
    // Fixtures

    #[derive(Reflect, Default, Debug, PartialEq)]
    struct Row {
        #[tag(db = "primaryKey")]
        id: i32,
        name: Option<String>,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    struct FooHas {
        #[tag(json = "ID")]
        id: bool,
        name: bool,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    struct Foo {
        #[tag(json = "ID")]
        id: i32,
        name: String,
        #[tag(set_marker = "true")]
        has: Option<FooHas>,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    #[reflect(opaque, type_trait(TypeTraitUnmarshal))]
    struct IntSum(i64);

    impl UnmarshalCustom for IntSum {
        fn unmarshal_json(
            &mut self,
            decoder: &mut Decoder<'_>,
            _: &mut UnmarshalSession<'_>,
        ) -> Result<(), Error> {
            decoder.begin_array()?;
            let mut first = true;
            while decoder.next_item(first)? {
                first = false;
                self.0 += decoder.read_i64()?;
            }
            Ok(())
        }
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    struct Stats {
        label: String,
        total: IntSum,
    }

    #[derive(Reflect, Default, Debug, PartialEq, Clone)]
    struct Node {
        name: String,
        children: Vec<Node>,
        next: Option<Box<Node>>,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    struct User {
        name: String,
        password: String,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    struct Account {
        id: i32,
        owner: User,
        admin: User,
    }

    // -------------------------------------------------------------------------
    // Scenarios

    #[test]
    fn zero_and_null_fields() {
        let marshaller = upper_camel();
        assert_eq!(to_string(&marshaller, &Row::default()), r#"{"Id":0,"Name":null}"#);

        let row = Row {
            id: 3,
            name: Some("x".to_owned()),
        };
        assert_eq!(to_string(&marshaller, &row), r#"{"Id":3,"Name":"x"}"#);
        assert_eq!(to_string(&marshaller, &None::<Row>), "null");
    }

    #[test]
    fn presence_marker() {
        let marshaller = upper_camel();
        let mut foos = Vec::<Foo>::new();
        marshaller
            .unmarshal(br#"[{"ID":1},{"Name":"Boo"}]"#, &mut foos, &Options::new())
            .unwrap();

        assert_eq!(
            to_string(&marshaller, &foos),
            r#"[{"ID":1,"Name":"","Has":{"ID":true,"Name":false}},{"ID":0,"Name":"Boo","Has":{"ID":false,"Name":true}}]"#,
        );

        let mut foo = Foo::default();
        marshaller.unmarshal(b"{}", &mut foo, &Options::new()).unwrap();
        assert_eq!(foo.has, Some(FooHas::default()));

        marshaller
            .unmarshal(br#"{"ID":0,"Name":""}"#, &mut foo, &Options::new())
            .unwrap();
        assert_eq!(foo.has, Some(FooHas { id: true, name: true }));
    }

    #[test]
    fn string_slice_round_trip() {
        let marshaller = Marshaller::default();
        let json = br#"["abc","def","ghi"]"#;

        let mut value = Vec::<String>::new();
        marshaller.unmarshal(json, &mut value, &Options::new()).unwrap();
        assert_eq!(value, ["abc", "def", "ghi"]);
        assert_eq!(marshaller.marshal(&value, &Options::new()).unwrap(), json);
    }

    #[test]
    fn custom_field_sums() {
        let marshaller = Marshaller::default();
        let mut stats = Stats::default();
        marshaller
            .unmarshal(
                br#"{"label":"n","total":[1,2,3,4,5,6,7,8,9,10]}"#,
                &mut stats,
                &Options::new(),
            )
            .unwrap();
        assert_eq!(stats.total, IntSum(55));
        assert_eq!(stats.label, "n");
    }

    #[test]
    fn integer_map_keys() {
        let marshaller = Marshaller::default();
        let map = BTreeMap::from([(1, "x".to_owned()), (2, "y".to_owned())]);
        assert_eq!(to_string(&marshaller, &map), r#"{"1":"x","2":"y"}"#);
    }

    #[test]
    fn recursive_type() {
        let marshaller = Marshaller::default();
        let leaf = Node {
            name: "c".to_owned(),
            ..Node::default()
        };
        let tree = Node {
            name: "a".to_owned(),
            children: vec![Node {
                name: "b".to_owned(),
                children: vec![leaf.clone()],
                next: None,
            }],
            next: Some(Box::new(leaf)),
        };

        let json = to_string(&marshaller, &tree);
        assert_eq!(
            json,
            r#"{"name":"a","children":[{"name":"b","children":[{"name":"c","children":[],"next":null}],"next":null}],"next":{"name":"c","children":[],"next":null}}"#,
        );

        let mut decoded = Node::default();
        marshaller
            .unmarshal(json.as_bytes(), &mut decoded, &Options::new())
            .unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn concurrent_first_use() {
        let marshaller = Arc::new(Marshaller::default());
        let tree = Node {
            name: "a".to_owned(),
            children: vec![Node::default(); 2],
            next: None,
        };
        let expected = r#"{"name":"a","children":[{"name":"","children":[],"next":null},{"name":"","children":[],"next":null}],"next":null}"#;

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    assert_eq!(to_string(&marshaller, &tree), expected);
                });
            }
        });
    }

    #[test]
    fn filters() {
        let marshaller = Marshaller::default();
        let account = Account {
            id: 1,
            owner: User {
                name: "o".to_owned(),
                password: "p".to_owned(),
            },
            admin: User::default(),
        };

        let once = Options::new().with_filters([Filter::new("", ["id", "owner"])]);
        let twice = Options::new().with_filters([
            Filter::new("", ["id", "owner"]),
            Filter::new("", ["id", "owner"]),
        ]);
        let expected = r#"{"id":1,"owner":{"name":"o","password":"p"}}"#;
        assert_eq!(marshaller.marshal(&account, &once).unwrap(), expected.as_bytes());
        assert_eq!(marshaller.marshal(&account, &twice).unwrap(), expected.as_bytes());

        let nested = Options::new().with_filters([
            Filter::new("owner", ["name"]),
            Filter::new("admin", Vec::<String>::new()),
        ]);
        assert_eq!(
            marshaller.marshal(&account, &nested).unwrap(),
            br#"{"id":1,"owner":{"name":"o"},"admin":{}}"#,
        );
    }

    #[test]
    fn exclusions_per_path() {
        let marshaller = Marshaller::new(IOConfig::new().with_exclude(["owner.password"]));
        let user = || User {
            name: "n".to_owned(),
            password: "p".to_owned(),
        };
        let account = Account {
            id: 1,
            owner: user(),
            admin: user(),
        };

        assert_eq!(
            to_string(&marshaller, &account),
            r#"{"id":1,"owner":{"name":"n"},"admin":{"name":"n","password":"p"}}"#,
        );
    }

    #[test]
    fn annotations() {
        #[derive(Reflect, Default)]
        struct Tagged {
            #[tag(default = "value=7")]
            count: i32,
            #[tag(default = "nullable=true")]
            note: String,
            #[tag(default = "format=%Y-%m-%d")]
            day: DateTime<Utc>,
            #[tag(json = "opt,omitempty")]
            opt: Option<i32>,
            #[tag(json = "items,omitempty")]
            items: Vec<i32>,
            #[tag(json = "-")]
            hidden: i32,
            #[tag(jsonx = "transient")]
            scratch: i32,
            #[tag(default = "name=Renamed")]
            plain: bool,
        }

        let marshaller = Marshaller::default();
        let mut value = Tagged {
            day: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            hidden: 1,
            scratch: 2,
            ..Tagged::default()
        };
        assert_eq!(
            to_string(&marshaller, &value),
            r#"{"count":7,"note":null,"day":"2024-01-02","Renamed":false}"#,
        );

        value.count = 3;
        value.opt = Some(0);
        value.items = vec![1];
        assert_eq!(
            to_string(&marshaller, &value),
            r#"{"count":3,"note":null,"day":"2024-01-02","opt":0,"items":[1],"Renamed":false}"#,
        );

        marshaller
            .unmarshal(
                br#"{"day":"2025-05-06","hidden":9,"Renamed":true,"unknown":[1,{}]}"#,
                &mut value,
                &Options::new(),
            )
            .unwrap();
        assert_eq!(value.day, Utc.with_ymd_and_hms(2025, 5, 6, 0, 0, 0).unwrap());
        assert_eq!(value.hidden, 1);
        assert!(value.plain);
    }

    #[test]
    fn nullable_pointer_field() {
        #[derive(Reflect, Default)]
        struct Holder {
            value: Option<i32>,
        }

        let marshaller = Marshaller::default();
        assert_eq!(to_string(&marshaller, &Holder { value: None }), r#"{"value":null}"#);
        assert_eq!(to_string(&marshaller, &Holder { value: Some(42) }), r#"{"value":42}"#);
    }

    #[test]
    fn construction_errors_are_not_cached() {
        #[derive(Reflect, Default)]
        struct Bad {
            #[tag(default = "value=seven")]
            count: i32,
        }

        let marshaller = Marshaller::default();
        for _ in 0..2 {
            let err = marshaller.marshal(&Bad::default(), &Options::new()).unwrap_err();
            assert!(matches!(err, Error::Tag { .. }), "{err}");
        }
        assert_eq!(marshaller.cache.len(), 0);
        assert_eq!(to_string(&marshaller, &1_u8), "1");
    }

    #[test]
    fn decode_breadcrumbs() {
        #[derive(Reflect, Default)]
        struct Inner {
            n: u8,
        }

        #[derive(Reflect, Default)]
        struct Outer {
            items: Vec<Inner>,
        }

        let marshaller = Marshaller::default();
        let mut value = Outer::default();
        let err = marshaller
            .unmarshal(br#"{"items":[{"n":1},{"n":300}]}"#, &mut value, &Options::new())
            .unwrap_err();
        let Error::Decode(err) = err else {
            panic!("expected a decode error, got {err}");
        };
        assert_eq!(err.path(), "items[1].n");
        assert!(err.to_string().starts_with("failed to unmarshal items[1].n: "));
    }

    #[test]
    fn required_fields() {
        #[derive(Reflect, Default)]
        struct Request {
            #[tag(default = "required=true")]
            id: i32,
            name: String,
        }

        let marshaller = Marshaller::default();
        let mut value = Request::default();
        let Err(Error::Decode(err)) =
            marshaller.unmarshal(br#"{"name":"x"}"#, &mut value, &Options::new())
        else {
            panic!("expected a decode error");
        };
        assert_eq!(err.path(), "id");

        marshaller
            .unmarshal(br#"{"ID":0}"#, &mut value, &Options::new())
            .unwrap();
    }

    #[test]
    fn interceptors_and_context() {
        struct Mask(&'static str);

        let marshaller = Marshaller::default();
        let account = Account {
            id: 1,
            owner: User {
                name: "o".to_owned(),
                password: "secret".to_owned(),
            },
            admin: User::default(),
        };

        let options = Options::new()
            .with_context(Mask("***"))
            .with_filters([Filter::new("", ["owner"])])
            .with_marshal_interceptor("owner.password", |options| {
                let mask = options.context::<Mask>().map_or("", |m| m.0);
                Ok(format!("\"{mask}\"").into_bytes())
            });
        assert_eq!(
            marshaller.marshal(&account, &options).unwrap(),
            br#"{"owner":{"name":"o","password":"***"}}"#,
        );

        let failing = Options::new().with_marshal_interceptor("id", |_| Err("boom".into()));
        let err = marshaller.marshal(&account, &failing).unwrap_err();
        assert!(matches!(err, Error::Interceptor { ref path, .. } if path == "id"));

        let options = Options::new().with_unmarshal_interceptor(
            "owner.name",
            |value, decoder, _| {
                let name = decoder.read_string()?.to_uppercase();
                if let Some(slot) = value.downcast_mut::<String>() {
                    *slot = name;
                }
                Ok(())
            },
        );
        let mut decoded = Account::default();
        marshaller
            .unmarshal(
                br#"{"owner":{"name":"low"},"admin":{"name":"low"}}"#,
                &mut decoded,
                &options,
            )
            .unwrap();
        assert_eq!(decoded.owner.name, "LOW");
        assert_eq!(decoded.admin.name, "low");
    }

    #[test]
    fn inline_raw_json() {
        #[derive(Reflect, Default)]
        struct Envelope {
            #[tag(jsonx = "inline")]
            body: RawJson,
            ignored: i32,
        }

        let marshaller = Marshaller::default();
        let mut value = Envelope {
            body: RawJson(br#"{"k":[1,2]}"#.to_vec()),
            ignored: 5,
        };
        assert_eq!(to_string(&marshaller, &value), r#"{"k":[1,2]}"#);

        marshaller
            .unmarshal(br#" {"other":true} "#, &mut value, &Options::new())
            .unwrap();
        assert_eq!(value.body.0, br#"{"other":true}"#);
    }

    #[test]
    fn embedded_structs() {
        #[derive(Reflect, Default, Debug, PartialEq)]
        struct Base {
            id: i32,
            kind: String,
        }

        #[derive(Reflect, Default, Debug, PartialEq)]
        struct Derived {
            #[reflect(embed)]
            base: Base,
            #[reflect(embed)]
            extra: Option<Base>,
            kind: String,
        }

        let marshaller = Marshaller::default();
        let mut value = Derived {
            base: Base {
                id: 1,
                kind: "hidden".to_owned(),
            },
            extra: None,
            kind: "own".to_owned(),
        };
        assert_eq!(to_string(&marshaller, &value), r#"{"id":1,"kind":"own"}"#);

        marshaller
            .unmarshal(br#"{"id":2,"kind":"new"}"#, &mut value, &Options::new())
            .unwrap();
        assert_eq!(value.base.id, 2);
        assert_eq!(value.kind, "new");
        assert_eq!(value.base.kind, "hidden");
    }

    #[test]
    fn serde_values() {
        #[derive(Reflect, Default)]
        struct Doc {
            meta: serde_json::Value,
        }

        let marshaller = Marshaller::default();
        let mut doc = Doc::default();
        marshaller
            .unmarshal(br#"{"meta":{"a":[1,"b"]}}"#, &mut doc, &Options::new())
            .unwrap();
        assert_eq!(doc.meta, serde_json::json!({"a": [1, "b"]}));
        assert_eq!(to_string(&marshaller, &doc), r#"{"meta":{"a":[1,"b"]}}"#);
    }

    #[test]
    fn marshal_into_appends() {
        #[derive(Reflect, Default)]
        struct Broken {
            ratio: f64,
        }

        let marshaller = Marshaller::default();
        let mut buf = b"prefix:".to_vec();
        marshaller
            .marshal_into(&vec![1_i32], &mut buf, &Options::new())
            .unwrap();
        assert_eq!(buf, b"prefix:[1]");

        let broken = Broken { ratio: f64::NAN };
        assert!(marshaller.marshal_into(&broken, &mut buf, &Options::new()).is_err());
        assert_eq!(buf, b"prefix:[1]");
    }

    #[test]
    fn reset_rebuilds() {
        let marshaller = Marshaller::default();
        let expected = r#"{"name":"","children":[],"next":null}"#;
        assert_eq!(to_string(&marshaller, &Node::default()), expected);
        assert!(marshaller.cache.len() > 0);

        marshaller.reset();
        assert_eq!(marshaller.cache.len(), 0);
        assert_eq!(to_string(&marshaller, &Node::default()), expected);
    }

    #[test]
    fn trailing_input_rejected() {
        let marshaller = Marshaller::default();
        let mut value = 0_i32;
        let err = marshaller.unmarshal(b"1 2", &mut value, &Options::new()).unwrap_err();
        assert!(matches!(err, Error::Syntax { offset: 2, .. }));
    }

    #[test]
    fn nesting_limit() {
        let marshaller = Marshaller::default();

        let nested = |depth: usize| {
            format!("{}null{}", r#"{"next":"#.repeat(depth), "}".repeat(depth))
        };

        let mut node = Node::default();
        marshaller
            .unmarshal(nested(100).as_bytes(), &mut node, &Options::new())
            .unwrap();
        let mut levels = 0;
        let mut current = &node;
        while let Some(next) = &current.next {
            levels += 1;
            current = next;
        }
        assert_eq!(levels, 99);

        let mut node = Node::default();
        let err = marshaller
            .unmarshal(nested(20_000).as_bytes(), &mut node, &Options::new())
            .unwrap_err();
        let Error::Decode(err) = err else {
            panic!("expected a decode error, got {err}");
        };
        assert!(err.path().starts_with("next.next."));
        assert!(err.cause().to_string().contains("nesting too deep"));
    }

    #[test]
    fn mutual_recursion() {
        #[derive(Reflect, Default, Debug, PartialEq)]
        struct Dept {
            name: String,
            head: Option<Box<Person>>,
        }

        #[derive(Reflect, Default, Debug, PartialEq)]
        struct Person {
            name: String,
            dept: Option<Box<Dept>>,
        }

        let marshaller = Marshaller::default();
        let dept = Dept {
            name: "rd".to_owned(),
            head: Some(Box::new(Person {
                name: "ann".to_owned(),
                dept: Some(Box::new(Dept {
                    name: "lab".to_owned(),
                    head: None,
                })),
            })),
        };

        let json = to_string(&marshaller, &dept);
        assert_eq!(
            json,
            r#"{"name":"rd","head":{"name":"ann","dept":{"name":"lab","head":null}}}"#,
        );

        let mut decoded = Dept::default();
        marshaller
            .unmarshal(json.as_bytes(), &mut decoded, &Options::new())
            .unwrap();
        assert_eq!(decoded, dept);

        let person = Person {
            name: "bob".to_owned(),
            dept: None,
        };
        assert_eq!(to_string(&marshaller, &person), r#"{"name":"bob","dept":null}"#);
    }

    #[test]
    fn embedded_behind_pointers() {
        #[derive(Reflect, Default, Debug, PartialEq)]
        struct Deep {
            deep: i32,
        }

        #[derive(Reflect, Default, Debug, PartialEq)]
        struct Boxed {
            id: i32,
            #[reflect(embed)]
            inner: Option<Box<Deep>>,
        }

        #[derive(Reflect, Default)]
        struct NotStruct {
            #[reflect(embed)]
            count: i32,
        }

        let marshaller = Marshaller::default();
        let mut value = Boxed {
            id: 1,
            inner: Some(Box::new(Deep { deep: 5 })),
        };
        assert_eq!(to_string(&marshaller, &value), r#"{"id":1,"deep":5}"#);

        value.inner = None;
        assert_eq!(to_string(&marshaller, &value), r#"{"id":1}"#);

        marshaller
            .unmarshal(br#"{"deep":9}"#, &mut value, &Options::new())
            .unwrap();
        assert_eq!(value.inner, Some(Box::new(Deep { deep: 9 })));

        let err = marshaller.marshal(&NotStruct::default(), &Options::new());
        assert!(matches!(err, Err(Error::Construction { .. })));
    }

    #[test]
    fn equal_depth_shadowing() {
        #[derive(Reflect, Default, Debug, PartialEq)]
        struct Left {
            id: i32,
            left: i32,
        }

        #[derive(Reflect, Default, Debug, PartialEq)]
        struct Right {
            id: i32,
            right: i32,
        }

        #[derive(Reflect, Default, Debug, PartialEq)]
        struct Both {
            #[reflect(embed)]
            a: Left,
            #[reflect(embed)]
            b: Right,
        }

        let marshaller = Marshaller::default();
        let mut value = Both {
            a: Left { id: 1, left: 2 },
            b: Right { id: 3, right: 4 },
        };
        assert_eq!(to_string(&marshaller, &value), r#"{"id":1,"left":2,"right":4}"#);

        marshaller
            .unmarshal(br#"{"id":7,"right":8}"#, &mut value, &Options::new())
            .unwrap();
        assert_eq!(value.a, Left { id: 7, left: 2 });
        assert_eq!(value.b, Right { id: 3, right: 8 });
    }

    #[test]
    fn scalar_extremes() {
        #[derive(Reflect, Default, Debug, PartialEq)]
        struct Extremes {
            small: i8,
            big: u64,
            size: usize,
            neg: i64,
            ratio: f32,
        }

        let marshaller = Marshaller::default();
        let value = Extremes {
            small: i8::MIN,
            big: u64::MAX,
            size: usize::MAX,
            neg: i64::MIN,
            ratio: 1e-7,
        };
        let json = to_string(&marshaller, &value);
        assert_eq!(
            json,
            format!(
                r#"{{"small":-128,"big":18446744073709551615,"size":{},"neg":-9223372036854775808,"ratio":1e-7}}"#,
                usize::MAX,
            ),
        );

        let mut decoded = Extremes::default();
        marshaller
            .unmarshal(json.as_bytes(), &mut decoded, &Options::new())
            .unwrap();
        assert_eq!(decoded, value);

        let err = marshaller
            .unmarshal(br#"{"small":128}"#, &mut decoded, &Options::new())
            .unwrap_err();
        let Error::Decode(err) = err else {
            panic!("expected a decode error, got {err}");
        };
        assert_eq!(err.path(), "small");
        assert!(matches!(err.cause(), Error::Syntax { .. }));
        assert_eq!(decoded.small, i8::MIN);
    }
}
