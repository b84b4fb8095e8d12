use criterion::{black_box, criterion_group, criterion_main, Criterion};

use recodec::schema::typeref::BasicKind;
use recodec::{
    compile_record, Bytes, CompiledRecord, Decode, DecodeResult, Encode, FieldRef, Parser,
    RecordValue, Target, TypeRef, TypeRegistry, Value,
};

fn foo_record() -> CompiledRecord {
    let reg = TypeRegistry::new().define(
        "Foo",
        TypeRef::Struct(vec![
            FieldRef::new("A", TypeRef::Basic(BasicKind::Uint16)),
            FieldRef::new("B", TypeRef::STRING).tagged("maxlen=16,alpha"),
            FieldRef::new("C", TypeRef::slice(TypeRef::Basic(BasicKind::Uint8))),
            FieldRef::new(
                "D",
                TypeRef::Struct(vec![
                    FieldRef::new("A", TypeRef::Basic(BasicKind::Uint64)),
                    FieldRef::new("B", TypeRef::STRING),
                ]),
            ),
            FieldRef::new("E", TypeRef::slice(TypeRef::Basic(BasicKind::Int))),
            FieldRef::new("F", TypeRef::array(2, TypeRef::Basic(BasicKind::Int))),
            FieldRef::new("G", TypeRef::BOOL),
        ]),
    );
    match compile_record("Foo", &reg) {
        Ok(rec) => rec,
        Err(err) => panic!("benchmark schema failed to compile: {err}"),
    }
}

fn foo_value() -> Value {
    let ints = |xs: &[i64]| xs.iter().map(|&x| Value::Int(x)).collect::<Vec<_>>();
    Value::Record(
        RecordValue::new()
            .with("A", 1u16)
            .with("B", "foooo")
            .with("C", Bytes::from(&b"baaar"[..]))
            .with("D", RecordValue::new().with("A", 6u64).with("B", "baaaz"))
            .with("E", Value::Sequence(ints(&[1, 2, 3, 4])))
            .with("F", Value::Array(ints(&[5, 6])))
            .with("G", true),
    )
}

/// Hand-written equivalent of what the emitter produces for `Foo`.
struct Inner {
    a: u64,
    b: String,
}

struct Foo {
    a: u16,
    b: String,
    c: Bytes,
    d: Inner,
    e: Vec<isize>,
    f: [isize; 2],
    g: bool,
}

impl Encode for Inner {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.a.write_to(buf) + self.b.write_to(buf)
    }
}

impl Decode for Inner {
    fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self> {
        Ok(Self {
            a: u64::parse(p)?,
            b: String::parse(p)?,
        })
    }
}

impl Encode for Foo {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.a.write_to(buf)
            + self.b.write_to(buf)
            + self.c.write_to(buf)
            + self.d.write_to(buf)
            + self.e.write_to(buf)
            + self.f.write_to(buf)
            + self.g.write_to(buf)
    }
}

impl Decode for Foo {
    fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self> {
        let a = u16::parse(p)?;
        let b: String = recodec::conv::parse_gated(p, |len| {
            if len > 16 {
                return Err(recodec::DecodeError::violation("B", "field 'B' has a maximum length of 16"));
            }
            Ok(())
        })?;
        if !recodec::StringShape::Alpha.matches(&b) {
            return Err(recodec::DecodeError::violation("B", "field 'B' contains non alpha characters"));
        }
        Ok(Self {
            a,
            b,
            c: Bytes::parse(p)?,
            d: Inner::parse(p)?,
            e: Vec::parse(p)?,
            f: <[isize; 2]>::parse(p)?,
            g: bool::parse(p)?,
        })
    }
}

fn foo_static() -> Foo {
    Foo {
        a: 1,
        b: String::from("foooo"),
        c: Bytes::from(&b"baaar"[..]),
        d: Inner {
            a: 6,
            b: String::from("baaaz"),
        },
        e: vec![1, 2, 3, 4],
        f: [5, 6],
        g: true,
    }
}

fn encode_bench(c: &mut Criterion) {
    let rec = foo_record();
    let value = foo_value();
    let foo = foo_static();
    c.bench_function("encode_dynamic", |b| b.iter(|| black_box(rec.encode(&value))));
    c.bench_function("encode_static", |b| b.iter(|| black_box(foo.to_bytes())));
}

fn decode_bench(c: &mut Criterion) {
    let rec = foo_record();
    let foo = foo_static();
    let bytes = foo.to_bytes();
    c.bench_function("decode_dynamic", |b| b.iter(|| black_box(rec.decode(&bytes))));
    c.bench_function("decode_static", |b| {
        b.iter(|| black_box(Foo::try_decode(bytes.as_slice()).map(|foo| foo.g)))
    });
}

criterion_group! {
    name = codec_benches;
    config = Criterion::default();
    targets = encode_bench, decode_bench
}

criterion_main!(codec_benches);
