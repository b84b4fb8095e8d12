use criterion::{black_box, criterion_group, criterion_main, Criterion};

use recodec::schema::typeref::BasicKind;
use recodec::{compile_record, render_string, EmitOptions, FieldRef, TypeRef, TypeRegistry};

fn registry() -> TypeRegistry {
    let leaf = |i: usize| {
        TypeRef::Struct(vec![
            FieldRef::new("Id", TypeRef::STRING).tagged("uuid"),
            FieldRef::new("Mail", TypeRef::pointer(TypeRef::STRING)).tagged("maxlen=254,email"),
            FieldRef::new("Weight", TypeRef::Basic(BasicKind::Float64)).tagged("min=0"),
            FieldRef::new("Kind", TypeRef::STRING).tagged("oneof=a b c"),
            FieldRef::new("Next", TypeRef::slice(TypeRef::named(format!("Level{}", i + 1)))),
        ])
    };
    let mut reg = TypeRegistry::new().define("Level8", TypeRef::Struct(Vec::new()));
    for i in 0..8 {
        reg = reg.define(format!("Level{i}"), leaf(i));
    }
    reg
}

fn compile_bench(c: &mut Criterion) {
    let reg = registry();
    c.bench_function("compile_nested", |b| {
        b.iter(|| black_box(compile_record("Level0", &reg).map(|rec| rec.patterns.len())))
    });
}

fn render_bench(c: &mut Criterion) {
    let reg = registry();
    let rec = match compile_record("Level0", &reg) {
        Ok(rec) => rec,
        Err(err) => panic!("benchmark schema failed to compile: {err}"),
    };
    let options = EmitOptions::default();
    c.bench_function("render_nested", |b| {
        b.iter(|| black_box(render_string(&rec, &options).map(|src| src.len())))
    });
}

criterion_group! {
    name = compile_benches;
    config = Criterion::default();
    targets = compile_bench, render_bench
}

criterion_main!(compile_benches);
