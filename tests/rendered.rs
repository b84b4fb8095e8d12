use std::collections::HashMap;

use recodec::schema::typeref::BasicKind;
use recodec::{
    compile_record, render_string, Bytes, Decode, DecodeError, EmitOptions, Encode, FieldRef,
    TypeRef, TypeRegistry, Value,
};

mod rendered {
    include!("fixtures/person.rs");
}

use rendered::{Address, Person};

fn registry() -> TypeRegistry {
    TypeRegistry::new()
        .define(
            "Address",
            TypeRef::Struct(vec![
                FieldRef::new("Street", TypeRef::STRING).tagged("maxlen=8,alpha"),
                FieldRef::new("Zip", TypeRef::array(2, TypeRef::Basic(BasicKind::Uint16))),
            ]),
        )
        .define(
            "Person",
            TypeRef::Struct(vec![
                FieldRef::new("Name", TypeRef::STRING).tagged("minlen=1,maxlen=16,alpha"),
                FieldRef::new("Age", TypeRef::Basic(BasicKind::Uint8)).tagged("max=130"),
                FieldRef::new("Nick", TypeRef::pointer(TypeRef::STRING)).tagged("maxlen=4"),
                FieldRef::new("Home", TypeRef::named("Address")),
                FieldRef::new("Tags", TypeRef::slice(TypeRef::STRING)),
                FieldRef::new(
                    "Scores",
                    TypeRef::map(TypeRef::STRING, TypeRef::Basic(BasicKind::Int32)),
                ),
                FieldRef::new("Blob", TypeRef::slice(TypeRef::Basic(BasicKind::Uint8))),
                FieldRef::new("Cache", TypeRef::Basic(BasicKind::Int64)).tagged("-"),
            ]),
        )
}

fn person() -> Person {
    Person {
        Name: String::from("Ada"),
        Age: 36,
        Nick: Some(String::from("ada")),
        Home: Address {
            Street: String::from("Elm"),
            Zip: [1234, 5678],
        },
        Tags: vec![String::from("math")],
        Scores: HashMap::from([(String::from("chess"), 1800)]),
        Blob: Bytes::from(vec![0xde, 0xad]),
        Cache: 42,
    }
}

/// Token text with whitespace dropped. Single quotes inside string literals
/// may or may not be escaped depending on how the literal was produced.
fn normalize(src: &str) -> String {
    src.replace("\\'", "'")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[test]
fn fixture_matches_current_rendering() {
    let compiled = compile_record("Person", &registry()).unwrap();
    let fresh = render_string(&compiled, &EmitOptions::default()).unwrap();
    let fixture: proc_macro2::TokenStream = include_str!("fixtures/person.rs").parse().unwrap();
    assert_eq!(normalize(&fresh), normalize(&fixture.to_string()));
}

#[test]
fn round_trip() {
    let original = person();
    let bytes = original.to_bytes();
    assert_eq!(bytes.len(), original.enc_len());

    let decoded = Person::try_decode(&bytes).unwrap();
    assert_eq!(
        decoded,
        Person {
            Cache: 0,
            ..original
        }
    );
    assert_eq!(Person::default().Home.Zip, [0, 0]);
}

#[test]
fn agrees_with_dynamic_codec() {
    let compiled = compile_record("Person", &registry()).unwrap();
    let bytes = person().to_bytes();

    let value = compiled.decode(&bytes).unwrap();
    let rec = value.as_record().unwrap();
    assert_eq!(rec.get("Name"), Some(&Value::from("Ada")));
    assert_eq!(rec.get("Nick"), Some(&Value::from(Some("ada"))));
    assert_eq!(rec.get("Cache"), Some(&Value::Int64(0)));
    assert_eq!(compiled.encode(&value).unwrap(), bytes);
}

fn violation_of(bytes: &[u8]) -> (String, String) {
    match Person::try_decode(bytes) {
        Err(err @ DecodeError::ConstraintViolation { .. }) => {
            (err.field().unwrap_or_default().to_owned(), err.to_string())
        }
        other => panic!("expected a constraint violation, got {other:?}"),
    }
}

#[test]
fn length_bound_checked_before_body() {
    let long = Person {
        Name: String::from("abcdefghijklmnopq"),
        ..person()
    };
    let bytes = long.to_bytes();
    assert_eq!(
        violation_of(&bytes),
        (
            String::from("Name"),
            String::from("field 'Name' has a maximum length of 16")
        )
    );
    // only the length prefix is needed to reject it
    assert_eq!(violation_of(&bytes[..8]).0, "Name");

    let empty = Person {
        Name: String::new(),
        ..person()
    };
    assert_eq!(
        violation_of(&empty.to_bytes()).1,
        "field 'Name' has a minimum length of 1"
    );

    let nick = Person {
        Nick: Some(String::from("adele")),
        ..person()
    };
    assert_eq!(violation_of(&nick.to_bytes()).0, "Nick");

    let absent = Person {
        Nick: None,
        ..person()
    };
    assert!(Person::try_decode(&absent.to_bytes()).is_ok());
}

#[test]
fn value_checks_after_body() {
    let old = Person {
        Age: 200,
        ..person()
    };
    assert_eq!(
        violation_of(&old.to_bytes()),
        (
            String::from("Age"),
            String::from("field 'Age' has a maximum value of 130")
        )
    );

    let roman = Person {
        Name: String::from("Ⅷ"),
        ..person()
    };
    assert_eq!(
        violation_of(&roman.to_bytes()).1,
        "field 'Name' contains non alpha characters"
    );

    let accented = Person {
        Name: String::from("José"),
        ..person()
    };
    assert!(Person::try_decode(&accented.to_bytes()).is_ok());

    let numbered = Person {
        Home: Address {
            Street: String::from("Elm2"),
            Zip: [0, 0],
        },
        ..person()
    };
    assert_eq!(
        violation_of(&numbered.to_bytes()),
        (
            String::from("Street"),
            String::from("field 'Street' contains non alpha characters")
        )
    );
}
