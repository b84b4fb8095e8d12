//! Rust source emission for compiled records
//!
//! [`render`] turns a [`CompiledRecord`] into a token stream holding, for the
//! record and every named record nested in it, a struct definition plus
//! [`Encode`](crate::conv::Encode) and [`Decode`](crate::conv::Decode)
//! implementations written against this crate's runtime. Field checks are
//! inlined into the generated `parse`; length bounds go through
//! [`parse_gated`](crate::conv::parse_gated) so that they run before the body
//! is read. Regex-backed string shapes are declared once per rendering as
//! `lazy_static` statics.
//!
//! One rendering is meant to fill one module: rendering two records that
//! share a nested record into the same module declares it twice.

use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::{format_ident, quote};
use thiserror::Error;

use crate::compile::CompiledRecord;
use crate::constraint::{Constraint, Literal as Lit, Phase, Rule, StringShape};
use crate::schema::{Field, Record, ScalarKind, Type};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitOptions {
    /// Path under which the runtime crate is reachable from the emitted
    /// module, e.g. `recodec` or `crate::runtime`.
    pub runtime: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            runtime: String::from("recodec"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("field '{0}' holds an anonymous record, which has no Rust type name")]
    AnonymousRecord(String),

    #[error("'{0}' cannot be used as a Rust identifier")]
    InvalidIdent(String),

    #[error("'{0}' is not a valid runtime path")]
    InvalidRuntime(String),

    #[error("map key type {0} does not implement Hash")]
    UnhashableKey(String),

    #[error("constraint literal {literal} on field '{field}' does not fit type {ty}")]
    Literal {
        field: String,
        literal: String,
        ty: String,
    },
}

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

const UNRAWABLE: &[&str] = &["self", "Self", "super", "crate", "_"];

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Identifier for a user-supplied name, escaped as a raw identifier when it
/// collides with a keyword.
fn ident(name: &str) -> Result<Ident, EmitError> {
    if !is_ident(name) || UNRAWABLE.contains(&name) {
        return Err(EmitError::InvalidIdent(name.to_owned()));
    }
    if KEYWORDS.contains(&name) {
        Ok(Ident::new_raw(name, Span::call_site()))
    } else {
        Ok(Ident::new(name, Span::call_site()))
    }
}

fn runtime_path(path: &str) -> Result<TokenStream, EmitError> {
    let invalid = || EmitError::InvalidRuntime(path.to_owned());
    let (leading, rest) = match path.strip_prefix("::") {
        Some(rest) => (quote!(::), rest),
        None => (TokenStream::new(), path),
    };
    let segments = rest
        .split("::")
        .map(|seg| {
            if is_ident(seg) && seg != "_" {
                Ok(Ident::new(seg, Span::call_site()))
            } else {
                Err(invalid())
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(quote!(#leading #(#segments)::*))
}

fn pattern_ident(shape: StringShape) -> Ident {
    format_ident!("{}_PATTERN", shape.name().to_ascii_uppercase())
}

struct Emitter<'a> {
    rt: TokenStream,
    records: Vec<(&'a str, &'a Record)>,
}

impl<'a> Emitter<'a> {
    fn collect(&mut self, name: &'a str, rec: &'a Record) -> Result<(), EmitError> {
        if self.records.iter().any(|(seen, _)| *seen == name) {
            return Ok(());
        }
        self.records.push((name, rec));
        for field in &rec.fields {
            self.visit(&field.ty, &field.name)?;
        }
        Ok(())
    }

    fn visit(&mut self, ty: &'a Type, field: &str) -> Result<(), EmitError> {
        match ty {
            Type::Scalar { .. } | Type::ByteBuffer { .. } => Ok(()),
            Type::Optional(elem) | Type::FixedArray { elem, .. } | Type::Sequence { elem, .. } => {
                self.visit(elem, field)
            }
            Type::Map { key, value, .. } => {
                if key.unwrap_optional().0.scalar_kind().map_or(false, ScalarKind::is_float) {
                    return Err(EmitError::UnhashableKey(key.to_string()));
                }
                self.visit(key, field)?;
                self.visit(value, field)
            }
            Type::Record(rec) => match rec.name.as_deref() {
                Some(name) => self.collect(name, rec),
                None => Err(EmitError::AnonymousRecord(field.to_owned())),
            },
        }
    }

    fn rust_type(&self, ty: &Type) -> Result<TokenStream, EmitError> {
        let rt = &self.rt;
        Ok(match ty {
            Type::Scalar { kind, .. } => scalar_type(*kind),
            Type::Optional(elem) => {
                let elem = self.rust_type(elem)?;
                quote!(::std::option::Option<#elem>)
            }
            Type::FixedArray { len, elem, .. } => {
                let elem = self.rust_type(elem)?;
                let len = Literal::usize_unsuffixed(*len);
                quote!([#elem; #len])
            }
            Type::Sequence { elem, .. } => {
                let elem = self.rust_type(elem)?;
                quote!(::std::vec::Vec<#elem>)
            }
            Type::Map { key, value, .. } => {
                let key = self.rust_type(key)?;
                let value = self.rust_type(value)?;
                quote!(::std::collections::HashMap<#key, #value>)
            }
            Type::ByteBuffer { .. } => quote!(#rt::conv::Bytes),
            Type::Record(rec) => {
                let name = rec.name.as_deref().unwrap_or_default();
                let name = ident(name)?;
                quote!(#name)
            }
        })
    }

    fn zero(&self, ty: &Type) -> Result<TokenStream, EmitError> {
        Ok(match ty {
            Type::FixedArray { elem, .. } => {
                let elem = self.zero(elem)?;
                quote!(::std::array::from_fn(|_| #elem))
            }
            _ => quote!(::std::default::Default::default()),
        })
    }

    fn render_record(&self, name: &str, rec: &Record) -> Result<TokenStream, EmitError> {
        let rt = &self.rt;
        let name = ident(name)?;

        let mut idents = Vec::with_capacity(rec.fields.len());
        let mut types = Vec::with_capacity(rec.fields.len());
        let mut zeros = Vec::with_capacity(rec.fields.len());
        for field in &rec.fields {
            idents.push(ident(&field.name)?);
            types.push(self.rust_type(&field.ty)?);
            zeros.push(self.zero(&field.ty)?);
        }

        let wire: Vec<&Ident> = rec
            .fields
            .iter()
            .zip(&idents)
            .filter(|(field, _)| !field.skip)
            .map(|(_, id)| id)
            .collect();

        let mut stmts = Vec::new();
        let mut inits = Vec::new();
        for (i, (field, id)) in rec.fields.iter().zip(&idents).enumerate() {
            if field.skip {
                let zero = &zeros[i];
                inits.push(quote!(#id: #zero));
                continue;
            }
            let local = format_ident!("field{}", i);
            stmts.push(self.decode_field(field, &local, &types[i])?);
            inits.push(quote!(#id: #local));
        }

        Ok(quote! {
            #[derive(Debug, Clone, PartialEq)]
            #[allow(non_snake_case)]
            pub struct #name {
                #( pub #idents: #types, )*
            }

            impl ::std::default::Default for #name {
                fn default() -> Self {
                    Self { #( #idents: #zeros ),* }
                }
            }

            impl #rt::conv::Encode for #name {
                fn write_to<U: #rt::conv::target::Target>(&self, buf: &mut U) -> usize {
                    0 #( + #rt::conv::Encode::write_to(&self.#wire, buf) )*
                }
            }

            impl #rt::conv::Decode for #name {
                fn parse<P: #rt::parse::Parser>(p: &mut P) -> #rt::parse::DecodeResult<Self> {
                    #( #stmts )*
                    Ok(Self { #( #inits ),* })
                }
            }
        })
    }

    fn decode_field(&self, field: &Field, local: &Ident, ty: &TokenStream) -> Result<TokenStream, EmitError> {
        let rt = &self.rt;
        let (inner, optional) = field.ty.unwrap_optional();
        let (before, after): (Vec<&Constraint>, Vec<&Constraint>) = field
            .constraints
            .iter()
            .partition(|c| c.phase() == Phase::BeforeRead);

        let read = if before.is_empty() {
            quote!(<#ty as #rt::conv::Decode>::parse(p)?)
        } else {
            let elem = self.rust_type(inner)?;
            let gates = before.iter().map(|c| {
                let cond = match c.rule {
                    Rule::MinLen(n) => quote!(len >= #n),
                    Rule::MaxLen(n) => quote!(len <= #n),
                    _ => quote!(true),
                };
                self.violation(c, cond)
            });
            let gated = if optional {
                quote!(parse_gated_opt)
            } else {
                quote!(parse_gated)
            };
            quote! {
                #rt::conv::#gated::<#elem, _, _>(p, |len| {
                    #( #gates )*
                    Ok(())
                })?
            }
        };

        let kind = inner.scalar_kind();
        let checks = after
            .iter()
            .map(|c| -> Result<TokenStream, EmitError> {
                Ok(self.violation(c, self.condition(c, kind)?))
            })
            .collect::<Result<Vec<_>, EmitError>>()?;
        let checks = if checks.is_empty() {
            TokenStream::new()
        } else if optional {
            quote! {
                if let ::std::option::Option::Some(v) = &#local {
                    #( #checks )*
                }
            }
        } else {
            quote! {
                {
                    let v = &#local;
                    #( #checks )*
                }
            }
        };

        Ok(quote! {
            let #local: #ty = #read;
            #checks
        })
    }

    fn violation(&self, c: &Constraint, cond: TokenStream) -> TokenStream {
        let rt = &self.rt;
        let field = &c.field;
        let desc = c.description();
        quote! {
            if !(#cond) {
                return Err(#rt::parse::DecodeError::violation(#field, #desc));
            }
        }
    }

    /// Boolean expression over `v`, a reference to the decoded field (or to
    /// the contents of an optional field).
    fn condition(&self, c: &Constraint, kind: Option<ScalarKind>) -> Result<TokenStream, EmitError> {
        let lit = |l: &Lit| typed_literal(&c.field, kind, l);
        Ok(match &c.rule {
            Rule::Shape(shape) => shape_condition(*shape),
            Rule::Contains(arg) => quote!(v.contains(#arg)),
            Rule::StartsWith(arg) => quote!(v.starts_with(#arg)),
            Rule::EndsWith(arg) => quote!(v.ends_with(#arg)),
            Rule::OneOf(options) => {
                let options = options.iter().map(lit).collect::<Result<Vec<_>, _>>()?;
                if kind == Some(ScalarKind::String) {
                    quote!([#( #options ),*].contains(&v.as_str()))
                } else {
                    quote!([#( #options ),*].contains(v))
                }
            }
            Rule::Eq(l) => {
                let l = lit(l)?;
                quote!(*v == #l)
            }
            Rule::Neq(l) => {
                let l = lit(l)?;
                quote!(*v != #l)
            }
            Rule::Min(l) => {
                let l = lit(l)?;
                quote!(!(*v < #l))
            }
            Rule::Max(l) => {
                let l = lit(l)?;
                quote!(!(*v > #l))
            }
            Rule::MinLen(n) => quote!(v.len() >= #n),
            Rule::MaxLen(n) => quote!(v.len() <= #n),
        })
    }
}

fn scalar_type(kind: ScalarKind) -> TokenStream {
    match kind {
        ScalarKind::String => quote!(::std::string::String),
        ScalarKind::Bool => quote!(bool),
        ScalarKind::Int => quote!(isize),
        ScalarKind::Int8 => quote!(i8),
        ScalarKind::Int16 => quote!(i16),
        ScalarKind::Int32 => quote!(i32),
        ScalarKind::Int64 => quote!(i64),
        ScalarKind::Uint | ScalarKind::Uintptr => quote!(usize),
        ScalarKind::Uint8 => quote!(u8),
        ScalarKind::Uint16 => quote!(u16),
        ScalarKind::Uint32 => quote!(u32),
        ScalarKind::Uint64 => quote!(u64),
        ScalarKind::Float32 => quote!(f32),
        ScalarKind::Float64 => quote!(f64),
    }
}

fn shape_condition(shape: StringShape) -> TokenStream {
    match shape {
        StringShape::Url => quote!(::url::Url::parse(v).map_or(false, |u| !u.scheme().is_empty())),
        StringShape::Ip => quote!(v.parse::<::std::net::IpAddr>().is_ok()),
        StringShape::Ipv4 => quote! {
            match v.parse::<::std::net::IpAddr>() {
                Ok(::std::net::IpAddr::V4(_)) => true,
                Ok(::std::net::IpAddr::V6(addr)) => addr.to_ipv4_mapped().is_some(),
                Err(_) => false,
            }
        },
        StringShape::Ipv6 => quote! {
            matches!(
                v.parse::<::std::net::IpAddr>(),
                Ok(::std::net::IpAddr::V6(addr)) if addr.to_ipv4_mapped().is_none()
            )
        },
        StringShape::Alpha
        | StringShape::Alphanumeric
        | StringShape::Numeric
        | StringShape::Hexadecimal
        | StringShape::Email
        | StringShape::Base64
        | StringShape::Uuid => {
            let pat = pattern_ident(shape);
            quote!(#pat.is_match(v))
        }
    }
}

fn float_tokens(x: f64, single: bool) -> TokenStream {
    let ty = if single { quote!(f32) } else { quote!(f64) };
    if x.is_nan() {
        quote!(#ty::NAN)
    } else if x == f64::INFINITY {
        quote!(#ty::INFINITY)
    } else if x == f64::NEG_INFINITY {
        quote!(#ty::NEG_INFINITY)
    } else if single {
        let lit = Literal::f32_suffixed(x as f32);
        quote!(#lit)
    } else {
        let lit = Literal::f64_suffixed(x);
        quote!(#lit)
    }
}

/// Literal token carrying the exact Rust type of the field.
fn typed_literal(field: &str, kind: Option<ScalarKind>, lit: &Lit) -> Result<TokenStream, EmitError> {
    let mismatch = || EmitError::Literal {
        field: field.to_owned(),
        literal: lit.to_string(),
        ty: kind.map_or("non-scalar", ScalarKind::name).to_owned(),
    };
    let kind = kind.ok_or_else(mismatch)?;
    let tokens = match (kind, lit) {
        (ScalarKind::String, Lit::Str(s)) => {
            let s = Literal::string(s);
            quote!(#s)
        }
        (ScalarKind::Bool, Lit::Bool(true)) => quote!(true),
        (ScalarKind::Bool, Lit::Bool(false)) => quote!(false),
        (ScalarKind::Int8, Lit::Int(x)) => {
            let l = Literal::i8_suffixed(i8::try_from(*x).map_err(|_| mismatch())?);
            quote!(#l)
        }
        (ScalarKind::Int16, Lit::Int(x)) => {
            let l = Literal::i16_suffixed(i16::try_from(*x).map_err(|_| mismatch())?);
            quote!(#l)
        }
        (ScalarKind::Int32, Lit::Int(x)) => {
            let l = Literal::i32_suffixed(i32::try_from(*x).map_err(|_| mismatch())?);
            quote!(#l)
        }
        (ScalarKind::Int64, Lit::Int(x)) => {
            let l = Literal::i64_suffixed(*x);
            quote!(#l)
        }
        (ScalarKind::Int, Lit::Int(x)) => {
            let l = Literal::isize_suffixed(isize::try_from(*x).map_err(|_| mismatch())?);
            quote!(#l)
        }
        (ScalarKind::Uint8, Lit::Uint(x)) => {
            let l = Literal::u8_suffixed(u8::try_from(*x).map_err(|_| mismatch())?);
            quote!(#l)
        }
        (ScalarKind::Uint16, Lit::Uint(x)) => {
            let l = Literal::u16_suffixed(u16::try_from(*x).map_err(|_| mismatch())?);
            quote!(#l)
        }
        (ScalarKind::Uint32, Lit::Uint(x)) => {
            let l = Literal::u32_suffixed(u32::try_from(*x).map_err(|_| mismatch())?);
            quote!(#l)
        }
        (ScalarKind::Uint64, Lit::Uint(x)) => {
            let l = Literal::u64_suffixed(*x);
            quote!(#l)
        }
        (ScalarKind::Uint | ScalarKind::Uintptr, Lit::Uint(x)) => {
            let l = Literal::usize_suffixed(usize::try_from(*x).map_err(|_| mismatch())?);
            quote!(#l)
        }
        (ScalarKind::Float32, Lit::Float(x)) => float_tokens(*x, true),
        (ScalarKind::Float64, Lit::Float(x)) => float_tokens(*x, false),
        _ => return Err(mismatch()),
    };
    Ok(tokens)
}

/// Renders the record, the named records nested in it, and the pattern
/// statics their checks use.
///
/// # Errors
///
/// Fails if a nested record is anonymous, a record or field name is not a
/// usable identifier, a map is keyed by floats, or the runtime path is
/// malformed.
pub fn render(compiled: &CompiledRecord, options: &EmitOptions) -> Result<TokenStream, EmitError> {
    let mut emitter = Emitter {
        rt: runtime_path(&options.runtime)?,
        records: Vec::new(),
    };
    let root = compiled.schema.name.as_deref().unwrap_or(&compiled.name);
    emitter.collect(root, &compiled.schema)?;

    let mut out = TokenStream::new();
    let patterns = &compiled.patterns;
    if !patterns.is_empty() {
        let idents = patterns.iter().map(|shape| pattern_ident(*shape));
        let sources = patterns.iter().map(|shape| shape.pattern().unwrap_or_default());
        out.extend(quote! {
            ::lazy_static::lazy_static! {
                #(
                    static ref #idents: ::regex::Regex =
                        ::regex::Regex::new(#sources).expect("built-in pattern compiles");
                )*
            }
        });
    }
    for (name, rec) in &emitter.records {
        out.extend(emitter.render_record(name, rec)?);
    }
    Ok(out)
}

/// [`render`] as source text.
pub fn render_string(compiled: &CompiledRecord, options: &EmitOptions) -> Result<String, EmitError> {
    render(compiled, options).map(|tokens| tokens.to_string())
}
