// Output of `recodec::render` for the `Person` record defined in
// `tests/rendered.rs`, with the default runtime path. Kept in sync by
// `fixture_matches_current_rendering`.

::lazy_static::lazy_static! {
    static ref ALPHA_PATTERN: ::regex::Regex =
        ::regex::Regex::new("^\\p{L}*$").expect("built-in pattern compiles");
}

#[derive(Debug, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct Person {
    pub Name: ::std::string::String,
    pub Age: u8,
    pub Nick: ::std::option::Option<::std::string::String>,
    pub Home: Address,
    pub Tags: ::std::vec::Vec<::std::string::String>,
    pub Scores: ::std::collections::HashMap<::std::string::String, i32>,
    pub Blob: recodec::conv::Bytes,
    pub Cache: i64,
}

impl ::std::default::Default for Person {
    fn default() -> Self {
        Self {
            Name: ::std::default::Default::default(),
            Age: ::std::default::Default::default(),
            Nick: ::std::default::Default::default(),
            Home: ::std::default::Default::default(),
            Tags: ::std::default::Default::default(),
            Scores: ::std::default::Default::default(),
            Blob: ::std::default::Default::default(),
            Cache: ::std::default::Default::default()
        }
    }
}

impl recodec::conv::Encode for Person {
    fn write_to<U: recodec::conv::target::Target>(&self, buf: &mut U) -> usize {
        0 + recodec::conv::Encode::write_to(&self.Name, buf)
            + recodec::conv::Encode::write_to(&self.Age, buf)
            + recodec::conv::Encode::write_to(&self.Nick, buf)
            + recodec::conv::Encode::write_to(&self.Home, buf)
            + recodec::conv::Encode::write_to(&self.Tags, buf)
            + recodec::conv::Encode::write_to(&self.Scores, buf)
            + recodec::conv::Encode::write_to(&self.Blob, buf)
    }
}

impl recodec::conv::Decode for Person {
    fn parse<P: recodec::parse::Parser>(p: &mut P) -> recodec::parse::DecodeResult<Self> {
        let field0: ::std::string::String =
            recodec::conv::parse_gated::<::std::string::String, _, _>(p, |len| {
                if !(len >= 1usize) {
                    return Err(recodec::parse::DecodeError::violation("Name", "field 'Name' has a minimum length of 1"));
                }
                if !(len <= 16usize) {
                    return Err(recodec::parse::DecodeError::violation("Name", "field 'Name' has a maximum length of 16"));
                }
                Ok(())
            })?;
        {
            let v = &field0;
            if !(ALPHA_PATTERN.is_match(v)) {
                return Err(recodec::parse::DecodeError::violation("Name", "field 'Name' contains non alpha characters"));
            }
        }
        let field1: u8 = <u8 as recodec::conv::Decode>::parse(p)?;
        {
            let v = &field1;
            if !(!(*v > 130u8)) {
                return Err(recodec::parse::DecodeError::violation("Age", "field 'Age' has a maximum value of 130"));
            }
        }
        let field2: ::std::option::Option<::std::string::String> =
            recodec::conv::parse_gated_opt::<::std::string::String, _, _>(p, |len| {
                if !(len <= 4usize) {
                    return Err(recodec::parse::DecodeError::violation("Nick", "field 'Nick' has a maximum length of 4"));
                }
                Ok(())
            })?;
        let field3: Address = <Address as recodec::conv::Decode>::parse(p)?;
        let field4: ::std::vec::Vec<::std::string::String> =
            <::std::vec::Vec<::std::string::String> as recodec::conv::Decode>::parse(p)?;
        let field5: ::std::collections::HashMap<::std::string::String, i32> =
            <::std::collections::HashMap<::std::string::String, i32> as recodec::conv::Decode>::parse(p)?;
        let field6: recodec::conv::Bytes = <recodec::conv::Bytes as recodec::conv::Decode>::parse(p)?;
        Ok(Self {
            Name: field0,
            Age: field1,
            Nick: field2,
            Home: field3,
            Tags: field4,
            Scores: field5,
            Blob: field6,
            Cache: ::std::default::Default::default()
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct Address {
    pub Street: ::std::string::String,
    pub Zip: [u16; 2],
}

impl ::std::default::Default for Address {
    fn default() -> Self {
        Self {
            Street: ::std::default::Default::default(),
            Zip: ::std::array::from_fn(|_| ::std::default::Default::default())
        }
    }
}

impl recodec::conv::Encode for Address {
    fn write_to<U: recodec::conv::target::Target>(&self, buf: &mut U) -> usize {
        0 + recodec::conv::Encode::write_to(&self.Street, buf)
            + recodec::conv::Encode::write_to(&self.Zip, buf)
    }
}

impl recodec::conv::Decode for Address {
    fn parse<P: recodec::parse::Parser>(p: &mut P) -> recodec::parse::DecodeResult<Self> {
        let field0: ::std::string::String =
            recodec::conv::parse_gated::<::std::string::String, _, _>(p, |len| {
                if !(len <= 8usize) {
                    return Err(recodec::parse::DecodeError::violation("Street", "field 'Street' has a maximum length of 8"));
                }
                Ok(())
            })?;
        {
            let v = &field0;
            if !(ALPHA_PATTERN.is_match(v)) {
                return Err(recodec::parse::DecodeError::violation("Street", "field 'Street' contains non alpha characters"));
            }
        }
        let field1: [u16; 2] = <[u16; 2] as recodec::conv::Decode>::parse(p)?;
        Ok(Self { Street: field0, Zip: field1 })
    }
}
