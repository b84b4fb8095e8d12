use crate::internal::stack::Stack;

#[cfg(feature = "smallvec_framestack")]
extern crate smallvec;

#[cfg(feature = "smallvec_framestack")]
pub mod smallvec_framestack {
    //! Implementation of `FrameStack` based on `SmallVec`, which requires no
    //! heap allocations provided the type nesting stays shallow.

    use ::smallvec::SmallVec;

    /// Number of named types that can be under expansion simultaneously
    /// before a `SmallVec`-based `FrameStack` requires heap allocation.
    pub const INLINE_ALLOC: usize = 8;

    /// Stack of the named types currently being expanded
    ///
    /// Implemented using `SmallVec`, with an array-size of [`INLINE_ALLOC`]
    #[derive(Clone, Default, PartialEq, Eq)]
    pub struct FrameStack(pub(super) SmallVec<[String; INLINE_ALLOC]>);

    impl FrameStack {
        pub fn new() -> Self {
            Self(SmallVec::new())
        }
    }
}

#[cfg_attr(feature = "smallvec_framestack", allow(dead_code))]
pub mod vec_framestack {
    /// Stack of the named types currently being expanded
    ///
    /// Implemented using a regular `Vec<String>`
    ///
    /// Setting the `smallvec_framestack` feature flag will cause this implementation
    /// to be shadowed by an alternative that is based on `SmallVec`
    #[derive(Clone, Default, PartialEq, Eq)]
    pub struct FrameStack(pub(super) Vec<String>);

    impl FrameStack {
        pub fn new() -> Self {
            Self(Vec::new())
        }
    }
}

#[cfg(feature = "smallvec_framestack")]
pub use smallvec_framestack::FrameStack;
#[cfg(not(feature = "smallvec_framestack"))]
pub use vec_framestack::FrameStack;

impl std::fmt::Debug for FrameStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", &self.0)
    }
}

impl Stack for FrameStack {
    type Item = String;

    fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    fn push(&mut self, item: String) {
        self.0.push(item)
    }

    fn depth(&self) -> usize {
        self.0.len()
    }

    fn contains_item(&self, item: &String) -> bool {
        self.0.iter().any(|name| name == item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_nest_and_unwind() {
        let mut frames = FrameStack::new();
        frames.push(String::from("Outer"));
        frames.push(String::from("Inner"));
        assert!(frames.contains_item(&String::from("Outer")));
        assert_eq!(format!("{frames:?}"), r#"["Outer", "Inner"]"#);
        assert_eq!(frames.pop().as_deref(), Some("Inner"));
        assert_eq!(frames.depth(), 1);
    }
}
