pub(crate) trait Stack {
    /// Type of the values that are pushed onto the stack.
    type Item;

    /// Remove and return the topmost value of the stack if it exists.
    fn pop(&mut self) -> Option<Self::Item>;

    /// Push `item` onto the top of the stack.
    fn push(&mut self, item: Self::Item);

    /// Number of values currently on the stack.
    fn depth(&self) -> usize;

    /// Returns `true` if any value on the stack equals `item`.
    fn contains_item(&self, item: &Self::Item) -> bool
    where
        Self::Item: PartialEq;

    /// Given a closure that returns `None` in the case of a valid value to push,
    /// and `Some(err)` if an error occured, pre-validate and push `item` onto the
    /// Stack.
    ///
    /// If `Err(_)` is returned, the mutably borrowed receiver is unmodified.
    fn push_validated<Error, F>(&mut self, item: Self::Item, validate: F) -> Result<(), Error>
    where
        F: FnOnce(&Self, &Self::Item) -> Option<Error>,
        Self: Sized,
    {
        match validate(self, &item) {
            None => {
                self.push(item);
                Ok(())
            }
            Some(err) => Err(err),
        }
    }
}

impl<T> Stack for Vec<T> {
    type Item = T;

    fn pop(&mut self) -> Option<T> {
        Vec::pop(self)
    }

    fn push(&mut self, item: T) {
        Vec::push(self, item)
    }

    fn depth(&self) -> usize {
        self.len()
    }

    fn contains_item(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.contains(item)
    }
}
