//! Every name and piece of text in a package is interned here, so that
//! nodes can hold plain string slices for as long as the package lives.

use std::borrow::Borrow;
use std::cell::RefCell;
use std::collections::HashSet;
use std::hash::{Hash,Hasher};

use typed_arena::Arena;

/// A string owned by a `StringPool`. Only valid while the pool is.
#[derive(Copy,Clone)]
pub struct InternedString {
    slice: *const str,
}

impl InternedString {
    pub fn from_str(s: &str) -> InternedString {
        InternedString { slice: s as *const str }
    }

    /// The caller picks the lifetime; it must not outlive the pool the
    /// string came from.
    pub fn as_slice<'s>(&self) -> &'s str {
        unsafe { &*self.slice }
    }
}

impl PartialEq for InternedString {
    fn eq(&self, other: &InternedString) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for InternedString {}

impl Hash for InternedString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl Borrow<str> for InternedString {
    fn borrow(&self) -> &str {
        self.as_slice()
    }
}

pub struct StringPool {
    storage: Arena<u8>,
    index: RefCell<HashSet<InternedString>>,
}

impl StringPool {
    pub fn new() -> StringPool {
        StringPool {
            storage: Arena::new(),
            index: RefCell::new(HashSet::new()),
        }
    }

    pub fn intern<'s>(&'s self, s: &str) -> &'s str {
        if s.is_empty() { return ""; }

        let mut index = self.index.borrow_mut();

        if let Some(existing) = index.get(s) {
            return existing.as_slice();
        }

        let stored: &'s str = self.storage.alloc_str(s);
        index.insert(InternedString::from_str(stored));
        stored
    }
}

#[cfg(test)]
mod test {
    use super::StringPool;

    #[test]
    fn keeps_the_same_string() {
        let s = StringPool::new();

        let interned = s.intern("hello");

        assert_eq!(interned, "hello");
    }

    #[test]
    fn does_not_reuse_the_pointer_of_the_input() {
        let s = StringPool::new();
        let input = "hello";

        let interned = s.intern(input);

        assert!(input.as_bytes().as_ptr() != interned.as_bytes().as_ptr());
    }

    #[test]
    fn reuses_the_pointer_for_repeated_input() {
        let s = StringPool::new();

        let interned1 = s.intern("world");
        let interned2 = s.intern("world");

        assert_eq!(interned1.as_bytes().as_ptr(), interned2.as_bytes().as_ptr());
    }

    #[test]
    fn ignores_the_lifetime_of_the_input_string() {
        let s = StringPool::new();

        let interned = {
            let allocated_string = String::from("green");
            s.intern(&allocated_string)
        };

        // allocated_string is gone now, but we should be able to
        // access the result value until the storage goes away.

        assert_eq!(interned, "green");
    }

    #[test]
    fn empty_strings_are_not_stored() {
        let s = StringPool::new();
        assert_eq!("", s.intern(""));
    }
}
