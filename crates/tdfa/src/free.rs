//! Generators for fresh, dense identifiers

use std::{fmt, marker::PhantomData};

/// An opaque identifier minted from a monotonically increasing counter
pub trait Id: Copy {
    fn from_index(idx: usize) -> Self;

    fn index(self) -> usize;
}

macro_rules! id_type {
    ($(#[$meta:meta])* $vis:vis struct $name:ident($prefix:literal);) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        $vis struct $name(u32);

        impl $crate::free::Id for $name {
            #[inline]
            fn from_index(idx: usize) -> Self {
                Self(
                    u32::try_from(idx)
                        .unwrap_or_else(|_| panic!(concat!("Ran out of ", stringify!($name), " IDs"))),
                )
            }

            #[inline]
            fn index(self) -> usize { self.0 as usize }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Debug::fmt(self, f)
            }
        }
    };
}

pub(crate) use id_type;

/// Hands out identifiers of type `T` in increasing order, starting from zero.
///
/// Every automaton and engine owns its own generator, so two engines built
/// from the same input always allocate the same identifiers.
pub struct Free<T>(usize, PhantomData<fn() -> T>);

impl<T> fmt::Debug for Free<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Free").field(&self.0).finish()
    }
}

impl<T> Default for Free<T> {
    #[inline]
    fn default() -> Self { Self(0, PhantomData) }
}

impl<T: Id> Free<T> {
    #[must_use]
    pub fn fresh(&mut self) -> T {
        let id = T::from_index(self.0);
        self.0 += 1;
        id
    }

    /// The number of identifiers handed out so far
    #[must_use]
    #[inline]
    pub fn issued(&self) -> usize { self.0 }
}

#[cfg(test)]
mod test {
    use super::{Free, Id};

    id_type! {
        struct Probe("p");
    }

    #[test]
    fn fresh_is_dense() {
        let mut free = Free::<Probe>::default();
        let ids: Vec<_> = (0..4).map(|_| free.fresh()).collect();

        assert_eq!(ids.iter().map(|i| i.index()).collect::<Vec<_>>(), [0, 1, 2, 3]);
        assert_eq!(free.issued(), 4);
        assert_eq!(format!("{}", ids[2]), "p2");
    }

    #[test]
    fn generators_are_independent() {
        let mut a = Free::<Probe>::default();
        let mut b = Free::<Probe>::default();
        let _ = a.fresh();

        assert_eq!(a.fresh(), Probe::from_index(1));
        assert_eq!(b.fresh(), Probe::from_index(0));
    }
}
