//! Stable, human-readable type names used inside cache keys
//!
//! Names must be identical across processes and builds, which rules out
//! [`std::any::type_name`]. Types opt in through [`TypeName`], either by hand
//! or with `#[derive(TypeName)]`. Generic types render as `Outer<Inner>`.
//!
//! Built-in names follow the conventions already present on shared backends
//! (`String`, `Int32`, `List<T>`, `Dictionary<K, V>`, ...).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Registry entry for a type's rendered name
pub trait TypeName {
    /// Rendered name, e.g. `Dictionary<String, Object>`
    fn type_name() -> String;
}

/// Render `outer<arg1, arg2, ...>`, or just `outer` without arguments
pub fn generic_type_name(outer: &str, args: &[String]) -> String {
    if args.is_empty() {
        outer.to_string()
    } else {
        format!("{}<{}>", outer, args.join(", "))
    }
}

macro_rules! simple_type_name {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl TypeName for $ty {
                #[inline]
                fn type_name() -> String {
                    $name.to_string()
                }
            }
        )*
    };
}

simple_type_name! {
    String => "String",
    str => "String",
    bool => "Boolean",
    char => "Char",
    i8 => "SByte",
    u8 => "Byte",
    i16 => "Int16",
    u16 => "UInt16",
    i32 => "Int32",
    u32 => "UInt32",
    i64 => "Int64",
    u64 => "UInt64",
    isize => "IntPtr",
    usize => "UIntPtr",
    f32 => "Single",
    f64 => "Double",
    serde_json::Value => "Object",
}

macro_rules! generic_type_name_impl {
    ($outer:literal, $ty:ident < $($arg:ident),+ >) => {
        impl<$($arg: TypeName),+> TypeName for $ty<$($arg),+> {
            fn type_name() -> String {
                generic_type_name($outer, &[$($arg::type_name()),+])
            }
        }
    };
}

generic_type_name_impl!("List", Vec<T>);
generic_type_name_impl!("Queue", VecDeque<T>);
generic_type_name_impl!("HashSet", HashSet<T>);
generic_type_name_impl!("SortedSet", BTreeSet<T>);
generic_type_name_impl!("Nullable", Option<T>);
generic_type_name_impl!("SortedDictionary", BTreeMap<K, V>);

impl<K: TypeName, V: TypeName, S> TypeName for HashMap<K, V, S> {
    fn type_name() -> String {
        generic_type_name("Dictionary", &[K::type_name(), V::type_name()])
    }
}

impl<A: TypeName, B: TypeName> TypeName for (A, B) {
    fn type_name() -> String {
        generic_type_name("Tuple", &[A::type_name(), B::type_name()])
    }
}

impl<A: TypeName, B: TypeName, C: TypeName> TypeName for (A, B, C) {
    fn type_name() -> String {
        generic_type_name("Tuple", &[A::type_name(), B::type_name(), C::type_name()])
    }
}

// Each Rust type needs its own name: local tiers only return entries of the
// exact type they were stored as.

impl<T: TypeName + ?Sized> TypeName for Box<T> {
    fn type_name() -> String {
        generic_type_name("Box", &[T::type_name()])
    }
}

impl<T: TypeName + ?Sized> TypeName for Arc<T> {
    fn type_name() -> String {
        generic_type_name("Arc", &[T::type_name()])
    }
}
