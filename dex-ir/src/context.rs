//! Interned pools for strings, types, prototypes, and method references.
//!
//! Pools are append-only and interning is idempotent, so a handle is a
//! stable `u32` index and handle equality is value equality. All pools
//! sit behind reader-writer locks; sharing a [`DexContext`] across
//! worker threads is supported.

use std::hash::Hash;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::mutf8;

/// Handle to an interned Modified UTF-8 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DexString(u32);

/// Handle to an interned type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DexType(u32);

/// Handle to an interned method prototype (return type and parameters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DexProto(u32);

/// Handle to an interned method reference (class, name, prototype).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DexMethodRef(u32);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ProtoData {
    return_ty: DexType,
    params: Arc<[DexType]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MethodData {
    class: DexType,
    name: DexString,
    proto: DexProto,
}

#[derive(Debug)]
struct Interner<T> {
    items: Vec<T>,
    index: HashMap<T, u32>,
}

impl<T> Default for Interner<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> Interner<T> {
    fn intern(&mut self, value: T) -> u32 {
        if let Some(&i) = self.index.get(&value) {
            return i;
        }
        assert!(self.items.len() < u32::MAX as usize, "intern pool overflow");
        let i = self.items.len() as u32;
        self.items.push(value.clone());
        self.index.insert(value, i);
        i
    }

    fn resolve(&self, i: u32) -> T {
        self.items[i as usize].clone()
    }
}

/// The interned pools an IR body references into.
#[derive(Debug)]
pub struct DexContext {
    strings: RwLock<Interner<Arc<[u8]>>>,
    types: RwLock<Interner<Arc<str>>>,
    protos: RwLock<Interner<ProtoData>>,
    methods: RwLock<Interner<MethodData>>,
    empty: DexString,
}

impl Default for DexContext {
    fn default() -> Self {
        Self::new()
    }
}

impl DexContext {
    /// An empty context. The empty string is pre-interned.
    pub fn new() -> Self {
        let mut strings = Interner::default();
        let empty = DexString(strings.intern(Vec::new().into()));
        Self {
            strings: RwLock::new(strings),
            types: RwLock::new(Interner::default()),
            protos: RwLock::new(Interner::default()),
            methods: RwLock::new(Interner::default()),
            empty,
        }
    }

    /// Intern a string, encoding it as Modified UTF-8.
    pub fn make_string(&self, s: &str) -> DexString {
        self.intern_string_bytes(mutf8::encode_str(s))
    }

    /// Intern a string given as UTF-16 code units.
    ///
    /// The units may contain unpaired surrogates; Modified UTF-8
    /// represents each code unit independently.
    pub fn make_string_from_units(&self, units: &[u16]) -> DexString {
        let mut bytes = Vec::with_capacity(units.len());
        for &unit in units {
            mutf8::encode_unit(unit, &mut bytes);
        }
        self.intern_string_bytes(bytes)
    }

    /// Intern the concatenation of two interned strings.
    pub fn concat_strings(&self, a: DexString, b: DexString) -> DexString {
        let mut bytes = self.string_bytes(a).to_vec();
        bytes.extend_from_slice(&self.string_bytes(b));
        self.intern_string_bytes(bytes)
    }

    fn intern_string_bytes(&self, bytes: Vec<u8>) -> DexString {
        DexString(self.strings.write().intern(bytes.into()))
    }

    /// The Modified UTF-8 bytes of an interned string.
    pub fn string_bytes(&self, s: DexString) -> Arc<[u8]> {
        self.strings.read().resolve(s.0)
    }

    /// The length of an interned string in UTF-16 code units.
    pub fn string_utf16_len(&self, s: DexString) -> usize {
        mutf8::unit_count(&self.string_bytes(s))
    }

    /// A lossy UTF-8 rendering of an interned string.
    pub fn string_to_lossy(&self, s: DexString) -> String {
        mutf8::to_string_lossy(&self.string_bytes(s))
    }

    /// The interned empty string.
    pub const fn empty_string(&self) -> DexString {
        self.empty
    }

    /// Intern a type by its descriptor, e.g. `Ljava/lang/String;`.
    pub fn make_type(&self, descriptor: &str) -> DexType {
        DexType(self.types.write().intern(descriptor.into()))
    }

    /// The descriptor of an interned type.
    pub fn type_descriptor(&self, ty: DexType) -> Arc<str> {
        self.types.read().resolve(ty.0)
    }

    /// Intern a method prototype.
    pub fn make_proto(&self, return_ty: DexType, params: &[DexType]) -> DexProto {
        DexProto(self.protos.write().intern(ProtoData {
            return_ty,
            params: params.into(),
        }))
    }

    /// The return type of an interned prototype.
    pub fn proto_return_type(&self, proto: DexProto) -> DexType {
        self.protos.read().resolve(proto.0).return_ty
    }

    /// The parameter types of an interned prototype.
    pub fn proto_params(&self, proto: DexProto) -> Arc<[DexType]> {
        self.protos.read().resolve(proto.0).params
    }

    /// Intern a method reference.
    pub fn make_method(
        &self,
        class: DexType,
        name: DexString,
        proto: DexProto,
    ) -> DexMethodRef {
        DexMethodRef(self.methods.write().intern(MethodData { class, name, proto }))
    }

    /// The defining class of an interned method reference.
    pub fn method_class(&self, method: DexMethodRef) -> DexType {
        self.methods.read().resolve(method.0).class
    }

    /// The name of an interned method reference.
    pub fn method_name(&self, method: DexMethodRef) -> DexString {
        self.methods.read().resolve(method.0).name
    }

    /// The prototype of an interned method reference.
    pub fn method_proto(&self, method: DexMethodRef) -> DexProto {
        self.methods.read().resolve(method.0).proto
    }

    /// The return type of an interned method reference.
    pub fn method_return_type(&self, method: DexMethodRef) -> DexType {
        self.proto_return_type(self.method_proto(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let ctx = DexContext::new();
        assert_eq!(ctx.make_string("hi"), ctx.make_string("hi"));
        assert_ne!(ctx.make_string("hi"), ctx.make_string("ho"));
        assert_eq!(ctx.make_string(""), ctx.empty_string());

        let t = ctx.make_type("Ljava/lang/String;");
        assert_eq!(t, ctx.make_type("Ljava/lang/String;"));
        assert_eq!(&*ctx.type_descriptor(t), "Ljava/lang/String;");
    }

    #[test]
    fn method_handles_resolve_back() {
        let ctx = DexContext::new();
        let obj = ctx.make_type("Ljava/lang/Object;");
        let string = ctx.make_type("Ljava/lang/String;");
        let name = ctx.make_string("equals");
        let bool_t = ctx.make_type("Z");
        let proto = ctx.make_proto(bool_t, &[obj]);
        let m = ctx.make_method(string, name, proto);

        assert_eq!(m, ctx.make_method(string, name, proto));
        assert_eq!(ctx.method_class(m), string);
        assert_eq!(ctx.method_name(m), name);
        assert_eq!(ctx.method_return_type(m), bool_t);
        assert_eq!(&*ctx.proto_params(proto), &[obj]);
    }

    #[test]
    fn concat_and_length() {
        let ctx = DexContext::new();
        let a = ctx.make_string("ab");
        let b = ctx.make_string("cd");
        let ab = ctx.concat_strings(a, b);
        assert_eq!(ab, ctx.make_string("abcd"));
        assert_eq!(ctx.string_utf16_len(ab), 4);
        assert_eq!(ctx.string_to_lossy(ab), "abcd");
    }
}
