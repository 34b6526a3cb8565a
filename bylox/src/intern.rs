use string_interner::{symbol::SymbolU32, DefaultBackend, DefaultHashBuilder};

/// Default string interner. The interner is an explicit handle owned by the
/// caller of the compiler so that concurrent compilations on different
/// chunks stay possible; interned names must outlive every chunk that
/// references them.
pub type StringInterner<B = DefaultBackend<StrId>, H = DefaultHashBuilder> =
    string_interner::StringInterner<StrId, B, H>;

/// Interned string id
pub type StrId = SymbolU32;
