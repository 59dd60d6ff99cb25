//! Identifiers of the physical metadata tables.

use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Identifies one of the physical metadata tables of the `#~` stream.
///
/// The discriminant is the table number used by the `Valid` and `Sorted` bitmaps and by
/// metadata tokens. All tables defined by ECMA-335 II.22 are covered, including the
/// `*Ptr` indirection tables and the edit-and-continue log tables that only appear in
/// uncompressed (`#-`) streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount)]
#[repr(usize)]
pub enum TableId {
    /// 0x00 `Module`
    Module = 0x00,
    /// 0x01 `TypeRef`
    TypeRef = 0x01,
    /// 0x02 `TypeDef`
    TypeDef = 0x02,
    /// 0x03 `FieldPtr`
    FieldPtr = 0x03,
    /// 0x04 `Field`
    Field = 0x04,
    /// 0x05 `MethodPtr`
    MethodPtr = 0x05,
    /// 0x06 `MethodDef`
    MethodDef = 0x06,
    /// 0x07 `ParamPtr`
    ParamPtr = 0x07,
    /// 0x08 `Param`
    Param = 0x08,
    /// 0x09 `InterfaceImpl`
    InterfaceImpl = 0x09,
    /// 0x0A `MemberRef`
    MemberRef = 0x0A,
    /// 0x0B `Constant`
    Constant = 0x0B,
    /// 0x0C `CustomAttribute`
    CustomAttribute = 0x0C,
    /// 0x0D `FieldMarshal`
    FieldMarshal = 0x0D,
    /// 0x0E `DeclSecurity`
    DeclSecurity = 0x0E,
    /// 0x0F `ClassLayout`
    ClassLayout = 0x0F,
    /// 0x10 `FieldLayout`
    FieldLayout = 0x10,
    /// 0x11 `StandAloneSig`
    StandAloneSig = 0x11,
    /// 0x12 `EventMap`
    EventMap = 0x12,
    /// 0x13 `EventPtr`
    EventPtr = 0x13,
    /// 0x14 `Event`
    Event = 0x14,
    /// 0x15 `PropertyMap`
    PropertyMap = 0x15,
    /// 0x16 `PropertyPtr`
    PropertyPtr = 0x16,
    /// 0x17 `Property`
    Property = 0x17,
    /// 0x18 `MethodSemantics`
    MethodSemantics = 0x18,
    /// 0x19 `MethodImpl`
    MethodImpl = 0x19,
    /// 0x1A `ModuleRef`
    ModuleRef = 0x1A,
    /// 0x1B `TypeSpec`
    TypeSpec = 0x1B,
    /// 0x1C `ImplMap`
    ImplMap = 0x1C,
    /// 0x1D `FieldRVA`
    FieldRVA = 0x1D,
    /// 0x1E `EncLog`
    EncLog = 0x1E,
    /// 0x1F `EncMap`
    EncMap = 0x1F,
    /// 0x20 `Assembly`
    Assembly = 0x20,
    /// 0x21 `AssemblyProcessor`
    AssemblyProcessor = 0x21,
    /// 0x22 `AssemblyOS`
    AssemblyOS = 0x22,
    /// 0x23 `AssemblyRef`
    AssemblyRef = 0x23,
    /// 0x24 `AssemblyRefProcessor`
    AssemblyRefProcessor = 0x24,
    /// 0x25 `AssemblyRefOS`
    AssemblyRefOS = 0x25,
    /// 0x26 `File`
    File = 0x26,
    /// 0x27 `ExportedType`
    ExportedType = 0x27,
    /// 0x28 `ManifestResource`
    ManifestResource = 0x28,
    /// 0x29 `NestedClass`
    NestedClass = 0x29,
    /// 0x2A `GenericParam`
    GenericParam = 0x2A,
    /// 0x2B `MethodSpec`
    MethodSpec = 0x2B,
    /// 0x2C `GenericParamConstraint`
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// Map a bit index of the `Valid` bitmap to its table id.
    ///
    /// Returns `None` for bit positions with no defined table; a set bit there is a
    /// structural error of the stream.
    #[must_use]
    pub fn from_bit_index(index: usize) -> Option<TableId> {
        TableId::iter().find(|id| *id as usize == index)
    }
}
