//! Coded index types of the metadata table schema.
//!
//! A coded index packs a table tag and a row index into one value; its byte width in a
//! row depends on the row counts of every table it can reference. The widths matter
//! here even for tables this crate does not surface as typed rows, because a wrong
//! width would shift every following table.

use strum::{EnumCount, EnumIter};

use crate::metadata::tables::TableId;

/// The coded index families defined by ECMA-335 II.24.2.6.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
#[repr(usize)]
pub enum CodedIndexType {
    /// References `TypeDef`, `TypeRef`, or `TypeSpec` tables
    TypeDefOrRef,
    /// References `Field`, `Param`, or `Property` tables
    HasConstant,
    /// References any entity that can carry a custom attribute
    HasCustomAttribute,
    /// References `Field` or `Param` tables
    HasFieldMarshal,
    /// References `TypeDef`, `MethodDef`, or `Assembly` tables
    HasDeclSecurity,
    /// References `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef`, or `TypeSpec` tables
    MemberRefParent,
    /// References `Event` or `Property` tables
    HasSemantics,
    /// References `MethodDef` or `MemberRef` tables
    MethodDefOrRef,
    /// References `Field` or `MethodDef` tables
    MemberForwarded,
    /// References `File`, `AssemblyRef`, or `ExportedType` tables
    Implementation,
    /// References the constructor of a custom attribute
    CustomAttributeType,
    /// References `Module`, `ModuleRef`, `AssemblyRef`, or `TypeRef` tables
    ResolutionScope,
    /// References `TypeDef` or `MethodDef` tables
    TypeOrMethodDef,
}

impl CodedIndexType {
    /// The tables this coded index family can reference, in tag order.
    #[must_use]
    pub fn tables(&self) -> &'static [TableId] {
        match self {
            CodedIndexType::TypeDefOrRef => {
                &[TableId::TypeDef, TableId::TypeRef, TableId::TypeSpec]
            }
            CodedIndexType::HasConstant => &[TableId::Field, TableId::Param, TableId::Property],
            CodedIndexType::HasCustomAttribute => &[
                TableId::MethodDef,
                TableId::Field,
                TableId::TypeRef,
                TableId::TypeDef,
                TableId::Param,
                TableId::InterfaceImpl,
                TableId::MemberRef,
                TableId::Module,
                TableId::DeclSecurity, // In the standard PDF, this is wrongly labeled as 'Permission' (although no such table exists)
                TableId::Property,
                TableId::Event,
                TableId::StandAloneSig,
                TableId::ModuleRef,
                TableId::TypeSpec,
                TableId::Assembly,
                TableId::AssemblyRef,
                TableId::File,
                TableId::ExportedType,
                TableId::ManifestResource,
                TableId::GenericParam,
                TableId::GenericParamConstraint,
                TableId::MethodSpec,
            ],
            CodedIndexType::HasFieldMarshal => &[TableId::Field, TableId::Param],
            CodedIndexType::HasDeclSecurity => {
                &[TableId::TypeDef, TableId::MethodDef, TableId::Assembly]
            }
            CodedIndexType::MemberRefParent => &[
                TableId::TypeDef,
                TableId::TypeRef,
                TableId::ModuleRef,
                TableId::MethodDef,
                TableId::TypeSpec,
            ],
            CodedIndexType::HasSemantics => &[TableId::Event, TableId::Property],
            CodedIndexType::MethodDefOrRef => &[TableId::MethodDef, TableId::MemberRef],
            CodedIndexType::MemberForwarded => &[TableId::Field, TableId::MethodDef],
            CodedIndexType::Implementation => {
                &[TableId::File, TableId::AssemblyRef, TableId::ExportedType]
            }
            // Tags 0, 1 and 4 are 'not used' per the standard; the MethodDef/MemberRef
            // placeholders keep the tag arithmetic correct.
            CodedIndexType::CustomAttributeType => &[
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MemberRef,
                TableId::MemberRef,
            ],
            CodedIndexType::ResolutionScope => &[
                TableId::Module,
                TableId::ModuleRef,
                TableId::AssemblyRef,
                TableId::TypeRef,
            ],
            CodedIndexType::TypeOrMethodDef => &[TableId::TypeDef, TableId::MethodDef],
        }
    }

    /// Number of tag bits consumed by this family, `ceil(log2(table count))`.
    #[must_use]
    pub fn tag_bits(&self) -> u8 {
        let count = self.tables().len();
        if count <= 1 {
            return 0;
        }

        // Bits needed to represent count-1, i.e. the highest tag value.
        #[allow(clippy::cast_possible_truncation)]
        let bits = (usize::BITS - (count - 1).leading_zeros()) as u8;
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_bit_widths() {
        assert_eq!(CodedIndexType::MethodDefOrRef.tag_bits(), 1);
        assert_eq!(CodedIndexType::TypeDefOrRef.tag_bits(), 2);
        assert_eq!(CodedIndexType::ResolutionScope.tag_bits(), 2);
        assert_eq!(CodedIndexType::MemberRefParent.tag_bits(), 3);
        assert_eq!(CodedIndexType::CustomAttributeType.tag_bits(), 3);
        assert_eq!(CodedIndexType::HasCustomAttribute.tag_bits(), 5);
    }
}
