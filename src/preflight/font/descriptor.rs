//! Font descriptor checks shared by every embedded font kind.
//!
//! The kinds differ only in which FontFile key carries the program, so the
//! shared walk is parameterized by the acceptable key set.

use crate::object::{Dictionary, Object};
use crate::preflight::context::PreflightContext;
use crate::preflight::result::{ErrorCode, ValidationError};

/// Descriptor entries every font must declare.
const MANDATORY_DESCRIPTOR_FIELDS: [&str; 8] = [
    "FontName",
    "Flags",
    "ItalicAngle",
    "Ascent",
    "Descent",
    "CapHeight",
    "StemV",
    "FontBBox",
];

/// Descriptor walk parameterized by the FontFile keys a font kind accepts.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorHelper {
    font_file_keys: &'static [&'static str],
}

/// Type1 and MMType1 programs live in FontFile or, as CFF, in FontFile3.
pub const TYPE1: DescriptorHelper = DescriptorHelper {
    font_file_keys: &["FontFile", "FontFile3"],
};

/// TrueType programs live in FontFile2.
pub const TRUETYPE: DescriptorHelper = DescriptorHelper {
    font_file_keys: &["FontFile2"],
};

/// CIDFontType0 programs are CFF, in FontFile3.
pub const CID_TYPE0: DescriptorHelper = DescriptorHelper {
    font_file_keys: &["FontFile3"],
};

/// CIDFontType2 programs are TrueType, in FontFile2.
pub const CID_TYPE2: DescriptorHelper = DescriptorHelper {
    font_file_keys: &["FontFile2"],
};

impl DescriptorHelper {
    /// Validate the FontDescriptor entry of `font_dict`.
    ///
    /// Missing mandatory descriptor fields collapse into one finding; the
    /// embedding requirement and a damaged program each get their own.
    pub fn check_descriptor<'a>(
        &self,
        ctx: &mut PreflightContext<'a>,
        font_name: &str,
        font_dict: &'a Dictionary,
    ) -> bool {
        let Some(entry) = font_dict.get("FontDescriptor") else {
            ctx.add_error(ValidationError::new(
                ErrorCode::FontDescriptorInvalid,
                format!("The font {} has no FontDescriptor", font_name),
            ));
            return false;
        };
        let Some(descriptor) = ctx.resolve_dict(entry) else {
            ctx.add_error(ValidationError::new(
                ErrorCode::FontDescriptorInvalid,
                format!("The FontDescriptor of {} isn't a dictionary", font_name),
            ));
            return false;
        };

        let mut ok = true;
        let missing: Vec<&str> = MANDATORY_DESCRIPTOR_FIELDS
            .iter()
            .copied()
            .filter(|key| !descriptor.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            ctx.add_error(ValidationError::new(
                ErrorCode::FontDescriptorInvalid,
                format!(
                    "The FontDescriptor of {} is missing {}",
                    font_name,
                    missing.join(", ")
                ),
            ));
            ok = false;
        }

        ok &= self.check_font_file(ctx, font_name, descriptor);
        ok
    }

    fn check_font_file<'a>(
        &self,
        ctx: &mut PreflightContext<'a>,
        font_name: &str,
        descriptor: &'a Dictionary,
    ) -> bool {
        let Some(entry) = self
            .font_file_keys
            .iter()
            .find_map(|key| descriptor.get(*key))
        else {
            ctx.add_error(ValidationError::new(
                ErrorCode::FontNotEmbedded,
                format!("The font program of {} is not embedded", font_name),
            ));
            return false;
        };
        match ctx.resolve(entry) {
            Some(Object::Stream { data, .. }) if !data.is_empty() => true,
            _ => {
                ctx.add_error(ValidationError::new(
                    ErrorCode::FontProgramDamaged,
                    format!("Unable to read the font program of {}", font_name),
                ));
                false
            }
        }
    }
}
