//! Print Options
//!
//! The customer's choices for one order. Constructed once, never mutated.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaperSize {
    A4,
    A3,
    Letter,
    Legal,
}

impl PaperSize {
    pub const ALL: [PaperSize; 4] = [Self::A4, Self::A3, Self::Letter, Self::Legal];
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A4 => "A4",
            Self::A3 => "A3",
            Self::Letter => "Letter",
            Self::Legal => "Legal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    BlackAndWhite,
    Color,
}

impl ColorMode {
    pub const ALL: [ColorMode; 2] = [Self::BlackAndWhite, Self::Color];
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlackAndWhite => f.write_str("Black & White"),
            Self::Color => f.write_str("Full Color"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sided {
    #[default]
    SingleSided,
    DoubleSided,
}

impl Sided {
    /// Physical sheets needed for `pages` printed pages.
    pub fn sheets_for(self, pages: u64) -> u64 {
        match self {
            Self::SingleSided => pages,
            Self::DoubleSided => pages.div_ceil(2),
        }
    }
}

impl fmt::Display for Sided {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleSided => f.write_str("Single-sided"),
            Self::DoubleSided => f.write_str("Double-sided"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    Spiral,
    Staple,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spiral => f.write_str("Spiral"),
            Self::Staple => f.write_str("Staple"),
        }
    }
}

/// Paper stock. Glossy is priced from its own rate column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperStock {
    #[default]
    Standard,
    Glossy,
}

impl fmt::Display for PaperStock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("Standard"),
            Self::Glossy => f.write_str("Glossy"),
        }
    }
}

/// Print options for one order.
///
/// `copies` is kept signed so that a bad value coming from a form or a JSON
/// payload reaches the pricing engine and is rejected there with a field
/// name, instead of failing somewhere in deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintOptions {
    pub paper_size: PaperSize,
    pub color_mode: ColorMode,
    #[serde(default)]
    pub sided: Sided,
    #[serde(default = "default_copies")]
    pub copies: i64,
    /// Forms send `"none"` for no binding; it reads the same as absent.
    #[serde(default, deserialize_with = "binding_or_none")]
    pub binding: Option<Binding>,
    #[serde(default)]
    pub stock: PaperStock,
}

fn default_copies() -> i64 { 1 }

fn binding_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Binding>, D::Error> {
    #[derive(Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Choice {
        #[serde(rename = "none")]
        NoBinding,
        Spiral,
        Staple,
    }

    Ok(match Option::<Choice>::deserialize(deserializer)? {
        None | Some(Choice::NoBinding) => None,
        Some(Choice::Spiral) => Some(Binding::Spiral),
        Some(Choice::Staple) => Some(Binding::Staple),
    })
}

impl PrintOptions {
    /// One single-sided copy on standard stock, no binding.
    pub fn new(paper_size: PaperSize, color_mode: ColorMode) -> Self {
        Self {
            paper_size,
            color_mode,
            sided: Sided::SingleSided,
            copies: 1,
            binding: None,
            stock: PaperStock::Standard,
        }
    }

    pub fn sided(self, sided: Sided) -> Self {
        Self { sided, ..self }
    }

    pub fn copies(self, copies: i64) -> Self {
        Self { copies, ..self }
    }

    pub fn binding(self, binding: Binding) -> Self {
        Self { binding: Some(binding), ..self }
    }

    pub fn stock(self, stock: PaperStock) -> Self {
        Self { stock, ..self }
    }
}
